// src/service/mod.rs
pub mod auth_service;
pub mod habit_service;
pub mod profile_service;
pub mod session_events;

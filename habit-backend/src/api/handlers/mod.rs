// src/api/handlers/mod.rs
pub mod action_handler;
pub mod auth_handler;
pub mod profile_handler;
pub mod stats_handler;
pub mod system_handler;

// src/domain/mod.rs
pub mod action_completion_model;
pub mod action_model;
pub mod calendar;
pub mod habit_stats;
pub mod refresh_token_model;
pub mod user_model;
pub mod user_profile_model;

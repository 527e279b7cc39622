// src/config.rs
pub mod app;

pub use app::{AppConfig, ConfigError, DatabaseConfig, PasswordConfig, SecurityConfig};

// tests/integration/mod.rs
pub mod actions;
pub mod auth;
pub mod profile;

// src/repository/mod.rs
pub mod action_repository;
pub mod habit_store;
#[cfg(test)]
pub mod memory;
pub mod refresh_token_repository;
pub mod user_profile_repository;
pub mod user_repository;

pub use habit_store::{CompletionKey, CompletionScope, HabitStore, StoreError, StoreResult};

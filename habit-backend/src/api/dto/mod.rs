// src/api/dto/mod.rs
pub mod action_dto;
pub mod auth_dto;
pub mod profile_dto;
pub mod stats_dto;

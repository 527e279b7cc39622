// src/lib.rs

//! 習慣トラッキング API
//!
//! 起動は `AppContext::connect` で行い、`AppContext::router` が全エンドポイントを束ねる。

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod repository;
pub mod service;
pub mod types;
pub mod utils;

pub use app::{AppContext, StartupError};
pub use error::{AppError, AppResult};
pub use types::ApiResponse;

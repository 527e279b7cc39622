// src/types/mod.rs

//! HTTP レスポンスの共通形
pub mod response;

pub use response::{ApiResponse, ResponseMeta};

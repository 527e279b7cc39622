// src/logging/mod.rs

//! 構造化ログ
//!
//! `inject_request_context` がリクエストIDを決めて拡張に入れ、
//! `logging_middleware` がそのIDを付けたスパンの中でハンドラーを実行する。

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{Instrument, Span};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// クライアント指定のIDとして受け入れる最大長
const MAX_CLIENT_REQUEST_ID_LEN: usize = 128;

/// tracing-subscriber を初期化する。RUST_LOG があればそちらを優先。
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// リクエスト単位のログ文脈
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
    pub path: String,
    pub method: String,
}

impl RequestContext {
    /// `x-request-id` ヘッダーがあれば引き継ぎ、無ければ採番する
    pub fn from_request(req: &Request<Body>) -> Self {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.len() <= MAX_CLIENT_REQUEST_ID_LEN)
            .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);

        Self {
            request_id,
            path: req.uri().path().to_string(),
            method: req.method().to_string(),
        }
    }

    pub fn span(&self) -> Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
        )
    }
}

/// リクエストの開始と完了を記録する。完了ログの重さはステータスで変える。
pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let context = req
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(|| RequestContext::from_request(&req));
    let span = context.span();

    async move {
        let started = Instant::now();
        tracing::debug!("Request started");

        let response = next.run(req).await;

        let status = response.status().as_u16();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match status {
            500.. => tracing::error!(status, elapsed_ms, "Request failed"),
            400..=499 => tracing::warn!(status, elapsed_ms, "Request rejected"),
            _ => tracing::info!(status, elapsed_ms, "Request completed"),
        }

        response
    }
    .instrument(span)
    .await
}

/// `RequestContext` を拡張に入れ、同じIDをレスポンスヘッダーに返す
pub async fn inject_request_context(mut req: Request<Body>, next: Next) -> Response {
    let context = RequestContext::from_request(&req);
    let header_value = context.request_id.parse();

    req.extensions_mut().insert(context);
    let mut response = next.run(req).await;

    if let Ok(value) = header_value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

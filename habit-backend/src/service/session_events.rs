// src/service/session_events.rs

//! サインイン・サインアウトなどのセッション変化の通知
//!
//! 購読者は `subscribe` で `SessionSubscription` を受け取り、`recv` で順に
//! イベントを受け取る。購読者ごとに追跡するセッションは最大1つ。
//! `unsubscribe` またはドロップで購読を解除する。
//! `close` 以降は全購読の `recv` が `None` を返し、SSE ストリームが終わる。

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedIn { user_id: Uuid, email: String },
    SignedOut { user_id: Uuid },
    TokenRefreshed { user_id: Uuid },
}

impl SessionEvent {
    pub fn user_id(&self) -> Uuid {
        match self {
            Self::SignedIn { user_id, .. }
            | Self::SignedOut { user_id }
            | Self::TokenRefreshed { user_id } => *user_id,
        }
    }

    /// SSE のイベント名
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignedIn { .. } => "signed_in",
            Self::SignedOut { .. } => "signed_out",
            Self::TokenRefreshed { .. } => "token_refreshed",
        }
    }
}

pub struct SessionEventBus {
    sender: broadcast::Sender<SessionEvent>,
    closed: watch::Sender<bool>,
    active_subscriptions: Arc<AtomicUsize>,
}

impl Default for SessionEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl SessionEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        let (closed, _) = watch::channel(false);
        Self {
            sender,
            closed,
            active_subscriptions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// イベントを配信し、受け取った購読数を返す（購読者がいなければ 0）
    pub fn publish(&self, event: SessionEvent) -> usize {
        debug!(user_id = %event.user_id(), event = event.name(), "Publishing session event");
        self.sender.send(event).unwrap_or(0)
    }

    /// 購読を開始する
    ///
    /// `user_filter` を指定するとそのユーザーのイベントだけを受け取る。
    /// `current_session` は購読開始時点で有効なセッションのユーザー。
    pub fn subscribe(
        &self,
        user_filter: Option<Uuid>,
        current_session: Option<Uuid>,
    ) -> SessionSubscription {
        // 停止後の購読は最初から解除済み
        let receiver = if self.is_closed() {
            None
        } else {
            self.active_subscriptions.fetch_add(1, Ordering::SeqCst);
            Some(self.sender.subscribe())
        };

        SessionSubscription {
            receiver,
            closed: self.closed.subscribe(),
            user_filter,
            current_session,
            active_subscriptions: Arc::clone(&self.active_subscriptions),
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.active_subscriptions.load(Ordering::SeqCst)
    }

    /// 配信を止め、待機中の全購読を終わらせる。何度呼んでもよい。
    pub fn close(&self) {
        if !self.closed.send_replace(true) {
            info!(
                open_subscriptions = self.subscription_count(),
                "Session event bus closed"
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

pub struct SessionSubscription {
    receiver: Option<broadcast::Receiver<SessionEvent>>,
    closed: watch::Receiver<bool>,
    user_filter: Option<Uuid>,
    current_session: Option<Uuid>,
    active_subscriptions: Arc<AtomicUsize>,
}

impl SessionSubscription {
    /// 次のイベントを待つ。解除済み・バス停止後・バス破棄済みなら None。
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            let receiver = self.receiver.as_mut()?;
            let received = tokio::select! {
                biased;
                // 送信側が破棄された場合もここで終わる
                _ = self.closed.wait_for(|closed| *closed) => None,
                result = receiver.recv() => Some(result),
            };

            let Some(result) = received else {
                self.release();
                return None;
            };
            match result {
                Ok(event) => {
                    if self.user_filter.is_some_and(|u| u != event.user_id()) {
                        continue;
                    }
                    self.track(&event);
                    return Some(event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session subscriber lagged behind");
                }
                Err(RecvError::Closed) => {
                    self.release();
                    return None;
                }
            }
        }
    }

    fn track(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::SignedIn { user_id, .. } | SessionEvent::TokenRefreshed { user_id } => {
                self.current_session = Some(*user_id);
            }
            SessionEvent::SignedOut { user_id } => {
                if self.current_session == Some(*user_id) {
                    self.current_session = None;
                }
            }
        }
    }

    /// 現在追跡しているセッションのユーザー
    pub fn current_session(&self) -> Option<Uuid> {
        self.current_session
    }

    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.receiver.take().is_some() {
            self.active_subscriptions.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

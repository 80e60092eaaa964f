//! Transient status messages and the persistent error slot.
//!
//! A status message disappears on its own after the configured TTL. Every
//! `set_message` or `clear` starts a new generation and drops the previous
//! [`ExpiryTimer`], which aborts its task; the task additionally checks the
//! generation before clearing, so an expiry that already woke up cannot
//! erase a newer message.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::obs;

/// Severity of a status message, for the renderer to pick a style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Success,
    Info,
    Warning,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub level: MessageLevel,
}

/// Handle to a pending expiry; aborts the task when dropped.
#[derive(Debug)]
struct ExpiryTimer {
    handle: JoinHandle<()>,
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Debug, Default)]
struct BusState {
    message: Option<StatusMessage>,
    error: Option<String>,
    generation: u64,
    timer: Option<ExpiryTimer>,
}

/// Single current message with auto-expiry, plus a single current error.
#[derive(Debug, Clone)]
pub struct TransientMessageBus {
    inner: Arc<Mutex<BusState>>,
    ttl: Duration,
}

impl TransientMessageBus {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BusState::default())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Replace the current message and restart the expiry countdown.
    pub fn set_message(&self, text: impl Into<String>, level: MessageLevel) {
        let mut bus = lock(&self.inner);
        bus.generation += 1;
        bus.message = Some(StatusMessage {
            text: text.into(),
            level,
        });
        bus.timer = self.spawn_expiry(bus.generation);
    }

    pub fn message(&self) -> Option<StatusMessage> {
        lock(&self.inner).message.clone()
    }

    pub fn set_error(&self, text: impl Into<String>) {
        lock(&self.inner).error = Some(text.into());
    }

    pub fn clear_error(&self) {
        lock(&self.inner).error = None;
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.inner).error.clone()
    }

    /// Clear message and error and cancel any pending expiry.
    pub fn clear(&self) {
        let mut bus = lock(&self.inner);
        bus.generation += 1;
        bus.message = None;
        bus.error = None;
        bus.timer = None;
    }

    fn spawn_expiry(&self, generation: u64) -> Option<ExpiryTimer> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime; status message will not expire");
            return None;
        };
        let inner: Weak<Mutex<BusState>> = Arc::downgrade(&self.inner);
        let ttl = self.ttl;

        let handle = runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let mut bus = lock(&inner);
            if bus.generation == generation {
                bus.message = None;
                obs::emit_message_expired(generation);
            }
        });
        Some(ExpiryTimer { handle })
    }
}

fn lock(inner: &Mutex<BusState>) -> MutexGuard<'_, BusState> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

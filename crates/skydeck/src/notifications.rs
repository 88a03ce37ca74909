//! Toast notifications.
//!
//! A [`NotificationBus`] is owned by the console root and passed to every
//! component that needs to tell the user something. Views subscribe to
//! [`published`](NotificationBus::published) and
//! [`dismissed`](NotificationBus::dismissed) and render
//! [`active`](NotificationBus::active).
//!
//! The visible queue is bounded. Publishing past the bound drops the
//! oldest toast first, and that drop is reported as a dismissal.
//!
//! # Example
//!
//! ```
//! use skydeck::notifications::NotificationBus;
//!
//! let bus = NotificationBus::new(3);
//! bus.published.connect(|toast| println!("{}: {}", toast.level, toast.message));
//!
//! let id = bus.success("Cloud account connected");
//! bus.dismiss(id);
//! assert!(bus.active().is_empty());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use skydeck_core::Signal;
use skydeck_core::logging::targets;
use skydeck_net::NetworkError;

/// Default bound on visible toasts.
pub const DEFAULT_MAX_VISIBLE: usize = 5;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToastLevel {
    /// An action succeeded.
    Success,
    /// Neutral information.
    #[default]
    Info,
    /// Something needs attention but nothing failed.
    Warning,
    /// An action failed.
    Error,
}

impl fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// How long a toast stays up before the view dismisses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Use the view's default.
    #[default]
    Default,
    /// Stay until dismissed.
    Never,
    /// Dismiss after the given number of milliseconds.
    Milliseconds(u32),
}

/// Identifier of a published toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

/// A published toast.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub level: ToastLevel,
    pub message: String,
    pub timeout: Timeout,
    pub created_at: DateTime<Utc>,
}

/// Event bus for user-facing notifications.
///
/// # Signals
///
/// - `published(Toast)`: a toast was added
/// - `dismissed(ToastId)`: a toast was removed (by the user or by overflow)
pub struct NotificationBus {
    queue: Mutex<VecDeque<Toast>>,
    max_visible: usize,
    next_id: AtomicU64,

    /// Emitted when a toast is published.
    pub published: Signal<Toast>,
    /// Emitted when a toast leaves the visible queue.
    pub dismissed: Signal<ToastId>,
}

impl NotificationBus {
    /// Create a bus showing at most `max_visible` toasts (at least one).
    pub fn new(max_visible: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            max_visible: max_visible.max(1),
            next_id: AtomicU64::new(1),
            published: Signal::new(),
            dismissed: Signal::new(),
        }
    }

    /// Bound on visible toasts.
    pub fn max_visible(&self) -> usize {
        self.max_visible
    }

    /// Publish a toast with the default timeout.
    pub fn publish(&self, level: ToastLevel, message: impl Into<String>) -> ToastId {
        self.publish_with_timeout(level, message, Timeout::Default)
    }

    /// Publish a toast.
    pub fn publish_with_timeout(
        &self,
        level: ToastLevel,
        message: impl Into<String>,
        timeout: Timeout,
    ) -> ToastId {
        let toast = Toast {
            id: ToastId(self.next_id.fetch_add(1, Ordering::Relaxed)),
            level,
            message: message.into(),
            timeout,
            created_at: Utc::now(),
        };
        let id = toast.id;

        let dropped: Vec<ToastId> = {
            let mut queue = self.queue.lock();
            queue.push_back(toast.clone());
            let overflow = queue.len().saturating_sub(self.max_visible);
            queue.drain(..overflow).map(|t| t.id).collect()
        };

        tracing::debug!(target: targets::NOTIFY, %level, message = %toast.message, "toast published");
        self.published.emit(toast);
        for old in dropped {
            tracing::trace!(target: targets::NOTIFY, ?old, "toast dropped on overflow");
            self.dismissed.emit(old);
        }
        id
    }

    /// Publish a success toast.
    pub fn success(&self, message: impl Into<String>) -> ToastId {
        self.publish(ToastLevel::Success, message)
    }

    /// Publish an info toast.
    pub fn info(&self, message: impl Into<String>) -> ToastId {
        self.publish(ToastLevel::Info, message)
    }

    /// Publish a warning toast.
    pub fn warning(&self, message: impl Into<String>) -> ToastId {
        self.publish(ToastLevel::Warning, message)
    }

    /// Publish an error toast. Errors stay until dismissed.
    pub fn error(&self, message: impl Into<String>) -> ToastId {
        self.publish_with_timeout(ToastLevel::Error, message, Timeout::Never)
    }

    /// Publish the user-facing text of a backend error.
    pub fn network_error(&self, err: &NetworkError) -> ToastId {
        self.error(err.user_message())
    }

    /// Remove a toast. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let removed = {
            let mut queue = self.queue.lock();
            let before = queue.len();
            queue.retain(|t| t.id != id);
            queue.len() != before
        };
        if removed {
            self.dismissed.emit(id);
        }
        removed
    }

    /// Remove every toast.
    pub fn clear(&self) {
        let ids: Vec<ToastId> = self.queue.lock().drain(..).map(|t| t.id).collect();
        for id in ids {
            self.dismissed.emit(id);
        }
    }

    /// Visible toasts, oldest first.
    pub fn active(&self) -> Vec<Toast> {
        self.queue.lock().iter().cloned().collect()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VISIBLE)
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("visible", &self.queue.lock().len())
            .field("max_visible", &self.max_visible)
            .finish()
    }
}

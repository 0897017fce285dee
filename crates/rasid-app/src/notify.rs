//! # Notifier Collaborator
//!
//! Transient, severity-tagged notices for the user. The shell renders
//! them as dismissible toasts; this crate only emits.
//!
//! Every notice is fire-and-forget: storage failures after a memory
//! update, clamped cart lines, and successful mutations all surface
//! through this one seam, so a headless deployment can simply log them.

use std::sync::Mutex;

use tracing::{info, warn};

/// How the notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// A user-facing, auto-expiring notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// Sink for user notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Default sink: structured log lines.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Success => info!(message = %notice.message, "notice"),
            Severity::Error => warn!(message = %notice.message, "notice"),
        }
    }
}

/// Collects notices in memory. Useful for embedders that poll, and for
/// asserting on user-visible behavior in tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains and returns everything collected so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut self.notices.lock().expect("notice lock poisoned"))
    }

    /// Whether any collected notice contains the given fragment.
    pub fn saw(&self, fragment: &str) -> bool {
        self.notices
            .lock()
            .expect("notice lock poisoned")
            .iter()
            .any(|n| n.message.contains(fragment))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().expect("notice lock poisoned").push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_collects_and_drains() {
        let notifier = MemoryNotifier::new();
        notifier.notify(Notice::success("saved"));
        notifier.notify(Notice::error("failed"));

        assert!(notifier.saw("saved"));

        let notices = notifier.take();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[1].severity, Severity::Error);

        assert!(notifier.take().is_empty());
    }
}

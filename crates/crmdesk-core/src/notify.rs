// ── User-visible notifications ──
//
// View controllers publish the outcome of every load and mutation here.
// Rendering surfaces subscribe and show them however they like (toast,
// stderr line, status bar).

use strum::Display;
use tokio::sync::broadcast;
use tracing::{info, warn};

const NOTIFICATION_CHANNEL_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub message: String,
}

/// Broadcast hub for notifications. Cheap to clone; all clones share
/// subscribers. Publishing with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFICATION_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub(crate) fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "notify");
        self.publish(Level::Success, "Success", message);
    }

    pub(crate) fn error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "notify");
        self.publish(Level::Error, "Error", message);
    }

    fn publish(&self, level: Level, title: &str, message: String) {
        let _ = self.tx.send(Notification {
            level,
            title: title.to_owned(),
            message,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_receive_in_order() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.success("User created.");
        notifier.error("Could not delete the user.");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.level, Level::Success);
        assert_eq!(first.title, "Success");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.level, Level::Error);
        assert_eq!(second.message, "Could not delete the user.");
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let notifier = Notifier::new();
        notifier.success("nobody listening");
        assert_eq!(Level::Error.to_string(), "error");
    }
}

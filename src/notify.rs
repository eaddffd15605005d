//! Single-slot transient notifications.
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

pub const ADDED_MESSAGE: &str = "Artwork successfully added";
pub const DELETED_MESSAGE: &str = "Artwork successfully deleted";
pub const RATED_MESSAGE: &str = "Artwork successfully rated";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Notification {
    pub text: Option<String>,
    pub visible: bool,
    pub emitted_at: Option<DateTime<Utc>>,
}

/// Holds the one current message. A new emission replaces whatever is
/// showing; nothing is queued.
#[derive(Debug)]
pub struct Notifier {
    tx: watch::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Notification::default());
        Self { tx }
    }

    pub fn emit(&self, message: impl Into<String>) {
        let text = message.into();
        debug!(%text, "notification");
        self.tx.send_replace(Notification {
            text: Some(text),
            visible: true,
            emitted_at: Some(Utc::now()),
        });
    }

    /// Hide the current message. The text is kept.
    pub fn dismiss(&self) {
        self.tx.send_if_modified(|n| std::mem::replace(&mut n.visible, false));
    }

    /// The message to display, if one is visible.
    pub fn current(&self) -> Option<String> {
        let n = self.tx.borrow();
        if n.visible {
            n.text.clone()
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> Notification {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Notification> {
        self.tx.subscribe()
    }
}

//! Outgoing notifications and the messages the monitor sends.

use std::sync::Arc;

use async_trait::async_trait;

pub mod telegram;

pub use telegram::TelegramNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `text`, which may contain HTML bold markup.
    async fn send_message(&self, text: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        (**self).send_message(text).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Message rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Sends `text` and logs a failure instead of returning it.
pub async fn deliver<N: Notifier + ?Sized>(notifier: &N, text: &str) -> bool {
    match notifier.send_message(text).await {
        Ok(()) => true,
        Err(e) => {
            log::error!("Failed to send notification: {e}");
            false
        }
    }
}

pub fn stopped_message(name: &str, state: &str, dwell_minutes: i64) -> String {
    format!(
        "⚠️ Container '{}' has been in state <b>{}</b> for {} min!",
        escape_html(name),
        escape_html(state),
        dwell_minutes
    )
}

pub fn recovered_message(name: &str, state: &str) -> String {
    format!(
        "✅ Container '{}' is running again (state: <b>{}</b>)",
        escape_html(name),
        escape_html(state)
    )
}

pub fn startup_message<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let list = names
        .into_iter()
        .map(|name| format!("— {}", escape_html(name)))
        .collect::<Vec<_>>()
        .join("\n");
    format!("🚀 <b>Docker container monitor started!</b>\n\nMonitored containers:\n{list}")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

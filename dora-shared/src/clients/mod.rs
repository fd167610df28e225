pub mod db;
pub mod email;
pub mod sms;

use std::time::Duration;

/// Per-request timeout applied to every outbound notification send.
/// Sends are best-effort and never retried.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure of an outbound notification send.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider rejected the request: {0}")]
    Provider(String),
}

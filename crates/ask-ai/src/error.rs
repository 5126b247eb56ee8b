//! Error types for the query gateway.

use thiserror::Error;

/// Failures reaching the external AI webhook.
///
/// Query-level failures (rejected or failed SQL) are not errors here; they
/// are reported inside [`crate::executor::QueryResult`].
#[derive(Debug, Error)]
pub enum AskAiError {
    /// The webhook answered with a non-success HTTP status.
    #[error("AI service returned HTTP {0}")]
    WebhookUnavailable(u16),

    /// The webhook could not be reached (timeout, connection error).
    #[error("AI service unreachable: {0}")]
    WebhookUnreachable(String),
}

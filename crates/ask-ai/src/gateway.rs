//! Question-to-answer orchestration: webhook call, reply classification,
//! and conditional query execution.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::classifier::{self, Reply};
use crate::error::AskAiError;
use crate::executor::{self, QueryResult};
use crate::webhook::WebhookClient;

/// Shaped response for an answered question.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionResponse {
    pub success: bool,
    pub question: String,
    pub is_query: bool,
    pub answer: String,
    /// Present only when the reply classified as a query candidate.
    pub query_result: Option<QueryResult>,
    pub timestamp: String,
}

/// Submit a question to the webhook and shape the outcome.
///
/// A reply classified as SQL runs through the safety filter and executor;
/// its result (success or recovered failure) is embedded, and the answer
/// becomes a fixed summary message. A prose reply is returned verbatim.
/// Only webhook-level failures surface as errors.
pub async fn answer_question(
    webhook: &WebhookClient,
    pool: &SqlitePool,
    question: &str,
) -> Result<QuestionResponse, AskAiError> {
    let output = webhook.ask(question).await?;

    let (is_query, answer, query_result) = match classifier::classify(output.as_deref()) {
        Reply::DirectAnswer(text) => (false, text, None),
        Reply::QueryCandidate(text) => {
            let result = executor::execute_query(pool, &text).await;
            let answer = if result.success {
                format!(
                    "Data berhasil diambil. Ditemukan {} record yang sesuai dengan pertanyaan Anda.",
                    result.count.unwrap_or(0)
                )
            } else {
                format!(
                    "Maaf, terjadi kesalahan saat mengambil data: {}",
                    result.error.as_deref().unwrap_or("Unknown error")
                )
            };
            (true, answer, Some(result))
        }
    };

    tracing::info!(is_query, "question answered");

    Ok(QuestionResponse {
        success: true,
        question: question.to_string(),
        is_query,
        answer,
        query_result,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FALLBACK_ANSWER;
    use database::Database;

    // The webhook itself is external; these tests drive the classification
    // and execution half of the flow the way answer_question does.

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn query_reply_executes_and_summarizes() {
        let db = test_db().await;

        let reply = classifier::classify(Some(
            "SELECT COUNT(*) as count FROM imds WHERE deleted_at IS NULL",
        ));
        let Reply::QueryCandidate(text) = reply else {
            panic!("expected query candidate");
        };

        let result = executor::execute_query(db.pool(), &text).await;
        assert!(result.success);
        assert_eq!(result.count, Some(1));
    }

    #[tokio::test]
    async fn prose_reply_passes_through() {
        let reply = classifier::classify(Some("Total records: 42"));
        assert_eq!(reply, Reply::DirectAnswer("Total records: 42".to_string()));
    }

    #[test]
    fn missing_output_uses_fallback() {
        let reply = classifier::classify(None);
        assert_eq!(reply, Reply::DirectAnswer(FALLBACK_ANSWER.to_string()));
    }
}

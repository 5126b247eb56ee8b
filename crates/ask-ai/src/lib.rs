//! Natural-language query gateway for the IMD records service.
//!
//! Accepts a free-text question, forwards it (plus a fixed schema context)
//! to an external AI webhook, and inspects the reply: text containing both
//! SELECT and FROM is treated as generated SQL, validated by a safety
//! filter, and executed read-only against the records store; anything else
//! is returned verbatim as a direct answer. A second entry point accepts a
//! literal query string and runs it through the same filter and executor.
//!
//! The safety filter permits only statements whose trimmed, uppercased
//! form starts with SELECT and contains none of a fixed keyword denylist.
//! Rejections are final; a rejected query never reaches the store.

pub mod classifier;
pub mod error;
pub mod executor;
pub mod filter;
pub mod gateway;
pub mod schema;
pub mod webhook;

pub use classifier::{classify, Reply, FALLBACK_ANSWER};
pub use error::AskAiError;
pub use executor::{execute_query, QueryResult};
pub use filter::{approve_query, FilterError};
pub use gateway::{answer_question, QuestionResponse};
pub use schema::{schema_info, SchemaInfo, SAMPLE_QUESTIONS};
pub use webhook::{WebhookClient, SCHEMA_CONTEXT};

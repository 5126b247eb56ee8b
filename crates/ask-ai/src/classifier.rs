//! Classification of webhook replies into direct answers or query
//! candidates.
//!
//! The heuristic is a substring test: a reply containing both SELECT and
//! FROM (any case, any position) is treated as generated SQL. Prose that
//! happens to mention both words is therefore misclassified and will
//! usually bounce off the safety filter with a NotSelect error instead of
//! reaching the user as an answer. Inherited behavior, kept as-is; see
//! DESIGN.md.

/// Answer used when the webhook reply is empty or missing.
pub const FALLBACK_ANSWER: &str = "Respons AI tidak dapat diparsing";

/// A classified webhook reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Prose to return to the caller verbatim.
    DirectAnswer(String),
    /// Text to run through the safety filter and executor.
    QueryCandidate(String),
}

/// Classify a webhook reply. `None` and the empty string both fall back to
/// [`FALLBACK_ANSWER`].
pub fn classify(output: Option<&str>) -> Reply {
    let text = match output {
        Some(text) if !text.is_empty() => text,
        _ => return Reply::DirectAnswer(FALLBACK_ANSWER.to_string()),
    };

    let upper = text.to_uppercase();
    if upper.contains("SELECT") && upper.contains("FROM") {
        Reply::QueryCandidate(text.to_string())
    } else {
        Reply::DirectAnswer(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_output_falls_back() {
        assert_eq!(classify(None), Reply::DirectAnswer(FALLBACK_ANSWER.to_string()));
        assert_eq!(classify(Some("")), Reply::DirectAnswer(FALLBACK_ANSWER.to_string()));
    }

    #[test]
    fn select_and_from_together_make_a_query_candidate() {
        assert_eq!(
            classify(Some("SELECT 1 FROM dual")),
            Reply::QueryCandidate("SELECT 1 FROM dual".to_string())
        );
        // Case-insensitive, order-independent.
        assert_eq!(
            classify(Some("from x select y")),
            Reply::QueryCandidate("from x select y".to_string())
        );
    }

    #[test]
    fn prose_without_both_keywords_is_a_direct_answer() {
        assert_eq!(
            classify(Some("Total records: 42")),
            Reply::DirectAnswer("Total records: 42".to_string())
        );
        assert_eq!(
            classify(Some("Please select an option")),
            Reply::DirectAnswer("Please select an option".to_string())
        );
    }

    #[test]
    fn prose_mentioning_both_keywords_is_misclassified() {
        // Known inherited ambiguity: this is prose, but it classifies as a
        // query candidate and will later fail the SELECT-prefix check.
        assert_eq!(
            classify(Some("I selected data from the dashboard")),
            Reply::QueryCandidate("I selected data from the dashboard".to_string())
        );
    }
}

//! Safety filter deciding whether a text string may run as a read-only
//! query against the records store.
//!
//! The check is deliberately string-based, not a SQL parse: trim and
//! uppercase, require a SELECT prefix, then scan for a fixed keyword
//! denylist as plain substrings. This over-rejects (a SELECT whose text
//! merely contains "DELETE" anywhere fails) and under-rejects (keywords
//! hidden in comments or multi-statement batches pass the prefix check);
//! both edges are documented compatibility behavior, see DESIGN.md.

use thiserror::Error;

/// Keywords that must not appear anywhere in a candidate query, checked in
/// this order; the first match is the one reported.
pub const DENYLIST: [&str; 9] = [
    "DROP", "UPDATE", "INSERT", "ALTER", "CREATE", "TRUNCATE", "EXEC", "EXECUTE", "DELETE",
];

/// Safety filter rejection. Display strings are the user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Query tidak boleh kosong")]
    Empty,

    #[error("Hanya query SELECT yang diizinkan untuk keamanan")]
    NotSelect,

    #[error("Query mengandung keyword berbahaya: {0}")]
    Forbidden(&'static str),
}

/// Validate a candidate query, returning the original string unchanged on
/// approval. Pure; never touches the store.
pub fn approve_query(query: &str) -> Result<&str, FilterError> {
    if query.is_empty() {
        return Err(FilterError::Empty);
    }

    let normalized = query.trim().to_uppercase();
    if !normalized.starts_with("SELECT") {
        return Err(FilterError::NotSelect);
    }

    for keyword in DENYLIST {
        if normalized.contains(keyword) {
            return Err(FilterError::Forbidden(keyword));
        }
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_rejected() {
        assert_eq!(approve_query(""), Err(FilterError::Empty));
    }

    #[test]
    fn non_select_statements_are_rejected() {
        for query in [
            "UPDATE imds SET nama_pasien = 'x'",
            "DELETE FROM imds",
            "  with cte as (select 1) select * from cte",
            "PRAGMA table_info(imds)",
            "   ",
        ] {
            let result = approve_query(query);
            assert!(
                matches!(result, Err(FilterError::NotSelect | FilterError::Forbidden(_))),
                "{query:?} -> {result:?}"
            );
        }
        // Mutating statements fail the prefix check before the denylist.
        assert_eq!(
            approve_query("update imds set nama_pasien = 'x'"),
            Err(FilterError::NotSelect)
        );
    }

    #[test]
    fn select_prefix_is_case_insensitive_and_trimmed() {
        assert!(approve_query("  select * from imds  ").is_ok());
        assert!(approve_query("SELECT 1 FROM dual").is_ok());
    }

    #[test]
    fn denylisted_keywords_are_rejected_even_inside_a_select() {
        assert_eq!(
            approve_query("SELECT * FROM t WHERE note = 'DELETE ME'"),
            Err(FilterError::Forbidden("DELETE"))
        );
        // Substring match, not token match.
        assert_eq!(
            approve_query("SELECT * FROM deleted_items"),
            Err(FilterError::Forbidden("DELETE"))
        );
        // First keyword in denylist order wins.
        assert_eq!(
            approve_query("SELECT 'update' , 'drop' FROM imds"),
            Err(FilterError::Forbidden("DROP"))
        );
    }

    #[test]
    fn approval_returns_the_original_string() {
        let query = "  SELECT no_rm FROM imds  ";
        assert_eq!(approve_query(query), Ok(query));
    }

    #[test]
    fn rejection_messages_are_user_facing() {
        assert_eq!(
            FilterError::Forbidden("UPDATE").to_string(),
            "Query mengandung keyword berbahaya: UPDATE"
        );
        assert_eq!(
            FilterError::NotSelect.to_string(),
            "Hanya query SELECT yang diizinkan untuk keamanan"
        );
    }
}

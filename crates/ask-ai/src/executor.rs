//! Read-only query execution and result shaping.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};

use crate::filter::{self, FilterError};

/// Outcome of running a candidate query: either rows plus a count, or a
/// recovered error. Never persisted; returned once to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// A safety-filter rejection. The query is not echoed back.
    fn rejected(err: FilterError) -> Self {
        Self {
            success: false,
            data: None,
            count: None,
            query: None,
            error: Some(err.to_string()),
        }
    }

    /// Whether the failure came from the safety filter (never executed)
    /// rather than from the store.
    pub fn is_rejection(&self) -> bool {
        !self.success && self.query.is_none()
    }
}

/// Run a candidate query through the safety filter and, if approved,
/// against the store. All failures are recovered into the result shape;
/// this function never returns an error.
pub async fn execute_query(pool: &SqlitePool, query: &str) -> QueryResult {
    let approved = match filter::approve_query(query) {
        Ok(q) => q,
        Err(err) => {
            tracing::warn!(%err, "query rejected by safety filter");
            return QueryResult::rejected(err);
        }
    };

    match sqlx::query(approved).fetch_all(pool).await {
        Ok(rows) => {
            let data: Vec<Value> = rows.iter().map(row_to_json).collect();
            tracing::debug!(rows = data.len(), "query executed");
            QueryResult {
                success: true,
                count: Some(data.len()),
                data: Some(data),
                query: Some(query.to_string()),
                error: None,
            }
        }
        Err(err) => {
            tracing::warn!(%err, "query execution failed");
            QueryResult {
                success: false,
                data: None,
                count: None,
                query: Some(query.to_string()),
                error: Some(format!("Error executing query: {err}")),
            }
        }
    }
}

/// Decode a row into a JSON object keyed by column name, preserving the
/// result set's column order.
fn row_to_json(row: &SqliteRow) -> Value {
    let mut object = Map::new();
    for column in row.columns() {
        object.insert(column.name().to_string(), decode_column(row, column.ordinal()));
    }
    Value::Object(object)
}

/// Decode one column by its SQLite storage class. Anything that fails to
/// decode degrades to null rather than failing the whole result.
fn decode_column(row: &SqliteRow, idx: usize) -> Value {
    let raw = match row.try_get_raw(idx) {
        Ok(raw) => raw,
        Err(_) => return Value::Null,
    };
    if raw.is_null() {
        return Value::Null;
    }

    match raw.type_info().name() {
        "INTEGER" | "BOOLEAN" => row
            .try_get::<i64, _>(idx)
            .map(Value::from)
            .unwrap_or(Value::Null),
        "REAL" => row
            .try_get::<f64, _>(idx)
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(idx)
            .map(|bytes| {
                Value::String(bytes.iter().map(|b| format!("{b:02x}")).collect())
            })
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<String, _>(idx)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use database::models::{CaraPersalinan, ImdInput, WaktuImd};
    use database::{imd, Database};
    use serde_json::json;

    async fn seeded_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        for (i, cara) in [CaraPersalinan::Sc, CaraPersalinan::Spontan, CaraPersalinan::Spontan]
            .iter()
            .enumerate()
        {
            let input = ImdInput {
                nama_pasien: format!("Pasien {i}"),
                alamat: "Jl. Mawar".to_string(),
                no_rm: format!("RM{i:03}"),
                tanggal_lahir: NaiveDate::from_ymd_opt(1995, 1, 1).unwrap(),
                cara_persalinan: *cara,
                tanggal_imd: NaiveDate::from_ymd_opt(2025, 8, 11).unwrap(),
                waktu_imd: WaktuImd::Menit30,
                nama_petugas: "Dr. Ahmad".to_string(),
            };
            imd::create_imd(db.pool(), &format!("imd-{i}"), &input).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn approved_count_query_returns_rows() {
        let db = seeded_db().await;

        let query = "SELECT COUNT(*) as count FROM imds WHERE deleted_at IS NULL";
        let result = execute_query(db.pool(), query).await;

        assert!(result.success);
        assert_eq!(result.count, Some(1));
        assert_eq!(result.data, Some(vec![json!({"count": 3})]));
        assert_eq!(result.query.as_deref(), Some(query));
    }

    #[tokio::test]
    async fn group_by_preserves_column_names() {
        let db = seeded_db().await;

        let result = execute_query(
            db.pool(),
            "SELECT cara_persalinan, COUNT(*) as jumlah FROM imds \
             GROUP BY cara_persalinan ORDER BY cara_persalinan",
        )
        .await;

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["cara_persalinan"], json!("SC"));
        assert_eq!(data[0]["jumlah"], json!(1));
        assert_eq!(data[1]["jumlah"], json!(2));
    }

    #[tokio::test]
    async fn rejected_query_never_reaches_the_store() {
        let db = seeded_db().await;

        let result = execute_query(db.pool(), "UPDATE imds SET nama_pasien = 'x'").await;
        assert!(!result.success);
        assert!(result.is_rejection());
        assert_eq!(
            result.error.as_deref(),
            Some("Hanya query SELECT yang diizinkan untuk keamanan")
        );

        // The table is untouched.
        let check = execute_query(
            db.pool(),
            "SELECT COUNT(*) as n FROM imds WHERE nama_pasien = 'x'",
        )
        .await;
        assert_eq!(check.data, Some(vec![json!({"n": 0})]));
    }

    #[tokio::test]
    async fn empty_query_is_a_rejection() {
        let db = seeded_db().await;

        let result = execute_query(db.pool(), "").await;
        assert!(result.is_rejection());
        assert_eq!(result.error.as_deref(), Some("Query tidak boleh kosong"));
    }

    #[tokio::test]
    async fn driver_failure_is_recovered() {
        let db = seeded_db().await;

        let query = "SELECT missing_column FROM imds";
        let result = execute_query(db.pool(), query).await;

        assert!(!result.success);
        assert!(!result.is_rejection());
        assert!(result.error.unwrap().starts_with("Error executing query:"));
        assert_eq!(result.query.as_deref(), Some(query));
    }

    #[tokio::test]
    async fn null_and_real_values_decode() {
        let db = seeded_db().await;

        let result = execute_query(
            db.pool(),
            "SELECT deleted_at, AVG(CAST(waktu_imd AS INTEGER)) as rata FROM imds",
        )
        .await;

        assert!(result.success);
        let row = &result.data.unwrap()[0];
        assert_eq!(row["deleted_at"], Value::Null);
        assert_eq!(row["rata"], json!(30.0));
    }
}

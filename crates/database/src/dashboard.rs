//! Aggregate queries backing the analytics dashboard.
//!
//! Every query is scoped by the year of `tanggal_imd`, optionally narrowed
//! to a month and a delivery method, and excludes soft-deleted rows.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::Result;
use crate::models::{CaraPersalinan, Imd};

/// Dashboard-level filter set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardFilters {
    pub year: i32,
    pub month: Option<u32>,
    pub cara_persalinan: Option<CaraPersalinan>,
}

/// Age in whole years between tanggal_lahir and tanggal_imd, in SQL.
/// The comparison term subtracts one year when the birthday has not yet
/// passed in the IMD year.
const AGE_EXPR: &str = "(CAST(strftime('%Y', tanggal_imd) AS INTEGER) \
     - CAST(strftime('%Y', tanggal_lahir) AS INTEGER) \
     - (strftime('%m-%d', tanggal_imd) < strftime('%m-%d', tanggal_lahir)))";

fn push_scope(builder: &mut QueryBuilder<'_, Sqlite>, filters: &DashboardFilters) {
    builder.push(" WHERE deleted_at IS NULL AND strftime('%Y', tanggal_imd) = ");
    builder.push_bind(format!("{:04}", filters.year));

    if let Some(month) = filters.month {
        builder.push(" AND strftime('%m', tanggal_imd) = ");
        builder.push_bind(format!("{:02}", month));
    }

    if let Some(cara) = filters.cara_persalinan {
        builder.push(" AND cara_persalinan = ");
        builder.push_bind(cara.as_str());
    }
}

/// Total records in scope.
pub async fn count_total(pool: &SqlitePool, filters: &DashboardFilters) -> Result<i64> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM imds");
    push_scope(&mut builder, filters);

    let count: i64 = builder.build_query_scalar().fetch_one(pool).await?;
    Ok(count)
}

/// Record counts grouped by delivery method. The delivery-method filter is
/// deliberately not applied here so the chart always shows both slices.
pub async fn count_by_cara_persalinan(
    pool: &SqlitePool,
    filters: &DashboardFilters,
) -> Result<Vec<(String, i64)>> {
    let unfiltered = DashboardFilters {
        cara_persalinan: None,
        ..*filters
    };

    let mut builder =
        QueryBuilder::<Sqlite>::new("SELECT cara_persalinan, COUNT(*) FROM imds");
    push_scope(&mut builder, &unfiltered);
    builder.push(" GROUP BY cara_persalinan");

    let rows = builder
        .build_query_as::<(String, i64)>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Record counts grouped by IMD duration.
pub async fn count_by_waktu(
    pool: &SqlitePool,
    filters: &DashboardFilters,
) -> Result<Vec<(String, i64)>> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT waktu_imd, COUNT(*) FROM imds");
    push_scope(&mut builder, filters);
    builder.push(" GROUP BY waktu_imd");

    let rows = builder
        .build_query_as::<(String, i64)>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Average IMD duration in minutes. SQLite's CAST parses the leading
/// digits of the stored "NN menit" form. Returns 0.0 when no rows match.
pub async fn avg_duration_minutes(pool: &SqlitePool, filters: &DashboardFilters) -> Result<f64> {
    let mut builder =
        QueryBuilder::<Sqlite>::new("SELECT AVG(CAST(waktu_imd AS INTEGER)) FROM imds");
    push_scope(&mut builder, filters);

    let avg: Option<f64> = builder.build_query_scalar().fetch_one(pool).await?;
    Ok(avg.unwrap_or(0.0))
}

/// Record count for a single calendar month, narrowed by the delivery
/// method filter only. Feeds the 12-month trend chart.
pub async fn count_for_month(
    pool: &SqlitePool,
    year: i32,
    month: u32,
    cara_persalinan: Option<CaraPersalinan>,
) -> Result<i64> {
    let filters = DashboardFilters {
        year,
        month: Some(month),
        cara_persalinan,
    };
    count_total(pool, &filters).await
}

/// Counts bucketed by the mother's age at the IMD date.
pub async fn age_distribution(
    pool: &SqlitePool,
    filters: &DashboardFilters,
) -> Result<Vec<(String, i64)>> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT CASE \
            WHEN {age} < 20 THEN '< 20 tahun' \
            WHEN {age} BETWEEN 20 AND 25 THEN '20-25 tahun' \
            WHEN {age} BETWEEN 26 AND 30 THEN '26-30 tahun' \
            WHEN {age} BETWEEN 31 AND 35 THEN '31-35 tahun' \
            WHEN {age} BETWEEN 36 AND 40 THEN '36-40 tahun' \
            ELSE '> 40 tahun' \
         END AS age_group, COUNT(*) FROM imds",
        age = AGE_EXPR
    ));
    push_scope(&mut builder, filters);
    builder.push(" GROUP BY age_group");

    let rows = builder
        .build_query_as::<(String, i64)>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// The latest records in scope by IMD date.
pub async fn recent_imds(
    pool: &SqlitePool,
    filters: &DashboardFilters,
    limit: i64,
) -> Result<Vec<Imd>> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, nama_pasien, alamat, no_rm, tanggal_lahir, cara_persalinan, \
         tanggal_imd, waktu_imd, nama_petugas, created_at, updated_at, deleted_at \
         FROM imds",
    );
    push_scope(&mut builder, filters);
    builder.push(" ORDER BY tanggal_imd DESC LIMIT ");
    builder.push_bind(limit);

    let imds = builder.build_query_as::<Imd>().fetch_all(pool).await?;
    Ok(imds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImdInput, WaktuImd};
    use crate::{imd, Database};
    use chrono::NaiveDate;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn seed(db: &Database) {
        let rows = [
            // (no_rm, cara, waktu, tanggal_imd, tanggal_lahir)
            ("RM001", CaraPersalinan::Sc, WaktuImd::Menit30, "2025-03-10", "1998-05-01"),
            ("RM002", CaraPersalinan::Spontan, WaktuImd::Menit60, "2025-03-20", "1990-01-15"),
            ("RM003", CaraPersalinan::Spontan, WaktuImd::Menit30, "2025-07-01", "2003-09-30"),
            ("RM004", CaraPersalinan::Sc, WaktuImd::Menit15, "2024-12-05", "1985-02-28"),
        ];

        for (i, (no_rm, cara, waktu, tanggal_imd, lahir)) in rows.iter().enumerate() {
            let input = ImdInput {
                nama_pasien: format!("Pasien {}", i),
                alamat: "Jl. Mawar".to_string(),
                no_rm: no_rm.to_string(),
                tanggal_lahir: lahir.parse::<NaiveDate>().unwrap(),
                cara_persalinan: *cara,
                tanggal_imd: tanggal_imd.parse::<NaiveDate>().unwrap(),
                waktu_imd: *waktu,
                nama_petugas: "Dr. Ahmad".to_string(),
            };
            imd::create_imd(db.pool(), &format!("imd-{}", i), &input).await.unwrap();
        }
    }

    #[tokio::test]
    async fn counts_are_scoped_by_year_and_month() {
        let db = test_db().await;
        seed(&db).await;

        let year_2025 = DashboardFilters { year: 2025, ..Default::default() };
        assert_eq!(count_total(db.pool(), &year_2025).await.unwrap(), 3);

        let march = DashboardFilters { year: 2025, month: Some(3), ..Default::default() };
        assert_eq!(count_total(db.pool(), &march).await.unwrap(), 2);

        let sc_only = DashboardFilters {
            year: 2025,
            month: None,
            cara_persalinan: Some(CaraPersalinan::Sc),
        };
        assert_eq!(count_total(db.pool(), &sc_only).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delivery_method_chart_ignores_method_filter() {
        let db = test_db().await;
        seed(&db).await;

        let filters = DashboardFilters {
            year: 2025,
            month: None,
            cara_persalinan: Some(CaraPersalinan::Sc),
        };
        let by_cara = count_by_cara_persalinan(db.pool(), &filters).await.unwrap();
        assert_eq!(by_cara.len(), 2);
    }

    #[tokio::test]
    async fn average_duration_parses_stored_form() {
        let db = test_db().await;
        seed(&db).await;

        let filters = DashboardFilters { year: 2025, ..Default::default() };
        let avg = avg_duration_minutes(db.pool(), &filters).await.unwrap();
        assert!((avg - 40.0).abs() < 1e-9, "got {avg}");

        let empty = DashboardFilters { year: 2010, ..Default::default() };
        assert_eq!(avg_duration_minutes(db.pool(), &empty).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn age_buckets_use_age_at_imd_date() {
        let db = test_db().await;
        seed(&db).await;

        let filters = DashboardFilters { year: 2025, ..Default::default() };
        let dist = age_distribution(db.pool(), &filters).await.unwrap();
        let total: i64 = dist.iter().map(|(_, c)| c).sum();
        assert_eq!(total, 3);
        // RM003: born 2003-09-30, IMD 2025-07-01 -> 21 years.
        assert!(dist.iter().any(|(name, _)| name == "20-25 tahun"));
    }

    #[tokio::test]
    async fn recent_orders_by_imd_date() {
        let db = test_db().await;
        seed(&db).await;

        let filters = DashboardFilters { year: 2025, ..Default::default() };
        let recent = recent_imds(db.pool(), &filters, 5).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].no_rm, "RM003");
    }
}

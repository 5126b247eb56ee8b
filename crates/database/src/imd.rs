//! IMD record CRUD operations.
//!
//! Records are soft-deleted: `deleted_at` is set instead of removing the
//! row, and every read here excludes soft-deleted rows.

use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{CaraPersalinan, Imd, ImdInput, WaktuImd};

/// Filters shared by the list, count, and export queries.
#[derive(Debug, Clone, Default)]
pub struct ImdFilters {
    /// Matches against nama_pasien, no_rm, or nama_petugas.
    pub search: Option<String>,
    pub cara_persalinan: Option<CaraPersalinan>,
    pub waktu_imd: Option<WaktuImd>,
    pub tanggal_lahir_dari: Option<NaiveDate>,
    pub tanggal_lahir_sampai: Option<NaiveDate>,
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &ImdFilters) {
    builder.push(" WHERE deleted_at IS NULL");

    if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        builder.push(" AND (nama_pasien LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR no_rm LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR nama_petugas LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    if let Some(cara) = filters.cara_persalinan {
        builder.push(" AND cara_persalinan = ");
        builder.push_bind(cara.as_str());
    }

    if let Some(waktu) = filters.waktu_imd {
        builder.push(" AND waktu_imd = ");
        builder.push_bind(waktu.as_str());
    }

    if let Some(dari) = filters.tanggal_lahir_dari {
        builder.push(" AND tanggal_lahir >= ");
        builder.push_bind(dari);
    }

    if let Some(sampai) = filters.tanggal_lahir_sampai {
        builder.push(" AND tanggal_lahir <= ");
        builder.push_bind(sampai);
    }
}

/// Create an IMD record with the given id.
pub async fn create_imd(pool: &SqlitePool, id: &str, input: &ImdInput) -> Result<Imd> {
    let now = Utc::now().naive_utc();

    sqlx::query(
        r#"
        INSERT INTO imds (
            id, nama_pasien, alamat, no_rm, tanggal_lahir, cara_persalinan,
            tanggal_imd, waktu_imd, nama_petugas, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&input.nama_pasien)
    .bind(&input.alamat)
    .bind(&input.no_rm)
    .bind(input.tanggal_lahir)
    .bind(input.cara_persalinan.as_str())
    .bind(input.tanggal_imd)
    .bind(input.waktu_imd.as_str())
    .bind(&input.nama_petugas)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Imd",
                    id: input.no_rm.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    get_imd(pool, id).await
}

/// Fetch a single record by id, excluding soft-deleted rows.
pub async fn get_imd(pool: &SqlitePool, id: &str) -> Result<Imd> {
    let imd = sqlx::query_as::<_, Imd>(
        r#"
        SELECT id, nama_pasien, alamat, no_rm, tanggal_lahir, cara_persalinan,
               tanggal_imd, waktu_imd, nama_petugas, created_at, updated_at, deleted_at
        FROM imds
        WHERE id = ? AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    imd.ok_or_else(|| DatabaseError::NotFound {
        entity: "Imd",
        id: id.to_string(),
    })
}

/// Update all mutable fields of a record.
pub async fn update_imd(pool: &SqlitePool, id: &str, input: &ImdInput) -> Result<Imd> {
    let result = sqlx::query(
        r#"
        UPDATE imds
        SET nama_pasien = ?, alamat = ?, no_rm = ?, tanggal_lahir = ?,
            cara_persalinan = ?, tanggal_imd = ?, waktu_imd = ?,
            nama_petugas = ?, updated_at = ?
        WHERE id = ? AND deleted_at IS NULL
        "#,
    )
    .bind(&input.nama_pasien)
    .bind(&input.alamat)
    .bind(&input.no_rm)
    .bind(input.tanggal_lahir)
    .bind(input.cara_persalinan.as_str())
    .bind(input.tanggal_imd)
    .bind(input.waktu_imd.as_str())
    .bind(&input.nama_petugas)
    .bind(Utc::now().naive_utc())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Imd",
                    id: input.no_rm.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Imd",
            id: id.to_string(),
        });
    }

    get_imd(pool, id).await
}

/// Soft-delete a record by setting its deleted_at timestamp.
pub async fn soft_delete_imd(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE imds
        SET deleted_at = ?
        WHERE id = ? AND deleted_at IS NULL
        "#,
    )
    .bind(Utc::now().naive_utc())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Imd",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List records matching the filters, newest first, with offset pagination.
pub async fn list_imds(
    pool: &SqlitePool,
    filters: &ImdFilters,
    per_page: i64,
    offset: i64,
) -> Result<Vec<Imd>> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, nama_pasien, alamat, no_rm, tanggal_lahir, cara_persalinan, \
         tanggal_imd, waktu_imd, nama_petugas, created_at, updated_at, deleted_at \
         FROM imds",
    );
    push_filters(&mut builder, filters);
    builder.push(" ORDER BY created_at DESC LIMIT ");
    builder.push_bind(per_page);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    let imds = builder.build_query_as::<Imd>().fetch_all(pool).await?;
    Ok(imds)
}

/// Count records matching the filters.
pub async fn count_imds(pool: &SqlitePool, filters: &ImdFilters) -> Result<i64> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM imds");
    push_filters(&mut builder, filters);

    let count: i64 = builder.build_query_scalar().fetch_one(pool).await?;
    Ok(count)
}

/// All records matching the filters, newest first, for the Excel export.
pub async fn list_imds_for_export(pool: &SqlitePool, filters: &ImdFilters) -> Result<Vec<Imd>> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, nama_pasien, alamat, no_rm, tanggal_lahir, cara_persalinan, \
         tanggal_imd, waktu_imd, nama_petugas, created_at, updated_at, deleted_at \
         FROM imds",
    );
    push_filters(&mut builder, filters);
    builder.push(" ORDER BY created_at DESC");

    let imds = builder.build_query_as::<Imd>().fetch_all(pool).await?;
    Ok(imds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn sample_input(no_rm: &str) -> ImdInput {
        ImdInput {
            nama_pasien: "Siti Nurhaliza".to_string(),
            alamat: "Jl. Melati No. 5".to_string(),
            no_rm: no_rm.to_string(),
            tanggal_lahir: NaiveDate::from_ymd_opt(1995, 3, 14).unwrap(),
            cara_persalinan: CaraPersalinan::Sc,
            tanggal_imd: NaiveDate::from_ymd_opt(2025, 8, 11).unwrap(),
            waktu_imd: WaktuImd::Menit30,
            nama_petugas: "Dr. Ahmad".to_string(),
        }
    }

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn create_and_get() {
        let db = test_db().await;

        let imd = create_imd(db.pool(), "imd-1", &sample_input("RM001")).await.unwrap();
        assert_eq!(imd.nama_pasien, "Siti Nurhaliza");
        assert_eq!(imd.cara_persalinan, CaraPersalinan::Sc);
        assert_eq!(imd.waktu_imd, WaktuImd::Menit30);
        assert!(imd.deleted_at.is_none());

        let fetched = get_imd(db.pool(), "imd-1").await.unwrap();
        assert_eq!(fetched.no_rm, "RM001");
    }

    #[tokio::test]
    async fn duplicate_no_rm_is_rejected() {
        let db = test_db().await;

        create_imd(db.pool(), "imd-1", &sample_input("RM001")).await.unwrap();
        let result = create_imd(db.pool(), "imd-2", &sample_input("RM001")).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn update_changes_fields() {
        let db = test_db().await;

        create_imd(db.pool(), "imd-1", &sample_input("RM001")).await.unwrap();
        let mut input = sample_input("RM001");
        input.waktu_imd = WaktuImd::Menit60;
        input.nama_petugas = "Bidan Rina".to_string();

        let updated = update_imd(db.pool(), "imd-1", &input).await.unwrap();
        assert_eq!(updated.waktu_imd, WaktuImd::Menit60);
        assert_eq!(updated.nama_petugas, "Bidan Rina");
    }

    #[tokio::test]
    async fn soft_delete_hides_record() {
        let db = test_db().await;

        create_imd(db.pool(), "imd-1", &sample_input("RM001")).await.unwrap();
        soft_delete_imd(db.pool(), "imd-1").await.unwrap();

        let result = get_imd(db.pool(), "imd-1").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        let count = count_imds(db.pool(), &ImdFilters::default()).await.unwrap();
        assert_eq!(count, 0);

        // Deleting twice reports NotFound.
        let again = soft_delete_imd(db.pool(), "imd-1").await;
        assert!(matches!(again, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_applies_filters_and_pagination() {
        let db = test_db().await;

        for i in 0..5 {
            let mut input = sample_input(&format!("RM{:03}", i));
            if i % 2 == 0 {
                input.cara_persalinan = CaraPersalinan::Spontan;
            }
            create_imd(db.pool(), &format!("imd-{}", i), &input).await.unwrap();
        }

        let filters = ImdFilters {
            cara_persalinan: Some(CaraPersalinan::Spontan),
            ..Default::default()
        };
        assert_eq!(count_imds(db.pool(), &filters).await.unwrap(), 3);

        let page = list_imds(db.pool(), &filters, 2, 0).await.unwrap();
        assert_eq!(page.len(), 2);

        let rest = list_imds(db.pool(), &filters, 2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
    }

    #[tokio::test]
    async fn search_matches_patient_rm_and_staff() {
        let db = test_db().await;

        let mut input = sample_input("RM777");
        input.nama_petugas = "Bidan Rina".to_string();
        create_imd(db.pool(), "imd-1", &input).await.unwrap();
        create_imd(db.pool(), "imd-2", &sample_input("RM002")).await.unwrap();

        for term in ["Rina", "RM777", "Siti"] {
            let filters = ImdFilters {
                search: Some(term.to_string()),
                ..Default::default()
            };
            let found = list_imds(db.pool(), &filters, 10, 0).await.unwrap();
            assert!(!found.is_empty(), "no match for {term}");
        }
    }
}

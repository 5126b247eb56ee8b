//! IMD record CRUD routes and the Excel export.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use database::models::{CaraPersalinan, Imd, ImdInput, WaktuImd};
use database::ImdFilters;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, FieldErrors, Result};
use crate::export;
use crate::state::AppState;

/// JSON shape for a record, matching the original API resource: dates in
/// ISO form plus a derived `umur` (the mother's current age).
#[derive(Serialize)]
pub struct ImdResource {
    pub id: String,
    pub nama_pasien: String,
    pub alamat: String,
    pub no_rm: String,
    pub tanggal_lahir: NaiveDate,
    pub cara_persalinan: CaraPersalinan,
    pub tanggal_imd: NaiveDate,
    pub waktu_imd: WaktuImd,
    pub nama_petugas: String,
    pub umur: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Imd> for ImdResource {
    fn from(imd: &Imd) -> Self {
        let umur = export::age_in_years(imd.tanggal_lahir, Utc::now().date_naive());
        Self {
            id: imd.id.clone(),
            nama_pasien: imd.nama_pasien.clone(),
            alamat: imd.alamat.clone(),
            no_rm: imd.no_rm.clone(),
            tanggal_lahir: imd.tanggal_lahir,
            cara_persalinan: imd.cara_persalinan,
            tanggal_imd: imd.tanggal_imd,
            waktu_imd: imd.waktu_imd,
            nama_petugas: imd.nama_petugas.clone(),
            umur: format!("{umur} tahun"),
            created_at: imd.created_at.and_utc().to_rfc3339(),
            updated_at: imd.updated_at.and_utc().to_rfc3339(),
        }
    }
}

/// Query string accepted by the list and export endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub cara_persalinan: Option<String>,
    pub waktu_imd: Option<String>,
    pub tanggal_lahir_dari: Option<String>,
    pub tanggal_lahir_sampai: Option<String>,
}

impl ListQuery {
    /// Convert to database filters, rejecting malformed enum/date values.
    fn filters(&self) -> Result<ImdFilters> {
        let mut errors = FieldErrors::new();

        let cara_persalinan = match self.cara_persalinan.as_deref() {
            None | Some("") => None,
            Some(raw) => match CaraPersalinan::parse(raw) {
                Some(v) => Some(v),
                None => {
                    push(&mut errors, "cara_persalinan", "Cara persalinan tidak valid.");
                    None
                }
            },
        };

        let waktu_imd = match self.waktu_imd.as_deref() {
            None | Some("") => None,
            Some(raw) => match WaktuImd::parse(raw) {
                Some(v) => Some(v),
                None => {
                    push(&mut errors, "waktu_imd", "Waktu IMD tidak valid.");
                    None
                }
            },
        };

        let tanggal_lahir_dari =
            parse_optional_date(&mut errors, "tanggal_lahir_dari", self.tanggal_lahir_dari.as_deref());
        let tanggal_lahir_sampai =
            parse_optional_date(&mut errors, "tanggal_lahir_sampai", self.tanggal_lahir_sampai.as_deref());

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        Ok(ImdFilters {
            search: self.search.clone().filter(|s| !s.is_empty()),
            cara_persalinan,
            waktu_imd,
            tanggal_lahir_dari,
            tanggal_lahir_sampai,
        })
    }
}

/// GET /imds — filtered, paginated list, newest first.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let filters = query.filters()?;
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let total = database::imd::count_imds(state.db.pool(), &filters).await?;
    let imds = database::imd::list_imds(state.db.pool(), &filters, per_page, offset).await?;

    let last_page = ((total + per_page - 1) / per_page).max(1);
    let from = if imds.is_empty() { None } else { Some(offset + 1) };
    let to = if imds.is_empty() { None } else { Some(offset + imds.len() as i64) };

    let data: Vec<ImdResource> = imds.iter().map(ImdResource::from).collect();

    Ok(Json(json!({
        "success": true,
        "message": "Data IMD berhasil diambil",
        "data": {
            "data": data,
            "current_page": page,
            "last_page": last_page,
            "per_page": per_page,
            "total": total,
            "from": from,
            "to": to,
        },
    })))
}

/// Request body for create and update.
#[derive(Debug, Default, Deserialize)]
pub struct ImdPayload {
    pub nama_pasien: Option<String>,
    pub alamat: Option<String>,
    pub no_rm: Option<String>,
    pub tanggal_lahir: Option<String>,
    pub cara_persalinan: Option<String>,
    pub tanggal_imd: Option<String>,
    pub waktu_imd: Option<String>,
    pub nama_petugas: Option<String>,
}

/// Validate the payload into an [`ImdInput`], collecting every field error.
pub fn validate_payload(payload: &ImdPayload) -> std::result::Result<ImdInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let nama_pasien = required_text(&mut errors, "nama_pasien", payload.nama_pasien.as_deref(),
        "Nama pasien wajib diisi.", 255);
    let alamat = required_text(&mut errors, "alamat", payload.alamat.as_deref(),
        "Alamat wajib diisi.", 500);
    let no_rm = required_text(&mut errors, "no_rm", payload.no_rm.as_deref(),
        "No RM wajib diisi.", 50);
    let nama_petugas = required_text(&mut errors, "nama_petugas", payload.nama_petugas.as_deref(),
        "Nama petugas wajib diisi.", 255);

    let tanggal_lahir = match payload.tanggal_lahir.as_deref().filter(|s| !s.is_empty()) {
        None => {
            push(&mut errors, "tanggal_lahir", "Tanggal lahir wajib diisi.");
            None
        }
        Some(raw) => match raw.parse::<NaiveDate>() {
            Ok(date) if date < Utc::now().date_naive() => Some(date),
            Ok(_) => {
                push(&mut errors, "tanggal_lahir", "Tanggal lahir harus sebelum hari ini.");
                None
            }
            Err(_) => {
                push(&mut errors, "tanggal_lahir", "Format tanggal lahir tidak valid.");
                None
            }
        },
    };

    let tanggal_imd = match payload.tanggal_imd.as_deref().filter(|s| !s.is_empty()) {
        None => {
            push(&mut errors, "tanggal_imd", "Tanggal IMD wajib diisi.");
            None
        }
        Some(raw) => match raw.parse::<NaiveDate>() {
            Ok(date) => Some(date),
            Err(_) => {
                push(&mut errors, "tanggal_imd", "Format tanggal IMD tidak valid.");
                None
            }
        },
    };

    let cara_persalinan = match payload.cara_persalinan.as_deref().filter(|s| !s.is_empty()) {
        None => {
            push(&mut errors, "cara_persalinan", "Cara persalinan wajib dipilih.");
            None
        }
        Some(raw) => match CaraPersalinan::parse(raw) {
            Some(v) => Some(v),
            None => {
                push(&mut errors, "cara_persalinan", "Cara persalinan tidak valid.");
                None
            }
        },
    };

    let waktu_imd = match payload.waktu_imd.as_deref().filter(|s| !s.is_empty()) {
        None => {
            push(&mut errors, "waktu_imd", "Waktu IMD wajib dipilih.");
            None
        }
        Some(raw) => match WaktuImd::parse(raw) {
            Some(v) => Some(v),
            None => {
                push(&mut errors, "waktu_imd", "Waktu IMD tidak valid.");
                None
            }
        },
    };

    // Every None above pushed a field error, so this only fails alongside
    // a non-empty error map.
    match (tanggal_lahir, cara_persalinan, tanggal_imd, waktu_imd) {
        (Some(tanggal_lahir), Some(cara_persalinan), Some(tanggal_imd), Some(waktu_imd))
            if errors.is_empty() =>
        {
            Ok(ImdInput {
                nama_pasien,
                alamat,
                no_rm,
                tanggal_lahir,
                cara_persalinan,
                tanggal_imd,
                waktu_imd,
                nama_petugas,
            })
        }
        _ => Err(errors),
    }
}

/// POST /imds — create a record.
pub async fn store(
    State(state): State<AppState>,
    Json(payload): Json<ImdPayload>,
) -> Result<Response> {
    let input = validate_payload(&payload).map_err(ApiError::Validation)?;

    let imd = database::imd::create_imd(state.db.pool(), &Uuid::new_v4().to_string(), &input)
        .await
        .map_err(map_duplicate_rm)?;

    tracing::info!(no_rm = %imd.no_rm, "IMD record created");

    let body = json!({
        "success": true,
        "message": "Data IMD berhasil ditambahkan",
        "data": ImdResource::from(&imd),
    });
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// GET /imds/:id — fetch one record.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let imd = database::imd::get_imd(state.db.pool(), &id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Data IMD berhasil diambil",
        "data": ImdResource::from(&imd),
    })))
}

/// PUT /imds/:id — update a record.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ImdPayload>,
) -> Result<Json<serde_json::Value>> {
    let input = validate_payload(&payload).map_err(ApiError::Validation)?;

    let imd = database::imd::update_imd(state.db.pool(), &id, &input)
        .await
        .map_err(map_duplicate_rm)?;

    Ok(Json(json!({
        "success": true,
        "message": "Data IMD berhasil diperbarui",
        "data": ImdResource::from(&imd),
    })))
}

/// DELETE /imds/:id — soft-delete a record.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    database::imd::soft_delete_imd(state.db.pool(), &id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Data IMD berhasil dihapus",
    })))
}

/// GET /imds/export — download the filtered records as an xlsx workbook.
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let filters = query.filters()?;
    let imds = database::imd::list_imds_for_export(state.db.pool(), &filters).await?;

    let bytes = export::build_workbook(&imds).map_err(|e| ApiError::Internal(e.to_string()))?;
    let filename = format!("data-imd-{}.xlsx", Utc::now().format("%Y-%m-%d-%H-%M-%S"));

    tracing::info!(records = imds.len(), %filename, "export generated");

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn map_duplicate_rm(err: database::DatabaseError) -> ApiError {
    match err {
        database::DatabaseError::AlreadyExists { .. } => {
            ApiError::validation("no_rm", "No RM sudah digunakan.")
        }
        other => ApiError::Database(other),
    }
}

fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    required_message: &str,
    max_len: usize,
) -> String {
    match value.filter(|s| !s.trim().is_empty()) {
        None => {
            push(errors, field, required_message);
            String::new()
        }
        Some(v) if v.chars().count() > max_len => {
            push(errors, field, &format!("Maksimal {max_len} karakter."));
            String::new()
        }
        Some(v) => v.to_string(),
    }
}

fn parse_optional_date(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<NaiveDate> {
    match value.filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<NaiveDate>() {
            Ok(date) => Some(date),
            Err(_) => {
                push(errors, field, "Format tanggal tidak valid.");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> ImdPayload {
        ImdPayload {
            nama_pasien: Some("Siti Nurhaliza".to_string()),
            alamat: Some("Jl. Melati No. 5".to_string()),
            no_rm: Some("RM001".to_string()),
            tanggal_lahir: Some("1995-03-14".to_string()),
            cara_persalinan: Some("SC".to_string()),
            tanggal_imd: Some("2025-08-11".to_string()),
            waktu_imd: Some("30 menit".to_string()),
            nama_petugas: Some("Dr. Ahmad".to_string()),
        }
    }

    #[test]
    fn valid_payload_passes() {
        let input = validate_payload(&valid_payload()).unwrap();
        assert_eq!(input.no_rm, "RM001");
        assert_eq!(input.cara_persalinan, CaraPersalinan::Sc);
    }

    #[test]
    fn missing_fields_collect_messages() {
        let errors = validate_payload(&ImdPayload::default()).unwrap_err();
        assert_eq!(errors["nama_pasien"], vec!["Nama pasien wajib diisi."]);
        assert_eq!(errors["waktu_imd"], vec!["Waktu IMD wajib dipilih."]);
        assert_eq!(errors.len(), 8);
    }

    #[test]
    fn future_birth_date_is_rejected() {
        let mut payload = valid_payload();
        payload.tanggal_lahir = Some("2999-01-01".to_string());
        let errors = validate_payload(&payload).unwrap_err();
        assert_eq!(errors["tanggal_lahir"], vec!["Tanggal lahir harus sebelum hari ini."]);
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        let mut payload = valid_payload();
        payload.cara_persalinan = Some("Normal".to_string());
        payload.waktu_imd = Some("90 menit".to_string());
        let errors = validate_payload(&payload).unwrap_err();
        assert!(errors.contains_key("cara_persalinan"));
        assert!(errors.contains_key("waktu_imd"));
    }

    #[test]
    fn list_query_rejects_bad_filter_values() {
        let query = ListQuery {
            cara_persalinan: Some("Normal".to_string()),
            tanggal_lahir_dari: Some("not-a-date".to_string()),
            ..Default::default()
        };
        let err = query.filters().unwrap_err();
        let ApiError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("cara_persalinan"));
        assert!(errors.contains_key("tanggal_lahir_dari"));
    }
}

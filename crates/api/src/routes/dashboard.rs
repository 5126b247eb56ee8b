//! Analytics dashboard route.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Datelike, Months, NaiveDate, Utc};
use database::dashboard::{self, DashboardFilters};
use database::models::{CaraPersalinan, Imd};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ApiError, FieldErrors, Result};
use crate::state::AppState;

/// Chart colors for delivery methods.
fn cara_color(name: &str) -> &'static str {
    match name {
        "SC" => "#ef4444",
        "Spontan" => "#10b981",
        _ => "#6b7280",
    }
}

/// Chart colors for IMD durations.
fn waktu_color(name: &str) -> &'static str {
    match name {
        "15 menit" => "#ef4444",
        "30 menit" => "#f59e0b",
        "45 menit" => "#3b82f6",
        "60 menit" => "#10b981",
        _ => "#6b7280",
    }
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub cara_persalinan: Option<String>,
}

#[derive(Serialize)]
struct ChartSlice {
    name: String,
    value: i64,
    color: &'static str,
}

#[derive(Serialize)]
struct TrendPoint {
    month: String,
    value: i64,
}

#[derive(Serialize)]
struct AgeBucket {
    name: String,
    value: i64,
}

/// Subset of a record shown in the recent-activity list.
#[derive(Serialize)]
struct RecentImd {
    id: String,
    nama_pasien: String,
    no_rm: String,
    cara_persalinan: &'static str,
    waktu_imd: &'static str,
    tanggal_imd: NaiveDate,
    nama_petugas: String,
}

impl From<&Imd> for RecentImd {
    fn from(imd: &Imd) -> Self {
        Self {
            id: imd.id.clone(),
            nama_pasien: imd.nama_pasien.clone(),
            no_rm: imd.no_rm.clone(),
            cara_persalinan: imd.cara_persalinan.as_str(),
            waktu_imd: imd.waktu_imd.as_str(),
            tanggal_imd: imd.tanggal_imd,
            nama_petugas: imd.nama_petugas.clone(),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// GET /dashboard — statistics, chart series, and recent records, scoped
/// by year (default: current), optional month, and optional delivery
/// method.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<serde_json::Value>> {
    let now = Utc::now().date_naive();
    let current_year = now.year();

    let mut errors = FieldErrors::new();
    if let Some(year) = query.year {
        if !(2020..=current_year + 5).contains(&year) {
            errors.insert("year".to_string(), vec!["Tahun tidak valid.".to_string()]);
        }
    }
    if let Some(month) = query.month {
        if !(1..=12).contains(&month) {
            errors.insert("month".to_string(), vec!["Bulan tidak valid.".to_string()]);
        }
    }
    let cara_persalinan = match query.cara_persalinan.as_deref() {
        None | Some("") => None,
        Some(raw) => match CaraPersalinan::parse(raw) {
            Some(v) => Some(v),
            None => {
                errors.insert(
                    "cara_persalinan".to_string(),
                    vec!["Cara persalinan tidak valid.".to_string()],
                );
                None
            }
        },
    };
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let year = query.year.unwrap_or(current_year);
    let filters = DashboardFilters {
        year,
        month: query.month,
        cara_persalinan,
    };
    let pool = state.db.pool();

    let total_imd = dashboard::count_total(pool, &filters).await?;

    let by_cara = dashboard::count_by_cara_persalinan(pool, &filters).await?;
    let imd_by_cara_persalinan: Vec<ChartSlice> = by_cara
        .iter()
        .map(|(name, value)| ChartSlice {
            name: name.clone(),
            value: *value,
            color: cara_color(name),
        })
        .collect();

    let imd_by_waktu: Vec<ChartSlice> = dashboard::count_by_waktu(pool, &filters)
        .await?
        .into_iter()
        .map(|(name, value)| ChartSlice {
            color: waktu_color(&name),
            name,
            value,
        })
        .collect();

    // Last 12 calendar months ending with the current one.
    let mut monthly_trend = Vec::with_capacity(12);
    for i in (0..12u32).rev() {
        let date = now
            .checked_sub_months(Months::new(i))
            .unwrap_or(now);
        let value =
            dashboard::count_for_month(pool, date.year(), date.month(), cara_persalinan).await?;
        monthly_trend.push(TrendPoint {
            month: date.format("%b %Y").to_string(),
            value,
        });
    }

    let age_distribution: Vec<AgeBucket> = dashboard::age_distribution(pool, &filters)
        .await?
        .into_iter()
        .map(|(name, value)| AgeBucket { name, value })
        .collect();

    let recent = dashboard::recent_imds(pool, &filters, 5).await?;
    let recent_imds: Vec<RecentImd> = recent.iter().map(RecentImd::from).collect();

    let percentage_of = |name: &str| -> f64 {
        if total_imd == 0 {
            return 0.0;
        }
        let count = by_cara
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
            .unwrap_or(0);
        round1(count as f64 / total_imd as f64 * 100.0)
    };

    let avg_duration = round1(dashboard::avg_duration_minutes(pool, &filters).await?);

    Ok(Json(json!({
        "status": "success",
        "message": "Dashboard data retrieved successfully",
        "data": {
            "stats": {
                "total_imd": total_imd,
                "sc_percentage": percentage_of("SC"),
                "spontan_percentage": percentage_of("Spontan"),
                "avg_duration": avg_duration,
            },
            "charts": {
                "imd_by_cara_persalinan": imd_by_cara_persalinan,
                "imd_by_waktu": imd_by_waktu,
                "monthly_trend": monthly_trend,
                "age_distribution": age_distribution,
            },
            "recent_imds": recent_imds,
            "filters": {
                "year": query.year,
                "month": query.month,
                "cara_persalinan": query.cara_persalinan,
            },
            "available_years": (2020..=current_year).collect::<Vec<i32>>(),
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_colors_match_the_fixed_palette() {
        assert_eq!(cara_color("SC"), "#ef4444");
        assert_eq!(cara_color("Spontan"), "#10b981");
        assert_eq!(waktu_color("45 menit"), "#3b82f6");
        assert_eq!(waktu_color("unknown"), "#6b7280");
    }

    #[test]
    fn rounding_keeps_one_decimal() {
        assert_eq!(round1(35.55), 35.6);
        assert_eq!(round1(64.449), 64.4);
        assert_eq!(round1(0.0), 0.0);
    }
}

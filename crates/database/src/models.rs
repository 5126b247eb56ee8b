//! Database models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Delivery method for a birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum CaraPersalinan {
    /// Sectio Caesarea.
    #[serde(rename = "SC")]
    #[sqlx(rename = "SC")]
    Sc,
    /// Spontaneous delivery.
    Spontan,
}

impl CaraPersalinan {
    /// Parse the stored/display form ("SC" or "Spontan").
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SC" => Some(Self::Sc),
            "Spontan" => Some(Self::Spontan),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sc => "SC",
            Self::Spontan => "Spontan",
        }
    }
}

/// IMD duration. Stored in its display form ("15 menit", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum WaktuImd {
    #[serde(rename = "15 menit")]
    #[sqlx(rename = "15 menit")]
    Menit15,
    #[serde(rename = "30 menit")]
    #[sqlx(rename = "30 menit")]
    Menit30,
    #[serde(rename = "45 menit")]
    #[sqlx(rename = "45 menit")]
    Menit45,
    #[serde(rename = "60 menit")]
    #[sqlx(rename = "60 menit")]
    Menit60,
}

impl WaktuImd {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "15 menit" => Some(Self::Menit15),
            "30 menit" => Some(Self::Menit30),
            "45 menit" => Some(Self::Menit45),
            "60 menit" => Some(Self::Menit60),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Menit15 => "15 menit",
            Self::Menit30 => "30 menit",
            Self::Menit45 => "45 menit",
            Self::Menit60 => "60 menit",
        }
    }

    /// Duration in minutes.
    pub fn minutes(&self) -> u32 {
        match self {
            Self::Menit15 => 15,
            Self::Menit30 => 30,
            Self::Menit45 => 45,
            Self::Menit60 => 60,
        }
    }
}

/// An application user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A single IMD patient event record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Imd {
    pub id: String,
    pub nama_pasien: String,
    pub alamat: String,
    pub no_rm: String,
    pub tanggal_lahir: NaiveDate,
    pub cara_persalinan: CaraPersalinan,
    pub tanggal_imd: NaiveDate,
    pub waktu_imd: WaktuImd,
    pub nama_petugas: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

/// Validated input for creating or updating an IMD record.
#[derive(Debug, Clone)]
pub struct ImdInput {
    pub nama_pasien: String,
    pub alamat: String,
    pub no_rm: String,
    pub tanggal_lahir: NaiveDate,
    pub cara_persalinan: CaraPersalinan,
    pub tanggal_imd: NaiveDate,
    pub waktu_imd: WaktuImd,
    pub nama_petugas: String,
}

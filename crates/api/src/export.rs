//! Excel export of IMD records.

use chrono::{Datelike, NaiveDate};
use database::models::Imd;
use rust_xlsxwriter::{Workbook, XlsxError};

const HEADINGS: [&str; 11] = [
    "No",
    "Nama Pasien",
    "No RM",
    "Alamat",
    "Tanggal Lahir",
    "Usia (tahun)",
    "Cara Persalinan",
    "Tanggal IMD",
    "Waktu IMD",
    "Nama Petugas",
    "Tanggal Input",
];

/// Whole years between two dates, accounting for whether the anniversary
/// has passed.
pub fn age_in_years(from: NaiveDate, to: NaiveDate) -> i32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}

/// Build an xlsx workbook for the given records and return it as bytes.
/// The running row number is an explicit counter threaded through the
/// loop, not shared state.
pub fn build_workbook(imds: &[Imd]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, heading) in HEADINGS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *heading)?;
    }

    for (index, imd) in imds.iter().enumerate() {
        let row = (index + 1) as u32;
        let number = index as i64 + 1;
        let age = age_in_years(imd.tanggal_lahir, imd.tanggal_imd);

        worksheet.write_number(row, 0, number as f64)?;
        worksheet.write_string(row, 1, imd.nama_pasien.as_str())?;
        worksheet.write_string(row, 2, imd.no_rm.as_str())?;
        worksheet.write_string(row, 3, imd.alamat.as_str())?;
        worksheet.write_string(row, 4, imd.tanggal_lahir.format("%d/%m/%Y").to_string())?;
        worksheet.write_number(row, 5, age as f64)?;
        worksheet.write_string(row, 6, imd.cara_persalinan.as_str())?;
        worksheet.write_string(row, 7, imd.tanggal_imd.format("%d/%m/%Y").to_string())?;
        worksheet.write_string(row, 8, imd.waktu_imd.as_str())?;
        worksheet.write_string(row, 9, imd.nama_petugas.as_str())?;
        worksheet.write_string(row, 10, imd.created_at.format("%d/%m/%Y %H:%M").to_string())?;
    }

    workbook.save_to_buffer()
}

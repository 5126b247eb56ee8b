//! Static helper data for callers: sample questions and a description of
//! the queryable schema.

use serde::Serialize;

/// Sample questions users can ask about the IMD data.
pub const SAMPLE_QUESTIONS: [&str; 15] = [
    "Berapa total data IMD yang tercatat?",
    "Tampilkan data IMD untuk bulan ini",
    "Berapa rata-rata durasi IMD?",
    "Tampilkan distribusi cara persalinan",
    "Data IMD dengan durasi paling lama",
    "Berapa ibu yang melakukan IMD lebih dari 60 menit?",
    "Tampilkan trend IMD per bulan tahun ini",
    "Siapa petugas yang paling sering menangani IMD?",
    "Berapa persentase persalinan SC vs Spontan?",
    "Tampilkan 5 data IMD terbaru",
    "Berapa rata-rata waktu IMD berdasarkan cara persalinan?",
    "Data IMD dengan waktu kurang dari 30 menit",
    "Tampilkan jumlah IMD per petugas medis",
    "Berapa total IMD bulan lalu dibanding bulan ini?",
    "Data pasien yang lahir hari ini",
];

/// One column of the queryable table.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub column_type: &'static str,
    pub description: &'static str,
}

/// Description of the `imds` table for query construction.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaInfo {
    pub table_name: &'static str,
    pub columns: Vec<ColumnInfo>,
    pub sample_queries: Vec<&'static str>,
}

/// Build the schema description returned by the schema endpoint.
pub fn schema_info() -> SchemaInfo {
    SchemaInfo {
        table_name: "imds",
        columns: vec![
            ColumnInfo {
                name: "id",
                column_type: "text",
                description: "Primary key",
            },
            ColumnInfo {
                name: "nama_pasien",
                column_type: "varchar(255)",
                description: "Nama lengkap pasien/ibu",
            },
            ColumnInfo {
                name: "alamat",
                column_type: "text",
                description: "Alamat lengkap pasien",
            },
            ColumnInfo {
                name: "no_rm",
                column_type: "varchar(50)",
                description: "Nomor rekam medis",
            },
            ColumnInfo {
                name: "tanggal_lahir",
                column_type: "date",
                description: "Tanggal lahir bayi",
            },
            ColumnInfo {
                name: "cara_persalinan",
                column_type: "enum(SC,Spontan)",
                description: "Metode persalinan: SC (Sectio Caesarea) atau Spontan",
            },
            ColumnInfo {
                name: "tanggal_imd",
                column_type: "date",
                description: "Tanggal pelaksanaan IMD",
            },
            ColumnInfo {
                name: "waktu_imd",
                column_type: "enum(15 menit,30 menit,45 menit,60 menit)",
                description: "Durasi pelaksanaan IMD",
            },
            ColumnInfo {
                name: "nama_petugas",
                column_type: "varchar(255)",
                description: "Nama petugas medis yang menangani",
            },
            ColumnInfo {
                name: "created_at",
                column_type: "timestamp",
                description: "Waktu pembuatan record",
            },
            ColumnInfo {
                name: "updated_at",
                column_type: "timestamp",
                description: "Waktu update terakhir record",
            },
            ColumnInfo {
                name: "deleted_at",
                column_type: "timestamp nullable",
                description: "Waktu soft delete (NULL jika aktif)",
            },
        ],
        sample_queries: vec![
            "SELECT COUNT(*) as total FROM imds WHERE deleted_at IS NULL",
            "SELECT cara_persalinan, COUNT(*) as jumlah FROM imds GROUP BY cara_persalinan",
            "SELECT waktu_imd, COUNT(*) as jumlah FROM imds GROUP BY waktu_imd",
            "SELECT nama_petugas, COUNT(*) as jumlah_pasien FROM imds GROUP BY nama_petugas",
            "SELECT DATE(tanggal_imd) as tanggal, COUNT(*) as jumlah FROM imds GROUP BY DATE(tanggal_imd)",
            "SELECT * FROM imds WHERE tanggal_imd >= date('now', '-30 days')",
            "SELECT AVG(CAST(waktu_imd AS INTEGER)) as rata_rata_menit FROM imds",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter;

    #[test]
    fn schema_matches_the_live_table() {
        let schema = schema_info();
        assert_eq!(schema.table_name, "imds");
        assert_eq!(schema.columns.len(), 12);
        assert!(schema.columns.iter().any(|c| c.name == "cara_persalinan"));
    }

    #[test]
    fn sample_queries_pass_the_safety_filter() {
        for query in schema_info().sample_queries {
            assert!(filter::approve_query(query).is_ok(), "rejected: {query}");
        }
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Row of any administrative level, normalised to a common shape
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Region {
    pub id: i32,
    pub kode: String,
    pub nama: String,
    /// Id of the enclosing region (absent for provinsi)
    pub parent_id: Option<i32>,
    /// `pulau` for provinsi, `tipe` (Kabupaten/Kota) for kabupaten_kota
    pub keterangan: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegionLevel {
    Provinsi,
    KabupatenKota,
    Kecamatan,
    Desa,
}

impl RegionLevel {
    pub fn table(&self) -> &'static str {
        match self {
            RegionLevel::Provinsi => "provinsi",
            RegionLevel::KabupatenKota => "kabupaten_kota",
            RegionLevel::Kecamatan => "kecamatan",
            RegionLevel::Desa => "desa",
        }
    }

    /// Column on this level's table referencing its parent
    pub fn parent_column(&self) -> Option<&'static str> {
        match self {
            RegionLevel::Provinsi => None,
            RegionLevel::KabupatenKota => Some("provinsi_id"),
            RegionLevel::Kecamatan => Some("kabupaten_kota_id"),
            RegionLevel::Desa => Some("kecamatan_id"),
        }
    }

    pub fn child(&self) -> Option<RegionLevel> {
        match self {
            RegionLevel::Provinsi => Some(RegionLevel::KabupatenKota),
            RegionLevel::KabupatenKota => Some(RegionLevel::Kecamatan),
            RegionLevel::Kecamatan => Some(RegionLevel::Desa),
            RegionLevel::Desa => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegionLevel::Provinsi => "Provinsi",
            RegionLevel::KabupatenKota => "Kabupaten/Kota",
            RegionLevel::Kecamatan => "Kecamatan",
            RegionLevel::Desa => "Desa",
        }
    }

    /// SELECT producing `Region` rows for this level
    pub fn select_sql(&self) -> String {
        let parent = self
            .parent_column()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "NULL::int4".to_string());
        let keterangan = match self {
            RegionLevel::Provinsi => "pulau",
            RegionLevel::KabupatenKota => "tipe",
            RegionLevel::Kecamatan | RegionLevel::Desa => "NULL::text",
        };

        format!(
            "SELECT id, kode, nama, {} AS parent_id, {} AS keterangan FROM {}",
            parent,
            keterangan,
            self.table()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_is_linear() {
        let mut level = RegionLevel::Provinsi;
        let mut depth = 1;
        while let Some(child) = level.child() {
            assert!(child.parent_column().is_some());
            level = child;
            depth += 1;
        }
        assert_eq!(depth, 4);
        assert_eq!(level, RegionLevel::Desa);
    }

    #[test]
    fn test_select_sql() {
        assert_eq!(
            RegionLevel::Provinsi.select_sql(),
            "SELECT id, kode, nama, NULL::int4 AS parent_id, pulau AS keterangan FROM provinsi"
        );
        assert_eq!(
            RegionLevel::Desa.select_sql(),
            "SELECT id, kode, nama, kecamatan_id AS parent_id, NULL::text AS keterangan FROM desa"
        );
    }
}

//! Database enum types shared across features.

use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;

/// Publication state of gardens, collections and articles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "statuspublikasienum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusPublikasi {
    #[default]
    Draft,
    Published,
    Archived,
}

impl StatusPublikasi {
    pub const ALL: [Self; 3] = [
        StatusPublikasi::Draft,
        StatusPublikasi::Published,
        StatusPublikasi::Archived,
    ];
}

/// Kind of institution managing a garden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "tipetamanenum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipeTaman {
    KehatiInstansi,
    KehatiSekolah,
    KehatiKampus,
    KehatiPerusahaan,
    KehatiPemda,
    KehatiMasyarakat,
}

impl TipeTaman {
    pub const ALL: [Self; 6] = [
        TipeTaman::KehatiInstansi,
        TipeTaman::KehatiSekolah,
        TipeTaman::KehatiKampus,
        TipeTaman::KehatiPerusahaan,
        TipeTaman::KehatiPemda,
        TipeTaman::KehatiMasyarakat,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "statusendemikenum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusEndemik {
    Endemik,
    NonEndemik,
    #[default]
    TidakDiketahui,
}

impl StatusEndemik {
    pub const ALL: [Self; 3] = [
        StatusEndemik::Endemik,
        StatusEndemik::NonEndemik,
        StatusEndemik::TidakDiketahui,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusEndemik::Endemik => "endemik",
            StatusEndemik::NonEndemik => "non_endemik",
            StatusEndemik::TidakDiketahui => "tidak_diketahui",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "mediatypeenum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Foto,
    Video,
}

impl MediaType {
    pub const ALL: [Self; 2] = [MediaType::Foto, MediaType::Video];

    /// Storage folder for uploaded objects of this type
    pub fn folder(&self) -> &'static str {
        match self {
            MediaType::Foto => "foto",
            MediaType::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "mediacategoryenum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    TamanUmum,
    TumbuhanKeseluruhan,
    Daun,
    Bunga,
    Buah,
    Batang,
    Akar,
    Lainnya,
}

impl MediaCategory {
    pub const ALL: [Self; 8] = [
        MediaCategory::TamanUmum,
        MediaCategory::TumbuhanKeseluruhan,
        MediaCategory::Daun,
        MediaCategory::Bunga,
        MediaCategory::Buah,
        MediaCategory::Batang,
        MediaCategory::Akar,
        MediaCategory::Lainnya,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_database_labels() {
        assert_eq!(
            serde_json::to_value(StatusPublikasi::Published).unwrap(),
            "published"
        );
        assert_eq!(
            serde_json::to_value(TipeTaman::KehatiMasyarakat).unwrap(),
            "kehati_masyarakat"
        );
        assert_eq!(
            serde_json::from_value::<StatusEndemik>(serde_json::json!("non_endemik")).unwrap(),
            StatusEndemik::NonEndemik
        );
        assert_eq!(
            serde_json::to_value(MediaCategory::TumbuhanKeseluruhan).unwrap(),
            "tumbuhan_keseluruhan"
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(StatusPublikasi::default(), StatusPublikasi::Draft);
        assert_eq!(StatusEndemik::default().as_str(), "tidak_diketahui");
    }
}

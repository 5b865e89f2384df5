use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::core::error::AppError;
use crate::features::auth::model::Role;
use crate::features::collections::models::{
    KoleksiMapPoint, KoleksiTumbuhan, RelatedArtikel, StatsGroupBy,
};
use crate::shared::enums::{StatusEndemik, StatusPublikasi};
use crate::shared::geo_masking::{Coordinate, MaskingPolicy};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct KoleksiListQuery {
    /// Search in scientific, national and local names and tree/leaf form
    pub q: Option<String>,
    pub taman_kehati_id: Option<i32>,
    pub zona_id: Option<i32>,
    pub status: Option<StatusPublikasi>,
    pub status_endemik: Option<StatusEndemik>,
    /// Case-insensitive substring match
    pub genus: Option<String>,
    /// Case-insensitive substring match
    pub spesies: Option<String>,
    /// `nama_ilmiah`, `nomor_koleksi`, `created_at` or `updated_at`, `-` prefix for descending
    pub sort: Option<String>,
}

impl KoleksiListQuery {
    /// ORDER BY clause for the requested sort, restricted to known columns
    pub fn order_by(&self) -> Result<String, AppError> {
        let Some(sort) = self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok("k.nama_ilmiah ASC, k.id ASC".to_string());
        };

        let (column, direction) = match sort.strip_prefix('-') {
            Some(column) => (column, "DESC"),
            None => (sort, "ASC"),
        };

        match column {
            "nama_ilmiah" | "nomor_koleksi" | "created_at" | "updated_at" => {
                Ok(format!("k.{} {}, k.id ASC", column, direction))
            }
            other => Err(AppError::BadRequest(format!(
                "Cannot sort by '{}'. Allowed: nama_ilmiah, nomor_koleksi, created_at, updated_at",
                other
            ))),
        }
    }
}

/// Collection as returned to clients, coordinates masked unless the caller is an admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KoleksiResponseDto {
    #[serde(flatten)]
    pub koleksi: KoleksiTumbuhan,
    pub coordinates_masked: bool,
}

impl KoleksiResponseDto {
    pub fn masked(mut koleksi: KoleksiTumbuhan, policy: &MaskingPolicy, role: Option<Role>) -> Self {
        let key = koleksi.id.to_string();

        (koleksi.latitude_taman, koleksi.longitude_taman) =
            policy.mask_parts(koleksi.latitude_taman, koleksi.longitude_taman, role, &key);
        (koleksi.latitude_asal, koleksi.longitude_asal) =
            policy.mask_parts(koleksi.latitude_asal, koleksi.longitude_asal, role, &key);

        Self {
            koleksi,
            coordinates_masked: !role.is_some_and(|r| r.is_admin()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ZonaKoleksiQuery {
    pub status: Option<StatusPublikasi>,
}

/// Published collections sharing the genus or zone, and published articles of
/// the same garden or naming the species
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KoleksiRelationsDto {
    pub terkait: Vec<KoleksiResponseDto>,
    pub artikel_terkait: Vec<RelatedArtikel>,
}

impl KoleksiRelationsDto {
    pub fn masked(
        terkait: Vec<KoleksiTumbuhan>,
        artikel_terkait: Vec<RelatedArtikel>,
        policy: &MaskingPolicy,
        role: Option<Role>,
    ) -> Self {
        Self {
            terkait: terkait
                .into_iter()
                .map(|k| KoleksiResponseDto::masked(k, policy, role))
                .collect(),
            artikel_terkait,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SuggestQuery {
    pub q: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct StatsQuery {
    pub group_by: StatsGroupBy,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsGroupDto {
    /// Group key, `"null"` for collections without a value
    pub group_value: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KoleksiStatsDto {
    pub group_by: StatsGroupBy,
    pub results: Vec<StatsGroupDto>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct MapPointsQuery {
    pub taman_kehati_id: Option<i32>,
    pub zona_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KoleksiMapPointDto {
    pub id: i32,
    pub nama_ilmiah: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status_endemik: StatusEndemik,
}

impl KoleksiMapPointDto {
    pub fn masked(point: KoleksiMapPoint, policy: &MaskingPolicy, role: Option<Role>) -> Self {
        let masked = policy.mask(
            Coordinate::new(point.latitude, point.longitude),
            role,
            Some(&point.id.to_string()),
        );
        Self {
            id: point.id,
            nama_ilmiah: point.nama_ilmiah,
            latitude: masked.latitude,
            longitude: masked.longitude,
            status_endemik: point.status_endemik,
        }
    }
}

fn validate_pairs(
    pairs: [(Option<f64>, Option<f64>); 2],
) -> Result<(), ValidationError> {
    if pairs.iter().any(|(lat, lon)| lat.is_some() != lon.is_some()) {
        let mut err = ValidationError::new("coordinate_pair");
        err.message = Some("latitude and longitude must be provided together".into());
        return Err(err);
    }
    Ok(())
}

fn validate_create_coordinates(dto: &CreateKoleksiDto) -> Result<(), ValidationError> {
    validate_pairs([
        (dto.latitude_taman, dto.longitude_taman),
        (dto.latitude_asal, dto.longitude_asal),
    ])
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_coordinates"))]
pub struct CreateKoleksiDto {
    #[validate(
        length(min = 1, max = 100, message = "Nomor koleksi must be 1-100 characters"),
        regex(
            path = "*crate::shared::validation::CODE_REGEX",
            message = "Nomor koleksi may only contain letters, digits, '.', '/' and '-'"
        )
    )]
    pub nomor_koleksi: Option<String>,

    #[validate(length(max = 255))]
    pub nama_lokal_daerah: Option<String>,
    #[validate(length(max = 255))]
    pub nama_umum_nasional: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Nama ilmiah must be 1-255 characters"))]
    pub nama_ilmiah: String,
    #[validate(length(max = 100))]
    pub genus: Option<String>,
    #[validate(length(max = 100))]
    pub spesies: Option<String>,
    #[validate(length(max = 255))]
    pub author: Option<String>,
    pub sumber_publikasi: Option<String>,

    pub bentuk_pohon: Option<String>,
    pub bentuk_daun: Option<String>,
    pub bentuk_bunga: Option<String>,
    pub bentuk_buah: Option<String>,
    #[validate(length(max = 100))]
    pub waktu_berbunga: Option<String>,
    #[validate(length(max = 100))]
    pub waktu_berbuah: Option<String>,

    pub taman_kehati_id: i32,
    pub zona_id: Option<i32>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude_taman: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude_taman: Option<f64>,
    pub ketinggian_taman: Option<i32>,

    #[validate(length(max = 100))]
    pub asal_kampung: Option<String>,
    pub asal_desa_id: Option<i32>,
    pub asal_kecamatan_id: Option<i32>,
    pub asal_kabupaten_id: Option<i32>,
    pub asal_provinsi_id: Option<i32>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude_asal: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude_asal: Option<f64>,
    pub ketinggian_asal: Option<i32>,

    pub sebaran_global: Option<String>,
    pub referensi_sebaran: Option<String>,
    #[serde(default)]
    pub status_endemik: StatusEndemik,
    pub habitat_alami: Option<String>,
    pub referensi_habitat: Option<String>,

    pub metode_perbanyakan: Option<String>,
    pub manfaat_masyarakat: Option<String>,
    pub manfaat_lingkungan: Option<String>,
    pub potensi_pengembangan: Option<String>,

    pub tanggal_pengumpulan: Option<NaiveDate>,
    pub tanggal_penanaman: Option<NaiveDate>,

    #[serde(default)]
    pub status: StatusPublikasi,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateKoleksiDto {
    #[validate(
        length(min = 1, max = 100, message = "Nomor koleksi must be 1-100 characters"),
        regex(
            path = "*crate::shared::validation::CODE_REGEX",
            message = "Nomor koleksi may only contain letters, digits, '.', '/' and '-'"
        )
    )]
    pub nomor_koleksi: Option<String>,

    #[validate(length(max = 255))]
    pub nama_lokal_daerah: Option<String>,
    #[validate(length(max = 255))]
    pub nama_umum_nasional: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Nama ilmiah must be 1-255 characters"))]
    pub nama_ilmiah: Option<String>,
    #[validate(length(max = 100))]
    pub genus: Option<String>,
    #[validate(length(max = 100))]
    pub spesies: Option<String>,
    #[validate(length(max = 255))]
    pub author: Option<String>,
    pub sumber_publikasi: Option<String>,

    pub bentuk_pohon: Option<String>,
    pub bentuk_daun: Option<String>,
    pub bentuk_bunga: Option<String>,
    pub bentuk_buah: Option<String>,
    #[validate(length(max = 100))]
    pub waktu_berbunga: Option<String>,
    #[validate(length(max = 100))]
    pub waktu_berbuah: Option<String>,

    /// Move the collection to another garden
    pub taman_kehati_id: Option<i32>,
    pub zona_id: Option<i32>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude_taman: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude_taman: Option<f64>,
    pub ketinggian_taman: Option<i32>,

    #[validate(length(max = 100))]
    pub asal_kampung: Option<String>,
    pub asal_desa_id: Option<i32>,
    pub asal_kecamatan_id: Option<i32>,
    pub asal_kabupaten_id: Option<i32>,
    pub asal_provinsi_id: Option<i32>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude_asal: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude_asal: Option<f64>,
    pub ketinggian_asal: Option<i32>,

    pub sebaran_global: Option<String>,
    pub referensi_sebaran: Option<String>,
    pub status_endemik: Option<StatusEndemik>,
    pub habitat_alami: Option<String>,
    pub referensi_habitat: Option<String>,

    pub metode_perbanyakan: Option<String>,
    pub manfaat_masyarakat: Option<String>,
    pub manfaat_lingkungan: Option<String>,
    pub potensi_pengembangan: Option<String>,

    pub tanggal_pengumpulan: Option<NaiveDate>,
    pub tanggal_penanaman: Option<NaiveDate>,

    pub status: Option<StatusPublikasi>,
}

/// Column values written by insert and update. Field names match the table.
pub type KoleksiWrite = CreateKoleksiDto;

impl UpdateKoleksiDto {
    /// Overlay the provided fields on the stored collection
    pub fn merge(self, current: &KoleksiTumbuhan) -> Result<KoleksiWrite, AppError> {
        macro_rules! pick {
            ($field:ident) => {
                self.$field.or_else(|| current.$field.clone())
            };
        }

        let merged = KoleksiWrite {
            nomor_koleksi: pick!(nomor_koleksi),
            nama_lokal_daerah: pick!(nama_lokal_daerah),
            nama_umum_nasional: pick!(nama_umum_nasional),
            nama_ilmiah: self
                .nama_ilmiah
                .unwrap_or_else(|| current.nama_ilmiah.clone()),
            genus: pick!(genus),
            spesies: pick!(spesies),
            author: pick!(author),
            sumber_publikasi: pick!(sumber_publikasi),
            bentuk_pohon: pick!(bentuk_pohon),
            bentuk_daun: pick!(bentuk_daun),
            bentuk_bunga: pick!(bentuk_bunga),
            bentuk_buah: pick!(bentuk_buah),
            waktu_berbunga: pick!(waktu_berbunga),
            waktu_berbuah: pick!(waktu_berbuah),
            taman_kehati_id: self.taman_kehati_id.unwrap_or(current.taman_kehati_id),
            zona_id: pick!(zona_id),
            latitude_taman: pick!(latitude_taman),
            longitude_taman: pick!(longitude_taman),
            ketinggian_taman: pick!(ketinggian_taman),
            asal_kampung: pick!(asal_kampung),
            asal_desa_id: pick!(asal_desa_id),
            asal_kecamatan_id: pick!(asal_kecamatan_id),
            asal_kabupaten_id: pick!(asal_kabupaten_id),
            asal_provinsi_id: pick!(asal_provinsi_id),
            latitude_asal: pick!(latitude_asal),
            longitude_asal: pick!(longitude_asal),
            ketinggian_asal: pick!(ketinggian_asal),
            sebaran_global: pick!(sebaran_global),
            referensi_sebaran: pick!(referensi_sebaran),
            status_endemik: self.status_endemik.unwrap_or(current.status_endemik),
            habitat_alami: pick!(habitat_alami),
            referensi_habitat: pick!(referensi_habitat),
            metode_perbanyakan: pick!(metode_perbanyakan),
            manfaat_masyarakat: pick!(manfaat_masyarakat),
            manfaat_lingkungan: pick!(manfaat_lingkungan),
            potensi_pengembangan: pick!(potensi_pengembangan),
            tanggal_pengumpulan: pick!(tanggal_pengumpulan),
            tanggal_penanaman: pick!(tanggal_penanaman),
            status: self.status.unwrap_or(current.status),
        };

        validate_create_coordinates(&merged).map_err(|_| {
            AppError::Validation("latitude and longitude must be provided together".to_string())
        })?;
        Ok(merged)
    }
}

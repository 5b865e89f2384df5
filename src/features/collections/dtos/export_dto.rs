use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::auth::model::Role;
use crate::features::collections::models::{KoleksiExportRow, KoleksiTumbuhan};
use crate::shared::constants::{DEFAULT_EXPORT_LIMIT, MAX_EXPORT_LIMIT};
use crate::shared::enums::StatusPublikasi;
use crate::shared::geo_masking::{point_geometry, Coordinate, MaskingPolicy};
use crate::shared::geojson::{compact, Feature, FeatureCollection};

pub const INSTITUTION_CODE: &str = "TamanKehati";

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ExportQuery {
    pub taman_kehati_id: Option<i32>,
    pub status: Option<StatusPublikasi>,
    #[serde(default)]
    #[param(minimum = 0)]
    pub skip: i64,
    /// Records per export (default 100, max 10000)
    #[serde(default = "default_export_limit")]
    #[param(minimum = 1, maximum = 10000)]
    pub limit: i64,
}

fn default_export_limit() -> i64 {
    DEFAULT_EXPORT_LIMIT
}

impl Default for ExportQuery {
    fn default() -> Self {
        Self {
            taman_kehati_id: None,
            status: None,
            skip: 0,
            limit: DEFAULT_EXPORT_LIMIT,
        }
    }
}

impl ExportQuery {
    pub fn offset(&self) -> i64 {
        self.skip.max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_EXPORT_LIMIT)
    }
}

/// Garden coordinates when complete, otherwise the origin coordinates
fn best_coordinate(k: &KoleksiTumbuhan) -> Option<Coordinate> {
    Coordinate::from_parts(k.latitude_taman, k.longitude_taman)
        .or_else(|| Coordinate::from_parts(k.latitude_asal, k.longitude_asal))
}

fn masked_coordinate(
    k: &KoleksiTumbuhan,
    policy: &MaskingPolicy,
    role: Option<Role>,
) -> Option<Coordinate> {
    best_coordinate(k).map(|c| policy.mask(c, role, Some(&k.id.to_string())))
}

fn vernacular_name(k: &KoleksiTumbuhan) -> Option<String> {
    k.nama_umum_nasional
        .clone()
        .or_else(|| k.nama_lokal_daerah.clone())
}

/// One occurrence in Darwin Core terms
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DarwinCoreRecord {
    #[serde(rename = "occurrenceID")]
    pub occurrence_id: String,
    pub basis_of_record: String,
    pub scientific_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_epithet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name_authorship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vernacular_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geodetic_datum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbatim_elevation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub island: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habitat: Option<String>,
    pub institution_code: String,
    pub collection_code: String,
}

impl DarwinCoreRecord {
    pub fn from_row(row: &KoleksiExportRow, policy: &MaskingPolicy, role: Option<Role>) -> Self {
        let k = &row.koleksi;
        let coordinate = masked_coordinate(k, policy, role);

        // Kampung is free text and more specific than the village
        let locality = k
            .asal_kampung
            .clone()
            .or_else(|| row.asal_desa_nama.clone());

        Self {
            occurrence_id: k.id.to_string(),
            basis_of_record: "LivingSpecimen".to_string(),
            scientific_name: k.nama_ilmiah.clone(),
            genus: k.genus.clone(),
            specific_epithet: k.spesies.clone(),
            scientific_name_authorship: k.author.clone(),
            vernacular_name: vernacular_name(k),
            event_date: k.tanggal_pengumpulan.or(k.tanggal_penanaman),
            record_number: k.nomor_koleksi.clone(),
            recorded_by: k.created_by,
            decimal_latitude: coordinate.map(|c| c.latitude),
            decimal_longitude: coordinate.map(|c| c.longitude),
            geodetic_datum: coordinate.map(|_| "WGS84".to_string()),
            verbatim_elevation: k
                .ketinggian_taman
                .or(k.ketinggian_asal)
                .map(|m| format!("{} m", m)),
            country: Some("Indonesia".to_string()),
            island: row.asal_pulau.clone(),
            state_province: row.asal_provinsi_nama.clone(),
            county: row.asal_kabupaten_nama.clone(),
            municipality: row.asal_kecamatan_nama.clone(),
            locality,
            habitat: k.habitat_alami.clone(),
            institution_code: INSTITUTION_CODE.to_string(),
            collection_code: k.taman_kehati_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DarwinCoreExportDto {
    pub count: usize,
    pub records: Vec<DarwinCoreRecord>,
}

/// Point feature for a collection, or `None` when it has no coordinates at all
pub fn koleksi_feature(
    k: &KoleksiTumbuhan,
    policy: &MaskingPolicy,
    role: Option<Role>,
) -> Option<Feature> {
    let coordinate = masked_coordinate(k, policy, role)?;

    let mut properties = Map::new();
    properties.insert("id".into(), json!(k.id));
    properties.insert("collectionNumber".into(), json!(k.nomor_koleksi));
    properties.insert("scientificName".into(), json!(k.nama_ilmiah));
    properties.insert("genus".into(), json!(k.genus));
    properties.insert("specificEpithet".into(), json!(k.spesies));
    properties.insert("vernacularName".into(), json!(vernacular_name(k)));
    properties.insert("gardenId".into(), json!(k.taman_kehati_id));
    properties.insert("zoneId".into(), json!(k.zona_id));
    properties.insert(
        "elevation".into(),
        json!(k.ketinggian_taman.or(k.ketinggian_asal)),
    );
    properties.insert("endemicStatus".into(), json!(k.status_endemik.as_str()));

    Some(Feature::new(point_geometry(coordinate), compact(properties)))
}

pub fn koleksi_feature_collection(
    rows: &[KoleksiTumbuhan],
    policy: &MaskingPolicy,
    role: Option<Role>,
) -> FeatureCollection {
    FeatureCollection::new(
        rows.iter()
            .filter_map(|k| koleksi_feature(k, policy, role))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::collections::dtos::koleksi_dto::tests::koleksi;

    fn export_row(koleksi: KoleksiTumbuhan) -> KoleksiExportRow {
        KoleksiExportRow {
            koleksi,
            asal_pulau: Some("Sumatera".to_string()),
            asal_provinsi_nama: Some("Bengkulu".to_string()),
            asal_kabupaten_nama: Some("Rejang Lebong".to_string()),
            asal_kecamatan_nama: None,
            asal_desa_nama: None,
        }
    }

    #[test]
    fn test_darwin_core_field_names() {
        let record = DarwinCoreRecord::from_row(
            &export_row(koleksi()),
            &MaskingPolicy::default(),
            Some(Role::SuperAdmin),
        );
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["occurrenceID"], "42");
        assert_eq!(value["scientificName"], "Rafflesia arnoldii");
        assert_eq!(value["specificEpithet"], "arnoldii");
        assert_eq!(value["vernacularName"], "Padma raksasa");
        assert_eq!(value["eventDate"], "2024-01-10");
        assert_eq!(value["recordNumber"], "KT/2024/001");
        assert_eq!(value["decimalLatitude"], -6.2);
        assert_eq!(value["verbatimElevation"], "12 m");
        assert_eq!(value["stateProvince"], "Bengkulu");
        assert_eq!(value["locality"], "Kampung Palak Siring");
        assert_eq!(value["institutionCode"], INSTITUTION_CODE);
        assert_eq!(value["collectionCode"], "1");
        assert!(value.get("recordedBy").is_none());
        assert!(value.get("habitat").is_none());
    }

    #[test]
    fn test_darwin_core_masks_for_public() {
        let record = DarwinCoreRecord::from_row(
            &export_row(koleksi()),
            &MaskingPolicy::default(),
            None,
        );
        let lat = record.decimal_latitude.unwrap();
        assert!((lat - -6.2).abs() <= 30.0 / 111_320.0 + 1e-5);
    }

    #[test]
    fn test_origin_coordinates_used_when_garden_missing() {
        let mut k = koleksi();
        k.latitude_taman = None;
        k.longitude_taman = None;
        let feature = koleksi_feature(&k, &MaskingPolicy::default(), Some(Role::AdminTaman)).unwrap();
        assert_eq!(feature.geometry["coordinates"][0], 102.26);
        assert_eq!(feature.geometry["coordinates"][1], -3.8);
    }

    #[test]
    fn test_feature_collection_skips_unlocated() {
        let located = koleksi();
        let mut unlocated = koleksi();
        unlocated.id = 43;
        unlocated.latitude_taman = None;
        unlocated.longitude_taman = None;
        unlocated.latitude_asal = None;
        unlocated.longitude_asal = None;

        let fc = koleksi_feature_collection(
            &[located, unlocated],
            &MaskingPolicy::default(),
            None,
        );
        assert_eq!(fc.features.len(), 1);

        let props = &fc.features[0].properties;
        assert_eq!(props["scientificName"], "Rafflesia arnoldii");
        assert_eq!(props["endemicStatus"], "endemik");
        assert_eq!(props["vernacularName"], "Padma raksasa");
        assert_eq!(props["zoneId"], 3);
        assert!(!props.values().any(|v| v.is_null()));
    }

    #[test]
    fn test_export_limit_clamped() {
        let query = ExportQuery {
            limit: 50_000,
            skip: -5,
            ..Default::default()
        };
        assert_eq!(query.limit(), MAX_EXPORT_LIMIT);
        assert_eq!(query.offset(), 0);
    }
}

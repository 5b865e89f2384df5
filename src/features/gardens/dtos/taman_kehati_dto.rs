use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::core::error::AppError;
use crate::features::auth::model::Role;
use crate::features::gardens::models::{NearbyTaman, TamanKehati, TamanStats};
use crate::shared::constants::{
    DEFAULT_NEARBY_RADIUS_METERS, MAX_NEARBY_RADIUS_METERS, MAX_NEARBY_RESULTS,
    MIN_PUBLIC_NEARBY_RADIUS_METERS,
};
use crate::shared::enums::{StatusPublikasi, TipeTaman};
use crate::shared::geo_masking::{
    distance_meters, point_geometry, Coordinate, MaskingPolicy, MaskingProfile,
};
use crate::shared::geojson::{validate_polygon, Feature, FeatureCollection};
use crate::shared::validation::{validate_latitude, validate_longitude};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TamanKehatiListQuery {
    /// Search in name, address and description
    pub q: Option<String>,
    pub status: Option<StatusPublikasi>,
    pub provinsi_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    /// Search radius in meters (default 10 km, max 500 km)
    pub radius_m: Option<f64>,
}

impl NearbyQuery {
    pub fn origin(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    /// Validated search radius in meters. Radii below `min_radius` are rejected
    /// so a small circle cannot pin down an exact location.
    pub fn radius(&self, min_radius: f64) -> Result<f64, AppError> {
        validate_latitude(self.lat)
            .map_err(|_| AppError::BadRequest("lat must be between -90 and 90".to_string()))?;
        validate_longitude(self.lng)
            .map_err(|_| AppError::BadRequest("lng must be between -180 and 180".to_string()))?;

        let radius = self.radius_m.unwrap_or(DEFAULT_NEARBY_RADIUS_METERS);
        if !radius.is_finite() || radius <= 0.0 {
            return Err(AppError::BadRequest(
                "radius_m must be a positive number".to_string(),
            ));
        }
        if radius < min_radius {
            return Err(AppError::BadRequest(format!(
                "radius_m must be at least {} meters",
                min_radius
            )));
        }
        Ok(radius.min(MAX_NEARBY_RADIUS_METERS))
    }
}

/// Garden as returned to clients. Coordinates are masked unless the caller is an admin.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TamanKehatiResponseDto {
    pub id: i32,
    pub kode: Option<String>,
    pub nama_resmi: String,
    pub alamat: String,
    pub luas: Option<Decimal>,
    pub tipe_taman: TipeTaman,
    pub tanggal_penetapan: Option<NaiveDate>,
    pub deskripsi: Option<String>,
    pub provinsi_id: i32,
    pub kabupaten_kota_id: i32,
    pub kecamatan_id: Option<i32>,
    pub desa_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// GeoJSON Polygon
    #[schema(value_type = Option<Object>)]
    pub batas_area: Option<serde_json::Value>,
    pub status: StatusPublikasi,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TamanKehatiResponseDto {
    pub fn masked(taman: TamanKehati, policy: &MaskingPolicy, role: Option<Role>) -> Self {
        let (latitude, longitude) =
            policy.mask_parts(taman.latitude, taman.longitude, role, &taman.id.to_string());

        Self {
            id: taman.id,
            kode: taman.kode,
            nama_resmi: taman.nama_resmi,
            alamat: taman.alamat,
            luas: taman.luas,
            tipe_taman: taman.tipe_taman,
            tanggal_penetapan: taman.tanggal_penetapan,
            deskripsi: taman.deskripsi,
            provinsi_id: taman.provinsi_id,
            kabupaten_kota_id: taman.kabupaten_kota_id,
            kecamatan_id: taman.kecamatan_id,
            desa_id: taman.desa_id,
            latitude,
            longitude,
            batas_area: taman.batas_area,
            status: taman.status,
            created_by: taman.created_by,
            updated_by: taman.updated_by,
            created_at: taman.created_at,
            updated_at: taman.updated_at,
        }
    }
}

/// Centre point (masked) and boundary polygon of a garden as GeoJSON
pub fn garden_geometry(
    taman: &TamanKehati,
    policy: &MaskingPolicy,
    role: Option<Role>,
) -> FeatureCollection {
    let properties = |kind: &str| {
        let mut props = serde_json::Map::new();
        props.insert("id".into(), taman.id.into());
        props.insert("nama".into(), taman.nama_resmi.clone().into());
        props.insert("type".into(), kind.into());
        props
    };

    let mut features = Vec::new();

    if let Some(centre) = Coordinate::from_parts(taman.latitude, taman.longitude) {
        let geometry =
            policy.mask_geojson_point(&point_geometry(centre), role, Some(&taman.id.to_string()));
        features.push(Feature::new(geometry, properties("center_point")));
    }

    if let Some(boundary) = &taman.batas_area {
        features.push(Feature::new(boundary.clone(), properties("boundary")));
    }

    FeatureCollection::new(features)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NearbyTamanDto {
    #[serde(flatten)]
    pub taman: TamanKehatiResponseDto,
    /// Exact distance from the search point, only disclosed to admins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
}

/// Smallest radius a caller masked with `profile` may search
pub fn min_nearby_radius(profile: MaskingProfile) -> f64 {
    MIN_PUBLIC_NEARBY_RADIUS_METERS.max(profile.max_jitter_meters * 10.0)
}

/// Rank nearby gardens for a non-admin by the point they are shown, not the
/// stored one. Candidates must already cover `radius` plus the masking margin.
pub fn masked_nearby(
    origin: Coordinate,
    radius: f64,
    candidates: Vec<NearbyTaman>,
    policy: &MaskingPolicy,
    role: Option<Role>,
) -> Vec<NearbyTamanDto> {
    let mut ranked: Vec<(f64, TamanKehatiResponseDto)> = candidates
        .into_iter()
        .filter_map(|n| {
            let dto = TamanKehatiResponseDto::masked(n.taman, policy, role);
            let shown = Coordinate::from_parts(dto.latitude, dto.longitude)?;
            let distance = distance_meters(origin, shown);
            (distance <= radius).then_some((distance, dto))
        })
        .collect();

    ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
    ranked
        .into_iter()
        .take(MAX_NEARBY_RESULTS as usize)
        .map(|(_, taman)| NearbyTamanDto {
            taman,
            distance_m: None,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TamanStatsDto {
    pub koleksi_count: i64,
    pub artikel_count: i64,
    pub views_7d: i64,
    pub views_30d: i64,
}

impl From<TamanStats> for TamanStatsDto {
    fn from(s: TamanStats) -> Self {
        Self {
            koleksi_count: s.koleksi_count,
            artikel_count: s.artikel_count,
            views_7d: s.views_7d,
            views_30d: s.views_30d,
        }
    }
}

fn validate_coordinate_pair(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), ValidationError> {
    if latitude.is_some() != longitude.is_some() {
        let mut err = ValidationError::new("coordinate_pair");
        err.message = Some("latitude and longitude must be provided together".into());
        return Err(err);
    }
    Ok(())
}

fn validate_create_coordinates(dto: &CreateTamanKehatiDto) -> Result<(), ValidationError> {
    validate_coordinate_pair(dto.latitude, dto.longitude)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_coordinates"))]
pub struct CreateTamanKehatiDto {
    #[validate(
        length(min = 1, max = 50, message = "Kode must be 1-50 characters"),
        regex(
            path = "*crate::shared::validation::CODE_REGEX",
            message = "Kode may only contain letters, digits, '.', '/' and '-'"
        )
    )]
    pub kode: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Nama resmi must be 1-255 characters"))]
    pub nama_resmi: String,

    #[validate(length(min = 1, message = "Alamat is required"))]
    pub alamat: String,

    /// Area in hectares
    pub luas: Option<Decimal>,
    pub tipe_taman: TipeTaman,
    pub tanggal_penetapan: Option<NaiveDate>,
    pub deskripsi: Option<String>,
    pub provinsi_id: i32,
    pub kabupaten_kota_id: i32,
    pub kecamatan_id: Option<i32>,
    pub desa_id: Option<i32>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,

    /// GeoJSON Polygon
    #[validate(custom(function = "validate_polygon"))]
    #[schema(value_type = Option<Object>)]
    pub batas_area: Option<serde_json::Value>,

    #[serde(default)]
    pub status: StatusPublikasi,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTamanKehatiDto {
    #[validate(
        length(min = 1, max = 50, message = "Kode must be 1-50 characters"),
        regex(
            path = "*crate::shared::validation::CODE_REGEX",
            message = "Kode may only contain letters, digits, '.', '/' and '-'"
        )
    )]
    pub kode: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Nama resmi must be 1-255 characters"))]
    pub nama_resmi: Option<String>,

    #[validate(length(min = 1, message = "Alamat must not be empty"))]
    pub alamat: Option<String>,

    pub luas: Option<Decimal>,
    pub tipe_taman: Option<TipeTaman>,
    pub tanggal_penetapan: Option<NaiveDate>,
    pub deskripsi: Option<String>,
    pub provinsi_id: Option<i32>,
    pub kabupaten_kota_id: Option<i32>,
    pub kecamatan_id: Option<i32>,
    pub desa_id: Option<i32>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,

    #[validate(custom(function = "validate_polygon"))]
    #[schema(value_type = Option<Object>)]
    pub batas_area: Option<serde_json::Value>,

    pub status: Option<StatusPublikasi>,
}

/// Full set of column values written by an insert or update.
///
/// `batas_area` is the new boundary; `None` leaves the stored geometry untouched
/// on update and stores no boundary on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct TamanKehatiWrite {
    pub kode: Option<String>,
    pub nama_resmi: String,
    pub alamat: String,
    pub luas: Option<Decimal>,
    pub tipe_taman: TipeTaman,
    pub tanggal_penetapan: Option<NaiveDate>,
    pub deskripsi: Option<String>,
    pub provinsi_id: i32,
    pub kabupaten_kota_id: i32,
    pub kecamatan_id: Option<i32>,
    pub desa_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub batas_area: Option<serde_json::Value>,
    pub status: StatusPublikasi,
}

impl From<CreateTamanKehatiDto> for TamanKehatiWrite {
    fn from(dto: CreateTamanKehatiDto) -> Self {
        Self {
            kode: dto.kode,
            nama_resmi: dto.nama_resmi,
            alamat: dto.alamat,
            luas: dto.luas,
            tipe_taman: dto.tipe_taman,
            tanggal_penetapan: dto.tanggal_penetapan,
            deskripsi: dto.deskripsi,
            provinsi_id: dto.provinsi_id,
            kabupaten_kota_id: dto.kabupaten_kota_id,
            kecamatan_id: dto.kecamatan_id,
            desa_id: dto.desa_id,
            latitude: dto.latitude,
            longitude: dto.longitude,
            batas_area: dto.batas_area,
            status: dto.status,
        }
    }
}

impl UpdateTamanKehatiDto {
    /// Overlay the provided fields on the stored garden
    pub fn merge(self, current: &TamanKehati) -> Result<TamanKehatiWrite, AppError> {
        let latitude = self.latitude.or(current.latitude);
        let longitude = self.longitude.or(current.longitude);
        validate_coordinate_pair(latitude, longitude).map_err(|_| {
            AppError::Validation("latitude and longitude must be provided together".to_string())
        })?;

        Ok(TamanKehatiWrite {
            kode: self.kode.or_else(|| current.kode.clone()),
            nama_resmi: self.nama_resmi.unwrap_or_else(|| current.nama_resmi.clone()),
            alamat: self.alamat.unwrap_or_else(|| current.alamat.clone()),
            luas: self.luas.or(current.luas),
            tipe_taman: self.tipe_taman.unwrap_or(current.tipe_taman),
            tanggal_penetapan: self.tanggal_penetapan.or(current.tanggal_penetapan),
            deskripsi: self.deskripsi.or_else(|| current.deskripsi.clone()),
            provinsi_id: self.provinsi_id.unwrap_or(current.provinsi_id),
            kabupaten_kota_id: self.kabupaten_kota_id.unwrap_or(current.kabupaten_kota_id),
            kecamatan_id: self.kecamatan_id.or(current.kecamatan_id),
            desa_id: self.desa_id.or(current.desa_id),
            latitude,
            longitude,
            batas_area: self.batas_area,
            status: self.status.unwrap_or(current.status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn taman() -> TamanKehati {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        TamanKehati {
            id: 42,
            kode: Some("TK-JKT-001".to_string()),
            nama_resmi: "Taman Kehati Jakarta".to_string(),
            alamat: "Jl. Merdeka 1".to_string(),
            luas: Some(Decimal::new(1250, 2)),
            tipe_taman: TipeTaman::KehatiPemda,
            tanggal_penetapan: None,
            deskripsi: None,
            provinsi_id: 31,
            kabupaten_kota_id: 3171,
            kecamatan_id: None,
            desa_id: None,
            latitude: Some(-6.2),
            longitude: Some(106.816666),
            batas_area: None,
            status: StatusPublikasi::Published,
            created_by: None,
            updated_by: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn create_dto() -> CreateTamanKehatiDto {
        serde_json::from_value(json!({
            "kode": "TK-JKT-002",
            "nama_resmi": "Taman Kehati Baru",
            "alamat": "Jl. Baru 2",
            "tipe_taman": "kehati_sekolah",
            "provinsi_id": 31,
            "kabupaten_kota_id": 3171,
            "latitude": -6.1,
            "longitude": 106.8
        }))
        .unwrap()
    }

    #[test]
    fn test_admin_sees_exact_coordinates() {
        let dto = TamanKehatiResponseDto::masked(
            taman(),
            &MaskingPolicy::default(),
            Some(Role::AdminTaman),
        );
        assert_eq!(dto.latitude, Some(-6.2));
        assert_eq!(dto.longitude, Some(106.816666));
    }

    #[test]
    fn test_viewer_and_anonymous_get_masked_coordinates() {
        let policy = MaskingPolicy::default();
        let viewer = TamanKehatiResponseDto::masked(taman(), &policy, Some(Role::Viewer));
        let anonymous = TamanKehatiResponseDto::masked(taman(), &policy, None);

        let lat = viewer.latitude.unwrap();
        let lon = viewer.longitude.unwrap();
        assert!((lat - -6.2).abs() <= 30.0 / 111_320.0 + 1e-5);
        assert!((lon - 106.816666).abs() <= 30.0 / 111_320.0 + 1e-5);
        assert_eq!(anonymous.latitude, viewer.latitude);
        assert_eq!(anonymous.longitude, viewer.longitude);
    }

    #[test]
    fn test_missing_coordinates_stay_missing() {
        let mut t = taman();
        t.latitude = None;
        t.longitude = None;
        let dto = TamanKehatiResponseDto::masked(t, &MaskingPolicy::default(), None);
        assert!(dto.latitude.is_none() && dto.longitude.is_none());
    }

    #[test]
    fn test_create_validation() {
        assert!(create_dto().validate().is_ok());

        let mut dto = create_dto();
        dto.latitude = Some(95.0);
        assert!(dto.validate().is_err());

        let mut dto = create_dto();
        dto.longitude = None;
        assert!(dto.validate().is_err());

        let mut dto = create_dto();
        dto.kode = Some("TK 01".to_string());
        assert!(dto.validate().is_err());

        let mut dto = create_dto();
        dto.batas_area = Some(json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 0]]]}));
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_defaults_to_draft() {
        assert_eq!(create_dto().status, StatusPublikasi::Draft);
        let write = TamanKehatiWrite::from(create_dto());
        assert_eq!(write.nama_resmi, "Taman Kehati Baru");
        assert!(write.batas_area.is_none());
    }

    #[test]
    fn test_merge_keeps_unspecified_fields() {
        let update = UpdateTamanKehatiDto {
            nama_resmi: Some("Taman Kehati Jakarta Raya".to_string()),
            latitude: Some(-6.25),
            ..Default::default()
        };
        let merged = update.merge(&taman()).unwrap();
        assert_eq!(merged.nama_resmi, "Taman Kehati Jakarta Raya");
        assert_eq!(merged.alamat, "Jl. Merdeka 1");
        assert_eq!(merged.latitude, Some(-6.25));
        assert_eq!(merged.longitude, Some(106.816666));
        assert_eq!(merged.status, StatusPublikasi::Published);
    }

    #[test]
    fn test_merge_rejects_half_coordinate() {
        let mut current = taman();
        current.latitude = None;
        current.longitude = None;
        let update = UpdateTamanKehatiDto {
            latitude: Some(-6.25),
            ..Default::default()
        };
        assert!(matches!(update.merge(&current), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_garden_geometry_features() {
        let mut t = taman();
        t.batas_area = Some(json!({
            "type": "Polygon",
            "coordinates": [[[106.8, -6.2], [106.9, -6.2], [106.9, -6.1], [106.8, -6.2]]]
        }));

        let admin = garden_geometry(&t, &MaskingPolicy::default(), Some(Role::SuperAdmin));
        assert_eq!(admin.features.len(), 2);
        assert_eq!(admin.features[0].geometry["coordinates"][0], 106.816666);
        assert_eq!(admin.features[0].properties["type"], "center_point");
        assert_eq!(admin.features[1].properties["type"], "boundary");

        let public = garden_geometry(&t, &MaskingPolicy::default(), None);
        let lon = public.features[0].geometry["coordinates"][0].as_f64().unwrap();
        assert_eq!(lon, (lon * 1e5).round() / 1e5);

        t.latitude = None;
        t.batas_area = None;
        assert!(garden_geometry(&t, &MaskingPolicy::default(), None).features.is_empty());
    }

    #[test]
    fn test_nearby_radius() {
        let q = |radius_m| NearbyQuery { lat: -6.2, lng: 106.8, radius_m };
        assert_eq!(q(None).radius(0.0).unwrap(), DEFAULT_NEARBY_RADIUS_METERS);
        assert_eq!(q(Some(1e9)).radius(0.0).unwrap(), MAX_NEARBY_RADIUS_METERS);
        assert!(q(Some(0.0)).radius(0.0).is_err());

        let bad = NearbyQuery { lat: 100.0, lng: 0.0, radius_m: None };
        assert!(bad.radius(0.0).is_err());
    }

    fn nearby(id: i32, latitude: f64, longitude: f64) -> NearbyTaman {
        NearbyTaman {
            taman: TamanKehati {
                id,
                latitude: Some(latitude),
                longitude: Some(longitude),
                ..taman()
            },
            distance_m: 0.0,
        }
    }

    #[test]
    fn test_nearby_radius_floor() {
        let query = |radius_m: Option<f64>| NearbyQuery {
            lat: -6.2,
            lng: 106.8,
            radius_m,
        };
        let floor = min_nearby_radius(MaskingPolicy::default().profile_for("viewer"));
        assert_eq!(floor, MIN_PUBLIC_NEARBY_RADIUS_METERS);

        assert!(query(Some(0.5)).radius(floor).is_err());
        assert!(query(Some(floor - 1.0)).radius(floor).is_err());
        assert_eq!(query(Some(floor)).radius(floor).unwrap(), floor);
        assert_eq!(query(None).radius(floor).unwrap(), DEFAULT_NEARBY_RADIUS_METERS);
        assert_eq!(query(Some(0.5)).radius(0.0).unwrap(), 0.5);
        assert_eq!(
            query(Some(9e9)).radius(floor).unwrap(),
            MAX_NEARBY_RADIUS_METERS
        );
    }

    #[test]
    fn test_min_nearby_radius_tracks_large_jitter() {
        assert_eq!(min_nearby_radius(MaskingProfile::new(3, 500.0)), 5_000.0);
    }

    #[test]
    fn test_masked_nearby_filters_and_orders_on_shown_point() {
        let policy = MaskingPolicy::default();
        let origin = Coordinate::new(-6.2, 106.8);
        let candidates = vec![
            nearby(1, -6.2, 106.8 + 0.02),
            nearby(2, -6.2, 106.8 + 0.001),
            nearby(3, -6.2, 106.8 + 0.5),
            nearby(4, -6.2 + 0.005, 106.8),
        ];

        let results = masked_nearby(origin, 5_000.0, candidates, &policy, None);
        let ids: Vec<i32> = results.iter().map(|r| r.taman.id).collect();
        assert_eq!(ids, vec![2, 4, 1]);

        let mut last = 0.0;
        for r in &results {
            assert!(r.distance_m.is_none());
            let shown = Coordinate::from_parts(r.taman.latitude, r.taman.longitude).unwrap();
            let d = distance_meters(origin, shown);
            assert!(d <= 5_000.0);
            assert!(d >= last);
            last = d;
        }
    }

    #[test]
    fn test_masked_nearby_caps_results() {
        let policy = MaskingPolicy::default();
        let origin = Coordinate::new(0.0, 0.0);
        let candidates = (1..=50).map(|id| nearby(id, 0.0, id as f64 * 0.0001)).collect();
        let results = masked_nearby(origin, 50_000.0, candidates, &policy, Some(Role::Viewer));
        assert_eq!(results.len(), MAX_NEARBY_RESULTS as usize);
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::AppError;
use crate::features::zones::models::ZonaTaman;
use crate::shared::constants::MAX_ZONA_IMPORT;
use crate::shared::geojson::{validate_polygon, Feature};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ZonaListQuery {
    pub taman_kehati_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ZonaResponseDto {
    pub id: i32,
    pub taman_kehati_id: i32,
    pub kode_zona: String,
    pub nama_zona: Option<String>,
    pub deskripsi: Option<String>,
    pub luas: Option<Decimal>,
    pub warna: Option<String>,
    pub has_poligon: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ZonaTaman> for ZonaResponseDto {
    fn from(z: ZonaTaman) -> Self {
        Self {
            id: z.id,
            taman_kehati_id: z.taman_kehati_id,
            kode_zona: z.kode_zona,
            nama_zona: z.nama_zona,
            deskripsi: z.deskripsi,
            luas: z.luas,
            warna: z.warna,
            has_poligon: z.poligon.is_some(),
            created_at: z.created_at,
            updated_at: z.updated_at,
        }
    }
}

impl ZonaTaman {
    /// Zone polygon as a GeoJSON Feature, `None` when no polygon was drawn
    pub fn to_feature(&self) -> Option<Feature> {
        let geometry = self.poligon.clone()?;
        let mut props = serde_json::Map::new();
        props.insert("id".into(), self.id.into());
        props.insert("kode_zona".into(), self.kode_zona.clone().into());
        props.insert("nama_zona".into(), self.nama_zona.clone().into());
        props.insert("warna".into(), self.warna.clone().into());
        Some(Feature::new(geometry, props))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateZonaDto {
    pub taman_kehati_id: i32,

    #[validate(
        length(min = 1, max = 50, message = "Kode zona must be 1-50 characters"),
        regex(
            path = "*crate::shared::validation::CODE_REGEX",
            message = "Kode zona may only contain letters, digits, '.', '/' and '-'"
        )
    )]
    pub kode_zona: String,

    #[validate(length(max = 255, message = "Nama zona must not exceed 255 characters"))]
    pub nama_zona: Option<String>,

    pub deskripsi: Option<String>,
    pub luas: Option<Decimal>,

    /// GeoJSON Polygon
    #[validate(custom(function = "validate_polygon"))]
    #[schema(value_type = Option<Object>)]
    pub poligon: Option<serde_json::Value>,

    /// Map colour as `#RRGGBB`
    #[validate(regex(
        path = "*crate::shared::validation::HEX_COLOR_REGEX",
        message = "Warna must be a #RRGGBB colour"
    ))]
    pub warna: Option<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateZonaDto {
    /// Move the zone to another garden
    pub taman_kehati_id: Option<i32>,

    #[validate(
        length(min = 1, max = 50, message = "Kode zona must be 1-50 characters"),
        regex(
            path = "*crate::shared::validation::CODE_REGEX",
            message = "Kode zona may only contain letters, digits, '.', '/' and '-'"
        )
    )]
    pub kode_zona: Option<String>,

    #[validate(length(max = 255, message = "Nama zona must not exceed 255 characters"))]
    pub nama_zona: Option<String>,

    pub deskripsi: Option<String>,
    pub luas: Option<Decimal>,

    #[validate(custom(function = "validate_polygon"))]
    #[schema(value_type = Option<Object>)]
    pub poligon: Option<serde_json::Value>,

    #[validate(regex(
        path = "*crate::shared::validation::HEX_COLOR_REGEX",
        message = "Warna must be a #RRGGBB colour"
    ))]
    pub warna: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ImportZonaQuery {
    /// Garden receiving the imported zones
    pub taman_kehati_id: i32,
}

/// Zones described by a GeoJSON document.
///
/// Accepts a bare Polygon or MultiPolygon, a Feature, or a FeatureCollection
/// (one zone per feature). Only the first polygon of a MultiPolygon is kept.
/// Feature properties `kode_zona`, `nama_zona` (or `name`), `deskripsi` (or
/// `description`), `luas` and `warna` fill the zone; a missing `kode_zona` is
/// derived from the geometry.
pub fn zones_from_geojson(
    taman_kehati_id: i32,
    geojson: &Value,
) -> Result<Vec<CreateZonaDto>, AppError> {
    let kind = geojson.get("type").and_then(Value::as_str);
    let features: Vec<(Option<&Value>, Option<&Map<String, Value>>)> = match kind {
        Some("FeatureCollection") => geojson
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| bad_import("FeatureCollection must contain a features array"))?
            .iter()
            .map(|f| (f.get("geometry"), f.get("properties").and_then(Value::as_object)))
            .collect(),
        Some("Feature") => vec![(
            geojson.get("geometry"),
            geojson.get("properties").and_then(Value::as_object),
        )],
        Some("Polygon") | Some("MultiPolygon") => vec![(Some(geojson), None)],
        Some(other) => {
            return Err(bad_import(&format!(
                "Unsupported GeoJSON type '{}', expected Polygon, MultiPolygon, Feature or FeatureCollection",
                other
            )))
        }
        None => return Err(bad_import("GeoJSON object must have a type")),
    };

    if features.is_empty() {
        return Err(bad_import("GeoJSON contains no features"));
    }
    if features.len() > MAX_ZONA_IMPORT {
        return Err(bad_import(&format!(
            "At most {} zones can be imported at once",
            MAX_ZONA_IMPORT
        )));
    }

    let mut zones: Vec<CreateZonaDto> = Vec::with_capacity(features.len());
    for (i, (geometry, properties)) in features.into_iter().enumerate() {
        let geometry = geometry
            .filter(|g| !g.is_null())
            .ok_or_else(|| bad_import(&format!("feature {}: missing geometry", i)))?;
        let poligon =
            polygon_of(geometry).map_err(|e| bad_import(&format!("feature {}: {}", i, e)))?;
        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| properties.and_then(|p| p.get(*k)).and_then(Value::as_str))
                .map(str::to_string)
        };

        let dto = CreateZonaDto {
            taman_kehati_id,
            kode_zona: text(&["kode_zona"]).unwrap_or_else(|| derived_code(&poligon)),
            nama_zona: text(&["nama_zona", "name"]),
            deskripsi: text(&["deskripsi", "description"]),
            luas: properties
                .and_then(|p| p.get("luas"))
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            poligon: Some(poligon),
            warna: text(&["warna"]),
        };
        dto.validate()
            .map_err(|e| AppError::Validation(format!("feature {}: {}", i, e)))?;

        if zones.iter().any(|z| z.kode_zona == dto.kode_zona) {
            return Err(bad_import(&format!(
                "feature {}: kode_zona '{}' appears more than once",
                i, dto.kode_zona
            )));
        }
        zones.push(dto);
    }

    Ok(zones)
}

fn bad_import(message: &str) -> AppError {
    AppError::BadRequest(format!("Invalid GeoJSON: {}", message))
}

fn polygon_of(geometry: &Value) -> Result<Value, String> {
    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => Ok(geometry.clone()),
        Some("MultiPolygon") => geometry
            .get("coordinates")
            .and_then(Value::as_array)
            .and_then(|polygons| polygons.first())
            .map(|rings| serde_json::json!({"type": "Polygon", "coordinates": rings}))
            .ok_or_else(|| "MultiPolygon has no polygons".to_string()),
        Some(other) => Err(format!("geometry type {} is not a polygon", other)),
        None => Err("geometry must have a type".to_string()),
    }
}

/// `ZONA-` plus the first 8 hex digits of the polygon's SHA-256
fn derived_code(polygon: &Value) -> String {
    let digest = Sha256::digest(polygon.to_string().as_bytes());
    format!("ZONA-{}", &hex::encode(digest)[..8]).to_uppercase()
}

/// Column values written by insert/update. `poligon: None` keeps the stored polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonaWrite {
    pub taman_kehati_id: i32,
    pub kode_zona: String,
    pub nama_zona: Option<String>,
    pub deskripsi: Option<String>,
    pub luas: Option<Decimal>,
    pub poligon: Option<serde_json::Value>,
    pub warna: Option<String>,
}

impl From<CreateZonaDto> for ZonaWrite {
    fn from(dto: CreateZonaDto) -> Self {
        Self {
            taman_kehati_id: dto.taman_kehati_id,
            kode_zona: dto.kode_zona,
            nama_zona: dto.nama_zona,
            deskripsi: dto.deskripsi,
            luas: dto.luas,
            poligon: dto.poligon,
            warna: dto.warna,
        }
    }
}

impl UpdateZonaDto {
    pub fn merge(self, current: &ZonaTaman) -> ZonaWrite {
        ZonaWrite {
            taman_kehati_id: self.taman_kehati_id.unwrap_or(current.taman_kehati_id),
            kode_zona: self.kode_zona.unwrap_or_else(|| current.kode_zona.clone()),
            nama_zona: self.nama_zona.or_else(|| current.nama_zona.clone()),
            deskripsi: self.deskripsi.or_else(|| current.deskripsi.clone()),
            luas: self.luas.or(current.luas),
            poligon: self.poligon,
            warna: self.warna.or_else(|| current.warna.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn zona() -> ZonaTaman {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        ZonaTaman {
            id: 5,
            taman_kehati_id: 1,
            kode_zona: "Z-INTI".to_string(),
            nama_zona: Some("Zona Inti".to_string()),
            deskripsi: None,
            luas: None,
            poligon: Some(json!({
                "type": "Polygon",
                "coordinates": [[[106.8, -6.6], [106.81, -6.6], [106.81, -6.59], [106.8, -6.6]]]
            })),
            warna: Some("#2E7D32".to_string()),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn create_dto(warna: &str) -> CreateZonaDto {
        CreateZonaDto {
            taman_kehati_id: 1,
            kode_zona: "Z-01".to_string(),
            nama_zona: Some("Zona Koleksi".to_string()),
            deskripsi: None,
            luas: None,
            poligon: None,
            warna: Some(warna.to_string()),
        }
    }

    #[test]
    fn test_colour_must_be_hex() {
        assert!(create_dto("#A1B2C3").validate().is_ok());
        assert!(create_dto("green").validate().is_err());
        assert!(create_dto("#FFF").validate().is_err());
    }

    #[test]
    fn test_polygon_is_validated() {
        let mut dto = create_dto("#A1B2C3");
        dto.poligon = Some(json!({"type": "LineString", "coordinates": [[0, 0], [1, 1]]}));
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_feature_properties() {
        let feature = zona().to_feature().unwrap();
        assert_eq!(feature.kind, "Feature");
        assert_eq!(feature.properties["kode_zona"], "Z-INTI");
        assert_eq!(feature.properties["warna"], "#2E7D32");

        let mut bare = zona();
        bare.poligon = None;
        assert!(bare.to_feature().is_none());
    }

    #[test]
    fn test_merge() {
        let update = UpdateZonaDto {
            nama_zona: Some("Zona Inti Baru".to_string()),
            ..Default::default()
        };
        let merged = update.merge(&zona());
        assert_eq!(merged.kode_zona, "Z-INTI");
        assert_eq!(merged.nama_zona.as_deref(), Some("Zona Inti Baru"));
        assert_eq!(merged.taman_kehati_id, 1);
        assert!(merged.poligon.is_none());
    }

    #[test]
    fn test_response_hides_polygon() {
        let dto = ZonaResponseDto::from(zona());
        assert!(dto.has_poligon);
        let value = serde_json::to_value(&dto).unwrap();
        assert!(value.get("poligon").is_none());
    }

    fn square(offset: f64) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[
                [106.8 + offset, -6.6], [106.81 + offset, -6.6],
                [106.81 + offset, -6.59], [106.8 + offset, -6.6]
            ]]
        })
    }

    #[test]
    fn test_import_feature_collection() {
        let rings = square(0.1)["coordinates"].clone();
        let geojson = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": square(0.0),
                    "properties": {"kode_zona": "Z-INTI", "name": "Zona Inti", "warna": "#2E7D32"}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "MultiPolygon", "coordinates": [rings]},
                    "properties": {"kode_zona": "Z-PENYANGGA", "deskripsi": "Penyangga", "luas": 2.5}
                }
            ]
        });

        let zones = zones_from_geojson(3, &geojson).unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].taman_kehati_id, 3);
        assert_eq!(zones[0].nama_zona.as_deref(), Some("Zona Inti"));
        assert_eq!(zones[0].warna.as_deref(), Some("#2E7D32"));
        assert_eq!(zones[1].poligon.as_ref().unwrap()["type"], "Polygon");
        assert_eq!(zones[1].deskripsi.as_deref(), Some("Penyangga"));
        assert_eq!(zones[1].luas, Some(Decimal::new(25, 1)));
    }

    #[test]
    fn test_import_bare_polygon_derives_code() {
        let zones = zones_from_geojson(1, &square(0.0)).unwrap();
        let again = zones_from_geojson(1, &square(0.0)).unwrap();
        let other = zones_from_geojson(1, &square(0.2)).unwrap();

        assert_eq!(zones.len(), 1);
        assert!(zones[0].kode_zona.starts_with("ZONA-"));
        assert_eq!(zones[0].kode_zona.len(), 13);
        assert_eq!(zones[0].kode_zona, again[0].kode_zona);
        assert_ne!(zones[0].kode_zona, other[0].kode_zona);
        assert!(zones[0].validate().is_ok());
    }

    #[test]
    fn test_import_rejects_bad_documents() {
        assert!(zones_from_geojson(1, &json!({"coordinates": []})).is_err());
        assert!(zones_from_geojson(1, &json!({"type": "Point", "coordinates": [106.8, -6.6]})).is_err());
        assert!(zones_from_geojson(1, &json!({"type": "FeatureCollection", "features": []})).is_err());
        assert!(zones_from_geojson(1, &json!({"type": "Feature", "geometry": null})).is_err());

        let open_ring = json!({
            "type": "Polygon",
            "coordinates": [[[106.8, -6.6], [106.81, -6.6], [106.81, -6.59], [106.8, -6.59]]]
        });
        assert!(matches!(
            zones_from_geojson(1, &open_ring),
            Err(AppError::Validation(_))
        ));

        let line = json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}
        });
        assert!(zones_from_geojson(1, &line).is_err());
    }

    #[test]
    fn test_import_rejects_duplicate_codes() {
        let feature = json!({
            "type": "Feature",
            "geometry": square(0.0),
            "properties": {"kode_zona": "Z-01"}
        });
        let geojson = json!({"type": "FeatureCollection", "features": [feature.clone(), feature]});
        assert!(matches!(
            zones_from_geojson(1, &geojson),
            Err(AppError::BadRequest(_))
        ));
    }
}

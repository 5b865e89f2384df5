use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(value_type = Object)]
    pub geometry: Value,
    #[schema(value_type = Object)]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Value, properties: Map<String, Value>) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry,
            properties,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}

/// Drop null entries so exported properties only carry known values
pub fn compact(properties: Map<String, Value>) -> Map<String, Value> {
    properties.into_iter().filter(|(_, v)| !v.is_null()).collect()
}

/// Validate a GeoJSON Polygon geometry: every ring closed, at least four
/// positions, longitude/latitude within WGS84 bounds.
pub fn validate_polygon(geometry: &Value) -> Result<(), ValidationError> {
    check_polygon(geometry).map_err(|message| {
        let mut err = ValidationError::new("invalid_polygon");
        err.message = Some(message.into());
        err
    })
}

fn check_polygon(geometry: &Value) -> Result<(), String> {
    if geometry.get("type").and_then(Value::as_str) != Some("Polygon") {
        return Err("geometry type must be Polygon".to_string());
    }

    let rings = geometry
        .get("coordinates")
        .and_then(Value::as_array)
        .filter(|rings| !rings.is_empty())
        .ok_or("Polygon must contain at least one ring")?;

    for (i, ring) in rings.iter().enumerate() {
        let positions = ring
            .as_array()
            .ok_or_else(|| format!("ring {} must be an array of positions", i))?;

        if positions.len() < 4 {
            return Err(format!("ring {} must have at least 4 positions", i));
        }

        let parsed = positions
            .iter()
            .map(parse_position)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("ring {}: {}", i, e))?;

        if parsed.first() != parsed.last() {
            return Err(format!("ring {} is not closed", i));
        }
    }

    Ok(())
}

fn parse_position(position: &Value) -> Result<(f64, f64), String> {
    let pair = position
        .as_array()
        .filter(|p| p.len() >= 2)
        .ok_or("position must be [lon, lat]")?;

    let lon = pair[0].as_f64().ok_or("longitude must be a number")?;
    let lat = pair[1].as_f64().ok_or("latitude must be a number")?;

    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("longitude {} out of range", lon));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {} out of range", lat));
    }

    Ok((lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[
                [106.80, -6.60], [106.81, -6.60], [106.81, -6.59], [106.80, -6.59], [106.80, -6.60]
            ]]
        })
    }

    #[test]
    fn test_valid_polygon() {
        assert!(validate_polygon(&square()).is_ok());
    }

    #[test]
    fn test_open_ring_rejected() {
        let open = json!({
            "type": "Polygon",
            "coordinates": [[[106.80, -6.60], [106.81, -6.60], [106.81, -6.59], [106.80, -6.59]]]
        });
        assert!(check_polygon(&open).unwrap_err().contains("not closed"));
    }

    #[test]
    fn test_short_ring_rejected() {
        let short = json!({
            "type": "Polygon",
            "coordinates": [[[106.80, -6.60], [106.81, -6.60], [106.80, -6.60]]]
        });
        assert!(check_polygon(&short).unwrap_err().contains("at least 4"));
    }

    #[test]
    fn test_wrong_type_and_range_rejected() {
        assert!(validate_polygon(&json!({"type": "Point", "coordinates": [0, 0]})).is_err());

        let out_of_range = json!({
            "type": "Polygon",
            "coordinates": [[[200.0, 0.0], [1.0, 0.0], [1.0, 1.0], [200.0, 0.0]]]
        });
        assert!(check_polygon(&out_of_range).unwrap_err().contains("longitude"));
    }

    #[test]
    fn test_compact_drops_nulls() {
        let mut props = Map::new();
        props.insert("genus".into(), json!("Rafflesia"));
        props.insert("spesies".into(), Value::Null);
        let compacted = compact(props);
        assert_eq!(compacted.len(), 1);
        assert!(compacted.contains_key("genus"));
    }

    #[test]
    fn test_feature_collection_shape() {
        let fc = FeatureCollection::new(vec![Feature::new(square(), Map::new())]);
        let value = serde_json::to_value(&fc).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
    }
}

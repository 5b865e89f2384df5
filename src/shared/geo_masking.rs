//! Coordinate privacy masking.
//!
//! Exact specimen locations are only disclosed to administrative roles. Every
//! other caller receives a coordinate that is rounded and shifted by a
//! deterministic offset derived from the record's identity, so repeated
//! requests for the same record always return the same masked point.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use crate::core::config::MaskingConfig;
use crate::features::auth::model::Role;
use crate::shared::constants::{ROLE_ADMIN_TAMAN, ROLE_SUPER_ADMIN, ROLE_VIEWER};

/// Equatorial approximation, applied regardless of latitude
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Mean Earth radius (IUGG)
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Profile key used for any role without an explicit entry
pub const FALLBACK_PROFILE: &str = "*";

/// WGS84 point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build from nullable columns; both halves must be present
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        Some(Self::new(latitude?, longitude?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskingProfile {
    /// Decimal places kept after masking
    pub precision: u32,
    pub max_jitter_meters: f64,
}

impl MaskingProfile {
    pub const fn new(precision: u32, max_jitter_meters: f64) -> Self {
        Self {
            precision,
            max_jitter_meters,
        }
    }

    fn max_jitter_degrees(&self) -> f64 {
        self.max_jitter_meters / METERS_PER_DEGREE
    }

    /// Upper bound on how far a masked point can land from the true one
    pub fn max_displacement_meters(&self) -> f64 {
        let rounding_degrees = 0.5 / 10f64.powi(self.precision.min(15) as i32);
        (self.max_jitter_degrees() + rounding_degrees) * METERS_PER_DEGREE * std::f64::consts::SQRT_2
    }
}

/// Role name to masking profile lookup with a single `"*"` fallback entry
#[derive(Debug, Clone)]
pub struct MaskingPolicy {
    profiles: HashMap<String, MaskingProfile>,
}

impl Default for MaskingPolicy {
    fn default() -> Self {
        Self::from_config(&MaskingConfig::default())
    }
}

impl MaskingPolicy {
    pub fn new(fallback: MaskingProfile) -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(FALLBACK_PROFILE.to_string(), fallback);
        Self { profiles }
    }

    pub fn with_profile(mut self, role: &str, profile: MaskingProfile) -> Self {
        self.profiles.insert(role.to_string(), profile);
        self
    }

    pub fn from_config(config: &MaskingConfig) -> Self {
        let admin = MaskingProfile::new(config.admin_precision, 0.0);
        let public = MaskingProfile::new(config.precision, config.max_jitter_meters);

        Self::new(public)
            .with_profile(ROLE_SUPER_ADMIN, admin)
            .with_profile(ROLE_ADMIN_TAMAN, admin)
            .with_profile(ROLE_VIEWER, public)
    }

    /// Profile for a role name, or the fallback when the role is not listed
    pub fn profile_for(&self, role: &str) -> MaskingProfile {
        self.profiles
            .get(role)
            .or_else(|| self.profiles.get(FALLBACK_PROFILE))
            .copied()
            // `new` always inserts the fallback entry
            .unwrap_or(MaskingProfile::new(0, 0.0))
    }

    /// Profile applied to a caller; anonymous callers get the fallback
    pub fn profile_for_caller(&self, role: Option<Role>) -> MaskingProfile {
        self.profile_for(role.map(|r| r.as_str()).unwrap_or(FALLBACK_PROFILE))
    }

    /// Mask a coordinate for a caller. Anonymous callers (`None`) use the fallback profile.
    pub fn mask(
        &self,
        coordinate: Coordinate,
        role: Option<Role>,
        resource_id: Option<&str>,
    ) -> Coordinate {
        self.mask_with_profile(coordinate, role, resource_id, None)
    }

    pub fn mask_with_profile(
        &self,
        coordinate: Coordinate,
        role: Option<Role>,
        resource_id: Option<&str>,
        profile_override: Option<MaskingProfile>,
    ) -> Coordinate {
        if role.is_some_and(|r| r.is_admin()) {
            return coordinate;
        }

        let profile = profile_override.unwrap_or_else(|| self.profile_for_caller(role));

        let (lat_jitter, lon_jitter) = match resource_id.filter(|id| !id.is_empty()) {
            Some(id) if profile.max_jitter_meters > 0.0 => {
                let (lat_frac, lon_frac) = jitter_fractions(id);
                let scale = profile.max_jitter_degrees();
                (lat_frac * scale, lon_frac * scale)
            }
            _ => (0.0, 0.0),
        };

        tracing::debug!(
            precision = profile.precision,
            jittered = lat_jitter != 0.0 || lon_jitter != 0.0,
            "Masking coordinate"
        );

        Coordinate::new(
            round_to(coordinate.latitude + lat_jitter, profile.precision),
            round_to(coordinate.longitude + lon_jitter, profile.precision),
        )
    }

    /// Mask a pair of nullable coordinate columns. A lone half cannot be
    /// jittered as a point, so non-admins get neither value.
    pub fn mask_parts(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
        role: Option<Role>,
        resource_id: &str,
    ) -> (Option<f64>, Option<f64>) {
        match Coordinate::from_parts(latitude, longitude) {
            Some(c) => {
                let masked = self.mask(c, role, Some(resource_id));
                (Some(masked.latitude), Some(masked.longitude))
            }
            None if role.is_some_and(|r| r.is_admin()) => (latitude, longitude),
            None => (None, None),
        }
    }

    /// Mask a GeoJSON Point geometry (`coordinates` are `[lon, lat]`).
    /// Other geometry types are returned unchanged.
    pub fn mask_geojson_point(
        &self,
        geometry: &serde_json::Value,
        role: Option<Role>,
        resource_id: Option<&str>,
    ) -> serde_json::Value {
        let is_point = geometry.get("type").and_then(|t| t.as_str()) == Some("Point");
        let position = geometry
            .get("coordinates")
            .and_then(|c| c.as_array())
            .filter(|c| c.len() >= 2)
            .and_then(|c| Some((c[0].as_f64()?, c[1].as_f64()?)));

        match (is_point, position) {
            (true, Some((lon, lat))) => {
                let masked = self.mask(Coordinate::new(lat, lon), role, resource_id);
                point_geometry(masked)
            }
            _ => geometry.clone(),
        }
    }
}

/// GeoJSON Point for a coordinate
pub fn point_geometry(coordinate: Coordinate) -> serde_json::Value {
    serde_json::json!({
        "type": "Point",
        "coordinates": [coordinate.longitude, coordinate.latitude],
    })
}

/// Great-circle (haversine) distance between two points
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Round the stored binary value to `precision` decimal places, ties to even,
/// and return the nearest `f64` to the rounded decimal
pub fn round_to(value: f64, precision: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_string().parse().ok())
        .unwrap_or(value)
}

/// Two values in [-1, 1] derived from the SHA-256 digest of `resource_id`:
/// bytes 0-1 (big-endian) for latitude, bytes 2-3 for longitude.
fn jitter_fractions(resource_id: &str) -> (f64, f64) {
    let digest = Sha256::digest(resource_id.as_bytes());
    let to_fraction = |hi: u8, lo: u8| f64::from(u16::from_be_bytes([hi, lo])) / 65535.0 * 2.0 - 1.0;
    (
        to_fraction(digest[0], digest[1]),
        to_fraction(digest[2], digest[3]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};

    const JAKARTA: Coordinate = Coordinate {
        latitude: -6.2,
        longitude: 106.816666,
    };

    fn random_coordinate() -> Coordinate {
        Coordinate::new((-89.0..89.0).fake(), (-179.0..179.0).fake())
    }

    fn rounding_slack(precision: u32) -> f64 {
        0.5 / 10f64.powi(precision as i32) + 1e-12
    }

    #[test]
    fn test_admin_roles_see_exact_coordinates() {
        let policy = MaskingPolicy::default();
        for _ in 0..50 {
            let c = random_coordinate();
            let id: u64 = Faker.fake();
            let id = id.to_string();
            for role in [Role::SuperAdmin, Role::AdminTaman] {
                assert_eq!(policy.mask(c, Some(role), Some(&id)), c);
                assert_eq!(policy.mask(c, Some(role), None), c);
            }
        }
    }

    #[test]
    fn test_admin_bypass_ignores_profile_override() {
        let policy = MaskingPolicy::default();
        let masked = policy.mask_with_profile(
            JAKARTA,
            Some(Role::SuperAdmin),
            Some("42"),
            Some(MaskingProfile::new(1, 5000.0)),
        );
        assert_eq!(masked, JAKARTA);
    }

    #[test]
    fn test_masking_is_deterministic_per_resource() {
        let policy = MaskingPolicy::default();
        for _ in 0..50 {
            let c = random_coordinate();
            let id: u32 = Faker.fake();
            let id = id.to_string();
            let first = policy.mask(c, Some(Role::Viewer), Some(&id));
            let second = policy.mask(c, Some(Role::Viewer), Some(&id));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_jitter_stays_within_radius() {
        let policy = MaskingPolicy::default();
        let profile = policy.profile_for(ROLE_VIEWER);
        let bound = profile.max_jitter_meters / METERS_PER_DEGREE + rounding_slack(profile.precision);

        for _ in 0..200 {
            let c = random_coordinate();
            let id: u64 = Faker.fake();
            let masked = policy.mask(c, Some(Role::Viewer), Some(&id.to_string()));
            assert!((masked.latitude - c.latitude).abs() <= bound);
            assert!((masked.longitude - c.longitude).abs() <= bound);
        }
    }

    #[test]
    fn test_missing_resource_id_only_rounds() {
        let policy = MaskingPolicy::default();
        for _ in 0..50 {
            let c = random_coordinate();
            for id in [None, Some("")] {
                let masked = policy.mask(c, Some(Role::Viewer), id);
                assert_eq!(masked.latitude, round_to(c.latitude, 5));
                assert_eq!(masked.longitude, round_to(c.longitude, 5));
            }
        }
    }

    #[test]
    fn test_zero_jitter_profile_only_rounds() {
        let policy = MaskingPolicy::default();
        let masked = policy.mask_with_profile(
            JAKARTA,
            Some(Role::Viewer),
            Some("42"),
            Some(MaskingProfile::new(3, 0.0)),
        );
        assert_eq!(masked, Coordinate::new(-6.2, 106.817));
    }

    #[test]
    fn test_jakarta_viewer_scenario() {
        let policy = MaskingPolicy::default();
        let masked = policy.mask(JAKARTA, Some(Role::Viewer), Some("42"));

        assert!((masked.latitude - JAKARTA.latitude).abs() <= 0.00027 + rounding_slack(5));
        assert!((masked.longitude - JAKARTA.longitude).abs() <= 0.00027 + rounding_slack(5));
        assert_eq!(masked.latitude, round_to(masked.latitude, 5));
        assert_eq!(masked.longitude, round_to(masked.longitude, 5));

        for _ in 0..10 {
            assert_eq!(policy.mask(JAKARTA, Some(Role::Viewer), Some("42")), masked);
        }
    }

    #[test]
    fn test_jakarta_super_admin_scenario() {
        let policy = MaskingPolicy::default();
        let masked = policy.mask(JAKARTA, Some(Role::SuperAdmin), Some("42"));
        assert_eq!(masked, Coordinate::new(-6.2, 106.816666));
    }

    #[test]
    fn test_unlisted_role_and_anonymous_use_fallback() {
        let policy = MaskingPolicy::new(MaskingProfile::new(2, 0.0));
        // Viewer has no explicit entry here
        let masked = policy.mask(JAKARTA, Some(Role::Viewer), Some("42"));
        assert_eq!(masked, Coordinate::new(-6.2, 106.82));

        let anonymous = policy.mask(JAKARTA, None, Some("42"));
        assert_eq!(anonymous, masked);
        assert_eq!(policy.profile_for("gardener"), MaskingProfile::new(2, 0.0));
    }

    #[test]
    fn test_different_resources_usually_differ() {
        let policy = MaskingPolicy::default();
        let a = policy.mask(JAKARTA, Some(Role::Viewer), Some("1"));
        let b = policy.mask(JAKARTA, Some(Role::Viewer), Some("2"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_jitter_fractions_in_unit_range() {
        for _ in 0..100 {
            let id: String = Faker.fake();
            let (lat, lon) = jitter_fractions(&id);
            assert!((-1.0..=1.0).contains(&lat));
            assert!((-1.0..=1.0).contains(&lon));
        }
    }

    #[test]
    fn test_geojson_point_masking() {
        let policy = MaskingPolicy::default();
        let geometry = point_geometry(JAKARTA);

        let admin = policy.mask_geojson_point(&geometry, Some(Role::AdminTaman), Some("42"));
        assert_eq!(admin, geometry);

        let viewer = policy.mask_geojson_point(&geometry, Some(Role::Viewer), Some("42"));
        let expected = policy.mask(JAKARTA, Some(Role::Viewer), Some("42"));
        assert_eq!(viewer["coordinates"][0].as_f64(), Some(expected.longitude));
        assert_eq!(viewer["coordinates"][1].as_f64(), Some(expected.latitude));

        let polygon = serde_json::json!({"type": "Polygon", "coordinates": []});
        assert_eq!(
            policy.mask_geojson_point(&polygon, Some(Role::Viewer), Some("42")),
            polygon
        );
    }

    #[test]
    fn test_mask_parts_drops_lone_half_for_non_admins() {
        let policy = MaskingPolicy::default();
        assert_eq!(
            policy.mask_parts(None, Some(106.8), Some(Role::Viewer), "1"),
            (None, None)
        );
        assert_eq!(
            policy.mask_parts(Some(-6.2), None, None, "1"),
            (None, None)
        );
        assert_eq!(
            policy.mask_parts(None, Some(106.8), Some(Role::AdminTaman), "1"),
            (None, Some(106.8))
        );
        assert_eq!(policy.mask_parts(None, None, None, "1"), (None, None));
    }

    #[test]
    fn test_round_to_uses_stored_value_and_ties_to_even() {
        // -6.988365 is stored just below the midpoint
        assert_eq!(round_to(-6.988365, 5), -6.98836);
        // exact binary ties go to the even digit
        assert_eq!(round_to(106.015625, 5), 106.01562);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(106.816666, 3), 106.817);
        assert_eq!(round_to(-6.2, 5), -6.2);
    }

    #[test]
    fn test_round_to_is_idempotent() {
        for _ in 0..200 {
            let c = random_coordinate();
            let once = round_to(c.latitude, 5);
            assert_eq!(round_to(once, 5), once);
        }
    }

    #[test]
    fn test_distance_meters() {
        assert_eq!(distance_meters(JAKARTA, JAKARTA), 0.0);

        let one_degree = distance_meters(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((one_degree - 111_195.08).abs() < 1.0, "{}", one_degree);

        let a = Coordinate::new(-6.2, 106.816666);
        let b = Coordinate::new(-6.595, 106.799);
        assert!((distance_meters(a, b) - distance_meters(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_masked_point_stays_within_max_displacement() {
        let policy = MaskingPolicy::default();
        let profile = policy.profile_for(FALLBACK_PROFILE);
        let bound = profile.max_displacement_meters();
        for _ in 0..200 {
            let c = Coordinate::new((-60.0..60.0).fake(), (-179.0..179.0).fake());
            let id: u32 = Faker.fake();
            let masked = policy.mask(c, None, Some(&id.to_string()));
            assert!(distance_meters(c, masked) <= bound, "{:?} -> {:?}", c, masked);
        }
    }
}

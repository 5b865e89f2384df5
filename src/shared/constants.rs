/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Global administrator - manages every Taman Kehati and reads audit logs
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// Garden-scoped administrator - manages one Taman Kehati
pub const ROLE_ADMIN_TAMAN: &str = "admin_taman";

/// Read-only account - receives masked coordinates
pub const ROLE_VIEWER: &str = "viewer";

// =============================================================================
// GEO / SEARCH LIMITS
// =============================================================================

/// Maximum results for nearby garden search
pub const MAX_NEARBY_RESULTS: i64 = 20;

/// Default radius for nearby garden search (meters)
pub const DEFAULT_NEARBY_RADIUS_METERS: f64 = 10_000.0;

/// Maximum radius for nearby garden search (meters)
pub const MAX_NEARBY_RADIUS_METERS: f64 = 500_000.0;

/// Smallest nearby radius a non-admin may request (meters). Raised to ten times
/// the caller's jitter when that is larger.
pub const MIN_PUBLIC_NEARBY_RADIUS_METERS: f64 = 1_000.0;

/// Rows fetched before masked-distance filtering for non-admin nearby search
pub const MAX_NEARBY_CANDIDATES: i64 = 200;

/// Maximum name suggestions returned by the collection autocomplete
pub const MAX_SUGGESTIONS: i64 = 10;

/// Minimum query length for the collection autocomplete
pub const MIN_SUGGEST_QUERY_LEN: usize = 2;

/// Maximum zones created by one GeoJSON import
pub const MAX_ZONA_IMPORT: usize = 100;

/// Related collections and articles listed per collection
pub const MAX_RELATED: i64 = 5;

/// Default results per full-text search
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Maximum results per full-text search
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Suggestions drawn from each of gardens and collections by the global suggest
pub const SEARCH_SUGGESTIONS_PER_SOURCE: i64 = 5;

/// Default number of entries for top-N view rankings
pub const DEFAULT_TOP_LIMIT: i64 = 10;

/// Maximum number of entries for top-N view rankings
pub const MAX_TOP_LIMIT: i64 = 50;

// =============================================================================
// EXPORT
// =============================================================================

/// Default records per collection export
pub const DEFAULT_EXPORT_LIMIT: i64 = 100;

/// Maximum records per collection export
pub const MAX_EXPORT_LIMIT: i64 = 10_000;

// =============================================================================
// MEDIA
// =============================================================================

/// Maximum photo upload size (bytes)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum video upload size (bytes), bounded by the request body limit
pub const MAX_VIDEO_BYTES: usize = 24 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

pub const ALLOWED_VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/quicktime",
    "video/webm",
    "video/x-msvideo",
    "video/x-matroska",
];

//! Resource fingerprints for optimistic concurrency (`ETag` / `If-Match`).

use axum::http::{header, HeaderName, HeaderValue};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::error::{AppError, Result};

/// A resource whose fingerprint is derived from its content and last-modified time
pub trait Versioned: Serialize {
    fn updated_at(&self) -> Option<DateTime<Utc>>;

    fn fingerprint_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Quoted hex SHA-256 of the resource content and its last-modified timestamp.
///
/// Resources without a timestamp fall back to the current time, which makes the
/// fingerprint unreproducible; conditionally-writable entities always carry one.
pub fn generate_etag<T: Versioned + ?Sized>(resource: &T) -> String {
    let timestamp = resource.updated_at().unwrap_or_else(Utc::now);
    fingerprint(&resource.fingerprint_content(), timestamp)
}

pub fn fingerprint(content: &str, timestamp: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.update(timestamp.to_rfc3339_opts(SecondsFormat::Micros, true).as_bytes());
    format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Strip one layer of surrounding quotes. A lone `"` counts as both and leaves nothing.
fn unquote(token: &str) -> &str {
    if token.starts_with('"') && token.ends_with('"') {
        token.get(1..token.len() - 1).unwrap_or("")
    } else {
        token
    }
}

/// Whether a write guarded by `client_token` may proceed against `current`
pub fn validate_if_match(client_token: &str, current: &str) -> bool {
    let client = unquote(client_token);
    client == "*" || client == unquote(current)
}

/// Enforce an optional If-Match token. No token means no conflict check was requested.
pub fn check_precondition(if_match: Option<&str>, current: &str) -> Result<()> {
    match if_match {
        None => Ok(()),
        Some(token) if validate_if_match(token, current) => Ok(()),
        Some(token) => {
            tracing::warn!("If-Match {} does not match current ETag {}", token, current);
            Err(AppError::PreconditionFailed(
                "Resource has been modified by another request. Reload and retry.".to_string(),
            ))
        }
    }
}

/// `ETag` response header for a fingerprint
pub fn etag_header(etag: &str) -> [(HeaderName, HeaderValue); 1] {
    let value = HeaderValue::from_str(etag).unwrap_or_else(|_| HeaderValue::from_static("\"\""));
    [(header::ETAG, value)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Serialize)]
    struct Garden {
        id: i32,
        nama: String,
        #[serde(skip)]
        updated_at: Option<DateTime<Utc>>,
    }

    impl Versioned for Garden {
        fn updated_at(&self) -> Option<DateTime<Utc>> {
            self.updated_at
        }
    }

    fn garden(nama: &str, minute: u32) -> Garden {
        Garden {
            id: 1,
            nama: nama.to_string(),
            updated_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, minute, 0).unwrap()),
        }
    }

    #[test]
    fn test_etag_is_quoted_hex() {
        let etag = generate_etag(&garden("Taman Kehati Bogor", 0));
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        let inner = &etag[1..etag.len() - 1];
        assert_eq!(inner.len(), 64);
        assert!(inner.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_etag_stable_for_same_state() {
        assert_eq!(
            generate_etag(&garden("Taman Kehati Bogor", 0)),
            generate_etag(&garden("Taman Kehati Bogor", 0))
        );
    }

    #[test]
    fn test_etag_changes_with_content_or_timestamp() {
        let base = generate_etag(&garden("Taman Kehati Bogor", 0));
        assert_ne!(base, generate_etag(&garden("Taman Kehati Bandung", 0)));
        assert_ne!(base, generate_etag(&garden("Taman Kehati Bogor", 1)));
    }

    #[test]
    fn test_validate_if_match() {
        assert!(validate_if_match("\"abc123\"", "\"abc123\""));
        assert!(validate_if_match("abc123", "\"abc123\""));
        assert!(validate_if_match("*", "\"abc123\""));
        assert!(validate_if_match("\"*\"", "\"abc123\""));
        assert!(!validate_if_match("\"stale\"", "\"abc123\""));
        assert!(!validate_if_match("W/\"abc123\"", "\"abc123\""));
    }

    #[test]
    fn test_only_one_quote_layer_is_stripped() {
        assert!(!validate_if_match("\"\"abc\"\"", "\"abc\""));
    }

    #[test]
    fn test_lone_quote_unquotes_to_empty() {
        assert_eq!(unquote("\""), "");
        assert_eq!(unquote("\"\""), "");
        assert!(validate_if_match("\"", "\"\""));
        assert!(!validate_if_match("\"", "\"abc123\""));
    }

    #[test]
    fn test_check_precondition() {
        let current = generate_etag(&garden("Taman Kehati Bogor", 0));
        assert!(check_precondition(None, &current).is_ok());
        assert!(check_precondition(Some(&current), &current).is_ok());
        assert!(check_precondition(Some("*"), &current).is_ok());
        assert!(matches!(
            check_precondition(Some("\"stale\""), &current),
            Err(AppError::PreconditionFailed(_))
        ));
    }

    #[test]
    fn test_stale_token_after_mutation_is_rejected() {
        let before = generate_etag(&garden("Taman Kehati Bogor", 0));
        let after = generate_etag(&garden("Taman Kehati Bogor Raya", 5));
        assert!(check_precondition(Some(&before), &after).is_err());
        assert!(check_precondition(Some(&after), &after).is_ok());
    }
}

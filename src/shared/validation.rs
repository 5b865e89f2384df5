use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Regex for record codes (garden code, zone code, collection number)
    /// Letters, digits, dots, slashes and hyphens; must start alphanumeric
    /// - Valid: "TK-JABAR-001", "Z1", "KT/2024/001"
    /// - Invalid: "-TK", "TK 01", ""
    pub static ref CODE_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9./-]*$").unwrap();

    /// Regex for `#RRGGBB` colours used to draw zones on the map
    pub static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap();

    /// Regex for article slugs
    /// - Valid: "flora-endemik", "taman-2024"
    /// - Invalid: "-flora", "flora-", "flora--endemik", "Flora"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

pub fn validate_latitude(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (-90.0..=90.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("latitude_out_of_range"))
    }
}

pub fn validate_longitude(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (-180.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("longitude_out_of_range"))
    }
}

/// Escape LIKE wildcards so user or stored text matches literally
pub fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_regex() {
        assert!(CODE_REGEX.is_match("TK-JABAR-001"));
        assert!(CODE_REGEX.is_match("Z1"));
        assert!(CODE_REGEX.is_match("KT/2024/001"));
        assert!(!CODE_REGEX.is_match("-TK"));
        assert!(!CODE_REGEX.is_match("TK 01"));
        assert!(!CODE_REGEX.is_match(""));
    }

    #[test]
    fn test_hex_color_regex() {
        assert!(HEX_COLOR_REGEX.is_match("#1a9E3f"));
        assert!(!HEX_COLOR_REGEX.is_match("1a9e3f")); // missing hash
        assert!(!HEX_COLOR_REGEX.is_match("#1a9e3")); // too short
        assert!(!HEX_COLOR_REGEX.is_match("#1a9e3fa")); // too long
        assert!(!HEX_COLOR_REGEX.is_match("#gggggg"));
    }

    #[test]
    fn test_slug_regex() {
        assert!(SLUG_REGEX.is_match("flora-endemik"));
        assert!(SLUG_REGEX.is_match("taman-2024"));
        assert!(!SLUG_REGEX.is_match("-flora"));
        assert!(!SLUG_REGEX.is_match("flora--endemik"));
        assert!(!SLUG_REGEX.is_match("Flora"));
    }

    #[test]
    fn test_coordinate_ranges() {
        assert!(validate_latitude(-6.2).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(90.1).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
        assert!(validate_longitude(106.8).is_ok());
        assert!(validate_longitude(-180.5).is_err());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("Shorea"), "Shorea");
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }
}

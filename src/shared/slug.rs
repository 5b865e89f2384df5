use deunicode::deunicode;

/// URL slug from an article title: lowercase ASCII alphanumerics joined by single hyphens.
///
/// Non-ASCII text is transliterated first (`é` -> `e`, `ß` -> `ss`); anything
/// that is still not alphanumeric acts as a separator.
pub fn slugify(title: &str) -> String {
    let ascii = deunicode(title);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch == '\'' || ch == '\u{2019}' {
            // "Indonesia's" -> "indonesias"
            continue;
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Candidate slug for the given uniqueness attempt: `base`, `base-1`, `base-2`, ...
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::SLUG_REGEX;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(
            slugify("Keunikan Flora di Taman Kehati"),
            "keunikan-flora-di-taman-kehati"
        );
        assert_eq!(slugify("  Rafflesia   arnoldii!  "), "rafflesia-arnoldii");
        assert_eq!(slugify("Taman Kehati: 2024 / Bogor"), "taman-kehati-2024-bogor");
    }

    #[test]
    fn test_slugify_folds_and_drops_apostrophes() {
        assert_eq!(slugify("Café Indonesia's Flora"), "cafe-indonesias-flora");
        assert_eq!(slugify("Indonesia\u{2019}s Flora"), "indonesias-flora");
    }

    #[test]
    fn test_slugify_transliterates_beyond_latin1() {
        assert_eq!(slugify("Kebun Łódź"), "kebun-lodz");
        assert_eq!(slugify("Straße der Bäume"), "strasse-der-baume");
        assert!(SLUG_REGEX.is_match(&slugify("Anggrek 蘭花 Bulan")));
    }

    #[test]
    fn test_slugify_output_is_valid_slug() {
        for title in ["Pohon Ulin -- Kalimantan", "A", "Anggrek (Orchidaceae)"] {
            assert!(SLUG_REGEX.is_match(&slugify(title)), "{}", title);
        }
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_candidate_sequence() {
        assert_eq!(candidate("flora", 0), "flora");
        assert_eq!(candidate("flora", 1), "flora-1");
        assert_eq!(candidate("flora", 12), "flora-12");
    }
}

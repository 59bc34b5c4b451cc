//! Canonical forms for the names printed on certificates.

use serde::{Deserialize, Deserializer};

/// Returns the form of a first or last name that gets stored: edges
/// trimmed, accents split off their base letters (NFD).
///
/// ```
/// use rarity::normalization::normalize_name;
/// assert_eq!(normalize_name("\tRenée  "), "Rene\u{301}e");
/// assert_eq!(normalize_name("Mary Ann"), "Mary Ann");
/// ```
pub fn normalize_name(name: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    name.as_ref().trim().nfd().collect()
}

/// `deserialize_with` adapter for name fields.
pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    String::deserialize(deserializer).map(normalize_name)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde::Deserialize;
    use unicode_normalization::is_nfd;

    use super::normalize_name;

    #[derive(Deserialize)]
    struct Named {
        #[serde(deserialize_with = "super::deserialize")]
        name: String,
    }

    #[test]
    fn escaped_names_are_normalized() {
        let named: Named = serde_json::from_str(r#"{"name": "  José\t"}"#).unwrap();

        assert_eq!(named.name, "Jose\u{301}");
    }

    #[test]
    fn blank_names_become_empty() {
        assert_eq!(normalize_name(" \t\n "), "");
    }

    #[test]
    fn decomposed_input_is_left_alone() {
        assert_eq!(normalize_name("Zoe\u{308}"), "Zoe\u{308}");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 2000, ..ProptestConfig::default()
        })]

        #[test]
        fn output_is_decomposed_and_trimmed(name in "\\PC*", padding in "[ \t\n]{0,4}") {
            let normalized = normalize_name(format!("{}{}{}", padding, name, padding));

            prop_assert!(is_nfd(&normalized));
            prop_assert_eq!(normalized.trim(), normalized.as_str());
        }

        #[test]
        fn inner_spaces_survive(first in "[A-Za-zÀ-ÿ]{1,12}", last in "[A-Za-zÀ-ÿ]{1,12}") {
            let normalized = normalize_name(format!(" {} {} ", first, last));

            prop_assert_eq!(normalized.matches(' ').count(), 1);
        }

        #[test]
        fn normalizing_twice_changes_nothing(name in "\\PC*") {
            let once = normalize_name(&name);

            prop_assert_eq!(normalize_name(&once), once);
        }
    }
}

//! Slugs used in collection, state and festival routes.
//!
//! The mapping is lossy: punctuation and casing do not survive a round trip,
//! so lookups by slug match names case-insensitively.

use std::sync::OnceLock;

use regex::Regex;

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"))
}

/// Lowercase the name and replace each run of whitespace with `-`.
pub fn slugify(name: &str) -> String {
    whitespace().replace_all(&name.to_lowercase(), "-").into_owned()
}

/// Best-effort display name for a slug: `-` becomes a space and each word is
/// capitalized.
pub fn name_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Rajasthan"), "rajasthan");
        assert_eq!(slugify("Wood  Craft"), "wood-craft");
        assert_eq!(slugify("Tamil Nadu\tBronzes"), "tamil-nadu-bronzes");
        assert_eq!(slugify("Arts & Crafts"), "arts-&-crafts");
    }

    #[test]
    fn test_name_from_slug() {
        assert_eq!(name_from_slug("tamil-nadu"), "Tamil Nadu");
        assert_eq!(name_from_slug("rajasthan"), "Rajasthan");
        assert_eq!(name_from_slug(""), "");
    }

    #[test]
    fn test_round_trip_is_lossy() {
        assert_eq!(name_from_slug(&slugify("Jammu and Kashmir")), "Jammu And Kashmir");
    }
}

//! Text heuristics over free-form recipe lines.
//!
//! [`normalize`] defines when two ingredient lines count as "the same
//! ingredient": the text before the first comma, lower-cased and trimmed,
//! compared for exact equality. It is deliberately coarse. There is no
//! stemming, plural handling or synonym resolution, so `"2 onions"` and
//! `"red onion, diced"` stay different ingredients.

use lazy_static::lazy_static;
use regex::Regex;

/// Comparison key for an ingredient line.
pub fn normalize(raw: &str) -> String {
    let head = raw.split(',').next().unwrap_or_default();
    head.to_lowercase().trim().to_string()
}

/// Loose minutes estimate for durations such as `"15 mins"`,
/// `"1 hour 20 minutes"` or `"1.5 hours"`. Ranges count their lower bound.
/// Only used to order recipes, never stored.
pub fn duration_minutes(text: &str) -> Option<u32> {
    lazy_static! {
        static ref DURATION_RE: Regex = Regex::new(
            r"(?i)(\d+(?:\.\d+)?)(?:\s*(?:-|–|to)\s*\d+(?:\.\d+)?)?\s*(hours?|hrs?|h|minutes?|mins?|m)?\b"
        )
        .unwrap();
    }

    let mut total = 0.0_f64;
    let mut matched = false;
    for caps in DURATION_RE.captures_iter(text) {
        let Ok(value) = caps[1].parse::<f64>() else {
            continue;
        };
        let is_hours = caps
            .get(2)
            .map(|u| u.as_str().to_ascii_lowercase().starts_with('h'))
            .unwrap_or(false);
        total += if is_hours { value * 60.0 } else { value };
        matched = true;
    }

    matched.then(|| total.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_annotation_after_first_comma() {
        assert_eq!(normalize("onion, diced"), "onion");
        assert_eq!(normalize("  Garlic , minced, to taste"), "garlic");
        assert_eq!(normalize("2 Cups Flour"), "2 cups flour");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(", leading comma"), "");
    }

    #[test]
    fn normalize_is_deterministic_and_idempotent() {
        let samples = [
            "2 cups flour",
            "Flour, sifted",
            "  SALT  ",
            "red onion, diced",
            "½ tsp Smoked Paprika",
            "Crème fraîche, to serve",
            "\tolive oil\n",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(once, normalize(s));
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn plural_and_adjective_variants_stay_distinct() {
        assert_eq!(normalize("2 onions"), "2 onions");
        assert_eq!(normalize("red onion, diced"), "red onion");
        assert_ne!(normalize("2 onions"), normalize("red onion, diced"));
    }

    #[test]
    fn duration_parsing_is_loose() {
        assert_eq!(duration_minutes("15 mins"), Some(15));
        assert_eq!(duration_minutes("1 hour 20 minutes"), Some(80));
        assert_eq!(duration_minutes("1.5 hours"), Some(90));
        assert_eq!(duration_minutes("45"), Some(45));
        assert_eq!(duration_minutes("10-15 min"), Some(10));
        assert_eq!(duration_minutes("2 hrs"), Some(120));
        assert_eq!(duration_minutes("about an hour"), None);
        assert_eq!(duration_minutes(""), None);
    }
}

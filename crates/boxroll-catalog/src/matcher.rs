//! Affix evaluation
//!
//! Matching is deliberately dumb: normalized substring containment, no
//! parsing. Undesired fragments veto before desired fragments count, and a
//! container is only ready once enough distinct desired definitions match.
//!
//! Affix text arrives as rendered lines, and a phrase can wrap across two of
//! them. Each fragment is therefore checked per line first, then once more
//! against the concatenation of all lines.

use regex::RegexBuilder;
use tracing::debug;

use boxroll_core::{BoxrollError, Category, Result};

use crate::ModDefinition;

/// Lowercase and strip everything but alphanumerics and spaces
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect::<String>()
        .to_lowercase()
}

/// Normalize a catalog description into its matchable fragment
///
/// Descriptions carry a `contains ` prefix and `#` value placeholders that
/// never appear in rendered affix text.
fn normalize_fragment(description: &str) -> String {
    let lowered = description.to_lowercase().replace('#', "").replace("contains ", "");
    normalize(lowered.trim())
}

fn contained(fragment: &str, lines: &[String], combined: &str) -> bool {
    if fragment.is_empty() {
        return false;
    }
    lines.iter().any(|line| line.contains(fragment)) || combined.contains(fragment)
}

/// Evaluate observed affix lines against the category's mod definitions
///
/// Returns true iff no flagged undesired fragment is present and at least
/// `required` distinct desired definitions match.
pub fn evaluate(affix_lines: &[String], mods: &[&ModDefinition], required: usize) -> bool {
    let lines: Vec<String> = affix_lines.iter().map(|l| normalize(l)).collect();
    let combined = lines.join(" ");

    for m in mods.iter().filter(|m| m.is_undesired) {
        let fragment = normalize_fragment(&m.description);
        if contained(&fragment, &lines, &combined) {
            debug!(mod_name = %m.name, "undesired mod present, vetoing");
            return false;
        }
    }

    let mut found = 0;
    for m in mods.iter().filter(|m| m.is_desired) {
        let fragment = normalize_fragment(&m.description);
        if contained(&fragment, &lines, &combined) {
            found += 1;
        }
    }

    debug!(found, required, "desired mod count");
    found >= required
}

/// Regex-based keep policy, used when the mod catalog is disabled
///
/// One compiled pattern per category, matched case-insensitively against
/// each normalized line and then against the concatenation.
#[derive(Debug, Clone)]
pub struct RegexPolicy {
    regex: regex::Regex,
}

impl RegexPolicy {
    pub fn compile(category: Category, pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| BoxrollError::InvalidRegex {
                category: category.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { regex })
    }

    pub fn matches(&self, affix_lines: &[String]) -> bool {
        if affix_lines.is_empty() {
            return false;
        }
        let lines: Vec<String> = affix_lines.iter().map(|l| normalize(l)).collect();
        lines.iter().any(|line| self.regex.is_match(line)) || self.regex.is_match(&lines.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(desc: &str, desired: bool, undesired: bool) -> ModDefinition {
        ModDefinition {
            name: normalize(desc).replace(' ', "_"),
            description: desc.to_string(),
            category: Category::Regular,
            is_desired: desired,
            is_undesired: undesired,
        }
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("+25% increased Quantity!"), "25 increased quantity");
    }

    #[test]
    fn test_fragment_strips_contains_prefix_and_placeholders() {
        assert_eq!(
            normalize_fragment("Contains # additional Items"),
            "additional items"
        );
    }

    #[test]
    fn test_desired_threshold() {
        let quantity = def("increased Quantity of Contained Items", true, false);
        let level = def("+1 Chest level", true, false);
        let mods = vec![&quantity, &level];

        let affixes = lines(&["+25% increased Quantity of Contained Items"]);
        assert!(evaluate(&affixes, &mods, 1));
        assert!(!evaluate(&affixes, &mods, 2));

        let affixes = lines(&[
            "+32% increased Quantity of Contained Items",
            "+1 Chest level",
        ]);
        assert!(evaluate(&affixes, &mods, 2));
    }

    #[test]
    fn test_undesired_vetoes_even_with_enough_desired() {
        let quantity = def("increased Quantity of Contained Items", true, false);
        let freezes = def("Freezes you when activated", false, true);
        let mods = vec![&quantity, &freezes];

        let affixes = lines(&[
            "+25% increased Quantity of Contained Items",
            "Freezes you when activated",
        ]);
        assert!(!evaluate(&affixes, &mods, 1));
    }

    #[test]
    fn test_unflagged_mod_neither_counts_nor_vetoes() {
        let freezes = def("Freezes you when activated", false, false);
        let mods = vec![&freezes];
        let affixes = lines(&["Freezes you when activated"]);
        assert!(!evaluate(&affixes, &mods, 1));
    }

    #[test]
    fn test_phrase_spanning_two_lines_matches_via_concatenation() {
        let cards = def(
            "additional Divination Cards that give Currency",
            true,
            false,
        );
        let mods = vec![&cards];
        let affixes = lines(&[
            "Contains 3 additional Divination Cards",
            "that give Currency",
        ]);
        assert!(evaluate(&affixes, &mods, 1));
    }

    #[test]
    fn test_definition_counts_once_even_if_matched_twice() {
        let items = def("additional Items", true, false);
        let mods = vec![&items];
        let affixes = lines(&[
            "Contains 2 additional Items",
            "Contains 3 additional Items",
        ]);
        // One definition, so required 2 cannot be met
        assert!(!evaluate(&affixes, &mods, 2));
    }

    #[test]
    fn test_empty_affix_list_never_ready() {
        let quantity = def("increased Quantity of Contained Items", true, false);
        let mods = vec![&quantity];
        assert!(!evaluate(&[], &mods, 1));
    }

    #[test]
    fn test_empty_diviner_affixes_against_default_catalog() {
        let all = crate::default_mods();
        let diviner: Vec<&ModDefinition> = all
            .iter()
            .filter(|m| m.category == Category::Diviner)
            .collect();
        assert!(!evaluate(&[], &diviner, 1));
    }

    #[test]
    fn test_regex_policy_case_insensitive() {
        let policy = RegexPolicy::compile(Category::Regular, r"additional item").unwrap();
        assert!(policy.matches(&lines(&["Contains 2 Additional Items"])));
        assert!(!policy.matches(&lines(&["Guarded by a Rogue Exile"])));
        assert!(!policy.matches(&[]));
    }

    #[test]
    fn test_regex_policy_invalid_pattern_is_config_error() {
        let err = RegexPolicy::compile(Category::Arcanist, r"(unclosed").unwrap_err();
        assert!(matches!(err, BoxrollError::InvalidRegex { .. }));
    }
}

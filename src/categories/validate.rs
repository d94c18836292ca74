use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;

use crate::categories::repo::Category;
use crate::error::ValidationIssue;

/// Entry-boundary bounds. The store layer independently enforces [1,100].
pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9\s\-_]+$").unwrap();
}

fn required() -> ValidationIssue {
    ValidationIssue::new("required", "Category name is required")
}

fn too_short() -> ValidationIssue {
    ValidationIssue::new(
        "too_short",
        format!("Category name must be at least {NAME_MIN} characters long"),
    )
}

fn too_long() -> ValidationIssue {
    ValidationIssue::new(
        "too_long",
        format!("Category name cannot exceed {NAME_MAX} characters"),
    )
}

fn invalid_format() -> ValidationIssue {
    ValidationIssue::new(
        "invalid_format",
        "Category name can only contain letters, numbers, spaces, hyphens, and underscores",
    )
}

fn duplicate_name() -> ValidationIssue {
    ValidationIssue::new("duplicate_name", "Category name already exists")
}

/// Pure shape rules over the trimmed name, collected rather than
/// short-circuited. An empty name yields only `required`; the remaining
/// checks are meaningless without content.
pub fn validate_name(name: &str) -> Vec<ValidationIssue> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return vec![required()];
    }

    let mut issues = Vec::new();
    let len = trimmed.chars().count();
    if len < NAME_MIN {
        issues.push(too_short());
    }
    if len > NAME_MAX {
        issues.push(too_long());
    }
    if !NAME_RE.is_match(trimmed) {
        issues.push(invalid_format());
    }
    issues
}

/// Assembles the full issue list from the shape rules and the outcome of the
/// per-owner duplicate probe. Pure; the probe result is passed in.
pub fn evaluate(name: &str, duplicate: bool) -> Vec<ValidationIssue> {
    let mut issues = validate_name(name);
    if duplicate {
        issues.push(duplicate_name());
    }
    issues
}

/// An update that keeps the current name (trimmed, case-insensitive — the
/// same policy as the uniqueness checks) writes nothing and is reported as
/// informational.
pub fn is_no_change(current: &str, new: &str) -> bool {
    current.trim().eq_ignore_ascii_case(new.trim())
}

/// Full rule set for create/update: shape rules plus the per-owner duplicate
/// check (`exclude_id` skips the row being updated). This runs before every
/// write; the store re-checks uniqueness again at write time.
pub async fn validate(
    db: &PgPool,
    name: &str,
    owner_id: i64,
    exclude_id: Option<i64>,
) -> sqlx::Result<Vec<ValidationIssue>> {
    let trimmed = name.trim();
    let duplicate = if trimmed.is_empty() {
        false
    } else {
        Category::name_exists(db, owner_id, trimmed, exclude_id).await?
    };
    Ok(evaluate(name, duplicate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(name: &str) -> Vec<&'static str> {
        validate_name(name).into_iter().map(|i| i.rule).collect()
    }

    #[test]
    fn valid_names_pass() {
        for name in ["Snacks", "Dry Goods", "a-b_c 9", "AB", "  Trimmed  "] {
            assert!(rules(name).is_empty(), "{name:?} should be valid");
        }
    }

    #[test]
    fn empty_name_is_only_required() {
        assert_eq!(rules(""), vec!["required"]);
        assert_eq!(rules("   "), vec!["required"]);
    }

    #[test]
    fn one_char_name_is_too_short() {
        assert_eq!(rules("a"), vec!["too_short"]);
    }

    #[test]
    fn boundary_lengths() {
        assert!(rules(&"a".repeat(2)).is_empty());
        assert!(rules(&"a".repeat(100)).is_empty());
        assert_eq!(rules(&"a".repeat(101)), vec!["too_long"]);
    }

    #[test]
    fn charset_violations() {
        assert_eq!(rules("Caf\u{e9}"), vec!["invalid_format"]);
        assert_eq!(rules("Tea & Coffee"), vec!["invalid_format"]);
        assert_eq!(rules("100%"), vec!["invalid_format"]);
    }

    #[test]
    fn independent_violations_are_collected() {
        let name = "!".repeat(150);
        assert_eq!(rules(&name), vec!["too_long", "invalid_format"]);
        assert_eq!(rules("!"), vec!["too_short", "invalid_format"]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 100 two-byte chars; length rule passes, charset rule flags it.
        let name = "\u{e9}".repeat(100);
        assert_eq!(rules(&name), vec!["invalid_format"]);
    }

    fn evaluated(name: &str, duplicate: bool) -> Vec<&'static str> {
        evaluate(name, duplicate).into_iter().map(|i| i.rule).collect()
    }

    #[test]
    fn duplicate_probe_yields_the_duplicate_issue() {
        assert_eq!(evaluated("Snacks", true), vec!["duplicate_name"]);
        assert!(evaluated("Snacks", false).is_empty());
    }

    #[test]
    fn duplicate_is_collected_alongside_shape_issues() {
        assert_eq!(evaluated("a", true), vec!["too_short", "duplicate_name"]);
        assert_eq!(
            evaluated("!", true),
            vec!["too_short", "invalid_format", "duplicate_name"]
        );
    }

    #[test]
    fn duplicate_message_names_the_rule() {
        let issues = evaluate("Snacks", true);
        assert_eq!(issues[0].rule, "duplicate_name");
        assert_eq!(issues[0].message, "Category name already exists");
    }

    #[test]
    fn no_change_comparison_trims_and_ignores_case() {
        assert!(is_no_change("Snacks", "Snacks"));
        assert!(is_no_change("Snacks", "  SNACKS  "));
        assert!(is_no_change("  Dry Goods", "dry goods"));
        assert!(!is_no_change("Snacks", "Snack"));
        assert!(!is_no_change("Snacks", "Drinks"));
    }
}

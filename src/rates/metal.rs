//! Metal-tier filter applied while ingesting plans.

/// `true` when `label` equals `target`, ignoring case.
///
/// This is a whole-string comparison: `"Silver Plus"` does not match `"Silver"`.
pub fn matches_metal_level(label: &str, target: &str) -> bool {
    label
        .chars()
        .flat_map(char::to_lowercase)
        .eq(target.chars().flat_map(char::to_lowercase))
}

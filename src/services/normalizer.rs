//! Class name normalization
//!
//! Exports carry the class name in two columns of varying quality. The
//! normalizer collapses whitespace and rejects placeholder values so the
//! same format never splits across two buckets.

/// Placeholder strings that mean "no class name recorded"
const PLACEHOLDERS: [&str; 5] = ["", "unknown", "n/a", "na", "-"];

/// Normalize a raw class name to a usable label, or `None` if the value
/// is a placeholder.
pub fn clean_class_name(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if PLACEHOLDERS
        .iter()
        .any(|p| collapsed.eq_ignore_ascii_case(p))
    {
        return None;
    }
    Some(collapsed)
}

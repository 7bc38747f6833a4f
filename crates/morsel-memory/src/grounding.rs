//! Anti-hallucination grounding check.
//!
//! Model-proposed item names are only persisted when they literally appear in
//! the user's own message. This keeps a hallucinating model from polluting
//! the shared dictionaries with items the user never mentioned.
//!
//! The check is a case-insensitive substring containment test, NOT a
//! word-boundary match: "rice" is considered grounded in "the price is high".
//! That leniency is intentional and load-bearing; tightening it changes which
//! real inputs are accepted.

/// Check whether `candidate` is textually grounded in `source_message`.
///
/// Both sides are lowercased; the candidate is also trimmed. When no source
/// message is supplied the check is skipped and every candidate passes —
/// callers are expected to always supply one in production.
pub fn is_grounded(candidate: &str, source_message: Option<&str>) -> bool {
    let Some(source) = source_message else {
        return true;
    };

    let needle = candidate.trim().to_lowercase();
    source.to_lowercase().contains(&needle)
}

//! Deterministic masking of secrets for display.

const PREFIX_LEN: usize = 8;
const SUFFIX_LEN: usize = 4;
const MIN_HIDDEN: usize = 4;

/// Redact an API key for display.
///
/// Contract: the first 8 characters survive (enough to identify the key's
/// type and mode, e.g. `sk_test_` vs `rk_live_`), followed by a literal
/// `****` and the last 4 characters. The mask width is fixed, so the output
/// does not track the secret's length. Values too short to keep at least 4
/// characters hidden, or containing non-ASCII bytes, collapse to a fixed
/// all-mask form. Same input always yields the same output.
pub fn redact(key: &str) -> String {
    if !key.is_ascii() || key.len() < PREFIX_LEN + SUFFIX_LEN + MIN_HIDDEN {
        return "*".repeat(8);
    }
    format!(
        "{}****{}",
        &key[..PREFIX_LEN],
        &key[key.len() - SUFFIX_LEN..]
    )
}

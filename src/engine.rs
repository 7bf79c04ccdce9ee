//! Abstraction over `regex` and `regex-lite` depending on whether we have `unicode` crate feature
//! enabled.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "unicode")] {
        pub(crate) use regex::{escape, Captures, Regex};
    } else {
        pub(crate) use regex_lite::{escape, Captures, Regex};
    }
}

/// Regex flags to allow '.' in regex to match '\n'
///
/// See the docs under: https://docs.rs/regex/1/regex/#grouping-and-flags
pub(crate) const REGEX_FLAGS: &str = "(?s-m)";

/// Compiles `body` as an expression that must match the whole input.
///
/// Engine errors are flattened to their message since the two engines do not share an error type.
pub(crate) fn anchored(body: &str) -> Result<Regex, String> {
    Regex::new(&format!("{}^(?:{})$", REGEX_FLAGS, body)).map_err(|err| err.to_string())
}

/// Returns the number of capture groups opened by `expr`, not counting the implicit whole-match
/// group.
pub(crate) fn group_count(expr: &str) -> Result<usize, String> {
    Regex::new(expr)
        .map(|re| re.captures_len() - 1)
        .map_err(|err| err.to_string())
}

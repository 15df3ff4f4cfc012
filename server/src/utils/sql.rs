//! SQL utility functions

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Matches the named placeholders emitted by `SqlParams::bind` (`:p0`, `:p1`, ...)
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":p(\d+)").expect("Invalid regex"));

/// Make an untrusted value safe to place inside a single-quoted SQL literal.
///
/// Single quotes are doubled. Double quotes, backslashes, percent signs and NUL
/// are removed. Newline, carriage return, backspace, tab and ctrl-Z become a
/// space. `None` yields an empty string.
///
/// # Example
///
/// ```
/// use entity_search::utils::sql::sanitize;
///
/// assert_eq!(sanitize(Some("O'Brien\n100%")), "O''Brien 100");
/// assert_eq!(sanitize(None), "");
/// ```
pub fn sanitize(value: Option<&str>) -> String {
    let Some(s) = value else {
        return String::new();
    };

    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '"' | '\\' | '%' | '\0' => {}
            '\n' | '\r' | '\x08' | '\t' | '\x1a' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Quote a value as a sanitized SQL string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", sanitize(Some(value)))
}

/// Substitute `:pN` placeholders with quoted, sanitized literals from `values`.
///
/// Placeholders without a matching value are left untouched.
pub fn inline_params(sql: &str, values: &[String]) -> String {
    PLACEHOLDER
        .replace_all(sql, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| values.get(i))
                .map(|v| quote_literal(v))
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

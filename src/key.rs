// Column reference normalization
//
// Axis references come straight out of generated SQL, so they may carry a
// sort direction ("revenue DESC") or an alias clause ("SUM(x) AS total").

use crate::data::Row;
use tracing::debug;

/// Sort direction suffix stripped from a column reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// The pieces of a raw column reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub expr: String,
    pub alias: Option<String>,
    pub direction: Option<SortDirection>,
}

/// Normalize a column reference: drop a trailing ASC/DESC, keep the left side
/// of an alias clause, trim whitespace. `None` stays `None`.
pub fn normalize_key(raw: Option<&str>) -> Option<String> {
    raw.map(|r| parse_column_ref(r).expr)
}

/// Split a raw reference into expression, alias and sort direction.
/// Never fails; malformed input degrades to a trimmed expression.
pub fn parse_column_ref(raw: &str) -> ColumnRef {
    let (rest, direction) = strip_direction(raw.trim());

    let (expr, alias) = match split_alias(rest) {
        Some((lhs, rhs)) => {
            let (rhs, _) = strip_direction(rhs.trim());
            let alias = unquote(rhs.trim()).trim();
            (lhs.trim(), (!alias.is_empty()).then(|| alias.to_string()))
        }
        None => (rest.trim(), None),
    };

    // "expr DESC AS alias" is not valid SQL, but tolerate it
    let (expr, inner_direction) = strip_direction(expr);

    ColumnRef {
        expr: expr.trim().to_string(),
        alias,
        direction: direction.or(inner_direction),
    }
}

/// Resolve a raw reference against a sample row. Prefers the normalized
/// expression, then the alias; if neither column exists the normalized
/// expression is returned and lookups simply find nothing.
pub fn resolve_column(raw: Option<&str>, sample: Option<&Row>) -> Option<String> {
    let column = parse_column_ref(raw?);
    let Some(sample) = sample else {
        return Some(column.expr);
    };

    if sample.contains_key(&column.expr) {
        return Some(column.expr);
    }

    if let Some(alias) = column.alias {
        if sample.contains_key(&alias) {
            debug!(expr = %column.expr, alias = %alias, "resolved column through alias");
            return Some(alias);
        }
    }

    debug!(column = %column.expr, "column not present in data");
    Some(column.expr)
}

/// Strip a trailing case-insensitive "asc"/"desc" token
fn strip_direction(input: &str) -> (&str, Option<SortDirection>) {
    let trimmed = input.trim_end();
    for (suffix, direction) in [("desc", SortDirection::Desc), ("asc", SortDirection::Asc)] {
        if trimmed.len() < suffix.len() {
            continue;
        }
        let split = trimmed.len() - suffix.len();
        if !trimmed.is_char_boundary(split) {
            continue;
        }
        if trimmed[split..].eq_ignore_ascii_case(suffix) {
            return (trimmed[..split].trim_end(), Some(direction));
        }
    }
    (trimmed, None)
}

/// Strip one pair of matching identifier delimiters: "..", `..` or [..]
fn unquote(input: &str) -> &str {
    for (open, close) in [('"', '"'), ('`', '`'), ('[', ']')] {
        if input.len() >= 2 && input.starts_with(open) && input.ends_with(close) {
            return &input[1..input.len() - 1];
        }
    }
    input
}

/// Find the last whitespace-delimited, case-insensitive "as" token
fn split_alias(input: &str) -> Option<(&str, &str)> {
    let bytes = input.as_bytes();
    if bytes.len() < 4 {
        return None;
    }

    (1..bytes.len() - 2).rev().find_map(|i| {
        let is_as = bytes[i].eq_ignore_ascii_case(&b'a') && bytes[i + 1].eq_ignore_ascii_case(&b's');
        let spaced = bytes[i - 1].is_ascii_whitespace() && bytes[i + 2].is_ascii_whitespace();
        (is_as && spaced).then(|| (&input[..i - 1], &input[i + 2..]))
    })
}

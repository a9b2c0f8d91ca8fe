//! Identifier codec for GraphQL-safe names.
//!
//! Catalog, schema, table and column names coming out of the engine can contain
//! anything: dashes, spaces, accented letters, emoji, a leading digit. GraphQL
//! only accepts `[_A-Za-z][_0-9A-Za-z]*`, so every code point outside that set
//! is rewritten as an escape token:
//!
//! ```text
//! order-lines   ->  order_U002D_lines
//! 2024_sales    ->  _U0032_024_sales
//! café          ->  caf_U00E9_
//! 😀            ->  _U1F600_
//! ```
//!
//! `restore` reverses the mapping by decoding every `_U<hex>_` token it finds.
//! When a name has to be rewritten, any `_` that opens a `_U<hex>` run in the
//! raw text is escaped as well (`_U005F_`), so the trailing `_` of a later
//! escape can never complete a token that was not there. Names that already
//! conform are not rewritten, so a raw name like `_U0041_` still decodes to
//! `A`. Downstream consumers rely on that behavior for literal names; it is kept.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Escape token: `_U` + 4 to 6 hex digits + `_`.
static ESCAPE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_U([0-9A-Fa-f]{4,6})_").unwrap());

/// Start of a token-like run in raw text.
static TOKEN_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_U[0-9A-Fa-f]{4}").unwrap());

/// GraphQL name grammar.
static VALID_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").unwrap());

/// Check whether a name satisfies the GraphQL identifier grammar.
pub fn is_valid_identifier(name: &str) -> bool {
    VALID_NAME.is_match(name)
}

/// Rewrite a metadata name so it satisfies the identifier grammar.
///
/// Names that already conform are returned unchanged. A leading digit is
/// escaped even though digits are legal elsewhere. The empty string is
/// returned as-is.
///
/// Any name that gets rewritten satisfies `restore(&sanitize(name)) == name`.
pub fn sanitize(name: &str) -> String {
    if is_valid_identifier(name) {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len() + 8);
    for (i, c) in name.char_indices() {
        let allowed = if c == '_' {
            !TOKEN_PREFIX.is_match(&name[i..])
        } else if i == 0 {
            is_leading_char(c)
        } else {
            is_trailing_char(c)
        };

        if allowed {
            out.push(c);
        } else {
            push_escape(&mut out, c);
        }
    }
    out
}

/// Decode every `_U<hex>_` token back to the character it encodes.
///
/// Text that is not a well-formed token, or a token whose value is not a Unicode
/// scalar value (surrogates, values above `U+10FFFF`), is left untouched.
pub fn restore(name: &str) -> String {
    if !name.contains("_U") {
        return name.to_string();
    }

    ESCAPE_TOKEN
        .replace_all(name, |caps: &Captures<'_>| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn is_leading_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_trailing_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn push_escape(out: &mut String, c: char) {
    use std::fmt::Write;
    // Writing to a String cannot fail.
    let _ = write!(out, "_U{:04X}_", c as u32);
}

//! Plain `{{NAME}}` substitution for the provisioning templates.
//!
//! Placeholders are upper-case identifiers between double braces. Rendering is
//! a single left-to-right pass: substituted values are never rescanned, so a
//! value may itself contain `{{...}}` text.

use std::collections::BTreeMap;

use crate::domain::error::TemplateError;

/// Placeholder values keyed by name.
pub type Vars<'a> = BTreeMap<&'a str, String>;

/// Render `source` replacing every placeholder with its value.
///
/// `{{` not followed by an identifier and `}}` is copied through unchanged.
///
/// # Errors
///
/// Returns `TemplateError::Unresolved` for a placeholder without a value and
/// `TemplateError::Unterminated` for `{{IDENT` with no closing braces.
pub fn render(name: &str, source: &str, vars: &Vars<'_>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    let mut offset = 0;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match placeholder_at(after) {
            Scan::Placeholder(ident, len) => {
                let value = vars.get(ident).ok_or_else(|| TemplateError::Unresolved {
                    template: name.to_string(),
                    placeholder: ident.to_string(),
                })?;
                out.push_str(value);
                rest = &after[len..];
                offset += start + 2 + len;
            }
            Scan::Unterminated => {
                return Err(TemplateError::Unterminated {
                    template: name.to_string(),
                    offset: offset + start,
                });
            }
            Scan::Literal => {
                out.push_str("{{");
                rest = after;
                offset += start + 2;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Every placeholder name referenced by `source`.
#[cfg(test)]
pub(crate) fn placeholders(source: &str) -> std::collections::BTreeSet<String> {
    let mut found = std::collections::BTreeSet::new();
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        if let Scan::Placeholder(ident, len) = placeholder_at(after) {
            found.insert(ident.to_string());
            rest = &after[len..];
        } else {
            rest = after;
        }
    }
    found
}

enum Scan<'a> {
    /// Identifier and the number of bytes consumed including `}}`.
    Placeholder(&'a str, usize),
    Unterminated,
    Literal,
}

fn placeholder_at(after_open: &str) -> Scan<'_> {
    let ident_len = after_open
        .bytes()
        .take_while(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || *b == b'_')
        .count();
    if ident_len == 0 || !after_open.as_bytes()[0].is_ascii_uppercase() {
        return Scan::Literal;
    }
    let ident = &after_open[..ident_len];
    let tail = &after_open[ident_len..];
    if tail.starts_with("}}") {
        Scan::Placeholder(ident, ident_len + 2)
    } else if tail.is_empty() || tail.starts_with('\n') {
        Scan::Unterminated
    } else {
        Scan::Literal
    }
}

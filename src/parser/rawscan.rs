//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Declaration-order recovery from raw JSON bytes.
//!
//! The generic tree loses object key order, but action-parameter order
//! is semantic: positional wrappers take arguments in declaration
//! order. This module re-scans the original text with a brace/quote
//! tracker and reports the top-level keys of the object at a
//! dot-separated path, in the order they appear.

/// Extract the key order of the object at `path` (dot separated, e.g.
/// `definitions.Reset.parameters`).
///
/// Returns an empty vector when the path cannot be found; callers fall
/// back to lexical order.
#[must_use]
pub fn key_order(raw: &str, path: &str) -> Vec<String> {
    let mut current = raw;
    for part in path.split('.') {
        current = match object_body(current, part) {
            Some(body) => body,
            None => return Vec::new(),
        };
    }
    top_level_keys(current)
}

/// Find `"key" : {` in `text` and return the body between the matching
/// braces.
fn object_body<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("\"{}\"", key);
    let mut search_from = 0;
    while let Some(found) = text[search_from..].find(&needle) {
        let key_end = search_from + found + needle.len();
        let rest = &text[key_end..];
        let after_colon = rest.trim_start();
        if let Some(after_colon) = after_colon.strip_prefix(':') {
            let after_colon = after_colon.trim_start();
            if after_colon.starts_with('{') {
                let open = key_end + (rest.len() - after_colon.len());
                return balanced_body(text, open);
            }
        }
        search_from = key_end;
    }
    None
}

/// Given the byte offset of an opening brace, return the text between
/// it and its matching closing brace.
fn balanced_body(text: &str, open: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    debug_assert_eq!(bytes[open], b'{');

    let mut depth = 1usize;
    let mut in_string = false;
    let mut i = open + 1;
    while i < bytes.len() {
        let ch = bytes[i];
        if in_string {
            match ch {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
        } else {
            match ch {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[open + 1..i]);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Keys at depth zero of an object body, in textual order.
///
/// A key is a string immediately followed (modulo whitespace) by a
/// colon. Embedded strings containing braces are skipped over.
fn top_level_keys(body: &str) -> Vec<String> {
    let bytes = body.as_bytes();
    let mut keys = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let (literal, end) = match string_literal(body, i) {
                    Some(found) => found,
                    None => return keys,
                };
                if depth == 0 {
                    let mut j = end;
                    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j] == b':' {
                        keys.push(literal.to_string());
                    }
                }
                i = end;
            }
            b'{' | b'[' => {
                depth += 1;
                i += 1;
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            _ => i += 1,
        }
    }
    keys
}

/// Parse the string literal starting at `start` (an opening quote);
/// returns its contents and the index just past the closing quote.
fn string_literal(text: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some((&text[start + 1..i], i + 1)),
            _ => i += 1,
        }
    }
    None
}

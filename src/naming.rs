//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Identifier cleaning and doc-comment formatting.
//!
//! Schema names arrive with `@odata.*` prefixes, embedded dots and
//! hyphens, and inconsistent acronym casing. Everything the generator
//! names goes through here first: type names stay Pascal case with
//! known acronyms capitalized, field and method names are converted to
//! snake case with Rust keywords escaped.

/// Acronyms that are uppercased inside cleaned type names.
const ACRONYMS: &[(&str, &str)] = &[
    ("Fpga", "FPGA"),
    ("Http", "HTTP"),
    ("Json", "JSON"),
    ("Dhcp", "DHCP"),
    ("Dns", "DNS"),
    ("Uri", "URI"),
];

/// Explicit field-name overrides applied before any other rule.
const NAME_OVERRIDES: &[(&str, &str)] = &[("Oem", "OEM"), ("Id", "ID")];

/// Strip non-alphanumerics and capitalize known acronyms.
///
/// `Id` becomes `ID` unless the name is an `Identifier`/`Idle`/`Ident…`
/// style word where the two letters are not the acronym.
#[must_use]
pub fn clean_identifier(name: &str) -> String {
    let mut clean: String = name.chars().filter(char::is_ascii_alphanumeric).collect();
    for (from, to) in ACRONYMS {
        clean = clean.replace(from, to);
    }
    if !clean.contains("Identif") && !clean.contains("Idle") && !clean.contains("Ident") {
        clean = clean.replace("Id", "ID");
    }
    clean
}

/// Convert a JSON property name to the Pascal-case name used for
/// generated types and wire-name bookkeeping.
///
/// Handles `@odata.*` conversions, the `X@odata.count` pattern, and
/// names with dots or hyphens.
#[must_use]
pub fn pascal_field_name(json_name: &str) -> String {
    for (from, to) in NAME_OVERRIDES {
        if json_name == *from {
            return (*to).to_string();
        }
    }

    if json_name.contains('@') {
        return convert_odata_name(json_name);
    }

    if json_name.contains('.') || json_name.contains('-') {
        return json_name
            .split(|c| c == '.' || c == '-')
            .map(capitalize_first)
            .collect();
    }

    let mut name = json_name.to_string();
    // Trailing `Id` of an otherwise untouched name.
    if name.ends_with("Id") && !name.ends_with("Ident") {
        name.truncate(name.len() - 2);
        name.push_str("ID");
    }
    name
}

fn convert_odata_name(name: &str) -> String {
    match name {
        "@odata.id" => return "ODataID".to_string(),
        "@odata.type" => return "ODataType".to_string(),
        "@odata.context" => return "ODataContext".to_string(),
        "@odata.etag" => return "ODataEtag".to_string(),
        _ => {}
    }

    // Property@odata.count pattern.
    if let Some(prefix) = name.strip_suffix("@odata.count") {
        return format!("{}Count", prefix);
    }

    if let Some(rest) = name.strip_prefix("@odata.") {
        return format!("OData{}", capitalize_first(rest));
    }

    // Other annotations, e.g. @Message.ExtendedInfo.
    name.split(|c| c == '@' || c == '.')
        .map(capitalize_first)
        .collect()
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert a camel-case name into snake case.
///
/// Acronym runs stay one word (`PCIeFunctions` -> `pcie_functions`); a
/// trailing capital before two or more lowercase letters starts a new
/// word.
#[must_use]
pub fn camel_to_snake(camel: &str) -> String {
    let chars: Vec<char> = camel.chars().collect();
    let mut words: Vec<String> = vec![String::new()];

    for (i, &ch) in chars.iter().enumerate() {
        let new_word = i > 0 && ch.is_uppercase() && {
            let prev = chars[i - 1];
            // Transition from lowercase (plain camelCase), or from an
            // acronym into a fresh word (the next 2+ chars are lower).
            prev.is_lowercase()
                || (prev.is_uppercase()
                    && i + 1 < chars.len()
                    && chars[i + 1].is_lowercase()
                    && chars[i + 1..]
                        .iter()
                        .take_while(|c| c.is_lowercase())
                        .count()
                        >= 2)
        };
        if new_word {
            words.push(String::new());
        }
        if let Some(word) = words.last_mut() {
            word.push(ch);
        }
    }

    words
        .into_iter()
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Rust keywords that cannot be used as field or method names.
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Append an underscore when the name collides with a Rust keyword.
#[must_use]
pub fn escape_keyword(name: &str) -> String {
    if RUST_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Snake-case field name for a JSON property, keyword escaped.
#[must_use]
pub fn snake_field_name(json_name: &str) -> String {
    // The odata annotations have established snake spellings.
    match json_name {
        "@odata.id" => return "odata_id".to_string(),
        "@odata.type" => return "odata_type".to_string(),
        "@odata.context" => return "odata_context".to_string(),
        "@odata.etag" => return "odata_etag".to_string(),
        _ => {}
    }
    let name = escape_keyword(&camel_to_snake(&clean_identifier(&pascal_field_name(
        json_name,
    ))));
    make_valid_identifier(name)
}

/// Enum variant name for an on-wire enum value.
#[must_use]
pub fn variant_name(value: &str) -> String {
    let name = make_valid_identifier(capitalize_first(&clean_identifier(value)));
    // `Self` is the one Pascal-case keyword a schema can produce.
    if name == "Self" {
        "Self_".to_string()
    } else {
        name
    }
}

/// Prefix names that do not start with a letter or underscore.
fn make_valid_identifier(name: String) -> String {
    match name.chars().next() {
        None => "Value".to_string(),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => name,
        Some(_) => format!("V{}", name),
    }
}

/// Normalize a schema description: backticks to quotes, whitespace
/// collapsed.
#[must_use]
pub fn clean_description(desc: &str) -> String {
    let desc = desc.replace('`', "'");
    desc.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wrap a description into doc-comment lines at 80 columns, counting
/// the `/// ` prefix.
#[must_use]
pub fn wrap_description(desc: &str) -> Vec<String> {
    const MAX_LINE: usize = 80 - "/// ".len();

    let desc = clean_description(desc);
    if desc.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in desc.split(' ') {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() > MAX_LINE {
            lines.push(current);
            current = word.to_string();
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Convert `v1_3_0` to the `v1.3.0` form used in doc notices.
#[must_use]
pub fn dotted_version(ver: &str) -> String {
    ver.replace('_', ".")
}

//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Typed model produced by the parser and consumed by the generator.
//!
//! A [`Definition`] is either an enum (non-empty `enum_values`) or an
//! object (properties, possibly with actions and links). The parser
//! guarantees it is never both.

/// Target package for a generated type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Package {
    /// Hand-maintained infrastructure types live here; generated code
    /// qualifies references into it with `common::`.
    Common,
    Redfish,
    Swordfish,
    /// The crate root of the client library. Only `ServiceRoot` is
    /// routed here.
    Rustfish,
    /// Default target for all generated resource types.
    Schemas,
}

impl Package {
    /// Directory name under the output root, or `None` for the crate
    /// root package.
    #[must_use]
    pub fn subdir(self) -> Option<&'static str> {
        match self {
            Self::Common => Some("common"),
            Self::Redfish => Some("redfish"),
            Self::Swordfish => Some("swordfish"),
            Self::Rustfish => None,
            Self::Schemas => Some("schemas"),
        }
    }
}

/// A complete type definition parsed from a `definitions` entry.
#[derive(Debug, Default, Clone)]
pub struct Definition {
    /// Cleaned Rust type name.
    pub name: String,
    /// Name as written in the schema.
    pub original_name: String,
    /// Target package.
    pub package: Option<Package>,
    /// Formatted doc comment lines.
    pub description: Vec<String>,
    /// True when the source object carries `@odata.id`/`@odata.type`.
    pub is_entity: bool,
    pub is_enum: bool,
    pub properties: Vec<Property>,
    pub enum_values: Vec<EnumValue>,
    pub actions: Vec<Action>,
    pub links: Vec<Link>,
    /// JSON names of writable properties; drives the diff-based PATCH.
    pub read_write_properties: Vec<String>,
    /// Schema version from the file name, e.g. `v1_2_0`.
    pub version: String,
    /// Release the schema shipped in, e.g. `2018.3`.
    pub release: String,
    /// Schema title, e.g. `#LogService.v1_2_0.LogService`.
    pub title: String,
    /// Top-level `$id` of the schema document.
    pub schema_id: String,
}

impl Definition {
    /// Look up a property by its wire name.
    #[must_use]
    pub fn property_by_json_name(&self, json_name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.json_name == json_name)
    }
}

/// A struct field.
#[derive(Debug, Default, Clone)]
pub struct Property {
    /// Rust field name (snake case, keyword escaped).
    pub name: String,
    /// Property name on the wire.
    pub json_name: String,
    /// Rust type path, possibly package qualified (`common::Status`).
    pub type_name: String,
    /// Nullable value; rendered as `Option<T>`.
    pub is_pointer: bool,
    pub is_array: bool,
    pub is_read_only: bool,
    /// Stored as a URI string with a typed getter.
    pub is_link: bool,
    /// The `$ref` names a `*Collection` schema.
    pub is_collection: bool,
    /// Field is hidden behind a getter of the same name.
    pub is_private: bool,
    pub version_added: String,
    pub is_deprecated: bool,
    /// Formatted doc comment lines.
    pub description: Vec<String>,
}

/// An enum constant.
#[derive(Debug, Default, Clone)]
pub struct EnumValue {
    /// Rust variant name.
    pub name: String,
    /// String value on the wire.
    pub value: String,
    pub description: Vec<String>,
}

/// A named POST endpoint exposed by a resource.
#[derive(Debug, Default, Clone)]
pub struct Action {
    /// Verb, e.g. `Reset`.
    pub name: String,
    /// Wire key, e.g. `#ComputerSystem.Reset`.
    pub json_name: String,
    pub description: Vec<String>,
    /// Declaration ordered.
    pub parameters: Vec<ActionParameter>,
    /// Non-empty when the schema declares `actionResponse`.
    pub response_type: String,
}

/// One action parameter.
#[derive(Debug, Default, Clone)]
pub struct ActionParameter {
    /// Snake-case name for the positional argument or struct field.
    pub name: String,
    /// Name on the wire.
    pub original_name: String,
    /// Rust type path.
    pub type_name: String,
    pub is_array: bool,
    pub required: bool,
    /// Declaration position recovered from the raw JSON.
    pub ordinal: usize,
    pub description: Vec<String>,
}

/// A `Links` entry pointing at another resource.
#[derive(Debug, Default, Clone)]
pub struct Link {
    /// Rust field and getter name (snake case, keyword escaped).
    pub name: String,
    pub json_name: String,
    /// Target entity type (package prefix resolved by the generator).
    pub type_name: String,
    pub is_array: bool,
    pub deprecated: bool,
    pub description: Vec<String>,
}

/// Version triple parsed from `v<major>_<minor>_<errata>`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub errata: u32,
}

impl SchemaVersion {
    #[must_use]
    pub fn new(major: u32, minor: u32, errata: u32) -> Self {
        Self {
            major,
            minor,
            errata,
        }
    }

    /// Parse the first `v<M>_<m>_<e>` occurrence in `s`.
    #[must_use]
    pub fn find_in(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        for (i, _) in s.char_indices() {
            if bytes[i] == b'v' {
                if let Some(v) = Self::parse_at(&s[i + 1..]) {
                    return Some(v);
                }
            }
        }
        None
    }

    fn parse_at(rest: &str) -> Option<Self> {
        let mut parts = rest.splitn(3, '_');
        let major = take_digits(parts.next()?)?;
        let minor = take_digits(parts.next()?)?;
        let errata = take_digits(parts.next()?)?;
        Some(Self::new(major, minor, errata))
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}_{}_{}", self.major, self.minor, self.errata)
    }
}

/// Parse the leading digit run of `s`; `None` when it does not start
/// with a digit.
fn take_digits(s: &str) -> Option<u32> {
    let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

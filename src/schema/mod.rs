//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Raw schema handling: loading, version resolution, and origin
//! classification.

/// Schema document loader.
pub mod document;

/// Latest-version resolution for base schema files.
pub mod version;

/// Redfish/Swordfish origin detection and name-conflict actions.
pub mod origin;

pub use document::SchemaDocument;
pub use origin::determine_origin;
pub use origin::needs_sf_prefix;
pub use origin::skip_schema;
pub use origin::ConflictAction;
pub use origin::SchemaOrigin;
pub use version::resolve_latest_version;

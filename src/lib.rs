//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Compiler from DMTF Redfish / SNIA Swordfish JSON Schema bundles to
//! the typed Rust client surface of the rustfish library.
//!
//! The pipeline per schema: load the base file, classify its origin,
//! resolve the latest versioned sibling, parse base and versioned
//! definitions into the typed model, and render a formatted source
//! file with resource structs, enums, link getters, action methods,
//! and update support.

/// Batch orchestration and output layout.
pub mod batch;
/// Error type.
pub mod error;
/// Upstream bundle fetching.
pub mod fetch;
/// Code rendering.
pub mod generator;
/// Parsed data model.
pub mod model;
/// Identifier and doc-comment normalization.
pub mod naming;
/// Definition parsing.
pub mod parser;
/// Schema loading, versioning, and origin classification.
pub mod schema;

pub use error::Error;

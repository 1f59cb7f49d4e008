// This module is the hub for the infrastructure shared by every part of the meta
// description layer. It exports the error taxonomy (MetaError with one variant per
// configuration failure category, and the MetaResult alias) and the Catalog, the explicit
// declaration context that owns the type, operand kind and instruction format registries,
// the closed instruction groups and the single open-group state. The value model itself
// lives in `ir`, `settings`, `isa` and `xform`; they all report failures through the
// error type defined here.

//! Core meta-description infrastructure.
//!
//! # Key Components
//!
//! ## Errors (`error`)
//! - One error category per configuration failure
//! - `category()` for top-level reporting
//!
//! ## Catalog (`catalog`)
//! - Owns the type, operand kind and format registries
//! - Enforces a single open settings or instruction group
//! - Declaration statistics

pub mod catalog;
pub mod error;

// Re-export core components
pub use catalog::{Catalog, CatalogStats};

pub use error::{
    MetaError,
    MetaResult,
};

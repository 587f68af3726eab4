//! Core types and traits for ProjectLens.
//!
//! Serialized field names match the `projectlens_history` slot written by earlier
//! versions of the tool (camelCase keys), so stored history stays readable.

mod record;
mod traits;

pub use record::*;
pub use traits::*;

/// Key of the durable slot holding the whole serialized history.
pub const HISTORY_SLOT_KEY: &str = "projectlens_history";

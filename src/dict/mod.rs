//! Table capability shared by every backend and by the composites.
//!
//! This module owns the vocabulary of a lookup:
//! - `Table` (the capability) and `LookupResult` / `ErrorCode` (its outcomes)
//! - `Owner` (trust level) and its aggregation
//! - `DictFlags` / `OpenMode` (open-time parameters and match capability)

pub mod flags;
pub mod owner;
pub mod table;

pub use flags::{DictFlags, OpenMode};
pub use owner::Owner;
pub use table::{ErrorCode, LookupResult, Table};

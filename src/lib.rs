//! Composite lookup tables.
//!
//! A lookup table maps a string key to a string value. Besides a handful of
//! leaf backends this crate provides two combinators over other tables:
//!
//! - `or:{type:name, ...}` asks each component in order and answers with the
//!   first that knows the key;
//! - `union:{type:name, ...}` asks every component and joins their answers
//!   with a comma.
//!
//! Components are shared through a [`Registry`]: a composite takes a
//! reference on each component when opened and drops it when closed.
//!
//! ```no_run
//! use dict_compose::{DictFlags, OpenMode, Registry, TableRegistry};
//!
//! let registry = TableRegistry::new();
//! let table = registry
//!     .open("or:{inline:{alice=a@example.com}, static:nobody}", OpenMode::ReadOnly, DictFlags::empty())
//!     .unwrap();
//! println!("{:?}", table.lookup("alice"));
//! registry.close(table);
//! ```

pub mod backends;
pub mod combinator;
pub mod config;
pub mod dict;
pub mod error;
pub mod logging;
pub mod registry;
pub mod spec;
pub mod summary;

#[cfg(test)]
mod testing;

pub use combinator::{OrTable, UnionTable};
pub use config::Config;
pub use dict::{DictFlags, ErrorCode, LookupResult, OpenMode, Owner, Table};
pub use error::OpenError;
pub use registry::{Registry, TableRegistry};
pub use summary::TableSummary;

pub type Result<T> = anyhow::Result<T>;

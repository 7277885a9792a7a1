//! Named, reference-counted table instances.
//!
//! Composites resolve their components through a [`Registry`] passed in by
//! the caller. The registry owns every named instance; a composite only
//! borrows counted references and must give back each one it takes.

pub mod debug;
pub mod table_registry;

pub use debug::DebugTable;
pub use table_registry::{OpenRequest, Opener, TableRegistry, TableRegistryBuilder};

use crate::dict::{DictFlags, OpenMode, Table};
use crate::error::OpenError;
use std::sync::Arc;

pub trait Registry: Send + Sync {
    /// Open a new, unregistered table for `spec` (`kind:name`).
    fn open(&self, spec: &str, mode: OpenMode, flags: DictFlags)
    -> Result<Arc<dyn Table>, OpenError>;

    /// Add one reference to `table` under `name`.
    ///
    /// Registering the instance already held under `name` only bumps the
    /// count; a different instance is a `NameConflict`.
    fn register(&self, name: &str, table: Arc<dyn Table>) -> Result<(), OpenError>;

    /// Drop one reference to `name`. The table is closed when the last
    /// reference goes away.
    fn unregister(&self, name: &str);

    /// The table currently registered under `name`, if any.
    fn handle(&self, name: &str) -> Option<Arc<dyn Table>>;

    /// Release a table obtained from [`open`](Self::open): unregister it if
    /// it is registered, otherwise close it directly.
    fn close(&self, table: Arc<dyn Table>);
}

//! Composite tables.
//!
//! - `or:{a, b, ...}` asks each component in turn and stops at the first
//!   table that finds the key or fails.
//! - `union:{a, b, ...}` asks every component and joins all found values
//!   with commas; any failure fails the whole lookup.
//!
//! Both resolve their components the same way (see [`Components`]): a
//! component already registered under its descriptor is shared, otherwise
//! it is opened, and either way one reference is registered for this
//! composite. Opening is all-or-nothing.

pub mod aggregate;
pub mod or;
pub mod union;

pub use aggregate::{aggregate_owner, first_match_flags};
pub use or::OrTable;
pub use union::UnionTable;

use crate::dict::{DictFlags, OpenMode, Table};
use crate::error::OpenError;
use crate::registry::Registry;
use crate::spec::CompositeSpec;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

pub const OR_KIND: &str = "or";
pub const UNION_KIND: &str = "union";

/// One resolved component and the name its reference is registered under.
#[derive(Debug)]
pub struct Component {
    pub name: String,
    pub table: Arc<dyn Table>,
}

/// The registered components of one composite.
///
/// Each entry owns exactly one registry reference. The references are
/// given back by [`release`](Self::release) or, failing that, on drop, so a
/// composite that fails half way through opening never leaks a
/// registration.
#[derive(Debug)]
pub struct Components {
    registry: Weak<dyn Registry>,
    entries: Vec<Component>,
    released: AtomicBool,
}

impl Components {
    /// Validate `kind:locator` and resolve every component in order.
    pub fn open(
        registry: &Arc<dyn Registry>,
        kind: &str,
        locator: &str,
        mode: OpenMode,
        flags: DictFlags,
    ) -> Result<Self, OpenError> {
        let composite = format!("{kind}:{locator}");
        if mode != OpenMode::ReadOnly {
            return Err(OpenError::UnsupportedMode {
                spec: composite,
                required: OpenMode::ReadOnly,
                requested: mode,
            });
        }

        let spec = CompositeSpec::parse(kind, locator)?;

        let mut components = Self {
            registry: Arc::downgrade(registry),
            entries: Vec::with_capacity(spec.len()),
            released: AtomicBool::new(false),
        };
        for descriptor in &spec {
            let name = descriptor.to_string();
            debug!(%composite, component = %name, "resolving component");
            // On error `components` drops here and releases what it holds.
            let table = acquire(registry, &name, mode, flags).map_err(|source| {
                OpenError::ComponentOpen {
                    composite: composite.clone(),
                    component: name.clone(),
                    source: Box::new(source),
                }
            })?;
            components.entries.push(Component { name, table });
        }

        Ok(components)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.entries.iter()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Arc<dyn Table>> {
        self.entries.iter().map(|c| &c.table)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Give back one reference per component. Later calls do nothing.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        for component in &self.entries {
            registry.unregister(&component.name);
        }
    }
}

impl Drop for Components {
    fn drop(&mut self) {
        self.release();
    }
}

/// Take one registered reference to `name`, opening it if nobody holds it.
fn acquire(
    registry: &Arc<dyn Registry>,
    name: &str,
    mode: OpenMode,
    flags: DictFlags,
) -> Result<Arc<dyn Table>, OpenError> {
    if let Some(table) = registry.handle(name) {
        registry.register(name, Arc::clone(&table))?;
        return Ok(table);
    }

    let table = registry.open(name, mode, flags)?;
    if let Err(err) = registry.register(name, Arc::clone(&table)) {
        registry.close(table);
        return Err(err);
    }
    Ok(table)
}

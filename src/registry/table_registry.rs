//! In-process registry with the builtin table kinds.

use crate::backends;
use crate::combinator;
use crate::dict::{DictFlags, OpenMode, Table};
use crate::error::OpenError;
use crate::registry::{DebugTable, Registry};
use crate::spec::ComponentDescriptor;

use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};
use tracing::{debug, trace, warn};

/// Table kind that resolves a configured alias.
pub const ALIAS_KIND: &str = "alias";

/// Everything a kind-specific opener gets to see.
pub struct OpenRequest<'a> {
    /// Registry to resolve nested tables through.
    pub registry: &'a Arc<dyn Registry>,
    /// Full `kind:name` spec.
    pub spec: &'a str,
    pub kind: &'a str,
    pub name: &'a str,
    pub mode: OpenMode,
    pub flags: DictFlags,
}

impl OpenRequest<'_> {
    pub fn require_read_only(&self) -> Result<(), OpenError> {
        if self.mode == OpenMode::ReadOnly {
            return Ok(());
        }
        Err(OpenError::UnsupportedMode {
            spec: self.spec.to_string(),
            required: OpenMode::ReadOnly,
            requested: self.mode,
        })
    }
}

pub type Opener =
    Box<dyn Fn(&OpenRequest<'_>) -> Result<Arc<dyn Table>, OpenError> + Send + Sync>;

/// One name's share of a table.
struct Registered {
    table: Arc<dyn Table>,
    refs: usize,
}

/// Live references. A table may be registered under several names; it is
/// closed when the total over all of them drops to zero.
#[derive(Default)]
struct Entries {
    names: HashMap<String, Registered>,
    totals: HashMap<usize, usize>,
}

/// Reference-counted name → table map plus a per-kind opener table.
///
/// The cycle check keeps one stack of the specs being opened per thread, so
/// concurrent opens of the same spec do not see each other.
pub struct TableRegistry {
    this: Weak<TableRegistry>,
    openers: BTreeMap<String, Opener>,
    aliases: BTreeMap<String, String>,
    entries: Mutex<Entries>,
    opening: Mutex<HashMap<ThreadId, Vec<String>>>,
}

pub struct TableRegistryBuilder {
    openers: BTreeMap<String, Opener>,
    aliases: BTreeMap<String, String>,
}

impl TableRegistryBuilder {
    /// Add or replace the opener for `kind`.
    pub fn kind<F>(mut self, kind: impl Into<String>, opener: F) -> Self
    where
        F: Fn(&OpenRequest<'_>) -> Result<Arc<dyn Table>, OpenError> + Send + Sync + 'static,
    {
        self.openers.insert(kind.into(), Box::new(opener));
        self
    }

    /// Make `spec` reachable as `alias:<name>`.
    pub fn alias(mut self, name: impl Into<String>, spec: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), spec.into());
        self
    }

    pub fn aliases<I, K, V>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.aliases
            .extend(aliases.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn build(self) -> Arc<TableRegistry> {
        Arc::new_cyclic(|this| TableRegistry {
            this: this.clone(),
            openers: self.openers,
            aliases: self.aliases,
            entries: Mutex::new(Entries::default()),
            opening: Mutex::new(HashMap::new()),
        })
    }
}

impl TableRegistry {
    /// Builder preloaded with the builtin kinds.
    pub fn builder() -> TableRegistryBuilder {
        TableRegistryBuilder {
            openers: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
        .kind(combinator::OR_KIND, combinator::or::open)
        .kind(combinator::UNION_KIND, combinator::union::open)
        .kind(backends::static_map::KIND, backends::static_map::open)
        .kind(backends::inline::KIND, backends::inline::open)
        .kind(backends::fail::KIND, backends::fail::open)
        .kind(backends::regexp::KIND, backends::regexp::open)
        .kind(backends::texthash::KIND, backends::texthash::open)
    }

    pub fn new() -> Arc<Self> {
        Self::builder().build()
    }

    /// Number of live references registered under `name`.
    pub fn ref_count(&self, name: &str) -> usize {
        self.entries.lock().names.get(name).map_or(0, |e| e.refs)
    }

    /// Registered names, sorted.
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.lock().names.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.openers
            .keys()
            .map(String::as_str)
            .chain(std::iter::once(ALIAS_KIND))
    }
}

impl fmt::Debug for TableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRegistry")
            .field("kinds", &self.openers.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .field("registered", &self.registered_names())
            .finish()
    }
}

impl Registry for TableRegistry {
    fn open(
        &self,
        spec: &str,
        mode: OpenMode,
        flags: DictFlags,
    ) -> Result<Arc<dyn Table>, OpenError> {
        let spec = spec.trim();
        let descriptor = ComponentDescriptor::parse(spec)
            .ok_or_else(|| OpenError::malformed(spec, "type:name", "missing table type"))?;
        let _opening = OpeningGuard::enter(&self.opening, spec)?;

        if descriptor.kind() == ALIAS_KIND {
            let target = self.aliases.get(descriptor.locator()).ok_or_else(|| {
                OpenError::UnknownAlias {
                    name: descriptor.locator().to_string(),
                }
            })?;
            debug!(alias = descriptor.locator(), %target, "resolving alias");
            return self.open(target, mode, flags);
        }

        let opener = self
            .openers
            .get(descriptor.kind())
            .ok_or_else(|| OpenError::UnknownKind {
                kind: descriptor.kind().to_string(),
                spec: spec.to_string(),
            })?;
        let registry: Arc<dyn Registry> =
            self.this.upgrade().ok_or_else(|| OpenError::RegistryGone {
                spec: spec.to_string(),
            })?;

        let table = opener(&OpenRequest {
            registry: &registry,
            spec,
            kind: descriptor.kind(),
            name: descriptor.locator(),
            mode,
            flags,
        })?;
        debug!(%spec, owner = %table.owner(), "opened table");

        if flags.contains(DictFlags::DEBUG) {
            Ok(Arc::new(DebugTable::new(table)))
        } else {
            Ok(table)
        }
    }

    fn register(&self, name: &str, table: Arc<dyn Table>) -> Result<(), OpenError> {
        let mut entries = self.entries.lock();
        let key = table_key(&table);
        match entries.names.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                if !same_table(&slot.get().table, &table) {
                    return Err(OpenError::NameConflict {
                        name: name.to_string(),
                    });
                }
                slot.get_mut().refs += 1;
            }
            Entry::Vacant(slot) => {
                slot.insert(Registered { table, refs: 1 });
            }
        }
        let total = entries.totals.entry(key).or_default();
        *total += 1;
        trace!(name, total = *total, "registered");
        Ok(())
    }

    fn unregister(&self, name: &str) {
        let released = {
            let mut entries = self.entries.lock();
            let Some(entry) = entries.names.get_mut(name) else {
                warn!(name, "unregister of unknown table name");
                return;
            };
            entry.refs -= 1;
            let table = Arc::clone(&entry.table);
            if entry.refs == 0 {
                entries.names.remove(name);
            }

            let key = table_key(&table);
            let total = entries.totals.get_mut(&key).map_or(0, |total| {
                *total -= 1;
                *total
            });
            trace!(name, total, "unregistered");
            if total > 0 {
                return;
            }
            entries.totals.remove(&key);
            table
        };

        // Closing a composite unregisters its components, so the lock must
        // be free by now.
        debug!(name, "closing table");
        released.close();
    }

    fn handle(&self, name: &str) -> Option<Arc<dyn Table>> {
        self.entries
            .lock()
            .names
            .get(name)
            .map(|entry| Arc::clone(&entry.table))
    }

    /// Unregister the table's own descriptor if it holds the table, else any
    /// name that does; an unregistered table is closed directly.
    fn close(&self, table: Arc<dyn Table>) {
        let name = {
            let entries = self.entries.lock();
            let own = table.descriptor();
            match entries.names.get(&own) {
                Some(entry) if same_table(&entry.table, &table) => Some(own),
                _ => entries
                    .names
                    .iter()
                    .find(|(_, entry)| same_table(&entry.table, &table))
                    .map(|(name, _)| name.clone()),
            }
        };
        match name {
            Some(name) => self.unregister(&name),
            None => table.close(),
        }
    }
}

fn same_table(a: &Arc<dyn Table>, b: &Arc<dyn Table>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Identity of a table instance, independent of the name it is held under.
fn table_key(table: &Arc<dyn Table>) -> usize {
    Arc::as_ptr(table).cast::<()>() as usize
}

/// Marks a spec as being opened by the current thread for the lifetime of
/// the guard. Each thread keeps its own stack.
struct OpeningGuard<'a> {
    stacks: &'a Mutex<HashMap<ThreadId, Vec<String>>>,
}

impl<'a> OpeningGuard<'a> {
    fn enter(
        stacks: &'a Mutex<HashMap<ThreadId, Vec<String>>>,
        spec: &str,
    ) -> Result<Self, OpenError> {
        let mut stacks_guard = stacks.lock();
        let opening = stacks_guard.entry(thread::current().id()).or_default();
        if let Some(pos) = opening.iter().position(|s| s == spec) {
            let mut chain = opening[pos..].to_vec();
            chain.push(spec.to_string());
            return Err(OpenError::Cycle {
                chain: chain.join(" -> "),
            });
        }
        opening.push(spec.to_string());
        Ok(Self { stacks })
    }
}

impl Drop for OpeningGuard<'_> {
    fn drop(&mut self) {
        let mut stacks = self.stacks.lock();
        let id = thread::current().id();
        if let Some(opening) = stacks.get_mut(&id) {
            opening.pop();
            if opening.is_empty() {
                stacks.remove(&id);
            }
        }
    }
}

//! Test doubles: a scripted table and a registry that records every call.

use crate::dict::{DictFlags, LookupResult, OpenMode, Owner, Table};
use crate::error::OpenError;
use crate::registry::Registry;

use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Table with a canned answer that counts how often it is probed.
#[derive(Debug)]
pub struct ProbeTable {
    name: String,
    default: LookupResult,
    owner: Owner,
    flags: DictFlags,
    probes: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl ProbeTable {
    pub fn new(name: &str, default: LookupResult) -> Self {
        Self {
            name: name.to_string(),
            default,
            owner: Owner::Trusted,
            flags: DictFlags::FIXED,
            probes: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn found(name: &str, value: &str) -> Self {
        Self::new(name, LookupResult::Found(value.to_string()))
    }

    pub fn not_found(name: &str) -> Self {
        Self::new(name, LookupResult::NotFound)
    }

    pub fn failing(name: &str, code: crate::dict::ErrorCode) -> Self {
        Self::new(name, LookupResult::Error(code))
    }

    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_flags(mut self, flags: DictFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Shared probe counter; stays valid after the table is moved away.
    pub fn probes(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.probes)
    }

    pub fn closes(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    pub fn into_dyn(self) -> Arc<dyn Table> {
        Arc::new(self)
    }
}

impl Table for ProbeTable {
    fn kind(&self) -> &str {
        "probe"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, _key: &str) -> LookupResult {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.default.clone()
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn owner(&self) -> Owner {
        self.owner
    }

    fn flags(&self) -> DictFlags {
        self.flags
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(String),
    Register(String),
    Unregister(String),
    Close(String),
}

#[derive(Default)]
struct FakeState {
    registered: HashMap<String, (Arc<dyn Table>, usize)>,
    events: Vec<Event>,
}

/// Registry that serves prepared tables by name and records every call.
#[derive(Default)]
pub struct FakeRegistry {
    prepared: HashMap<String, Arc<dyn Table>>,
    failing: BTreeSet<String>,
    state: Mutex<FakeState>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `open(name)` will hand out `table`.
    pub fn with_table(mut self, name: &str, table: Arc<dyn Table>) -> Self {
        self.prepared.insert(name.to_string(), table);
        self
    }

    /// `open(name)` will fail.
    pub fn with_failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn into_arc(self) -> (Arc<Self>, Arc<dyn Registry>) {
        let fake = Arc::new(self);
        let registry: Arc<dyn Registry> = fake.clone();
        (fake, registry)
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }

    pub fn ref_count(&self, name: &str) -> usize {
        self.state
            .lock()
            .registered
            .get(name)
            .map_or(0, |(_, refs)| *refs)
    }

    pub fn registered_names(&self) -> BTreeSet<String> {
        self.state.lock().registered.keys().cloned().collect()
    }
}

impl Registry for FakeRegistry {
    fn open(
        &self,
        spec: &str,
        _mode: OpenMode,
        _flags: DictFlags,
    ) -> Result<Arc<dyn Table>, OpenError> {
        self.state.lock().events.push(Event::Open(spec.to_string()));
        if self.failing.contains(spec) {
            return Err(OpenError::bad_entry(spec, "scripted open failure"));
        }
        self.prepared
            .get(spec)
            .cloned()
            .ok_or_else(|| OpenError::UnknownKind {
                kind: "probe".to_string(),
                spec: spec.to_string(),
            })
    }

    fn register(&self, name: &str, table: Arc<dyn Table>) -> Result<(), OpenError> {
        let mut state = self.state.lock();
        state.events.push(Event::Register(name.to_string()));
        state
            .registered
            .entry(name.to_string())
            .or_insert((table, 0))
            .1 += 1;
        Ok(())
    }

    fn unregister(&self, name: &str) {
        let released = {
            let mut state = self.state.lock();
            state.events.push(Event::Unregister(name.to_string()));
            let Some((_, refs)) = state.registered.get_mut(name) else {
                return;
            };
            *refs -= 1;
            if *refs > 0 {
                return;
            }
            state.registered.remove(name)
        };
        if let Some((table, _)) = released {
            self.state.lock().events.push(Event::Close(name.to_string()));
            table.close();
        }
    }

    fn handle(&self, name: &str) -> Option<Arc<dyn Table>> {
        self.state
            .lock()
            .registered
            .get(name)
            .map(|(table, _)| Arc::clone(table))
    }

    fn close(&self, table: Arc<dyn Table>) {
        let name = table.descriptor();
        if self.state.lock().registered.contains_key(&name) {
            self.unregister(&name);
        } else {
            self.state.lock().events.push(Event::Close(name));
            table.close();
        }
    }
}

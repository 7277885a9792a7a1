use crate::dict::{DictFlags, LookupResult, Owner, Table};
use std::sync::Arc;
use tracing::debug;

/// Decorator that logs every lookup of the wrapped table.
///
/// Installed by the registry for tables opened with [`DictFlags::DEBUG`].
#[derive(Debug)]
pub struct DebugTable {
    inner: Arc<dyn Table>,
}

impl DebugTable {
    pub fn new(inner: Arc<dyn Table>) -> Self {
        Self { inner }
    }
}

impl Table for DebugTable {
    fn kind(&self) -> &str {
        self.inner.kind()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn lookup(&self, key: &str) -> LookupResult {
        let result = self.inner.lookup(key);
        match &result {
            LookupResult::Found(value) => {
                debug!(table = %self.inner.descriptor(), key, value = %value, "lookup found")
            }
            LookupResult::NotFound => {
                debug!(table = %self.inner.descriptor(), key, "lookup not found")
            }
            LookupResult::Error(code) => {
                debug!(table = %self.inner.descriptor(), key, %code, "lookup failed")
            }
        }
        result
    }

    fn close(&self) {
        self.inner.close();
    }

    fn owner(&self) -> Owner {
        self.inner.owner()
    }

    fn flags(&self) -> DictFlags {
        self.inner.flags()
    }

    fn components(&self) -> Vec<Arc<dyn Table>> {
        self.inner.components()
    }
}

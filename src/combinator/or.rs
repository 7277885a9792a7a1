use crate::combinator::{Components, OR_KIND, aggregate_owner, first_match_flags};
use crate::dict::{DictFlags, ErrorCode, LookupResult, OpenMode, Owner, Table};
use crate::error::OpenError;
use crate::registry::{OpenRequest, Registry};

use std::sync::Arc;
use tracing::{trace, warn};

/// `or:{...}`: the first component that finds the key or fails decides.
#[derive(Debug)]
pub struct OrTable {
    name: String,
    flags: DictFlags,
    owner: Owner,
    components: Components,
}

impl OrTable {
    /// Open `or:<locator>` through `registry`.
    ///
    /// The composite is trusted as much as its least trusted component and
    /// takes its match flags from the first component.
    pub fn open(
        registry: &Arc<dyn Registry>,
        locator: &str,
        mode: OpenMode,
        flags: DictFlags,
    ) -> Result<Self, OpenError> {
        let components = Components::open(registry, OR_KIND, locator, mode, flags)?;
        let owner = aggregate_owner(components.tables());
        let match_flags = first_match_flags(components.tables());

        Ok(Self {
            name: locator.to_string(),
            flags: flags.difference(DictFlags::MATCH) | match_flags,
            owner,
            components,
        })
    }
}

pub fn open(req: &OpenRequest<'_>) -> Result<Arc<dyn Table>, OpenError> {
    Ok(Arc::new(OrTable::open(
        req.registry,
        req.name,
        req.mode,
        req.flags,
    )?))
}

impl Table for OrTable {
    fn kind(&self) -> &str {
        OR_KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &str) -> LookupResult {
        if self.components.is_released() {
            warn!(table = %self.descriptor(), key, "lookup on a closed table");
            return LookupResult::Error(ErrorCode::CONFIG);
        }

        for component in self.components.iter() {
            match component.table.lookup(key) {
                LookupResult::NotFound => continue,
                answer => {
                    trace!(component = %component.name, key, ?answer, "or: definitive answer");
                    return answer;
                }
            }
        }
        LookupResult::NotFound
    }

    fn close(&self) {
        self.components.release();
    }

    fn owner(&self) -> Owner {
        self.owner
    }

    fn flags(&self) -> DictFlags {
        self.flags
    }

    fn components(&self) -> Vec<Arc<dyn Table>> {
        self.components.tables().cloned().collect()
    }
}

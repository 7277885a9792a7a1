use crate::dict::{DictFlags, ErrorCode, LookupResult, Owner, Table};
use crate::error::OpenError;
use crate::registry::OpenRequest;
use std::sync::Arc;

pub const KIND: &str = "fail";

/// `fail:name`: every lookup fails with [`ErrorCode::RETRY`].
#[derive(Debug)]
pub struct FailTable {
    name: String,
    flags: DictFlags,
}

impl FailTable {
    pub fn new(name: &str, flags: DictFlags) -> Self {
        Self {
            name: name.to_string(),
            flags: flags.difference(DictFlags::MATCH) | DictFlags::PATTERN,
        }
    }
}

pub fn open(req: &OpenRequest<'_>) -> Result<Arc<dyn Table>, OpenError> {
    Ok(Arc::new(FailTable::new(req.name, req.flags)))
}

impl Table for FailTable {
    fn kind(&self) -> &str {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, _key: &str) -> LookupResult {
        LookupResult::Error(ErrorCode::RETRY)
    }

    fn owner(&self) -> Owner {
        Owner::Trusted
    }

    fn flags(&self) -> DictFlags {
        self.flags
    }
}

use crate::backends::file::{LogicalLine, TableFile};
use crate::backends::fold_key;
use crate::dict::{DictFlags, LookupResult, Owner, Table};
use crate::error::OpenError;
use crate::registry::OpenRequest;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub const KIND: &str = "texthash";

/// `texthash:/path/to/file`: `key value` lines loaded into memory at open.
///
/// The table is as trusted as the owner of the file.
#[derive(Debug)]
pub struct TextHashTable {
    name: String,
    entries: HashMap<String, String>,
    owner: Owner,
    flags: DictFlags,
}

impl TextHashTable {
    pub fn load(spec: &str, path: &str, flags: DictFlags) -> Result<Self, OpenError> {
        let file = TableFile::read(spec, Path::new(path))?;

        let mut entries = HashMap::new();
        for LogicalLine { lineno, text } in file.lines() {
            let (key, value) = text
                .split_once(char::is_whitespace)
                .map(|(k, v)| (k, v.trim()))
                .filter(|(_, v)| !v.is_empty())
                .ok_or_else(|| {
                    OpenError::bad_entry(
                        spec,
                        format!("line {lineno}: expected \"key whitespace value\", got \"{text}\""),
                    )
                })?;

            match entries.entry(fold_key(flags, key).into_owned()) {
                Entry::Occupied(_) => warn!(spec, lineno, key, "duplicate entry ignored"),
                Entry::Vacant(slot) => {
                    slot.insert(value.to_string());
                }
            }
        }
        debug!(spec, entries = entries.len(), owner = %file.owner, "loaded table file");

        Ok(Self {
            name: path.to_string(),
            entries,
            owner: file.owner,
            flags: flags.difference(DictFlags::MATCH) | DictFlags::FIXED,
        })
    }
}

pub fn open(req: &OpenRequest<'_>) -> Result<Arc<dyn Table>, OpenError> {
    req.require_read_only()?;
    Ok(Arc::new(TextHashTable::load(req.spec, req.name, req.flags)?))
}

impl Table for TextHashTable {
    fn kind(&self) -> &str {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &str) -> LookupResult {
        match self.entries.get(&*fold_key(self.flags, key)) {
            Some(value) => LookupResult::Found(value.clone()),
            None => LookupResult::NotFound,
        }
    }

    fn owner(&self) -> Owner {
        self.owner
    }

    fn flags(&self) -> DictFlags {
        self.flags
    }
}

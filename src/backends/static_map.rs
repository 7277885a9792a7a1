use crate::dict::{DictFlags, LookupResult, Owner, Table};
use crate::error::OpenError;
use crate::registry::OpenRequest;
use crate::spec::strip_group;
use std::sync::Arc;

pub const KIND: &str = "static";

/// `static:value`: every key maps to `value`.
///
/// `static:{text with spaces}` and `static:"quoted"` yield the enclosed text.
#[derive(Debug)]
pub struct StaticTable {
    name: String,
    value: String,
    flags: DictFlags,
}

impl StaticTable {
    pub fn new(name: &str, flags: DictFlags) -> Self {
        let value = strip_group(name)
            .or_else(|| name.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
            .unwrap_or(name);
        Self {
            name: name.to_string(),
            value: value.to_string(),
            flags: flags.difference(DictFlags::MATCH) | DictFlags::FIXED,
        }
    }
}

pub fn open(req: &OpenRequest<'_>) -> Result<Arc<dyn Table>, OpenError> {
    Ok(Arc::new(StaticTable::new(req.name, req.flags)))
}

impl Table for StaticTable {
    fn kind(&self) -> &str {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, _key: &str) -> LookupResult {
        LookupResult::Found(self.value.clone())
    }

    fn owner(&self) -> Owner {
        Owner::Trusted
    }

    fn flags(&self) -> DictFlags {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn answers_every_key() {
        let table = StaticTable::new("one", DictFlags::empty());
        assert_eq!(table.lookup("anything"), LookupResult::Found("one".into()));
        assert_eq!(table.match_flags(), DictFlags::FIXED);
    }

    #[test]
    fn unwraps_grouped_and_quoted_values() {
        let braced = StaticTable::new("{ two words }", DictFlags::empty());
        assert_eq!(braced.lookup("k"), LookupResult::Found("two words".into()));
        assert_eq!(braced.descriptor(), "static:{ two words }");

        let quoted = StaticTable::new("\"a, b\"", DictFlags::empty());
        assert_eq!(quoted.lookup("k"), LookupResult::Found("a, b".into()));
    }
}

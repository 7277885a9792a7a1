use crate::backends::{ENTRY_SEPARATORS, fold_key};
use crate::dict::{DictFlags, LookupResult, Owner, Table};
use crate::error::OpenError;
use crate::registry::OpenRequest;
use crate::spec::{split_grouped, strip_group};

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::warn;

pub const KIND: &str = "inline";

/// `inline:{key=value, {key = value with spaces}}`: a literal map.
#[derive(Debug)]
pub struct InlineTable {
    name: String,
    entries: HashMap<String, String>,
    flags: DictFlags,
}

impl InlineTable {
    /// Parse the locator of `inline:{...}`. The first entry for a key wins.
    pub fn parse(spec: &str, name: &str, flags: DictFlags) -> Result<Self, OpenError> {
        let expected = "inline:{name=value, ...}";
        let inner = strip_group(name).ok_or_else(|| {
            OpenError::malformed(spec, expected, "expected a brace-enclosed entry list")
        })?;

        let mut entries = HashMap::new();
        for token in split_grouped(inner, ENTRY_SEPARATORS)
            .map_err(|detail| OpenError::malformed(spec, expected, detail))?
        {
            let entry = if token.starts_with('{') {
                strip_group(token).ok_or_else(|| {
                    OpenError::bad_entry(spec, format!("bad entry \"{token}\""))
                })?
            } else {
                token
            };
            let (key, value) = entry.split_once('=').ok_or_else(|| {
                OpenError::bad_entry(spec, format!("missing '=' in entry \"{entry}\""))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(OpenError::bad_entry(
                    spec,
                    format!("empty key in entry \"{entry}\""),
                ));
            }

            match entries.entry(fold_key(flags, key).into_owned()) {
                Entry::Occupied(_) => warn!(spec, key, "duplicate entry ignored"),
                Entry::Vacant(slot) => {
                    slot.insert(value.trim().to_string());
                }
            }
        }

        if entries.is_empty() {
            return Err(OpenError::bad_entry(spec, "empty table"));
        }

        Ok(Self {
            name: name.to_string(),
            entries,
            flags: flags.difference(DictFlags::MATCH) | DictFlags::FIXED,
        })
    }
}

pub fn open(req: &OpenRequest<'_>) -> Result<Arc<dyn Table>, OpenError> {
    req.require_read_only()?;
    Ok(Arc::new(InlineTable::parse(req.spec, req.name, req.flags)?))
}

impl Table for InlineTable {
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

    fn parse(name: &str, flags: DictFlags) -> Result<InlineTable, OpenError> {
        InlineTable::parse(&format!("inline:{name}"), name, flags)
    }

    #[test]
    fn plain_and_grouped_entries() {
        let table = parse("{foo=three, {bar = four, five}}", DictFlags::empty()).unwrap();
        assert_eq!(table.lookup("foo"), LookupResult::Found("three".into()));
        assert_eq!(table.lookup("bar"), LookupResult::Found("four, five".into()));
        assert_eq!(table.lookup("baz"), LookupResult::NotFound);
    }

    #[test]
    fn keys_are_case_sensitive_unless_folded() {
        let exact = parse("{Foo=1}", DictFlags::empty()).unwrap();
        assert_eq!(exact.lookup("foo"), LookupResult::NotFound);

        let folded = parse("{Foo=1}", DictFlags::FOLD_FIX).unwrap();
        assert_eq!(folded.lookup("FOO"), LookupResult::Found("1".into()));
    }

    #[test]
    fn first_duplicate_wins() {
        let table = parse("{a=1, a=2}", DictFlags::empty()).unwrap();
        assert_eq!(table.lookup("a"), LookupResult::Found("1".into()));
    }

    #[test]
    fn rejects_bad_content() {
        let err = parse("{foo}", DictFlags::empty()).unwrap_err();
        assert_eq!(err.to_string(), "inline:{foo}: missing '=' in entry \"foo\"");

        let err = parse("{ }", DictFlags::empty()).unwrap_err();
        assert_eq!(err.to_string(), "inline:{ }: empty table");

        let err = parse("foo=bar", DictFlags::empty()).unwrap_err();
        assert!(err.to_string().starts_with("bad syntax: \"inline:foo=bar\""));
    }
}

//! Component descriptor: the `kind:locator` identifier of one table.
//!
//! Example: `inline:{foo=three}`  =>  kind `inline`, locator `{foo=three}`
//!
//! The kind ends at the first `:`. It must be non-empty and may not contain
//! grouping characters, so `inline{foo=three}` has no kind at all. The
//! locator is kept verbatim and may itself contain `:` and nested groups.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentDescriptor {
    kind: String,
    locator: String,
}

impl ComponentDescriptor {
    /// Split `kind:locator`. Returns `None` when there is no usable kind.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (kind, locator) = s.split_once(':')?;
        if kind.is_empty() || kind.contains(['{', '}', '"']) || kind.contains(char::is_whitespace)
        {
            return None;
        }
        Some(Self {
            kind: kind.to_string(),
            locator: locator.to_string(),
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }
}

/// Canonical `kind:locator` form, used as the registered name.
impl fmt::Display for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.locator)
    }
}

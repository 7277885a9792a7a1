use crate::dict::{DictFlags, Owner};
use std::fmt;
use std::sync::Arc;

/// Backend fault code carried by [`LookupResult::Error`].
///
/// The set of codes belongs to the backends. Composites never interpret a
/// code, they forward the one they received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(i32);

impl ErrorCode {
    /// Temporary failure; the caller may try again later.
    pub const RETRY: Self = Self(-1);
    /// The table is misconfigured or no longer usable.
    pub const CONFIG: Self = Self(-2);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::RETRY => f.write_str("retry"),
            Self::CONFIG => f.write_str("config"),
            Self(code) => write!(f, "error {code}"),
        }
    }
}

/// Outcome of a single lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found(String),
    NotFound,
    Error(ErrorCode),
}

impl LookupResult {
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    #[must_use]
    pub const fn error(&self) -> Option<ErrorCode> {
        match self {
            Self::Error(code) => Some(*code),
            _ => None,
        }
    }

    /// Extracts the value from `Found`, consuming `self`.
    #[must_use]
    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Found(v) => Some(v),
            _ => None,
        }
    }
}

/// Read-only key/value lookup capability.
///
/// Implemented by every backend and by the `or`/`union` composites, so a
/// composite can nest other composites without special-casing them.
/// Instances are shared through `Arc` and may be referenced by several
/// composites at once; `lookup` therefore takes `&self` and never mutates
/// observable state.
pub trait Table: Send + Sync + fmt::Debug {
    /// Table type, e.g. `inline` or `or`.
    fn kind(&self) -> &str;

    /// Locator part of the `kind:name` descriptor.
    fn name(&self) -> &str;

    fn lookup(&self, key: &str) -> LookupResult;

    /// Release resources. Called once, by whoever holds the last reference.
    fn close(&self) {}

    fn owner(&self) -> Owner;

    fn flags(&self) -> DictFlags;

    /// The `FIXED` / `PATTERN` subset of [`flags`](Self::flags).
    fn match_flags(&self) -> DictFlags {
        self.flags().match_flags()
    }

    /// Underlying tables, in probe order. Empty for leaf backends.
    fn components(&self) -> Vec<Arc<dyn Table>> {
        Vec::new()
    }

    /// `kind:name`, the form the table is registered under.
    fn descriptor(&self) -> String {
        format!("{}:{}", self.kind(), self.name())
    }
}

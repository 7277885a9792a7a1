//! Open-time failures.
//!
//! Every failure here is fatal to the `open` call that raised it. Lookup-time
//! faults are not errors in this sense; they travel as
//! [`LookupResult::Error`](crate::dict::LookupResult::Error).

use crate::dict::OpenMode;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The table kind has no defined semantics for the requested mode.
    #[error("{spec} map requires {required} access mode, got {requested}")]
    UnsupportedMode {
        spec: String,
        required: OpenMode,
        requested: OpenMode,
    },

    /// The spec string does not have the required shape.
    #[error("bad syntax: \"{spec}\"; need \"{expected}\": {detail}")]
    MalformedSpec {
        spec: String,
        expected: String,
        detail: String,
    },

    /// A component of a composite could not be resolved. `source` carries
    /// the component's own failure, so nested composites form a chain.
    #[error("{composite}: cannot open component \"{component}\": {source}")]
    ComponentOpen {
        composite: String,
        component: String,
        #[source]
        source: Box<OpenError>,
    },

    #[error("unsupported table type \"{kind}\" in \"{spec}\"")]
    UnknownKind { kind: String, spec: String },

    #[error("table name \"{name}\" is already registered to a different table")]
    NameConflict { name: String },

    #[error("table cycle detected: {chain}")]
    Cycle { chain: String },

    #[error("no table configured under alias \"{name}\"")]
    UnknownAlias { name: String },

    /// Backend content (inline entries, file lines) is malformed.
    #[error("{spec}: {detail}")]
    BadEntry { spec: String, detail: String },

    #[error("{spec}: bad pattern {pattern:?}: {source}")]
    BadPattern {
        spec: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{spec}: open {}: {source}", path.display())]
    Io {
        spec: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("table registry was dropped while opening \"{spec}\"")]
    RegistryGone { spec: String },
}

impl OpenError {
    pub(crate) fn malformed(
        spec: impl Into<String>,
        expected: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::MalformedSpec {
            spec: spec.into(),
            expected: expected.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn bad_entry(spec: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::BadEntry {
            spec: spec.into(),
            detail: detail.into(),
        }
    }

    /// The innermost failure of a `ComponentOpen` chain.
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::ComponentOpen { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

//! Table ownership as a trust level.
//!
//! A table owned by root is trusted, one owned by another user is untrusted
//! (and remembers that user), anything else is unknown. Levels are ordered
//! `Unknown < Untrusted < Trusted`, so the least trusted table of a set is
//! its minimum.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::fs::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Owner {
    Unknown,
    Untrusted { uid: u32 },
    Trusted,
}

impl Owner {
    fn level(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Untrusted { .. } => 1,
            Self::Trusted => 2,
        }
    }

    /// Trust level of a file, derived from its owning uid.
    #[cfg(unix)]
    pub fn of_file(meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        match meta.uid() {
            0 => Self::Trusted,
            uid => Self::Untrusted { uid },
        }
    }

    #[cfg(not(unix))]
    pub fn of_file(_meta: &Metadata) -> Self {
        Self::Unknown
    }

    /// The less trusted of `self` and `other`.
    ///
    /// Two untrusted owners with different uids fold to `Unknown`.
    #[must_use]
    pub fn weaker(self, other: Self) -> Self {
        match (self, other) {
            (Self::Untrusted { uid: a }, Self::Untrusted { uid: b }) if a != b => Self::Unknown,
            (a, b) if b.level() < a.level() => b,
            (a, _) => a,
        }
    }

    /// Fold a sequence of owners, starting from `Trusted`.
    pub fn aggregate(owners: impl IntoIterator<Item = Self>) -> Self {
        owners.into_iter().fold(Self::Trusted, Self::weaker)
    }
}

impl PartialOrd for Owner {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Untrusted { uid: a }, Self::Untrusted { uid: b }) if a != b => None,
            _ => Some(self.level().cmp(&other.level())),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Untrusted { uid } => write!(f, "untrusted (uid {uid})"),
            Self::Trusted => f.write_str("trusted"),
        }
    }
}

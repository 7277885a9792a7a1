use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Per-table flags: match capability plus open-time behavior switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DictFlags: u32 {
        /// Keys are matched literally.
        const FIXED = 1 << 0;
        /// Keys are matched against patterns.
        const PATTERN = 1 << 1;
        /// Fold fixed-string keys to lower case at load and query time.
        const FOLD_FIX = 1 << 2;
        /// Log every lookup at debug level.
        const DEBUG = 1 << 3;
    }
}

impl DictFlags {
    /// Flags that describe how keys are matched.
    pub const MATCH: Self = Self::FIXED.union(Self::PATTERN);

    #[must_use]
    pub fn match_flags(self) -> Self {
        self & Self::MATCH
    }

    /// Lower-case flag names, for summaries.
    pub fn names(self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect()
    }
}

/// Access mode requested when opening a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    #[default]
    ReadOnly,
    ReadWrite,
    Create,
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadOnly => "read-only",
            Self::ReadWrite => "read-write",
            Self::Create => "create",
        })
    }
}

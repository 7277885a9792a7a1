//! Builtin leaf tables.
//!
//! Each backend exposes `KIND` (its table type) and an `open` function with
//! the [`Opener`](crate::registry::Opener) signature, so the registry can
//! dispatch on the type prefix of a spec.

pub mod fail;
pub mod file;
pub mod inline;
pub mod regexp;
pub mod static_map;
pub mod texthash;

pub use fail::FailTable;
pub use inline::InlineTable;
pub use regexp::RegexpTable;
pub use static_map::StaticTable;
pub use texthash::TextHashTable;

use crate::dict::DictFlags;
use std::borrow::Cow;

/// Entry separators inside inline tables.
pub(crate) const ENTRY_SEPARATORS: &[char] = &[',', ' ', '\t', '\r', '\n'];

/// Lower-case `key` when the table folds fixed-string keys.
pub(crate) fn fold_key(flags: DictFlags, key: &str) -> Cow<'_, str> {
    if flags.contains(DictFlags::FOLD_FIX) {
        Cow::Owned(key.to_lowercase())
    } else {
        Cow::Borrowed(key)
    }
}

//! Metadata folded across the components of a composite.

use crate::dict::{DictFlags, Owner, Table};
use std::sync::Arc;

/// Least trusted owner among `tables`; `Trusted` when there are none.
pub fn aggregate_owner<'a>(tables: impl IntoIterator<Item = &'a Arc<dyn Table>>) -> Owner {
    Owner::aggregate(tables.into_iter().map(|t| t.owner()))
}

/// Match flags of the first table only; empty when there are none.
pub fn first_match_flags<'a>(tables: impl IntoIterator<Item = &'a Arc<dyn Table>>) -> DictFlags {
    tables
        .into_iter()
        .next()
        .map(|t| t.match_flags())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ProbeTable;
    use pretty_assertions::assert_eq;

    #[test]
    fn owner_is_least_trusted_component() {
        let tables: Vec<Arc<dyn Table>> = vec![
            ProbeTable::not_found("a").with_owner(Owner::Trusted).into_dyn(),
            ProbeTable::not_found("b")
                .with_owner(Owner::Untrusted { uid: 1000 })
                .into_dyn(),
            ProbeTable::not_found("c").with_owner(Owner::Trusted).into_dyn(),
        ];
        assert_eq!(aggregate_owner(&tables), Owner::Untrusted { uid: 1000 });
    }

    #[test]
    fn match_flags_come_from_first_component() {
        let tables: Vec<Arc<dyn Table>> = vec![
            ProbeTable::not_found("a")
                .with_flags(DictFlags::PATTERN)
                .into_dyn(),
            ProbeTable::not_found("b").with_flags(DictFlags::FIXED).into_dyn(),
        ];
        assert_eq!(first_match_flags(&tables), DictFlags::PATTERN);
    }

    #[test]
    fn empty_set_has_no_flags_and_full_trust() {
        let tables: Vec<Arc<dyn Table>> = Vec::new();
        assert_eq!(first_match_flags(&tables), DictFlags::empty());
        assert_eq!(aggregate_owner(&tables), Owner::Trusted);
    }
}

use crate::combinator::{Components, UNION_KIND, aggregate_owner};
use crate::dict::{DictFlags, ErrorCode, LookupResult, OpenMode, Owner, Table};
use crate::error::OpenError;
use crate::registry::{OpenRequest, Registry};

use std::sync::Arc;
use tracing::{trace, warn};

/// Separator between values found by different components.
pub const VALUE_SEPARATOR: &str = ",";

/// `union:{...}`: every component is asked; found values are joined.
#[derive(Debug)]
pub struct UnionTable {
    name: String,
    flags: DictFlags,
    owner: Owner,
    components: Components,
}

impl UnionTable {
    /// Open `union:<locator>` through `registry`.
    ///
    /// The composite is trusted as much as its least trusted component. It
    /// declares no match flags of its own.
    pub fn open(
        registry: &Arc<dyn Registry>,
        locator: &str,
        mode: OpenMode,
        flags: DictFlags,
    ) -> Result<Self, OpenError> {
        let components = Components::open(registry, UNION_KIND, locator, mode, flags)?;
        let owner = aggregate_owner(components.tables());

        Ok(Self {
            name: locator.to_string(),
            flags: flags.difference(DictFlags::MATCH),
            owner,
            components,
        })
    }
}

pub fn open(req: &OpenRequest<'_>) -> Result<Arc<dyn Table>, OpenError> {
    Ok(Arc::new(UnionTable::open(
        req.registry,
        req.name,
        req.mode,
        req.flags,
    )?))
}

impl Table for UnionTable {
    fn kind(&self) -> &str {
        UNION_KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &str) -> LookupResult {
        if self.components.is_released() {
            warn!(table = %self.descriptor(), key, "lookup on a closed table");
            return LookupResult::Error(ErrorCode::CONFIG);
        }

        let mut values = Vec::with_capacity(self.components.len());
        for component in self.components.iter() {
            match component.table.lookup(key) {
                LookupResult::Found(value) => values.push(value),
                LookupResult::NotFound => {}
                LookupResult::Error(code) => {
                    trace!(component = %component.name, key, %code, "union: component failed");
                    return LookupResult::Error(code);
                }
            }
        }

        if values.is_empty() {
            LookupResult::NotFound
        } else {
            LookupResult::Found(values.join(VALUE_SEPARATOR))
        }
    }

    fn close(&self) {
        self.components.release();
    }

    fn owner(&self) -> Owner {
        self.owner
    }

    fn flags(&self) -> DictFlags {
        self.flags
    }

    fn components(&self) -> Vec<Arc<dyn Table>> {
        self.components.tables().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, FakeRegistry, ProbeTable};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::Ordering;

    fn open_union(registry: &Arc<dyn Registry>, locator: &str) -> Result<UnionTable, OpenError> {
        UnionTable::open(registry, locator, OpenMode::ReadOnly, DictFlags::empty())
    }

    #[test]
    fn joins_found_values_in_component_order() {
        let (_fake, registry) = FakeRegistry::new()
            .with_table("probe:a", ProbeTable::found("a", "one").into_dyn())
            .with_table("probe:b", ProbeTable::found("b", "two").into_dyn())
            .with_table("probe:c", ProbeTable::not_found("c").into_dyn())
            .into_arc();

        let table = open_union(&registry, "{probe:a, probe:b, probe:c}").unwrap();
        assert_eq!(table.lookup("key"), LookupResult::Found("one,two".into()));
    }

    #[test]
    fn not_found_components_add_no_separator() {
        let (_fake, registry) = FakeRegistry::new()
            .with_table("probe:a", ProbeTable::not_found("a").into_dyn())
            .with_table("probe:b", ProbeTable::found("b", "two").into_dyn())
            .with_table("probe:c", ProbeTable::not_found("c").into_dyn())
            .with_table("probe:d", ProbeTable::found("d", "four").into_dyn())
            .into_arc();

        let table = open_union(&registry, "{probe:a, probe:b, probe:c, probe:d}").unwrap();
        assert_eq!(table.lookup("key"), LookupResult::Found("two,four".into()));
    }

    #[test]
    fn all_not_found_is_not_found() {
        let (_fake, registry) = FakeRegistry::new()
            .with_table("probe:a", ProbeTable::not_found("a").into_dyn())
            .with_table("probe:b", ProbeTable::not_found("b").into_dyn())
            .into_arc();

        let table = open_union(&registry, "{probe:a, probe:b}").unwrap();
        assert_eq!(table.lookup("key"), LookupResult::NotFound);
    }

    #[test]
    fn any_error_discards_found_values() {
        let c = ProbeTable::found("c", "three");
        let c_probes = c.probes();
        let (_fake, registry) = FakeRegistry::new()
            .with_table("probe:a", ProbeTable::found("a", "one").into_dyn())
            .with_table(
                "probe:b",
                ProbeTable::failing("b", ErrorCode::RETRY).into_dyn(),
            )
            .with_table("probe:c", c.into_dyn())
            .into_arc();

        let table = open_union(&registry, "{probe:a, probe:b, probe:c}").unwrap();
        assert_eq!(table.lookup("key"), LookupResult::Error(ErrorCode::RETRY));
        assert_eq!(c_probes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn first_error_in_probe_order_wins() {
        let (_fake, registry) = FakeRegistry::new()
            .with_table(
                "probe:a",
                ProbeTable::failing("a", ErrorCode::new(7)).into_dyn(),
            )
            .with_table(
                "probe:b",
                ProbeTable::failing("b", ErrorCode::RETRY).into_dyn(),
            )
            .into_arc();

        let table = open_union(&registry, "{probe:a, probe:b}").unwrap();
        assert_eq!(table.lookup("key"), LookupResult::Error(ErrorCode::new(7)));
    }

    #[test]
    fn every_component_is_probed_per_lookup() {
        let a = ProbeTable::found("a", "one");
        let b = ProbeTable::not_found("b");
        let (a_probes, b_probes) = (a.probes(), b.probes());
        let (_fake, registry) = FakeRegistry::new()
            .with_table("probe:a", a.into_dyn())
            .with_table("probe:b", b.into_dyn())
            .into_arc();

        let table = open_union(&registry, "{probe:a, probe:b}").unwrap();
        table.lookup("x");
        table.lookup("y");
        assert_eq!(a_probes.load(Ordering::SeqCst), 2);
        assert_eq!(b_probes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn declares_no_match_flags_but_aggregates_trust() {
        let (_fake, registry) = FakeRegistry::new()
            .with_table(
                "probe:a",
                ProbeTable::not_found("a")
                    .with_flags(DictFlags::PATTERN)
                    .into_dyn(),
            )
            .with_table(
                "probe:b",
                ProbeTable::not_found("b")
                    .with_owner(Owner::Unknown)
                    .into_dyn(),
            )
            .into_arc();

        let table = open_union(&registry, "{probe:a, probe:b}").unwrap();
        assert_eq!(table.match_flags(), DictFlags::empty());
        assert_eq!(table.owner(), Owner::Unknown);
    }

    #[test]
    fn syntax_error_registers_nothing() {
        let (fake, registry) = FakeRegistry::new()
            .with_table("static:one", ProbeTable::found("one", "one").into_dyn())
            .into_arc();

        let err =
            open_union(&registry, "{static:one,static:two,inline{foo=three}}").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("bad syntax:"), "{msg}");
        assert!(msg.contains("inline{foo=three}"), "{msg}");
        assert_eq!(fake.events(), Vec::<Event>::new());
        assert!(fake.registered_names().is_empty());
    }

    #[test]
    fn shares_component_already_registered() {
        let (fake, registry) = FakeRegistry::new()
            .with_table("probe:a", ProbeTable::found("a", "one").into_dyn())
            .into_arc();

        let first = open_union(&registry, "{probe:a}").unwrap();
        let second = open_union(&registry, "{probe:a, probe:a}").unwrap();
        assert_eq!(fake.ref_count("probe:a"), 3);
        assert_eq!(
            fake.events()
                .iter()
                .filter(|e| matches!(e, Event::Open(_)))
                .count(),
            1
        );
        assert_eq!(second.lookup("k"), LookupResult::Found("one,one".into()));

        second.close();
        assert_eq!(fake.ref_count("probe:a"), 1);
        assert_eq!(first.lookup("k"), LookupResult::Found("one".into()));
        first.close();
        assert!(fake.registered_names().is_empty());
    }
}

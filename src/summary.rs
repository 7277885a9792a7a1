//! Printable view of an opened table tree.

use crate::dict::{Owner, Table};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub kind: String,
    pub name: String,
    pub owner: Owner,
    pub match_flags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<TableSummary>,
}

impl TableSummary {
    pub fn from_table(table: &dyn Table) -> Self {
        Self {
            kind: table.kind().to_string(),
            name: table.name().to_string(),
            owner: table.owner(),
            match_flags: table.match_flags().names(),
            components: table
                .components()
                .iter()
                .map(|c| Self::from_table(c.as_ref()))
                .collect(),
        }
    }

    /// One line per table, components indented under their composite.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let flags = if self.match_flags.is_empty() {
            "-".to_string()
        } else {
            self.match_flags.join("|")
        };
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{:indent$}{}:{}  owner={} match={}",
            "",
            self.kind,
            self.name,
            self.owner,
            flags,
            indent = depth * 2
        );
        for component in &self.components {
            component.render_into(out, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::{DictFlags, OpenMode};
    use crate::registry::{Registry, TableRegistry};
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_composite_tree() {
        let registry = TableRegistry::new();
        let table = registry
            .open(
                "or:{static:one, union:{fail:x, inline:{a=1}}}",
                OpenMode::ReadOnly,
                DictFlags::empty(),
            )
            .unwrap();

        let summary = TableSummary::from_table(table.as_ref());
        assert_eq!(
            summary.render_text(),
            "or:{static:one, union:{fail:x, inline:{a=1}}}  owner=trusted match=fixed\n\
             \x20 static:one  owner=trusted match=fixed\n\
             \x20 union:{fail:x, inline:{a=1}}  owner=trusted match=-\n\
             \x20   fail:x  owner=trusted match=pattern\n\
             \x20   inline:{a=1}  owner=trusted match=fixed\n"
        );
        registry.close(table);
    }

    #[test]
    fn serializes_owner_and_flags() {
        let registry = TableRegistry::new();
        let table = registry
            .open("static:one", OpenMode::ReadOnly, DictFlags::empty())
            .unwrap();
        let json = serde_json::to_value(TableSummary::from_table(table.as_ref())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "static",
                "name": "one",
                "owner": { "status": "trusted" },
                "match_flags": ["fixed"],
            })
        );
        registry.close(table);
    }
}

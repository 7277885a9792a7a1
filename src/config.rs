//! dictq configuration (JSON).
//!
//! ```json
//! {
//!   "tables": {
//!     "virtual": "or:{texthash:/etc/mail/virtual, regexp:/etc/mail/virtual.re}",
//!     "aliases": "union:{alias:virtual, static:postmaster}"
//!   },
//!   "fold_case": true,
//!   "debug": false,
//!   "log": "dict_compose=debug"
//! }
//! ```
//!
//! Every field is optional. Tables named here are reachable as
//! `alias:<name>`, and from the command line by bare name.

use crate::dict::DictFlags;
use crate::spec::ComponentDescriptor;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub tables: BTreeMap<String, String>,

    /// Fold fixed-string keys to lower case.
    #[serde(default)]
    pub fold_case: bool,

    /// Log every lookup.
    #[serde(default)]
    pub debug: bool,

    /// Default tracing filter directive.
    #[serde(default)]
    pub log: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("load config {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        use anyhow::bail;

        for (name, spec) in &self.tables {
            if name.is_empty() {
                bail!("table alias name must not be empty");
            }
            if name
                .chars()
                .any(|c| c == ':' || c == '{' || c == '}' || c == '"' || c.is_whitespace())
            {
                bail!("table alias {name:?} contains ':', braces, quotes or whitespace");
            }
            if ComponentDescriptor::parse(spec).is_none() {
                bail!("table alias {name:?}: spec {spec:?} is not of the form type:name");
            }
        }

        if let Some(directive) = &self.log {
            if directive.trim().is_empty() {
                bail!("log directive must not be empty");
            }
        }

        Ok(())
    }

    /// Flags applied to every open.
    pub fn dict_flags(&self) -> DictFlags {
        let mut flags = DictFlags::empty();
        flags.set(DictFlags::FOLD_FIX, self.fold_case);
        flags.set(DictFlags::DEBUG, self.debug);
        flags
    }

    /// Turn a bare alias name into `alias:<name>`; other specs pass through.
    pub fn resolve_spec<'a>(&self, spec: &'a str) -> std::borrow::Cow<'a, str> {
        if !spec.contains(':') && self.tables.contains_key(spec) {
            format!("{}:{spec}", crate::registry::table_registry::ALIAS_KIND).into()
        } else {
            spec.into()
        }
    }
}

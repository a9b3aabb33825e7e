use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};
use toml::{value::Table, Value};

use crate::error::{Error, Result};

/// Name of the configuration file looked up in a documentation root.
pub const CONFIG_FILE: &str = "navtree.toml";
pub const DEFAULT_TREE_VAR: &str = "NAVTREE";
pub const DEFAULT_INDEX_VAR: &str = "NAVTREEINDEX";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Configuration for locating and reading the navigation data.
    pub navtree: NavTreeConfig,

    /// Any remaining configuration for consumers of the navigation tree.
    rest: Value,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let mut buffer = String::new();
        File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?
            .read_to_string(&mut buffer)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Config::from_str(&buffer)
    }

    /// Deserialize a consumer's table from the configuration, if present.
    pub fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.rest
            .get(key)
            .cloned()
            .map(|table| table.try_into())
            .transpose()
            .with_context(|| format!("Failed to deserialize config table `{}`", key))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            navtree: NavTreeConfig::default(),
            rest: Value::Table(Table::default()),
        }
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = Value::deserialize(deserializer)?;
        let Value::Table(mut table) = raw else {
            return Err(D::Error::custom("navtree.toml must always be a toml table"));
        };

        let navtree: NavTreeConfig = table
            .remove("navtree")
            .map(|navtree| navtree.try_into().map_err(D::Error::custom))
            .transpose()?
            .unwrap_or_default();

        let config = Config {
            navtree,
            rest: Value::Table(table),
        };

        Ok(config)
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        toml::from_str(source).with_context(|| "Attempted to parse invalid configuration file")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct NavTreeConfig {
    /// Path of the navigation data script, relative to the documentation root.
    pub source: PathBuf,
    /// Variable holding the navigation tree.
    pub tree_var: String,
    /// Variable holding the entry page keys.
    pub index_var: String,
    /// Fail instead of leaving entries deferred when a subtree script is missing.
    pub strict_subtrees: bool,
}

impl Default for NavTreeConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("navtreedata.js"),
            tree_var: String::from(DEFAULT_TREE_VAR),
            index_var: String::from(DEFAULT_INDEX_VAR),
            strict_subtrees: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_navtree_table_uses_defaults() {
        let config: Config = "".parse().expect("config failed to parse");

        assert_eq!(NavTreeConfig::default(), config.navtree);
    }

    #[test]
    fn reads_navtree_table() {
        let input = r#"
[navtree]
source = "docs/navtreedata.js"
tree-var = "TREE"
strict-subtrees = true
"#;
        let config: Config = input.parse().expect("config failed to parse");
        let expected = NavTreeConfig {
            source: PathBuf::from("docs/navtreedata.js"),
            tree_var: String::from("TREE"),
            index_var: String::from(DEFAULT_INDEX_VAR),
            strict_subtrees: true,
        };

        assert_eq!(expected, config.navtree);
    }

    #[test]
    fn keeps_other_tables_for_consumers() {
        #[derive(Debug, Deserialize, PartialEq, Eq)]
        #[serde(rename_all = "kebab-case")]
        struct Viewer {
            sync_panel: bool,
        }

        let input = r#"
[viewer]
sync-panel = true
"#;
        let config: Config = input.parse().expect("config failed to parse");

        assert_eq!(
            Some(Viewer { sync_panel: true }),
            config.get("viewer").expect("viewer table should deserialize")
        );
        assert_eq!(None, config.get::<Viewer>("missing").expect("missing table is not an error"));
    }

    #[test]
    fn rejects_invalid_toml() {
        assert!("[navtree".parse::<Config>().is_err());
    }
}

//! The navigation store: a validated tree plus the indexes used to answer
//! "where am I" for a page.

use anyhow::{bail, Context};
use std::{
    collections::HashMap,
    fmt::{self, Display},
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, trace, warn};

use crate::{
    config::{Config, NavTreeConfig, CONFIG_FILE, DEFAULT_INDEX_VAR, DEFAULT_TREE_VAR},
    error::{NavError, Result},
    model::{NavNode, NavTree, NavTreeIndex, NodeDecoder, NodePath, PageIndex},
    script::{self, NavScript},
};

/// Variable holding the tooltip shown while the panel follows the current page.
pub const SYNC_ON_VAR: &str = "SYNCONMSG";
/// Variable holding the tooltip shown while the panel does not follow the current page.
pub const SYNC_OFF_VAR: &str = "SYNCOFFMSG";

/// Tooltips for toggling navigation panel synchronisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelSync {
    pub on_message: Option<String>,
    pub off_message: Option<String>,
}

/// Read-only navigation data for the lifetime of a documentation browser.
///
/// The store never changes once built. Subtree resolution consumes the store
/// and hands back a new one, so it can be shared between readers freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavStore {
    tree: NavTree,
    index: NavTreeIndex,
    pages: PageIndex,
    sync: PanelSync,
    tree_var: String,
    index_var: String,
}

impl NavStore {
    /// Parses and validates a navigation data script using the default variable names.
    pub fn load(source: &str) -> Result<Self, NavError> {
        Self::load_with(source, &NavTreeConfig::default())
    }

    pub fn load_with(source: &str, config: &NavTreeConfig) -> Result<Self, NavError> {
        let script: NavScript = source.parse()?;

        let tree = script
            .get(&config.tree_var)
            .ok_or_else(|| NavError::malformed(&config.tree_var, "variable is not defined"))
            .and_then(|value| NavTree::decode(&config.tree_var, value))?;

        let index = match script.get(&config.index_var) {
            Some(value) => NavTreeIndex::decode(&config.index_var, value)?,
            None => NavTreeIndex::default(),
        };

        if !index.is_ordered() {
            warn!(var = %config.index_var, "entry page keys are not ascending, chunk lookups will fail");
        }

        let sync = PanelSync {
            on_message: script.string(SYNC_ON_VAR)?.map(String::from),
            off_message: script.string(SYNC_OFF_VAR)?.map(String::from),
        };

        let mut store = Self::from_parts(tree, index);
        store.sync = sync;
        store.tree_var = config.tree_var.clone();
        store.index_var = config.index_var.clone();

        debug!(
            entries = store.tree.len(),
            pages = store.pages.len(),
            index_keys = store.index.len(),
            deferred = store.tree.deferred_keys().len(),
            "loaded navigation tree"
        );

        Ok(store)
    }

    pub fn from_parts(tree: NavTree, index: NavTreeIndex) -> Self {
        let pages = PageIndex::build(&tree);

        Self {
            tree,
            index,
            pages,
            sync: PanelSync::default(),
            tree_var: String::from(DEFAULT_TREE_VAR),
            index_var: String::from(DEFAULT_INDEX_VAR),
        }
    }

    /// Load the navigation store for the documentation rooted at `root`, using
    /// `navtree.toml` there when it exists.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config_location = root.join(CONFIG_FILE);

        let config = if config_location.exists() {
            Config::load(config_location)?
        } else {
            Config::default()
        };

        Self::open_with_config(root, &config)
    }

    pub fn open_with_config(root: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let config = &config.navtree;
        let source_path = root.as_ref().join(&config.source);
        let source = fs::read_to_string(&source_path)
            .with_context(|| format!("Failed to open {}", source_path.display()))?;

        let store = Self::load_with(&source, config)
            .with_context(|| format!("Failed to load {}", source_path.display()))?;

        let scripts = source_path.parent().unwrap_or_else(|| Path::new("."));

        store.resolve_from(scripts, config.strict_subtrees)
    }

    /// Resolve deferred subtrees from `<key>.js` scripts in `directory`, including
    /// subtrees nested inside loaded ones.
    fn resolve_from(mut self, directory: &Path, strict: bool) -> Result<Self> {
        let mut resolver = SubtreeResolver {
            directory,
            strict,
            cache: HashMap::new(),
        };

        resolver.resolve(self.tree.roots_mut(), &mut Vec::new())?;
        self.pages = PageIndex::build(&self.tree);

        Ok(self)
    }

    /// Attach the children defined by `var <key>` in `source` to every entry
    /// deferring to `key`.
    pub fn with_subtree(mut self, key: &str, source: &str) -> Result<Self, NavError> {
        let children = decode_subtree(key, source)?;
        let grafted = self.tree.graft(key, &children);

        if grafted == 0 {
            warn!(key, "no entry defers to this subtree");
            return Ok(self);
        }

        self.pages = PageIndex::build(&self.tree);
        debug!(key, grafted, entries = children.len(), "resolved subtree");

        Ok(self)
    }

    pub fn tree(&self) -> &NavTree {
        &self.tree
    }

    pub fn index(&self) -> &NavTreeIndex {
        &self.index
    }

    pub fn pages(&self) -> &PageIndex {
        &self.pages
    }

    pub fn sync(&self) -> &PanelSync {
        &self.sync
    }

    /// The breadcrumb from the root sequence to the first entry, in document
    /// order, whose target is exactly `page_ref`.
    pub fn lookup(&self, page_ref: &str) -> Result<Breadcrumb<'_>, NavError> {
        trace!(page_ref, "looking up breadcrumb");

        self.pages
            .first(page_ref)
            .and_then(|path| self.breadcrumb(path))
            .ok_or_else(|| NavError::not_found(page_ref))
    }

    /// Breadcrumbs for every entry targeting `page_ref`.
    pub fn lookup_all(&self, page_ref: &str) -> Vec<Breadcrumb<'_>> {
        self.pages
            .all(page_ref)
            .iter()
            .filter_map(|path| self.breadcrumb(path))
            .collect()
    }

    pub fn children<'a>(&'a self, node: &'a NavNode) -> &'a [NavNode] {
        node.children()
    }

    fn breadcrumb(&self, path: &NodePath) -> Option<Breadcrumb<'_>> {
        let nodes = self.tree.breadcrumb(path)?;

        Some(Breadcrumb {
            path: path.clone(),
            nodes,
        })
    }

    /// Writes the store back out in the generator's script layout.
    pub fn to_script(&self) -> String {
        let mut out = String::new();

        script::write_nodes(&mut out, &self.tree_var, self.tree.roots());
        out.push('\n');
        script::write_index(&mut out, &self.index_var, &self.index);

        if let Some(message) = &self.sync.on_message {
            out.push('\n');
            script::write_message(&mut out, SYNC_ON_VAR, message);
        }

        if let Some(message) = &self.sync.off_message {
            script::write_message(&mut out, SYNC_OFF_VAR, message);
        }

        out
    }
}

/// Decodes the entries a subtree script assigns to `var <key>`.
fn decode_subtree(key: &str, source: &str) -> Result<Vec<NavNode>, NavError> {
    let script: NavScript = source.parse()?;
    let value = script
        .get(key)
        .ok_or_else(|| NavError::malformed(key, "variable is not defined"))?;

    NodeDecoder::new(key).decode_list(value, &NodePath::default(), false)
}

/// Loads subtree scripts on demand, each at most once.
struct SubtreeResolver<'a> {
    directory: &'a Path,
    strict: bool,
    /// Decoded subtrees by key, `None` for scripts that do not exist.
    cache: HashMap<String, Option<Vec<NavNode>>>,
}

impl SubtreeResolver<'_> {
    /// Grafts every resolvable subtree below `nodes`. `chain` holds the keys of
    /// the subtrees `nodes` were grafted from, outermost first.
    fn resolve(&mut self, nodes: &mut [NavNode], chain: &mut Vec<String>) -> Result<()> {
        for node in nodes {
            let Some(key) = node.subtree.clone() else {
                self.resolve(&mut node.children, chain)?;
                continue;
            };

            if chain.contains(&key) {
                let cycle = chain
                    .iter()
                    .skip_while(|outer| **outer != key)
                    .chain(std::iter::once(&key))
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" -> ");

                bail!(NavError::malformed(
                    &key,
                    format_args!("subtree is nested inside itself ({})", cycle)
                ));
            }

            let Some(children) = self.subtree(&key)? else {
                continue;
            };

            debug!(key = %key, entries = children.len(), "resolved subtree");
            node.subtree = None;
            node.children = children;

            chain.push(key);
            self.resolve(&mut node.children, chain)?;
            chain.pop();
        }

        Ok(())
    }

    fn subtree(&mut self, key: &str) -> Result<Option<Vec<NavNode>>> {
        if let Some(cached) = self.cache.get(key) {
            return Ok(cached.clone());
        }

        let path = self.directory.join(format!("{}.js", key));

        let children = if path.exists() {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let children = decode_subtree(key, &source)
                .with_context(|| format!("Failed to load subtree {}", path.display()))?;

            Some(children)
        } else if self.strict {
            bail!("Subtree script {} does not exist", path.display());
        } else {
            warn!(
                key = %key,
                path = %path.display(),
                "subtree script not found, leaving entries deferred"
            );

            None
        };

        self.cache.insert(key.to_owned(), children.clone());

        Ok(children)
    }
}

/// The entries leading from the root sequence down to a page, root first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb<'a> {
    path: NodePath,
    nodes: Vec<&'a NavNode>,
}

impl<'a> Breadcrumb<'a> {
    pub fn nodes(&self) -> &[&'a NavNode] {
        &self.nodes
    }

    /// The entry the breadcrumb was looked up for.
    pub fn leaf(&self) -> &'a NavNode {
        // NOTE: Breadcrumbs are only built from paths that resolved to at least one node.
        self.nodes[self.nodes.len() - 1]
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn labels(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.nodes.iter().map(|node| node.label.as_str())
    }
}

impl Display for Breadcrumb<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, label) in self.labels().enumerate() {
            if position > 0 {
                formatter.write_str(" > ")?;
            }

            formatter.write_str(label)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"
var NAVTREE =
[
  [ "termstyle", "index.html", [
    [ "Features", "index.html#autotoc_md12", null ],
    [ "Usage", "index.html#autotoc_md13", [
      [ "Creating a preset", "index.html#autotoc_md14", [
        [ "Example", "index.html#autotoc_md15", null ]
      ] ]
    ] ],
    [ "Topics", "topics.html", "topics" ],
    [ "Namespaces", "namespaces.html", [
      [ "Namespace List", "namespaces.html", "namespaces_dup" ]
    ] ]
  ] ]
];

var NAVTREEINDEX =
[
"annotated.html"
];

var SYNCONMSG = 'click to disable panel synchronisation';
var SYNCOFFMSG = 'click to enable panel synchronisation';
"#;

    fn store() -> NavStore {
        NavStore::load(SOURCE).expect("store failed to load")
    }

    #[test]
    fn single_entry_lookup_is_a_single_element_path() {
        let store = NavStore::load(r#"var NAVTREE = [ [ "Features", "index.html#autotoc_md12", null ] ];"#)
            .expect("store failed to load");
        let crumb = store.lookup("index.html#autotoc_md12").expect("entry exists");

        assert_eq!(
            vec![&NavNode::new("Features", "index.html#autotoc_md12")],
            crumb.nodes()
        );
        assert!(store.children(crumb.leaf()).is_empty());
    }

    #[test]
    fn lookup_returns_the_root_to_node_path() {
        let store = store();
        let crumb = store.lookup("index.html#autotoc_md15").expect("entry exists");

        assert_eq!(
            vec!["termstyle", "Usage", "Creating a preset", "Example"],
            crumb.labels().collect::<Vec<_>>()
        );
        assert_eq!(&NodePath::from(vec![0, 1, 0, 0]), crumb.path());
        assert_eq!("termstyle > Usage > Creating a preset > Example", crumb.to_string());
    }

    #[test]
    fn lookup_misses_are_not_found() {
        let error = store().lookup("does-not-exist.html").unwrap_err();

        assert_eq!(NavError::not_found("does-not-exist.html"), error);
        assert!(error.is_not_found());
    }

    #[test]
    fn lookup_matches_exactly() {
        let store = store();

        assert!(store.lookup("index.html#autotoc_md1").is_err());
        assert!(store.lookup("INDEX.HTML").is_err());
    }

    #[test]
    fn repeated_targets_resolve_to_the_first_entry() {
        let store = store();
        let crumb = store.lookup("namespaces.html").expect("entry exists");

        assert_eq!("Namespaces", crumb.leaf().label);
        assert_eq!(2, store.lookup_all("namespaces.html").len());
    }

    #[test]
    fn reads_index_and_sync_messages() {
        let store = store();

        assert_eq!(&[String::from("annotated.html")], store.index().keys());
        assert_eq!(
            Some("click to disable panel synchronisation"),
            store.sync().on_message.as_deref()
        );
        assert_eq!(
            Some("click to enable panel synchronisation"),
            store.sync().off_message.as_deref()
        );
    }

    #[test]
    fn missing_tree_variable_is_malformed() {
        let error = NavStore::load(r#"var NAVTREEINDEX = ["a.html"];"#).unwrap_err();

        assert_eq!(
            NavError::malformed("NAVTREE", "variable is not defined"),
            error
        );
    }

    #[test]
    fn missing_index_variable_is_an_empty_index() {
        let store = NavStore::load(r#"var NAVTREE = [];"#).expect("store failed to load");

        assert!(store.index().is_empty());
        assert!(store.tree().is_empty());
    }

    #[test]
    fn unordered_index_still_loads_the_tree() {
        let store = NavStore::load(
            r#"
var NAVTREE = [ [ "termstyle", "index.html", null ] ];
var NAVTREEINDEX = [ "files.html", "annotated.html" ];
"#,
        )
        .expect("store failed to load");

        assert_eq!("termstyle", store.lookup("index.html").expect("index.html").to_string());
        assert!(!store.index().is_ordered());
        assert!(store.index().chunk_for("index.html").is_err());
    }

    #[test]
    fn honours_configured_variable_names() {
        let config = NavTreeConfig {
            tree_var: String::from("TREE"),
            ..NavTreeConfig::default()
        };
        let store = NavStore::load_with(r#"var TREE = [["A", "a.html"]];"#, &config)
            .expect("store failed to load");

        assert!(store.to_script().starts_with("var TREE =\n"));
    }

    #[test]
    fn resolves_subtrees() {
        let store = store()
            .with_subtree(
                "topics",
                r#"var topics = [ [ "Errors", "group___error.html", null ] ];"#,
            )
            .expect("subtree failed to load");
        let crumb = store.lookup("group___error.html").expect("entry exists");

        assert_eq!("termstyle > Topics > Errors", crumb.to_string());
        assert_eq!(vec!["namespaces_dup"], store.tree().deferred_keys());
    }

    #[test]
    fn rejects_empty_subtrees() {
        let result = store().with_subtree("topics", "var topics = [];");

        assert!(result.is_err());
    }

    #[test]
    fn unused_subtrees_leave_the_store_unchanged() {
        let store = store();
        let unchanged = store
            .clone()
            .with_subtree("files", r#"var files = [ [ "a.hpp", "a_8hpp.html", null ] ];"#)
            .expect("subtree failed to load");

        assert_eq!(store, unchanged);
    }

    #[test]
    fn scripts_round_trip() {
        let store = store();
        let reloaded = NavStore::load(&store.to_script()).expect("script failed to reload");

        assert_eq!(store, reloaded);
    }

    #[test]
    fn stores_can_be_shared_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<NavStore>();
    }
}

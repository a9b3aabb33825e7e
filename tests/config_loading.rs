use navtree::Config;
use navtree_tests::test_dir;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::path::PathBuf;

#[test]
fn it_loads_the_navtree_section() {
    let config = Config::load(test_dir().join("navtree.toml")).expect("failed to load config");

    assert_eq!(PathBuf::from("docs/navtreedata.js"), config.navtree.source);
    assert_eq!("NAVTREE", config.navtree.tree_var);
    assert!(!config.navtree.strict_subtrees);
}

#[test]
fn it_loads_custom_configuration() {
    #[derive(Debug, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "kebab-case")]
    struct Viewer {
        sync_panel: bool,
        start_page: String,
    }

    let config = Config::load(test_dir().join("navtree.toml")).expect("failed to load config");
    let expected = Viewer {
        sync_panel: true,
        start_page: String::from("index.html"),
    };

    let actual = config
        .get("viewer")
        .expect("should be deserializable")
        .expect("viewer section should exist");

    assert_eq!(expected, actual);
}

#[test]
fn it_reports_missing_config_files() {
    let error = Config::load(test_dir().join("missing.toml")).unwrap_err();

    assert!(error.to_string().contains("missing.toml"));
}

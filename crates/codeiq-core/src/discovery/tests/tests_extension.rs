//! Tests for extension filtering

use std::path::Path;

use rstest::rstest;

use crate::discovery::{is_excluded, ExtensionFilter};

#[rstest]
#[case(vec!["*"])]
#[case(vec![])]
#[case(vec![".py", "*"])]
fn test_wildcard_and_empty_select_everything(#[case] list: Vec<&str>) {
    let filter = ExtensionFilter::from_list(list);
    assert!(filter.is_any());
    assert!(filter.matches(Path::new("Makefile")));
    assert!(filter.matches(Path::new("src/app.rs")));
}

#[rstest]
#[case("a.py", true)]
#[case("pkg/mod.PY", true)]
#[case("a.pyc", false)]
#[case("a.js", false)]
#[case("py", false)]
fn test_only_filter_matches_extension(#[case] path: &str, #[case] expected: bool) {
    let filter = ExtensionFilter::from_list([".py"]);
    assert_eq!(filter.matches(Path::new(path)), expected);
}

#[test]
fn test_leading_dot_is_optional() {
    let with_dot = ExtensionFilter::from_list([".py", ".JS"]);
    let without_dot = ExtensionFilter::from_list(["py", "js"]);
    assert_eq!(with_dot, without_dot);
}

#[test]
fn test_display() {
    assert_eq!(ExtensionFilter::Any.to_string(), "*");
    assert_eq!(ExtensionFilter::from_list(["py", "js"]).to_string(), ".js, .py");
}

#[rstest]
#[case("node_modules/lib/index.js", true)]
#[case("src/.git/config", true)]
#[case("src/builder.py", false)]
#[case("build/out.py", true)]
fn test_is_excluded_matches_whole_components(#[case] path: &str, #[case] expected: bool) {
    let patterns = vec![
        "node_modules".to_string(),
        ".git".to_string(),
        "build".to_string(),
    ];
    assert_eq!(is_excluded(Path::new(path), &patterns), expected);
}

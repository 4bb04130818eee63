use std::fs;
use std::path::PathBuf;

use node::{ChildEntry, Node, Scope};

use crate::{
    ChildFilter, CustomFilter, ExtendedGlobFilter, Filter, FilterDef, FilterError, FilterKind,
    FilterOptions, GlobFilter, RegexFilter, compile,
};

fn file_node(name: &str) -> (tempfile::TempDir, Node) {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join(name);
    fs::write(&path, b"data").expect("write");
    let metadata = fs::symlink_metadata(&path).expect("metadata");
    let node = Node::new(&path, temp.path(), metadata, 1);
    (temp, node)
}

fn folder_node(name: &str) -> (tempfile::TempDir, Node) {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join(name);
    fs::create_dir(&path).expect("create dir");
    let metadata = fs::symlink_metadata(&path).expect("metadata");
    let node = Node::new(&path, temp.path(), metadata, 1);
    (temp, node)
}

#[test]
fn glob_matches_base_name_case_insensitively() {
    let (_temp, node) = file_node("Report.TXT");
    let filter = GlobFilter::new("report.*", FilterOptions::new("report.*")).expect("compile");
    assert!(filter.is_match(&node));
    assert!(filter.evaluate(&node));
}

#[test]
fn glob_rejects_invalid_pattern_at_construction() {
    let error = GlobFilter::new("[", FilterOptions::new("[")).unwrap_err();
    assert!(matches!(error, FilterError::Glob { pattern, .. } if pattern == "["));
}

#[test]
fn extended_glob_honours_extension_allow_list() {
    let options = || FilterOptions::new("cover.*|jpg,jpeg");
    let filter = ExtendedGlobFilter::new("cover.*|jpg,jpeg", options()).expect("compile");

    let (_t1, front) = file_node("cover.front.jpg");
    let (_t2, plain) = file_node("cover.jpg");
    let (_t3, text) = file_node("cover.txt");

    assert!(filter.is_match(&front));
    assert!(filter.is_match(&plain));
    assert!(!filter.is_match(&text));
}

#[test]
fn extended_glob_any_extension_bypasses_suffix_check() {
    let filter = ExtendedGlobFilter::new("*|jpg", FilterOptions::new("*|jpg"))
        .expect("compile")
        .with_any_extension(true);

    let (_t1, text) = file_node("anything.txt");
    let (_t2, bare) = file_node("anything");
    assert!(filter.is_match(&text));
    assert!(filter.is_match(&bare));
}

#[test]
fn extended_glob_without_extensions_matches_bare_names_only() {
    let filter = ExtendedGlobFilter::new("readme|", FilterOptions::new("readme|")).expect("compile");

    let (_t1, bare) = file_node("README");
    let (_t2, text) = file_node("readme.md");
    assert!(filter.is_match(&bare));
    assert!(!filter.is_match(&text));
}

#[test]
fn extended_glob_exclusion_vetoes_matching_base() {
    let filter = ExtendedGlobFilter::new("cover.*|jpg", FilterOptions::new("cover.*|jpg"))
        .expect("compile")
        .with_exclusion("cover.back.*")
        .expect("exclusion");

    let (_t1, front) = file_node("cover.front.jpg");
    let (_t2, back) = file_node("cover.back.jpg");
    assert!(filter.is_match(&front));
    assert!(!filter.is_match(&back));
}

#[test]
fn extended_glob_requires_separator() {
    let error = ExtendedGlobFilter::new("cover.*", FilterOptions::new("cover.*")).unwrap_err();
    assert!(matches!(error, FilterError::Extended { .. }));
}

#[test]
fn regex_matches_base_name() {
    let filter =
        RegexFilter::new(r"^\d{4}-report$", FilterOptions::new(r"^\d{4}-report$")).expect("compile");
    let (_t1, hit) = file_node("2024-report");
    let (_t2, miss) = file_node("draft-report");
    assert!(filter.is_match(&hit));
    assert!(!filter.is_match(&miss));
}

#[test]
fn non_applicable_node_returns_default_without_negation() {
    // Folder-scoped filter evaluated against a file: not applicable, so the
    // configured default wins and negate must not flip it.
    let options = FilterOptions::new("*.log")
        .with_scope(Scope::FOLDER)
        .with_negate(true)
        .with_if_not_applicable(true);
    let filter = GlobFilter::new("*.log", options).expect("compile");

    let (_temp, file) = file_node("trace.log");
    assert!(!filter.is_applicable(&file));
    assert!(filter.evaluate(&file));
}

#[test]
fn negate_inverts_applicable_matches() {
    let options = FilterOptions::new("*.log").with_negate(true);
    let filter = GlobFilter::new("*.log", options).expect("compile");

    let (_t1, log) = file_node("trace.log");
    let (_t2, text) = file_node("notes.txt");
    assert!(!filter.evaluate(&log));
    assert!(filter.evaluate(&text));
}

#[test]
fn custom_filter_runs_caller_predicate() {
    let filter = CustomFilter::new(
        Box::new(|node: &Node| node.depth() > 2),
        FilterOptions::new("depth>2"),
    );
    let (_temp, shallow) = file_node("a.txt");
    assert!(!filter.is_match(&shallow));
}

#[test]
fn child_filter_rewrites_list_and_counts_discards() {
    let filter = ChildFilter::glob("*.flac", false).expect("compile");
    let children = vec![
        ChildEntry::new(PathBuf::from("/tree/album/01.flac")),
        ChildEntry::new(PathBuf::from("/tree/album/01.mp3")),
        ChildEntry::new(PathBuf::from("/tree/album/02.flac")),
    ];

    let (kept, discarded) = filter.apply(children);
    assert_eq!(discarded, 1);
    assert_eq!(
        kept.iter().map(ChildEntry::name).collect::<Vec<_>>(),
        vec!["01.flac", "02.flac"]
    );
}

#[test]
fn poly_filter_dispatches_by_node_kind() {
    let def = FilterDef::new(FilterKind::Poly, "poly").with_poly(
        FilterDef::new(FilterKind::Glob, "*.txt").with_scope(Scope::FILE),
        FilterDef::new(FilterKind::Glob, "music*").with_scope(Scope::FOLDER),
    );
    let filter = compile(&def).expect("compile");

    let (_t1, text) = file_node("notes.txt");
    let (_t2, image) = file_node("photo.jpg");
    let (_t3, music) = folder_node("music-archive");
    let (_t4, other) = folder_node("videos");

    assert!(filter.evaluate(&text));
    assert!(!filter.evaluate(&image));
    assert!(filter.evaluate(&music));
    assert!(!filter.evaluate(&other));
}

#[test]
fn compile_rejects_bare_custom_definition() {
    let def = FilterDef::new(FilterKind::Custom, "caller-predicate");
    let error = compile(&def).unwrap_err();
    assert!(matches!(error, FilterError::CustomUnresolved { .. }));
}

#[test]
fn filter_def_serializes_with_wire_field_names() {
    let def = FilterDef::new(FilterKind::ExtendedGlob, "cover.*|jpg")
        .with_scope(Scope::FILE)
        .with_negate(true);
    let json = serde_json::to_value(&def).expect("serialize");

    assert_eq!(json["filter-type"], "extended-glob");
    assert_eq!(json["pattern"], "cover.*|jpg");
    assert_eq!(json["filter-scope"], "file");
    assert_eq!(json["negate"], true);
    assert_eq!(json["if-not-applicable"], true);
    assert!(json.get("Poly").is_none());
}

#[test]
fn filter_def_round_trips_through_json() {
    let def = FilterDef::new(FilterKind::Poly, "poly").with_poly(
        FilterDef::new(FilterKind::Glob, "*.txt").with_scope(Scope::FILE),
        FilterDef::new(FilterKind::Regex, "^a").with_scope(Scope::FOLDER),
    );
    let text = serde_json::to_string(&def).expect("serialize");
    let back: FilterDef = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back, def);
}

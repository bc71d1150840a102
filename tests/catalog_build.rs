//! End-to-end catalog construction over a real directory tree.

use modcat::config::CatalogConfig;
use modcat::error::{BuildError, CatalogError, QueryError};
use modcat::service::CatalogService;
use std::fs;
use std::path::Path;

const MANIFEST: &str = r#"{
    "hof": {"title": "Higher-Order Functions", "category": "javascript", "path": "js/call_function/HOF.md", "order": 1},
    "arrays": {"title": "Arrays", "category": "javascript", "path": "js/arrays/Arrays.md", "order": 2},
    "hooks": {"title": "React Hooks", "category": "react", "path": "react/react-hooks/Hooks.markdown", "order": 1}
}"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn corpus(root: &Path) {
    write(root, "module.json", MANIFEST);
    write(root, "js/call_function/HOF.md", "# Higher-Order Functions");
    write(root, "js/call_function/examples.md", "# Worked Examples");
    write(root, "js/arrays/Arrays.md", "# Arrays");
    write(root, "react/react-hooks/Hooks.markdown", "# Hooks");
    // Root shell files that belong to no module
    write(root, "README.md", "# Learning corpus");
    write(root, "index.html", "<html></html>");
}

#[test]
fn full_corpus_builds_and_serves() {
    let temp = tempfile::tempdir().unwrap();
    corpus(temp.path());

    let service = CatalogService::open(&CatalogConfig::new(temp.path()));
    service.reload().unwrap();

    let groups = service.list_all().unwrap();
    let listing: Vec<(String, Vec<String>)> = groups
        .iter()
        .map(|g| {
            (
                g.category.clone(),
                g.modules.iter().map(|e| e.module.id.clone()).collect(),
            )
        })
        .collect();
    assert_eq!(
        listing,
        vec![
            (
                "javascript".to_string(),
                vec!["hof".to_string(), "arrays".to_string()]
            ),
            ("react".to_string(), vec!["hooks".to_string()]),
        ]
    );

    let hof = service.get_by_id("hof").unwrap();
    assert_eq!(hof.module.title, "Higher-Order Functions");
    assert_eq!(hof.documents.len(), 2); // primary + worked examples

    assert_eq!(
        service.get_by_id("missing").err().unwrap(),
        QueryError::NotFound("missing".to_string())
    );
}

#[test]
fn document_metadata_comes_from_disk() {
    let temp = tempfile::tempdir().unwrap();
    corpus(temp.path());

    let service = CatalogService::open(&CatalogConfig::new(temp.path()));
    service.reload().unwrap();

    let arrays = service.get_by_id("arrays").unwrap();
    assert_eq!(arrays.documents.len(), 1);
    assert_eq!(arrays.documents[0].size_bytes, "# Arrays".len() as u64);
    assert_eq!(arrays.documents[0].module_id, "arrays");
}

#[test]
fn dangling_paths_fail_with_the_exact_offender_set() {
    let temp = tempfile::tempdir().unwrap();
    corpus(temp.path());
    fs::remove_file(temp.path().join("js/arrays/Arrays.md")).unwrap();
    fs::remove_file(temp.path().join("react/react-hooks/Hooks.markdown")).unwrap();

    let service = CatalogService::open(&CatalogConfig::new(temp.path()));
    let err = service.reload().err().unwrap();
    match err {
        BuildError::Catalog(CatalogError::DanglingReference { module_ids }) => {
            assert_eq!(
                module_ids,
                vec!["arrays".to_string(), "hooks".to_string()]
            );
        }
        other => panic!("expected DanglingReference, got {other:?}"),
    }
    // Nothing was published
    assert_eq!(service.list_all().err().unwrap(), QueryError::NotInitialized);
}

#[test]
fn missing_manifest_fails_the_build() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "js/a/A.md", "# A");

    let service = CatalogService::open(&CatalogConfig::new(temp.path()));
    let err = service.reload().err().unwrap();
    assert!(matches!(err, BuildError::Store(_)));
}

#[test]
fn configured_category_order_is_honored() {
    let temp = tempfile::tempdir().unwrap();
    corpus(temp.path());

    let mut config = CatalogConfig::new(temp.path());
    config.category_order = Some(vec!["react".to_string(), "javascript".to_string()]);

    let service = CatalogService::open(&config);
    service.reload().unwrap();

    let categories: Vec<String> = service
        .list_all()
        .unwrap()
        .iter()
        .map(|g| g.category.clone())
        .collect();
    assert_eq!(categories, vec!["react".to_string(), "javascript".to_string()]);
}

#[test]
fn rebuild_after_edits_replaces_the_snapshot_wholesale() {
    let temp = tempfile::tempdir().unwrap();
    corpus(temp.path());

    let service = CatalogService::open(&CatalogConfig::new(temp.path()));
    let before = service.reload().unwrap();

    write(
        temp.path(),
        "module.json",
        r#"{"hof": {"title": "Higher-Order Functions", "category": "javascript", "path": "js/call_function/HOF.md", "order": 1}}"#,
    );
    let after = service.reload().unwrap();

    assert_eq!(before.module_count(), 3);
    assert_eq!(after.module_count(), 1);
    // The earlier handle still reads the old snapshot
    assert!(before.get("hooks").is_some());
    assert!(after.get("hooks").is_none());
}

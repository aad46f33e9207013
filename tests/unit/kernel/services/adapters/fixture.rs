use super::*;
use crate::models::{CellValue, RowUpdate, SourceKey};

const PAGES: &str = r#"[
  {"headers": [{"name": "id"}, {"name": "name", "label": "Name"}],
   "rows": [{"id": 1, "name": "a"}, {"id": 2, "name": null}]},
  {"headers": [{"name": "id"}, {"name": "name"}],
   "rows": [{"id": 3, "name": "c"}]}
]"#;

#[test]
fn test_page_source_serves_pages_with_total() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.json");
    std::fs::write(&path, PAGES).unwrap();

    let source = JsonPageSource::from_path(&path).unwrap();
    assert_eq!(source.page_count(), 2);

    let first = source.fetch(1).unwrap();
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.rows.len(), 2);
    assert_eq!(first.headers[1].text(), "Name");
    assert_eq!(first.rows[1].get("name"), Some(&CellValue::Null));

    assert!(source.fetch(0).is_err());
    assert!(source.fetch(3).is_err());
}

#[test]
fn test_page_source_reports_bad_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.json");
    std::fs::write(&path, "{not json").unwrap();
    let err = JsonPageSource::from_path(&path).unwrap_err();
    assert!(err.message.contains("pages.json"));
}

#[test]
fn test_change_log_appends() {
    let dir = tempfile::tempdir().unwrap();
    let log = JsonChangeLog::new(dir.path().join("nested").join("changes.json"));
    assert!(log.entries().unwrap().is_empty());

    let mut first = ChangeSet::default();
    first.deletes.push(SourceKey::Position(1));
    let mut second = ChangeSet::default();
    second.updates.push(RowUpdate {
        key: SourceKey::Position(0),
        fields: [("name".to_string(), CellValue::from("x"))].into_iter().collect(),
    });

    log.submit(&first).unwrap();
    log.submit(&second).unwrap();
    assert_eq!(log.entries().unwrap(), vec![first, second]);
}

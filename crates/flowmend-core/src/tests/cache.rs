use crate::*;
use std::sync::Arc;

#[test]
fn cache_reuses_the_index_for_identical_text() {
    let mut cache = IndexCache::new();
    let first = cache.get("graph TD\n    A --> B");
    let second = cache.get("graph TD\n    A --> B");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });

    let third = cache.get("graph TD\n    A --> C");
    assert!(!Arc::ptr_eq(&first, &third));
    assert!(third.node("C").is_some());
    assert_eq!(cache.stats().misses, 2);

    cache.invalidate();
    let fourth = cache.get("graph TD\n    A --> C");
    assert!(!Arc::ptr_eq(&third, &fourth));
    assert_eq!(cache.stats().misses, 3);
}

#[test]
fn editor_applies_edits_in_sequence() {
    let mut editor = Editor::new("graph TD\n    A[Start]");
    let created = editor
        .apply(&EditOp::InsertNode {
            shape: ShapeKind::Diamond,
            text: Some("Check".into()),
            connect_from: Some("A".into()),
        })
        .unwrap()
        .created_id
        .unwrap();
    assert_eq!(created, "diamondCheck");

    editor
        .apply(&EditOp::AddComment {
            node_id: created.clone(),
            text: "decision".into(),
        })
        .unwrap();
    assert_eq!(
        editor.text(),
        "graph TD\n    A[Start]\n    A --> diamondCheck{Check}\n    %% @note diamondCheck: decision"
    );
    assert_eq!(
        editor.index().node("diamondCheck").and_then(|n| n.comment.clone()),
        Some("decision".to_string())
    );
}

#[test]
fn editor_keeps_text_when_an_edit_fails() {
    let mut editor = Editor::new("graph TD\n    A --> B");
    let err = editor
        .apply(&EditOp::RenameNodeId {
            old_id: "A".into(),
            new_id: "B".into(),
        })
        .unwrap_err();
    assert_eq!(err, EditError::DuplicateId { id: "B".into() });
    assert_eq!(editor.text(), "graph TD\n    A --> B");
}

#[test]
fn editor_format_reports_changes() {
    let mut editor = Editor::new("graph TD\nA --> B");
    assert!(editor.format());
    assert_eq!(editor.text(), "graph TD\n  A --> B");
    assert!(!editor.format());
}

#[test]
fn editor_uses_its_config() {
    let config = EditorConfig::from_json_str(r#"{"format": {"indent": 3}, "ids": {"counterStart": 7}}"#)
        .unwrap();
    let mut editor = Editor::with_config("graph TD\nA", config);
    assert_eq!(editor.id_generator().generate(ShapeKind::Stadium, None), "stadium7");
    editor.format();
    assert_eq!(editor.text(), "graph TD\n   A");
}

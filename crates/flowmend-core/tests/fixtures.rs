use flowmend_core::pattern::synthesize_content;
use flowmend_core::{EdgeStyle, ShapeKind, format, index};
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .join("fixtures")
        .join("flowchart")
}

fn fixtures() -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "mmd"))
        .map(|path| {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            let text = fs::read_to_string(&path).expect("read fixture");
            (name, text)
        })
        .collect();
    out.sort();
    assert!(!out.is_empty(), "no fixtures found");
    out
}

fn fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).expect("read fixture")
}

#[test]
fn fixtures_index_without_diagnostics() {
    for (name, text) in fixtures() {
        let idx = index(&text);
        assert!(idx.diagnostics.is_empty(), "{name}: {:?}", idx.diagnostics);
        assert!(!idx.nodes.is_empty(), "{name}: no nodes");
    }
}

#[test]
fn every_node_definition_is_regenerated_verbatim() {
    for (name, text) in fixtures() {
        let idx = index(&text);
        for occ in idx.occurrences() {
            let written = &text[occ.span.clone()];
            let regenerated = format!("{}{}", occ.id, synthesize_content(occ.kind, &occ.content));
            assert_eq!(regenerated, written, "{name}");
        }
    }
}

#[test]
fn formatting_fixtures_is_idempotent_and_keeps_the_graph() {
    for (name, text) in fixtures() {
        let once = format(&text);
        assert_eq!(format(&once), once, "{name}");

        let before = index(&text);
        let after = index(&once);
        assert_eq!(
            before.nodes.keys().collect::<Vec<_>>(),
            after.nodes.keys().collect::<Vec<_>>(),
            "{name}"
        );
        assert_eq!(
            before.edges.keys().collect::<Vec<_>>(),
            after.edges.keys().collect::<Vec<_>>(),
            "{name}"
        );
    }
}

#[test]
fn shapes_fixture_covers_every_kind() {
    let idx = index(&fixture("shapes.mmd"));
    for kind in ShapeKind::ALL {
        assert!(
            idx.nodes.values().any(|n| n.shape_kind == kind),
            "no {kind} node"
        );
    }
    assert_eq!(idx.node("q").map(|n| n.display_text.as_str()), Some("Quoted (parens)"));
    assert_eq!(idx.node("pic").map(|n| n.display_text.as_str()), Some("Logo"));
}

#[test]
fn edges_fixture_covers_every_style() {
    let idx = index(&fixture("edges.mmd"));
    for style in EdgeStyle::ALL {
        if style == EdgeStyle::Open {
            assert!(idx.edge("A-C-0").is_some_and(|e| e.style_kind == style));
            continue;
        }
        assert!(
            idx.edges.values().any(|e| e.style_kind == style),
            "no {style:?} edge"
        );
    }
    assert_eq!(idx.edge("A-B-1").and_then(|e| e.label.as_deref()), Some("label"));
    assert_eq!(idx.edge("A-C-1").and_then(|e| e.label.as_deref()), Some("words"));
    assert_eq!(idx.edge("A-B-2").map(|e| e.line_number), Some(13));
    assert_eq!(idx.edge("B-C-0").map(|e| e.link_index), Some(13));
}

#[test]
fn subgraphs_fixture_keeps_front_matter_and_annotations() {
    let text = fixture("subgraphs.mmd");
    let idx = index(&text);
    assert!(idx.is_id_used("checkout"));
    assert!(idx.is_id_used("fulfil"));
    assert_eq!(
        idx.node("pay").and_then(|n| n.comment.as_deref()),
        Some("card or invoice")
    );
    assert!(format(&text).starts_with("---\ntitle: Order flow\n---\n%%{init:"));
}

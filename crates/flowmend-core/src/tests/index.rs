use crate::*;

#[test]
fn double_circle_display_text_has_no_stray_paren() {
    let idx = index("K(((Double Circle Text)))");
    let k = idx.node("K").unwrap();
    assert_eq!(k.shape_kind, ShapeKind::DoubleCircle);
    assert_eq!(k.display_text, "Double Circle Text");
    assert!(idx.diagnostics.is_empty());
}

#[test]
fn empty_content_falls_back_to_the_id() {
    let idx = index("rectNewRectangle[]");
    let node = idx.node("rectNewRectangle").unwrap();
    assert_eq!(node.display_text, "rectNewRectangle");
    assert_eq!(node.shape_kind, ShapeKind::Rectangle);
}

#[test]
fn dash_labeled_edge_is_indexed_once() {
    let idx = index("A -- dispatch --> B");
    assert_eq!(idx.edges.len(), 1);
    let edge = idx.edge("A-B-0").unwrap();
    assert_eq!(edge.label.as_deref(), Some("dispatch"));
    assert_eq!(edge.source_id, "A");
    assert_eq!(edge.target_id, "B");
    assert_eq!(edge.style_kind, EdgeStyle::Solid);
}

#[test]
fn pipe_label_wins_over_plain() {
    let idx = index("graph TD\n    A -->|yes| B\n    A -.->|\"no way\"| C");
    assert_eq!(idx.edge("A-B-0").and_then(|e| e.label.as_deref()), Some("yes"));
    let c = idx.edge("A-C-0").unwrap();
    assert_eq!(c.label.as_deref(), Some("no way"));
    assert_eq!(c.style_kind, EdgeStyle::Dotted);
}

#[test]
fn labels_are_never_read_as_nodes() {
    let idx = index("graph TD\n    A -->|B[not a node]| C\n    C -- D(nope) --> E");
    let ids: Vec<&str> = idx.nodes.keys().map(String::as_str).collect();
    assert_eq!(ids, ["A", "C", "E"]);
}

#[test]
fn self_loops_are_representable() {
    let idx = index("A --> A");
    let edge = idx.edge("A-A-0").unwrap();
    assert_eq!(edge.source_id, edge.target_id);
    assert_eq!(edge.style_kind, EdgeStyle::SelfLoop);

    let idx = index("A <--> A");
    assert_eq!(idx.edge("A-A-0").map(|e| e.style_kind), Some(EdgeStyle::SelfDouble));
}

#[test]
fn ordinals_count_per_pair_and_link_index_counts_all() {
    let idx = index("graph TD\n    A --> B\n    B --> C\n    A ==> B");
    let first = idx.edge("A-B-0").unwrap();
    let second = idx.edge("A-B-1").unwrap();
    assert_eq!((first.ordinal, first.link_index), (0, 0));
    assert_eq!((second.ordinal, second.link_index), (1, 2));
    assert_eq!(second.style_kind, EdgeStyle::Thick);
    assert_eq!(idx.edge("B-C-0").map(|e| e.link_index), Some(1));
}

#[test]
fn chains_yield_one_edge_per_connector() {
    let idx = index("graph LR\n    A[Start] --> B{Check} -.-> C((End))");
    let ids: Vec<&str> = idx.edges.keys().map(String::as_str).collect();
    assert_eq!(ids, ["A-B-0", "B-C-0"]);
    let second = idx.edge("B-C-0").unwrap();
    assert_eq!(second.source_def(), "B{Check}");
    assert_eq!(second.target_def(), "C((End))");
    assert_eq!(second.connector_text(), " -.-> ");
    assert_eq!(idx.node("C").map(|n| n.shape_kind), Some(ShapeKind::Circle));
}

#[test]
fn endpoint_shapes_define_nodes_and_bare_ids_are_implicit() {
    let idx = index("graph TD\n    A --> B{Check}\n    B --> A");
    let a = idx.node("A").unwrap();
    assert!(a.implicit);
    assert_eq!(a.display_text, "A");
    assert_eq!(a.source_line, 1);

    let b = idx.node("B").unwrap();
    assert!(!b.implicit);
    assert_eq!(b.shape_kind, ShapeKind::Diamond);
    assert_eq!(b.display_text, "Check");
    assert_eq!(idx.edges_from("B").count(), 1);
    assert_eq!(idx.edges_to("B").count(), 1);
}

#[test]
fn first_shaped_occurrence_defines_the_node() {
    let idx = index("graph TD\n    A --> B\n    B(Round)\n    B[Square]");
    let b = idx.node("B").unwrap();
    assert_eq!(b.shape_kind, ShapeKind::Rounded);
    assert_eq!(b.source_line, 2);
    assert_eq!(idx.occurrences().len(), 2);
    assert_eq!(idx.nodes.get_index_of("B"), Some(1));
}

#[test]
fn statement_keywords_and_comments_are_skipped() {
    let text = "graph TD\n    %% A[commented]\n    A[x]\n    style A fill:#f9f\n    classDef hot fill:#f00\n    class A hot\n    click A callback\n    linkStyle default stroke:#333";
    let idx = index(text);
    let ids: Vec<&str> = idx.nodes.keys().map(String::as_str).collect();
    assert_eq!(ids, ["A"]);
    assert_eq!(idx.line_kind(1), Some(LineKind::Comment));
    assert_eq!(idx.line_kind(3), Some(LineKind::Style));
    assert!(idx.diagnostics.is_empty());
}

#[test]
fn subgraph_ids_count_as_used() {
    let idx = index("graph TD\n    subgraph one [Group]\n        A\n    end");
    assert!(idx.is_id_used("one"));
    assert!(idx.node("one").is_none());
    assert!(idx.node("A").is_some_and(|a| a.implicit));
}

#[test]
fn multi_line_labels_are_indexed() {
    let idx = index("graph TD\n    A[\"first\nsecond\"] --> B");
    let a = idx.node("A").unwrap();
    assert_eq!(a.display_text, "first\nsecond");
    assert_eq!(a.source_line, 1);
}

#[test]
fn front_matter_is_not_scanned() {
    let idx = index("---\ntitle: A[b]\n---\nflowchart LR\n    X --> Y");
    let ids: Vec<&str> = idx.nodes.keys().map(String::as_str).collect();
    assert_eq!(ids, ["X", "Y"]);
}

#[test]
fn unparseable_shapes_and_connectors_become_diagnostics() {
    let idx = index("graph TD\n    A(((broken --> B");
    let kinds: Vec<DiagnosticKind> = idx.diagnostics.iter().map(|d| d.kind).collect();
    assert!(kinds.contains(&DiagnosticKind::NodeParseMiss));
    assert!(kinds.contains(&DiagnosticKind::EdgeParseMiss));
    assert!(idx.diagnostics.iter().all(|d| d.line == 1));
    assert!(idx.edges.is_empty());
}

#[test]
fn annotations_attach_to_nodes() {
    let idx = index("graph TD\n    A[Start]\n    %% @note A: first step\n    %% plain comment");
    assert_eq!(idx.node("A").and_then(|a| a.comment.as_deref()), Some("first step"));
    assert_eq!(idx.annotations.get("A").map(|a| a.line), Some(2));
    assert_eq!(idx.line_kind(3), Some(LineKind::Comment));
}

#[test]
fn index_serializes_in_camel_case() {
    let idx = index("graph TD\n    A --> B");
    let json = serde_json::to_value(&idx).unwrap();
    assert_eq!(json["edges"]["A-B-0"]["styleKind"], "solid");
    assert_eq!(json["edges"]["A-B-0"]["sourceId"], "A");
    assert_eq!(json["nodes"]["A"]["shapeKind"], "rectangle");
    assert!(json.get("occurrences").is_none());
}

#[test]
fn semicolons_separate_statements_on_one_line() {
    let idx = index("graph TD\n    A --> B; B --> C\n");
    assert!(idx.diagnostics.is_empty());
    let ids: Vec<&str> = idx.edges.keys().map(String::as_str).collect();
    assert_eq!(ids, ["A-B-0", "B-C-0"]);

    let second = idx.edge("B-C-0").unwrap();
    assert_eq!((second.line_number, second.link_index), (1, 1));
    assert_eq!(second.source_def(), "B");
    assert_eq!(second.connector_text(), " --> ");
    assert_eq!(second.target_def(), "C");
}

#[test]
fn statements_after_a_header_on_the_same_line_are_indexed() {
    let idx = index("graph TD; A-->B; B-->C");
    assert_eq!(idx.line_kind(0), Some(LineKind::Header));
    assert!(idx.diagnostics.is_empty());
    let nodes: Vec<&str> = idx.nodes.keys().map(String::as_str).collect();
    assert_eq!(nodes, ["A", "B", "C"]);
    let edges: Vec<&str> = idx.edges.keys().map(String::as_str).collect();
    assert_eq!(edges, ["A-B-0", "B-C-0"]);
}

#[test]
fn shaped_definitions_after_a_semicolon_are_indexed() {
    let idx = index("graph TD\n    A[x]; B(y)");
    assert_eq!(idx.node("A").map(|n| n.shape_kind), Some(ShapeKind::Rectangle));
    let b = idx.node("B").unwrap();
    assert_eq!(b.shape_kind, ShapeKind::Rounded);
    assert_eq!(b.display_text, "y");
    assert_eq!(b.source_line, 1);
}

#[test]
fn semicolons_inside_labels_stay_in_the_statement() {
    let idx = index("graph TD\n    A[\"a;b\"] -->|x;y| B");
    assert!(idx.diagnostics.is_empty());
    assert_eq!(idx.node("A").map(|a| a.display_text.as_str()), Some("a;b"));
    assert_eq!(idx.edge("A-B-0").and_then(|e| e.label.as_deref()), Some("x;y"));
}

#[test]
fn unclosed_unquoted_label_does_not_swallow_later_lines() {
    let idx = index("graph TD\n    A[oops --> B\n    C[fine] --> D[ok]\n");
    assert!(idx.node("A").is_none());
    assert!(idx
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::NodeParseMiss && d.line == 1));

    let c = idx.node("C").unwrap();
    assert_eq!(c.shape_kind, ShapeKind::Rectangle);
    assert_eq!(c.display_text, "fine");
    assert_eq!(c.source_line, 2);
    assert_eq!(idx.node("D").map(|d| d.display_text.as_str()), Some("ok"));
    assert!(idx.edge("C-D-0").is_some());
}

use crate::*;
use std::collections::HashSet;

#[test]
fn counters_skip_ids_already_in_the_document() {
    let idx = index("graph TD\n    rect1 --> rect2\n    rect4[Taken]");
    let mut ids = IdGenerator::new(&idx);
    assert!(ids.is_taken("rect4"));
    assert_eq!(ids.generate(ShapeKind::Rectangle, None), "rect3");
    assert_eq!(ids.generate(ShapeKind::Rectangle, None), "rect5");
    assert_eq!(ids.generate(ShapeKind::Rectangle, None), "rect6");
    assert_eq!(ids.generate(ShapeKind::Diamond, None), "diamond1");
}

#[test]
fn repeated_calls_never_collide() {
    let idx = index("graph TD\n    circleSame((Same))");
    let mut ids = IdGenerator::new(&idx);
    let generated: HashSet<String> = (0..50)
        .map(|_| ids.generate(ShapeKind::Circle, Some("same")))
        .collect();
    assert_eq!(generated.len(), 50);
    assert!(!generated.contains("circleSame"));
    assert!(generated.contains("circleSame2"));
}

#[test]
fn seeded_ids_camel_case_the_label() {
    let idx = index("graph TD\n    A");
    let mut ids = IdGenerator::new(&idx);
    assert_eq!(
        ids.generate(ShapeKind::Rectangle, Some("user login flow, step two")),
        "rectUserLoginFlow"
    );
    assert_eq!(
        ids.generate(ShapeKind::Rectangle, Some("User Login Flow")),
        "rectUserLoginFlow2"
    );
    // No usable words: fall back to the counter.
    assert_eq!(ids.generate(ShapeKind::Hexagon, Some("🚀 !!")), "hexagon1");
}

#[test]
fn decorated_shapes_use_their_own_prefix() {
    let idx = index("graph TD\n    A");
    let mut ids = IdGenerator::new(&idx);
    assert_eq!(ids.generate(ShapeKind::Image, Some("Logo")), "ImageLogo");
    assert_eq!(ids.generate(ShapeKind::Button, None), "Button1");
    assert_eq!(ids.generate(ShapeKind::Text, None), "Text1");
}

#[test]
fn subgraph_ids_are_reserved() {
    let idx = index("graph TD\n    subgraph rect1 [Group]\n        A\n    end");
    let mut ids = IdGenerator::new(&idx);
    assert_eq!(ids.generate(ShapeKind::Rectangle, None), "rect2");
}

#[test]
fn options_control_counter_and_slug_length() {
    let idx = index("graph TD\n    A");
    let options = IdOptions {
        slug_words: 1,
        counter_start: 0,
    };
    let mut ids = IdGenerator::with_options(&idx, options);
    assert_eq!(ids.generate(ShapeKind::Rectangle, None), "rect0");
    assert_eq!(
        ids.generate(ShapeKind::Rounded, Some("first second")),
        "roundedFirst"
    );
}

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::str::FromStr;
use std::sync::OnceLock;

/// Node shapes the editor can read and emit.
///
/// `Text`, `Image` and `Button` are decorated kinds: they reuse the delimiters of a base shape
/// and carry an icon glyph in front of their label (see [`Icon`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Rectangle,
    Rounded,
    Diamond,
    Circle,
    DoubleCircle,
    Stadium,
    Subroutine,
    Cylindrical,
    Hexagon,
    Parallelogram,
    ParallelogramAlt,
    Trapezoid,
    TrapezoidAlt,
    Label,
    Text,
    Image,
    Button,
}

/// Base shapes in match precedence order.
///
/// Whenever one opening delimiter is a prefix of another, the longer one must come first,
/// otherwise `K(((x)))` reads as a circle labelled `(x` and `{{x}}` as a diamond labelled `{x`.
pub const SHAPE_PRECEDENCE: [ShapeKind; 14] = [
    ShapeKind::DoubleCircle,
    ShapeKind::Circle,
    ShapeKind::Stadium,
    ShapeKind::Rounded,
    ShapeKind::Cylindrical,
    ShapeKind::Subroutine,
    ShapeKind::Parallelogram,
    ShapeKind::Trapezoid,
    ShapeKind::ParallelogramAlt,
    ShapeKind::TrapezoidAlt,
    ShapeKind::Rectangle,
    ShapeKind::Hexagon,
    ShapeKind::Diamond,
    ShapeKind::Label,
];

impl ShapeKind {
    pub const ALL: [ShapeKind; 17] = [
        ShapeKind::Rectangle,
        ShapeKind::Rounded,
        ShapeKind::Diamond,
        ShapeKind::Circle,
        ShapeKind::DoubleCircle,
        ShapeKind::Stadium,
        ShapeKind::Subroutine,
        ShapeKind::Cylindrical,
        ShapeKind::Hexagon,
        ShapeKind::Parallelogram,
        ShapeKind::ParallelogramAlt,
        ShapeKind::Trapezoid,
        ShapeKind::TrapezoidAlt,
        ShapeKind::Label,
        ShapeKind::Text,
        ShapeKind::Image,
        ShapeKind::Button,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Rounded => "rounded",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Circle => "circle",
            ShapeKind::DoubleCircle => "doubleCircle",
            ShapeKind::Stadium => "stadium",
            ShapeKind::Subroutine => "subroutine",
            ShapeKind::Cylindrical => "cylindrical",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Parallelogram => "parallelogram",
            ShapeKind::ParallelogramAlt => "parallelogramAlt",
            ShapeKind::Trapezoid => "trapezoid",
            ShapeKind::TrapezoidAlt => "trapezoidAlt",
            ShapeKind::Label => "label",
            ShapeKind::Text => "text",
            ShapeKind::Image => "image",
            ShapeKind::Button => "button",
        }
    }

    /// The shape whose delimiters this kind is drawn with.
    pub fn base(self) -> ShapeKind {
        match self {
            ShapeKind::Text | ShapeKind::Image => ShapeKind::Rectangle,
            ShapeKind::Button => ShapeKind::Rounded,
            other => other,
        }
    }

    pub fn icon(self) -> Option<Icon> {
        match self {
            ShapeKind::Text => Some(Icon::Text),
            ShapeKind::Image => Some(Icon::Image),
            ShapeKind::Button => Some(Icon::Button),
            _ => None,
        }
    }

    pub fn delimiters(self) -> (&'static str, &'static str) {
        match self.base() {
            ShapeKind::Rectangle => ("[", "]"),
            ShapeKind::Rounded => ("(", ")"),
            ShapeKind::Diamond => ("{", "}"),
            ShapeKind::Circle => ("((", "))"),
            ShapeKind::DoubleCircle => ("(((", ")))"),
            ShapeKind::Stadium => ("([", "])"),
            ShapeKind::Subroutine => ("[[", "]]"),
            ShapeKind::Cylindrical => ("[(", ")]"),
            ShapeKind::Hexagon => ("{{", "}}"),
            ShapeKind::Parallelogram => ("[/", "/]"),
            ShapeKind::ParallelogramAlt => ("[\\", "\\]"),
            ShapeKind::Trapezoid => ("[/", "\\]"),
            ShapeKind::TrapezoidAlt => ("[\\", "/]"),
            ShapeKind::Label => (">", "]"),
            ShapeKind::Text | ShapeKind::Image | ShapeKind::Button => unreachable!("base shape"),
        }
    }

    /// Prefix used when generating ids for new nodes of this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rect",
            ShapeKind::Rounded => "rounded",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Circle => "circle",
            ShapeKind::DoubleCircle => "doubleCircle",
            ShapeKind::Stadium => "stadium",
            ShapeKind::Subroutine => "subroutine",
            ShapeKind::Cylindrical => "cylinder",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Parallelogram | ShapeKind::ParallelogramAlt => "parallelogram",
            ShapeKind::Trapezoid | ShapeKind::TrapezoidAlt => "trapezoid",
            ShapeKind::Label => "label",
            ShapeKind::Text => "Text",
            ShapeKind::Image => "Image",
            ShapeKind::Button => "Button",
        }
    }

    fn decorated(base: ShapeKind, icon: Icon) -> Option<ShapeKind> {
        match (base, icon) {
            (ShapeKind::Rectangle, Icon::Text) => Some(ShapeKind::Text),
            (ShapeKind::Rectangle, Icon::Image) => Some(ShapeKind::Image),
            (ShapeKind::Rounded, Icon::Button) => Some(ShapeKind::Button),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown node shape: {0}")]
pub struct UnknownShape(pub String);

impl FromStr for ShapeKind {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let kind = match key.as_str() {
            "rectangle" | "rect" | "square" => ShapeKind::Rectangle,
            "rounded" | "round" => ShapeKind::Rounded,
            "diamond" | "rhombus" | "decision" => ShapeKind::Diamond,
            "circle" => ShapeKind::Circle,
            "doublecircle" => ShapeKind::DoubleCircle,
            "stadium" => ShapeKind::Stadium,
            "subroutine" => ShapeKind::Subroutine,
            "cylindrical" | "cylinder" | "database" => ShapeKind::Cylindrical,
            "hexagon" | "hex" => ShapeKind::Hexagon,
            "parallelogram" => ShapeKind::Parallelogram,
            "parallelogramalt" => ShapeKind::ParallelogramAlt,
            "trapezoid" => ShapeKind::Trapezoid,
            "trapezoidalt" => ShapeKind::TrapezoidAlt,
            "label" | "asymmetric" => ShapeKind::Label,
            "text" => ShapeKind::Text,
            "image" => ShapeKind::Image,
            "button" => ShapeKind::Button,
            _ => return Err(UnknownShape(s.to_string())),
        };
        Ok(kind)
    }
}

/// Icon glyphs marking the decorated node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Icon {
    Text,
    Image,
    Button,
}

impl Icon {
    pub const ALL: [Icon; 3] = [Icon::Text, Icon::Image, Icon::Button];

    pub fn glyph(self) -> &'static str {
        match self {
            Icon::Text => "📝",
            Icon::Image => "🖼️",
            Icon::Button => "🔘",
        }
    }

    /// Splits a leading icon glyph (and the single space after it) off `text`.
    ///
    /// The image glyph is also accepted without its variation selector.
    pub fn strip(text: &str) -> Option<(Icon, usize)> {
        for icon in Icon::ALL {
            let glyph = icon.glyph();
            let bare = glyph.trim_end_matches('\u{fe0f}');
            let consumed = if text.starts_with(glyph) {
                glyph.len()
            } else if text.starts_with(bare) {
                bare.len()
            } else {
                continue;
            };
            let rest = &text[consumed..];
            let consumed = consumed + if rest.starts_with(' ') { 1 } else { 0 };
            return Some((icon, consumed));
        }
        None
    }
}

/// Label content of a node: optional icon, the text, and whether it was written quoted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeContent {
    pub icon: Option<Icon>,
    pub text: String,
    pub quoted: bool,
}

impl NodeContent {
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let quoted = needs_quotes(&text);
        Self {
            icon: None,
            text,
            quoted,
        }
    }

    /// The exact text between the shape delimiters.
    pub fn render(&self) -> String {
        let mut inner = String::new();
        if let Some(icon) = self.icon {
            inner.push_str(icon.glyph());
            if !self.text.is_empty() {
                inner.push(' ');
            }
        }
        if self.quoted {
            inner.push_str(&self.text.replace('"', "#quot;"));
            format!("\"{inner}\"")
        } else {
            inner.push_str(&self.text);
            inner
        }
    }
}

/// Whether `text` has to be quoted to survive inside any shape delimiters.
pub fn needs_quotes(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, '[' | ']' | '(' | ')' | '{' | '}' | '|' | '"'))
}

/// Emits the delimiters of `kind` around `content`, forcing the icon the kind requires.
pub fn synthesize_content(kind: ShapeKind, content: &NodeContent) -> String {
    let (open, close) = kind.delimiters();
    let content = NodeContent {
        icon: kind.icon(),
        text: content.text.clone(),
        quoted: content.quoted || needs_quotes(&content.text),
    };
    format!("{open}{}{close}", content.render())
}

/// Emits the canonical form of a `kind` shape holding `text` (without the node id).
pub fn synthesize(kind: ShapeKind, text: &str) -> String {
    synthesize_content(kind, &NodeContent::plain(text))
}

/// A node definition recognised at the start of a candidate string.
///
/// All ranges are relative to the candidate passed to [`match_node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMatch {
    pub kind: ShapeKind,
    pub id: Range<usize>,
    pub span: Range<usize>,
    /// Everything between the delimiters, quotes and icon included.
    pub inner: Range<usize>,
    /// Just the label text: quotes and icon excluded.
    pub text: Range<usize>,
    pub content: NodeContent,
}

impl ShapeMatch {
    pub fn shifted(mut self, offset: usize) -> Self {
        for range in [&mut self.id, &mut self.span, &mut self.inner, &mut self.text] {
            range.start += offset;
            range.end += offset;
        }
        self
    }
}

struct CompiledShape {
    kind: ShapeKind,
    re: Regex,
}

/// Unquoted label characters: anything up to the closing delimiter, on one line.
fn text_class(close: &str) -> String {
    let last = close.chars().last().unwrap_or(']');
    format!(r"[^{}\n]", regex::escape(&last.to_string()))
}

fn compiled_shapes() -> &'static [CompiledShape] {
    static SHAPES: OnceLock<Vec<CompiledShape>> = OnceLock::new();
    SHAPES.get_or_init(|| {
        SHAPE_PRECEDENCE
            .iter()
            .map(|&kind| {
                let (open, close) = kind.delimiters();
                let pattern = format!(
                    r#"^(?P<id>\w+){open}(?:"(?P<quoted>[^"]*)"|(?P<text>{class}*?)){close}"#,
                    open = regex::escape(open),
                    close = regex::escape(close),
                    class = text_class(close),
                );
                CompiledShape {
                    kind,
                    re: Regex::new(&pattern).expect("shape pattern compiles"),
                }
            })
            .collect()
    })
}

/// Regex fragment matching a node reference: an id optionally followed by one shape
/// definition (tried in [`SHAPE_PRECEDENCE`] order) and a `:::class` suffix.
pub fn node_ref_fragment() -> &'static str {
    static FRAGMENT: OnceLock<String> = OnceLock::new();
    FRAGMENT.get_or_init(|| {
        let alternatives: Vec<String> = SHAPE_PRECEDENCE
            .iter()
            .map(|&kind| {
                let (open, close) = kind.delimiters();
                format!(
                    r#"{open}(?:"[^"]*"|{class}*?){close}"#,
                    open = regex::escape(open),
                    close = regex::escape(close),
                    class = text_class(close),
                )
            })
            .collect();
        format!(r"\w+(?:{})?(?::::\w+)?", alternatives.join("|"))
    })
}

/// Recognises a node definition (`id` + shape) at the start of `candidate`.
pub fn match_node(candidate: &str) -> Option<ShapeMatch> {
    for shape in compiled_shapes() {
        let Some(caps) = shape.re.captures(candidate) else {
            continue;
        };
        let id = caps.name("id")?;
        let span = caps.get(0)?;
        let (open, close) = shape.kind.delimiters();
        let inner = id.end() + open.len()..span.end() - close.len();

        let (quoted, raw) = match (caps.name("quoted"), caps.name("text")) {
            (Some(m), _) => (true, m),
            (None, Some(m)) => (false, m),
            (None, None) => continue,
        };

        let mut kind = shape.kind;
        let mut icon = None;
        let mut text = raw.range();
        if let Some((found, consumed)) = Icon::strip(raw.as_str()) {
            if let Some(decorated) = ShapeKind::decorated(shape.kind, found) {
                kind = decorated;
                icon = Some(found);
                text.start += consumed;
            }
        }

        let content = NodeContent {
            icon,
            text: candidate[text.clone()].replace("#quot;", "\""),
            quoted,
        };
        return Some(ShapeMatch {
            kind,
            id: id.range(),
            span: span.range(),
            inner,
            text,
            content,
        });
    }
    None
}

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Connection styles the editor can read and emit.
///
/// `SelfLoop` and `SelfDouble` describe edges whose source and target are the same node;
/// they are written with the solid and bidirectional operators respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeStyle {
    Solid,
    Open,
    Dotted,
    Thick,
    Bidirectional,
    DashedBidirectional,
    ThickBidirectional,
    Invisible,
    SelfLoop,
    SelfDouble,
}

impl EdgeStyle {
    pub const ALL: [EdgeStyle; 10] = [
        EdgeStyle::Solid,
        EdgeStyle::Open,
        EdgeStyle::Dotted,
        EdgeStyle::Thick,
        EdgeStyle::Bidirectional,
        EdgeStyle::DashedBidirectional,
        EdgeStyle::ThickBidirectional,
        EdgeStyle::Invisible,
        EdgeStyle::SelfLoop,
        EdgeStyle::SelfDouble,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeStyle::Solid => "solid",
            EdgeStyle::Open => "open",
            EdgeStyle::Dotted => "dotted",
            EdgeStyle::Thick => "thick",
            EdgeStyle::Bidirectional => "bidirectional",
            EdgeStyle::DashedBidirectional => "dashedBidirectional",
            EdgeStyle::ThickBidirectional => "thickBidirectional",
            EdgeStyle::Invisible => "invisible",
            EdgeStyle::SelfLoop => "selfLoop",
            EdgeStyle::SelfDouble => "selfDouble",
        }
    }

    /// Canonical operator written for this style.
    pub fn operator(self) -> &'static str {
        match self {
            EdgeStyle::Solid | EdgeStyle::SelfLoop => "-->",
            EdgeStyle::Open => "---",
            EdgeStyle::Dotted => "-.->",
            EdgeStyle::Thick => "==>",
            EdgeStyle::Bidirectional | EdgeStyle::SelfDouble => "<-->",
            EdgeStyle::DashedBidirectional => "<-.->",
            EdgeStyle::ThickBidirectional => "<==>",
            EdgeStyle::Invisible => "~~~",
        }
    }

    pub fn is_self(self) -> bool {
        matches!(self, EdgeStyle::SelfLoop | EdgeStyle::SelfDouble)
    }

    pub fn is_invisible(self) -> bool {
        self == EdgeStyle::Invisible
    }
}

impl std::fmt::Display for EdgeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown connection style: {0}")]
pub struct UnknownEdgeStyle(pub String);

impl FromStr for EdgeStyle {
    type Err = UnknownEdgeStyle;

    /// Accepts style names (`dotted`, `SELF_DOUBLE`, `thick-bidirectional`, ...) as well as
    /// operators (`-.->`, `~~~`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(connector) = Connector::parse(trimmed) {
            return Ok(connector.style(false));
        }
        let key: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let style = match key.as_str() {
            "solid" | "arrow" => EdgeStyle::Solid,
            "open" | "line" => EdgeStyle::Open,
            "dotted" | "dashed" => EdgeStyle::Dotted,
            "thick" => EdgeStyle::Thick,
            "bidirectional" => EdgeStyle::Bidirectional,
            "dashedbidirectional" | "dottedbidirectional" => EdgeStyle::DashedBidirectional,
            "thickbidirectional" => EdgeStyle::ThickBidirectional,
            "invisible" | "hidden" => EdgeStyle::Invisible,
            "selfloop" | "self" => EdgeStyle::SelfLoop,
            "selfdouble" => EdgeStyle::SelfDouble,
            _ => return Err(UnknownEdgeStyle(s.to_string())),
        };
        Ok(style)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Normal,
    Dotted,
    Thick,
    Invisible,
}

/// A decoded link operator such as `-->`, `<-.->` or `~~~`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub stroke: Stroke,
    /// Ends in an arrowhead, cross or circle.
    pub head: bool,
    /// Starts with `<`.
    pub tail: bool,
}

impl Connector {
    /// Decodes an operator token. Labelled forms are decoded from their opening and closing
    /// halves concatenated (`--` + `-->`).
    pub fn parse(op: &str) -> Option<Connector> {
        let op = op.trim();
        if op.len() < 2 {
            return None;
        }
        if op.len() >= 3 && op.chars().all(|c| c == '~') {
            return Some(Connector {
                stroke: Stroke::Invisible,
                head: false,
                tail: false,
            });
        }

        let (tail, rest) = match op.strip_prefix('<') {
            Some(rest) => (true, rest),
            None => (false, op),
        };
        let (head, body) = match rest.as_bytes().last().copied() {
            Some(b'>' | b'x' | b'o') => (true, &rest[..rest.len() - 1]),
            _ => (false, rest),
        };
        if body.len() < 2 || !body.chars().all(|c| matches!(c, '-' | '.' | '=')) {
            return None;
        }

        let mut stroke = Stroke::Normal;
        if body.contains('=') {
            stroke = Stroke::Thick;
        }
        if body.contains('.') {
            stroke = Stroke::Dotted;
        }
        Some(Connector { stroke, head, tail })
    }

    pub fn style(self, is_self: bool) -> EdgeStyle {
        let bidirectional = self.tail && self.head;
        match self.stroke {
            Stroke::Invisible => EdgeStyle::Invisible,
            _ if is_self && bidirectional => EdgeStyle::SelfDouble,
            _ if is_self => EdgeStyle::SelfLoop,
            Stroke::Normal if bidirectional => EdgeStyle::Bidirectional,
            Stroke::Dotted if bidirectional => EdgeStyle::DashedBidirectional,
            Stroke::Thick if bidirectional => EdgeStyle::ThickBidirectional,
            Stroke::Dotted => EdgeStyle::Dotted,
            Stroke::Thick => EdgeStyle::Thick,
            Stroke::Normal if self.head => EdgeStyle::Solid,
            Stroke::Normal => EdgeStyle::Open,
        }
    }
}

//! Node-targeting statements (`style`, `class`, `click`) and positional `linkStyle` lines.

use crate::lines::LineKind;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

struct StatementRegexes {
    style: Regex,
    class: Regex,
    click: Regex,
    link_style: Regex,
    word: Regex,
}

fn regexes() -> &'static StatementRegexes {
    static RES: OnceLock<StatementRegexes> = OnceLock::new();
    RES.get_or_init(|| StatementRegexes {
        style: Regex::new(r"^\s*style\s+(?P<id>\w+)").expect("valid regex"),
        class: Regex::new(r"^\s*class\s+(?P<ids>\w+(?:\s*,\s*\w+)*)\s+\w+")
            .expect("valid regex"),
        click: Regex::new(r"^\s*click\s+(?P<id>\w+)").expect("valid regex"),
        link_style: Regex::new(
            r"^(?P<indent>\s*)linkStyle\s+(?P<targets>default|\d+(?:\s*,\s*\d+)*)\s*(?P<rest>.*?)\s*;?\s*$",
        )
        .expect("valid regex"),
        word: Regex::new(r"\w+").expect("valid regex"),
    })
}

/// Byte ranges (within `line`) of the node ids a `style`, `class` or `click` line targets.
pub(crate) fn target_ranges(line: &str, kind: LineKind) -> Vec<Range<usize>> {
    let res = regexes();
    match kind {
        LineKind::Style | LineKind::Click => {
            let re = if kind == LineKind::Style {
                &res.style
            } else {
                &res.click
            };
            re.captures(line)
                .and_then(|c| c.name("id"))
                .map(|m| vec![m.range()])
                .unwrap_or_default()
        }
        LineKind::Class => {
            let Some(ids) = res.class.captures(line).and_then(|c| c.name("ids")) else {
                return Vec::new();
            };
            res.word
                .find_iter(ids.as_str())
                .map(|m| ids.start() + m.start()..ids.start() + m.end())
                .collect()
        }
        _ => Vec::new(),
    }
}

pub(crate) fn targets(line: &str, kind: LineKind, id: &str) -> bool {
    target_ranges(line, kind).into_iter().any(|r| &line[r] == id)
}

/// Rewrites a `class a,b,c name` line without `id`; `None` when no target is left.
pub(crate) fn class_line_without(line: &str, id: &str) -> Option<String> {
    let ranges = target_ranges(line, LineKind::Class);
    let (Some(first), Some(last)) = (ranges.first(), ranges.last()) else {
        return Some(line.to_string());
    };
    let kept: Vec<&str> = ranges
        .iter()
        .map(|r| &line[r.clone()])
        .filter(|t| *t != id)
        .collect();
    if kept.is_empty() {
        return None;
    }
    Some(format!(
        "{}{}{}",
        &line[..first.start],
        kept.join(","),
        &line[last.end..]
    ))
}

/// A parsed `linkStyle` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkStyleLine {
    pub indent: String,
    /// `None` for `linkStyle default`.
    pub targets: Option<Vec<usize>>,
    pub style: String,
}

impl LinkStyleLine {
    pub(crate) fn parse(line: &str) -> Option<Self> {
        let caps = regexes().link_style.captures(line)?;
        let raw_targets = caps.name("targets")?.as_str();
        let targets = if raw_targets == "default" {
            None
        } else {
            Some(
                raw_targets
                    .split(',')
                    .filter_map(|t| t.trim().parse().ok())
                    .collect(),
            )
        };
        Some(Self {
            indent: caps.name("indent")?.as_str().to_string(),
            targets,
            style: caps.name("rest")?.as_str().to_string(),
        })
    }

    pub(crate) fn targets_index(&self, link_index: usize) -> bool {
        self.targets
            .as_ref()
            .is_some_and(|t| t.contains(&link_index))
    }

    pub(crate) fn render(&self) -> String {
        let targets = match &self.targets {
            None => "default".to_string(),
            Some(t) => t
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(","),
        };
        format!("{}linkStyle {} {}", self.indent, targets, self.style)
    }

    /// This line with `link_index` dropped from its targets; `None` when none are left.
    pub(crate) fn without(&self, link_index: usize) -> Option<Self> {
        let targets: Vec<usize> = self
            .targets
            .as_ref()?
            .iter()
            .copied()
            .filter(|&t| t != link_index)
            .collect();
        if targets.is_empty() {
            return None;
        }
        Some(Self {
            targets: Some(targets),
            ..self.clone()
        })
    }
}

/// Normalizes a user supplied style string: trimmed, without a trailing `;`.
pub(crate) fn clean_style(style: &str) -> &str {
    style.trim().trim_end_matches(';').trim_end()
}

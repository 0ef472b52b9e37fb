use crate::lines::{LineKind, leading_whitespace};
use std::collections::BTreeMap;
use std::ops::Range;

const DEFAULT_INDENT: &str = "    ";

/// Line-oriented edit buffer over one version of a document.
///
/// Edits address lines by their number in the original text and are resolved together in
/// [`TextBuffer::finish`], so earlier removals or insertions never shift later targets.
#[derive(Debug)]
pub(crate) struct TextBuffer {
    lines: Vec<String>,
    newline: &'static str,
    trailing_newline: bool,
    replaced: BTreeMap<usize, Vec<String>>,
    inserted_after: BTreeMap<usize, Vec<String>>,
    appended: Vec<String>,
}

impl TextBuffer {
    pub(crate) fn new(text: &str) -> Self {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = if text.is_empty() {
            Vec::new()
        } else {
            body.split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
                .collect()
        };
        Self {
            lines,
            newline,
            trailing_newline,
            replaced: BTreeMap::new(),
            inserted_after: BTreeMap::new(),
            appended: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lines.len()
    }

    pub(crate) fn line(&self, line: usize) -> &str {
        &self.lines[line]
    }

    pub(crate) fn replace(&mut self, line: usize, text: String) {
        self.replaced.insert(line, vec![text]);
    }

    /// Replaces one line with any number of lines; an empty list removes it.
    pub(crate) fn replace_with(&mut self, line: usize, lines: Vec<String>) {
        self.replaced.insert(line, lines);
    }

    pub(crate) fn remove(&mut self, line: usize) {
        self.replaced.insert(line, Vec::new());
    }

    pub(crate) fn remove_range(&mut self, lines: Range<usize>) {
        for line in lines {
            self.remove(line);
        }
    }

    pub(crate) fn insert_after(&mut self, line: usize, text: String) {
        self.inserted_after.entry(line).or_default().push(text);
    }

    /// Adds a line after the last non-blank line of the document.
    pub(crate) fn push(&mut self, text: String) {
        self.appended.push(text);
    }

    /// Indentation of the first node or edge statement, falling back to four spaces when the
    /// document has a header but no statement yet.
    pub(crate) fn statement_indent(&self, kinds: &[LineKind]) -> String {
        let first = kinds
            .iter()
            .position(|k| k.is_statement())
            .map(|i| leading_whitespace(&self.lines[i]).to_string());
        match first {
            Some(indent) => indent,
            None if kinds.contains(&LineKind::Header) => DEFAULT_INDENT.to_string(),
            None => String::new(),
        }
    }

    pub(crate) fn finish(self) -> String {
        let last_content = self.lines.iter().rposition(|l| !l.trim().is_empty());
        let mut out: Vec<String> = Vec::with_capacity(self.lines.len() + self.appended.len());
        let mut appended = Some(self.appended);

        if last_content.is_none() {
            if let Some(lines) = appended.take() {
                out.extend(lines);
            }
        }
        for (i, line) in self.lines.into_iter().enumerate() {
            match self.replaced.get(&i) {
                Some(replacement) => out.extend(replacement.iter().cloned()),
                None => out.push(line),
            }
            if let Some(extra) = self.inserted_after.get(&i) {
                out.extend(extra.iter().cloned());
            }
            if Some(i) == last_content {
                if let Some(lines) = appended.take() {
                    out.extend(lines);
                }
            }
        }

        let mut text = out.join(self.newline);
        if self.trailing_newline && !text.is_empty() {
            text.push_str(self.newline);
        }
        text
    }
}

/// Applies byte-range replacements to `text`. Ranges must not overlap.
pub(crate) fn splice(text: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
    let mut out = text.to_string();
    for (range, replacement) in edits {
        out.replace_range(range, &replacement);
    }
    out
}

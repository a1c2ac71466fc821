//! Line/column ranges over resolved code and selections built from them.

use regex::Regex;

use crate::animation::lerp::{Lerp, step};

/// A (line, column) position. `usize::MAX` stands for "end of line" / "last line".
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CodePoint {
    pub line: usize,
    pub column: usize,
}

impl CodePoint {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open range: the start is included, the end is not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CodeRange {
    pub start: CodePoint,
    pub end: CodePoint,
}

impl CodeRange {
    pub const fn new(start: CodePoint, end: CodePoint) -> Self {
        Self { start, end }
    }

    pub const fn point_to_point(
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
    ) -> Self {
        Self::new(
            CodePoint::new(start_line, start_column),
            CodePoint::new(end_line, end_column),
        )
    }

    pub fn contains(&self, point: CodePoint) -> bool {
        is_point_in_code_range(point, self)
    }
}

/// Whole lines `from..=to`.
pub const fn lines(from: usize, to: usize) -> CodeRange {
    CodeRange::point_to_point(from, 0, to, usize::MAX)
}

/// `length` characters of `line` starting at `column`; `None` runs to the end of the line.
pub fn word(line: usize, column: usize, length: Option<usize>) -> CodeRange {
    let end = length.map_or(usize::MAX, |len| column.saturating_add(len));
    CodeRange::point_to_point(line, column, line, end)
}

pub fn is_point_in_code_range(point: CodePoint, range: &CodeRange) -> bool {
    let CodePoint { line, column } = point;
    let after_start =
        (line == range.start.line && column >= range.start.column) || line > range.start.line;
    let before_end = (line == range.end.line && column < range.end.column) || line < range.end.line;
    after_start && before_end
}

/// Pattern accepted by the range finders.
#[derive(Clone, Debug)]
pub enum CodePattern {
    Text(String),
    Regex(Regex),
}

impl From<&str> for CodePattern {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CodePattern {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Regex> for CodePattern {
    fn from(value: Regex) -> Self {
        Self::Regex(value)
    }
}

/// Ranges of the (up to `limit`) non-overlapping matches of `pattern` in `code`.
pub fn find_all_code_ranges(code: &str, pattern: &CodePattern, limit: Option<usize>) -> Vec<CodeRange> {
    let limit = limit.unwrap_or(usize::MAX);
    let spans: Vec<(usize, usize)> = match pattern {
        CodePattern::Text(needle) if needle.is_empty() => Vec::new(),
        CodePattern::Text(needle) => code
            .match_indices(needle.as_str())
            .take(limit)
            .map(|(i, m)| (i, i + m.len()))
            .collect(),
        CodePattern::Regex(re) => re
            .find_iter(code)
            .filter(|m| !m.is_empty())
            .take(limit)
            .map(|m| (m.start(), m.end()))
            .collect(),
    };
    spans
        .into_iter()
        .map(|(start, end)| CodeRange::new(point_at(code, start), point_at(code, end)))
        .collect()
}

/// Line/column of a byte offset. Columns count characters.
fn point_at(code: &str, offset: usize) -> CodePoint {
    let head = &code[..offset];
    let line = head.matches('\n').count();
    let line_start = head.rfind('\n').map_or(0, |i| i + 1);
    CodePoint::new(line, head[line_start..].chars().count())
}

/// A set of ranges, possibly overlapping and unsorted.
pub type CodeSelection = Vec<CodeRange>;

/// Anything that can be used as a selection: a single range or a list of them.
pub fn parse_code_selection(value: impl Into<PossibleCodeSelection>) -> CodeSelection {
    match value.into() {
        PossibleCodeSelection::Range(range) => vec![range],
        PossibleCodeSelection::Ranges(ranges) => ranges,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PossibleCodeSelection {
    Range(CodeRange),
    Ranges(Vec<CodeRange>),
}

impl From<CodeRange> for PossibleCodeSelection {
    fn from(value: CodeRange) -> Self {
        Self::Range(value)
    }
}

impl From<Vec<CodeRange>> for PossibleCodeSelection {
    fn from(value: Vec<CodeRange>) -> Self {
        Self::Ranges(value)
    }
}

/// Checked range by range; no ordering or merging of the ranges is assumed.
pub fn is_point_in_code_selection(point: CodePoint, selection: &[CodeRange]) -> bool {
    selection.iter().any(|range| is_point_in_code_range(point, range))
}

/// Selections switch halfway; the code node fades between them with its own progress signal.
impl Lerp for Vec<CodeRange> {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        step(a, b, t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/code/range.rs"]
mod tests;

//! Building transition scopes: whole-text diffs and targeted edits.

use crate::animation::lerp::Lerp;
use crate::code::diff::patience_diff;
use crate::code::range::{CodePoint, CodeRange};
use crate::code::scope::{CodeFragment, CodeScope, CodeTag, ScopeSide, resolve_scope};
use crate::signal::signal::SignalValue;

/// Split code into words, whitespace runs, newlines and single punctuation characters.
pub fn tokenize(code: &str) -> Vec<&str> {
    #[derive(PartialEq, Clone, Copy)]
    enum Class {
        Word,
        Space,
        Other,
    }
    fn class(c: char) -> Class {
        if c.is_alphanumeric() || c == '_' {
            Class::Word
        } else if c.is_whitespace() && c != '\n' {
            Class::Space
        } else {
            Class::Other
        }
    }

    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<Class> = None;
    for (i, c) in code.char_indices() {
        let next = class(c);
        let joins = current == Some(next) && next != Class::Other;
        if !joins && i > start {
            tokens.push(&code[start..i]);
            start = i;
        }
        current = Some(next);
    }
    if start < code.len() {
        tokens.push(&code[start..]);
    }
    tokens
}

/// Scope morphing `from` into `to`, driven by `progress`.
///
/// Unchanged tokens stay plain text; runs of deleted and inserted tokens become fragments.
pub fn diff_code(from: &str, to: &str, progress: impl Into<SignalValue<f64>>) -> CodeScope {
    let a = tokenize(from);
    let b = tokenize(to);
    let diff = patience_diff(&a, &b);

    let mut tags: Vec<CodeTag> = Vec::new();
    let mut same = String::new();
    let mut removed = String::new();
    let mut added = String::new();
    let flush_change = |tags: &mut Vec<CodeTag>, removed: &mut String, added: &mut String| {
        if !removed.is_empty() || !added.is_empty() {
            tags.push(CodeFragment::new(std::mem::take(removed), std::mem::take(added)).into());
        }
    };

    for line in &diff.lines {
        if line.is_matched() {
            flush_change(&mut tags, &mut removed, &mut added);
            same.push_str(line.line);
            continue;
        }
        if !same.is_empty() {
            tags.push(CodeTag::Text(std::mem::take(&mut same)));
        }
        if line.is_deleted() {
            removed.push_str(line.line);
        } else {
            added.push_str(line.line);
        }
    }
    flush_change(&mut tags, &mut removed, &mut added);
    if !same.is_empty() {
        tags.push(CodeTag::Text(same));
    }
    CodeScope::new(progress, tags)
}

/// Byte offset of `point` in `code`. Columns and lines past the end clamp.
pub fn offset_of(code: &str, point: CodePoint) -> usize {
    let mut offset = 0;
    for (line, text) in code.split('\n').enumerate() {
        if line == point.line {
            let column = text
                .char_indices()
                .nth(point.column)
                .map_or(text.len(), |(i, _)| i);
            return offset + column;
        }
        offset += text.len() + 1;
    }
    code.len()
}

fn split_range(code: &str, range: &CodeRange) -> (String, String, String) {
    let start = offset_of(code, range.start);
    let end = offset_of(code, range.end).max(start);
    (
        code[..start].to_owned(),
        code[start..end].to_owned(),
        code[end..].to_owned(),
    )
}

pub fn append_scope(current: &str, code: &str, progress: impl Into<SignalValue<f64>>) -> CodeScope {
    CodeScope::new(
        progress,
        vec![current.into(), CodeFragment::new("", code).into()],
    )
}

pub fn prepend_scope(current: &str, code: &str, progress: impl Into<SignalValue<f64>>) -> CodeScope {
    CodeScope::new(
        progress,
        vec![CodeFragment::new("", code).into(), current.into()],
    )
}

pub fn insert_scope(
    current: &str,
    point: CodePoint,
    code: &str,
    progress: impl Into<SignalValue<f64>>,
) -> CodeScope {
    let offset = offset_of(current, point);
    CodeScope::new(
        progress,
        vec![
            current[..offset].into(),
            CodeFragment::new("", code).into(),
            current[offset..].into(),
        ],
    )
}

pub fn remove_scope(
    current: &str,
    range: &CodeRange,
    progress: impl Into<SignalValue<f64>>,
) -> CodeScope {
    replace_scope(current, range, "", progress)
}

pub fn replace_scope(
    current: &str,
    range: &CodeRange,
    code: &str,
    progress: impl Into<SignalValue<f64>>,
) -> CodeScope {
    let (head, middle, tail) = split_range(current, range);
    CodeScope::new(
        progress,
        vec![
            head.into(),
            CodeFragment::new(middle, code).into(),
            tail.into(),
        ],
    )
}

/// Interpolating two scopes diffs their resolved texts and shows the diff at `t`.
impl Lerp for CodeScope {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let from = resolve_scope(a, ScopeSide::AtProgress);
        let to = resolve_scope(b, ScopeSide::AtProgress);
        diff_code(&from, &to, t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/code/edit.rs"]
mod tests;

use std::collections::HashSet;

use regex::Regex;

use crate::foundation::color::Color;
use crate::foundation::error::{VignetteError, VignetteResult};

/// Colored run of characters. `start`/`end` are character (not byte) offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub color: Color,
}

pub trait CodeHighlighter {
    /// Spans for `code`; characters outside every span use the node's fallback fill.
    fn highlight(&self, code: &str) -> Vec<HighlightSpan>;
}

/// Per-character colors for `code`, later spans overriding earlier ones.
pub fn char_colors(code: &str, spans: &[HighlightSpan]) -> Vec<Option<Color>> {
    let mut colors = vec![None; code.chars().count()];
    for span in spans {
        let end = span.end.min(colors.len());
        for slot in colors.iter_mut().take(end).skip(span.start) {
            *slot = Some(span.color);
        }
    }
    colors
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightTheme {
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub comment: Color,
}

impl Default for HighlightTheme {
    fn default() -> Self {
        Self {
            keyword: Color::from_rgba8(0xff, 0x79, 0xc6, 0xff),
            string: Color::from_rgba8(0xf1, 0xfa, 0x8c, 0xff),
            number: Color::from_rgba8(0xbd, 0x93, 0xf9, 0xff),
            comment: Color::from_rgba8(0x62, 0x72, 0xa4, 0xff),
        }
    }
}

/// Regex tokenizer coloring keywords, string literals, numbers and line comments.
#[derive(Clone, Debug)]
pub struct KeywordHighlighter {
    keywords: HashSet<String>,
    theme: HighlightTheme,
    tokens: Regex,
}

const TOKEN_PATTERN: &str = r#"(?P<comment>//[^\n]*)|(?P<string>"(?:[^"\\]|\\.)*")|(?P<number>\b\d+(?:\.\d+)?\b)|(?P<word>\b[A-Za-z_][A-Za-z0-9_]*\b)"#;

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "else", "enum", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "type", "unsafe", "use", "where",
    "while", "yield",
];

impl KeywordHighlighter {
    pub fn new<I, S>(keywords: I, theme: HighlightTheme) -> VignetteResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = Regex::new(TOKEN_PATTERN)
            .map_err(|e| VignetteError::parse(format!("highlighter pattern: {e}")))?;
        Ok(Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            theme,
            tokens,
        })
    }

    pub fn rust() -> VignetteResult<Self> {
        Self::new(RUST_KEYWORDS.iter().copied(), HighlightTheme::default())
    }
}

impl CodeHighlighter for KeywordHighlighter {
    fn highlight(&self, code: &str) -> Vec<HighlightSpan> {
        let mut spans = Vec::new();
        for caps in self.tokens.captures_iter(code) {
            let (m, color) = if let Some(m) = caps.name("comment") {
                (m, self.theme.comment)
            } else if let Some(m) = caps.name("string") {
                (m, self.theme.string)
            } else if let Some(m) = caps.name("number") {
                (m, self.theme.number)
            } else if let Some(m) = caps.name("word") {
                if !self.keywords.contains(m.as_str()) {
                    continue;
                }
                (m, self.theme.keyword)
            } else {
                continue;
            };
            let start = code[..m.start()].chars().count();
            spans.push(HighlightSpan {
                start,
                end: start + m.as_str().chars().count(),
                color,
            });
        }
        spans
    }
}

#[cfg(test)]
#[path = "../../tests/unit/code/highlight.rs"]
mod tests;

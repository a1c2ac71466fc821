//! Layout of code scopes on a monospace grid.
//!
//! The cursor walks a [`CodeScope`] once to measure it and once more to produce draw records.
//! Three positions are tracked while walking: the layout of the fully-before text, the layout
//! of the fully-after text, and the grid of the text resolved at each scope's progress. The
//! grid is what ranges and selections refer to, so it advances exactly along
//! `resolve_scope(scope, ScopeSide::AtProgress)`.

use crate::code::highlight::{CodeHighlighter, char_colors};
use crate::code::range::{CodePoint, CodeRange, is_point_in_code_selection};
use crate::code::scope::{CodeScope, CodeTag, ScopeSide, resolve_scope};
use crate::foundation::color::Color;
use crate::foundation::core::{Point, Vec2};
use crate::transform::linear::{clamp_remap, clamp01, map};

/// One run of characters sharing fill, selection state and alpha.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CodeFragmentDrawInfo {
    pub text: String,
    /// Top-left corner of the first character, relative to the top-left of the code block.
    pub position: Point,
    pub character_size: Vec2,
    /// Grid position of the first character.
    pub cursor: CodePoint,
    pub fill: Color,
    /// Selection state: 1 when selected, 0 when not, in between while a selection tweens.
    pub time: f64,
    pub alpha: f64,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct CodeDrawingInfo {
    pub fragments: Vec<CodeFragmentDrawInfo>,
    pub size: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorMetrics {
    pub mono_width: f64,
    pub line_height: f64,
    pub fallback_fill: Color,
}

/// Current selection plus, while a selection tween runs, the previous one and its progress.
#[derive(Clone, Copy, Debug)]
pub struct SelectionState<'a> {
    pub current: &'a [CodeRange],
    pub previous: Option<&'a [CodeRange]>,
    pub progress: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default)]
struct Layout {
    line: usize,
    column: usize,
    max_column: usize,
    index: usize,
}

impl Layout {
    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
                self.max_column = self.max_column.max(self.column);
            }
            self.index += 1;
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Before,
    After,
}

pub struct CodeCursor<'a> {
    metrics: CursorMetrics,
    selection: SelectionState<'a>,
    before_colors: Vec<Option<Color>>,
    after_colors: Vec<Option<Color>>,
    before: Layout,
    after: Layout,
    grid: CodePoint,
    drawing: bool,
    fragments: Vec<CodeFragmentDrawInfo>,
}

impl<'a> CodeCursor<'a> {
    pub fn new(
        metrics: CursorMetrics,
        selection: SelectionState<'a>,
        highlighter: Option<&dyn CodeHighlighter>,
        code: &CodeScope,
    ) -> Self {
        let (before_colors, after_colors) = match highlighter {
            Some(h) => {
                let before = resolve_scope(code, ScopeSide::Before);
                let after = resolve_scope(code, ScopeSide::After);
                (
                    char_colors(&before, &h.highlight(&before)),
                    char_colors(&after, &h.highlight(&after)),
                )
            }
            None => (Vec::new(), Vec::new()),
        };
        Self {
            metrics,
            selection,
            before_colors,
            after_colors,
            before: Layout::default(),
            after: Layout::default(),
            grid: CodePoint::default(),
            drawing: false,
            fragments: Vec::new(),
        }
    }

    /// Desired size of `scope` in pixels.
    pub fn measure(mut self, scope: &CodeScope) -> Vec2 {
        self.drawing = false;
        self.traverse(scope);
        self.size(clamp01(scope.progress()))
    }

    pub fn draw(mut self, scope: &CodeScope) -> CodeDrawingInfo {
        self.drawing = true;
        self.traverse(scope);
        let size = self.size(clamp01(scope.progress()));
        CodeDrawingInfo {
            fragments: self.fragments,
            size,
        }
    }

    fn size(&self, progress: f64) -> Vec2 {
        let columns = map(
            self.before.max_column as f64,
            self.after.max_column as f64,
            progress,
        );
        let lines = map(
            (self.before.line + 1) as f64,
            (self.after.line + 1) as f64,
            progress,
        );
        Vec2::new(
            columns * self.metrics.mono_width,
            lines * self.metrics.line_height,
        )
    }

    fn traverse(&mut self, scope: &CodeScope) {
        let progress = clamp01(scope.progress());
        for tag in &scope.fragments {
            self.tag(tag, progress);
        }
    }

    fn tag(&mut self, tag: &CodeTag, progress: f64) {
        match tag {
            CodeTag::Text(text) => self.fragment(text, text, progress),
            CodeTag::Fragment(fragment) => self.fragment(&fragment.before, &fragment.after, progress),
            CodeTag::Scope(scope) => self.traverse(scope),
            CodeTag::Group(tags) => {
                for tag in tags {
                    self.tag(tag, progress);
                }
            }
            CodeTag::Dynamic(f) => self.tag(&f(), progress),
        }
    }

    fn pixel(&self, layout: &Layout) -> Point {
        Point::new(
            layout.column as f64 * self.metrics.mono_width,
            layout.line as f64 * self.metrics.line_height,
        )
    }

    fn fragment(&mut self, before: &str, after: &str, progress: f64) {
        let resolved_after = progress > 0.5;
        if self.drawing {
            let anchor = self
                .pixel(&self.before)
                .lerp(self.pixel(&self.after), progress);
            if before == after {
                let side = if resolved_after { Side::After } else { Side::Before };
                self.emit(after, anchor, side, 1.0, true);
            } else {
                self.emit(
                    before,
                    anchor,
                    Side::Before,
                    clamp_remap(0.0, 0.5, 1.0, 0.0, progress),
                    !resolved_after,
                );
                self.emit(
                    after,
                    anchor,
                    Side::After,
                    clamp_remap(0.5, 1.0, 0.0, 1.0, progress),
                    resolved_after,
                );
            }
        }
        self.before.advance(before);
        self.after.advance(after);
    }

    fn selection_time(&self, point: CodePoint) -> f64 {
        let now = if is_point_in_code_selection(point, self.selection.current) {
            1.0
        } else {
            0.0
        };
        match (self.selection.previous, self.selection.progress) {
            (Some(previous), Some(t)) => {
                let then = if is_point_in_code_selection(point, previous) {
                    1.0
                } else {
                    0.0
                };
                map(then, now, t)
            }
            _ => now,
        }
    }

    /// Emit records for `text`, starting at `anchor`. The grid only moves when the text is the
    /// one currently resolved.
    fn emit(&mut self, text: &str, anchor: Point, side: Side, alpha: f64, advances: bool) {
        let start_index = match side {
            Side::Before => self.before.index,
            Side::After => self.after.index,
        };
        let mut grid = self.grid;
        let mut run: Option<CodeFragmentDrawInfo> = None;
        let mut line_offset = 0usize;
        let mut column_offset = 0usize;
        let character_size = Vec2::new(self.metrics.mono_width, self.metrics.line_height);

        for (i, c) in text.chars().enumerate() {
            if c == '\n' {
                self.flush(&mut run, alpha);
                line_offset += 1;
                column_offset = 0;
                grid.line += 1;
                grid.column = 0;
                continue;
            }
            let colors = match side {
                Side::Before => &self.before_colors,
                Side::After => &self.after_colors,
            };
            let fill = colors
                .get(start_index + i)
                .copied()
                .flatten()
                .unwrap_or(self.metrics.fallback_fill);
            let time = self.selection_time(grid);

            match run.as_mut() {
                Some(current) if current.fill == fill && current.time == time => {
                    current.text.push(c);
                }
                _ => {
                    self.flush(&mut run, alpha);
                    let x = if line_offset == 0 { anchor.x } else { 0.0 };
                    run = Some(CodeFragmentDrawInfo {
                        text: c.to_string(),
                        position: Point::new(
                            x + column_offset as f64 * self.metrics.mono_width,
                            anchor.y + line_offset as f64 * self.metrics.line_height,
                        ),
                        character_size,
                        cursor: grid,
                        fill,
                        time,
                        alpha,
                    });
                }
            }
            grid.column += 1;
            column_offset += 1;
        }
        self.flush(&mut run, alpha);
        if advances {
            self.grid = grid;
        }
    }

    fn flush(&mut self, run: &mut Option<CodeFragmentDrawInfo>, alpha: f64) {
        if let Some(info) = run.take()
            && alpha > 0.0
        {
            self.fragments.push(info);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/code/cursor.rs"]
mod tests;

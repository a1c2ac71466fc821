//! Animated source code on a monospace grid.

use std::rc::Rc;

use crate::animation::ease::Ease;
use crate::animation::task::{BoxTask, Tween, run, sequence};
use crate::code::cursor::{CodeCursor, CodeDrawingInfo, CursorMetrics, SelectionState};
use crate::code::edit::{
    append_scope, diff_code, insert_scope, prepend_scope, remove_scope, replace_scope,
};
use crate::code::highlight::CodeHighlighter;
use crate::code::range::{
    CodePattern, CodePoint, CodeRange, find_all_code_ranges, is_point_in_code_selection, lines,
};
use crate::code::scope::{CodeScope, ScopeSide, resolve_scope};
use crate::foundation::color::Color;
use crate::foundation::core::{BBox, Point, Rect, Vec2};
use crate::foundation::error::VignetteResult;
use crate::render::context::{Context2d, Font};
use crate::scene::element::{Drawable, Element};
use crate::scene::node::Node;
use crate::signal::signal::{Signal, SignalValue};
use crate::transform::linear::map;

/// Typography of a code block.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CodeStyle {
    pub font_family: String,
    pub font_size: f64,
    /// Multiple of the font size.
    pub line_height: f64,
    /// Advance of one character as a multiple of the font size.
    pub mono_width_ratio: f64,
    /// Color of characters the highlighter leaves uncolored.
    pub fallback_fill: Color,
}

impl Default for CodeStyle {
    fn default() -> Self {
        Self {
            font_family: "monospace".to_owned(),
            font_size: 48.0,
            line_height: 1.25,
            mono_width_ratio: 0.6,
            fallback_fill: Color::WHITE,
        }
    }
}

impl CodeStyle {
    pub fn metrics(&self) -> CursorMetrics {
        CursorMetrics {
            mono_width: self.font_size * self.mono_width_ratio,
            line_height: self.font_size * self.line_height,
            fallback_fill: self.fallback_fill,
        }
    }

    pub fn font(&self) -> Font {
        Font {
            family: self.font_family.clone(),
            size: self.font_size,
        }
    }
}

pub struct CodeData {
    pub code: Signal<CodeScope>,
    pub selection: Signal<Vec<CodeRange>>,
    pub style: Signal<CodeStyle>,
    pub highlighter: Signal<Option<Rc<dyn CodeHighlighter>>>,
    old_selection: Signal<Option<Vec<CodeRange>>>,
    selection_progress: Signal<Option<f64>>,
}

impl Element {
    pub fn code(code: CodeScope) -> Self {
        let data = CodeData {
            code: Signal::new(CodeScope::default()),
            selection: Signal::new(vec![lines(0, usize::MAX)]),
            style: Signal::new(CodeStyle::default()),
            highlighter: Signal::new(None),
            old_selection: Signal::new(None),
            selection_progress: Signal::new(None),
        };
        data.code.set(code);
        Self::Code(Box::new(data))
    }
}

impl CodeData {
    pub(crate) fn dispose_internal(&self) {
        self.style.dispose();
        self.highlighter.dispose();
        self.old_selection.dispose();
        self.selection_progress.dispose();
    }

    /// The code as currently displayed, each scope resolved by its own progress.
    pub fn parsed(&self) -> String {
        resolve_scope(&self.code.get(), ScopeSide::AtProgress)
    }

    pub fn find_all_ranges(&self, pattern: impl Into<CodePattern>) -> Vec<CodeRange> {
        find_all_code_ranges(&self.parsed(), &pattern.into(), None)
    }

    /// First match, or an empty range at the origin.
    pub fn find_first_range(&self, pattern: impl Into<CodePattern>) -> CodeRange {
        find_all_code_ranges(&self.parsed(), &pattern.into(), Some(1))
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    /// Last match, or an empty range at the origin.
    pub fn find_last_range(&self, pattern: impl Into<CodePattern>) -> CodeRange {
        find_all_code_ranges(&self.parsed(), &pattern.into(), None)
            .pop()
            .unwrap_or_default()
    }

    fn cursor_run<R>(&self, f: impl FnOnce(CodeCursor<'_>, &CodeScope) -> R) -> R {
        let code = self.code.get();
        let selection = self.selection.get();
        let previous = self.old_selection.get();
        let highlighter = self.highlighter.get();
        let state = SelectionState {
            current: &selection,
            previous: previous.as_deref(),
            progress: self.selection_progress.get(),
        };
        let cursor = CodeCursor::new(self.style.get().metrics(), state, highlighter.as_deref(), &code);
        f(cursor, &code)
    }

    pub fn drawing_info(&self) -> CodeDrawingInfo {
        self.cursor_run(|cursor, code| cursor.draw(code))
    }

    pub fn computed_size(&self) -> Vec2 {
        self.cursor_run(|cursor, code| cursor.measure(code))
    }

    /// Bounds of the character at `point`, in the node's local space.
    pub fn get_point_bbox(&self, point: CodePoint) -> Rect {
        let info = self.drawing_info();
        let mut found = None;
        for fragment in &info.fragments {
            let before = fragment.cursor.line < point.line
                || (fragment.cursor.line == point.line && fragment.cursor.column <= point.column);
            if !before {
                break;
            }
            found = Some(fragment);
        }
        let Some(fragment) = found else {
            return Rect::ZERO;
        };
        let offset = point.column.saturating_sub(fragment.cursor.column) as f64;
        let origin =
            fragment.position - info.size / 2.0 + Vec2::new(fragment.character_size.x * offset, 0.0);
        Rect::from_origin_size(origin, fragment.character_size.to_size())
    }

    /// One box per selected run of characters on each line, in the node's local space.
    pub fn get_selection_bbox(&self, selection: &[CodeRange]) -> Vec<Rect> {
        let info = self.drawing_info();
        let half = info.size / 2.0;
        let mut boxes = Vec::new();
        let mut current: Option<Rect> = None;
        let mut line = 0;
        for fragment in &info.fragments {
            if fragment.cursor.line != line {
                line = fragment.cursor.line;
                boxes.extend(current.take());
            }
            let mut column = fragment.cursor.column;
            for i in 0..fragment.text.chars().count() {
                if is_point_in_code_selection(CodePoint::new(line, column), selection) {
                    let origin: Point = fragment.position - half
                        + Vec2::new(fragment.character_size.x * i as f64, 0.0);
                    let rect = Rect::from_origin_size(origin, fragment.character_size.to_size());
                    current = Some(current.map_or(rect, |c| c.union(rect)));
                } else {
                    boxes.extend(current.take());
                }
                column += 1;
            }
        }
        boxes.extend(current);
        boxes
    }

    /// Transition to `to`, morphing the tokens that differ.
    pub fn tween_code(&self, to: impl Into<String>, duration: f64, ease: Ease) -> BoxTask {
        let to = to.into();
        self.edit(duration, ease, move |current, progress| {
            diff_code(current, &to, progress)
        })
    }

    pub fn append(&self, code: impl Into<String>, duration: f64, ease: Ease) -> BoxTask {
        let code = code.into();
        self.edit(duration, ease, move |current, progress| {
            append_scope(current, &code, progress)
        })
    }

    pub fn prepend(&self, code: impl Into<String>, duration: f64, ease: Ease) -> BoxTask {
        let code = code.into();
        self.edit(duration, ease, move |current, progress| {
            prepend_scope(current, &code, progress)
        })
    }

    pub fn insert(&self, point: CodePoint, code: impl Into<String>, duration: f64, ease: Ease) -> BoxTask {
        let code = code.into();
        self.edit(duration, ease, move |current, progress| {
            insert_scope(current, point, &code, progress)
        })
    }

    pub fn remove(&self, range: CodeRange, duration: f64, ease: Ease) -> BoxTask {
        self.edit(duration, ease, move |current, progress| {
            remove_scope(current, &range, progress)
        })
    }

    pub fn replace(&self, range: CodeRange, code: impl Into<String>, duration: f64, ease: Ease) -> BoxTask {
        let code = code.into();
        self.edit(duration, ease, move |current, progress| {
            replace_scope(current, &range, &code, progress)
        })
    }

    /// On the first frame, swap the code for a scope built from the displayed text and a fresh
    /// progress signal, then drive that progress to 1 and settle on the resulting text.
    fn edit(
        &self,
        duration: f64,
        ease: Ease,
        build: impl FnOnce(&str, SignalValue<f64>) -> CodeScope + 'static,
    ) -> BoxTask {
        let progress = Signal::new(0.0);
        let start: BoxTask = {
            let code = self.code.clone();
            let progress = progress.clone();
            Box::new(run(move || {
                let current = resolve_scope(&code.peek(), ScopeSide::AtProgress);
                let reader = progress.clone();
                code.set(build(&current, SignalValue::reactive(move || reader.get())));
            }))
        };
        let code = self.code.clone();
        let morph = progress
            .tween(1.0, duration, ease)
            .on_finish(move || {
                let settled = resolve_scope(&code.peek(), ScopeSide::After);
                code.set(CodeScope::from(settled));
            })
            .boxed();
        Box::new(sequence([start, morph]))
    }

    /// Move the selection to `to`, fading highlighted characters in and out.
    pub fn tween_selection(&self, to: Vec<CodeRange>, duration: f64, ease: Ease) -> BoxTask {
        let start: BoxTask = {
            let selection = self.selection.clone();
            let old = self.old_selection.clone();
            let progress = self.selection_progress.clone();
            Box::new(run(move || {
                old.set(Some(selection.peek()));
                selection.set(to);
                progress.set(Some(0.0));
            }))
        };
        let progress = self.selection_progress.clone();
        let cleared = self.selection_progress.clone();
        let old = self.old_selection.clone();
        let fade = Tween::new(duration, ease, move |t| progress.set(Some(t)))
            .on_cleanup(move || {
                cleared.set(None);
                old.set(None);
            })
            .boxed();
        Box::new(sequence([start, fade]))
    }
}

impl Drawable for CodeData {
    fn draw_content(&self, _node: &Node, ctx: &mut dyn Context2d) -> VignetteResult<()> {
        let info = self.drawing_info();
        let font = self.style.get().font();
        let half = info.size / 2.0;
        for fragment in &info.fragments {
            ctx.save();
            ctx.set_global_alpha(ctx.global_alpha() * fragment.alpha * map(0.2, 1.0, fragment.time));
            ctx.fill_text(&fragment.text, fragment.position - half, &font, fragment.fill);
            ctx.restore();
        }
        Ok(())
    }

    fn content_bbox(&self, _node: &Node) -> Rect {
        Rect::from_size_centered(self.computed_size())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/code_block.rs"]
mod tests;

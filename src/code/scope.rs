//! Code scopes: trees of text fragments that change between a "before" and an "after" state.
//!
//! Every scope carries a progress value in `[0, 1]`. A scope counts as showing its "after"
//! state once its progress passes one half.

use std::fmt;
use std::rc::Rc;

use crate::signal::signal::SignalValue;

/// Text that reads `before` while its scope is in the before state and `after` afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeFragment {
    pub before: String,
    pub after: String,
}

impl CodeFragment {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.before == self.after
    }
}

#[derive(Clone)]
pub enum CodeTag {
    Text(String),
    Fragment(CodeFragment),
    Scope(CodeScope),
    /// Tags sharing the enclosing scope's progress.
    Group(Vec<CodeTag>),
    /// Re-evaluated every time the scope is traversed.
    Dynamic(Rc<dyn Fn() -> CodeTag>),
}

impl CodeTag {
    pub fn dynamic(f: impl Fn() -> CodeTag + 'static) -> Self {
        Self::Dynamic(Rc::new(f))
    }

    /// Evaluate dynamic tags until a concrete one is produced.
    pub fn unwrap_dynamic(&self) -> CodeTag {
        let mut tag = self.clone();
        while let Self::Dynamic(f) = tag {
            tag = f();
        }
        tag
    }
}

impl fmt::Debug for CodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Fragment(fragment) => f.debug_tuple("Fragment").field(fragment).finish(),
            Self::Scope(scope) => f.debug_tuple("Scope").field(scope).finish(),
            Self::Group(tags) => f.debug_tuple("Group").field(tags).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for CodeTag {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CodeTag {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<CodeFragment> for CodeTag {
    fn from(value: CodeFragment) -> Self {
        Self::Fragment(value)
    }
}

impl From<CodeScope> for CodeTag {
    fn from(value: CodeScope) -> Self {
        Self::Scope(value)
    }
}

impl From<Vec<CodeTag>> for CodeTag {
    fn from(value: Vec<CodeTag>) -> Self {
        Self::Group(value)
    }
}

#[derive(Clone, Debug)]
pub struct CodeScope {
    pub progress: SignalValue<f64>,
    pub fragments: Vec<CodeTag>,
}

impl Default for CodeScope {
    fn default() -> Self {
        Self::new(0.0, Vec::new())
    }
}

impl CodeScope {
    pub fn new(progress: impl Into<SignalValue<f64>>, fragments: Vec<CodeTag>) -> Self {
        Self {
            progress: progress.into(),
            fragments,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress.resolve()
    }

    pub fn is_after(&self) -> bool {
        self.progress() > 0.5
    }
}

impl From<&str> for CodeScope {
    fn from(value: &str) -> Self {
        Self::new(0.0, vec![CodeTag::from(value)])
    }
}

impl From<String> for CodeScope {
    fn from(value: String) -> Self {
        Self::new(0.0, vec![CodeTag::Text(value)])
    }
}

impl From<Vec<CodeTag>> for CodeScope {
    fn from(value: Vec<CodeTag>) -> Self {
        Self::new(0.0, value)
    }
}

/// Normalize anything scope-like into a [`CodeScope`].
pub fn parse_code_scope(value: impl Into<CodeScope>) -> CodeScope {
    value.into()
}

/// Which side of every scope to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeSide {
    Before,
    After,
    /// Each scope decides by its own progress.
    AtProgress,
}

impl ScopeSide {
    pub fn is_after(self, scope: &CodeScope) -> bool {
        match self {
            Self::Before => false,
            Self::After => true,
            Self::AtProgress => scope.is_after(),
        }
    }
}

pub fn resolve_scope(scope: &CodeScope, side: ScopeSide) -> String {
    let mut out = String::new();
    let after = side.is_after(scope);
    for tag in &scope.fragments {
        resolve_into(&mut out, tag, after, side);
    }
    out
}

pub fn resolve_code_tag(tag: &CodeTag, after: bool, side: ScopeSide) -> String {
    let mut out = String::new();
    resolve_into(&mut out, tag, after, side);
    out
}

fn resolve_into(out: &mut String, tag: &CodeTag, after: bool, side: ScopeSide) {
    match tag {
        CodeTag::Text(text) => out.push_str(text),
        CodeTag::Fragment(fragment) => {
            out.push_str(if after { &fragment.after } else { &fragment.before })
        }
        CodeTag::Scope(scope) => out.push_str(&resolve_scope(scope, side)),
        CodeTag::Group(tags) => {
            for tag in tags {
                resolve_into(out, tag, after, side);
            }
        }
        CodeTag::Dynamic(f) => resolve_into(out, &f(), after, side),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/code/scope.rs"]
mod tests;

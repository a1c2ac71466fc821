pub(crate) mod diff;
pub(crate) mod parse;
pub(crate) mod tween;

pub(crate) mod context;
pub(crate) mod effects;
pub(crate) mod recording;

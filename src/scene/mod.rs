pub(crate) mod cache;
pub(crate) mod code_block;
pub(crate) mod element;
pub(crate) mod hierarchy;
pub(crate) mod node;
pub(crate) mod props;
pub(crate) mod registry;
pub(crate) mod state;

pub(crate) mod cursor;
pub(crate) mod diff;
pub(crate) mod edit;
pub(crate) mod highlight;
pub(crate) mod range;
pub(crate) mod scope;

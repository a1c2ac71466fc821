pub(crate) mod interpolate;
pub(crate) mod profile;
pub(crate) mod segment;

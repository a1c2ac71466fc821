pub mod affine;
pub mod linear;

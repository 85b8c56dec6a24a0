//! Tensor-product cubic B-spline interpolation with not-a-knot end conditions
//! on Cartesian grids of arbitrary dimension.
/// settings of the interpolant read from task documents
pub mod config;
/// caller arrays before validation
pub mod raw_array;
/// 1-D basis: knots, B-splines, their third derivatives and the collocation matrix
pub mod spline_basis;
/// separable solve and contractions over tensors of run-time rank
pub mod tensor_ops;
pub mod tensor_spline;

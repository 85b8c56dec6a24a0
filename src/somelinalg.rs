//! some linear algebra functions used throughout the code
#![allow(non_snake_case)]
/// direct solvers: dense LU (nalgebra) or band LU, factorized once and reused for many right-hand sides
pub mod LUsolver;
/// diagnostics for linear systems and matrices: condition number and warning
/// if it is poorly conditioned
pub mod linear_sys_diagnostics;
/// LU decomposition of banded matrices with partial pivoting
pub mod lu_band;

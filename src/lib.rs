// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
pub mod Utils;
pub mod error;
pub mod interpolation;
pub mod somelinalg;

pub use error::{ErrorKind, SplineError, SplineResult};
pub use interpolation::config::{SplineConfig, SplineTask};
pub use interpolation::raw_array::RawArray;
pub use interpolation::spline_basis::SplineBasis1D;
pub use interpolation::tensor_spline::{SplineState, TensorSplineND};
pub use somelinalg::LUsolver::SolverMethod;

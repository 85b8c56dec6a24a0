use ndarray::{Array1, ArrayD};
use num_complex::Complex64;

use crate::Utils::task_parser::Value;
use crate::error::{SplineError, SplineResult};

/// Coordinate array as it comes from the caller, before any validation.
/// Real arrays of any rank, complex arrays and lists of parsed document values are accepted here
/// so that the check of rank, element type and values happens at one place: `to_knots`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawArray {
    Real(ArrayD<f64>),
    Complex(ArrayD<Complex64>),
    Values(Vec<Value>),
}

impl RawArray {
    /// Flat list of coordinates. Only the element type and the rank are checked here,
    /// finiteness and ordering are checked by `SplineBasis1D`.
    pub fn to_knots(&self) -> SplineResult<Vec<f64>> {
        match self {
            RawArray::Real(a) => {
                if a.ndim() != 1 {
                    return Err(SplineError::WrongRank { rank: a.ndim() });
                }
                Ok(a.iter().copied().collect())
            }
            RawArray::Complex(_) => Err(SplineError::ComplexValued),
            RawArray::Values(values) => values
                .iter()
                .enumerate()
                .map(|(index, v)| {
                    v.as_float().ok_or_else(|| SplineError::NonNumeric {
                        index,
                        value: v.to_string(),
                    })
                })
                .collect(),
        }
    }
}

impl From<Vec<f64>> for RawArray {
    fn from(v: Vec<f64>) -> Self {
        RawArray::Real(Array1::from(v).into_dyn())
    }
}

impl From<&[f64]> for RawArray {
    fn from(v: &[f64]) -> Self {
        RawArray::from(v.to_vec())
    }
}

impl From<ArrayD<f64>> for RawArray {
    fn from(a: ArrayD<f64>) -> Self {
        RawArray::Real(a)
    }
}

impl From<ArrayD<Complex64>> for RawArray {
    fn from(a: ArrayD<Complex64>) -> Self {
        RawArray::Complex(a)
    }
}

impl From<Vec<Value>> for RawArray {
    fn from(v: Vec<Value>) -> Self {
        RawArray::Values(v)
    }
}

//! error taxonomy of the crate: every public operation returns `SplineResult`
use thiserror::Error;

/// Coarse classification of `SplineError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// malformed or out-of-range input
    Domain,
    /// tensor rank or extent mismatch
    Shape,
    /// non-numeric data where numbers were expected
    Type,
    /// operation called in the wrong state of the interpolant
    State,
    /// factorization of a collocation matrix failed
    Numerical,
    Io,
    Config,
}

#[derive(Error, Debug)]
pub enum SplineError {
    #[error("no coordinate array was given")]
    NullInput,

    #[error("at least {required} points are needed on an axis, but {provided} were provided")]
    TooFewPoints { required: usize, provided: usize },

    #[error("coordinate {index} is not finite: {value}")]
    NonFinite { index: usize, value: f64 },

    #[error("coordinates must be strictly increasing, violated at index {index}")]
    NotStrictlyIncreasing { index: usize },

    #[error("coordinate arrays must be real valued, got a complex array")]
    ComplexValued,

    #[error("coordinate array must have rank 1, got rank {rank}")]
    WrongRank { rank: usize },

    #[error("interpolant needs at least one axis")]
    NoAxes,

    #[error("x = {x} on axis {axis} is outside of the knots range [{min}, {max}]")]
    OutOfDomain {
        axis: usize,
        x: f64,
        min: f64,
        max: f64,
    },

    #[error("point has {found} coordinates, interpolant has {expected} axes")]
    PointDimension { expected: usize, found: usize },

    #[error("tensor rank {found} does not match the number of axes {expected}")]
    RankMismatch { expected: usize, found: usize },

    #[error("tensor shape {found:?} does not match the expected shape {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("tensor is empty")]
    EmptyTensor,

    #[error("value '{value}' at index {index} is not numeric")]
    NonNumeric { index: usize, value: String },

    #[error("{operation} is not allowed in state {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("spline matrix of axis {axis} is singular")]
    SingularMatrix { axis: usize },

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv failure: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot parse '{value}' on line {line} as a number")]
    Parse { line: usize, value: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl SplineError {
    pub fn kind(&self) -> ErrorKind {
        use SplineError::*;
        match self {
            NullInput
            | TooFewPoints { .. }
            | NonFinite { .. }
            | NotStrictlyIncreasing { .. }
            | ComplexValued
            | WrongRank { .. }
            | NoAxes
            | OutOfDomain { .. }
            | PointDimension { .. } => ErrorKind::Domain,
            RankMismatch { .. } | ShapeMismatch { .. } | EmptyTensor => ErrorKind::Shape,
            NonNumeric { .. } => ErrorKind::Type,
            InvalidState { .. } => ErrorKind::State,
            SingularMatrix { .. } => ErrorKind::Numerical,
            Io(_) | Csv(_) | Parse { .. } => ErrorKind::Io,
            Config(_) => ErrorKind::Config,
        }
    }
}

pub type SplineResult<T> = Result<T, SplineError>;

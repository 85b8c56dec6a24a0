//! Tensor-product cubic spline on a Cartesian grid of any dimension.
//!
//! Typical use:
//! ```ignore
//! let mut spline = TensorSplineND::new(&[x, y, z])?;
//! spline.setup()?;
//! spline.compute_coefficients(&values)?;
//! let f = spline.evaluate(&[0.1, 0.2, 0.3])?;
//! ```
//! Coefficients may be saved and later given back with `set_coefficients` (or `with_coefficients`),
//! in that case no matrix has to be factorized before evaluation.
use log::{Level, debug, info, log_enabled, warn};
use nalgebra::DMatrix;
use ndarray::{ArrayBase, ArrayD, ArrayView2, Data, Dimension};
use rayon::prelude::*;
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

use crate::error::{SplineError, SplineResult};
use crate::interpolation::config::SplineConfig;
use crate::interpolation::raw_array::RawArray;
use crate::interpolation::spline_basis::{ORDER, SplineBasis1D};
use crate::interpolation::tensor_ops::{contract_all, solve_along_axes, sum_over_support};
use crate::somelinalg::LUsolver::MatrixFactorization;
use crate::somelinalg::linear_sys_diagnostics::condition_number;

/// Condition number of the matrix of `axis` if it exceeds `threshold`; that case is logged once.
pub(crate) fn poor_condition(axis: usize, matrix: &DMatrix<f64>, threshold: f64) -> Option<f64> {
    let condition = condition_number(matrix);
    if condition > threshold {
        warn!(
            "spline matrix of axis {} is poorly conditioned (condition number {:.2e}), check the spacing of its coordinates",
            axis, condition
        );
        Some(condition)
    } else {
        None
    }
}

/// Observable state of the interpolant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineState {
    /// axes are validated, nothing else is done
    Constructed,
    /// collocation matrices are factorized
    SetUp,
    /// coefficients are known, the spline can be evaluated
    CoefficientsReady,
}

impl SplineState {
    pub fn name(&self) -> &'static str {
        match self {
            SplineState::Constructed => "Constructed",
            SplineState::SetUp => "SetUp",
            SplineState::CoefficientsReady => "CoefficientsReady",
        }
    }
}

#[derive(Debug, Clone)]
enum Stage {
    Constructed,
    SetUp {
        solvers: Vec<MatrixFactorization>,
    },
    /// solvers are None when the coefficients were given by the caller and `setup` was never called
    Ready {
        solvers: Option<Vec<MatrixFactorization>>,
        coefficients: ArrayD<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct TensorSplineND {
    bases: Vec<SplineBasis1D>,
    config: SplineConfig,
    stage: Stage,
}

impl TensorSplineND {
    pub fn new<A: AsRef<[f64]>>(axes: &[A]) -> SplineResult<TensorSplineND> {
        Self::with_config(axes, SplineConfig::default())
    }

    pub fn with_config<A: AsRef<[f64]>>(
        axes: &[A],
        config: SplineConfig,
    ) -> SplineResult<TensorSplineND> {
        if axes.is_empty() {
            return Err(SplineError::NoAxes);
        }
        let bases = axes
            .iter()
            .map(|x| SplineBasis1D::with_min_points(x.as_ref(), config.min_points))
            .collect::<SplineResult<Vec<_>>>()?;
        Ok(TensorSplineND {
            bases,
            config,
            stage: Stage::Constructed,
        })
    }

    /// Interpolant with known coefficients, ready for evaluation
    pub fn with_coefficients<A: AsRef<[f64]>>(
        axes: &[A],
        coefficients: ArrayD<f64>,
        config: SplineConfig,
    ) -> SplineResult<TensorSplineND> {
        let mut spline = Self::with_config(axes, config)?;
        spline.set_coefficients(coefficients)?;
        Ok(spline)
    }

    /// Interpolant over caller arrays that are not validated yet: each of them must be a real
    /// rank-1 array (or a list of numbers) of finite strictly increasing values.
    pub fn from_raw(
        axes: &[RawArray],
        coefficients: Option<ArrayD<f64>>,
        config: SplineConfig,
    ) -> SplineResult<TensorSplineND> {
        if axes.is_empty() {
            return Err(SplineError::NoAxes);
        }
        let bases = axes
            .iter()
            .map(|raw| SplineBasis1D::from_raw(Some(raw), config.min_points))
            .collect::<SplineResult<Vec<_>>>()?;
        let mut spline = TensorSplineND {
            bases,
            config,
            stage: Stage::Constructed,
        };
        if let Some(coefficients) = coefficients {
            spline.set_coefficients(coefficients)?;
        }
        Ok(spline)
    }

    pub fn dim(&self) -> usize {
        self.bases.len()
    }

    pub fn bases(&self) -> &[SplineBasis1D] {
        &self.bases
    }

    pub fn config(&self) -> &SplineConfig {
        &self.config
    }

    /// shape of the grid values: (n_1, ..., n_N)
    pub fn grid_shape(&self) -> Vec<usize> {
        self.bases.iter().map(|b| b.n_points()).collect()
    }

    /// shape of the coefficient tensor: (n_1 + 2, ..., n_N + 2)
    pub fn coefficient_shape(&self) -> Vec<usize> {
        self.bases.iter().map(|b| b.n_basis()).collect()
    }

    pub fn state(&self) -> SplineState {
        match self.stage {
            Stage::Constructed => SplineState::Constructed,
            Stage::SetUp { .. } => SplineState::SetUp,
            Stage::Ready { .. } => SplineState::CoefficientsReady,
        }
    }

    fn invalid_state(&self, operation: &'static str) -> SplineError {
        SplineError::InvalidState {
            operation,
            state: self.state().name(),
        }
    }

    /// Assembles and factorizes the collocation matrix of every axis.
    /// On failure the interpolant stays in its previous state.
    pub fn setup(&mut self) -> SplineResult<()> {
        let begin = Instant::now();
        let mut solvers = Vec::with_capacity(self.dim());
        for (axis, basis) in self.bases.iter().enumerate() {
            let matrix = basis.equilibrated_collocation_matrix();
            if log_enabled!(Level::Warn) {
                poor_condition(axis, &matrix, self.config.condition_threshold);
            }
            let solver = MatrixFactorization::new(&matrix, self.config.method)
                .ok_or(SplineError::SingularMatrix { axis })?;
            solvers.push(solver);
        }
        info!(
            "spline matrices of {} axes ({:?}) factorized in {:?} with {:?} LU",
            self.dim(),
            self.coefficient_shape(),
            begin.elapsed(),
            self.config.method
        );
        self.stage = match std::mem::replace(&mut self.stage, Stage::Constructed) {
            Stage::Ready { coefficients, .. } => Stage::Ready {
                solvers: Some(solvers),
                coefficients,
            },
            Stage::Constructed | Stage::SetUp { .. } => Stage::SetUp { solvers },
        };
        Ok(())
    }

    fn solvers(&self, operation: &'static str) -> SplineResult<&[MatrixFactorization]> {
        match &self.stage {
            Stage::SetUp { solvers }
            | Stage::Ready {
                solvers: Some(solvers),
                ..
            } => Ok(solvers),
            _ => Err(self.invalid_state(operation)),
        }
    }

    /// Fits the coefficients to the values sampled on the grid (shape (n_1, ..., n_N)).
    /// Requires `setup`; on failure the previous coefficients, if any, are kept.
    pub fn compute_coefficients<S, D>(&mut self, values: &ArrayBase<S, D>) -> SplineResult<()>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let solvers = self.solvers("compute_coefficients")?;
        let expected = self.grid_shape();
        if values.ndim() != expected.len() {
            return Err(SplineError::RankMismatch {
                expected: expected.len(),
                found: values.ndim(),
            });
        }
        if values.shape() != expected.as_slice() {
            return Err(SplineError::ShapeMismatch {
                expected,
                found: values.shape().to_vec(),
            });
        }
        let begin = Instant::now();
        let coefficients = solve_along_axes(values.view().into_dyn(), solvers, self.config.parallel)?;
        info!(
            "{} spline coefficients computed in {:?}",
            coefficients.len(),
            begin.elapsed()
        );
        let solvers = match std::mem::replace(&mut self.stage, Stage::Constructed) {
            Stage::SetUp { solvers } => Some(solvers),
            Stage::Ready { solvers, .. } => solvers,
            Stage::Constructed => None,
        };
        self.stage = Stage::Ready {
            solvers,
            coefficients,
        };
        Ok(())
    }

    pub fn coefficients(&self) -> SplineResult<&ArrayD<f64>> {
        match &self.stage {
            Stage::Ready { coefficients, .. } => Ok(coefficients),
            _ => Err(self.invalid_state("coefficients")),
        }
    }

    /// Replaces the coefficients. The tensor must be non-empty and have the shape
    /// (n_1 + 2, ..., n_N + 2); otherwise the interpolant is left untouched.
    pub fn set_coefficients(&mut self, coefficients: ArrayD<f64>) -> SplineResult<()> {
        let expected = self.coefficient_shape();
        if coefficients.is_empty() {
            return Err(SplineError::EmptyTensor);
        }
        if coefficients.ndim() != expected.len() {
            return Err(SplineError::RankMismatch {
                expected: expected.len(),
                found: coefficients.ndim(),
            });
        }
        if coefficients.shape() != expected.as_slice() {
            return Err(SplineError::ShapeMismatch {
                expected,
                found: coefficients.shape().to_vec(),
            });
        }
        let coefficients = if coefficients.is_standard_layout() {
            coefficients
        } else {
            coefficients.as_standard_layout().into_owned()
        };
        let solvers = match std::mem::replace(&mut self.stage, Stage::Constructed) {
            Stage::SetUp { solvers } => Some(solvers),
            Stage::Ready { solvers, .. } => solvers,
            Stage::Constructed => None,
        };
        self.stage = Stage::Ready {
            solvers,
            coefficients,
        };
        Ok(())
    }

    fn check_point(&self, point: &[f64]) -> SplineResult<()> {
        if point.len() != self.dim() {
            return Err(SplineError::PointDimension {
                expected: self.dim(),
                found: point.len(),
            });
        }
        Ok(())
    }

    /// Value of the spline at `point`: the coefficient tensor is contracted with the basis
    /// vector of every axis, starting from the first one.
    pub fn evaluate(&self, point: &[f64]) -> SplineResult<f64> {
        let coefficients = self.coefficients().map_err(|_| self.invalid_state("evaluate"))?;
        self.check_point(point)?;
        let begin = Instant::now();
        let vectors = self
            .bases
            .iter()
            .zip(point.iter())
            .enumerate()
            .map(|(axis, (basis, &x))| basis.basis_on_axis(x, axis))
            .collect::<SplineResult<Vec<_>>>()?;
        let basis_time = begin.elapsed();
        let value = contract_all(coefficients.view(), &vectors)?;
        debug!(
            "basis evaluated in {:?}, contraction done in {:?}",
            basis_time,
            begin.elapsed() - basis_time
        );
        Ok(value)
    }

    /// Same value as `evaluate`, but only the 4 nonzero basis functions of each axis are used and
    /// the sum runs over the 4^N coefficients they touch.
    pub fn evaluate_local(&self, point: &[f64]) -> SplineResult<f64> {
        let coefficients = self
            .coefficients()
            .map_err(|_| self.invalid_state("evaluate_local"))?;
        self.check_point(point)?;
        let windows = self
            .bases
            .iter()
            .zip(point.iter())
            .enumerate()
            .map(|(axis, (basis, &x))| basis.nonzero_on_axis(x, axis))
            .collect::<SplineResult<Vec<(usize, [f64; ORDER])>>>()?;
        sum_over_support(coefficients.view(), &windows)
    }

    /// Evaluates the spline at every row of an (r, N) array. All rows are checked before any
    /// evaluation, so the error reports the first bad row.
    pub fn evaluate_many(&self, points: ArrayView2<f64>) -> SplineResult<Vec<f64>> {
        if self.coefficients().is_err() {
            return Err(self.invalid_state("evaluate_many"));
        }
        if points.ncols() != self.dim() {
            return Err(SplineError::PointDimension {
                expected: self.dim(),
                found: points.ncols(),
            });
        }
        for row in points.rows() {
            for (axis, (basis, &x)) in self.bases.iter().zip(row.iter()).enumerate() {
                basis.locate(x, axis)?;
            }
        }
        let begin = Instant::now();
        let values = if self.config.parallel {
            (0..points.nrows())
                .into_par_iter()
                .map(|i| self.evaluate_local(&points.row(i).to_vec()))
                .collect::<SplineResult<Vec<f64>>>()?
        } else {
            points
                .rows()
                .into_iter()
                .map(|row| self.evaluate_local(&row.to_vec()))
                .collect::<SplineResult<Vec<f64>>>()?
        };
        debug!("{} points evaluated in {:?}", values.len(), begin.elapsed());
        Ok(values)
    }

    /// Table of axes: number of points, domain and number of basis functions
    pub fn axes_summary(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(["axis", "points", "min", "max", "basis functions"]);
        for (axis, basis) in self.bases.iter().enumerate() {
            let (min, max) = basis.domain();
            builder.push_record([
                axis.to_string(),
                basis.n_points().to_string(),
                min.to_string(),
                max.to_string(),
                basis.n_basis().to_string(),
            ]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

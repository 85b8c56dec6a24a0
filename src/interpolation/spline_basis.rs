//! Cubic B-spline basis over one axis with not-a-knot end conditions
use itertools::Itertools;
use nalgebra::DMatrix;

use crate::error::{SplineError, SplineResult};
use crate::interpolation::raw_array::RawArray;

/// order of the B-splines (cubic)
pub const ORDER: usize = 4;
/// smallest axis for which the two not-a-knot rows are distinct
pub const MIN_POINTS: usize = 4;

/// Basis of cubic B-splines built over one coordinate array x_0 < x_1 < ... < x_{n-1}.
/// The extended knot vector repeats both end points 4 times, so there are n + 2 basis functions and
/// t[3 + j] = x_j.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineBasis1D {
    knots: Vec<f64>,
    extended_knots: Vec<f64>,
}

impl SplineBasis1D {
    pub fn new(knots: &[f64]) -> SplineResult<SplineBasis1D> {
        Self::with_min_points(knots, MIN_POINTS)
    }

    /// Validates the coordinates: at least `min_points` of them (never less than 4), finite, strictly increasing.
    pub fn with_min_points(knots: &[f64], min_points: usize) -> SplineResult<SplineBasis1D> {
        let required = min_points.max(MIN_POINTS);
        if knots.len() < required {
            return Err(SplineError::TooFewPoints {
                required,
                provided: knots.len(),
            });
        }
        if let Some((index, &value)) = knots.iter().find_position(|x| !x.is_finite()) {
            return Err(SplineError::NonFinite { index, value });
        }
        if let Some((i, _)) = knots
            .iter()
            .tuple_windows()
            .find_position(|(a, b)| a >= b)
        {
            return Err(SplineError::NotStrictlyIncreasing { index: i + 1 });
        }

        let first = knots[0];
        let last = knots[knots.len() - 1];
        let mut extended_knots = Vec::with_capacity(knots.len() + 2 * (ORDER - 1));
        extended_knots.extend(std::iter::repeat_n(first, ORDER - 1));
        extended_knots.extend_from_slice(knots);
        extended_knots.extend(std::iter::repeat_n(last, ORDER - 1));
        Ok(SplineBasis1D {
            knots: knots.to_vec(),
            extended_knots,
        })
    }

    /// Builds the basis from a caller array that has not been checked yet
    pub fn from_raw(raw: Option<&RawArray>, min_points: usize) -> SplineResult<SplineBasis1D> {
        let raw = raw.ok_or(SplineError::NullInput)?;
        let knots = raw.to_knots()?;
        Self::with_min_points(&knots, min_points)
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn extended_knots(&self) -> &[f64] {
        &self.extended_knots
    }

    pub fn n_points(&self) -> usize {
        self.knots.len()
    }

    pub fn n_basis(&self) -> usize {
        self.knots.len() + 2
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    /// Index j of the interval [x_j, x_{j+1}) holding x; the right end point belongs to the last interval.
    /// `axis` is only used to fill the error.
    pub(crate) fn locate(&self, x: f64, axis: usize) -> SplineResult<usize> {
        let (min, max) = self.domain();
        // written this way so that NaN is rejected too
        if !(x >= min && x <= max) {
            return Err(SplineError::OutOfDomain { axis, x, min, max });
        }
        let count = self.knots.partition_point(|&k| k <= x);
        Ok((count - 1).min(self.knots.len() - 2))
    }

    /// Values of all n + 2 basis functions at x (Cox - de Boor recursion, starting from the
    /// piecewise constant indicator of the knot span).
    pub fn evaluate_basis(&self, x: f64) -> SplineResult<Vec<f64>> {
        self.basis_on_axis(x, 0)
    }

    pub(crate) fn basis_on_axis(&self, x: f64, axis: usize) -> SplineResult<Vec<f64>> {
        let j = self.locate(x, axis)?;
        Ok(self.basis_on_interval(x, j))
    }

    fn basis_on_interval(&self, x: f64, j: usize) -> Vec<f64> {
        let t = &self.extended_knots;
        let span = j + ORDER - 1;
        let mut b = vec![0.0; t.len() - 1];
        b[span] = 1.0;
        for d in 0..ORDER - 1 {
            let mut next = vec![0.0; b.len() - 1];
            // only B_{span-d-1..=span, d+1} can be nonzero
            for i in span - d - 1..=span {
                let mut value = 0.0;
                let left = t[i + d + 1] - t[i];
                if left != 0.0 && b[i] != 0.0 {
                    value += (x - t[i]) / left * b[i];
                }
                let right = t[i + d + 2] - t[i + 1];
                if right != 0.0 && b[i + 1] != 0.0 {
                    value += (t[i + d + 2] - x) / right * b[i + 1];
                }
                next[i] = value;
            }
            b = next;
        }
        b
    }

    /// Third derivatives of all n + 2 basis functions at x. For cubic splines they are
    /// constant inside each knot interval.
    pub fn evaluate_third_derivative(&self, x: f64) -> SplineResult<Vec<f64>> {
        let j = self.locate(x, 0)?;
        Ok(self.third_derivative_on_interval(j))
    }

    fn third_derivative_on_interval(&self, j: usize) -> Vec<f64> {
        let t = &self.extended_knots;
        let span = j + ORDER - 1;
        let mut dd = vec![0.0; t.len() - 1];
        dd[span] = 1.0;
        for d in 0..ORDER - 1 {
            let mut next = vec![0.0; dd.len() - 1];
            let factor = (d + 1) as f64;
            for i in span - d - 1..=span {
                let mut value = 0.0;
                let left = t[i + d + 1] - t[i];
                if left != 0.0 {
                    value += dd[i] / left;
                }
                let right = t[i + d + 2] - t[i + 1];
                if right != 0.0 {
                    value -= dd[i + 1] / right;
                }
                next[i] = factor * value;
            }
            dd = next;
        }
        dd
    }

    /// The 4 basis functions that do not vanish at x: returns the index of the first of them
    /// and their values. B_{first..first+4} are computed with the triangular de Boor scheme.
    pub fn nonzero_basis(&self, x: f64) -> SplineResult<(usize, [f64; ORDER])> {
        self.nonzero_on_axis(x, 0)
    }

    pub(crate) fn nonzero_on_axis(&self, x: f64, axis: usize) -> SplineResult<(usize, [f64; ORDER])> {
        let j = self.locate(x, axis)?;
        Ok((j, self.nonzero_on_interval(x, j)))
    }

    fn nonzero_on_interval(&self, x: f64, j: usize) -> [f64; ORDER] {
        let t = &self.extended_knots;
        let span = j + ORDER - 1;
        let mut n = [0.0; ORDER];
        let mut left = [0.0; ORDER];
        let mut right = [0.0; ORDER];
        n[0] = 1.0;
        for k in 1..ORDER {
            left[k] = x - t[span + 1 - k];
            right[k] = t[span + k] - x;
            let mut saved = 0.0;
            for r in 0..k {
                // the sum is a knot distance of at least x_{j+1} - x_j > 0
                let temp = n[r] / (right[r + 1] + left[k - r]);
                n[r] = saved + right[r + 1] * temp;
                saved = left[k - r] * temp;
            }
            n[k] = saved;
        }
        n
    }

    /// Square matrix of size n + 2 mapping coefficients to
    /// [jump of S''' at x_1, S(x_0), ..., S(x_{n-1}), jump of S''' at x_{n-2}].
    /// Returned together with the extended knots.
    pub fn assemble_collocation_matrix(&self) -> (DMatrix<f64>, Vec<f64>) {
        let n = self.n_points();
        let m = self.n_basis();
        let mut matrix = DMatrix::zeros(m, m);

        let not_a_knot = |left: usize, right: usize| -> Vec<f64> {
            let dl = self.third_derivative_on_interval(left);
            let dr = self.third_derivative_on_interval(right);
            dl.iter().zip(dr.iter()).map(|(a, b)| a - b).collect()
        };

        let first = not_a_knot(0, 1);
        for (col, value) in first.iter().enumerate() {
            matrix[(0, col)] = *value;
        }
        for (k, &x) in self.knots.iter().enumerate() {
            let j = k.min(n - 2);
            let row = self.basis_on_interval(x, j);
            for (col, value) in row.iter().enumerate() {
                matrix[(k + 1, col)] = *value;
            }
        }
        let last = not_a_knot(n - 3, n - 2);
        for (col, value) in last.iter().enumerate() {
            matrix[(n + 1, col)] = *value;
        }
        (matrix, self.extended_knots.clone())
    }

    /// Collocation matrix with both not-a-knot rows divided by their largest magnitude.
    /// These rows grow like 1/h^3 of the boundary spans while the interpolation rows sum to one.
    /// Their right-hand side is zero, so the coefficients solving the system are the same.
    pub fn equilibrated_collocation_matrix(&self) -> DMatrix<f64> {
        let (mut matrix, _) = self.assemble_collocation_matrix();
        let last = matrix.nrows() - 1;
        for row in [0, last] {
            let scale = matrix.row(row).amax();
            if scale > 0.0 {
                matrix.row_mut(row).unscale_mut(scale);
            }
        }
        matrix
    }
}

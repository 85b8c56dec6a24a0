//! Kernels over tensors whose rank is known only at run time.
//!
//! The spline system of an N-dimensional grid is the Kronecker product of the per-axis collocation
//! matrices, so it is never assembled: it is solved axis after axis, and the spline is evaluated by
//! contracting the coefficients with one basis vector per axis.
use log::debug;
use ndarray::{ArrayD, ArrayViewD, ArrayViewMut2, Axis, IxDyn, s};
use std::time::Instant;

use crate::error::{SplineError, SplineResult};
use crate::interpolation::spline_basis::ORDER;
use crate::somelinalg::LUsolver::MatrixFactorization;

/// Solves the separable collocation system for a grid-shaped tensor of values.
///
/// Step k takes the current leading axis (extent n), pads each lane along it to [0, lane, 0]
/// (the rows of the not-a-knot conditions), solves all lanes with the factorized matrix of that axis and
/// moves the axis to the back with its new extent n + 2. After one step per axis the original axis order
/// is restored and every extent has grown by two.
pub fn solve_along_axes(
    values: ArrayViewD<f64>,
    solvers: &[MatrixFactorization],
    parallel: bool,
) -> SplineResult<ArrayD<f64>> {
    if values.ndim() != solvers.len() {
        return Err(SplineError::RankMismatch {
            expected: solvers.len(),
            found: values.ndim(),
        });
    }
    let mut current: ArrayD<f64> = values.as_standard_layout().into_owned();
    for (axis, solver) in solvers.iter().enumerate() {
        let begin = Instant::now();
        let shape = current.shape().to_vec();
        let n = shape[0];
        let m = solver.dim();
        if m != n + 2 {
            return Err(SplineError::ShapeMismatch {
                expected: vec![m - 2],
                found: vec![n],
            });
        }
        let lanes_count = current.len() / n;
        let lanes = current
            .into_shape_with_order((n, lanes_count))
            .map_err(|_| SplineError::ShapeMismatch {
                expected: vec![n, lanes_count],
                found: shape.clone(),
            })?;

        // (lanes, m) block, every row is one right-hand side
        let mut block = vec![0.0; lanes_count * m];
        {
            let mut rhs = ArrayViewMut2::from_shape((lanes_count, m), &mut block).map_err(|_| {
                SplineError::ShapeMismatch {
                    expected: vec![lanes_count, m],
                    found: vec![lanes_count * m],
                }
            })?;
            rhs.slice_mut(s![.., 1..=n]).assign(&lanes.t());
        }
        if !solver.solve_batches(&mut block, parallel) {
            return Err(SplineError::SingularMatrix { axis });
        }

        let mut rotated: Vec<usize> = shape[1..].to_vec();
        rotated.push(m);
        current = ArrayD::from_shape_vec(IxDyn(&rotated), block).map_err(|_| {
            SplineError::ShapeMismatch {
                expected: rotated.clone(),
                found: vec![lanes_count * m],
            }
        })?;
        debug!(
            "axis {}: {} systems of size {} solved in {:?}",
            axis,
            lanes_count,
            m,
            begin.elapsed()
        );
    }
    Ok(current)
}

/// Contracts the leading axis of `tensor` with the vector `b`: the result has rank one less.
/// Zero weights are skipped, for a B-spline basis vector only 4 of them are nonzero.
pub fn contract_leading_axis(tensor: ArrayViewD<f64>, b: &[f64]) -> ArrayD<f64> {
    let mut out = ArrayD::zeros(IxDyn(&tensor.shape()[1..]));
    for (j, &w) in b.iter().enumerate() {
        if w != 0.0 {
            out.scaled_add(w, &tensor.index_axis(Axis(0), j));
        }
    }
    out
}

/// Full contraction of a rank-N tensor with N vectors, one axis at a time.
pub fn contract_all(tensor: ArrayViewD<f64>, vectors: &[Vec<f64>]) -> SplineResult<f64> {
    if tensor.ndim() != vectors.len() {
        return Err(SplineError::RankMismatch {
            expected: tensor.ndim(),
            found: vectors.len(),
        });
    }
    for (b, &extent) in vectors.iter().zip(tensor.shape().iter()) {
        if b.len() != extent {
            return Err(SplineError::ShapeMismatch {
                expected: vec![extent],
                found: vec![b.len()],
            });
        }
    }
    let mut vectors = vectors.iter();
    let mut current = match vectors.next() {
        Some(b) => contract_leading_axis(tensor, b),
        None => return Ok(tensor.first().copied().unwrap_or_default()),
    };
    for b in vectors {
        current = contract_leading_axis(current.view(), b);
    }
    Ok(current.first().copied().unwrap_or_default())
}

/// Sum over the 4^N coefficients touched by the nonzero basis functions of a point.
///
/// `windows[k]` holds the first nonzero basis index on axis k and the 4 basis values. The multi-index
/// runs like an odometer (last axis fastest), and the partial products of weights are kept for every
/// axis, so advancing digit k only recomputes levels k..N.
pub fn sum_over_support(tensor: ArrayViewD<f64>, windows: &[(usize, [f64; ORDER])]) -> SplineResult<f64> {
    let n = windows.len();
    if tensor.ndim() != n {
        return Err(SplineError::RankMismatch {
            expected: tensor.ndim(),
            found: n,
        });
    }
    for ((first, _), &extent) in windows.iter().zip(tensor.shape().iter()) {
        if first + ORDER > extent {
            return Err(SplineError::ShapeMismatch {
                expected: vec![extent],
                found: vec![first + ORDER],
            });
        }
    }
    if n == 0 {
        return Ok(tensor.first().copied().unwrap_or_default());
    }
    let mut digits = vec![0usize; n];
    let mut index: Vec<usize> = windows.iter().map(|(first, _)| *first).collect();
    let mut products = vec![0.0; n];
    let mut sum = 0.0;
    let mut changed = 0;
    loop {
        for k in changed..n {
            let prev = if k == 0 { 1.0 } else { products[k - 1] };
            products[k] = prev * windows[k].1[digits[k]];
        }
        sum += products[n - 1] * tensor[index.as_slice()];

        let mut k = n;
        loop {
            if k == 0 {
                return Ok(sum);
            }
            k -= 1;
            digits[k] += 1;
            if digits[k] < ORDER {
                index[k] += 1;
                break;
            }
            digits[k] = 0;
            index[k] = windows[k].0;
        }
        changed = k;
    }
}

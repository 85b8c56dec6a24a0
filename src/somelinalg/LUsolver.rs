use log::debug;
use nalgebra::{DMatrix, Dyn, LU};
use rayon::prelude::*;

use crate::somelinalg::lu_band::BandLU;

/// Which direct factorization is used for a (small, nearly banded) square matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverMethod {
    /// nalgebra LU with partial pivoting
    #[default]
    Dense,
    /// band LU, see `BandLU`
    Banded,
}

/// A matrix factorized once and reused for any number of right-hand sides
#[derive(Debug, Clone)]
pub enum MatrixFactorization {
    Dense { lu: LU<f64, Dyn, Dyn>, n: usize },
    Banded(BandLU),
}

impl MatrixFactorization {
    /// Returns None if the matrix is singular.
    pub fn new(matrix: &DMatrix<f64>, method: SolverMethod) -> Option<MatrixFactorization> {
        assert!(matrix.is_square(), "matrix must be square");
        match method {
            SolverMethod::Dense => {
                let lu = matrix.clone().lu();
                if lu.is_invertible() {
                    Some(MatrixFactorization::Dense {
                        lu,
                        n: matrix.nrows(),
                    })
                } else {
                    None
                }
            }
            SolverMethod::Banded => BandLU::new(matrix, None).map(MatrixFactorization::Banded),
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            MatrixFactorization::Dense { n, .. } => *n,
            MatrixFactorization::Banded(lu) => lu.nrows(),
        }
    }

    /// Solves A x = b for every column of the column-major block `chunk` (each column has `dim` elements)
    fn solve_chunk(&self, chunk: &mut [f64], n: usize) -> bool {
        match self {
            MatrixFactorization::Dense { lu, .. } => {
                let ncols = chunk.len() / n;
                let mut rhs = DMatrix::from_column_slice(n, ncols, chunk);
                if !lu.solve_mut(&mut rhs) {
                    return false;
                }
                chunk.copy_from_slice(rhs.as_slice());
                true
            }
            MatrixFactorization::Banded(lu) => {
                chunk.chunks_mut(n).for_each(|b| lu.solve_in_place(b));
                true
            }
        }
    }

    pub fn solve_in_place(&self, b: &mut [f64]) -> bool {
        let n = self.dim();
        assert_eq!(b.len(), n, "right-hand side has wrong length");
        self.solve_chunk(b, n)
    }

    /// Solves the system for a batch of right-hand sides stored one after another in `batches`
    /// (every consecutive `dim` values form one right-hand side). Right-hand sides are independent,
    /// so with `parallel` the batch is split between rayon workers, each writing its own disjoint block.
    pub fn solve_batches(&self, batches: &mut [f64], parallel: bool) -> bool {
        let n = self.dim();
        assert_eq!(
            batches.len() % n,
            0,
            "batch length must be a multiple of the matrix dimension"
        );
        let n_rhs = batches.len() / n;
        if n_rhs == 0 {
            return true;
        }
        if parallel && n_rhs > 1 {
            let tasks = rayon::current_num_threads() * 4;
            let cols_per_task = std::cmp::max(1, n_rhs.div_ceil(tasks));
            debug!(
                "solving {} right-hand sides of size {} in blocks of {}",
                n_rhs, n, cols_per_task
            );
            batches
                .par_chunks_mut(cols_per_task * n)
                .all(|chunk| self.solve_chunk(chunk, n))
        } else {
            self.solve_chunk(batches, n)
        }
    }
}

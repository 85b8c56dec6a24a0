#![allow(non_snake_case)]
use log::debug;
use nalgebra::DMatrix;

/// LU decomposition with partial (row) pivoting for the case of a banded matrix.
/// Elimination touches only the band: kl subdiagonals and, because of row swaps, kl + ku superdiagonals.
/// Cost is O(N * kl * (kl + ku)) instead of O(N^3) for the dense decomposition.
///
/// The factors are stored in one dense matrix: strictly lower part holds the multipliers of the elimination steps,
/// upper part holds U. Row interchanges are applied to the U part only and recorded in `ipiv`, so the multipliers of
/// step k stay in rows k+1..k+kl and the forward pass keeps the band.
#[derive(Debug, Clone)]
pub struct BandLU {
    lu: DMatrix<f64>,
    ipiv: Vec<usize>,
    kl: usize,
    ku: usize,
}

impl BandLU {
    /// Factorizes `matrix`. If `bandwidth` is None the bandwidths are found by scanning the matrix.
    /// Returns None when a zero pivot is met, i.e. the matrix is singular.
    pub fn new(matrix: &DMatrix<f64>, bandwidth: Option<(usize, usize)>) -> Option<BandLU> {
        assert!(matrix.is_square(), "band LU: matrix must be square");
        let (kl, ku) = bandwidth.unwrap_or_else(|| Self::find_bandwidths(matrix));
        let n = matrix.nrows();
        debug!("band LU of {}x{} matrix, kl: {}, ku: {}", n, n, kl, ku);

        let mut lu = matrix.clone();
        let mut ipiv: Vec<usize> = (0..n).collect();
        for k in 0..n {
            let lower_border = std::cmp::min(n, k + kl + 1);
            // pivot: the largest element of the current column inside the band
            let piv = lu.view_range(k..lower_border, k).icamax() + k;
            let diag = lu[(piv, k)];
            if diag == 0.0 {
                return None;
            }
            let right_border = std::cmp::min(n, k + kl + ku + 1);
            ipiv[k] = piv;
            if piv != k {
                for j in k..right_border {
                    lu.swap((k, j), (piv, j));
                }
            }
            let inv_diag = 1.0 / diag;
            for i in k + 1..lower_border {
                let l_ik = lu[(i, k)] * inv_diag;
                lu[(i, k)] = l_ik;
                if l_ik == 0.0 {
                    continue;
                }
                for j in k + 1..right_border {
                    lu[(i, j)] -= l_ik * lu[(k, j)];
                }
            }
        }
        Some(BandLU { lu, ipiv, kl, ku })
    }

    pub fn nrows(&self) -> usize {
        self.lu.nrows()
    }

    /// Solves A x = b in place, b is overwritten by x.
    pub fn solve_in_place(&self, b: &mut [f64]) {
        let n = self.nrows();
        assert_eq!(n, b.len(), "band LU solve: dimension mismatch");
        // forward pass: replay interchanges and elimination steps on b
        for k in 0..n {
            let piv = self.ipiv[k];
            if piv != k {
                b.swap(k, piv);
            }
            let bk = b[k];
            if bk == 0.0 {
                continue;
            }
            let lower_border = std::cmp::min(n, k + self.kl + 1);
            for i in k + 1..lower_border {
                b[i] -= self.lu[(i, k)] * bk;
            }
        }
        // backward substitution U x = y
        let width = self.kl + self.ku + 1;
        for i in (0..n).rev() {
            let last = std::cmp::min(n, i + width);
            let mut s = b[i];
            for j in i + 1..last {
                s -= self.lu[(i, j)] * b[j];
            }
            b[i] = s / self.lu[(i, i)];
        }
    }

    /// Number of subdiagonals (kl) and superdiagonals (ku) holding nonzero elements.
    pub fn find_bandwidths(A: &DMatrix<f64>) -> (usize, usize) {
        let mut kl = 0;
        let mut ku = 0;
        for j in 0..A.ncols() {
            for i in 0..A.nrows() {
                if A[(i, j)] != 0.0 {
                    if j > i {
                        ku = std::cmp::max(ku, j - i);
                    } else if i > j {
                        kl = std::cmp::max(kl, i - j);
                    }
                }
            }
        }
        (kl, ku)
    }
}

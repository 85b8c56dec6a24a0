#![allow(non_snake_case)]
use nalgebra::DMatrix;

/// The condition number of a matrix is a measure of the sensitivity of its solution to small perturbations in the input data.
/// In 2-norm it is the ratio of the largest singular value of the matrix to the smallest one.
pub fn condition_number(A: &DMatrix<f64>) -> f64 {
    let singular_values = A.singular_values();
    let max_sigma = singular_values.max();
    let min_sigma = singular_values.min();
    if min_sigma == 0.0 {
        f64::INFINITY
    } else {
        max_sigma / min_sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// famous example of ill-conditioned matrix
    fn hilbert_matrix(n: usize) -> DMatrix<f64> {
        DMatrix::from_fn(n, n, |i, j| 1.0 / (i as f64 + j as f64 + 1.0))
    }

    #[test]
    fn test_condition_number_of_diagonal() {
        let A = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![4.0, 2.0, 0.5]));
        assert_relative_eq!(condition_number(&A), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_condition_number_of_nearly_singular() {
        let A = DMatrix::from_vec(2, 2, vec![1.0, 1.0, 1.00001, 1.0]);
        assert!(condition_number(&A) > 1e5);
        assert_relative_eq!(condition_number(&DMatrix::identity(3, 3)), 1.0, epsilon = 1e-12);
        assert_eq!(condition_number(&DMatrix::zeros(2, 2)), f64::INFINITY);
    }

    #[test]
    fn test_condition_number_of_hilbert() {
        assert!(condition_number(&hilbert_matrix(6)) > 1e5);
    }
}

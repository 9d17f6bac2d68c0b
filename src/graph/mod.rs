use log::debug;
use ndarray::{Array2, ArrayView2};

use crate::dense::{allocate, multiply};
use crate::SymNmfError;

fn ensure_square(op: &'static str, matrix: ArrayView2<f64>) -> anyhow::Result<usize> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(SymNmfError::DimensionMismatch {
            op,
            left: (rows, cols),
            right: (cols, rows),
        }
        .into());
    }
    Ok(rows)
}

/// Diagonal degree matrix: `D[i][i]` is the sum of row `i` of the similarity matrix.
pub fn degree(similarity: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    let n = ensure_square("degree", similarity)?;
    let mut degree = allocate(n, n)?;

    for (i, row) in similarity.rows().into_iter().enumerate() {
        degree[[i, i]] = row.sum();
    }

    Ok(degree)
}

/// Symmetric normalization `W = D^(-1/2) A D^(-1/2)`.
///
/// A point with zero degree gets a zero inverse root, so its row and column of `W` are zero.
pub fn normalized(
    similarity: ArrayView2<f64>,
    degree: ArrayView2<f64>,
) -> anyhow::Result<Array2<f64>> {
    let n = ensure_square("normalized", similarity)?;
    if degree.dim() != similarity.dim() {
        return Err(SymNmfError::DimensionMismatch {
            op: "normalized",
            left: similarity.dim(),
            right: degree.dim(),
        }
        .into());
    }

    let mut inv_sqrt_degree = allocate(n, n)?;
    let mut isolated = 0usize;
    for i in 0..n {
        let d = degree[[i, i]];
        if d > 0.0 {
            inv_sqrt_degree[[i, i]] = 1.0 / d.sqrt();
        } else {
            isolated += 1;
        }
    }
    if isolated > 0 {
        debug!("{} point(s) have zero degree and normalize to zero", isolated);
    }

    let left = multiply(inv_sqrt_degree.view(), similarity)?;
    multiply(left.view(), inv_sqrt_degree.view())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::similarity;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_degree_two_nodes() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let d = degree(a.view()).unwrap();
        assert_eq!(d, array![[1.0, 0.0], [0.0, 1.0]]);

        let w = normalized(a.view(), d.view()).unwrap();
        assert_eq!(w, array![[0.0, 1.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_degree_is_diagonal_row_sum() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            let n = rng.random_range(1..10);
            let points = Array2::from_shape_fn((n, 3), |_| rng.random_range(-2.0..2.0));
            let a = similarity(points.view()).unwrap();
            let d = degree(a.view()).unwrap();

            for i in 0..n {
                assert_relative_eq!(d[[i, i]], a.row(i).sum());
                for j in 0..n {
                    if i != j {
                        assert_eq!(d[[i, j]], 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_normalized_symmetric() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        for _ in 0..20 {
            let n = rng.random_range(2..10);
            let points = Array2::from_shape_fn((n, 2), |_| rng.random_range(-2.0..2.0));
            let a = similarity(points.view()).unwrap();
            let d = degree(a.view()).unwrap();
            let w = normalized(a.view(), d.view()).unwrap();

            for i in 0..n {
                for j in 0..n {
                    assert_relative_eq!(w[[i, j]], w[[j, i]], max_relative = 1e-12);
                    let expected = a[[i, j]] / (d[[i, i]] * d[[j, j]]).sqrt();
                    assert_relative_eq!(w[[i, j]], expected, max_relative = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_normalized_zero_degree_row_and_column() {
        let a = array![[0.0, 0.5, 0.0], [0.5, 0.0, 0.0], [0.0, 0.0, 0.0]];
        let d = degree(a.view()).unwrap();
        assert_eq!(d[[2, 2]], 0.0);

        let w = normalized(a.view(), d.view()).unwrap();
        for k in 0..3 {
            assert_eq!(w[[2, k]], 0.0);
            assert_eq!(w[[k, 2]], 0.0);
        }
        assert!(w.iter().all(|v| v.is_finite()));
        assert_relative_eq!(w[[0, 1]], 1.0);
    }

    #[test]
    fn test_normalized_far_apart_points() {
        // exp(-5000) underflows to zero, leaving both points isolated.
        let points = array![[0.0], [100.0]];
        let a = similarity(points.view()).unwrap();
        let d = degree(a.view()).unwrap();
        let w = normalized(a.view(), d.view()).unwrap();
        assert!(w.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_shape_checks() {
        let rect = array![[0.0, 1.0, 2.0], [1.0, 0.0, 3.0]];
        assert!(degree(rect.view()).is_err());

        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let d = array![[1.0]];
        let err = normalized(a.view(), d.view()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SymNmfError>(),
            Some(SymNmfError::DimensionMismatch { .. })
        ));
    }
}

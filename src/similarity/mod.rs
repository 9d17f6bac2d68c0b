use anyhow::anyhow;
use log::debug;
use ndarray::{Array2, ArrayView1, ArrayView2};
use num_traits::{Float, ToPrimitive};

use crate::dense::{allocate, squared_distance};

pub trait SimilarityMeasure {
    fn calculate<T>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> anyhow::Result<f64>
    where
        T: Float + ToPrimitive;
}

/// Gaussian (RBF) kernel on squared Euclidean distance: `exp(-|a - b|^2 / (2 * bandwidth^2))`.
///
/// Distances are not scaled by dimension.
pub struct GaussianSimilarity {
    bandwidth: f64,
}

impl GaussianSimilarity {
    pub fn new(bandwidth: f64) -> Self {
        Self { bandwidth }
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

impl Default for GaussianSimilarity {
    fn default() -> Self {
        Self { bandwidth: 1.0 }
    }
}

impl SimilarityMeasure for GaussianSimilarity {
    fn calculate<T>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> anyhow::Result<f64>
    where
        T: Float + ToPrimitive,
    {
        let dist_sq = squared_distance(a, b)?
            .to_f64()
            .ok_or_else(|| anyhow!("Numeric conversion failed"))?;
        let scale = 2.0 * self.bandwidth * self.bandwidth;
        Ok((-dist_sq / scale).exp())
    }
}

/// Pairwise similarity matrix of the rows of `points` under `measure`.
///
/// The diagonal is left at zero and the lower triangle mirrors the upper one.
pub fn similarity_matrix<T, S>(points: ArrayView2<T>, measure: &S) -> anyhow::Result<Array2<f64>>
where
    T: Float + ToPrimitive,
    S: SimilarityMeasure,
{
    let n_samples = points.nrows();
    let mut affinity = allocate(n_samples, n_samples)?;

    for i in 0..n_samples {
        let row_i = points.row(i);
        for j in (i + 1)..n_samples {
            let sim = measure.calculate(row_i, points.row(j))?;
            affinity[[i, j]] = sim;
            affinity[[j, i]] = sim;
        }
    }

    debug!(
        "Built {}x{} similarity matrix from {}-dimensional points",
        n_samples,
        n_samples,
        points.ncols()
    );
    Ok(affinity)
}

/// Unit-bandwidth Gaussian similarity matrix `A[i][j] = exp(-|x_i - x_j|^2 / 2)`, `A[i][i] = 0`.
pub fn similarity(points: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    similarity_matrix(points, &GaussianSimilarity::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_gaussian_default_bandwidth() {
        let kernel = GaussianSimilarity::default();
        let a = array![0.0, 0.0];
        let b = array![1.0, 1.0];
        assert_relative_eq!(kernel.calculate(a.view(), b.view()).unwrap(), (-1.0f64).exp());
        assert_relative_eq!(kernel.calculate(a.view(), a.view()).unwrap(), 1.0);
    }

    #[test]
    fn test_gaussian_wider_bandwidth() {
        let kernel = GaussianSimilarity::new(2.0);
        let a = array![0.0];
        let b = array![2.0];
        // 4 / (2 * 4)
        assert_relative_eq!(kernel.calculate(a.view(), b.view()).unwrap(), (-0.5f64).exp());
    }

    #[test]
    fn test_similarity_known_points() {
        let points = array![[0.0, 0.0], [0.0, 0.0], [10.0, 10.0]];
        let a = similarity(points.view()).unwrap();

        assert_eq!(a.dim(), (3, 3));
        assert_eq!(a[[0, 1]], 1.0);
        assert_relative_eq!(a[[0, 2]], (-100.0f64).exp());
        assert_relative_eq!(a[[1, 2]], (-100.0f64).exp());
        for i in 0..3 {
            assert_eq!(a[[i, i]], 0.0);
        }
    }

    #[test]
    fn test_similarity_single_point() {
        let points = array![[3.0, 4.0, 5.0]];
        let a = similarity(points.view()).unwrap();
        assert_eq!(a, array![[0.0]]);
    }

    #[test]
    fn test_similarity_symmetric_with_zero_diagonal() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let n = rng.random_range(1..12);
            let d = rng.random_range(1..5);
            let points = Array2::from_shape_fn((n, d), |_| rng.random_range(-3.0..3.0));
            let a = similarity(points.view()).unwrap();

            for i in 0..n {
                assert_eq!(a[[i, i]], 0.0);
                for j in 0..n {
                    assert_eq!(a[[i, j]], a[[j, i]]);
                    if i != j {
                        assert!(a[[i, j]] > 0.0 && a[[i, j]] <= 1.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_similarity_f32_points() {
        let points = array![[0.0f32], [1.0f32]];
        let a = similarity_matrix(points.view(), &GaussianSimilarity::default()).unwrap();
        assert_relative_eq!(a[[0, 1]], (-0.5f64).exp());
    }
}

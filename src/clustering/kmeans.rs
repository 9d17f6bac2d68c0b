use log::debug;
use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::dense::{allocate, squared_distance};
use crate::SymNmfError;

pub const KMEANS_MAX_ITER: usize = 300;
/// Rounds stop once the summed centroid movement drops below this.
pub const KMEANS_TOLERANCE: f64 = 1e-3;

/// Lloyd's k-means seeded with the first `k` points, used as the baseline symNMF is compared to.
pub struct KMeans {
    k: usize,
    max_iter: usize,
    tolerance: f64,
}

pub struct KMeansResult {
    pub centroids: Array2<f64>,
    pub labels: Vec<usize>,
    pub iterations: usize,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        KMeans {
            k,
            max_iter: KMEANS_MAX_ITER,
            tolerance: KMEANS_TOLERANCE,
        }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn fit(&self, points: ArrayView2<f64>) -> anyhow::Result<KMeansResult> {
        let (n, d) = points.dim();
        if !(1 < self.k && self.k < n) {
            return Err(SymNmfError::InvalidArgument(format!(
                "k = {} must satisfy 1 < k < {}",
                self.k, n
            ))
            .into());
        }

        let mut centroids = allocate(self.k, d)?;
        centroids.assign(&points.slice(ndarray::s![..self.k, ..]));

        let mut sums = allocate(self.k, d)?;
        let mut counts = vec![0usize; self.k];
        let mut iterations = 0;

        while iterations < self.max_iter {
            iterations += 1;
            sums.fill(0.0);
            counts.fill(0);

            for point in points.rows() {
                let c = nearest(point, centroids.view())?;
                counts[c] += 1;
                let mut sum = sums.row_mut(c);
                sum += &point;
            }

            let mut movement = 0.0;
            for c in 0..self.k {
                if counts[c] == 0 {
                    continue;
                }
                let mut mean = sums.row(c).to_owned();
                mean /= counts[c] as f64;
                movement += squared_distance(centroids.row(c), mean.view())?.sqrt();
                centroids.row_mut(c).assign(&mean);
            }

            debug!("kmeans iteration {}: centroid movement {:.6}", iterations, movement);
            if movement < self.tolerance {
                break;
            }
        }

        let labels = points
            .rows()
            .into_iter()
            .map(|point| nearest(point, centroids.view()))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(KMeansResult {
            centroids,
            labels,
            iterations,
        })
    }
}

/// Index of the closest centroid; an earlier centroid wins ties.
fn nearest(point: ArrayView1<f64>, centroids: ArrayView2<f64>) -> anyhow::Result<usize> {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let dist = squared_distance(point, centroid)?;
        if dist < best_dist {
            best = c;
            best_dist = dist;
        }
    }
    Ok(best)
}

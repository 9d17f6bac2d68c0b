use std::collections::HashMap;

use ndarray::ArrayView2;

use crate::dense::squared_distance;
use crate::SymNmfError;

/// Mean silhouette coefficient of a hard clustering, using Euclidean distance.
///
/// Points alone in their cluster score 0. Needs between 2 and `n - 1` distinct labels.
pub fn silhouette_score(points: ArrayView2<f64>, labels: &[usize]) -> anyhow::Result<f64> {
    let n = points.nrows();
    if labels.len() != n {
        return Err(SymNmfError::DimensionMismatch {
            op: "silhouette_score",
            left: points.dim(),
            right: (labels.len(), 1),
        }
        .into());
    }

    let mut cluster_index: HashMap<usize, usize> = HashMap::new();
    for &label in labels {
        let next = cluster_index.len();
        cluster_index.entry(label).or_insert(next);
    }
    let n_clusters = cluster_index.len();
    if n_clusters < 2 || n_clusters + 1 > n {
        return Err(SymNmfError::InvalidArgument(format!(
            "silhouette needs 2..={} distinct labels, got {}",
            n.saturating_sub(1),
            n_clusters
        ))
        .into());
    }

    let assigned: Vec<usize> = labels.iter().map(|l| cluster_index[l]).collect();
    let mut sizes = vec![0usize; n_clusters];
    for &c in &assigned {
        sizes[c] += 1;
    }

    let mut total = 0.0;
    let mut dist_sums = vec![0.0f64; n_clusters];
    for i in 0..n {
        let own = assigned[i];
        if sizes[own] == 1 {
            continue;
        }

        dist_sums.fill(0.0);
        for j in 0..n {
            if i != j {
                dist_sums[assigned[j]] += squared_distance(points.row(i), points.row(j))?.sqrt();
            }
        }

        let a = dist_sums[own] / (sizes[own] - 1) as f64;
        let b = (0..n_clusters)
            .filter(|&c| c != own)
            .map(|c| dist_sums[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);

        let scale = a.max(b);
        if scale > 0.0 {
            total += (b - a) / scale;
        }
    }

    Ok(total / n as f64)
}

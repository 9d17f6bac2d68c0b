use anyhow::anyhow;
use ndarray::linalg::general_mat_mul;
use ndarray::{Array2, ArrayView1, ArrayView2};
use num_traits::Float;

use crate::SymNmfError;

/// Allocate a zero-filled `rows x cols` matrix.
///
/// The buffer is reserved fallibly, so an allocation the host cannot satisfy comes back as
/// [`SymNmfError::ResourceExhausted`] instead of aborting the process.
pub fn allocate(rows: usize, cols: usize) -> anyhow::Result<Array2<f64>> {
    let exhausted = || SymNmfError::ResourceExhausted { rows, cols };
    let len = rows.checked_mul(cols).ok_or_else(exhausted)?;

    let mut buffer: Vec<f64> = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| exhausted())?;
    buffer.resize(len, 0.0);

    Array2::from_shape_vec((rows, cols), buffer)
        .map_err(|e| anyhow!("Failed to shape {}x{} matrix: {}", rows, cols, e))
}

/// Fallible deep copy of `matrix`.
pub fn copy(matrix: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    let (rows, cols) = matrix.dim();
    let mut out = allocate(rows, cols)?;
    out.assign(&matrix);
    Ok(out)
}

/// Sum of squared coordinate differences between two points.
pub fn squared_distance<T: Float>(a: ArrayView1<T>, b: ArrayView1<T>) -> anyhow::Result<T> {
    if a.len() != b.len() {
        return Err(SymNmfError::DimensionMismatch {
            op: "squared_distance",
            left: (1, a.len()),
            right: (1, b.len()),
        }
        .into());
    }

    Ok(a.iter().zip(b.iter()).fold(T::zero(), |acc, (&x, &y)| {
        let diff = x - y;
        acc + diff * diff
    }))
}

/// Matrix product `a * b`. Requires `a.ncols() == b.nrows()`.
pub fn multiply(a: ArrayView2<f64>, b: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    if a.ncols() != b.nrows() {
        return Err(SymNmfError::DimensionMismatch {
            op: "multiply",
            left: a.dim(),
            right: b.dim(),
        }
        .into());
    }

    let mut product = allocate(a.nrows(), b.ncols())?;
    general_mat_mul(1.0, &a, &b, 0.0, &mut product);
    Ok(product)
}

/// Owned `cols x rows` transpose of `matrix`.
pub fn transpose(matrix: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    let (rows, cols) = matrix.dim();
    let mut transposed = allocate(cols, rows)?;
    transposed.assign(&matrix.t());
    Ok(transposed)
}

/// Squared Frobenius norm of `a - b`.
pub fn frobenius_diff_squared(a: ArrayView2<f64>, b: ArrayView2<f64>) -> anyhow::Result<f64> {
    if a.dim() != b.dim() {
        return Err(SymNmfError::DimensionMismatch {
            op: "frobenius_diff_squared",
            left: a.dim(),
            right: b.dim(),
        }
        .into());
    }

    Ok(a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum())
}

//! # Symmetric NMF
//!
//! Multiplicative-update optimizer for `min |W - H H^T|^2` subject to `H >= 0`, where `W` is
//! the `n x n` normalized similarity matrix and `H` is `n x k`. Each round applies
//!
//! ```text
//! H <- H * (1 - beta + beta * (W H) / (H H^T H))
//! ```
//!
//! cell by cell. With non-negative `W` and a non-negative start, `H` stays non-negative without
//! clamping. The loop stops once `|H_t - H_(t-1)|^2 < epsilon` or after `max_iter` rounds; both
//! outcomes return the current `H`.

use log::{debug, info};
use ndarray::{Array2, ArrayView2, Zip};
use rand::Rng;

use crate::dense::{allocate, copy, frobenius_diff_squared, multiply, transpose};
use crate::SymNmfError;

pub const MAX_ITER: usize = 300;
pub const EPSILON: f64 = 1e-4;
pub const BETA: f64 = 0.5;
/// Added to a denominator only when it is exactly zero.
pub const DIVISION_GUARD: f64 = 1e-6;

pub struct SymNmfBuilder {
    max_iter: usize,
    epsilon: f64,
    beta: f64,
    division_guard: f64,
}

impl Default for SymNmfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymNmfBuilder {
    pub fn new() -> Self {
        SymNmfBuilder {
            max_iter: MAX_ITER,
            epsilon: EPSILON,
            beta: BETA,
            division_guard: DIVISION_GUARD,
        }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn division_guard(mut self, division_guard: f64) -> Self {
        self.division_guard = division_guard;
        self
    }

    pub fn build(self) -> SymNmf {
        SymNmf {
            max_iter: self.max_iter,
            epsilon: self.epsilon,
            beta: self.beta,
            division_guard: self.division_guard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymNmf {
    max_iter: usize,
    epsilon: f64,
    beta: f64,
    division_guard: f64,
}

impl Default for SymNmf {
    fn default() -> Self {
        SymNmfBuilder::new().build()
    }
}

/// Final factor plus how the loop ended. Running out of iterations is not an error.
#[derive(Debug, Clone)]
pub struct SymNmfResult {
    pub h: Array2<f64>,
    pub iterations: usize,
    pub converged: bool,
}

impl SymNmf {
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn division_guard(&self) -> f64 {
        self.division_guard
    }

    /// Run the multiplicative updates from `initial_h` against `target`.
    ///
    /// `initial_h` is copied, never mutated.
    pub fn fit(
        &self,
        initial_h: ArrayView2<f64>,
        target: ArrayView2<f64>,
    ) -> anyhow::Result<SymNmfResult> {
        check_shapes(initial_h, target)?;
        let (n, k) = initial_h.dim();

        let mut current = copy(initial_h)?;
        let mut previous = allocate(n, k)?;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {
            previous.assign(&current);
            current = self.update(current.view(), target)?;
            iterations += 1;

            let delta = frobenius_diff_squared(current.view(), previous.view())?;
            debug!("symnmf iteration {}: squared delta {:.6e}", iterations, delta);

            if delta < self.epsilon {
                converged = true;
                break;
            }
        }

        if converged {
            info!("symnmf converged after {} iterations", iterations);
        } else {
            info!("symnmf stopped after {} iterations without converging", iterations);
        }

        Ok(SymNmfResult {
            h: current,
            iterations,
            converged,
        })
    }

    /// One multiplicative update of `h`.
    pub fn update(&self, h: ArrayView2<f64>, target: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        let (n, k) = h.dim();

        let h_t = transpose(h)?;
        let hh_t = multiply(h, h_t.view())?;
        let hh_th = multiply(hh_t.view(), h)?;
        let wh = multiply(target, h)?;

        let beta = self.beta;
        let guard = self.division_guard;
        let mut next = allocate(n, k)?;
        Zip::from(&mut next)
            .and(&h)
            .and(&wh)
            .and(&hh_th)
            .for_each(|out, &cur, &num, &den| {
                let den = if den != 0.0 { den } else { den + guard };
                *out = cur * (1.0 - beta + beta * (num / den));
            });

        Ok(next)
    }
}

fn check_shapes(h: ArrayView2<f64>, target: ArrayView2<f64>) -> anyhow::Result<()> {
    let (rows, cols) = target.dim();
    if rows != cols || h.nrows() != rows {
        return Err(SymNmfError::DimensionMismatch {
            op: "optimize",
            left: h.dim(),
            right: target.dim(),
        }
        .into());
    }
    Ok(())
}

/// Optimize `initial_h` against `target` with the default constants and return the final `H`.
pub fn optimize(initial_h: ArrayView2<f64>, target: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    Ok(SymNmf::default().fit(initial_h, target)?.h)
}

/// Squared reconstruction error `|W - H H^T|^2`.
pub fn reconstruction_error(h: ArrayView2<f64>, target: ArrayView2<f64>) -> anyhow::Result<f64> {
    let h_t = transpose(h)?;
    let hh_t = multiply(h, h_t.view())?;
    frobenius_diff_squared(target, hh_t.view())
}

/// Random starting factor with entries uniform in `[0, 2 * sqrt(mean(W) / k))`.
pub fn initialize_h<R: Rng>(
    target: ArrayView2<f64>,
    k: usize,
    rng: &mut R,
) -> anyhow::Result<Array2<f64>> {
    if k == 0 {
        return Err(SymNmfError::InvalidArgument("k must be positive".to_string()).into());
    }

    let n = target.nrows();
    let mean = target.mean().unwrap_or(0.0);
    let upper_bound = 2.0 * (mean / k as f64).sqrt();

    let mut h = allocate(n, k)?;
    if upper_bound > 0.0 {
        h.mapv_inplace(|_| rng.random::<f64>() * upper_bound);
    }
    Ok(h)
}

/// Hard cluster label per row of `h`: the column holding the row maximum, first one on ties.
pub fn assign_clusters(h: ArrayView2<f64>) -> Vec<usize> {
    h.rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            for (j, &v) in row.iter().enumerate() {
                if v > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect()
}

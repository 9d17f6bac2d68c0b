use std::fmt;
use std::str::FromStr;

use log::debug;
use ndarray::{Array2, ArrayView2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::graph::{degree, normalized};
use crate::nmf::{initialize_h, SymNmf};
use crate::similarity::similarity;
use crate::SymNmfError;

pub const DEFAULT_SEED: u64 = 1234;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Full factorization, producing the `n x k` factor `H`.
    SymNmf,
    Sym,
    Ddg,
    Norm,
}

impl FromStr for Goal {
    type Err = SymNmfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "symnmf" => Ok(Goal::SymNmf),
            "sym" => Ok(Goal::Sym),
            "ddg" => Ok(Goal::Ddg),
            "norm" => Ok(Goal::Norm),
            other => Err(SymNmfError::InvalidArgument(format!("unknown goal '{}'", other))),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Goal::SymNmf => "symnmf",
            Goal::Sym => "sym",
            Goal::Ddg => "ddg",
            Goal::Norm => "norm",
        };
        f.write_str(name)
    }
}

/// Normalized similarity matrix `W` straight from the points.
pub fn normalized_similarity(points: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    let a = similarity(points)?;
    let d = degree(a.view())?;
    normalized(a.view(), d.view())
}

/// Runs one goal end to end over a point set.
pub struct Pipeline {
    nmf: SymNmf,
    k: Option<usize>,
    seed: u64,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(SymNmf::default())
    }
}

impl Pipeline {
    pub fn new(nmf: SymNmf) -> Self {
        Pipeline {
            nmf,
            k: None,
            seed: DEFAULT_SEED,
        }
    }

    pub fn k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn evaluate(&self, goal: Goal, points: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        debug!("Evaluating goal {} on {:?} points", goal, points.dim());
        match goal {
            Goal::Sym => similarity(points),
            Goal::Ddg => {
                let a = similarity(points)?;
                degree(a.view())
            }
            Goal::Norm => normalized_similarity(points),
            Goal::SymNmf => self.factorize(points),
        }
    }

    /// Normalized similarity, seeded random start, then the optimizer. Requires `1 < k < n`.
    pub fn factorize(&self, points: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        let n = points.nrows();
        let k = self
            .k
            .ok_or_else(|| SymNmfError::InvalidArgument("goal symnmf needs k".to_string()))?;
        if !(1 < k && k < n) {
            return Err(SymNmfError::InvalidArgument(format!(
                "k = {} must satisfy 1 < k < {}",
                k, n
            ))
            .into());
        }

        let w = normalized_similarity(points)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let initial_h = initialize_h(w.view(), k, &mut rng)?;
        Ok(self.nmf.fit(initial_h.view(), w.view())?.h)
    }
}

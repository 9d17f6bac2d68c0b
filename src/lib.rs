pub mod clustering;
pub mod dense;
pub mod graph;
pub mod io;
pub mod nmf;
pub mod pipeline;
pub mod similarity;
pub mod statistics;
mod error;

pub use error::SymNmfError;
pub use graph::{degree, normalized};
pub use nmf::{optimize, SymNmf, SymNmfBuilder, SymNmfResult};
pub use pipeline::{Goal, Pipeline};
pub use similarity::similarity;

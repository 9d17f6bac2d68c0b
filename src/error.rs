use thiserror::Error;

/// Root causes carried by the `anyhow::Error`s this crate returns.
///
/// Callers that need to tell a resource failure apart from bad input can
/// `downcast_ref::<SymNmfError>()` on the returned error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymNmfError {
    #[error("failed to allocate a {rows}x{cols} matrix")]
    ResourceExhausted { rows: usize, cols: usize },

    #[error("dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SymNmfError {
    /// True for failures caused by the host running out of memory rather than by the caller.
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, SymNmfError::ResourceExhausted { .. })
    }
}

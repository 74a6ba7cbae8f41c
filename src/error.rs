use super::*;

/// Errors returned by every public operation of the crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum McoptError {
    /// A vector or matrix had the wrong shape.
    #[error("Dimension error: {0}")]
    InvalidDimension(String),

    /// A scalar or table argument was out of its valid range.
    #[error("Input error: {0}")]
    InvalidParameter(String),

    /// A result container could not be allocated.
    #[error("Allocation error: could not reserve {0} elements")]
    AllocationFailure(usize),

    /// A track did not stop within the step bound.
    #[error("Numerical error: track did not stop within {steps} steps")]
    SimulationDivergence { steps: usize },

    /// The search was cancelled before any iteration completed.
    #[error("Search cancelled before the first iteration completed")]
    Cancelled,
}

pub type McoptResult<T> = std::result::Result<T, McoptError>;

/// Reserve room for `additional` more elements or report an allocation failure.
pub(crate) fn try_reserve<T>(buffer: &mut Vec<T>, additional: usize) -> McoptResult<()> {
    buffer.try_reserve(additional).map_err(|_| McoptError::AllocationFailure(additional))
}

//! Error types for the scheduler.

use thiserror::Error;

/// Errors constructing a scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// A step size of zero would never advance simulated time.
    #[error("Step size must be greater than zero")]
    ZeroStep,
}

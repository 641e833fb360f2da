//! Error types shared by gate construction, circuit building, and execution.

use thiserror::Error;

/// Anything that can go wrong while building or running a simulation.
///
/// Every variant is raised eagerly, at gate construction, circuit build, or
/// register allocation, never partway through amplitude evolution.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimError {
    /// A matrix or amplitude vector has the wrong size for the qubits it
    /// should cover.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    Dimension {
        /// Required number of rows/elements.
        expected: usize,
        /// Number actually supplied.
        actual: usize,
    },

    /// A gate matrix is not unitary, or a state vector does not have unit
    /// norm, beyond the crate tolerance.
    #[error("{what} fails normalization by {dev:.3e}")]
    Normalization {
        /// What was checked ("gate matrix" or "state vector").
        what: &'static str,
        /// Deviation from unitarity/unit norm.
        dev: f64,
    },

    /// A register would need more qubits than the configured ceiling allows.
    #[error("{requested} qubits requested but the limit is {limit}")]
    ResourceLimit {
        /// Qubits asked for.
        requested: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// An argument lies outside its valid domain.
    #[error("invalid parameter: {0}")]
    Parameter(String),
}

/// Alias for `Result` over [`SimError`].
pub type SimResult<T> = Result<T, SimError>;

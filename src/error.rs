//! Crate-wide error type.
//!
//! Every fallible operation returns `Result<_, StarError>`. Messages name the
//! offending parameter and value so a caller can report them as-is; embedding
//! binaries can map a failure to a process exit code with [`StarError::exit_code`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StarError {
    /// Invalid setup: unsorted boundaries, under-determined intervals, bad grids.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A value outside the physical or mathematical domain of an operation.
    #[error("domain error: {0}")]
    Domain(String),

    /// A polynomial root that must exist was not found.
    #[error("root finding failed: {0}")]
    RootFinding(String),

    /// An operation was called before the state it depends on was set.
    #[error("invalid state: {0}")]
    State(String),

    /// A linear-algebra routine could not produce a usable result.
    #[error("linear algebra failure: {0}")]
    LinearAlgebra(String),
}

impl StarError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            StarError::Configuration(_) | StarError::Domain(_) => 2,
            StarError::State(_) => 3,
            StarError::RootFinding(_) | StarError::LinearAlgebra(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context_and_codes() {
        let err = StarError::domain("z = 1.5 is outside [-1, 1]");
        assert_eq!(err.to_string(), "domain error: z = 1.5 is outside [-1, 1]");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(StarError::RootFinding("x".into()).exit_code(), 4);
    }
}

//! Error taxonomy for matrix operations
//!
//! Every fallible operation in this crate returns [`MatrixError`]. The C API maps
//! each [`ErrorKind`] onto a status code and forwards the `Display` text as the
//! error message.

/// Category of a [`MatrixError`], stable across releases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Dimension,
    Allocation,
    Arithmetic,
    Convergence,
    InvalidHandle,
    InvalidArgument,
}

/// Errors produced by storage, kernels and decompositions
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError {
    #[error("Dimension mismatch: {message}")]
    Dimension { message: String },

    #[error("Allocation failed: {message}")]
    Allocation { message: String },

    #[error("Arithmetic error: {message}")]
    Arithmetic { message: String },

    #[error("{algorithm} did not converge after {iterations} iterations")]
    Convergence {
        algorithm: &'static str,
        iterations: usize,
    },

    #[error("Invalid handle: {handle:#x}")]
    InvalidHandle { handle: u64 },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl MatrixError {
    pub fn dimension(message: impl Into<String>) -> Self {
        MatrixError::Dimension {
            message: message.into(),
        }
    }

    pub fn allocation(message: impl Into<String>) -> Self {
        MatrixError::Allocation {
            message: message.into(),
        }
    }

    pub fn arithmetic(message: impl Into<String>) -> Self {
        MatrixError::Arithmetic {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        MatrixError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shape mismatch between two operands of an elementwise operation
    pub fn shape_mismatch(op: &str, lhs: (usize, usize), rhs: (usize, usize)) -> Self {
        Self::dimension(format!(
            "{} requires equal shapes, got {}x{} and {}x{}",
            op, lhs.0, lhs.1, rhs.0, rhs.1
        ))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MatrixError::Dimension { .. } => ErrorKind::Dimension,
            MatrixError::Allocation { .. } => ErrorKind::Allocation,
            MatrixError::Arithmetic { .. } => ErrorKind::Arithmetic,
            MatrixError::Convergence { .. } => ErrorKind::Convergence,
            MatrixError::InvalidHandle { .. } => ErrorKind::InvalidHandle,
            MatrixError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatrixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(MatrixError::dimension("x").kind(), ErrorKind::Dimension);
        assert_eq!(MatrixError::allocation("x").kind(), ErrorKind::Allocation);
        assert_eq!(
            MatrixError::Convergence { algorithm: "Jacobi SVD", iterations: 3 }.kind(),
            ErrorKind::Convergence
        );
        assert_eq!(
            MatrixError::InvalidHandle { handle: 7 }.kind(),
            ErrorKind::InvalidHandle
        );
    }

    #[test]
    fn test_messages() {
        let err = MatrixError::shape_mismatch("add", (2, 3), (3, 2));
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: add requires equal shapes, got 2x3 and 3x2"
        );

        let err = MatrixError::Convergence { algorithm: "Lanczos SVD", iterations: 12 };
        assert_eq!(err.to_string(), "Lanczos SVD did not converge after 12 iterations");
    }
}

//! Buffer Errors
//!
//! Every codec operation reports failure through [`BufferError`]; none of them
//! overload the value space with sentinels.

use thiserror::Error;

/// Errors produced by [`Buffer`](crate::Buffer) operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The allocator could not satisfy a request, or it exceeded a configured limit.
    #[error("failed to allocate {requested} bytes")]
    AllocationFailure { requested: usize },

    /// A write would run past the end of the buffer.
    #[error("write of {needed} bytes overflows buffer ({remaining} bytes remaining)")]
    Overflow { needed: usize, remaining: usize },

    /// A read would consume more bytes than remain.
    #[error("read of {needed} bytes out of bounds ({remaining} bytes remaining)")]
    OutOfBounds { needed: usize, remaining: usize },

    /// A byte sequence does not fit in a 32-bit length.
    #[error("{len} bytes exceed the 32-bit length range")]
    TooLarge { len: usize },
}

/// Result type for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BufferError::Overflow {
            needed: 4,
            remaining: 3,
        };
        assert_eq!(
            err.to_string(),
            "write of 4 bytes overflows buffer (3 bytes remaining)"
        );

        let err = BufferError::OutOfBounds {
            needed: 1,
            remaining: 0,
        };
        assert_eq!(
            err.to_string(),
            "read of 1 bytes out of bounds (0 bytes remaining)"
        );

        let err = BufferError::AllocationFailure { requested: 64 };
        assert_eq!(err.to_string(), "failed to allocate 64 bytes");
    }
}

use thiserror::Error;

/// Recoverable failures reported by the containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A checked access named a position outside `[0, len)`.
    #[error("index {index} is out of range for length {len}")]
    OutOfRange { index: usize, len: usize },
    /// A raw string entry point was handed a null pointer.
    #[error("invalid argument: null string pointer")]
    InvalidArgument,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

use thiserror::Error;

use crate::rq::Representation;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates that an error in the context was detected.
    #[error("Invalid context")]
    InvalidContext,

    /// Indicates a mismatch in the representations.
    #[error("Incorrect representation: got {0:?}, expected {1:?}")]
    IncorrectRepresentation(Representation, Representation),

    /// Indicates that the modulus is invalid.
    #[error("Invalid modulus: modulus {0} should be between 2 and (1 << 62) - 1.")]
    InvalidModulus(u64),

    /// Indicates an error.
    #[error("{0}")]
    Default(String),
}

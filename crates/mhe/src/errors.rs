use thiserror::Error;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates that an error from the underlying mathematical library was
    /// encountered.
    #[error("{0}")]
    MathError(#[from] mhe_math::Error),

    /// Indicates invalid scheme parameters.
    #[error("{0}")]
    ParametersError(#[from] ParametersError),

    /// Indicates an invalid multiparty configuration.
    #[error("{0}")]
    ConfigurationError(#[from] ConfigurationError),

    /// Indicates that a protocol phase was run out of order or with the wrong
    /// set of contributions.
    #[error("{0}")]
    ProtocolStateError(#[from] ProtocolStateError),

    /// Indicates that too many values were provided.
    #[error("Too many values provided: {0} exceeds limit {1}")]
    TooManyValues(usize, usize),

    /// Indicates that too few values were provided.
    #[error("Too few values provided: {0} is below limit {1}")]
    TooFewValues(usize, usize),

    /// Indicates that an input is invalid.
    #[error("{0}")]
    UnspecifiedInput(String),

    /// Indicates a mismatch in the encodings.
    #[error("Encoding mismatch: found {0}, expected {1}")]
    EncodingMismatch(String, String),

    /// Indicates that the encoding is not supported.
    #[error("Does not support {0} encoding")]
    EncodingNotSupported(String),

    /// Indicates a default error
    #[error("{0}")]
    DefaultError(String),
}

/// Separate enum to indicate parameters-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParametersError {
    /// Indicates that the degree is invalid.
    #[error("Invalid degree: {0} is not a power of 2 larger or equal to 8")]
    InvalidDegree(usize),

    /// Indicates that the moduli sizes are invalid.
    #[error("Invalid modulus size: {0}, expected an integer between {1} and {2}")]
    InvalidModulusSize(usize, usize, usize),

    /// Indicates that a ciphertext modulus is invalid.
    #[error("Invalid modulus: {0}")]
    InvalidModulus(String),

    /// Indicates that there exists not enough primes of this size.
    #[error("Not enough primes of size {0} for polynomials of degree {1}")]
    NotEnoughPrimes(usize, usize),

    /// Indicates that the plaintext is invalid.
    #[error("{0}")]
    InvalidPlaintext(String),

    /// Indicates that the error variance is invalid.
    #[error("Invalid variance: {0}, expected an integer between 1 and 16")]
    InvalidVariance(usize),

    /// Indicates that the smudging variance is invalid.
    #[error("Invalid smudging variance: {0}")]
    InvalidSmudgingVariance(u64),

    /// Indicates that too many parameters were specified.
    #[error("{0}")]
    TooManySpecified(String),

    /// Indicates that too few parameters were specified.
    #[error("{0}")]
    TooFewSpecified(String),
}

/// Errors in the configuration of the multiparty protocols.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The threshold is outside of [1, participants].
    #[error("Invalid threshold: {threshold} is not between 1 and {participants}")]
    InvalidThreshold {
        /// The requested threshold.
        threshold: usize,
        /// The number of participants.
        participants: usize,
    },

    /// The number of participants is invalid.
    #[error("Invalid number of participants: {0}")]
    InvalidParticipantCount(usize),

    /// The public points would not be distinct modulo a ciphertext modulus.
    #[error("{participants} participants exceed the smallest ciphertext modulus {modulus}")]
    ParticipantsExceedModulus {
        /// The number of participants.
        participants: usize,
        /// The smallest ciphertext modulus.
        modulus: u64,
    },

    /// A public point appears twice.
    #[error("Duplicate public point {0}")]
    DuplicatePublicPoint(u64),

    /// The public point 0 would reveal the shared secret.
    #[error("The public point 0 is reserved for the secret")]
    ZeroPublicPoint,

    /// The participant index has no public point.
    #[error("Participant index {0} is out of range")]
    ParticipantIndexOutOfRange(usize),

    /// The public points do not admit a reconstruction.
    #[error("Degenerate set of public points")]
    DegeneratePoints,
}

/// Errors raised when a protocol phase receives the wrong contributions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolStateError {
    /// Some expected contributions have not been aggregated.
    #[error("Incomplete aggregation: missing contributions from {missing:?}")]
    IncompleteAggregation {
        /// The participants whose contributions are missing.
        missing: Vec<usize>,
    },

    /// A contribution comes from a participant outside of the expected set.
    #[error("Unexpected contribution from participant {0}")]
    UnexpectedContributor(usize),

    /// A participant contributed twice to the same aggregate.
    #[error("Participant {0} contributed twice")]
    DuplicateContribution(usize),

    /// The finalizing participant did not contribute to the aggregate.
    #[error("Participant {0} cannot finalize an aggregate it did not contribute to")]
    NonContributingFinalizer(usize),

    /// A share was delivered to the wrong public point.
    #[error("Share for public point {got} delivered to public point {expected}")]
    MisroutedShare {
        /// The public point of the recipient.
        expected: u64,
        /// The public point the share was computed for.
        got: u64,
    },

    /// The quorum differs from the one used in a previous phase.
    #[error("Quorum mismatch")]
    QuorumMismatch,

    /// The quorum is smaller than the threshold.
    #[error("Insufficient quorum: {provided} participants for a threshold of {threshold}")]
    InsufficientQuorum {
        /// The threshold of the sharing.
        threshold: usize,
        /// The number of participants in the quorum.
        provided: usize,
    },

    /// Contributions were computed against different common random
    /// polynomials.
    #[error("Contributions were computed against different common random polynomials")]
    CrpMismatch,

    /// Decryption shares were computed for different ciphertexts.
    #[error("Decryption shares were computed for different ciphertexts")]
    CiphertextMismatch,

    /// The participant index is out of range.
    #[error("Unknown participant {index}: expected an index below {participants}")]
    UnknownParticipant {
        /// The participant index.
        index: usize,
        /// The number of participants.
        participants: usize,
    },
}

#[cfg(test)]
mod tests {
    use crate::{ConfigurationError, Error, ParametersError, ProtocolStateError};

    #[test]
    fn error_strings() {
        assert_eq!(
            Error::TooManyValues(10, 5).to_string(),
            "Too many values provided: 10 exceeds limit 5"
        );
        assert_eq!(
            Error::TooFewValues(0, 1).to_string(),
            "Too few values provided: 0 is below limit 1"
        );
        assert_eq!(
            Error::from(ParametersError::InvalidDegree(7)).to_string(),
            "Invalid degree: 7 is not a power of 2 larger or equal to 8"
        );
        assert_eq!(
            Error::from(ConfigurationError::InvalidThreshold {
                threshold: 0,
                participants: 3
            })
            .to_string(),
            "Invalid threshold: 0 is not between 1 and 3"
        );
        assert_eq!(
            Error::from(ProtocolStateError::IncompleteAggregation {
                missing: vec![1, 4]
            })
            .to_string(),
            "Incomplete aggregation: missing contributions from [1, 4]"
        );
        assert_eq!(
            Error::from(ProtocolStateError::InsufficientQuorum {
                threshold: 3,
                provided: 2
            })
            .to_string(),
            "Insufficient quorum: 2 participants for a threshold of 3"
        );
        assert_eq!(
            Error::from(mhe_math::Error::InvalidContext).to_string(),
            "Invalid context"
        );
    }
}

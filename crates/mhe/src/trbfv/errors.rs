//! Shorthands for the errors raised by the threshold layer.

use crate::{ConfigurationError, Error, ProtocolStateError};

impl Error {
    /// Create an invalid threshold error.
    pub(crate) fn invalid_threshold(threshold: usize, participants: usize) -> Self {
        ConfigurationError::InvalidThreshold {
            threshold,
            participants,
        }
        .into()
    }

    /// Create an insufficient quorum error.
    pub(crate) fn insufficient_quorum(provided: usize, threshold: usize) -> Self {
        ProtocolStateError::InsufficientQuorum {
            threshold,
            provided,
        }
        .into()
    }

    /// Create an unknown participant error.
    pub(crate) fn unknown_participant(index: usize, participants: usize) -> Self {
        ProtocolStateError::UnknownParticipant {
            index,
            participants,
        }
        .into()
    }
}

//! Configuration of the threshold sharing layer: public points, the t-of-N
//! configuration and quorum descriptors.

use std::collections::BTreeSet;
use std::fmt::Display;

use crate::bfv::BfvParameters;
use crate::{ConfigurationError, Error, Result};

/// The public evaluation point of a participant's Shamir share.
///
/// Participant `i` evaluates at `i + 1`; the point 0 is reserved for the
/// shared secret itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShamirPublicPoint(u64);

impl ShamirPublicPoint {
    /// The point of participant `index`.
    pub fn for_participant(index: usize) -> Result<Self> {
        u64::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(1))
            .map(Self)
            .ok_or_else(|| ConfigurationError::ParticipantIndexOutOfRange(index).into())
    }

    /// A point given by its value. Returns an error for 0.
    pub fn new(x: u64) -> Result<Self> {
        if x == 0 {
            return Err(ConfigurationError::ZeroPublicPoint.into());
        }
        Ok(Self(x))
    }

    /// The value of the point.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The participant owning the point.
    pub const fn participant(&self) -> usize {
        (self.0 - 1) as usize
    }
}

impl Display for ShamirPublicPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x={}", self.0)
    }
}

/// Validates a t-of-N configuration.
pub fn validate_threshold_config(participants: usize, threshold: usize) -> Result<()> {
    if participants == 0 {
        return Err(ConfigurationError::InvalidParticipantCount(participants).into());
    }
    if threshold == 0 || threshold > participants {
        return Err(Error::invalid_threshold(threshold, participants));
    }
    Ok(())
}

/// A validated t-of-N configuration, bound to the BFV parameters whose ring
/// the shares live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    participants: usize,
    threshold: usize,
}

impl ThresholdConfig {
    /// Create a configuration where any `threshold` out of `participants`
    /// participants can decrypt.
    ///
    /// The public points 1..=N must be distinct and invertible modulo every
    /// ciphertext modulus, so N must stay below the smallest of them.
    pub fn new(participants: usize, threshold: usize, par: &BfvParameters) -> Result<Self> {
        validate_threshold_config(participants, threshold)?;
        let smallest = par.moduli().iter().copied().min().unwrap_or(0);
        if participants as u64 >= smallest {
            return Err(ConfigurationError::ParticipantsExceedModulus {
                participants,
                modulus: smallest,
            }
            .into());
        }
        Ok(Self {
            participants,
            threshold,
        })
    }

    /// The number of participants N.
    pub const fn participants(&self) -> usize {
        self.participants
    }

    /// The threshold t.
    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    /// With t == N there is no redundancy, so secrets are never sharded.
    pub const fn is_unsharded(&self) -> bool {
        self.threshold == self.participants
    }

    /// The public points of all N participants.
    pub fn points(&self) -> Vec<ShamirPublicPoint> {
        // N is below the smallest ciphertext modulus, so every point fits.
        (1..=self.participants as u64).map(ShamirPublicPoint).collect()
    }
}

/// The threshold and the set of public points of a quorum.
///
/// Two phases agree on a quorum exactly when their descriptors are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuorumDescriptor {
    threshold: usize,
    points: Vec<ShamirPublicPoint>,
}

impl QuorumDescriptor {
    /// Create a descriptor from arbitrary points, sorting them.
    pub fn new(threshold: usize, points: &[ShamirPublicPoint]) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for point in points {
            if !seen.insert(*point) {
                return Err(ConfigurationError::DuplicatePublicPoint(point.value()).into());
            }
        }
        Ok(Self {
            threshold,
            points: seen.into_iter().collect(),
        })
    }

    /// Create the descriptor of a set of participants.
    pub fn from_participants(threshold: usize, participants: &[usize]) -> Result<Self> {
        let points = participants
            .iter()
            .map(|i| ShamirPublicPoint::for_participant(*i))
            .collect::<Result<Vec<_>>>()?;
        Self::new(threshold, &points)
    }

    /// The threshold of the sharing this quorum reconstructs.
    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    /// The points, in increasing order.
    pub fn points(&self) -> &[ShamirPublicPoint] {
        &self.points
    }

    /// The participants, in increasing order.
    pub fn participants(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.participant()).collect()
    }

    /// Whether the point belongs to the quorum.
    pub fn contains(&self, point: ShamirPublicPoint) -> bool {
        self.points.binary_search(&point).is_ok()
    }

    /// The size of the quorum.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the quorum is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_threshold_config, QuorumDescriptor, ShamirPublicPoint, ThresholdConfig};
    use crate::bfv::{BfvParameters, BfvParametersBuilder};
    use crate::{ConfigurationError, Error};

    #[test]
    fn public_points() {
        let p = ShamirPublicPoint::for_participant(0).unwrap();
        assert_eq!(p.value(), 1);
        assert_eq!(p.participant(), 0);
        assert_eq!(ShamirPublicPoint::new(7).unwrap().participant(), 6);
        assert_eq!(
            ShamirPublicPoint::new(0),
            Err(Error::ConfigurationError(ConfigurationError::ZeroPublicPoint))
        );
        assert_eq!(
            ShamirPublicPoint::for_participant(usize::MAX),
            Err(Error::ConfigurationError(
                ConfigurationError::ParticipantIndexOutOfRange(usize::MAX)
            ))
        );
        assert_eq!(
            QuorumDescriptor::from_participants(1, &[usize::MAX]),
            Err(Error::ConfigurationError(
                ConfigurationError::ParticipantIndexOutOfRange(usize::MAX)
            ))
        );
    }

    #[test]
    fn threshold_bounds() {
        assert!(validate_threshold_config(5, 3).is_ok());
        assert!(validate_threshold_config(5, 5).is_ok());
        assert!(validate_threshold_config(1, 1).is_ok());
        assert_eq!(
            validate_threshold_config(0, 1),
            Err(Error::ConfigurationError(
                ConfigurationError::InvalidParticipantCount(0)
            ))
        );
        assert!(validate_threshold_config(5, 0).is_err());
        assert!(validate_threshold_config(5, 6).is_err());
    }

    #[test]
    fn config() {
        let par = BfvParameters::default_arc(1, 16);
        let config = ThresholdConfig::new(5, 3, &par).unwrap();
        assert_eq!(config.participants(), 5);
        assert_eq!(config.threshold(), 3);
        assert!(!config.is_unsharded());
        assert_eq!(config.points().len(), 5);
        assert!(ThresholdConfig::new(5, 5, &par).unwrap().is_unsharded());

        let small = BfvParametersBuilder::new()
            .set_degree(16)
            .set_plaintext_modulus(17)
            .set_moduli(&[97, 4611686018326724609])
            .build()
            .unwrap();
        assert_eq!(
            ThresholdConfig::new(97, 3, &small),
            Err(Error::ConfigurationError(
                ConfigurationError::ParticipantsExceedModulus {
                    participants: 97,
                    modulus: 97
                }
            ))
        );
    }

    #[test]
    fn quorum_descriptor() {
        let a = QuorumDescriptor::from_participants(3, &[4, 0, 2]).unwrap();
        let b = QuorumDescriptor::from_participants(3, &[0, 2, 4]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.participants(), vec![0, 2, 4]);
        assert_eq!(a.len(), 3);
        assert!(a.contains(ShamirPublicPoint::for_participant(2).unwrap()));
        assert!(!a.contains(ShamirPublicPoint::for_participant(1).unwrap()));
        assert_ne!(a, QuorumDescriptor::from_participants(2, &[0, 2, 4]).unwrap());
        assert_eq!(
            QuorumDescriptor::from_participants(3, &[1, 1]),
            Err(Error::ConfigurationError(
                ConfigurationError::DuplicatePublicPoint(2)
            ))
        );
    }
}

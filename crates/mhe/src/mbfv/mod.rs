#![warn(missing_docs, unused_imports)]

//! The Multiparty BFV scheme, as described by Christian Mouchet et. al.
//!
//! Participants run collective key generation against a common random
//! polynomial and jointly decrypt by aggregating partial decryptions.
//! Every aggregate records the set of participants it folds together and the
//! fingerprint of the public value it was computed against, so that mixing
//! rounds, ciphertexts or contributors is reported instead of silently
//! producing a wrong key or plaintext.

mod crp;
mod decryption_share;
mod public_key_gen;

pub use crp::{CommonRandomPoly, CommonReferenceString};
pub use decryption_share::DecryptionShare;
pub use public_key_gen::{KeyGenRound, PublicKeyShare};

use crate::bfv::{BfvParameters, SecretKey};
use crate::trbfv::QuorumDescriptor;
use crate::{ProtocolStateError, Result};
use mhe_math::rq::{Context, Poly, Representation};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Aggregate shares in an MPC protocol.
///
/// The shares are folded in iteration order; since aggregation is ring
/// addition, the order does not change the result.
pub trait Aggregate<S>: Sized {
    /// Create `Self` by aggregating the shares.
    fn from_shares<T>(iter: T) -> Result<Self>
    where
        T: IntoIterator<Item = S>;
}

/// Secret material a participant contributes to a protocol: either its own
/// [`SecretKey`], or an additive share of the joint secret reconstructed by a
/// quorum.
pub trait KeyMaterial {
    /// The parameters the material belongs to.
    fn parameters(&self) -> &Arc<BfvParameters>;

    /// The secret as a polynomial in NTT representation.
    fn secret_poly(&self) -> Result<Zeroizing<Poly>>;

    /// The participant the material is bound to, if any.
    fn participant(&self) -> Option<usize> {
        None
    }

    /// The quorum the material was reconstructed for, if any.
    fn quorum(&self) -> Option<&QuorumDescriptor> {
        None
    }
}

impl KeyMaterial for SecretKey {
    fn parameters(&self) -> &Arc<BfvParameters> {
        &self.par
    }

    fn secret_poly(&self) -> Result<Zeroizing<Poly>> {
        self.to_poly()
    }
}

/// SHA-256 fingerprint of canonical bytes.
pub(crate) fn fingerprint(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Reject key material bound to another participant.
pub(crate) fn check_participant<K: KeyMaterial>(participant: usize, key: &K) -> Result<()> {
    match key.participant() {
        Some(owner) if owner != participant => {
            Err(ProtocolStateError::UnexpectedContributor(participant).into())
        }
        _ => Ok(()),
    }
}

/// Running sum of contributions to one aggregate, tagged with the fingerprint
/// of the public value the contributions were computed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Contributions {
    pub(crate) digest: [u8; 32],
    pub(crate) contributors: BTreeSet<usize>,
    pub(crate) sum: Poly,
}

impl Contributions {
    /// The identity element: no contributor, zero sum.
    pub(crate) fn identity(digest: [u8; 32], ctx: &Arc<Context>) -> Self {
        Self {
            digest,
            contributors: BTreeSet::new(),
            sum: Poly::zero(ctx, Representation::Ntt),
        }
    }

    pub(crate) fn single(digest: [u8; 32], participant: usize, value: Poly) -> Self {
        Self {
            digest,
            contributors: BTreeSet::from([participant]),
            sum: value,
        }
    }

    /// Fold `other` into `self`.
    ///
    /// Fails with `mismatch` when the fingerprints differ, and with
    /// [`ProtocolStateError::DuplicateContribution`] when a participant
    /// appears in both sides.
    pub(crate) fn absorb(&mut self, other: &Contributions, mismatch: ProtocolStateError) -> Result<()> {
        if self.digest != other.digest {
            return Err(mismatch.into());
        }
        if let Some(duplicate) = self.contributors.intersection(&other.contributors).next() {
            return Err(ProtocolStateError::DuplicateContribution(*duplicate).into());
        }
        self.contributors.extend(other.contributors.iter().copied());
        self.sum += &other.sum;
        Ok(())
    }

    /// Check that the contributors are exactly `expected`.
    pub(crate) fn check_complete(&self, expected: &BTreeSet<usize>) -> Result<()> {
        if let Some(unexpected) = self.contributors.difference(expected).next() {
            return Err(ProtocolStateError::UnexpectedContributor(*unexpected).into());
        }
        let missing = expected
            .difference(&self.contributors)
            .copied()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(ProtocolStateError::IncompleteAggregation { missing }.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{fingerprint, Contributions};
    use crate::bfv::BfvParameters;
    use crate::{Error, ProtocolStateError};
    use mhe_math::rq::{Poly, Representation};
    use rand::thread_rng;
    use std::collections::BTreeSet;

    #[test]
    fn fold_is_order_independent() {
        let mut rng = thread_rng();
        let params = BfvParameters::default_arc(1, 16);
        let digest = fingerprint(b"round");
        let parts = (0..5)
            .map(|i| {
                Contributions::single(
                    digest,
                    i,
                    Poly::random(params.ctx(), Representation::Ntt, &mut rng),
                )
            })
            .collect::<Vec<_>>();

        let mut forward = Contributions::identity(digest, params.ctx());
        for p in &parts {
            forward.absorb(p, ProtocolStateError::CrpMismatch).unwrap();
        }

        // ((4 + 3) + (2 + 1)) + 0
        let mut left = parts[4].clone();
        left.absorb(&parts[3], ProtocolStateError::CrpMismatch).unwrap();
        let mut right = parts[2].clone();
        right.absorb(&parts[1], ProtocolStateError::CrpMismatch).unwrap();
        left.absorb(&right, ProtocolStateError::CrpMismatch).unwrap();
        left.absorb(&parts[0], ProtocolStateError::CrpMismatch).unwrap();

        assert_eq!(forward, left);
        assert!(forward.check_complete(&BTreeSet::from_iter(0..5)).is_ok());
    }

    #[test]
    fn absorb_rejects_mismatches() {
        let params = BfvParameters::default_arc(1, 16);
        let zero = Poly::zero(params.ctx(), Representation::Ntt);
        let mut a = Contributions::single(fingerprint(b"a"), 0, zero.clone());
        let b = Contributions::single(fingerprint(b"b"), 1, zero.clone());
        assert_eq!(
            a.absorb(&b, ProtocolStateError::CiphertextMismatch),
            Err(Error::ProtocolStateError(ProtocolStateError::CiphertextMismatch))
        );

        let c = Contributions::single(fingerprint(b"a"), 0, zero);
        assert_eq!(
            a.absorb(&c, ProtocolStateError::CrpMismatch),
            Err(Error::ProtocolStateError(
                ProtocolStateError::DuplicateContribution(0)
            ))
        );
    }

    #[test]
    fn completeness() {
        let params = BfvParameters::default_arc(1, 16);
        let zero = Poly::zero(params.ctx(), Representation::Ntt);
        let a = Contributions::single(fingerprint(b"a"), 2, zero);
        assert_eq!(
            a.check_complete(&BTreeSet::from([1, 2, 3])),
            Err(Error::ProtocolStateError(
                ProtocolStateError::IncompleteAggregation {
                    missing: vec![1, 3]
                }
            ))
        );
        assert_eq!(
            a.check_complete(&BTreeSet::from([0, 1])),
            Err(Error::ProtocolStateError(
                ProtocolStateError::UnexpectedContributor(2)
            ))
        );
    }
}

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::bfv::{BfvParameters, Ciphertext, Plaintext};
use crate::errors::Result;
use crate::trbfv::QuorumDescriptor;
use crate::{Error, ProtocolStateError};
use mhe_math::rq::{Poly, Representation};
use mhe_traits::Serialize;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::{check_participant, fingerprint, Aggregate, Contributions, KeyMaterial};

/// A participant's partial decryption of a ciphertext, or an aggregate of
/// such partial decryptions.
///
/// Each party computes h_i = c1·s_i + e_i, where e_i is drawn from the
/// smudging distribution so that h_i leaks nothing about s_i beyond the
/// decrypted value. The shares of all contributors are added with
/// [`DecryptionShare::aggregate`] and a contributor recovers the plaintext with
/// [`DecryptionShare::finalize`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DecryptionShare {
    pub(crate) par: Arc<BfvParameters>,
    pub(crate) quorum: Option<QuorumDescriptor>,
    pub(crate) contributions: Contributions,
}

impl DecryptionShare {
    /// Compute a partial decryption of a two-component ciphertext.
    ///
    /// 1. *Private input*: the participant's key material
    /// 2. *Public input*: the ciphertext
    pub fn new<K: KeyMaterial, R: RngCore + CryptoRng>(
        participant: usize,
        key: &K,
        ct: &Ciphertext,
        rng: &mut R,
    ) -> Result<Self> {
        if key.parameters() != &ct.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }
        if ct.len() != 2 {
            return Err(Error::TooManyValues(ct.len(), 2));
        }
        check_participant(participant, key)?;
        let par = ct.par.clone();

        let s = key.secret_poly()?;
        let e = Zeroizing::new(Poly::normal(
            par.ctx(),
            Representation::Ntt,
            par.smudging_variance as f64,
            rng,
        )?);
        let mut h = &*s * &ct.c[1];
        h += &*e;

        debug!(participant, "generated decryption share");
        Ok(Self {
            quorum: key.quorum().cloned(),
            contributions: Contributions::single(ciphertext_digest(ct), participant, h),
            par,
        })
    }

    /// The aggregate of no share at all, for the given ciphertext.
    pub fn identity(ct: &Ciphertext, quorum: Option<QuorumDescriptor>) -> Self {
        Self {
            par: ct.par.clone(),
            quorum,
            contributions: Contributions::identity(ciphertext_digest(ct), ct.par.ctx()),
        }
    }

    /// Fold another share into this one.
    pub fn aggregate(mut self, other: &DecryptionShare) -> Result<Self> {
        if self.quorum != other.quorum {
            warn!("decryption shares were computed for different quorums");
            return Err(ProtocolStateError::QuorumMismatch.into());
        }
        self.contributions
            .absorb(&other.contributions, ProtocolStateError::CiphertextMismatch)
            .map_err(|e| {
                warn!(error = %e, "rejected decryption share");
                e
            })?;
        debug!(
            contributors = self.contributions.contributors.len(),
            "aggregated decryption share"
        );
        Ok(self)
    }

    /// The participants whose shares are folded into this one, in increasing
    /// order.
    pub fn contributors(&self) -> Vec<usize> {
        self.contributions.contributors.iter().copied().collect()
    }

    /// Recover the plaintext from the aggregate of the shares of exactly the
    /// `expected` participants, on behalf of `finalizer`.
    ///
    /// Only the component c0 of `ct` is used, so the ciphertext returned by
    /// [`ExtendedCiphertext::zero_others`](crate::extended::ExtendedCiphertext::zero_others)
    /// finalizes the shares of the participants' restrictions.
    pub fn finalize(
        &self,
        ct: &Ciphertext,
        expected: &[usize],
        finalizer: usize,
    ) -> Result<Plaintext> {
        self.check_finalize(ct, expected, finalizer).map_err(|e| {
            warn!(finalizer, error = %e, "refusing to finalize the decryption");
            e
        })?;

        let mut x = ct.c[0].clone();
        x += &self.contributions.sum;
        let pt = Plaintext::from_phase(&self.par, x)?;
        info!(
            finalizer,
            contributors = expected.len(),
            "finalized decryption"
        );
        Ok(pt)
    }

    fn check_finalize(&self, ct: &Ciphertext, expected: &[usize], finalizer: usize) -> Result<()> {
        if ct.par != self.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }
        if ciphertext_digest(ct) != self.contributions.digest {
            return Err(ProtocolStateError::CiphertextMismatch.into());
        }
        let expected = expected.iter().copied().collect::<BTreeSet<_>>();
        self.contributions.check_complete(&expected)?;
        if let Some(quorum) = &self.quorum {
            if quorum.participants().into_iter().ne(expected.iter().copied()) {
                return Err(ProtocolStateError::QuorumMismatch.into());
            }
        }
        if !self.contributions.contributors.contains(&finalizer) {
            return Err(ProtocolStateError::NonContributingFinalizer(finalizer).into());
        }
        Ok(())
    }
}

/// Shares of ciphertexts with the same component c0 aggregate together.
fn ciphertext_digest(ct: &Ciphertext) -> [u8; 32] {
    fingerprint(&ct.c[0].to_bytes())
}

impl Aggregate<DecryptionShare> for DecryptionShare {
    fn from_shares<T>(iter: T) -> Result<Self>
    where
        T: IntoIterator<Item = DecryptionShare>,
    {
        let mut shares = iter.into_iter();
        let first = shares.next().ok_or(Error::TooFewValues(0, 1))?;
        shares.try_fold(first, |acc, sh| acc.aggregate(&sh))
    }
}

impl Serialize for DecryptionShare {
    fn to_bytes(&self) -> Vec<u8> {
        self.contributions.sum.to_bytes()
    }
}

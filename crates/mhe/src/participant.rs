//! The state held by one participant across the protocol phases.
//!
//! A participant owns its long-lived secret key and, in threshold mode, its
//! sharing polynomial and accumulated threshold share. Everything derived in
//! a phase (public key shares, dealt shares, additive shares, decryption
//! shares, ciphertexts) is returned to the caller rather than stored, so the
//! secret key is never overwritten by session material.

use std::sync::Arc;

use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::bfv::{BfvParameters, Ciphertext, Encoding, Plaintext, PublicKey, SecretKey};
use crate::mbfv::{DecryptionShare, KeyGenRound, PublicKeyShare};
use crate::trbfv::{
    AdditiveShare, Combiner, QuorumDescriptor, ShamirPolynomial, ShamirPublicPoint, ShamirShare,
    ThresholdShare, Thresholdizer,
};
use crate::{Error, Result};
use mhe_traits::{FheEncoder, FheEncrypter};

/// One participant of a multiparty session.
#[derive(Debug)]
pub struct Participant {
    index: usize,
    par: Arc<BfvParameters>,
    secret: SecretKey,
    point: ShamirPublicPoint,
    sharing_polynomial: Option<ShamirPolynomial>,
    threshold_share: Option<ThresholdShare>,
}

impl Participant {
    /// Create participant `index` with a fresh secret key.
    pub fn new<R: RngCore + CryptoRng>(
        index: usize,
        par: &Arc<BfvParameters>,
        rng: &mut R,
    ) -> Result<Self> {
        let point = ShamirPublicPoint::for_participant(index)?;
        Ok(Self {
            index,
            par: par.clone(),
            secret: SecretKey::random(par, rng),
            point,
            sharing_polynomial: None,
            threshold_share: None,
        })
    }

    /// The index of the participant.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The public evaluation point of the participant.
    pub fn point(&self) -> ShamirPublicPoint {
        self.point
    }

    /// The participant's own secret key.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// The participant's sharing polynomial, once dealt.
    pub fn sharing_polynomial(&self) -> Option<&ShamirPolynomial> {
        self.sharing_polynomial.as_ref()
    }

    /// The participant's accumulated threshold share, if any.
    pub fn threshold_share(&self) -> Option<&ThresholdShare> {
        self.threshold_share.as_ref()
    }

    /// Contribute the participant's own secret key to a key generation round.
    pub fn public_key_share<R: RngCore + CryptoRng>(
        &self,
        round: &KeyGenRound,
        rng: &mut R,
    ) -> Result<PublicKeyShare> {
        PublicKeyShare::new(self.index, &self.secret, round, rng)
    }

    /// Contribute an additive share of the joint secret to a key generation
    /// round.
    pub fn threshold_public_key_share<R: RngCore + CryptoRng>(
        &self,
        share: &AdditiveShare,
        round: &KeyGenRound,
        rng: &mut R,
    ) -> Result<PublicKeyShare> {
        PublicKeyShare::new(self.index, share, round, rng)
    }

    /// Share the secret key with every participant.
    ///
    /// With t == N no sharing is needed: the participant keeps its own secret
    /// as threshold share and deals nothing.
    pub fn deal<R: RngCore + CryptoRng>(
        &mut self,
        thresholdizer: &Thresholdizer,
        rng: &mut R,
    ) -> Result<Vec<ShamirShare>> {
        if thresholdizer.config().is_unsharded() {
            self.threshold_share = Some(thresholdizer.unsharded_share(self.index, &self.secret)?);
            debug!(participant = self.index, "kept unsharded secret");
            return Ok(vec![]);
        }
        let polynomial = thresholdizer.gen_polynomial(&self.secret, rng)?;
        let shares = thresholdizer.gen_shares(self.index, &polynomial)?;
        self.sharing_polynomial = Some(polynomial);
        Ok(shares)
    }

    /// Accumulate a share dealt to this participant.
    pub fn receive(&mut self, thresholdizer: &Thresholdizer, share: &ShamirShare) -> Result<()> {
        let accumulator = match &mut self.threshold_share {
            Some(accumulator) => accumulator,
            empty => empty.insert(thresholdizer.init_share(self.point)?),
        };
        thresholdizer.aggregate_shares(accumulator, share)
    }

    /// Reconstruct the participant's additive share of the joint secret for
    /// `quorum`.
    pub fn additive_share(
        &self,
        combiner: &Combiner,
        quorum: &QuorumDescriptor,
    ) -> Result<AdditiveShare> {
        let share = self.threshold_share.as_ref().ok_or_else(|| {
            Error::DefaultError(format!(
                "Participant {} holds no threshold share",
                self.index
            ))
        })?;
        combiner.gen_additive_share(quorum, share)
    }

    /// Encrypt a vector of values, encoded slot-wise, under a public key.
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        values: &[u64],
        pk: &PublicKey,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        let pt = Plaintext::try_encode(values, Encoding::simd(), &self.par)?;
        pk.try_encrypt(&pt, rng)
    }

    /// Partially decrypt a ciphertext with the participant's own secret key.
    pub fn decryption_share<R: RngCore + CryptoRng>(
        &self,
        ct: &Ciphertext,
        rng: &mut R,
    ) -> Result<DecryptionShare> {
        DecryptionShare::new(self.index, &self.secret, ct, rng)
    }

    /// Partially decrypt a ciphertext with an additive share of the joint
    /// secret.
    pub fn threshold_decryption_share<R: RngCore + CryptoRng>(
        &self,
        share: &AdditiveShare,
        ct: &Ciphertext,
        rng: &mut R,
    ) -> Result<DecryptionShare> {
        DecryptionShare::new(self.index, share, ct, rng)
    }
}

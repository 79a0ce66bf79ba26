use std::collections::BTreeSet;
use std::sync::Arc;

use crate::bfv::{BfvParameters, PublicKey};
use crate::errors::Result;
use crate::{Error, ProtocolStateError};
use mhe_math::rq::{Poly, Representation};
use mhe_traits::Serialize;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::{check_participant, fingerprint, Aggregate, CommonRandomPoly, Contributions, KeyMaterial};

/// One round of the collective public key generation protocol.
///
/// The round binds a [`CommonRandomPoly`] for its whole lifetime: every share
/// computed against the round carries the round's fingerprint, and shares
/// from different rounds refuse to aggregate.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct KeyGenRound {
    par: Arc<BfvParameters>,
    crp: CommonRandomPoly,
    digest: [u8; 32],
}

impl KeyGenRound {
    /// Bind a CRP to a new round.
    pub fn new(par: &Arc<BfvParameters>, crp: CommonRandomPoly) -> Result<Self> {
        if crp.poly.ctx() != par.ctx() || crp.poly.representation() != Representation::Ntt {
            return Err(Error::DefaultError(
                "The CRP does not match the BFV parameters".to_string(),
            ));
        }
        let digest = fingerprint(&crp.to_bytes());
        Ok(Self {
            par: par.clone(),
            crp,
            digest,
        })
    }

    /// The CRP bound to this round.
    pub fn crp(&self) -> &CommonRandomPoly {
        &self.crp
    }

    /// The aggregate of no share at all.
    pub fn identity_share(&self) -> PublicKeyShare {
        PublicKeyShare {
            par: self.par.clone(),
            contributions: Contributions::identity(self.digest, self.par.ctx()),
        }
    }

    /// Turn the aggregate of the shares of exactly the `expected` participants
    /// into the joint public key.
    pub fn finalize(&self, share: &PublicKeyShare, expected: &[usize]) -> Result<PublicKey> {
        if share.contributions.digest != self.digest {
            warn!("public key share was computed in another round");
            return Err(ProtocolStateError::CrpMismatch.into());
        }
        if expected.is_empty() {
            warn!("refusing to finalize a public key without contributors");
            return Err(Error::TooFewValues(0, 1));
        }
        let expected = expected.iter().copied().collect::<BTreeSet<_>>();
        if let Err(e) = share.contributions.check_complete(&expected) {
            warn!(error = %e, "refusing to finalize the public key");
            return Err(e);
        }
        info!(
            participants = expected.len(),
            "finalized joint public key"
        );
        PublicKey::from_polys(
            share.contributions.sum.clone(),
            self.crp.poly.clone(),
            &self.par,
        )
    }

    /// Turn a single participant's share into that participant's own public
    /// key, decryptable with its key material alone.
    pub fn individual_public_key(&self, share: &PublicKeyShare) -> Result<PublicKey> {
        match share.contributors().as_slice() {
            [participant] => self.finalize(share, &[*participant]),
            contributors => Err(Error::DefaultError(format!(
                "Expected a single contributor, found {}",
                contributors.len()
            ))),
        }
    }
}

/// A participant's share in the public key generation protocol, or an
/// aggregate of such shares.
///
/// Each party computes p0_i = -a·s_i + e_i as in "Protocol 1: EncKeyGen" of
/// [Multiparty BFV](https://eprint.iacr.org/2020/304.pdf) (p6). Shares are
/// combined with [`PublicKeyShare::aggregate`] or the [`Aggregate`] impl and
/// turned into a [`PublicKey`] by [`KeyGenRound::finalize`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PublicKeyShare {
    pub(crate) par: Arc<BfvParameters>,
    pub(crate) contributions: Contributions,
}

impl PublicKeyShare {
    /// Participate in the round.
    ///
    /// 1. *Private input*: the participant's key material
    /// 2. *Public input*: the round's common random polynomial
    pub fn new<K: KeyMaterial, R: RngCore + CryptoRng>(
        participant: usize,
        key: &K,
        round: &KeyGenRound,
        rng: &mut R,
    ) -> Result<Self> {
        if key.parameters() != &round.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }
        check_participant(participant, key)?;
        let par = round.par.clone();

        let s = key.secret_poly()?;
        let e = Zeroizing::new(Poly::small(
            par.ctx(),
            Representation::Ntt,
            par.variance,
            rng,
        )?);
        let mut p0 = -&round.crp.poly;
        p0 *= &*s;
        p0 += &*e;

        debug!(participant, "generated public key share");
        Ok(Self {
            par,
            contributions: Contributions::single(round.digest, participant, p0),
        })
    }

    /// Fold another share into this one.
    pub fn aggregate(mut self, other: &PublicKeyShare) -> Result<Self> {
        self.contributions
            .absorb(&other.contributions, ProtocolStateError::CrpMismatch)
            .map_err(|e| {
                warn!(error = %e, "rejected public key share");
                e
            })?;
        debug!(
            contributors = self.contributions.contributors.len(),
            "aggregated public key share"
        );
        Ok(self)
    }

    /// The participants whose shares are folded into this one, in increasing
    /// order.
    pub fn contributors(&self) -> Vec<usize> {
        self.contributions.contributors.iter().copied().collect()
    }
}

impl Aggregate<PublicKeyShare> for PublicKeyShare {
    fn from_shares<T>(iter: T) -> Result<Self>
    where
        T: IntoIterator<Item = PublicKeyShare>,
    {
        let mut shares = iter.into_iter();
        let first = shares.next().ok_or(Error::TooFewValues(0, 1))?;
        shares.try_fold(first, |acc, sh| acc.aggregate(&sh))
    }
}

impl Serialize for PublicKeyShare {
    fn to_bytes(&self) -> Vec<u8> {
        self.contributions.sum.to_bytes()
    }
}

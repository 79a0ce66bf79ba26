//! Conversion of threshold shares into additive shares of the joint secret.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};
use zeroize::Zeroizing;
use zeroize_derive::{Zeroize, ZeroizeOnDrop};

use crate::bfv::BfvParameters;
use crate::mbfv::KeyMaterial;
use crate::trbfv::shamir::lagrange_coefficient;
use crate::trbfv::{QuorumDescriptor, ShamirPublicPoint, ThresholdConfig, ThresholdShare};
use crate::{Error, ProtocolStateError, Result};
use mhe_math::rq::Poly;

/// A participant's additive share of the joint secret, valid only together
/// with the shares of the other members of the quorum it was reconstructed
/// for.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AdditiveShare {
    #[zeroize(skip)]
    par: Arc<BfvParameters>,
    #[zeroize(skip)]
    participant: usize,
    #[zeroize(skip)]
    quorum: QuorumDescriptor,
    secret: Poly,
}

impl AdditiveShare {
    /// The quorum the share was reconstructed for.
    pub fn quorum_descriptor(&self) -> &QuorumDescriptor {
        &self.quorum
    }
}

impl KeyMaterial for AdditiveShare {
    fn parameters(&self) -> &Arc<BfvParameters> {
        &self.par
    }

    fn secret_poly(&self) -> Result<Zeroizing<Poly>> {
        Ok(Zeroizing::new(self.secret.clone()))
    }

    fn participant(&self) -> Option<usize> {
        Some(self.participant)
    }

    fn quorum(&self) -> Option<&QuorumDescriptor> {
        Some(&self.quorum)
    }
}

/// Reconstructs additive shares for a quorum of at least t participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combiner {
    par: Arc<BfvParameters>,
    config: ThresholdConfig,
}

impl Combiner {
    /// Create a combiner for the given parameters and configuration.
    pub fn new(par: &Arc<BfvParameters>, config: ThresholdConfig) -> Self {
        Self {
            par: par.clone(),
            config,
        }
    }

    /// Check that the quorum can reconstruct under this configuration.
    fn check_quorum(&self, quorum: &QuorumDescriptor) -> Result<()> {
        if quorum.threshold() != self.config.threshold() {
            return Err(ProtocolStateError::QuorumMismatch.into());
        }
        if quorum.len() < self.config.threshold() {
            return Err(Error::insufficient_quorum(
                quorum.len(),
                self.config.threshold(),
            ));
        }
        if let Some(outsider) = quorum
            .participants()
            .into_iter()
            .find(|i| *i >= self.config.participants())
        {
            return Err(ProtocolStateError::UnexpectedContributor(outsider).into());
        }
        Ok(())
    }

    /// Turn a participant's threshold share into its additive share of the
    /// joint secret for `quorum`.
    ///
    /// With t == N the share is the participant's own secret. Otherwise the
    /// accumulated evaluation F(x_i) is scaled by the Lagrange coefficient of
    /// x_i over the quorum's points, so that the quorum's additive shares sum
    /// to F(0), the sum of all the participants' secrets.
    pub fn gen_additive_share(
        &self,
        quorum: &QuorumDescriptor,
        share: &ThresholdShare,
    ) -> Result<AdditiveShare> {
        if let Err(e) = self.check_quorum(quorum) {
            warn!(error = %e, "rejected quorum");
            return Err(e);
        }
        let participant = share.participant();
        if !quorum.contains(ShamirPublicPoint::for_participant(participant)?) {
            warn!(participant, "participant is not a member of the quorum");
            return Err(ProtocolStateError::UnexpectedContributor(participant).into());
        }

        let secret = match share {
            ThresholdShare::Unsharded { secret, .. } => {
                if !self.config.is_unsharded() {
                    return Err(ProtocolStateError::QuorumMismatch.into());
                }
                secret.clone()
            }
            ThresholdShare::Shamir {
                point,
                dealers,
                value,
            } => {
                let all = (0..self.config.participants()).collect::<BTreeSet<_>>();
                let missing = all.difference(dealers).copied().collect::<Vec<_>>();
                if !missing.is_empty() {
                    warn!(participant, ?missing, "shamir shares are missing");
                    return Err(ProtocolStateError::IncompleteAggregation { missing }.into());
                }
                let lambda = Zeroizing::new(lagrange_coefficient(
                    *point,
                    quorum.points(),
                    self.par.ctx(),
                )?);
                let mut secret = value.clone();
                secret.mul_rns_scalar(&lambda)?;
                secret
            }
        };

        debug!(participant, quorum = quorum.len(), "reconstructed additive share");
        Ok(AdditiveShare {
            par: self.par.clone(),
            participant,
            quorum: quorum.clone(),
            secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Combiner;
    use crate::bfv::{BfvParameters, SecretKey};
    use crate::mbfv::KeyMaterial;
    use crate::trbfv::{QuorumDescriptor, ThresholdConfig, ThresholdShare, Thresholdizer};
    use crate::{Error, ProtocolStateError};
    use mhe_math::rq::{Poly, Representation};
    use rand::thread_rng;
    use std::sync::Arc;

    /// Deal the secrets of `n` fresh participants and return their keys and
    /// accumulated shares.
    fn deal(
        par: &Arc<BfvParameters>,
        config: ThresholdConfig,
    ) -> (Vec<SecretKey>, Vec<ThresholdShare>) {
        let mut rng = thread_rng();
        let thresholdizer = Thresholdizer::new(par, config);
        let keys = (0..config.participants())
            .map(|_| SecretKey::random(par, &mut rng))
            .collect::<Vec<_>>();
        let dealt = keys
            .iter()
            .enumerate()
            .map(|(i, sk)| {
                let f = thresholdizer.gen_polynomial(sk, &mut rng).unwrap();
                thresholdizer.gen_shares(i, &f).unwrap()
            })
            .collect::<Vec<_>>();
        let shares = config
            .points()
            .into_iter()
            .enumerate()
            .map(|(j, point)| {
                let mut acc = thresholdizer.init_share(point).unwrap();
                dealt
                    .iter()
                    .for_each(|d| thresholdizer.aggregate_shares(&mut acc, &d[j]).unwrap());
                acc
            })
            .collect();
        (keys, shares)
    }

    fn joint_secret(keys: &[SecretKey], par: &Arc<BfvParameters>) -> Poly {
        let mut s = Poly::zero(par.ctx(), Representation::Ntt);
        keys.iter()
            .for_each(|k| s += &*k.secret_poly().unwrap());
        s
    }

    fn reconstruct(
        combiner: &Combiner,
        shares: &[ThresholdShare],
        quorum: &QuorumDescriptor,
        par: &Arc<BfvParameters>,
    ) -> Poly {
        let mut s = Poly::zero(par.ctx(), Representation::Ntt);
        for i in quorum.participants() {
            let additive = combiner.gen_additive_share(quorum, &shares[i]).unwrap();
            s += &*additive.secret_poly().unwrap();
        }
        s
    }

    #[test]
    fn quorums_reconstruct_the_joint_secret() {
        let par = BfvParameters::default_arc(2, 16);
        let config = ThresholdConfig::new(6, 4, &par).unwrap();
        let (keys, shares) = deal(&par, config);
        let combiner = Combiner::new(&par, config);
        let expected = joint_secret(&keys, &par);

        for participants in [vec![0, 1, 2, 3], vec![0, 2, 4, 5], vec![0, 1, 2, 3, 4, 5]] {
            let quorum = QuorumDescriptor::from_participants(4, &participants).unwrap();
            assert_eq!(reconstruct(&combiner, &shares, &quorum, &par), expected);
        }
    }

    #[test]
    fn unsharded_is_identity() {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(1, 16);
        let config = ThresholdConfig::new(3, 3, &par).unwrap();
        let thresholdizer = Thresholdizer::new(&par, config);
        let combiner = Combiner::new(&par, config);
        let sk = SecretKey::random(&par, &mut rng);
        let share = thresholdizer.unsharded_share(2, &sk).unwrap();
        let quorum = QuorumDescriptor::from_participants(3, &[0, 1, 2]).unwrap();
        let additive = combiner.gen_additive_share(&quorum, &share).unwrap();
        assert_eq!(*additive.secret_poly().unwrap(), *sk.secret_poly().unwrap());
        assert_eq!(additive.participant(), Some(2));
        assert_eq!(additive.quorum(), Some(&quorum));
    }

    #[test]
    fn rejects_invalid_quorums() {
        let par = BfvParameters::default_arc(1, 16);
        let config = ThresholdConfig::new(5, 3, &par).unwrap();
        let (_, shares) = deal(&par, config);
        let combiner = Combiner::new(&par, config);

        let small = QuorumDescriptor::from_participants(3, &[0, 1]).unwrap();
        assert_eq!(
            combiner.gen_additive_share(&small, &shares[0]).map(|_| ()),
            Err(Error::ProtocolStateError(
                ProtocolStateError::InsufficientQuorum {
                    threshold: 3,
                    provided: 2
                }
            ))
        );

        let other_threshold = QuorumDescriptor::from_participants(2, &[0, 1, 2]).unwrap();
        assert_eq!(
            combiner
                .gen_additive_share(&other_threshold, &shares[0])
                .map(|_| ()),
            Err(Error::ProtocolStateError(ProtocolStateError::QuorumMismatch))
        );

        let without_me = QuorumDescriptor::from_participants(3, &[1, 2, 3]).unwrap();
        assert_eq!(
            combiner.gen_additive_share(&without_me, &shares[0]).map(|_| ()),
            Err(Error::ProtocolStateError(
                ProtocolStateError::UnexpectedContributor(0)
            ))
        );

        let outsider = QuorumDescriptor::from_participants(3, &[0, 1, 9]).unwrap();
        assert_eq!(
            combiner.gen_additive_share(&outsider, &shares[0]).map(|_| ()),
            Err(Error::ProtocolStateError(
                ProtocolStateError::UnexpectedContributor(9)
            ))
        );
    }

    #[test]
    fn rejects_incomplete_shares() {
        let par = BfvParameters::default_arc(1, 16);
        let config = ThresholdConfig::new(3, 2, &par).unwrap();
        let thresholdizer = Thresholdizer::new(&par, config);
        let combiner = Combiner::new(&par, config);
        let acc = thresholdizer
            .init_share(crate::trbfv::ShamirPublicPoint::for_participant(0).unwrap())
            .unwrap();
        let quorum = QuorumDescriptor::from_participants(2, &[0, 1]).unwrap();
        assert_eq!(
            combiner.gen_additive_share(&quorum, &acc).map(|_| ()),
            Err(Error::ProtocolStateError(
                ProtocolStateError::IncompleteAggregation {
                    missing: vec![0, 1, 2]
                }
            ))
        );
    }
}

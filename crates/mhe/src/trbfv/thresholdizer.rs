//! Distribution of the participants' secrets to the public points.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::{CryptoRng, RngCore};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::bfv::{BfvParameters, SecretKey};
use crate::mbfv::KeyMaterial;
use crate::trbfv::{ShamirPolynomial, ShamirPublicPoint, ShamirShare, ThresholdConfig, ThresholdShare};
use crate::{Error, ProtocolStateError, Result};
use mhe_math::rq::{Poly, Representation};

/// Deals and accumulates Shamir shares under one [`ThresholdConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thresholdizer {
    par: Arc<BfvParameters>,
    config: ThresholdConfig,
}

impl Thresholdizer {
    /// Create a thresholdizer for the given parameters and configuration.
    pub fn new(par: &Arc<BfvParameters>, config: ThresholdConfig) -> Self {
        Self {
            par: par.clone(),
            config,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    fn check_participant(&self, index: usize) -> Result<()> {
        if index >= self.config.participants() {
            return Err(Error::unknown_participant(
                index,
                self.config.participants(),
            ));
        }
        Ok(())
    }

    /// Sample the sharing polynomial of a secret key: degree t - 1, constant
    /// term the secret, other coefficients uniform.
    pub fn gen_polynomial<R: RngCore + CryptoRng>(
        &self,
        secret: &SecretKey,
        rng: &mut R,
    ) -> Result<ShamirPolynomial> {
        if secret.par != self.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }
        let s = secret.secret_poly()?;
        Ok(ShamirPolynomial::random(&s, self.config.threshold(), rng))
    }

    /// Evaluate a dealer's polynomial at the recipient's point.
    pub fn gen_share(
        &self,
        dealer: usize,
        recipient: ShamirPublicPoint,
        polynomial: &ShamirPolynomial,
    ) -> Result<ShamirShare> {
        self.check_participant(dealer)?;
        self.check_participant(recipient.participant())?;
        Ok(ShamirShare {
            dealer,
            recipient,
            value: polynomial.evaluate(recipient),
        })
    }

    /// Evaluate a dealer's polynomial at the points of all N participants.
    pub fn gen_shares(
        &self,
        dealer: usize,
        polynomial: &ShamirPolynomial,
    ) -> Result<Vec<ShamirShare>> {
        let shares = self
            .config
            .points()
            .into_par_iter()
            .map(|point| self.gen_share(dealer, point, polynomial))
            .collect::<Result<Vec<_>>>()?;
        debug!(dealer, shares = shares.len(), "dealt shamir shares");
        Ok(shares)
    }

    /// An empty accumulator for the shares received at `point`.
    pub fn init_share(&self, point: ShamirPublicPoint) -> Result<ThresholdShare> {
        self.check_participant(point.participant())?;
        Ok(ThresholdShare::Shamir {
            point,
            dealers: BTreeSet::new(),
            value: Poly::zero(self.par.ctx(), Representation::Ntt),
        })
    }

    /// Add a received share to the accumulator.
    ///
    /// Once every dealer's share has been added, the accumulator holds the
    /// evaluation at the recipient's point of the sum of all sharing
    /// polynomials.
    pub fn aggregate_shares(
        &self,
        accumulator: &mut ThresholdShare,
        incoming: &ShamirShare,
    ) -> Result<()> {
        self.check_participant(incoming.dealer)?;
        match accumulator {
            ThresholdShare::Unsharded { .. } => Err(Error::DefaultError(
                "Cannot add Shamir shares to an unsharded secret".to_string(),
            )),
            ThresholdShare::Shamir {
                point,
                dealers,
                value,
            } => {
                if incoming.recipient != *point {
                    warn!(%point, recipient = %incoming.recipient, "misrouted shamir share");
                    return Err(ProtocolStateError::MisroutedShare {
                        expected: point.value(),
                        got: incoming.recipient.value(),
                    }
                    .into());
                }
                if !dealers.insert(incoming.dealer) {
                    warn!(%point, dealer = incoming.dealer, "duplicate shamir share");
                    return Err(ProtocolStateError::DuplicateContribution(incoming.dealer).into());
                }
                *value += &incoming.value;
                Ok(())
            }
        }
    }

    /// The share of a participant when t == N: its own secret.
    pub fn unsharded_share(&self, participant: usize, secret: &SecretKey) -> Result<ThresholdShare> {
        if !self.config.is_unsharded() {
            return Err(Error::DefaultError(format!(
                "A threshold of {} out of {} requires sharding",
                self.config.threshold(),
                self.config.participants()
            )));
        }
        self.check_participant(participant)?;
        Ok(ThresholdShare::Unsharded {
            participant,
            secret: (*secret.secret_poly()?).clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Thresholdizer;
    use crate::bfv::{BfvParameters, SecretKey};
    use crate::trbfv::{ShamirPublicPoint, ThresholdConfig, ThresholdShare};
    use crate::{Error, ProtocolStateError};
    use rand::thread_rng;

    #[test]
    fn deal_and_accumulate() {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(1, 16);
        let thresholdizer = Thresholdizer::new(&par, ThresholdConfig::new(4, 2, &par).unwrap());

        let dealt = (0..4)
            .map(|dealer| {
                let sk = SecretKey::random(&par, &mut rng);
                let f = thresholdizer.gen_polynomial(&sk, &mut rng).unwrap();
                assert_eq!(f.degree(), 1);
                thresholdizer.gen_shares(dealer, &f).unwrap()
            })
            .collect::<Vec<_>>();
        assert!(dealt.iter().all(|shares| shares.len() == 4));

        let point = ShamirPublicPoint::for_participant(2).unwrap();
        let mut acc = thresholdizer.init_share(point).unwrap();
        for shares in &dealt {
            thresholdizer.aggregate_shares(&mut acc, &shares[2]).unwrap();
        }
        match &acc {
            ThresholdShare::Shamir { dealers, .. } => assert_eq!(dealers.len(), 4),
            ThresholdShare::Unsharded { .. } => panic!("expected a shamir share"),
        }

        assert_eq!(
            thresholdizer.aggregate_shares(&mut acc, &dealt[0][2]),
            Err(Error::ProtocolStateError(
                ProtocolStateError::DuplicateContribution(0)
            ))
        );
        assert_eq!(
            thresholdizer.aggregate_shares(&mut acc, &dealt[1][3]),
            Err(Error::ProtocolStateError(ProtocolStateError::MisroutedShare {
                expected: 3,
                got: 4
            }))
        );
    }

    #[test]
    fn rejects_unknown_participants() {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(1, 16);
        let thresholdizer = Thresholdizer::new(&par, ThresholdConfig::new(3, 2, &par).unwrap());
        let sk = SecretKey::random(&par, &mut rng);
        let f = thresholdizer.gen_polynomial(&sk, &mut rng).unwrap();

        assert_eq!(
            thresholdizer
                .gen_share(0, ShamirPublicPoint::for_participant(3).unwrap(), &f)
                .map(|_| ()),
            Err(Error::ProtocolStateError(
                ProtocolStateError::UnknownParticipant {
                    index: 3,
                    participants: 3
                }
            ))
        );
        assert!(thresholdizer.gen_shares(5, &f).is_err());
        assert!(thresholdizer
            .init_share(ShamirPublicPoint::for_participant(7).unwrap())
            .is_err());
        assert!(thresholdizer.unsharded_share(0, &sk).is_err());
    }

    #[test]
    fn unsharded() {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(1, 16);
        let thresholdizer = Thresholdizer::new(&par, ThresholdConfig::new(3, 3, &par).unwrap());
        let sk = SecretKey::random(&par, &mut rng);
        let share = thresholdizer.unsharded_share(1, &sk).unwrap();
        assert_eq!(share.participant(), 1);

        let mut acc = share.clone();
        let f = thresholdizer.gen_polynomial(&sk, &mut rng).unwrap();
        let dealt = thresholdizer
            .gen_share(0, ShamirPublicPoint::for_participant(1).unwrap(), &f)
            .unwrap();
        assert!(thresholdizer.aggregate_shares(&mut acc, &dealt).is_err());
    }
}

//! Extended ciphertexts, bundling independent per-participant ciphertexts.
//!
//! Without a common random polynomial each participant encrypts under its own
//! public key, and the ciphertexts cannot be added directly. An extended
//! ciphertext for N participants has N + 1 slots: slot 0 holds the sum of the
//! components c0, and slot i + 1 holds the component c1 of participant i.
//! Adding extended ciphertexts slot by slot is the same as adding the shared
//! slot once and running N independent additions in parallel.

use std::ops::{Add, AddAssign};
use std::sync::Arc;

use crate::bfv::traits::CiphertextComponents;
use crate::bfv::{BfvParameters, Ciphertext};
use crate::{Error, Result};
use mhe_math::rq::{Poly, Representation};
use mhe_traits::{FheCiphertext, FheParametrized, Serialize};

/// A ciphertext with one shared slot and one slot per participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedCiphertext {
    par: Arc<BfvParameters>,
    c: Vec<Poly>,
}

impl ExtendedCiphertext {
    /// Place a participant's ciphertext (c0, c1) into slot 0 and slot
    /// `participant + 1`, leaving all other slots at zero.
    pub fn extend(ct: &Ciphertext, participant: usize, participants: usize) -> Result<Self> {
        if participant >= participants {
            return Err(Error::unknown_participant(participant, participants));
        }
        if ct.len() != 2 {
            return Err(Error::TooManyValues(ct.len(), 2));
        }
        let mut c = vec![Poly::zero(ct.par.ctx(), Representation::Ntt); participants + 1];
        c[0] = ct.c[0].clone();
        c[participant + 1] = ct.c[1].clone();
        Ok(Self {
            par: ct.par.clone(),
            c,
        })
    }

    /// The number of participants N.
    pub fn participants(&self) -> usize {
        self.c.len() - 1
    }

    /// The ciphertext (slot 0, slot `participant + 1`), decryptable by
    /// `participant` alone.
    pub fn restrict(&self, participant: usize) -> Result<Ciphertext> {
        if participant >= self.participants() {
            return Err(Error::unknown_participant(
                participant,
                self.participants(),
            ));
        }
        Ciphertext::new(
            vec![self.c[0].clone(), self.c[participant + 1].clone()],
            &self.par,
        )
    }

    /// The ciphertext (slot 0, 0), only carrying the shared slot.
    pub fn zero_others(&self) -> Ciphertext {
        Ciphertext {
            par: self.par.clone(),
            c: vec![
                self.c[0].clone(),
                Poly::zero(self.par.ctx(), Representation::Ntt),
            ],
        }
    }
}

impl CiphertextComponents for ExtendedCiphertext {
    fn parameters(&self) -> &Arc<BfvParameters> {
        &self.par
    }

    fn components(&self) -> &[Poly] {
        &self.c
    }

    fn components_mut(&mut self) -> &mut [Poly] {
        &mut self.c
    }
}

impl AddAssign<&ExtendedCiphertext> for ExtendedCiphertext {
    fn add_assign(&mut self, rhs: &ExtendedCiphertext) {
        assert_eq!(self.par, rhs.par);
        assert_eq!(self.c.len(), rhs.c.len());
        self.c
            .iter_mut()
            .zip(rhs.c.iter())
            .for_each(|(c1i, c2i)| *c1i += c2i);
    }
}

impl Add<&ExtendedCiphertext> for &ExtendedCiphertext {
    type Output = ExtendedCiphertext;

    fn add(self, rhs: &ExtendedCiphertext) -> ExtendedCiphertext {
        let mut sum = self.clone();
        sum += rhs;
        sum
    }
}

impl FheCiphertext for ExtendedCiphertext {}

impl FheParametrized for ExtendedCiphertext {
    type Parameters = BfvParameters;
}

impl Serialize for ExtendedCiphertext {
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = (self.c.len() as u32).to_le_bytes().to_vec();
        self.c
            .iter()
            .for_each(|ci| bytes.extend_from_slice(&ci.to_bytes()));
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::ExtendedCiphertext;
    use crate::bfv::{BfvParameters, Ciphertext, Computer, Encoding, Plaintext, SecretKey};
    use crate::mbfv::{CommonRandomPoly, KeyGenRound, PublicKeyShare};
    use crate::{Error, ProtocolStateError};
    use mhe_math::rq::{Poly, Representation};
    use mhe_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
    use rand::thread_rng;

    #[test]
    fn extend_and_restrict() {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(1, 16);
        let a = Ciphertext::new(
            vec![
                Poly::random(par.ctx(), Representation::Ntt, &mut rng),
                Poly::random(par.ctx(), Representation::Ntt, &mut rng),
            ],
            &par,
        )
        .unwrap();
        let b = Ciphertext::new(
            vec![
                Poly::random(par.ctx(), Representation::Ntt, &mut rng),
                Poly::random(par.ctx(), Representation::Ntt, &mut rng),
            ],
            &par,
        )
        .unwrap();

        let ea = ExtendedCiphertext::extend(&a, 1, 4).unwrap();
        assert_eq!(ea.participants(), 4);
        assert_eq!(ea.restrict(1).unwrap(), a);
        assert!(ea.restrict(2).unwrap().c[1].is_zero());

        let eb = ExtendedCiphertext::extend(&b, 3, 4).unwrap();
        let sum = &ea + &eb;

        // The participant slots are untouched, the shared slot is summed.
        let ra = sum.restrict(1).unwrap();
        let rb = sum.restrict(3).unwrap();
        assert_eq!(ra.c[1], a.c[1]);
        assert_eq!(rb.c[1], b.c[1]);
        assert_eq!(ra.c[0], &a.c[0] + &b.c[0]);
        assert!(sum.restrict(0).unwrap().c[1].is_zero());

        let common = sum.zero_others();
        assert_eq!(common.c[0], ra.c[0]);
        assert!(common.c[1].is_zero());

        // Computer::add agrees with the operator.
        let mut destination = ExtendedCiphertext::extend(&a, 0, 4).unwrap();
        Computer::new(&par)
            .add(&ea, &eb, &mut destination)
            .unwrap();
        assert_eq!(destination, sum);
    }

    #[test]
    fn rejects_unknown_participants() {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(1, 16);
        let a = Ciphertext::new(
            vec![
                Poly::random(par.ctx(), Representation::Ntt, &mut rng),
                Poly::random(par.ctx(), Representation::Ntt, &mut rng),
            ],
            &par,
        )
        .unwrap();
        assert_eq!(
            ExtendedCiphertext::extend(&a, 4, 4),
            Err(Error::ProtocolStateError(
                ProtocolStateError::UnknownParticipant {
                    index: 4,
                    participants: 4
                }
            ))
        );
        let ea = ExtendedCiphertext::extend(&a, 0, 4).unwrap();
        assert!(ea.restrict(4).is_err());
    }

    #[test]
    fn sums_decrypt_per_participant() {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(2, 16);
        let n = 3;
        let keys = (0..n)
            .map(|_| SecretKey::random(&par, &mut rng))
            .collect::<Vec<_>>();

        let mut sum: Option<ExtendedCiphertext> = None;
        for (i, sk) in keys.iter().enumerate() {
            let round = KeyGenRound::new(&par, CommonRandomPoly::new(&par, &mut rng)).unwrap();
            let share = PublicKeyShare::new(i, sk, &round, &mut rng).unwrap();
            let pk = round.individual_public_key(&share).unwrap();
            let pt = Plaintext::try_encode(&vec![i as u64 + 1; 16], Encoding::simd(), &par)
                .unwrap();
            let ct = ExtendedCiphertext::extend(&pk.try_encrypt(&pt, &mut rng).unwrap(), i, n)
                .unwrap();
            sum = Some(match sum {
                Some(s) => &s + &ct,
                None => ct,
            });
        }
        let sum = sum.unwrap();

        // Each participant's slot together with the shared slot only decrypts
        // to the full sum once every participant's phase is added in.
        let mut phase_sum = sum.zero_others();
        for (i, sk) in keys.iter().enumerate() {
            let restricted = sum.restrict(i).unwrap();
            let mut s = sk.to_poly().unwrap();
            *s *= &restricted.c[1];
            phase_sum.c[0] += &*s;
        }
        let pt = Plaintext::from_phase(&par, phase_sum.c[0].clone()).unwrap();
        assert_eq!(
            Vec::<u64>::try_decode(&pt, Encoding::simd()).unwrap(),
            vec![6u64; 16]
        );

        // A single participant cannot decrypt the bundle.
        let alone = keys[0].try_decrypt(&sum.restrict(0).unwrap()).unwrap();
        assert_ne!(
            Vec::<u64>::try_decode(&alone, Encoding::simd()).unwrap(),
            vec![6u64; 16]
        );
    }
}

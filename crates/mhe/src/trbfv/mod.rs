//! Threshold sharing of the joint BFV secret.
//!
//! Every participant shares its secret with a degree t - 1 polynomial
//! evaluated at the public points of all N participants. Each participant
//! sums the N evaluations it receives, which yields its evaluation of the sum
//! of all sharing polynomials. Any quorum of at least t participants then
//! turns these evaluations into additive shares of the joint secret,
//! without the joint secret ever existing in one place. See
//! [Robust Multiparty Computation from Threshold Encryption Based on RLWE](https://eprint.iacr.org/2024/1285.pdf)
//! for the setting.

mod combiner;
mod config;
mod errors;
mod shamir;
mod thresholdizer;

pub use combiner::{AdditiveShare, Combiner};
pub use config::{validate_threshold_config, QuorumDescriptor, ShamirPublicPoint, ThresholdConfig};
pub use shamir::{ShamirPolynomial, ShamirShare, ThresholdShare};
pub use thresholdizer::Thresholdizer;

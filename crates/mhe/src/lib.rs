#![crate_name = "mhe"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Multiparty and threshold homomorphic encryption.
//!
//! A group of N participants jointly operates an additively homomorphic BFV
//! scheme without any participant holding the full decryption secret:
//! - [`mbfv`]: collective key generation against a common random polynomial
//!   and aggregation of partial decryptions.
//! - [`trbfv`]: t-of-N Shamir sharing of the joint secret, and reconstruction
//!   of additive shares by a quorum.
//! - [`extended`]: extended ciphertexts for key generation without a shared
//!   random polynomial.
//! - [`participant`]: the state held by one participant across phases.

mod errors;

pub mod bfv;
pub mod extended;
pub mod mbfv;
pub mod participant;
pub mod trbfv;

pub use errors::{ConfigurationError, Error, ParametersError, ProtocolStateError, Result};

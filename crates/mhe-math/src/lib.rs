#![crate_name = "mhe_math"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Mathematical utilities for the mhe.rs library: modular arithmetic, the
//! negacyclic number-theoretic transform, residue number systems and the
//! polynomial ring Z_Q\[X\]/(X^N + 1).

mod errors;

pub mod ntt;
pub mod rns;
pub mod rq;
pub mod zq;

pub use errors::{Error, Result};

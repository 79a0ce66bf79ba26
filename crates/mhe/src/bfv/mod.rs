#![warn(missing_docs, unused_imports)]

//! The BFV encryption scheme primitives consumed by the multiparty
//! protocols: parameters, keys, plaintext encoding, ciphertexts and addition.

mod ciphertext;
mod encoding;
mod keys;
mod ops;
mod parameters;
mod plaintext;
pub mod traits;

pub use ciphertext::Ciphertext;
pub use encoding::Encoding;
pub use keys::{PublicKey, SecretKey};
pub use ops::Computer;
pub use parameters::{BfvParameters, BfvParametersBuilder};
pub use plaintext::Plaintext;

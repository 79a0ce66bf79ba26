//! Traits used for the BFV encryption scheme.

use crate::bfv::BfvParameters;
use mhe_math::rq::Poly;
use mhe_traits::FheParametrized;
use std::sync::Arc;

/// A value made of an ordered sequence of ciphertext components over the
/// same parameters, on which homomorphic addition is component-wise.
pub trait CiphertextComponents: FheParametrized<Parameters = BfvParameters> {
    /// The parameters of the components.
    fn parameters(&self) -> &Arc<BfvParameters>;

    /// The ordered components.
    fn components(&self) -> &[Poly];

    /// The ordered components, mutably.
    fn components_mut(&mut self) -> &mut [Poly];
}

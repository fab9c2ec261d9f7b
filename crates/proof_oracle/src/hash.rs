//! Incremental algebraic hash.
//!
//! Poseidon (`P128Pow5T3`, width 3, rate 2) iterated as a chain:
//!
//! $$acc_0 = 0,\quad acc_{k+1} = P(acc_k, x_k),\quad
//!   \text{sum} = P(acc_n, n)$$
//!
//! The input count is absorbed on finalization, so `[x]` and `[x, 0]`
//! hash differently.

use ff::Field as _;
use halo2_gadgets::poseidon::primitives::{self as poseidon, ConstantLength, P128Pow5T3};
use pasta_curves::Fp;

use crate::{
    driver::{Driver, Gate},
    gadgets::Element,
};

/// Two-to-one Poseidon compression.
fn compress(left: Fp, right: Fp) -> Fp {
    poseidon::Hash::<_, P128Pow5T3, ConstantLength<2>, 3, 2>::init().hash([left, right])
}

/// Native incremental hasher.
#[derive(Clone, Copy, Debug)]
pub struct Hasher {
    acc: Fp,
    len: u64,
}

impl Default for Hasher {
    fn default() -> Self {
        Self {
            acc: Fp::ZERO,
            len: 0,
        }
    }
}

impl Hasher {
    /// Absorbs one element.
    pub fn write(&mut self, input: Fp) {
        self.acc = compress(self.acc, input);
        self.len += 1;
    }

    /// Finalizes the hash.
    #[must_use]
    pub fn sum(self) -> Fp {
        compress(self.acc, Fp::from(self.len))
    }

    /// One-shot hash of `inputs`.
    #[must_use]
    pub fn hash(inputs: &[Fp]) -> Fp {
        let mut hasher = Self::default();
        for input in inputs {
            hasher.write(*input);
        }
        hasher.sum()
    }
}

/// In-circuit counterpart of [`Hasher`].
///
/// Each `write` records one absorption gate; `sum` records the
/// finalization and returns the digest as an allocated element.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sponge {
    native: Hasher,
}

impl Sponge {
    /// Absorbs one element.
    pub fn write<D: Driver>(&mut self, dr: &mut D, input: &Element) {
        dr.gate(Gate::Absorb);
        self.native.write(input.value());
    }

    /// Finalizes the hash.
    pub fn sum<D: Driver>(self, dr: &mut D) -> Element {
        dr.gate(Gate::Squeeze);
        Element::from_gate(self.native.sum())
    }

    /// One-shot in-circuit hash of `inputs`.
    pub fn hash<D: Driver>(dr: &mut D, inputs: &[&Element]) -> Element {
        let mut sponge = Self::default();
        for input in inputs {
            sponge.write(dr, input);
        }
        sponge.sum(dr)
    }
}

#[cfg(test)]
mod tests {
    use ff::Field as _;
    use proptest::prelude::*;

    use super::*;
    use crate::driver::Evaluator;

    /// Trailing zeros are not absorbed silently.
    #[test]
    fn length_separates_inputs() {
        let one = Hasher::hash(&[Fp::ONE]);
        let padded = Hasher::hash(&[Fp::ONE, Fp::ZERO]);
        assert_ne!(one, padded);
        assert_ne!(Hasher::hash(&[]), Hasher::hash(&[Fp::ZERO]));
    }

    /// Order matters.
    #[test]
    fn order_matters() {
        let two = Fp::from(2u64);
        assert_ne!(Hasher::hash(&[Fp::ONE, two]), Hasher::hash(&[two, Fp::ONE]));
    }

    proptest! {
        /// The sponge gadget and the native hasher agree.
        #[test]
        fn sponge_matches_native(a in any::<u64>(), b in any::<u64>(), c in any::<u64>()) {
            let inputs = [Fp::from(a), Fp::from(b), Fp::from(c)];
            let mut dr = Evaluator::default();
            let [first, second, third] = inputs.map(|value| Element::alloc(&mut dr, value));
            let digest = Sponge::hash(&mut dr, &[&first, &second, &third]);
            prop_assert_eq!(digest.value(), Hasher::hash(&inputs));
        }

        /// Hashing is a pure function.
        #[test]
        fn deterministic(a in any::<u64>(), b in any::<u64>()) {
            let inputs = [Fp::from(a), Fp::from(b)];
            prop_assert_eq!(Hasher::hash(&inputs), Hasher::hash(&inputs));
        }
    }
}

//! Setup, proving and verification.
//!
//! ## Lifecycle
//!
//! 1. [`setup`] records the circuit shape and derives a key pair bound to
//!    its digest.
//! 2. [`prove`] re-records the shape (rejecting keys for another circuit),
//!    evaluates the witness, and emits a [`Proof`] tagging the public
//!    inputs.
//! 3. [`verify`] recomputes the tag from the verifying key and the
//!    caller's public inputs.
//!
//! Proving and verification are synchronous and single-shot. A rejected
//! witness is terminal: the caller must supply a corrected one.

use ff::PrimeField as _;
use pasta_curves::Fp;

use crate::driver::{Driver, Evaluator, Shape, ShapeRecorder, Unsatisfied};

/// BLAKE2b-512 personalization for proof tags.
pub const PROOF_PERSONALIZATION: &[u8; 16] = b"Oracle-ProofBind";

/// A circuit with a fixed public input layout.
pub trait Circuit {
    /// Name absorbed into the shape digest.
    const NAME: &'static str;

    /// Public inputs in the order `synthesize` allocates them.
    fn public_inputs(&self) -> Vec<Fp>;

    /// Populates the constraint system.
    ///
    /// Must record the same gate sequence for every witness of the same
    /// shape.
    fn synthesize<D: Driver>(&self, dr: &mut D) -> Result<(), Unsatisfied>;
}

/// Errors from [`setup`] and [`prove`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// The witness violates an assertion.
    #[error(transparent)]
    Unsatisfied(#[from] Unsatisfied),

    /// The key was generated for a different circuit shape.
    #[error("proving key does not match circuit shape")]
    ShapeMismatch,

    /// The declared public inputs disagree with those allocated during
    /// synthesis.
    #[error("declared public inputs disagree with synthesized inputs")]
    PublicInputMismatch,
}

/// Key used by [`prove`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProvingKey {
    shape: Shape,
}

impl ProvingKey {
    /// Total gates in the circuit.
    #[must_use]
    pub const fn gates(&self) -> usize {
        self.shape.gates
    }

    /// The verifying key paired with this proving key.
    #[must_use]
    pub const fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey {
            digest: self.shape.digest,
            public_inputs: self.shape.public_inputs,
        }
    }
}

/// Key used by [`verify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyingKey {
    digest: [u8; 64],
    public_inputs: usize,
}

impl VerifyingKey {
    /// Number of public inputs a proof must be checked against.
    #[must_use]
    pub const fn public_inputs(&self) -> usize {
        self.public_inputs
    }

    fn tag(&self, public_inputs: &[Fp]) -> [u8; 64] {
        let mut state = blake2b_simd::Params::new()
            .hash_length(64)
            .personal(PROOF_PERSONALIZATION)
            .to_state();
        state.update(&self.digest);
        for input in public_inputs {
            state.update(&input.to_repr());
        }
        *state.finalize().as_array()
    }
}

/// An opaque proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proof([u8; 64]);

impl From<[u8; 64]> for Proof {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

impl From<Proof> for [u8; 64] {
    fn from(proof: Proof) -> Self {
        proof.0
    }
}

fn record<C: Circuit>(circuit: &C) -> Result<Shape, OracleError> {
    let mut recorder = ShapeRecorder::new(C::NAME);
    circuit.synthesize(&mut recorder)?;
    Ok(recorder.finish())
}

/// Compiles `circuit` into a key pair.
///
/// Only the shape of `circuit` matters; its witness values are ignored.
pub fn setup<C: Circuit>(circuit: &C) -> Result<(ProvingKey, VerifyingKey), OracleError> {
    let shape = record(circuit)?;
    tracing::debug!(
        circuit = C::NAME,
        gates = shape.gates,
        public_inputs = shape.public_inputs,
        "setup"
    );
    let pk = ProvingKey { shape };
    Ok((pk, pk.verifying_key()))
}

/// Proves that `circuit`'s witness satisfies every assertion.
pub fn prove<C: Circuit>(circuit: &C, pk: &ProvingKey) -> Result<Proof, OracleError> {
    if record(circuit)? != pk.shape {
        return Err(OracleError::ShapeMismatch);
    }

    let mut evaluator = Evaluator::default();
    circuit.synthesize(&mut evaluator)?;

    let declared = circuit.public_inputs();
    if evaluator.public_inputs() != declared.as_slice() {
        return Err(OracleError::PublicInputMismatch);
    }
    tracing::debug!(
        circuit = C::NAME,
        gates = evaluator.gates(),
        public_inputs = declared.len(),
        "proved"
    );

    Ok(Proof(pk.verifying_key().tag(&declared)))
}

/// Checks `proof` against `public_inputs`.
#[must_use]
pub fn verify(proof: &Proof, vk: &VerifyingKey, public_inputs: &[Fp]) -> bool {
    public_inputs.len() == vk.public_inputs && vk.tag(public_inputs) == proof.0
}

#[cfg(test)]
mod tests {
    use ff::Field as _;

    use super::*;
    use crate::{gadgets::Element, hash::Sponge};

    /// Knowledge of a hash preimage: `y = H(x)`.
    struct Preimage {
        preimage: Fp,
        image: Fp,
    }

    impl Circuit for Preimage {
        const NAME: &'static str = "preimage";

        fn public_inputs(&self) -> Vec<Fp> {
            vec![self.image]
        }

        fn synthesize<D: Driver>(&self, dr: &mut D) -> Result<(), Unsatisfied> {
            let image = Element::public(dr, self.image);
            let preimage = Element::alloc(dr, self.preimage);
            Sponge::hash(dr, &[&preimage]).enforce_equal(dr, &image, "image")
        }
    }

    /// A circuit with one more gate than [`Preimage`].
    struct Squared(Preimage);

    impl Circuit for Squared {
        const NAME: &'static str = "preimage";

        fn public_inputs(&self) -> Vec<Fp> {
            self.0.public_inputs()
        }

        fn synthesize<D: Driver>(&self, dr: &mut D) -> Result<(), Unsatisfied> {
            let image = Element::public(dr, self.0.image);
            let preimage = Element::alloc(dr, self.0.preimage);
            let squared = preimage.mul(dr, &preimage);
            Sponge::hash(dr, &[&squared]).enforce_equal(dr, &image, "image")
        }
    }

    fn honest() -> Preimage {
        let preimage = Fp::from(42u64);
        Preimage {
            preimage,
            image: crate::Hasher::hash(&[preimage]),
        }
    }

    #[test]
    fn round_trip() {
        let circuit = honest();
        let (pk, vk) = setup(&circuit).unwrap();
        let proof = prove(&circuit, &pk).unwrap();
        assert!(verify(&proof, &vk, &circuit.public_inputs()));
    }

    /// Setup depends only on shape, not on witness values.
    #[test]
    fn setup_ignores_values() {
        let bogus = Preimage {
            preimage: Fp::ZERO,
            image: Fp::ONE,
        };
        assert_eq!(setup(&bogus).unwrap(), setup(&honest()).unwrap());
    }

    #[test]
    fn wrong_witness_is_unsatisfied() {
        let circuit = Preimage {
            preimage: Fp::from(43u64),
            ..honest()
        };
        let (pk, _) = setup(&circuit).unwrap();
        assert_eq!(
            prove(&circuit, &pk).unwrap_err(),
            OracleError::Unsatisfied(Unsatisfied { label: "image" })
        );
    }

    #[test]
    fn other_public_inputs_reject() {
        let circuit = honest();
        let (pk, vk) = setup(&circuit).unwrap();
        let proof = prove(&circuit, &pk).unwrap();
        assert!(!verify(&proof, &vk, &[Fp::ONE]));
        assert!(!verify(&proof, &vk, &[]));
    }

    #[test]
    fn key_for_other_shape_rejected() {
        let (pk, _) = setup(&honest()).unwrap();
        let other = Squared(honest());
        assert_eq!(prove(&other, &pk).unwrap_err(), OracleError::ShapeMismatch);
    }
}

//! Constraint drivers.
//!
//! A circuit is a function over `&mut D` where `D: Driver`. Every gadget
//! operation records a [`Gate`] and every assertion goes through
//! [`Driver::enforce`]. The driver decides what recording means.

use blake2b_simd::State;
use pasta_curves::Fp;

/// BLAKE2b-512 personalization for circuit shape digests.
pub const SHAPE_PERSONALIZATION: &[u8; 16] = b"Oracle-CircShape";

/// An assertion that did not hold for the supplied witness.
///
/// The label names the failed check, e.g. `"cipher.c1"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsatisfied constraint: {label}")]
pub struct Unsatisfied {
    /// Static name of the failed assertion.
    pub label: &'static str,
}

/// Kind of a recorded gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// Private witness allocation.
    Alloc,
    /// Fixed constant.
    Constant,
    /// Public input slot.
    Public,
    /// Field addition.
    Add,
    /// Field subtraction.
    Sub,
    /// Field multiplication.
    Mul,
    /// Boolean allocation ($b (1 - b) = 0$).
    Boolean,
    /// Conditional selection by a boolean.
    Select,
    /// One hash absorption.
    Absorb,
    /// Hash finalization.
    Squeeze,
    /// Curve scalar multiplication.
    ScalarMul,
    /// 64-bit range decomposition.
    Range,
    /// Equality assertion.
    Enforce,
}

impl Gate {
    /// Stable one-byte tag used in shape digests.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Alloc => 0x01,
            Self::Constant => 0x02,
            Self::Public => 0x03,
            Self::Add => 0x04,
            Self::Sub => 0x05,
            Self::Mul => 0x06,
            Self::Boolean => 0x07,
            Self::Select => 0x08,
            Self::Absorb => 0x09,
            Self::Squeeze => 0x0a,
            Self::ScalarMul => 0x0b,
            Self::Range => 0x0c,
            Self::Enforce => 0x0d,
        }
    }
}

/// An explicit constraint builder, exclusively borrowed by circuit code.
pub trait Driver {
    /// Records a gate.
    fn gate(&mut self, gate: Gate);

    /// Records a public input slot carrying `value`.
    fn public_input(&mut self, value: Fp);

    /// Records an assertion named `label`. `holds` is the assertion's
    /// truth value under the current witness.
    fn enforce(&mut self, holds: bool, label: &'static str) -> Result<(), Unsatisfied>;
}

// =============================================================================
// Evaluator
// =============================================================================

/// Runs a circuit over a concrete witness.
///
/// Fails on the first assertion that does not hold.
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    gates: usize,
    public_inputs: Vec<Fp>,
}

impl Evaluator {
    /// Number of gates recorded so far.
    #[must_use]
    pub const fn gates(&self) -> usize {
        self.gates
    }

    /// Public inputs in allocation order.
    #[must_use]
    pub fn public_inputs(&self) -> &[Fp] {
        &self.public_inputs
    }

    /// Consumes the evaluator, returning the public inputs.
    #[must_use]
    pub fn into_public_inputs(self) -> Vec<Fp> {
        self.public_inputs
    }
}

impl Driver for Evaluator {
    fn gate(&mut self, _gate: Gate) {
        self.gates += 1;
    }

    fn public_input(&mut self, value: Fp) {
        self.public_inputs.push(value);
    }

    fn enforce(&mut self, holds: bool, label: &'static str) -> Result<(), Unsatisfied> {
        self.gate(Gate::Enforce);
        if holds {
            Ok(())
        } else {
            tracing::warn!(label, "constraint unsatisfied");
            Err(Unsatisfied { label })
        }
    }
}

// =============================================================================
// Shape recorder
// =============================================================================

/// Digest of a circuit's structure, independent of witness values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shape {
    /// BLAKE2b-512 over the circuit name, gate tags and assertion labels.
    pub digest: [u8; 64],
    /// Total recorded gates.
    pub gates: usize,
    /// Number of public input slots.
    pub public_inputs: usize,
}

/// Records the structure of a circuit.
///
/// Assertions always succeed: the recorder only cares about which checks
/// exist, not whether they hold.
#[derive(Clone, Debug)]
pub struct ShapeRecorder {
    state: State,
    gates: usize,
    public_inputs: usize,
}

impl ShapeRecorder {
    /// Starts recording a circuit named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut state = blake2b_simd::Params::new()
            .hash_length(64)
            .personal(SHAPE_PERSONALIZATION)
            .to_state();
        state.update(name.as_bytes());
        Self {
            state,
            gates: 0,
            public_inputs: 0,
        }
    }

    /// Finishes recording.
    #[must_use]
    pub fn finish(self) -> Shape {
        Shape {
            digest: *self.state.finalize().as_array(),
            gates: self.gates,
            public_inputs: self.public_inputs,
        }
    }
}

impl Driver for ShapeRecorder {
    fn gate(&mut self, gate: Gate) {
        self.state.update(&[gate.tag()]);
        self.gates += 1;
    }

    fn public_input(&mut self, _value: Fp) {
        self.public_inputs += 1;
    }

    fn enforce(&mut self, _holds: bool, label: &'static str) -> Result<(), Unsatisfied> {
        self.gate(Gate::Enforce);
        self.state.update(&label.len().to_le_bytes());
        self.state.update(label.as_bytes());
        Ok(())
    }
}

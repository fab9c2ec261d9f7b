//! # proof_oracle
//!
//! A BLAKE2b-based mock of a zero-knowledge proving backend, for testing
//! circuits without a real SNARK.
//!
//! Circuits are written once against the [`Driver`] trait and are run by
//! two drivers:
//!
//! - [`ShapeRecorder`] walks the circuit and digests its gate sequence and
//!   assertion labels. The digest is the "compiled circuit": keys produced by
//!   [`setup`] are bound to it.
//! - [`Evaluator`] walks the circuit with concrete values and aborts with
//!   [`Unsatisfied`] on the first failed assertion.
//!
//! [`prove`] only emits a [`Proof`] when the evaluator accepts every
//! assertion. The proof is a BLAKE2b tag over the shape digest and the
//! public inputs, so [`verify`] rejects any proof presented with different
//! public inputs or against a key for a different circuit.
//!
//! ## Warning
//!
//! This is **not** zero-knowledge and **not** sound against a malicious
//! prover: anyone holding the verifying key can compute a tag. It exists to
//! exercise constraint logic end to end.
//!
//! ## Gadgets
//!
//! | Gadget | Description |
//! | ------ | ----------- |
//! | [`Element`] | Allocated field element with arithmetic and range gates |
//! | [`Boolean`] | Allocated bit, used for ordered selection |
//! | [`Point`] | Allocated Pallas point with scalar multiplication |
//! | [`Sponge`] | In-circuit incremental algebraic hash (`write` / `sum`) |
//!
//! [`Hasher`] is the native counterpart of [`Sponge`]; both produce identical
//! digests.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::pub_use, reason = "exporting items for consumers")]

pub mod driver;
pub mod gadgets;
pub mod hash;
pub mod proof;

pub use driver::{Driver, Evaluator, Gate, ShapeRecorder, Unsatisfied};
pub use gadgets::{Boolean, Element, Point};
pub use hash::{Hasher, Sponge};
pub use pasta_curves::{Fp, Fq, pallas};
pub use proof::{Circuit, OracleError, Proof, ProvingKey, VerifyingKey, prove, setup, verify};

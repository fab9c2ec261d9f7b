//! # zkact
//!
//! Confidential notes with zero-knowledge transfer and sealed-bid auction
//! settlement, plus threshold Pointcheval-Sanders signatures for
//! distributed authorization.
//!
//! ## Layers
//!
//! - **Notes** ([`note`], [`keys`]) — $Cm = H(T_0, T_1, R, \rho, Pk)$,
//!   $Sn = H(Sk, \rho)$, $Pk = H(Sk)$
//! - **Hybrid cipher** ([`cipher`]) — hands $(Sk_{in}, Pk_{out}, B)$ to a
//!   recipient through Diffie-Hellman masks
//! - **Commitment tree** ([`merkle`]) — fixed-depth membership paths
//! - **Circuits** ([`circuit`]) — registration, batched transfer and
//!   auction settlement over a [`proof_oracle`] driver
//! - **Threshold signatures** ([`threshold`]) — dealer, partial signing,
//!   Lagrange aggregation, pairing verification
//!
//! The threshold scheme is independent of the circuits. Its signatures
//! authorize registrations or auction results elsewhere.
//!
//! ## Sizes
//!
//! Batch size $l$, tree depth $h$ and auction size $n$ are carried by
//! [`Params`] and fixed when a circuit is constructed.
//!
//! ## Example
//!
//! ```
//! use group::prime::PrimeCurveAffine as _;
//! use proof_oracle::{Circuit as _, pallas, prove, setup, verify};
//! use rand::{SeedableRng as _, rngs::StdRng};
//! use zkact::{Note, RegistrationCircuit, SecretKey, Tag};
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let note = Note::mint(Tag::new(0, 100), SecretKey::random(&mut rng), &mut rng);
//! let recipient = SecretKey::random(&mut rng).public_key();
//!
//! let circuit =
//!     RegistrationCircuit::build(note, recipient, 40, pallas::Affine::generator(), &mut rng)?;
//! let (pk, vk) = setup(&circuit)?;
//! let proof = prove(&circuit, &pk)?;
//! assert!(verify(&proof, &vk, &circuit.public_inputs()));
//! # Ok::<(), Box<dyn core::error::Error>>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::pub_use, reason = "exporting items for consumers")]

extern crate alloc;

pub mod cipher;
pub mod circuit;
pub mod config;
pub mod constants;
pub mod keys;
pub mod merkle;
pub mod note;
pub mod threshold;

pub use circuit::{AuctionCircuit, Payee, RegistrationCircuit, TransferCircuit};
pub use config::Params;
pub use keys::{PublicKey, SecretKey};
pub use merkle::{MerklePath, MerkleTree};
pub use note::{Note, Tag};

//! Registration, transfer and auction circuits.
//!
//! Each circuit is a [`proof_oracle::Circuit`]: a public instance, a
//! secret witness, and a synthesis routine that walks the checks of the
//! note algebra, the hybrid cipher and the Merkle verifier against an
//! explicit [`Driver`](proof_oracle::Driver).
//!
//! | Circuit | Spends | Creates | Extra check |
//! | ------- | ------ | ------- | ----------- |
//! | [`RegistrationCircuit`] | none | one ciphertext | $Pk_{in} = H(Sk_{in})$ |
//! | [`TransferCircuit`] | $l$ notes under $Rt$ | $l$ notes | $\sum T_1^{old} = \sum T_1^{new}$ |
//! | [`AuctionCircuit`] | $n$ bids | $n$ notes | buyers $B_i \ge p$, sellers $B_i \le p$ |
//!
//! Every check within a circuit is independent of every other; the
//! verdict is their conjunction. A single failed assertion makes the whole
//! instance unprovable.
//!
//! ## Public input layout
//!
//! Points are laid out as $(x, y)$. Ciphertexts as $(C_1, C_2, C_3)$.
//! Each circuit documents its own order on `public_inputs`.

#![expect(
    clippy::module_name_repetitions,
    reason = "RegistrationCircuit and friends name the circuit they build"
)]

use crate::{config::ConfigError, keys::PublicKey, merkle::TreeError, note::Tag};

mod auction;
pub(crate) mod gadgets;
mod registration;
mod transfer;

pub use auction::{AuctionCircuit, AuctionInstance, Bid, BidInstance, BidWitness};
pub use registration::{RegistrationCircuit, RegistrationInstance, RegistrationWitness};
pub use transfer::{LegInstance, LegWitness, TransferCircuit, TransferInstance, derive_rhos};

/// A witness whose shape disagrees with the circuit parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// Wrong number of transfer legs.
    #[error("expected {expected} transfer legs, got {actual}")]
    Legs {
        /// Configured batch size.
        expected: usize,
        /// Supplied legs.
        actual: usize,
    },

    /// A membership path of the wrong depth.
    #[error("expected merkle paths of depth {expected}, got {actual}")]
    PathDepth {
        /// Configured tree depth.
        expected: usize,
        /// Supplied path depth.
        actual: usize,
    },

    /// Wrong number of auction bids.
    #[error("expected {expected} bids, got {actual}")]
    Bids {
        /// Configured auction size.
        expected: usize,
        /// Supplied bids.
        actual: usize,
    },

    /// The parameters themselves are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A spent note is not in the commitment tree.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The key-agreement generator is the identity, so every mask would be
    /// derived from the public point $(0, 0)$.
    #[error("key-agreement generator is the identity")]
    IdentityGenerator,
}

/// The recipient side of a created note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payee {
    /// Tag of the created note.
    pub tag: Tag,
    /// Recipient public key.
    pub pk: PublicKey,
}

//! Threshold Pointcheval-Sanders signatures over BLS12-381.
//!
//! Any $t$ of $n$ authorities jointly produce one signature that verifies
//! under a single aggregate public key. Fewer than $t$ cannot.
//!
//! ## Lifecycle
//!
//! 1. **Deal** — [`deal`] samples polynomials $v, w$ of degree $t - 1$ and
//!    issues $(X_i, Y_i, i) = (v(i), w(i), i)$ for $i = 0..n$. Index $0$ is
//!    the virtual aggregate share, never handed to a live party.
//! 2. **Publish** — each share yields
//!    $(\tilde G, \tilde X_i, \tilde Y_i) = (\tilde G, \tilde G^{X_i}, \tilde G^{Y_i})$
//!    over a random generator $\tilde G$ fixed at dealing.
//! 3. **Sign** — [`partial_sign`] hashes the message to
//!    $h \in \mathbb{G}_1$ and returns $(h, h^{Y_i m + X_i}, i)$.
//! 4. **Aggregate** — [`aggregate`] interpolates the $\sigma_2$ shares at
//!    zero: $\sigma_2 = \sum_i \ell_i \cdot \sigma_{2,i}$.
//! 5. **Verify** — [`verify`] accepts iff
//!    $e(\sigma_1, \tilde X \tilde Y^m) = e(\sigma_2, \tilde G)$.
//!
//! Every partial signature over one message shares the same $h$, so the
//! result does not depend on which quorum signed.
//!
//! ## Wire format
//!
//! | Type | Layout | Bytes |
//! | ---- | ------ | ----- |
//! | [`PublicKey`] | $\tilde G \| \tilde X \| \tilde Y$ (compressed $\mathbb{G}_2$) | 288 |
//! | [`PartialSignature`] | $\sigma_1 \| \sigma_2$ (compressed $\mathbb{G}_1$) $\|$ index scalar | 128 |
//! | [`Signature`] | $\sigma_1 \| \sigma_2$ | 96 |
//! | [`Message`] | little-endian scalar | 32 |
//! | [`KeyShare`] | $X \| Y \|$ index scalar | 96 |

mod codec;
mod dealer;
mod keys;
mod sign;

pub use dealer::{Dealing, Polynomial, deal};
pub use keys::{KeyShare, PublicKey};
pub use sign::{
    Message, PartialSignature, Signature, aggregate, hash_to_g1, partial_sign, sign, verify,
};

/// Invalid dealing parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DealError {
    /// A threshold of zero admits anyone.
    #[error("threshold must be at least 1")]
    ZeroThreshold,

    /// More signers required than exist.
    #[error("threshold {threshold} exceeds {participants} participants")]
    ThresholdTooLarge {
        /// Requested $t$.
        threshold: u32,
        /// Requested $n$.
        participants: u32,
    },
}

/// Signing and aggregation failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The message hashed to the identity. Retry with a re-randomized
    /// message.
    #[error("message hashed to the identity element")]
    DegenerateHash,

    /// Partial signatures disagree on $\sigma_1$. Never retry: the inputs
    /// are inconsistent or substituted.
    #[error("partial signatures disagree on sigma1")]
    MismatchedBase,

    /// Two partial signatures carry the same index.
    #[error("duplicate partial signature for index {0}")]
    DuplicateIndex(u32),

    /// Fewer partial signatures than the threshold.
    #[error("need {required} partial signatures, got {actual}")]
    InsufficientShares {
        /// Threshold $t$.
        required: u32,
        /// Supplied partial signatures.
        actual: usize,
    },

    /// Nothing to aggregate.
    #[error("no partial signatures")]
    NoPartials,
}

/// Malformed serialized input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Wrong input length.
    #[error("expected {expected} bytes, got {actual}")]
    Length {
        /// Fixed encoding width.
        expected: usize,
        /// Supplied bytes.
        actual: usize,
    },

    /// Bytes are not a valid compressed group element.
    #[error("invalid compressed point")]
    InvalidPoint,

    /// Bytes are not a canonical scalar.
    #[error("invalid scalar encoding")]
    InvalidScalar,

    /// The index scalar does not fit a share index.
    #[error("share index out of range")]
    InvalidIndex,
}

//! Notes, note commitments and nullifiers.
//!
//! ## Note Structure
//!
//! | Field | Type | Description |
//! | ----- | ---- | ----------- |
//! | `tag` | [`Tag`] | $T = (T_0, T_1)$: asset class and amount |
//! | `pk`  | [`PublicKey`] | Owner public key, $Pk = H(Sk)$ |
//! | `sk`  | [`SecretKey`] or `()` | Owner secret key, witness view only |
//! | `rho` | [`Rho`] | Serial number source |
//! | `rcm` | [`Trapdoor`] | Commitment randomness $R$ |
//!
//! A single [`Note`] type is parameterized by [`Visibility`]:
//! [`Note<Witnessed>`] carries the owner's secret key and is what provers
//! hold; [`Note<Public>`] has none and is safe to hand to anyone who may
//! see the commitment opening.
//!
//! ## Commitment and nullifier
//!
//! $$Cm = H(T_0, T_1, R, \rho, Pk) \qquad Sn = H(Sk, \rho)$$
//!
//! Both are evaluated natively here and in-circuit by
//! [`circuit`](crate::circuit). Both must produce identical results.

use core::fmt::Debug;

use ff::Field as _;
use pasta_curves::Fp;
use proof_oracle::Hasher;
use rand::{CryptoRng, RngCore};

use crate::keys::{PublicKey, SecretKey, key_gen};

// =============================================================================
// Visibility
// =============================================================================

mod sealed {
    pub trait Sealed {}
}

/// Which view of a note is held.
pub trait Visibility: sealed::Sealed + Clone + Copy + Debug + PartialEq + Eq {
    /// The secret key slot: [`SecretKey`] or `()`.
    type SecretKey: Clone + Copy + Debug + PartialEq + Eq;
}

/// The owner's view, including $Sk$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Witnessed;

/// The commitment-only view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Public;

impl sealed::Sealed for Witnessed {}
impl sealed::Sealed for Public {}

impl Visibility for Witnessed {
    type SecretKey = SecretKey;
}

impl Visibility for Public {
    type SecretKey = ();
}

// =============================================================================
// Note fields
// =============================================================================

/// Note type tag $T = (T_0, T_1)$.
///
/// $T_1$ is the amount channel summed by value conservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tag {
    /// $T_0$: asset class.
    pub class: Fp,
    /// $T_1$: amount.
    pub amount: Fp,
}

impl Tag {
    /// A tag from integer class and amount.
    #[must_use]
    pub fn new(class: u64, amount: u64) -> Self {
        Self {
            class: Fp::from(class),
            amount: Fp::from(amount),
        }
    }
}

/// Per-note serial $\rho$, the nullifier source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rho(Fp);

impl From<Fp> for Rho {
    fn from(rho: Fp) -> Self {
        Self(rho)
    }
}

impl From<Rho> for Fp {
    fn from(rho: Rho) -> Self {
        rho.0
    }
}

/// Commitment randomness $R$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trapdoor(Fp);

impl From<Fp> for Trapdoor {
    fn from(rcm: Fp) -> Self {
        Self(rcm)
    }
}

impl From<Trapdoor> for Fp {
    fn from(rcm: Trapdoor) -> Self {
        rcm.0
    }
}

// =============================================================================
// Note
// =============================================================================

/// A confidential note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note<V: Visibility = Witnessed> {
    /// Type tag.
    pub tag: Tag,
    /// Owner public key.
    pub pk: PublicKey,
    /// Owner secret key, present only in the [`Witnessed`] view.
    pub sk: V::SecretKey,
    /// Serial.
    pub rho: Rho,
    /// Commitment randomness.
    pub rcm: Trapdoor,
}

impl<V: Visibility> Note<V> {
    /// $Cm = H(T_0, T_1, R, \rho, Pk)$
    #[must_use]
    pub fn commitment(&self) -> Commitment {
        commit(&self.tag, &self.rcm, &self.rho, &self.pk)
    }
}

impl Note<Witnessed> {
    /// Mints a note owned by `sk` with fresh $\rho$ and $R$ from `rng`.
    pub fn mint<R: RngCore + CryptoRng>(tag: Tag, sk: SecretKey, rng: &mut R) -> Self {
        Self {
            tag,
            pk: key_gen(&sk),
            sk,
            rho: Rho(Fp::random(&mut *rng)),
            rcm: Trapdoor(Fp::random(rng)),
        }
    }

    /// $Sn = H(Sk, \rho)$
    #[must_use]
    pub fn nullifier(&self) -> Nullifier {
        nullify(&self.sk, &self.rho)
    }

    /// Drops the secret key.
    #[must_use]
    pub const fn public(&self) -> Note<Public> {
        Note {
            tag: self.tag,
            pk: self.pk,
            sk: (),
            rho: self.rho,
            rcm: self.rcm,
        }
    }
}

impl Note<Public> {
    /// Issues a note to an owner known only by `pk`, with fresh $\rho$ and
    /// $R$ from `rng`.
    pub fn issue<R: RngCore + CryptoRng>(tag: Tag, pk: PublicKey, rng: &mut R) -> Self {
        Self {
            tag,
            pk,
            sk: (),
            rho: Rho(Fp::random(&mut *rng)),
            rcm: Trapdoor(Fp::random(rng)),
        }
    }
}

// =============================================================================
// Commitment and nullifier
// =============================================================================

/// A note commitment $Cm$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commitment(Fp);

impl From<Fp> for Commitment {
    fn from(cm: Fp) -> Self {
        Self(cm)
    }
}

impl From<Commitment> for Fp {
    fn from(cm: Commitment) -> Self {
        cm.0
    }
}

/// A nullifier $Sn$, revealed when a note is spent.
///
/// Uniqueness is enforced by the ledger, not here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nullifier(Fp);

impl From<Fp> for Nullifier {
    fn from(sn: Fp) -> Self {
        Self(sn)
    }
}

impl From<Nullifier> for Fp {
    fn from(sn: Nullifier) -> Self {
        sn.0
    }
}

/// $\text{Commit}(T, R, \rho, Pk) = H(T_0, T_1, R, \rho, Pk)$
#[must_use]
pub fn commit(tag: &Tag, rcm: &Trapdoor, rho: &Rho, pk: &PublicKey) -> Commitment {
    Commitment(Hasher::hash(&[
        tag.class,
        tag.amount,
        rcm.0,
        rho.0,
        (*pk).into(),
    ]))
}

/// $\text{Nullify}(Sk, \rho) = H(Sk, \rho)$
#[must_use]
pub fn nullify(sk: &SecretKey, rho: &Rho) -> Nullifier {
    Nullifier(Hasher::hash(&[(*sk).into(), rho.0]))
}

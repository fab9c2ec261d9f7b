//! Owner keys.
//!
//! A note owner holds a [`SecretKey`] $Sk$ and publishes
//! $Pk = \text{KeyGen}(Sk) = H(Sk)$. Spending a note requires knowledge of
//! $Sk$; the nullifier is derived from it.

use ff::Field as _;
use pasta_curves::Fp;
use proof_oracle::Hasher;
use rand::{CryptoRng, RngCore};

/// An owner's secret key $Sk$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecretKey(Fp);

impl SecretKey {
    /// Samples a fresh secret key.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(Fp::random(rng))
    }

    /// $Pk = H(Sk)$
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        key_gen(self)
    }
}

impl From<Fp> for SecretKey {
    fn from(sk: Fp) -> Self {
        Self(sk)
    }
}

impl From<SecretKey> for Fp {
    fn from(sk: SecretKey) -> Self {
        sk.0
    }
}

/// An owner's public key $Pk$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(Fp);

impl From<Fp> for PublicKey {
    fn from(pk: Fp) -> Self {
        Self(pk)
    }
}

impl From<PublicKey> for Fp {
    fn from(pk: PublicKey) -> Self {
        pk.0
    }
}

/// $\text{KeyGen}(Sk) = H(Sk)$
#[must_use]
pub fn key_gen(sk: &SecretKey) -> PublicKey {
    PublicKey(Hasher::hash(&[sk.0]))
}

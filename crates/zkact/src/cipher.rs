//! Hybrid hash-chain cipher.
//!
//! Hands three secrets from sender to recipient over a public channel:
//! the re-spend authorization $Sk_{in}$, the recipient key $Pk_{out}$ and a
//! value or bid $B_i$.
//!
//! ## Key agreement
//!
//! Sender and recipient each contribute an [`Exponent`] to the public
//! generator $G$:
//!
//! $$G_r = G^r \qquad G_b = G^b \qquad G_{rb} = G_b^{\,r} = G_r^{\,b}$$
//!
//! ## Masking
//!
//! $$m_1 = H(G_{rb}.x, G_{rb}.y) \quad m_2 = H(m_1) \quad m_3 = H(m_2)$$
//! $$C_1 = Sk_{in} + m_1 \quad C_2 = Pk_{out} + m_2 \quad C_3 = B_i + m_3$$
//!
//! Masking is field addition, so opening is subtraction. It is not a
//! bitwise XOR and is only as hiding as the masks are unpredictable.

use ff::Field as _;
use group::Curve as _;
use pasta_curves::{Fp, pallas};
use proof_oracle::{Hasher, gadgets::coordinates, gadgets::to_scalar};
use rand::{CryptoRng, RngCore};

use crate::keys::{PublicKey, SecretKey};

/// A Diffie-Hellman exponent ($r$ or $b$).
///
/// Held as a base field element so circuits can witness it directly; it
/// acts on the curve as a Pallas scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exponent(Fp);

impl Exponent {
    /// Samples a fresh exponent.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(Fp::random(rng))
    }

    /// $P^e$
    #[must_use]
    pub fn apply(&self, base: &pallas::Affine) -> pallas::Affine {
        (*base * to_scalar(self.0)).to_affine()
    }

    /// Shared secret with the holder of `their_public`.
    #[must_use]
    pub fn agree(&self, their_public: &pallas::Affine) -> SharedSecret {
        SharedSecret(self.apply(their_public))
    }
}

impl From<Fp> for Exponent {
    fn from(exponent: Fp) -> Self {
        Self(exponent)
    }
}

impl From<Exponent> for Fp {
    fn from(exponent: Exponent) -> Self {
        exponent.0
    }
}

/// The agreed point $G_{rb}$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SharedSecret(pallas::Affine);

impl SharedSecret {
    /// The shared point.
    #[must_use]
    pub const fn point(&self) -> pallas::Affine {
        self.0
    }
}

impl From<pallas::Affine> for SharedSecret {
    fn from(point: pallas::Affine) -> Self {
        Self(point)
    }
}

/// Both sides of one key agreement, as witnessed by a prover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exchange {
    /// Sender exponent $r$.
    pub sender: Exponent,
    /// Recipient exponent $b$.
    pub recipient: Exponent,
}

impl Exchange {
    /// Samples both exponents.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            sender: Exponent::random(&mut *rng),
            recipient: Exponent::random(rng),
        }
    }

    /// The public half: $(G_r, G_b)$.
    #[must_use]
    pub fn handoff(&self, generator: &pallas::Affine) -> Handoff {
        Handoff {
            g_r: self.sender.apply(generator),
            g_b: self.recipient.apply(generator),
        }
    }

    /// $G_{rb} = (G^b)^r$
    #[must_use]
    pub fn shared(&self, generator: &pallas::Affine) -> SharedSecret {
        self.sender.agree(&self.recipient.apply(generator))
    }
}

/// Public key-agreement points published with a ciphertext.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handoff {
    /// $G_r = G^r$
    pub g_r: pallas::Affine,
    /// $G_b = G^b$
    pub g_b: pallas::Affine,
}

/// The mask chain derived from a shared secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Masks {
    /// $m_1 = H(G_{rb}.x, G_{rb}.y)$
    pub m1: Fp,
    /// $m_2 = H(m_1)$
    pub m2: Fp,
    /// $m_3 = H(m_2)$
    pub m3: Fp,
}

impl Masks {
    /// Derives the chain from `shared`.
    #[must_use]
    pub fn derive(shared: &SharedSecret) -> Self {
        let (x, y) = coordinates(&shared.0);
        let m1 = Hasher::hash(&[x, y]);
        let m2 = Hasher::hash(&[m1]);
        let m3 = Hasher::hash(&[m2]);
        Self { m1, m2, m3 }
    }
}

/// The three handed-off secrets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payload {
    /// $Sk_{in}$
    pub sk_in: SecretKey,
    /// $Pk_{out}$
    pub pk_out: PublicKey,
    /// $B_i$
    pub value: Fp,
}

/// Public ciphertext fields $(C_1, C_2, C_3)$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    /// $C_1 = Sk_{in} + m_1$
    pub c1: Fp,
    /// $C_2 = Pk_{out} + m_2$
    pub c2: Fp,
    /// $C_3 = B_i + m_3$
    pub c3: Fp,
}

impl Ciphertext {
    /// Masks `payload` under `shared`.
    #[must_use]
    pub fn seal(payload: &Payload, shared: &SharedSecret) -> Self {
        let masks = Masks::derive(shared);
        Self {
            c1: Fp::from(payload.sk_in) + masks.m1,
            c2: Fp::from(payload.pk_out) + masks.m2,
            c3: payload.value + masks.m3,
        }
    }

    /// Removes the masks derived from `shared`.
    ///
    /// Always succeeds: a wrong shared secret yields unrelated values.
    #[must_use]
    pub fn open(&self, shared: &SharedSecret) -> Payload {
        let masks = Masks::derive(shared);
        Payload {
            sk_in: SecretKey::from(self.c1 - masks.m1),
            pk_out: PublicKey::from(self.c2 - masks.m2),
            value: self.c3 - masks.m3,
        }
    }
}

#[cfg(test)]
mod tests {
    use group::prime::PrimeCurveAffine as _;
    use proptest::prelude::*;
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;

    #[test]
    fn agreement_commutes() {
        let mut rng = StdRng::seed_from_u64(0);
        let generator = pallas::Affine::generator();
        let exchange = Exchange::random(&mut rng);
        let handoff = exchange.handoff(&generator);

        let sender_side = exchange.sender.agree(&handoff.g_b);
        let recipient_side = exchange.recipient.agree(&handoff.g_r);
        assert_eq!(sender_side, recipient_side);
        assert_eq!(sender_side, exchange.shared(&generator));
    }

    #[test]
    fn masks_form_a_chain() {
        let shared = SharedSecret::from(pallas::Affine::generator());
        let masks = Masks::derive(&shared);
        assert_eq!(masks.m2, Hasher::hash(&[masks.m1]));
        assert_eq!(masks.m3, Hasher::hash(&[masks.m2]));
        assert_ne!(masks.m1, masks.m2);
    }

    proptest! {
        /// Opening under the same shared secret reproduces the payload.
        #[test]
        fn seal_open_round_trip(seed in any::<u64>(), value in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let generator = pallas::Affine::generator();
            let shared = Exchange::random(&mut rng).shared(&generator);
            let sk = SecretKey::random(&mut rng);
            let payload = Payload {
                sk_in: sk,
                pk_out: SecretKey::random(&mut rng).public_key(),
                value: Fp::from(value),
            };

            let sealed = Ciphertext::seal(&payload, &shared);
            prop_assert_eq!(sealed.open(&shared), payload);

            let stranger = Exchange::random(&mut rng).shared(&generator);
            prop_assert_ne!(sealed.open(&stranger), payload);
        }
    }
}

//! In-circuit mirrors of the note algebra, the cipher and the Merkle
//! verifier. Each must agree with its native counterpart.

use group::prime::PrimeCurveAffine as _;
use pasta_curves::{Fp, pallas};
use proof_oracle::{Boolean, Driver, Element, Point, Sponge, Unsatisfied, gadgets::coordinates};

use super::ShapeError;
use crate::{
    cipher::{Ciphertext, Handoff},
    merkle::MerklePath,
    note::{Note, Visibility},
};

/// Appends the coordinates of `point` to a public input list.
pub(crate) fn push_point(inputs: &mut Vec<Fp>, point: &pallas::Affine) {
    let (x, y) = coordinates(point);
    inputs.push(x);
    inputs.push(y);
}

/// Appends $(C_1, C_2, C_3)$ to a public input list.
pub(crate) fn push_ciphertext(inputs: &mut Vec<Fp>, ciphertext: &Ciphertext) {
    inputs.extend([ciphertext.c1, ciphertext.c2, ciphertext.c3]);
}

// =============================================================================
// Note algebra
// =============================================================================

/// Allocated note fields, without the secret key.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NoteVars {
    pub(crate) class: Element,
    pub(crate) amount: Element,
    pub(crate) pk: Element,
    pub(crate) rho: Element,
    pub(crate) rcm: Element,
}

impl NoteVars {
    pub(crate) fn alloc<D: Driver, V: Visibility>(dr: &mut D, note: &Note<V>) -> Self {
        Self {
            class: Element::alloc(dr, note.tag.class),
            amount: Element::alloc(dr, note.tag.amount),
            pk: Element::alloc(dr, note.pk.into()),
            rho: Element::alloc(dr, note.rho.into()),
            rcm: Element::alloc(dr, note.rcm.into()),
        }
    }
}

/// $Pk = H(Sk)$
pub(crate) fn key_gen<D: Driver>(dr: &mut D, sk: &Element) -> Element {
    Sponge::hash(dr, &[sk])
}

/// $Cm = H(T_0, T_1, R, \rho, Pk)$
pub(crate) fn commit<D: Driver>(dr: &mut D, note: &NoteVars) -> Element {
    Sponge::hash(dr, &[&note.class, &note.amount, &note.rcm, &note.rho, &note.pk])
}

/// $Sn = H(Sk, \rho)$
pub(crate) fn nullify<D: Driver>(dr: &mut D, sk: &Element, rho: &Element) -> Element {
    Sponge::hash(dr, &[sk, rho])
}

// =============================================================================
// Hybrid cipher
// =============================================================================

/// Allocated public ciphertext.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CiphertextVars {
    pub(crate) c1: Element,
    pub(crate) c2: Element,
    pub(crate) c3: Element,
}

impl CiphertextVars {
    pub(crate) fn public<D: Driver>(dr: &mut D, ciphertext: &Ciphertext) -> Self {
        Self {
            c1: Element::public(dr, ciphertext.c1),
            c2: Element::public(dr, ciphertext.c2),
            c3: Element::public(dr, ciphertext.c3),
        }
    }

    /// Recomputes the mask chain from `shared` and subtracts it:
    /// $(C_1 - m_1, C_2 - m_2, C_3 - m_3)$.
    pub(crate) fn open<D: Driver>(&self, dr: &mut D, shared: &Point) -> [Element; 3] {
        let (x, y) = shared.coordinates();
        let m1 = Sponge::hash(dr, &[&x, &y]);
        let m2 = Sponge::hash(dr, &[&m1]);
        let m3 = Sponge::hash(dr, &[&m2]);
        [self.c1.sub(dr, &m1), self.c2.sub(dr, &m2), self.c3.sub(dr, &m3)]
    }

    /// Asserts the ciphertext masks `payload` under `shared`.
    pub(crate) fn enforce_payload<D: Driver>(
        &self,
        dr: &mut D,
        shared: &Point,
        payload: [&Element; 3],
    ) -> Result<(), Unsatisfied> {
        let [sk_in, pk_out, value] = self.open(dr, shared);
        let [expected_secret, expected_owner, expected_value] = payload;
        sk_in.enforce_equal(dr, expected_secret, "cipher.c1")?;
        pk_out.enforce_equal(dr, expected_owner, "cipher.c2")?;
        value.enforce_equal(dr, expected_value, "cipher.c3")
    }
}

/// Rejects the identity as key-agreement generator.
pub(crate) fn check_generator(generator: &pallas::Affine) -> Result<(), ShapeError> {
    if bool::from(generator.is_identity()) {
        Err(ShapeError::IdentityGenerator)
    } else {
        Ok(())
    }
}

/// Asserts $G \ne \mathcal{O}$.
pub(crate) fn enforce_generator<D: Driver>(
    dr: &mut D,
    generator: &Point,
) -> Result<(), Unsatisfied> {
    dr.enforce(!generator.is_identity(), "dh.generator")
}

/// Allocated public key-agreement points.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HandoffVars {
    pub(crate) g_r: Point,
    pub(crate) g_b: Point,
}

impl HandoffVars {
    pub(crate) fn public<D: Driver>(dr: &mut D, handoff: &Handoff) -> Self {
        Self {
            g_r: Point::public(dr, handoff.g_r),
            g_b: Point::public(dr, handoff.g_b),
        }
    }

    /// Asserts $G_r = G^r$, $G_b = G^b$ and $G_{rb} = G_r^{\,b}$.
    pub(crate) fn enforce_exchange<D: Driver>(
        &self,
        dr: &mut D,
        generator: &Point,
        sender: &Element,
        recipient: &Element,
        shared: &Point,
    ) -> Result<(), Unsatisfied> {
        let g_r = generator.mul(dr, sender);
        g_r.enforce_equal(dr, &self.g_r, "dh.g_r")?;
        let g_b = generator.mul(dr, recipient);
        g_b.enforce_equal(dr, &self.g_b, "dh.g_b")?;
        let g_r_b = self.g_r.mul(dr, recipient);
        g_r_b.enforce_equal(dr, shared, "dh.g_r_b")
    }
}

// =============================================================================
// Merkle membership
// =============================================================================

/// Recomputes the root above `leaf` along `path`.
///
/// Each level allocates its direction bit and sibling, orders the pair
/// with two selections, and hashes it.
pub(crate) fn merkle_root<D: Driver>(dr: &mut D, leaf: &Element, path: &MerklePath) -> Element {
    path.directions()
        .iter()
        .by_vals()
        .zip(path.siblings())
        .fold(*leaf, |current, (is_right, sibling)| {
            let bit = Boolean::alloc(dr, is_right);
            let neighbour = Element::alloc(dr, *sibling);
            let left = bit.select(dr, &neighbour, &current);
            let right = bit.select(dr, &current, &neighbour);
            Sponge::hash(dr, &[&left, &right])
        })
}

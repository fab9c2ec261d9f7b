//! Allocated values.
//!
//! Gadgets carry their witness value alongside the driver records. Every
//! operation is gate-for-gate identical regardless of the values involved,
//! so the [`ShapeRecorder`](crate::ShapeRecorder) sees the same structure for
//! every witness.

use ff::{Field as _, PrimeField as _};
use group::{Curve as _, prime::PrimeCurveAffine as _};
use pasta_curves::{
    Fp, Fq,
    arithmetic::{Coordinates, CurveAffine as _},
    pallas,
};

use crate::driver::{Driver, Gate, Unsatisfied};

/// Width of [`Element::enforce_range`] in bytes.
const RANGE_BYTES: usize = 8;

// =============================================================================
// Element
// =============================================================================

/// An allocated field element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element(Fp);

impl Element {
    pub(crate) const fn from_gate(value: Fp) -> Self {
        Self(value)
    }

    /// Allocates a private witness value.
    pub fn alloc<D: Driver>(dr: &mut D, value: Fp) -> Self {
        dr.gate(Gate::Alloc);
        Self(value)
    }

    /// Allocates a public input.
    pub fn public<D: Driver>(dr: &mut D, value: Fp) -> Self {
        dr.gate(Gate::Public);
        dr.public_input(value);
        Self(value)
    }

    /// Allocates a fixed constant.
    pub fn constant<D: Driver>(dr: &mut D, value: Fp) -> Self {
        dr.gate(Gate::Constant);
        Self(value)
    }

    /// The witness value.
    #[must_use]
    pub const fn value(&self) -> Fp {
        self.0
    }

    /// $a + b$
    #[must_use]
    pub fn add<D: Driver>(&self, dr: &mut D, other: &Self) -> Self {
        dr.gate(Gate::Add);
        Self(self.0 + other.0)
    }

    /// $a - b$
    #[must_use]
    pub fn sub<D: Driver>(&self, dr: &mut D, other: &Self) -> Self {
        dr.gate(Gate::Sub);
        Self(self.0 - other.0)
    }

    /// $a \cdot b$
    #[must_use]
    pub fn mul<D: Driver>(&self, dr: &mut D, other: &Self) -> Self {
        dr.gate(Gate::Mul);
        Self(self.0 * other.0)
    }

    /// Asserts $a = b$.
    pub fn enforce_equal<D: Driver>(
        &self,
        dr: &mut D,
        other: &Self,
        label: &'static str,
    ) -> Result<(), Unsatisfied> {
        dr.enforce(self.0 == other.0, label)
    }

    /// Asserts $0 \le a < 2^{64}$.
    pub fn enforce_range<D: Driver>(&self, dr: &mut D, label: &'static str) -> Result<(), Unsatisfied> {
        dr.gate(Gate::Range);
        dr.enforce(fits_u64(self.0), label)
    }

    /// Asserts $a \le b$, with both operands in 64-bit range.
    ///
    /// Range-checks $a$, $b$ and $b - a$. If $a > b$ then $b - a$ wraps to
    /// a value near the modulus and fails its range check.
    pub fn enforce_leq<D: Driver>(
        &self,
        dr: &mut D,
        other: &Self,
        label: &'static str,
    ) -> Result<(), Unsatisfied> {
        self.enforce_range(dr, label)?;
        other.enforce_range(dr, label)?;
        other.sub(dr, self).enforce_range(dr, label)
    }
}

/// Whether the canonical encoding of `value` fits in 64 bits.
fn fits_u64(value: Fp) -> bool {
    value.to_repr().iter().skip(RANGE_BYTES).all(|byte| *byte == 0)
}

// =============================================================================
// Boolean
// =============================================================================

/// An allocated bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Boolean(bool);

impl Boolean {
    /// Allocates a private bit.
    pub fn alloc<D: Driver>(dr: &mut D, value: bool) -> Self {
        dr.gate(Gate::Boolean);
        Self(value)
    }

    /// The witness value.
    #[must_use]
    pub const fn value(&self) -> bool {
        self.0
    }

    /// Returns `when_true` if the bit is set, otherwise `when_false`.
    ///
    /// $b \cdot t + (1 - b) \cdot f$
    #[must_use]
    pub fn select<D: Driver>(&self, dr: &mut D, when_true: &Element, when_false: &Element) -> Element {
        dr.gate(Gate::Select);
        if self.0 { *when_true } else { *when_false }
    }
}

// =============================================================================
// Point
// =============================================================================

/// Affine coordinates of a Pallas point. The identity maps to $(0, 0)$.
#[must_use]
pub fn coordinates(point: &pallas::Affine) -> (Fp, Fp) {
    Option::<Coordinates<pallas::Affine>>::from(point.coordinates())
        .map_or((Fp::ZERO, Fp::ZERO), |xy| (*xy.x(), *xy.y()))
}

/// Reinterprets a base field element as a Pallas scalar.
///
/// The Pallas base field modulus is smaller than the scalar field modulus,
/// so every canonical `Fp` encoding is a canonical `Fq` encoding.
#[must_use]
pub fn to_scalar(value: Fp) -> Fq {
    #[expect(clippy::expect_used, reason = "p < q for the Pasta cycle")]
    Option::from(Fq::from_repr(value.to_repr())).expect("Fp repr is a valid Fq repr")
}

/// An allocated Pallas point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point(pallas::Affine);

impl Point {
    /// Allocates a private point.
    pub fn alloc<D: Driver>(dr: &mut D, value: pallas::Affine) -> Self {
        dr.gate(Gate::Alloc);
        dr.gate(Gate::Alloc);
        Self(value)
    }

    /// Allocates a public point as two public inputs, $x$ then $y$.
    pub fn public<D: Driver>(dr: &mut D, value: pallas::Affine) -> Self {
        let (x, y) = coordinates(&value);
        Element::public(dr, x);
        Element::public(dr, y);
        Self(value)
    }

    /// The witness value.
    #[must_use]
    pub const fn value(&self) -> pallas::Affine {
        self.0
    }

    /// Coordinates as elements.
    #[must_use]
    pub fn coordinates(&self) -> (Element, Element) {
        let (x, y) = coordinates(&self.0);
        (Element(x), Element(y))
    }

    /// $[s] P$
    #[must_use]
    pub fn mul<D: Driver>(&self, dr: &mut D, scalar: &Element) -> Self {
        dr.gate(Gate::ScalarMul);
        Self((self.0 * to_scalar(scalar.0)).to_affine())
    }

    /// Asserts both coordinates match.
    pub fn enforce_equal<D: Driver>(
        &self,
        dr: &mut D,
        other: &Self,
        label: &'static str,
    ) -> Result<(), Unsatisfied> {
        let (x, y) = self.coordinates();
        let (other_x, other_y) = other.coordinates();
        x.enforce_equal(dr, &other_x, label)?;
        y.enforce_equal(dr, &other_y, label)
    }

    /// Whether this is the point at infinity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.0.is_identity().into()
    }
}

#[cfg(test)]
mod tests {
    use ff::Field as _;
    use group::{Curve as _, Group as _, prime::PrimeCurveAffine as _};
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;
    use crate::driver::Evaluator;

    #[test]
    fn range_boundaries() {
        let mut dr = Evaluator::default();
        let max = Element::alloc(&mut dr, Fp::from(u64::MAX));
        max.enforce_range(&mut dr, "max").unwrap();

        let one = Element::constant(&mut dr, Fp::ONE);
        let over = max.add(&mut dr, &one);
        assert_eq!(over.enforce_range(&mut dr, "over").unwrap_err().label, "over");

        let negative = Element::alloc(&mut dr, -Fp::ONE);
        negative.enforce_range(&mut dr, "negative").unwrap_err();
    }

    #[test]
    fn leq_ordering() {
        let mut dr = Evaluator::default();
        let small = Element::alloc(&mut dr, Fp::from(3u64));
        let large = Element::alloc(&mut dr, Fp::from(7u64));
        small.enforce_leq(&mut dr, &large, "lt").unwrap();
        small.enforce_leq(&mut dr, &small, "eq").unwrap();
        large.enforce_leq(&mut dr, &small, "gt").unwrap_err();
    }

    #[test]
    fn select_picks_by_bit() {
        let mut dr = Evaluator::default();
        let left = Element::alloc(&mut dr, Fp::ONE);
        let right = Element::alloc(&mut dr, Fp::from(2u64));
        let set = Boolean::alloc(&mut dr, true);
        let clear = Boolean::alloc(&mut dr, false);
        assert_eq!(set.select(&mut dr, &left, &right), left);
        assert_eq!(clear.select(&mut dr, &left, &right), right);
    }

    /// In-circuit scalar multiplication matches native group arithmetic.
    #[test]
    fn point_mul_matches_native() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut dr = Evaluator::default();
        let base = pallas::Point::random(&mut rng).to_affine();
        let raw: u64 = 0xdead_beef;

        let scalar = Element::alloc(&mut dr, Fp::from(raw));
        let gadget = Point::alloc(&mut dr, base).mul(&mut dr, &scalar);
        let native = (base * Fq::from(raw)).to_affine();
        assert_eq!(gadget.value(), native);
    }

    #[test]
    fn identity_coordinates_are_zero() {
        assert_eq!(coordinates(&pallas::Affine::identity()), (Fp::ZERO, Fp::ZERO));
        let generator = pallas::Affine::generator();
        assert_ne!(coordinates(&generator), (Fp::ZERO, Fp::ZERO));
    }
}

//! Trusted dealer key splitting.

use bls12_381::{G2Affine, G2Projective, Scalar};
use ff::Field as _;
use group::Group as _;
use rand::{CryptoRng, RngCore};

use super::{DealError, KeyShare, PublicKey};

/// A polynomial over the BLS12-381 scalar field, lowest coefficient first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial(Vec<Scalar>);

impl Polynomial {
    /// A random polynomial of the given degree.
    #[expect(
        clippy::map_with_unused_argument_over_ranges,
        reason = "the range counts degree + 1 coefficients"
    )]
    pub fn random<R: RngCore + CryptoRng>(degree: u32, rng: &mut R) -> Self {
        Self((0..=degree).map(|_| Scalar::random(&mut *rng)).collect())
    }

    /// Coefficients, constant term first.
    #[must_use]
    pub fn coefficients(&self) -> &[Scalar] {
        &self.0
    }

    /// $f(x)$ by Horner's method.
    #[must_use]
    pub fn evaluate(&self, x: Scalar) -> Scalar {
        self.0
            .iter()
            .rev()
            .fold(Scalar::ZERO, |acc, coefficient| acc * x + coefficient)
    }
}

impl From<Vec<Scalar>> for Polynomial {
    fn from(coefficients: Vec<Scalar>) -> Self {
        Self(coefficients)
    }
}

/// The output of [`deal`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dealing {
    threshold: u32,
    generator: G2Affine,
    aggregate: KeyShare,
    shares: Vec<KeyShare>,
}

impl Dealing {
    /// Signers required, $t$.
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// The random $\mathbb{G}_2$ generator $\tilde G$ fixed at dealing.
    #[must_use]
    pub const fn generator(&self) -> G2Affine {
        self.generator
    }

    /// The virtual share at index $0$.
    #[must_use]
    pub const fn aggregate(&self) -> &KeyShare {
        &self.aggregate
    }

    /// Shares for indices $1..=n$, in order.
    #[must_use]
    pub fn shares(&self) -> &[KeyShare] {
        &self.shares
    }

    /// The share at `index`, including the aggregate at $0$.
    #[must_use]
    pub fn share(&self, index: u32) -> Option<&KeyShare> {
        if index == 0 {
            Some(&self.aggregate)
        } else {
            self.shares.iter().find(|share| share.index == index)
        }
    }

    /// The aggregate verification key $(\tilde G, \tilde G^X, \tilde G^Y)$.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.aggregate.public_key(&self.generator)
    }
}

/// Splits a fresh signing key among `participants` authorities so that
/// any `threshold` of them can sign.
///
/// Samples $v, w$ of degree $t - 1$ and evaluates them at every index
/// $0..=n$.
pub fn deal<R: RngCore + CryptoRng>(
    threshold: u32,
    participants: u32,
    rng: &mut R,
) -> Result<Dealing, DealError> {
    if threshold == 0 {
        return Err(DealError::ZeroThreshold);
    }
    if threshold > participants {
        return Err(DealError::ThresholdTooLarge {
            threshold,
            participants,
        });
    }

    let degree = threshold - 1;
    let constant_poly = Polynomial::random(degree, &mut *rng);
    let message_poly = Polynomial::random(degree, &mut *rng);
    let issue = |index: u32| {
        let at = Scalar::from(u64::from(index));
        KeyShare {
            x: constant_poly.evaluate(at),
            y: message_poly.evaluate(at),
            index,
        }
    };

    let dealing = Dealing {
        threshold,
        generator: G2Affine::from(G2Projective::random(&mut *rng)),
        aggregate: issue(0),
        shares: (1..=participants).map(issue).collect(),
    };
    tracing::debug!(threshold, participants, "dealt threshold key");
    Ok(dealing)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;

    #[test]
    fn horner_matches_expansion() {
        let poly = Polynomial::from(vec![Scalar::from(3u64), Scalar::from(2u64), Scalar::from(5u64)]);
        // 3 + 2x + 5x^2 at x = 4
        assert_eq!(poly.evaluate(Scalar::from(4u64)), Scalar::from(91u64));
        assert_eq!(poly.evaluate(Scalar::ZERO), Scalar::from(3u64));
    }

    #[test]
    fn shares_cover_every_index() {
        let dealing = deal(3, 5, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(dealing.threshold(), 3);
        assert_eq!(dealing.shares().len(), 5);
        assert!(dealing.aggregate().is_aggregate());
        for index in 0..=5 {
            assert_eq!(dealing.share(index).map(KeyShare::index), Some(index));
        }
        assert!(dealing.share(6).is_none());
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(deal(0, 5, &mut rng).unwrap_err(), DealError::ZeroThreshold);
        assert_eq!(
            deal(6, 5, &mut rng).unwrap_err(),
            DealError::ThresholdTooLarge {
                threshold: 6,
                participants: 5
            }
        );
        assert!(deal(5, 5, &mut rng).is_ok());
    }
}

//! Partial signing, aggregation and verification.

use alloc::collections::BTreeSet;

use bls12_381::{
    G1Affine, G1Projective, G2Projective, Scalar,
    hash_to_curve::{ExpandMsgXmd, HashToCurve},
    pairing,
};
use ff::Field as _;
use group::Curve as _;
use rand::{CryptoRng, RngCore};

use super::{
    DecodeError, KeyShare, PublicKey, SignatureError,
    codec::{G1_BYTES, Reader, SCALAR_BYTES, concat, index_bytes},
};
use crate::constants::{MESSAGE_PERSONALIZATION, SIGNATURE_DST};

// =============================================================================
// Message
// =============================================================================

/// A message $m$ in the BLS12-381 scalar field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Message(Scalar);

impl Message {
    /// Encoded width in bytes.
    pub const BYTES: usize = SCALAR_BYTES;

    /// Hashes arbitrary bytes to a message with BLAKE2b-512, reduced wide.
    #[must_use]
    pub fn from_bytes_wide(bytes: &[u8]) -> Self {
        let digest = blake2b_simd::Params::new()
            .hash_length(64)
            .personal(MESSAGE_PERSONALIZATION)
            .hash(bytes);
        Self(Scalar::from_bytes_wide(digest.as_array()))
    }

    /// Little-endian scalar encoding.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        self.0.to_bytes()
    }
}

impl From<u64> for Message {
    fn from(message: u64) -> Self {
        Self(Scalar::from(message))
    }
}

impl From<Scalar> for Message {
    fn from(message: Scalar) -> Self {
        Self(message)
    }
}

impl From<Message> for Scalar {
    fn from(message: Message) -> Self {
        message.0
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(Reader::exact(bytes, Self::BYTES)?.scalar()?))
    }
}

/// $h = \text{HashToG1}(m, \text{DST})$ through `expand_message_xmd`
/// with SHA-256.
#[must_use]
pub fn hash_to_g1(message: &Message) -> G1Affine {
    <G1Projective as HashToCurve<ExpandMsgXmd<sha2::Sha256>>>::hash_to_curve(
        message.to_bytes(),
        SIGNATURE_DST,
    )
    .to_affine()
}

// =============================================================================
// Signatures
// =============================================================================

/// One authority's contribution $(h, h^{Y_i m + X_i}, i)$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartialSignature {
    sigma1: G1Affine,
    sigma2: G1Affine,
    index: u32,
}

impl PartialSignature {
    /// Encoded width in bytes.
    pub const BYTES: usize = 2 * G1_BYTES + SCALAR_BYTES;

    /// Index of the signing share.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// $\sigma_1 \| \sigma_2 \| i$
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        concat(&[
            self.sigma1.to_compressed().as_slice(),
            self.sigma2.to_compressed().as_slice(),
            index_bytes(self.index).as_slice(),
        ])
    }
}

impl TryFrom<&[u8]> for PartialSignature {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let mut reader = Reader::exact(bytes, Self::BYTES)?;
        Ok(Self {
            sigma1: reader.g1()?,
            sigma2: reader.g1()?,
            index: reader.index()?,
        })
    }
}

/// A complete signature $(\sigma_1, \sigma_2)$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    sigma1: G1Affine,
    sigma2: G1Affine,
}

impl Signature {
    /// Encoded width in bytes.
    pub const BYTES: usize = 2 * G1_BYTES;

    /// $\sigma_1 \| \sigma_2$
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        concat(&[
            self.sigma1.to_compressed().as_slice(),
            self.sigma2.to_compressed().as_slice(),
        ])
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let mut reader = Reader::exact(bytes, Self::BYTES)?;
        Ok(Self {
            sigma1: reader.g1()?,
            sigma2: reader.g1()?,
        })
    }
}

/// $h^{Y m + X}$
fn exponentiate(share: &KeyShare, message: &Message, base: &G1Affine) -> G1Affine {
    (base * (share.y * message.0 + share.x)).to_affine()
}

// =============================================================================
// Protocol
// =============================================================================

/// Signs `message` with one share.
///
/// Fails with [`SignatureError::DegenerateHash`] if the message hashes to
/// the identity.
pub fn partial_sign(share: &KeyShare, message: &Message) -> Result<PartialSignature, SignatureError> {
    let base = hash_to_g1(message);
    if bool::from(base.is_identity()) {
        return Err(SignatureError::DegenerateHash);
    }
    Ok(PartialSignature {
        sigma1: base,
        sigma2: exponentiate(share, message, &base),
        index: share.index,
    })
}

/// Signs `message` with a single share, outside any threshold protocol.
///
/// $h = g_1^k$ for a random $k$, so two signatures over one message differ.
pub fn sign<R: RngCore + CryptoRng>(
    share: &KeyShare,
    message: &Message,
    rng: &mut R,
) -> Result<Signature, SignatureError> {
    let base = (G1Affine::generator() * Scalar::random(rng)).to_affine();
    if bool::from(base.is_identity()) {
        return Err(SignatureError::DegenerateHash);
    }
    Ok(Signature {
        sigma1: base,
        sigma2: exponentiate(share, message, &base),
    })
}

/// $\ell_i = \prod_{j \ne i} (0 - x_j) \big/ \prod_{j \ne i} (x_i - x_j)$
///
/// `indices` must be distinct.
fn lagrange_at_zero(index: u32, indices: &BTreeSet<u32>) -> Scalar {
    let at_index = Scalar::from(u64::from(index));
    let (num, den) = indices
        .iter()
        .filter(|other| **other != index)
        .map(|other| Scalar::from(u64::from(*other)))
        .fold((Scalar::ONE, Scalar::ONE), |(num, den), at_other| {
            (num * -at_other, den * (at_index - at_other))
        });
    // Distinct indices never leave a zero denominator.
    num * den.invert().unwrap_or(Scalar::ZERO)
}

/// Combines at least `threshold` partial signatures into one signature.
///
/// Interpolates $\sigma_2$ at zero over the participating indices:
/// $\sigma_2 = \sum_i \ell_i \cdot \sigma_{2,i}$.
pub fn aggregate(partials: &[PartialSignature], threshold: u32) -> Result<Signature, SignatureError> {
    let first = partials.first().ok_or(SignatureError::NoPartials)?;
    if partials.iter().any(|partial| partial.sigma1 != first.sigma1) {
        tracing::warn!(partials = partials.len(), "partial signatures disagree on sigma1");
        return Err(SignatureError::MismatchedBase);
    }

    let mut indices = BTreeSet::new();
    for partial in partials {
        if !indices.insert(partial.index) {
            return Err(SignatureError::DuplicateIndex(partial.index));
        }
    }
    if usize::try_from(threshold).is_ok_and(|required| partials.len() < required) {
        return Err(SignatureError::InsufficientShares {
            required: threshold,
            actual: partials.len(),
        });
    }

    let sigma2 = partials
        .iter()
        .fold(G1Projective::identity(), |acc, partial| {
            acc + partial.sigma2 * lagrange_at_zero(partial.index, &indices)
        });
    tracing::debug!(partials = partials.len(), threshold, "aggregated signature");
    Ok(Signature {
        sigma1: first.sigma1,
        sigma2: sigma2.to_affine(),
    })
}

/// Checks $e(\sigma_1, \tilde X \tilde Y^m) = e(\sigma_2, \tilde G)$.
///
/// Rejects $\sigma_1 = 1$, which would satisfy the equation trivially.
#[must_use]
pub fn verify(pk: &PublicKey, message: &Message, signature: &Signature) -> bool {
    if bool::from(signature.sigma1.is_identity()) {
        return false;
    }
    let key = (G2Projective::from(pk.x) + pk.y * message.0).to_affine();
    pairing(&signature.sigma1, &key) == pairing(&signature.sigma2, &pk.generator)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;
    use crate::threshold::{Dealing, deal};

    fn quorum(dealing: &Dealing, indices: &[u32], message: &Message) -> Vec<PartialSignature> {
        indices
            .iter()
            .map(|index| partial_sign(dealing.share(*index).unwrap(), message).unwrap())
            .collect()
    }

    /// $t = 3$, $n = 5$: quorums $\{1, 2, 3\}$ and $\{2, 3, 4\}$ agree.
    #[test]
    fn quorums_produce_identical_signatures() {
        let dealing = deal(3, 5, &mut StdRng::seed_from_u64(0)).unwrap();
        let message = Message::from_bytes_wide(b"settle auction 7");

        let first = aggregate(&quorum(&dealing, &[1, 2, 3], &message), 3).unwrap();
        let second = aggregate(&quorum(&dealing, &[2, 3, 4], &message), 3).unwrap();
        assert_eq!(first.to_bytes(), second.to_bytes());
        assert!(verify(&dealing.public_key(), &message, &first));
        assert!(verify(&dealing.public_key(), &message, &second));

        let everyone = aggregate(&quorum(&dealing, &[5, 1, 4, 2, 3], &message), 3).unwrap();
        assert_eq!(everyone, first);
    }

    #[test]
    fn aggregate_matches_virtual_share() {
        let dealing = deal(2, 3, &mut StdRng::seed_from_u64(1)).unwrap();
        let message = Message::from(42u64);
        let combined = aggregate(&quorum(&dealing, &[3, 1], &message), 2).unwrap();
        let direct = partial_sign(dealing.aggregate(), &message).unwrap();
        assert_eq!(combined.sigma2, direct.sigma2);
    }

    #[test]
    fn other_message_is_rejected() {
        let dealing = deal(3, 5, &mut StdRng::seed_from_u64(2)).unwrap();
        let message = Message::from(7u64);
        let signature = aggregate(&quorum(&dealing, &[1, 3, 5], &message), 3).unwrap();
        assert!(!verify(&dealing.public_key(), &Message::from(8u64), &signature));

        let other = deal(3, 5, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(!verify(&other.public_key(), &message, &signature));
    }

    #[test]
    fn aggregation_failures() {
        let dealing = deal(3, 5, &mut StdRng::seed_from_u64(4)).unwrap();
        let message = Message::from(1u64);

        assert_eq!(aggregate(&[], 3).unwrap_err(), SignatureError::NoPartials);
        assert_eq!(
            aggregate(&quorum(&dealing, &[1, 2], &message), 3).unwrap_err(),
            SignatureError::InsufficientShares {
                required: 3,
                actual: 2
            }
        );
        assert_eq!(
            aggregate(&quorum(&dealing, &[1, 2, 2], &message), 3).unwrap_err(),
            SignatureError::DuplicateIndex(2)
        );

        let mut mixed = quorum(&dealing, &[1, 2], &message);
        mixed.extend(quorum(&dealing, &[3], &Message::from(2u64)));
        assert_eq!(aggregate(&mixed, 3).unwrap_err(), SignatureError::MismatchedBase);
    }

    /// Below the threshold, interpolation yields a signature that does not
    /// verify.
    #[test]
    fn sub_threshold_forgery_fails() {
        let dealing = deal(3, 5, &mut StdRng::seed_from_u64(5)).unwrap();
        let message = Message::from(9u64);
        let forged = aggregate(&quorum(&dealing, &[1, 2], &message), 2).unwrap();
        assert!(!verify(&dealing.public_key(), &message, &forged));
    }

    #[test]
    fn single_share_signing_verifies() {
        let mut rng = StdRng::seed_from_u64(6);
        let dealing = deal(1, 1, &mut rng).unwrap();
        let message = Message::from_bytes_wide(b"register");
        let signature = sign(dealing.aggregate(), &message, &mut rng).unwrap();
        let again = sign(dealing.aggregate(), &message, &mut rng).unwrap();
        assert_ne!(signature, again);
        assert!(verify(&dealing.public_key(), &message, &signature));
        assert!(verify(&dealing.public_key(), &message, &again));
    }

    #[test]
    fn decoding_checks_length_and_points() {
        let dealing = deal(2, 3, &mut StdRng::seed_from_u64(7)).unwrap();
        let message = Message::from(3u64);
        let partial = partial_sign(dealing.share(2).unwrap(), &message).unwrap();
        let signature = aggregate(&quorum(&dealing, &[1, 2], &message), 2).unwrap();

        assert_eq!(PartialSignature::try_from(partial.to_bytes().as_slice()).unwrap(), partial);
        assert_eq!(Signature::try_from(signature.to_bytes().as_slice()).unwrap(), signature);
        assert_eq!(Message::try_from(message.to_bytes().as_slice()).unwrap(), message);

        assert_eq!(
            Signature::try_from([0u8; 95].as_slice()).unwrap_err(),
            DecodeError::Length {
                expected: 96,
                actual: 95
            }
        );
        assert_eq!(
            PartialSignature::try_from([0u8; 129].as_slice()).unwrap_err(),
            DecodeError::Length {
                expected: 128,
                actual: 129
            }
        );
        assert_eq!(
            Signature::try_from([0u8; 96].as_slice()).unwrap_err(),
            DecodeError::InvalidPoint
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn any_quorum_verifies(seed in any::<u64>(), skip in 1u32..=5, drop in 1u32..=5) {
            let dealing = deal(3, 5, &mut StdRng::seed_from_u64(seed)).unwrap();
            let message = Message::from(seed);
            let left: Vec<u32> = (1..=5).filter(|index| *index != skip).take(3).collect();
            let right: Vec<u32> = (1..=5).rev().filter(|index| *index != drop).take(3).collect();
            let signature = aggregate(&quorum(&dealing, &left, &message), 3).unwrap();
            let other = aggregate(&quorum(&dealing, &right, &message), 3).unwrap();
            prop_assert!(verify(&dealing.public_key(), &message, &signature));
            prop_assert_eq!(signature.to_bytes(), other.to_bytes());
        }
    }
}

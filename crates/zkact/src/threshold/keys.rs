//! Key shares and public keys.

use bls12_381::{G2Affine, Scalar};

use super::{
    DecodeError,
    codec::{G2_BYTES, Reader, SCALAR_BYTES, concat, index_bytes},
};

/// One authority's share $(X_i, Y_i, i)$.
///
/// Index $0$ is the aggregate share, held by nobody.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyShare {
    pub(super) x: Scalar,
    pub(super) y: Scalar,
    pub(super) index: u32,
}

impl KeyShare {
    /// Encoded width in bytes.
    pub const BYTES: usize = 3 * SCALAR_BYTES;

    /// Share index $i$.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Whether this is the virtual aggregate share.
    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        self.index == 0
    }

    /// $(\tilde G, \tilde G^{X_i}, \tilde G^{Y_i})$
    #[must_use]
    pub fn public_key(&self, generator: &G2Affine) -> PublicKey {
        PublicKey {
            generator: *generator,
            x: G2Affine::from(generator * self.x),
            y: G2Affine::from(generator * self.y),
        }
    }

    /// $X \| Y \| i$
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        concat(&[
            self.x.to_bytes().as_slice(),
            self.y.to_bytes().as_slice(),
            index_bytes(self.index).as_slice(),
        ])
    }
}

impl TryFrom<&[u8]> for KeyShare {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let mut reader = Reader::exact(bytes, Self::BYTES)?;
        Ok(Self {
            x: reader.scalar()?,
            y: reader.scalar()?,
            index: reader.index()?,
        })
    }
}

/// A verification key $(\tilde G, \tilde X, \tilde Y)$ over $\mathbb{G}_2$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub(super) generator: G2Affine,
    pub(super) x: G2Affine,
    pub(super) y: G2Affine,
}

impl PublicKey {
    /// Encoded width in bytes.
    pub const BYTES: usize = 3 * G2_BYTES;

    /// $\tilde G$
    #[must_use]
    pub const fn generator(&self) -> G2Affine {
        self.generator
    }

    /// $\tilde G \| \tilde X \| \tilde Y$, each compressed.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        concat(&[
            self.generator.to_compressed().as_slice(),
            self.x.to_compressed().as_slice(),
            self.y.to_compressed().as_slice(),
        ])
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let mut reader = Reader::exact(bytes, Self::BYTES)?;
        Ok(Self {
            generator: reader.g2()?,
            x: reader.g2()?,
            y: reader.g2()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use ff::Field as _;
    use group::Group as _;
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;

    fn sample_share(rng: &mut StdRng, index: u32) -> KeyShare {
        KeyShare {
            x: Scalar::random(&mut *rng),
            y: Scalar::random(&mut *rng),
            index,
        }
    }

    #[test]
    fn encodings_have_fixed_width() {
        let mut rng = StdRng::seed_from_u64(0);
        let share = sample_share(&mut rng, 3);
        let generator = G2Affine::from(bls12_381::G2Projective::random(&mut rng));
        let pk = share.public_key(&generator);

        assert_eq!(share.to_bytes().len(), 96);
        assert_eq!(pk.to_bytes().len(), 288);
        assert_eq!(KeyShare::try_from(share.to_bytes().as_slice()).unwrap(), share);
        assert_eq!(PublicKey::try_from(pk.to_bytes().as_slice()).unwrap(), pk);
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let bytes = sample_share(&mut rng, 1).to_bytes();
        assert_eq!(
            KeyShare::try_from(bytes.get(..95).unwrap()).unwrap_err(),
            DecodeError::Length {
                expected: 96,
                actual: 95
            }
        );
        assert_eq!(
            PublicKey::try_from([0u8; 287].as_slice()).unwrap_err(),
            DecodeError::Length {
                expected: 288,
                actual: 287
            }
        );
    }

    #[test]
    fn aggregate_share_is_index_zero() {
        let mut rng = StdRng::seed_from_u64(2);
        assert!(sample_share(&mut rng, 0).is_aggregate());
        assert!(!sample_share(&mut rng, 1).is_aggregate());
    }
}

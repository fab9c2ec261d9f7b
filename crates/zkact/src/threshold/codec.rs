//! Fixed-width encodings shared by the threshold types.

use bls12_381::{G1Affine, G2Affine, Scalar};

use super::DecodeError;

/// Compressed $\mathbb{G}_1$ width.
pub(super) const G1_BYTES: usize = 48;
/// Compressed $\mathbb{G}_2$ width.
pub(super) const G2_BYTES: usize = 96;
/// Scalar width.
pub(super) const SCALAR_BYTES: usize = 32;

/// Low bytes of an index scalar that may be nonzero.
const INDEX_BYTES: usize = 4;

/// Concatenates `parts` into a fixed-width buffer.
pub(super) fn concat<const N: usize>(parts: &[&[u8]]) -> [u8; N] {
    let mut out = [0; N];
    for (slot, byte) in out.iter_mut().zip(parts.iter().flat_map(|part| part.iter())) {
        *slot = *byte;
    }
    out
}

/// A share index as a scalar encoding.
pub(super) fn index_bytes(index: u32) -> [u8; SCALAR_BYTES] {
    Scalar::from(u64::from(index)).to_bytes()
}

/// Sequential reader over an input of known total width.
pub(super) struct Reader<'bytes> {
    rest: &'bytes [u8],
}

impl<'bytes> Reader<'bytes> {
    /// Rejects `bytes` unless it is exactly `expected` long.
    pub(super) const fn exact(bytes: &'bytes [u8], expected: usize) -> Result<Self, DecodeError> {
        if bytes.len() == expected {
            Ok(Self { rest: bytes })
        } else {
            Err(DecodeError::Length {
                expected,
                actual: bytes.len(),
            })
        }
    }

    fn take<const N: usize>(&mut self) -> Result<&'bytes [u8; N], DecodeError> {
        let (head, tail) = self.rest.split_first_chunk::<N>().ok_or(DecodeError::Length {
            expected: N,
            actual: self.rest.len(),
        })?;
        self.rest = tail;
        Ok(head)
    }

    pub(super) fn g1(&mut self) -> Result<G1Affine, DecodeError> {
        let bytes = self.take::<G1_BYTES>()?;
        Option::from(G1Affine::from_compressed(bytes)).ok_or(DecodeError::InvalidPoint)
    }

    pub(super) fn g2(&mut self) -> Result<G2Affine, DecodeError> {
        let bytes = self.take::<G2_BYTES>()?;
        Option::from(G2Affine::from_compressed(bytes)).ok_or(DecodeError::InvalidPoint)
    }

    pub(super) fn scalar(&mut self) -> Result<Scalar, DecodeError> {
        let bytes = self.take::<SCALAR_BYTES>()?;
        Option::from(Scalar::from_bytes(bytes)).ok_or(DecodeError::InvalidScalar)
    }

    /// An index scalar whose value fits in `u32`.
    pub(super) fn index(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take::<SCALAR_BYTES>()?;
        let (low, high) = bytes
            .split_first_chunk::<INDEX_BYTES>()
            .ok_or(DecodeError::InvalidIndex)?;
        if high.iter().any(|byte| *byte != 0) {
            return Err(DecodeError::InvalidIndex);
        }
        Ok(u32::from_le_bytes(*low))
    }
}

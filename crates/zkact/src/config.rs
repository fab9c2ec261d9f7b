//! Circuit size configuration.
//!
//! Batch size, tree depth and auction size are supplied at circuit
//! construction instead of living in loop bounds.

use crate::constants::{
    DEFAULT_AUCTION_SIZE, DEFAULT_BATCH_SIZE, DEFAULT_TREE_DEPTH, MAX_TREE_DEPTH,
};

/// Invalid size configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[expect(
    clippy::module_name_repetitions,
    reason = "re-exported next to TreeError and ShapeError"
)]
pub enum ConfigError {
    /// A transfer batch needs at least one note.
    #[error("batch size must be at least 1")]
    EmptyBatch,

    /// Tree depth outside `1..=MAX_TREE_DEPTH`.
    #[error("tree depth {0} outside the supported range")]
    TreeDepth(usize),

    /// Auctions split bids evenly between buyers and sellers.
    #[error("auction size {0} must be even and at least 2")]
    AuctionSize(usize),
}

/// Sizes for the transfer and auction circuits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Params {
    /// Notes spent and created per transfer ($l$).
    pub batch_size: usize,
    /// Depth of the commitment tree ($h$).
    pub tree_depth: usize,
    /// Bids settled per auction ($n$).
    pub auction_size: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            tree_depth: DEFAULT_TREE_DEPTH,
            auction_size: DEFAULT_AUCTION_SIZE,
        }
    }
}

impl Params {
    /// Validated parameters.
    pub fn new(batch_size: usize, tree_depth: usize, auction_size: usize) -> Result<Self, ConfigError> {
        let params = Self {
            batch_size,
            tree_depth,
            auction_size,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks the invariants enforced by [`Params::new`].
    ///
    /// Deserialized values bypass the constructor and should be validated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        if !(1..=MAX_TREE_DEPTH).contains(&self.tree_depth) {
            return Err(ConfigError::TreeDepth(self.tree_depth));
        }
        if self.auction_size < 2 || (self.auction_size & 1) != 0 {
            return Err(ConfigError::AuctionSize(self.auction_size));
        }
        Ok(())
    }

    /// Number of buyer bids; the remaining bids are sellers.
    #[must_use]
    pub const fn buyers(&self) -> usize {
        self.auction_size >> 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Params::default().validate().unwrap();
        assert_eq!(Params::default().buyers(), 30);
    }

    #[test]
    fn rejects_bad_sizes() {
        assert_eq!(Params::new(0, 3, 4), Err(ConfigError::EmptyBatch));
        assert_eq!(Params::new(1, 0, 4), Err(ConfigError::TreeDepth(0)));
        assert_eq!(Params::new(1, 33, 4), Err(ConfigError::TreeDepth(33)));
        assert_eq!(Params::new(1, 3, 3), Err(ConfigError::AuctionSize(3)));
        assert_eq!(Params::new(1, 3, 0), Err(ConfigError::AuctionSize(0)));
        assert!(Params::new(1, 1, 2).is_ok());
    }
}

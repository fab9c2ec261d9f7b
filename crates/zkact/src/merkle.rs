//! Fixed-depth commitment tree.
//!
//! A binary tree of depth $h$ over note commitments, hashed with
//! $\text{node} = H(\text{left}, \text{right})$. Empty leaves are zero and
//! empty subtrees hash up level by level.
//!
//! A [`MerklePath`] carries one direction bit and one sibling per level,
//! leaf first. Direction `1` means the running node is the right child:
//!
//! $$\text{parent} = \begin{cases} H(\text{node}, \text{sibling}) & b = 0 \\
//!   H(\text{sibling}, \text{node}) & b = 1 \end{cases}$$

use core::{iter, mem};

use bitvec::{order::Lsb0, slice::BitSlice, vec::BitVec, view::BitView as _};
use ff::Field as _;
use pasta_curves::Fp;
use proof_oracle::Hasher;

use crate::constants::MAX_TREE_DEPTH;

/// Direction bits, leaf level first.
pub type Directions = BitVec<u64, Lsb0>;

/// $H(\text{left}, \text{right})$
#[must_use]
pub fn node(left: Fp, right: Fp) -> Fp {
    Hasher::hash(&[left, right])
}

/// A membership path from a leaf to the root.
#[derive(Clone, Debug, PartialEq, Eq)]
#[expect(
    clippy::module_name_repetitions,
    reason = "MerklePath reads better than Path at call sites"
)]
pub struct MerklePath {
    directions: Directions,
    siblings: Vec<Fp>,
}

impl MerklePath {
    /// A path for the leaf at `position`, one sibling per level.
    ///
    /// Direction bits are the low `siblings.len()` bits of `position`.
    #[must_use]
    pub fn new(position: u64, siblings: Vec<Fp>) -> Self {
        let directions = position
            .view_bits::<Lsb0>()
            .iter()
            .by_vals()
            .take(siblings.len())
            .collect();
        Self {
            directions,
            siblings,
        }
    }

    /// A path from explicit direction bits and siblings.
    ///
    /// Returns `None` if the lengths differ.
    #[must_use]
    pub fn from_parts(directions: Directions, siblings: Vec<Fp>) -> Option<Self> {
        (directions.len() == siblings.len()).then_some(Self {
            directions,
            siblings,
        })
    }

    /// Number of levels.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Direction bits, leaf level first.
    #[must_use]
    pub fn directions(&self) -> &BitSlice<u64, Lsb0> {
        &self.directions
    }

    /// Siblings, leaf level first.
    #[must_use]
    pub fn siblings(&self) -> &[Fp] {
        &self.siblings
    }

    /// Leaf position encoded by the direction bits.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.directions
            .iter()
            .by_vals()
            .rev()
            .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit))
    }

    /// Recomputes the root from `leaf`.
    #[must_use]
    pub fn root(&self, leaf: Fp) -> Fp {
        self.directions
            .iter()
            .by_vals()
            .zip(&self.siblings)
            .fold(leaf, |current, (is_right, sibling)| {
                if is_right {
                    node(*sibling, current)
                } else {
                    node(current, *sibling)
                }
            })
    }

    /// Whether `leaf` sits under `root` along this path.
    #[must_use]
    pub fn verify(&self, leaf: Fp, root: Fp) -> bool {
        self.root(leaf) == root
    }
}

/// Errors from [`MerkleTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// All $2^h$ leaves are occupied.
    #[error("commitment tree is full")]
    Full,

    /// No leaf has been appended at this position.
    #[error("no leaf at position {0}")]
    UnknownPosition(u64),

    /// Depth outside `1..=MAX_TREE_DEPTH`.
    #[error("tree depth {0} outside the supported range")]
    Depth(usize),
}

/// An append-only commitment tree of fixed depth.
#[derive(Clone, Debug)]
#[expect(
    clippy::module_name_repetitions,
    reason = "MerkleTree reads better than Tree at call sites"
)]
pub struct MerkleTree {
    depth: usize,
    leaves: Vec<Fp>,
    empty: Vec<Fp>,
}

impl MerkleTree {
    /// An empty tree of `depth` levels, `1 <= depth <= MAX_TREE_DEPTH`.
    pub fn new(depth: usize) -> Result<Self, TreeError> {
        if !(1..=MAX_TREE_DEPTH).contains(&depth) {
            return Err(TreeError::Depth(depth));
        }
        let empty = iter::successors(Some(Fp::ZERO), |below| Some(node(*below, *below)))
            .take(depth + 1)
            .collect();
        Ok(Self {
            depth,
            leaves: Vec::new(),
            empty,
        })
    }

    /// Tree depth $h$.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Number of appended leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether no leaf has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Appends a leaf, returning its position.
    pub fn append(&mut self, leaf: Fp) -> Result<u64, TreeError> {
        let position = u64::try_from(self.leaves.len()).map_err(|_err| TreeError::Full)?;
        let full = u32::try_from(self.depth)
            .ok()
            .and_then(|depth| position.checked_shr(depth))
            .is_some_and(|high| high != 0);
        if full {
            return Err(TreeError::Full);
        }
        self.leaves.push(leaf);
        Ok(position)
    }

    fn empty_at(&self, level: usize) -> Fp {
        self.empty.get(level).copied().unwrap_or(Fp::ZERO)
    }

    /// Every level from the leaves up, padded to even width with the empty
    /// subtree root of that level.
    fn levels(&self) -> Vec<Vec<Fp>> {
        let mut levels = Vec::with_capacity(self.depth + 1);
        let mut current = self.leaves.clone();
        for level in 0..self.depth {
            if (current.len() & 1) != 0 {
                current.push(self.empty_at(level));
            }
            let parents = current
                .iter()
                .step_by(2)
                .zip(current.iter().skip(1).step_by(2))
                .map(|(left, right)| node(*left, *right))
                .collect();
            levels.push(mem::replace(&mut current, parents));
        }
        levels.push(current);
        levels
    }

    /// The current root.
    #[must_use]
    pub fn root(&self) -> Fp {
        self.levels()
            .last()
            .and_then(|top| top.first().copied())
            .unwrap_or_else(|| self.empty_at(self.depth))
    }

    /// The membership path of the leaf at `position`.
    pub fn witness(&self, position: u64) -> Result<MerklePath, TreeError> {
        let index = usize::try_from(position).map_err(|_err| TreeError::UnknownPosition(position))?;
        if index >= self.leaves.len() {
            return Err(TreeError::UnknownPosition(position));
        }
        let siblings = self
            .levels()
            .iter()
            .take(self.depth)
            .enumerate()
            .map(|(level, nodes)| {
                let sibling = (index >> level) ^ 1;
                nodes.get(sibling).copied().unwrap_or_else(|| self.empty_at(level))
            })
            .collect();
        Ok(MerklePath::new(position, siblings))
    }
}

//! Protocol-wide domain separators and default sizes.
//!
//! All BLAKE2b personalizations are exactly 16 bytes (the BLAKE2b
//! personal field width).

/// Hash-to-curve domain separation tag for threshold PS signing.
///
/// $h = \text{HashToG1}(m, \text{DST})$ over BLS12-381 with
/// `expand_message_xmd` (SHA-256).
pub const SIGNATURE_DST: &[u8] = b"ACT implementation";

/// BLAKE2b-512 personalization for deriving a signature [`Message`] from
/// arbitrary bytes.
///
/// [`Message`]: crate::threshold::Message
pub const MESSAGE_PERSONALIZATION: &[u8; 16] = b"ZkAct-PS-Message";

/// Default transfer batch size $l$.
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// Default commitment tree depth $h$.
pub const DEFAULT_TREE_DEPTH: usize = 3;

/// Default number of auction bids $n$ (half buyers, half sellers).
pub const DEFAULT_AUCTION_SIZE: usize = 60;

/// Largest supported commitment tree depth.
pub const MAX_TREE_DEPTH: usize = 32;

//! # Randomly Balanced Lists.
//!
//! An immutable, structurally shared byte sequence. The split points of the
//! tree are chosen at random, which keeps the expected depth logarithmic
//! without any rebalancing metadata. Shape-choosing operations live on
//! [`Balancer`], read-only ones on [`Seq`].
pub mod balancer;
pub mod iter;
pub mod node;

pub use balancer::Balancer;
pub use node::Seq;

/// Sequences shorter than this are stored as one contiguous leaf.
/// Increase to use less memory and more CPU.
pub const LEAF_THRESHOLD: usize = 32;

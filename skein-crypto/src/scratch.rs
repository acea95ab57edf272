//! Reusable working buffers.
//!
//! Every engine operation allocates its own scratch space unless the caller
//! hands one of these in. Reusing a scratch across many same-shaped calls
//! avoids reallocation; results are identical either way. A scratch is
//! `&mut`-borrowed for the duration of one call, so it can never be shared by
//! two calls at once.

use skein_types::constants::{DIGEST_BYTES, LOG_AND_EXP_BYTES, SHARE_INDEX_BYTES};
use skein_types::primitives::Digest;
use zeroize::Zeroize;

/// Working memory for root and proof construction: one level of digests.
#[derive(Debug, Default)]
pub struct MerkleScratch {
    pub(crate) level: Vec<Digest>,
}

impl MerkleScratch {
    /// Create an empty scratch that grows on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scratch pre-sized for trees of up to `leaves` leaves.
    pub fn for_leaves(leaves: usize) -> Self {
        Self {
            level: Vec::with_capacity(leaves),
        }
    }

    /// Number of leaf digests the scratch can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.level.capacity()
    }

    /// Bytes a proof over `leaves` leaves needs in working memory: leaf
    /// digests, the level being folded, the target digest and the output.
    ///
    /// For callers budgeting memory before building trees; the engine itself
    /// only needs [`MerkleScratch::for_leaves`].
    pub fn proof_footprint(leaves: usize) -> usize {
        (3 * leaves + 4) * DIGEST_BYTES + leaves
    }

    /// Clear the level buffer, keeping its allocation.
    pub(crate) fn reset(&mut self, leaves: usize) -> &mut Vec<Digest> {
        self.level.clear();
        self.level.reserve(leaves);
        &mut self.level
    }
}

/// Working memory for splitting and restoring: per-byte polynomial
/// coefficients and interpolation points.
///
/// Contents are wiped after each call and on drop.
#[derive(Debug, Default)]
pub struct ShamirScratch {
    pub(crate) coefficients: Vec<u8>,
    pub(crate) points: Vec<(u8, u8)>,
}

impl ShamirScratch {
    /// Create an empty scratch that grows on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scratch pre-sized for splitting with the given threshold.
    pub fn for_split(threshold: usize) -> Self {
        Self {
            coefficients: Vec::with_capacity(threshold),
            points: Vec::new(),
        }
    }

    /// Create a scratch pre-sized for restoring from `shares` shares.
    pub fn for_restore(shares: usize) -> Self {
        Self {
            coefficients: Vec::new(),
            points: Vec::with_capacity(shares),
        }
    }

    /// Bytes a split needs in working memory, including the field tables.
    /// A sizing helper for callers planning memory up front.
    pub fn split_footprint(secret_len: usize, shares: usize, threshold: usize) -> usize {
        shares * (secret_len + SHARE_INDEX_BYTES) + secret_len + threshold + LOG_AND_EXP_BYTES
    }

    /// Bytes a restore needs in working memory, including the field tables.
    /// A sizing helper for callers planning memory up front.
    pub fn restore_footprint(secret_len: usize, shares: usize) -> usize {
        shares * (secret_len + SHARE_INDEX_BYTES) + secret_len + 2 * shares + LOG_AND_EXP_BYTES
    }

    pub(crate) fn wipe(&mut self) {
        self.coefficients.zeroize();
        for point in self.points.iter_mut() {
            point.0.zeroize();
            point.1.zeroize();
        }
        self.points.clear();
    }
}

impl Drop for ShamirScratch {
    fn drop(&mut self) {
        self.wipe();
    }
}

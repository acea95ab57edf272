// ─── Hash Tree Parameters ────────────────────────────────────────────────────

/// Length of a digest produced by the hash primitive (SHA-512).
pub const DIGEST_BYTES: usize = 64;

/// Length of one encoded proof step: sibling digest followed by a side byte.
pub const PROOF_STEP_BYTES: usize = DIGEST_BYTES + 1;

/// Side byte meaning "sibling sits to the left of the tracked node".
pub const SIDE_LEFT: u8 = 0;

/// Side byte meaning "sibling sits to the right of the tracked node".
pub const SIDE_RIGHT: u8 = 1;

/// Fill byte of the proof returned for a tree with exactly one leaf.
pub const SINGLE_LEAF_PROOF_BYTE: u8 = 1;

// ─── Secret Sharing Parameters ───────────────────────────────────────────────

/// Shortest secret that may be split.
pub const MIN_SECRET_BYTES: usize = 2;

/// Lowest allowed reconstruction threshold.
pub const MIN_THRESHOLD: usize = 2;

/// Fewest shares accepted by restore.
pub const MIN_RESTORE_SHARES: usize = 2;

/// Upper bound on shares: every non-zero element of GF(256) is one x-coordinate.
pub const MAX_SHARES: usize = 255;

/// Share length overhead: the trailing x-coordinate byte.
pub const SHARE_INDEX_BYTES: usize = 1;

/// Default number of shares produced by a dealer.
pub const DEFAULT_SHARES: usize = 5;

/// Default reconstruction threshold.
pub const DEFAULT_THRESHOLD: usize = 3;

// ─── Field Parameters ────────────────────────────────────────────────────────

/// Number of elements in GF(256).
pub const FIELD_SIZE: usize = 256;

/// Order of the multiplicative group of GF(256).
pub const FIELD_ORDER: usize = FIELD_SIZE - 1;

/// Length of the exponent table. Two logarithms sum to at most 508, so the
/// table covers every such sum without a modulo reduction.
pub const EXP_TABLE_LEN: usize = 510;

/// Combined log and exp table footprint in bytes.
pub const LOG_AND_EXP_BYTES: usize = FIELD_SIZE + EXP_TABLE_LEN;

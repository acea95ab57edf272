use crate::constants::DIGEST_BYTES;

/// 64-byte hash digest produced by the hash primitive.
pub type Digest = [u8; DIGEST_BYTES];

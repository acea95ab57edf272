use std::sync::Arc;

use rand::RngCore;
use sha2::{Digest as _, Sha512};
use skein_types::constants::DIGEST_BYTES;
use skein_types::error::{SkeinError, SkeinResult};
use skein_types::primitives::Digest;

/// Hash and randomness provider consumed by the engines.
///
/// Both engines are written against this trait only; they never reach for a
/// concrete hash function or RNG themselves. Implementations must be safe to
/// share across threads. Failures are reported as
/// [`SkeinError::PrimitiveFailure`] and are never retried by the engines.
pub trait Primitives: Send + Sync {
    /// Hash `data` into a 64-byte digest.
    fn hash(&self, data: &[u8]) -> SkeinResult<Digest>;

    /// Fill `out` with cryptographically secure random bytes.
    fn random_bytes(&self, out: &mut [u8]) -> SkeinResult<()>;

    /// Hash the concatenation `left ‖ right`.
    fn hash_pair(&self, left: &Digest, right: &Digest) -> SkeinResult<Digest> {
        let mut concat = [0u8; 2 * DIGEST_BYTES];
        concat[..DIGEST_BYTES].copy_from_slice(left);
        concat[DIGEST_BYTES..].copy_from_slice(right);
        self.hash(&concat)
    }

    /// Return `n` fresh random bytes.
    fn random_vec(&self, n: usize) -> SkeinResult<Vec<u8>> {
        let mut out = vec![0u8; n];
        self.random_bytes(&mut out)?;
        Ok(out)
    }
}

/// SHA-512 hashing with operating-system randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512Primitives;

impl Primitives for Sha512Primitives {
    fn hash(&self, data: &[u8]) -> SkeinResult<Digest> {
        Ok(sha512(data))
    }

    fn random_bytes(&self, out: &mut [u8]) -> SkeinResult<()> {
        rand::rngs::OsRng.try_fill_bytes(out).map_err(|e| {
            tracing::warn!("os randomness unavailable: {}", e);
            SkeinError::PrimitiveFailure {
                reason: e.to_string(),
            }
        })
    }

    fn hash_pair(&self, left: &Digest, right: &Digest) -> SkeinResult<Digest> {
        let mut hasher = Sha512::new();
        hasher.update(left);
        hasher.update(right);
        Ok(to_digest(&hasher.finalize()))
    }
}

/// Shared providers can be handed to several engines at once.
impl<P: Primitives + ?Sized> Primitives for Arc<P> {
    fn hash(&self, data: &[u8]) -> SkeinResult<Digest> {
        (**self).hash(data)
    }

    fn random_bytes(&self, out: &mut [u8]) -> SkeinResult<()> {
        (**self).random_bytes(out)
    }

    fn hash_pair(&self, left: &Digest, right: &Digest) -> SkeinResult<Digest> {
        (**self).hash_pair(left, right)
    }
}

impl<P: Primitives + ?Sized> Primitives for &P {
    fn hash(&self, data: &[u8]) -> SkeinResult<Digest> {
        (**self).hash(data)
    }

    fn random_bytes(&self, out: &mut [u8]) -> SkeinResult<()> {
        (**self).random_bytes(out)
    }

    fn hash_pair(&self, left: &Digest, right: &Digest) -> SkeinResult<Digest> {
        (**self).hash_pair(left, right)
    }
}

/// Compute the SHA-512 digest of the given data.
pub fn sha512(data: &[u8]) -> Digest {
    to_digest(&Sha512::digest(data))
}

fn to_digest(output: &[u8]) -> Digest {
    let mut digest = [0u8; DIGEST_BYTES];
    digest.copy_from_slice(output);
    digest
}

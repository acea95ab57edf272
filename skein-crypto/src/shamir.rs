//! Shamir's Secret Sharing over GF(256).
//!
//! Splits a secret of `n` bytes into shares of `n + 1` bytes, any `threshold`
//! of which restore the original. Every secret byte gets its own random
//! polynomial of degree `threshold - 1` whose constant term is that byte;
//! share `i` holds the evaluations at `x = i` followed by `i` itself.
//!
//! Restoring never learns the threshold. Fewer shares than were required
//! interpolate a different polynomial and silently produce a wrong value.

use std::collections::HashSet;
use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use skein_types::constants::{MAX_SHARES, MIN_RESTORE_SHARES, MIN_SECRET_BYTES, SHARE_INDEX_BYTES};
use skein_types::error::{SkeinError, SkeinResult};
use zeroize::Zeroize;

use crate::config::ShamirConfig;
use crate::gf256;
use crate::primitives::{Primitives, Sha512Primitives};
use crate::scratch::ShamirScratch;

/// Smallest well-formed share: two secret bytes plus the index byte.
const MIN_SHARE_BYTES: usize = MIN_SECRET_BYTES + SHARE_INDEX_BYTES;

/// A single share: `secret_len` evaluation bytes followed by the non-zero
/// x-coordinate. Wiped on drop. Decoders apply the same checks as
/// [`Share::from_bytes`].
#[derive(Clone, PartialEq, Eq, BorshSerialize, Serialize, Deserialize)]
#[serde(try_from = "RawShare")]
pub struct Share {
    bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct RawShare {
    bytes: Vec<u8>,
}

impl TryFrom<RawShare> for Share {
    type Error = SkeinError;

    fn try_from(raw: RawShare) -> SkeinResult<Self> {
        Self::from_bytes(raw.bytes)
    }
}

impl BorshDeserialize for Share {
    fn deserialize_reader<R: borsh::io::Read>(reader: &mut R) -> borsh::io::Result<Self> {
        let bytes = Vec::<u8>::deserialize_reader(reader)?;
        Self::from_bytes(bytes).map_err(|e| {
            borsh::io::Error::new(borsh::io::ErrorKind::InvalidData, e.to_string())
        })
    }
}

impl Share {
    /// Wrap raw share bytes, checking length and index.
    pub fn from_bytes(bytes: Vec<u8>) -> SkeinResult<Self> {
        if bytes.len() < MIN_SHARE_BYTES {
            return Err(SkeinError::ShareTooShort {
                len: bytes.len(),
                min: MIN_SHARE_BYTES,
            });
        }
        if bytes[bytes.len() - 1] == 0 {
            return Err(SkeinError::InvalidShareIndex);
        }
        Ok(Self { bytes })
    }

    /// Parse a hex-encoded share.
    pub fn from_hex(s: &str) -> SkeinResult<Self> {
        let bytes = hex::decode(s).map_err(|e| SkeinError::InvalidEncoding {
            reason: e.to_string(),
        })?;
        Self::from_bytes(bytes)
    }

    /// Lowercase hex of the share bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// The x-coordinate this share was evaluated at.
    pub fn index(&self) -> u8 {
        self.bytes.last().copied().unwrap_or(0)
    }

    /// The evaluation bytes, one per secret byte.
    pub fn data(&self) -> &[u8] {
        let end = self.bytes.len().saturating_sub(SHARE_INDEX_BYTES);
        &self.bytes[..end]
    }

    /// Evaluation bytes followed by the index byte.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the share, returning its bytes unwiped.
    pub fn into_bytes(mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }

    /// Length of the secret this share belongs to.
    pub fn secret_len(&self) -> usize {
        self.data().len()
    }
}

impl AsRef<[u8]> for Share {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("index", &self.index())
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Drop for Share {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Threshold secret-sharing engine.
///
/// Holds only its primitive provider; safe to share between threads.
#[derive(Debug, Clone, Default)]
pub struct SecretSharer<P = Sha512Primitives> {
    primitives: P,
}

impl SecretSharer {
    /// Engine drawing coefficients from OS randomness.
    pub fn new() -> Self {
        Self::with_primitives(Sha512Primitives)
    }
}

impl<P: Primitives> SecretSharer<P> {
    /// Engine drawing coefficients from the given provider.
    pub fn with_primitives(primitives: P) -> Self {
        Self { primitives }
    }

    /// The provider coefficients are drawn from.
    pub fn primitives(&self) -> &P {
        &self.primitives
    }

    /// Split `secret` into `num_shares` shares, any `threshold` of which
    /// restore it.
    ///
    /// # Errors
    /// Checked in this order: [`SkeinError::NeedMoreData`] for secrets under
    /// two bytes, [`SkeinError::ThresholdTooLow`],
    /// [`SkeinError::TooFewShares`] and [`SkeinError::TooManyShares`].
    /// Randomness failures surface as [`SkeinError::PrimitiveFailure`].
    pub fn split(
        &self,
        secret: &[u8],
        num_shares: usize,
        threshold: usize,
    ) -> SkeinResult<Vec<Share>> {
        let mut scratch = ShamirScratch::new();
        self.split_with_scratch(secret, num_shares, threshold, &mut scratch)
    }

    /// [`split`](Self::split) with parameters taken from a config.
    pub fn split_with(&self, secret: &[u8], config: &ShamirConfig) -> SkeinResult<Vec<Share>> {
        self.split(secret, config.shares, config.threshold)
    }

    /// [`split`](Self::split) reusing caller-provided working memory.
    pub fn split_with_scratch(
        &self,
        secret: &[u8],
        num_shares: usize,
        threshold: usize,
        scratch: &mut ShamirScratch,
    ) -> SkeinResult<Vec<Share>> {
        check_split(secret, num_shares, threshold)?;

        tracing::debug!(
            secret_len = secret.len(),
            shares = num_shares,
            threshold,
            "splitting secret"
        );

        let result = self.deal(secret, num_shares, threshold, scratch);
        scratch.wipe();
        result
    }

    fn deal(
        &self,
        secret: &[u8],
        num_shares: usize,
        threshold: usize,
        scratch: &mut ShamirScratch,
    ) -> SkeinResult<Vec<Share>> {
        let mut shares: Vec<Vec<u8>> = (1..=num_shares)
            .map(|x| {
                let mut bytes = vec![0u8; secret.len() + SHARE_INDEX_BYTES];
                bytes[secret.len()] = x as u8;
                bytes
            })
            .collect();

        let coefficients = &mut scratch.coefficients;
        coefficients.clear();
        coefficients.resize(threshold, 0);

        for (j, &byte) in secret.iter().enumerate() {
            if let Err(e) = self.primitives.random_bytes(&mut coefficients[1..]) {
                shares.iter_mut().for_each(|share| share.zeroize());
                return Err(e);
            }
            coefficients[0] = byte;
            for (i, share) in shares.iter_mut().enumerate() {
                share[j] = gf256::eval_polynomial(&coefficients[..], (i + 1) as u8);
            }
        }

        Ok(shares.into_iter().map(|bytes| Share { bytes }).collect())
    }

    /// Restore a secret from two or more shares of one split.
    ///
    /// Accepts [`Share`]s or raw share bytes. No threshold is enforced:
    /// too few shares return a value that is not the secret.
    ///
    /// # Errors
    /// [`SkeinError::NotEnoughShares`] or [`SkeinError::TooManyShares`] for
    /// the share count, [`SkeinError::LengthMismatch`] when lengths differ,
    /// [`SkeinError::ShareTooShort`], and [`SkeinError::InvalidShareIndex`]
    /// or [`SkeinError::DuplicateShareIndex`] for bad x-coordinates.
    pub fn restore<S: AsRef<[u8]>>(&self, shares: &[S]) -> SkeinResult<Vec<u8>> {
        let mut scratch = ShamirScratch::for_restore(shares.len());
        self.restore_with_scratch(shares, &mut scratch)
    }

    /// [`restore`](Self::restore) reusing caller-provided working memory.
    pub fn restore_with_scratch<S: AsRef<[u8]>>(
        &self,
        shares: &[S],
        scratch: &mut ShamirScratch,
    ) -> SkeinResult<Vec<u8>> {
        let share_len = check_shares(shares)?;
        let secret_len = share_len - SHARE_INDEX_BYTES;

        tracing::debug!(shares = shares.len(), secret_len, "restoring secret");

        let result = restore_bytes(shares, secret_len, scratch);
        scratch.wipe();
        result
    }
}

/// Secret length first, then the dealer parameters.
fn check_split(secret: &[u8], num_shares: usize, threshold: usize) -> SkeinResult<()> {
    if secret.len() < MIN_SECRET_BYTES {
        return Err(SkeinError::NeedMoreData {
            len: secret.len(),
            min: MIN_SECRET_BYTES,
        });
    }
    ShamirConfig::new(num_shares, threshold).validate()
}

/// Validate a share set and return the common share length.
fn check_shares<S: AsRef<[u8]>>(shares: &[S]) -> SkeinResult<usize> {
    if shares.len() < MIN_RESTORE_SHARES {
        return Err(SkeinError::NotEnoughShares {
            shares: shares.len(),
            min: MIN_RESTORE_SHARES,
        });
    }
    if shares.len() > MAX_SHARES {
        return Err(SkeinError::TooManyShares {
            shares: shares.len(),
            max: MAX_SHARES,
        });
    }

    let expected = shares[0].as_ref().len();
    if let Some((index, share)) = shares
        .iter()
        .enumerate()
        .find(|(_, share)| share.as_ref().len() != expected)
    {
        return Err(SkeinError::LengthMismatch {
            index,
            expected,
            actual: share.as_ref().len(),
        });
    }
    if expected < MIN_SHARE_BYTES {
        return Err(SkeinError::ShareTooShort {
            len: expected,
            min: MIN_SHARE_BYTES,
        });
    }

    let mut seen = HashSet::with_capacity(shares.len());
    for share in shares {
        let x = share.as_ref()[expected - 1];
        if x == 0 {
            return Err(SkeinError::InvalidShareIndex);
        }
        if !seen.insert(x) {
            tracing::warn!(index = x, "duplicate share index");
            return Err(SkeinError::DuplicateShareIndex(x));
        }
    }

    Ok(expected)
}

fn restore_bytes<S: AsRef<[u8]>>(
    shares: &[S],
    secret_len: usize,
    scratch: &mut ShamirScratch,
) -> SkeinResult<Vec<u8>> {
    let mut secret = vec![0u8; secret_len];
    for (j, out) in secret.iter_mut().enumerate() {
        scratch.points.clear();
        scratch.points.extend(shares.iter().map(|share| {
            let bytes = share.as_ref();
            (bytes[secret_len], bytes[j])
        }));
        match gf256::interpolate_at_zero(&scratch.points) {
            Ok(value) => *out = value,
            Err(e) => {
                secret.zeroize();
                return Err(e);
            }
        }
    }
    Ok(secret)
}

/// Split a secret using OS randomness.
pub fn split_secret(secret: &[u8], num_shares: usize, threshold: usize) -> SkeinResult<Vec<Share>> {
    SecretSharer::new().split(secret, num_shares, threshold)
}

/// Restore a secret from shares produced by [`split_secret`].
pub fn restore_secret<S: AsRef<[u8]>>(shares: &[S]) -> SkeinResult<Vec<u8>> {
    SecretSharer::new().restore(shares)
}

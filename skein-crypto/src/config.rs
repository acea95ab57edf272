use serde::{Deserialize, Serialize};
use skein_types::constants::{DEFAULT_SHARES, DEFAULT_THRESHOLD, MAX_SHARES, MIN_THRESHOLD};
use skein_types::error::{SkeinError, SkeinResult};

/// Dealer parameters for splitting a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShamirConfig {
    /// Number of shares to produce.
    pub shares: usize,
    /// Minimum number of shares needed to restore the secret.
    pub threshold: usize,
}

impl Default for ShamirConfig {
    fn default() -> Self {
        Self {
            shares: DEFAULT_SHARES,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ShamirConfig {
    pub fn new(shares: usize, threshold: usize) -> Self {
        Self { shares, threshold }
    }

    /// Check the parameters in the order a split checks them: threshold
    /// floor, shares against threshold, then the share ceiling.
    pub fn validate(&self) -> SkeinResult<()> {
        if self.threshold < MIN_THRESHOLD {
            return Err(SkeinError::ThresholdTooLow {
                threshold: self.threshold,
                min: MIN_THRESHOLD,
            });
        }
        if self.shares < self.threshold {
            return Err(SkeinError::TooFewShares {
                shares: self.shares,
                threshold: self.threshold,
            });
        }
        if self.shares > MAX_SHARES {
            return Err(SkeinError::TooManyShares {
                shares: self.shares,
                max: MAX_SHARES,
            });
        }
        Ok(())
    }
}

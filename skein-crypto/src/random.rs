//! Uniform sampling helpers built on [`Primitives::random_bytes`].

use skein_types::error::{SkeinError, SkeinResult};

use crate::primitives::Primitives;

/// Uniform integer in `[min, max)`.
///
/// Draws just enough random bytes to cover the range and rejects values in
/// the biased tail, so every result is equally likely.
pub fn random_number_in_range<P: Primitives + ?Sized>(
    primitives: &P,
    min: usize,
    max: usize,
) -> SkeinResult<usize> {
    if max <= min {
        return Err(SkeinError::InvalidRange {
            reason: format!("empty range [{min}, {max})"),
        });
    }
    let range = (max - min) as u128;
    if range == 1 {
        return Ok(min);
    }

    let bits = u128::BITS - (range - 1).leading_zeros();
    let bytes_needed = bits.div_ceil(8) as usize;
    let space = 1u128 << (8 * bytes_needed);
    let accept_below = space - space % range;

    let mut buf = [0u8; std::mem::size_of::<usize>()];
    loop {
        primitives.random_bytes(&mut buf[..bytes_needed])?;
        let value = buf[..bytes_needed]
            .iter()
            .fold(0u128, |acc, &b| (acc << 8) | b as u128);
        if value < accept_below {
            return Ok(min + (value % range) as usize);
        }
    }
}

/// Fisher–Yates shuffle into a new vector.
pub fn array_random_shuffle<T: Clone, P: Primitives + ?Sized>(
    primitives: &P,
    items: &[T],
) -> SkeinResult<Vec<T>> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = random_number_in_range(primitives, 0, i + 1)?;
        out.swap(i, j);
    }
    Ok(out)
}

/// `n` distinct elements of `items` in random order.
///
/// # Errors
/// [`SkeinError::InvalidRange`] when `n` exceeds the number of items or
/// there are fewer than two items to pick from.
pub fn array_random_subset<T: Clone, P: Primitives + ?Sized>(
    primitives: &P,
    items: &[T],
    n: usize,
) -> SkeinResult<Vec<T>> {
    if items.len() < n || items.len() < 2 {
        return Err(SkeinError::InvalidRange {
            reason: format!("cannot pick {n} of {} elements", items.len()),
        });
    }
    let mut shuffled = array_random_shuffle(primitives, items)?;
    shuffled.truncate(n);
    Ok(shuffled)
}

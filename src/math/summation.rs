use std::ops::Add;

use crate::error::{ReductionError, Result};

/// Sums `values` pairwise (tree order) to keep rounding error at `O(log n)`.
///
/// Each round replaces `buf[i]` with `buf[2i] + buf[2i + 1]`; an odd element
/// out is carried into the next round unsummed. Works in place on the owned
/// buffer.
///
/// # Errors
///
/// Returns [`ReductionError::Empty`] if `values` is empty.
pub fn pairwise_sum<T>(mut values: Vec<T>) -> Result<T>
where
    T: Copy + Add<Output = T>,
{
    if values.is_empty() {
        return Err(ReductionError::Empty.into());
    }

    let mut len = values.len();
    while len > 1 {
        let half = len / 2;
        for i in 0..half {
            values[i] = values[2 * i] + values[2 * i + 1];
        }
        if len % 2 == 1 {
            values[half] = values[len - 1];
            len = half + 1;
        } else {
            len = half;
        }
    }

    Ok(values[0])
}

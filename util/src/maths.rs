//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit a value to the closed range `[min, max]`.
///
/// NaN values are mapped to `min`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    let mut ret = *value;

    if ret.is_nan() {
        return *min
    }
    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Arithmetic mean of the values, or `None` if there are none.
pub fn mean<T>(values: &[T]) -> Option<T>
where
    T: Float + std::iter::Sum
{
    if values.is_empty() {
        return None;
    }

    let n = T::from(values.len())?;
    Some(values.iter().copied().sum::<T>() / n)
}

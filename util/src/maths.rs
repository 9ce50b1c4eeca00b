//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Piecewise linear interpolation of `value` over the breakpoints `xp` and
/// values `fp`.
///
/// Values outside the breakpoint range are clamped to the first or last
/// value. `xp` must be increasing and the same length as `fp`, if `fp` is
/// empty `None` is returned.
pub fn interp<T>(value: T, xp: &[T], fp: &[T]) -> Option<T>
where
    T: Float
{
    if xp.len() != fp.len() || fp.is_empty() {
        return None
    }

    let last = fp.len() - 1;

    if value <= xp[0] {
        return Some(fp[0])
    }
    if value >= xp[last] {
        return Some(fp[last])
    }

    // Find the segment containing the value
    for i in 1..xp.len() {
        if value <= xp[i] {
            return Some(lin_map((xp[i - 1], xp[i]), (fp[i - 1], fp[i]), value))
        }
    }

    Some(fp[last])
}

/// Move `value` towards zero by `step`, without crossing zero.
///
/// The magnitude decreases by `step` each call until it reaches zero, the
/// sign is never flipped.
pub fn unwind_toward_zero<T>(value: T, step: T) -> T
where
    T: Float
{
    if value == T::zero() {
        return value
    }

    let mag = value.abs() - step;

    if mag <= T::zero() {
        T::zero()
    }
    else {
        mag * value.signum()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&2f64, &-1f64, &1f64), 1f64);
        assert_eq!(clamp(&-2f64, &-1f64, &1f64), -1f64);
        assert_eq!(clamp(&0.25f64, &-1f64, &1f64), 0.25f64);
    }

    #[test]
    fn test_interp() {
        let xp = [0f64, 10f64, 20f64];
        let fp = [1f64, 1f64, 0.5f64];

        assert_eq!(interp(-5f64, &xp, &fp), Some(1f64));
        assert_eq!(interp(5f64, &xp, &fp), Some(1f64));
        assert_eq!(interp(15f64, &xp, &fp), Some(0.75f64));
        assert_eq!(interp(20f64, &xp, &fp), Some(0.5f64));
        assert_eq!(interp(100f64, &xp, &fp), Some(0.5f64));
        assert_eq!(interp(1f64, &[0f64], &[2f64]), Some(2f64));
        assert_eq!(interp(1f64, &[], &[] as &[f64]), None);
        assert_eq!(interp(1f64, &[0f64, 1f64], &[2f64]), None);
    }

    #[test]
    fn test_unwind_toward_zero() {
        assert_eq!(unwind_toward_zero(1.0f64, 0.25), 0.75);
        assert_eq!(unwind_toward_zero(-1.0f64, 0.25), -0.75);
        assert_eq!(unwind_toward_zero(0.1f64, 0.25), 0.0);
        assert_eq!(unwind_toward_zero(-0.1f64, 0.25), 0.0);
        assert_eq!(unwind_toward_zero(0.0f64, 0.25), 0.0);
    }
}

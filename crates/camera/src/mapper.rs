//! Normalized value mapping
//!
//! Every numeric control is exposed to callers as a float in `[0.0, 1.0]`,
//! linearly mapped onto the device's `[min, max]` range. Native values are
//! snapped to the nearest `res` step counted from `min`.

use protocol::Range;

/// Map a native value into `[0.0, 1.0]`
///
/// A degenerate range (`max <= min`) maps everything to `0.0`.
pub fn to_normalized(value: i64, range: &Range) -> f64 {
    if range.is_degenerate() {
        return 0.0;
    }
    let offset = (value - range.min) as f64;
    (offset / range.span() as f64).clamp(0.0, 1.0)
}

/// Map a normalized value onto the device range
///
/// Out-of-range inputs are clamped rather than rejected, and NaN maps to
/// `min`. The result is always within `[min, max]`.
pub fn to_native(normalized: f64, range: &Range) -> i64 {
    if range.is_degenerate() || normalized.is_nan() {
        return range.min;
    }
    let step = range.step();
    let scaled = normalized.clamp(0.0, 1.0) * range.span() as f64;
    let steps = (scaled / step as f64).round() as i64;
    (range.min + steps * step).clamp(range.min, range.max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_midpoint_of_byte_range() {
        let range = Range::new(0, 255, 1);
        assert_eq!(to_native(0.5, &range), 128);
        let back = to_normalized(128, &range);
        assert!((back - 0.50196).abs() < 1e-4);
    }

    #[test]
    fn test_bounds() {
        let range = Range::new(-64, 64, 1);
        assert_eq!(to_native(0.0, &range), -64);
        assert_eq!(to_native(1.0, &range), 64);
        assert_eq!(to_normalized(-64, &range), 0.0);
        assert_eq!(to_normalized(64, &range), 1.0);
        assert_eq!(to_normalized(0, &range), 0.5);
    }

    #[test]
    fn test_clamps_out_of_range_input() {
        let range = Range::new(2000, 6500, 10);
        assert_eq!(to_native(-0.5, &range), 2000);
        assert_eq!(to_native(7.0, &range), 6500);
        assert_eq!(to_native(f64::NAN, &range), 2000);
        assert_eq!(to_normalized(1000, &range), 0.0);
        assert_eq!(to_normalized(9000, &range), 1.0);
    }

    #[test]
    fn test_snaps_to_resolution() {
        let range = Range::new(2000, 6500, 10);
        // 0.3 * 4500 = 1350 -> 135 steps
        assert_eq!(to_native(0.3, &range), 3350);
        // 0.3001 * 4500 = 1350.45 -> still 135 steps
        assert_eq!(to_native(0.3001, &range), 3350);
        // 0.3011 * 4500 = 1354.95 -> 135.495 rounds to 135
        assert_eq!(to_native(0.3011, &range), 3350);
        // 0.3012 * 4500 = 1355.4 -> 136 steps
        assert_eq!(to_native(0.3012, &range), 3360);
    }

    #[test]
    fn test_top_step_clamped_when_res_does_not_divide_span() {
        // Steps land on 0, 3, 6, 9; 10 is unreachable
        let range = Range::new(0, 10, 3);
        assert_eq!(to_native(1.0, &range), 9);
        assert_eq!(to_native(0.95, &range), 9);
    }

    #[test]
    fn test_degenerate_range() {
        let flat = Range::new(5, 5, 1);
        assert_eq!(to_normalized(5, &flat), 0.0);
        assert_eq!(to_normalized(100, &flat), 0.0);
        assert_eq!(to_native(0.7, &flat), 5);

        let inverted = Range::new(10, 0, 1);
        assert_eq!(to_normalized(5, &inverted), 0.0);
        assert_eq!(to_native(0.7, &inverted), 10);
    }

    #[test]
    fn test_zero_resolution_treated_as_one() {
        let range = Range::new(0, 100, 0);
        assert_eq!(to_native(0.42, &range), 42);
    }

    fn valid_range() -> impl Strategy<Value = Range> {
        (-100_000i64..100_000, 1i64..100_000, 1i64..500).prop_map(|(min, span, res)| {
            Range::new(min, min + span, res.min(span))
        })
    }

    proptest! {
        #[test]
        fn prop_rescaling_error_bounded(x in 0.0f64..=1.0, range in valid_range()) {
            let native = to_native(x, &range);
            let back = to_normalized(native, &range);
            let bound = range.step() as f64 / range.span() as f64;
            prop_assert!((back - x).abs() <= bound + 1e-9,
                "x={} native={} back={} bound={}", x, native, back, bound);
        }

        #[test]
        fn prop_native_within_bounds(x in proptest::num::f64::ANY, range in valid_range()) {
            let native = to_native(x, &range);
            prop_assert!(native >= range.min && native <= range.max);
        }

        #[test]
        fn prop_native_on_step_grid_or_max(x in 0.0f64..=1.0, range in valid_range()) {
            let native = to_native(x, &range);
            prop_assert!(native == range.max || (native - range.min) % range.step() == 0);
        }

        #[test]
        fn prop_normalized_within_unit_interval(v in -300_000i64..300_000, range in valid_range()) {
            let n = to_normalized(v, &range);
            prop_assert!((0.0..=1.0).contains(&n));
        }

        #[test]
        fn prop_degenerate_never_divides(v in any::<i32>(), min in any::<i32>(), below in 0i64..1000) {
            let range = Range::new(i64::from(min), i64::from(min) - below, 1);
            prop_assert_eq!(to_normalized(i64::from(v), &range), 0.0);
        }
    }
}

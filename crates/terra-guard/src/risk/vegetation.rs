use super::raw::RawValue;
use super::score::clip01;

/// Maps a vegetation index of unknown scale onto canonical [0,1] greenness
/// (1.0 = fully vegetated).
///
/// Providers disagree on units: MODIS-style indices arrive as integers
/// around ±10000, other sources report the native [-1,1] range. The rescale
/// ladder below is order-sensitive; keep the branches as they are.
pub fn greenness(raw: &RawValue) -> f64 {
    let value = raw.as_number();
    if value == 0.0 {
        // An exact zero is an absent reading, not minimum greenness.
        return 0.0;
    }

    if value.abs() > 2.0 {
        let rescaled = value / 10000.0;
        if (-1.0..=1.0).contains(&rescaled) {
            return unit_interval(rescaled);
        }
        let rescaled = value / 1000.0;
        if (-1.0..=1.0).contains(&rescaled) {
            return unit_interval(rescaled);
        }
        return clip01((value + 10000.0) / 20000.0);
    }

    unit_interval(value)
}

/// Shifts an index in [-1,1] onto [0,1].
fn unit_interval(index: f64) -> f64 {
    clip01((index + 1.0) / 2.0)
}

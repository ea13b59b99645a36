use std::f64::consts::FRAC_PI_4;

/// Left and right gains of a pan position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoGains {
    pub left: f64,
    pub right: f64,
}

/// Equal-power pan law. `-1.0` is hard left, `0.0` the center (-3 dB on each side) and
/// `1.0` hard right. `left² + right² = 1` for every position.
///
/// Positions outside of `[-1, 1]` are not clamped.
#[inline]
pub fn gains(pan: f64) -> StereoGains {
    let angle = (pan + 1.0) * FRAC_PI_4;
    StereoGains {
        left: angle.cos(),
        right: angle.sin(),
    }
}

//! Slider position <-> control value mapping.
//!
//! A slider spans the control's own `[min, max]` range. Linear controls map
//! one to one; logarithmic controls bend the curve with base [`LOG_BASE`] so
//! the low end of the range gets more travel.

/// Base of the logarithmic curve.
pub const LOG_BASE: f64 = 10.0;

/// Shape of the mapping between slider and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    Logarithmic,
}

/// Position a slider should show for `value`.
///
/// Linear values are clamped into `[min, max]`. Logarithmic values outside
/// the range snap to the nearest end. A degenerate range (`min == max`)
/// always yields `min`.
pub fn to_slider(curve: Curve, value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 {
        return min;
    }

    match curve {
        Curve::Linear => value.max(min).min(max),
        Curve::Logarithmic => {
            let scaled = (value - min) / range;
            if scaled <= 0.0 {
                min
            } else if scaled >= 1.0 {
                max
            } else {
                (scaled * (LOG_BASE - 1.0) + 1.0).log(LOG_BASE) / LOG_BASE.log(LOG_BASE) * range
                    + min
            }
        }
    }
}

/// Control value for a slider at `position`, rounded with [`round_value`].
pub fn to_value(curve: Curve, position: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 {
        return min;
    }

    let value = match curve {
        Curve::Linear => position,
        Curve::Logarithmic => {
            let scaled = (position - min) / range;
            (LOG_BASE.powf(scaled) - 1.0) / (LOG_BASE - 1.0) * range + min
        }
    };

    round_value(value)
}

/// Rounds to the coarsest decimal precision (at least two places) that
/// still keeps three significant digits.
///
/// Zero and non-finite values are returned untouched, as are values too
/// large to scale without overflowing.
pub fn round_value(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }

    let mut decimals = 100.0_f64;
    while (value * decimals).abs() < 100.0 {
        decimals *= 10.0;
        if !decimals.is_finite() {
            return value;
        }
    }

    let scaled = value * decimals;
    if !scaled.is_finite() {
        return value;
    }

    // half rounds up, as sliders in the web UI always did
    (scaled + 0.5).floor() / decimals
}

/// Absolute precision [`round_value`] keeps for `value`.
pub fn precision_of(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return 0.0;
    }
    let mut decimals = 100.0_f64;
    while (value * decimals).abs() < 100.0 && decimals.is_finite() {
        decimals *= 10.0;
    }
    1.0 / decimals
}

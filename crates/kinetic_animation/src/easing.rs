//! Easing curves
//!
//! Maps normalized time `t` in `[0, 1]` to eased progress. Every curve
//! satisfies `apply(0) == 0` and `apply(1) == 1`.

/// Easing function
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// `1 - (1 - t)^3`
    EaseOutCubic,
    /// `1 - (1 - t)^2`
    Power2Out,
    /// CSS-style cubic bezier with control points (x1, y1) and (x2, y2)
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Reveal transition curve
    pub const REVEAL: Easing = Easing::CubicBezier(0.25, 0.46, 0.45, 0.94);

    /// Directional mask wipe curve
    pub const MASK_WIPE: Easing = Easing::CubicBezier(0.77, 0.0, 0.175, 1.0);

    /// Apply the easing to normalized time (clamped to `[0, 1]`)
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match *self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::Power2Out => 1.0 - (1.0 - t).powi(2),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }
}

fn bezier_component(a1: f32, a2: f32, t: f32) -> f32 {
    // B(t) for P0 = 0, P3 = 1
    let u = 1.0 - t;
    3.0 * u * u * t * a1 + 3.0 * u * t * t * a2 + t * t * t
}

fn bezier_slope(a1: f32, a2: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    3.0 * u * u * a1 + 6.0 * u * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
}

fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    // Newton-Raphson on x(t), bisection fallback
    let mut t = x;
    for _ in 0..8 {
        let error = bezier_component(x1, x2, t) - x;
        if error.abs() < 1e-6 {
            return bezier_component(y1, y2, t);
        }
        let slope = bezier_slope(x1, x2, t);
        if slope.abs() < 1e-6 {
            break;
        }
        t -= error / slope;
    }

    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    t = x;
    for _ in 0..32 {
        let value = bezier_component(x1, x2, t);
        if (value - x).abs() < 1e-6 {
            break;
        }
        if value < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }

    bezier_component(y1, y2, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [Easing; 8] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseOutCubic,
        Easing::Power2Out,
        Easing::REVEAL,
        Easing::MASK_WIPE,
    ];

    #[test]
    fn test_endpoints() {
        for easing in CURVES {
            assert!(easing.apply(0.0).abs() < 1e-5, "{:?}", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{:?}", easing);
        }
    }

    #[test]
    fn test_clamps_input() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
        assert_eq!(Easing::EaseOutCubic.apply(f32::NAN), 0.0);
    }

    #[test]
    fn test_ease_out_cubic_formula() {
        let t = 0.4_f32;
        let expected = 1.0 - (1.0 - t).powi(3);
        assert!((Easing::EaseOutCubic.apply(t) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_monotonic_curves() {
        for easing in CURVES {
            let mut previous = 0.0;
            for step in 0..=100 {
                let value = easing.apply(step as f32 / 100.0);
                assert!(value + 1e-4 >= previous, "{:?} at {}", easing, step);
                previous = value;
            }
        }
    }

    #[test]
    fn test_linear_bezier_matches_linear() {
        let linear = Easing::CubicBezier(0.0, 0.0, 1.0, 1.0);
        for step in 0..=10 {
            let t = step as f32 / 10.0;
            assert!((linear.apply(t) - t).abs() < 1e-3);
        }
    }
}

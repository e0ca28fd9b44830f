//! Blending masks
//!
//! A blending mask dissolves the bottom edge of a hero section into the
//! page background. It is a stack of six layers (gradients, noise, a
//! backdrop blur band and a glow) parametrized by intensity and height.
//! The engine only describes the layers; the host paints them.

use crate::context::MotionContext;
use crate::mapper::TransformMapper;
use crate::signal::{MappedValue, ScrollSignal, SignalOptions};
use kinetic_core::{Color, MaskConfig, MotionError, Point, Result};
use serde::Serialize;
use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::str::FromStr;

/// CSS-style length
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    Px(f32),
    /// Percentage of the containing box
    Percent(f32),
    /// Percentage of the viewport height
    Vh(f32),
}

impl Length {
    /// Length in pixels for a container and viewport height
    pub fn resolve(&self, container: f32, viewport_height: f32) -> f32 {
        match *self {
            Length::Px(px) => px,
            Length::Percent(percent) => percent / 100.0 * container,
            Length::Vh(vh) => vh / 100.0 * viewport_height,
        }
    }
}

impl FromStr for Length {
    type Err = MotionError;

    fn from_str(source: &str) -> Result<Self> {
        let token = source.trim();
        let (number, unit): (&str, fn(f32) -> Length) = if let Some(n) = token.strip_suffix("vh") {
            (n, Length::Vh)
        } else if let Some(n) = token.strip_suffix("px") {
            (n, Length::Px)
        } else if let Some(n) = token.strip_suffix('%') {
            (n, Length::Percent)
        } else if token == "0" {
            (token, Length::Px)
        } else {
            return Err(MotionError::InvalidLength(source.to_string()));
        };

        number
            .parse::<f32>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(unit)
            .ok_or_else(|| MotionError::InvalidLength(source.to_string()))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{}px", px),
            Length::Percent(percent) => write!(f, "{}%", percent),
            Length::Vh(vh) => write!(f, "{}vh", vh),
        }
    }
}

/// Gradient color stop; `offset` in percent from the bottom edge
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

type Stops = SmallVec<[GradientStop; 8]>;

fn stops(background: Color, table: &[(f32, f32)]) -> Stops {
    table
        .iter()
        .map(|&(offset, alpha)| GradientStop {
            offset,
            color: background.with_alpha(background.a * alpha),
        })
        .collect()
}

/// One painted layer of a mask, bottom-most first
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaskLayer {
    /// Linear gradient running bottom to top
    LinearGradient { stops: Stops, opacity: f32 },
    /// Elliptical gradient; size and center in percent of the mask box
    RadialGradient {
        width: f32,
        height: f32,
        center: Point,
        stops: Stops,
        opacity: f32,
    },
    /// Fractal noise blended with `overlay`
    Noise {
        base_frequency: f32,
        octaves: u8,
        opacity: f32,
    },
    /// Backdrop blur over the bottom `height` fraction, fading out upward
    BackdropBlur {
        height: f32,
        blur: f32,
        saturate: f32,
    },
    /// Blurred soft gradient
    Glow {
        stops: Stops,
        blur: f32,
        opacity: f32,
    },
}

impl MaskLayer {
    pub fn opacity(&self) -> f32 {
        match self {
            MaskLayer::LinearGradient { opacity, .. }
            | MaskLayer::RadialGradient { opacity, .. }
            | MaskLayer::Noise { opacity, .. }
            | MaskLayer::Glow { opacity, .. } => *opacity,
            MaskLayer::BackdropBlur { .. } => 1.0,
        }
    }
}

/// Six-layer hero edge dissolve
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlendingMask {
    intensity: f32,
    height: Length,
    noise_opacity: f32,
    blur_amount: f32,
    background: Color,
}

impl BlendingMask {
    pub fn new(intensity: f32, height: Length) -> Self {
        Self {
            intensity: clamp_unit(intensity),
            height,
            noise_opacity: 0.03,
            blur_amount: 2.0,
            background: Color::WHITE,
        }
    }

    pub fn from_config(config: &MaskConfig) -> Result<Self> {
        Ok(Self::new(config.intensity, config.height.parse()?)
            .noise_opacity(config.noise_opacity)
            .blur_amount(config.blur_amount))
    }

    pub fn noise_opacity(mut self, opacity: f32) -> Self {
        self.noise_opacity = clamp_unit(opacity);
        self
    }

    pub fn blur_amount(mut self, blur: f32) -> Self {
        self.blur_amount = if blur.is_finite() { blur.max(0.0) } else { 0.0 };
        self
    }

    /// Page background the mask dissolves into
    pub fn background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn height(&self) -> Length {
        self.height
    }

    pub fn height_px(&self, container: f32, viewport_height: f32) -> f32 {
        self.height.resolve(container, viewport_height)
    }

    pub fn layers(&self) -> SmallVec<[MaskLayer; 6]> {
        let bg = self.background;
        smallvec![
            MaskLayer::LinearGradient {
                stops: stops(
                    bg,
                    &[(0.0, 1.0), (15.0, 0.95), (30.0, 0.8), (50.0, 0.5), (70.0, 0.2), (100.0, 0.0)],
                ),
                opacity: self.intensity,
            },
            MaskLayer::LinearGradient {
                stops: stops(bg, &[(0.0, 1.0), (20.0, 0.7), (60.0, 0.0)]),
                opacity: self.intensity * 0.8,
            },
            MaskLayer::RadialGradient {
                width: 150.0,
                height: 100.0,
                center: Point::new(50.0, 100.0),
                stops: stops(bg, &[(0.0, 1.0), (40.0, 0.6), (80.0, 0.0)]),
                opacity: self.intensity * 0.6,
            },
            MaskLayer::Noise {
                base_frequency: 0.8,
                octaves: 4,
                opacity: self.noise_opacity,
            },
            MaskLayer::BackdropBlur {
                height: 0.3,
                blur: self.blur_amount,
                saturate: 1.0,
            },
            MaskLayer::Glow {
                stops: stops(bg, &[(0.0, 0.3), (50.0, 0.0)]),
                blur: 20.0,
                opacity: self.intensity * 0.5,
            },
        ]
    }
}

impl Default for BlendingMask {
    fn default() -> Self {
        Self::new(1.0, Length::Vh(40.0))
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Mask whose opacity rises as the page scrolls
pub struct ScrollBlendMask {
    opacity: MappedValue,
    _scroll: ScrollSignal,
    height: Length,
    background: Color,
}

impl ScrollBlendMask {
    pub const SCROLL_RANGE: [f32; 2] = [0.0, 300.0];

    /// Opacity 0.5 → 1 over the first 300px, 50vh tall
    pub fn new(ctx: &MotionContext) -> Self {
        Self::with_opacity(ctx, 0.5, 1.0, Length::Vh(50.0))
    }

    pub fn with_opacity(ctx: &MotionContext, start: f32, end: f32, height: Length) -> Self {
        let scroll = ScrollSignal::new(ctx, SignalOptions::default());
        let mapper = TransformMapper::linear(Self::SCROLL_RANGE, [clamp_unit(start), clamp_unit(end)])
            .unwrap_or_else(|_| TransformMapper::constant(1.0));
        Self {
            opacity: scroll.map(mapper),
            _scroll: scroll,
            height,
            background: Color::WHITE,
        }
    }

    pub fn background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn opacity(&self) -> f32 {
        self.opacity.get()
    }

    pub fn height(&self) -> Length {
        self.height
    }

    pub fn layers(&self) -> SmallVec<[MaskLayer; 6]> {
        smallvec![
            MaskLayer::LinearGradient {
                stops: stops(
                    self.background,
                    &[
                        (0.0, 1.0),
                        (5.0, 0.98),
                        (15.0, 0.9),
                        (30.0, 0.7),
                        (50.0, 0.4),
                        (75.0, 0.1),
                        (100.0, 0.0),
                    ],
                ),
                opacity: 1.0,
            },
            MaskLayer::BackdropBlur {
                height: 1.0 / 3.0,
                blur: 4.0,
                saturate: 1.2,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::AnimationScheduler;
    use kinetic_core::{AnimationController, MotionConfig};
    use kinetic_platform::{EventHub, HostEvent};

    #[test]
    fn test_parse_lengths() {
        assert_eq!("40vh".parse::<Length>().unwrap(), Length::Vh(40.0));
        assert_eq!("120px".parse::<Length>().unwrap(), Length::Px(120.0));
        assert_eq!("30%".parse::<Length>().unwrap(), Length::Percent(30.0));
        assert_eq!("0".parse::<Length>().unwrap(), Length::Px(0.0));
        for bad in ["", "40", "abcvh", "-5px", "10em"] {
            assert!(bad.parse::<Length>().is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_resolve_lengths() {
        assert_eq!(Length::Vh(40.0).resolve(500.0, 1000.0), 400.0);
        assert_eq!(Length::Percent(50.0).resolve(500.0, 1000.0), 250.0);
        assert_eq!(Length::Px(12.0).resolve(500.0, 1000.0), 12.0);
    }

    #[test]
    fn test_six_layers_scale_with_intensity() {
        let mask = BlendingMask::new(0.5, Length::Vh(40.0));
        let layers = mask.layers();
        assert_eq!(layers.len(), 6);
        assert_eq!(layers[0].opacity(), 0.5);
        assert_eq!(layers[1].opacity(), 0.4);
        assert!((layers[2].opacity() - 0.3).abs() < 1e-6);
        assert_eq!(layers[3].opacity(), 0.03);
        assert_eq!(layers[5].opacity(), 0.25);
        assert!(matches!(layers[4], MaskLayer::BackdropBlur { blur, .. } if blur == 2.0));
    }

    #[test]
    fn test_intensity_clamped() {
        assert_eq!(BlendingMask::new(3.0, Length::Px(10.0)).intensity(), 1.0);
        assert_eq!(BlendingMask::new(-1.0, Length::Px(10.0)).intensity(), 0.0);
        assert_eq!(BlendingMask::new(f32::NAN, Length::Px(10.0)).intensity(), 0.0);
    }

    #[test]
    fn test_from_config() {
        let mask = BlendingMask::from_config(&MaskConfig::default()).unwrap();
        assert_eq!(mask, BlendingMask::default());

        let config = MaskConfig {
            height: "tall".to_string(),
            ..MaskConfig::default()
        };
        assert!(BlendingMask::from_config(&config).is_err());
    }

    #[test]
    fn test_gradient_stops_fade_background() {
        let mask = BlendingMask::default().background(Color::rgb(0.1, 0.1, 0.1));
        let MaskLayer::LinearGradient { stops, .. } = &mask.layers()[0] else {
            panic!("expected linear gradient");
        };
        assert_eq!(stops.len(), 6);
        assert_eq!(stops[0].color.a, 1.0);
        assert_eq!(stops[3].color.a, 0.5);
        assert_eq!(stops[5].color.a, 0.0);
        assert_eq!(stops[5].offset, 100.0);
    }

    #[test]
    fn test_scroll_blend_opacity() {
        let scheduler = AnimationScheduler::new();
        let hub = EventHub::new(1000.0, 800.0);
        let ctx = MotionContext::new(
            AnimationController::default(),
            &scheduler,
            hub.clone(),
            MotionConfig::default(),
        );
        let mask = ScrollBlendMask::new(&ctx);
        scheduler.advance(1.0 / 60.0);
        assert_eq!(mask.opacity(), 0.5);

        hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 150.0 });
        scheduler.advance(1.0 / 60.0);
        assert_eq!(mask.opacity(), 0.75);

        hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 900.0 });
        scheduler.advance(1.0 / 60.0);
        assert_eq!(mask.opacity(), 1.0);
        assert_eq!(mask.layers().len(), 2);
    }
}

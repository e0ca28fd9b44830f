//! Reveal presets
//!
//! Every preset maps to a fixed [`KeyframePair`]: the style of an element
//! while hidden and once revealed. Both keyframes of a pair always set the
//! same properties, so interpolating between them never pops a property in
//! or out.

use crate::easing::Easing;
use crate::values::Interpolate;
use kinetic_core::{MotionError, Point, RevealConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clip region in percentages of the element box
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipPath {
    /// Distances cut from each edge
    Inset {
        top: f32,
        right: f32,
        bottom: f32,
        left: f32,
    },
    /// Four corner points
    Polygon([Point; 4]),
}

impl ClipPath {
    /// The full box
    pub const FULL_INSET: ClipPath = ClipPath::Inset {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    /// The full box as a polygon
    pub const FULL_POLYGON: ClipPath = ClipPath::Polygon([
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(100.0, 100.0),
        Point::new(0.0, 100.0),
    ]);

    pub const fn polygon(points: [(f32, f32); 4]) -> ClipPath {
        ClipPath::Polygon([
            Point::new(points[0].0, points[0].1),
            Point::new(points[1].0, points[1].1),
            Point::new(points[2].0, points[2].1),
            Point::new(points[3].0, points[3].1),
        ])
    }
}

impl Interpolate for ClipPath {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        match (self, other) {
            (
                ClipPath::Inset {
                    top,
                    right,
                    bottom,
                    left,
                },
                ClipPath::Inset {
                    top: top2,
                    right: right2,
                    bottom: bottom2,
                    left: left2,
                },
            ) => ClipPath::Inset {
                top: top.lerp(top2, t),
                right: right.lerp(right2, t),
                bottom: bottom.lerp(bottom2, t),
                left: left.lerp(left2, t),
            },
            (ClipPath::Polygon(a), ClipPath::Polygon(b)) => ClipPath::Polygon([
                a[0].lerp(&b[0], t),
                a[1].lerp(&b[1], t),
                a[2].lerp(&b[2], t),
                a[3].lerp(&b[3], t),
            ]),
            // Shapes of different kinds cannot blend
            _ if t >= 1.0 => *other,
            _ => *self,
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        match (self, other) {
            (ClipPath::Polygon(a), ClipPath::Polygon(b)) => {
                a.iter().zip(b).all(|(p, q)| p.approx_eq(q, epsilon))
            }
            (ClipPath::Inset { .. }, ClipPath::Inset { .. }) => {
                let (ClipPath::Inset { top, right, bottom, left }, ClipPath::Inset {
                    top: t2,
                    right: r2,
                    bottom: b2,
                    left: l2,
                }) = (self, other)
                else {
                    return false;
                };
                top.approx_eq(t2, epsilon)
                    && right.approx_eq(r2, epsilon)
                    && bottom.approx_eq(b2, epsilon)
                    && left.approx_eq(l2, epsilon)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ClipPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipPath::Inset {
                top,
                right,
                bottom,
                left,
            } => write!(f, "inset({}% {}% {}% {}%)", top, right, bottom, left),
            ClipPath::Polygon(points) => {
                write!(f, "polygon(")?;
                for (i, point) in points.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}% {}%", point.x, point.y)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Style snapshot; `None` means the property is not animated
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Keyframe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<ClipPath>,
    /// Blur radius in px
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f32>,
}

impl Keyframe {
    /// A keyframe that sets nothing (stagger containers)
    pub const EMPTY: Keyframe = Keyframe {
        opacity: None,
        translate_x: None,
        translate_y: None,
        scale: None,
        scale_x: None,
        scale_y: None,
        clip: None,
        blur: None,
    };

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn translate_x(mut self, x: f32) -> Self {
        self.translate_x = Some(x);
        self
    }

    pub fn translate_y(mut self, y: f32) -> Self {
        self.translate_y = Some(y);
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn scale_x(mut self, scale: f32) -> Self {
        self.scale_x = Some(scale);
        self
    }

    pub fn scale_y(mut self, scale: f32) -> Self {
        self.scale_y = Some(scale);
        self
    }

    pub fn clip(mut self, clip: ClipPath) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn blur(mut self, blur: f32) -> Self {
        self.blur = Some(blur);
        self
    }

    /// Names of the properties this keyframe sets
    pub fn properties(&self) -> Vec<&'static str> {
        [
            ("opacity", self.opacity.is_some()),
            ("translate_x", self.translate_x.is_some()),
            ("translate_y", self.translate_y.is_some()),
            ("scale", self.scale.is_some()),
            ("scale_x", self.scale_x.is_some()),
            ("scale_y", self.scale_y.is_some()),
            ("clip", self.clip.is_some()),
            ("blur", self.blur.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    pub fn same_properties(&self, other: &Keyframe) -> bool {
        self.properties() == other.properties()
    }
}

impl Interpolate for Keyframe {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Keyframe {
            opacity: self.opacity.lerp(&other.opacity, t),
            translate_x: self.translate_x.lerp(&other.translate_x, t),
            translate_y: self.translate_y.lerp(&other.translate_y, t),
            scale: self.scale.lerp(&other.scale, t),
            scale_x: self.scale_x.lerp(&other.scale_x, t),
            scale_y: self.scale_y.lerp(&other.scale_y, t),
            clip: self.clip.lerp(&other.clip, t),
            blur: self.blur.lerp(&other.blur, t),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.opacity.approx_eq(&other.opacity, epsilon)
            && self.translate_x.approx_eq(&other.translate_x, epsilon)
            && self.translate_y.approx_eq(&other.translate_y, epsilon)
            && self.scale.approx_eq(&other.scale, epsilon)
            && self.scale_x.approx_eq(&other.scale_x, epsilon)
            && self.scale_y.approx_eq(&other.scale_y, epsilon)
            && self.clip.approx_eq(&other.clip, epsilon)
            && self.blur.approx_eq(&other.blur, epsilon)
    }
}

/// Hidden and visible styles of a preset
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct KeyframePair {
    pub hidden: Keyframe,
    pub visible: Keyframe,
}

impl KeyframePair {
    pub const fn new(hidden: Keyframe, visible: Keyframe) -> Self {
        Self { hidden, visible }
    }

    /// Style at reveal progress `t` (0 hidden, 1 visible)
    pub fn sample(&self, t: f32) -> Keyframe {
        if t.is_nan() || t <= 0.0 {
            self.hidden
        } else if t >= 1.0 {
            self.visible
        } else {
            self.hidden.lerp(&self.visible, t)
        }
    }
}

/// Direction of a mask wipe
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaskDirection {
    #[default]
    Left,
    Right,
    Up,
    Down,
}

impl MaskDirection {
    pub const ALL: [MaskDirection; 4] = [
        MaskDirection::Left,
        MaskDirection::Right,
        MaskDirection::Up,
        MaskDirection::Down,
    ];

    /// Collapsed polygon the wipe starts from
    pub fn hidden_clip(&self) -> ClipPath {
        match self {
            MaskDirection::Left => {
                ClipPath::polygon([(0.0, 0.0), (0.0, 0.0), (0.0, 100.0), (0.0, 100.0)])
            }
            MaskDirection::Right => ClipPath::polygon([
                (100.0, 0.0),
                (100.0, 0.0),
                (100.0, 100.0),
                (100.0, 100.0),
            ]),
            MaskDirection::Up => ClipPath::polygon([
                (0.0, 100.0),
                (100.0, 100.0),
                (100.0, 100.0),
                (0.0, 100.0),
            ]),
            MaskDirection::Down => {
                ClipPath::polygon([(0.0, 0.0), (100.0, 0.0), (100.0, 0.0), (0.0, 0.0)])
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaskDirection::Left => "left",
            MaskDirection::Right => "right",
            MaskDirection::Up => "up",
            MaskDirection::Down => "down",
        }
    }
}

/// Duration, delay and easing of one reveal transition
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Transition {
    pub duration_ms: u32,
    pub delay_ms: u32,
    #[serde(skip)]
    pub easing: Easing,
}

impl Transition {
    pub fn new(duration_ms: u32, easing: Easing) -> Self {
        Self {
            duration_ms,
            delay_ms: 0,
            easing,
        }
    }

    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(600, Easing::REVEAL)
    }
}

/// The reveal vocabulary
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Preset {
    #[default]
    FadeUp,
    FadeDown,
    FadeLeft,
    FadeRight,
    FadeIn,
    ScaleUp,
    ScaleDown,
    SlideUp,
    SlideDown,
    Construction,
    /// Left-to-right polygon wipe with the regular reveal timing
    RevealMask,
    /// Directional polygon wipe with the mask easing
    MaskReveal(MaskDirection),
}

const FADE_OFFSET: f32 = 40.0;
const SLIDE_OFFSET: f32 = 60.0;
const CONSTRUCTION_OFFSET: f32 = 30.0;
const CONSTRUCTION_BLUR: f32 = 10.0;

impl Preset {
    pub const ALL: [Preset; 15] = [
        Preset::FadeUp,
        Preset::FadeDown,
        Preset::FadeLeft,
        Preset::FadeRight,
        Preset::FadeIn,
        Preset::ScaleUp,
        Preset::ScaleDown,
        Preset::SlideUp,
        Preset::SlideDown,
        Preset::Construction,
        Preset::RevealMask,
        Preset::MaskReveal(MaskDirection::Left),
        Preset::MaskReveal(MaskDirection::Right),
        Preset::MaskReveal(MaskDirection::Up),
        Preset::MaskReveal(MaskDirection::Down),
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::FadeUp => "fade-up",
            Preset::FadeDown => "fade-down",
            Preset::FadeLeft => "fade-left",
            Preset::FadeRight => "fade-right",
            Preset::FadeIn => "fade-in",
            Preset::ScaleUp => "scale-up",
            Preset::ScaleDown => "scale-down",
            Preset::SlideUp => "slide-up",
            Preset::SlideDown => "slide-down",
            Preset::Construction => "construction",
            Preset::RevealMask => "reveal-mask",
            Preset::MaskReveal(MaskDirection::Left) => "mask-left",
            Preset::MaskReveal(MaskDirection::Right) => "mask-right",
            Preset::MaskReveal(MaskDirection::Up) => "mask-up",
            Preset::MaskReveal(MaskDirection::Down) => "mask-down",
        }
    }

    /// Hidden and visible keyframes
    pub fn keyframes(&self) -> KeyframePair {
        let shown = Keyframe::EMPTY.opacity(1.0);
        let faded = Keyframe::EMPTY.opacity(0.0);

        match self {
            Preset::FadeUp => KeyframePair::new(
                faded.translate_y(FADE_OFFSET),
                shown.translate_y(0.0),
            ),
            Preset::FadeDown => KeyframePair::new(
                faded.translate_y(-FADE_OFFSET),
                shown.translate_y(0.0),
            ),
            Preset::FadeLeft => KeyframePair::new(
                faded.translate_x(-FADE_OFFSET),
                shown.translate_x(0.0),
            ),
            Preset::FadeRight => KeyframePair::new(
                faded.translate_x(FADE_OFFSET),
                shown.translate_x(0.0),
            ),
            Preset::FadeIn => KeyframePair::new(faded, shown),
            Preset::ScaleUp => KeyframePair::new(faded.scale(0.8), shown.scale(1.0)),
            Preset::ScaleDown => KeyframePair::new(faded.scale(1.2), shown.scale(1.0)),
            Preset::SlideUp => KeyframePair::new(
                faded.translate_y(SLIDE_OFFSET).clip(ClipPath::Inset {
                    top: 100.0,
                    right: 0.0,
                    bottom: 0.0,
                    left: 0.0,
                }),
                shown.translate_y(0.0).clip(ClipPath::FULL_INSET),
            ),
            Preset::SlideDown => KeyframePair::new(
                faded.translate_y(-SLIDE_OFFSET).clip(ClipPath::Inset {
                    top: 0.0,
                    right: 0.0,
                    bottom: 100.0,
                    left: 0.0,
                }),
                shown.translate_y(0.0).clip(ClipPath::FULL_INSET),
            ),
            Preset::Construction => KeyframePair::new(
                faded
                    .translate_y(CONSTRUCTION_OFFSET)
                    .blur(CONSTRUCTION_BLUR)
                    .clip(MaskDirection::Up.hidden_clip()),
                shown
                    .translate_y(0.0)
                    .blur(0.0)
                    .clip(ClipPath::FULL_POLYGON),
            ),
            Preset::RevealMask => KeyframePair::new(
                Keyframe::EMPTY.clip(MaskDirection::Left.hidden_clip()),
                Keyframe::EMPTY.clip(ClipPath::FULL_POLYGON),
            ),
            Preset::MaskReveal(direction) => KeyframePair::new(
                Keyframe::EMPTY.clip(direction.hidden_clip()),
                Keyframe::EMPTY.clip(ClipPath::FULL_POLYGON),
            ),
        }
    }

    /// Default transition for this preset
    pub fn transition(&self, config: &RevealConfig) -> Transition {
        match self {
            Preset::MaskReveal(_) => Transition::new(800, Easing::MASK_WIPE),
            _ => Transition::new(config.duration_ms, Easing::REVEAL),
        }
        .with_delay(config.delay_ms)
    }

    /// Default root margin for this preset
    pub fn root_margin<'a>(&self, config: &'a RevealConfig) -> &'a str {
        match self {
            Preset::MaskReveal(_) => "-50px",
            _ => &config.root_margin,
        }
    }

    /// Mask wipes always play once
    pub fn forces_once(&self) -> bool {
        matches!(self, Preset::MaskReveal(_))
    }
}

impl FromStr for Preset {
    type Err = MotionError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let name = source.trim().to_ascii_lowercase();
        let name = match name.as_str() {
            "mask-reveal" => "mask-left",
            other => other,
        };
        Preset::ALL
            .iter()
            .find(|preset| preset.name() == name)
            .copied()
            .ok_or_else(|| MotionError::UnknownPreset(source.to_string()))
    }
}

impl TryFrom<String> for Preset {
    type Error = MotionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Preset> for String {
    fn from(preset: Preset) -> Self {
        preset.name().to_string()
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

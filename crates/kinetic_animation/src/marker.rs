//! Scroll markers
//!
//! A marker pairs a point on an element with a point on the viewport:
//! `"top 80%"` is reached when the element's top edge crosses 80% of the
//! viewport height. Two markers delimit a scroll range; the position of the
//! scroll offset between them is the range's progress.
//!
//! Element and viewport anchors accept `top`, `center`, `bottom` (or the
//! aliases `start` and `end`), percentages and pixel offsets.

use kinetic_core::{MotionError, Rect, Result};
use std::fmt;
use std::str::FromStr;

/// A position along one axis of a box
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Fraction of the box extent (`top` = 0, `center` = 0.5, `bottom` = 1)
    Fraction(f32),
    /// Pixels from the box start
    Pixels(f32),
}

impl Anchor {
    pub const TOP: Anchor = Anchor::Fraction(0.0);
    pub const CENTER: Anchor = Anchor::Fraction(0.5);
    pub const BOTTOM: Anchor = Anchor::Fraction(1.0);

    /// Offset from the box start for a box of the given extent
    pub fn resolve(&self, extent: f32) -> f32 {
        match *self {
            Anchor::Fraction(fraction) => fraction * extent,
            Anchor::Pixels(px) => px,
        }
    }

    fn parse(token: &str) -> Option<Anchor> {
        match token {
            "top" | "start" | "left" => return Some(Anchor::TOP),
            "center" => return Some(Anchor::CENTER),
            "bottom" | "end" | "right" => return Some(Anchor::BOTTOM),
            _ => {}
        }

        if let Some(percent) = token.strip_suffix('%') {
            let value: f32 = percent.parse().ok()?;
            return value.is_finite().then_some(Anchor::Fraction(value / 100.0));
        }

        let px = token.strip_suffix("px").unwrap_or(token);
        let value: f32 = px.parse().ok()?;
        value.is_finite().then_some(Anchor::Pixels(value))
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Anchor::Fraction(fraction) if fraction == 0.0 => write!(f, "top"),
            Anchor::Fraction(fraction) if fraction == 0.5 => write!(f, "center"),
            Anchor::Fraction(fraction) if fraction == 1.0 => write!(f, "bottom"),
            Anchor::Fraction(fraction) => write!(f, "{}%", fraction * 100.0),
            Anchor::Pixels(px) => write!(f, "{}px", px),
        }
    }
}

/// Element anchor meeting a viewport anchor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub element: Anchor,
    pub viewport: Anchor,
}

impl Marker {
    pub const fn new(element: Anchor, viewport: Anchor) -> Self {
        Self { element, viewport }
    }

    /// `"top 80%"`, the default start of a scroll-linked timeline
    pub fn default_start() -> Self {
        Self::new(Anchor::TOP, Anchor::Fraction(0.8))
    }

    /// `"bottom 20%"`, the default end of a scroll-linked timeline
    pub fn default_end() -> Self {
        Self::new(Anchor::BOTTOM, Anchor::Fraction(0.2))
    }

    /// `"top bottom"`: the element starts entering the viewport
    pub fn enter() -> Self {
        Self::new(Anchor::TOP, Anchor::BOTTOM)
    }

    /// `"bottom top"`: the element has fully left through the top
    pub fn exit() -> Self {
        Self::new(Anchor::BOTTOM, Anchor::TOP)
    }

    /// Signed distance (px of further scrolling) until the marker is reached
    ///
    /// Positive while the marker is still ahead, zero when reached, negative
    /// once scrolled past. `rect` is in viewport coordinates.
    pub fn distance(&self, rect: &Rect, viewport_height: f32) -> f32 {
        rect.top() + self.element.resolve(rect.height()) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for Marker {
    type Err = MotionError;

    fn from_str(source: &str) -> Result<Self> {
        let tokens: Vec<&str> = source.split_whitespace().collect();
        let invalid = || MotionError::InvalidMarker(source.to_string());

        match tokens.as_slice() {
            [element] => {
                let anchor = Anchor::parse(element).ok_or_else(invalid)?;
                Ok(Marker::new(anchor, anchor))
            }
            [element, viewport] => Ok(Marker::new(
                Anchor::parse(element).ok_or_else(invalid)?,
                Anchor::parse(viewport).ok_or_else(invalid)?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// Progress of an element through the range `start..end`, in `[0, 1]`
///
/// Both distances shrink at the same rate while scrolling, so their
/// difference is the range length in pixels. A zero-length range is a step.
pub fn range_progress(rect: &Rect, viewport_height: f32, start: &Marker, end: &Marker) -> f32 {
    let to_start = start.distance(rect, viewport_height);
    let span = to_start - end.distance(rect, viewport_height);

    if span.abs() < f32::EPSILON {
        return if to_start <= 0.0 { 1.0 } else { 0.0 };
    }

    (to_start / span).clamp(0.0, 1.0)
}

//! Animatable value types
//!
//! Provides the [`Interpolate`] trait and a generic keyframe animation over
//! any interpolatable value.

use crate::easing::Easing;
use kinetic_core::{Color, Point};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal (for settling detection)
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for Point {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Point::new(self.x.lerp(&other.x, t), self.y.lerp(&other.y, t))
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.approx_eq(&other.x, epsilon) && self.y.approx_eq(&other.y, epsilon)
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::rgba(
            self.r.lerp(&other.r, t),
            self.g.lerp(&other.g, t),
            self.b.lerp(&other.b, t),
            self.a.lerp(&other.a, t),
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

impl<T: Interpolate> Interpolate for Option<T> {
    /// Present values interpolate; a missing side holds the other side
    fn lerp(&self, other: &Self, t: f32) -> Self {
        match (self, other) {
            (Some(a), Some(b)) => Some(a.lerp(b, t)),
            (Some(a), None) => Some(a.clone()),
            (None, b) => b.clone(),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.approx_eq(b, epsilon),
            (None, None) => true,
            _ => false,
        }
    }
}

/// A keyframe holding a value of type T
#[derive(Clone, Debug)]
pub struct TypedKeyframe<T: Interpolate> {
    /// Time position (0.0 to 1.0)
    pub time: f32,
    /// Value at this keyframe
    pub value: T,
    /// Easing function when transitioning TO this keyframe
    pub easing: Easing,
}

impl<T: Interpolate> TypedKeyframe<T> {
    pub fn new(time: f32, value: T, easing: Easing) -> Self {
        Self { time, value, easing }
    }
}

/// A keyframe animation for any interpolatable type
///
/// With `yoyo` set the animation plays forward then backward forever, the
/// way an ambient zoom loop breathes in and out.
#[derive(Clone, Debug)]
pub struct TypedKeyframeAnimation<T: Interpolate> {
    duration_ms: u32,
    keyframes: Vec<TypedKeyframe<T>>,
    current_time: f32,
    playing: bool,
    looping: bool,
    yoyo: bool,
    reversed: bool,
}

impl<T: Interpolate> TypedKeyframeAnimation<T> {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            keyframes: Vec::new(),
            current_time: 0.0,
            playing: false,
            looping: false,
            yoyo: false,
            reversed: false,
        }
    }

    /// Add a keyframe (builder pattern)
    pub fn keyframe(mut self, time: f32, value: T, easing: Easing) -> Self {
        self.keyframes.push(TypedKeyframe::new(time, value, easing));
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        self
    }

    /// Add a keyframe with linear easing
    pub fn at(self, time: f32, value: T) -> Self {
        self.keyframe(time, value, Easing::Linear)
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Alternate direction on every iteration (implies looping)
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self.looping |= yoyo;
        self
    }

    pub fn start(&mut self) {
        self.current_time = 0.0;
        self.reversed = false;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Get progress (0.0 to 1.0), accounting for the current direction
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let forward = (self.current_time / self.duration_ms as f32).clamp(0.0, 1.0);
        if self.reversed {
            1.0 - forward
        } else {
            forward
        }
    }

    /// Get current interpolated value
    pub fn value(&self) -> Option<T> {
        self.sample_at(self.progress())
    }

    /// Advance animation by delta time (in milliseconds)
    pub fn tick(&mut self, dt_ms: f32) {
        if !self.playing || !(dt_ms.is_finite() && dt_ms > 0.0) {
            return;
        }

        let duration = self.duration_ms as f32;
        if duration <= 0.0 {
            self.current_time = 0.0;
            self.playing = self.looping;
            return;
        }

        self.current_time += dt_ms;
        if self.current_time < duration {
            return;
        }

        if self.looping {
            let iterations = (self.current_time / duration).floor();
            self.current_time -= iterations * duration;
            if self.yoyo && (iterations as u64) % 2 == 1 {
                self.reversed = !self.reversed;
            }
        } else {
            self.current_time = duration;
            self.playing = false;
        }
    }

    /// Sample at a specific progress (0.0 to 1.0)
    pub fn sample_at(&self, progress: f32) -> Option<T> {
        let first = self.keyframes.first()?;
        let progress = progress.clamp(0.0, 1.0);

        let mut prev_kf = first;
        let mut next_kf = first;
        for kf in &self.keyframes {
            if kf.time <= progress {
                prev_kf = kf;
            }
            if kf.time >= progress {
                next_kf = kf;
                break;
            }
        }

        if (prev_kf.time - next_kf.time).abs() < f32::EPSILON {
            return Some(prev_kf.value.clone());
        }

        let local_progress = (progress - prev_kf.time) / (next_kf.time - prev_kf.time);
        let eased = next_kf.easing.apply(local_progress);

        Some(prev_kf.value.lerp(&next_kf.value, eased))
    }
}

/// Keyframe animation for f32 values
pub type FloatAnimation = TypedKeyframeAnimation<f32>;

//! Parallax, depth and tilt effects
//!
//! Thin compositions of the signal layer:
//!
//! - [`Parallax`] - offset an element as it scrolls through the viewport
//! - [`DepthLayer`] - fixed-rate offsets for hero background/mid/foreground
//! - [`MouseTilt`] - pointer-driven 3D rotation with an optional hover lift
//! - [`CinematicZoom`] - a slow ambient scale loop
//!
//! Parallax and zoom are gated by [`AnimationClass::Parallax`], the tilt by
//! [`AnimationClass::ThreeD`]. While gated every output sits at its rest
//! value.

use crate::context::MotionContext;
use crate::easing::Easing;
use crate::mapper::{TransformMapper, TransformSet};
use crate::marker::Marker;
use crate::scheduler::{AnimatedValue, FrameControl, FrameSubscription};
use crate::signal::{Axis, MappedValue, PointerSignal, ScrollProgress, ScrollSignal, SignalOptions};
use crate::spring::SpringConfig;
use crate::values::FloatAnimation;
use kinetic_core::{AnimationClass, Result};
use kinetic_platform::ElementHandle;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Scroll parallax
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct ParallaxOptions {
    /// Fraction of 100px travelled either side of rest; negative inverts
    pub speed: f32,
    pub axis: Axis,
    pub start: Marker,
    pub end: Marker,
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self {
            speed: 0.5,
            axis: Axis::Vertical,
            start: Marker::enter(),
            end: Marker::exit(),
        }
    }
}

impl ParallaxOptions {
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn range(mut self, start: Marker, end: Marker) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

/// Offset that travels from `-100·speed` to `100·speed` as the element
/// scrolls through its range
pub struct Parallax {
    axis: Axis,
    offset: MappedValue,
    _progress: ScrollProgress,
}

impl Parallax {
    pub fn new(ctx: &MotionContext, element: ElementHandle, options: ParallaxOptions) -> Result<Self> {
        let distance = 100.0 * options.speed;
        let mapper = TransformMapper::linear([0.0, 1.0], [-distance, distance])?;

        // Rest sits mid-range so a gated element is not displaced
        let progress = ScrollProgress::with_range(
            ctx,
            element,
            options.start,
            options.end,
            SignalOptions::default()
                .class(AnimationClass::Parallax)
                .neutral(0.5),
        );
        let offset = progress.map(mapper);

        Ok(Self {
            axis: options.axis,
            offset,
            _progress: progress,
        })
    }

    /// Current offset along the configured axis, in pixels
    pub fn offset(&self) -> f32 {
        self.offset.get()
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn transform(&self) -> TransformSet {
        let offset = self.offset();
        match self.axis {
            Axis::Horizontal => TransformSet {
                translate_x: offset,
                ..TransformSet::IDENTITY
            },
            Axis::Vertical => TransformSet {
                translate_y: offset,
                ..TransformSet::IDENTITY
            },
        }
    }
}

// ============================================================================
// Depth layers
// ============================================================================

/// Page scroll over which depth layers travel their full distance
pub const DEPTH_SCROLL_RANGE: [f32; 2] = [0.0, 500.0];

/// Vertical travel of a depth layer across [`DEPTH_SCROLL_RANGE`]
///
/// 0 is the background, 2 the foreground. Unknown depths do not move.
pub fn depth_travel(depth: u32) -> [f32; 2] {
    match depth {
        0 => [0.0, 150.0],
        1 => [0.0, 80.0],
        2 => [0.0, 30.0],
        _ => [0.0, 0.0],
    }
}

/// A hero layer offset by page scroll at a depth-dependent rate
pub struct DepthLayer {
    depth: u32,
    offset: MappedValue,
    _scroll: ScrollSignal,
}

impl DepthLayer {
    pub fn new(ctx: &MotionContext, depth: u32) -> Self {
        let scroll = ScrollSignal::new(ctx, SignalOptions::default().class(AnimationClass::Parallax));
        let offset = match TransformMapper::linear(DEPTH_SCROLL_RANGE, depth_travel(depth)) {
            Ok(mapper) => scroll.map(mapper),
            Err(_) => scroll.map(TransformMapper::constant(0.0)),
        };

        Self {
            depth,
            offset,
            _scroll: scroll,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Stacking order: deeper layers paint first
    pub fn z_index(&self) -> u32 {
        self.depth.saturating_mul(10)
    }

    pub fn offset(&self) -> f32 {
        self.offset.get()
    }

    pub fn transform(&self) -> TransformSet {
        TransformSet {
            translate_y: self.offset(),
            ..TransformSet::IDENTITY
        }
    }
}

// ============================================================================
// Mouse tilt
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiltOptions {
    /// Rotation in degrees at the box edge, doubled corner to corner
    pub strength: f32,
    pub rotate_x: bool,
    pub rotate_y: bool,
    /// Scale applied while hovered; `None` disables the lift
    pub hover_scale: Option<f32>,
    pub perspective: f32,
}

impl Default for TiltOptions {
    fn default() -> Self {
        Self {
            strength: 20.0,
            rotate_x: true,
            rotate_y: true,
            hover_scale: None,
            perspective: 1000.0,
        }
    }
}

impl TiltOptions {
    pub fn strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// Lift the element to `scale` while hovered, e.g. `1.02`
    pub fn with_hover_scale(mut self, scale: f32) -> Self {
        self.hover_scale = Some(scale);
        self
    }
}

/// Pointer-relative 3D rotation of an element
///
/// `rotate_y = x·strength` and `rotate_x = -y·strength`, where `x` and `y`
/// are the pointer's normalized position over the element. Leaving the
/// element springs everything back to rest.
pub struct MouseTilt {
    options: TiltOptions,
    rotate_x: MappedValue,
    rotate_y: MappedValue,
    scale: Arc<Mutex<AnimatedValue>>,
    pointer: PointerSignal,
    _frame: Option<FrameSubscription>,
}

impl MouseTilt {
    pub fn new(ctx: &MotionContext, element: ElementHandle, options: TiltOptions) -> Result<Self> {
        let half = options.strength / 2.0;
        let rotate_x = if options.rotate_x {
            TransformMapper::linear([-0.5, 0.5], [half, -half])?
        } else {
            TransformMapper::constant(0.0)
        };
        let rotate_y = if options.rotate_y {
            TransformMapper::linear([-0.5, 0.5], [-half, half])?
        } else {
            TransformMapper::constant(0.0)
        };

        let spring = SpringConfig::from(ctx.config().spring);
        let pointer = PointerSignal::new(
            ctx,
            Some(element),
            SignalOptions::default()
                .smoothed(spring)
                .class(AnimationClass::ThreeD),
        );
        let rotate_x = pointer.map_y(rotate_x);
        let rotate_y = pointer.map_x(rotate_y);

        let scale = Arc::new(Mutex::new(AnimatedValue::new(
            ctx.scheduler().clone(),
            1.0,
            spring,
        )));

        let frame = match options.hover_scale {
            Some(hover_scale) => {
                let controller = ctx.controller().clone();
                let hovered = pointer.hover_flag();
                let frame_scale = Arc::clone(&scale);
                ctx.scheduler().register(move |_| {
                    let mut scale = lock(&frame_scale);
                    if controller.should_animate(Some(AnimationClass::ThreeD)) {
                        let target = if hovered.load(Ordering::Acquire) {
                            hover_scale
                        } else {
                            1.0
                        };
                        if scale.target() != target {
                            scale.set_target(target);
                            controller.mark_dirty();
                        }
                    } else if scale.get() != 1.0 || scale.target() != 1.0 {
                        scale.set_immediate(1.0);
                        controller.mark_dirty();
                    }
                    FrameControl::Continue
                })
            }
            None => None,
        };

        Ok(Self {
            options,
            rotate_x,
            rotate_y,
            scale,
            pointer,
            _frame: frame,
        })
    }

    pub fn rotate_x(&self) -> f32 {
        self.rotate_x.get()
    }

    pub fn rotate_y(&self) -> f32 {
        self.rotate_y.get()
    }

    pub fn scale(&self) -> f32 {
        lock(&self.scale).get()
    }

    pub fn is_hovered(&self) -> bool {
        self.pointer.is_hovered()
    }

    pub fn perspective(&self) -> f32 {
        self.options.perspective
    }

    pub fn transform(&self) -> TransformSet {
        TransformSet {
            rotate_x: self.rotate_x(),
            rotate_y: self.rotate_y(),
            scale: self.scale(),
            ..TransformSet::IDENTITY
        }
    }
}

// ============================================================================
// Cinematic zoom
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomOptions {
    pub start: f32,
    pub end: f32,
    /// One leg of the loop
    pub duration_ms: u32,
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self {
            start: 1.0,
            end: 1.05,
            duration_ms: 20_000,
        }
    }
}

struct ZoomState {
    animation: FloatAnimation,
    scale: f32,
}

/// Endless linear scale loop between `start` and `end`
pub struct CinematicZoom {
    options: ZoomOptions,
    state: Arc<Mutex<ZoomState>>,
    _frame: Option<FrameSubscription>,
}

impl CinematicZoom {
    pub fn new(ctx: &MotionContext, options: ZoomOptions) -> Self {
        let animation = FloatAnimation::new(options.duration_ms)
            .keyframe(0.0, options.start, Easing::Linear)
            .keyframe(1.0, options.end, Easing::Linear)
            .yoyo(true);
        let state = Arc::new(Mutex::new(ZoomState {
            animation,
            scale: options.start,
        }));

        let controller = ctx.controller().clone();
        let frame_state = Arc::clone(&state);
        let rest = options.start;
        let frame = ctx.scheduler().register(move |frame| {
            let mut state = lock(&frame_state);
            let previous = state.scale;
            if controller.should_animate(Some(AnimationClass::Parallax)) {
                if !state.animation.is_playing() {
                    state.animation.start();
                }
                state.animation.tick(frame.dt_ms());
                state.scale = state.animation.value().unwrap_or(rest);
            } else {
                state.animation.stop();
                state.scale = rest;
            }
            if state.scale != previous {
                controller.mark_dirty();
            }
            FrameControl::Continue
        });

        Self {
            options,
            state,
            _frame: frame,
        }
    }

    pub fn scale(&self) -> f32 {
        lock(&self.state).scale
    }

    pub fn options(&self) -> ZoomOptions {
        self.options
    }

    pub fn transform(&self) -> TransformSet {
        TransformSet {
            scale: self.scale(),
            ..TransformSet::IDENTITY
        }
    }
}

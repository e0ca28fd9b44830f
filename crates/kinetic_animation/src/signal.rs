//! Scroll and pointer signals
//!
//! A signal is a continuous numeric value derived from the host's scroll
//! offset or pointer position:
//!
//! - [`ScrollSignal`] - absolute scroll offset in pixels
//! - [`ScrollProgress`] - an element's progress through a scroll range, `[0, 1]`
//! - [`PointerSignal`] - pointer position relative to an element (or the
//!   viewport), each axis in `[-0.5, 0.5]`
//!
//! Host listeners only record the latest input. The raw value is committed,
//! optionally spring-smoothed and pushed through every subscribed
//! [`TransformMapper`] inside the signal's frame callback, so all mapped
//! outputs of one frame derive from the same committed host state.
//!
//! When the controller forbids the signal's animation class (reduced motion,
//! low tier, kill-switch), the signal holds its neutral value and every
//! mapping reports its rest output from the next frame on.
//!
//! ```
//! use kinetic_animation::{AnimationScheduler, MotionContext, ScrollSignal, SignalOptions, TransformMapper};
//! use kinetic_core::{AnimationController, MotionConfig};
//! use kinetic_platform::{EventHub, HostEvent};
//!
//! let scheduler = AnimationScheduler::new();
//! let hub = EventHub::new(1280.0, 800.0);
//! let ctx = MotionContext::new(AnimationController::default(), &scheduler, hub.clone(), MotionConfig::default());
//!
//! let scroll = ScrollSignal::new(&ctx, SignalOptions::default());
//! let offset = scroll.map(TransformMapper::linear([0.0, 500.0], [0.0, 150.0]).unwrap());
//!
//! hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 250.0 });
//! scheduler.advance(1.0 / 60.0);
//! assert_eq!(offset.get(), 75.0);
//! ```

use crate::context::MotionContext;
use crate::mapper::TransformMapper;
use crate::marker::{range_progress, Marker};
use crate::scheduler::{FrameControl, FrameSubscription};
use crate::spring::{Spring, SpringConfig};
use kinetic_core::{AnimationClass, Point, Rect};
use kinetic_platform::{ElementHandle, EventKind, HostEvent, ListenerGuard};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

new_key_type! {
    /// Handle to a mapping subscribed to a signal
    pub struct MappingId;
}

/// Construction options shared by every signal
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SignalOptions {
    /// Spring-smooth the raw value
    pub smoothing: Option<SpringConfig>,
    /// Animation class gating the signal
    pub class: Option<AnimationClass>,
    /// Value held while the class is not allowed
    pub neutral: f32,
}

impl SignalOptions {
    pub fn smoothed(mut self, config: SpringConfig) -> Self {
        self.smoothing = Some(config);
        self
    }

    pub fn class(mut self, class: AnimationClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn neutral(mut self, neutral: f32) -> Self {
        self.neutral = neutral;
        self
    }
}

struct Mapping {
    mapper: TransformMapper,
    output: f32,
}

/// One numeric channel: raw input, smoothed value and mapped outputs
struct Channel {
    pending: Option<f32>,
    raw: f32,
    current: f32,
    spring: Option<Spring>,
    neutral: f32,
    mappings: SlotMap<MappingId, Mapping>,
}

type SharedChannel = Arc<Mutex<Channel>>;

fn lock(channel: &Mutex<Channel>) -> MutexGuard<'_, Channel> {
    channel.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Channel {
    fn shared(initial: f32, options: &SignalOptions, allowed: bool) -> SharedChannel {
        let current = if allowed { initial } else { options.neutral };
        Arc::new(Mutex::new(Channel {
            pending: None,
            raw: initial,
            current,
            spring: options
                .smoothing
                .map(|config| Spring::normalized(config, current)),
            neutral: options.neutral,
            mappings: SlotMap::with_key(),
        }))
    }

    /// Commit input and recompute outputs; returns true if anything changed
    fn frame(&mut self, dt: f32, allowed: bool) -> bool {
        if let Some(pending) = self.pending.take() {
            self.raw = pending;
        }

        let previous = self.current;
        if allowed {
            match self.spring.as_mut() {
                Some(spring) => {
                    spring.set_target(self.raw);
                    spring.advance(dt);
                    self.current = spring.value();
                }
                None => self.current = self.raw,
            }
        } else {
            if let Some(spring) = self.spring.as_mut() {
                spring.snap_to(self.neutral);
            }
            self.current = self.neutral;
        }

        let mut changed = previous != self.current;
        let current = self.current;
        for (_, mapping) in self.mappings.iter_mut() {
            let output = mapping.mapper.map(current);
            if output != mapping.output {
                mapping.output = output;
                changed = true;
            }
        }
        changed
    }

    fn subscribe(channel: &SharedChannel, mapper: TransformMapper) -> MappedValue {
        let mut guard = lock(channel);
        let rest = mapper.rest_value(guard.neutral);
        let output = mapper.map(guard.current);
        let id = guard.mappings.insert(Mapping { mapper, output });
        MappedValue {
            channel: Arc::downgrade(channel),
            id,
            rest,
        }
    }
}

/// A live mapped output of a signal; dropping it unsubscribes
pub struct MappedValue {
    channel: Weak<Mutex<Channel>>,
    id: MappingId,
    rest: f32,
}

impl MappedValue {
    /// Output as of the last frame (the rest output once the signal is gone)
    pub fn get(&self) -> f32 {
        self.channel
            .upgrade()
            .and_then(|channel| lock(&channel).mappings.get(self.id).map(|m| m.output))
            .unwrap_or(self.rest)
    }

    /// Output of the mapping for the signal's neutral value
    pub fn rest_value(&self) -> f32 {
        self.rest
    }
}

impl Drop for MappedValue {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.upgrade() {
            lock(&channel).mappings.remove(self.id);
        }
    }
}

impl std::fmt::Debug for MappedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedValue")
            .field("output", &self.get())
            .finish()
    }
}

/// Scroll axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    #[default]
    Vertical,
}

/// Absolute document scroll offset in pixels
pub struct ScrollSignal {
    channel: SharedChannel,
    _listener: ListenerGuard,
    _frame: Option<FrameSubscription>,
}

impl ScrollSignal {
    /// Vertical scroll offset
    pub fn new(ctx: &MotionContext, options: SignalOptions) -> Self {
        Self::with_axis(ctx, Axis::Vertical, options)
    }

    pub fn with_axis(ctx: &MotionContext, axis: Axis, options: SignalOptions) -> Self {
        let scroll = ctx.hub().state().scroll;
        let pick = move |x: f32, y: f32| match axis {
            Axis::Horizontal => x,
            Axis::Vertical => y,
        };

        let channel = Channel::shared(
            pick(scroll.x, scroll.y),
            &options,
            ctx.should_animate(options.class),
        );

        let input = Arc::clone(&channel);
        let listener = ctx.hub().listen(EventKind::Scroll, move |event| {
            if let HostEvent::Scroll { x, y } = *event {
                lock(&input).pending = Some(pick(x, y));
            }
        });

        let controller = ctx.controller().clone();
        let frame_channel = Arc::clone(&channel);
        let class = options.class;
        let frame = ctx.scheduler().register(move |frame| {
            let allowed = controller.should_animate(class);
            if lock(&frame_channel).frame(frame.dt, allowed) {
                controller.mark_dirty();
            }
            FrameControl::Continue
        });

        Self {
            channel,
            _listener: listener,
            _frame: frame,
        }
    }

    /// Current (smoothed, gated) value
    pub fn value(&self) -> f32 {
        lock(&self.channel).current
    }

    /// Last committed raw scroll offset
    pub fn raw(&self) -> f32 {
        lock(&self.channel).raw
    }

    pub fn map(&self, mapper: TransformMapper) -> MappedValue {
        Channel::subscribe(&self.channel, mapper)
    }

    pub fn mapping_count(&self) -> usize {
        lock(&self.channel).mappings.len()
    }
}

/// An element's progress through a scroll range, in `[0, 1]`
///
/// The default range runs from `"top bottom"` (the element starts entering)
/// to `"bottom top"` (the element has left through the top).
pub struct ScrollProgress {
    channel: SharedChannel,
    _listeners: SmallVec<[ListenerGuard; 3]>,
    _frame: Option<FrameSubscription>,
}

impl ScrollProgress {
    pub fn new(ctx: &MotionContext, element: ElementHandle, options: SignalOptions) -> Self {
        Self::with_range(ctx, element, Marker::enter(), Marker::exit(), options)
    }

    pub fn with_range(
        ctx: &MotionContext,
        element: ElementHandle,
        start: Marker,
        end: Marker,
        options: SignalOptions,
    ) -> Self {
        let viewport = ctx.hub().state().viewport;
        let initial = element
            .client_rect()
            .map(|rect| range_progress(&rect, viewport.height, &start, &end))
            .unwrap_or(options.neutral);
        let channel = Channel::shared(initial, &options, ctx.should_animate(options.class));

        // Scroll moves the element, resize and reflow move the range
        let stale = Arc::new(AtomicBool::new(true));
        let listeners: SmallVec<[ListenerGuard; 3]> =
            [EventKind::Scroll, EventKind::Resize, EventKind::Reflow]
            .into_iter()
            .map(|kind| {
                let stale = Arc::clone(&stale);
                ctx.hub()
                    .listen(kind, move |_| stale.store(true, Ordering::Release))
            })
            .collect();

        let controller = ctx.controller().clone();
        let hub = ctx.hub().downgrade();
        let frame_channel = Arc::clone(&channel);
        let class = options.class;
        let frame = ctx.scheduler().register(move |frame| {
            if stale.swap(false, Ordering::AcqRel) {
                let viewport_height = hub.state().map(|state| state.viewport.height);
                match (element.client_rect(), viewport_height) {
                    (Some(rect), Some(height)) if height > 0.0 => {
                        lock(&frame_channel).pending =
                            Some(range_progress(&rect, height, &start, &end));
                    }
                    _ => tracing::trace!("scroll progress element unmeasurable, holding value"),
                }
            }

            let allowed = controller.should_animate(class);
            if lock(&frame_channel).frame(frame.dt, allowed) {
                controller.mark_dirty();
            }
            FrameControl::Continue
        });

        Self {
            channel,
            _listeners: listeners,
            _frame: frame,
        }
    }

    pub fn value(&self) -> f32 {
        lock(&self.channel).current
    }

    pub fn map(&self, mapper: TransformMapper) -> MappedValue {
        Channel::subscribe(&self.channel, mapper)
    }
}

/// Latest pointer input recorded by the host listeners
#[derive(Default)]
struct PointerInput {
    position: Option<Point>,
}

/// Normalize a pointer position against a box, each axis in `[-0.5, 0.5]`
///
/// Returns `None` when the box has no area or the pointer is outside it.
pub fn normalize_pointer(pointer: Point, rect: &Rect) -> Option<Point> {
    if rect.size.is_degenerate() || !rect.contains(pointer) {
        return None;
    }
    Some(Point::new(
        ((pointer.x - rect.left()) / rect.width() - 0.5).clamp(-0.5, 0.5),
        ((pointer.y - rect.top()) / rect.height() - 0.5).clamp(-0.5, 0.5),
    ))
}

/// Pointer position relative to an element or the viewport
///
/// Top-left maps to `(-0.5, -0.5)`, bottom-right to `(0.5, 0.5)`. While the
/// pointer is outside the box, has left the window, or the box cannot be
/// measured, both axes target 0.
pub struct PointerSignal {
    x: SharedChannel,
    y: SharedChannel,
    hovered: Arc<AtomicBool>,
    _listeners: SmallVec<[ListenerGuard; 2]>,
    _frame: Option<FrameSubscription>,
}

impl PointerSignal {
    /// Pointer relative to `element`, or to the whole viewport when `None`
    pub fn new(ctx: &MotionContext, element: Option<ElementHandle>, options: SignalOptions) -> Self {
        let allowed = ctx.should_animate(options.class);
        let x = Channel::shared(0.0, &options, allowed);
        let y = Channel::shared(0.0, &options, allowed);
        let hovered = Arc::new(AtomicBool::new(false));

        let input = Arc::new(Mutex::new(PointerInput {
            position: ctx.hub().state().pointer,
        }));
        let move_input = Arc::clone(&input);
        let leave_input = Arc::clone(&input);
        let listeners: SmallVec<[ListenerGuard; 2]> = SmallVec::from_buf([
            ctx.hub().listen(EventKind::PointerMove, move |event| {
                if let HostEvent::PointerMove { x, y } = *event {
                    move_input
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .position = Some(Point::new(x, y));
                }
            }),
            ctx.hub().listen(EventKind::PointerLeave, move |_| {
                leave_input
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .position = None;
            }),
        ]);

        let controller = ctx.controller().clone();
        let hub = ctx.hub().downgrade();
        let (frame_x, frame_y) = (Arc::clone(&x), Arc::clone(&y));
        let frame_hovered = Arc::clone(&hovered);
        let class = options.class;
        let frame = ctx.scheduler().register(move |frame| {
            let position = input
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .position;
            let bounds = match &element {
                Some(element) => element.client_rect(),
                None => hub.state().map(|state| state.viewport.to_rect()),
            };

            let normalized = position
                .zip(bounds)
                .and_then(|(pointer, rect)| normalize_pointer(pointer, &rect));
            frame_hovered.store(normalized.is_some(), Ordering::Release);
            let target = normalized.unwrap_or(Point::ZERO);

            let allowed = controller.should_animate(class);
            let mut changed = false;
            for (channel, raw) in [(&frame_x, target.x), (&frame_y, target.y)] {
                let mut channel = lock(channel);
                channel.pending = Some(raw);
                changed |= channel.frame(frame.dt, allowed);
            }
            if changed {
                controller.mark_dirty();
            }
            FrameControl::Continue
        });

        Self {
            x,
            y,
            hovered,
            _listeners: listeners,
            _frame: frame,
        }
    }

    /// Current normalized position
    pub fn value(&self) -> Point {
        Point::new(lock(&self.x).current, lock(&self.y).current)
    }

    /// Whether the pointer was over the box on the last frame
    pub fn is_hovered(&self) -> bool {
        self.hovered.load(Ordering::Acquire)
    }

    /// Shared hover flag, updated once per frame
    pub(crate) fn hover_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.hovered)
    }

    pub fn map_x(&self, mapper: TransformMapper) -> MappedValue {
        Channel::subscribe(&self.x, mapper)
    }

    pub fn map_y(&self, mapper: TransformMapper) -> MappedValue {
        Channel::subscribe(&self.y, mapper)
    }
}

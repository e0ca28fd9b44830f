//! Viewport-triggered reveals
//!
//! A [`Reveal`] moves an element between the hidden and visible keyframes of
//! a [`Preset`] whenever its viewport membership changes. Reveal progress is
//! a single number in `[0, 1]`; the rendered style is the preset's keyframe
//! pair sampled at that progress, so an interrupted transition continues
//! from wherever it stopped.
//!
//! ```ignore
//! let reveal = Reveal::new(&ctx, element, RevealOptions::preset(Preset::FadeUp, &ctx.config().reveal)?);
//! // every frame
//! let style = reveal.style();
//! ```

use crate::context::MotionContext;
use crate::easing::Easing;
use crate::preset::{Keyframe, KeyframePair, Preset, Transition};
use crate::scheduler::{FrameControl, FrameSubscription, SchedulerHandle};
use crate::viewport::{InView, MarginValue, RootMargin, ViewportObserver, ViewportOptions};
use kinetic_core::{AnimationClass, AnimationController, RevealConfig, Result};
use kinetic_platform::ElementHandle;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealPhase {
    #[default]
    Hidden,
    Visible,
}

/// Phase state machine of one revealed element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealState {
    pub phase: RevealPhase,
    pub triggered_once: bool,
    once: bool,
}

impl RevealState {
    pub fn new(once: bool) -> Self {
        Self {
            phase: RevealPhase::Hidden,
            triggered_once: false,
            once,
        }
    }

    /// Apply a membership change, returning the new phase if it changed
    ///
    /// A once-only state goes Hidden → Visible a single time and then
    /// ignores every further change.
    pub fn apply(&mut self, in_view: bool) -> Option<RevealPhase> {
        if self.once && self.triggered_once {
            return None;
        }

        let next = if in_view {
            RevealPhase::Visible
        } else {
            RevealPhase::Hidden
        };
        if next == self.phase {
            return None;
        }

        self.phase = next;
        if next == RevealPhase::Visible {
            self.triggered_once = true;
        }
        Some(next)
    }

    pub fn is_once(&self) -> bool {
        self.once
    }
}

/// Timed ramp of reveal progress from one value to another
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealTrack {
    from: f32,
    to: f32,
    transition: Transition,
    elapsed_ms: f32,
}

impl RevealTrack {
    pub fn new(from: f32, to: f32, transition: Transition) -> Self {
        Self {
            from,
            to,
            transition,
            elapsed_ms: 0.0,
        }
    }

    /// Progress value at the current time
    pub fn value(&self) -> f32 {
        let active = self.elapsed_ms - self.transition.delay_ms as f32;
        if active <= 0.0 {
            return self.from;
        }
        if self.transition.duration_ms == 0 || active >= self.transition.duration_ms as f32 {
            return self.to;
        }

        let t = active / self.transition.duration_ms as f32;
        self.from + (self.to - self.from) * self.transition.easing.apply(t)
    }

    pub fn advance(&mut self, dt_ms: f32) -> f32 {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.elapsed_ms += dt_ms;
        }
        self.value()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= (self.transition.delay_ms + self.transition.duration_ms) as f32
    }

    pub fn target(&self) -> f32 {
        self.to
    }
}

/// How a reveal looks, moves and triggers
#[derive(Clone, Debug, PartialEq)]
pub struct RevealOptions {
    pub keyframes: KeyframePair,
    pub transition: Transition,
    pub viewport: ViewportOptions,
}

impl RevealOptions {
    /// Options for a preset with the configured defaults
    pub fn preset(preset: Preset, config: &RevealConfig) -> Result<Self> {
        let root_margin = RootMargin::parse(preset.root_margin(config))?;
        let once = config.once || preset.forces_once();
        Ok(Self {
            keyframes: preset.keyframes(),
            transition: preset.transition(config),
            viewport: ViewportOptions {
                threshold: config.threshold,
                root_margin,
                once,
            },
        })
    }

    pub fn custom(keyframes: KeyframePair, transition: Transition, viewport: ViewportOptions) -> Self {
        Self {
            keyframes,
            transition,
            viewport,
        }
    }

    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.transition.delay_ms = delay_ms;
        self
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.transition.duration_ms = duration_ms;
        self
    }

    pub fn once(mut self, once: bool) -> Self {
        self.viewport.once = once;
        self
    }
}

struct RevealInner {
    state: RevealState,
    keyframes: KeyframePair,
    transition: Transition,
    progress: f32,
    track: Option<RevealTrack>,
    animation: Option<FrameSubscription>,
}

fn lock(inner: &Mutex<RevealInner>) -> MutexGuard<'_, RevealInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RevealInner {
    fn new(keyframes: KeyframePair, transition: Transition, once: bool) -> Self {
        Self {
            state: RevealState::new(once),
            keyframes,
            transition,
            progress: 0.0,
            track: None,
            animation: None,
        }
    }
}

/// Apply a membership change to one reveal and start its transition
fn drive(
    inner: &Weak<Mutex<RevealInner>>,
    in_view: bool,
    scheduler: &SchedulerHandle,
    controller: &AnimationController,
) {
    let Some(shared) = inner.upgrade() else {
        return;
    };

    let previous = {
        let mut guard = lock(&shared);
        let Some(phase) = guard.state.apply(in_view) else {
            return;
        };
        let target = match phase {
            RevealPhase::Visible => 1.0,
            RevealPhase::Hidden => 0.0,
        };

        if !controller.should_animate(Some(AnimationClass::Scroll)) {
            guard.progress = target;
            guard.track = None;
            controller.mark_dirty();
            guard.animation.take()
        } else {
            guard.track = Some(RevealTrack::new(guard.progress, target, guard.transition));
            let weak = Weak::clone(inner);
            let frame_controller = controller.clone();
            let animation = scheduler.register(move |frame| {
                let Some(shared) = weak.upgrade() else {
                    return FrameControl::Done;
                };
                let mut guard = lock(&shared);
                let inner = &mut *guard;
                let Some(track) = inner.track.as_mut() else {
                    return FrameControl::Done;
                };

                inner.progress = track.advance(frame.dt_ms());
                frame_controller.mark_dirty();
                if track.is_finished() {
                    inner.track = None;
                    FrameControl::Done
                } else {
                    FrameControl::Continue
                }
            });

            if animation.is_none() {
                guard.progress = target;
                guard.track = None;
            }
            std::mem::replace(&mut guard.animation, animation)
        }
    };

    drop(previous);
}

/// Read-only view of one reveal's state
#[derive(Clone)]
pub struct RevealView {
    inner: Arc<Mutex<RevealInner>>,
}

impl RevealView {
    pub fn state(&self) -> RevealState {
        lock(&self.inner).state
    }

    pub fn phase(&self) -> RevealPhase {
        self.state().phase
    }

    /// Reveal progress (0 hidden, 1 visible)
    pub fn progress(&self) -> f32 {
        lock(&self.inner).progress
    }

    /// Current style
    pub fn style(&self) -> Keyframe {
        let inner = lock(&self.inner);
        inner.keyframes.sample(inner.progress)
    }

    pub fn is_animating(&self) -> bool {
        lock(&self.inner).track.is_some()
    }

    pub fn transition(&self) -> Transition {
        lock(&self.inner).transition
    }
}

impl fmt::Debug for RevealView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("RevealView")
            .field("phase", &inner.state.phase)
            .field("progress", &inner.progress)
            .finish()
    }
}

/// An element revealed when it enters the viewport
pub struct Reveal {
    view: RevealView,
    in_view: InView,
}

impl Reveal {
    pub fn new(ctx: &MotionContext, element: ElementHandle, options: RevealOptions) -> Self {
        let inner = Arc::new(Mutex::new(RevealInner::new(
            options.keyframes,
            options.transition,
            options.viewport.once,
        )));

        let weak = Arc::downgrade(&inner);
        let scheduler = ctx.scheduler().clone();
        let controller = ctx.controller().clone();
        let in_view = ViewportObserver::new(ctx).observe_with(
            element,
            options.viewport,
            move |in_view, _frame| drive(&weak, in_view, &scheduler, &controller),
        );

        Self {
            view: RevealView { inner },
            in_view,
        }
    }

    /// Reveal with a preset and the context's configured defaults
    pub fn preset(ctx: &MotionContext, element: ElementHandle, preset: Preset) -> Result<Self> {
        let options = RevealOptions::preset(preset, &ctx.config().reveal)?;
        Ok(Self::new(ctx, element, options))
    }

    pub fn view(&self) -> RevealView {
        self.view.clone()
    }

    pub fn state(&self) -> RevealState {
        self.view.state()
    }

    pub fn phase(&self) -> RevealPhase {
        self.view.phase()
    }

    pub fn progress(&self) -> f32 {
        self.view.progress()
    }

    pub fn style(&self) -> Keyframe {
        self.view.style()
    }

    pub fn is_animating(&self) -> bool {
        self.view.is_animating()
    }

    /// Whether the element currently counts as in view
    pub fn in_view(&self) -> bool {
        self.in_view.get()
    }
}

impl fmt::Debug for Reveal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reveal")
            .field("view", &self.view)
            .field("in_view", &self.in_view)
            .finish()
    }
}

/// Start delay of the child at `index` in a stagger group
pub fn stagger_delay(index: usize, delay_ms: u32, stagger_ms: u32) -> u32 {
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    delay_ms.saturating_add(index.saturating_mul(stagger_ms))
}

/// Children revealed one after another when their container enters view
///
/// The container itself carries no visual change; its membership drives
/// every child. Child `i` starts `delay + i * stagger` after the trigger.
pub struct StaggerGroup {
    children: Vec<RevealView>,
    in_view: InView,
    stagger_ms: u32,
}

impl StaggerGroup {
    /// Stagger `count` children with the same preset
    pub fn new(
        ctx: &MotionContext,
        container: ElementHandle,
        preset: Preset,
        count: usize,
    ) -> Result<Self> {
        let config = &ctx.config().reveal;
        let options = RevealOptions::preset(preset, config)?;
        Ok(Self::with_options(ctx, container, options, count, config.stagger_ms))
    }

    pub fn with_options(
        ctx: &MotionContext,
        container: ElementHandle,
        options: RevealOptions,
        count: usize,
        stagger_ms: u32,
    ) -> Self {
        let base_delay = options.transition.delay_ms;
        let children: Vec<RevealView> = (0..count)
            .map(|index| {
                let transition = options
                    .transition
                    .with_delay(stagger_delay(index, base_delay, stagger_ms));
                RevealView {
                    inner: Arc::new(Mutex::new(RevealInner::new(
                        options.keyframes,
                        transition,
                        options.viewport.once,
                    ))),
                }
            })
            .collect();

        let weak: Vec<Weak<Mutex<RevealInner>>> = children
            .iter()
            .map(|child| Arc::downgrade(&child.inner))
            .collect();
        let scheduler = ctx.scheduler().clone();
        let controller = ctx.controller().clone();
        let in_view = ViewportObserver::new(ctx).observe_with(
            container,
            options.viewport,
            move |in_view, _frame| {
                for child in &weak {
                    drive(child, in_view, &scheduler, &controller);
                }
            },
        );

        tracing::debug!("stagger group with {} children, {}ms apart", count, stagger_ms);
        Self {
            children,
            in_view,
            stagger_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, index: usize) -> Option<&RevealView> {
        self.children.get(index)
    }

    pub fn children(&self) -> &[RevealView] {
        &self.children
    }

    /// The container never animates
    pub fn container_style(&self) -> Keyframe {
        Keyframe::EMPTY
    }

    pub fn stagger_ms(&self) -> u32 {
        self.stagger_ms
    }

    pub fn in_view(&self) -> bool {
        self.in_view.get()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DividerOrientation {
    #[default]
    Horizontal,
    Vertical,
}

/// A rule line that draws itself in from its start edge
pub struct ArchitecturalDivider {
    reveal: Reveal,
    orientation: DividerOrientation,
}

impl ArchitecturalDivider {
    pub const DURATION_MS: u32 = 1200;
    pub const ROOT_MARGIN: RootMargin = RootMargin::uniform(MarginValue::Px(-30.0));

    pub fn keyframes(orientation: DividerOrientation) -> KeyframePair {
        match orientation {
            DividerOrientation::Horizontal => {
                KeyframePair::new(Keyframe::EMPTY.scale_x(0.0), Keyframe::EMPTY.scale_x(1.0))
            }
            DividerOrientation::Vertical => {
                KeyframePair::new(Keyframe::EMPTY.scale_y(0.0), Keyframe::EMPTY.scale_y(1.0))
            }
        }
    }

    pub fn new(ctx: &MotionContext, element: ElementHandle, orientation: DividerOrientation) -> Self {
        let options = RevealOptions::custom(
            Self::keyframes(orientation),
            Transition::new(Self::DURATION_MS, Easing::REVEAL),
            ViewportOptions::once(Self::ROOT_MARGIN),
        );
        Self {
            reveal: Reveal::new(ctx, element, options),
            orientation,
        }
    }

    /// Edge the line grows from
    pub fn transform_origin(&self) -> &'static str {
        match self.orientation {
            DividerOrientation::Horizontal => "left",
            DividerOrientation::Vertical => "top",
        }
    }

    pub fn orientation(&self) -> DividerOrientation {
        self.orientation
    }

    pub fn style(&self) -> Keyframe {
        self.reveal.style()
    }

    pub fn progress(&self) -> f32 {
        self.reveal.progress()
    }
}

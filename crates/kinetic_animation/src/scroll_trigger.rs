//! Scroll-linked timelines
//!
//! A [`ScrollTrigger`] binds a [`Timeline`] to the scroll position of a
//! trigger element between a start and an end [`Marker`]:
//!
//! - `Scrub::On` positions the timeline at `progress × duration` every frame
//! - `Scrub::Smooth(s)` lets the position catch up over roughly `s` seconds
//! - `Scrub::Off` plays the timeline on its own clock and applies
//!   [`ToggleActions`] when the scroll position crosses the markers
//!
//! Marker pixel positions are cached and recomputed after a resize or
//! reflow, or when the element's measured size changes. Dropping the
//! trigger (or calling [`ScrollTrigger::kill`]) removes its listeners, its
//! frame callback and its timeline in one step.

use crate::context::MotionContext;
use crate::easing::Easing;
use crate::marker::Marker;
use crate::preset::Keyframe;
use crate::scheduler::{FrameControl, FrameSubscription};
use crate::timeline::{Timeline, TimelineEntryId};
use kinetic_core::{AnimationClass, MotionError, Result, Size};
use kinetic_platform::{ElementHandle, EventKind, ListenerGuard};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// How scroll position drives the timeline
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Scrub {
    /// Toggle actions on marker crossings
    #[default]
    Off,
    /// Timeline position follows scroll progress exactly
    On,
    /// Timeline position eases toward scroll progress over about this many seconds
    Smooth(f32),
}

/// Timeline command fired by a marker crossing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToggleAction {
    Play,
    Pause,
    Resume,
    Reverse,
    Restart,
    Reset,
    Complete,
    #[default]
    None,
}

impl ToggleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleAction::Play => "play",
            ToggleAction::Pause => "pause",
            ToggleAction::Resume => "resume",
            ToggleAction::Reverse => "reverse",
            ToggleAction::Restart => "restart",
            ToggleAction::Reset => "reset",
            ToggleAction::Complete => "complete",
            ToggleAction::None => "none",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "play" => ToggleAction::Play,
            "pause" => ToggleAction::Pause,
            "resume" => ToggleAction::Resume,
            "reverse" => ToggleAction::Reverse,
            "restart" => ToggleAction::Restart,
            "reset" => ToggleAction::Reset,
            "complete" => ToggleAction::Complete,
            "none" => ToggleAction::None,
            _ => return None,
        })
    }

    /// Apply the command to a timeline
    pub fn apply(&self, timeline: &mut Timeline) {
        match self {
            ToggleAction::Play => timeline.play(),
            ToggleAction::Pause => timeline.pause(),
            ToggleAction::Resume => timeline.resume(),
            ToggleAction::Reverse => timeline.reverse(),
            ToggleAction::Restart => timeline.restart(),
            ToggleAction::Reset => timeline.reset(),
            ToggleAction::Complete => timeline.complete(),
            ToggleAction::None => {}
        }
    }
}

/// Marker crossing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToggleEvent {
    /// Forward past the start marker
    Enter,
    /// Forward past the end marker
    Leave,
    /// Backward past the end marker
    EnterBack,
    /// Backward past the start marker
    LeaveBack,
}

/// Actions for enter, leave, enter-back and leave-back, in that order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleActions {
    pub on_enter: ToggleAction,
    pub on_leave: ToggleAction,
    pub on_enter_back: ToggleAction,
    pub on_leave_back: ToggleAction,
}

impl ToggleActions {
    pub fn action(&self, event: ToggleEvent) -> ToggleAction {
        match event {
            ToggleEvent::Enter => self.on_enter,
            ToggleEvent::Leave => self.on_leave,
            ToggleEvent::EnterBack => self.on_enter_back,
            ToggleEvent::LeaveBack => self.on_leave_back,
        }
    }
}

impl Default for ToggleActions {
    /// `"play none none reverse"`
    fn default() -> Self {
        Self {
            on_enter: ToggleAction::Play,
            on_leave: ToggleAction::None,
            on_enter_back: ToggleAction::None,
            on_leave_back: ToggleAction::Reverse,
        }
    }
}

impl FromStr for ToggleActions {
    type Err = MotionError;

    fn from_str(source: &str) -> Result<Self> {
        let actions = source
            .split_whitespace()
            .map(ToggleAction::parse)
            .collect::<Option<SmallVec<[ToggleAction; 4]>>>();

        match actions.as_deref() {
            Some(&[on_enter, on_leave, on_enter_back, on_leave_back]) => Ok(Self {
                on_enter,
                on_leave,
                on_enter_back,
                on_leave_back,
            }),
            _ => Err(MotionError::InvalidToggleActions(source.to_string())),
        }
    }
}

impl fmt::Display for ToggleActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.on_enter.as_str(),
            self.on_leave.as_str(),
            self.on_enter_back.as_str(),
            self.on_leave_back.as_str()
        )
    }
}

/// Trigger placement and behavior
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerConfig {
    pub start: Marker,
    pub end: Marker,
    pub scrub: Scrub,
    pub toggle_actions: ToggleActions,
}

impl TriggerConfig {
    /// Parse marker strings such as `"top 80%"` and `"bottom 20%"`
    pub fn new(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
            ..Self::default()
        })
    }

    pub fn scrub(mut self, scrub: Scrub) -> Self {
        self.scrub = scrub;
        self
    }

    pub fn toggle_actions(mut self, actions: ToggleActions) -> Self {
        self.toggle_actions = actions;
        self
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            start: Marker::default_start(),
            end: Marker::default_end(),
            scrub: Scrub::Off,
            toggle_actions: ToggleActions::default(),
        }
    }
}

/// Where the scroll position sits relative to the markers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Zone {
    Before,
    Active,
    After,
}

/// Events fired moving from one zone to another
fn crossings(from: Option<Zone>, to: Zone) -> SmallVec<[ToggleEvent; 2]> {
    use ToggleEvent::*;
    let events: &[ToggleEvent] = match (from, to) {
        (None, Zone::Before) => &[],
        (None, Zone::Active) => &[Enter],
        (None, Zone::After) => &[Enter, Leave],
        (Some(Zone::Before), Zone::Active) => &[Enter],
        (Some(Zone::Before), Zone::After) => &[Enter, Leave],
        (Some(Zone::Active), Zone::After) => &[Leave],
        (Some(Zone::After), Zone::Active) => &[EnterBack],
        (Some(Zone::After), Zone::Before) => &[EnterBack, LeaveBack],
        (Some(Zone::Active), Zone::Before) => &[LeaveBack],
        _ => &[],
    };
    events.iter().copied().collect()
}

/// Scroll offsets (px) at which the markers are reached
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerPositions {
    pub start_px: f32,
    pub end_px: f32,
}

impl MarkerPositions {
    /// Progress of `scroll` through the range, in `[0, 1]`
    pub fn progress(&self, scroll: f32) -> f32 {
        let span = self.end_px - self.start_px;
        if span.abs() < f32::EPSILON {
            return if scroll >= self.start_px { 1.0 } else { 0.0 };
        }
        ((scroll - self.start_px) / span).clamp(0.0, 1.0)
    }

    fn zone(&self, scroll: f32) -> Zone {
        if scroll < self.start_px {
            Zone::Before
        } else if scroll > self.end_px {
            Zone::After
        } else {
            Zone::Active
        }
    }
}

type ToggleCallback = Box<dyn FnMut(ToggleEvent) + Send>;

struct TriggerInner {
    timeline: Option<Timeline>,
    config: TriggerConfig,
    positions: Option<MarkerPositions>,
    measured_size: Option<Size>,
    zone: Option<Zone>,
    progress: f32,
    killed: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TriggerInner {
    /// One frame; returns the crossings that fired
    ///
    /// When scroll animation is not allowed the timeline lands on whatever
    /// the scrub or toggle action would reach, without tweening.
    fn frame(&mut self, scroll: f32, dt: f32, allowed: bool) -> SmallVec<[ToggleEvent; 2]> {
        let mut fired = SmallVec::new();
        let Some(positions) = self.positions else {
            return fired;
        };
        let Some(timeline) = self.timeline.as_mut() else {
            return fired;
        };

        let target = positions.progress(scroll);
        match self.config.scrub {
            Scrub::On => {
                self.progress = target;
                timeline.set_progress(target);
            }
            Scrub::Smooth(seconds) => {
                if !allowed || seconds <= 0.0 || !seconds.is_finite() {
                    self.progress = target;
                } else {
                    let catch_up = 1.0 - (-3.0 * dt / seconds).exp();
                    self.progress += (target - self.progress) * catch_up;
                    if (target - self.progress).abs() < 1e-4 {
                        self.progress = target;
                    }
                }
                timeline.set_progress(self.progress);
            }
            Scrub::Off => {
                self.progress = target;
                let zone = positions.zone(scroll);
                if self.zone != Some(zone) {
                    fired = crossings(self.zone, zone);
                    self.zone = Some(zone);
                    for event in &fired {
                        self.config.toggle_actions.action(*event).apply(timeline);
                    }
                }
                if allowed {
                    timeline.tick(dt * 1000.0);
                } else if timeline.is_playing() {
                    timeline.finish();
                }
            }
        }
        fired
    }
}

/// A timeline bound to an element's scroll position
pub struct ScrollTrigger {
    inner: Arc<Mutex<TriggerInner>>,
    callbacks: Arc<Mutex<Vec<ToggleCallback>>>,
    listeners: SmallVec<[ListenerGuard; 2]>,
    frame: Option<FrameSubscription>,
}

impl ScrollTrigger {
    pub fn new(
        ctx: &MotionContext,
        element: ElementHandle,
        timeline: Timeline,
        config: TriggerConfig,
    ) -> Self {
        let inner = Arc::new(Mutex::new(TriggerInner {
            timeline: Some(timeline),
            config,
            positions: None,
            measured_size: None,
            zone: None,
            progress: 0.0,
            killed: false,
        }));
        let callbacks: Arc<Mutex<Vec<ToggleCallback>>> = Arc::new(Mutex::new(Vec::new()));

        let stale = Arc::new(AtomicBool::new(true));
        let listeners: SmallVec<[ListenerGuard; 2]> = [EventKind::Resize, EventKind::Reflow]
            .into_iter()
            .map(|kind| {
                let stale = Arc::clone(&stale);
                ctx.hub().listen(kind, move |_| stale.store(true, Ordering::Release))
            })
            .collect();

        let hub = ctx.hub().downgrade();
        let controller = ctx.controller().clone();
        let frame_inner = Arc::clone(&inner);
        let frame_callbacks = Arc::clone(&callbacks);
        let frame = ctx.scheduler().register(move |frame| {
            let Some(state) = hub.state() else {
                return FrameControl::Done;
            };
            let rect = element.client_rect();

            let fired = {
                let mut inner = lock(&frame_inner);
                if inner.killed {
                    return FrameControl::Done;
                }

                let resized = match (rect, inner.measured_size) {
                    (Some(rect), Some(size)) => rect.size != size,
                    (Some(_), None) => true,
                    (None, _) => false,
                };
                if let Some(rect) = rect {
                    if stale.swap(false, Ordering::AcqRel) || resized {
                        let vh = state.viewport.height;
                        let scroll = state.scroll.y;
                        let positions = MarkerPositions {
                            start_px: scroll + inner.config.start.distance(&rect, vh),
                            end_px: scroll + inner.config.end.distance(&rect, vh),
                        };
                        tracing::debug!(
                            "scroll trigger markers at {}px..{}px",
                            positions.start_px,
                            positions.end_px
                        );
                        inner.positions = Some(positions);
                        inner.measured_size = Some(rect.size);
                    }
                } else {
                    tracing::trace!("trigger element has no layout, keeping markers");
                }

                let before = inner.progress;
                let allowed = controller.should_animate(Some(AnimationClass::Scroll));
                let fired = inner.frame(state.scroll.y, frame.dt, allowed);
                if inner.progress != before || !fired.is_empty() {
                    controller.mark_dirty();
                }
                if inner.timeline.as_ref().is_some_and(Timeline::is_playing) {
                    controller.mark_dirty();
                }
                fired
            };

            if !fired.is_empty() {
                tracing::debug!("scroll trigger toggled: {:?}", fired);
                let mut running = std::mem::take(&mut *lock(&frame_callbacks));
                for event in &fired {
                    for callback in running.iter_mut() {
                        callback(*event);
                    }
                }
                let mut slot = lock(&frame_callbacks);
                running.append(&mut slot);
                *slot = running;
            }

            FrameControl::Continue
        });

        Self {
            inner,
            callbacks,
            listeners,
            frame,
        }
    }

    /// Call `callback` on every marker crossing (toggle mode only)
    pub fn on_toggle<F>(&self, callback: F)
    where
        F: FnMut(ToggleEvent) + Send + 'static,
    {
        lock(&self.callbacks).push(Box::new(callback));
    }

    /// Scroll progress between the markers (smoothed under `Scrub::Smooth`)
    pub fn progress(&self) -> f32 {
        lock(&self.inner).progress
    }

    /// Whether the scroll position is between the markers
    pub fn is_active(&self) -> bool {
        lock(&self.inner).zone == Some(Zone::Active)
    }

    /// Cached marker positions, once measured
    pub fn positions(&self) -> Option<MarkerPositions> {
        lock(&self.inner).positions
    }

    /// Current value of a timeline entry; `None` once killed
    pub fn value(&self, id: TimelineEntryId) -> Option<f32> {
        lock(&self.inner)
            .timeline
            .as_ref()
            .and_then(|timeline| timeline.value(id))
    }

    /// Run `f` against the timeline; `None` once killed
    pub fn with_timeline<R>(&self, f: impl FnOnce(&mut Timeline) -> R) -> Option<R> {
        lock(&self.inner).timeline.as_mut().map(f)
    }

    pub fn config(&self) -> TriggerConfig {
        lock(&self.inner).config
    }

    pub fn is_killed(&self) -> bool {
        lock(&self.inner).killed
    }

    /// Tear down the timeline, listeners and frame callback
    pub fn kill(&mut self) {
        let timeline = {
            let mut inner = lock(&self.inner);
            if inner.killed {
                return;
            }
            inner.killed = true;
            inner.positions = None;
            inner.timeline.take()
        };
        drop(timeline);

        self.listeners.clear();
        if let Some(mut frame) = self.frame.take() {
            frame.cancel();
        }
        let callbacks = std::mem::take(&mut *lock(&self.callbacks));
        drop(callbacks);
        tracing::debug!("scroll trigger killed");
    }
}

impl Drop for ScrollTrigger {
    fn drop(&mut self) {
        self.kill();
    }
}

impl fmt::Debug for ScrollTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("ScrollTrigger")
            .field("progress", &inner.progress)
            .field("positions", &inner.positions)
            .field("killed", &inner.killed)
            .finish()
    }
}

/// Children fading up in sequence when a container scrolls into view
///
/// Each child rises 30px while fading in over 600ms with `power2.out`,
/// 100ms after the previous one, starting at `"top 85%"`. Scrolling back
/// above the start reverses the sequence.
pub struct StaggerReveal {
    trigger: ScrollTrigger,
    entries: Vec<(TimelineEntryId, TimelineEntryId)>,
}

impl StaggerReveal {
    pub const OFFSET_Y: f32 = 30.0;
    pub const STAGGER_MS: u32 = 100;
    pub const DURATION_MS: u32 = 600;

    pub fn new(ctx: &MotionContext, container: ElementHandle, count: usize) -> Result<Self> {
        let mut timeline = Timeline::new();
        let opacity = timeline.add_staggered(
            count,
            0,
            Self::STAGGER_MS,
            Self::DURATION_MS,
            0.0,
            1.0,
            Easing::Power2Out,
        );
        let lift = timeline.add_staggered(
            count,
            0,
            Self::STAGGER_MS,
            Self::DURATION_MS,
            Self::OFFSET_Y,
            0.0,
            Easing::Power2Out,
        );

        let config = TriggerConfig {
            start: "top 85%".parse()?,
            ..TriggerConfig::default()
        };
        Ok(Self {
            trigger: ScrollTrigger::new(ctx, container, timeline, config),
            entries: opacity.into_iter().zip(lift).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Style of child `index`; `None` out of range or once torn down
    pub fn child_style(&self, index: usize) -> Option<Keyframe> {
        let (opacity, lift) = *self.entries.get(index)?;
        Some(Keyframe {
            opacity: Some(self.trigger.value(opacity)?),
            translate_y: Some(self.trigger.value(lift)?),
            ..Keyframe::EMPTY
        })
    }

    pub fn trigger(&self) -> &ScrollTrigger {
        &self.trigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::AnimationScheduler;
    use kinetic_core::{AnimationController, MotionConfig, Rect};
    use kinetic_platform::{EventHub, HostEvent, LayoutBox};

    const FRAME: f32 = 1.0 / 60.0;

    fn setup() -> (AnimationScheduler, EventHub, MotionContext) {
        let scheduler = AnimationScheduler::new();
        let hub = EventHub::new(1000.0, 1000.0);
        let ctx = MotionContext::new(
            AnimationController::default(),
            &scheduler,
            hub.clone(),
            MotionConfig::default(),
        );
        (scheduler, hub, ctx)
    }

    fn scroll_to(hub: &EventHub, scheduler: &AnimationScheduler, y: f32) {
        hub.dispatch(&HostEvent::Scroll { x: 0.0, y });
        scheduler.advance(FRAME);
    }

    #[test]
    fn test_parse_toggle_actions() {
        let actions: ToggleActions = "play none none reverse".parse().unwrap();
        assert_eq!(actions, ToggleActions::default());
        assert_eq!(actions.to_string(), "play none none reverse");

        let actions: ToggleActions = "restart pause resume reset".parse().unwrap();
        assert_eq!(actions.on_enter_back, ToggleAction::Resume);

        for bad in ["play none none", "play none none reverse none", "jump none none none"] {
            assert!(bad.parse::<ToggleActions>().is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_crossings() {
        assert_eq!(crossings(None, Zone::Before).as_slice(), &[]);
        assert_eq!(
            crossings(Some(Zone::Before), Zone::After).as_slice(),
            &[ToggleEvent::Enter, ToggleEvent::Leave]
        );
        assert_eq!(
            crossings(Some(Zone::After), Zone::Active).as_slice(),
            &[ToggleEvent::EnterBack]
        );
        assert_eq!(
            crossings(Some(Zone::Active), Zone::Before).as_slice(),
            &[ToggleEvent::LeaveBack]
        );
    }

    #[test]
    fn test_marker_positions() {
        let positions = MarkerPositions {
            start_px: 1000.0,
            end_px: 2000.0,
        };
        assert_eq!(positions.progress(500.0), 0.0);
        assert_eq!(positions.progress(1500.0), 0.5);
        assert_eq!(positions.progress(2500.0), 1.0);
    }

    #[test]
    fn test_scrub_follows_scroll() {
        let (scheduler, hub, ctx) = setup();
        // Element top at 2000px, 400px tall, viewport 1000px
        let element = LayoutBox::new(&hub, Rect::new(0.0, 2000.0, 400.0, 400.0));
        let mut timeline = Timeline::new();
        let x = timeline.add(0, 1000, 0.0, 100.0);
        let trigger = ScrollTrigger::new(
            &ctx,
            element,
            timeline,
            TriggerConfig::default().scrub(Scrub::On),
        );

        scroll_to(&hub, &scheduler, 0.0);
        let positions = trigger.positions().unwrap();
        // "top 80%": 2000 - 800; "bottom 20%": 2400 - 200
        assert_eq!(positions.start_px, 1200.0);
        assert_eq!(positions.end_px, 2200.0);
        assert_eq!(trigger.value(x), Some(0.0));

        scroll_to(&hub, &scheduler, 1700.0);
        assert_eq!(trigger.value(x), Some(50.0));

        scroll_to(&hub, &scheduler, 1450.0);
        assert_eq!(trigger.value(x), Some(25.0));
    }

    #[test]
    fn test_smooth_scrub_catches_up() {
        let (scheduler, hub, ctx) = setup();
        let element = LayoutBox::new(&hub, Rect::new(0.0, 2000.0, 400.0, 400.0));
        let mut timeline = Timeline::new();
        let x = timeline.add(0, 1000, 0.0, 100.0);
        let trigger = ScrollTrigger::new(
            &ctx,
            element,
            timeline,
            TriggerConfig::default().scrub(Scrub::Smooth(0.5)),
        );

        scroll_to(&hub, &scheduler, 2200.0);
        let early = trigger.value(x).unwrap();
        assert!(early > 0.0 && early < 100.0);

        for _ in 0..120 {
            scheduler.advance(FRAME);
        }
        assert_eq!(trigger.value(x), Some(100.0));
    }

    #[test]
    fn test_toggle_actions_play_and_reverse() {
        let (scheduler, hub, ctx) = setup();
        let element = LayoutBox::new(&hub, Rect::new(0.0, 2000.0, 400.0, 400.0));
        let mut timeline = Timeline::new();
        let fade = timeline.add(0, 100, 0.0, 1.0);
        let trigger = ScrollTrigger::new(&ctx, element, timeline, TriggerConfig::default());

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        trigger.on_toggle(move |event| lock(&sink).push(event));

        scroll_to(&hub, &scheduler, 0.0);
        assert!(lock(&events).is_empty());

        scroll_to(&hub, &scheduler, 1500.0);
        assert!(trigger.is_active());
        for _ in 0..10 {
            scheduler.advance(FRAME);
        }
        assert_eq!(trigger.value(fade), Some(1.0));

        scroll_to(&hub, &scheduler, 3000.0);
        scroll_to(&hub, &scheduler, 1500.0);
        scroll_to(&hub, &scheduler, 0.0);
        for _ in 0..10 {
            scheduler.advance(FRAME);
        }
        assert_eq!(trigger.value(fade), Some(0.0));
        assert_eq!(
            *lock(&events),
            vec![
                ToggleEvent::Enter,
                ToggleEvent::Leave,
                ToggleEvent::EnterBack,
                ToggleEvent::LeaveBack
            ]
        );
    }

    #[test]
    fn test_markers_recomputed_on_resize() {
        let (scheduler, hub, ctx) = setup();
        let element = LayoutBox::new(&hub, Rect::new(0.0, 2000.0, 400.0, 400.0));
        let trigger = ScrollTrigger::new(
            &ctx,
            element.clone(),
            Timeline::new(),
            TriggerConfig::default().scrub(Scrub::On),
        );
        scroll_to(&hub, &scheduler, 0.0);
        assert_eq!(trigger.positions().unwrap().start_px, 1200.0);

        hub.dispatch(&HostEvent::Resize {
            width: 1000.0,
            height: 500.0,
        });
        scheduler.advance(FRAME);
        assert_eq!(trigger.positions().unwrap().start_px, 1600.0);

        element.set_document_rect(Rect::new(0.0, 2000.0, 400.0, 800.0));
        scheduler.advance(FRAME);
        assert_eq!(trigger.positions().unwrap().end_px, 2700.0);
    }

    #[test]
    fn test_kill_is_atomic() {
        let (scheduler, hub, ctx) = setup();
        let element = LayoutBox::new(&hub, Rect::new(0.0, 2000.0, 400.0, 400.0));
        let mut timeline = Timeline::new();
        let x = timeline.add(0, 1000, 0.0, 100.0);
        let mut trigger =
            ScrollTrigger::new(&ctx, element, timeline, TriggerConfig::default().scrub(Scrub::On));
        scroll_to(&hub, &scheduler, 1700.0);

        trigger.kill();
        assert!(trigger.is_killed());
        assert_eq!(trigger.value(x), None);
        assert_eq!(scheduler.callback_count(), 0);
        assert_eq!(hub.total_listeners(), 1);

        scroll_to(&hub, &scheduler, 2000.0);
        trigger.kill();
    }

    #[test]
    fn test_reduced_motion_snaps_toggle() {
        let (scheduler, hub, ctx) = setup();
        ctx.controller().set_reduced_motion(true);
        let element = LayoutBox::new(&hub, Rect::new(0.0, 2000.0, 400.0, 400.0));
        let mut timeline = Timeline::new();
        let fade = timeline.add(0, 1000, 0.0, 1.0);
        let trigger = ScrollTrigger::new(&ctx, element, timeline, TriggerConfig::default());

        scroll_to(&hub, &scheduler, 0.0);
        assert_eq!(trigger.value(fade), Some(0.0));

        scroll_to(&hub, &scheduler, 1500.0);
        assert_eq!(trigger.value(fade), Some(1.0));

        scroll_to(&hub, &scheduler, 0.0);
        assert_eq!(trigger.value(fade), Some(0.0));
    }

    #[test]
    fn test_disabled_controller_snaps_smooth_scrub() {
        let (scheduler, hub, ctx) = setup();
        ctx.controller().set_enabled(false);
        let element = LayoutBox::new(&hub, Rect::new(0.0, 2000.0, 400.0, 400.0));
        let mut timeline = Timeline::new();
        let x = timeline.add(0, 1000, 0.0, 100.0);
        let trigger = ScrollTrigger::new(
            &ctx,
            element,
            timeline,
            TriggerConfig::default().scrub(Scrub::Smooth(1.0)),
        );

        scroll_to(&hub, &scheduler, 1700.0);
        assert_eq!(trigger.progress(), 0.5);
        assert_eq!(trigger.value(x), Some(50.0));
    }

    #[test]
    fn test_stagger_reveal() {
        let (scheduler, hub, ctx) = setup();
        let container = LayoutBox::new(&hub, Rect::new(0.0, 2000.0, 400.0, 400.0));
        let stagger = StaggerReveal::new(&ctx, container, 3).unwrap();
        scroll_to(&hub, &scheduler, 0.0);
        assert_eq!(stagger.child_style(0).unwrap().opacity, Some(0.0));
        assert_eq!(stagger.child_style(2).unwrap().translate_y, Some(30.0));

        scroll_to(&hub, &scheduler, 1500.0);
        for _ in 0..60 {
            scheduler.advance(FRAME);
        }
        for index in 0..3 {
            let style = stagger.child_style(index).unwrap();
            assert_eq!(style.opacity, Some(1.0));
            assert_eq!(style.translate_y, Some(0.0));
        }
        assert!(stagger.child_style(3).is_none());
    }

    #[test]
    fn test_stagger_reveal_snaps_without_motion() {
        let (scheduler, hub, ctx) = setup();
        ctx.controller().set_reduced_motion(true);
        let container = LayoutBox::new(&hub, Rect::new(0.0, 2000.0, 400.0, 400.0));
        let stagger = StaggerReveal::new(&ctx, container, 3).unwrap();
        scroll_to(&hub, &scheduler, 0.0);

        scroll_to(&hub, &scheduler, 1500.0);
        for index in 0..3 {
            let style = stagger.child_style(index).unwrap();
            assert_eq!(style.opacity, Some(1.0));
            assert_eq!(style.translate_y, Some(0.0));
        }

        scroll_to(&hub, &scheduler, 0.0);
        assert_eq!(stagger.child_style(2).unwrap().opacity, Some(0.0));
        assert_eq!(stagger.child_style(2).unwrap().translate_y, Some(30.0));
    }
}

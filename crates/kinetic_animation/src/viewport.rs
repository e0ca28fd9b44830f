//! Viewport observation
//!
//! Binds an element to an "is in view" membership flag. Every frame the
//! observer measures the element, intersects it with the viewport grown or
//! shrunk by a CSS-style root margin and compares the visible proportion
//! with the threshold.
//!
//! Once-only observers disconnect after their first `true` and never revert.
//! When the host cannot report visibility at all, membership is `true`
//! immediately, so content is never left hidden.

use crate::context::MotionContext;
use crate::scheduler::{FrameContext, FrameControl, FrameSubscription, SchedulerHandle};
use kinetic_core::{AnimationController, MotionError, Rect, Result, Size};
use kinetic_platform::{ElementHandle, WeakEventHub};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// One root margin component
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginValue {
    Px(f32),
    /// Percentage of the root's height (top, bottom) or width (left, right)
    Percent(f32),
}

impl MarginValue {
    pub fn resolve(&self, extent: f32) -> f32 {
        match *self {
            MarginValue::Px(px) => px,
            MarginValue::Percent(percent) => percent / 100.0 * extent,
        }
    }

    fn parse(token: &str) -> Option<MarginValue> {
        if token == "0" {
            return Some(MarginValue::Px(0.0));
        }

        let (number, percent) = match token.strip_suffix('%') {
            Some(number) => (number, true),
            None => (token.strip_suffix("px")?, false),
        };
        let value = number.parse::<f32>().ok().filter(|value| value.is_finite())?;

        Some(if percent {
            MarginValue::Percent(value)
        } else {
            MarginValue::Px(value)
        })
    }
}

impl fmt::Display for MarginValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginValue::Px(px) => write!(f, "{}px", px),
            MarginValue::Percent(percent) => write!(f, "{}%", percent),
        }
    }
}

/// CSS-style margin around the viewport; negative values shrink it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin::uniform(MarginValue::Px(0.0));

    pub const fn uniform(value: MarginValue) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Parse one to four space-separated components, CSS shorthand order
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = || MotionError::InvalidMargin(source.to_string());
        let values = source
            .split_whitespace()
            .map(MarginValue::parse)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        match values.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(invalid()),
        }
    }

    /// Viewport rectangle adjusted by this margin
    pub fn apply(&self, viewport: Size) -> Rect {
        viewport.to_rect().expand(
            self.top.resolve(viewport.height),
            self.right.resolve(viewport.width),
            self.bottom.resolve(viewport.height),
            self.left.resolve(viewport.width),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = MotionError;

    fn from_str(source: &str) -> Result<Self> {
        Self::parse(source)
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Observation settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportOptions {
    /// Visible proportion required, 0 meaning any positive overlap
    pub threshold: f32,
    pub root_margin: RootMargin,
    /// Disconnect after the first entry
    pub once: bool,
}

impl ViewportOptions {
    pub fn once(root_margin: RootMargin) -> Self {
        Self {
            threshold: 0.0,
            root_margin,
            once: true,
        }
    }

    pub fn repeatable(root_margin: RootMargin) -> Self {
        Self {
            once: false,
            ..Self::once(root_margin)
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self::once(RootMargin::ZERO)
    }
}

/// Visible proportion of `element` inside `root`, in `[0, 1]`
///
/// A zero-area element counts as fully visible while its origin lies in
/// the root.
pub fn intersection_ratio(element: &Rect, root: &Rect) -> f32 {
    if element.size.is_degenerate() {
        return if root.contains(element.origin) { 1.0 } else { 0.0 };
    }
    match element.intersection(root) {
        Some(visible) => (visible.area() / element.area()).clamp(0.0, 1.0),
        None => 0.0,
    }
}

/// Whether a ratio satisfies a threshold (0 means any overlap)
pub fn meets_threshold(ratio: f32, threshold: f32) -> bool {
    if threshold <= 0.0 {
        ratio > 0.0
    } else {
        ratio >= threshold.min(1.0)
    }
}

/// Membership state machine, independent of any host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Membership {
    in_view: bool,
    once: bool,
    done: bool,
}

impl Membership {
    pub fn new(once: bool) -> Self {
        Self {
            in_view: false,
            once,
            done: false,
        }
    }

    /// Feed one measurement; returns the new membership on a transition
    pub fn update(&mut self, intersecting: bool) -> Option<bool> {
        if self.done || intersecting == self.in_view {
            return None;
        }
        self.in_view = intersecting;
        if self.once && intersecting {
            self.done = true;
        }
        Some(intersecting)
    }

    pub fn is_in_view(&self) -> bool {
        self.in_view
    }

    /// A once-only membership that has fired and stopped listening
    pub fn is_done(&self) -> bool {
        self.done
    }
}

#[derive(Default)]
struct InViewShared {
    in_view: AtomicBool,
    transitions: AtomicU32,
    connected: AtomicBool,
}

/// Live membership flag returned by [`ViewportObserver::observe`]
pub struct InView {
    shared: Arc<InViewShared>,
    _frame: Option<FrameSubscription>,
}

impl InView {
    pub fn get(&self) -> bool {
        self.shared.in_view.load(Ordering::Acquire)
    }

    /// Number of membership changes so far
    pub fn transitions(&self) -> u32 {
        self.shared.transitions.load(Ordering::Acquire)
    }

    /// Whether the observer still measures every frame
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }
}

impl fmt::Debug for InView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InView")
            .field("in_view", &self.get())
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Observes elements against the viewport of a [`MotionContext`]
#[derive(Clone)]
pub struct ViewportObserver {
    controller: AnimationController,
    scheduler: SchedulerHandle,
    hub: WeakEventHub,
}

impl ViewportObserver {
    pub fn new(ctx: &MotionContext) -> Self {
        Self {
            controller: ctx.controller().clone(),
            scheduler: ctx.scheduler().clone(),
            hub: ctx.hub().downgrade(),
        }
    }

    pub fn observe(&self, element: ElementHandle, options: ViewportOptions) -> InView {
        self.observe_with(element, options, |_, _| {})
    }

    /// Observe and call `on_change` on every membership transition
    ///
    /// The callback runs inside the frame that detected the transition.
    pub fn observe_with<F>(
        &self,
        element: ElementHandle,
        options: ViewportOptions,
        mut on_change: F,
    ) -> InView
    where
        F: FnMut(bool, &FrameContext) + Send + 'static,
    {
        let shared = Arc::new(InViewShared::default());

        if !self.controller.supports_intersection() {
            tracing::debug!("host cannot report visibility, treating element as in view");
            shared.in_view.store(true, Ordering::Release);
            shared.transitions.store(1, Ordering::Release);
            on_change(true, &FrameContext::default());
            return InView {
                shared,
                _frame: None,
            };
        }

        let mut membership = Membership::new(options.once);
        let hub = self.hub.clone();
        let controller = self.controller.clone();
        let frame_shared = Arc::clone(&shared);
        shared.connected.store(true, Ordering::Release);

        let frame = self.scheduler.register(move |frame| {
            let Some(state) = hub.state() else {
                frame_shared.connected.store(false, Ordering::Release);
                return FrameControl::Done;
            };

            // Unmeasurable this frame: keep the current membership
            let Some(rect) = element.client_rect() else {
                tracing::trace!("observed element has no layout, skipping frame");
                return FrameControl::Continue;
            };

            let root = options.root_margin.apply(state.viewport);
            let intersecting =
                meets_threshold(intersection_ratio(&rect, &root), options.threshold);

            if let Some(in_view) = membership.update(intersecting) {
                frame_shared.in_view.store(in_view, Ordering::Release);
                frame_shared.transitions.fetch_add(1, Ordering::AcqRel);
                controller.mark_dirty();
                on_change(in_view, frame);
            }

            if membership.is_done() {
                frame_shared.connected.store(false, Ordering::Release);
                FrameControl::Done
            } else {
                FrameControl::Continue
            }
        });

        if frame.is_none() {
            shared.connected.store(false, Ordering::Release);
        }

        InView {
            shared,
            _frame: frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::AnimationScheduler;
    use kinetic_core::{CapabilityConfig, HostSignals, MotionConfig};
    use kinetic_platform::{EventHub, HostEvent, LayoutBox, StaticCapabilities};
    use std::sync::Mutex;

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

    #[test]
    fn test_parse_root_margin() {
        let margin = RootMargin::parse("-20% 0px -20% 0px").unwrap();
        assert_eq!(margin.top, MarginValue::Percent(-20.0));
        assert_eq!(margin.right, MarginValue::Px(0.0));
        assert_eq!(margin.bottom, MarginValue::Percent(-20.0));

        let margin = RootMargin::parse("-50px").unwrap();
        assert_eq!(margin, RootMargin::uniform(MarginValue::Px(-50.0)));

        let margin = RootMargin::parse("10px 5%").unwrap();
        assert_eq!(margin.left, MarginValue::Percent(5.0));
        assert_eq!(margin.bottom, MarginValue::Px(10.0));

        let margin = RootMargin::parse("1px 2px 3px").unwrap();
        assert_eq!(margin.left, MarginValue::Px(2.0));
        assert_eq!(margin.bottom, MarginValue::Px(3.0));

        assert_eq!(RootMargin::parse("0").unwrap(), RootMargin::ZERO);
    }

    #[test]
    fn test_parse_root_margin_errors() {
        for bad in ["", "10", "1px 2px 3px 4px 5px", "abcpx", "10em"] {
            assert!(RootMargin::parse(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_apply_margin() {
        let root = RootMargin::parse("-20% 0px -20% 0px")
            .unwrap()
            .apply(Size::new(1000.0, 1000.0));
        assert_eq!(root, Rect::new(0.0, 200.0, 1000.0, 600.0));
    }

    #[test]
    fn test_intersection_ratio() {
        let root = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(intersection_ratio(&Rect::new(0.0, 50.0, 100.0, 100.0), &root), 0.5);
        assert_eq!(intersection_ratio(&Rect::new(0.0, 100.0, 100.0, 100.0), &root), 0.0);
        assert_eq!(intersection_ratio(&Rect::new(10.0, 10.0, 0.0, 0.0), &root), 1.0);
        assert!(meets_threshold(0.01, 0.0));
        assert!(!meets_threshold(0.0, 0.0));
        assert!(meets_threshold(0.5, 0.5));
        assert!(!meets_threshold(0.49, 0.5));
    }

    #[test]
    fn test_membership_once() {
        let mut membership = Membership::new(true);
        assert_eq!(membership.update(false), None);
        assert_eq!(membership.update(true), Some(true));
        assert!(membership.is_done());
        assert_eq!(membership.update(false), None);
        assert!(membership.is_in_view());
    }

    #[test]
    fn test_membership_repeatable() {
        let mut membership = Membership::new(false);
        assert_eq!(membership.update(true), Some(true));
        assert_eq!(membership.update(true), None);
        assert_eq!(membership.update(false), Some(false));
        assert_eq!(membership.update(true), Some(true));
        assert!(!membership.is_done());
    }

    #[test]
    fn test_once_observer_disconnects() {
        let (scheduler, hub, ctx) = setup();
        let element = LayoutBox::new(&hub, Rect::new(0.0, 1500.0, 1000.0, 200.0));
        let observer = ViewportObserver::new(&ctx);
        let in_view = observer.observe(element, ViewportOptions::default());

        scheduler.advance(FRAME);
        assert!(!in_view.get());
        assert!(in_view.is_connected());

        hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 600.0 });
        scheduler.advance(FRAME);
        assert!(in_view.get());
        assert!(!in_view.is_connected());
        assert_eq!(scheduler.callback_count(), 0);

        hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 0.0 });
        scheduler.advance(FRAME);
        assert!(in_view.get());
        assert_eq!(in_view.transitions(), 1);
    }

    #[test]
    fn test_repeatable_observer_follows_scroll() {
        let (scheduler, hub, ctx) = setup();
        let element = LayoutBox::new(&hub, Rect::new(0.0, 1500.0, 1000.0, 200.0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _in_view = ViewportObserver::new(&ctx).observe_with(
            element,
            ViewportOptions::repeatable(RootMargin::ZERO),
            move |in_view, _| sink.lock().unwrap().push(in_view),
        );

        for y in [0.0, 600.0, 0.0, 600.0] {
            hub.dispatch(&HostEvent::Scroll { x: 0.0, y });
            scheduler.advance(FRAME);
        }
        assert_eq!(*seen.lock().unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_negative_margin_delays_entry() {
        let (scheduler, hub, ctx) = setup();
        let element = LayoutBox::new(&hub, Rect::new(0.0, 1100.0, 1000.0, 100.0));
        let in_view = ViewportObserver::new(&ctx).observe(
            element,
            ViewportOptions::once(RootMargin::parse("-20% 0px -20% 0px").unwrap()),
        );

        // Element top at 900: inside the viewport, outside the shrunk root
        hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 200.0 });
        scheduler.advance(FRAME);
        assert!(!in_view.get());

        hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 400.0 });
        scheduler.advance(FRAME);
        assert!(in_view.get());
    }

    #[test]
    fn test_threshold() {
        let (scheduler, hub, ctx) = setup();
        let element = LayoutBox::new(&hub, Rect::new(0.0, 900.0, 1000.0, 200.0));
        let in_view = ViewportObserver::new(&ctx)
            .observe(element, ViewportOptions::default().with_threshold(0.75));

        scheduler.advance(FRAME);
        assert!(!in_view.get());

        hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 60.0 });
        scheduler.advance(FRAME);
        assert!(in_view.get());
    }

    #[test]
    fn test_unsupported_intersection_fails_open() {
        let scheduler = AnimationScheduler::new();
        let hub = EventHub::new(1000.0, 1000.0);
        let signals = HostSignals {
            supports_intersection: false,
            ..HostSignals::desktop()
        };
        let controller =
            AnimationController::mount(&StaticCapabilities::new(signals), &CapabilityConfig::default());
        let ctx = MotionContext::new(controller, &scheduler, hub.clone(), MotionConfig::default());

        let element = LayoutBox::new(&hub, Rect::new(0.0, 5000.0, 10.0, 10.0));
        let in_view = ViewportObserver::new(&ctx).observe(element, ViewportOptions::default());
        assert!(in_view.get());
        assert_eq!(scheduler.callback_count(), 0);
    }

    #[test]
    fn test_unattached_element_keeps_membership() {
        let (scheduler, hub, ctx) = setup();
        let element = LayoutBox::unattached(&hub);
        let in_view = ViewportObserver::new(&ctx)
            .observe(element.clone(), ViewportOptions::repeatable(RootMargin::ZERO));
        scheduler.advance(FRAME);
        assert!(!in_view.get());

        element.set_document_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        scheduler.advance(FRAME);
        assert!(in_view.get());

        element.detach();
        scheduler.advance(FRAME);
        assert!(in_view.get());
    }
}

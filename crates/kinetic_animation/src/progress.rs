//! One-shot progress ramps
//!
//! [`ProgressAnimation`] eases a number from 0 to a target exactly once.
//! [`Counter`] starts one when its element first enters the viewport and
//! formats the running value for display.

use crate::context::MotionContext;
use crate::easing::Easing;
use crate::scheduler::{FrameControl, FrameSubscription, SchedulerHandle};
use crate::viewport::{InView, RootMargin, ViewportObserver, ViewportOptions};
use kinetic_core::{AnimationClass, AnimationController, CounterConfig, Result};
use kinetic_platform::ElementHandle;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Eased ramp from 0 to `target`
///
/// `current` only moves toward `target`. Once done, `current == target`
/// exactly and further calls change nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressAnimation {
    target: f64,
    duration_ms: u32,
    delay_ms: u32,
    easing: Easing,
    elapsed_ms: f64,
    current: f64,
    started: bool,
    done: bool,
}

impl ProgressAnimation {
    pub fn new(target: f64, duration_ms: u32) -> Self {
        Self {
            target,
            duration_ms,
            delay_ms: 0,
            easing: Easing::EaseOutCubic,
            elapsed_ms: 0.0,
            current: 0.0,
            started: false,
            done: false,
        }
    }

    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Start the ramp; returns `false` if it was already started
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        true
    }

    /// Advance by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        if !self.started || self.done {
            return;
        }
        if dt.is_finite() && dt > 0.0 {
            self.elapsed_ms += f64::from(dt) * 1000.0;
        }

        let active = self.elapsed_ms - f64::from(self.delay_ms);
        if active < 0.0 {
            return;
        }
        if self.duration_ms == 0 || active >= f64::from(self.duration_ms) {
            self.finish();
            return;
        }

        let t = (active / f64::from(self.duration_ms)) as f32;
        let next = self.target * f64::from(self.easing.apply(t));
        // Never step back, whatever the sign of the target
        self.current = if self.target >= 0.0 {
            next.max(self.current).min(self.target)
        } else {
            next.min(self.current).max(self.target)
        };
    }

    /// Jump straight to the target
    pub fn finish(&mut self) {
        self.started = true;
        self.current = self.target;
        self.done = true;
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }
}

/// Display format of a counter value
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NumberFormat {
    pub prefix: String,
    pub suffix: String,
    /// Fixed decimals; 0 rounds to an integer with thousands separators
    pub decimals: u8,
}

impl NumberFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn format(&self, value: f64) -> String {
        let number = if self.decimals > 0 {
            format!("{:.*}", usize::from(self.decimals), value)
        } else {
            group_thousands(value.round())
        };
        format!("{}{}{}", self.prefix, number, self.suffix)
    }
}

/// Integer with `,` every three digits
fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 && digits != "0" {
        grouped.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Counter settings
#[derive(Clone, Debug, PartialEq)]
pub struct CounterOptions {
    pub target: f64,
    pub duration_ms: u32,
    pub delay_ms: u32,
    pub format: NumberFormat,
    pub root_margin: RootMargin,
}

impl CounterOptions {
    /// Counter to `target` with the configured duration and margin
    pub fn new(target: f64, config: &CounterConfig) -> Result<Self> {
        Ok(Self {
            target,
            duration_ms: config.duration_ms,
            delay_ms: 0,
            format: NumberFormat::default(),
            root_margin: RootMargin::parse(&config.root_margin)?,
        })
    }

    /// Headline statistic: slower ramp, starting 200ms after the card
    pub fn stat_card(target: f64, card_delay_ms: u32, config: &CounterConfig) -> Result<Self> {
        Ok(Self::new(target, config)?
            .with_duration(2500)
            .with_delay(card_delay_ms.saturating_add(200)))
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }
}

struct CounterInner {
    animation: ProgressAnimation,
    ramp: Option<FrameSubscription>,
}

fn lock(inner: &Mutex<CounterInner>) -> MutexGuard<'_, CounterInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Start the ramp on first entry
fn trigger(
    inner: &Weak<Mutex<CounterInner>>,
    scheduler: &SchedulerHandle,
    controller: &AnimationController,
) {
    let Some(shared) = inner.upgrade() else {
        return;
    };
    let mut guard = lock(&shared);
    if guard.animation.is_started() {
        return;
    }

    if !controller.should_animate(Some(AnimationClass::Scroll)) {
        guard.animation.finish();
        controller.mark_dirty();
        return;
    }

    guard.animation.start();
    let weak = Weak::clone(inner);
    let frame_controller = controller.clone();
    let ramp = scheduler.register(move |frame| {
        let Some(shared) = weak.upgrade() else {
            return FrameControl::Done;
        };
        let mut guard = lock(&shared);
        guard.animation.advance(frame.dt);
        frame_controller.mark_dirty();
        if guard.animation.is_done() {
            FrameControl::Done
        } else {
            FrameControl::Continue
        }
    });

    if ramp.is_none() {
        guard.animation.finish();
    }
    guard.ramp = ramp;
}

/// Number that counts up once its element scrolls into view
pub struct Counter {
    inner: Arc<Mutex<CounterInner>>,
    format: NumberFormat,
    in_view: InView,
}

impl Counter {
    pub fn new(ctx: &MotionContext, element: ElementHandle, options: CounterOptions) -> Self {
        let animation =
            ProgressAnimation::new(options.target, options.duration_ms).with_delay(options.delay_ms);
        let inner = Arc::new(Mutex::new(CounterInner {
            animation,
            ramp: None,
        }));

        let weak = Arc::downgrade(&inner);
        let scheduler = ctx.scheduler().clone();
        let controller = ctx.controller().clone();
        let in_view = ViewportObserver::new(ctx).observe_with(
            element,
            ViewportOptions::once(options.root_margin),
            move |in_view, _frame| {
                if in_view {
                    trigger(&weak, &scheduler, &controller);
                }
            },
        );

        Self {
            inner,
            format: options.format,
            in_view,
        }
    }

    /// Counter to `target` with the context's configured defaults
    pub fn to(ctx: &MotionContext, element: ElementHandle, target: f64) -> Result<Self> {
        let options = CounterOptions::new(target, &ctx.config().counter)?;
        Ok(Self::new(ctx, element, options))
    }

    pub fn value(&self) -> f64 {
        lock(&self.inner).animation.current()
    }

    /// Formatted value, e.g. `"$1,250+"`
    pub fn display(&self) -> String {
        self.format.format(self.value())
    }

    pub fn is_started(&self) -> bool {
        lock(&self.inner).animation.is_started()
    }

    pub fn is_done(&self) -> bool {
        lock(&self.inner).animation.is_done()
    }

    pub fn in_view(&self) -> bool {
        self.in_view.get()
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("Counter")
            .field("current", &inner.animation.current())
            .field("target", &inner.animation.target())
            .field("done", &inner.animation.is_done())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::AnimationScheduler;
    use kinetic_core::{MotionConfig, Rect};
    use kinetic_platform::{EventHub, HostEvent, LayoutBox};

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_start_is_latched() {
        let mut ramp = ProgressAnimation::new(10.0, 1000);
        assert!(ramp.start());
        ramp.advance(0.5);
        let halfway = ramp.current();
        assert!(!ramp.start());
        assert_eq!(ramp.current(), halfway);
    }

    #[test]
    fn test_monotonic_and_exact() {
        let mut ramp = ProgressAnimation::new(50.0, 2000);
        ramp.start();
        let mut last = 0.0;
        for _ in 0..200 {
            ramp.advance(FRAME);
            assert!(ramp.current() >= last);
            last = ramp.current();
        }
        assert!(ramp.is_done());
        assert_eq!(ramp.current(), 50.0);
    }

    #[test]
    fn test_negative_target_moves_down() {
        let mut ramp = ProgressAnimation::new(-8.0, 100);
        ramp.start();
        ramp.advance(0.05);
        assert!(ramp.current() < 0.0 && ramp.current() > -8.0);
        ramp.advance(0.1);
        assert_eq!(ramp.current(), -8.0);
    }

    #[test]
    fn test_delay_and_unstarted() {
        let mut ramp = ProgressAnimation::new(10.0, 100).with_delay(200);
        ramp.advance(1.0);
        assert_eq!(ramp.current(), 0.0);
        assert!(!ramp.is_done());

        ramp.start();
        ramp.advance(0.15);
        assert_eq!(ramp.current(), 0.0);
        ramp.advance(0.2);
        assert!(ramp.is_done());
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut ramp = ProgressAnimation::new(3.0, 0);
        ramp.start();
        ramp.advance(0.0);
        assert!(ramp.is_done());
        assert_eq!(ramp.current(), 3.0);
    }

    #[test]
    fn test_number_format() {
        assert_eq!(NumberFormat::new().format(1234567.4), "1,234,567");
        assert_eq!(NumberFormat::new().format(999.5), "1,000");
        assert_eq!(NumberFormat::new().format(-4200.0), "-4,200");
        assert_eq!(NumberFormat::new().format(0.2), "0");
        assert_eq!(
            NumberFormat::new().prefix("$").suffix("M").decimals(1).format(12.345),
            "$12.3M"
        );
        assert_eq!(NumberFormat::new().suffix("+").format(50.0), "50+");
    }

    #[test]
    fn test_counter_runs_once_in_view() {
        let scheduler = AnimationScheduler::new();
        let hub = EventHub::new(1000.0, 1000.0);
        let ctx = MotionContext::new(
            AnimationController::default(),
            &scheduler,
            hub.clone(),
            MotionConfig::default(),
        );
        let element = LayoutBox::new(&hub, Rect::new(0.0, 1500.0, 200.0, 100.0));
        let counter = Counter::to(&ctx, element, 1200.0).unwrap();

        scheduler.advance(FRAME);
        assert!(!counter.is_started());

        hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 1000.0 });
        for _ in 0..30 {
            scheduler.advance(FRAME);
        }
        assert!(counter.is_started());
        assert!(counter.value() > 0.0 && counter.value() < 1200.0);

        for _ in 0..120 {
            scheduler.advance(FRAME);
        }
        assert!(counter.is_done());
        assert_eq!(counter.display(), "1,200");
        assert_eq!(scheduler.callback_count(), 0);
    }

    #[test]
    fn test_counter_jumps_without_scroll_animation() {
        let scheduler = AnimationScheduler::new();
        let hub = EventHub::new(1000.0, 1000.0);
        let ctx = MotionContext::new(
            AnimationController::default(),
            &scheduler,
            hub.clone(),
            MotionConfig::default(),
        );
        ctx.controller().set_enabled(false);
        let element = LayoutBox::new(&hub, Rect::new(0.0, 100.0, 200.0, 100.0));
        let counter = Counter::to(&ctx, element, 75.0).unwrap();

        scheduler.advance(FRAME);
        assert!(counter.is_done());
        assert_eq!(counter.value(), 75.0);
    }

    #[test]
    fn test_stat_card_timing() {
        let options = CounterOptions::stat_card(99.0, 300, &CounterConfig::default()).unwrap();
        assert_eq!(options.duration_ms, 2500);
        assert_eq!(options.delay_ms, 500);
        assert_eq!(options.root_margin, RootMargin::parse("-50px").unwrap());
    }
}

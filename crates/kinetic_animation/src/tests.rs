//! Cross-module scenarios: host events in, styles and values out

use crate::context::MotionContext;
use crate::parallax::{DepthLayer, MouseTilt, TiltOptions};
use crate::preset::Preset;
use crate::progress::{Counter, CounterOptions};
use crate::reveal::{Reveal, RevealPhase};
use crate::scheduler::AnimationScheduler;
use crate::scroll_trigger::{Scrub, ScrollTrigger, TriggerConfig};
use crate::timeline::Timeline;
use kinetic_core::{
    AnimationClass, AnimationController, CapabilityConfig, HostSignals, MotionConfig,
    PerformanceTier, Rect,
};
use kinetic_platform::{EventHub, HostEvent, LayoutBox, StaticCapabilities};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const FRAME: f32 = 1.0 / 60.0;

fn mount(controller: AnimationController) -> (AnimationScheduler, EventHub, MotionContext) {
    let scheduler = AnimationScheduler::new();
    let hub = EventHub::new(1000.0, 1000.0);
    let ctx = MotionContext::new(controller, &scheduler, hub.clone(), MotionConfig::default());
    (scheduler, hub, ctx)
}

fn run(scheduler: &AnimationScheduler, frames: usize) {
    for _ in 0..frames {
        scheduler.advance(FRAME);
    }
}

fn scroll_to(hub: &EventHub, scheduler: &AnimationScheduler, y: f32) {
    hub.dispatch(&HostEvent::Scroll { x: 0.0, y });
    scheduler.advance(FRAME);
}

#[test]
fn fade_up_reveals_once_and_stays() {
    let (scheduler, hub, ctx) = mount(AnimationController::default());
    let card = LayoutBox::new(&hub, Rect::new(0.0, 2400.0, 600.0, 300.0));
    let reveal = Reveal::preset(&ctx, card, Preset::FadeUp).unwrap();

    run(&scheduler, 3);
    assert_eq!(reveal.style().opacity, Some(0.0));
    assert_eq!(reveal.style().translate_y, Some(40.0));

    scroll_to(&hub, &scheduler, 2000.0);
    run(&scheduler, 60);
    assert_eq!(reveal.phase(), RevealPhase::Visible);
    assert_eq!(reveal.style(), Preset::FadeUp.keyframes().visible);

    // Scrolling back out never re-hides a once reveal
    scroll_to(&hub, &scheduler, 0.0);
    run(&scheduler, 60);
    assert_eq!(reveal.phase(), RevealPhase::Visible);
    assert!(reveal.state().triggered_once);
    assert_eq!(reveal.style().opacity, Some(1.0));
}

#[test]
fn counter_lands_exactly_on_target() {
    let (scheduler, hub, ctx) = mount(AnimationController::default());
    let stat = LayoutBox::new(&hub, Rect::new(0.0, 200.0, 200.0, 100.0));
    let options = CounterOptions::new(50.0, &ctx.config().counter)
        .unwrap()
        .with_duration(2000);
    let counter = Counter::new(&ctx, stat, options);

    run(&scheduler, 150);
    assert!(counter.is_done());
    assert_eq!(counter.value(), 50.0);
    assert_eq!(counter.display(), "50");
}

#[test]
fn reduced_motion_mid_session_freezes_parallax() {
    let (scheduler, hub, ctx) = mount(AnimationController::default());
    let background = DepthLayer::new(&ctx, 0);

    scroll_to(&hub, &scheduler, 100.0);
    assert_eq!(background.offset(), 30.0);

    hub.dispatch(&HostEvent::ReducedMotionChanged(true));
    scheduler.advance(FRAME);
    assert_eq!(background.offset(), 0.0);

    for y in [200.0, 400.0, 50.0] {
        scroll_to(&hub, &scheduler, y);
        assert_eq!(background.offset(), 0.0);
    }
}

#[test]
fn unmounting_mid_scrub_stops_updates() {
    let (scheduler, hub, ctx) = mount(AnimationController::default());
    let baseline = hub.total_listeners();
    let section = LayoutBox::new(&hub, Rect::new(0.0, 2000.0, 400.0, 400.0));
    let mut timeline = Timeline::new();
    let x = timeline.add(0, 1000, 0.0, 100.0);
    let trigger = ScrollTrigger::new(
        &ctx,
        section,
        timeline,
        TriggerConfig::default().scrub(Scrub::On),
    );

    let toggles = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&toggles);
    trigger.on_toggle(move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    scroll_to(&hub, &scheduler, 1700.0);
    assert_eq!(trigger.value(x), Some(50.0));
    let seen = toggles.load(Ordering::Relaxed);

    drop(trigger);
    assert_eq!(scheduler.callback_count(), 0);
    assert_eq!(hub.total_listeners(), baseline);

    for y in [2200.0, 5000.0, 0.0] {
        scroll_to(&hub, &scheduler, y);
    }
    assert_eq!(toggles.load(Ordering::Relaxed), seen);
}

#[test]
fn three_d_requires_high_tier() {
    let medium = HostSignals {
        device_memory_gb: None,
        ..HostSignals::desktop()
    };
    let controller =
        AnimationController::mount(&StaticCapabilities::new(medium), &CapabilityConfig::default());
    assert_eq!(controller.tier(), PerformanceTier::Medium);
    assert!(!controller.should_animate(Some(AnimationClass::ThreeD)));
    assert!(controller.should_animate(Some(AnimationClass::Parallax)));

    let (scheduler, hub, ctx) = mount(controller);
    let card = LayoutBox::new(&hub, Rect::new(0.0, 0.0, 300.0, 300.0));
    let tilt = MouseTilt::new(&ctx, card, TiltOptions::default()).unwrap();
    hub.dispatch(&HostEvent::PointerMove { x: 290.0, y: 10.0 });
    run(&scheduler, 30);
    assert_eq!(tilt.rotate_x(), 0.0);
    assert_eq!(tilt.rotate_y(), 0.0);
    assert_eq!(tilt.scale(), 1.0);

    let low = HostSignals {
        hardware_concurrency: Some(2),
        ..HostSignals::desktop()
    };
    let controller =
        AnimationController::mount(&StaticCapabilities::new(low), &CapabilityConfig::default());
    assert_eq!(controller.tier(), PerformanceTier::Low);
    assert!(!controller.should_animate(Some(AnimationClass::Parallax)));
    assert!(controller.should_animate(Some(AnimationClass::Scroll)));
}

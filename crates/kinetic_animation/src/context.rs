//! Motion context
//!
//! The bundle every animated component is constructed from: the capability
//! controller, a handle to the frame scheduler, the host event hub and the
//! loaded configuration. The application root builds one context and passes
//! clones down the tree; nothing in the engine reaches for global state.
//!
//! The root context also keeps the controller in sync with the host's
//! reduced-motion preference for as long as any clone of it is alive.

use crate::scheduler::{AnimationScheduler, SchedulerHandle};
use kinetic_core::{AnimationClass, AnimationController, MotionConfig};
use kinetic_platform::{EventHub, EventKind, HostEvent, ListenerGuard};
use std::sync::Arc;

/// Keep `controller` in sync with reduced-motion changes dispatched on `hub`
///
/// The subscription lasts until the returned guard is dropped.
pub fn watch_reduced_motion(controller: &AnimationController, hub: &EventHub) -> ListenerGuard {
    let controller = controller.clone();
    hub.listen(EventKind::ReducedMotion, move |event| {
        if let HostEvent::ReducedMotionChanged(reduced) = event {
            controller.set_reduced_motion(*reduced);
        }
    })
}

/// Explicitly constructed animation environment
#[derive(Clone)]
pub struct MotionContext {
    controller: AnimationController,
    scheduler: SchedulerHandle,
    hub: EventHub,
    config: Arc<MotionConfig>,
    _reduced_motion: Arc<ListenerGuard>,
}

impl MotionContext {
    pub fn new(
        controller: AnimationController,
        scheduler: &AnimationScheduler,
        hub: EventHub,
        config: MotionConfig,
    ) -> Self {
        Self::with_handle(controller, scheduler.handle(), hub, config)
    }

    /// Build a context from a scheduler handle the caller already holds
    pub fn with_handle(
        controller: AnimationController,
        scheduler: SchedulerHandle,
        hub: EventHub,
        config: MotionConfig,
    ) -> Self {
        let guard = watch_reduced_motion(&controller, &hub);
        Self {
            controller,
            scheduler,
            hub,
            config: Arc::new(config),
            _reduced_motion: Arc::new(guard),
        }
    }

    pub fn controller(&self) -> &AnimationController {
        &self.controller
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Shorthand for the controller's capability query
    pub fn should_animate(&self, class: Option<AnimationClass>) -> bool {
        self.controller.should_animate(class)
    }
}

impl std::fmt::Debug for MotionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionContext")
            .field("controller", &self.controller)
            .field("scheduler_alive", &self.scheduler.is_alive())
            .field("host", &self.hub.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_core::CapabilityConfig;

    #[test]
    fn test_reduced_motion_follows_host() {
        let scheduler = AnimationScheduler::new();
        let hub = EventHub::new(800.0, 600.0);
        let ctx = MotionContext::new(
            AnimationController::new(&CapabilityConfig::default()),
            &scheduler,
            hub.clone(),
            MotionConfig::default(),
        );
        assert!(ctx.should_animate(Some(AnimationClass::Parallax)));

        hub.dispatch(&HostEvent::ReducedMotionChanged(true));
        assert!(ctx.controller().reduced_motion());
        assert!(!ctx.should_animate(None));

        hub.dispatch(&HostEvent::ReducedMotionChanged(false));
        assert!(ctx.should_animate(None));
    }

    #[test]
    fn test_watch_lasts_while_any_clone_lives() {
        let scheduler = AnimationScheduler::new();
        let hub = EventHub::new(800.0, 600.0);
        let ctx = MotionContext::new(
            AnimationController::default(),
            &scheduler,
            hub.clone(),
            MotionConfig::default(),
        );
        let child = ctx.clone();
        drop(ctx);
        assert_eq!(hub.listener_count(EventKind::ReducedMotion), 1);

        drop(child);
        assert_eq!(hub.listener_count(EventKind::ReducedMotion), 0);
    }
}

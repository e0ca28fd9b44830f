//! Animation controller
//!
//! Tree-scoped holder of the [`CapabilityProfile`]. The controller is created
//! once at the application root and cloned into every component that needs
//! to ask [`AnimationController::should_animate`]. Clones share state.
//!
//! Before live host signals are available the controller reports a
//! pre-hydration profile chosen by [`FallbackPolicy`]. Calling
//! [`AnimationController::hydrate`] evaluates the tier exactly once.
//!
//! ```
//! use kinetic_core::{AnimationClass, AnimationController, CapabilityConfig};
//!
//! let controller = AnimationController::new(&CapabilityConfig::default());
//! assert!(controller.should_animate(Some(AnimationClass::ThreeD)));
//!
//! controller.set_reduced_motion(true);
//! assert!(!controller.should_animate(Some(AnimationClass::Scroll)));
//! ```

use crate::capability::{AnimationClass, CapabilityProfile, CapabilityProvider, PerformanceTier};
use crate::config::{CapabilityConfig, FallbackPolicy};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Shared dirty flag set whenever a value consumers render from changes
pub type DirtyFlag = Arc<AtomicBool>;

struct ControllerInner {
    tier: AtomicU8,
    reduced_motion: AtomicBool,
    enabled: AtomicBool,
    supports_intersection: AtomicBool,
    hydrated: AtomicBool,
    dirty: DirtyFlag,
}

fn tier_to_raw(tier: PerformanceTier) -> u8 {
    match tier {
        PerformanceTier::High => 0,
        PerformanceTier::Medium => 1,
        PerformanceTier::Low => 2,
    }
}

fn tier_from_raw(raw: u8) -> PerformanceTier {
    match raw {
        0 => PerformanceTier::High,
        1 => PerformanceTier::Medium,
        _ => PerformanceTier::Low,
    }
}

/// Capability query shared down the component tree
#[derive(Clone)]
pub struct AnimationController {
    inner: Arc<ControllerInner>,
}

impl AnimationController {
    /// Create a controller in its pre-hydration state
    pub fn new(config: &CapabilityConfig) -> Self {
        let tier = match config.fallback {
            FallbackPolicy::Optimistic => PerformanceTier::High,
            FallbackPolicy::Conservative => PerformanceTier::Medium,
        };

        Self {
            inner: Arc::new(ControllerInner {
                tier: AtomicU8::new(tier_to_raw(tier)),
                reduced_motion: AtomicBool::new(false),
                enabled: AtomicBool::new(config.enabled),
                supports_intersection: AtomicBool::new(true),
                hydrated: AtomicBool::new(false),
                dirty: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    /// Create a controller and immediately evaluate host signals
    pub fn mount(provider: &dyn CapabilityProvider, config: &CapabilityConfig) -> Self {
        let controller = Self::new(config);
        controller.hydrate(provider);
        controller
    }

    /// Evaluate live host signals
    ///
    /// Runs at most once per controller. Returns `true` if this call
    /// evaluated the signals; `false` if the controller was already hydrated
    /// or the provider could not supply signals yet (the pre-hydration
    /// profile stays in place and a later call may succeed).
    pub fn hydrate(&self, provider: &dyn CapabilityProvider) -> bool {
        if self.inner.hydrated.load(Ordering::Acquire) {
            return false;
        }

        let signals = match provider.read_signals() {
            Ok(signals) => signals,
            Err(err) => {
                tracing::debug!(
                    "capability provider '{}' unavailable, keeping pre-hydration profile: {}",
                    provider.name(),
                    err
                );
                return false;
            }
        };

        if self.inner.hydrated.swap(true, Ordering::AcqRel) {
            return false;
        }

        let profile = CapabilityProfile::from_signals(&signals);
        self.inner
            .tier
            .store(tier_to_raw(profile.tier), Ordering::Release);
        if let Some(reduced) = signals.prefers_reduced_motion {
            self.inner.reduced_motion.store(reduced, Ordering::Release);
        }
        self.inner
            .supports_intersection
            .store(signals.supports_intersection, Ordering::Release);
        self.mark_dirty();

        tracing::debug!(
            "capability profile from '{}': tier={} reduced_motion={}",
            provider.name(),
            profile.tier.as_str(),
            self.reduced_motion()
        );
        true
    }

    /// Whether an animation of the given class may run
    pub fn should_animate(&self, class: Option<AnimationClass>) -> bool {
        self.profile().allows(class)
    }

    /// Flip the global kill-switch
    pub fn set_enabled(&self, enabled: bool) {
        if self.inner.enabled.swap(enabled, Ordering::AcqRel) != enabled {
            tracing::debug!("animations {}", if enabled { "enabled" } else { "disabled" });
            self.mark_dirty();
        }
    }

    /// Apply a live reduced-motion change from the host
    pub fn set_reduced_motion(&self, reduced: bool) {
        if self.inner.reduced_motion.swap(reduced, Ordering::AcqRel) != reduced {
            tracing::debug!("reduced motion changed to {}", reduced);
            self.mark_dirty();
        }
    }

    pub fn enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    pub fn reduced_motion(&self) -> bool {
        self.inner.reduced_motion.load(Ordering::Acquire)
    }

    pub fn tier(&self) -> PerformanceTier {
        tier_from_raw(self.inner.tier.load(Ordering::Acquire))
    }

    /// Whether the host can report element visibility
    pub fn supports_intersection(&self) -> bool {
        self.inner.supports_intersection.load(Ordering::Acquire)
    }

    pub fn is_hydrated(&self) -> bool {
        self.inner.hydrated.load(Ordering::Acquire)
    }

    /// Current capability snapshot
    pub fn profile(&self) -> CapabilityProfile {
        CapabilityProfile {
            reduced_motion: self.reduced_motion(),
            tier: self.tier(),
            enabled: self.enabled(),
        }
    }

    /// Shared dirty flag; components mark it when their outputs change
    pub fn dirty_flag(&self) -> DirtyFlag {
        Arc::clone(&self.inner.dirty)
    }

    pub fn mark_dirty(&self) {
        self.inner.dirty.store(true, Ordering::Release);
    }

    /// Check and clear the dirty flag
    pub fn take_dirty(&self) -> bool {
        self.inner.dirty.swap(false, Ordering::Acquire)
    }
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new(&CapabilityConfig::default())
    }
}

impl std::fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationController")
            .field("profile", &self.profile())
            .field("hydrated", &self.is_hydrated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{DeviceClass, HostSignals};
    use crate::error::{MotionError, Result};
    use std::cell::Cell;

    struct FixedProvider(HostSignals);

    impl CapabilityProvider for FixedProvider {
        fn read_signals(&self) -> Result<HostSignals> {
            Ok(self.0.clone())
        }
    }

    struct CountingProvider {
        reads: Cell<u32>,
        available: bool,
    }

    impl CapabilityProvider for CountingProvider {
        fn read_signals(&self) -> Result<HostSignals> {
            self.reads.set(self.reads.get() + 1);
            if self.available {
                Ok(HostSignals::desktop())
            } else {
                Err(MotionError::CapabilityUnavailable("pre-hydration".into()))
            }
        }
    }

    #[test]
    fn test_prehydration_is_optimistic() {
        let controller = AnimationController::default();
        assert_eq!(controller.tier(), PerformanceTier::High);
        assert!(!controller.reduced_motion());
        assert!(controller.should_animate(Some(AnimationClass::ThreeD)));
    }

    #[test]
    fn test_conservative_fallback() {
        let config = CapabilityConfig {
            fallback: FallbackPolicy::Conservative,
            enabled: true,
        };
        let controller = AnimationController::new(&config);
        assert_eq!(controller.tier(), PerformanceTier::Medium);
        assert!(!controller.should_animate(Some(AnimationClass::ThreeD)));
        assert!(controller.should_animate(Some(AnimationClass::Parallax)));
    }

    #[test]
    fn test_hydrate_runs_once() {
        let mut signals = HostSignals::desktop();
        signals.device_class = Some(DeviceClass::Mobile);
        let controller = AnimationController::default();

        assert!(controller.hydrate(&FixedProvider(signals)));
        assert_eq!(controller.tier(), PerformanceTier::Medium);

        // A second evaluation never changes the tier
        assert!(!controller.hydrate(&FixedProvider(HostSignals::desktop())));
        assert_eq!(controller.tier(), PerformanceTier::Medium);
    }

    #[test]
    fn test_unavailable_provider_keeps_defaults() {
        let provider = CountingProvider {
            reads: Cell::new(0),
            available: false,
        };
        let controller = AnimationController::default();
        assert!(!controller.hydrate(&provider));
        assert!(!controller.is_hydrated());
        assert_eq!(controller.tier(), PerformanceTier::High);

        let provider = CountingProvider {
            reads: Cell::new(0),
            available: true,
        };
        assert!(controller.hydrate(&provider));
        assert!(!controller.hydrate(&provider));
        assert_eq!(provider.reads.get(), 1);
    }

    #[test]
    fn test_reduced_motion_from_signals_and_live() {
        let mut signals = HostSignals::desktop();
        signals.prefers_reduced_motion = Some(true);
        let controller =
            AnimationController::mount(&FixedProvider(signals), &CapabilityConfig::default());
        assert!(!controller.should_animate(None));

        controller.set_reduced_motion(false);
        assert!(controller.should_animate(None));
    }

    #[test]
    fn test_clones_share_state_and_mark_dirty() {
        let controller = AnimationController::default();
        let child = controller.clone();
        controller.take_dirty();

        child.set_enabled(false);
        assert!(!controller.should_animate(Some(AnimationClass::Hover)));
        assert!(controller.take_dirty());

        // No change, no dirty mark
        child.set_enabled(false);
        assert!(!controller.take_dirty());
    }
}

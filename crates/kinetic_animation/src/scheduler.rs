//! Animation scheduler
//!
//! The single per-frame loop of the engine. The host calls
//! [`AnimationScheduler::tick`] (wall clock) or [`AnimationScheduler::advance`]
//! (explicit delta) once per display refresh. Each frame:
//!
//! 1. every registered spring is stepped
//! 2. every registered frame callback runs once
//!
//! Components never hold the scheduler itself. They hold a [`SchedulerHandle`]
//! (a weak reference) and own their registrations through RAII guards:
//! dropping a [`FrameSubscription`] or an [`AnimatedValue`] unregisters it,
//! and a handle that outlives the scheduler turns every call into a no-op.
//!
//! ```
//! use kinetic_animation::{AnimationScheduler, FrameControl};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//!
//! let scheduler = AnimationScheduler::new();
//! let frames = Arc::new(AtomicU32::new(0));
//! let counter = Arc::clone(&frames);
//!
//! let subscription = scheduler.handle().register(move |_frame| {
//!     counter.fetch_add(1, Ordering::Relaxed);
//!     FrameControl::Continue
//! });
//!
//! scheduler.advance(1.0 / 60.0);
//! scheduler.advance(1.0 / 60.0);
//! drop(subscription);
//! scheduler.advance(1.0 / 60.0);
//!
//! assert_eq!(frames.load(Ordering::Relaxed), 2);
//! ```

use crate::spring::{Spring, SpringConfig};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

new_key_type! {
    /// Handle to a registered spring animation
    pub struct SpringId;
    /// Handle to a registered per-frame callback
    pub struct FrameCallbackId;
}

/// Returned by a frame callback to keep or drop its registration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Done,
}

/// Timing information handed to every frame callback
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameContext {
    /// Seconds since the previous frame
    pub dt: f32,
    /// Milliseconds since the scheduler was created
    pub elapsed_ms: f64,
    /// Frame counter, starting at 1
    pub frame: u64,
}

impl FrameContext {
    pub fn dt_ms(&self) -> f32 {
        self.dt * 1000.0
    }
}

type FrameCallback = Box<dyn FnMut(&FrameContext) -> FrameControl + Send>;

/// Internal state of the animation scheduler
struct SchedulerInner {
    springs: SlotMap<SpringId, Spring>,
    /// `None` while the callback is running
    callbacks: SlotMap<FrameCallbackId, Option<FrameCallback>>,
    last_frame: Instant,
    elapsed_ms: f64,
    frame: u64,
}

fn lock(inner: &Mutex<SchedulerInner>) -> MutexGuard<'_, SchedulerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The animation scheduler that ticks springs and frame callbacks
///
/// Typically owned by the application root; components receive a
/// [`SchedulerHandle`] through their `MotionContext`.
pub struct AnimationScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                springs: SlotMap::with_key(),
                callbacks: SlotMap::with_key(),
                last_frame: Instant::now(),
                elapsed_ms: 0.0,
                frame: 0,
            })),
        }
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Run one frame using the wall clock
    ///
    /// Returns true if anything is still animating.
    pub fn tick(&self) -> bool {
        let dt = {
            let mut inner = lock(&self.inner);
            let now = Instant::now();
            let dt = (now - inner.last_frame).as_secs_f32();
            inner.last_frame = now;
            dt
        };
        self.advance(dt)
    }

    /// Run one frame with an explicit delta in seconds
    ///
    /// Callbacks registered while the frame runs start on the next frame.
    /// Callbacks unregistered while the frame runs are skipped. Returns true
    /// if anything is still animating.
    pub fn advance(&self, dt: f32) -> bool {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let (frame, ids) = {
            let mut inner = lock(&self.inner);
            inner.frame += 1;
            inner.elapsed_ms += f64::from(dt) * 1000.0;

            for (_, spring) in inner.springs.iter_mut() {
                spring.advance(dt);
            }

            let frame = FrameContext {
                dt,
                elapsed_ms: inner.elapsed_ms,
                frame: inner.frame,
            };
            let ids: SmallVec<[FrameCallbackId; 16]> = inner.callbacks.keys().collect();
            (frame, ids)
        };

        for id in ids {
            let taken = match lock(&self.inner).callbacks.get_mut(id) {
                Some(slot) => slot.take(),
                None => {
                    tracing::trace!("frame callback {:?} unregistered mid-frame, skipping", id);
                    continue;
                }
            };
            let Some(mut callback) = taken else {
                continue;
            };

            // Run without the lock so the callback may register or unregister
            let control = callback(&frame);

            let leftover = {
                let mut inner = lock(&self.inner);
                if !inner.callbacks.contains_key(id) {
                    Some(callback)
                } else if control == FrameControl::Continue {
                    inner.callbacks[id] = Some(callback);
                    None
                } else {
                    inner.callbacks.remove(id);
                    Some(callback)
                }
            };
            // Captured state may hold guards that lock the scheduler
            drop(leftover);
        }

        self.has_active_animations()
    }

    /// Check if any springs are moving or any callbacks are registered
    pub fn has_active_animations(&self) -> bool {
        let inner = lock(&self.inner);
        !inner.callbacks.is_empty() || inner.springs.iter().any(|(_, s)| !s.is_settled())
    }

    /// Get the number of registered springs
    pub fn spring_count(&self) -> usize {
        lock(&self.inner).springs.len()
    }

    /// Get the number of registered frame callbacks
    pub fn callback_count(&self) -> usize {
        lock(&self.inner).callbacks.len()
    }

    /// Frames run so far
    pub fn frame(&self) -> u64 {
        lock(&self.inner).frame
    }

    pub fn elapsed_ms(&self) -> f64 {
        lock(&self.inner).elapsed_ms
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the animation scheduler
///
/// This is passed to components that need to register animations.
/// It won't prevent the scheduler from being dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// A handle with no scheduler behind it
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    // =========================================================================
    // Frame callbacks
    // =========================================================================

    /// Register a per-frame callback
    ///
    /// Returns `None` if the scheduler has been dropped.
    pub fn register<F>(&self, callback: F) -> Option<FrameSubscription>
    where
        F: FnMut(&FrameContext) -> FrameControl + Send + 'static,
    {
        let inner = self.inner.upgrade()?;
        let id = lock(&inner).callbacks.insert(Some(Box::new(callback)));
        Some(FrameSubscription {
            scheduler: Arc::downgrade(&inner),
            id: Some(id),
        })
    }

    /// Whether a frame callback is still registered
    pub fn is_registered(&self, id: FrameCallbackId) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| lock(&inner).callbacks.contains_key(id))
    }

    /// Number of registered frame callbacks (0 once the scheduler is gone)
    pub fn callback_count(&self) -> usize {
        self.inner
            .upgrade()
            .map_or(0, |inner| lock(&inner).callbacks.len())
    }

    // =========================================================================
    // Spring Operations
    // =========================================================================

    /// Register a spring and return its ID
    pub fn register_spring(&self, spring: Spring) -> Option<SpringId> {
        self.inner
            .upgrade()
            .map(|inner| lock(&inner).springs.insert(spring))
    }

    /// Update a spring's target
    pub fn set_spring_target(&self, id: SpringId, target: f32) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(spring) = lock(&inner).springs.get_mut(id) {
                spring.set_target(target);
            }
        }
    }

    /// Get current spring value
    pub fn get_spring_value(&self, id: SpringId) -> Option<f32> {
        self.inner
            .upgrade()
            .and_then(|inner| lock(&inner).springs.get(id).map(|s| s.value()))
    }

    /// Check if a spring has settled (at rest at target)
    ///
    /// Returns `true` if the spring doesn't exist (nothing is animating).
    pub fn is_spring_settled(&self, id: SpringId) -> bool {
        self.inner
            .upgrade()
            .and_then(|inner| lock(&inner).springs.get(id).map(|s| s.is_settled()))
            .unwrap_or(true)
    }

    /// Remove a spring
    pub fn remove_spring(&self, id: SpringId) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner).springs.remove(id);
        }
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl Default for SchedulerHandle {
    fn default() -> Self {
        Self::detached()
    }
}

/// Owns one frame callback registration; dropping it unregisters the callback
pub struct FrameSubscription {
    scheduler: Weak<Mutex<SchedulerInner>>,
    id: Option<FrameCallbackId>,
}

impl FrameSubscription {
    pub fn id(&self) -> Option<FrameCallbackId> {
        self.id
    }

    /// Unregister now; the callback never runs again
    pub fn cancel(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        let Some(inner) = self.scheduler.upgrade() else {
            return;
        };
        let removed = lock(&inner).callbacks.remove(id);
        drop(removed);
    }

    /// Whether the callback is still registered
    pub fn is_active(&self) -> bool {
        match (self.id, self.scheduler.upgrade()) {
            (Some(id), Some(inner)) => lock(&inner).callbacks.contains_key(id),
            _ => false,
        }
    }
}

impl Drop for FrameSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for FrameSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSubscription")
            .field("id", &self.id)
            .finish()
    }
}

// ============================================================================
// Animated Value (Spring-based)
// ============================================================================

/// An animated value that registers a spring with the scheduler
///
/// When the target changes, the value smoothly animates to it using spring
/// physics. The spring is removed when the value is dropped.
pub struct AnimatedValue {
    handle: SchedulerHandle,
    spring_id: Option<SpringId>,
    config: SpringConfig,
    current: f32,
    target: f32,
}

impl AnimatedValue {
    /// Create a new animated value with the given initial value
    pub fn new(handle: SchedulerHandle, initial: f32, config: SpringConfig) -> Self {
        // Don't register immediately - only when we have a target change
        Self {
            handle,
            spring_id: None,
            config,
            current: initial,
            target: initial,
        }
    }

    /// Set the target value - starts animation if different from current
    pub fn set_target(&mut self, target: f32) {
        self.target = target;

        if let Some(id) = self.spring_id {
            self.handle.set_spring_target(id, target);
        } else if (target - self.current).abs() > 0.001 {
            let spring = Spring::normalized(self.config, self.current);
            if let Some(id) = self.handle.register_spring(spring) {
                self.spring_id = Some(id);
                self.handle.set_spring_target(id, target);
            } else {
                // No scheduler: nothing can animate, jump
                self.current = target;
            }
        }
    }

    /// Get the current animated value
    pub fn get(&self) -> f32 {
        match self.spring_id {
            Some(id) => self.handle.get_spring_value(id).unwrap_or(self.target),
            None => self.current,
        }
    }

    /// Set value immediately without animation
    pub fn set_immediate(&mut self, value: f32) {
        if let Some(id) = self.spring_id.take() {
            self.handle.remove_spring(id);
        }
        self.current = value;
        self.target = value;
    }

    /// Returns `true` only while the spring is actively moving toward its target
    pub fn is_animating(&self) -> bool {
        self.spring_id
            .is_some_and(|id| !self.handle.is_spring_settled(id))
    }

    /// Get the current target value
    pub fn target(&self) -> f32 {
        self.target
    }
}

impl Drop for AnimatedValue {
    fn drop(&mut self) {
        if let Some(id) = self.spring_id {
            self.handle.remove_spring(id);
        }
    }
}

impl std::fmt::Debug for AnimatedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedValue")
            .field("value", &self.get())
            .field("target", &self.target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    const FRAME: f32 = 1.0 / 60.0;

    fn counting(
        handle: &SchedulerHandle,
        control: FrameControl,
    ) -> (Arc<AtomicU32>, FrameSubscription) {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        let subscription = handle
            .register(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                control
            })
            .unwrap();
        (runs, subscription)
    }

    #[test]
    fn test_callbacks_run_once_per_frame() {
        let scheduler = AnimationScheduler::new();
        let (runs, _subscription) = counting(&scheduler.handle(), FrameControl::Continue);

        for _ in 0..3 {
            scheduler.advance(FRAME);
        }
        assert_eq!(runs.load(Ordering::Relaxed), 3);
        assert_eq!(scheduler.frame(), 3);
    }

    #[test]
    fn test_done_unregisters() {
        let scheduler = AnimationScheduler::new();
        let (runs, subscription) = counting(&scheduler.handle(), FrameControl::Done);

        scheduler.advance(FRAME);
        scheduler.advance(FRAME);
        assert_eq!(runs.load(Ordering::Relaxed), 1);
        assert!(!subscription.is_active());
        assert_eq!(scheduler.callback_count(), 0);
    }

    #[test]
    fn test_drop_subscription_unregisters() {
        let scheduler = AnimationScheduler::new();
        let (runs, subscription) = counting(&scheduler.handle(), FrameControl::Continue);
        assert_eq!(scheduler.callback_count(), 1);

        drop(subscription);
        scheduler.advance(FRAME);
        assert_eq!(runs.load(Ordering::Relaxed), 0);
        assert_eq!(scheduler.callback_count(), 0);
    }

    #[test]
    fn test_callback_can_cancel_another_mid_frame() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let victim_slot: Arc<Mutex<Option<FrameSubscription>>> = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&victim_slot);
        let _killer = handle
            .register(move |_| {
                slot.lock().unwrap().take();
                FrameControl::Continue
            })
            .unwrap();
        let (victim_runs, victim) = counting(&handle, FrameControl::Continue);
        *victim_slot.lock().unwrap() = Some(victim);

        scheduler.advance(FRAME);
        scheduler.advance(FRAME);
        assert_eq!(victim_runs.load(Ordering::Relaxed), 0);
        assert_eq!(scheduler.callback_count(), 1);
    }

    #[test]
    fn test_callback_can_cancel_itself() {
        let scheduler = AnimationScheduler::new();
        let own: Arc<Mutex<Option<FrameSubscription>>> = Arc::new(Mutex::new(None));
        let runs = Arc::new(AtomicU32::new(0));

        let slot = Arc::clone(&own);
        let counter = Arc::clone(&runs);
        let subscription = scheduler
            .handle()
            .register(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                slot.lock().unwrap().take();
                FrameControl::Continue
            })
            .unwrap();
        *own.lock().unwrap() = Some(subscription);

        scheduler.advance(FRAME);
        scheduler.advance(FRAME);
        assert_eq!(runs.load(Ordering::Relaxed), 1);
        assert_eq!(scheduler.callback_count(), 0);
    }

    #[test]
    fn test_registration_during_frame_starts_next_frame() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let spawned: Arc<Mutex<Vec<FrameSubscription>>> = Arc::new(Mutex::new(Vec::new()));
        let runs = Arc::new(AtomicU32::new(0));

        let registry = Arc::clone(&spawned);
        let inner_handle = handle.clone();
        let counter = Arc::clone(&runs);
        let _parent = handle
            .register(move |_| {
                let counter = Arc::clone(&counter);
                if let Some(child) = inner_handle.register(move |_| {
                    counter.fetch_add(1, Ordering::Relaxed);
                    FrameControl::Continue
                }) {
                    registry.lock().unwrap().push(child);
                }
                FrameControl::Done
            })
            .unwrap();

        scheduler.advance(FRAME);
        assert_eq!(runs.load(Ordering::Relaxed), 0);
        scheduler.advance(FRAME);
        assert_eq!(runs.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_frame_context_timing() {
        let scheduler = AnimationScheduler::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _subscription = scheduler
            .handle()
            .register(move |frame| {
                sink.lock().unwrap().push(*frame);
                FrameControl::Continue
            })
            .unwrap();

        scheduler.advance(0.5);
        scheduler.advance(0.25);
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].frame, 1);
        assert_eq!(seen[1].frame, 2);
        assert!((seen[1].elapsed_ms - 750.0).abs() < 1e-6);
        assert!((seen[1].dt_ms() - 250.0).abs() < 1e-3);
    }

    #[test]
    fn test_animated_value() {
        let scheduler = AnimationScheduler::new();
        let mut value = AnimatedValue::new(scheduler.handle(), 1.0, SpringConfig::card());

        assert_eq!(value.get(), 1.0);
        assert!(!value.is_animating());

        value.set_target(1.02);
        assert!(value.is_animating());
        scheduler.advance(FRAME);
        assert!(value.get() > 1.0);

        for _ in 0..300 {
            scheduler.advance(FRAME);
        }
        assert!((value.get() - 1.02).abs() < 1e-3);

        drop(value);
        assert_eq!(scheduler.spring_count(), 0);
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = AnimationScheduler::new();
            scheduler.handle()
        };

        assert!(!handle.is_alive());
        assert!(handle
            .register_spring(Spring::new(SpringConfig::stiff(), 0.0))
            .is_none());
        assert!(handle.register(|_| FrameControl::Continue).is_none());
        assert_eq!(handle.callback_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_scheduler() {
        let scheduler = AnimationScheduler::new();
        let (_runs, subscription) = counting(&scheduler.handle(), FrameControl::Continue);
        drop(scheduler);
        assert!(!subscription.is_active());
        drop(subscription);
    }
}

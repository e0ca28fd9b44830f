//! Spring physics
//!
//! RK4-integrated second-order springs used to smooth raw scroll and pointer
//! signals. The spring state decays toward the latest raw value every frame,
//! so jitter in the raw signal never shows up as visible micro-stutter.

use kinetic_core::SpringSettings;

const MAX_STEP: f32 = 1.0 / 60.0;

/// Longest frame delta simulated by [`Spring::advance`]; stalls beyond it
/// are treated as this long
const MAX_ADVANCE: f32 = 2.0;

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    /// Create a new spring configuration
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Critically damped spring for the given stiffness and mass
    pub fn critically_damped(stiffness: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping: 2.0 * (stiffness * mass).sqrt(),
            mass,
        }
    }

    /// Slow pointer follow used by hero sections
    pub fn hero() -> Self {
        Self::new(50.0, 20.0, 1.0)
    }

    /// Heavier damping used by page headers
    pub fn header() -> Self {
        Self::new(50.0, 25.0, 1.0)
    }

    /// Light, responsive spring for tilt cards
    pub fn card() -> Self {
        Self::new(150.0, 20.0, 0.5)
    }

    /// A stiff, snappy spring (good for buttons)
    pub fn stiff() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }

    /// Calculate critical damping for this spring's stiffness and mass
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }

    /// Check if the spring is overdamped (slow settling, no oscillation)
    pub fn is_overdamped(&self) -> bool {
        self.damping > self.critical_damping()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::hero()
    }
}

impl From<SpringSettings> for SpringConfig {
    fn from(settings: SpringSettings) -> Self {
        Self::new(settings.stiffness, settings.damping, settings.mass)
    }
}

/// A spring-based animator
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
    rest_delta: f32,
    rest_speed: f32,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
            rest_delta: 0.5,
            rest_speed: 5.0,
        }
    }

    /// Settling thresholds; pixel-scale defaults are 0.5 and 5.0/s
    pub fn with_rest_threshold(mut self, delta: f32, speed: f32) -> Self {
        self.rest_delta = delta;
        self.rest_speed = speed;
        self
    }

    /// Spring tuned for normalized signals in `[-0.5, 0.5]` or `[0, 1]`
    pub fn normalized(config: SpringConfig, initial: f32) -> Self {
        Self::new(config, initial).with_rest_threshold(0.0005, 0.005)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump to a value with no velocity
    pub fn snap_to(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Check if the spring has settled (within epsilon of target with minimal velocity)
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < self.rest_delta && self.velocity.abs() < self.rest_speed
    }

    /// Step the spring simulation using RK4 integration
    pub fn step(&mut self, dt: f32) {
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        let k1_v = self.acceleration(self.value, self.velocity);
        let k1_x = self.velocity;

        let k2_v = self.acceleration(
            self.value + k1_x * dt * 0.5,
            self.velocity + k1_v * dt * 0.5,
        );
        let k2_x = self.velocity + k1_v * dt * 0.5;

        let k3_v = self.acceleration(
            self.value + k2_x * dt * 0.5,
            self.velocity + k2_v * dt * 0.5,
        );
        let k3_x = self.velocity + k2_v * dt * 0.5;

        let k4_v = self.acceleration(self.value + k3_x * dt, self.velocity + k3_v * dt);
        let k4_x = self.velocity + k3_v * dt;

        self.velocity += (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * dt / 6.0;
        self.value += (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * dt / 6.0;

        if !self.value.is_finite() || !self.velocity.is_finite() {
            tracing::trace!("spring diverged, snapping to target");
            self.snap_to(self.target);
        }
    }

    /// Step over an arbitrary frame delta in sub-steps of at most 1/60 s
    ///
    /// Deltas longer than two seconds are clamped.
    pub fn advance(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let dt = dt.min(MAX_ADVANCE);

        let steps = (dt / MAX_STEP).ceil().max(1.0) as u32;
        let step = dt / steps as f32;
        for _ in 0..steps {
            self.step(step);
        }
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let spring_force = -self.config.stiffness * (x - self.target);
        let damping_force = -self.config.damping * v;
        (spring_force + damping_force) / self.config.mass.max(f32::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_settles_to_target() {
        let mut spring = Spring::new(SpringConfig::stiff(), 0.0);
        spring.set_target(100.0);

        // Simulate for 2 seconds at 60fps
        for _ in 0..120 {
            spring.step(1.0 / 60.0);
        }

        assert!(spring.is_settled());
        assert!((spring.value() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_normalized_spring_tracks_pointer() {
        let mut spring = Spring::normalized(SpringConfig::hero(), 0.0);
        spring.set_target(0.5);

        for _ in 0..600 {
            spring.step(1.0 / 60.0);
        }

        assert!(spring.is_settled());
        assert!((spring.value() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_spring_inherits_velocity() {
        let mut spring = Spring::new(SpringConfig::card(), 0.0);
        spring.set_target(100.0);

        for _ in 0..10 {
            spring.step(1.0 / 60.0);
        }

        let velocity = spring.velocity();
        assert!(velocity > 0.0);

        // Change target mid-flight - velocity should continue
        spring.set_target(50.0);
        assert_eq!(spring.velocity(), velocity);
    }

    #[test]
    fn test_critically_damped_does_not_overshoot() {
        let config = SpringConfig::critically_damped(120.0, 1.0);
        assert!(!config.is_underdamped());
        let mut spring = Spring::new(config, 0.0);
        spring.set_target(100.0);

        for _ in 0..240 {
            spring.step(1.0 / 60.0);
            assert!(spring.value() <= 100.0 + 0.01);
        }
    }

    #[test]
    fn test_spring_rk4_stability() {
        let mut spring = Spring::new(SpringConfig::stiff(), 0.0);
        spring.set_target(1000.0);

        for _ in 0..100 {
            spring.step(0.1);
            assert!(spring.value() < 2000.0);
            assert!(spring.value() > -500.0);
        }
    }

    #[test]
    fn test_advance_substeps_long_frames() {
        let mut spring = Spring::new(SpringConfig::stiff(), 0.0);
        spring.set_target(100.0);
        spring.advance(2.0);
        assert!(spring.is_settled());
        assert!((spring.value() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_advance_clamps_long_stalls() {
        let mut spring = Spring::new(SpringConfig::stiff(), 0.0);
        spring.set_target(100.0);
        spring.advance(1.0e9);
        assert!(spring.value().is_finite());
        assert!(spring.is_settled());
        assert!((spring.value() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut spring = Spring::new(SpringConfig::stiff(), 0.0);
        spring.set_target(10.0);
        spring.step(f32::NAN);
        spring.step(-1.0);
        assert_eq!(spring.value(), 0.0);
    }

    #[test]
    fn test_config_from_settings() {
        let config: SpringConfig = SpringSettings::default().into();
        assert_eq!(config, SpringConfig::hero());
    }
}

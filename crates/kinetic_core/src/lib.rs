//! Kinetic Core
//!
//! Foundational types for the Kinetic animation engine:
//!
//! - **Capability detection**: performance tiering from host signals behind
//!   the [`CapabilityProvider`] trait
//! - **Animation controller**: the tree-scoped capability query every
//!   animated component consults
//! - **Configuration**: `motion.toml` defaults for reveals, counters,
//!   springs and masks
//! - **Geometry**: viewport-space points, sizes and rectangles
//!
//! # Example
//!
//! ```rust
//! use kinetic_core::{AnimationClass, AnimationController, HostSignals, MotionConfig};
//! use kinetic_core::{CapabilityProvider, Result};
//!
//! struct Desktop;
//!
//! impl CapabilityProvider for Desktop {
//!     fn read_signals(&self) -> Result<HostSignals> {
//!         Ok(HostSignals::desktop())
//!     }
//! }
//!
//! let config = MotionConfig::default();
//! let controller = AnimationController::mount(&Desktop, &config.capability);
//! assert!(controller.should_animate(Some(AnimationClass::ThreeD)));
//! ```

pub mod capability;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;

pub use capability::{
    detect_tier, AnimationClass, CapabilityProfile, CapabilityProvider, DeviceClass, HostSignals,
    PerformanceTier,
};
pub use config::{
    CapabilityConfig, CounterConfig, FallbackPolicy, MaskConfig, MotionConfig, RevealConfig,
    SpringSettings,
};
pub use controller::{AnimationController, DirtyFlag};
pub use error::{MotionError, Result};
pub use geometry::{Color, Point, Rect, Size};

//! Kinetic Animation System
//!
//! Scroll- and pointer-driven motion for content surfaces, degrading by
//! device capability.
//!
//! # Features
//!
//! - **Frame Scheduler**: one callback registry per surface; every per-frame
//!   computation reads committed host state from the same frame
//! - **Signals**: scroll offset, element scroll progress and pointer position,
//!   optionally spring-smoothed, mapped through clamped piecewise mappers
//! - **Viewport Observer**: threshold/margin visibility tracking with
//!   once-semantics
//! - **Reveal Engine**: named entrance presets, stagger groups and dividers
//! - **Timelines**: offset-positioned tweens linked to scroll via triggers
//!   with toggle actions and scrub
//! - **Progress Animator**: one-shot numeric ramps for statistic counters
//! - **Blending Masks**: layered gradient descriptors for hero edges
//! - **Parallax**: depth layers, mouse tilt and ambient zoom
//!
//! Every animated component consults the [`kinetic_core::AnimationController`]
//! carried by its [`MotionContext`] and settles on its rest or final state
//! when its animation class is not allowed.

pub mod context;
pub mod easing;
pub mod mapper;
pub mod marker;
pub mod mask;
pub mod parallax;
pub mod preset;
pub mod progress;
pub mod reveal;
pub mod scheduler;
pub mod scroll_trigger;
pub mod signal;
pub mod spring;
pub mod timeline;
pub mod values;
pub mod viewport;

#[cfg(test)]
mod tests;

pub use context::{watch_reduced_motion, MotionContext};
pub use easing::Easing;
pub use mapper::{map_range, TransformMapper, TransformSet};
pub use marker::{range_progress, Anchor, Marker};
pub use mask::{BlendingMask, GradientStop, Length, MaskLayer, ScrollBlendMask};
pub use parallax::{
    CinematicZoom, DepthLayer, MouseTilt, Parallax, ParallaxOptions, TiltOptions, ZoomOptions,
};
pub use preset::{ClipPath, Keyframe, KeyframePair, MaskDirection, Preset, Transition};
pub use progress::{Counter, CounterOptions, NumberFormat, ProgressAnimation};
pub use reveal::{
    stagger_delay, ArchitecturalDivider, DividerOrientation, Reveal, RevealOptions, RevealPhase,
    RevealState, RevealView, StaggerGroup,
};
pub use scheduler::{
    AnimatedValue, AnimationScheduler, FrameCallbackId, FrameContext, FrameControl,
    FrameSubscription, SchedulerHandle, SpringId,
};
pub use scroll_trigger::{
    MarkerPositions, Scrub, ScrollTrigger, StaggerReveal, ToggleAction, ToggleActions,
    ToggleEvent, TriggerConfig,
};
pub use signal::{
    normalize_pointer, Axis, MappedValue, MappingId, PointerSignal, ScrollProgress, ScrollSignal,
    SignalOptions,
};
pub use spring::{Spring, SpringConfig};
pub use timeline::{PlayDirection, Timeline, TimelineEntryId};
pub use values::{FloatAnimation, Interpolate, TypedKeyframe, TypedKeyframeAnimation};
pub use viewport::{
    intersection_ratio, meets_threshold, InView, MarginValue, Membership, RootMargin,
    ViewportObserver, ViewportOptions,
};

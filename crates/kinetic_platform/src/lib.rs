//! Kinetic Platform Abstraction Layer
//!
//! This crate connects the animation engine to its host environment.
//!
//! # Architecture
//!
//! - [`EventHub`] - records the committed scroll offset, pointer position and
//!   viewport size, and fans host events out to listeners owned by
//!   [`ListenerGuard`]s
//! - [`Element`] - anything the engine can measure (client rectangle)
//! - Capability providers - [`SystemCapabilities`] for native processes,
//!   [`StaticCapabilities`] for headless hosts and tests
//!
//! # Example
//!
//! ```
//! use kinetic_core::{AnimationController, CapabilityConfig, Rect};
//! use kinetic_platform::{Element, EventHub, HostEvent, LayoutBox, SystemCapabilities};
//!
//! let controller = AnimationController::mount(&SystemCapabilities::new(), &CapabilityConfig::default());
//! let hub = EventHub::new(1280.0, 720.0);
//! let hero = LayoutBox::new(&hub, Rect::new(0.0, 0.0, 1280.0, 720.0));
//!
//! hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 200.0 });
//! assert_eq!(hero.client_rect().map(|r| r.y()), Some(-200.0));
//! # let _ = controller;
//! ```

mod capabilities;
mod element;
mod error;
mod event;
mod hub;

pub use capabilities::{
    parse_meminfo_total_gb, StaticCapabilities, SystemCapabilities, ENV_REDUCED_MOTION,
    ENV_SAVE_DATA, ENV_USER_AGENT,
};
pub use element::{Element, ElementHandle, LayoutBox};
pub use error::{PlatformError, Result};
pub use event::{EventKind, HostEvent};
pub use hub::{EventHub, HostState, ListenerCallback, ListenerGuard, ListenerId, WeakEventHub};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::capabilities::{StaticCapabilities, SystemCapabilities};
    pub use crate::element::{Element, ElementHandle, LayoutBox};
    pub use crate::error::{PlatformError, Result};
    pub use crate::event::{EventKind, HostEvent};
    pub use crate::hub::{EventHub, HostState, ListenerGuard};
}

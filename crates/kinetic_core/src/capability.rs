//! Device capability detection
//!
//! Pure tiering logic over host signals. Reading the signals is the job of a
//! [`CapabilityProvider`]; one implementation exists per host platform (see
//! `kinetic_platform`), so everything in this module runs without a real
//! browser or window system.

use crate::error::Result;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Coarse performance classification gating which animation classes run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    #[default]
    High,
    Medium,
    Low,
}

impl PerformanceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTier::High => "high",
            PerformanceTier::Medium => "medium",
            PerformanceTier::Low => "low",
        }
    }
}

/// Animation class tag used by capability queries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationClass {
    /// Scroll/pointer driven depth offsets
    Parallax,
    /// Perspective rotations (tilt cards, hero rotation)
    ThreeD,
    /// Reveal-on-scroll and scroll-linked timelines
    Scroll,
    /// Hover feedback
    Hover,
}

/// Device class sniffed from the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

const MOBILE_USER_AGENT: &str = r"Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini";

fn mobile_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            RegexBuilder::new(MOBILE_USER_AGENT)
                .case_insensitive(true)
                .build()
                .ok()
        })
        .as_ref()
}

impl DeviceClass {
    /// Classify a user agent string
    pub fn from_user_agent(user_agent: &str) -> Self {
        let mobile = match mobile_pattern() {
            Some(pattern) => pattern.is_match(user_agent),
            None => {
                let lower = user_agent.to_ascii_lowercase();
                MOBILE_USER_AGENT
                    .split('|')
                    .any(|token| lower.contains(&token.to_ascii_lowercase()))
            }
        };

        if mobile {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Raw host capability hints
///
/// `None` means the hint could not be read on this host.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSignals {
    /// Logical CPU count
    pub hardware_concurrency: Option<u32>,
    /// Approximate device memory in gigabytes
    pub device_memory_gb: Option<f32>,
    /// Connection "save data" hint
    pub save_data: Option<bool>,
    /// Coarse device class
    pub device_class: Option<DeviceClass>,
    /// Reduced motion preference at startup
    pub prefers_reduced_motion: Option<bool>,
    /// Whether the host can report element visibility
    pub supports_intersection: bool,
}

impl HostSignals {
    /// Signals of a capable desktop host with every hint available
    pub fn desktop() -> Self {
        Self {
            hardware_concurrency: Some(8),
            device_memory_gb: Some(8.0),
            save_data: Some(false),
            device_class: Some(DeviceClass::Desktop),
            prefers_reduced_motion: Some(false),
            supports_intersection: true,
        }
    }

    /// True when every static tiering hint could be read
    pub fn is_complete(&self) -> bool {
        self.hardware_concurrency.is_some()
            && self.device_memory_gb.is_some()
            && self.save_data.is_some()
            && self.device_class.is_some()
    }
}

/// Derive the performance tier from host signals
///
/// Any low-end indicator wins. Otherwise a mobile device, or any hint that
/// could not be read, caps the tier at [`PerformanceTier::Medium`].
pub fn detect_tier(signals: &HostSignals) -> PerformanceTier {
    let save_data = signals.save_data == Some(true);
    let low_memory = signals.device_memory_gb.is_some_and(|gb| gb < 4.0);
    let few_cores = signals.hardware_concurrency.is_some_and(|cores| cores < 4);

    if save_data || low_memory || few_cores {
        return PerformanceTier::Low;
    }

    if signals.device_class == Some(DeviceClass::Mobile) || !signals.is_complete() {
        return PerformanceTier::Medium;
    }

    PerformanceTier::High
}

/// Snapshot of the capability state used by every capability query
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    pub reduced_motion: bool,
    pub tier: PerformanceTier,
    /// Global kill-switch
    pub enabled: bool,
}

impl Default for CapabilityProfile {
    /// Pre-hydration profile: full capability, no reduced motion
    fn default() -> Self {
        Self {
            reduced_motion: false,
            tier: PerformanceTier::High,
            enabled: true,
        }
    }
}

impl CapabilityProfile {
    /// Build a profile from host signals
    pub fn from_signals(signals: &HostSignals) -> Self {
        Self {
            reduced_motion: signals.prefers_reduced_motion.unwrap_or(false),
            tier: detect_tier(signals),
            enabled: true,
        }
    }

    /// Whether an animation of the given class may run
    pub fn allows(&self, class: Option<AnimationClass>) -> bool {
        if !self.enabled || self.reduced_motion {
            return false;
        }

        match class {
            Some(AnimationClass::ThreeD) => self.tier == PerformanceTier::High,
            Some(AnimationClass::Parallax) => self.tier != PerformanceTier::Low,
            Some(AnimationClass::Scroll) | Some(AnimationClass::Hover) | None => true,
        }
    }
}

/// Source of host capability signals
///
/// Reads must be synchronous and free of side effects. Returning an error
/// means the host cannot supply any signals yet (e.g. a non-interactive
/// render); individual hints that fail are reported as `None` instead.
pub trait CapabilityProvider {
    /// Read the current host signals
    fn read_signals(&self) -> Result<HostSignals>;

    /// Provider name for diagnostics
    fn name(&self) -> &str {
        "host"
    }
}

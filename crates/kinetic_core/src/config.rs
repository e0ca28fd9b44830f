//! Motion configuration
//!
//! `motion.toml` carries the site-wide defaults for every animation
//! component. All sections are optional:
//!
//! ```toml
//! [capability]
//! fallback = "optimistic"
//!
//! [reveal]
//! duration_ms = 600
//! root_margin = "-20% 0px -20% 0px"
//!
//! [spring]
//! stiffness = 50.0
//! damping = 20.0
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level motion configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MotionConfig {
    #[serde(default)]
    pub capability: CapabilityConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub counter: CounterConfig,
    #[serde(default)]
    pub spring: SpringSettings,
    #[serde(default)]
    pub mask: MaskConfig,
}

impl MotionConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!("loaded motion config from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    /// or invalid
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("using default motion config: {}", err);
                Self::default()
            }
        }
    }
}

/// What to assume before live capability signals are available
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Assume full capability so first paint is animation-ready
    #[default]
    Optimistic,
    /// Assume a medium tier until signals arrive
    Conservative,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CapabilityConfig {
    #[serde(default)]
    pub fallback: FallbackPolicy,
    /// Initial value of the global kill-switch
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::default(),
            enabled: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RevealConfig {
    #[serde(default = "default_reveal_duration")]
    pub duration_ms: u32,
    #[serde(default)]
    pub delay_ms: u32,
    #[serde(default = "default_stagger")]
    pub stagger_ms: u32,
    /// Visible proportion required before triggering (0.0 = any overlap)
    #[serde(default)]
    pub threshold: f32,
    #[serde(default = "default_reveal_margin")]
    pub root_margin: String,
    #[serde(default = "default_true")]
    pub once: bool,
}

fn default_true() -> bool {
    true
}

fn default_reveal_duration() -> u32 {
    600
}

fn default_stagger() -> u32 {
    100
}

fn default_reveal_margin() -> String {
    "-20% 0px -20% 0px".to_string()
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_reveal_duration(),
            delay_ms: 0,
            stagger_ms: default_stagger(),
            threshold: 0.0,
            root_margin: default_reveal_margin(),
            once: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CounterConfig {
    #[serde(default = "default_counter_duration")]
    pub duration_ms: u32,
    #[serde(default = "default_counter_margin")]
    pub root_margin: String,
}

fn default_counter_duration() -> u32 {
    2000
}

fn default_counter_margin() -> String {
    "-50px".to_string()
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_counter_duration(),
            root_margin: default_counter_margin(),
        }
    }
}

/// Spring parameters for smoothed pointer signals
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct SpringSettings {
    #[serde(default = "default_stiffness")]
    pub stiffness: f32,
    #[serde(default = "default_damping")]
    pub damping: f32,
    #[serde(default = "default_mass")]
    pub mass: f32,
}

fn default_stiffness() -> f32 {
    50.0
}

fn default_damping() -> f32 {
    20.0
}

fn default_mass() -> f32 {
    1.0
}

impl Default for SpringSettings {
    fn default() -> Self {
        Self {
            stiffness: default_stiffness(),
            damping: default_damping(),
            mass: default_mass(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MaskConfig {
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default = "default_mask_height")]
    pub height: String,
    #[serde(default = "default_noise_opacity")]
    pub noise_opacity: f32,
    #[serde(default = "default_blur_amount")]
    pub blur_amount: f32,
}

fn default_intensity() -> f32 {
    1.0
}

fn default_mask_height() -> String {
    "40vh".to_string()
}

fn default_noise_opacity() -> f32 {
    0.03
}

fn default_blur_amount() -> f32 {
    2.0
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            intensity: default_intensity(),
            height: default_mask_height(),
            noise_opacity: default_noise_opacity(),
            blur_amount: default_blur_amount(),
        }
    }
}

//! Capability providers
//!
//! Concrete [`CapabilityProvider`] implementations. Each one only performs
//! synchronous, side-effect-free reads; a hint that cannot be read is
//! reported as `None` and tiered conservatively by `kinetic_core`.

use crate::error::PlatformError;
use kinetic_core::{CapabilityProvider, DeviceClass, HostSignals};

/// Environment variable forcing the save-data hint
pub const ENV_SAVE_DATA: &str = "KINETIC_SAVE_DATA";
/// Environment variable carrying the reduced motion preference
pub const ENV_REDUCED_MOTION: &str = "KINETIC_REDUCED_MOTION";
/// Environment variable overriding the user agent used for device sniffing
pub const ENV_USER_AGENT: &str = "KINETIC_USER_AGENT";

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Capabilities of the native process the engine runs in
pub struct SystemCapabilities {
    env: EnvLookup,
}

impl SystemCapabilities {
    /// Read hints from the process environment
    pub fn new() -> Self {
        Self {
            env: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Read hints through a custom environment lookup
    pub fn with_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            env: Box::new(lookup),
        }
    }

    fn env_flag(&self, name: &str) -> Result<Option<bool>, PlatformError> {
        let Some(raw) = (self.env)(name) else {
            return Ok(None);
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" | "reduce" => Ok(Some(true)),
            "0" | "false" | "no" | "off" | "no-preference" => Ok(Some(false)),
            _ => Err(PlatformError::InvalidHint {
                name: name.to_string(),
                value: raw,
            }),
        }
    }

    fn flag_or_none(&self, name: &str) -> Option<bool> {
        match self.env_flag(name) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("ignoring host hint: {}", err);
                None
            }
        }
    }

    fn device_class(&self) -> DeviceClass {
        if let Some(user_agent) = (self.env)(ENV_USER_AGENT) {
            return DeviceClass::from_user_agent(&user_agent);
        }

        if cfg!(any(target_os = "android", target_os = "ios")) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

impl Default for SystemCapabilities {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "linux")]
fn device_memory_gb() -> Option<f32> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo_total_gb(&meminfo)
}

#[cfg(not(target_os = "linux"))]
fn device_memory_gb() -> Option<f32> {
    None
}

/// Parse the `MemTotal` line of `/proc/meminfo` into gigabytes
pub fn parse_meminfo_total_gb(meminfo: &str) -> Option<f32> {
    let line = meminfo.lines().find(|line| line.starts_with("MemTotal:"))?;
    let kib: f64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some((kib / (1024.0 * 1024.0)) as f32)
}

impl CapabilityProvider for SystemCapabilities {
    fn read_signals(&self) -> kinetic_core::Result<HostSignals> {
        let hardware_concurrency = std::thread::available_parallelism()
            .ok()
            .map(|cores| cores.get() as u32);

        // Absence of the variable means the user did not ask to save data
        let save_data = match self.env_flag(ENV_SAVE_DATA) {
            Ok(value) => Some(value.unwrap_or(false)),
            Err(err) => {
                tracing::warn!("ignoring host hint: {}", err);
                None
            }
        };

        Ok(HostSignals {
            hardware_concurrency,
            device_memory_gb: device_memory_gb(),
            save_data,
            device_class: Some(self.device_class()),
            prefers_reduced_motion: self.flag_or_none(ENV_REDUCED_MOTION),
            supports_intersection: true,
        })
    }

    fn name(&self) -> &str {
        "system"
    }
}

/// Fixed capabilities, for headless hosts, server rendering and tests
#[derive(Clone, Debug, Default)]
pub struct StaticCapabilities {
    signals: Option<HostSignals>,
}

impl StaticCapabilities {
    pub fn new(signals: HostSignals) -> Self {
        Self {
            signals: Some(signals),
        }
    }

    /// A host that cannot supply signals (non-interactive render)
    pub fn unavailable() -> Self {
        Self { signals: None }
    }
}

impl CapabilityProvider for StaticCapabilities {
    fn read_signals(&self) -> kinetic_core::Result<HostSignals> {
        self.signals.clone().ok_or_else(|| {
            PlatformError::Unavailable("static host has no live signals".to_string()).into()
        })
    }

    fn name(&self) -> &str {
        "static"
    }
}

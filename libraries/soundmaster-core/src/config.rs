//! Tunables shared by every context
//!
//! Defaults reproduce the shipped extension. A JSON document can override any
//! subset of fields:
//!
//! ```rust
//! use soundmaster_core::BoostConfig;
//!
//! let config = BoostConfig::from_json(r#"{ "snap": { "threshold": 5 } }"#).unwrap();
//! assert_eq!(config.snap.threshold, 5);
//! assert_eq!(config.max_volume, 300);
//! ```

use crate::error::{CoreError, Result};
use crate::types::{DEFAULT_CUSTOM_BUTTONS, DEFAULT_GLOBAL_VOLUME};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables shared by every extension context
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoostConfig {
    /// Global volume written on install and on every environment startup
    #[serde(default = "default_global_volume")]
    pub default_global_volume: u32,

    /// Upper end of the volume slider and of editable quick buttons
    #[serde(default = "default_max_volume")]
    pub max_volume: u32,

    /// Slider detents
    #[serde(default)]
    pub snap: SnapSettings,

    /// Page agent and delivery delays
    #[serde(default)]
    pub timing: TimingSettings,

    /// Quick-button values used until the user saves their own
    #[serde(default = "default_custom_buttons")]
    pub default_custom_buttons: [u32; 3],
}

/// Magnetic detents of the volume slider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SnapSettings {
    /// Volumes the slider snaps to
    #[serde(default = "default_snap_targets")]
    pub targets: Vec<u32>,

    /// Distance (percentage points) below which input snaps to a target
    #[serde(default = "default_snap_threshold")]
    pub threshold: u32,
}

/// Delays in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimingSettings {
    /// Delay between resolving a page's volume and the first full application
    #[serde(default = "default_initial_apply_delay_ms")]
    pub initial_apply_delay_ms: u64,

    /// Delay after the page load event before re-applying to late media
    #[serde(default = "default_late_load_delay_ms")]
    pub late_load_delay_ms: u64,

    /// Delay between injecting a page agent and retrying a message
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_global_volume() -> u32 {
    DEFAULT_GLOBAL_VOLUME
}

fn default_max_volume() -> u32 {
    300
}

fn default_custom_buttons() -> [u32; 3] {
    DEFAULT_CUSTOM_BUTTONS
}

fn default_snap_targets() -> Vec<u32> {
    vec![0, 50, 100, 150, 200, 250, 300]
}

fn default_snap_threshold() -> u32 {
    3
}

fn default_initial_apply_delay_ms() -> u64 {
    1000
}

fn default_late_load_delay_ms() -> u64 {
    500
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            default_global_volume: default_global_volume(),
            max_volume: default_max_volume(),
            snap: SnapSettings::default(),
            timing: TimingSettings::default(),
            default_custom_buttons: default_custom_buttons(),
        }
    }
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            targets: default_snap_targets(),
            threshold: default_snap_threshold(),
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            initial_apply_delay_ms: default_initial_apply_delay_ms(),
            late_load_delay_ms: default_late_load_delay_ms(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl TimingSettings {
    /// See [`TimingSettings::initial_apply_delay_ms`]
    pub fn initial_apply_delay(&self) -> Duration {
        Duration::from_millis(self.initial_apply_delay_ms)
    }

    /// See [`TimingSettings::late_load_delay_ms`]
    pub fn late_load_delay(&self) -> Duration {
        Duration::from_millis(self.late_load_delay_ms)
    }

    /// See [`TimingSettings::retry_delay_ms`]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl BoostConfig {
    /// Layer a JSON document over the defaults and validate the result
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Json))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.max_volume == 0 {
            return Err(CoreError::config("max_volume must be greater than zero"));
        }

        if self.snap.targets.is_empty() {
            return Err(CoreError::config("snap.targets must not be empty"));
        }

        if let Some(button) = self
            .default_custom_buttons
            .iter()
            .find(|value| !self.is_valid_button_value(**value))
        {
            return Err(CoreError::config(format!(
                "default custom button {button} outside 1..={}",
                self.max_volume
            )));
        }

        Ok(())
    }

    /// Whether `value` is accepted for an editable quick button
    pub fn is_valid_button_value(&self, value: u32) -> bool {
        (1..=self.max_volume).contains(&value)
    }
}

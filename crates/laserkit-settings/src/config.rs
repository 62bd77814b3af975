//! Device configuration
//!
//! A typed configuration struct enumerating every recognized option and
//! its effect, validated at construction time. Replaces the string-keyed
//! attribute bags older drivers carried: unknown keys are a deserialization
//! error, out-of-range values never reach the driver.
//!
//! Supports TOML and JSON files; the format is chosen by file extension.

use laserkit_core::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete configuration of one laser device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DeviceConfig {
    /// Serial port name, or "auto" to probe the first candidate port
    pub port: String,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Usable bed width in millimeters
    pub bed_width_mm: f64,
    /// Usable bed height in millimeters
    pub bed_height_mm: f64,
    /// Feed rate for travel moves, mm/min
    pub max_travel_rate: f64,
    /// Maximum cutting feed rate, mm/min; per-segment speed percentages
    /// scale this value
    pub max_cut_rate: f64,
    /// Comma-separated command lines sent before the first part
    pub pre_job_gcode: String,
    /// Comma-separated command lines sent after the last part
    pub post_job_gcode: String,
    /// The controller banner must start with this; empty skips
    /// identification
    pub identification_prefix: String,
    /// Seconds to wait for an auto-resetting board; 0 sends a soft reset
    /// instead
    pub reset_wait_secs: u64,
    /// Run the homing cycle ($H) during initialization and consume the
    /// homing notice after the banner
    pub homing: bool,
    /// Block for the per-line acknowledgment (disable only for
    /// simulators)
    pub wait_for_ack: bool,
    /// Give up waiting for an acknowledgment after this many
    /// milliseconds; absent waits indefinitely
    pub ack_timeout_ms: Option<u64>,
    /// Raster/vector resolutions the device supports, dots per inch
    pub resolutions_dpi: Vec<f64>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: "auto".to_string(),
            baud_rate: 115200,
            bed_width_mm: 300.0,
            bed_height_mm: 300.0,
            max_travel_rate: 20.0 * 60.0,
            max_cut_rate: 100.0 * 60.0,
            // mm mode, absolute positioning, origin to current position
            pre_job_gcode: "G21,G90,G10 P0 L20 X0,G10 L20 Y0".to_string(),
            post_job_gcode: "G0 X0 Y0".to_string(),
            identification_prefix: "Grbl".to_string(),
            reset_wait_secs: 5,
            homing: false,
            wait_for_ack: true,
            ack_timeout_ms: None,
            resolutions_dpi: vec![500.0],
        }
    }
}

impl DeviceConfig {
    /// Validate the configuration.
    ///
    /// Returns the first violation found. A default configuration always
    /// validates.
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn positive(setting: &'static str, value: f64) -> Result<(), SettingsError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(SettingsError::InvalidValue {
                    setting,
                    reason: format!("must be a positive number, got {}", value),
                })
            }
        }

        if self.port.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                setting: "port",
                reason: "must not be empty (use \"auto\" for detection)".to_string(),
            });
        }
        if self.baud_rate == 0 {
            return Err(SettingsError::InvalidValue {
                setting: "baud_rate",
                reason: "must be non-zero".to_string(),
            });
        }
        positive("bed_width_mm", self.bed_width_mm)?;
        positive("bed_height_mm", self.bed_height_mm)?;
        positive("max_travel_rate", self.max_travel_rate)?;
        positive("max_cut_rate", self.max_cut_rate)?;
        if self.resolutions_dpi.is_empty() {
            return Err(SettingsError::InvalidValue {
                setting: "resolutions_dpi",
                reason: "at least one resolution is required".to_string(),
            });
        }
        for &dpi in &self.resolutions_dpi {
            positive("resolutions_dpi", dpi)?;
        }
        Ok(())
    }

    /// Command lines of the pre-job sequence, in order.
    pub fn pre_job_lines(&self) -> impl Iterator<Item = &str> {
        split_gcode_list(&self.pre_job_gcode)
    }

    /// Command lines of the post-job sequence, in order.
    pub fn post_job_lines(&self) -> impl Iterator<Item = &str> {
        split_gcode_list(&self.post_job_gcode)
    }

    /// Load and validate a configuration file (TOML or JSON by
    /// extension).
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        let config: DeviceConfig = if is_json(path) {
            serde_json::from_str(&text).map_err(|e| SettingsError::Parse {
                reason: e.to_string(),
            })?
        } else {
            toml::from_str(&text).map_err(|e| SettingsError::Parse {
                reason: e.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration (TOML or JSON by extension).
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        let text = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse {
                reason: e.to_string(),
            })?
        } else {
            toml::to_string_pretty(self).map_err(|e| SettingsError::Parse {
                reason: e.to_string(),
            })?
        };
        std::fs::write(path, text)?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn split_gcode_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

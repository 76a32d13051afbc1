//! CLI configuration management

use anyhow::{Context, Result, anyhow};
use camera::{DeviceSelector, OpenOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub general: GeneralSettings,
    /// Camera to open when none is given on the command line
    #[serde(default)]
    pub device: DeviceSettings,
    #[serde(default)]
    pub usb: UsbSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Device selection, as `0x`-prefixed hex strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Takes precedence over vendor/product ids when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbSettings {
    /// Control transfer timeout in milliseconds
    #[serde(default = "UsbSettings::default_timeout_ms")]
    pub timeout_ms: u64,
    /// Detach uvcvideo before claiming the control interface
    #[serde(default)]
    pub detach_kernel_driver: bool,
    /// Override for the camera terminal id found in the descriptors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_terminal_id: Option<u8>,
    /// Override for the processing unit id found in the descriptors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_unit_id: Option<u8>,
}

impl Default for UsbSettings {
    fn default() -> Self {
        Self {
            timeout_ms: Self::default_timeout_ms(),
            detach_kernel_driver: false,
            camera_terminal_id: None,
            processing_unit_id: None,
        }
    }
}

impl UsbSettings {
    fn default_timeout_ms() -> u64 {
        camera::usb::DEFAULT_TIMEOUT.as_millis() as u64
    }
}

impl CliConfig {
    /// Load configuration from `path`, or from the default location
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()),
            None => {
                let default = Self::default_path();
                if !default.exists() {
                    return Err(anyhow!("No configuration file found, using defaults"));
                }
                default
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: CliConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;

        tracing::debug!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("uvc-ctl").join("config.toml")
        } else {
            PathBuf::from(".config/uvc-ctl/config.toml")
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.general.log_level,
                valid_levels.join(", ")
            ));
        }

        match (&self.device.vendor_id, &self.device.product_id) {
            (Some(vid), Some(pid)) => {
                parse_hex_u16(vid).map_err(|e| anyhow!("Invalid vendor_id: {}", e))?;
                parse_hex_u16(pid).map_err(|e| anyhow!("Invalid product_id: {}", e))?;
            }
            (None, None) => {}
            _ => {
                return Err(anyhow!("vendor_id and product_id must be given together"));
            }
        }

        if let Some(location) = &self.device.location_id {
            parse_hex_u32(location).map_err(|e| anyhow!("Invalid location_id: {}", e))?;
        }

        if self.usb.timeout_ms == 0 {
            return Err(anyhow!("timeout_ms must be greater than 0"));
        }

        Ok(())
    }

    /// Camera named by the `[device]` section, if any
    pub fn selector(&self) -> Result<Option<DeviceSelector>> {
        if let Some(location) = &self.device.location_id {
            return Ok(Some(DeviceSelector::Location(
                parse_hex_u32(location).map_err(|e| anyhow!(e))?,
            )));
        }

        match (&self.device.vendor_id, &self.device.product_id) {
            (Some(vid), Some(pid)) => Ok(Some(DeviceSelector::Ids {
                vendor_id: parse_hex_u16(vid).map_err(|e| anyhow!(e))?,
                product_id: parse_hex_u16(pid).map_err(|e| anyhow!(e))?,
            })),
            _ => Ok(None),
        }
    }

    /// Open options built from the `[usb]` section
    ///
    /// Unit ids left unset keep whatever the device's descriptors report.
    pub fn open_options(&self) -> OpenOptions {
        OpenOptions {
            timeout: Duration::from_millis(self.usb.timeout_ms),
            detach_kernel_driver: self.usb.detach_kernel_driver,
            camera_terminal: self.usb.camera_terminal_id,
            processing_unit: self.usb.processing_unit_id,
        }
    }
}

/// Parse a `0x`-prefixed 16-bit id
pub fn parse_hex_u16(id: &str) -> std::result::Result<u16, String> {
    let digits = hex_digits(id, 4)?;
    u16::from_str_radix(digits, 16).map_err(|_| format!("'{}' is not a valid hex number", id))
}

/// Parse a `0x`-prefixed 32-bit id
pub fn parse_hex_u32(id: &str) -> std::result::Result<u32, String> {
    let digits = hex_digits(id, 8)?;
    u32::from_str_radix(digits, 16).map_err(|_| format!("'{}' is not a valid hex number", id))
}

fn hex_digits(id: &str, max_digits: usize) -> std::result::Result<&str, String> {
    let digits = id
        .strip_prefix("0x")
        .or_else(|| id.strip_prefix("0X"))
        .ok_or_else(|| format!("'{}' must start with '0x' (e.g., '0x1234')", id))?;

    if digits.is_empty() || digits.len() > max_digits {
        return Err(format!("'{}' must have 1-{} hex digits", id, max_digits));
    }
    Ok(digits)
}

//! Configuration loading and types for clickmute
//!
//! Configuration is loaded in layers:
//! 1. Built-in defaults
//! 2. Config file (~/.config/clickmute/config.toml)
//! 3. Environment variables (CLICKMUTE_*)
//! 4. CLI arguments (highest priority)
//!
//! The result is immutable once the daemon starts; components receive
//! the sections they need by reference at construction.

use crate::error::ClickmuteError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound on `[mute] timeout_secs`; shutdown waits at most this long
pub const MAX_MUTE_TIMEOUT_SECS: u64 = 5;

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = r#"# Clickmute Configuration
#
# Location: ~/.config/clickmute/config.toml
# All settings can be overridden via CLI flags

[device]
# Physical pointer device to grab. Find yours with: clickmute devices
# Prefer a stable /dev/input/by-id/*-event-mouse path over eventN.
path = "/dev/input/event3"

# Button that acts as the push-to-talk trigger
# Common choices: BTN_SIDE, BTN_EXTRA, BTN_FORWARD, BTN_BACK, BTN_MIDDLE
# A raw key code (e.g. 275) is also accepted
key = "BTN_SIDE"

# Name of the virtual device that re-emits every other event
mirror_name = "clickmute-mirror"

[mute]
# Command used to toggle the microphone. Invoked as:
#   <command> <subcommand> <audio_device> 1|0
command = "wpctl"
subcommand = "set-mute"

# Audio source to mute. List IDs with: wpctl status
audio_device = "@DEFAULT_AUDIO_SOURCE@"

# Give up on a single mute command after this many seconds (1-5)
timeout_secs = 5
"#;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub mute: MuteConfig,
}

/// Physical and virtual input device configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Path to the evdev node of the pointer device
    pub path: PathBuf,

    /// Trigger button name (evdev BTN_*/KEY_* name) or numeric code
    pub key: String,

    /// Name advertised by the uinput passthrough device
    pub mirror_name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/dev/input/event3"),
            key: "BTN_SIDE".to_string(),
            mirror_name: "clickmute-mirror".to_string(),
        }
    }
}

/// External mute command configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MuteConfig {
    /// Program to run (resolved through PATH)
    pub command: String,

    /// First argument passed to the program
    pub subcommand: String,

    /// Audio device identifier passed after the subcommand
    pub audio_device: String,

    /// Bound on a single invocation, in seconds
    pub timeout_secs: u64,
}

impl Default for MuteConfig {
    fn default() -> Self {
        Self {
            command: "wpctl".to_string(),
            subcommand: "set-mute".to_string(),
            audio_device: "@DEFAULT_AUDIO_SOURCE@".to_string(),
            timeout_secs: 5,
        }
    }
}

impl MuteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "clickmute")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply CLICKMUTE_* overrides using the given variable lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("CLICKMUTE_DEVICE") {
            self.device.path = PathBuf::from(path);
        }
        if let Some(key) = lookup("CLICKMUTE_KEY") {
            self.device.key = key;
        }
        if let Some(id) = lookup("CLICKMUTE_AUDIO_DEVICE") {
            self.mute.audio_device = id;
        }
    }

    fn validate(&self) -> Result<(), ClickmuteError> {
        if self.mute.command.trim().is_empty() {
            return Err(ClickmuteError::Config("[mute] command is empty".to_string()));
        }
        if !(1..=MAX_MUTE_TIMEOUT_SECS).contains(&self.mute.timeout_secs) {
            return Err(ClickmuteError::Config(format!(
                "[mute] timeout_secs must be between 1 and {}, got {}",
                MAX_MUTE_TIMEOUT_SECS, self.mute.timeout_secs
            )));
        }
        Ok(())
    }
}

/// Load configuration from file, with fallback to defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, ClickmuteError> {
    // Start with defaults
    let mut config = Config::default();

    let config_path = path.map(PathBuf::from).or_else(Config::default_path);

    if let Some(ref path) = config_path {
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ClickmuteError::Config(format!("Failed to read config: {}", e)))?;

            config = toml::from_str(&contents)?;
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
        }
    }

    config.apply_env(|name| std::env::var(name).ok());
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.device.path, PathBuf::from("/dev/input/event3"));
        assert_eq!(config.device.key, "BTN_SIDE");
        assert_eq!(config.mute.command, "wpctl");
        assert_eq!(config.mute.subcommand, "set-mute");
        assert_eq!(config.mute.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_template_matches_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.device.path, defaults.device.path);
        assert_eq!(parsed.device.key, defaults.device.key);
        assert_eq!(parsed.device.mirror_name, defaults.device.mirror_name);
        assert_eq!(parsed.mute.audio_device, defaults.mute.audio_device);
        assert_eq!(parsed.mute.timeout_secs, defaults.mute.timeout_secs);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
            [device]
            path = "/dev/input/by-id/usb-Logitech_G502-event-mouse"

            [mute]
            audio_device = "116"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.device.path,
            PathBuf::from("/dev/input/by-id/usb-Logitech_G502-event-mouse")
        );
        assert_eq!(config.device.key, "BTN_SIDE"); // default
        assert_eq!(config.mute.audio_device, "116");
        assert_eq!(config.mute.command, "wpctl"); // default
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CLICKMUTE_DEVICE", "/dev/input/event7"),
            ("CLICKMUTE_AUDIO_DEVICE", "42"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.device.path, PathBuf::from("/dev/input/event7"));
        assert_eq!(config.device.key, "BTN_SIDE");
        assert_eq!(config.mute.audio_device, "42");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[device]\nkey = \"BTN_EXTRA\"\n\n[mute]\ntimeout_secs = 2").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.device.key, "BTN_EXTRA");
        assert_eq!(config.mute.timeout_secs, 2);
    }

    #[test]
    fn test_load_config_rejects_zero_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mute]\ntimeout_secs = 0").unwrap();

        assert!(matches!(
            load_config(Some(file.path())),
            Err(ClickmuteError::Config(_))
        ));
    }

    #[test]
    fn test_load_config_rejects_long_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mute]\ntimeout_secs = 3600").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("between 1 and 5"));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[device\npath = ").unwrap();

        assert!(load_config(Some(file.path())).is_err());
    }
}

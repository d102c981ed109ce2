//! Physical device acquisition
//!
//! Opens the configured evdev node, grabs it (EVIOCGRAB) so the rest of
//! the system stops seeing its events, and reads events through evdev's
//! tokio stream so the read can be raced against shutdown signals.
//!
//! Closing drops the file descriptor, which also releases the grab.

use super::{AbsAxis, Capabilities, EventSource, InputEvent};
use crate::error::DeviceError;
use evdev::{Device, EventStream};
use std::path::{Path, PathBuf};

/// Exclusively owned physical input device
pub struct PhysicalDevice {
    path: PathBuf,
    name: String,
    capabilities: Capabilities,
    /// Open handle before the grab
    device: Option<Device>,
    /// Event stream after the grab; owns the same handle
    stream: Option<EventStream>,
}

impl PhysicalDevice {
    /// Open the device node and enumerate its capabilities
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        let shown = path.display().to_string();

        if !path.exists() {
            return Err(DeviceError::NotFound(shown));
        }

        let device = Device::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                DeviceError::PermissionDenied(shown.clone())
            } else {
                DeviceError::Open {
                    path: shown.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let name = device.name().unwrap_or("unknown").to_string();
        let capabilities = read_capabilities(&device);

        tracing::info!("Opened device: {} ({})", name, shown);
        tracing::debug!("Device capabilities: {}", capabilities.summary());

        Ok(Self {
            path: path.to_path_buf(),
            name,
            capabilities,
            device: Some(device),
            stream: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Take exclusive delivery of the device's events
    pub fn grab(&mut self) -> Result<(), DeviceError> {
        let grab_error = |reason: String| DeviceError::Grab {
            path: self.path.display().to_string(),
            reason,
        };

        let mut device = self
            .device
            .take()
            .ok_or_else(|| grab_error("device is not open".to_string()))?;

        if let Err(e) = device.grab() {
            // Keep the handle so close() still releases it
            self.device = Some(device);
            return Err(grab_error(e.to_string()));
        }

        // into_event_stream switches the fd to non-blocking and registers it with tokio
        let stream = device
            .into_event_stream()
            .map_err(|e| grab_error(e.to_string()))?;
        self.stream = Some(stream);

        tracing::info!("Device {:?} grabbed", self.path);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some() || self.stream.is_some()
    }
}

#[async_trait::async_trait]
impl EventSource for PhysicalDevice {
    async fn next_event(&mut self) -> Result<Option<InputEvent>, DeviceError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| DeviceError::Read("device is not grabbed".to_string()))?;

        let event = stream
            .next_event()
            .await
            .map_err(|e| DeviceError::Read(format!("{:?}: {}", self.path, e)))?;

        Ok(Some(InputEvent::from(event)))
    }

    fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        tracing::info!("Closing input device {:?}", self.path);
        self.stream = None;
        self.device = None;
    }
}

impl Drop for PhysicalDevice {
    fn drop(&mut self) {
        self.close();
    }
}

/// Enumerate the device's declared event codes, with axis metadata
fn read_capabilities(device: &Device) -> Capabilities {
    let mut caps = Capabilities::default();

    if let Some(keys) = device.supported_keys() {
        caps.keys = keys.iter().map(|k| k.code()).collect();
    }

    if let Some(axes) = device.supported_relative_axes() {
        caps.relative_axes = axes.iter().map(|a| a.0).collect();
    }

    if let Some(axes) = device.supported_absolute_axes() {
        match device.get_abs_state() {
            Ok(state) => {
                caps.absolute_axes = axes
                    .iter()
                    .filter_map(|axis| {
                        state.get(axis.0 as usize).map(|info| AbsAxis {
                            code: axis.0,
                            value: info.value,
                            minimum: info.minimum,
                            maximum: info.maximum,
                            fuzz: info.fuzz,
                            flat: info.flat,
                            resolution: info.resolution,
                        })
                    })
                    .collect();
            }
            Err(e) => {
                tracing::warn!("Failed to read absolute axis info: {}", e);
            }
        }
    }

    if let Some(switches) = device.supported_switches() {
        caps.switches = switches.iter().map(|s| s.0).collect();
    }

    if let Some(misc) = device.misc_properties() {
        caps.misc = misc.iter().map(|m| m.0).collect();
    }

    caps.properties = device.properties().iter().map(|p| p.0).collect();

    if let Some(leds) = device.supported_leds() {
        caps.leds = leds.iter().map(|l| l.0).collect();
    }

    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_path() {
        let result = PhysicalDevice::open(Path::new("/dev/input/clickmute-missing-event"));
        assert!(matches!(result, Err(DeviceError::NotFound(_))));
    }

    #[test]
    fn test_open_non_device_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = PhysicalDevice::open(file.path());
        assert!(matches!(result, Err(DeviceError::Open { .. })));
    }
}

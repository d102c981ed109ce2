//! Input device module
//!
//! The physical pointer device is read through evdev and grabbed so its
//! events no longer reach the rest of the system. Everything that is not
//! the trigger button is re-emitted through a uinput mirror device.
//!
//! Requires read access to /dev/input/* (the 'input' group) and write
//! access to /dev/uinput.

pub mod device;
pub mod discover;
pub mod mirror;

use crate::error::{DeviceError, MirrorError};
use evdev::Key;
use std::time::SystemTime;

/// Synchronization event type (EV_SYN)
pub const EV_SYN: u16 = 0x00;
/// Key and button event type (EV_KEY)
pub const EV_KEY: u16 = 0x01;
/// Relative axis event type (EV_REL)
pub const EV_REL: u16 = 0x02;

/// EV_KEY value for a press
pub const KEY_PRESS: i32 = 1;
/// EV_KEY value for a release
pub const KEY_RELEASE: i32 = 0;

/// A single event read from the physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
    pub timestamp: SystemTime,
}

impl InputEvent {
    /// Create an event stamped with the current time
    pub fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            event_type,
            code,
            value,
            timestamp: SystemTime::now(),
        }
    }
}

impl From<evdev::InputEvent> for InputEvent {
    fn from(ev: evdev::InputEvent) -> Self {
        Self {
            event_type: ev.event_type().0,
            code: ev.code(),
            value: ev.value(),
            timestamp: ev.timestamp(),
        }
    }
}

/// The (type, code) pair that drives the mute state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetKey {
    pub event_type: u16,
    pub code: u16,
}

impl TargetKey {
    /// A button or key on the EV_KEY channel
    pub fn key(code: u16) -> Self {
        Self {
            event_type: EV_KEY,
            code,
        }
    }

    /// Resolve a configured key name such as "BTN_SIDE" or "275"
    pub fn from_name(name: &str) -> Result<Self, DeviceError> {
        parse_key_name(name).map(|key| Self::key(key.code()))
    }

    pub fn matches(&self, event: &InputEvent) -> bool {
        event.event_type == self.event_type && event.code == self.code
    }
}

impl std::fmt::Display for TargetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.event_type == EV_KEY {
            write!(f, "{:?} ({})", Key::new(self.code), self.code)
        } else {
            write!(f, "type {} code {}", self.event_type, self.code)
        }
    }
}

/// Absolute axis metadata copied from the physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsAxis {
    pub code: u16,
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
    pub fuzz: i32,
    pub flat: i32,
    pub resolution: i32,
}

/// Event codes a device declares, grouped by event type.
///
/// EV_SYN is never listed: uinput devices always support it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub keys: Vec<u16>,
    pub relative_axes: Vec<u16>,
    pub absolute_axes: Vec<AbsAxis>,
    pub switches: Vec<u16>,
    /// EV_MSC codes (MSC_SCAN on most mice)
    pub misc: Vec<u16>,
    /// INPUT_PROP_* bits
    pub properties: Vec<u16>,
    pub leds: Vec<u16>,
}

impl Capabilities {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
            && self.relative_axes.is_empty()
            && self.absolute_axes.is_empty()
            && self.switches.is_empty()
            && self.misc.is_empty()
            && self.leds.is_empty()
    }

    pub fn declares_key(&self, code: u16) -> bool {
        self.keys.contains(&code)
    }

    /// One-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "{} keys, {} relative axes, {} absolute axes, {} switches, {} misc, {} properties, {} leds",
            self.keys.len(),
            self.relative_axes.len(),
            self.absolute_axes.len(),
            self.switches.len(),
            self.misc.len(),
            self.properties.len(),
            self.leds.len()
        )
    }
}

/// Producer of physical device events
#[async_trait::async_trait]
pub trait EventSource: Send {
    /// Wait for the next event. `Ok(None)` means the stream is exhausted.
    async fn next_event(&mut self) -> Result<Option<InputEvent>, DeviceError>;

    /// Release the device. Idempotent.
    fn close(&mut self);
}

/// Consumer of forwarded events
pub trait EventSink: Send {
    /// Emit one event unchanged
    fn emit(&mut self, event: &InputEvent) -> Result<(), MirrorError>;

    /// True when emits are accepted but go nowhere
    fn is_degraded(&self) -> bool {
        false
    }

    /// Release the sink. Idempotent.
    fn close(&mut self);
}

/// Parse a key name string to an evdev Key
pub fn parse_key_name(name: &str) -> Result<Key, DeviceError> {
    let trimmed = name.trim();

    // Raw key codes are accepted as-is
    if let Ok(code) = trimmed.parse::<u16>() {
        return Ok(Key::new(code));
    }

    // Normalize: uppercase and replace - or space with _
    let normalized: String = trimmed
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();

    // Buttons keep their BTN_ prefix; anything else is a KEY_ name
    let key_name = if normalized.starts_with("BTN_") || normalized.starts_with("KEY_") {
        normalized
    } else if matches!(
        normalized.as_str(),
        "LEFT" | "RIGHT" | "MIDDLE" | "SIDE" | "EXTRA" | "FORWARD" | "BACK" | "TASK"
    ) {
        format!("BTN_{}", normalized)
    } else {
        format!("KEY_{}", normalized)
    };

    let key = match key_name.as_str() {
        // Mouse buttons (side buttons make the best triggers)
        "BTN_SIDE" | "BTN_4" => Key::BTN_SIDE,
        "BTN_EXTRA" | "BTN_5" => Key::BTN_EXTRA,
        "BTN_FORWARD" => Key::BTN_FORWARD,
        "BTN_BACK" => Key::BTN_BACK,
        "BTN_TASK" => Key::BTN_TASK,
        "BTN_MIDDLE" => Key::BTN_MIDDLE,
        "BTN_LEFT" => Key::BTN_LEFT,
        "BTN_RIGHT" => Key::BTN_RIGHT,

        // Extra buttons some gaming mice expose as keys
        "KEY_F13" => Key::KEY_F13,
        "KEY_F14" => Key::KEY_F14,
        "KEY_F15" => Key::KEY_F15,
        "KEY_F16" => Key::KEY_F16,
        "KEY_F17" => Key::KEY_F17,
        "KEY_F18" => Key::KEY_F18,
        "KEY_F19" => Key::KEY_F19,
        "KEY_F20" => Key::KEY_F20,
        "KEY_F21" => Key::KEY_F21,
        "KEY_F22" => Key::KEY_F22,
        "KEY_F23" => Key::KEY_F23,
        "KEY_F24" => Key::KEY_F24,
        "KEY_SCROLLLOCK" => Key::KEY_SCROLLLOCK,
        "KEY_PAUSE" => Key::KEY_PAUSE,
        "KEY_MICMUTE" => Key::KEY_MICMUTE,

        _ => {
            return Err(DeviceError::UnknownKey(format!(
                "{}. Try: BTN_SIDE, BTN_EXTRA, BTN_FORWARD, BTN_BACK, or a numeric code from evtest",
                name
            )));
        }
    };

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_name() {
        assert_eq!(parse_key_name("BTN_SIDE").unwrap(), Key::BTN_SIDE);
        assert_eq!(parse_key_name("btn-side").unwrap(), Key::BTN_SIDE);
        assert_eq!(parse_key_name("side").unwrap(), Key::BTN_SIDE);
        assert_eq!(parse_key_name("Extra").unwrap(), Key::BTN_EXTRA);
        assert_eq!(parse_key_name("F13").unwrap(), Key::KEY_F13);
        assert_eq!(parse_key_name("275").unwrap(), Key::BTN_SIDE);
    }

    #[test]
    fn test_parse_key_name_error() {
        assert!(matches!(
            parse_key_name("NOT_A_BUTTON"),
            Err(DeviceError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_target_key_matches_type_and_code() {
        let target = TargetKey::from_name("BTN_SIDE").unwrap();
        assert_eq!(target.event_type, EV_KEY);
        assert_eq!(target.code, 0x113);

        assert!(target.matches(&InputEvent::new(EV_KEY, 0x113, KEY_PRESS)));
        assert!(!target.matches(&InputEvent::new(EV_KEY, 0x114, KEY_PRESS)));
        // Same code on a different channel is not the trigger
        assert!(!target.matches(&InputEvent::new(EV_REL, 0x113, 1)));
    }

    #[test]
    fn test_capabilities_summary() {
        let caps = Capabilities {
            keys: vec![0x110, 0x111, 0x113],
            relative_axes: vec![0x00, 0x01, 0x08],
            misc: vec![0x04],
            ..Default::default()
        };
        assert!(!caps.is_empty());
        assert!(caps.declares_key(0x113));
        assert!(!caps.declares_key(0x114));
        assert_eq!(
            caps.summary(),
            "3 keys, 3 relative axes, 0 absolute axes, 0 switches, 1 misc, 0 properties, 0 leds"
        );
        assert!(Capabilities::default().is_empty());
        // Properties alone describe nothing to forward
        let props_only = Capabilities {
            properties: vec![0x00],
            ..Default::default()
        };
        assert!(props_only.is_empty());
    }
}

//! Pointer device discovery for `clickmute devices`

use evdev::Key;
use std::path::PathBuf;

/// A candidate device for `[device] path`
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub name: String,
    /// Number of BTN_LEFT..BTN_TASK buttons declared
    pub buttons: usize,
    /// Whether the configured trigger is declared
    pub has_trigger: bool,
}

/// Mouse button codes (BTN_MOUSE range)
fn is_mouse_button(code: u16) -> bool {
    (Key::BTN_LEFT.code()..=Key::BTN_TASK.code()).contains(&code)
}

/// Count mouse buttons among the declared key codes
pub fn count_buttons(codes: impl IntoIterator<Item = u16>) -> usize {
    codes.into_iter().filter(|&c| is_mouse_button(c)).count()
}

/// List all readable devices that declare mouse buttons
pub fn find_pointer_devices(trigger: u16) -> Vec<DeviceInfo> {
    let mut found: Vec<DeviceInfo> = evdev::enumerate()
        .filter_map(|(path, device)| {
            let codes: Vec<u16> = device
                .supported_keys()
                .map(|keys| keys.iter().map(|k| k.code()).collect())
                .unwrap_or_default();

            let buttons = count_buttons(codes.iter().copied());
            if buttons == 0 {
                tracing::trace!("Skipping {:?}: no mouse buttons", path);
                return None;
            }

            Some(DeviceInfo {
                name: device.name().unwrap_or("unknown").to_string(),
                has_trigger: codes.contains(&trigger),
                path,
                buttons,
            })
        })
        .collect();

    found.sort_by(|a, b| a.path.cmp(&b.path));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_buttons() {
        let codes = [
            Key::KEY_A.code(),
            Key::BTN_LEFT.code(),
            Key::BTN_RIGHT.code(),
            Key::BTN_SIDE.code(),
            Key::BTN_TASK.code(),
            Key::BTN_TRIGGER.code(),
        ];
        assert_eq!(count_buttons(codes), 4);
        assert_eq!(count_buttons([Key::KEY_A.code(), Key::KEY_Z.code()]), 0);
    }
}

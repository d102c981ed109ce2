//! uinput passthrough device
//!
//! Grabbing the physical device hides all of its events from the system,
//! so everything except the trigger is re-emitted through a virtual device
//! declaring the same capabilities. The trigger stays declared; only its
//! events are withheld.
//!
//! uinput's `emit` terminates every batch with its own SYN_REPORT, so
//! events are held until the source's SYN_REPORT closes the frame and the
//! whole frame is written in one batch. The mirror's frames then match the
//! source's one for one.
//!
//! If the virtual device cannot be created the mirror runs degraded:
//! emits become no-ops and push-to-talk keeps working on its own.

use super::{Capabilities, EventSink, InputEvent, EV_SYN};
use crate::error::MirrorError;
use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{
    AbsInfo, AbsoluteAxisType, AttributeSet, EventType, Key, MiscType, PropType,
    RelativeAxisType, SwitchType, UinputAbsSetup,
};

/// SYN_REPORT code within EV_SYN
const SYN_REPORT: u16 = 0;

/// Events of one input frame, waiting for the frame's SYN_REPORT
#[derive(Debug, Default)]
struct FrameBuffer {
    pending: Vec<InputEvent>,
}

impl FrameBuffer {
    /// Queue an event. Returns the finished frame, without its
    /// terminating SYN_REPORT, when `event` closes one.
    fn push(&mut self, event: &InputEvent) -> Option<Vec<InputEvent>> {
        if event.event_type == EV_SYN && event.code == SYN_REPORT {
            return Some(std::mem::take(&mut self.pending));
        }
        self.pending.push(*event);
        None
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }

    fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Virtual device re-emitting non-trigger events
pub struct VirtualMirror {
    name: String,
    device: Option<VirtualDevice>,
    frame: FrameBuffer,
    degraded: bool,
}

impl VirtualMirror {
    /// Create the mirror, falling back to degraded mode on failure
    pub fn build(capabilities: &Capabilities, name: &str) -> Self {
        match create_device(capabilities, name) {
            Ok(device) => {
                tracing::info!("Created virtual device '{}' for passthrough", name);
                Self {
                    name: name.to_string(),
                    device: Some(device),
                    frame: FrameBuffer::default(),
                    degraded: false,
                }
            }
            Err(e) => {
                tracing::error!("{}. Pointer passthrough will not work.", e);
                Self::degraded(name)
            }
        }
    }

    /// A mirror that drops everything
    pub fn degraded(name: &str) -> Self {
        Self {
            name: name.to_string(),
            device: None,
            frame: FrameBuffer::default(),
            degraded: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }
}

impl EventSink for VirtualMirror {
    fn emit(&mut self, event: &InputEvent) -> Result<(), MirrorError> {
        let Some(device) = self.device.as_mut() else {
            return Ok(());
        };

        let Some(frame) = self.frame.push(event) else {
            return Ok(());
        };

        let batch: Vec<evdev::InputEvent> = frame
            .iter()
            .map(|e| evdev::InputEvent::new(EventType(e.event_type), e.code, e.value))
            .collect();

        // The batch's trailing SYN_REPORT stands in for `event`
        device.emit(&batch).map_err(|e| MirrorError::Emit {
            event_type: event.event_type,
            code: event.code,
            value: event.value,
            reason: format!("{} (frame of {} events dropped)", e, batch.len()),
        })
    }

    fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn close(&mut self) {
        if self.frame.pending() > 0 {
            tracing::debug!("Discarding {} events of an unfinished frame", self.frame.pending());
            self.frame.clear();
        }
        if self.device.take().is_some() {
            tracing::info!("Closed virtual device '{}'", self.name);
        }
    }
}

impl Drop for VirtualMirror {
    fn drop(&mut self) {
        self.close();
    }
}

fn create_device(caps: &Capabilities, name: &str) -> Result<VirtualDevice, MirrorError> {
    let create = |e: std::io::Error| MirrorError::Create(e.to_string());

    if caps.is_empty() {
        return Err(MirrorError::Create(
            "source device declares no capabilities".to_string(),
        ));
    }

    let mut builder = VirtualDeviceBuilder::new().map_err(create)?.name(name);

    if !caps.keys.is_empty() {
        let mut keys = AttributeSet::<Key>::new();
        for &code in &caps.keys {
            keys.insert(Key::new(code));
        }
        builder = builder.with_keys(&keys).map_err(create)?;
    }

    if !caps.relative_axes.is_empty() {
        let mut axes = AttributeSet::<RelativeAxisType>::new();
        for &code in &caps.relative_axes {
            axes.insert(RelativeAxisType(code));
        }
        builder = builder.with_relative_axes(&axes).map_err(create)?;
    }

    for axis in &caps.absolute_axes {
        let setup = UinputAbsSetup::new(
            AbsoluteAxisType(axis.code),
            AbsInfo::new(
                axis.value,
                axis.minimum,
                axis.maximum,
                axis.fuzz,
                axis.flat,
                axis.resolution,
            ),
        );
        builder = builder.with_absolute_axis(&setup).map_err(create)?;
    }

    if !caps.switches.is_empty() {
        let mut switches = AttributeSet::<SwitchType>::new();
        for &code in &caps.switches {
            switches.insert(SwitchType(code));
        }
        builder = builder.with_switches(&switches).map_err(create)?;
    }

    // Mice report MSC_SCAN alongside every button
    if !caps.misc.is_empty() {
        let mut misc = AttributeSet::<MiscType>::new();
        for &code in &caps.misc {
            misc.insert(MiscType(code));
        }
        builder = builder.with_msc(&misc).map_err(create)?;
    }

    if !caps.properties.is_empty() {
        let mut props = AttributeSet::<PropType>::new();
        for &code in &caps.properties {
            props.insert(PropType(code));
        }
        builder = builder.with_properties(&props).map_err(create)?;
    }

    if !caps.leds.is_empty() {
        tracing::warn!(
            "Source declares {} LEDs; uinput mirror cannot declare them",
            caps.leds.len()
        );
    }

    builder.build().map_err(create)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{EV_KEY, EV_REL};

    const EV_MSC: u16 = 0x04;
    const MSC_SCAN: u16 = 0x04;

    fn syn() -> InputEvent {
        InputEvent::new(EV_SYN, SYN_REPORT, 0)
    }

    /// Feed events through a frame buffer, collecting the batches it releases
    fn batches(events: &[InputEvent]) -> (Vec<Vec<(u16, u16, i32)>>, usize) {
        let mut buffer = FrameBuffer::default();
        let batches = events
            .iter()
            .filter_map(|e| buffer.push(e))
            .map(|frame| {
                frame
                    .iter()
                    .map(|e| (e.event_type, e.code, e.value))
                    .collect()
            })
            .collect();
        (batches, buffer.pending())
    }

    #[test]
    fn test_frame_written_as_one_batch() {
        let (batches, pending) = batches(&[
            InputEvent::new(EV_REL, 0, 5),
            InputEvent::new(EV_REL, 1, -3),
            syn(),
        ]);
        // Diagonal motion stays in a single report
        assert_eq!(batches, vec![vec![(EV_REL, 0, 5), (EV_REL, 1, -3)]]);
        assert_eq!(pending, 0);
    }

    #[test]
    fn test_scan_code_and_key_share_a_frame() {
        let (batches, _) = batches(&[
            InputEvent::new(EV_MSC, MSC_SCAN, 0x90001),
            InputEvent::new(EV_KEY, 0x110, 1),
            syn(),
            InputEvent::new(EV_REL, 0, 1),
            syn(),
        ]);
        assert_eq!(
            batches,
            vec![
                vec![(EV_MSC, MSC_SCAN, 0x90001), (EV_KEY, 0x110, 1)],
                vec![(EV_REL, 0, 1)],
            ]
        );
    }

    #[test]
    fn test_bare_syn_is_an_empty_frame() {
        // A frame whose only content was the withheld trigger
        let (batches, _) = batches(&[syn()]);
        assert_eq!(batches, vec![Vec::<(u16, u16, i32)>::new()]);
    }

    #[test]
    fn test_other_syn_codes_stay_in_frame() {
        const SYN_MT_REPORT: u16 = 2;
        let (batches, pending) = batches(&[
            InputEvent::new(EV_SYN, SYN_MT_REPORT, 0),
            InputEvent::new(EV_REL, 0, 2),
        ]);
        assert!(batches.is_empty());
        assert_eq!(pending, 2);
    }

    #[test]
    fn test_degraded_emit_is_noop() {
        let mut mirror = VirtualMirror::degraded("test-mirror");
        assert!(mirror.is_degraded());
        assert!(!mirror.is_open());
        assert!(mirror.emit(&InputEvent::new(EV_REL, 0, 5)).is_ok());
        assert_eq!(mirror.frame.pending(), 0);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut mirror = VirtualMirror::degraded("test-mirror");
        mirror.close();
        mirror.close();
        assert!(!mirror.is_open());
    }

    #[test]
    fn test_empty_capabilities_degrade() {
        let mirror = VirtualMirror::build(&Capabilities::default(), "test-mirror");
        assert!(mirror.is_degraded());
    }
}

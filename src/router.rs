//! Event router
//!
//! Reads events one at a time from the physical device. Trigger events
//! drive the push-to-talk state machine; everything else goes to the
//! mirror unchanged and in arrival order. Each event is fully handled,
//! including any mute command, before the next one is read.

use crate::error::DeviceError;
use crate::input::{EventSink, EventSource, InputEvent, TargetKey};
use crate::mute::MuteControl;
use crate::state::{MuteCommand, PttState};

/// What happened to a single event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Passed to the mirror
    Forwarded,
    /// Mirror rejected it; dropped
    EmitFailed,
    /// Mirror is degraded; dropped
    Discarded,
    /// Trigger event that issued a mute command
    Triggered(MuteCommand),
    /// Trigger event with no effect (duplicate, spurious, autorepeat)
    Ignored,
}

/// Counters for the shutdown summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub forwarded: u64,
    pub emit_failures: u64,
    pub discarded: u64,
    pub commands: u64,
    pub command_failures: u64,
}

/// Push-to-talk event router
pub struct EventRouter {
    target: TargetKey,
    state: PttState,
    stats: RouterStats,
}

impl EventRouter {
    pub fn new(target: TargetKey) -> Self {
        Self {
            target,
            state: PttState::Idle,
            stats: RouterStats::default(),
        }
    }

    pub fn state(&self) -> PttState {
        self.state
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }

    /// Handle one event: trigger it or forward it, never both
    pub async fn route<M, S>(&mut self, event: InputEvent, mute: &M, sink: &mut S) -> Routed
    where
        M: MuteControl + ?Sized,
        S: EventSink + ?Sized,
    {
        if !self.target.matches(&event) {
            if sink.is_degraded() {
                self.stats.discarded += 1;
                return Routed::Discarded;
            }
            return match sink.emit(&event) {
                Ok(()) => {
                    self.stats.forwarded += 1;
                    Routed::Forwarded
                }
                Err(e) => {
                    self.stats.emit_failures += 1;
                    tracing::error!("{}", e);
                    Routed::EmitFailed
                }
            };
        }

        let (next, command) = self.state.on_trigger(event.value);
        self.state = next;

        match command {
            Some(command) => {
                tracing::info!(
                    "Target key {} {}",
                    self.target,
                    if command.muted() { "released" } else { "pressed" }
                );
                self.stats.commands += 1;
                if !mute.set_mute(command.muted()).await {
                    self.stats.command_failures += 1;
                }
                Routed::Triggered(command)
            }
            None => {
                tracing::trace!(
                    "Ignoring target key value {} while {}",
                    event.value,
                    self.state
                );
                Routed::Ignored
            }
        }
    }

    /// Consume the source until it is exhausted or fails
    pub async fn run<Src, M, S>(
        &mut self,
        source: &mut Src,
        mute: &M,
        sink: &mut S,
    ) -> Result<(), DeviceError>
    where
        Src: EventSource + ?Sized,
        M: MuteControl + ?Sized,
        S: EventSink + ?Sized,
    {
        while let Some(event) = source.next_event().await? {
            self.route(event, mute, sink).await;
        }
        Ok(())
    }
}

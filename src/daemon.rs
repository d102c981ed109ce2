//! Daemon module - lifecycle around the event loop
//!
//! Startup: open and grab the device, build the mirror, force the
//! microphone muted. Then route events until the device stream ends,
//! a read fails, or SIGINT/SIGTERM arrives.
//!
//! Shutdown runs on every one of those paths, in a fixed order where each
//! step is attempted even if an earlier one failed:
//! 1. mute the microphone
//! 2. close the mirror (if one was built)
//! 3. close the physical device (releases the grab)

use crate::config::Config;
use crate::error::{DeviceError, Result};
use crate::input::device::PhysicalDevice;
use crate::input::mirror::VirtualMirror;
use crate::input::{EventSink, EventSource, TargetKey};
use crate::mute::{self, MuteControl};
use crate::router::EventRouter;
use std::future::Future;
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Why the event loop stopped
#[derive(Debug)]
pub enum SessionEnd {
    /// The device stream ended
    Exhausted,
    /// Reading from the device failed
    ReadFailed(DeviceError),
    /// A shutdown signal arrived
    Interrupted(&'static str),
}

/// SIGINT/SIGTERM listener, registered before any resource is acquired
pub struct ShutdownSignal {
    sigint: Signal,
    sigterm: Signal,
}

impl ShutdownSignal {
    pub fn install() -> Result<Self> {
        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for either signal, returning its name
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigint.recv() => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
        }
    }
}

/// Force-mute, route until the loop ends, then clean up.
///
/// The shutdown future is raced against the device read, so a signal
/// abandons a pending read and goes straight to cleanup.
pub async fn run_session<F>(
    router: &mut EventRouter,
    source: &mut dyn EventSource,
    sink: &mut dyn EventSink,
    mute: &dyn MuteControl,
    shutdown: F,
) -> SessionEnd
where
    F: Future<Output = &'static str>,
{
    tracing::info!("Initializing microphone to muted state");
    if !mute.set_mute(true).await {
        tracing::warn!("Initial mute failed; continuing");
    }

    let end = tokio::select! {
        result = router.run(&mut *source, mute, &mut *sink) => match result {
            Ok(()) => SessionEnd::Exhausted,
            Err(e) => SessionEnd::ReadFailed(e),
        },
        name = shutdown => SessionEnd::Interrupted(name),
    };

    match &end {
        SessionEnd::Exhausted => tracing::info!("Device event stream ended"),
        SessionEnd::ReadFailed(e) => {
            tracing::error!("Error during event monitoring: {} ({:?})", e, e)
        }
        SessionEnd::Interrupted(name) => {
            tracing::info!("Received {}, releasing device and exiting", name)
        }
    }

    shutdown_sequence(mute, Some(sink), source).await;
    end
}

/// Best-effort cleanup in fixed order; no step is skipped
pub async fn shutdown_sequence(
    mute: &dyn MuteControl,
    sink: Option<&mut dyn EventSink>,
    source: &mut dyn EventSource,
) {
    tracing::info!("Ensuring microphone is muted on exit");
    if !mute.set_mute(true).await {
        tracing::error!("Final mute failed; microphone may be left open");
    }

    if let Some(sink) = sink {
        sink.close();
    }

    source.close();
}

/// Main daemon
pub struct Daemon {
    config: Config,
}

impl Daemon {
    /// Create a new daemon with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the daemon until the device goes away or a signal arrives
    pub async fn run(&mut self) -> Result<SessionEnd> {
        let target = TargetKey::from_name(&self.config.device.key)?;

        tracing::info!("Starting clickmute v{}", env!("CARGO_PKG_VERSION"));
        tracing::info!(
            "Monitoring device {:?} for {}",
            self.config.device.path,
            target
        );

        let mut signals = ShutdownSignal::install()?;
        let mute = mute::create_controller(&self.config.mute);
        tracing::info!(
            "Controlling audio device {} via {}",
            self.config.mute.audio_device,
            mute.name()
        );

        // Setup failures here exit before anything needs cleaning up
        let mut device = PhysicalDevice::open(&self.config.device.path)?;

        if !device.capabilities().declares_key(target.code) {
            tracing::warn!(
                "{} does not declare {}; the trigger may never fire",
                device.name(),
                target
            );
        }

        if let Err(e) = device.grab() {
            tracing::error!("{}", e);
            shutdown_sequence(mute.as_ref(), None, &mut device).await;
            return Err(e.into());
        }

        let mut mirror =
            VirtualMirror::build(device.capabilities(), &self.config.device.mirror_name);

        let mut router = EventRouter::new(target);
        let end = run_session(
            &mut router,
            &mut device,
            &mut mirror,
            mute.as_ref(),
            signals.recv(),
        )
        .await;

        let stats = router.stats();
        tracing::info!(
            "Push-to-talk stopped ({} events forwarded, {} dropped, {} discarded, {} mute commands, {} failed)",
            stats.forwarded,
            stats.emit_failures,
            stats.discarded,
            stats.commands,
            stats.command_failures
        );

        Ok(end)
    }
}

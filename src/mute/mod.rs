//! Microphone mute control
//!
//! The daemon only ever needs one operation from the audio stack:
//! set the configured source muted or unmuted. Failures are logged by the
//! implementation and reported as `false`; callers carry on regardless.

pub mod command;

use crate::config::MuteConfig;

pub use command::CommandMute;

/// Trait for mute implementations
#[async_trait::async_trait]
pub trait MuteControl: Send + Sync {
    /// Mute (`true`) or unmute (`false`) the microphone.
    /// Returns whether the command reported success.
    async fn set_mute(&self, muted: bool) -> bool;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}

/// Factory function to create the configured mute controller
pub fn create_controller(config: &MuteConfig) -> Box<dyn MuteControl> {
    if which::which(&config.command).is_err() {
        tracing::warn!(
            "'{}' not found in PATH; mute commands will fail until it is installed",
            config.command
        );
    }
    Box::new(CommandMute::new(config))
}

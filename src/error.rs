//! Error types for clickmute
//!
//! Uses thiserror for ergonomic error definitions with clear messages
//! that guide users toward fixing common issues.

use thiserror::Error;

/// Top-level error type for the clickmute application
#[derive(Error, Debug)]
pub enum ClickmuteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input device error: {0}")]
    Device(#[from] DeviceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the physical input device
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Input device not found: '{0}'. List candidates with: clickmute devices")]
    NotFound(String),

    #[error("Permission denied for input device '{0}'. Is the user in the 'input' group?\n  Run: sudo usermod -aG input $USER\n  Then log out and back in.")]
    PermissionDenied(String),

    #[error("Failed to open input device '{path}': {reason}")]
    Open { path: String, reason: String },

    #[error("Failed to grab input device '{path}': {reason}. Is another process holding it?")]
    Grab { path: String, reason: String },

    #[error("Failed to read from input device: {0}")]
    Read(String),

    #[error("Unknown key name: '{0}'. Use evtest to find valid key names.")]
    UnknownKey(String),
}

/// Errors related to the virtual passthrough device
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Failed to create uinput device: {0}. Is /dev/uinput writable?")]
    Create(String),

    #[error("Failed to emit event (type {event_type}, code {code}, value {value}): {reason}")]
    Emit {
        event_type: u16,
        code: u16,
        value: i32,
        reason: String,
    },
}

/// Errors from invoking the external mute command
#[derive(Error, Debug)]
pub enum MuteError {
    #[error("'{0}' not found in PATH. Install it or set [mute] command in the config.")]
    NotFound(String),

    #[error("failed to spawn command: {0}")]
    SpawnFailed(String),

    #[error("command timed out after {0}s")]
    Timeout(u64),

    #[error("failed to wait for command: {0}")]
    WaitFailed(String),

    #[error("command exited with code {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
}

/// Result type alias using ClickmuteError
pub type Result<T> = std::result::Result<T, ClickmuteError>;

impl From<toml::de::Error> for ClickmuteError {
    fn from(e: toml::de::Error) -> Self {
        ClickmuteError::Config(format!("Invalid config: {}", e))
    }
}

//! Clickmute: push-to-talk microphone mute for Linux
//!
//! This library provides the core functionality for:
//! - Grabbing a pointer device exclusively via evdev
//! - Re-emitting every non-trigger event through a uinput mirror
//! - Toggling the microphone via an external command (wpctl by default)
//! - Guaranteeing the microphone ends muted on every exit path
//!
//! # Architecture
//!
//! ```text
//!          ┌──────────────┐   events    ┌──────────────┐  other events  ┌──────────────┐
//!          │   Physical   │ ──────────▶ │    Event     │ ─────────────▶ │   Virtual    │
//!          │ device (grab)│             │    Router    │                │ mirror (uinput)
//!          └──────────────┘             └──────────────┘                └──────────────┘
//!                                              │
//!                                              │ trigger press / release
//!                                              ▼
//!                                       ┌──────────────┐
//!                                       │     Mute     │
//!                                       │  (wpctl ...) │
//!                                       └──────────────┘
//!
//!   Daemon: mute ─▶ route until end/error/signal ─▶ mute, close mirror, close device
//! ```

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod input;
pub mod mute;
pub mod router;
pub mod state;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use daemon::{Daemon, SessionEnd};
pub use error::{ClickmuteError, Result};

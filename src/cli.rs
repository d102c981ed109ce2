// Command-line interface definitions for clickmute
//
// This module is separate so it can be used by both the binary (main.rs)
// and build.rs for generating man pages.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "clickmute")]
#[command(author, version, about = "Push-to-talk microphone mute driven by a mouse button")]
#[command(long_about = "
Clickmute turns a spare mouse button into a push-to-talk key.
The microphone stays muted until the button is held, and is muted again
when it is released or the daemon exits.

The mouse is grabbed exclusively; every other event it produces is
re-emitted through a virtual uinput device, so it keeps working normally.

SETUP:
  1. Add yourself to the input group: sudo usermod -aG input $USER
  2. Allow access to /dev/uinput (udev rule or the uinput group)
  3. Log out and back in
  4. Run: clickmute devices (to find your mouse)
  5. Run: clickmute --device /dev/input/eventN --audio-device <id>

USAGE:
  Hold the side button (BTN_SIDE by default) while speaking.
")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Override the input device path (e.g., /dev/input/event3)
    #[arg(long, value_name = "PATH")]
    pub device: Option<std::path::PathBuf>,

    /// Override the trigger button (e.g., BTN_SIDE, BTN_EXTRA, 275)
    #[arg(long, value_name = "KEY")]
    pub key: Option<String>,

    /// Override the audio device passed to the mute command
    #[arg(long, value_name = "ID")]
    pub audio_device: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as daemon (default if no command specified)
    Daemon,

    /// Show current configuration
    Config {
        /// Print the commented default config file instead
        #[arg(long)]
        default: bool,
    },

    /// List input devices with mouse buttons
    Devices,

    /// Mute the microphone once and exit
    Mute,

    /// Unmute the microphone once and exit
    Unmute,
}

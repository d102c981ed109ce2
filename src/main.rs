//! Clickmute - push-to-talk microphone mute driven by a mouse button
//!
//! Run with `clickmute` or `clickmute daemon` to start the daemon.
//! Use `clickmute devices` to find the mouse to grab.
//! Use `clickmute mute` / `clickmute unmute` to test the mute command.

use clap::Parser;
use clickmute::config::{self, Config};
use clickmute::input::{discover, TargetKey};
use clickmute::mute::{self, MuteControl};
use clickmute::{Cli, Commands, Daemon};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("clickmute={},warn", log_level))),
        )
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // Load configuration
    let mut config = config::load_config(cli.config.as_deref())?;

    // Apply CLI overrides
    if let Some(device) = cli.device {
        config.device.path = device;
    }
    if let Some(key) = cli.key {
        config.device.key = key;
    }
    if let Some(audio_device) = cli.audio_device {
        config.mute.audio_device = audio_device;
    }

    // Run the appropriate command
    match cli.command.unwrap_or(Commands::Daemon) {
        Commands::Daemon => {
            let mut daemon = Daemon::new(config);
            daemon.run().await?;
        }

        Commands::Config { default } => {
            show_config(&config, default)?;
        }

        Commands::Devices => {
            list_devices(&config)?;
        }

        Commands::Mute => {
            return Ok(set_mute_once(&config, true).await);
        }

        Commands::Unmute => {
            return Ok(set_mute_once(&config, false).await);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print the effective configuration
fn show_config(config: &Config, default: bool) -> anyhow::Result<()> {
    if default {
        print!("{}", config::DEFAULT_CONFIG);
        return Ok(());
    }

    if let Some(path) = Config::default_path() {
        println!("# Config file: {:?}\n", path);
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// List candidate pointer devices
fn list_devices(config: &Config) -> anyhow::Result<()> {
    let target = TargetKey::from_name(&config.device.key)?;
    let devices = discover::find_pointer_devices(target.code);

    if devices.is_empty() {
        println!("No readable pointer devices found in /dev/input/.");
        println!("Is the user in the 'input' group?");
        return Ok(());
    }

    for device in devices {
        println!(
            "{}  {}  ({} buttons{})",
            device.path.display(),
            device.name,
            device.buttons,
            if device.has_trigger {
                format!(", has {}", target)
            } else {
                String::new()
            }
        );
    }
    Ok(())
}

/// Issue one mute command
async fn set_mute_once(config: &Config, muted: bool) -> ExitCode {
    let controller = mute::create_controller(&config.mute);
    if controller.set_mute(muted).await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

//! Development tasks for clickmute
//!
//! Usage:
//!   cargo xtask install    Install release binary to /usr/local/bin (requires sudo)
//!   cargo xtask uninstall  Remove binary from /usr/local/bin (requires sudo)
//!   cargo xtask dist       Build release binary for distribution
//!   cargo xtask unit       Print a systemd user unit for the daemon

use std::env;
use std::path::PathBuf;
use std::process::{Command, ExitCode};

const INSTALL_PATH: &str = "/usr/local/bin/clickmute";

const SYSTEMD_UNIT: &str = r#"[Unit]
Description=Clickmute push-to-talk
After=pipewire.service wireplumber.service

[Service]
ExecStart=/usr/local/bin/clickmute daemon
Restart=on-failure
RestartSec=2

[Install]
WantedBy=default.target
"#;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        print_help();
        return ExitCode::SUCCESS;
    }

    let result = match args[0].as_str() {
        "install" => install(),
        "uninstall" => uninstall(),
        "dist" => dist(),
        "unit" => {
            print!("{}", SYSTEMD_UNIT);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_help();
            Err(anyhow::anyhow!("Unknown command"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    eprintln!(
        r#"
clickmute development tasks

Usage: cargo xtask <COMMAND>

Commands:
  install    Build release binary and install to /usr/local/bin (requires sudo)
  uninstall  Remove clickmute from /usr/local/bin (requires sudo)
  dist       Build optimized release binary for distribution
  unit       Print a systemd user unit (save as ~/.config/systemd/user/clickmute.service)
"#
    );
}

/// Get the project root directory
fn project_root() -> PathBuf {
    let dir = env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .or_else(|_| env::current_dir())
        .unwrap_or_else(|_| PathBuf::from("."));

    // xtask is in a subdirectory, go up one level
    dir.parent().unwrap_or(&dir).to_path_buf()
}

fn build_release() -> anyhow::Result<PathBuf> {
    let root = project_root();

    let status = Command::new("cargo")
        .args(["build", "--release"])
        .current_dir(&root)
        .status()?;

    if !status.success() {
        anyhow::bail!("Build failed");
    }

    let binary = root.join("target/release/clickmute");
    if !binary.exists() {
        anyhow::bail!("Binary not found at {:?}", binary);
    }
    Ok(binary)
}

/// Build release binary and install to /usr/local/bin
fn install() -> anyhow::Result<()> {
    println!("==> Building release binary...");
    let binary = build_release()?;

    println!("==> Installing to {}...", INSTALL_PATH);

    let status = Command::new("sudo")
        .arg("install")
        .arg("-Dm755")
        .arg(&binary)
        .arg(INSTALL_PATH)
        .status()?;

    if !status.success() {
        anyhow::bail!("Install failed (sudo required)");
    }

    println!("==> Installed successfully!");
    println!();
    println!("Run as a service with:");
    println!("  cargo xtask unit > ~/.config/systemd/user/clickmute.service");
    println!("  systemctl --user enable --now clickmute");

    let _ = Command::new(INSTALL_PATH).arg("--version").status();

    Ok(())
}

/// Remove clickmute from /usr/local/bin
fn uninstall() -> anyhow::Result<()> {
    println!("==> Removing {}...", INSTALL_PATH);

    let status = Command::new("sudo")
        .args(["rm", "-f", INSTALL_PATH])
        .status()?;

    if !status.success() {
        anyhow::bail!("Uninstall failed (sudo required)");
    }

    println!("==> Uninstalled successfully!");
    Ok(())
}

/// Build optimized release binary for distribution
fn dist() -> anyhow::Result<()> {
    println!("==> Building distribution binary...");
    let binary = build_release()?;
    println!("==> Built: {:?}", binary);

    let _ = Command::new("ls").arg("-lh").arg(&binary).status();
    let _ = Command::new(&binary).arg("--version").status();

    Ok(())
}

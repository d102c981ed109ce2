//! Renders clickmute.1 and one page per subcommand from the clap
//! definitions in src/cli.rs. Skipped for debug builds unless
//! CLICKMUTE_GEN_MANPAGES is set.

use clap::CommandFactory;
use clap_mangen::Man;
use std::env;
use std::fs::{self, File};
use std::io::Error;
use std::path::PathBuf;

include!("src/cli.rs");

fn render(cmd: clap::Command, path: PathBuf) -> Result<(), Error> {
    Man::new(cmd).render(&mut File::create(path)?)
}

fn main() -> Result<(), Error> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-env-changed=CLICKMUTE_GEN_MANPAGES");

    let release = env::var("PROFILE").map(|p| p == "release").unwrap_or(false);
    if !release && env::var_os("CLICKMUTE_GEN_MANPAGES").is_none() {
        return Ok(());
    }

    let out_dir = env::var("OUT_DIR").map(PathBuf::from).unwrap_or_else(|_| "target".into());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let cmd = Cli::command();
    render(cmd.clone(), man_dir.join("clickmute.1"))?;

    for sub in cmd.get_subcommands().filter(|s| s.get_name() != "help") {
        render(sub.clone(), man_dir.join(format!("clickmute-{}.1", sub.get_name())))?;
    }

    Ok(())
}

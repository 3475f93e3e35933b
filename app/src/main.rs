//! `findmyjob` entry-point: loads settings, installs tracing, runs one command.

use std::ffi::OsString;
use std::io;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use findmyjob::config::ClientSettings;
use findmyjob::inbound::cli::{self, CliArgs};

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    // Settings come from the environment and config files; the command line
    // belongs to clap.
    let settings = ClientSettings::load_from_iter([OsString::from("findmyjob")])
        .wrap_err("load client settings")?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(cli::run(args, &settings, &mut io::stdout().lock()))
}

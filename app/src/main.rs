mod cli;
mod commands;
mod session;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use photo_core::log::LogConfig;
use photo_core::store::PreferenceStore;
use photo_core::{Catalog, CatalogConfig};

use crate::cli::Cli;
use crate::commands::Renderer;
use crate::session::Session;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::default();
    if cli.verbose {
        log_config = log_config.verbose();
    }
    if let Err(err) = photo_core::log::init(log_config) {
        eprintln!("failed to initialise logging: {err:#}");
    }

    let mut config = CatalogConfig::default();
    if let Some(root) = cli.root {
        config = config.with_root(root);
    }
    if let Some(prefs) = cli.prefs {
        config = config.with_preferences_path(prefs);
    }
    tracing::debug!(root = %config.root.display(), "opening catalog");

    let mut session =
        Session::start(Catalog::new(&config), PreferenceStore::open(&config.preferences_path));
    let mut out = Renderer::new(io::stdout().lock(), cli.json);

    match commands::execute(cli.command, &mut session, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use q3ios_rust::c_bindings::DryRunHost;
use q3ios_rust::config::{self, Options};
use q3ios_rust::engine::EngineHost;
use q3ios_rust::launch::{LaunchOutcome, LaunchRequest, Launcher, MISSING_FILES_MESSAGE};
use q3ios_rust::{logging, Cli, LogLevel};

fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Stderr only until the configured level and file are known
    logging::init(LogLevel::Warning, None)?;

    // Load configuration, then let the command line override it
    let options = config::load_config(cli.configdir.as_deref())?;
    let options = cli.merge_into_options(options)?;

    logging::init(options.log_level, options.log_file.as_deref())?;
    log::info!("q3ios {} starting", env!("CARGO_PKG_VERSION"));

    let home = match &options.home_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("Failed to determine the working directory")?,
    };
    let bundle = match &options.bundle_dir {
        Some(dir) => dir.clone(),
        None => executable_dir()?,
    };

    log::info!("Configuration:");
    log::info!("  Home: {}", home.display());
    log::info!(
        "  Resolution: {}x{}",
        options.resolution.width,
        options.resolution.height
    );
    if let Some(game_mod) = &options.game_mod {
        log::info!("  Mod: {}", game_mod);
    }
    if let Some(log_file) = &options.log_file {
        log::info!("  Log file: {}", log_file.display());
    }

    let outcome = if options.dry_run {
        launch(DryRunHost::default(), &options, &bundle, &home)?
    } else {
        launch_engine(&options, &bundle, &home)?
    };

    match outcome {
        LaunchOutcome::Started => {
            log::info!("Engine exited");
            Ok(ExitCode::SUCCESS)
        }
        LaunchOutcome::MissingFiles => {
            eprintln!("Game Files Missing\n\n{}", MISSING_FILES_MESSAGE);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(feature = "engine")]
fn launch_engine(options: &Options, bundle: &Path, home: &Path) -> Result<LaunchOutcome> {
    launch(q3ios_rust::c_bindings::LinkedEngine, options, bundle, home)
}

#[cfg(not(feature = "engine"))]
fn launch_engine(options: &Options, bundle: &Path, home: &Path) -> Result<LaunchOutcome> {
    log::warn!("Built without the engine feature; running dry");
    launch(DryRunHost::default(), options, bundle, home)
}

fn launch<H: EngineHost>(host: H, options: &Options, bundle: &Path, home: &Path) -> Result<LaunchOutcome> {
    let request = match &options.game_mod {
        Some(game_mod) => LaunchRequest::Mod(game_mod.clone()),
        None => LaunchRequest::Vanilla,
    };

    let mut launcher = Launcher::new(host, options.launch_args(bundle, home));
    if !options.extract_assets {
        launcher = launcher.without_asset_extraction();
    }

    launcher.launch(request).context("Failed to launch the engine")
}

fn executable_dir() -> Result<PathBuf> {
    let exe = env::current_exe().context("Failed to locate the launcher executable")?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{parse_difficulty, parse_resolution, Options};
use crate::launch::ServerAddress;
use crate::logging::LogLevel;

/// Quake III launcher for the touch front-end
#[derive(Parser, Debug, Default)]
#[command(name = "q3ios")]
#[command(version)]
#[command(about = "Prepares game data and starts the id Tech 3 engine", long_about = None)]
pub struct Cli {
    /// Directory holding q3ios.cfg
    #[arg(short, long, value_name = "CONFIGDIR")]
    pub configdir: Option<PathBuf>,

    /// Writable home directory containing baseq3
    #[arg(long, value_name = "HOMEDIR")]
    pub home: Option<PathBuf>,

    /// Directory the engine executable lives in
    #[arg(long, value_name = "DIR")]
    pub bundle: Option<PathBuf>,

    /// Screen resolution in physical pixels (e.g., 2048x1536)
    #[arg(short, long, value_name = "WIDTHxHEIGHT")]
    pub res: Option<String>,

    /// Player name
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Mod directory to load instead of plain baseq3
    #[arg(short = 'm', long = "mod", value_name = "MOD")]
    pub game_mod: Option<String>,

    /// Map to start in single player
    #[arg(long, value_name = "MAP")]
    pub map: Option<String>,

    /// Single player skill (1-5)
    #[arg(short, long, value_name = "SKILL")]
    pub difficulty: Option<String>,

    /// Server to connect to (host:port)
    #[arg(long, value_name = "HOST:PORT")]
    pub connect: Option<String>,

    /// Enable engine developer mode
    #[arg(long)]
    pub developer: bool,

    /// Skip extracting menu images from the pk3 files
    #[arg(long = "no-extract")]
    pub no_extract: bool,

    /// Log level (nothing, user, error, warning, info, debug, all)
    #[arg(long, value_name = "LEVEL")]
    pub loglevel: Option<String>,

    /// Log file path
    #[arg(short, long, value_name = "FILE")]
    pub logfile: Option<PathBuf>,

    /// Print the engine command line instead of starting the engine
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref dir) = self.configdir {
            opts.config_dir = Some(dir.clone());
        }
        if let Some(ref home) = self.home {
            opts.home_dir = Some(home.clone());
        }
        if let Some(ref bundle) = self.bundle {
            opts.bundle_dir = Some(bundle.clone());
        }

        if let Some(ref res) = self.res {
            opts.resolution = parse_resolution(res).context("Invalid resolution format")?;
        }

        if let Some(ref name) = self.name {
            opts.player_name = name.clone();
        }
        if let Some(ref game_mod) = self.game_mod {
            opts.game_mod = Some(game_mod.clone());
        }
        if let Some(ref map) = self.map {
            opts.map = Some(map.clone());
        }
        if let Some(ref difficulty) = self.difficulty {
            opts.difficulty = parse_difficulty(difficulty)?;
        }
        if let Some(ref server) = self.connect {
            opts.server = Some(server.parse::<ServerAddress>()?);
        }

        if self.developer {
            opts.developer = true;
        }
        if self.no_extract {
            opts.extract_assets = false;
        }

        if let Some(ref level) = self.loglevel {
            opts.log_level = Self::parse_log_level(level)?;
        }
        if let Some(ref log_file) = self.logfile {
            opts.log_file = Some(log_file.clone());
        }

        if self.dry_run {
            opts.dry_run = true;
        }

        Ok(opts)
    }

    fn parse_log_level(s: &str) -> Result<LogLevel> {
        match LogLevel::parse(s) {
            Some(level) => Ok(level),
            None => anyhow::bail!(
                "Invalid log level: {}. Valid options: nothing, user, error, warning, info, debug, all",
                s
            ),
        }
    }
}

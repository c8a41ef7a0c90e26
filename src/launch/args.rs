//! Engine command line
//!
//! Builds the argument vector handed to `Sys_Startup`. The engine treats
//! `+cmd args` sequences as console commands run after startup.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::LaunchError;

pub const DEFAULT_PLAYER_NAME: &str = "iOSPlayer";
pub const ENGINE_EXECUTABLE: &str = "quake3";
pub const BASE_GAME: &str = "baseq3";

/// Mods that need `cl_autodownload` to fetch their map packs
const AUTODOWNLOAD_MODS: &[&str] = &["q3ut4"];

/// Stock controller binds pushed to the engine's own joystick layer
const CONTROLLER_BINDS: &[(&str, &str)] = &[
    ("PAD0_RIGHTTRIGGER", "+attack"),
    ("PAD0_LEFTSTICK_UP", "+forward"),
    ("PAD0_LEFTSTICK_DOWN", "+back"),
    ("PAD0_LEFTSTICK_LEFT", "+moveleft"),
    ("PAD0_LEFTSTICK_RIGHT", "+moveright"),
    ("PAD0_RIGHTSTICK_UP", "+lookup"),
    ("PAD0_RIGHTSTICK_DOWN", "+lookdown"),
    ("PAD0_RIGHTSTICK_LEFT", "+left"),
    ("PAD0_RIGHTSTICK_RIGHT", "+right"),
    ("PAD0_A", "+moveup"),
    ("PAD0_LEFTSHOULDER", "weapnext"),
    ("PAD0_RIGHTSHOULDER", "weapprev"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for ServerAddress {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LaunchError::InvalidServer(s.to_string());
        let (host, port) = s.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse().map_err(|_| invalid())?;
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

/// Local match against bots, started with `+map` instead of `+spmap`
#[derive(Debug, Clone, PartialEq)]
pub struct BotMatch {
    pub bots: Vec<String>,
    pub skill: f32,
    pub time_limit: u32,
    pub frag_limit: u32,
}

impl Default for BotMatch {
    fn default() -> Self {
        Self {
            bots: Vec::new(),
            skill: 3.0,
            time_limit: 0,
            frag_limit: 20,
        }
    }
}

/// Everything that varies between launches
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchArgs {
    /// Directory the engine executable nominally lives in
    pub bundle_dir: PathBuf,
    /// Writable home holding `baseq3`; used as both base and home path
    pub home: PathBuf,
    pub game_mod: Option<String>,
    pub player_name: String,
    pub map: Option<String>,
    pub difficulty: u32,
    pub server: Option<ServerAddress>,
    pub bot_match: Option<BotMatch>,
    pub screen_width: u32,
    pub screen_height: u32,
    pub developer: bool,
}

impl LaunchArgs {
    pub fn new(bundle_dir: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        Self {
            bundle_dir: bundle_dir.into(),
            home: home.into(),
            game_mod: None,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            map: None,
            difficulty: 0,
            server: None,
            bot_match: None,
            screen_width: 0,
            screen_height: 0,
            developer: false,
        }
    }

    pub fn with_mod(mut self, game_mod: impl Into<String>) -> Self {
        self.game_mod = Some(game_mod.into());
        self
    }

    /// An empty name falls back to [`DEFAULT_PLAYER_NAME`]
    pub fn with_player_name(mut self, name: &str) -> Self {
        let name = name.trim();
        self.player_name = if name.is_empty() {
            DEFAULT_PLAYER_NAME.to_string()
        } else {
            name.to_string()
        };
        self
    }

    pub fn with_map(mut self, map: impl Into<String>, difficulty: u32) -> Self {
        self.map = Some(map.into());
        self.difficulty = difficulty;
        self
    }

    pub fn with_server(mut self, server: ServerAddress) -> Self {
        self.server = Some(server);
        self
    }

    pub fn with_bot_match(mut self, bot_match: BotMatch) -> Self {
        self.bot_match = Some(bot_match);
        self
    }

    /// Screen size in physical pixels
    pub fn with_screen(mut self, width: u32, height: u32) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    pub fn with_developer(mut self, developer: bool) -> Self {
        self.developer = developer;
        self
    }

    /// Argument vector, program name first
    pub fn build(&self) -> Vec<String> {
        let mut argv = ArgvBuilder::default();
        let home = self.home.display().to_string();

        argv.push(self.bundle_dir.join(ENGINE_EXECUTABLE).display().to_string());
        argv.set("com_basegame", BASE_GAME);
        argv.set("fs_basepath", &home);
        argv.set("fs_homepath", &home);
        argv.set("sv_pure", "0");

        if let Some(game_mod) = &self.game_mod {
            argv.set("fs_game", game_mod);
            if AUTODOWNLOAD_MODS.contains(&game_mod.as_str()) {
                argv.set("cl_autodownload", "1");
            }
        }

        argv.command("+name", &[&self.player_name]);

        if let Some(map) = &self.map {
            if self.bot_match.is_some() {
                argv.command("+map", &[map]);
            } else {
                argv.command("+spmap", &[map]);
                argv.command("+g_spSkill", &[&self.difficulty.to_string()]);
            }
        }

        if let Some(server) = &self.server {
            argv.command("+connect", &[&server.to_string()]);
        }

        if let Some(bot_match) = &self.bot_match {
            let skill = format!("{:?}", bot_match.skill);
            for bot in &bot_match.bots {
                argv.command("+addbot", &[bot, &skill]);
            }
            argv.set("timelimit", &bot_match.time_limit.to_string());
            argv.set("fraglimit", &bot_match.frag_limit.to_string());
        }

        argv.set("r_useOpenGLES", "1");
        argv.set("r_mode", "-1");
        argv.set("r_customwidth", &self.screen_width.to_string());
        argv.set("r_customheight", &self.screen_height.to_string());
        argv.set("s_sdlSpeed", "44100");
        argv.set("r_useHiDPI", "1");
        argv.set("r_fullscreen", "1");
        argv.set("in_joystick", "1");
        argv.set("in_joystickUseAnalog", "1");

        for &(key, command) in CONTROLLER_BINDS {
            argv.command("+bind", &[key, &format!("\"{command}\"")]);
        }

        if self.developer {
            argv.set("developer", "1");
        }

        argv.0
    }
}

#[derive(Default)]
struct ArgvBuilder(Vec<String>);

impl ArgvBuilder {
    fn push(&mut self, arg: String) {
        self.0.push(arg);
    }

    fn set(&mut self, cvar: &str, value: &str) {
        self.command("+set", &[cvar, value]);
    }

    fn command(&mut self, command: &str, args: &[&str]) {
        self.0.push(command.to_string());
        self.0.extend(args.iter().map(|a| a.to_string()));
    }
}

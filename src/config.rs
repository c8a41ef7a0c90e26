use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::input::{GamepadBindings, GamepadButton, GamepadOptions, StickTuning};
use crate::launch::{LaunchArgs, ServerAddress};
use crate::logging::LogLevel;
use crate::propfile::PropertyFile;

pub const CONFIG_FILE_NAME: &str = "q3ios.cfg";

/// Highest `g_spSkill` the engine accepts
pub const MAX_DIFFICULTY: u32 = 5;

/// Application options that can be set via CLI or config file
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    // Commandline-only options
    pub config_dir: Option<PathBuf>,
    pub bundle_dir: Option<PathBuf>,
    pub dry_run: bool,

    // Commandline and user config options
    pub home_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub log_level: LogLevel,
    pub resolution: Resolution,
    pub player_name: String,
    pub game_mod: Option<String>,
    pub map: Option<String>,
    pub difficulty: u32,
    pub server: Option<ServerAddress>,
    pub developer: bool,
    pub extract_assets: bool,

    // User config only
    pub tuning: StickTuning,
    pub gamepad: GamepadOptions,
    pub bindings: GamepadBindings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config_dir: None,
            bundle_dir: None,
            dry_run: false,
            home_dir: None,
            log_file: None,
            log_level: LogLevel::Info,
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            player_name: crate::launch::DEFAULT_PLAYER_NAME.to_string(),
            game_mod: None,
            map: None,
            difficulty: 0,
            server: None,
            developer: false,
            extract_assets: true,
            tuning: StickTuning::default(),
            gamepad: GamepadOptions::default(),
            bindings: GamepadBindings::default(),
        }
    }
}

impl Options {
    /// Per-launch settings shared by every request; the mod is left to the
    /// request itself
    pub fn launch_args(&self, bundle_dir: &Path, home: &Path) -> LaunchArgs {
        let mut args = LaunchArgs::new(bundle_dir, home)
            .with_player_name(&self.player_name)
            .with_screen(self.resolution.width, self.resolution.height)
            .with_developer(self.developer);
        if let Some(map) = &self.map {
            args = args.with_map(map.as_str(), self.difficulty);
        }
        if let Some(server) = &self.server {
            args = args.with_server(server.clone());
        }
        args
    }
}

/// Load `q3ios.cfg` from `config_dir` (or the working directory)
///
/// A missing file yields the defaults.
pub fn load_config(config_dir: Option<&Path>) -> Result<Options> {
    let path = config_dir
        .unwrap_or_else(|| Path::new("."))
        .join(CONFIG_FILE_NAME);

    if !path.is_file() {
        log::info!("No {} found, using defaults", path.display());
        return Ok(Options::default());
    }
    load_config_file(&path)
}

/// Load options from a specific property file
pub fn load_config_file(path: &Path) -> Result<Options> {
    let props = PropertyFile::load(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let mut opts = Options::default();
    apply_properties(&props, &mut opts);
    Ok(opts)
}

/// Copy recognised keys into `opts`
///
/// Values that fail to parse are logged and leave the current value alone.
pub fn apply_properties(props: &PropertyFile, opts: &mut Options) {
    if let Some(level) = props.get("log.level") {
        match LogLevel::parse(level) {
            Some(level) => opts.log_level = level,
            None => log::warn!("Unknown log level {:?}, keeping {:?}", level, opts.log_level),
        }
    }
    if let Some(file) = props.get("log.file") {
        opts.log_file = Some(PathBuf::from(file));
    }
    if let Some(dir) = props.get("home.dir") {
        opts.home_dir = Some(PathBuf::from(dir));
    }
    if let Some(res) = props.get("screen.resolution") {
        match parse_resolution(res) {
            Ok(res) => opts.resolution = res,
            Err(e) => log::warn!("screen.resolution: {:#}", e),
        }
    }

    if let Some(name) = props.get("launch.player_name") {
        opts.player_name = name.to_string();
    }
    if let Some(game_mod) = props.get("launch.mod").filter(|m| !m.is_empty()) {
        opts.game_mod = Some(game_mod.to_string());
    }
    if let Some(map) = props.get("launch.map").filter(|m| !m.is_empty()) {
        opts.map = Some(map.to_string());
    }
    if let Some(difficulty) = props.get("launch.difficulty") {
        match parse_difficulty(difficulty) {
            Ok(d) => opts.difficulty = d,
            Err(e) => log::warn!("launch.difficulty: {:#}", e),
        }
    }
    if let Some(server) = props.get("launch.server").filter(|s| !s.is_empty()) {
        match server.parse::<ServerAddress>() {
            Ok(server) => opts.server = Some(server),
            Err(e) => log::warn!("launch.server: {}", e),
        }
    }
    read_flag(props, "launch.developer", &mut opts.developer);
    read_flag(props, "launch.extract_assets", &mut opts.extract_assets);

    let tuning = &mut opts.tuning;
    read_value(props, "touch.deadzone", &mut tuning.deadzone);
    read_value(props, "touch.look_sensitivity", &mut tuning.look_sensitivity);
    read_value(props, "touch.look_acceleration", &mut tuning.look_acceleration);
    read_value(props, "touch.look_pixel_scale", &mut tuning.look_pixel_scale);
    read_value(props, "touch.movement_scale", &mut tuning.movement_scale);
    opts.tuning = opts.tuning.sanitized();

    let gamepad = &mut opts.gamepad;
    read_value(props, "gamepad.deadzone", &mut gamepad.deadzone);
    read_value(props, "gamepad.left_sensitivity", &mut gamepad.left_stick_sensitivity);
    read_value(props, "gamepad.right_sensitivity", &mut gamepad.right_stick_sensitivity);
    read_value(props, "gamepad.menu_mouse_speed", &mut gamepad.menu_mouse_speed);
    read_flag(props, "gamepad.use_analog", &mut gamepad.use_analog);
    read_value(props, "gamepad.side_axis", &mut gamepad.side_axis);
    read_value(props, "gamepad.forward_axis", &mut gamepad.forward_axis);
    read_value(props, "gamepad.yaw_axis", &mut gamepad.yaw_axis);
    read_value(props, "gamepad.pitch_axis", &mut gamepad.pitch_axis);
    opts.gamepad = opts.gamepad.sanitized();

    for (name, binding) in props.section("bind.") {
        match GamepadButton::from_name(name) {
            Some(button) => opts.bindings.set(button, binding),
            None => log::warn!("Ignoring binding for unknown button {:?}", name),
        }
    }
}

fn read_value<T: FromStr>(props: &PropertyFile, key: &str, target: &mut T) {
    match props.get_parsed::<T>(key) {
        Ok(Some(value)) => *target = value,
        Ok(None) => {}
        Err(e) => log::warn!("{}, keeping default", e),
    }
}

fn read_flag(props: &PropertyFile, key: &str, target: &mut bool) {
    match props.get_bool(key) {
        Ok(Some(value)) => *target = value,
        Ok(None) => {}
        Err(e) => log::warn!("{}, keeping default", e),
    }
}

/// Parse a resolution string in the format "WIDTHxHEIGHT"
pub fn parse_resolution(s: &str) -> Result<Resolution> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        anyhow::bail!("Resolution must be in WIDTHxHEIGHT format");
    }

    let width: u32 = parts[0].trim().parse().context("Invalid width value")?;
    let height: u32 = parts[1].trim().parse().context("Invalid height value")?;

    if width == 0 || height == 0 {
        anyhow::bail!("Resolution values must be positive");
    }

    Ok(Resolution { width, height })
}

/// Parse a single player skill level (0 leaves the engine default)
pub fn parse_difficulty(s: &str) -> Result<u32> {
    let difficulty: u32 = s.trim().parse().context("Invalid difficulty value")?;
    if difficulty > MAX_DIFFICULTY {
        anyhow::bail!("Difficulty out of range (0 to {})", MAX_DIFFICULTY);
    }
    Ok(difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_resolution_valid() {
        let res = parse_resolution("2048x1536").unwrap();
        assert_eq!(res.width, 2048);
        assert_eq!(res.height, 1536);
    }

    #[rstest]
    #[case("640-480")]
    #[case("640x480x120")]
    #[case("0x480")]
    #[case("640x0")]
    #[case("abcxdef")]
    fn test_parse_resolution_invalid(#[case] input: &str) {
        assert!(parse_resolution(input).is_err());
    }

    #[test]
    fn test_parse_difficulty() {
        assert_eq!(parse_difficulty("4").unwrap(), 4);
        assert_eq!(parse_difficulty(" 0 ").unwrap(), 0);
        assert!(parse_difficulty("6").is_err());
        assert!(parse_difficulty("hard").is_err());
    }

    #[test]
    fn test_options_default() {
        let opts = Options::default();
        assert_eq!(opts.player_name, "iOSPlayer");
        assert_eq!(opts.tuning, StickTuning::default());
        assert!(opts.extract_assets);
        assert!(opts.game_mod.is_none());
    }

    #[test]
    fn test_launch_args_from_options() {
        let opts = Options {
            player_name: "Ranger".to_string(),
            map: Some("q3dm17".to_string()),
            difficulty: 3,
            game_mod: Some("cpma".to_string()),
            ..Default::default()
        };

        let args = opts.launch_args(Path::new("/app"), Path::new("/docs"));
        assert_eq!(args.player_name, "Ranger");
        assert_eq!(args.map.as_deref(), Some("q3dm17"));
        assert_eq!(args.difficulty, 3);
        assert_eq!((args.screen_width, args.screen_height), (1920, 1080));
        assert!(args.game_mod.is_none());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let opts = load_config(Some(dir.path())).unwrap();
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "# device settings\n\
             log.level = debug\n\
             screen.resolution = 2732x2048\n\
             launch.player_name = Ranger\n\
             launch.mod = q3ut4\n\
             launch.server = 192.168.1.4:27960\n\
             launch.developer = yes\n\
             touch.deadzone = 0.05\n\
             touch.look_acceleration = 1.5\n\
             gamepad.use_analog = false\n\
             gamepad.menu_mouse_speed = 30\n\
             bind.buttonX = +zoom\n\
             bind.dpadUp = weapnext\n",
        )
        .unwrap();

        let opts = load_config(Some(dir.path())).unwrap();
        assert_eq!(opts.log_level, LogLevel::Debug);
        assert_eq!(
            opts.resolution,
            Resolution {
                width: 2732,
                height: 2048
            }
        );
        assert_eq!(opts.player_name, "Ranger");
        assert_eq!(opts.game_mod.as_deref(), Some("q3ut4"));
        assert_eq!(opts.server.as_ref().map(|s| s.port), Some(27960));
        assert!(opts.developer);
        assert_eq!(opts.tuning.deadzone, 0.05);
        assert_eq!(opts.tuning.look_acceleration, 1.5);
        assert!(!opts.gamepad.use_analog);
        assert_eq!(opts.gamepad.menu_mouse_speed, 30.0);
        assert_eq!(opts.bindings.get(GamepadButton::X), "+zoom");
        assert_eq!(opts.bindings.get(GamepadButton::DpadUp), "weapnext");
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let props = PropertyFile::parse(
            "touch.deadzone = 1.5\n\
             touch.look_sensitivity = fast\n\
             launch.difficulty = 9\n\
             launch.server = nowhere\n\
             screen.resolution = big\n\
             log.level = loud\n",
        );
        let mut opts = Options::default();
        apply_properties(&props, &mut opts);

        assert_eq!(opts, Options::default());
    }
}

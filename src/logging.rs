//! Logging
//!
//! Everything in the crate logs through the `log` facade. [`init`] installs
//! a [`BridgeLogger`] that writes to stderr and, optionally, a log file.
//! Calling it again reconfigures the installed logger, so a stderr logger
//! can be up before the config file that names the real level is read.
//! The native front-end logs into the same sink through [`rust_Log`].

use std::ffi::CStr;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use libc::{c_char, c_int};
use parking_lot::Mutex;

/// Log levels matching the C enum
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Nothing = 0,
    User = 1,
    Error = 2,
    Warning = 3,
    Info = 4,
    Debug = 5,
    All = 6,
}

impl LogLevel {
    /// Create a LogLevel from an integer
    pub fn from_i32(level: i32) -> Self {
        match level {
            0 => LogLevel::Nothing,
            1 => LogLevel::User,
            2 => LogLevel::Error,
            3 => LogLevel::Warning,
            4 => LogLevel::Info,
            5 => LogLevel::Debug,
            6 => LogLevel::All,
            _ => LogLevel::Info,
        }
    }

    /// Get the integer representation for the C interface
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Nothing => log::LevelFilter::Off,
            LogLevel::User | LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::All => log::LevelFilter::Trace,
        }
    }

    /// Facade level for a message logged at this level; `None` drops it
    pub fn to_level(self) -> Option<log::Level> {
        match self {
            LogLevel::Nothing => None,
            LogLevel::User | LogLevel::Error => Some(log::Level::Error),
            LogLevel::Warning => Some(log::Level::Warn),
            LogLevel::Info => Some(log::Level::Info),
            LogLevel::Debug => Some(log::Level::Debug),
            LogLevel::All => Some(log::Level::Trace),
        }
    }

    /// Parse a level name as used in the config file and on the command line
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "nothing" | "off" | "none" => Some(LogLevel::Nothing),
            "user" => Some(LogLevel::User),
            "error" => Some(LogLevel::Error),
            "warning" | "warn" => Some(LogLevel::Warning),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "all" | "trace" => Some(LogLevel::All),
            _ => None,
        }
    }
}

/// `log` backend writing to stderr and an optional file
pub struct BridgeLogger {
    filter: Mutex<log::LevelFilter>,
    stderr: bool,
    file: Mutex<Option<File>>,
}

static LOGGER: OnceLock<&'static BridgeLogger> = OnceLock::new();

impl BridgeLogger {
    pub fn new(level: LogLevel) -> Self {
        Self {
            filter: Mutex::new(level.to_filter()),
            stderr: true,
            file: Mutex::new(None),
        }
    }

    /// Also append every line to `path`, truncating it first
    pub fn with_file(self, path: &Path) -> Result<Self> {
        self.set_file(path)?;
        Ok(self)
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.filter.lock() = level.to_filter();
    }

    pub fn set_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        *self.file.lock() = Some(file);
        Ok(())
    }

    pub fn without_stderr(mut self) -> Self {
        self.stderr = false;
        self
    }

    fn format(record: &log::Record) -> String {
        format!("[{:<5} {}] {}", record.level(), record.target(), record.args())
    }
}

impl log::Log for BridgeLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= *self.filter.lock()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format(record);
        if self.stderr {
            eprintln!("{}", line);
        }
        if let Some(file) = self.file.lock().as_mut() {
            let _ = writeln!(file, "{}", line);
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

/// Install the process logger, or reconfigure it if ours is already in
///
/// Fails if some other logger owns the `log` facade.
pub fn init(level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let logger = match LOGGER.get() {
        Some(logger) => *logger,
        None => {
            let logger: &'static BridgeLogger = Box::leak(Box::new(BridgeLogger::new(level)));
            log::set_logger(logger).map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;
            *LOGGER.get_or_init(|| logger)
        }
    };

    logger.set_level(level);
    if let Some(path) = log_file {
        logger.set_file(path)?;
    }
    log::set_max_level(level.to_filter());
    Ok(())
}

/// Install the logger from C; `log_file` may be null
///
/// Returns 0 on success, -1 on failure.
///
/// # Safety
/// `log_file` must be null or a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn rust_Log_Init(level: c_int, log_file: *const c_char) -> c_int {
    let path = if log_file.is_null() {
        None
    } else {
        match CStr::from_ptr(log_file).to_str() {
            Ok(s) => Some(Path::new(s)),
            Err(_) => return -1,
        }
    };

    match init(LogLevel::from_i32(level), path) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("rust_Log_Init: {:#}", e);
            -1
        }
    }
}

/// Log one message from the native side
///
/// Returns 0 on success, -1 if the message is null or not UTF-8.
///
/// # Safety
/// `message` must be null or a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn rust_Log(level: c_int, message: *const c_char) -> c_int {
    if message.is_null() {
        return -1;
    }
    let message = match CStr::from_ptr(message).to_str() {
        Ok(s) => s,
        Err(_) => return -1,
    };

    if let Some(level) = LogLevel::from_i32(level).to_level() {
        log::log!(target: "native", level, "{}", message);
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use rstest::rstest;
    use std::ffi::CString;
    use tempfile::TempDir;

    #[test]
    fn test_log_level_from_i32() {
        assert_eq!(LogLevel::from_i32(0), LogLevel::Nothing);
        assert_eq!(LogLevel::from_i32(1), LogLevel::User);
        assert_eq!(LogLevel::from_i32(2), LogLevel::Error);
        assert_eq!(LogLevel::from_i32(3), LogLevel::Warning);
        assert_eq!(LogLevel::from_i32(4), LogLevel::Info);
        assert_eq!(LogLevel::from_i32(5), LogLevel::Debug);
        assert_eq!(LogLevel::from_i32(6), LogLevel::All);
    }

    #[test]
    fn test_log_level_invalid() {
        // Invalid values should default to Info
        assert_eq!(LogLevel::from_i32(100), LogLevel::Info);
        assert_eq!(LogLevel::from_i32(-1), LogLevel::Info);
    }

    #[test]
    fn test_log_level_as_i32() {
        assert_eq!(LogLevel::Nothing.as_i32(), 0);
        assert_eq!(LogLevel::Warning.as_i32(), 3);
        assert_eq!(LogLevel::All.as_i32(), 6);
    }

    #[rstest]
    #[case("warn", Some(LogLevel::Warning))]
    #[case("DEBUG", Some(LogLevel::Debug))]
    #[case(" off ", Some(LogLevel::Nothing))]
    #[case("trace", Some(LogLevel::All))]
    #[case("loud", None)]
    fn test_log_level_parse(#[case] name: &str, #[case] expected: Option<LogLevel>) {
        assert_eq!(LogLevel::parse(name), expected);
    }

    #[test]
    fn test_filter_mapping() {
        assert_eq!(LogLevel::Nothing.to_filter(), log::LevelFilter::Off);
        assert_eq!(LogLevel::User.to_filter(), log::LevelFilter::Error);
        assert_eq!(LogLevel::All.to_filter(), log::LevelFilter::Trace);
        assert_eq!(LogLevel::Nothing.to_level(), None);
        assert_eq!(LogLevel::Warning.to_level(), Some(log::Level::Warn));
    }

    #[test]
    fn test_bridge_logger_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("q3ios.log");
        let logger = BridgeLogger::new(LogLevel::Info)
            .with_file(&path)
            .unwrap()
            .without_stderr();

        logger.log(
            &log::Record::builder()
                .args(format_args!("extracted {} files", 3))
                .level(log::Level::Info)
                .target("assets")
                .build(),
        );
        logger.log(
            &log::Record::builder()
                .args(format_args!("too chatty"))
                .level(log::Level::Debug)
                .target("assets")
                .build(),
        );
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "[INFO  assets] extracted 3 files\n");
    }

    #[test]
    fn test_bridge_logger_reconfigure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("late.log");
        let logger = BridgeLogger::new(LogLevel::Warning).without_stderr();
        let debug = log::Metadata::builder().level(log::Level::Debug).build();
        assert!(!logger.enabled(&debug));

        logger.set_level(LogLevel::Debug);
        logger.set_file(&path).unwrap();
        assert!(logger.enabled(&debug));

        logger.log(
            &log::Record::builder()
                .args(format_args!("bad value"))
                .level(log::Level::Warn)
                .target("config")
                .build(),
        );
        logger.flush();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[WARN  config] bad value\n"
        );
    }

    #[test]
    fn test_with_file_bad_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir/q3ios.log");
        assert!(BridgeLogger::new(LogLevel::Info).with_file(&path).is_err());
    }

    #[test]
    fn test_rust_log_rejects_null() {
        assert_eq!(unsafe { rust_Log(4, std::ptr::null()) }, -1);
    }

    #[test]
    fn test_rust_log_accepts_message() {
        let msg = CString::new("hello from native").unwrap();
        assert_eq!(unsafe { rust_Log(3, msg.as_ptr()) }, 0);
        assert_eq!(unsafe { rust_Log(0, msg.as_ptr()) }, 0);
    }
}

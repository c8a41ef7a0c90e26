//! Engine control boundary
//!
//! Everything the front-end hands to the engine goes through one of two
//! traits: [`EngineSink`] for input events and console text, and
//! [`EngineHost`] for the one-shot process bootstrap.

use std::ffi::CString;
use std::path::Path;

use super::keys::KeyNum;

/// Key-capture bitmask reported by `Key_GetCatcher`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyCatch(pub u32);

impl KeyCatch {
    pub const CONSOLE: u32 = 0x0001;
    pub const UI: u32 = 0x0002;
    pub const MESSAGE: u32 = 0x0004;
    pub const CGAME: u32 = 0x0008;

    pub const NONE: KeyCatch = KeyCatch(0);

    pub fn bits(self) -> u32 {
        self.0
    }

    /// The console owns keyboard focus
    pub fn console_active(self) -> bool {
        self.0 & Self::CONSOLE != 0
    }

    /// Neither the console nor the UI has captured input
    pub fn in_game(self) -> bool {
        self.0 & (Self::UI | Self::CONSOLE) == 0
    }
}

/// Consumer of translated input
///
/// Implementations are fire-and-forget: callers never wait for the
/// engine to acknowledge an event.
pub trait EngineSink {
    /// Discrete key transition (`CL_KeyEvent`)
    fn send_key_event(&mut self, key: KeyNum, down: bool, time: u32);

    /// Continuous pointer motion (`CL_MouseEvent`)
    fn send_mouse_motion(&mut self, dx: i32, dy: i32, time: u32, relative: bool);

    /// Typed character for the console line editor
    fn send_char_event(&mut self, ch: u8);

    /// Analog joystick axis value
    fn send_joystick_axis(&mut self, axis: i32, value: i32, time: u32);

    /// Append text to the command buffer (`Cbuf_AddText`)
    fn inject_command(&mut self, text: &str);

    /// Current key-capture flags (`Key_GetCatcher`)
    fn key_capture_flags(&self) -> KeyCatch;

    /// Engine clock in milliseconds (`Sys_Milliseconds`)
    fn milliseconds(&self) -> u32;
}

/// Error type for engine bootstrap
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("argument contains an interior NUL byte: {0:?}")]
    InteriorNul(String),

    #[error("home directory is not valid UTF-8: {0}")]
    InvalidHomeDir(String),
}

/// Engine process bootstrap (`Sys_SetHomeDir`, `Sys_Startup`)
pub trait EngineHost {
    /// Establish the writable root for configuration and save data
    fn set_home_directory(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Start the engine; does not return until the engine shuts down
    fn start_engine(&mut self, argv: &[String]) -> Result<(), EngineError>;
}

/// Owned C-style argument vector
///
/// Keeps the `CString`s alive for as long as the pointer array is used.
pub struct CArgv {
    _strings: Vec<CString>,
    pointers: Vec<*mut libc::c_char>,
}

impl CArgv {
    pub fn new(args: &[String]) -> Result<Self, EngineError> {
        let strings = args
            .iter()
            .map(|s| CString::new(s.as_str()).map_err(|_| EngineError::InteriorNul(s.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let mut pointers: Vec<*mut libc::c_char> = strings
            .iter()
            .map(|cs| cs.as_ptr() as *mut libc::c_char)
            .collect();
        pointers.push(std::ptr::null_mut()); // Null-terminate

        Ok(Self {
            _strings: strings,
            pointers,
        })
    }

    /// Argument count, not counting the terminator
    pub fn argc(&self) -> libc::c_int {
        (self.pointers.len() - 1) as libc::c_int
    }

    pub fn as_mut_ptr(&mut self) -> *mut *mut libc::c_char {
        self.pointers.as_mut_ptr()
    }
}

/// One recorded sink call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Key { key: KeyNum, down: bool, time: u32 },
    Motion { dx: i32, dy: i32, time: u32, relative: bool },
    Char(u8),
    Axis { axis: i32, value: i32, time: u32 },
    Command(String),
}

/// Sink that records every call, with a settable clock and capture state
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
    pub catcher: KeyCatch,
    pub clock: u32,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ms: u32) {
        self.clock += ms;
    }

    /// Drain recorded events
    pub fn take(&mut self) -> Vec<SinkEvent> {
        std::mem::take(&mut self.events)
    }

    /// Key transitions only, as `(key, down)` pairs
    pub fn key_transitions(&self) -> Vec<(KeyNum, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Key { key, down, .. } => Some((*key, *down)),
                _ => None,
            })
            .collect()
    }

    pub fn commands(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Command(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl EngineSink for RecordingSink {
    fn send_key_event(&mut self, key: KeyNum, down: bool, time: u32) {
        self.events.push(SinkEvent::Key { key, down, time });
    }

    fn send_mouse_motion(&mut self, dx: i32, dy: i32, time: u32, relative: bool) {
        self.events.push(SinkEvent::Motion {
            dx,
            dy,
            time,
            relative,
        });
    }

    fn send_char_event(&mut self, ch: u8) {
        self.events.push(SinkEvent::Char(ch));
    }

    fn send_joystick_axis(&mut self, axis: i32, value: i32, time: u32) {
        self.events.push(SinkEvent::Axis { axis, value, time });
    }

    fn inject_command(&mut self, text: &str) {
        self.events.push(SinkEvent::Command(text.to_string()));
    }

    fn key_capture_flags(&self) -> KeyCatch {
        self.catcher
    }

    fn milliseconds(&self) -> u32 {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_catch_flags() {
        assert!(KeyCatch::NONE.in_game());
        assert!(!KeyCatch::NONE.console_active());

        let console = KeyCatch(KeyCatch::CONSOLE);
        assert!(console.console_active());
        assert!(!console.in_game());

        let ui = KeyCatch(KeyCatch::UI);
        assert!(!ui.console_active());
        assert!(!ui.in_game());

        // Chat and cgame capture do not count as leaving the game
        assert!(KeyCatch(KeyCatch::MESSAGE | KeyCatch::CGAME).in_game());
    }

    #[test]
    fn test_c_argv_null_terminated() {
        let args = vec!["quake3".to_string(), "+set".to_string()];
        let mut argv = CArgv::new(&args).unwrap();
        assert_eq!(argv.argc(), 2);

        let ptr = argv.as_mut_ptr();
        unsafe {
            assert!(!(*ptr).is_null());
            assert!((*ptr.add(2)).is_null());
        }
    }

    #[test]
    fn test_c_argv_rejects_interior_nul() {
        let args = vec!["bad\0arg".to_string()];
        assert!(matches!(
            CArgv::new(&args),
            Err(EngineError::InteriorNul(_))
        ));
    }

    #[test]
    fn test_recording_sink_filters() {
        let mut sink = RecordingSink::new();
        sink.send_key_event(32, true, 0);
        sink.inject_command("+attack\n");
        sink.send_mouse_motion(1, 2, 0, true);

        assert_eq!(sink.key_transitions(), vec![(32, true)]);
        assert_eq!(sink.commands(), vec!["+attack\n"]);
        assert_eq!(sink.take().len(), 3);
        assert!(sink.events.is_empty());
    }
}

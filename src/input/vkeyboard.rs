//! Console virtual keyboard
//!
//! A 5x12 grid drawn under the console. The cursor is driven by a game
//! controller's d-pad or by touches, and selecting a key turns into char
//! or key events for the console line editor.

use crate::engine::keys::{
    KeyNum, K_BACKSPACE, K_CONSOLE, K_DOWNARROW, K_ENTER, K_LEFTARROW, K_RIGHTARROW, K_UPARROW,
};
use crate::engine::EngineSink;

pub const VK_ROWS: usize = 5;
pub const VK_COLS: usize = 12;

/// Gap between keys in pixels
pub const VK_KEY_SPACING: i32 = 2;

/// ASCII backspace, as understood by the console line editor
const CHAR_BACKSPACE: u8 = 8;

type Layout = [[&'static str; VK_COLS]; VK_ROWS];

const LAYOUT_NORMAL: Layout = [
    ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "-", "="],
    ["q", "w", "e", "r", "t", "y", "u", "i", "o", "p", "[", "]"],
    ["a", "s", "d", "f", "g", "h", "j", "k", "l", ";", "'", "\\"],
    ["z", "x", "c", "v", "b", "n", "m", "UP", ",", ".", "/", "DEL"],
    [
        "SHIFT", "SPACE", "SPACE", "SPACE", "SPACE", "SPACE", "SPACE", "LEFT", "DOWN", "RIGHT",
        "ENTER", "ENTER",
    ],
];

const LAYOUT_SHIFTED: Layout = [
    ["!", "@", "#", "$", "%", "^", "&", "*", "(", ")", "_", "+"],
    ["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "{", "}"],
    ["A", "S", "D", "F", "G", "H", "J", "K", "L", ":", "\"", "|"],
    ["Z", "X", "C", "V", "B", "N", "M", "UP", "<", ">", "?", "DEL"],
    [
        "SHIFT", "SPACE", "SPACE", "SPACE", "SPACE", "SPACE", "SPACE", "LEFT", "DOWN", "RIGHT",
        "ENTER", "ENTER",
    ],
];

/// Key widths in columns; 0 marks a continuation cell of the key to its left
pub const KEY_WIDTHS: [[i32; VK_COLS]; VK_ROWS] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [2, 5, 0, 0, 0, 0, 0, 1, 1, 1, 2, 0],
];

/// Pixel geometry shared by drawing and touch hit testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardMetrics {
    pub key_height: i32,
    pub base_key_width: i32,
    pub start_x: i32,
    pub start_y: i32,
}

impl KeyboardMetrics {
    /// Lay the grid out in the area below a console of `console_height`
    pub fn new(console_height: f32, vid_width: i32, vid_height: i32) -> Self {
        let available_height = (vid_height as f32 - console_height - 20.0) as i32;
        let available_width = vid_width - 40;

        let key_height =
            ((available_height - (VK_ROWS as i32 - 1) * VK_KEY_SPACING) / VK_ROWS as i32).max(40);
        let base_key_width = (available_width / 14).max(50);

        let widest = (0..VK_ROWS)
            .map(|row| Self::row_width(row, base_key_width))
            .max()
            .unwrap_or(0);

        Self {
            key_height,
            base_key_width,
            start_x: (vid_width - widest) / 2,
            start_y: (console_height + 10.0) as i32,
        }
    }

    /// Width of a key spanning `columns` grid cells
    pub fn key_width(&self, columns: i32) -> i32 {
        self.base_key_width * columns + VK_KEY_SPACING * (columns - 1)
    }

    fn row_width(row: usize, base_key_width: i32) -> i32 {
        let widths = KEY_WIDTHS[row].iter().filter(|w| **w > 0);
        let keys = widths.clone().count() as i32;
        let total: i32 = widths.map(|w| base_key_width * w + VK_KEY_SPACING).sum();
        if keys > 0 {
            total - VK_KEY_SPACING
        } else {
            0
        }
    }

    /// Grid cell under a pixel, if any
    pub fn hit(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let row = ((y - self.start_y as f32) / (self.key_height + VK_KEY_SPACING) as f32).floor();
        if row < 0.0 || row >= VK_ROWS as f32 {
            return None;
        }
        let row = row as usize;

        let mut current_x = self.start_x as f32;
        for (col, &columns) in KEY_WIDTHS[row].iter().enumerate() {
            if columns == 0 {
                continue;
            }
            let width = self.key_width(columns) as f32;
            if x >= current_x && x < current_x + width {
                return Some((row, col));
            }
            current_x += width + VK_KEY_SPACING as f32;
        }
        None
    }
}

/// What a grid key does when selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Shift,
    Char(u8),
    Press(KeyNum),
    Delete,
    Unknown,
}

fn classify(label: &str) -> KeyKind {
    match label {
        "SHIFT" => KeyKind::Shift,
        "SPACE" => KeyKind::Char(b' '),
        "ENTER" => KeyKind::Press(K_ENTER),
        "UP" => KeyKind::Press(K_UPARROW),
        "DOWN" => KeyKind::Press(K_DOWNARROW),
        "LEFT" => KeyKind::Press(K_LEFTARROW),
        "RIGHT" => KeyKind::Press(K_RIGHTARROW),
        "DEL" => KeyKind::Delete,
        _ => match label.as_bytes() {
            [ch] => KeyKind::Char(*ch),
            _ => KeyKind::Unknown,
        },
    }
}

/// Virtual keyboard state
#[derive(Debug, Clone, Default)]
pub struct VirtualKeyboard {
    active: bool,
    cursor_x: usize,
    cursor_y: usize,
    shifted: bool,
}

impl VirtualKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_shifted(&self) -> bool {
        self.shifted
    }

    pub fn set_shift(&mut self, shifted: bool) {
        self.shifted = shifted;
    }

    /// Cursor as (column, row)
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_x, self.cursor_y)
    }

    /// Label of the key at a grid cell in the current shift state
    pub fn key_at(&self, row: usize, col: usize) -> Option<&'static str> {
        let layout = if self.shifted {
            &LAYOUT_SHIFTED
        } else {
            &LAYOUT_NORMAL
        };
        layout.get(row)?.get(col).copied()
    }

    /// Open or close the keyboard together with the console
    ///
    /// The console key is only sent when the capture flags disagree with
    /// the new state, so an already-open console stays open.
    pub fn toggle(&mut self, sink: &mut dyn EngineSink, time: u32) {
        self.active = !self.active;
        let console_open = sink.key_capture_flags().console_active();

        if self.active {
            self.cursor_x = 0;
            self.cursor_y = 0;
            self.shifted = false;
            if !console_open {
                tap_key(sink, K_CONSOLE, time);
            }
        } else if console_open {
            tap_key(sink, K_CONSOLE, time);
        }
        log::debug!("Virtual keyboard {}", if self.active { "opened" } else { "closed" });
    }

    /// Move the cursor, wrapping at the grid edges
    ///
    /// Landing on a continuation cell snaps back to the start of its key
    /// unless moving right, which skips to the next key instead.
    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        if !self.active {
            return;
        }

        let mut x = self.cursor_x as i32 + dx;
        let mut y = self.cursor_y as i32 + dy;

        if y < 0 {
            y = VK_ROWS as i32 - 1;
        }
        if y >= VK_ROWS as i32 {
            y = 0;
        }
        if x < 0 {
            x = VK_COLS as i32 - 1;
        }
        if x >= VK_COLS as i32 {
            x = 0;
        }

        let row = &KEY_WIDTHS[y as usize];
        if dx > 0 {
            while row[x as usize] == 0 {
                x = (x + 1) % VK_COLS as i32;
            }
        } else {
            while row[x as usize] == 0 && x > 0 {
                x -= 1;
            }
            if row[x as usize] == 0 {
                x = row.iter().position(|w| *w > 0).unwrap_or(0) as i32;
            }
        }

        self.cursor_x = x as usize;
        self.cursor_y = y as usize;
    }

    /// Activate the key under the cursor
    pub fn select(&mut self, sink: &mut dyn EngineSink, time: u32) {
        if !self.active {
            return;
        }
        let Some(label) = self.key_at(self.cursor_y, self.cursor_x) else {
            return;
        };

        match classify(label) {
            KeyKind::Shift => {
                self.shifted = !self.shifted;
                return;
            }
            KeyKind::Char(ch) => sink.send_char_event(ch),
            KeyKind::Press(key) => tap_key(sink, key, time),
            KeyKind::Delete => sink.send_char_event(CHAR_BACKSPACE),
            KeyKind::Unknown => log::warn!("Unhandled virtual key {:?}", label),
        }

        self.shifted = false;
    }

    /// Delete the character before the console cursor
    pub fn backspace(&mut self, sink: &mut dyn EngineSink, time: u32) {
        if !self.active {
            return;
        }
        tap_key(sink, K_BACKSPACE, time);
        sink.send_char_event(CHAR_BACKSPACE);
    }

    /// Select the key under a touch in screen pixels
    ///
    /// Returns whether a key was hit.
    pub fn touch(
        &mut self,
        x: f32,
        y: f32,
        console_height: f32,
        vid_width: i32,
        vid_height: i32,
        sink: &mut dyn EngineSink,
        time: u32,
    ) -> bool {
        if !self.active {
            return false;
        }
        let metrics = KeyboardMetrics::new(console_height, vid_width, vid_height);
        match metrics.hit(x, y) {
            Some((row, col)) => {
                self.cursor_x = col;
                self.cursor_y = row;
                self.select(sink, time);
                true
            }
            None => false,
        }
    }

    /// Touch in normalized [0, 1] coordinates, console covering the top half
    pub fn touch_normalized(
        &mut self,
        nx: f32,
        ny: f32,
        vid_width: i32,
        vid_height: i32,
        sink: &mut dyn EngineSink,
        time: u32,
    ) -> bool {
        let x = (nx * vid_width as f32) as i32;
        let y = (ny * vid_height as f32) as i32;
        let console_height = vid_height as f32 * 0.5;
        self.touch(x as f32, y as f32, console_height, vid_width, vid_height, sink, time)
    }
}

fn tap_key(sink: &mut dyn EngineSink, key: KeyNum, time: u32) {
    sink.send_key_event(key, true, time);
    sink.send_key_event(key, false, time);
}

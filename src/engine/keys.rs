//! Engine key numbers and key names
//!
//! Key numbers follow the engine's `keyNum_t` enum. Names follow the
//! engine's binding table so controller binding strings resolve to the
//! same key the console `bind` command would pick.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Engine key number (`keyNum_t`)
pub type KeyNum = i32;

pub const K_TAB: KeyNum = 9;
pub const K_ENTER: KeyNum = 13;
pub const K_ESCAPE: KeyNum = 27;
pub const K_SPACE: KeyNum = 32;
pub const K_BACKSPACE: KeyNum = 127;
pub const K_COMMAND: KeyNum = 128;
pub const K_CAPSLOCK: KeyNum = 129;
pub const K_POWER: KeyNum = 130;
pub const K_PAUSE: KeyNum = 131;
pub const K_UPARROW: KeyNum = 132;
pub const K_DOWNARROW: KeyNum = 133;
pub const K_LEFTARROW: KeyNum = 134;
pub const K_RIGHTARROW: KeyNum = 135;
pub const K_ALT: KeyNum = 136;
pub const K_CTRL: KeyNum = 137;
pub const K_SHIFT: KeyNum = 138;
pub const K_INS: KeyNum = 139;
pub const K_DEL: KeyNum = 140;
pub const K_PGDN: KeyNum = 141;
pub const K_PGUP: KeyNum = 142;
pub const K_HOME: KeyNum = 143;
pub const K_END: KeyNum = 144;
pub const K_F1: KeyNum = 145;
pub const K_MOUSE1: KeyNum = 178;
pub const K_MWHEELDOWN: KeyNum = 183;
pub const K_MWHEELUP: KeyNum = 184;
pub const K_JOY1: KeyNum = 185;
pub const K_JOY5: KeyNum = K_JOY1 + 4;
pub const K_JOY6: KeyNum = K_JOY1 + 5;
pub const K_JOY7: KeyNum = K_JOY1 + 6;
pub const K_AUX1: KeyNum = 217;

/// Pseudo-key that brings the console down (last entry before `MAX_KEYS`)
pub const K_CONSOLE: KeyNum = 365;

/// Strafe keys used by the movement stick ('a' / 'd')
pub const K_STRAFE_LEFT: KeyNum = b'a' as KeyNum;
pub const K_STRAFE_RIGHT: KeyNum = b'd' as KeyNum;

/// Engine key number to binding name
static KEY_NAMES: LazyLock<HashMap<KeyNum, String>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    for (code, name) in [
        (K_TAB, "TAB"),
        (K_ENTER, "ENTER"),
        (K_ESCAPE, "ESCAPE"),
        (K_SPACE, "SPACE"),
        (K_BACKSPACE, "BACKSPACE"),
        (K_COMMAND, "COMMAND"),
        (K_CAPSLOCK, "CAPSLOCK"),
        (K_POWER, "POWER"),
        (K_PAUSE, "PAUSE"),
        (K_UPARROW, "UPARROW"),
        (K_DOWNARROW, "DOWNARROW"),
        (K_LEFTARROW, "LEFTARROW"),
        (K_RIGHTARROW, "RIGHTARROW"),
        (K_ALT, "ALT"),
        (K_CTRL, "CTRL"),
        (K_SHIFT, "SHIFT"),
        (K_INS, "INS"),
        (K_DEL, "DEL"),
        (K_PGDN, "PGDN"),
        (K_PGUP, "PGUP"),
        (K_HOME, "HOME"),
        (K_END, "END"),
        (K_MWHEELDOWN, "MWHEELDOWN"),
        (K_MWHEELUP, "MWHEELUP"),
        (K_CONSOLE, "CONSOLE"),
        (b';' as KeyNum, "SEMICOLON"),
    ] {
        m.insert(code, name.to_string());
    }

    // F1..F15
    for i in 0..15 {
        m.insert(K_F1 + i, format!("F{}", i + 1));
    }
    // MOUSE1..MOUSE5
    for i in 0..5 {
        m.insert(K_MOUSE1 + i, format!("MOUSE{}", i + 1));
    }
    // JOY1..JOY32
    for i in 0..32 {
        m.insert(K_JOY1 + i, format!("JOY{}", i + 1));
    }
    // AUX1..AUX16
    for i in 0..16 {
        m.insert(K_AUX1 + i, format!("AUX{}", i + 1));
    }

    m
});

/// Binding name to key number (reverse lookup, upper case)
static NAME_TO_KEY: LazyLock<HashMap<String, KeyNum>> = LazyLock::new(|| {
    KEY_NAMES
        .iter()
        .map(|(&code, name)| (name.clone(), code))
        .collect()
});

/// Get the binding name for a key number
///
/// Printable ASCII keys are named by their character.
pub fn key_name(key: KeyNum) -> String {
    if let Some(name) = KEY_NAMES.get(&key) {
        return name.clone();
    }
    if (33..127).contains(&key) {
        return (key as u8 as char).to_string();
    }
    "Unknown".to_string()
}

/// Resolve a binding name to a key number
///
/// Accepts single characters (resolved to their lower-case ASCII value),
/// `0x` hex literals, and table names in any case.
pub fn key_from_name(name: &str) -> Option<KeyNum> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let bytes = name.as_bytes();
    if bytes.len() == 1 {
        return Some(bytes[0].to_ascii_lowercase() as KeyNum);
    }

    if let Some(hex) = name.strip_prefix("0x").or_else(|| name.strip_prefix("0X")) {
        return KeyNum::from_str_radix(hex, 16).ok().filter(|&k| k > 0);
    }

    NAME_TO_KEY.get(&name.to_ascii_uppercase()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_known() {
        assert_eq!(key_name(K_SPACE), "SPACE");
        assert_eq!(key_name(K_ESCAPE), "ESCAPE");
        assert_eq!(key_name(K_UPARROW), "UPARROW");
        assert_eq!(key_name(K_MWHEELUP), "MWHEELUP");
    }

    #[test]
    fn test_key_name_printable() {
        assert_eq!(key_name(K_STRAFE_LEFT), "a");
        assert_eq!(key_name(b'1' as KeyNum), "1");
    }

    #[test]
    fn test_key_name_unknown() {
        assert_eq!(key_name(99999), "Unknown");
    }

    #[test]
    fn test_generated_ranges() {
        assert_eq!(key_name(K_JOY5), "JOY5");
        assert_eq!(key_name(K_JOY7), "JOY7");
        assert_eq!(key_name(K_F1 + 11), "F12");
        assert_eq!(key_name(K_AUX1 + 15), "AUX16");
    }

    #[test]
    fn test_key_from_name_case_insensitive() {
        assert_eq!(key_from_name("space"), Some(K_SPACE));
        assert_eq!(key_from_name("Mouse1"), Some(K_MOUSE1));
        assert_eq!(key_from_name("JOY6"), Some(K_JOY6));
    }

    #[test]
    fn test_key_from_name_single_char() {
        assert_eq!(key_from_name("A"), Some(b'a' as KeyNum));
        assert_eq!(key_from_name("d"), Some(K_STRAFE_RIGHT));
    }

    #[test]
    fn test_key_from_name_hex() {
        assert_eq!(key_from_name("0x84"), Some(K_UPARROW));
        assert_eq!(key_from_name("0xzz"), None);
    }

    #[test]
    fn test_key_from_name_not_found() {
        assert_eq!(key_from_name("NotAKey"), None);
        assert_eq!(key_from_name(""), None);
    }
}

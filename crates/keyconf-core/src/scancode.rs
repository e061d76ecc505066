// Keyconf Scancodes
// HID keyboard usage ids used by keystroke actions

use std::fmt;
use std::str::FromStr;

include!(concat!(env!("OUT_DIR"), "/scancodes.rs"));

/// Display name for a usage id
pub fn scancode_name(code: u16) -> &'static str {
    SCANCODE_NAMES
        .get(usize::from(code))
        .copied()
        .unwrap_or("UNKNOWN")
}

/// Look up a usage id by its display name (case-insensitive)
pub fn scancode_from_name(name: &str) -> Option<Scancode> {
    let upper = name.trim().to_ascii_uppercase();
    if upper.is_empty() || upper == "UNKNOWN" {
        return None;
    }
    let alias = match upper.as_str() {
        "ESC" => "ESCAPE",
        "RETURN" => "ENTER",
        "BKSP" => "BACKSPACE",
        "DEL" => "DELETE",
        "PGUP" => "PAGE_UP",
        "PGDN" => "PAGE_DOWN",
        other => other,
    };
    SCANCODE_NAMES
        .iter()
        .position(|n| *n == alias)
        .and_then(|code| u16::try_from(code).ok())
        .map(Scancode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scancode_names() {
        assert_eq!(Scancode(4).name(), "A");
        assert_eq!(Scancode(29).name(), "Z");
        assert_eq!(Scancode(39).name(), "0");
        assert_eq!(Scancode(44).name(), "SPACE");
        assert_eq!(Scancode(0xE7).name(), "RIGHT_SUPER");
        assert_eq!(Scancode(0x1FF).name(), "UNKNOWN");
        assert_eq!(Scancode(0x32).name(), "UNKNOWN");
        assert_eq!(usize::from(MAX_SCANCODE) + 1, SCANCODE_NAMES.len());
    }

    #[test]
    fn test_scancode_from_name() {
        assert_eq!(scancode_from_name("a"), Some(Scancode(4)));
        assert_eq!(scancode_from_name("Esc"), Some(Scancode(41)));
        assert_eq!(scancode_from_name("f12"), Some(Scancode(69)));
        assert_eq!(scancode_from_name("unknown"), None);
        assert_eq!(scancode_from_name("NOPE"), None);
    }

    #[test]
    fn test_scancode_parse_and_display() {
        let code: Scancode = "enter".parse().unwrap();
        assert_eq!(code, Scancode(40));
        assert_eq!(format!("{}", code), "ENTER");
        assert!("bogus".parse::<Scancode>().is_err());
    }
}

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Highest HID usage id given a name
const MAX_SCANCODE: usize = 0xE7;

/// Display names indexed by usage id (HID Usage Tables, page 0x07)
fn scancode_names() -> Vec<String> {
    let mut names = vec!["UNKNOWN".to_string(); MAX_SCANCODE + 1];
    for (i, letter) in ('A'..='Z').enumerate() {
        names[0x04 + i] = letter.to_string();
    }
    for (i, digit) in "1234567890".chars().enumerate() {
        names[0x1E + i] = digit.to_string();
    }
    let named: [(usize, &str); 29] = [
        (0x28, "ENTER"),
        (0x29, "ESCAPE"),
        (0x2A, "BACKSPACE"),
        (0x2B, "TAB"),
        (0x2C, "SPACE"),
        (0x2D, "MINUS"),
        (0x2E, "EQUAL"),
        (0x2F, "LEFT_BRACKET"),
        (0x30, "RIGHT_BRACKET"),
        (0x31, "BACKSLASH"),
        (0x33, "SEMICOLON"),
        (0x34, "APOSTROPHE"),
        (0x35, "GRAVE"),
        (0x36, "COMMA"),
        (0x37, "DOT"),
        (0x38, "SLASH"),
        (0x39, "CAPSLOCK"),
        (0x46, "PRINT_SCREEN"),
        (0x47, "SCROLL_LOCK"),
        (0x48, "PAUSE"),
        (0x49, "INSERT"),
        (0x4A, "HOME"),
        (0x4B, "PAGE_UP"),
        (0x4C, "DELETE"),
        (0x4D, "END"),
        (0x4E, "PAGE_DOWN"),
        (0x4F, "RIGHT"),
        (0x50, "LEFT"),
        (0x51, "DOWN"),
    ];
    for (code, name) in named {
        names[code] = name.to_string();
    }
    names[0x52] = "UP".to_string();
    for n in 1..=12 {
        names[0x3A + n - 1] = format!("F{}", n);
    }
    let modifiers = [
        "LEFT_CTRL",
        "LEFT_SHIFT",
        "LEFT_ALT",
        "LEFT_SUPER",
        "RIGHT_CTRL",
        "RIGHT_SHIFT",
        "RIGHT_ALT",
        "RIGHT_SUPER",
    ];
    for (i, name) in modifiers.iter().enumerate() {
        names[0xE0 + i] = name.to_string();
    }
    names
}

fn main() -> std::io::Result<()> {
    let out_dir = env::var("OUT_DIR").map_err(std::io::Error::other)?;
    let dest_path = Path::new(&out_dir).join("scancodes.rs");
    let mut f = File::create(&dest_path)?;

    // Generate the Scancode newtype wrapper
    writeln!(
        f,
        r#"
/// A USB HID keyboard usage id as stored in a keystroke action.
///
/// This is a newtype wrapper around u16 for type safety.
/// The numeric values match the HID Usage Tables, page 0x07.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Scancode(pub u16);

impl Scancode {{
    /// Get the raw usage id
    pub fn code(self) -> u16 {{
        self.0
    }}

    /// Get the display name of this scancode
    pub fn name(self) -> &'static str {{
        scancode_name(self.0)
    }}
}}

impl From<u16> for Scancode {{
    fn from(code: u16) -> Self {{
        Scancode(code)
    }}
}}

impl From<Scancode> for u16 {{
    fn from(scancode: Scancode) -> Self {{
        scancode.0
    }}
}}

impl fmt::Display for Scancode {{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{
        write!(f, "{{}}", self.name())
    }}
}}

impl FromStr for Scancode {{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {{
        scancode_from_name(s).ok_or_else(|| format!("Unknown scancode: {{}}", s))
    }}
}}
"#
    )?;

    let names = scancode_names();
    writeln!(f, "/// Highest usage id covered by the name table")?;
    writeln!(f, "pub const MAX_SCANCODE: u16 = {:#X};", MAX_SCANCODE)?;
    writeln!(f, "const SCANCODE_NAMES: [&str; {}] = [", names.len())?;
    for name in &names {
        writeln!(f, "    {:?},", name)?;
    }
    writeln!(f, "];")?;

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}

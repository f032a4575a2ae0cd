//! Output helpers shared by the subcommands.
//!
//! Global flags are exported as environment variables by `main` so every
//! command can consult them without threading the parsed CLI around.

use std::io::IsTerminal;

pub const JSON_ENV: &str = "DYNJUMP_JSON";
pub const QUIET_ENV: &str = "DYNJUMP_QUIET";
pub const VERBOSE_ENV: &str = "DYNJUMP_VERBOSE";
pub const NO_COLOR_ENV: &str = "DYNJUMP_NO_COLOR";

fn flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1")
}

/// `--json` was given.
pub fn is_json() -> bool {
    flag(JSON_ENV)
}

/// `--quiet` was given, or JSON output replaces the human report.
pub fn is_quiet() -> bool {
    flag(QUIET_ENV) || is_json()
}

pub fn is_verbose() -> bool {
    flag(VERBOSE_ENV)
}

/// Print a JSON value on stdout.
pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("  failed to encode JSON output: {e}"),
    }
}

/// Status symbols, colored when stderr is a terminal.
pub struct Styled {
    color: bool,
}

impl Styled {
    pub fn new() -> Self {
        let color = !flag(NO_COLOR_ENV)
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stderr().is_terminal();
        Self { color }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn ok_sym(&self) -> String {
        self.paint("32", "✓")
    }

    pub fn warn_sym(&self) -> String {
        self.paint("33", "!")
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

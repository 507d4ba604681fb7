//! Builtin commands, completion candidates, and syntax hints.

use anyhow::Result;

use lino::{BridgeConfig, Hint, HintColor};

struct Builtin {
    name: &'static str,
    /// Argument syntax, rendered as the inline hint after the name.
    args: &'static str,
    help: &'static str,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "help",
        args: "",
        help: "list commands",
    },
    Builtin {
        name: "history",
        args: " save|load [file]",
        help: "persist or restore history",
    },
    Builtin {
        name: "clear",
        args: "",
        help: "clear the screen",
    },
    Builtin {
        name: "multiline",
        args: " on|off",
        help: "toggle multi-line editing",
    },
    Builtin {
        name: "keycodes",
        args: "",
        help: "echo raw key codes (debug)",
    },
    Builtin {
        name: "exit",
        args: "",
        help: "leave the shell",
    },
];

/// Command names matching the current buffer by prefix.
pub fn complete(buffer: &str) -> Vec<&'static str> {
    BUILTINS
        .iter()
        .filter(|builtin| builtin.name.starts_with(buffer))
        .map(|builtin| builtin.name)
        .collect()
}

/// Inline syntax hint, shown once a command name is fully typed.
pub fn hint(buffer: &str) -> Option<Hint> {
    let builtin = BUILTINS
        .iter()
        .find(|builtin| builtin.name == buffer.trim_end())?;
    if builtin.args.is_empty() {
        return None;
    }
    Some(Hint {
        text: builtin.args.to_string(),
        color: HintColor::Magenta,
        bold: false,
    })
}

/// Execute one input line. Returns `false` when the shell should exit.
pub fn dispatch(line: &str, config: &BridgeConfig) -> Result<bool> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");

    match command {
        "help" => {
            for builtin in BUILTINS {
                println!(
                    "  {:<22} {}",
                    format!("{}{}", builtin.name, builtin.args),
                    builtin.help
                );
            }
        }
        "clear" => lino::clear_screen()?,
        "keycodes" => lino::print_key_codes()?,
        "multiline" => match parts.next() {
            Some("on") => lino::set_multiline(true)?,
            Some("off") => lino::set_multiline(false)?,
            _ => eprintln!("[linosh] usage: multiline on|off"),
        },
        "history" => match parts.next() {
            Some("save") => {
                let path = history_target(parts.next(), config);
                report_status("save", lino::history_save(&path)?);
            }
            Some("load") => {
                let path = history_target(parts.next(), config);
                report_status("load", lino::history_load(&path)?);
            }
            _ => eprintln!("[linosh] usage: history save|load [file]"),
        },
        "exit" => return Ok(false),
        other => eprintln!("[linosh] unknown command: {other}"),
    }

    Ok(true)
}

fn history_target(file: Option<&str>, config: &BridgeConfig) -> String {
    match file {
        Some(path) => path.to_string(),
        None => config
            .history_file
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from(".lino_history")),
    }
}

fn report_status(operation: &str, status: i32) {
    if status == 0 {
        println!("history {operation} ok");
    } else {
        eprintln!("[linosh] history {operation} failed (status {status})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_by_prefix() {
        assert_eq!(complete("h"), vec!["help", "history"]);
        assert_eq!(complete("mu"), vec!["multiline"]);
        assert!(complete("zz").is_empty());
    }

    #[test]
    fn test_complete_empty_buffer_lists_all() {
        assert_eq!(complete("").len(), BUILTINS.len());
    }

    #[test]
    fn test_hint_for_command_with_arguments() {
        let hint = hint("multiline").expect("multiline takes arguments");
        assert_eq!(hint.text, " on|off");
        assert_eq!(hint.color, HintColor::Magenta);
        assert!(!hint.bold);
    }

    #[test]
    fn test_hint_ignores_trailing_whitespace() {
        assert!(hint("history ").is_some());
    }

    #[test]
    fn test_no_hint_for_unknown_or_bare_commands() {
        assert!(hint("frobnicate").is_none());
        assert!(hint("exit").is_none());
        assert!(hint("").is_none());
    }
}

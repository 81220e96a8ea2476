//! Slash commands typed into the chat input.

use std::path::PathBuf;

use delia_core::api::{Agent, UserLevel};

/// Definition of a command, for `/help`.
#[derive(Debug, Clone)]
pub struct Command {
    /// Primary name without the leading slash.
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub description: &'static str,
}

impl Command {
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

pub const COMMANDS: &[Command] = &[
    Command {
        name: "agent",
        aliases: &[],
        usage: "/agent [documents|edsl]",
        description: "Switch agent (toggles without an argument)",
    },
    Command {
        name: "level",
        aliases: &[],
        usage: "/level [basic|intermediate|advanced]",
        description: "Set the EDSL knowledge level",
    },
    Command {
        name: "upload",
        aliases: &[],
        usage: "/upload <path>",
        description: "Upload a .pdf, .txt, .json or .xlsx document",
    },
    Command {
        name: "docs",
        aliases: &["documents"],
        usage: "/docs",
        description: "List uploaded documents",
    },
    Command {
        name: "stats",
        aliases: &[],
        usage: "/stats",
        description: "Refresh knowledge base statistics",
    },
    Command {
        name: "cleardb",
        aliases: &[],
        usage: "/cleardb",
        description: "Delete every document (asks first)",
    },
    Command {
        name: "clear",
        aliases: &["new"],
        usage: "/clear",
        description: "Clear the conversation",
    },
    Command {
        name: "login",
        aliases: &[],
        usage: "/login",
        description: "Log in with another account",
    },
    Command {
        name: "logout",
        aliases: &[],
        usage: "/logout",
        description: "Forget the stored token",
    },
    Command {
        name: "help",
        aliases: &["?"],
        usage: "/help",
        description: "Show commands and key bindings",
    },
    Command {
        name: "quit",
        aliases: &["q", "exit"],
        usage: "/quit",
        description: "Exit DELIA",
    },
];

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Agent(Option<Agent>),
    Level(Option<UserLevel>),
    Upload(PathBuf),
    Docs,
    Stats,
    ClearDatabase,
    Clear,
    Login,
    Logout,
    Help,
    Quit,
}

/// Parses `input` as a slash command.
///
/// Returns `None` when the input is not a command at all, `Some(Err)` with a
/// message for the user when it is one but cannot be used as typed.
pub fn parse(input: &str) -> Option<Result<SlashCommand, String>> {
    let rest = input.trim().strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let Some(command) = COMMANDS.iter().find(|c| c.matches(name)) else {
        return Some(Err(format!("Unknown command /{name}. Type /help for a list.")));
    };

    let parsed = match command.name {
        "agent" if arg.is_empty() => Ok(SlashCommand::Agent(None)),
        "agent" => arg.parse().map(|a| SlashCommand::Agent(Some(a))),
        "level" if arg.is_empty() => Ok(SlashCommand::Level(None)),
        "level" => arg.parse().map(|l| SlashCommand::Level(Some(l))),
        "upload" if arg.is_empty() => Err(format!("Usage: {}", command.usage)),
        "upload" => Ok(SlashCommand::Upload(expand_home(arg))),
        "docs" => Ok(SlashCommand::Docs),
        "stats" => Ok(SlashCommand::Stats),
        "cleardb" => Ok(SlashCommand::ClearDatabase),
        "clear" => Ok(SlashCommand::Clear),
        "login" => Ok(SlashCommand::Login),
        "logout" => Ok(SlashCommand::Logout),
        "help" => Ok(SlashCommand::Help),
        _ => Ok(SlashCommand::Quit),
    };
    Some(parsed)
}

/// `~/x` resolves against the home directory. Quotes around paths with
/// spaces are dropped.
fn expand_home(arg: &str) -> PathBuf {
    let arg = arg.trim_matches(|c| c == '"' || c == '\'');
    if let Some(rest) = arg.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(arg)
}

/// Help text listing every command.
pub fn help_text() -> String {
    let mut out = String::from("Commands:\n");
    for command in COMMANDS {
        out.push_str(&format!("  {:<40} {}\n", command.usage, command.description));
    }
    out.push_str(
        "\nKeys: Enter send · Shift+Enter newline · Ctrl+Y copy last code block · \
         click [copy] to copy a block · PgUp/PgDn scroll · Esc cancel · Ctrl+C quit",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse("hello /upload"), None);
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(
            parse("/agent edsl"),
            Some(Ok(SlashCommand::Agent(Some(Agent::Edsl))))
        );
        assert_eq!(parse("/agent"), Some(Ok(SlashCommand::Agent(None))));
        assert_eq!(
            parse("  /level Advanced "),
            Some(Ok(SlashCommand::Level(Some(UserLevel::Advanced))))
        );
        assert_eq!(
            parse("/upload \"my notes.txt\""),
            Some(Ok(SlashCommand::Upload(PathBuf::from("my notes.txt"))))
        );
        assert_eq!(parse("/exit"), Some(Ok(SlashCommand::Quit)));
    }

    #[test]
    fn test_errors_are_reported() {
        assert!(matches!(parse("/upload"), Some(Err(msg)) if msg.contains("Usage")));
        assert!(matches!(parse("/level expert"), Some(Err(_))));
        assert!(matches!(parse("/frobnicate"), Some(Err(msg)) if msg.contains("/frobnicate")));
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        for command in COMMANDS {
            assert!(help.contains(command.usage));
        }
    }
}

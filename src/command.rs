//! Command grammar: one raw input line parsed into a structured intent.
//!
//! The grammar is deliberately forgiving: unrecognized `ls` flags are
//! ignored, and missing required arguments are represented as `None` so the
//! dispatcher can report a usage error instead of the parser rejecting the
//! line.

use crate::nav::{SortMode, TimeFilter};

/// Vote direction, mapped to the signed magnitude the service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_dir(&self) -> i32 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    /// The verb stem used in result messages ("upvote" / "downvote").
    pub fn verb(&self) -> &'static str {
        match self {
            VoteDirection::Up => "upvote",
            VoteDirection::Down => "downvote",
        }
    }
}

/// A parsed command. Optional fields are `None` when the user omitted a
/// required argument; validation happens in the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Cd {
        target: Option<String>,
    },
    Ls {
        sort: Option<SortMode>,
        time: Option<TimeFilter>,
    },
    Vote {
        direction: VoteDirection,
        /// The verb exactly as typed, for usage messages.
        verb: String,
        /// Present only when the line had exactly one argument.
        post_id: Option<String>,
    },
    Login {
        user: Option<String>,
        pass: Option<String>,
    },
    Logout,
    Whoami,
    Unknown,
}

/// Parses a trimmed, non-empty input line.
pub fn parse(line: &str) -> Command {
    let lower = line.to_lowercase();
    if lower == "help" {
        return Command::Help;
    }
    if lower == "clear" {
        return Command::Clear;
    }
    if lower == "logout" {
        return Command::Logout;
    }
    if lower == "whoami" {
        return Command::Whoami;
    }

    let args: Vec<&str> = line.split(' ').collect();
    let verb = args[0];

    if verb == "cd" {
        return Command::Cd {
            target: args.get(1).map(|s| s.to_string()),
        };
    }

    if verb == "ls" {
        let mut sort = None;
        let mut time = None;
        for arg in &args[1..] {
            if let Some(value) = arg.strip_prefix("--sort=") {
                if let Ok(parsed) = value.parse() {
                    sort = Some(parsed);
                }
            } else if let Some(value) = arg.strip_prefix("--time=") {
                if let Ok(parsed) = value.parse() {
                    time = Some(parsed);
                }
            }
            // Anything else is ignored to keep the grammar forgiving.
        }
        return Command::Ls { sort, time };
    }

    if line.starts_with("--upvote") || line.starts_with("--downvote") {
        let direction = if line.starts_with("--upvote") {
            VoteDirection::Up
        } else {
            VoteDirection::Down
        };
        let post_id = if args.len() == 2 {
            Some(args[1].to_string())
        } else {
            None
        };
        return Command::Vote {
            direction,
            verb: verb.to_string(),
            post_id,
        };
    }

    if verb == "login" {
        let mut user = None;
        let mut pass = None;
        let mut i = 1;
        while i < args.len() {
            match args[i] {
                "-u" if i + 1 < args.len() && !args[i + 1].is_empty() => {
                    user = Some(args[i + 1].to_string());
                    i += 1;
                }
                "-p" if i + 1 < args.len() && !args[i + 1].is_empty() => {
                    pass = Some(args[i + 1].to_string());
                    i += 1;
                }
                _ => {}
            }
            i += 1;
        }
        return Command::Login { user, pass };
    }

    Command::Unknown
}

/// Returns the line as it should be echoed into the transcript: every token
/// following a `-p` flag is replaced by one asterisk per character.
pub fn mask_echo(line: &str) -> String {
    let tokens: Vec<&str> = line.split(' ').collect();
    let mut masked = Vec::with_capacity(tokens.len());
    let mut prev_was_password_flag = false;
    for token in tokens {
        if prev_was_password_flag {
            masked.push("*".repeat(token.chars().count()));
            prev_was_password_flag = false;
        } else {
            masked.push(token.to_string());
            prev_was_password_flag = token == "-p";
        }
    }
    masked.join(" ")
}

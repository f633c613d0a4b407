//! Module `commands`
//!
//! Defines the node's wire commands and the parser that turns a received
//! command line into a [`Command`].

use crate::error::ProtocolError;

/// Represents a command parsed from a caller's command line.
///
/// Arguments are whitespace separated, so identifiers and paths cannot
/// contain spaces. `UPLOAD` announces the byte length of the payload that
/// follows the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    UPLOAD(String, usize),
    DOWNLOAD(String),
    DOWNLOADS(Vec<String>),
    DELETE(String),
    MKDIR(String, String),   // owner, path
    DELETES(Vec<String>),
    RMDIR(String),
    MOVE(String, String),    // source, destination
    RENAME(String, String),  // current path, new name
    MOVEDIR(String, String), // source, destination
    SHARE(String, String),   // path, target user
    SHARES(String, Vec<String>), // target user, paths
    SHAREDIR(String, String), // path, target user
    LIST(String),
    EXISTS(String),
    ISDIR(String),
    PING,
    QUIT,
}

impl Command {
    /// Renders the command line a client sends, without the line terminator.
    pub fn to_line(&self) -> String {
        match self {
            Command::UPLOAD(id, len) => format!("UPLOAD {id} {len}"),
            Command::DOWNLOAD(id) => format!("DOWNLOAD {id}"),
            Command::DOWNLOADS(ids) => join_verb("DOWNLOADS", ids),
            Command::DELETE(id) => format!("DELETE {id}"),
            Command::MKDIR(owner, path) => format!("MKDIR {owner} {path}"),
            Command::DELETES(ids) => join_verb("DELETES", ids),
            Command::RMDIR(path) => format!("RMDIR {path}"),
            Command::MOVE(src, dst) => format!("MOVE {src} {dst}"),
            Command::RENAME(path, name) => format!("RENAME {path} {name}"),
            Command::MOVEDIR(src, dst) => format!("MOVEDIR {src} {dst}"),
            Command::SHARE(path, user) => format!("SHARE {path} {user}"),
            Command::SHARES(user, paths) => join_verb(&format!("SHARES {user}"), paths),
            Command::SHAREDIR(path, user) => format!("SHAREDIR {path} {user}"),
            Command::LIST(path) => format!("LIST {path}").trim_end().to_string(),
            Command::EXISTS(path) => format!("EXISTS {path}"),
            Command::ISDIR(path) => format!("ISDIR {path}"),
            Command::PING => "PING".to_string(),
            Command::QUIT => "QUIT".to_string(),
        }
    }
}

fn join_verb(verb: &str, args: &[String]) -> String {
    if args.is_empty() {
        verb.to_string()
    } else {
        format!("{} {}", verb, args.join(" "))
    }
}

/// Parses a raw command line into a [`Command`].
///
/// Verbs are case-insensitive. Unknown verbs and missing or malformed
/// arguments are reported as errors so the caller can answer with the right
/// code.
pub fn parse_command(raw: &str) -> Result<Command, ProtocolError> {
    let mut parts = raw.split_whitespace();
    let verb = parts.next().unwrap_or("").to_ascii_uppercase();
    let args: Vec<&str> = parts.collect();

    let arg = |idx: usize, name: &'static str| -> Result<String, ProtocolError> {
        args.get(idx)
            .map(|s| s.to_string())
            .ok_or(ProtocolError::MissingArgument(name))
    };
    let rest = |from: usize| -> Vec<String> {
        args.iter().skip(from).map(|s| s.to_string()).collect()
    };

    match verb.as_str() {
        "UPLOAD" => {
            let id = arg(0, "file id")?;
            let raw_len = arg(1, "length")?;
            let len = raw_len
                .parse::<usize>()
                .map_err(|_| ProtocolError::InvalidLength(raw_len))?;
            Ok(Command::UPLOAD(id, len))
        }
        "DOWNLOAD" => Ok(Command::DOWNLOAD(arg(0, "file id")?)),
        "DOWNLOADS" => Ok(Command::DOWNLOADS(rest(0))),
        "DELETE" => Ok(Command::DELETE(arg(0, "file id")?)),
        "MKDIR" => Ok(Command::MKDIR(arg(0, "owner id")?, arg(1, "path")?)),
        "DELETES" => Ok(Command::DELETES(rest(0))),
        "RMDIR" => Ok(Command::RMDIR(arg(0, "path")?)),
        "MOVE" => Ok(Command::MOVE(arg(0, "source")?, arg(1, "destination")?)),
        "RENAME" => Ok(Command::RENAME(arg(0, "path")?, arg(1, "new name")?)),
        "MOVEDIR" => Ok(Command::MOVEDIR(arg(0, "source")?, arg(1, "destination")?)),
        "SHARE" => Ok(Command::SHARE(arg(0, "path")?, arg(1, "target user")?)),
        "SHARES" => Ok(Command::SHARES(arg(0, "target user")?, rest(1))),
        "SHAREDIR" => Ok(Command::SHAREDIR(arg(0, "path")?, arg(1, "target user")?)),
        "LIST" => Ok(Command::LIST(args.first().map(|s| s.to_string()).unwrap_or_default())),
        "EXISTS" => Ok(Command::EXISTS(arg(0, "path")?)),
        "ISDIR" => Ok(Command::ISDIR(arg(0, "path")?)),
        "PING" => Ok(Command::PING),
        "QUIT" | "Q" => Ok(Command::QUIT),
        _ => Err(ProtocolError::UnknownCommand(verb)),
    }
}

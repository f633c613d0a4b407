//! Response handling
//!
//! Defines the node's response codes and how each response is framed on the
//! wire. Status lines end in `\r\n`; content bytes follow a `150 <len>` line
//! directly.

/// Response codes
pub const READY: u16 = 200;
pub const DATA: u16 = 150;
pub const LISTING: u16 = 212;
pub const GOODBYE: u16 = 221;
pub const BATCH: u16 = 226;
pub const FLAG: u16 = 250;
pub const LOCAL_ERROR: u16 = 451;
pub const UNKNOWN_COMMAND: u16 = 500;
pub const SYNTAX_ERROR: u16 = 501;
pub const NOT_FOUND: u16 = 550;
pub const PAYLOAD_TOO_LARGE: u16 = 552;

/// A reply to one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Flag(bool),
    Content(Option<Vec<u8>>),
    Batch(Vec<Option<Vec<u8>>>),
    Listing(Vec<String>),
    Ready(String),
    Goodbye,
    Error(u16, String),
}

impl Response {
    /// Serializes the response into its wire frame.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Response::Flag(value) => out.extend(format_response(FLAG, &value.to_string()).into_bytes()),
            Response::Content(content) => encode_content(&mut out, content.as_deref()),
            Response::Batch(items) => {
                out.extend(format_response(BATCH, &items.len().to_string()).into_bytes());
                for item in items {
                    encode_content(&mut out, item.as_deref());
                }
            }
            Response::Listing(entries) => {
                out.extend(format_response(LISTING, &entries.len().to_string()).into_bytes());
                for entry in entries {
                    out.extend(format!("{entry}\r\n").into_bytes());
                }
            }
            Response::Ready(node) => {
                out.extend(format_response(READY, &format!("{node} ready")).into_bytes())
            }
            Response::Goodbye => out.extend(format_response(GOODBYE, "Goodbye").into_bytes()),
            Response::Error(code, message) => out.extend(format_response(*code, message).into_bytes()),
        }
        out
    }
}

fn encode_content(out: &mut Vec<u8>, content: Option<&[u8]>) {
    match content {
        Some(bytes) => {
            out.extend(format_response(DATA, &bytes.len().to_string()).into_bytes());
            out.extend_from_slice(bytes);
        }
        None => out.extend(format_response(NOT_FOUND, "Not found").into_bytes()),
    }
}

/// Format a status line
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Splits a status line into its code and message.
pub fn parse_status(line: &str) -> Option<(u16, &str)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (code, message) = line.split_once(' ').unwrap_or((line, ""));
    code.parse::<u16>().ok().map(|code| (code, message))
}

//! The owned IRC message type.

use std::fmt;
use std::str::FromStr;

use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

use super::nom_parser::ParsedMessage;

/// One parsed IRC protocol line.
///
/// The original text is retained and is what [`Display`](fmt::Display)
/// prints, so a message can be logged or replayed exactly as received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    raw: String,
    command_offset: usize,
    command_len: usize,
    /// Message source, if the line carried one.
    pub prefix: Option<Prefix>,
    /// Command verb (letters) or three-digit numeric, as sent.
    pub command: String,
    /// Parameters in order; the trailing parameter, if any, is last.
    pub params: Vec<String>,
    /// The unparsed parameter section following the command.
    pub all_params: String,
}

impl Message {
    /// Parse a single line. A terminating CRLF, if present, is ignored.
    pub fn parse(line: &str) -> Result<Message, ProtocolError> {
        let raw = line.trim_end_matches(['\r', '\n']);
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: raw.to_owned(),
            cause,
        };

        let parsed = ParsedMessage::parse(raw).map_err(invalid)?;
        let prefix = match parsed.prefix {
            Some(token) => Some(
                Prefix::parse(token)
                    .ok_or_else(|| invalid(MessageParseError::InvalidPrefix(token.to_owned())))?,
            ),
            None => None,
        };

        Ok(Message {
            raw: raw.to_owned(),
            command_offset: parsed.command_offset,
            command_len: parsed.command.len(),
            prefix,
            command: parsed.command.to_owned(),
            params: parsed.params.into_iter().map(str::to_owned).collect(),
            all_params: parsed.all_params.to_owned(),
        })
    }

    /// The line as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The numeric reply code, or `-1` when the command is a verb.
    pub fn code(&self) -> i32 {
        let bytes = self.command.as_bytes();
        if bytes.len() == 3 && bytes.iter().all(u8::is_ascii_digit) {
            bytes
                .iter()
                .fold(0, |acc, digit| acc * 10 + i32::from(digit - b'0'))
        } else {
            -1
        }
    }

    /// The last parameter, or `""` if there are none.
    pub fn trailing(&self) -> &str {
        self.params.last().map(String::as_str).unwrap_or("")
    }

    /// Whether the prefix was a user mask rather than a server name.
    pub fn user_initiated(&self) -> bool {
        self.prefix.as_ref().is_some_and(Prefix::is_user)
    }

    /// Server name from the prefix, or `""`.
    pub fn server(&self) -> &str {
        match &self.prefix {
            Some(Prefix::ServerName(name)) => name,
            _ => "",
        }
    }

    /// Nick from the prefix, or `""`.
    pub fn nick(&self) -> &str {
        match &self.prefix {
            Some(Prefix::Nickname { nick, .. }) => nick,
            _ => "",
        }
    }

    /// Username from the prefix, or `""`.
    pub fn user(&self) -> &str {
        match &self.prefix {
            Some(Prefix::Nickname { user, .. }) => user,
            _ => "",
        }
    }

    /// Host from the prefix, or `""`.
    pub fn host(&self) -> &str {
        match &self.prefix {
            Some(Prefix::Nickname { host, .. }) => host,
            _ => "",
        }
    }

    /// Who sent this message: the nick for user masks, otherwise the
    /// server name.
    pub fn initiator(&self) -> &str {
        if self.user_initiated() {
            self.nick()
        } else {
            self.server()
        }
    }

    /// The parameter at `index`, or `""`.
    pub fn param(&self, index: usize) -> &str {
        self.params.get(index).map(String::as_str).unwrap_or("")
    }

    /// The received line with only the command token replaced.
    pub fn with_command(&self, command: &str) -> String {
        let end = self.command_offset + self.command_len;
        format!(
            "{}{}{}",
            &self.raw[..self.command_offset],
            command,
            &self.raw[end..]
        )
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

//! IRC message prefix (source) types.
//!
//! A prefix is either a bare server name or a user mask of the form
//! `nick[!user][@host]`.

use std::fmt;

/// The source of an IRC message.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Prefix {
    /// A server name, e.g. `irc.example.net`.
    ServerName(String),
    /// A user mask. `user` and `host` are empty when not present.
    Nickname {
        /// Nickname.
        nick: String,
        /// Username (ident), possibly empty.
        user: String,
        /// Hostname, possibly empty.
        host: String,
    },
}

impl Prefix {
    /// Parse a prefix token (without the leading `:`).
    ///
    /// A token carrying neither `!` nor `@` is a server name. Anything else
    /// must be a well-formed user mask: a nick of at least two characters
    /// starting with an ASCII letter, an optional non-empty `!user` and an
    /// optional non-empty `@host`. Returns `None` when the token fits
    /// neither form.
    pub fn parse(token: &str) -> Option<Prefix> {
        if token.is_empty() || token.contains(' ') {
            return None;
        }

        let Some(split) = token.find(['!', '@']) else {
            return Some(Prefix::ServerName(token.to_owned()));
        };

        let (nick, mut rest) = token.split_at(split);
        let mut chars = nick.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() && chars.next().is_some() => {}
            _ => return None,
        }

        let mut user = "";
        if let Some(after_bang) = rest.strip_prefix('!') {
            let end = after_bang.find('@').unwrap_or(after_bang.len());
            user = &after_bang[..end];
            if user.is_empty() {
                return None;
            }
            rest = &after_bang[end..];
        }

        let mut host = "";
        if let Some(after_at) = rest.strip_prefix('@') {
            if after_at.is_empty() {
                return None;
            }
            host = after_at;
            rest = "";
        }

        if !rest.is_empty() {
            return None;
        }

        Some(Prefix::Nickname {
            nick: nick.to_owned(),
            user: user.to_owned(),
            host: host.to_owned(),
        })
    }

    /// Whether this prefix matched the user-mask alternative.
    pub fn is_user(&self) -> bool {
        matches!(self, Prefix::Nickname { .. })
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname { nick, user, host } => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}

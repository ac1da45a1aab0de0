//! Translation of local input lines into client commands.
//!
//! Prefixes are tried in a fixed order and the first match wins, so
//! specific commands are never shadowed by the generic `/` form:
//!
//! | input                     | command            |
//! |---------------------------|--------------------|
//! | `/join #chan`, `/join chan` | [`ClientCommand::Join`] |
//! | `/part #chan`, `/part chan` | [`ClientCommand::Part`] |
//! | `/nick name`              | [`ClientCommand::Nick`] |
//! | `/me text`                | [`ClientCommand::Me`]   |
//! | `/quit reason`, `/quit`   | [`ClientCommand::Quit`] |
//! | `/anything else`          | [`ClientCommand::Raw`]  |
//! | plain text                | [`ClientCommand::Chat`] |
//!
//! Prefix matching ignores ASCII case.

/// One parsed line of local input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientCommand<'a> {
    /// Join `#<name>`; `name` has no leading `#`.
    Join(&'a str),
    /// Part `#<name>`; `name` has no leading `#`.
    Part(&'a str),
    /// Change nick.
    Nick(&'a str),
    /// CTCP ACTION to the active channel.
    Me(&'a str),
    /// Quit with an optional reason.
    Quit(Option<&'a str>),
    /// Send a raw protocol line.
    Raw(&'a str),
    /// Chat to the active channel.
    Chat(&'a str),
}

/// If `text` starts with `pattern` (ignoring ASCII case), the rest, trimmed.
fn strip_command<'a>(text: &'a str, pattern: &str) -> Option<&'a str> {
    let head = text.get(..pattern.len())?;
    if head.eq_ignore_ascii_case(pattern) {
        Some(text[pattern.len()..].trim())
    } else {
        None
    }
}

/// Parse a line of local input. Blank input yields `None`.
pub fn parse_input(text: &str) -> Option<ClientCommand<'_>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let command = if let Some(rest) =
        strip_command(text, "/join #").or_else(|| strip_command(text, "/join "))
    {
        ClientCommand::Join(rest)
    } else if let Some(rest) =
        strip_command(text, "/part #").or_else(|| strip_command(text, "/part "))
    {
        ClientCommand::Part(rest)
    } else if let Some(rest) = strip_command(text, "/nick ") {
        ClientCommand::Nick(rest)
    } else if let Some(rest) = strip_command(text, "/me ") {
        ClientCommand::Me(rest)
    } else if let Some(rest) = strip_command(text, "/quit ") {
        ClientCommand::Quit(Some(rest))
    } else if text.eq_ignore_ascii_case("/quit") {
        ClientCommand::Quit(None)
    } else if let Some(rest) = text.strip_prefix('/') {
        ClientCommand::Raw(rest.trim())
    } else {
        ClientCommand::Chat(text)
    };

    Some(command)
}

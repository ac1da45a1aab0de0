//! CTCP ACTION envelopes.
//!
//! A CTCP ACTION is a PRIVMSG payload of the form `\x01ACTION text\x01`,
//! used for third-person emotes (`/me waves`).

/// CTCP delimiter byte.
pub const CTCP_DELIM: char = '\x01';

const ACTION_TAG: &str = "\x01ACTION";

/// Wrap `text` in an ACTION envelope.
pub fn encode_action(text: &str) -> String {
    format!("{}ACTION {}{}", CTCP_DELIM, text, CTCP_DELIM)
}

/// Extract the text of an ACTION envelope, or `None` if `payload` is not one.
pub fn decode_action(payload: &str) -> Option<&str> {
    payload
        .strip_prefix(ACTION_TAG)?
        .strip_suffix(CTCP_DELIM)
        .map(|text| text.strip_prefix(' ').unwrap_or(text))
}

/// Render a PRIVMSG payload for display: ACTIONs become `* text`,
/// anything else is returned unchanged.
pub fn display_text(payload: &str) -> String {
    match decode_action(payload) {
        Some(action) => format!("* {}", action),
        None => payload.to_owned(),
    }
}

//! IRC message parsing.
//!
//! [`Message::parse`] turns one protocol line into a [`Message`], or a
//! [`ProtocolError::InvalidMessage`](crate::error::ProtocolError) carrying
//! the raw text when the line does not match the grammar.

mod nom_parser;
mod types;

pub use self::nom_parser::ParsedMessage;
pub use self::types::Message;

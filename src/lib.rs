//! # smirc
//!
//! A small IRC client core: one TCP connection, CRLF line framing,
//! RFC 1459 message parsing, and a session state machine that registers,
//! tracks channel membership and translates local input into protocol
//! lines.
//!
//! ## Features
//!
//! - Message parsing with prefix, command, parameter and trailing semantics
//! - CRLF line codec for `tokio-util` framing
//! - Event-driven TCP transport with ordered writes
//! - Sans-IO session state machine plus a task-driven [`Session`] handle
//! - Destination-tagged output through an [`OutputSink`]

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Parsing IRC Messages
//!
//! ```rust
//! use smirc::Message;
//!
//! let message: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().expect("Valid IRC message");
//! assert!(message.user_initiated());
//! assert_eq!(message.nick(), "nick");
//! assert_eq!(message.trailing(), "Hello!");
//! assert_eq!(message.code(), -1);
//! ```
//!
//! ### Running a session
//!
//! See [`session`] for driving a connection from a front end.

#[cfg(feature = "tokio")]
pub mod config;
pub mod ctcp;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;
#[cfg(feature = "tokio")]
pub mod session;
pub mod sink;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::error::{MessageParseError, ProtocolError};
pub use self::message::Message;
pub use self::prefix::Prefix;
pub use self::sink::OutputSink;

#[cfg(feature = "tokio")]
pub use self::config::SessionConfig;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
#[cfg(feature = "tokio")]
pub use self::session::{ChannelSet, Session, SessionAction, SessionCore, SessionState};
#[cfg(feature = "tokio")]
pub use self::transport::{Transport, TransportError, TransportEvent, TransportOptions};

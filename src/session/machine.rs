//! Sans-IO session state machine.
//!
//! [`SessionCore`] performs no I/O. It consumes transport events and local
//! input and returns [`SessionAction`]s for the caller to carry out, which
//! keeps every protocol decision testable without a socket.

use std::net::SocketAddr;

use tracing::{debug, trace, warn};

use crate::config::SessionConfig;
use crate::ctcp;
use crate::line::CRLF;
use crate::message::Message;
use crate::sink::{ERROR, STATUS};
use crate::transport::{TransportError, TransportEvent};

use super::channels::ChannelSet;
use super::input::{parse_input, ClientCommand};
use super::state::SessionState;

/// Work produced by the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionAction {
    /// Write this line, CRLF included, to the transport.
    Send(String),
    /// Report a line to the output sink.
    Output {
        /// Sink destination.
        destination: String,
        /// Text to show.
        line: String,
    },
    /// Ask the transport to close.
    Shutdown,
}

/// Protocol state for one connection.
#[derive(Clone, Debug)]
pub struct SessionCore {
    server: String,
    port: u16,
    nick: String,
    user: String,
    password: String,
    full_name: String,
    state: SessionState,
    channels: ChannelSet,
    actions: Vec<SessionAction>,
    /// Lines from local input typed before registration was sent.
    held: Vec<String>,
}

/// Local time stamp prefixed to chat lines.
fn timestamp() -> String {
    chrono::Local::now().format("[%I:%M]").to_string()
}

impl SessionCore {
    /// A core in the `NotConnected` state.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            server: config.server.clone(),
            port: config.port,
            nick: config.nick.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            full_name: config.full_name.clone(),
            state: SessionState::NotConnected,
            channels: ChannelSet::new(),
            actions: Vec::new(),
            held: Vec::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Our nick as currently known.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Channels we are in.
    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "session state change");
            self.state = state;
        }
    }

    fn send(&mut self, line: impl Into<String>) {
        let line = line.into();
        if !self.state.accepts_sends() {
            debug!(%line, state = %self.state, "not sending; session is not running");
            return;
        }
        trace!(%line, "queue");
        self.actions.push(SessionAction::Send(format!("{}{}", line, CRLF)));
    }

    fn output(&mut self, destination: &str, line: impl Into<String>) {
        self.actions.push(SessionAction::Output {
            destination: destination.to_owned(),
            line: line.into(),
        });
    }

    fn take_actions(&mut self) -> Vec<SessionAction> {
        std::mem::take(&mut self.actions)
    }

    /// `NotConnected → Connecting`. Later calls do nothing.
    pub fn start(&mut self) -> Vec<SessionAction> {
        if self.state != SessionState::NotConnected {
            debug!(state = %self.state, "start ignored");
            return Vec::new();
        }
        self.set_state(SessionState::Connecting);
        let line = format!("Creating client for {} port {}", self.server, self.port);
        self.output(STATUS, line);
        self.take_actions()
    }

    /// Feed one transport notification.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Vec<SessionAction> {
        match event {
            TransportEvent::Connected { peer } => self.on_connected(peer),
            TransportEvent::Line(line) => self.on_line(&line),
            TransportEvent::Error(err) => self.on_error(&err),
            TransportEvent::Disconnected => self.on_disconnected(),
        }
    }

    /// Connect completed: register with PASS, NICK, USER, in that order.
    pub fn on_connected(&mut self, peer: SocketAddr) -> Vec<SessionAction> {
        if self.state != SessionState::Connecting {
            debug!(state = %self.state, "connect completed after stop; not registering");
            return Vec::new();
        }
        self.set_state(SessionState::Registering);
        self.output(STATUS, format!("Connected to {} {}", peer.ip(), peer.port()));
        let line = format!("Attempting to login with nick {} ({})", self.nick, self.full_name);
        self.output(STATUS, line);

        self.send(format!("PASS {}", self.password));
        self.send(format!("NICK {}", self.nick));
        // The nick, not the login name, is the first USER parameter.
        self.send(format!(
            "USER {} 4 {} :{}",
            self.nick, self.user, self.full_name
        ));
        for line in std::mem::take(&mut self.held) {
            self.actions.push(SessionAction::Send(line));
        }
        self.take_actions()
    }

    /// Peer or local close. Terminal.
    pub fn on_disconnected(&mut self) -> Vec<SessionAction> {
        if self.state == SessionState::Disconnected {
            return Vec::new();
        }
        self.set_state(SessionState::Disconnected);
        self.output(STATUS, "Disconnected.");
        self.take_actions()
    }

    /// Socket failure. Terminal from any state.
    pub fn on_error(&mut self, err: &TransportError) -> Vec<SessionAction> {
        if self.state == SessionState::Disconnected {
            debug!(error = %err, "transport error after disconnect");
            return Vec::new();
        }
        warn!(error = %err, code = ?err.code, "transport error");
        self.set_state(SessionState::Disconnected);
        self.output(STATUS, format!("Error: {}", err));
        self.take_actions()
    }

    /// Send `QUIT :<reason>` and ask the transport to close. A session that
    /// was never started, or is already stopping or gone, is left alone.
    pub fn stop(&mut self, reason: &str) -> Vec<SessionAction> {
        if !self.state.is_running() {
            debug!(state = %self.state, "stop ignored");
            return Vec::new();
        }
        self.send(format!("QUIT :{}", reason));
        self.set_state(SessionState::Stopping);
        self.actions.push(SessionAction::Shutdown);
        self.take_actions()
    }

    /// Dispatch one received line.
    pub fn on_line(&mut self, line: &str) -> Vec<SessionAction> {
        match Message::parse(line) {
            Ok(message) => self.dispatch(&message),
            Err(err) => {
                debug!(error = %err, "unparseable line");
                self.output(ERROR, format!("Unable to parse message: {}", line));
            }
        }
        self.take_actions()
    }

    fn dispatch(&mut self, message: &Message) {
        let code = message.code();
        if code >= 0 {
            self.dispatch_numeric(message, code);
            return;
        }

        let verb = message.command.to_ascii_uppercase();
        match verb.as_str() {
            "AUTH" | "NOTICE" | "ERROR" | "QUIT" => {}
            "MODE" => {
                let line = format!(
                    "{} sets MODE {} on {}.",
                    message.initiator(),
                    message.param(1),
                    message.param(0)
                );
                self.output("", line);
            }
            "NICK" => {
                let (old, new) = (message.nick(), message.trailing());
                self.output("", format!("{} is now known as {}.", old, new));
                if old == self.nick {
                    self.nick = new.to_owned();
                }
            }
            "JOIN" => self.membership(message, true),
            "PART" => self.membership(message, false),
            "PING" => self.send(message.with_command("PONG")),
            "PRIVMSG" => {
                if message.params.is_empty() {
                    return;
                }
                let text = ctcp::display_text(message.trailing());
                let line = format!("{} <{}> {}", timestamp(), message.nick(), text);
                self.output(message.param(0), line);
            }
            _ => {
                let line = format!("Unprocessed response: {}", message.raw());
                self.output(&verb, line);
            }
        }
    }

    fn dispatch_numeric(&mut self, message: &Message, code: i32) {
        let params = message.all_params.trim_start();
        match code {
            1 => {
                if self.state == SessionState::Registering {
                    self.set_state(SessionState::Active);
                }
                self.output(STATUS, "Connected to server.");
            }
            200..=399 => {
                let line = format!("{}: {}", message.command, params);
                self.output(message.initiator(), line);
            }
            400..=499 => {
                let line = format!("Error code {}: {}", code, params);
                self.output(message.initiator(), line);
            }
            _ => {}
        }
    }

    fn membership(&mut self, message: &Message, joined: bool) {
        let channel = message
            .params
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| message.trailing());
        let verb = if joined { "entering" } else { "leaving" };

        if message.nick() == self.nick {
            self.output(STATUS, format!("You are now {} channel {}.", verb, channel));
            if joined {
                self.channels.join(channel);
            } else {
                self.channels.part(channel);
            }
        } else {
            let line = format!("{} is now {} channel {}.", message.nick(), verb, channel);
            self.output(channel, line);
        }
    }

    /// Translate one line of local input into protocol lines.
    pub fn process_client_input(&mut self, text: &str) -> Vec<SessionAction> {
        if !self.state.is_running() {
            debug!(state = %self.state, "input dropped; session is not running");
            return Vec::new();
        }
        let Some(command) = parse_input(text) else {
            return Vec::new();
        };

        let active = self.channels.active().to_owned();
        match command {
            ClientCommand::Join(name) => {
                self.send(format!("JOIN #{}", name));
                self.output(STATUS, format!("Attempting to join channel #{}", name));
            }
            ClientCommand::Part(name) => {
                self.send(format!("PART #{}", name));
                self.output(STATUS, format!("Attempting to depart from channel #{}", name));
            }
            ClientCommand::Nick(nick) => {
                self.send(format!("NICK {}", nick));
                self.nick = nick.to_owned();
            }
            ClientCommand::Me(action) => {
                self.warn_if_no_channel(&active);
                self.send(format!("PRIVMSG {} :{}", active, ctcp::encode_action(action)));
                let line = format!("{} {} * {}", timestamp(), self.nick, action);
                self.output(&active, line);
            }
            ClientCommand::Quit(reason) => {
                match reason {
                    Some(reason) => self.send(format!("QUIT :{}", reason)),
                    None => self.send("QUIT"),
                }
                self.set_state(SessionState::Stopping);
                self.output(STATUS, "Closing the connection to server.");
                self.actions.push(SessionAction::Shutdown);
            }
            ClientCommand::Raw(line) => {
                self.send(line);
                let echo = format!("{} Sending server command: \"{}\"", timestamp(), line);
                self.output(&active, echo);
            }
            ClientCommand::Chat(text) => {
                self.warn_if_no_channel(&active);
                self.send(format!("PRIVMSG {} :{}", active, text));
                let line = format!("{} [{}] {}", timestamp(), self.nick, text);
                self.output(&active, line);
            }
        }

        if self.state == SessionState::Connecting {
            self.hold_sends();
        }
        self.take_actions()
    }

    /// Move queued sends aside until registration has been sent.
    fn hold_sends(&mut self) {
        let mut rest = Vec::new();
        for action in std::mem::take(&mut self.actions) {
            match action {
                SessionAction::Send(line) => {
                    debug!(line = %line.trim_end(), "holding until registered");
                    self.held.push(line);
                }
                other => rest.push(other),
            }
        }
        self.actions = rest;
    }

    fn warn_if_no_channel(&self, active: &str) {
        if active.is_empty() {
            warn!("no active channel; message target will be empty");
        }
    }
}

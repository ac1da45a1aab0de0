//! IRC client session.
//!
//! A [`Session`] is the handle a front end holds. Starting it spawns a
//! single task that owns the [`Transport`] and the [`SessionCore`]; every
//! transport event and every local command is funnelled through that
//! task, so channel membership and the current nick are never shared
//! across threads. The running flag and the lifecycle state are published
//! back to the handle.
//!
//! ```no_run
//! use smirc::{Session, SessionConfig};
//!
//! # async fn demo() {
//! let config = SessionConfig::new("irc.libera.chat", 6667).with_nick("smirc_bot");
//! let mut session = Session::new(config, |dest: &str, line: &str| println!("[{}] {}", dest, line));
//! session.start();
//! session.process_client_input("/join #smirc");
//! session.process_client_input("hello from smirc");
//! session.stop("Quitting.");
//! session.wait_disconnected().await;
//! # }
//! ```

mod channels;
mod input;
mod machine;
mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::config::SessionConfig;
use crate::sink::{OutputSink, STATUS};
use crate::transport::{Transport, TransportEvent};

pub use self::channels::ChannelSet;
pub use self::input::{parse_input, ClientCommand};
pub use self::machine::{SessionAction, SessionCore};
pub use self::state::SessionState;

/// Reason sent with `QUIT` when none is given.
pub const DEFAULT_QUIT_REASON: &str = "Quitting.";

#[derive(Debug)]
enum SessionCommand {
    Input(String),
    Stop(String),
}

/// Handle to one IRC session.
pub struct Session {
    config: SessionConfig,
    sink: Arc<dyn OutputSink>,
    commands: Option<mpsc::UnboundedSender<SessionCommand>>,
    running: Arc<AtomicBool>,
    state_tx: Option<watch::Sender<SessionState>>,
    state: watch::Receiver<SessionState>,
}

impl Session {
    /// A session that will report through `sink` once started.
    pub fn new(config: SessionConfig, sink: impl OutputSink) -> Self {
        let (state_tx, state) = watch::channel(SessionState::NotConnected);
        Self {
            config,
            sink: Arc::new(sink),
            commands: None,
            running: Arc::new(AtomicBool::new(false)),
            state_tx: Some(state_tx),
            state,
        }
    }

    /// Begin connecting. Returns immediately; progress and failures are
    /// reported through the sink. Must be called within a Tokio runtime;
    /// otherwise the failure is reported and nothing starts. Later calls
    /// do nothing.
    pub fn start(&mut self) {
        if self.commands.is_some() {
            debug!("session already started");
            return;
        }
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                self.sink.write_line(STATUS, &format!("Error: {}", err));
                return;
            }
        };
        let Some(state_tx) = self.state_tx.take() else {
            return;
        };

        let (events_tx, events) = mpsc::unbounded_channel();
        let (commands_tx, commands) = mpsc::unbounded_channel();
        self.commands = Some(commands_tx);
        self.running.store(true, Ordering::SeqCst);

        let transport = Transport::connect(
            self.config.server.clone(),
            self.config.port,
            events_tx,
            self.config.transport.clone(),
        );
        let task = SessionTask {
            core: SessionCore::new(&self.config),
            transport,
            events,
            commands,
            sink: Arc::clone(&self.sink),
            running: Arc::clone(&self.running),
            state: state_tx,
        };
        handle.spawn(task.run());
    }

    /// Send `QUIT :<reason>` and close the connection. Does nothing if the
    /// session was never started or has already stopped.
    pub fn stop(&self, reason: &str) {
        self.command(SessionCommand::Stop(reason.to_owned()));
    }

    /// Translate and send one line of local input.
    pub fn process_client_input(&self, text: &str) {
        self.command(SessionCommand::Input(text.to_owned()));
    }

    fn command(&self, command: SessionCommand) {
        match &self.commands {
            Some(commands) => {
                if let Err(err) = commands.send(command) {
                    debug!(command = ?err.0, "session has ended; command dropped");
                }
            }
            None => debug!(?command, "session not started; command dropped"),
        }
    }

    /// Whether the session is connecting or connected and not stopping.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The most recently published lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Resolve once the session has disconnected. Resolves immediately
    /// for a session that was never started.
    pub async fn wait_disconnected(&self) {
        if self.commands.is_none() {
            return;
        }
        let mut state = self.state.clone();
        while *state.borrow_and_update() != SessionState::Disconnected {
            if state.changed().await.is_err() {
                break;
            }
        }
    }
}

struct SessionTask {
    core: SessionCore,
    transport: Transport,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    sink: Arc<dyn OutputSink>,
    running: Arc<AtomicBool>,
    state: watch::Sender<SessionState>,
}

impl SessionTask {
    async fn run(mut self) {
        let actions = self.core.start();
        self.apply(actions);
        self.publish();
        self.transport.start();

        let mut commands_open = true;
        while self.core.state() != SessionState::Disconnected {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => {
                        let actions = self.core.handle_transport_event(event);
                        self.apply(actions);
                    }
                    None => break,
                },
                command = self.commands.recv(), if commands_open => match command {
                    Some(SessionCommand::Input(text)) => {
                        let actions = self.core.process_client_input(&text);
                        self.apply(actions);
                    }
                    Some(SessionCommand::Stop(reason)) => {
                        let actions = self.core.stop(&reason);
                        self.apply(actions);
                    }
                    None => {
                        debug!("session handle dropped; closing connection");
                        commands_open = false;
                        let actions = self.core.stop(DEFAULT_QUIT_REASON);
                        self.apply(actions);
                        self.transport.stop();
                    }
                },
            }
            self.publish();
        }

        self.running.store(false, Ordering::SeqCst);
        debug!("session task finished");
    }

    fn apply(&mut self, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::Send(line) => self.transport.send(line),
                SessionAction::Output { destination, line } => {
                    self.sink.write_line(&destination, &line)
                }
                SessionAction::Shutdown => self.transport.stop(),
            }
        }
    }

    fn publish(&self) {
        let state = self.core.state();
        self.running.store(state.is_running(), Ordering::SeqCst);
        self.state.send_replace(state);
    }
}

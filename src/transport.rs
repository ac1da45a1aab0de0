//! TCP transport for one IRC connection.
//!
//! A [`Transport`] owns a single socket. [`Transport::start`] spawns a
//! connection task that connects (for client-initiated connections),
//! then reads CRLF-framed lines and writes queued lines in call order.
//! Everything the task observes is reported as a [`TransportEvent`] on
//! the channel supplied at construction; no method returns an I/O error.

mod error;

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, trace, warn};

use crate::line::LineCodec;

pub use self::error::TransportError;

/// Notifications emitted by a running transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// A client-initiated connect completed.
    Connected {
        /// Remote address actually connected to.
        peer: SocketAddr,
    },
    /// One complete line, without its CRLF terminator.
    Line(String),
    /// A socket failure. No further events follow.
    Error(TransportError),
    /// The socket was closed, locally or by the peer. No further events follow.
    Disconnected,
}

/// Tuning for a transport. The defaults apply no timeout and no line
/// length limit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransportOptions {
    /// Upper bound on the TCP connect.
    pub connect_timeout: Option<Duration>,
    /// Upper bound on a received line, in bytes.
    pub max_line_len: Option<usize>,
}

impl TransportOptions {
    fn codec(&self) -> LineCodec {
        match self.max_line_len {
            Some(limit) => LineCodec::with_max_len(limit),
            None => LineCodec::new(),
        }
    }
}

enum Endpoint {
    Remote { host: String, port: u16 },
    Accepted(TcpStream),
}

#[derive(Debug)]
enum WriteCommand {
    Line(String),
    Shutdown,
}

/// Handle to one TCP connection.
pub struct Transport {
    endpoint: Option<Endpoint>,
    events: mpsc::UnboundedSender<TransportEvent>,
    writer: Option<mpsc::UnboundedSender<WriteCommand>>,
    options: TransportOptions,
}

impl Transport {
    /// A transport that will connect to `host:port` when started.
    pub fn connect(
        host: impl Into<String>,
        port: u16,
        events: mpsc::UnboundedSender<TransportEvent>,
        options: TransportOptions,
    ) -> Self {
        Self {
            endpoint: Some(Endpoint::Remote {
                host: host.into(),
                port,
            }),
            events,
            writer: None,
            options,
        }
    }

    /// A transport over an already-accepted socket. Starting it begins
    /// the receive loop directly; no `Connected` event is emitted.
    pub fn accepted(
        stream: TcpStream,
        events: mpsc::UnboundedSender<TransportEvent>,
        options: TransportOptions,
    ) -> Self {
        Self {
            endpoint: Some(Endpoint::Accepted(stream)),
            events,
            writer: None,
            options,
        }
    }

    /// Whether [`start`](Self::start) has run and [`stop`](Self::stop) has not.
    pub fn is_started(&self) -> bool {
        self.writer.is_some()
    }

    /// Spawn the connection task. Must be called from within a Tokio
    /// runtime. Only the first call has any effect.
    pub fn start(&mut self) {
        let Some(endpoint) = self.endpoint.take() else {
            debug!("transport already started");
            return;
        };

        let (writer, commands) = mpsc::unbounded_channel();
        self.writer = Some(writer);
        tokio::spawn(run_connection(
            endpoint,
            commands,
            self.events.clone(),
            self.options.clone(),
        ));
    }

    /// Queue `line` for writing. The caller supplies the terminator.
    ///
    /// Lines queued before the connect completes are written right after it.
    /// Sending before [`start`](Self::start) reports a `NotConnected` error;
    /// lines sent after [`stop`](Self::stop) are dropped.
    pub fn send(&self, line: impl Into<String>) {
        let line = line.into();
        match &self.writer {
            Some(writer) => {
                if writer.send(WriteCommand::Line(line)).is_err() {
                    debug!("connection task has exited; dropping outbound line");
                }
            }
            None if self.endpoint.is_some() => {
                let _ = self
                    .events
                    .send(TransportEvent::Error(TransportError::not_connected()));
            }
            None => debug!("transport is stopping; dropping outbound line"),
        }
    }

    /// Flush queued lines, half-close, then close the socket. A
    /// `Disconnected` event follows once it is closed. Does nothing if the
    /// transport was never started or is already stopping.
    pub fn stop(&mut self) {
        if let Some(writer) = self.writer.take() {
            let _ = writer.send(WriteCommand::Shutdown);
        }
    }
}

async fn open(host: &str, port: u16, limit: Option<Duration>) -> Result<TcpStream, TransportError> {
    let connect = TcpStream::connect((host, port));
    let stream = match limit {
        Some(limit) => tokio::time::timeout(limit, connect)
            .await
            .map_err(|_| TransportError::timed_out(limit))??,
        None => connect.await?,
    };
    Ok(stream)
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));

    sock.set_tcp_keepalive(&keepalive)
}

async fn run_connection(
    endpoint: Endpoint,
    mut commands: mpsc::UnboundedReceiver<WriteCommand>,
    events: mpsc::UnboundedSender<TransportEvent>,
    options: TransportOptions,
) {
    let stream = match endpoint {
        Endpoint::Accepted(stream) => stream,
        Endpoint::Remote { host, port } => {
            let stream = match open(&host, port, options.connect_timeout).await {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(%host, port, error = %err, "connect failed");
                    let _ = events.send(TransportEvent::Error(err));
                    return;
                }
            };
            match stream.peer_addr() {
                Ok(peer) => {
                    debug!(%peer, "connected");
                    let _ = events.send(TransportEvent::Connected { peer });
                }
                Err(err) => {
                    let _ = events.send(TransportEvent::Error(err.into()));
                    return;
                }
            }
            stream
        }
    };

    if let Err(e) = enable_keepalive(&stream) {
        warn!("failed to enable TCP keepalive: {}", e);
    }

    let codec = options.codec();
    let (read_half, write_half) = stream.into_split();
    let mut reader = FramedRead::new(read_half, codec.clone());
    let mut writer = FramedWrite::new(write_half, codec);

    loop {
        tokio::select! {
            frame = reader.next() => match frame {
                Some(Ok(line)) => {
                    trace!(%line, "<<");
                    if events.send(TransportEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Some(Err(err)) => {
                    let _ = events.send(TransportEvent::Error(err.into()));
                    return;
                }
                None => {
                    debug!("peer closed the connection");
                    let _ = events.send(TransportEvent::Disconnected);
                    return;
                }
            },
            command = commands.recv() => match command {
                Some(WriteCommand::Line(line)) => {
                    trace!(line = %line.trim_end(), ">>");
                    if let Err(err) = writer.send(line).await {
                        let _ = events.send(TransportEvent::Error(err.into()));
                        return;
                    }
                }
                Some(WriteCommand::Shutdown) | None => break,
            },
        }
    }

    if let Err(err) = writer.close().await {
        debug!(error = %err, "error while closing connection");
    }
    let _ = events.send(TransportEvent::Disconnected);
}

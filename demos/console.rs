//! Line-oriented console client.
//!
//! Reads commands from stdin and prints session output as
//! `[destination] line`. Settings come from the environment:
//!
//! ```text
//! SMIRC_SERVER  SMIRC_PORT  SMIRC_NICK  SMIRC_USER  SMIRC_PASSWORD  SMIRC_NAME
//! ```
//!
//! Usage:
//!   SMIRC_SERVER=irc.libera.chat SMIRC_PORT=6667 SMIRC_NICK=smirc_demo \
//!     cargo run --example console
//!
//! Then type `/join #channel`, chat lines, `/me waves`, `/quit`.
//! End of input stops the session.

use std::env;

use anyhow::{Context, Result};
use smirc::session::DEFAULT_QUIT_REASON;
use smirc::{Session, SessionConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

fn config_from_env() -> Result<SessionConfig> {
    let mut config = SessionConfig::default();
    if let Ok(server) = env::var("SMIRC_SERVER") {
        config.server = server;
    }
    if let Ok(port) = env::var("SMIRC_PORT") {
        config.port = port.parse().context("SMIRC_PORT is not a port number")?;
    }
    if let Ok(nick) = env::var("SMIRC_NICK") {
        config.nick = nick;
    }
    if let Ok(user) = env::var("SMIRC_USER") {
        config.user = user;
    }
    if let Ok(password) = env::var("SMIRC_PASSWORD") {
        config.password = password;
    }
    if let Ok(name) = env::var("SMIRC_NAME") {
        config.full_name = name;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = config_from_env()?;
    tracing::info!(server = %config.server, port = config.port, nick = %config.nick, "starting console");

    let mut session = Session::new(config, |destination: &str, line: &str| {
        if destination.is_empty() {
            println!("{}", line);
        } else {
            println!("[{}] {}", destination, line);
        }
    });
    session.start();

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = stdin.next_line() => match line.context("reading stdin")? {
                Some(line) => session.process_client_input(&line),
                None => {
                    session.stop(DEFAULT_QUIT_REASON);
                    break;
                }
            },
            _ = session.wait_disconnected() => break,
        }
    }

    session.wait_disconnected().await;
    Ok(())
}

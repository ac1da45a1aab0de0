//! Session configuration.
//!
//! The values are supplied by whatever hosts the session (a console, a
//! GUI, a bot); this crate neither loads nor persists them.

use crate::transport::TransportOptions;

/// Connection and identity settings for one session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Server host name or address.
    pub server: String,
    /// Server TCP port.
    pub port: u16,
    /// Desired nickname.
    pub nick: String,
    /// User (login) name.
    pub user: String,
    /// Server password, sent with `PASS`.
    pub password: String,
    /// Real name / GECOS.
    pub full_name: String,
    /// Socket tuning.
    pub transport: TransportOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server: "irc.gimp.org".to_string(),
            port: 6666,
            nick: "guestuser".to_string(),
            user: "guest".to_string(),
            password: "nopass".to_string(),
            full_name: "Anonymous Coward".to_string(),
            transport: TransportOptions::default(),
        }
    }
}

impl SessionConfig {
    /// Default settings pointed at `server:port`.
    pub fn new(server: impl Into<String>, port: u16) -> Self {
        Self {
            server: server.into(),
            port,
            ..Self::default()
        }
    }

    /// Set the nickname.
    #[must_use]
    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = nick.into();
        self
    }

    /// Set the user name.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the server password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the real name.
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.port, 6666);
        assert_eq!(config.nick, "guestuser");
        assert!(config.transport.connect_timeout.is_none());
        assert!(config.transport.max_line_len.is_none());
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::new("127.0.0.1", 6667)
            .with_nick("alice")
            .with_user("ali")
            .with_password("secret")
            .with_full_name("Alice Liddell");
        assert_eq!(config.server, "127.0.0.1");
        assert_eq!(config.port, 6667);
        assert_eq!(config.nick, "alice");
        assert_eq!(config.user, "ali");
        assert_eq!(config.password, "secret");
        assert_eq!(config.full_name, "Alice Liddell");
    }
}

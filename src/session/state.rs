//! Session lifecycle states.

use std::fmt;

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    /// Not started yet.
    #[default]
    NotConnected,
    /// TCP connect in flight.
    Connecting,
    /// Connected; PASS/NICK/USER sent, welcome not yet seen.
    Registering,
    /// Welcome (001) received.
    Active,
    /// QUIT sent and the transport asked to close.
    Stopping,
    /// Connection gone, by error, peer close or local stop.
    Disconnected,
}

impl SessionState {
    /// Whether the session still counts as running.
    pub fn is_running(self) -> bool {
        matches!(
            self,
            SessionState::Connecting | SessionState::Registering | SessionState::Active
        )
    }

    /// Whether outbound lines may still be queued.
    pub(crate) fn accepts_sends(self) -> bool {
        self.is_running()
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::NotConnected => "not connected",
            SessionState::Connecting => "connecting",
            SessionState::Registering => "registering",
            SessionState::Active => "active",
            SessionState::Stopping => "stopping",
            SessionState::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_states() {
        assert!(!SessionState::NotConnected.is_running());
        assert!(SessionState::Connecting.is_running());
        assert!(SessionState::Registering.is_running());
        assert!(SessionState::Active.is_running());
        assert!(!SessionState::Stopping.is_running());
        assert!(!SessionState::Disconnected.is_running());
        assert_eq!(SessionState::default(), SessionState::NotConnected);
    }
}

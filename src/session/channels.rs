//! Joined-channel bookkeeping.

/// Channels the session's own nick has joined, in join order.
///
/// The last entry is the active channel: the one untargeted chat and
/// `/me` actions go to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelSet {
    channels: Vec<String>,
}

impl ChannelSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a join and make `channel` active. Rejoining a channel moves
    /// it to the end rather than listing it twice.
    pub fn join(&mut self, channel: &str) {
        self.channels.retain(|c| c != channel);
        self.channels.push(channel.to_owned());
    }

    /// Record a part. Returns whether the channel was present.
    pub fn part(&mut self, channel: &str) -> bool {
        match self.channels.iter().position(|c| c == channel) {
            Some(index) => {
                self.channels.remove(index);
                true
            }
            None => false,
        }
    }

    /// The active channel, or `""` when none are joined.
    pub fn active(&self) -> &str {
        self.channels.last().map(String::as_str).unwrap_or("")
    }

    /// Whether `channel` is joined.
    pub fn contains(&self, channel: &str) -> bool {
        self.channels.iter().any(|c| c == channel)
    }

    /// Joined channels in join order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(String::as_str)
    }

    /// Number of joined channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channels are joined.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

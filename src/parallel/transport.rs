use std::fmt;

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::message::{Message, Rank};

/// Raw frame moving between endpoints: the sender's rank plus an encoded
/// message. The encoding is an implementation detail of this adapter; peers
/// only ever see the typed [`Message`] taxonomy.
#[derive(Debug, Clone)]
pub(crate) struct Envelope {
    pub(crate) source: Rank,
    pub(crate) payload: String,
}

/// Failures of the typed transport.
#[derive(Debug)]
pub enum ProtocolError {
    /// The other side of the link is gone.
    Disconnected,
    /// The payload does not decode into a known message.
    Malformed(serde_json::Error),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Disconnected => write!(f, "transport link disconnected"),
            ProtocolError::Malformed(err) => write!(f, "malformed message: {}", err),
        }
    }
}

impl std::error::Error for ProtocolError {}

pub type TransportResult<T> = Result<T, ProtocolError>;

/// One rank's handle into the process group.
///
/// Sends are non-blocking; receives block until a frame arrives. Frames
/// between a fixed pair of ranks stay in order, frames from different ranks
/// interleave arbitrarily.
pub struct Endpoint {
    rank: Rank,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
}

impl Endpoint {
    /// Own rank inside the group.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Total number of ranks in the group.
    pub fn size(&self) -> usize {
        self.peers.len()
    }

    /// Sends a message to `dest`. Sending to the own rank is allowed and
    /// loops the message back into the own inbox.
    pub fn send(&self, dest: Rank, message: &Message) -> TransportResult<()> {
        let payload = serde_json::to_string(message).map_err(ProtocolError::Malformed)?;
        self.peers[dest]
            .send(Envelope {
                source: self.rank,
                payload,
            })
            .map_err(|_| ProtocolError::Disconnected)
    }

    /// Blocks until the next message arrives.
    ///
    /// # Returns
    /// The sender's rank and the decoded message.
    pub fn recv(&self) -> TransportResult<(Rank, Message)> {
        let envelope = self.inbox.recv().map_err(|_| ProtocolError::Disconnected)?;
        let message =
            serde_json::from_str(&envelope.payload).map_err(ProtocolError::Malformed)?;
        Ok((envelope.source, message))
    }

    #[cfg(test)]
    pub(crate) fn inject(&self, dest: Rank, envelope: Envelope) {
        self.peers[dest].send(envelope).unwrap();
    }
}

/// Builds a fully connected group of `size` endpoints, in rank order.
pub fn create_group(size: usize) -> Vec<Endpoint> {
    let (senders, inboxes): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded()).unzip();
    inboxes
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| Endpoint {
            rank,
            peers: senders.clone(),
            inbox,
        })
        .collect()
}

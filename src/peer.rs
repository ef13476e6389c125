use discovery_messages::{Chaincode, Envelope, GossipMessage, SerializedIdentity};

use crate::{Error, Result};

/// Where a raw peer entry came from, for error reporting.
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    Membership { channel: &'a str },
    Endorsement { channel: &'a str, chaincode: &'a str },
}

impl std::fmt::Display for Origin<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Membership { channel } => write!(f, "peers of channel {channel}"),
            Self::Endorsement { channel, chaincode } => {
                write!(f, "endorsers for chaincode {chaincode}, channel {channel}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub msp_id: String,
    /// Encoded `SerializedIdentity`, as received.
    pub identity: Vec<u8>,
    pub alive_message: GossipMessage,
    pub state_info_message: GossipMessage,
}

impl Peer {
    /// Builds a peer out of its wire entry, all or nothing.
    pub fn assemble(raw: &discovery_messages::Peer, origin: Origin<'_>) -> Result<Self> {
        let (Some(membership_info), Some(state_info)) = (&raw.membership_info, &raw.state_info)
        else {
            return Err(Error::MissingEnvelope(origin.to_string()));
        };
        let alive_message = open(membership_info, "alive")?;
        let state_info_message = open(state_info, "state info")?;
        let identity =
            SerializedIdentity::from_bytes(&raw.identity).map_err(Error::IdentityDecode)?;
        Ok(Self {
            msp_id: identity.msp_id,
            identity: raw.identity.clone(),
            alive_message,
            state_info_message,
        })
    }

    pub fn endpoint(&self) -> Option<&str> {
        match &self.alive_message {
            GossipMessage::Alive(message) => Some(&message.membership.endpoint),
            _ => None,
        }
    }

    pub fn ledger_height(&self) -> Option<u64> {
        match &self.state_info_message {
            GossipMessage::StateInfo(message) => Some(message.properties.ledger_height),
            _ => None,
        }
    }

    pub fn chaincodes(&self) -> &[Chaincode] {
        match &self.state_info_message {
            GossipMessage::StateInfo(message) => &message.properties.chaincodes,
            _ => &[],
        }
    }
}

fn open(envelope: &Envelope, kind: &'static str) -> Result<GossipMessage> {
    envelope
        .open()
        .map_err(|err| Error::EnvelopeDecode(kind, err))
}

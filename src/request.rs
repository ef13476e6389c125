use std::collections::BTreeMap;

use discovery_messages::{AuthInfo, Query, QueryType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryKind {
    Config,
    PeerMembership,
    Endorsement,
}

/// Identifies which result slot answers which query.
///
/// Endorsement queries are keyed by the requested chaincode set as well, so
/// that two of them on the same channel keep separate slots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct SlotKey {
    pub kind: QueryKind,
    pub channel: String,
    pub chaincodes: Vec<String>,
}

/// A batch of queries sent to the discovery service in one round trip.
///
/// Queries are added under the channel most recently set by
/// [`of_channel`](Self::of_channel), and each occupies the next slot of the
/// response.
#[derive(Debug, Clone, Default)]
pub struct Request {
    channel: String,
    queries: Vec<Query>,
    slots: BTreeMap<SlotKey, usize>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_channel(&mut self, channel: impl Into<String>) -> &mut Self {
        self.channel = channel.into();
        self
    }

    pub fn add_config_query(&mut self) -> &mut Self {
        self.push(QueryKind::Config, Vec::new(), QueryType::Config)
    }

    pub fn add_peers_query(&mut self) -> &mut Self {
        self.push(QueryKind::PeerMembership, Vec::new(), QueryType::PeerMembership)
    }

    pub fn add_endorsers_query<I>(&mut self, chaincodes: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let chaincodes = Vec::from_iter(chaincodes.into_iter().map(Into::into));
        let mut key = chaincodes.clone();
        key.sort();
        key.dedup();
        self.push(
            QueryKind::Endorsement,
            key,
            QueryType::Chaincode { chaincodes },
        )
    }

    fn push(&mut self, kind: QueryKind, chaincodes: Vec<String>, query: QueryType) -> &mut Self {
        let key = SlotKey {
            kind,
            channel: self.channel.clone(),
            chaincodes,
        };
        // an identical key re-registered takes the newer slot, the older query
        // is still sent and still answered
        self.slots.insert(key, self.queries.len());
        self.queries.push(Query {
            channel: self.channel.clone(),
            query,
        });
        self
    }

    /// Number of result slots the service must answer.
    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = (&SlotKey, usize)> + '_ {
        self.slots.iter().map(|(key, index)| (key, *index))
    }

    /// Canonical encoding of the request as the service receives it.
    pub fn payload(&self, authentication: Option<&AuthInfo>) -> bincode::Result<Vec<u8>> {
        discovery_messages::serialize(&discovery_messages::Request {
            authentication: authentication.cloned(),
            queries: self.queries.clone(),
        })
    }
}

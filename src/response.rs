use std::collections::HashMap;

use discovery_messages::{ConfigResult, ErrorResult, PeerMembershipResult, QueryResult};
use rand::Rng;
use tracing::warn;

use crate::{
    endorsement::EndorsementDescriptor,
    peer::{Origin, Peer},
    request::{QueryKind, Request},
    Error, Result,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DemuxKey {
    pub kind: QueryKind,
    pub channel: String,
    /// Only set for endorsement answers.
    pub chaincode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemuxValue {
    Config(ConfigResult),
    Peers(Vec<Peer>),
    Endorsement(EndorsementDescriptor),
    /// The service failed this query, the content is its message.
    Error(String),
}

/// Answers of one request, keyed by what was asked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response(HashMap<DemuxKey, DemuxValue>);

impl QueryKind {
    fn result_name(&self) -> &'static str {
        match self {
            Self::Config => "ConfigResult",
            Self::PeerMembership => "PeerMembershipResult",
            Self::Endorsement => "ChaincodeQueryResult",
        }
    }
}

/// Maps the flat result list of `raw` back to the queries of `request`.
///
/// Server errors are kept under the query's key, an endorsement error under
/// every chaincode the query named. Results of the wrong kind and
/// malformed peers or descriptors fail the whole response.
pub fn compute_response(request: &Request, raw: discovery_messages::Response) -> Result<Response> {
    let mut results = Vec::from_iter(raw.results.into_iter().map(Some));
    let mut response = Response::default();
    let mut slots = Vec::from_iter(request.slots());
    // later queries overwrite earlier answers for the same key
    slots.sort_by_key(|(_, index)| *index);
    for (slot, index) in slots {
        let Some(result) = results.get_mut(index).and_then(Option::take) else {
            return Err(Error::Protocol(format!("missing response for query {index}")));
        };
        let key = DemuxKey {
            kind: slot.kind,
            channel: slot.channel.clone(),
            chaincode: None,
        };
        match (slot.kind, result) {
            (QueryKind::Endorsement, QueryResult::Error(ErrorResult { content })) => {
                // scoped to the chaincodes this query asked for
                for chaincode in &slot.chaincodes {
                    let key = DemuxKey {
                        chaincode: Some(chaincode.clone()),
                        ..key.clone()
                    };
                    response.0.insert(key, DemuxValue::Error(content.clone()));
                }
            }
            (_, QueryResult::Error(ErrorResult { content })) => {
                response.0.insert(key, DemuxValue::Error(content));
            }
            (QueryKind::Config, QueryResult::Config(config)) => {
                response.0.insert(key, DemuxValue::Config(config));
            }
            (QueryKind::PeerMembership, QueryResult::Members(members)) => {
                let peers = peers_of_channel(&members, &slot.channel)?;
                response.0.insert(key, DemuxValue::Peers(peers));
            }
            (QueryKind::Endorsement, QueryResult::Endorsers(endorsers)) => {
                for descriptor in &endorsers.content {
                    let descriptor = EndorsementDescriptor::assemble(descriptor, &slot.channel)?;
                    let key = DemuxKey {
                        chaincode: Some(descriptor.chaincode.clone()),
                        ..key.clone()
                    };
                    // an error reported for the chaincode takes precedence
                    if !matches!(response.0.get(&key), Some(DemuxValue::Error(_))) {
                        response.0.insert(key, DemuxValue::Endorsement(descriptor));
                    }
                }
            }
            (kind, result) => {
                warn!(index, ?kind, "unexpected result kind");
                return Err(Error::Protocol(format!(
                    "expected QueryResult of either {} or Error but got {result:?} instead",
                    kind.result_name()
                )));
            }
        }
    }
    Ok(response)
}

fn peers_of_channel(members: &PeerMembershipResult, channel: &str) -> Result<Vec<Peer>> {
    let origin = Origin::Membership { channel };
    members
        .peers_by_org
        .values()
        .flat_map(|peers| &peers.peers)
        .map(|peer| Peer::assemble(peer, origin))
        .collect()
}

impl Response {
    pub fn for_channel<'a>(&'a self, channel: &'a str) -> ChannelResponse<'a> {
        ChannelResponse {
            response: self,
            channel,
        }
    }

    pub fn get(&self, key: &DemuxKey) -> Option<&DemuxValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelResponse<'a> {
    response: &'a Response,
    channel: &'a str,
}

impl<'a> ChannelResponse<'a> {
    fn lookup(&self, kind: QueryKind, chaincode: Option<&str>) -> Result<&'a DemuxValue> {
        let key = DemuxKey {
            kind,
            channel: self.channel.into(),
            chaincode: chaincode.map(Into::into),
        };
        match self.response.0.get(&key) {
            None => Err(Error::NotFound),
            Some(DemuxValue::Error(content)) => Err(Error::Query(content.clone())),
            Some(value) => Ok(value),
        }
    }

    pub fn config(&self) -> Result<&'a ConfigResult> {
        match self.lookup(QueryKind::Config, None)? {
            DemuxValue::Config(config) => Ok(config),
            value => Err(mismatch(QueryKind::Config, value)),
        }
    }

    pub fn peers(&self) -> Result<&'a [Peer]> {
        match self.lookup(QueryKind::PeerMembership, None)? {
            DemuxValue::Peers(peers) => Ok(peers),
            value => Err(mismatch(QueryKind::PeerMembership, value)),
        }
    }

    pub fn descriptor(&self, chaincode: &str) -> Result<&'a EndorsementDescriptor> {
        match self.lookup(QueryKind::Endorsement, Some(chaincode))? {
            DemuxValue::Endorsement(descriptor) => Ok(descriptor),
            value => Err(mismatch(QueryKind::Endorsement, value)),
        }
    }

    /// A random set of peers whose endorsements satisfy `chaincode`'s policy.
    pub fn endorsers<R: Rng + ?Sized>(&self, chaincode: &str, rng: &mut R) -> Result<Vec<Peer>> {
        self.descriptor(chaincode)?.select(rng)
    }
}

fn mismatch(kind: QueryKind, value: &DemuxValue) -> Error {
    Error::Protocol(format!(
        "expected {} but {value:?} is stored instead",
        kind.result_name()
    ))
}

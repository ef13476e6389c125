use std::collections::BTreeMap;

use bincode::Options;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

// every map on the wire is a `BTreeMap`, so encoding the same value twice
// produces the same bytes

pub fn serialize<T: Serialize>(value: &T) -> bincode::Result<Vec<u8>> {
    bincode::options().serialize(value)
}

pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> bincode::Result<T> {
    bincode::options().deserialize(bytes)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub client_identity: Vec<u8>,
    pub client_tls_cert_hash: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryType {
    Config,
    PeerMembership,
    Chaincode { chaincodes: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub channel: String,
    pub query: QueryType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub authentication: Option<AuthInfo>,
    pub queries: Vec<Query>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRequest {
    /// Encoded `Request`.
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// One result per submitted query, in submission order.
    pub results: Vec<QueryResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryResult {
    Config(ConfigResult),
    Members(PeerMembershipResult),
    Endorsers(ChaincodeQueryResult),
    Error(ErrorResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResult {
    pub msps: BTreeMap<String, MspConfig>,
    pub orderers: BTreeMap<String, Endpoints>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MspConfig {
    pub name: String,
    pub root_certs: Vec<Vec<u8>>,
    pub intermediate_certs: Vec<Vec<u8>>,
    pub admins: Vec<Vec<u8>>,
    pub tls_root_certs: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerMembershipResult {
    pub peers_by_org: BTreeMap<String, Peers>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peers {
    pub peers: Vec<Peer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Encoded `SerializedIdentity`.
    pub identity: Vec<u8>,
    pub membership_info: Option<Envelope>,
    pub state_info: Option<Envelope>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeQueryResult {
    pub content: Vec<EndorsementDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsementDescriptor {
    pub chaincode: String,
    pub endorsers_by_groups: BTreeMap<String, Peers>,
    pub layouts: Vec<Layout>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub quantities_by_group: BTreeMap<String, u32>,
}

/// A signed gossip message as relayed by the discovery service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Encoded `GossipMessage`.
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

impl Envelope {
    /// Wraps a message without signing it. The client never verifies gossip
    /// signatures, this is for servers and tests.
    pub fn seal(message: &GossipMessage) -> bincode::Result<Self> {
        Ok(Self {
            payload: serialize(message)?,
            signature: Vec::new(),
        })
    }

    pub fn open(&self) -> bincode::Result<GossipMessage> {
        deserialize(&self.payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GossipMessage {
    Alive(AliveMessage),
    StateInfo(StateInfo),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliveMessage {
    pub membership: Member,
    pub timestamp: PeerTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub endpoint: String,
    pub pki_id: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerTime {
    pub inc_num: u64,
    pub seq_num: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    pub pki_id: Vec<u8>,
    pub timestamp: PeerTime,
    pub properties: Properties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    pub ledger_height: u64,
    pub chaincodes: Vec<Chaincode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chaincode {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedIdentity {
    pub msp_id: String,
    pub id_bytes: Vec<u8>,
}

impl SerializedIdentity {
    pub fn to_bytes(&self) -> bincode::Result<Vec<u8>> {
        serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> bincode::Result<Self> {
        deserialize(bytes)
    }
}

/// What the service answers on a connection: either the response or the
/// reason the whole request was refused.
pub type Reply = Result<Response, String>;

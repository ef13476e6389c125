#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};

use ledger_discovery::{
    messages::{
        AliveMessage, Chaincode, ChaincodeQueryResult, ConfigResult, EndorsementDescriptor,
        Endpoint, Endpoints, Envelope, ErrorResult, GossipMessage, Layout, Member, MspConfig,
        Peer, PeerMembershipResult, Peers, Properties, QueryResult, SerializedIdentity, StateInfo,
    },
    Peer as Endorser,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn alive_message(index: usize) -> Envelope {
    Envelope::seal(&GossipMessage::Alive(AliveMessage {
        membership: Member {
            endpoint: format!("p{index}"),
            pki_id: format!("p{index}").into_bytes(),
        },
        ..Default::default()
    }))
    .unwrap()
}

pub fn state_info_message(chaincodes: &[&str]) -> Envelope {
    Envelope::seal(&GossipMessage::StateInfo(StateInfo {
        properties: Properties {
            ledger_height: 1,
            chaincodes: Vec::from_iter(chaincodes.iter().map(|name| Chaincode {
                name: name.to_string(),
                version: "1.0".into(),
            })),
        },
        ..Default::default()
    }))
    .unwrap()
}

pub fn peer_identity(msp_id: &str, index: usize) -> Vec<u8> {
    SerializedIdentity {
        msp_id: msp_id.into(),
        id_bytes: format!("p{index}").into_bytes(),
    }
    .to_bytes()
    .unwrap()
}

pub fn peer(msp_id: &str, index: usize) -> Peer {
    Peer {
        identity: peer_identity(msp_id, index),
        membership_info: Some(alive_message(index)),
        state_info: Some(state_info_message(&["mycc"])),
    }
}

/// Peers p0..p7, two per organization A to D.
pub fn peers_of(msp_id: &str) -> Peers {
    let first = match msp_id {
        "A" => 0,
        "B" => 2,
        "C" => 4,
        _ => 6,
    };
    Peers {
        peers: vec![peer(msp_id, first), peer(msp_id, first + 1)],
    }
}

pub fn expected_config() -> ConfigResult {
    ConfigResult {
        msps: BTreeMap::from_iter(["A", "B", "C", "D"].map(|name| {
            (
                name.to_string(),
                MspConfig {
                    name: name.into(),
                    ..Default::default()
                },
            )
        })),
        orderers: BTreeMap::from([(
            "A".into(),
            Endpoints {
                endpoints: vec![Endpoint {
                    host: "orderer.a".into(),
                    port: 7050,
                }],
            },
        )]),
    }
}

pub fn membership() -> QueryResult {
    QueryResult::Members(PeerMembershipResult {
        peers_by_org: BTreeMap::from_iter(
            ["A", "B", "C", "D"].map(|org| (org.to_string(), peers_of(org))),
        ),
    })
}

fn layout(groups: &[(&str, u32)]) -> Layout {
    Layout {
        quantities_by_group: BTreeMap::from_iter(
            groups.iter().map(|(group, count)| (group.to_string(), *count)),
        ),
    }
}

/// "(A and B) or C or (A and D)"
pub fn endorsement_descriptor(chaincode: &str) -> EndorsementDescriptor {
    EndorsementDescriptor {
        chaincode: chaincode.into(),
        endorsers_by_groups: BTreeMap::from_iter(
            ["A", "B", "C", "D"].map(|org| (org.to_string(), peers_of(org))),
        ),
        layouts: vec![
            layout(&[("A", 1), ("B", 1)]),
            layout(&[("C", 1)]),
            layout(&[("A", 1), ("D", 1)]),
        ],
    }
}

pub fn endorsers(descriptors: Vec<EndorsementDescriptor>) -> QueryResult {
    QueryResult::Endorsers(ChaincodeQueryResult {
        content: descriptors,
    })
}

pub fn error(content: &str) -> QueryResult {
    QueryResult::Error(ErrorResult {
        content: content.into(),
    })
}

pub fn expected_org_combinations() -> Vec<HashSet<String>> {
    [vec!["A", "B"], vec!["C"], vec!["A", "D"]]
        .into_iter()
        .map(|orgs| orgs.into_iter().map(String::from).collect())
        .collect()
}

pub fn msp_ids(endorsers: &[Endorser]) -> HashSet<String> {
    endorsers.iter().map(|peer| peer.msp_id.clone()).collect()
}

use std::collections::{BTreeMap, HashSet};

use ledger_discovery::{
    messages::{self, AuthInfo, Layout as WireLayout, Peers},
    EndorsementDescriptor, Request,
};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

mod common;
use common::*;

#[derive(Debug, Clone)]
enum Add {
    Channel(u8),
    Config,
    Peers,
    Endorsers(Vec<u8>),
}

fn add() -> impl Strategy<Value = Add> {
    prop_oneof![
        any::<u8>().prop_map(Add::Channel),
        Just(Add::Config),
        Just(Add::Peers),
        prop::collection::vec(any::<u8>(), 0..4).prop_map(Add::Endorsers),
    ]
}

fn build(adds: &[Add]) -> Request {
    let mut request = Request::new();
    for add in adds {
        match add {
            Add::Channel(channel) => request.of_channel(format!("channel{channel}")),
            Add::Config => request.add_config_query(),
            Add::Peers => request.add_peers_query(),
            Add::Endorsers(chaincodes) => request
                .add_endorsers_query(chaincodes.iter().map(|chaincode| format!("cc{chaincode}"))),
        };
    }
    request
}

/// Group `g{i}` holds `sizes[i]` peers; each layout entry `(group, required)`
/// is folded into the range of available groups and peers.
fn descriptor(sizes: &[usize], layouts: &[Vec<(usize, usize)>]) -> messages::EndorsementDescriptor {
    let mut index = 0;
    let endorsers_by_groups = BTreeMap::from_iter(sizes.iter().enumerate().map(|(group, size)| {
        let peers = Vec::from_iter((0..*size).map(|_| {
            index += 1;
            peer(&format!("g{group}"), index)
        }));
        (format!("g{group}"), Peers { peers })
    }));
    let layouts = Vec::from_iter(layouts.iter().map(|layout| WireLayout {
        quantities_by_group: BTreeMap::from_iter(layout.iter().map(|(group, required)| {
            let group = group % sizes.len();
            (format!("g{group}"), (1 + required % sizes[group]) as u32)
        })),
    }));
    messages::EndorsementDescriptor {
        chaincode: "mycc".into(),
        endorsers_by_groups,
        layouts,
    }
}

proptest! {
    #[test]
    fn one_slot_per_query(adds in prop::collection::vec(add(), 0..20)) {
        let request = build(&adds);
        let num_query = adds.iter().filter(|add| !matches!(add, Add::Channel(_))).count();
        prop_assert_eq!(request.query_count(), num_query);
        prop_assert_eq!(request.queries().len(), num_query);

        let auth_info = AuthInfo::default();
        let payload = request.payload(Some(&auth_info)).unwrap();
        prop_assert_eq!(&build(&adds).payload(Some(&auth_info)).unwrap(), &payload);
        let decoded = messages::deserialize::<messages::Request>(&payload).unwrap();
        prop_assert_eq!(decoded.queries.len(), num_query);
    }

    #[test]
    fn selection_satisfies_some_layout(
        sizes in prop::collection::vec(1usize..5, 1..5),
        layouts in prop::collection::vec(prop::collection::vec((any::<usize>(), any::<usize>()), 1..4), 1..4),
        seed in any::<u64>()
    ) {
        let raw = descriptor(&sizes, &layouts);
        let descriptor = EndorsementDescriptor::assemble(&raw, "mychannel").unwrap();
        let endorsers = descriptor.select(&mut StdRng::seed_from_u64(seed)).unwrap();

        let identities = HashSet::<&[u8]>::from_iter(
            endorsers.iter().map(|peer| peer.identity.as_slice()),
        );
        prop_assert_eq!(identities.len(), endorsers.len());

        let mut counts = BTreeMap::<String, usize>::new();
        for peer in &endorsers {
            *counts.entry(peer.msp_id.clone()).or_default() += 1;
        }
        prop_assert!(descriptor.layouts().contains(&counts));
    }
}

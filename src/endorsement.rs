use std::collections::BTreeMap;

use rand::{seq::SliceRandom, Rng};

use crate::{
    peer::{Origin, Peer},
    Error, Result,
};

/// One combination of `group -> required peer count` satisfying the
/// endorsement policy.
pub type Layout = BTreeMap<String, usize>;

/// The endorsement options of one chaincode: peers grouped by policy
/// principal, and the alternative layouts any of which satisfies the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndorsementDescriptor {
    pub chaincode: String,
    endorsers_by_group: BTreeMap<String, Vec<Peer>>,
    layouts: Vec<Layout>,
}

impl EndorsementDescriptor {
    /// Fails if any layout refers to a group with no endorser list.
    pub fn new(
        chaincode: impl Into<String>,
        endorsers_by_group: BTreeMap<String, Vec<Peer>>,
        layouts: Vec<Layout>,
    ) -> Result<Self> {
        if let Some(group) =
            unmapped_group(&layouts, |group| endorsers_by_group.contains_key(group))
        {
            return Err(Error::UnmappedGroup(group.clone()));
        }
        Ok(Self {
            chaincode: chaincode.into(),
            endorsers_by_group,
            layouts,
        })
    }

    pub fn assemble(raw: &discovery_messages::EndorsementDescriptor, channel: &str) -> Result<Self> {
        let layouts = Vec::from_iter(raw.layouts.iter().map(|layout| {
            Layout::from_iter(
                layout
                    .quantities_by_group
                    .iter()
                    .map(|(group, count)| (group.clone(), *count as usize)),
            )
        }));
        // layouts are checked before any peer is assembled
        if let Some(group) =
            unmapped_group(&layouts, |group| raw.endorsers_by_groups.contains_key(group))
        {
            return Err(Error::UnmappedGroup(group.clone()));
        }
        let origin = Origin::Endorsement {
            channel,
            chaincode: &raw.chaincode,
        };
        let mut endorsers_by_group = BTreeMap::new();
        for (group, peers) in &raw.endorsers_by_groups {
            let peers = peers
                .peers
                .iter()
                .map(|peer| Peer::assemble(peer, origin))
                .collect::<Result<Vec<_>>>()?;
            endorsers_by_group.insert(group.clone(), peers);
        }
        Ok(Self {
            chaincode: raw.chaincode.clone(),
            endorsers_by_group,
            layouts,
        })
    }

    pub fn endorsers_by_group(&self) -> &BTreeMap<String, Vec<Peer>> {
        &self.endorsers_by_group
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    /// Picks one layout uniformly at random and samples the required number of
    /// distinct peers from each of its groups.
    ///
    /// A layout that cannot be filled fails the selection; other layouts are
    /// not tried.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Peer>> {
        let layout = self
            .layouts
            .choose(rng)
            .ok_or_else(|| Error::NoLayouts(self.chaincode.clone()))?;
        let mut endorsers = Vec::new();
        for (group, &required) in layout {
            let peers = self
                .endorsers_by_group
                .get(group)
                .map_or(&[][..], Vec::as_slice);
            if peers.len() < required {
                return Err(Error::InsufficientEndorsers {
                    group: group.clone(),
                    required,
                    available: peers.len(),
                });
            }
            endorsers.extend(peers.choose_multiple(rng, required).cloned());
        }
        Ok(endorsers)
    }
}

fn unmapped_group(layouts: &[Layout], mapped: impl Fn(&str) -> bool) -> Option<&String> {
    layouts
        .iter()
        .flat_map(|layout| layout.keys())
        .find(|group| !mapped(group))
}

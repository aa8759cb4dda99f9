//! Connection graph: bond formation, severing and integrity checking.
//!
//! ## Bond rules
//!
//! A bond attempt starts when two bond zones begin to overlap.  The dispatch
//! layer writes one [`OverlapEvent`] per party, so each overlap produces two
//! attempts (A→B and B→A); at most one of them can succeed because the first
//! success leaves the initiator bonded.
//!
//! | Rejection | Condition |
//! |-----------|-----------|
//! | `SelfOverlap`     | initiator and peer are the same vessel |
//! | `BothConnected`   | both parties already connected |
//! | `InitiatorBonded` | initiator already has a bond |
//! | `Outranked`       | initiator `bond_rank` strictly below the peer's |
//! | `AlreadyListed`   | peer already in the initiator's bonds |
//! | `Dying`           | either party is between death and removal |
//!
//! A vessel can still *receive* any number of bonds from unbonded initiators,
//! so cluster size is unbounded.

use super::regen::Regeneration;
use super::state::{Bonds, Dying, Vessel, VesselScale};
use crate::config::TuningConfig;
use crate::error::{SimError, SimResult};
use crate::events::{ContactTag, OverlapEvent};
use crate::link::{LinkRequest, LinkSevered};
use bevy::prelude::*;

/// What the bond rules need to know about one party.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondParty {
    pub entity: Entity,
    pub bond_rank: f32,
    pub connected: bool,
    pub dying: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondRejection {
    SelfOverlap,
    InitiatorBonded,
    Outranked,
    BothConnected,
    AlreadyListed,
    Dying,
}

/// Decide whether `initiator` may bond with `peer`.
pub fn evaluate_bond(
    initiator: &BondParty,
    peer: &BondParty,
    initiator_lists_peer: bool,
) -> Result<(), BondRejection> {
    if initiator.entity == peer.entity {
        return Err(BondRejection::SelfOverlap);
    }
    if initiator.connected && peer.connected {
        return Err(BondRejection::BothConnected);
    }
    if initiator.connected {
        return Err(BondRejection::InitiatorBonded);
    }
    if initiator.bond_rank < peer.bond_rank {
        return Err(BondRejection::Outranked);
    }
    if initiator_lists_peer {
        return Err(BondRejection::AlreadyListed);
    }
    if initiator.dying || peer.dying {
        return Err(BondRejection::Dying);
    }
    Ok(())
}

/// Form bonds from bond-zone overlaps.
///
/// On acceptance a [`LinkRequest`] is written, both bond sets are updated in
/// place (so later events in the same batch see the new edge), and every party
/// that just became connected gets a fresh [`Regeneration`], replacing any
/// previous one.
pub fn vessel_bond_system(
    mut commands: Commands,
    mut overlaps: MessageReader<OverlapEvent>,
    mut q_vessels: Query<(&mut Bonds, &VesselScale, Has<Dying>), With<Vessel>>,
    mut link_requests: MessageWriter<LinkRequest>,
    config: Res<TuningConfig>,
) {
    for overlap in overlaps.read() {
        if overlap.subject_tag != ContactTag::BondZone || overlap.other_tag != ContactTag::BondZone
        {
            continue;
        }
        if overlap.subject == overlap.other {
            continue;
        }
        let Ok([(mut own_bonds, own_scale, own_dying), (mut peer_bonds, peer_scale, peer_dying)]) =
            q_vessels.get_many_mut([overlap.subject, overlap.other])
        else {
            continue;
        };

        let initiator = BondParty {
            entity: overlap.subject,
            bond_rank: own_scale.bond_rank,
            connected: own_bonds.is_connected(),
            dying: own_dying,
        };
        let peer = BondParty {
            entity: overlap.other,
            bond_rank: peer_scale.bond_rank,
            connected: peer_bonds.is_connected(),
            dying: peer_dying,
        };

        if let Err(reason) = evaluate_bond(&initiator, &peer, own_bonds.contains(peer.entity)) {
            debug!(
                "Bond {:?} -> {:?} rejected: {:?}",
                initiator.entity, peer.entity, reason
            );
            continue;
        }

        link_requests.write(LinkRequest {
            a: initiator.entity,
            b: peer.entity,
        });
        let own_first = own_bonds.insert(peer.entity);
        let peer_first = peer_bonds.insert(initiator.entity);

        for (entity, first) in [(initiator.entity, own_first), (peer.entity, peer_first)] {
            if first {
                commands
                    .entity(entity)
                    .insert(Regeneration::new(config.regen_interval));
            }
        }
        debug!("Bonded {:?} <-> {:?}", initiator.entity, peer.entity);
    }
}

/// Remove severed edges from both endpoints.  A missing endpoint is tolerated
/// so the surviving side is still cleaned up.
pub fn link_severed_system(
    mut severed: MessageReader<LinkSevered>,
    mut q_bonds: Query<&mut Bonds, With<Vessel>>,
) {
    for link in severed.read() {
        for (vessel, peer) in [(link.a, link.b), (link.b, link.a)] {
            if let Ok(mut bonds) = q_bonds.get_mut(vessel) {
                if bonds.remove(peer) {
                    debug!("{:?} disconnected", vessel);
                }
            }
        }
    }
}

/// Verify the connection graph is irreflexive, symmetric and free of stale
/// peers.  `lookup` resolves a peer to its bond set.
pub fn check_bond_integrity<'a, F>(
    vessels: impl IntoIterator<Item = (Entity, &'a Bonds)>,
    lookup: F,
) -> SimResult<()>
where
    F: Fn(Entity) -> Option<&'a Bonds>,
{
    for (vessel, bonds) in vessels {
        for peer in bonds.peers() {
            if peer == vessel {
                return Err(SimError::SelfBond { vessel });
            }
            let back = lookup(peer).ok_or(SimError::EntityNotFound {
                context: "bond peer lookup",
            })?;
            if !back.contains(vessel) {
                return Err(SimError::BondAsymmetry { a: vessel, b: peer });
            }
        }
    }
    Ok(())
}

/// Log any connection-graph violation.
pub fn bond_integrity_system(q_bonds: Query<(Entity, &Bonds), With<Vessel>>) {
    let result = check_bond_integrity(q_bonds.iter(), |e| {
        q_bonds.get(e).ok().map(|(_, bonds)| bonds)
    });
    if let Err(e) = result {
        error!("Connection graph violated: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    fn party(entity: Entity, rank: f32) -> BondParty {
        BondParty {
            entity,
            bond_rank: rank,
            connected: false,
            dying: false,
        }
    }

    #[test]
    fn smaller_rank_cannot_initiate() {
        let e = entities(2);
        let small = party(e[0], 1.0);
        let large = party(e[1], 1.5);
        assert_eq!(
            evaluate_bond(&small, &large, false),
            Err(BondRejection::Outranked)
        );
        assert_eq!(evaluate_bond(&large, &small, false), Ok(()));
    }

    #[test]
    fn equal_ranks_may_initiate() {
        let e = entities(2);
        assert_eq!(
            evaluate_bond(&party(e[0], 1.2), &party(e[1], 1.2), false),
            Ok(())
        );
    }

    #[test]
    fn bonded_initiator_is_rejected() {
        let e = entities(2);
        let mut a = party(e[0], 2.0);
        a.connected = true;
        assert_eq!(
            evaluate_bond(&a, &party(e[1], 1.0), false),
            Err(BondRejection::InitiatorBonded)
        );
    }

    #[test]
    fn mutually_connected_pair_is_rejected() {
        let e = entities(2);
        let mut a = party(e[0], 2.0);
        let mut b = party(e[1], 1.0);
        a.connected = true;
        b.connected = true;
        assert_eq!(
            evaluate_bond(&a, &b, false),
            Err(BondRejection::BothConnected)
        );
    }

    #[test]
    fn connected_peer_can_receive() {
        let e = entities(2);
        let mut hub = party(e[1], 1.0);
        hub.connected = true;
        assert_eq!(evaluate_bond(&party(e[0], 1.5), &hub, false), Ok(()));
    }

    #[test]
    fn listed_peer_and_self_are_rejected() {
        let e = entities(2);
        let a = party(e[0], 1.5);
        assert_eq!(
            evaluate_bond(&a, &party(e[1], 1.0), true),
            Err(BondRejection::AlreadyListed)
        );
        assert_eq!(
            evaluate_bond(&a, &a, false),
            Err(BondRejection::SelfOverlap)
        );
    }

    #[test]
    fn dying_party_is_rejected() {
        let e = entities(2);
        let mut peer = party(e[1], 1.0);
        peer.dying = true;
        assert_eq!(
            evaluate_bond(&party(e[0], 1.5), &peer, false),
            Err(BondRejection::Dying)
        );
    }

    #[test]
    fn integrity_detects_asymmetry_and_stale_peers() {
        let e = entities(3);
        let mut graph: HashMap<Entity, Bonds> = HashMap::new();
        let mut a = Bonds::default();
        a.insert(e[1]);
        let mut b = Bonds::default();
        b.insert(e[0]);
        graph.insert(e[0], a);
        graph.insert(e[1], b);
        assert!(check_bond_integrity(graph.iter().map(|(k, v)| (*k, v)), |p| graph.get(&p)).is_ok());

        graph.get_mut(&e[1]).unwrap().remove(e[0]);
        assert!(matches!(
            check_bond_integrity(graph.iter().map(|(k, v)| (*k, v)), |p| graph.get(&p)),
            Err(SimError::BondAsymmetry { .. })
        ));

        graph.get_mut(&e[0]).unwrap().insert(e[2]);
        graph.get_mut(&e[0]).unwrap().remove(e[1]);
        assert!(matches!(
            check_bond_integrity(graph.iter().map(|(k, v)| (*k, v)), |p| graph.get(&p)),
            Err(SimError::EntityNotFound { .. })
        ));
    }
}

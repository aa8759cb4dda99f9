//! Collision event dispatch: Rapier `CollisionEvent`s → gameplay messages.
//!
//! Gameplay systems never read Rapier events directly.  Instead,
//! [`dispatch_collision_events_system`] translates every started collision into
//! one of two engine-agnostic messages, written once per participant:
//!
//! | Message | Raised for | Payload |
//! |---------|------------|---------|
//! | [`OverlapEvent`] | at least one collider is a sensor | tags, trigger flag |
//! | [`ContactEvent`] | two solid colliders touch | tags, contact normal |
//!
//! Each message names a `subject` (the entity whose handler should react) and
//! the `other` party.  Child colliders (bond zones, the player hitbox) carry a
//! [`ColliderOwner`] so handlers always receive the owning vessel or player.
//!
//! Tests write these messages directly to drive handlers without a physics
//! world.
//!
//! ## Collision layers
//!
//! | Layer          | Group    | Interacts with                          |
//! |----------------|----------|-----------------------------------------|
//! | Vessel body    | GROUP_1  | vessel bodies, player body, projectiles, player hitbox |
//! | Player body    | GROUP_2  | vessel bodies                           |
//! | Projectile     | GROUP_3  | vessel bodies, links                    |
//! | Bond zone      | GROUP_4  | bond zones                              |
//! | Player hitbox  | GROUP_5  | vessel bodies, links                    |
//! | Link segment   | GROUP_6  | projectiles, player hitbox              |

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;

// ── Tags ──────────────────────────────────────────────────────────────────────

/// Category of a collider, used by handlers to decide how to react.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactTag {
    /// Solid hull of an autonomous vessel.
    Vessel,
    /// Overlap-only sensor around a vessel used for bonding.
    BondZone,
    /// Solid hull of the player.
    Player,
    /// Overlap-only hazard sensor around the player.
    PlayerHitbox,
    /// Tether between two bonded vessels.
    LinkSegment,
    /// Player projectile.
    Projectile,
}

/// Points a child collider at the gameplay entity that owns it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColliderOwner(pub Entity);

// ── Messages ──────────────────────────────────────────────────────────────────

/// A sensor overlap started.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct OverlapEvent {
    pub subject: Entity,
    /// Which of the subject's colliders took part.
    pub subject_tag: ContactTag,
    pub other: Entity,
    pub other_tag: ContactTag,
    /// `true` when the other collider is overlap-only.
    pub other_is_trigger: bool,
}

/// Two solid colliders started touching.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub subject: Entity,
    pub subject_tag: ContactTag,
    pub other: Entity,
    pub other_tag: ContactTag,
    /// Unit contact normal pointing from the subject toward the other party.
    pub normal: Vec2,
}

// ── Layers ────────────────────────────────────────────────────────────────────

pub mod layers {
    use bevy_rapier2d::geometry::{CollisionGroups, Group};

    pub const VESSEL_BODY: Group = Group::GROUP_1;
    pub const PLAYER_BODY: Group = Group::GROUP_2;
    pub const PROJECTILE: Group = Group::GROUP_3;
    pub const BOND_ZONE: Group = Group::GROUP_4;
    pub const PLAYER_HITBOX: Group = Group::GROUP_5;
    pub const LINK: Group = Group::GROUP_6;

    pub fn vessel_body() -> CollisionGroups {
        CollisionGroups::new(
            VESSEL_BODY,
            VESSEL_BODY | PLAYER_BODY | PROJECTILE | PLAYER_HITBOX,
        )
    }

    pub fn bond_zone() -> CollisionGroups {
        CollisionGroups::new(BOND_ZONE, BOND_ZONE)
    }

    pub fn player_body() -> CollisionGroups {
        CollisionGroups::new(PLAYER_BODY, VESSEL_BODY)
    }

    pub fn player_hitbox() -> CollisionGroups {
        CollisionGroups::new(PLAYER_HITBOX, VESSEL_BODY | LINK)
    }

    pub fn projectile() -> CollisionGroups {
        CollisionGroups::new(PROJECTILE, VESSEL_BODY | LINK)
    }

    pub fn link() -> CollisionGroups {
        CollisionGroups::new(LINK, PROJECTILE | PLAYER_HITBOX)
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Resolve a collider to `(owner, tag, is_sensor)`.
fn resolve(
    q_colliders: &Query<(&ContactTag, Option<&ColliderOwner>, Has<Sensor>)>,
    collider: Entity,
) -> Option<(Entity, ContactTag, bool)> {
    let (tag, owner, sensor) = q_colliders.get(collider).ok()?;
    Some((owner.map_or(collider, |o| o.0), *tag, sensor))
}

/// World-space normal from `c1` toward `c2`, taken from the first contact
/// manifold of the pair.
fn manifold_normal(rapier: &RapierContext, c1: Entity, c2: Entity) -> Option<Vec2> {
    let pair = rapier.contact_pair(c1, c2)?;
    let manifold = pair.manifolds().next()?;
    let normal = manifold.normal();
    if normal.length_squared() < 1e-6 {
        return None;
    }
    Some(if pair.collider1() == Some(c1) {
        normal
    } else {
        -normal
    })
}

/// Translate Rapier collision starts into [`OverlapEvent`] / [`ContactEvent`].
///
/// Colliders without a [`ContactTag`] are ignored.  When the physics context
/// has no manifold for a solid pair (e.g. the bodies separated within the same
/// step) the normal falls back to the direction between the two owners.
pub fn dispatch_collision_events_system(
    mut collision_events: MessageReader<CollisionEvent>,
    q_colliders: Query<(&ContactTag, Option<&ColliderOwner>, Has<Sensor>)>,
    q_transforms: Query<&Transform>,
    rapier_context: ReadRapierContext,
    mut overlaps: MessageWriter<OverlapEvent>,
    mut contacts: MessageWriter<ContactEvent>,
) {
    let rapier = rapier_context.single().ok();

    for event in collision_events.read() {
        let (c1, c2, flags) = match event {
            CollisionEvent::Started(e1, e2, flags) => (*e1, *e2, *flags),
            CollisionEvent::Stopped(..) => continue,
        };

        let (Some((owner1, tag1, sensor1)), Some((owner2, tag2, sensor2))) =
            (resolve(&q_colliders, c1), resolve(&q_colliders, c2))
        else {
            continue;
        };

        if flags.contains(CollisionEventFlags::SENSOR) || sensor1 || sensor2 {
            overlaps.write(OverlapEvent {
                subject: owner1,
                subject_tag: tag1,
                other: owner2,
                other_tag: tag2,
                other_is_trigger: sensor2,
            });
            overlaps.write(OverlapEvent {
                subject: owner2,
                subject_tag: tag2,
                other: owner1,
                other_tag: tag1,
                other_is_trigger: sensor1,
            });
            continue;
        }

        let normal = rapier
            .as_ref()
            .and_then(|r| manifold_normal(r, c1, c2))
            .unwrap_or_else(|| {
                match (q_transforms.get(owner1), q_transforms.get(owner2)) {
                    (Ok(t1), Ok(t2)) => {
                        (t2.translation - t1.translation).truncate().normalize_or_zero()
                    }
                    _ => Vec2::ZERO,
                }
            });

        contacts.write(ContactEvent {
            subject: owner1,
            subject_tag: tag1,
            other: owner2,
            other_tag: tag2,
            normal,
        });
        contacts.write(ContactEvent {
            subject: owner2,
            subject_tag: tag2,
            other: owner1,
            other_tag: tag1,
            normal: -normal,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<CollisionEvent>();
        app.add_message::<OverlapEvent>();
        app.add_message::<ContactEvent>();
        app.add_systems(Update, dispatch_collision_events_system);
        app
    }

    fn drain<M: Message + Clone>(app: &mut App) -> Vec<M> {
        app.world_mut()
            .resource_mut::<Messages<M>>()
            .drain()
            .collect()
    }

    #[test]
    fn sensor_pair_produces_overlap_for_both_owners() {
        let mut app = dispatch_test_app();
        let vessel_a = app.world_mut().spawn(ContactTag::Vessel).id();
        let vessel_b = app.world_mut().spawn(ContactTag::Vessel).id();
        let zone_a = app
            .world_mut()
            .spawn((ContactTag::BondZone, ColliderOwner(vessel_a), Sensor))
            .id();
        let zone_b = app
            .world_mut()
            .spawn((ContactTag::BondZone, ColliderOwner(vessel_b), Sensor))
            .id();

        app.world_mut().write_message(CollisionEvent::Started(
            zone_a,
            zone_b,
            CollisionEventFlags::SENSOR,
        ));
        app.update();

        let overlaps = drain::<OverlapEvent>(&mut app);
        assert_eq!(overlaps.len(), 2);
        assert!(overlaps
            .iter()
            .any(|o| o.subject == vessel_a && o.other == vessel_b && o.other_is_trigger));
        assert!(overlaps
            .iter()
            .any(|o| o.subject == vessel_b && o.other == vessel_a && o.other_is_trigger));
        assert!(drain::<ContactEvent>(&mut app).is_empty());
    }

    #[test]
    fn solid_pair_falls_back_to_centre_normal() {
        let mut app = dispatch_test_app();
        let a = app
            .world_mut()
            .spawn((ContactTag::Vessel, Transform::from_xyz(0.0, 0.0, 0.0)))
            .id();
        let b = app
            .world_mut()
            .spawn((ContactTag::Vessel, Transform::from_xyz(2.0, 0.0, 0.0)))
            .id();

        app.world_mut().write_message(CollisionEvent::Started(
            a,
            b,
            CollisionEventFlags::empty(),
        ));
        app.update();

        let contacts = drain::<ContactEvent>(&mut app);
        assert_eq!(contacts.len(), 2);
        let from_a = contacts.iter().find(|c| c.subject == a).unwrap();
        assert!((from_a.normal - Vec2::X).length() < 1e-5);
        let from_b = contacts.iter().find(|c| c.subject == b).unwrap();
        assert!((from_b.normal + Vec2::X).length() < 1e-5);
    }

    #[test]
    fn untagged_colliders_are_ignored() {
        let mut app = dispatch_test_app();
        let a = app.world_mut().spawn(ContactTag::Vessel).id();
        let b = app.world_mut().spawn_empty().id();

        app.world_mut().write_message(CollisionEvent::Started(
            a,
            b,
            CollisionEventFlags::empty(),
        ));
        app.update();

        assert!(drain::<ContactEvent>(&mut app).is_empty());
        assert!(drain::<OverlapEvent>(&mut app).is_empty());
    }

    #[test]
    fn projectile_layers_reach_vessels_and_links_only() {
        let projectile = layers::projectile();
        let vessel = layers::vessel_body();
        let link = layers::link();
        let zone = layers::bond_zone();

        assert!(projectile.memberships.intersects(vessel.filters));
        assert!(vessel.memberships.intersects(projectile.filters));
        assert!(projectile.memberships.intersects(link.filters));
        assert!(!projectile.memberships.intersects(zone.filters));
    }
}

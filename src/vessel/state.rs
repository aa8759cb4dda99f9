//! Vessel components.
//!
//! Systems that mutate this state live in the sibling modules:
//! - [`super::bonds`] — connection graph
//! - [`super::physics`] — proximity force, contact bounce, minimum speed
//! - [`super::regen`] — regeneration routine
//! - [`super::damage`] — damage, death delay, removal

use crate::routine::Countdown;
use bevy::prelude::*;
use std::collections::HashSet;

// ── Markers ───────────────────────────────────────────────────────────────────

/// Marker component for every autonomous vessel body.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vessel;

/// Marker for the bond-zone sensor child of a vessel.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BondZone;

// ── Shape ─────────────────────────────────────────────────────────────────────

/// Scale of a vessel, drawn once at spawn and never mutated.
///
/// `size` drives the collider and outline radius; `bond_rank` decides who may
/// initiate a bond.  The two are drawn from the same range but kept apart so
/// either can be tuned without touching the other.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct VesselScale {
    pub size: f32,
    pub bond_rank: f32,
}

impl VesselScale {
    /// A scale whose size and rank are equal.
    pub fn uniform(scale: f32) -> Self {
        Self {
            size: scale,
            bond_rank: scale,
        }
    }
}

/// Random hull variant used by the renderer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HullStyle(pub u8);

// ── Motion ────────────────────────────────────────────────────────────────────

/// Cruise velocity.  Reflected about the contact normal on every bounce and
/// written back to the body; the minimum-speed floor never touches it.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Heading(pub Vec2);

impl Heading {
    /// Elastic reflection about a unit `normal`.  A zero normal leaves the
    /// heading unchanged.
    pub fn reflect(&mut self, normal: Vec2) {
        let n = normal.normalize_or_zero();
        if n == Vec2::ZERO {
            return;
        }
        self.0 -= 2.0 * self.0.dot(n) * n;
    }
}

/// Countdown to the next proximity-force pulse.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ProximityPulse(pub Countdown);

impl Default for ProximityPulse {
    /// The first pulse fires on the first frame after spawn.
    fn default() -> Self {
        Self(Countdown::elapsed())
    }
}

// ── Health ────────────────────────────────────────────────────────────────────

/// Outcome of a damage call on a vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VesselDamage {
    /// Precondition failed (connected or already dead); nothing changed.
    Ignored,
    Hurt,
    /// This call performed the death transition.
    Killed,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct VesselHealth {
    pub hp: f32,
    pub max_hp: f32,
}

impl VesselHealth {
    pub fn full(max_hp: f32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Apply `amount` damage unless the vessel is connected or already dead.
    pub fn take_damage(&mut self, amount: f32, connected: bool) -> VesselDamage {
        if connected || self.is_dead() {
            return VesselDamage::Ignored;
        }
        self.hp -= amount;
        if self.is_dead() {
            VesselDamage::Killed
        } else {
            VesselDamage::Hurt
        }
    }

    /// Restore up to `amount` HP, clamped to `[0, max_hp]`.
    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).clamp(0.0, self.max_hp);
    }
}

/// Present between death and removal.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Dying(pub Countdown);

// ── Bonds ─────────────────────────────────────────────────────────────────────

/// Peers this vessel is bonded to.  The union over all vessels forms the
/// connection graph, which must stay symmetric and irreflexive.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct Bonds(HashSet<Entity>);

impl Bonds {
    #[inline]
    pub fn is_connected(&self) -> bool {
        !self.0.is_empty()
    }

    #[inline]
    pub fn contains(&self, peer: Entity) -> bool {
        self.0.contains(&peer)
    }

    /// Add `peer`.  Returns `true` if this was the first bond.
    pub fn insert(&mut self, peer: Entity) -> bool {
        let was_connected = self.is_connected();
        self.0.insert(peer) && !was_connected
    }

    /// Remove `peer`.  Returns `true` if that left the set empty.
    pub fn remove(&mut self, peer: Entity) -> bool {
        self.0.remove(&peer) && self.0.is_empty()
    }

    pub fn peers(&self) -> impl Iterator<Item = Entity> + '_ {
        self.0.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_flips_normal_component() {
        let mut h = Heading(Vec2::new(3.0, -4.0));
        h.reflect(Vec2::Y);
        assert_eq!(h.0, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn reflect_ignores_zero_normal() {
        let mut h = Heading(Vec2::new(1.0, 2.0));
        h.reflect(Vec2::ZERO);
        assert_eq!(h.0, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn damage_is_ignored_while_connected() {
        let mut hp = VesselHealth::full(3.0);
        assert_eq!(hp.take_damage(1.0, true), VesselDamage::Ignored);
        assert_eq!(hp.hp, 3.0);
    }

    #[test]
    fn death_transition_happens_once() {
        let mut hp = VesselHealth::full(1.0);
        assert_eq!(hp.take_damage(5.0, false), VesselDamage::Killed);
        assert_eq!(hp.take_damage(1.0, false), VesselDamage::Ignored);
        assert_eq!(hp.hp, -4.0);
    }

    #[test]
    fn heal_clamps_to_max() {
        let mut hp = VesselHealth { hp: 2.5, max_hp: 3.0 };
        hp.heal(1.0);
        assert_eq!(hp.hp, 3.0);
    }

    #[test]
    fn bonds_report_first_and_last_edges() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut bonds = Bonds::default();
        assert!(bonds.insert(a));
        assert!(!bonds.insert(b));
        assert!(!bonds.insert(b));
        assert_eq!(bonds.len(), 2);
        assert!(!bonds.remove(a));
        assert!(bonds.remove(b));
        assert!(!bonds.is_connected());
    }
}

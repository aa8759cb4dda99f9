//! Simulation-specific error types.
//!
//! Gameplay preconditions (already dead, already bonded, invincible) are not
//! errors: they silently no-op.  `SimError` is reserved for states that must
//! never happen: a broken connection graph, a stale entity reference, or a
//! tuning value that would stall the simulation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::error::SimError;
//!
//! fn lookup(peers: &Query<&Bonds>, peer: Entity) -> SimResult<&Bonds> {
//!     peers
//!         .get(peer)
//!         .map_err(|_| SimError::EntityNotFound { context: "bond peer lookup" })
//! }
//! ```

use bevy::prelude::Entity;
use std::fmt;

/// Top-level error enum for the flotilla simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// An entity was referenced but could not be found in the world.
    /// Acting on a destroyed vessel is a programming error, not a no-op.
    EntityNotFound {
        /// Human-readable description of where the lookup occurred.
        context: &'static str,
    },

    /// `a` lists `b` as a bond peer but `b` does not list `a` back.
    BondAsymmetry { a: Entity, b: Entity },

    /// A vessel lists itself as a bond peer.
    SelfBond { vessel: Entity },

    /// Tuning constant is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::EntityNotFound { context } => {
                write!(f, "entity not found during '{}'", context)
            }
            SimError::BondAsymmetry { a, b } => write!(
                f,
                "connection graph is asymmetric: {:?} lists {:?} but not the reverse",
                a, b
            ),
            SimError::SelfBond { vessel } => {
                write!(f, "vessel {:?} is bonded to itself", vessel)
            }
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if `value` is not strictly positive.
pub fn require_positive(name: &'static str, value: f32) -> SimResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

//! Flotilla: drifting vessels that bond into clusters, and the ship that
//! hunts them.
//!
//! The simulation is headless and lives behind [`simulation::SimulationPlugin`].
//! Rendering, device input and the vessel population are wired up by the
//! binary.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod feedback;
pub mod gauge;
pub mod link;
pub mod player;
pub mod projectile;
pub mod rendering;
pub mod routine;
pub mod session;
pub mod simulation;
pub mod vessel;

//! Particle physics
//!
//! - `integrate`  velocity/position update with boundary reflection
//! - `forces`     cursor repulsion field
//! - `collision`  narrow-phase pair response over the broad-phase grid

pub mod collision;
pub mod forces;
pub mod integrate;

pub use collision::{collide_pair, resolve_collisions, CollisionStats};
pub use forces::apply_cursor_force;
pub use integrate::{integrate_batch, integrate_particle, IntegrateStats, StepOutcome};

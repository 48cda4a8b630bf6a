pub mod config;
pub mod host;
pub mod particle;

pub use config::EngineConfig;
pub use host::{HostId, HostProfile};
pub use particle::{Particle, ParticleId};

//! Per-frame systems. Each works on one host batch (`&mut [Particle]`) and
//! knows nothing about hosts, scheduling or rendering.

pub mod physics;
pub mod trails;

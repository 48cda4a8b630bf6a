//! Core helpers shared by every layer: logging, numeric guards, RNG, vector math.

#[macro_use]
#[path = "utils/log.rs"]
pub mod log;
#[path = "utils/numeric.rs"]
pub mod numeric;
pub mod random;
pub mod vec2;

pub use random::Rng;
pub use vec2::Vec2;

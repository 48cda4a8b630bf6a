pub mod boundary;
pub mod grid;
pub mod poisson;

pub use boundary::StadiumShape;
pub use grid::SpatialGrid;

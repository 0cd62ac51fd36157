mod cube;

pub use cube::{cube, cube_bounds, CUBE_INDICES, CUBE_VERTICES};

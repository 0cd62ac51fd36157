pub mod depth;

pub use depth::DepthTarget;

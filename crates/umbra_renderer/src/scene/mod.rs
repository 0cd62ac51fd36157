pub mod bounds;
pub mod frustum;
pub mod instances;

pub use bounds::{Aabb, GpuAabb};
pub use frustum::{Frustum, Visibility};
pub use instances::{InstanceRecord, InstanceStore, MAX_INSTANCES};

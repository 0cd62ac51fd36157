/// Fixed-capacity store of per-instance records and their bounding boxes.
///
/// The store is the single source of truth for how many instances exist and
/// where they are.  Records live in a buffer sized to [`MAX_INSTANCES`] for
/// the whole lifetime of the store; adding and removing only moves the
/// logical active count.
use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scene::bounds::Aabb;

/// Capacity of the store and of every per-instance GPU buffer.
pub const MAX_INSTANCES: usize = 100;

/// Half-extent of the cube random instances are scattered in.
const SCATTER_HALF_EXTENT: f32 = 3.5;

/// Speeds at or below this are treated as static.
const ROTATION_EPSILON: f32 = 1e-4;

/// Shininess given to instances that get a specular highlight.
const SHINY: f32 = 64.0;

/// Per-instance data as read by both the cull compute shader and the
/// instanced vertex shader (`Instance` in the WGSL sources).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRecord {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`.
    pub normal: [[f32; 4]; 4],
    pub shininess: f32,
    /// Radians per second around the Y axis.
    pub rotation_speed: f32,
    pub texture_id: u32,
    /// 1 when the fragment shader should perturb the normal, 0 otherwise.
    pub normal_map: u32,
    pub position: [f32; 3],
    pub angle: f32,
}

impl InstanceRecord {
    pub fn new(position: Vec3, shininess: f32, rotation_speed: f32) -> Self {
        let mut record = Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            normal: Mat4::IDENTITY.to_cols_array_2d(),
            shininess,
            rotation_speed,
            texture_id: 0,
            normal_map: 1,
            position: position.to_array(),
            angle: 0.0,
        };
        record.rebuild_matrices();
        record
    }

    #[inline]
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    #[inline]
    pub fn is_rotating(&self) -> bool {
        self.rotation_speed.abs() > ROTATION_EPSILON
    }

    /// model = translation · rotation_y(angle); normal = (model⁻¹)ᵀ.
    fn rebuild_matrices(&mut self) {
        let model = Mat4::from_translation(Vec3::from_array(self.position))
            * Mat4::from_rotation_y(self.angle);
        self.model = model.to_cols_array_2d();
        self.normal = model.inverse().transpose().to_cols_array_2d();
    }
}

pub struct InstanceStore {
    records: Vec<InstanceRecord>,
    bounds: Vec<Aabb>,
    active: usize,
    /// Local-space box of the shared mesh, copied into every new slot.
    mesh_bounds: Aabb,
    rng: StdRng,
    dirty: bool,
}

impl InstanceStore {
    /// Creates an empty store.  `mesh_bounds` is the local box of the mesh
    /// every instance draws; `seed` makes random placement reproducible.
    pub fn new(mesh_bounds: Aabb, seed: u64) -> Self {
        let blank = InstanceRecord::new(Vec3::ZERO, 0.0, 0.0);
        Self {
            records: vec![blank; MAX_INSTANCES],
            bounds: vec![Aabb::EMPTY; MAX_INSTANCES],
            active: 0,
            mesh_bounds,
            rng: StdRng::seed_from_u64(seed),
            dirty: true,
        }
    }

    /// The demo scene: one cube spinning near the origin, one static shiny
    /// cube beside it, and eight scattered random cubes.
    pub fn with_default_scene(mesh_bounds: Aabb, seed: u64) -> Self {
        let mut store = Self::new(mesh_bounds, seed);
        // the tiny x offset keeps the pivot from sitting exactly on the axis
        store.spawn(Vec3::new(0.00001, 0.0, 0.0), 0.0, FRAC_PI_2);
        store.spawn(Vec3::new(2.0, 0.0, 0.0), SHINY, 0.0);
        for _ in 0..8 {
            store.add_instance();
        }
        store
    }

    /// Activates one more instance at a random position.  Returns `false`
    /// and leaves the store untouched when it is already full.
    pub fn add_instance(&mut self) -> bool {
        if self.active >= MAX_INSTANCES {
            return false;
        }
        let record = self.random_record();
        self.init_slot(self.active, record);
        self.active += 1;
        true
    }

    /// Deactivates the most recently added instance.  Returns `false` at zero.
    pub fn remove_instance(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        self.active -= 1;
        self.dirty = true;
        true
    }

    /// Activates one more instance at a fixed placement.  Returns its index,
    /// or `None` when the store is full.
    pub fn spawn(&mut self, position: Vec3, shininess: f32, rotation_speed: f32) -> Option<usize> {
        if self.active >= MAX_INSTANCES {
            return None;
        }
        let index = self.active;
        self.init_slot(index, InstanceRecord::new(position, shininess, rotation_speed));
        self.active += 1;
        Some(index)
    }

    /// Sets the active count directly, clamped to `[0, MAX_INSTANCES]`.
    /// Slots that become active are reinitialised at random positions.
    pub fn set_active_count(&mut self, count: usize) {
        let count = count.min(MAX_INSTANCES);
        while self.active < count {
            self.add_instance();
        }
        if count < self.active {
            self.active = count;
            self.dirty = true;
        }
    }

    /// Advances the rotation of every spinning active instance by `dt` seconds.
    pub fn animate(&mut self, dt: f32) {
        let mut changed = false;
        for record in &mut self.records[..self.active] {
            if record.is_rotating() {
                record.angle = (record.angle + dt * record.rotation_speed) % TAU;
                record.rebuild_matrices();
                changed = true;
            }
        }
        self.dirty |= changed;
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        MAX_INSTANCES
    }

    /// Records of the active instances.
    #[inline]
    pub fn records(&self) -> &[InstanceRecord] {
        &self.records[..self.active]
    }

    /// Local bounding boxes parallel to [`records`](Self::records).
    #[inline]
    pub fn bounds(&self) -> &[Aabb] {
        &self.bounds[..self.active]
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether the records changed since the last call and clears
    /// the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn init_slot(&mut self, index: usize, record: InstanceRecord) {
        self.records[index] = record;
        self.bounds[index] = self.mesh_bounds;
        self.dirty = true;
    }

    fn random_record(&mut self) -> InstanceRecord {
        let mut axis = || self.rng.gen::<f32>() * 2.0 * SCATTER_HALF_EXTENT - SCATTER_HALF_EXTENT;
        let position = Vec3::new(axis(), axis(), axis());
        let shininess = if self.rng.gen_bool(0.5) { SHINY } else { 0.0 };
        let speed = self.rng.gen::<f32>() * TAU;
        InstanceRecord::new(position, shininess, speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_bounds() -> Aabb {
        Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    #[test]
    fn record_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<InstanceRecord>(), 160);
        assert_eq!(std::mem::offset_of!(InstanceRecord, shininess), 128);
        assert_eq!(std::mem::offset_of!(InstanceRecord, position), 144);
        assert_eq!(std::mem::offset_of!(InstanceRecord, angle), 156);
    }

    #[test]
    fn add_clamps_at_capacity() {
        let mut store = InstanceStore::new(unit_bounds(), 1);
        let mut accepted = 0;
        for _ in 0..105 {
            if store.add_instance() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, MAX_INSTANCES);
        assert_eq!(store.active_count(), MAX_INSTANCES);
        assert!(!store.add_instance());
        assert!(store.spawn(Vec3::ZERO, 0.0, 0.0).is_none());
        assert_eq!(store.active_count(), MAX_INSTANCES);
    }

    #[test]
    fn remove_at_zero_is_noop() {
        let mut store = InstanceStore::new(unit_bounds(), 1);
        assert!(!store.remove_instance());
        assert_eq!(store.active_count(), 0);
        store.add_instance();
        assert!(store.remove_instance());
        assert!(!store.remove_instance());
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn random_placement_stays_in_scatter_cube() {
        let mut store = InstanceStore::new(unit_bounds(), 7);
        store.set_active_count(MAX_INSTANCES);
        for r in store.records() {
            for c in r.position {
                assert!((-SCATTER_HALF_EXTENT..SCATTER_HALF_EXTENT).contains(&c));
            }
            assert!(r.shininess == 0.0 || r.shininess == SHINY);
            assert!((0.0..TAU).contains(&r.rotation_speed));
            assert_eq!(r.normal_map, 1);
        }
    }

    #[test]
    fn readd_reinitialises_the_slot() {
        let mut store = InstanceStore::new(unit_bounds(), 3);
        store.spawn(Vec3::new(9.0, 9.0, 9.0), 0.0, 0.0);
        store.remove_instance();
        store.add_instance();
        assert_ne!(store.records()[0].position, [9.0, 9.0, 9.0]);
        assert_eq!(store.bounds()[0], unit_bounds());
    }

    #[test]
    fn same_seed_same_scene() {
        let a = InstanceStore::with_default_scene(unit_bounds(), 42);
        let b = InstanceStore::with_default_scene(unit_bounds(), 42);
        assert_eq!(a.active_count(), 10);
        assert_eq!(a.records(), b.records());
    }

    #[test]
    fn animate_only_touches_rotating_instances() {
        let mut store = InstanceStore::new(unit_bounds(), 0);
        store.spawn(Vec3::new(1.0, 0.0, 0.0), 0.0, FRAC_PI_2);
        store.spawn(Vec3::new(2.0, 0.0, 0.0), SHINY, 0.0);
        store.take_dirty();
        let still = store.records()[1];

        store.animate(1.0);
        assert!(store.take_dirty());
        let spun = store.records()[0];
        assert!((spun.angle - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(store.records()[1], still);

        // translation is preserved by the rotation
        let origin = spun.model_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
        // rotation is orthonormal, so the normal matrix equals its linear part
        let n = Mat4::from_cols_array_2d(&spun.normal);
        let m = spun.model_matrix();
        assert!(n.x_axis.truncate().abs_diff_eq(m.x_axis.truncate(), 1e-5));
    }

    #[test]
    fn static_scene_stays_clean() {
        let mut store = InstanceStore::new(unit_bounds(), 0);
        store.spawn(Vec3::ZERO, 0.0, 0.0);
        store.take_dirty();
        store.animate(0.5);
        assert!(!store.is_dirty());
    }
}

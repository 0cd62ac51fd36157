//! CPU-side culling: test on the host, upload the survivors.
use crate::cull::{CullContext, Culler, InstanceSource, VisibleSet};
use crate::resources::InstanceBuffer;
use crate::scene::{Frustum, InstanceRecord, InstanceStore, MAX_INSTANCES};

/// Reusable compaction buffer, allocated once at [`MAX_INSTANCES`].
pub struct VisibleList {
    records: Vec<InstanceRecord>,
}

impl Default for VisibleList {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibleList {
    pub fn new() -> Self {
        Self {
            records: Vec::with_capacity(MAX_INSTANCES),
        }
    }

    /// Copies every active record whose box passes the frustum test, in
    /// store order.  Deterministic for a given store and frustum.
    pub fn rebuild(&mut self, store: &InstanceStore, frustum: &Frustum) -> &[InstanceRecord] {
        self.records.clear();
        self.records.extend(
            store
                .records()
                .iter()
                .zip(store.bounds())
                .filter(|(record, aabb)| frustum.is_box_visible(aabb, &record.model_matrix()))
                .map(|(record, _)| *record),
        );
        &self.records
    }

    #[inline]
    pub fn as_slice(&self) -> &[InstanceRecord] {
        &self.records
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }
}

pub struct CpuCuller {
    list: VisibleList,
    visible: InstanceBuffer,
}

impl CpuCuller {
    pub fn new(device: &wgpu::Device, instance_layout: &wgpu::BindGroupLayout) -> Self {
        Self {
            list: VisibleList::new(),
            visible: InstanceBuffer::new(
                device,
                instance_layout,
                "CPU Visible Instances",
                wgpu::BufferUsages::empty(),
            ),
        }
    }

    /// Survivors of the box test, without touching the GPU.
    pub fn cull_records(&mut self, store: &InstanceStore, frustum: &Frustum) -> &[InstanceRecord] {
        self.list.rebuild(store, frustum)
    }
}

impl Culler for CpuCuller {
    fn cull(
        &mut self,
        ctx: &mut CullContext<'_>,
        store: &InstanceStore,
        frustum: &Frustum,
    ) -> VisibleSet {
        let survivors = self.list.rebuild(store, frustum);
        self.visible.write(ctx.queue, survivors);
        VisibleSet {
            bind_group: self.visible.bind_group.clone(),
            instances: InstanceSource::Direct {
                count: survivors.len() as u32,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    use crate::scene::Aabb;

    fn frustum() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 100.0);
        Frustum::from_view_proj(&(proj * view))
    }

    fn store_with(positions: &[Vec3]) -> InstanceStore {
        let mut store = InstanceStore::new(Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)), 0);
        for &p in positions {
            store.spawn(p, 0.0, 0.0);
        }
        store
    }

    #[test]
    fn two_inside_both_visible() {
        let store = store_with(&[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)]);
        let mut list = VisibleList::new();
        assert_eq!(list.rebuild(&store, &frustum()).len(), 2);
    }

    #[test]
    fn far_instance_is_dropped() {
        let store = store_with(&[Vec3::ZERO, Vec3::new(0.0, 0.0, -10_000.0)]);
        let mut list = VisibleList::new();
        let survivors = list.rebuild(&store, &frustum());
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn inactive_slots_are_ignored() {
        let mut store = store_with(&[Vec3::ZERO, Vec3::ZERO, Vec3::ZERO]);
        store.remove_instance();
        let mut list = VisibleList::new();
        assert_eq!(list.rebuild(&store, &frustum()).len(), 2);
    }

    #[test]
    fn rebuild_is_deterministic_and_never_reallocates() {
        let mut store = InstanceStore::new(Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)), 5);
        store.set_active_count(MAX_INSTANCES);
        let mut list = VisibleList::new();
        let cap = list.capacity();
        let first = list.rebuild(&store, &frustum()).to_vec();
        let second = list.rebuild(&store, &frustum()).to_vec();
        assert_eq!(first, second);
        assert_eq!(list.capacity(), cap);
        assert!(list.capacity() >= MAX_INSTANCES);
    }
}

/// GPU-side scene constants: camera, up to [`MAX_LIGHTS`] point lights and
/// ambient.
///
/// `GpuScene` owns the `wgpu::Buffer` that holds the uniform and keeps the
/// bind group shaders bind at group(0).  It is the bridge between the CPU
/// `Camera` (in `umbra_core`) plus [`Lighting`] and the instanced pipeline.
use std::f32::consts::TAU;
use std::sync::Arc;

use glam::Vec3;
use umbra_core::scene::Camera;

use crate::resources::buffer;

/// Length of the light array in the scene uniform.
pub const MAX_LIGHTS: usize = 10;

/// Radius and height of the ring new lights are placed on.
const RING_RADIUS: f32 = 2.5;
const RING_HEIGHT: f32 = 1.5;

/// A point light.  Falloff is `1 / d²`, clamped to 1.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
}

impl PointLight {
    /// Light `slot` of a fresh ring, white.
    fn on_ring(slot: usize) -> Self {
        let angle = slot as f32 * TAU / MAX_LIGHTS as f32;
        Self {
            position: Vec3::new(RING_RADIUS * angle.cos(), RING_HEIGHT, RING_RADIUS * angle.sin()),
            color: Vec3::ONE,
        }
    }
}

/// Everything the fragment shader lights with.
///
/// Only the first [`Lighting::count`] slots are uploaded as live; the count
/// never leaves `0..=MAX_LIGHTS`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lighting {
    pub(crate) lights: [PointLight; MAX_LIGHTS],
    pub(crate) count: usize,
    pub ambient: Vec3,
    /// Output remapped normals instead of shading.
    pub show_normals: bool,
}

impl Default for Lighting {
    /// One yellow light just above the origin over a dim blue ambient.
    fn default() -> Self {
        let mut lights = [PointLight::on_ring(0); MAX_LIGHTS];
        lights[0] = PointLight {
            position: Vec3::new(0.0, 1.05, 0.0),
            color: Vec3::new(1.0, 1.0, 0.0),
        };
        Self {
            lights,
            count: 1,
            ambient: Vec3::new(0.0, 0.0, 0.2),
            show_normals: false,
        }
    }
}

impl Lighting {
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// The live lights.
    #[inline]
    pub fn lights(&self) -> &[PointLight] {
        &self.lights[..self.count]
    }

    #[inline]
    pub fn lights_mut(&mut self) -> &mut [PointLight] {
        &mut self.lights[..self.count]
    }

    /// Turns on the next slot with a fresh light on the ring.  `false` when
    /// all slots are live.
    pub fn add_light(&mut self) -> bool {
        if self.count == MAX_LIGHTS {
            return false;
        }
        self.lights[self.count] = PointLight::on_ring(self.count);
        self.count += 1;
        true
    }

    /// Turns off the newest light.  `false` when none are live.
    pub fn remove_light(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }
}

/// One entry of `Scene.lights` in `instanced.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

/// Matches `Scene` in `instanced.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub light_count: u32,
    pub show_normals: u32,
    pub _pad: [u32; 2],
    pub lights: [GpuLight; MAX_LIGHTS],
    pub ambient: [f32; 4],
}

impl SceneUniform {
    pub fn new(camera: &Camera, lighting: &Lighting) -> Self {
        let mut lights = [GpuLight::default(); MAX_LIGHTS];
        for (slot, light) in lights.iter_mut().zip(lighting.lights()) {
            *slot = GpuLight {
                position: light.position.extend(1.0).to_array(),
                color: light.color.extend(1.0).to_array(),
            };
        }
        Self {
            view_proj: camera.build_view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.eye.extend(1.0).to_array(),
            light_count: lighting.count() as u32,
            show_normals: lighting.show_normals as u32,
            _pad: [0; 2],
            lights,
            ambient: lighting.ambient.extend(1.0).to_array(),
        }
    }
}

pub struct GpuScene {
    pub uniform: SceneUniform,
    pub buffer: Arc<wgpu::Buffer>,
    pub bind_group: Arc<wgpu::BindGroup>,
}

impl GpuScene {
    /// Allocates the uniform buffer and creates a bind group using the
    /// provided layout (a single `UNIFORM` buffer entry at binding 0).
    pub fn new(
        device: &wgpu::Device,
        camera: &Camera,
        lighting: &Lighting,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let uniform = SceneUniform::new(camera, lighting);
        let buf = buffer::create_uniform(device, "Scene Uniform Buffer", &uniform);

        let bind_group = Arc::new(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buf.as_entire_binding(),
            }],
        }));

        Self {
            uniform,
            buffer: buf,
            bind_group,
        }
    }

    /// Syncs the CPU camera and lights to the GPU buffer.  Call once per
    /// frame before any pass executes.
    pub fn sync(&mut self, queue: &wgpu::Queue, camera: &Camera, lighting: &Lighting) {
        self.uniform = SceneUniform::new(camera, lighting);
        buffer::update_uniform(queue, &self.buffer, &self.uniform);
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use super::*;

    #[test]
    fn uniform_layout_matches_wgsl() {
        assert_eq!(size_of::<GpuLight>(), 32);
        assert_eq!(size_of::<SceneUniform>(), 432);
        assert_eq!(offset_of!(SceneUniform, light_count), 80);
        assert_eq!(offset_of!(SceneUniform, lights), 96);
        assert_eq!(offset_of!(SceneUniform, ambient), 416);
    }

    #[test]
    fn default_lighting_is_one_yellow_light() {
        let lighting = Lighting::default();
        assert_eq!(lighting.count(), 1);
        assert_eq!(lighting.lights()[0].position, Vec3::new(0.0, 1.05, 0.0));
        assert_eq!(lighting.lights()[0].color, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(lighting.ambient, Vec3::new(0.0, 0.0, 0.2));
        assert!(!lighting.show_normals);
    }

    #[test]
    fn light_count_is_clamped() {
        let mut lighting = Lighting::default();
        let added = (0..MAX_LIGHTS + 1).filter(|_| lighting.add_light()).count();
        assert_eq!(added, MAX_LIGHTS - 1);
        assert_eq!(lighting.count(), MAX_LIGHTS);

        for _ in 0..MAX_LIGHTS {
            assert!(lighting.remove_light());
        }
        assert!(!lighting.remove_light());
        assert_eq!(lighting.count(), 0);
        assert!(lighting.lights().is_empty());
    }

    #[test]
    fn re_added_light_is_reset() {
        let mut lighting = Lighting::default();
        assert!(lighting.add_light());
        lighting.lights_mut()[1].color = Vec3::ZERO;
        assert!(lighting.remove_light());
        assert!(lighting.add_light());
        assert_eq!(lighting.lights()[1].color, Vec3::ONE);
        assert!((lighting.lights()[1].position.y - RING_HEIGHT).abs() < 1e-6);
    }

    #[test]
    fn uniform_carries_only_live_lights() {
        let mut lighting = Lighting::default();
        lighting.add_light();
        lighting.show_normals = true;
        let u = SceneUniform::new(&Camera::default(), &lighting);
        assert_eq!(u.light_count, 2);
        assert_eq!(u.show_normals, 1);
        assert_eq!(u.lights[0].position, [0.0, 1.05, 0.0, 1.0]);
        assert_eq!(u.lights[1].color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(u.lights[2].color, [0.0; 4]);
        assert_eq!(u.camera_pos[3], 1.0);
    }
}

//! `umbra_renderer`: GPU-driven instanced rendering with frustum culling.
//!
//! # Module layout
//!
//! | Module          | Responsibility                                         |
//! |-----------------|--------------------------------------------------------|
//! | `context`       | Re-exports `EngineContext`; device/queue accessors     |
//! | `resources`     | Buffer helpers, fixed-capacity `InstanceBuffer`        |
//! | `geometry`      | `Vertex`, `Mesh`, built-in cube                        |
//! | `camera`        | Scene uniform (camera + lights) + orbit controller     |
//! | `pipeline`      | Bind-group layouts, shader library, render/compute     |
//! | `render_target` | Depth target rebuilt on resize                         |
//! | `scene`         | `Aabb`, `Frustum`, `InstanceStore`                     |
//! | `cull`          | `Culler` trait: pass-through, CPU and GPU strategies   |
//! | `indirect`      | Indirect args buffers + `submit` for one draw          |
//! | `query_ring`    | In-flight readbacks of the GPU visible count           |
//! | `graph`         | `RenderPass` trait + `FramePacket`                     |
//! | `passes`        | Built-in `InstancedPass`                               |

pub mod camera;
pub mod context;
pub mod cull;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod indirect;
pub mod passes;
pub mod pipeline;
pub mod query_ring;
pub mod render_target;
pub mod resources;
pub mod scene;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use glam;

pub use camera::{Camera, Controller, GpuScene, Lighting, OrbitState, PointLight, MAX_LIGHTS};
pub use cull::{CullMode, Culler, InstanceSource, VisibleSet};
pub use error::RendererError;
pub use geometry::{Mesh, Vertex};
pub use graph::{FramePacket, RenderPass};
pub use indirect::DrawIndexedIndirectArgs;
pub use render_target::DepthTarget;
pub use scene::{Aabb, Frustum, InstanceRecord, InstanceStore, Visibility, MAX_INSTANCES};
// Key / mouse button types; users need these to configure Controller bindings.
pub use umbra_core::input::{InputState, KeyCode, MouseButton};

// ── Internal imports ──────────────────────────────────────────────────────────

use serde::Deserialize;

use cull::{CpuCuller, CullContext, GpuCuller, PassThroughCuller};
use graph::DrawCommand;
use passes::InstancedPass;
use pipeline::{InstancedPipeline, PipelineLayouts, ShaderDefines, ShaderLibrary};
use resources::InstanceBuffer;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Start-up options, usually the `[renderer]` table of the app config.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub cull_mode: CullMode,
    /// Seed of the instance placement RNG.
    pub seed: u64,
    pub rotate: bool,
    /// Procedural normal perturbation in the fragment shader.
    pub normal_maps: bool,
    /// Start with the normal visualisation instead of lighting.
    pub show_normals: bool,
    /// Linear RGBA.
    pub clear_color: [f64; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Gpu,
            seed: 0x5eed,
            rotate: true,
            normal_maps: true,
            show_normals: false,
            clear_color: [0.1, 0.1, 0.12, 1.0],
        }
    }
}

// ── Statistics ────────────────────────────────────────────────────────────────

/// Culling counters for the window title and logs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CullStats {
    pub mode: CullMode,
    pub active: usize,
    /// Survivors of the last CPU-culled frame (`None` outside CPU mode).
    pub cpu_visible: Option<u32>,
    /// Count from the newest completed GPU readback.
    pub gpu_visible: Option<u32>,
    /// Frame id that readback belongs to.
    pub last_completed_frame: Option<u64>,
    /// Frames rendered so far.
    pub frame: u64,
}

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Top-level renderer.
///
/// Holds GPU resources and executes a list of [`RenderPass`] stages each frame
/// using the two-phase **prepare → execute** pattern.  Before the passes run,
/// the active [`Culler`] turns the [`InstanceStore`] into a [`VisibleSet`]
/// that the built-in [`InstancedPass`] draws.
///
/// A frame is `update` → `render_to_view` → submit → `finish_frame`, or
/// [`Renderer::render`] which does the last three in one call.
pub struct Renderer {
    pub context: context::EngineContext,
    depth: DepthTarget,
    /// Ordered list of passes executed every frame.
    pub passes: Vec<Box<dyn RenderPass>>,

    // ── Camera ────────────────────────────────────────────────────────────
    pub camera: Camera,
    pub orbit: OrbitState,
    pub lighting: Lighting,
    gpu_scene: GpuScene,
    /// Refilled every frame; the draw list keeps its allocation.
    packet: FramePacket,

    // ── Instances ─────────────────────────────────────────────────────────
    mesh: Mesh,
    store: InstanceStore,
    /// All active records; pass-through draws from it, the GPU culler reads it.
    instances: InstanceBuffer,

    // ── Culling ───────────────────────────────────────────────────────────
    mode: CullMode,
    pass_through: PassThroughCuller,
    cpu: CpuCuller,
    gpu: GpuCuller,
    cpu_visible: Option<u32>,

    rotate: bool,
    frame: u64,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Builds pipelines, buffers and the default ten-instance scene.
    ///
    /// Every failure here is fatal: shader compilation, pipeline or bind
    /// group validation.
    pub fn new(
        context: context::EngineContext,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        config: &RendererConfig,
    ) -> Result<Self, RendererError> {
        let device = context::device(&context);
        let queue = context::queue(&context);

        let depth = DepthTarget::new(device, width, height);
        let layouts = PipelineLayouts::new(device);

        let defines = ShaderDefines::new().with_flag("USE_NORMAL_MAPS", config.normal_maps);
        let shader = ShaderLibrary::load(device, "instanced", &defines)?;
        let pipeline = InstancedPipeline::new(device, &shader, format, &layouts)?;

        let mut camera = Camera::default();
        camera.set_viewport(width, height);
        let orbit = OrbitState::default();
        orbit.apply(&mut camera);
        let lighting = Lighting {
            show_normals: config.show_normals,
            ..Lighting::default()
        };
        let gpu_scene = GpuScene::new(device, &camera, &lighting, &layouts.scene);

        let mesh = Mesh::cube(device);
        let mut store = InstanceStore::with_default_scene(mesh.bounds, config.seed);
        let instances = InstanceBuffer::new(
            device,
            &layouts.instances,
            "Instance Records",
            wgpu::BufferUsages::empty(),
        );
        instances.write(queue, store.records());
        store.take_dirty();

        let cpu = CpuCuller::new(device, &layouts.instances);
        let mut gpu = GpuCuller::new(device, &layouts, &instances, mesh.index_count)?;
        if config.cull_mode == CullMode::Gpu {
            gpu.on_activate(queue);
        }

        let [r, g, b, a] = config.clear_color;
        let clear = wgpu::Color { r, g, b, a };
        let mut passes: Vec<Box<dyn RenderPass>> = Vec::new();
        passes.push(Box::new(InstancedPass::new(pipeline, gpu_scene.bind_group.clone(), clear)));

        log::info!(
            "renderer ready: {}x{} {:?}, {} instances, cull mode {}",
            width,
            height,
            format,
            store.active_count(),
            config.cull_mode
        );

        Ok(Self {
            context,
            depth,
            passes,
            camera,
            orbit,
            lighting,
            gpu_scene,
            packet: FramePacket::default(),
            mesh,
            store,
            instances,
            mode: config.cull_mode,
            pass_through: PassThroughCuller,
            cpu,
            gpu,
            cpu_visible: None,
            rotate: config.rotate,
            frame: 0,
            width: width.max(1),
            height: height.max(1),
        })
    }

    /// Builds a renderer on a fresh headless context, for drawing into
    /// caller-owned textures.
    pub async fn headless(
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        config: &RendererConfig,
    ) -> anyhow::Result<Self> {
        let context = context::EngineContext::new().await?;
        Ok(Self::new(context, width, height, format, config)?)
    }

    // ── Frame API ─────────────────────────────────────────────────────────────

    /// Advances the instance animation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.rotate {
            self.store.animate(dt);
        }
    }

    /// Allocates a fresh `CommandEncoder` for the current frame.
    pub fn begin_frame(&self) -> wgpu::CommandEncoder {
        self.context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            })
    }

    /// Culls and records every pass into `encoder`, drawing into `view`.
    ///
    /// The caller submits `encoder` and then calls [`Renderer::finish_frame`].
    pub fn render_to_view(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        // 1. Upload scene constants
        self.gpu_scene.sync(&self.context.queue, &self.camera, &self.lighting);

        // 2. Keep the shared record buffer current (GPU mode uploads itself)
        if self.store.take_dirty() && self.mode != CullMode::Gpu {
            self.instances.write(&self.context.queue, self.store.records());
        }

        // 3. Cull
        let view_proj = self.camera.build_view_projection_matrix();
        let frustum = Frustum::from_view_proj(&view_proj);
        let culler: &mut dyn Culler = match self.mode {
            CullMode::Disabled => &mut self.pass_through,
            CullMode::Cpu => &mut self.cpu,
            CullMode::Gpu => &mut self.gpu,
        };
        let mut ctx = CullContext {
            device: &self.context.device,
            queue: &self.context.queue,
            encoder: &mut *encoder,
            instances: &self.instances,
            frame: self.frame,
        };
        let visible = culler.cull(&mut ctx, &self.store, &frustum);

        self.cpu_visible = match (self.mode, &visible.instances) {
            (CullMode::Cpu, InstanceSource::Direct { count }) => Some(*count),
            _ => None,
        };

        // 4. Refill the frame packet (pure CPU data)
        self.packet.reset();
        self.packet.draws.push(DrawCommand {
            vertex_buffer: self.mesh.vertex_buffer.clone(),
            index_buffer: self.mesh.index_buffer.clone(),
            index_count: self.mesh.index_count,
            index_format: self.mesh.index_format,
            instance_bind_group: visible.bind_group,
            instances: visible.instances,
        });

        // 5. Execute every registered pass
        for pass in &mut self.passes {
            pass.prepare(&self.context.device, &self.context.queue, &self.packet);
            pass.execute(
                &self.context.device,
                &self.context.queue,
                encoder,
                view,
                Some(&self.depth.view),
                &self.packet,
            );
        }
    }

    /// Completes a frame after its command buffer was submitted: arms the
    /// readback recorded this frame and collects finished ones without
    /// blocking.
    pub fn finish_frame(&mut self) {
        self.gpu.after_submit();
        self.context.device.poll(wgpu::Maintain::Poll);
        if let Some((frame, visible)) = self.gpu.poll_queries() {
            log::trace!("gpu cull of frame {frame}: {visible} visible");
        }
        self.frame += 1;
    }

    /// One full frame into `view`: cull, draw, submit, poll.
    pub fn render(&mut self, view: &wgpu::TextureView) {
        let mut encoder = self.begin_frame();
        self.render_to_view(&mut encoder, view);
        self.context.queue.submit(std::iter::once(encoder.finish()));
        self.finish_frame();
    }

    // ── Instances ─────────────────────────────────────────────────────────────

    /// Adds one randomly placed instance.  `false` at capacity.
    pub fn add_instance(&mut self) -> bool {
        let added = self.store.add_instance();
        if !added {
            log::debug!("instance store full ({MAX_INSTANCES})");
        }
        added
    }

    /// Removes the newest instance.  `false` when none are active.
    pub fn remove_instance(&mut self) -> bool {
        self.store.remove_instance()
    }

    #[inline]
    pub fn store(&self) -> &InstanceStore {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut InstanceStore {
        &mut self.store
    }

    /// The packet the passes drew from last frame.
    #[inline]
    pub fn frame_packet(&self) -> &FramePacket {
        &self.packet
    }

    pub fn toggle_rotation(&mut self) -> bool {
        self.rotate = !self.rotate;
        self.rotate
    }

    // ── Lighting ──────────────────────────────────────────────────────────────

    /// Turns on one more point light.  `false` when all [`MAX_LIGHTS`] are on.
    pub fn add_light(&mut self) -> bool {
        let added = self.lighting.add_light();
        if added {
            log::debug!("lights: {}", self.lighting.count());
        } else {
            log::debug!("all {MAX_LIGHTS} lights already on");
        }
        added
    }

    /// Turns off the newest light.  `false` when none are on.
    pub fn remove_light(&mut self) -> bool {
        let removed = self.lighting.remove_light();
        if removed {
            log::debug!("lights: {}", self.lighting.count());
        }
        removed
    }

    pub fn toggle_show_normals(&mut self) -> bool {
        self.lighting.show_normals = !self.lighting.show_normals;
        self.lighting.show_normals
    }

    // ── Culling ───────────────────────────────────────────────────────────────

    #[inline]
    pub fn cull_mode(&self) -> CullMode {
        self.mode
    }

    /// Switches culler.  Entering GPU mode reseeds the indirect arguments.
    pub fn set_cull_mode(&mut self, mode: CullMode) {
        if mode == self.mode {
            return;
        }
        if mode == CullMode::Gpu {
            self.gpu.on_activate(&self.context.queue);
        }
        log::info!("cull mode: {} -> {}", self.mode, mode);
        self.mode = mode;
        self.cpu_visible = None;
    }

    pub fn cycle_cull_mode(&mut self) -> CullMode {
        self.set_cull_mode(self.mode.next());
        self.mode
    }

    /// The GPU culler, for inspecting its query ring.
    #[inline]
    pub fn gpu_culler(&self) -> &GpuCuller {
        &self.gpu
    }

    pub fn stats(&self) -> CullStats {
        let ring = self.gpu.ring();
        CullStats {
            mode: self.mode,
            active: self.store.active_count(),
            cpu_visible: self.cpu_visible,
            gpu_visible: ring.gpu_visible_instances(),
            last_completed_frame: ring.last_completed_frame(),
            frame: self.frame,
        }
    }

    // ── Resize ────────────────────────────────────────────────────────────────

    /// Rebuilds the depth target and the projection aspect.  Zero-sized
    /// requests (minimised window) are ignored.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width == 0 || new_height == 0 {
            return;
        }
        if new_width == self.width && new_height == self.height {
            return;
        }
        self.depth.resize(&self.context.device, new_width, new_height);
        self.camera.set_viewport(new_width, new_height);
        self.width = new_width;
        self.height = new_height;

        for pass in &mut self.passes {
            pass.on_resize(&self.context.device, &self.context.queue, new_width, new_height);
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Applies keyboard/mouse input to the orbit camera.  `dt` is seconds elapsed.
    pub fn handle_input(&mut self, input: &mut InputState, dt: f32) {
        self.orbit.update(&mut self.camera, input, dt, self.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_starts_in_gpu_mode() {
        let config = RendererConfig::default();
        assert_eq!(config.cull_mode, CullMode::Gpu);
        assert!(config.rotate);
        assert!(config.normal_maps);
        assert!(!config.show_normals);
    }
}

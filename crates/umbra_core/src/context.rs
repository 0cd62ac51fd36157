use std::sync::Arc;

use anyhow::Context as _;
use thiserror::Error;

/// Container for the main wgpu objects shared across the engine.
///
/// `Instance` and `Adapter` are not `Arc` because they rarely cross threads,
/// while `Device` and `Queue` are cloned into long-lived GPU resources.
pub struct EngineContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("no suitable graphics adapter was found")]
    AdapterUnavailable,
    #[error("device request failed: {0}")]
    DeviceRequest(String),
    #[error("adapter `{adapter}` lacks required capability: {missing:?}")]
    MissingCapability {
        adapter: String,
        missing: wgpu::DownlevelFlags,
    },
}

impl EngineContext {
    /// Downlevel capabilities the culling pipeline cannot run without:
    /// compute dispatch, indirect draws and storage buffers read from the
    /// vertex stage.
    pub const REQUIRED_DOWNLEVEL: wgpu::DownlevelFlags = wgpu::DownlevelFlags::COMPUTE_SHADERS
        .union(wgpu::DownlevelFlags::INDIRECT_EXECUTION)
        .union(wgpu::DownlevelFlags::VERTEX_STORAGE);

    /// Creates a headless `EngineContext` (no surface), used by tests and
    /// pure render-to-texture contexts.
    pub async fn new() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        Self::new_with_instance(instance, None).await
    }

    /// Creates an `EngineContext` from an existing `Instance`, optionally
    /// tied to a `Surface` so the chosen adapter can present to the window.
    pub async fn new_with_instance(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .context(ContextError::AdapterUnavailable)?;

        let info = adapter.get_info();
        log::info!("selected adapter: {} ({:?})", info.name, info.backend);

        let missing = Self::REQUIRED_DOWNLEVEL - adapter.get_downlevel_capabilities().flags;
        if !missing.is_empty() {
            return Err(ContextError::MissingCapability {
                adapter: info.name,
                missing,
            }
            .into());
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Umbra Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| ContextError::DeviceRequest(e.to_string()))?;

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }
}

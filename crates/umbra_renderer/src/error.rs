use thiserror::Error;

/// Failures surfaced by the renderer.  Everything except `Surface` happens
/// during setup and is fatal.  Adapter and device failures are reported by
/// `umbra_core::context::ContextError` before a renderer exists.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("no shader named `{0}`")]
    UnknownShader(String),
    #[error("shader `{name}` failed to compile: {message}")]
    Shader { name: String, message: String },
    #[error("{what} failed validation: {message}")]
    Validation { what: String, message: String },
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Runs `create` inside a validation error scope and turns a captured error
/// into [`RendererError::Validation`].  Blocks until the device answers, so
/// it belongs in setup code only.
pub(crate) fn validated<T>(
    device: &wgpu::Device,
    what: &str,
    create: impl FnOnce() -> T,
) -> Result<T, RendererError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(value),
        Some(err) => Err(RendererError::Validation {
            what: what.to_owned(),
            message: err.to_string(),
        }),
    }
}

/// Re-exports the shared GPU context supplied by `umbra_core` and adds a
/// small helper so the rest of the renderer can reference device/queue without
/// repeating `context.device` / `context.queue` everywhere.
///
/// Adapter and surface setup live in `umbra_app` and `umbra_core`.  The
/// renderer only receives an already-initialised `EngineContext`.
pub use umbra_core::context::{ContextError, EngineContext};

use wgpu::{Device, Queue};

/// Borrows the wgpu `Device` from an `EngineContext`.
#[inline]
pub fn device(ctx: &EngineContext) -> &Device {
    &ctx.device
}

/// Borrows the wgpu `Queue` from an `EngineContext`.
#[inline]
pub fn queue(ctx: &EngineContext) -> &Queue {
    &ctx.queue
}

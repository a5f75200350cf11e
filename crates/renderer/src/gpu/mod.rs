//! GPU plumbing for the editor window.
//!
//! - `context` owns the wgpu instance, surface and device, and reconfigures
//!   the swapchain when the window resizes.
//! - `programs` turns editor shader sources into render pipelines and hands
//!   out engine-side [`engine::ProgramHandle`]s for them.
//! - `frame` draws the primary program offscreen and the post program onto
//!   the surface.
//! - `uniforms` mirrors the prelude's uniform block.

mod context;
mod frame;
mod programs;
mod uniforms;

pub(crate) use context::GpuContext;
pub(crate) use frame::FrameRenderer;
pub use programs::WgpuPrograms;

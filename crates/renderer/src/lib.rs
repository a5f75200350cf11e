//! Window, GPU and keyboard collaborators for the live shader editor.
//!
//! ```text
//!   leviathan CLI
//!          │ RendererConfig + AudioTrack
//!          ▼
//!   renderer::run ──▶ EditorWindow ──▶ winit event loop ──▶ RedrawRequested
//!                                                                │
//!       LiveKeyboard ─▶ EngineContext::begin_frame ◀─────────────┘
//!                              │
//!                              ▼
//!       FrameRenderer: primary program ─▶ scene texture ─▶ post program ─▶ surface
//!                              │
//!                              ▼
//!                  EngineContext::end_frame ─▶ StatusLine
//! ```
//!
//! [`WgpuPrograms`] is the engine's program compiler: editor GLSL is wrapped
//! with a small prelude (`iResolution`, `iTime`, `iSample`, and `iScene` for
//! the post-process program) and compiled through wgpu's GLSL frontend.

mod compile;
mod gpu;
mod keyboard;
mod status;
mod types;
mod window;

use anyhow::Result;
use engine::AudioTrack;

pub use gpu::WgpuPrograms;
pub use keyboard::{editor_key, LiveKeyboard};
pub use status::{OverlayVisibility, StatusLine};
pub use types::RendererConfig;

/// Runs the editor until its window closes.
pub fn run<A: AudioTrack>(config: RendererConfig, audio: A) -> Result<()> {
    tracing::info!(
        primary = %config.engine.shaders.primary.display(),
        post = %config.engine.shaders.post.display(),
        width = config.surface_size.0,
        height = config.surface_size.1,
        "starting editor"
    );
    window::run_window(config, audio)
}

//! Frame-stepped core of the live shader editor.
//!
//! One call to [`EngineContext::begin_frame`] and one to
//! [`EngineContext::end_frame`] bracket every rendered frame:
//!
//! ```text
//!   InputSource ─▶ InputEventMapper ─▶ TransportController ─▶ AudioTrack
//!                          │
//!                          └─▶ ShaderReloadPipeline ─▶ ProgramCompiler
//!                                      │
//!                         (caller renders with the active programs)
//!                                      │
//!                                      ▼
//!                              FrameStatsRecorder ─▶ StatusReport
//! ```
//!
//! Everything runs on the render thread. The GPU compiler, the audio track
//! and the input source are collaborators supplied through traits so the
//! same engine drives the wgpu window and the tests.

mod compiler;
mod config;
mod context;
mod input;
mod reload;
mod stats;
mod track;
mod transport;

pub use compiler::{
    Diagnostic, ProgramCompiler, ProgramError, ProgramHandle, ProgramStage, ShaderSource,
    SlotRole, DIAGNOSTIC_LIMIT,
};
pub use config::{
    ConfigError, DisplayConfig, EngineConfig, ReloadConfig, ShaderConfig, TrackConfig,
    MAX_RELOAD_INTERVAL,
};
pub use context::{EngineContext, FrameStart};
pub use input::{
    EditorKey, FrameCommands, InputEventMapper, InputSource, KeySnapshot, ScriptedInput,
    UiToggles,
};
pub use reload::{
    read_source, ProgramSlot, ReloadError, ReloadReport, ShaderPaths, ShaderReloadPipeline,
    SlotOutcome, DEFAULT_RELOAD_INTERVAL,
};
pub use stats::{FrameStatsRecorder, StatusReport, FRAME_WINDOW};
pub use track::{probe_wav_length, ClockTrack, TrackError};
pub use transport::{
    AudioTrack, PlayState, TransportCommands, TransportController, TransportState,
    FINE_SEEK_STEP, SEEK_STEP,
};

use std::time::Instant;

use crate::compiler::ProgramCompiler;
use crate::config::EngineConfig;
use crate::input::{FrameCommands, InputEventMapper, InputSource};
use crate::reload::{ReloadError, ReloadReport, ShaderReloadPipeline};
use crate::stats::{FrameStatsRecorder, StatusReport};
use crate::transport::{AudioTrack, TransportController};

/// What the first half of a frame produced.
#[derive(Debug)]
pub struct FrameStart {
    pub commands: FrameCommands,
    pub reload: ReloadReport,
}

/// Owns every per-frame component and runs them in a fixed order:
/// input, transport, reload, then (after the caller has rendered) stats.
pub struct EngineContext<C, A> {
    config: EngineConfig,
    mapper: InputEventMapper,
    transport: TransportController<A>,
    reload: ShaderReloadPipeline<C>,
    stats: FrameStatsRecorder,
}

impl<C: ProgramCompiler, A: AudioTrack> EngineContext<C, A> {
    /// Compiles the startup programs and starts the track.
    pub fn bootstrap(
        compiler: C,
        mut audio: A,
        config: EngineConfig,
        now: Instant,
    ) -> Result<Self, ReloadError> {
        let reload = ShaderReloadPipeline::bootstrap(compiler, &config.shader_paths(), now)?;
        audio.play();
        let mut transport = TransportController::new(audio);
        transport.sync();
        tracing::info!(
            track_end = transport.track_end(),
            reload_interval_ms = config.reload.interval.as_millis() as u64,
            "engine ready"
        );
        Ok(Self {
            config,
            mapper: InputEventMapper::new(),
            transport,
            reload,
            stats: FrameStatsRecorder::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transport(&self) -> &TransportController<A> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut TransportController<A> {
        &mut self.transport
    }

    pub fn reload(&self) -> &ShaderReloadPipeline<C> {
        &self.reload
    }

    pub fn reload_mut(&mut self) -> &mut ShaderReloadPipeline<C> {
        &mut self.reload
    }

    pub fn stats(&self) -> &FrameStatsRecorder {
        &self.stats
    }

    /// Polls input, applies transport commands, refreshes the clock and
    /// processes any due shader reload. Call once per frame before rendering.
    pub fn begin_frame(&mut self, input: &mut dyn InputSource, now: Instant) -> FrameStart {
        let commands = self.mapper.poll(input);
        self.transport.apply(&commands.transport);
        self.transport.sync();
        if commands.reload {
            self.reload.request_reload();
        }
        let reload = self.reload.process(now, self.config.reload.interval);
        FrameStart { commands, reload }
    }

    /// Records the finished frame and reports the transport status.
    pub fn end_frame(&mut self, frame_ms: u32) -> StatusReport {
        self.stats.record_frame(frame_ms);
        self.stats.report(
            self.transport.play_state(),
            self.transport.position(),
            self.transport.track_end(),
            frame_ms,
        )
    }

    /// Releases the programs and hands back both collaborators.
    pub fn shutdown(self) -> (C, A) {
        let compiler = self.reload.shutdown();
        (compiler, self.transport.into_audio())
    }
}

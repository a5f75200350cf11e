//! Live reload of the two fragment programs.
//!
//! Each [`ProgramSlot`] always holds a fully linked program. A reload only
//! replaces it once the compiler reports success; any failure along the way
//! (missing file, bad encoding, compile or link error) is logged and the slot
//! keeps rendering with what it had. Reload attempts are debounced per slot so
//! an editor that is still writing the file is less likely to be read halfway.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::compiler::{ProgramCompiler, ProgramError, ProgramHandle, ShaderSource, SlotRole};

/// Default debounce between two reload attempts of the same slot.
pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("failed to read shader at {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("shader at {} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },
    #[error("{role} shader at {} did not build: {error}", path.display())]
    Program {
        path: PathBuf,
        role: SlotRole,
        #[source]
        error: ProgramError,
    },
}

/// File locations of the two programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    pub primary: PathBuf,
    pub post: PathBuf,
}

impl ShaderPaths {
    pub fn new(primary: impl Into<PathBuf>, post: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            post: post.into(),
        }
    }

    pub fn get(&self, role: SlotRole) -> &Path {
        match role {
            SlotRole::Primary => &self.primary,
            SlotRole::PostProcess => &self.post,
        }
    }
}

#[derive(Debug)]
pub struct ProgramSlot {
    role: SlotRole,
    source_path: PathBuf,
    active: ProgramHandle,
    pending_reload: bool,
    last_processed_at: Instant,
}

impl ProgramSlot {
    pub fn role(&self) -> SlotRole {
        self.role
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn active(&self) -> ProgramHandle {
        self.active
    }

    pub fn pending_reload(&self) -> bool {
        self.pending_reload
    }

    pub fn last_processed_at(&self) -> Instant {
        self.last_processed_at
    }

    fn due(&self, now: Instant, min_interval: Duration) -> bool {
        self.pending_reload
            && now.saturating_duration_since(self.last_processed_at) >= min_interval
    }
}

/// Result of one reload attempt on one slot.
#[derive(Debug)]
pub enum SlotOutcome {
    Swapped {
        previous: ProgramHandle,
        current: ProgramHandle,
    },
    Failed(ReloadError),
}

/// Per-slot outcomes of a [`ShaderReloadPipeline::process`] call. `None`
/// means the slot was not due this frame.
#[derive(Debug, Default)]
pub struct ReloadReport {
    outcomes: [Option<SlotOutcome>; 2],
}

impl ReloadReport {
    pub fn outcome(&self, role: SlotRole) -> Option<&SlotOutcome> {
        self.outcomes[role.index()].as_ref()
    }

    pub fn attempted(&self) -> bool {
        self.outcomes.iter().any(Option::is_some)
    }

    pub fn swapped(&self, role: SlotRole) -> bool {
        matches!(self.outcome(role), Some(SlotOutcome::Swapped { .. }))
    }
}

pub struct ShaderReloadPipeline<C> {
    compiler: C,
    slots: [ProgramSlot; 2],
}

impl<C: ProgramCompiler> ShaderReloadPipeline<C> {
    /// Performs the mandatory startup compile of both slots.
    ///
    /// There is no previous program to fall back on here, so any failure is
    /// returned to the caller, which is expected to give up.
    pub fn bootstrap(
        mut compiler: C,
        paths: &ShaderPaths,
        now: Instant,
    ) -> Result<Self, ReloadError> {
        let primary = compile_and_link_or_abort(&mut compiler, SlotRole::Primary, paths)?;
        let post = match compile_and_link_or_abort(&mut compiler, SlotRole::PostProcess, paths) {
            Ok(handle) => handle,
            Err(err) => {
                compiler.destroy_program(primary);
                return Err(err);
            }
        };

        let slot = |role: SlotRole, active: ProgramHandle| ProgramSlot {
            role,
            source_path: paths.get(role).to_path_buf(),
            active,
            pending_reload: false,
            last_processed_at: now,
        };

        tracing::info!(
            primary = %paths.primary.display(),
            post = %paths.post.display(),
            "startup shaders compiled"
        );

        Ok(Self {
            compiler,
            slots: [slot(SlotRole::Primary, primary), slot(SlotRole::PostProcess, post)],
        })
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn slot(&self, role: SlotRole) -> &ProgramSlot {
        &self.slots[role.index()]
    }

    pub fn active(&self, role: SlotRole) -> ProgramHandle {
        self.slot(role).active
    }

    pub fn pending(&self) -> bool {
        self.slots.iter().any(|slot| slot.pending_reload)
    }

    /// Marks both slots for reload.
    pub fn request_reload(&mut self) {
        for slot in &mut self.slots {
            slot.pending_reload = true;
        }
    }

    /// Attempts every slot that is pending and whose debounce window elapsed.
    ///
    /// Attempted slots clear their pending flag whatever the outcome, so a
    /// failed build waits for the next explicit request.
    pub fn process(&mut self, now: Instant, min_interval: Duration) -> ReloadReport {
        let mut report = ReloadReport::default();
        for role in SlotRole::ALL {
            let index = role.index();
            if !self.slots[index].due(now, min_interval) {
                continue;
            }

            let outcome = self.reload_slot(role);
            let slot = &mut self.slots[index];
            slot.pending_reload = false;
            slot.last_processed_at = now;
            report.outcomes[index] = Some(outcome);
        }
        report
    }

    fn reload_slot(&mut self, role: SlotRole) -> SlotOutcome {
        let path = self.slots[role.index()].source_path.clone();
        tracing::info!(slot = %role, path = %path.display(), "refreshing shader");

        let result = read_source(&path).and_then(|source| {
            self.compile_and_link(role, &source)
                .map_err(|error| ReloadError::Program {
                    path: path.clone(),
                    role,
                    error,
                })
        });

        match result {
            Ok(current) => {
                let slot = &mut self.slots[role.index()];
                let previous = std::mem::replace(&mut slot.active, current);
                self.compiler.destroy_program(previous);
                tracing::info!(
                    slot = %role,
                    %previous,
                    %current,
                    "loaded shader from \"{}\"",
                    path.display()
                );
                SlotOutcome::Swapped { previous, current }
            }
            Err(err) => {
                match &err {
                    ReloadError::Program { error, .. } => tracing::error!(
                        slot = %role,
                        stage = %error.stage,
                        "errors in {}:\n\n{}",
                        path.display(),
                        error.diagnostic
                    ),
                    other => tracing::error!(slot = %role, "{other}; shader not reloaded"),
                }
                SlotOutcome::Failed(err)
            }
        }
    }

    /// Builds a program through the compiler collaborator without touching
    /// any slot.
    pub fn compile_and_link(
        &mut self,
        role: SlotRole,
        source: &ShaderSource,
    ) -> Result<ProgramHandle, ProgramError> {
        self.compiler.create_program(role, source)
    }

    /// Releases both active programs and returns the compiler.
    pub fn shutdown(mut self) -> C {
        for slot in &self.slots {
            self.compiler.destroy_program(slot.active);
        }
        tracing::debug!("released shader programs");
        self.compiler
    }
}

/// Startup variant of `compile_and_link`: the error is fatal to the caller.
fn compile_and_link_or_abort<C: ProgramCompiler>(
    compiler: &mut C,
    role: SlotRole,
    paths: &ShaderPaths,
) -> Result<ProgramHandle, ReloadError> {
    let path = paths.get(role);
    let source = read_source(path)?;
    compiler
        .create_program(role, &source)
        .map_err(|error| ReloadError::Program {
            path: path.to_path_buf(),
            role,
            error,
        })
}

/// Reads the whole file as bytes; the text must be UTF-8 up to the first NUL.
pub fn read_source(path: &Path) -> Result<ShaderSource, ReloadError> {
    let bytes = fs::read(path).map_err(|source| ReloadError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let source = ShaderSource::from_bytes(bytes);
    if source.text().is_none() {
        return Err(ReloadError::Encoding {
            path: path.to_path_buf(),
        });
    }
    Ok(source)
}

//! Interface to the GPU program compiler and the values that cross it.

use std::fmt;

/// Upper bound on the diagnostic text kept from a failed compile.
pub const DIAGNOSTIC_LIMIT: usize = 4095;

/// The two independently reloadable program roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRole {
    Primary,
    PostProcess,
}

impl SlotRole {
    pub const ALL: [SlotRole; 2] = [SlotRole::Primary, SlotRole::PostProcess];

    pub(crate) fn index(self) -> usize {
        match self {
            SlotRole::Primary => 0,
            SlotRole::PostProcess => 1,
        }
    }
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRole::Primary => f.write_str("primary"),
            SlotRole::PostProcess => f.write_str("post"),
        }
    }
}

/// Opaque identifier for a program owned by a [`ProgramCompiler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(u32);

impl ProgramHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProgramHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shader source read from disk, kept NUL-terminated like the buffer handed
/// to a C-style compiler entry point.
#[derive(Clone, PartialEq, Eq)]
pub struct ShaderSource {
    bytes: Vec<u8>,
}

impl ShaderSource {
    pub fn from_bytes(mut bytes: Vec<u8>) -> Self {
        bytes.push(0);
        Self { bytes }
    }

    /// Raw buffer including the trailing NUL.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes
    }

    /// Source text up to the first NUL, or `None` when it is not UTF-8.
    pub fn text(&self) -> Option<&str> {
        let end = self
            .bytes
            .iter()
            .position(|&byte| byte == 0)
            .unwrap_or(self.bytes.len());
        std::str::from_utf8(&self.bytes[..end]).ok()
    }
}

impl From<&str> for ShaderSource {
    fn from(value: &str) -> Self {
        Self::from_bytes(value.as_bytes().to_vec())
    }
}

impl fmt::Debug for ShaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderSource")
            .field("len", &(self.bytes.len() - 1))
            .finish()
    }
}

/// Compiler output attached to a failed program build, truncated to
/// [`DIAGNOSTIC_LIMIT`] bytes on a character boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic(String);

impl Diagnostic {
    pub fn new(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if text.len() > DIAGNOSTIC_LIMIT {
            let mut end = DIAGNOSTIC_LIMIT;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramStage {
    Compile,
    Link,
}

impl fmt::Display for ProgramStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramStage::Compile => f.write_str("compile"),
            ProgramStage::Link => f.write_str("link"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} failed:\n{diagnostic}")]
pub struct ProgramError {
    pub stage: ProgramStage,
    pub diagnostic: Diagnostic,
}

impl ProgramError {
    pub fn compile(diagnostic: impl Into<String>) -> Self {
        Self {
            stage: ProgramStage::Compile,
            diagnostic: Diagnostic::new(diagnostic),
        }
    }

    pub fn link(diagnostic: impl Into<String>) -> Self {
        Self {
            stage: ProgramStage::Link,
            diagnostic: Diagnostic::new(diagnostic),
        }
    }
}

/// GPU-side collaborator that turns fragment source into usable programs.
///
/// Implementations must only hand out a handle once the program is fully
/// compiled and linked; a failed build must not leave anything behind that
/// the caller would need to release.
pub trait ProgramCompiler {
    fn create_program(
        &mut self,
        role: SlotRole,
        source: &ShaderSource,
    ) -> Result<ProgramHandle, ProgramError>;

    fn destroy_program(&mut self, handle: ProgramHandle);
}

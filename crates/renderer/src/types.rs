use engine::EngineConfig;

/// Everything the editor window needs besides the audio track.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Initial inner size of the window in physical pixels.
    pub surface_size: (u32, u32),
    pub vsync: bool,
    pub title: String,
    pub engine: EngineConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            vsync: true,
            title: "Leviathan".to_string(),
            engine: EngineConfig::default(),
        }
    }
}

use bytemuck::{Pod, Zeroable};

/// Sample rate the `iSample` counter advances at.
pub(crate) const SAMPLE_RATE: f64 = 44_100.0;

/// Mirrors the `FrameParams` block injected into every fragment program.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FrameUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub sample: i32,
}

unsafe impl Zeroable for FrameUniforms {}
unsafe impl Pod for FrameUniforms {}

impl FrameUniforms {
    pub fn new(width: u32, height: u32, time: f64) -> Self {
        let time = time.max(0.0);
        Self {
            resolution: [width as f32, height as f32],
            time: time as f32,
            sample: (time * SAMPLE_RATE) as i32,
        }
    }
}

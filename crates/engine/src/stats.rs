use std::fmt;

use serde::Serialize;

use crate::transport::PlayState;

/// Number of recent frame durations averaged by [`FrameStatsRecorder::rolling_fps`].
pub const FRAME_WINDOW: usize = 10;

/// Fixed-size ring of recent frame durations in milliseconds.
#[derive(Debug, Clone)]
pub struct FrameStatsRecorder {
    samples: [u32; FRAME_WINDOW],
    cursor: usize,
    last: u32,
}

impl Default for FrameStatsRecorder {
    fn default() -> Self {
        Self {
            samples: [0; FRAME_WINDOW],
            cursor: 0,
            last: 0,
        }
    }
}

impl FrameStatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a completed frame duration, overwriting the oldest sample.
    pub fn record_frame(&mut self, duration_ms: u32) {
        self.samples[self.cursor] = duration_ms;
        self.cursor = (self.cursor + 1) % FRAME_WINDOW;
        self.last = duration_ms;
    }

    pub fn last_frame_ms(&self) -> u32 {
        self.last
    }

    /// Average of `1000 / d` over the window.
    ///
    /// Zero-length samples count as zero FPS rather than being skipped, so the
    /// sum is always divided by [`FRAME_WINDOW`]. A fresh recorder reports 0.
    pub fn rolling_fps(&self) -> f64 {
        let total: f64 = self
            .samples
            .iter()
            .filter(|&&duration| duration > 0)
            .map(|&duration| 1000.0 / f64::from(duration))
            .sum();
        total / FRAME_WINDOW as f64
    }

    pub fn report(
        &self,
        state: PlayState,
        position: f64,
        track_end: f64,
        last_frame_ms: u32,
    ) -> StatusReport {
        let position = if position.is_finite() { position.max(0.0) } else { 0.0 };
        let whole_seconds = position as u64;
        let percent = if track_end > 0.0 {
            (100.0 * position / track_end) as u32
        } else {
            0
        };
        StatusReport {
            play_state: state,
            minutes: whole_seconds / 60,
            seconds: whole_seconds % 60,
            percent,
            frame_ms: last_frame_ms,
            fps: self.rolling_fps(),
        }
    }
}

/// Snapshot handed to whatever displays transport and timing information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub play_state: PlayState,
    pub minutes: u64,
    pub seconds: u64,
    pub percent: u32,
    pub frame_ms: u32,
    pub fps: f64,
}

impl StatusReport {
    /// `mm:ss (p%)` portion of the status line.
    pub fn timecode(&self) -> String {
        format!("{:02}:{:02} ({}%)", self.minutes, self.seconds, self.percent)
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>7}: {}, frame duration: {} ms (running fps average: {:.2})",
            self.play_state.label(),
            self.timecode(),
            self.frame_ms,
            self.fps
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_reports_zero_fps() {
        let stats = FrameStatsRecorder::new();
        assert_eq!(stats.rolling_fps(), 0.0);
    }

    #[test]
    fn partial_window_divides_by_full_size() {
        let mut stats = FrameStatsRecorder::new();
        stats.record_frame(10);
        // one 100 fps sample spread over a window of ten
        assert!((stats.rolling_fps() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn full_window_averages_samples() {
        let mut stats = FrameStatsRecorder::new();
        for _ in 0..FRAME_WINDOW {
            stats.record_frame(20);
        }
        assert!((stats.rolling_fps() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn oldest_sample_is_overwritten() {
        let mut stats = FrameStatsRecorder::new();
        for _ in 0..FRAME_WINDOW {
            stats.record_frame(0);
        }
        stats.record_frame(10);
        assert_eq!(stats.last_frame_ms(), 10);
        assert!((stats.rolling_fps() - 10.0).abs() < 1e-9);

        for _ in 0..FRAME_WINDOW {
            stats.record_frame(0);
        }
        assert_eq!(stats.rolling_fps(), 0.0);
    }

    #[test]
    fn report_formats_timecode_and_percent() {
        let stats = FrameStatsRecorder::new();
        let report = stats.report(PlayState::Playing, 65.3, 180.0, 16);
        assert_eq!(report.minutes, 1);
        assert_eq!(report.seconds, 5);
        assert_eq!(report.percent, 36);
        assert_eq!(report.timecode(), "01:05 (36%)");
        assert!(report.to_string().contains("01:05 (36%)"));
        assert!(report.to_string().starts_with("Playing"));
    }

    #[test]
    fn report_handles_zero_length_track() {
        let stats = FrameStatsRecorder::new();
        let report = stats.report(PlayState::Paused, 0.0, 0.0, 0);
        assert_eq!(report.percent, 0);
        assert_eq!(report.to_string().trim_start().split(':').next(), Some("Paused"));
    }
}

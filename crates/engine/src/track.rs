//! Silent stand-in for the audio collaborator.
//!
//! `ClockTrack` keeps a timeline that advances with the monotonic clock while
//! playing, so the transport and the shaders can be exercised without an
//! audio device. The track length can come from a WAV header.

use std::path::Path;
use std::time::Instant;

use crate::transport::AudioTrack;

#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("failed to read WAV header from {path}: {source}")]
    Wav {
        path: String,
        #[source]
        source: hound::Error,
    },
}

/// Length in seconds of the WAV file at `path`.
pub fn probe_wav_length(path: &Path) -> Result<f64, TrackError> {
    let reader = hound::WavReader::open(path).map_err(|source| TrackError::Wav {
        path: path.display().to_string(),
        source,
    })?;
    let spec = reader.spec();
    let frames = f64::from(reader.duration());
    Ok(frames / f64::from(spec.sample_rate.max(1)))
}

#[derive(Debug, Clone)]
pub struct ClockTrack {
    length: f64,
    offset: f64,
    started: Option<Instant>,
}

impl ClockTrack {
    /// Creates a paused track of `length` seconds positioned at zero.
    pub fn new(length: f64) -> Self {
        Self {
            length: if length.is_finite() { length.max(0.0) } else { 0.0 },
            offset: 0.0,
            started: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.started.is_some()
    }

    fn time_at(&self, now: Instant) -> f64 {
        let elapsed = self
            .started
            .map(|start| now.saturating_duration_since(start).as_secs_f64())
            .unwrap_or(0.0);
        (self.offset + elapsed).min(self.length)
    }
}

impl AudioTrack for ClockTrack {
    fn play(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        if self.started.is_some() {
            self.offset = self.time_at(Instant::now());
            self.started = None;
        }
    }

    fn seek(&mut self, seconds: f64) {
        self.offset = seconds.clamp(0.0, self.length);
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    fn time(&self) -> f64 {
        self.time_at(Instant::now())
    }

    fn length(&self) -> f64 {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn paused_track_holds_position() {
        let mut track = ClockTrack::new(30.0);
        assert!(!track.is_playing());
        track.seek(12.0);
        assert_eq!(track.time(), 12.0);
        track.seek(99.0);
        assert_eq!(track.time(), 30.0);
    }

    #[test]
    fn playing_track_never_runs_backwards() {
        let mut track = ClockTrack::new(30.0);
        track.seek(5.0);
        track.play();
        let first = track.time();
        let second = track.time();
        assert!(first >= 5.0);
        assert!(second >= first);
        track.pause();
        let paused = track.time();
        assert!(paused >= second);
        assert_eq!(track.time(), paused);
    }

    #[test]
    fn probes_wav_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..8000 * 2 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let length = probe_wav_length(&path).unwrap();
        assert!((length - 1.0).abs() < 1e-9);
    }

    #[test]
    fn probe_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(probe_wav_length(&dir.path().join("missing.wav")).is_err());
    }
}

//! Play/pause/seek state machine driving the audio timeline.
//!
//! The controller owns the audio collaborator and mirrors its clock once per
//! frame. All positions are kept inside `[0, track_end]`; out-of-range seeks
//! are clamped rather than rejected.

use serde::{Deserialize, Serialize};

/// Base seek step in seconds.
pub const SEEK_STEP: f64 = 1.0;
/// Seek step used while the secondary modifier is held.
pub const FINE_SEEK_STEP: f64 = 0.1;

/// Playback collaborator driven by the transport.
///
/// Implementations are expected to serialise these calls themselves if their
/// sample generation runs on another thread.
pub trait AudioTrack {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    /// Current playback position in seconds.
    fn time(&self) -> f64;
    /// Track length in seconds.
    fn length(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayState {
    Playing,
    Paused,
}

impl PlayState {
    pub fn label(self) -> &'static str {
        match self {
            PlayState::Playing => "Playing",
            PlayState::Paused => "Paused",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportState {
    pub play_state: PlayState,
    pub position: f64,
    pub track_end: f64,
}

/// Transport commands derived from one input poll.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransportCommands {
    /// Requested play state, resolved before any seek.
    pub play_state: Option<PlayState>,
    /// Net seek delta in seconds; `None` when the held keys cancel out.
    pub seek_delta: Option<f64>,
}

pub struct TransportController<A> {
    audio: A,
    state: TransportState,
}

impl<A: AudioTrack> TransportController<A> {
    /// Wraps the audio collaborator. The timeline starts at zero in the
    /// `Playing` state; starting the collaborator itself is left to the caller.
    pub fn new(audio: A) -> Self {
        let track_end = sanitize_length(audio.length());
        Self {
            audio,
            state: TransportState {
                play_state: PlayState::Playing,
                position: 0.0,
                track_end,
            },
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn play_state(&self) -> PlayState {
        self.state.play_state
    }

    pub fn position(&self) -> f64 {
        self.state.position
    }

    pub fn track_end(&self) -> f64 {
        self.state.track_end
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn into_audio(self) -> A {
        self.audio
    }

    pub fn play(&mut self) {
        if self.state.play_state == PlayState::Playing {
            return;
        }
        self.state.play_state = PlayState::Playing;
        self.audio.play();
        tracing::debug!(position = self.state.position, "transport playing");
    }

    pub fn pause(&mut self) {
        if self.state.play_state == PlayState::Paused {
            return;
        }
        self.state.play_state = PlayState::Paused;
        self.audio.pause();
        tracing::debug!(position = self.state.position, "transport paused");
    }

    /// Moves the timeline to `target` seconds, clamped to the track bounds.
    /// Returns the position actually forwarded to the audio collaborator.
    pub fn seek(&mut self, target: f64) -> f64 {
        let clamped = clamp_position(target, self.state.track_end);
        self.state.position = clamped;
        self.audio.seek(clamped);
        tracing::trace!(target, clamped, "transport seek");
        clamped
    }

    /// Seeks relative to the cached position.
    pub fn nudge(&mut self, delta: f64) -> f64 {
        self.seek(self.state.position + delta)
    }

    /// Seeks to a fraction of the track, as a seek bar would.
    pub fn seek_fraction(&mut self, fraction: f64) -> f64 {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        self.seek(fraction * self.state.track_end)
    }

    /// Refreshes the cached clock from values observed on the audio side.
    pub fn tick(&mut self, observed_position: f64, observed_track_end: f64) {
        self.state.track_end = sanitize_length(observed_track_end);
        self.state.position = clamp_position(observed_position, self.state.track_end);
    }

    /// Pulls the current clock straight from the audio collaborator.
    pub fn sync(&mut self) {
        let position = self.audio.time();
        let length = self.audio.length();
        self.tick(position, length);
    }

    /// Applies the commands of one input poll: play state first, then seek.
    pub fn apply(&mut self, commands: &TransportCommands) {
        match commands.play_state {
            Some(PlayState::Playing) => self.play(),
            Some(PlayState::Paused) => self.pause(),
            None => {}
        }
        if let Some(delta) = commands.seek_delta {
            if delta != 0.0 {
                self.nudge(delta);
            }
        }
    }
}

fn sanitize_length(length: f64) -> f64 {
    if length.is_finite() && length > 0.0 {
        length
    } else {
        0.0
    }
}

fn clamp_position(position: f64, track_end: f64) -> f64 {
    if position.is_nan() {
        0.0
    } else {
        position.clamp(0.0, track_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingTrack {
        time: f64,
        length: f64,
        plays: usize,
        pauses: usize,
        seeks: Vec<f64>,
    }

    impl AudioTrack for RecordingTrack {
        fn play(&mut self) {
            self.plays += 1;
        }

        fn pause(&mut self) {
            self.pauses += 1;
        }

        fn seek(&mut self, seconds: f64) {
            self.time = seconds;
            self.seeks.push(seconds);
        }

        fn time(&self) -> f64 {
            self.time
        }

        fn length(&self) -> f64 {
            self.length
        }
    }

    fn controller(length: f64) -> TransportController<RecordingTrack> {
        TransportController::new(RecordingTrack {
            length,
            ..Default::default()
        })
    }

    #[test]
    fn starts_at_zero_playing() {
        let transport = controller(180.0);
        assert_eq!(transport.play_state(), PlayState::Playing);
        assert_eq!(transport.position(), 0.0);
        assert_eq!(transport.track_end(), 180.0);
    }

    #[test]
    fn play_and_pause_are_idempotent() {
        let mut transport = controller(180.0);
        transport.play();
        assert_eq!(transport.audio().plays, 0);

        transport.pause();
        transport.pause();
        assert_eq!(transport.audio().pauses, 1);
        assert_eq!(transport.play_state(), PlayState::Paused);

        transport.play();
        transport.play();
        assert_eq!(transport.audio().plays, 1);
        assert_eq!(transport.play_state(), PlayState::Playing);
    }

    #[test]
    fn seek_clamps_to_track_bounds() {
        let mut transport = controller(180.0);
        assert_eq!(transport.seek(-3.0), 0.0);
        assert_eq!(transport.position(), 0.0);
        assert_eq!(transport.seek(500.0), 180.0);
        assert_eq!(transport.position(), 180.0);
        assert_eq!(transport.seek(f64::NAN), 0.0);
        assert_eq!(transport.audio().seeks, vec![0.0, 180.0, 0.0]);
    }

    #[test]
    fn tick_refreshes_clock_without_touching_play_state() {
        let mut transport = controller(180.0);
        transport.pause();
        transport.tick(42.5, 200.0);
        assert_eq!(transport.position(), 42.5);
        assert_eq!(transport.track_end(), 200.0);
        assert_eq!(transport.play_state(), PlayState::Paused);

        transport.tick(10.0, -1.0);
        assert_eq!(transport.track_end(), 0.0);
        assert_eq!(transport.position(), 0.0);
    }

    #[test]
    fn apply_resolves_play_state_before_seek() {
        let mut transport = controller(180.0);
        transport.tick(10.0, 180.0);
        transport.apply(&TransportCommands {
            play_state: Some(PlayState::Paused),
            seek_delta: Some(FINE_SEEK_STEP),
        });
        assert_eq!(transport.play_state(), PlayState::Paused);
        assert!((transport.position() - 10.1).abs() < 1e-9);
        assert_eq!(transport.audio().pauses, 1);
        assert_eq!(transport.audio().seeks.len(), 1);
    }

    #[test]
    fn zero_delta_issues_no_seek() {
        let mut transport = controller(180.0);
        transport.apply(&TransportCommands {
            play_state: None,
            seek_delta: Some(0.0),
        });
        transport.apply(&TransportCommands::default());
        assert!(transport.audio().seeks.is_empty());
    }

    #[test]
    fn seek_fraction_maps_onto_track() {
        let mut transport = controller(200.0);
        assert_eq!(transport.seek_fraction(0.25), 50.0);
        assert_eq!(transport.seek_fraction(4.0), 200.0);
        assert_eq!(transport.nudge(-10.0), 190.0);
    }
}

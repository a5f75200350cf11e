use std::io::{self, Write};

use engine::{StatusReport, UiToggles};

/// Which editor overlays are shown.
///
/// `stats` gates the terminal status line. `seek_bar` gates click-to-seek:
/// while it is shown, a left click anywhere in the window seeks to the
/// clicked fraction of the track width. `controls` has no rendition and is
/// pass-through only, kept so the F1 toggle state survives for a UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayVisibility {
    pub controls: bool,
    pub stats: bool,
    pub seek_bar: bool,
}

impl OverlayVisibility {
    pub fn new(stats: bool) -> Self {
        Self {
            controls: true,
            stats,
            seek_bar: true,
        }
    }

    pub fn apply(&mut self, toggles: UiToggles) {
        if !toggles.any() {
            return;
        }
        self.controls ^= toggles.controls;
        self.stats ^= toggles.stats;
        self.seek_bar ^= toggles.seek_bar;
        tracing::debug!(
            controls = self.controls,
            stats = self.stats,
            seek_bar = self.seek_bar,
            "overlay visibility changed"
        );
    }

    /// Track fraction for a click at `cursor_x` in a window `width` pixels
    /// wide, or `None` when the seek bar is hidden.
    pub fn seek_target(&self, cursor_x: f64, width: u32) -> Option<f64> {
        if !self.seek_bar || width == 0 || !cursor_x.is_finite() {
            return None;
        }
        Some((cursor_x / f64::from(width)).clamp(0.0, 1.0))
    }
}

/// Single terminal line rewritten in place every frame.
pub struct StatusLine<W: Write> {
    out: W,
    dirty: bool,
}

impl StatusLine<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StatusLine<W> {
    pub fn new(out: W) -> Self {
        Self { out, dirty: false }
    }

    pub fn show(&mut self, report: &StatusReport) -> io::Result<()> {
        write!(self.out, "\r{report}\x1b[K")?;
        self.dirty = true;
        self.out.flush()
    }

    /// Moves past the status line so later output starts on a fresh line.
    pub fn finish(&mut self) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{FrameStatsRecorder, PlayState};

    #[test]
    fn rewrites_line_in_place() {
        let mut stats = FrameStatsRecorder::new();
        stats.record_frame(16);
        let report = stats.report(PlayState::Paused, 65.3, 180.0, 16);

        let mut line = StatusLine::new(Vec::new());
        line.show(&report).unwrap();
        line.show(&report).unwrap();
        line.finish().unwrap();
        let text = String::from_utf8(line.into_inner()).unwrap();
        assert!(text.starts_with("\r"));
        assert_eq!(text.matches('\r').count(), 2);
        assert!(text.contains("01:05 (36%)"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn finish_without_output_writes_nothing() {
        let mut line = StatusLine::new(Vec::new());
        line.finish().unwrap();
        assert!(line.into_inner().is_empty());
    }

    #[test]
    fn toggles_flip_visibility() {
        let mut overlays = OverlayVisibility::new(true);
        overlays.apply(UiToggles {
            stats: true,
            seek_bar: true,
            ..UiToggles::default()
        });
        assert!(overlays.controls);
        assert!(!overlays.stats);
        assert!(!overlays.seek_bar);
    }

    #[test]
    fn clicks_seek_only_while_seek_bar_is_shown() {
        let mut overlays = OverlayVisibility::new(true);
        assert_eq!(overlays.seek_target(320.0, 1280), Some(0.25));
        assert_eq!(overlays.seek_target(-5.0, 1280), Some(0.0));
        assert_eq!(overlays.seek_target(2000.0, 1280), Some(1.0));
        assert_eq!(overlays.seek_target(10.0, 0), None);

        overlays.apply(UiToggles {
            seek_bar: true,
            ..UiToggles::default()
        });
        assert_eq!(overlays.seek_target(320.0, 1280), None);
    }
}

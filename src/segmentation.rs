//! Dribble cycle segmentation from the ball's vertical position.
//!
//! This module finds cycle boundaries by locating troughs (local minima of
//! the raw `ball_y` signal) and spacing-filtering them, then assigns a
//! `cycle_id` to every frame inside an accepted span.
//!
//! Design: trough candidates are strict local minima over the subsequence of
//! frames where the ball is visible; frames without a ball simply do not
//! contribute signal samples. A candidate closer than `min_cycle_duration`
//! positions to the previously accepted trough is rejected and the earlier
//! trough kept, which prevents bounce noise from splitting one dribble into
//! several cycles.
//!
//! Segmentation never consults contact labels, so it can run before or after
//! classification with identical results.

use tracing::{debug, warn};

use crate::types::LabeledFrame;

/// Configuration for cycle segmentation.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Minimum spacing between accepted troughs, in ball-signal samples.
    /// Prevents one dribble from splitting into multiple cycles. Typical: 10
    /// (a third of a second at 30fps).
    pub min_cycle_duration: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_cycle_duration: 10,
        }
    }
}

/// A half-open run of frame positions `[start, end)` forming one cycle.
///
/// Positions index into the labeled-frame slice the segmenter was given;
/// the closing trough frame opens the next cycle rather than belonging to
/// this one, so no frame falls into two spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSpan {
    /// Sequential id, zero-based, in temporal order.
    pub cycle_id: u32,
    /// Position of the opening trough frame (inclusive).
    pub start: usize,
    /// Position of the closing trough frame (exclusive).
    pub end: usize,
}

impl CycleSpan {
    /// Number of frames the span owns.
    pub fn frame_count(&self) -> usize {
        self.end - self.start
    }
}

/// Segments a labeled session into dribble cycles.
pub struct CycleSegmenter {
    config: SegmenterConfig,
}

impl CycleSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Finds cycle spans and assigns `cycle_id` onto the frames.
    ///
    /// Fewer than two accepted troughs means the session has no complete
    /// cycle; this returns an empty list rather than an error, and every
    /// frame keeps `cycle_id = None`.
    pub fn segment(&self, frames: &mut [LabeledFrame]) -> Vec<CycleSpan> {
        // Compact the signal to frames where the ball is visible, keeping a
        // map back to frame positions.
        let mut ball_y = Vec::with_capacity(frames.len());
        let mut positions = Vec::with_capacity(frames.len());
        for (pos, frame) in frames.iter().enumerate() {
            if let Some(ball) = frame.ball_center {
                ball_y.push(ball.y);
                positions.push(pos);
            }
        }

        if ball_y.len() < self.config.min_cycle_duration {
            warn!(
                ball_samples = ball_y.len(),
                needed = self.config.min_cycle_duration,
                "not enough ball samples for cycle detection"
            );
            return Vec::new();
        }

        let candidates = find_troughs(&ball_y);
        let accepted = self.filter_by_spacing(&candidates);

        debug!(
            candidates = candidates.len(),
            accepted = accepted.len(),
            "trough detection complete"
        );

        if accepted.len() < 2 {
            warn!(
                troughs = accepted.len(),
                "fewer than 2 accepted troughs; no cycles emitted"
            );
            return Vec::new();
        }

        let mut spans = Vec::with_capacity(accepted.len() - 1);
        for (i, pair) in accepted.windows(2).enumerate() {
            let span = CycleSpan {
                cycle_id: i as u32,
                start: positions[pair[0]],
                end: positions[pair[1]],
            };
            for frame in &mut frames[span.start..span.end] {
                frame.cycle_id = Some(span.cycle_id);
            }
            spans.push(span);
        }

        spans
    }

    /// Enforces minimum trough spacing: a candidate too close to the
    /// previously accepted trough is dropped and the earlier trough kept.
    /// Spacing is measured in ball-signal samples, matching the compacted
    /// signal the candidates were found on.
    fn filter_by_spacing(&self, candidates: &[usize]) -> Vec<usize> {
        let mut accepted: Vec<usize> = Vec::with_capacity(candidates.len());
        for &candidate in candidates {
            match accepted.last() {
                Some(&last) if candidate - last < self.config.min_cycle_duration => {}
                _ => accepted.push(candidate),
            }
        }
        accepted
    }
}

impl Default for CycleSegmenter {
    fn default() -> Self {
        Self::new(SegmenterConfig::default())
    }
}

/// Finds strict local minima of a signal, earliest index on plateaus.
///
/// An index qualifies when the signal strictly rises on both sides of it
/// (or of its plateau). A missing side, at either boundary of the signal,
/// does not disqualify: the first and last samples can open and close the
/// outermost cycles.
fn find_troughs(signal: &[f32]) -> Vec<usize> {
    let mut troughs = Vec::new();
    let n = signal.len();
    let mut i = 0;

    while i < n {
        // Extent of the plateau starting at i.
        let mut j = i + 1;
        while j < n && signal[j] == signal[i] {
            j += 1;
        }

        let falls_in = i == 0 || signal[i] < signal[i - 1];
        let rises_out = j == n || signal[j] > signal[i];

        // A flat signal end-to-end is not a trough.
        let interior = i > 0 || j < n;

        if falls_in && rises_out && interior {
            troughs.push(i);
        }

        i = j;
    }

    troughs
}

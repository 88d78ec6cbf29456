//! Per-cycle metric computation.
//!
//! Takes one cycle's frames, derives its contact events, and populates every
//! cycle-level metric: timing, ball height, contact-time fractions, hand
//! fields (start/end hand, crossover, dominant hand, switch time) and
//! control deviation.
//!
//! Every metric that needs a non-empty sample set degrades to `None` when
//! the set is empty; nothing is zero-filled. Missing values stay missing all
//! the way into session aggregation.

use tracing::warn;

use crate::events::group_contact_events;
use crate::types::{ContactEvent, ContactLabel, Cycle, Hand, LabeledFrame};

/// Configuration for cycle metrics.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Minimum contact-time margin for declaring a dominant hand.
    /// Typical: 0.1 (one hand must hold 10 percentage points more of the
    /// cycle than the other).
    pub dominant_hand_delta: f32,

    /// Minimum frames for a contact window to determine start/end hand.
    /// Shorter windows still count toward time fractions. Typical: 3.
    pub min_window_frames: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            dominant_hand_delta: 0.1,
            min_window_frames: 3,
        }
    }
}

/// Computes all metrics for one cycle from its frames.
pub struct CycleMetricsEngine {
    config: MetricsConfig,
}

impl CycleMetricsEngine {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Builds a fully populated `Cycle` from its frame subsequence.
    ///
    /// The segmenter only emits spans with at least one frame, so an empty
    /// input should not occur; it and a zero-length span both degrade to
    /// `None` (the cycle is dropped with a warning upstream) to keep the
    /// `duration_ms > 0` invariant on every emitted cycle.
    pub fn compute_cycle(&self, cycle_id: u32, mut frames: Vec<LabeledFrame>) -> Option<Cycle> {
        let (first, last) = match (frames.first(), frames.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return None,
        };

        let start_time_ms = first.timestamp_ms;
        let end_time_ms = last.timestamp_ms;
        let duration_ms = end_time_ms - start_time_ms;
        if duration_ms == 0 {
            warn!(cycle_id, "cycle span has zero duration; dropping");
            return None;
        }

        for frame in &mut frames {
            frame.cycle_id = Some(cycle_id);
        }

        let heights: Vec<f32> = frames
            .iter()
            .filter_map(|f| f.ball_center.map(|p| p.y))
            .collect();
        // Image convention: smaller ball_y is physically higher.
        let max_height = heights.iter().copied().reduce(f32::min);
        let min_height = heights.iter().copied().reduce(f32::max);
        let avg_height = mean(&heights);
        let height_range = match (min_height, max_height) {
            (Some(lowest), Some(highest)) => Some(lowest - highest),
            _ => None,
        };

        let contact_events = group_contact_events(&frames, start_time_ms, duration_ms);

        let (fraction_left, fraction_right, controlled_ratio) = contact_fractions(&frames);

        let meaningful: Vec<&ContactEvent> = contact_events
            .iter()
            .filter(|e| e.is_meaningful(self.config.min_window_frames))
            .collect();

        let start_hand = meaningful.first().map(|e| e.hand);
        let end_hand = meaningful.last().map(|e| e.hand);
        let is_crossover = match (start_hand, end_hand) {
            (Some(start), Some(end)) => Some(start != end),
            _ => None,
        };

        let dominant_hand = self.dominant_hand(fraction_left, fraction_right);

        let switch_time_norm = if is_crossover == Some(true) {
            switch_time_norm(&meaningful, start_hand, end_hand, start_time_ms, duration_ms)
        } else {
            None
        };

        let (control_deviation_overall, control_deviation_in_control) =
            control_deviation(&frames);

        Some(Cycle {
            cycle_id,
            frames,
            contact_events,
            start_time_ms,
            end_time_ms,
            duration_ms,
            max_height,
            min_height,
            avg_height,
            height_range,
            contact_time_fraction_left: fraction_left,
            contact_time_fraction_right: fraction_right,
            controlled_time_ratio: controlled_ratio,
            start_hand,
            end_hand,
            is_crossover,
            dominant_hand,
            switch_time_norm,
            control_deviation_overall,
            control_deviation_in_control,
        })
    }

    /// Dominant hand by contact-time margin: the left fraction must exceed
    /// the right by at least `dominant_hand_delta` (or vice versa),
    /// otherwise the cycle is ambiguous and no hand is dominant.
    fn dominant_hand(&self, fraction_left: f32, fraction_right: f32) -> Option<Hand> {
        let margin = fraction_left - fraction_right;
        if margin >= self.config.dominant_hand_delta {
            Some(Hand::Left)
        } else if margin <= -self.config.dominant_hand_delta {
            Some(Hand::Right)
        } else {
            None
        }
    }
}

impl Default for CycleMetricsEngine {
    fn default() -> Self {
        Self::new(MetricsConfig::default())
    }
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f32>() / values.len() as f32)
}

/// Frame-count-weighted fractions of the cycle spent in left contact, right
/// contact, and either.
fn contact_fractions(frames: &[LabeledFrame]) -> (f32, f32, f32) {
    let total = frames.len();
    if total == 0 {
        return (0.0, 0.0, 0.0);
    }

    let left = frames
        .iter()
        .filter(|f| f.contact_label == ContactLabel::Left)
        .count();
    let right = frames
        .iter()
        .filter(|f| f.contact_label == ContactLabel::Right)
        .count();

    (
        left as f32 / total as f32,
        right as f32 / total as f32,
        (left + right) as f32 / total as f32,
    )
}

/// Normalized midpoint of the hand switch: between the end of the last
/// meaningful start-hand event and the start of the first meaningful
/// end-hand event after it.
fn switch_time_norm(
    meaningful: &[&ContactEvent],
    start_hand: Option<Hand>,
    end_hand: Option<Hand>,
    start_time_ms: u64,
    duration_ms: u64,
) -> Option<f32> {
    let (start_hand, end_hand) = match (start_hand, end_hand) {
        (Some(start), Some(end)) if start != end => (start, end),
        _ => return None,
    };

    let last_start = meaningful.iter().filter(|e| e.hand == start_hand).last()?;
    let first_end = meaningful
        .iter()
        .find(|e| e.hand == end_hand && e.t_start_ms >= last_start.t_end_ms)?;

    let mid_ms = (last_start.t_end_ms + first_end.t_start_ms) as f32 / 2.0;
    Some((mid_ms - start_time_ms as f32) / duration_ms as f32)
}

/// Mean ball-to-nearest-wrist distance, overall and restricted to in-control
/// frames. `None` whenever the underlying frame set is empty.
fn control_deviation(frames: &[LabeledFrame]) -> (Option<f32>, Option<f32>) {
    let overall: Vec<f32> = frames.iter().filter_map(|f| f.d_min).collect();
    let in_control: Vec<f32> = frames
        .iter()
        .filter(|f| f.contact_label.is_contact())
        .filter_map(|f| f.d_min)
        .collect();

    (mean(&overall), mean(&in_control))
}

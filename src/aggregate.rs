//! Session-level aggregation over finished cycles.
//!
//! Reduces the ordered cycle list into one `SessionSummary`: means and
//! population variances of the per-cycle metrics, the crossover count, and
//! the left/right hand split. This is the join point of the pipeline; it
//! runs once, after every cycle is final, and its output is never mutated.
//!
//! Missing per-cycle values are excluded from their statistic, never
//! zero-filled; a statistic with no qualifying cycles is reported as `None`
//! so consumers can tell "no data" from "zero".

use crate::types::{
    Cycle, FrameCounts, Hand, SessionSummary, SessionThreshold, SummaryStat,
};

/// Aggregates cycle metrics into session-level statistics.
pub struct SessionAggregator;

impl SessionAggregator {
    /// Builds the summary for a finished session.
    ///
    /// `threshold` is recorded verbatim for provenance; `counts` carries the
    /// caller's frame bookkeeping through to the report.
    pub fn summarize(
        cycles: &[Cycle],
        threshold: SessionThreshold,
        counts: FrameCounts,
    ) -> SessionSummary {
        let durations: Vec<f32> = cycles.iter().map(|c| c.duration_ms as f32).collect();
        let max_heights: Vec<f32> = cycles.iter().filter_map(|c| c.max_height).collect();
        let controlled: Vec<f32> = cycles.iter().map(|c| c.controlled_time_ratio).collect();
        let deviations: Vec<f32> = cycles
            .iter()
            .filter_map(|c| c.control_deviation_in_control)
            .collect();

        let crossovers_count = cycles
            .iter()
            .filter(|c| c.is_crossover == Some(true))
            .count();

        let hand_samples: Vec<Hand> = cycles
            .iter()
            .filter(|c| c.is_crossover == Some(false))
            .filter_map(|c| c.dominant_hand.or(c.end_hand))
            .collect();

        let hand_ratio_sample_size = hand_samples.len();
        let (left_hand_ratio, right_hand_ratio) = if hand_ratio_sample_size > 0 {
            let left = hand_samples.iter().filter(|&&h| h == Hand::Left).count();
            let right = hand_ratio_sample_size - left;
            (
                Some(left as f32 / hand_ratio_sample_size as f32),
                Some(right as f32 / hand_ratio_sample_size as f32),
            )
        } else {
            (None, None)
        };

        SessionSummary {
            total_cycles: cycles.len(),
            total_frames: counts.total_frames,
            valid_frames: counts.valid_frames,
            duration_ms: stat(&durations),
            max_height: stat(&max_heights),
            controlled_time_ratio: stat(&controlled),
            control_deviation_in_control: stat(&deviations),
            crossovers_count,
            left_hand_ratio,
            right_hand_ratio,
            hand_ratio_sample_size,
            shoulder_width_session: threshold.shoulder_width_session,
            d_thr: threshold.d_thr,
        }
    }
}

/// Mean and population variance. `None` for an empty sample set; a single
/// sample has variance 0.
fn stat(values: &[f32]) -> Option<SummaryStat> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;

    Some(SummaryStat { mean, variance })
}

//! Complete evaluation pipeline from normalized frames to a session report.
//!
//! Orchestrates the full data flow:
//! 1. **Contact classification**: session threshold + per-frame labels
//! 2. **Cycle segmentation**: trough detection on the ball's vertical signal
//! 3. **Per-cycle work**: contact-event grouping and metric computation
//! 4. **Aggregation**: session-level statistics
//!
//! Classification and segmentation are independent of each other; per-cycle
//! work only depends on both being final. The pipeline runs them in a fixed
//! order so that identical input and configuration always produce
//! bit-identical output.
//!
//! Degraded input never raises an error from here: too little data yields an
//! empty result plus a warning. The only fallible step is configuration
//! validation, which happens once, at construction, before any frame is
//! touched.

use thiserror::Error;
use tracing::{debug, warn};

use crate::aggregate::SessionAggregator;
use crate::contact::{ContactClassifier, ContactConfig};
use crate::metrics::{CycleMetricsEngine, MetricsConfig};
use crate::segmentation::{CycleSegmenter, SegmenterConfig};
use crate::types::{FrameCounts, NormalizedFrame, SessionEvaluation};

/// Configuration for the complete evaluation pipeline.
///
/// Bundles all component configurations into a single package. Defaults
/// match the reference tuning; every knob can be overridden before
/// constructing the pipeline.
#[derive(Debug, Clone, Default)]
pub struct EvaluationConfig {
    /// Contact classification (control threshold multiplier).
    pub contact: ContactConfig,

    /// Cycle segmentation (minimum trough spacing).
    pub segmenter: SegmenterConfig,

    /// Per-cycle metrics (dominant-hand margin, meaningful-window length).
    pub metrics: MetricsConfig,
}

impl EvaluationConfig {
    /// Rejects parameter values the pipeline cannot run with.
    ///
    /// Called at pipeline construction so that a bad configuration fails
    /// before any frame processing begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.contact.threshold_k.is_finite() || self.contact.threshold_k <= 0.0 {
            return Err(ConfigError::InvalidThresholdK(self.contact.threshold_k));
        }
        if !self.metrics.dominant_hand_delta.is_finite() || self.metrics.dominant_hand_delta < 0.0
        {
            return Err(ConfigError::InvalidDominantHandDelta(
                self.metrics.dominant_hand_delta,
            ));
        }
        if self.metrics.min_window_frames == 0 {
            return Err(ConfigError::ZeroMinWindowFrames);
        }
        // Two troughs closer than 2 samples cannot exist, so anything below
        // that disables the noise filter entirely.
        if self.segmenter.min_cycle_duration < 2 {
            return Err(ConfigError::MinCycleDurationTooShort);
        }
        Ok(())
    }
}

/// A configuration value the pipeline refuses to run with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("contact threshold multiplier must be finite and positive, got {0}")]
    InvalidThresholdK(f32),

    #[error("dominant hand delta must be finite and non-negative, got {0}")]
    InvalidDominantHandDelta(f32),

    #[error("minimum contact window must be at least 1 frame")]
    ZeroMinWindowFrames,

    #[error("minimum cycle duration must be at least 2 samples")]
    MinCycleDurationTooShort,
}

/// The evaluation engine: frames in, session report out.
///
/// Construction validates the configuration; after that, `evaluate` is pure
/// and can be called any number of times.
pub struct EvaluationPipeline {
    classifier: ContactClassifier,
    segmenter: CycleSegmenter,
    metrics_engine: CycleMetricsEngine,
}

impl EvaluationPipeline {
    /// Creates a pipeline, rejecting invalid configuration eagerly.
    pub fn new(config: EvaluationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            classifier: ContactClassifier::new(config.contact),
            segmenter: CycleSegmenter::new(config.segmenter),
            metrics_engine: CycleMetricsEngine::new(config.metrics),
        })
    }

    /// Evaluates a session where every source frame reached the core.
    pub fn evaluate(&self, frames: &[NormalizedFrame]) -> SessionEvaluation {
        self.evaluate_with_total_frames(frames, frames.len())
    }

    /// Evaluates a session, recording how many source frames existed before
    /// invalid ones were dropped upstream.
    pub fn evaluate_with_total_frames(
        &self,
        frames: &[NormalizedFrame],
        total_frames: usize,
    ) -> SessionEvaluation {
        let mut warnings = Vec::new();

        let (mut labeled, threshold) = self.classifier.label_frames(frames);
        if threshold.shoulder_width_session == 0.0 && !frames.is_empty() {
            warnings.push(
                "no shoulder width could be measured; control threshold degraded to 0"
                    .to_string(),
            );
        }

        let spans = self.segmenter.segment(&mut labeled);
        if spans.is_empty() {
            warnings.push(
                "fewer than 2 accepted troughs; session contains no complete cycle".to_string(),
            );
        }

        // Emitted cycles get their final ids here so that dropped spans
        // leave no gap in the sequence.
        let mut cycles = Vec::with_capacity(spans.len());
        for span in &spans {
            let cycle_frames = labeled[span.start..span.end].to_vec();
            let cycle_id = cycles.len() as u32;
            match self.metrics_engine.compute_cycle(cycle_id, cycle_frames) {
                Some(cycle) => cycles.push(cycle),
                None => {
                    warn!(
                        start = span.start,
                        end = span.end,
                        "dropping degenerate cycle span"
                    );
                    warnings.push(format!(
                        "span over frame positions {}..{} dropped: no usable duration",
                        span.start, span.end
                    ));
                }
            }
        }

        debug!(
            frames = frames.len(),
            cycles = cycles.len(),
            "evaluation complete"
        );

        let summary = SessionAggregator::summarize(
            &cycles,
            threshold,
            FrameCounts {
                total_frames,
                valid_frames: frames.len(),
            },
        );

        SessionEvaluation {
            summary,
            cycles,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(EvaluationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_config_values() {
        let config = EvaluationConfig::default();
        assert!((config.contact.threshold_k - 0.5).abs() < 1e-6);
        assert!((config.metrics.dominant_hand_delta - 0.1).abs() < 1e-6);
        assert_eq!(config.metrics.min_window_frames, 3);
        assert_eq!(config.segmenter.min_cycle_duration, 10);
    }

    #[test]
    fn test_negative_threshold_k_rejected() {
        let mut config = EvaluationConfig::default();
        config.contact.threshold_k = -0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThresholdK(_))
        ));
        assert!(EvaluationPipeline::new(config).is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut config = EvaluationConfig::default();
        config.contact.threshold_k = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = EvaluationConfig::default();
        config.metrics.dominant_hand_delta = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_threshold_k_rejected() {
        // A zero threshold would label every frame NoContact/Unknown.
        let mut config = EvaluationConfig::default();
        config.contact.threshold_k = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThresholdK(_))
        ));
    }

    #[test]
    fn test_too_small_window_sizes_rejected() {
        let mut config = EvaluationConfig::default();
        config.metrics.min_window_frames = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinWindowFrames));

        let mut config = EvaluationConfig::default();
        config.segmenter.min_cycle_duration = 0;
        assert_eq!(config.validate(), Err(ConfigError::MinCycleDurationTooShort));

        // A spacing of 1 never rejects anything; it must be refused too.
        let mut config = EvaluationConfig::default();
        config.segmenter.min_cycle_duration = 1;
        assert_eq!(config.validate(), Err(ConfigError::MinCycleDurationTooShort));
    }

    #[test]
    fn test_empty_session_reports_warning_not_error() {
        let pipeline = EvaluationPipeline::new(EvaluationConfig::default()).unwrap();
        let result = pipeline.evaluate(&[]);

        assert!(result.cycles.is_empty());
        assert_eq!(result.summary.total_cycles, 0);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("no complete cycle")));
    }
}

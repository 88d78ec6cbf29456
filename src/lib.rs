//! Dribble Evaluation Engine Library
//!
//! A batch evaluation kernel that converts normalized per-frame pose and
//! ball samples into structured dribbling evidence: per-frame hand-contact
//! labels, dribble cycles, contact windows, per-cycle metrics, and session
//! aggregates suitable for downstream coaching feedback.
//!
//! # Design Philosophy
//!
//! - **Evidence first, interpretation later**: The engine measures what the
//!   frames show. It never scores, grades, or coaches.
//! - **Absent, not zero**: Any metric that cannot be computed from the
//!   available landmarks is reported as `None`, never filled with a default.
//! - **Deterministic batch processing**: The same frames and configuration
//!   always produce bit-identical output; there is no hidden state between
//!   runs.
//! - **Person-relative units**: All distances are normalized by body height
//!   upstream, so thresholds derived here transfer across players and
//!   camera placements.
//!
//! # Example
//!
//! ```ignore
//! use dribble_eval::pipeline::{EvaluationConfig, EvaluationPipeline};
//! use dribble_eval::types::NormalizedFrame;
//!
//! let pipeline = EvaluationPipeline::new(EvaluationConfig::default())?;
//! let frames: Vec<NormalizedFrame> = load_session();
//! let evaluation = pipeline.evaluate(&frames);
//! println!("{} cycles", evaluation.summary.total_cycles);
//! ```

pub mod aggregate;
pub mod contact;
pub mod events;
pub mod metrics;
pub mod pipeline;
pub mod segmentation;
pub mod types;


// Re-export commonly used types
pub use pipeline::{ConfigError, EvaluationConfig, EvaluationPipeline};
pub use types::{
    ContactEvent, ContactLabel, Cycle, Hand, LabeledFrame, NormalizedFrame, Point,
    SessionEvaluation, SessionSummary, SummaryStat,
};

//! Core data types for the dribble evaluation engine.
//!
//! This module defines the types that flow between the evaluation stages:
//! normalized input frames, labeled frames, contact events, cycles, and the
//! session summary. All types are immutable snapshots once a stage has
//! produced them; the only cross-stage mutation is the segmenter assigning
//! `cycle_id` onto labeled frames.
//!
//! Design principle: Types should make intent obvious. If a concept exists,
//! it gets a type. Absent measurements are `Option`, never a zero or a
//! sentinel value, so that a consumer can always distinguish "not measured"
//! from "measured as zero".

use serde::{Deserialize, Serialize};

/// A 2D point in body-relative normalized coordinates.
///
/// Produced by the upstream normalization stage: the hip center is the
/// origin and all coordinates are expressed as fractions of body height.
/// Smaller `y` means physically higher (image convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A single valid frame of body-relative motion data.
///
/// This is the input contract from the perception/normalization
/// collaborator: frames that could not establish body scale never reach
/// this crate, so `body_height` is always a usable reference scale here.
/// Individual landmarks may still be absent on any given frame, which is
/// represented explicitly with `None`.
///
/// `frame_index` is strictly increasing and `timestamp_ms` is non-decreasing
/// across a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFrame {
    /// Position of the frame in the source sequence. Unique per session.
    pub frame_index: u64,

    /// Timestamp in milliseconds from session start.
    pub timestamp_ms: u64,

    /// Ball center, if the ball was detected on this frame.
    pub ball_center: Option<Point>,

    pub left_wrist: Option<Point>,
    pub right_wrist: Option<Point>,
    pub left_shoulder: Option<Point>,
    pub right_shoulder: Option<Point>,
    pub left_knee: Option<Point>,
    pub right_knee: Option<Point>,

    /// Hip center in normalized space. (0, 0) by construction when present.
    pub hip_center: Option<Point>,

    /// Reference body scale the frame was normalized with.
    pub body_height: f32,
}

impl NormalizedFrame {
    /// Creates a frame with no landmarks present.
    ///
    /// Intended as a starting point; callers fill in the landmarks that were
    /// actually detected.
    pub fn new(frame_index: u64, timestamp_ms: u64) -> Self {
        Self {
            frame_index,
            timestamp_ms,
            ball_center: None,
            left_wrist: None,
            right_wrist: None,
            left_shoulder: None,
            right_shoulder: None,
            left_knee: None,
            right_knee: None,
            hip_center: Some(Point::new(0.0, 0.0)),
            body_height: 1.0,
        }
    }

    /// Shoulder width for this frame, if both shoulders were detected.
    pub fn shoulder_width(&self) -> Option<f32> {
        match (self.left_shoulder, self.right_shoulder) {
            (Some(left), Some(right)) => Some(left.distance_to(right)),
            _ => None,
        }
    }
}

/// Which hand an event or metric refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

/// Per-frame hand-contact classification.
///
/// Closed set by design: the classifier must place every frame into exactly
/// one of these, and `match` exhaustiveness keeps the decision logic total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactLabel {
    /// Ball is within the control threshold of the left wrist.
    #[serde(rename = "L")]
    Left,
    /// Ball is within the control threshold of the right wrist.
    #[serde(rename = "R")]
    Right,
    /// No wrist is close enough to the ball to count as control.
    #[serde(rename = "None")]
    NoContact,
    /// Both wrists absent; contact cannot be assessed.
    #[serde(rename = "unknown")]
    Unknown,
}

impl ContactLabel {
    /// True for the two in-control labels.
    pub fn is_contact(&self) -> bool {
        matches!(self, ContactLabel::Left | ContactLabel::Right)
    }

    /// The hand this label refers to, for the two in-control labels.
    pub fn hand(&self) -> Option<Hand> {
        match self {
            ContactLabel::Left => Some(Hand::Left),
            ContactLabel::Right => Some(Hand::Right),
            ContactLabel::NoContact | ContactLabel::Unknown => None,
        }
    }
}

/// A normalized frame plus everything the contact classifier derived for it.
///
/// Created once per valid frame. `cycle_id` starts as `None` and is assigned
/// by the segmenter; frames outside every accepted cycle keep `None` and are
/// excluded from per-cycle metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledFrame {
    pub frame_index: u64,
    pub timestamp_ms: u64,

    /// Cycle this frame belongs to, if any.
    pub cycle_id: Option<u32>,

    pub contact_label: ContactLabel,

    /// Ball-to-left-wrist distance, when both are present.
    pub d_left: Option<f32>,
    /// Ball-to-right-wrist distance, when both are present.
    pub d_right: Option<f32>,
    /// Minimum of the available distances. `None` when neither is available.
    pub d_min: Option<f32>,

    pub ball_center: Option<Point>,
    pub left_wrist: Option<Point>,
    pub right_wrist: Option<Point>,
    pub left_shoulder: Option<Point>,
    pub right_shoulder: Option<Point>,
    pub left_knee: Option<Point>,
    pub right_knee: Option<Point>,
    pub hip_center: Option<Point>,
    pub body_height: f32,
}

impl LabeledFrame {
    /// Builds a labeled frame from its source frame and derived fields.
    pub fn from_normalized(
        frame: &NormalizedFrame,
        contact_label: ContactLabel,
        d_left: Option<f32>,
        d_right: Option<f32>,
        d_min: Option<f32>,
    ) -> Self {
        Self {
            frame_index: frame.frame_index,
            timestamp_ms: frame.timestamp_ms,
            cycle_id: None,
            contact_label,
            d_left,
            d_right,
            d_min,
            ball_center: frame.ball_center,
            left_wrist: frame.left_wrist,
            right_wrist: frame.right_wrist,
            left_shoulder: frame.left_shoulder,
            right_shoulder: frame.right_shoulder,
            left_knee: frame.left_knee,
            right_knee: frame.right_knee,
            hip_center: frame.hip_center,
            body_height: frame.body_height,
        }
    }
}

/// A maximal run of consecutive same-hand contact frames within one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub hand: Hand,

    /// First frame of the run (inclusive).
    pub start_frame_index: u64,
    /// Last frame of the run (inclusive).
    pub end_frame_index: u64,

    pub t_start_ms: u64,
    pub t_end_ms: u64,

    /// Event start relative to the owning cycle's span, in [0, 1].
    /// `None` when the cycle duration is degenerate.
    pub t_norm_start: Option<f32>,
    /// Event end relative to the owning cycle's span, in [0, 1].
    pub t_norm_end: Option<f32>,
}

impl ContactEvent {
    /// Number of frames in the run. Always at least 1.
    pub fn frame_count(&self) -> u64 {
        self.end_frame_index - self.start_frame_index + 1
    }

    /// Whether this event is long enough to determine start/end hand.
    pub fn is_meaningful(&self, min_window_frames: usize) -> bool {
        self.frame_count() >= min_window_frames as u64
    }
}

/// One dribble cycle: the frames between two consecutive accepted troughs,
/// plus every metric derived from them.
///
/// A cycle exclusively owns its frame subsequence and its contact events.
/// Height values follow the image convention of the input: `max_height` is
/// the numerically smallest `ball_y` (the physically highest point) and
/// `min_height` the numerically largest (the bounce).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// Sequential id, zero-based, in temporal order.
    pub cycle_id: u32,

    pub frames: Vec<LabeledFrame>,
    pub contact_events: Vec<ContactEvent>,

    pub start_time_ms: u64,
    pub end_time_ms: u64,
    /// `end_time_ms - start_time_ms`. Always positive for an emitted cycle.
    pub duration_ms: u64,

    /// Smallest ball_y seen in the cycle (highest point). `None` when the
    /// ball was never visible inside the cycle.
    pub max_height: Option<f32>,
    /// Largest ball_y seen in the cycle (the bounce).
    pub min_height: Option<f32>,
    pub avg_height: Option<f32>,
    /// `min_height - max_height`.
    pub height_range: Option<f32>,

    /// Fraction of cycle frames labeled Left.
    pub contact_time_fraction_left: f32,
    /// Fraction of cycle frames labeled Right.
    pub contact_time_fraction_right: f32,
    /// Fraction of cycle frames with either contact label.
    pub controlled_time_ratio: f32,

    /// Hand of the first meaningful contact event, if any.
    pub start_hand: Option<Hand>,
    /// Hand of the last meaningful contact event, if any.
    pub end_hand: Option<Hand>,
    /// `Some(true)` iff start and end hand are both known and differ.
    /// `None` when either is unknown.
    pub is_crossover: Option<bool>,
    /// Hand holding a clear majority of contact time, if any.
    pub dominant_hand: Option<Hand>,
    /// Normalized time of the hand switch, for crossover cycles.
    pub switch_time_norm: Option<f32>,

    /// Mean ball-to-nearest-wrist distance over frames with a measurable
    /// distance.
    pub control_deviation_overall: Option<f32>,
    /// Same, restricted to frames labeled Left or Right.
    pub control_deviation_in_control: Option<f32>,
}

/// Session-wide control threshold, computed once and threaded explicitly
/// into every stage that needs it.
///
/// This is the only session-global state in the engine; it is a plain
/// immutable value, never shared mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionThreshold {
    /// Median of per-frame shoulder widths across the session.
    pub shoulder_width_session: f32,
    /// Control distance threshold: `k * shoulder_width_session`.
    pub d_thr: f32,
}

/// Mean and population variance of a per-cycle metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStat {
    pub mean: f32,
    pub variance: f32,
}

/// Frame bookkeeping carried through to the summary for traceability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCounts {
    /// Frames in the source sequence, including ones dropped upstream.
    pub total_frames: usize,
    /// Frames that reached the evaluation core.
    pub valid_frames: usize,
}

/// Read-only aggregate over all cycles of a session.
///
/// Created once after every cycle is final, never mutated afterward.
/// Every statistic is `None` rather than zero when no cycle qualifies, so
/// an empty session is distinguishable from a session of true zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_cycles: usize,
    pub total_frames: usize,
    pub valid_frames: usize,

    pub duration_ms: Option<SummaryStat>,
    /// Statistic over per-cycle `max_height` (highest ball point).
    pub max_height: Option<SummaryStat>,
    pub controlled_time_ratio: Option<SummaryStat>,
    pub control_deviation_in_control: Option<SummaryStat>,

    /// Number of cycles with a confirmed crossover.
    pub crossovers_count: usize,

    /// Share of qualifying non-crossover cycles handled left.
    pub left_hand_ratio: Option<f32>,
    /// Share of qualifying non-crossover cycles handled right.
    pub right_hand_ratio: Option<f32>,
    /// Number of cycles the hand ratios were computed over.
    pub hand_ratio_sample_size: usize,

    /// Threshold provenance: lets any metric be traced back to the
    /// threshold that produced it.
    pub shoulder_width_session: f32,
    pub d_thr: f32,
}

/// Complete output of an evaluation run: the summary, every cycle with its
/// frames and events, and any warnings raised along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvaluation {
    pub summary: SessionSummary,
    pub cycles: Vec<Cycle>,
    /// Human-readable notes about degraded results (e.g. too few troughs).
    /// Never fatal: an empty session is a valid outcome.
    pub warnings: Vec<String>,
}

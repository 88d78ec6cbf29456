//! Per-frame hand-contact classification.
//!
//! This module computes the session-wide control-distance threshold and
//! labels every frame with the hand (if any) that is controlling the ball.
//!
//! Design: one full pass over the frame sequence to derive the threshold,
//! one pass to label. The threshold is the median of per-frame shoulder
//! widths scaled by a configurable factor, so it adapts to the player while
//! staying robust to per-frame pose-detection noise.
//!
//! The classifier holds no cross-call state: labeling the same frames twice
//! produces identical output.

use tracing::{debug, warn};

use crate::types::{ContactLabel, LabeledFrame, NormalizedFrame, SessionThreshold};

/// Configuration for contact classification.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// Control threshold multiplier: `d_thr = threshold_k * shoulder_width`.
    /// Typical: 0.5 (half a shoulder width).
    pub threshold_k: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self { threshold_k: 0.5 }
    }
}

/// Labels frames with hand contact and ball-to-wrist distances.
pub struct ContactClassifier {
    config: ContactConfig,
}

impl ContactClassifier {
    pub fn new(config: ContactConfig) -> Self {
        Self { config }
    }

    /// Labels every frame and returns the derived session threshold.
    ///
    /// The threshold is computed over the whole sequence first, then applied
    /// frame by frame. When no frame carries both shoulders the session
    /// width degrades to 0.0, which makes every distance fail the threshold;
    /// the frames still get labeled (NoContact / Unknown) rather than being
    /// dropped.
    pub fn label_frames(
        &self,
        frames: &[NormalizedFrame],
    ) -> (Vec<LabeledFrame>, SessionThreshold) {
        let shoulder_width_session = self.session_shoulder_width(frames);
        let d_thr = self.config.threshold_k * shoulder_width_session;

        if shoulder_width_session == 0.0 && !frames.is_empty() {
            warn!("no frame carried both shoulders; control threshold degraded to 0");
        }

        let threshold = SessionThreshold {
            shoulder_width_session,
            d_thr,
        };

        let labeled = frames
            .iter()
            .map(|frame| self.label_frame(frame, d_thr))
            .collect::<Vec<_>>();

        debug!(
            frames = labeled.len(),
            shoulder_width = shoulder_width_session,
            d_thr,
            "contact classification complete"
        );

        (labeled, threshold)
    }

    /// Median shoulder width over all frames where both shoulders are
    /// present. 0.0 when no frame qualifies.
    fn session_shoulder_width(&self, frames: &[NormalizedFrame]) -> f32 {
        let mut widths: Vec<f32> = frames
            .iter()
            .filter_map(NormalizedFrame::shoulder_width)
            .collect();

        if widths.is_empty() {
            return 0.0;
        }

        widths.sort_by(f32::total_cmp);
        let mid = widths.len() / 2;
        if widths.len() % 2 == 0 {
            (widths[mid - 1] + widths[mid]) / 2.0
        } else {
            widths[mid]
        }
    }

    fn label_frame(&self, frame: &NormalizedFrame, d_thr: f32) -> LabeledFrame {
        let d_left = match (frame.ball_center, frame.left_wrist) {
            (Some(ball), Some(wrist)) => Some(ball.distance_to(wrist)),
            _ => None,
        };
        let d_right = match (frame.ball_center, frame.right_wrist) {
            (Some(ball), Some(wrist)) => Some(ball.distance_to(wrist)),
            _ => None,
        };

        let d_min = match (d_left, d_right) {
            (Some(left), Some(right)) => Some(left.min(right)),
            (Some(left), None) => Some(left),
            (None, Some(right)) => Some(right),
            (None, None) => None,
        };

        let contact_label = Self::classify(frame, d_left, d_right, d_thr);

        LabeledFrame::from_normalized(frame, contact_label, d_left, d_right, d_min)
    }

    /// Label precedence: Unknown when neither wrist is visible, then Left,
    /// then Right, then NoContact. A tie at `d_left == d_right` under the
    /// threshold resolves to Left.
    fn classify(
        frame: &NormalizedFrame,
        d_left: Option<f32>,
        d_right: Option<f32>,
        d_thr: f32,
    ) -> ContactLabel {
        if frame.left_wrist.is_none() && frame.right_wrist.is_none() {
            return ContactLabel::Unknown;
        }

        let left_wins = match d_left {
            Some(left) => left < d_thr && d_right.map_or(true, |right| left <= right),
            None => false,
        };
        if left_wins {
            return ContactLabel::Left;
        }

        let right_wins = match d_right {
            Some(right) => right < d_thr && d_left.map_or(true, |left| right < left),
            None => false,
        };
        if right_wins {
            return ContactLabel::Right;
        }

        ContactLabel::NoContact
    }
}

impl Default for ContactClassifier {
    fn default() -> Self {
        Self::new(ContactConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    /// Frame with shoulders 0.4 apart and the given ball/wrist layout.
    fn frame_with(
        index: u64,
        ball: Option<(f32, f32)>,
        left_wrist: Option<(f32, f32)>,
        right_wrist: Option<(f32, f32)>,
    ) -> NormalizedFrame {
        let mut frame = NormalizedFrame::new(index, index * 33);
        frame.left_shoulder = Some(Point::new(-0.2, -0.8));
        frame.right_shoulder = Some(Point::new(0.2, -0.8));
        frame.ball_center = ball.map(|(x, y)| Point::new(x, y));
        frame.left_wrist = left_wrist.map(|(x, y)| Point::new(x, y));
        frame.right_wrist = right_wrist.map(|(x, y)| Point::new(x, y));
        frame
    }

    #[test]
    fn test_session_threshold_from_shoulder_median() {
        // Shoulder width 0.4 in every frame; k = 0.5 gives d_thr = 0.2.
        let frames: Vec<_> = (0..5)
            .map(|i| frame_with(i, Some((0.0, 0.5)), None, None))
            .collect();

        let classifier = ContactClassifier::default();
        let (_, threshold) = classifier.label_frames(&frames);

        assert!((threshold.shoulder_width_session - 0.4).abs() < 1e-6);
        assert!((threshold.d_thr - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_median_is_robust_to_outlier_widths() {
        let mut frames: Vec<_> = (0..4)
            .map(|i| frame_with(i, None, None, None))
            .collect();
        // One noisy pose detection with an absurd width.
        frames.push(frame_with(4, None, None, None));
        frames[4].left_shoulder = Some(Point::new(-2.0, -0.8));

        let classifier = ContactClassifier::default();
        let (_, threshold) = classifier.label_frames(&frames);

        // Median stays at the common width despite the outlier.
        assert!((threshold.shoulder_width_session - 0.4).abs() < 1e-3);
    }

    #[test]
    fn test_left_contact_when_left_wrist_close() {
        let frames = vec![frame_with(
            0,
            Some((0.0, 0.5)),
            Some((0.05, 0.5)),
            Some((0.5, 0.5)),
        )];

        let classifier = ContactClassifier::default();
        let (labeled, _) = classifier.label_frames(&frames);

        assert_eq!(labeled[0].contact_label, ContactLabel::Left);
        assert!(labeled[0].d_left.unwrap() < labeled[0].d_right.unwrap());
        assert_eq!(labeled[0].d_min, labeled[0].d_left);
    }

    #[test]
    fn test_right_contact_when_right_wrist_closer() {
        let frames = vec![frame_with(
            0,
            Some((0.0, 0.5)),
            Some((0.5, 0.5)),
            Some((0.05, 0.5)),
        )];

        let classifier = ContactClassifier::default();
        let (labeled, _) = classifier.label_frames(&frames);

        assert_eq!(labeled[0].contact_label, ContactLabel::Right);
    }

    #[test]
    fn test_tie_resolves_to_left() {
        // Both wrists exactly 0.1 from the ball, threshold 0.2.
        let frames = vec![frame_with(
            0,
            Some((0.0, 0.5)),
            Some((-0.1, 0.5)),
            Some((0.1, 0.5)),
        )];

        let classifier = ContactClassifier::default();
        let (labeled, _) = classifier.label_frames(&frames);

        assert_eq!(labeled[0].contact_label, ContactLabel::Left);
    }

    #[test]
    fn test_no_contact_when_both_wrists_far() {
        let frames = vec![frame_with(
            0,
            Some((0.0, 0.5)),
            Some((1.0, 0.5)),
            Some((-1.0, 0.5)),
        )];

        let classifier = ContactClassifier::default();
        let (labeled, _) = classifier.label_frames(&frames);

        assert_eq!(labeled[0].contact_label, ContactLabel::NoContact);
    }

    #[test]
    fn test_unknown_iff_both_wrists_absent() {
        let frames = vec![
            // Both wrists missing: unknown, regardless of the ball.
            frame_with(0, Some((0.0, 0.5)), None, None),
            frame_with(1, None, None, None),
            // One wrist present but no ball: distances unmeasurable, but the
            // frame is not unknown.
            frame_with(2, None, Some((0.1, 0.5)), None),
        ];

        let classifier = ContactClassifier::default();
        let (labeled, _) = classifier.label_frames(&frames);

        assert_eq!(labeled[0].contact_label, ContactLabel::Unknown);
        assert_eq!(labeled[1].contact_label, ContactLabel::Unknown);
        assert_eq!(labeled[2].contact_label, ContactLabel::NoContact);
        assert_eq!(labeled[2].d_min, None);
    }

    #[test]
    fn test_distance_at_threshold_is_not_contact() {
        // d_left exactly equals d_thr = 0.2: strict comparison, no contact.
        let frames = vec![frame_with(0, Some((0.0, 0.5)), Some((0.2, 0.5)), None)];

        let classifier = ContactClassifier::default();
        let (labeled, _) = classifier.label_frames(&frames);

        assert_eq!(labeled[0].contact_label, ContactLabel::NoContact);
    }

    #[test]
    fn test_missing_wrist_does_not_block_other_hand() {
        let frames = vec![frame_with(0, Some((0.0, 0.5)), None, Some((0.05, 0.5)))];

        let classifier = ContactClassifier::default();
        let (labeled, _) = classifier.label_frames(&frames);

        assert_eq!(labeled[0].contact_label, ContactLabel::Right);
        assert_eq!(labeled[0].d_left, None);
        assert_eq!(labeled[0].d_min, labeled[0].d_right);
    }

    #[test]
    fn test_empty_session_degrades_quietly() {
        let classifier = ContactClassifier::default();
        let (labeled, threshold) = classifier.label_frames(&[]);

        assert!(labeled.is_empty());
        assert_eq!(threshold.shoulder_width_session, 0.0);
        assert_eq!(threshold.d_thr, 0.0);
    }

    #[test]
    fn test_labeling_is_deterministic() {
        let frames: Vec<_> = (0..20)
            .map(|i| {
                frame_with(
                    i,
                    Some((0.0, 0.3 + (i as f32) * 0.01)),
                    Some((0.05, 0.3)),
                    Some((0.4, 0.3)),
                )
            })
            .collect();

        let classifier = ContactClassifier::default();
        let (first, threshold_a) = classifier.label_frames(&frames);
        let (second, threshold_b) = classifier.label_frames(&frames);

        assert_eq!(first, second);
        assert_eq!(threshold_a, threshold_b);
    }
}

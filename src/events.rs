//! Contact-window grouping within a cycle.
//!
//! Scans a cycle's frames in order and collapses consecutive same-hand
//! contact labels into discrete `ContactEvent`s. Frames labeled NoContact or
//! Unknown never belong to an event and close any open one.
//!
//! Short events are kept in the output: they still count toward
//! fraction-of-time metrics. Whether an event is long enough to determine
//! the cycle's start/end hand is the consumer's call, via
//! `ContactEvent::is_meaningful`.

use crate::types::{ContactEvent, Hand, LabeledFrame};

/// Groups a cycle's frames into ordered contact events.
///
/// `cycle_start_ms` and `duration_ms` are the owning cycle's span, used to
/// place each event on the cycle's normalized timeline. A degenerate
/// duration leaves `t_norm_start`/`t_norm_end` unset.
pub fn group_contact_events(
    frames: &[LabeledFrame],
    cycle_start_ms: u64,
    duration_ms: u64,
) -> Vec<ContactEvent> {
    let mut events = Vec::new();
    let mut open: Option<(Hand, usize)> = None;

    for (idx, frame) in frames.iter().enumerate() {
        match frame.contact_label.hand() {
            None => {
                if let Some((hand, start_idx)) = open.take() {
                    events.push(build_event(
                        frames,
                        hand,
                        start_idx,
                        idx - 1,
                        cycle_start_ms,
                        duration_ms,
                    ));
                }
            }
            Some(hand) => match open {
                None => open = Some((hand, idx)),
                Some((open_hand, start_idx)) if hand != open_hand => {
                    events.push(build_event(
                        frames,
                        open_hand,
                        start_idx,
                        idx - 1,
                        cycle_start_ms,
                        duration_ms,
                    ));
                    open = Some((hand, idx));
                }
                Some(_) => {}
            },
        }
    }

    if let Some((hand, start_idx)) = open {
        events.push(build_event(
            frames,
            hand,
            start_idx,
            frames.len() - 1,
            cycle_start_ms,
            duration_ms,
        ));
    }

    events
}

fn build_event(
    frames: &[LabeledFrame],
    hand: Hand,
    start_idx: usize,
    end_idx: usize,
    cycle_start_ms: u64,
    duration_ms: u64,
) -> ContactEvent {
    let t_start_ms = frames[start_idx].timestamp_ms;
    let t_end_ms = frames[end_idx].timestamp_ms;

    let (t_norm_start, t_norm_end) = if duration_ms > 0 {
        (
            Some(normalize(t_start_ms, cycle_start_ms, duration_ms)),
            Some(normalize(t_end_ms, cycle_start_ms, duration_ms)),
        )
    } else {
        (None, None)
    };

    ContactEvent {
        hand,
        start_frame_index: frames[start_idx].frame_index,
        end_frame_index: frames[end_idx].frame_index,
        t_start_ms,
        t_end_ms,
        t_norm_start,
        t_norm_end,
    }
}

/// Position of `t` on the cycle timeline, clipped to [0, 1].
fn normalize(t: u64, cycle_start_ms: u64, duration_ms: u64) -> f32 {
    let offset = t.saturating_sub(cycle_start_ms) as f32;
    (offset / duration_ms as f32).clamp(0.0, 1.0)
}

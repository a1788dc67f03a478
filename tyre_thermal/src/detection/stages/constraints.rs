//! Corrective stages applied to the grown span, in order: geometry, temporal change,
//! persistence.

use std::cmp::Ordering;

use crate::detection::{Span, SpanHistory};
use crate::frame::{LAST_COLUMN, SENSOR_WIDTH};

/// Absorbs f32 error in `Wp·(1 ± r)` so an exact product like 20 × 1.3 is not rounded
/// to the wrong integer.
const RATIO_EPSILON: f32 = 1e-4;

/// Resizes `span` to `target` columns around its centre.
///
/// Growing puts an odd extra column on the side with more room, and growth blocked by a
/// sensor edge moves to the other side. Shrinking takes an odd extra column off the right.
pub(crate) fn resize_span(span: Span, target: usize) -> Span {
    let target = target.clamp(1, SENSOR_WIDTH);
    let width = span.width();

    match width.cmp(&target) {
        Ordering::Equal => span,
        Ordering::Greater => {
            let excess = width - target;
            let cut_left = excess / 2;
            let cut_right = excess - cut_left;
            Span::new(span.left + cut_left, span.right - cut_right)
        }
        Ordering::Less => {
            let need = target - width;
            let room_left = span.left;
            let room_right = LAST_COLUMN - span.right;

            let half = need / 2;
            let (mut grow_left, mut grow_right) = if room_left > room_right {
                (need - half, half)
            } else {
                (half, need - half)
            };
            if grow_left > room_left {
                grow_right += grow_left - room_left;
                grow_left = room_left;
            }
            if grow_right > room_right {
                grow_left = (grow_left + grow_right - room_right).min(room_left);
                grow_right = room_right;
            }

            Span::new(span.left - grow_left, span.right + grow_right)
        }
    }
}

/// Forces the width into `[min_width, max_width]`.
pub(crate) fn clamp_geometry(span: Span, min_width: usize, max_width: usize) -> Span {
    let width = span.width();
    if width < min_width {
        resize_span(span, min_width)
    } else if width > max_width {
        resize_span(span, max_width)
    } else {
        span
    }
}

/// Limits the frame-to-frame width change relative to the most recent history entry.
pub(crate) fn clamp_temporal_change(
    span: Span,
    previous: Option<&Span>,
    ratio: f32,
    min_width: usize,
    max_width: usize,
) -> Span {
    let Some(previous) = previous else {
        return span;
    };

    let wp = previous.width() as f32;
    let ceiling = ((wp * (1.0 + ratio) + RATIO_EPSILON).floor().max(0.0) as usize)
        .clamp(min_width, max_width);
    let floor = ((wp * (1.0 - ratio) - RATIO_EPSILON).ceil().max(0.0) as usize)
        .clamp(min_width, max_width);

    let width = span.width();
    if width > ceiling {
        tracing::debug!(width, ceiling, "width change clamped");
        resize_span(span, ceiling)
    } else if width < floor {
        tracing::debug!(width, floor, "width change clamped");
        resize_span(span, floor)
    } else {
        span
    }
}

/// Quadratic-weighted blend of the current span with the most recent history entries.
///
/// Passes `span` through until the history holds `persistence_frames` entries. The
/// output is always appended to the history, dropping the oldest entry when full.
pub(crate) fn smooth_persistence(
    span: Span,
    history: &mut SpanHistory,
    persistence_frames: usize,
) -> Span {
    let smoothed = if persistence_frames == 0 || history.len() < persistence_frames {
        span
    } else {
        let recent = &history[history.len() - persistence_frames..];
        let current_weight = (persistence_frames + 1) * (persistence_frames + 1);

        let mut total = current_weight;
        let mut left = span.left * current_weight;
        let mut right = span.right * current_weight;
        for (i, entry) in recent.iter().enumerate() {
            let weight = (i + 1) * (i + 1);
            total += weight;
            left += entry.left * weight;
            right += entry.right * weight;
        }

        Span::new(left / total, right / total)
    };

    push_history(history, smoothed);
    smoothed
}

fn push_history(history: &mut SpanHistory, span: Span) {
    if history.is_full() {
        history.remove(0);
    }
    history.push(span);
}

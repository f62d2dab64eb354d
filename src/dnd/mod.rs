//! Drag identities and gesture state.
//!
//! Rounds and round-question links share one draggable id namespace in the
//! DOM, so every id is tagged with its kind. Internally the tag is a struct
//! field; the `kind:raw` string form exists only inside `DataTransfer`, and
//! only the raw integer ever reaches the persistence layer.

use strum::{Display, EnumString};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum DragKind {
    Round,
    Question,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct DragId {
    pub kind: DragKind,
    pub raw: i64,
}

impl DragId {
    pub fn round(raw: i64) -> Self {
        Self {
            kind: DragKind::Round,
            raw,
        }
    }

    pub fn question(raw: i64) -> Self {
        Self {
            kind: DragKind::Question,
            raw,
        }
    }

    /// Serialize for `DataTransfer::set_data`.
    pub fn encode(&self) -> String {
        format!("{}:{}", self.kind, self.raw)
    }

    /// Strict inverse of `encode`. A bare integer or an unknown kind is
    /// rejected rather than guessed at.
    pub fn decode(s: &str) -> Option<Self> {
        let (kind, raw) = s.split_once(':')?;
        let kind: DragKind = kind.parse().ok()?;
        let raw: i64 = raw.parse().ok()?;
        Some(Self { kind, raw })
    }
}

/// A recognized drop location, matched against the dragged kind by
/// `ordering::apply_drop`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DropTarget {
    /// Another round's header row; `after` is the pointer's half.
    RoundRow { round_id: i64, after: bool },
    /// A question row inside some round.
    QuestionRow {
        round_id: i64,
        link_id: i64,
        after: bool,
    },
    /// A round's body (not a specific row): append.
    RoundBody { round_id: i64 },
}

/// One drag gesture at a time: idle until pick-up, dragging until the DOM
/// reports a drop or the gesture ends elsewhere (dragend without drop).
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct DragGesture {
    active: Option<DragId>,
}

impl DragGesture {
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<DragId> {
        self.active
    }

    /// Enter `dragging`. Rejected while another gesture is live.
    pub fn pick_up(&mut self, id: DragId) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Gesture ended over a valid target; yields the dragged id.
    pub fn finish(&mut self) -> Option<DragId> {
        self.active.take()
    }

    /// Gesture ended with no valid target (escape, dropped outside).
    pub fn cancel(&mut self) -> Option<DragId> {
        self.active.take()
    }
}

/// Before/after placement by the pointer's vertical midpoint within the
/// hovered row (same rule the DOM drop handlers use on the rect).
pub(crate) fn pointer_in_lower_half(rect_top: f64, rect_height: f64, client_y: f64) -> bool {
    client_y >= rect_top + rect_height / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_id_encode_decode_round_trip() {
        for id in [DragId::round(7), DragId::question(12), DragId::round(0)] {
            let encoded = id.encode();
            assert_eq!(DragId::decode(&encoded), Some(id));
            // Idempotent: re-encoding the decoded value changes nothing.
            assert_eq!(DragId::decode(&encoded).map(|d| d.encode()), Some(encoded));
        }
    }

    #[test]
    fn test_drag_id_encoding_unique_across_kinds() {
        assert_ne!(DragId::round(5).encode(), DragId::question(5).encode());
    }

    #[test]
    fn test_drag_id_decode_rejects_untagged_and_unknown() {
        assert_eq!(DragId::decode("42"), None);
        assert_eq!(DragId::decode("package:42"), None);
        assert_eq!(DragId::decode("round:x"), None);
        assert_eq!(DragId::decode(""), None);
    }

    #[test]
    fn test_raw_id_is_recoverable_for_persistence() {
        let id = DragId::question(9001);
        assert_eq!(DragId::decode(&id.encode()).map(|d| d.raw), Some(9001));
    }

    #[test]
    fn test_gesture_single_active_drag() {
        let mut g = DragGesture::default();
        assert!(!g.is_dragging());
        assert!(g.pick_up(DragId::round(1)));
        // Second pick-up while dragging is rejected.
        assert!(!g.pick_up(DragId::question(2)));
        assert_eq!(g.active(), Some(DragId::round(1)));

        assert_eq!(g.finish(), Some(DragId::round(1)));
        assert!(!g.is_dragging());
    }

    #[test]
    fn test_gesture_cancel_returns_to_idle() {
        let mut g = DragGesture::default();
        assert!(g.pick_up(DragId::question(3)));
        assert_eq!(g.cancel(), Some(DragId::question(3)));
        assert!(g.pick_up(DragId::round(4)));
    }

    #[test]
    fn test_pointer_midpoint_rule() {
        // Row from y=100 to y=140; midpoint 120.
        assert!(!pointer_in_lower_half(100.0, 40.0, 110.0));
        assert!(pointer_in_lower_half(100.0, 40.0, 120.0));
        assert!(pointer_in_lower_half(100.0, 40.0, 135.0));
    }
}

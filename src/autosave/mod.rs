//! Auto-save channels and the pending-write buffer.
//!
//! Each mutable entity gets one logical channel; a burst of edits on a
//! channel collapses to the latest payload. The buffer is plain data so the
//! coalescing rules are testable off-wasm; the 1000 ms quiet-period timers
//! that drive `take` live in `PackageSyncController`, which owns one timer
//! handle per channel the same way it owns the snapshot.

use crate::api::SaveOrderRound;
use crate::models::ContentNode;
use std::collections::HashMap;

/// Grouping key deciding which pending write a new edit replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum SaveChannel {
    QuestionContent(i64),
    QuestionAnswer(i64),
    PackageHeader(i64),
    RoundFields(i64),
    /// The full round/question order document for one package.
    PackageOrder(i64),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SavePayload {
    QuestionContent {
        question_id: i64,
        content: Vec<ContentNode>,
    },
    QuestionAnswer {
        question_id: i64,
        answer: String,
    },
    PackageHeader {
        package_id: i64,
        title: String,
        description: String,
        play_date: Option<String>,
    },
    RoundFields {
        round_id: i64,
        name: String,
        description: String,
        question_count: i32,
    },
    PackageOrder {
        package_id: i64,
        rounds: Vec<SaveOrderRound>,
    },
}

#[derive(Clone, Debug)]
struct Pending {
    payload: SavePayload,
    seq: u64,
}

/// Latest-payload-per-channel buffer with sequence bookkeeping.
///
/// `put` hands back a sequence number; a completion path compares it with
/// `is_latest` so a slow write that settles after a newer edit was
/// scheduled cannot clear the newer edit's saving state.
#[derive(Debug, Default)]
pub(crate) struct PendingWrites {
    next_seq: u64,
    pending: HashMap<SaveChannel, Pending>,
    last_scheduled: HashMap<SaveChannel, u64>,
}

impl PendingWrites {
    /// Replace any pending write on `channel` with `payload`.
    pub fn put(&mut self, channel: SaveChannel, payload: SavePayload) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.pending.insert(channel, Pending { payload, seq });
        self.last_scheduled.insert(channel, seq);
        seq
    }

    /// Claim the latest payload for `channel` (the quiet period elapsed).
    pub fn take(&mut self, channel: SaveChannel) -> Option<(SavePayload, u64)> {
        self.pending.remove(&channel).map(|p| (p.payload, p.seq))
    }

    /// Whether `seq` is still the newest write ever scheduled on `channel`.
    pub fn is_latest(&self, channel: SaveChannel, seq: u64) -> bool {
        self.last_scheduled
            .get(&channel)
            .map(|latest| *latest == seq)
            .unwrap_or(true)
    }

    pub fn has_pending(&self, channel: SaveChannel) -> bool {
        self.pending.contains_key(&channel)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer_payload(question_id: i64, answer: &str) -> SavePayload {
        SavePayload::QuestionAnswer {
            question_id,
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_burst_coalesces_to_last_payload() {
        let mut buf = PendingWrites::default();
        let ch = SaveChannel::QuestionAnswer(5);

        for i in 0..10 {
            buf.put(ch, answer_payload(5, &format!("draft {i}")));
        }

        // Exactly one pending write survives, carrying the final payload.
        assert_eq!(buf.pending_count(), 1);
        let (payload, _) = buf.take(ch).expect("one write pending");
        assert_eq!(payload, answer_payload(5, "draft 9"));
        assert!(buf.take(ch).is_none());
    }

    #[test]
    fn test_channels_are_independent() {
        let mut buf = PendingWrites::default();
        let a = SaveChannel::QuestionAnswer(1);
        let b = SaveChannel::PackageOrder(7);

        buf.put(a, answer_payload(1, "a1"));
        buf.put(
            b,
            SavePayload::PackageOrder {
                package_id: 7,
                rounds: vec![],
            },
        );
        buf.put(a, answer_payload(1, "a2"));

        // Replacing channel A never touched channel B.
        assert!(buf.has_pending(b));
        let (payload_a, _) = buf.take(a).expect("A pending");
        assert_eq!(payload_a, answer_payload(1, "a2"));
        assert!(buf.has_pending(b));
    }

    #[test]
    fn test_edit_then_reorder_produces_two_writes() {
        // An answer edit followed inside the quiet period by a drop lands on
        // two distinct channels and both must eventually flush.
        let mut buf = PendingWrites::default();
        let edit = SaveChannel::QuestionAnswer(3);
        let order = SaveChannel::PackageOrder(1);

        buf.put(edit, answer_payload(3, "final answer"));
        buf.put(
            order,
            SavePayload::PackageOrder {
                package_id: 1,
                rounds: vec![],
            },
        );

        assert_eq!(buf.pending_count(), 2);
        assert!(buf.take(edit).is_some());
        assert!(buf.take(order).is_some());
    }

    #[test]
    fn test_is_latest_gates_stale_completions() {
        let mut buf = PendingWrites::default();
        let ch = SaveChannel::QuestionContent(2);

        let first = buf.put(
            ch,
            SavePayload::QuestionContent {
                question_id: 2,
                content: vec![],
            },
        );
        let (_, taken) = buf.take(ch).expect("pending");
        assert_eq!(taken, first);
        assert!(buf.is_latest(ch, first));

        // A newer edit scheduled while the first write is in flight.
        let second = buf.put(
            ch,
            SavePayload::QuestionContent {
                question_id: 2,
                content: vec![],
            },
        );
        assert!(!buf.is_latest(ch, first));
        assert!(buf.is_latest(ch, second));
    }

    #[test]
    fn test_unknown_channel_counts_as_latest() {
        let buf = PendingWrites::default();
        assert!(buf.is_latest(SaveChannel::RoundFields(1), 1));
    }
}

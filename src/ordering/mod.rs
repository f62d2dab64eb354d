//! Pure reorder transforms over the package tree.
//!
//! Nothing in here touches the DOM or the network: the drag wiring in the
//! editor page and the sync controller both call into these functions and
//! persist the result afterwards. Invalid indices are a caller bug, not a
//! runtime condition these functions recover from.

use crate::dnd::{DragId, DragKind, DropTarget};
use crate::models::{Package, Round, RoundQuestion};

/// Entities carrying a persisted position within their sibling list.
pub(crate) trait OrderIndexed {
    fn set_order_index(&mut self, idx: i32);
}

impl OrderIndexed for Round {
    fn set_order_index(&mut self, idx: i32) {
        self.order_index = idx;
    }
}

impl OrderIndexed for RoundQuestion {
    fn set_order_index(&mut self, idx: i32) {
        self.order_index = idx;
    }
}

/// Remove the element at `from` and reinsert it at `to`.
/// `from == to` is the self-drop case and leaves the list untouched.
pub(crate) fn move_within<T>(list: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= list.len() || to >= list.len() {
        return;
    }
    let item = list.remove(from);
    list.insert(to, item);
}

/// Remove the element at `from` in `src` and insert it into `dst`.
/// `to == None` means the element was dropped on the container itself and
/// is appended.
pub(crate) fn move_across<T>(src: &mut Vec<T>, from: usize, dst: &mut Vec<T>, to: Option<usize>) {
    if from >= src.len() {
        return;
    }
    let item = src.remove(from);
    match to {
        Some(idx) if idx <= dst.len() => dst.insert(idx, item),
        _ => dst.push(item),
    }
}

/// Reassign order indices to match list positions: 0-based, contiguous.
/// Must run after every structural change, before persistence.
pub(crate) fn reindex<T: OrderIndexed>(list: &mut [T]) {
    for (idx, item) in list.iter_mut().enumerate() {
        item.set_order_index(idx as i32);
    }
}

/// Reindex the whole tree: the round list and every round's question list.
pub(crate) fn reindex_package(pkg: &mut Package) {
    reindex(&mut pkg.rounds);
    for round in pkg.rounds.iter_mut() {
        reindex(&mut round.round_questions);
    }
}

/// Given an anchor row position and whether the pointer landed in the lower
/// half, compute the insertion index in the pre-removal list, then adjust
/// for the removal of `from`.
fn insertion_index(from: usize, anchor: usize, after: bool) -> usize {
    let mut pos = if after { anchor + 1 } else { anchor };
    if from < pos {
        pos -= 1;
    }
    pos
}

fn round_position(pkg: &Package, round_id: i64) -> Option<usize> {
    pkg.rounds.iter().position(|r| r.id == round_id)
}

/// Locate a round-question link: (round list index, question list index).
fn link_position(pkg: &Package, link_id: i64) -> Option<(usize, usize)> {
    for (ri, round) in pkg.rounds.iter().enumerate() {
        if let Some(qi) = round.round_questions.iter().position(|rq| rq.id == link_id) {
            return Some((ri, qi));
        }
    }
    None
}

/// Apply one drop gesture to the tree and reindex it.
///
/// Returns `false` (tree untouched) for self-drops and for target shapes
/// that don't apply to the dragged kind: the drag layer hands every hover
/// through here, so "nothing to do" is an expected answer, not an error.
pub(crate) fn apply_drop(pkg: &mut Package, dragged: DragId, target: DropTarget) -> bool {
    let changed = match (dragged.kind, target) {
        (DragKind::Round, DropTarget::RoundRow { round_id, after }) => {
            move_round(pkg, dragged.raw, round_id, after)
        }
        (
            DragKind::Question,
            DropTarget::QuestionRow {
                round_id,
                link_id,
                after,
            },
        ) => move_question_to_row(pkg, dragged.raw, round_id, link_id, after),
        (DragKind::Question, DropTarget::RoundBody { round_id }) => {
            append_question_to_round(pkg, dragged.raw, round_id)
        }
        // Rounds can't land inside a question list and questions can't
        // become rounds; ignore.
        _ => false,
    };

    if changed {
        reindex_package(pkg);
    }
    changed
}

fn move_round(pkg: &mut Package, dragged_round_id: i64, target_round_id: i64, after: bool) -> bool {
    if dragged_round_id == target_round_id {
        return false;
    }
    let Some(from) = round_position(pkg, dragged_round_id) else {
        return false;
    };
    let Some(anchor) = round_position(pkg, target_round_id) else {
        return false;
    };

    let to = insertion_index(from, anchor, after);
    if from == to {
        return false;
    }
    move_within(&mut pkg.rounds, from, to);
    true
}

fn move_question_to_row(
    pkg: &mut Package,
    dragged_link_id: i64,
    target_round_id: i64,
    target_link_id: i64,
    after: bool,
) -> bool {
    if dragged_link_id == target_link_id {
        return false;
    }
    let Some((src_ri, from)) = link_position(pkg, dragged_link_id) else {
        return false;
    };
    let Some(dst_ri) = round_position(pkg, target_round_id) else {
        return false;
    };
    let Some(anchor) = pkg.rounds[dst_ri]
        .round_questions
        .iter()
        .position(|rq| rq.id == target_link_id)
    else {
        return false;
    };

    if src_ri == dst_ri {
        let to = insertion_index(from, anchor, after);
        if from == to {
            return false;
        }
        move_within(&mut pkg.rounds[src_ri].round_questions, from, to);
        return true;
    }

    // Cross-round move: no removal adjustment on the destination side.
    let to = if after { anchor + 1 } else { anchor };
    let (src_half, dst_half) = split_rounds(pkg, src_ri, dst_ri);
    move_across(
        &mut src_half.round_questions,
        from,
        &mut dst_half.round_questions,
        Some(to),
    );
    retarget_links(dst_half);
    true
}

fn append_question_to_round(pkg: &mut Package, dragged_link_id: i64, target_round_id: i64) -> bool {
    let Some((src_ri, from)) = link_position(pkg, dragged_link_id) else {
        return false;
    };
    let Some(dst_ri) = round_position(pkg, target_round_id) else {
        return false;
    };

    if src_ri == dst_ri {
        let last = pkg.rounds[src_ri].round_questions.len().saturating_sub(1);
        if from == last {
            return false;
        }
        move_within(&mut pkg.rounds[src_ri].round_questions, from, last);
        return true;
    }

    let (src_half, dst_half) = split_rounds(pkg, src_ri, dst_ri);
    move_across(
        &mut src_half.round_questions,
        from,
        &mut dst_half.round_questions,
        None,
    );
    retarget_links(dst_half);
    true
}

/// Two disjoint `&mut Round` borrows out of the same round list.
fn split_rounds(pkg: &mut Package, a: usize, b: usize) -> (&mut Round, &mut Round) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = pkg.rounds.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = pkg.rounds.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// After a cross-round move the link still carries its old round id.
fn retarget_links(round: &mut Round) {
    let rid = round.id;
    for rq in round.round_questions.iter_mut() {
        rq.round_id = rid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;

    fn question(id: i64) -> Question {
        Question {
            id,
            title: format!("Q{id}"),
            content: vec![],
            answer: String::new(),
            topic: String::new(),
            difficulty: 3,
            is_generated: false,
            fact_checked: false,
            author: None,
        }
    }

    fn link(id: i64, round_id: i64, order_index: i32) -> RoundQuestion {
        RoundQuestion {
            id,
            round_id,
            question_id: id + 1000,
            order_index,
            question: question(id + 1000),
        }
    }

    fn round(id: i64, order_index: i32, links: Vec<RoundQuestion>) -> Round {
        Round {
            id,
            package_id: 1,
            name: format!("Round {id}"),
            description: String::new(),
            question_count: links.len() as i32,
            order_index,
            round_questions: links,
        }
    }

    fn package() -> Package {
        Package {
            id: 1,
            title: "Pkg".to_string(),
            description: String::new(),
            play_date: None,
            author: None,
            rounds: vec![
                round(10, 0, vec![link(100, 10, 0), link(101, 10, 1), link(102, 10, 2)]),
                round(11, 1, vec![link(110, 11, 0)]),
                round(12, 2, vec![]),
            ],
        }
    }

    fn link_ids(pkg: &Package, ri: usize) -> Vec<i64> {
        pkg.rounds[ri].round_questions.iter().map(|rq| rq.id).collect()
    }

    fn assert_contiguous(pkg: &Package) {
        for (i, r) in pkg.rounds.iter().enumerate() {
            assert_eq!(r.order_index, i as i32, "round gap at {i}");
            for (j, rq) in r.round_questions.iter().enumerate() {
                assert_eq!(rq.order_index, j as i32, "question gap at {i}/{j}");
            }
        }
    }

    #[test]
    fn test_move_within_shifts_intervening_elements() {
        let mut xs = vec![1, 2, 3, 4];
        move_within(&mut xs, 3, 0);
        assert_eq!(xs, vec![4, 1, 2, 3]);
        move_within(&mut xs, 0, 2);
        assert_eq!(xs, vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_move_within_self_drop_is_identity() {
        for i in 0..4 {
            let mut xs = vec![10, 20, 30, 40];
            move_within(&mut xs, i, i);
            assert_eq!(xs, vec![10, 20, 30, 40]);
        }
    }

    #[test]
    fn test_move_across_conserves_elements() {
        let mut a = vec![1, 2, 3];
        let mut b = vec![9];
        move_across(&mut a, 1, &mut b, Some(0));
        assert_eq!(a, vec![1, 3]);
        assert_eq!(b, vec![2, 9]);
        assert_eq!(a.len() + b.len(), 4);
    }

    #[test]
    fn test_move_across_without_index_appends() {
        let mut a = vec![1, 2];
        let mut b = vec![9];
        move_across(&mut a, 0, &mut b, None);
        assert_eq!(b, vec![9, 1]);
    }

    #[test]
    fn test_reindex_assigns_contiguous_indices() {
        let mut links = vec![link(5, 1, 7), link(6, 1, 2), link(7, 1, 2)];
        reindex(&mut links);
        let idx: Vec<i32> = links.iter().map(|l| l.order_index).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn test_reorder_within_round_end_to_end() {
        // [Q1, Q2, Q3], drag the last one before the first.
        let mut pkg = package();
        let dragged = DragId::question(102);
        let target = DropTarget::QuestionRow {
            round_id: 10,
            link_id: 100,
            after: false,
        };
        assert!(apply_drop(&mut pkg, dragged, target));
        assert_eq!(link_ids(&pkg, 0), vec![102, 100, 101]);
        assert_contiguous(&pkg);
    }

    #[test]
    fn test_move_across_rounds_via_row() {
        let mut pkg = package();
        let dragged = DragId::question(101);
        let target = DropTarget::QuestionRow {
            round_id: 11,
            link_id: 110,
            after: true,
        };
        assert!(apply_drop(&mut pkg, dragged, target));
        assert_eq!(link_ids(&pkg, 0), vec![100, 102]);
        assert_eq!(link_ids(&pkg, 1), vec![110, 101]);
        // Link rows follow the new round.
        assert!(pkg.rounds[1].round_questions.iter().all(|rq| rq.round_id == 11));
        assert_contiguous(&pkg);
    }

    #[test]
    fn test_drop_on_round_body_appends() {
        // Round A [Q1, Q2], Round B [Q3]: drop Q2 on B's body.
        let mut pkg = package();
        pkg.rounds[0].round_questions.truncate(2);
        let dragged = DragId::question(101);
        let target = DropTarget::RoundBody { round_id: 11 };
        assert!(apply_drop(&mut pkg, dragged, target));
        assert_eq!(link_ids(&pkg, 0), vec![100]);
        assert_eq!(link_ids(&pkg, 1), vec![110, 101]);
        assert_contiguous(&pkg);
    }

    #[test]
    fn test_drop_into_empty_round_is_valid() {
        let mut pkg = package();
        let dragged = DragId::question(100);
        let target = DropTarget::RoundBody { round_id: 12 };
        assert!(apply_drop(&mut pkg, dragged, target));
        assert_eq!(link_ids(&pkg, 2), vec![100]);
        assert_contiguous(&pkg);
    }

    #[test]
    fn test_emptying_a_round_is_valid() {
        let mut pkg = package();
        let dragged = DragId::question(110);
        let target = DropTarget::RoundBody { round_id: 12 };
        assert!(apply_drop(&mut pkg, dragged, target));
        assert!(pkg.rounds[1].round_questions.is_empty());
        assert_contiguous(&pkg);
    }

    #[test]
    fn test_round_reorder() {
        let mut pkg = package();
        let dragged = DragId::round(12);
        let target = DropTarget::RoundRow {
            round_id: 10,
            after: false,
        };
        assert!(apply_drop(&mut pkg, dragged, target));
        let ids: Vec<i64> = pkg.rounds.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![12, 10, 11]);
        assert_contiguous(&pkg);
    }

    #[test]
    fn test_self_drop_is_noop() {
        let mut pkg = package();
        let before = pkg.clone();
        assert!(!apply_drop(
            &mut pkg,
            DragId::question(101),
            DropTarget::QuestionRow {
                round_id: 10,
                link_id: 101,
                after: true,
            },
        ));
        assert_eq!(pkg, before);
    }

    #[test]
    fn test_mismatched_kind_and_target_is_noop() {
        let mut pkg = package();
        let before = pkg.clone();
        assert!(!apply_drop(
            &mut pkg,
            DragId::round(10),
            DropTarget::QuestionRow {
                round_id: 11,
                link_id: 110,
                after: false,
            },
        ));
        assert_eq!(pkg, before);
    }

    #[test]
    fn test_append_to_own_round_when_already_last_is_noop() {
        let mut pkg = package();
        let before = pkg.clone();
        assert!(!apply_drop(
            &mut pkg,
            DragId::question(102),
            DropTarget::RoundBody { round_id: 10 },
        ));
        assert_eq!(pkg, before);
    }
}

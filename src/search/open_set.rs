use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Open list shared by every search in the crate.
///
/// Nodes are ranked by their heuristic alone (squared plan distance to the
/// goal), not by `g + h`. Equal heuristics are served in insertion order.
#[derive(Debug)]
pub(crate) struct OpenSet<N: Ord> {
    heap: BinaryHeap<Reverse<(i64, u64, N)>>,
    next_seq: u64,
}

impl<N: Ord + Copy> OpenSet<N> {
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub(crate) fn push(&mut self, node: N, heuristic: i64) {
        self.heap.push(Reverse((heuristic, self.next_seq, node)));
        self.next_seq += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<N> {
        self.heap.pop().map(|Reverse((_, _, node))| node)
    }
}

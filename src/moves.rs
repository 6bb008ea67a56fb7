//! # Move Tables and Move Generator
//!
//! Static move tables keyed by blank grid location, and the `expand`
//! operation that produces a puzzle's one-move successors, each carrying
//! a mask bit set for the move that would undo it.

use std::sync::OnceLock;

use crate::codec::{pack_masked, unpack, CompactPuzzle, MOVE_MASK_BITS};
use crate::puzzle::{GRID_WIDTH, TILE_COUNT};

/// Up to 4 orthogonal neighbors per grid location; built once and shared
/// read-only afterwards, so no locking is needed once `MOVE_TABLE` is set.
static MOVE_TABLE: OnceLock<Vec<Vec<u8>>> = OnceLock::new();

fn move_table() -> &'static Vec<Vec<u8>> {
    MOVE_TABLE.get_or_init(|| {
        let mut table = Vec::with_capacity(TILE_COUNT);
        for loc in 0..TILE_COUNT {
            let row = loc / GRID_WIDTH;
            let col = loc % GRID_WIDTH;
            let mut neighbors = Vec::with_capacity(4);
            if row > 0 {
                neighbors.push((loc - GRID_WIDTH) as u8);
            }
            if col > 0 {
                neighbors.push((loc - 1) as u8);
            }
            if col + 1 < GRID_WIDTH {
                neighbors.push((loc + 1) as u8);
            }
            if row + 1 < GRID_WIDTH {
                neighbors.push((loc + GRID_WIDTH) as u8);
            }
            debug_assert!(neighbors.len() <= MOVE_MASK_BITS);
            table.push(neighbors);
        }
        table
    })
}

/// The grid locations reachable in one move from `loc`, in the fixed order
/// used to assign move-mask bit indices.
pub fn get_moves(loc: usize) -> &'static [u8] {
    &move_table()[loc]
}

/// Number of legal moves from `loc` (2 at a corner, 3 on an edge, 4 in the
/// interior).
pub fn move_count(loc: usize) -> usize {
    get_moves(loc).len()
}

/// Produces the one-move successors of `record`, each carrying a mask bit
/// set for the move that would undo it.
pub fn expand(record: &CompactPuzzle) -> Vec<CompactPuzzle> {
    let mut p = unpack(record);
    let parent_mask = record.mask();
    let saved_zloc = p.zloc as usize;
    let moves = get_moves(saved_zloc);

    let mut children = Vec::with_capacity(moves.len());
    for (i, &to) in moves.iter().enumerate() {
        if parent_mask & (1 << i) != 0 {
            continue;
        }

        p.mv(to as usize);

        let to_moves = get_moves(to as usize);
        let child_mask = match to_moves.iter().position(|&back| back as usize == saved_zloc) {
            Some(j) => 1u8 << j,
            None => 0,
        };
        children.push(pack_masked(&p, child_mask));

        p.mv(saved_zloc);
    }

    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::pack;
    use crate::puzzle::Puzzle;

    #[test]
    fn corner_has_two_moves() {
        assert_eq!(move_count(0), 2);
        assert_eq!(move_count(4), 2);
        assert_eq!(move_count(20), 2);
        assert_eq!(move_count(24), 2);
    }

    #[test]
    fn interior_has_four_moves() {
        assert_eq!(move_count(12), 4);
    }

    #[test]
    fn edge_has_three_moves() {
        assert_eq!(move_count(1), 3);
        assert_eq!(move_count(5), 3);
    }

    #[test]
    fn solved_puzzle_expands_to_two_children() {
        let cp = pack(&Puzzle::solved());
        let children = expand(&cp);
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn child_mask_blocks_the_reverse_move() {
        let cp = pack(&Puzzle::solved());
        for child in expand(&cp) {
            let p = unpack(&child);
            // applying any remaining legal move from the child must not
            // reproduce the solved puzzle's tile vector (the reverse is
            // masked out)
            let moves = get_moves(p.zloc as usize);
            for (i, &to) in moves.iter().enumerate() {
                if child.mask() & (1 << i) != 0 {
                    let mut undone = p.clone();
                    undone.mv(to as usize);
                    assert_ne!(undone, Puzzle::solved(), "reverse move was not masked");
                }
            }
        }
    }

    #[test]
    fn move_reversibility() {
        let mut p = Puzzle::solved();
        let start = p.clone();
        let to = get_moves(p.zloc as usize)[0] as usize;
        let from = p.zloc as usize;
        p.mv(to);
        p.mv(from);
        assert_eq!(p, start);
    }
}

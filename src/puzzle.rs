//! # Puzzle Model
//!
//! The unpacked 24-puzzle: a permutation of 25 tiles (0 is the blank) on a
//! 5x5 grid. Two views of the same permutation are kept in lock step:
//! `grid[loc]` gives the tile occupying a grid location, `tiles[tile]` gives
//! the grid location of a tile. The radix sorter keys on the latter.

pub const GRID_WIDTH: usize = 5;
pub const TILE_COUNT: usize = 25;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Puzzle {
    /// `grid[loc]` is the tile number occupying grid location `loc`.
    pub grid: [u8; TILE_COUNT],
    /// `tiles[tile]` is the grid location of the given tile; this is the
    /// vector the radix sorter sorts on.
    pub tiles: [u8; TILE_COUNT],
    /// Grid location of the blank (tile 0); always equal to `tiles[0]`.
    pub zloc: u8,
}

impl Puzzle {
    /// The solved configuration: tile `k` at grid location `k`, blank at 0.
    pub fn solved() -> Puzzle {
        let mut grid = [0u8; TILE_COUNT];
        let mut tiles = [0u8; TILE_COUNT];
        for k in 0..TILE_COUNT {
            grid[k] = k as u8;
            tiles[k] = k as u8;
        }
        Puzzle { grid, tiles, zloc: 0 }
    }

    /// Builds a puzzle from a tile-to-location vector (`tiles[tile] = loc`).
    /// Asserts the vector is a permutation of `0..TILE_COUNT`, as every
    /// caller in this crate only ever constructs puzzles from pack/unpack
    /// or from move application, both of which preserve that invariant.
    pub fn from_tiles(tiles: [u8; TILE_COUNT]) -> Puzzle {
        let mut grid = [u8::MAX; TILE_COUNT];
        for (tile, &loc) in tiles.iter().enumerate() {
            debug_assert!((loc as usize) < TILE_COUNT, "tile location out of range");
            debug_assert_eq!(grid[loc as usize], u8::MAX, "duplicate tile location");
            grid[loc as usize] = tile as u8;
        }
        Puzzle { grid, tiles, zloc: tiles[0] }
    }

    /// Swaps the blank with the tile at grid location `to`, which must be
    /// adjacent to `zloc` (callers only ever pass values from `get_moves`).
    /// `mv` is its own inverse: applying it twice with the two endpoints
    /// swapped restores the original puzzle, which is what lets the move
    /// generator apply-then-undo a move cheaply.
    pub fn mv(&mut self, to: usize) {
        let from = self.zloc as usize;
        let t = self.grid[to];
        self.grid[from] = t;
        self.tiles[t as usize] = from as u8;
        self.grid[to] = 0;
        self.tiles[0] = to as u8;
        self.zloc = to as u8;
    }

    /// Permutation parity of the configuration (true = even / reachable).
    /// Only used by debug assertions and tests, never on the expansion
    /// hot path.
    pub fn is_even_parity(&self) -> bool {
        let mut seen = [false; TILE_COUNT];
        let mut swaps = 0u32;
        for start in 0..TILE_COUNT {
            if seen[start] || self.tiles[start] as usize == start {
                seen[start] = true;
                continue;
            }
            let mut len = 0u32;
            let mut i = start;
            while !seen[i] {
                seen[i] = true;
                i = self.tiles[i] as usize;
                len += 1;
            }
            swaps += len - 1;
        }
        swaps % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solved_puzzle_is_identity() {
        let p = Puzzle::solved();
        for k in 0..TILE_COUNT {
            assert_eq!(p.tiles[k], k as u8);
            assert_eq!(p.grid[k], k as u8);
        }
        assert_eq!(p.zloc, 0);
    }

    #[test]
    fn solved_puzzle_has_even_parity() {
        assert!(Puzzle::solved().is_even_parity());
    }

    #[test]
    fn mv_is_its_own_inverse() {
        let mut p = Puzzle::solved();
        let original = p.clone();
        let zloc = p.zloc as usize;
        // blank at grid location 0 is adjacent to locations 1 and 5
        p.mv(1);
        assert_ne!(p, original);
        p.mv(zloc);
        assert_eq!(p, original);
    }

    #[test]
    fn mv_preserves_parity() {
        let mut p = Puzzle::solved();
        assert!(p.is_even_parity());
        p.mv(1);
        // a single adjacent-tile swap is a transposition: flips parity
        assert!(!p.is_even_parity());
        p.mv(0);
        assert!(p.is_even_parity());
    }
}

//! Board module - owns the gem grid and runs the match engine
//!
//! The board is a 5x6 grid where each cell holds an optional gem. Cells are only
//! transiently empty while a clear is being resolved; every public operation that
//! removes gems refills the grid before returning.
//! Uses a flat array, row-major (row * COLS + col). Row 0 is the top row, gravity
//! pulls towards higher row numbers.

use arrayvec::ArrayVec;
use log::warn;

use crate::gem::Gem;
use crate::rng::SimpleRng;
use crate::types::{
    Attribute, Coord, ATTRIBUTE_COUNT, BOARD_CELLS, BOARD_COLS, BOARD_ROWS, MIN_MATCH_LEN,
};

/// Deduplicated set of matched coordinates, row-major order
pub type MatchSet = ArrayVec<Coord, BOARD_CELLS>;

/// Outcome of a clear + refill pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearReport {
    /// Gems actually removed
    pub total: u32,
    /// Removed gems per attribute, indexed by [`Attribute::index`]
    pub by_attribute: [u32; ATTRIBUTE_COUNT],
    /// Coordinates that were out of range and skipped
    pub ignored: u32,
}

/// The gem grid - 5 rows x 6 columns
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    cells: [Option<Gem>; BOARD_CELLS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|_| None),
        }
    }

    /// Build a full board from an attribute grid (row-major, row 0 on top)
    pub fn from_attributes(grid: [[Attribute; BOARD_COLS]; BOARD_ROWS]) -> Self {
        let mut board = Self::new();
        for (r, row) in grid.iter().enumerate() {
            for (c, &attr) in row.iter().enumerate() {
                board.cells[r * BOARD_COLS + c] = Some(Gem::new(attr, r as u8, c as u8));
            }
        }
        board
    }

    #[inline(always)]
    fn index(row: usize, col: usize) -> usize {
        row * BOARD_COLS + col
    }

    pub fn rows(&self) -> usize {
        BOARD_ROWS
    }

    pub fn cols(&self) -> usize {
        BOARD_COLS
    }

    /// Gem at `coord`, None when empty or out of bounds
    pub fn get(&self, coord: Coord) -> Option<&Gem> {
        coord.index().and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn attribute_at(&self, coord: Coord) -> Option<Attribute> {
        self.get(coord).map(Gem::attribute)
    }

    /// Every slot holds a gem
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterate over all gems, row-major
    pub fn gems(&self) -> impl Iterator<Item = &Gem> {
        self.cells.iter().flatten()
    }

    /// Drop every gem
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Fill every cell with a uniformly random gem, discarding whatever was there.
    ///
    /// No attempt is made to avoid initial matches.
    pub fn generate_initial_gems(&mut self, rng: &mut SimpleRng) {
        for r in 0..BOARD_ROWS {
            for c in 0..BOARD_COLS {
                let attr = rng.next_attribute();
                self.cells[Self::index(r, c)] = Some(Gem::new(attr, r as u8, c as u8));
            }
        }
    }

    /// Collect every cell that belongs to a horizontal or vertical run of at least
    /// three same-attribute gems. Runs are taken at full length and each cell is
    /// reported once even when it is part of both a row run and a column run.
    pub fn find_all_matches(&self) -> MatchSet {
        let mut flags = [false; BOARD_CELLS];

        // Horizontal runs
        for r in 0..BOARD_ROWS {
            self.flag_runs(&mut flags, BOARD_COLS, |i| Self::index(r, i));
        }

        // Vertical runs
        for c in 0..BOARD_COLS {
            self.flag_runs(&mut flags, BOARD_ROWS, |i| Self::index(i, c));
        }

        let mut matches = MatchSet::new();
        for (idx, _) in flags.iter().enumerate().filter(|(_, &f)| f) {
            matches.push(Coord::new(
                (idx / BOARD_COLS) as u8,
                (idx % BOARD_COLS) as u8,
            ));
        }
        matches
    }

    /// Flag maximal runs along one line of `len` cells; `at` maps a position on the
    /// line to a flat cell index.
    fn flag_runs(&self, flags: &mut [bool; BOARD_CELLS], len: usize, at: impl Fn(usize) -> usize) {
        let attr_at = |i: usize| self.cells[at(i)].as_ref().map(Gem::attribute);

        let mut start = 0;
        while start < len {
            let Some(attr) = attr_at(start) else {
                start += 1;
                continue;
            };

            let mut end = start + 1;
            while end < len && attr_at(end) == Some(attr) {
                end += 1;
            }

            if end - start >= MIN_MATCH_LEN {
                for i in start..end {
                    flags[at(i)] = true;
                }
            }
            start = end;
        }
    }

    /// Put the gems at `coords` into the terminal `Clearing` state.
    /// Returns how many gems were marked.
    pub fn mark_for_clearing(&mut self, coords: &[Coord]) -> usize {
        let mut marked = 0;
        for coord in coords {
            if let Some(gem) = coord.index().and_then(|idx| self.cells[idx].as_mut()) {
                if !gem.is_marked_for_clearing() {
                    gem.mark_for_clearing();
                    marked += 1;
                }
            }
        }
        marked
    }

    /// Swap two gems, keeping each gem's coordinates equal to its slot.
    ///
    /// Returns false when either coordinate is out of range, empty, clearing, or
    /// both coordinates are the same cell.
    pub fn swap_gems(&mut self, a: Coord, b: Coord) -> bool {
        let (Some(ia), Some(ib)) = (a.index(), b.index()) else {
            return false;
        };
        if ia == ib || self.cells[ia].is_none() || self.cells[ib].is_none() {
            return false;
        }

        let (Some(mut ga), Some(mut gb)) = (self.cells[ia].take(), self.cells[ib].take()) else {
            return false;
        };
        if !ga.swap_with(&mut gb) {
            self.cells[ia] = Some(ga);
            self.cells[ib] = Some(gb);
            return false;
        }

        self.cells[ia] = Some(gb);
        self.cells[ib] = Some(ga);
        true
    }

    /// Remove the gems at `coords`, tally them per attribute, then apply gravity and
    /// refill. Out-of-range coordinates are skipped; duplicates count once.
    pub fn clear_and_refill(&mut self, coords: &[Coord], rng: &mut SimpleRng) -> ClearReport {
        let mut report = ClearReport::default();

        for coord in coords {
            let Some(idx) = coord.index() else {
                warn!(
                    "clear_and_refill: ignoring out-of-range coordinate ({}, {})",
                    coord.row, coord.col
                );
                report.ignored += 1;
                continue;
            };
            if let Some(gem) = self.cells[idx].take() {
                report.total += 1;
                report.by_attribute[gem.attribute().index()] += 1;
            }
        }

        self.apply_gravity_and_refill(rng);
        report
    }

    /// Compact each column downward (survivors keep their relative order), then fill
    /// the vacated top cells with fresh random gems. Columns never mix.
    /// Returns the number of gems spawned.
    pub fn apply_gravity_and_refill(&mut self, rng: &mut SimpleRng) -> u32 {
        let mut spawned = 0u32;

        for c in 0..BOARD_COLS {
            // Scan from bottom to top, writing survivors to the lowest free row
            let mut write_row = BOARD_ROWS;
            for r in (0..BOARD_ROWS).rev() {
                if let Some(mut gem) = self.cells[Self::index(r, c)].take() {
                    write_row -= 1;
                    gem.drop_to(write_row as u8);
                    self.cells[Self::index(write_row, c)] = Some(gem);
                }
            }

            // Rows 0..write_row are now empty
            let empty = write_row;
            for r in (0..empty).rev() {
                let attr = rng.next_attribute();
                self.cells[Self::index(r, c)] =
                    Some(Gem::spawn_above(attr, r as u8, c as u8, empty as u8));
                spawned += 1;
            }
        }

        spawned
    }

    /// Advance every gem animation by one tick. Returns true while anything moves.
    pub fn tick_animations(&mut self) -> bool {
        let mut moving = false;
        for gem in self.cells.iter_mut().flatten() {
            moving |= gem.update_animation();
        }
        moving
    }

    /// No gem is swapping or falling
    pub fn is_settled(&self) -> bool {
        self.gems().all(|g| !g.state().is_moving())
    }

    /// Write the attribute grid: 0 = empty, 1..=5 = attribute index + 1
    pub fn write_u8_grid(&self, out: &mut [[u8; BOARD_COLS]; BOARD_ROWS]) {
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.cells[Self::index(r, c)]
                    .as_ref()
                    .map(|g| g.attribute().index() as u8 + 1)
                    .unwrap_or(0);
            }
        }
    }

    /// Remove a single gem (used by tests to build partial boards)
    #[cfg(test)]
    pub(crate) fn take(&mut self, coord: Coord) -> Option<Gem> {
        coord.index().and_then(|idx| self.cells[idx].take())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Attribute::{Dark as D, Earth as E, Fire as F, Light as L, Water as W};

    /// A board with no runs anywhere (checkerboard of 5 attributes)
    fn quiet_grid() -> [[Attribute; BOARD_COLS]; BOARD_ROWS] {
        [
            [W, F, E, L, D, W],
            [F, E, L, D, W, F],
            [E, L, D, W, F, E],
            [L, D, W, F, E, L],
            [D, W, F, E, L, D],
        ]
    }

    #[test]
    fn test_quiet_board_has_no_matches() {
        let board = Board::from_attributes(quiet_grid());
        assert!(board.find_all_matches().is_empty());
        assert!(board.is_full());
    }

    #[test]
    fn test_full_row_reports_all_six() {
        let mut grid = quiet_grid();
        grid[2] = [D; BOARD_COLS];
        let board = Board::from_attributes(grid);
        let matches = board.find_all_matches();
        assert_eq!(matches.len(), 6);
        assert!(matches.iter().all(|c| c.row == 2));
    }

    #[test]
    fn test_cross_shape_deduplicates() {
        let mut grid = quiet_grid();
        // Horizontal run on row 2, cols 1..=3; vertical run on col 2, rows 0..=4
        for c in 1..=3 {
            grid[2][c] = L;
        }
        for r in 0..BOARD_ROWS {
            grid[r][2] = L;
        }
        let board = Board::from_attributes(grid);
        let matches = board.find_all_matches();
        // 5 in the column + 2 extra in the row
        assert_eq!(matches.len(), 7);
        let mut sorted = matches.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 7);
    }

    #[test]
    fn test_empty_cells_break_runs() {
        let mut grid = quiet_grid();
        grid[0] = [F, F, F, F, W, E];
        let mut board = Board::from_attributes(grid);
        board.take(Coord::new(0, 1));
        // F _ F F is no longer a run of three
        assert!(board.find_all_matches().is_empty());
    }

    #[test]
    fn test_gravity_compacts_and_refills_column() {
        let mut board = Board::from_attributes(quiet_grid());
        let mut rng = SimpleRng::new(9);

        // Column 0 top to bottom: W F E L D. Remove F (row 1) and L (row 3)
        let report = board.clear_and_refill(&[Coord::new(1, 0), Coord::new(3, 0)], &mut rng);
        assert_eq!(report.total, 2);
        assert_eq!(report.by_attribute[F.index()], 1);
        assert_eq!(report.by_attribute[L.index()], 1);
        assert!(board.is_full());

        // Survivors W E D keep order and sit at the bottom
        assert_eq!(board.attribute_at(Coord::new(2, 0)), Some(W));
        assert_eq!(board.attribute_at(Coord::new(3, 0)), Some(E));
        assert_eq!(board.attribute_at(Coord::new(4, 0)), Some(D));

        // Other columns untouched
        for r in 0..BOARD_ROWS {
            for c in 1..BOARD_COLS {
                let coord = Coord::new(r as u8, c as u8);
                assert_eq!(board.attribute_at(coord), Some(quiet_grid()[r][c]));
            }
        }
    }

    #[test]
    fn test_clear_ignores_out_of_range_and_duplicates() {
        let mut board = Board::from_attributes(quiet_grid());
        let mut rng = SimpleRng::new(3);
        let report = board.clear_and_refill(
            &[Coord::new(0, 0), Coord::new(0, 0), Coord::new(9, 9)],
            &mut rng,
        );
        assert_eq!(report.total, 1);
        assert_eq!(report.ignored, 1);
        assert!(board.is_full());
    }

    #[test]
    fn test_gem_coordinates_match_slots_after_refill() {
        let mut board = Board::new();
        let mut rng = SimpleRng::new(77);
        board.generate_initial_gems(&mut rng);
        let matches = board.find_all_matches();
        board.clear_and_refill(&matches, &mut rng);
        for r in 0..BOARD_ROWS {
            for c in 0..BOARD_COLS {
                let gem = board.get(Coord::new(r as u8, c as u8)).unwrap();
                assert_eq!((gem.row() as usize, gem.col() as usize), (r, c));
            }
        }
    }

    #[test]
    fn test_refill_animation_settles() {
        let mut board = Board::from_attributes(quiet_grid());
        let mut rng = SimpleRng::new(5);
        board.clear_and_refill(&[Coord::new(4, 4), Coord::new(3, 4)], &mut rng);
        assert!(!board.is_settled());

        let mut ticks = 0;
        while board.tick_animations() {
            ticks += 1;
            assert!(ticks < 100);
        }
        assert!(board.is_settled());
    }

    #[test]
    fn test_swap_keeps_slot_invariant() {
        let mut board = Board::from_attributes(quiet_grid());
        assert!(board.swap_gems(Coord::new(0, 0), Coord::new(0, 1)));
        assert_eq!(board.attribute_at(Coord::new(0, 0)), Some(F));
        assert_eq!(board.attribute_at(Coord::new(0, 1)), Some(W));
        let gem = board.get(Coord::new(0, 1)).unwrap();
        assert_eq!((gem.row(), gem.col()), (0, 1));

        assert!(!board.swap_gems(Coord::new(0, 0), Coord::new(0, 0)));
        assert!(!board.swap_gems(Coord::new(0, 0), Coord::new(7, 0)));
    }

    #[test]
    fn test_write_u8_grid() {
        let board = Board::from_attributes(quiet_grid());
        let mut grid = [[0u8; BOARD_COLS]; BOARD_ROWS];
        board.write_u8_grid(&mut grid);
        assert_eq!(grid[0], [1, 2, 3, 4, 5, 1]);
    }
}

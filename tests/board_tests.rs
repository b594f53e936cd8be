//! Board integration tests through the facade crate

use gem_battle::core::{Board, SimpleRng};
use gem_battle::types::{Attribute, Coord, GemState, BOARD_COLS, BOARD_ROWS};

use Attribute::*;

/// A grid without any run of three
fn matchless() -> [[Attribute; BOARD_COLS]; BOARD_ROWS] {
    let mut grid = [[Water; BOARD_COLS]; BOARD_ROWS];
    for (r, row) in grid.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = Attribute::from_index(((r * 2 + c) % 5) as u32);
        }
    }
    grid
}

fn attrs(board: &Board) -> [[Option<Attribute>; BOARD_COLS]; BOARD_ROWS] {
    let mut out = [[None; BOARD_COLS]; BOARD_ROWS];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = board.attribute_at(Coord::new(r as u8, c as u8));
        }
    }
    out
}

fn assert_grid_invariant(board: &Board) {
    for r in 0..BOARD_ROWS {
        for c in 0..BOARD_COLS {
            let gem = board
                .get(Coord::new(r as u8, c as u8))
                .expect("board should be full");
            assert_eq!((gem.row() as usize, gem.col() as usize), (r, c));
        }
    }
}

#[test]
fn test_matchless_grid_has_no_matches() {
    let board = Board::from_attributes(matchless());
    assert!(board.find_all_matches().is_empty());
}

#[test]
fn test_row_zero_water_run_scenario() {
    let mut grid = matchless();
    grid[0] = [Water, Water, Water, Fire, Fire, Earth];
    let mut board = Board::from_attributes(grid);
    let before = attrs(&board);

    let matches = board.find_all_matches();
    assert_eq!(
        matches.as_slice(),
        &[Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]
    );

    let mut rng = SimpleRng::new(9);
    let report = board.clear_and_refill(&matches, &mut rng);
    assert_eq!(report.total, 3);
    assert_eq!(report.by_attribute[Water.index()], 3);
    assert!(board.is_full());
    assert_grid_invariant(&board);

    let after = attrs(&board);
    for c in 0..3 {
        // Nothing above row 0, so the rest of the column stays put
        for r in 1..BOARD_ROWS {
            assert_eq!(after[r][c], before[r][c]);
        }
        let fresh = board.get(Coord::new(0, c as u8)).unwrap();
        assert_eq!(fresh.state(), GemState::Falling);
    }
    for c in 3..BOARD_COLS {
        for r in 0..BOARD_ROWS {
            assert_eq!(after[r][c], before[r][c]);
        }
    }
}

#[test]
fn test_clearing_mid_column_shifts_survivors_down() {
    let mut board = Board::from_attributes(matchless());
    let before = attrs(&board);
    let mut rng = SimpleRng::new(3);

    // Two cells removed from column 4: rows 1 and 3
    board.clear_and_refill(&[Coord::new(1, 4), Coord::new(3, 4)], &mut rng);
    let after = attrs(&board);

    assert_eq!(after[4][4], before[4][4]);
    assert_eq!(after[3][4], before[2][4]);
    assert_eq!(after[2][4], before[0][4]);
    assert_grid_invariant(&board);

    // Other columns untouched
    for c in (0..BOARD_COLS).filter(|&c| c != 4) {
        for r in 0..BOARD_ROWS {
            assert_eq!(after[r][c], before[r][c]);
        }
    }
}

#[test]
fn test_out_of_range_coordinates_are_skipped() {
    let mut board = Board::from_attributes(matchless());
    let mut rng = SimpleRng::new(1);
    let report = board.clear_and_refill(
        &[Coord::new(9, 0), Coord::new(0, 0), Coord::new(0, 0)],
        &mut rng,
    );
    assert_eq!(report.total, 1);
    assert_eq!(report.ignored, 1);
    assert!(board.is_full());
}

#[test]
fn test_l_shape_counts_shared_cell_once() {
    let mut grid = matchless();
    grid[2] = [Dark, Dark, Dark, Fire, Water, Earth];
    grid[3][0] = Dark;
    grid[4][0] = Dark;
    let board = Board::from_attributes(grid);
    let matches = board.find_all_matches();
    assert_eq!(matches.len(), 5);
    assert!(matches.contains(&Coord::new(2, 0)));
}

#[test]
fn test_refilled_board_settles() {
    let mut board = Board::from_attributes(matchless());
    let mut rng = SimpleRng::new(5);
    board.clear_and_refill(&[Coord::new(4, 0), Coord::new(4, 1)], &mut rng);
    assert!(!board.is_settled());

    let mut frames = 0;
    while board.tick_animations() {
        frames += 1;
        assert!(frames < 1000, "animations never finished");
    }
    assert!(board.is_settled());
}

#[test]
fn test_same_seed_same_board() {
    let mut a = Board::new();
    let mut b = Board::new();
    a.generate_initial_gems(&mut SimpleRng::new(77));
    b.generate_initial_gems(&mut SimpleRng::new(77));
    assert_eq!(attrs(&a), attrs(&b));
}

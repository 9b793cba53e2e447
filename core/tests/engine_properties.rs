//! Property tests for the slide/merge kernel and the board's terminal test.
//!
//! Invariants covered:
//! - Merging conserves the sum of a line and never grows its tile count.
//! - A move that reports no change leaves grid and score untouched, however
//!   often it is repeated.
//! - On a full board, `can_move` agrees with the set of changing moves.
//! - Spawns only land on cells that were empty.

use game_4096_core::line::shift_and_merge;
use game_4096_core::{Board, BonusKind, Direction, GameConfig};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn tile() -> impl Strategy<Value = u32> {
    prop_oneof![
        3 => Just(0u32),
        6 => (1u32..8).prop_map(|exp| 1 << exp),
        1 => prop::sample::select(BonusKind::ALL.map(BonusKind::value).to_vec()),
    ]
}

fn full_tile() -> impl Strategy<Value = u32> {
    (1u32..6).prop_map(|exp| 1 << exp)
}

fn rows_of(cells: Vec<u32>, size: usize) -> Vec<Vec<u32>> {
    cells.chunks(size).map(<[u32]>::to_vec).collect()
}

fn board(rows: &[Vec<u32>], seed: u64) -> Board {
    Board::from_rows(rows, &GameConfig::default(), SmallRng::seed_from_u64(seed)).unwrap()
}

proptest! {
    #[test]
    fn merge_conserves_line_sum(mut line in prop::collection::vec(tile(), 1..8)) {
        let before_sum: u64 = line.iter().map(|&v| u64::from(v)).sum();
        let before_tiles = line.iter().filter(|&&v| v != 0).count();
        let len = line.len();

        let reward = shift_and_merge(&mut line);

        let after_sum: u64 = line.iter().map(|&v| u64::from(v)).sum();
        let after_tiles = line.iter().filter(|&&v| v != 0).count();
        prop_assert_eq!(line.len(), len);
        prop_assert_eq!(before_sum, after_sum);
        prop_assert!(after_tiles <= before_tiles);
        // each merge removes one tile and scores the doubled value
        prop_assert_eq!(reward == 0, after_tiles == before_tiles);
        // tiles are packed toward index 0
        let first_zero = line.iter().position(|&v| v == 0).unwrap_or(len);
        prop_assert!(line[first_zero..].iter().all(|&v| v == 0));
    }

    #[test]
    fn unchanged_move_is_idempotent(
        cells in prop::collection::vec(tile(), 25),
        dir in 0u8..4,
        seed in any::<u64>(),
    ) {
        let direction = Direction::from_u8(dir).unwrap();
        let mut b = board(&rows_of(cells, 5), seed);
        if !b.would_change(direction) {
            let before = b.cells().to_vec();
            for _ in 0..3 {
                prop_assert!(!b.move_tiles(direction));
            }
            prop_assert_eq!(b.cells(), &before[..]);
            prop_assert_eq!(b.score(), 0);
        }
    }

    #[test]
    fn can_move_matches_legal_moves_on_full_board(
        cells in prop::collection::vec(full_tile(), 16),
    ) {
        let b = board(&rows_of(cells, 4), 0);
        let any_legal = b.legal_moves().iter().any(|&legal| legal);
        prop_assert_eq!(b.can_move(), any_legal);
    }

    #[test]
    fn spawn_lands_on_empty_cell(cells in prop::collection::vec(tile(), 25), seed in any::<u64>()) {
        let mut b = board(&rows_of(cells.clone(), 5), seed);
        let placed = b.spawn_random_tile();
        prop_assert_eq!(placed, cells.contains(&0));

        let mut new_cells = 0;
        for (before, after) in cells.iter().zip(b.cells()) {
            if *before != 0 {
                prop_assert_eq!(before, after);
            } else if *after != 0 {
                prop_assert!(*after == 2 || *after == 4);
                new_cells += 1;
            }
        }
        prop_assert_eq!(new_cells, usize::from(placed));
    }

    #[test]
    fn changed_move_spawns_exactly_once(
        cells in prop::collection::vec(tile(), 25),
        dir in 0u8..4,
        seed in any::<u64>(),
    ) {
        let direction = Direction::from_u8(dir).unwrap();
        let mut b = board(&rows_of(cells.clone(), 5), seed);
        let expected_change = b.would_change(direction);

        let changed = b.move_tiles(direction);
        prop_assert_eq!(changed, expected_change);
        if changed {
            let tiles_before = cells.iter().filter(|&&v| v != 0).count();
            let tiles_after = b.cells().iter().filter(|&&v| v != 0).count();
            prop_assert_eq!(tiles_after, tiles_before - count_merges(&cells, 5, direction) + 1);
            prop_assert_eq!(b.max_tile(), b.cells().iter().copied().max().unwrap_or(0));
        }
    }
}

/// Number of merges a move performs, counted line by line.
fn count_merges(cells: &[u32], size: usize, direction: Direction) -> usize {
    let mut merges = 0;
    for k in 0..size {
        let mut line: Vec<u32> = (0..size)
            .map(|i| {
                let i = if matches!(direction, Direction::Right | Direction::Down) {
                    size - 1 - i
                } else {
                    i
                };
                if matches!(direction, Direction::Left | Direction::Right) {
                    cells[k * size + i]
                } else {
                    cells[i * size + k]
                }
            })
            .collect();
        let before = line.iter().filter(|&&v| v != 0).count();
        shift_and_merge(&mut line);
        merges += before - line.iter().filter(|&&v| v != 0).count();
    }
    merges
}

#[test]
fn checkerboard_blocks_every_direction() {
    let rows: Vec<Vec<u32>> = (0..5)
        .map(|r| (0..5).map(|c| if (r + c) % 2 == 0 { 2 } else { 4 }).collect())
        .collect();
    let mut b = board(&rows, 11);
    assert!(!b.can_move());
    for direction in Direction::ALL {
        assert!(!b.move_tiles(direction));
        assert_eq!(b.rows(), rows);
        assert_eq!(b.score(), 0);
    }
}

#[test]
fn left_bias_and_single_merge_per_tile() {
    let mut b = board(
        &[
            vec![2, 2, 2, 0, 0],
            vec![4, 4, 4, 4, 0],
            vec![0; 5],
            vec![0; 5],
            vec![0; 5],
        ],
        5,
    );
    assert!(b.move_tiles(Direction::Left));
    assert_eq!(&b.rows()[0][..2], &[4, 2]);
    assert_eq!(&b.rows()[1][..2], &[8, 8]);
    assert_eq!(b.score(), 4 + 16);
}

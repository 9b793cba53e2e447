//! The game against a real high-score file.

use std::fs;

use game_4096_core::{Board, Direction, FileHighScore, Game, GameConfig};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tempfile::tempdir;

/// A full board whose only move is the 2+2 merge in the top row. Whatever
/// lands in the freed cell, the board is stuck afterwards.
fn last_move_rows() -> Vec<Vec<u32>> {
    let mut rows: Vec<Vec<u32>> = (0..5)
        .map(|r| (0..5).map(|c| if (r + c) % 2 == 0 { 8 } else { 16 }).collect())
        .collect();
    rows[0] = vec![2, 2, 32, 64, 128];
    rows
}

#[test]
fn missing_file_starts_at_zero() {
    let dir = tempdir().unwrap();
    let store = FileHighScore::new(dir.path().join("highscore.txt"));
    let game = Game::new(GameConfig::default(), 1, Box::new(store)).unwrap();
    assert_eq!(game.state().high_score, 0);
}

#[test]
fn garbage_file_starts_at_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("highscore.txt");
    fs::write(&path, "not a number").unwrap();
    let game = Game::new(GameConfig::default(), 1, Box::new(FileHighScore::new(&path))).unwrap();
    assert_eq!(game.state().high_score, 0);
}

#[test]
fn stored_score_is_loaded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("highscore.txt");
    fs::write(&path, "2048\n").unwrap();
    let game = Game::new(GameConfig::default(), 1, Box::new(FileHighScore::new(&path))).unwrap();
    assert_eq!(game.state().high_score, 2048);
}

#[test]
fn game_over_writes_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("highscore.txt");
    let config = GameConfig::default();
    let board = Board::from_rows(&last_move_rows(), &config, SmallRng::seed_from_u64(8)).unwrap();
    let mut game = Game::from_board(board, config, Box::new(FileHighScore::new(&path))).unwrap();

    assert!(game.move_tiles(Direction::Left));
    assert!(game.is_over());
    assert_eq!(game.score(), 4);
    assert_eq!(fs::read_to_string(&path).unwrap(), "4");
    assert_eq!(game.state().high_score, 4);
    assert!(!game.move_tiles(Direction::Right));
}

#[test]
fn exit_save_skips_lower_scores() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("highscore.txt");
    fs::write(&path, "100000").unwrap();
    let mut game = Game::new(GameConfig::default(), 3, Box::new(FileHighScore::new(&path))).unwrap();
    game.move_tiles(Direction::Left);
    assert!(!game.save_high_score());
    assert_eq!(fs::read_to_string(&path).unwrap(), "100000");
}

//! # 4096 CLI
//!
//! Command-line interface for playing 4096 interactively or running
//! headless simulations with configurable policies.

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use game_4096_core::{
    BonusKind, Direction, FileHighScore, Game, GameConfig, GameEvent, GameSnapshot,
    MemoryHighScore,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "game-4096")]
#[command(author, version, about = "Play 4096 in the terminal or run simulations")]
struct Args {
    /// Run in interactive mode (default if no other mode specified)
    #[arg(short, long)]
    interactive: bool,

    /// Number of episodes to run in headless mode
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed; defaults to a fresh one per run in interactive mode
    #[arg(short, long)]
    seed: Option<u64>,

    /// Board side length
    #[arg(long, default_value_t = game_4096_core::config::DEFAULT_BOARD_SIZE)]
    size: usize,

    /// Tile value that wins the game
    #[arg(long, default_value_t = game_4096_core::config::DEFAULT_WIN_VALUE)]
    win: u32,

    /// File holding the best score
    #[arg(long, default_value = "highscore.txt")]
    high_score_file: PathBuf,

    /// Disable ANSI colours
    #[arg(long)]
    no_color: bool,

    /// Maximum steps per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "random")]
    policy: Policy,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random valid moves
    Random,
    /// Cycle through moves: Left, Down, Right, Up
    Cycle,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = GameConfig {
        board_size: args.size,
        win_value: args.win,
        ..GameConfig::default()
    };
    config.validate().context("invalid game settings")?;

    match args.episodes {
        Some(episodes) if !args.interactive => run_headless(&args, &config, episodes),
        _ => run_interactive(&args, config),
    }
}

/// Run interactive mode where the user plays with the keyboard.
fn run_interactive(args: &Args, config: GameConfig) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let store = FileHighScore::new(&args.high_score_file);
    let mut game = Game::new(config, seed, Box::new(store))?;
    let color = !args.no_color;

    // Restored when dropped, also on early return.
    let raw_mode = RawMode::enable();
    let mut stdin = io::stdin();
    let mut buffer = [0u8; 8];

    let mut notes = vec![format!("Reach {} to win!", game.config().win_value)];
    redraw(&game.state(), &notes, color)?;

    loop {
        let bytes_read = stdin.read(&mut buffer).context("reading keyboard input")?;
        if bytes_read == 0 {
            // stdin closed
            game.save_high_score();
            break;
        }

        notes.clear();
        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(direction) => {
                if game.is_over() {
                    notes.push("Game over. Press R to restart or Q to quit.".to_string());
                } else if !game.move_tiles(direction) && !game.is_over() {
                    notes.push(format!("Cannot move {}. Try another direction.", direction));
                }
            }
            InputAction::Restart => {
                game.restart();
                notes.push("New game started.".to_string());
            }
            InputAction::Quit => {
                game.save_high_score();
                drop(raw_mode);
                println!("\nThanks for playing! Final score: {}", game.score());
                return Ok(());
            }
            InputAction::None => {
                let key = String::from_utf8_lossy(&buffer[..bytes_read]);
                debug!(key = %key.escape_debug(), "unbound key");
                notes.push(format!("Unknown key {:?}.", key));
            }
        }

        notes.extend(game.take_events().into_iter().map(describe_event));
        redraw(&game.state(), &notes, color)?;
    }

    Ok(())
}

/// Run headless simulation mode.
fn run_headless(args: &Args, config: &GameConfig, episodes: u32) -> Result<()> {
    let seed = args.seed.unwrap_or(42);
    let mut total_score: u64 = 0;
    let mut max_tile_overall: u32 = 0;
    let mut wins: u32 = 0;
    let mut scores: Vec<u64> = Vec::with_capacity(episodes as usize);
    let mut max_tiles: Vec<u32> = Vec::with_capacity(episodes as usize);

    // Separate generator for move selection so the games stay reproducible
    let mut policy_rng = SmallRng::seed_from_u64(seed.wrapping_add(1000));

    for episode in 0..episodes {
        let episode_seed = seed.wrapping_add(u64::from(episode));
        let store = MemoryHighScore::default();
        let mut game = Game::new(config.clone(), episode_seed, Box::new(store))?;
        let mut steps = 0;
        let mut cycle = 0;

        while !game.is_over() && (args.max_steps == 0 || steps < args.max_steps) {
            let legal = game.legal_moves();
            let direction = match args.policy {
                Policy::Random => select_random_move(legal, &mut policy_rng),
                Policy::Cycle => select_cycle_move(legal, &mut cycle),
            };

            let Some(direction) = direction else {
                // no legal move left; this move makes the game notice
                game.move_tiles(Direction::Left);
                break;
            };
            game.move_tiles(direction);
            steps += 1;

            if args.verbose {
                println!("Episode {} Step {}: {}", episode + 1, steps, direction);
                print!("{}", game.board());
            }
        }

        let state = game.state();
        scores.push(state.score);
        max_tiles.push(state.max_tile);
        total_score += state.score;
        max_tile_overall = max_tile_overall.max(state.max_tile);
        if state.won {
            wins += 1;
        }

        if args.verbose {
            println!(
                "Episode {}: Score={}, MaxTile={}, Steps={}",
                episode + 1,
                state.score,
                state.max_tile,
                steps
            );
        }
    }

    if episodes == 0 {
        println!("=== Simulation Results ===");
        println!("episodes=0");
        return Ok(());
    }

    let avg_score = total_score as f64 / f64::from(episodes);
    scores.sort_unstable();
    let mid = scores.len() / 2;
    let median_score = if scores.len() % 2 == 0 {
        (scores[mid - 1] + scores[mid]) as f64 / 2.0
    } else {
        scores[mid] as f64
    };

    let mut tile_counts: BTreeMap<u32, u32> = BTreeMap::new();
    for tile in &max_tiles {
        *tile_counts.entry(*tile).or_insert(0) += 1;
    }

    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("episodes={}", episodes);
    println!("policy={:?}", args.policy);
    println!("seed={}", seed);
    println!("board_size={}", config.board_size);
    println!("max_steps={}", args.max_steps);
    println!("avg_score={:.2}", avg_score);
    println!("median_score={:.2}", median_score);
    println!("min_score={}", scores.first().unwrap_or(&0));
    println!("max_score={}", scores.last().unwrap_or(&0));
    println!("max_tile_overall={}", max_tile_overall);
    println!("wins={}", wins);

    let distribution: Vec<String> = tile_counts
        .iter()
        .map(|(tile, count)| format!("{}:{}", tile, count))
        .collect();
    println!("tile_distribution={}", distribution.join(","));
    Ok(())
}

/// Select a random legal move.
fn select_random_move(legal: [bool; 4], rng: &mut SmallRng) -> Option<Direction> {
    let valid: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|d| legal[d.index()])
        .collect();

    if valid.is_empty() {
        None
    } else {
        Some(valid[rng.gen_range(0..valid.len())])
    }
}

/// Select moves in a cycle: Left, Down, Right, Up.
fn select_cycle_move(legal: [bool; 4], cycle: &mut usize) -> Option<Direction> {
    let order = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];

    // Try moves in cycle order, starting from current position
    for _ in 0..order.len() {
        let direction = order[*cycle % order.len()];
        *cycle += 1;
        if legal[direction.index()] {
            return Some(direction);
        }
    }

    None
}

#[derive(Debug, PartialEq, Eq)]
enum InputAction {
    Move(Direction),
    Restart,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        // Ctrl+C, Esc
        [3] | [27] => InputAction::Quit,

        _ => match single_char(bytes) {
            Some(key) => parse_key(key),
            None => InputAction::None,
        },
    }
}

/// The one character `bytes` encodes, if it is exactly one.
fn single_char(bytes: &[u8]) -> Option<char> {
    let text = std::str::from_utf8(bytes).ok()?;
    let mut chars = text.chars();
    let key = chars.next()?;
    chars.next().is_none().then_some(key)
}

/// WASD plus the same physical keys on a Russian layout.
fn parse_key(key: char) -> InputAction {
    let key = key.to_lowercase().next().unwrap_or(key);
    match key {
        'w' | 'ц' => InputAction::Move(Direction::Up),
        's' | 'ы' => InputAction::Move(Direction::Down),
        'a' | 'ф' => InputAction::Move(Direction::Left),
        'd' | 'в' => InputAction::Move(Direction::Right),
        'r' | 'к' => InputAction::Restart,
        'q' | 'й' => InputAction::Quit,
        _ => InputAction::None,
    }
}

fn describe_event(event: GameEvent) -> String {
    match event {
        GameEvent::Won { tile } => format!("*** YOU WIN! You reached {}! Keep going? ***", tile),
        GameEvent::BonusGranted {
            milestone,
            kind,
            row,
            col,
        } => format!(
            "Milestone {} reached: bonus {} at row {}, column {}. {}",
            milestone,
            kind.symbol(),
            row + 1,
            col + 1,
            kind.description()
        ),
        GameEvent::NoRoomForBonus { milestone } => {
            format!("Milestone {} reached, but there is no room for a bonus tile.", milestone)
        }
        GameEvent::GameOver { score } => format!("*** GAME OVER *** Final score: {}", score),
        GameEvent::NewHighScore { score } => format!("New high score: {}!", score),
    }
}

// =============================================================================
// Rendering
// =============================================================================

const RESET: &str = "\x1b[0m";

fn tile_color(value: u32) -> &'static str {
    if BonusKind::is_bonus_value(value) {
        return "\x1b[1;95m";
    }
    match value {
        0 => "\x1b[90m",
        2 => "\x1b[97m",
        4 => "\x1b[37m",
        8 => "\x1b[93m",
        16 => "\x1b[33m",
        32 => "\x1b[91m",
        64 => "\x1b[31m",
        128 => "\x1b[92m",
        256 => "\x1b[32m",
        512 => "\x1b[96m",
        1024 => "\x1b[36m",
        2048 => "\x1b[94m",
        _ => "\x1b[1;35m",
    }
}

fn tile_label(value: u32) -> String {
    match BonusKind::from_value(value) {
        _ if value == 0 => ".".to_string(),
        Some(kind) => kind.symbol().to_string(),
        None => value.to_string(),
    }
}

fn render(state: &GameSnapshot, notes: &[String], color: bool) -> String {
    let width = state.board_size * 7 + 1;
    let rule = "═".repeat(width);
    let mut out = String::new();

    out.push_str(&format!("{}\n{:^width$}\n{}\n", rule, "4096", rule, width = width));
    out.push_str(&format!("Score: {}\n", state.score));
    out.push_str(&format!("Best:  {}\n", state.high_score));
    out.push_str(&format!("Max tile: {}\n", state.max_tile));
    if state.won {
        out.push_str("You reached the goal!\n");
    }
    if state.game_over {
        out.push_str("GAME OVER. No moves left.\n");
    }

    out.push_str(&rule);
    out.push('\n');
    for row in &state.grid {
        for &value in row {
            let cell = format!("{:^7}", tile_label(value));
            if color {
                out.push_str(tile_color(value));
                out.push_str(&cell);
                out.push_str(RESET);
            } else {
                out.push_str(&cell);
            }
        }
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');

    for note in notes {
        out.push_str(note);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(Game::<SmallRng>::instructions());
    out.push('\n');
    out
}

fn redraw(state: &GameSnapshot, notes: &[String], color: bool) -> Result<()> {
    let mut stdout = io::stdout();
    // Clear screen and home the cursor
    write!(stdout, "\x1b[2J\x1b[H{}", render(state, notes, color))?;
    stdout.flush().context("flushing terminal output")?;
    Ok(())
}

// =============================================================================
// Terminal raw mode
// =============================================================================

/// Puts the terminal in single-key mode until dropped.
struct RawMode {
    #[cfg(unix)]
    original: Option<libc::termios>,
}

// Platform-specific terminal raw mode handling
#[cfg(unix)]
impl RawMode {
    fn enable() -> Self {
        use std::os::unix::io::AsRawFd;
        let fd = io::stdin().as_raw_fd();
        // SAFETY: termios is plain data and the fd stays open for the process.
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut termios) != 0 {
                // not a terminal; keep line-buffered input
                return RawMode { original: None };
            }
            let original = termios;
            termios.c_lflag &= !(libc::ICANON | libc::ECHO);
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;
            libc::tcsetattr(fd, libc::TCSANOW, &termios);
            RawMode {
                original: Some(original),
            }
        }
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;
        if let Some(original) = self.original {
            // SAFETY: restores the attributes read in `enable`.
            unsafe {
                libc::tcsetattr(io::stdin().as_raw_fd(), libc::TCSANOW, &original);
            }
        }
    }
}

#[cfg(not(unix))]
impl RawMode {
    fn enable() -> Self {
        // On non-Unix systems, just continue without raw mode
        // Interactive mode will require Enter after each key
        RawMode {}
    }
}

//! Gridlock entry point
//!
//! Thin file-driven front end over the library: inspect, validate, or
//! rotate a puzzle definition.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use gridlock::sim::{EntityId, Game, Puzzle};
use gridlock::{dehydrate, hydrate_str, rotate_90cw, validate_puzzle};

/// Simulates and verifies sliding-block puzzles.
#[derive(Parser)]
#[command(name = "gridlock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the board and slide ranges of a puzzle definition.
    Show { file: PathBuf },
    /// Replay the bundled validation trace and report par.
    Validate { file: PathBuf },
    /// Rotate the definition 90° clockwise and print the rotated JSON.
    Rotate {
        file: PathBuf,
        /// Number of quarter turns to apply.
        #[arg(short, long, default_value_t = 1)]
        turns: u32,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Show { file } => load(&file).map(|puzzle| show(puzzle)),
        Command::Validate { file } => load(&file).map(|puzzle| validate(&puzzle)),
        Command::Rotate { file, turns } => {
            load(&file).and_then(|puzzle| rotate(puzzle, turns))
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load(path: &PathBuf) -> Result<Puzzle, Box<dyn Error>> {
    let json = fs::read_to_string(path)?;
    Ok(hydrate_str(&json)?)
}

fn show(puzzle: Puzzle) -> ExitCode {
    let game = Game::new(Arc::new(puzzle));
    let puzzle = game.puzzle();
    println!(
        "{} [{}] {}x{}, exit {} ({:?})",
        puzzle.name,
        puzzle.difficulty,
        puzzle.grid.rows,
        puzzle.grid.cols,
        puzzle.exit.pos,
        puzzle.exit.dir,
    );
    print!("{}", game.board_text());

    let movable = std::iter::once(EntityId::Player)
        .chain((0..puzzle.vehicles.len()).map(|i| EntityId::Vehicle(i as u32)));
    for id in movable {
        if let (Some(range), Some(pos)) = (game.slide_range(id), game.position(id)) {
            println!("{id}: at {pos}, slide range {}..={}", range.min, range.max);
        }
    }
    ExitCode::SUCCESS
}

fn validate(puzzle: &Puzzle) -> ExitCode {
    let report = validate_puzzle(puzzle);
    match (&report.par, &report.error) {
        (Some(par), _) => {
            println!("{}: valid, par {par}", puzzle.name);
            ExitCode::SUCCESS
        }
        (_, Some(error)) => {
            println!("{}: invalid ({error})", puzzle.name);
            ExitCode::FAILURE
        }
        _ => unreachable!("report carries either par or error"),
    }
}

fn rotate(mut puzzle: Puzzle, turns: u32) -> Result<ExitCode, Box<dyn Error>> {
    for _ in 0..turns {
        puzzle = rotate_90cw(&puzzle);
    }
    let json = serde_json::to_string_pretty(&dehydrate(&puzzle))?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

//! Command-line front end for the chamber generator.

use std::fs;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use sokogen_core::{
    Chamber, MovementMode, SeededSampler, Semantics, generate_directed, generate_feed,
    generate_remaining_capacity, generate_storage, parse_chamber, puzzle_from_layout,
};

mod render;
mod report;

#[derive(Parser)]
#[command(author, version, about = "Push-puzzle chamber generator", long_about = None)]
struct Args {
    /// Seed for the generation RNG
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Use 8-direction movement rules
    #[arg(long)]
    diagonal: bool,
    /// Emit a JSON report instead of ASCII art
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a storage chamber with a stocked annex
    Storage {
        #[arg(long, default_value_t = 1)]
        difficulty: u64,
    },
    /// Generate a feed chamber and its calibrated start layout
    Feed {
        #[arg(long, default_value_t = 1)]
        difficulty: u64,
    },
    /// Generate a feed chamber with an exact crate capacity
    Directed {
        #[arg(long)]
        capacity: u32,
    },
    /// Generate a feed chamber with part of its capacity already used
    Remaining {
        #[arg(long, default_value_t = 1)]
        difficulty: u64,
        #[arg(long)]
        remaining: u32,
    },
    /// Parse a chamber from a text file and show its analysis
    Parse {
        path: String,
        #[arg(long)]
        show_regions: bool,
        #[arg(long)]
        show_locks: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let movement = if args.diagonal {
        MovementMode::Diagonal
    } else {
        MovementMode::Orthogonal
    };
    let json = args.json;
    let mut sampler = SeededSampler::new(args.seed);

    match args.command {
        Command::Storage { difficulty } => {
            info!("generating storage chamber at difficulty {difficulty}");
            let chamber = generate_storage(difficulty, movement, &mut sampler);
            emit_generated(&chamber, None, json, &mut sampler)
        }
        Command::Feed { difficulty } => {
            info!("generating feed chamber at difficulty {difficulty}");
            let (chamber, start) = generate_feed(difficulty, movement, &mut sampler);
            emit_generated(&chamber, Some(start), json, &mut sampler)
        }
        Command::Directed { capacity } => {
            info!("generating directed chamber with capacity {capacity}");
            let (chamber, start) = generate_directed(capacity, movement, &mut sampler);
            emit_generated(&chamber, Some(start), json, &mut sampler)
        }
        Command::Remaining { difficulty, remaining } => {
            info!("generating chamber with {remaining} crates of remaining capacity");
            let (chamber, start) =
                generate_remaining_capacity(difficulty, remaining, movement, &mut sampler);
            emit_generated(&chamber, Some(start), json, &mut sampler)
        }
        Command::Parse { path, show_regions, show_locks } => {
            let chamber = load_chamber(&path, movement)?;
            if json {
                let report = report::chamber_report(&chamber, None);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::render_chamber(&chamber, 0, show_regions, show_locks));
            }
            Ok(())
        }
    }
}

fn emit_generated(
    chamber: &Chamber,
    start: Option<usize>,
    json: bool,
    sampler: &mut SeededSampler,
) -> Result<()> {
    if json {
        let report = report::chamber_report(chamber, start);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let puzzle = puzzle_from_layout(chamber, start.unwrap_or(0), sampler);
    print!("{}", render::render_puzzle(&puzzle));
    if let Some(start) = start {
        let solution = chamber.layout(start).solution;
        println!(
            "start layout {start}: difficulty {}, {} pushes to solve",
            solution.difficulty.unwrap_or(0),
            solution.pushes,
        );
    }
    Ok(())
}

fn load_chamber(path: &str, movement: MovementMode) -> Result<Chamber> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read chamber file: {path}"))?;
    let chamber = parse_chamber(&text, movement, Semantics::Storage)
        .with_context(|| format!("failed to parse chamber file: {path}"))?;
    Ok(chamber)
}

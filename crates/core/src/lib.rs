//! Push-puzzle chamber generation for dungeon regions: enumerate wall
//! geometry, classify locked tiles, explore the crate layout graph, and
//! assemble calibrated puzzles.

pub mod chamber;
pub mod enumerate;
pub mod generate;
pub mod graph;
pub mod locks;
pub mod parse;
pub mod puzzle;
pub mod rng;
pub mod types;

pub use chamber::{Annex, Chamber, DEFAULT_ANNEX_CAPACITY, Layout, PlayerTile, Solution};
pub use enumerate::{EnumerationConfig, enumerate_chambers};
pub use generate::{
    Calibration, calibrate, generate_directed, generate_feed, generate_remaining_capacity,
    generate_storage, glue,
};
pub use graph::{
    PushGraph, assign_loopgroups, compute_difficulty, explore_pushes, find_loopgroup,
    furthest_layout, outside_capacity, pull_expand, pull_successors, push_successors,
};
pub use locks::{LockAnalysis, analyze_locks};
pub use parse::{ParseError, parse_chamber};
pub use puzzle::{PuzzleBase, PuzzleTile, Puzzlerect, pathfind, puzzle_from_layout};
pub use rng::{ExhaustiveSampler, Sampler, SeededSampler};
pub use types::{Direction, MovementMode, Pos, RegionLabel, Semantics};

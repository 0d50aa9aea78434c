//! Chamber generation drivers. Each driver walks an unbounded schedule of
//! growing sizes, enumerates candidate geometry, calibrates the layout
//! graph, and returns the first chamber that satisfies its acceptance rule.

use log::debug;

use crate::chamber::{Chamber, DEFAULT_ANNEX_CAPACITY, PlayerTile};
use crate::enumerate::{EnumerationConfig, enumerate_chambers};
use crate::graph::{
    compute_difficulty, explore_pushes, furthest_layout, outside_capacity, pull_expand,
};
use crate::locks::analyze_locks;
use crate::rng::Sampler;
use crate::types::{MovementMode, RegionLabel, Semantics};

/// Abandon a candidate whose layout arena outgrows this.
const LAYOUT_CAP: usize = 100_000;
/// Candidate chambers tried per size step before growing.
const CANDIDATES_PER_SIZE: usize = 32;

pub struct Calibration {
    /// Pull distance from the solved seeds, per layout.
    pub distance: Vec<Option<u32>>,
    /// Largest crate count reachable with the player outside.
    pub capacity: u32,
}

/// Expands the layout arena for scoring. Feed chambers are first closed
/// under pushes so the pull expansion can start from every fully-fed
/// arrangement; storage chambers are played by pulling, so their expansion
/// starts straight from the stocked base layout. Either way the arena is
/// then re-closed under pushes and every loopgroup scored. `None` when the
/// chamber blows the layout cap or has no solved layout at all.
pub fn calibrate(chamber: &mut Chamber) -> Option<Calibration> {
    let (seeds, capacity, target) = match chamber.semantics {
        Semantics::Storage => {
            let capacity = chamber.annex.map_or(0, |annex| u32::from(annex.capacity));
            (vec![0], capacity, 0)
        }
        Semantics::Feed => {
            explore_pushes(chamber, LAYOUT_CAP)?;
            let capacity = outside_capacity(chamber);
            let seeds: Vec<usize> = chamber
                .layouts()
                .iter()
                .enumerate()
                .filter(|(_, layout)| {
                    layout.player == RegionLabel::Outside
                        && layout.crate_count == capacity
                })
                .map(|(index, _)| index)
                .collect();
            (seeds, capacity, capacity)
        }
    };
    if seeds.is_empty() {
        return None;
    }

    let mut distance = pull_expand(chamber, &seeds, LAYOUT_CAP)?;
    let graph = explore_pushes(chamber, LAYOUT_CAP)?;
    distance.resize(chamber.layout_count(), None);

    compute_difficulty(chamber, &graph, target);
    Some(Calibration { distance, capacity })
}

/// Grows through the size schedule until `accept` picks a layout from a
/// calibrated candidate.
fn search(
    movement: MovementMode,
    semantics: Semantics,
    sampler: &mut impl Sampler,
    mut accept: impl FnMut(&Chamber, &Calibration) -> Option<usize>,
) -> (Chamber, usize) {
    let mut width = 4;
    let mut height = 3;
    let mut grow_width = true;
    loop {
        let entry_col = sampler.below(width);
        let config = EnumerationConfig {
            width,
            height,
            entry_col,
            movement,
            semantics,
            limit: CANDIDATES_PER_SIZE,
        };
        for mut chamber in enumerate_chambers(&config, sampler) {
            if semantics == Semantics::Storage && !attach_sampled_annex(&mut chamber, sampler)
            {
                continue;
            }
            let Some(calibration) = calibrate(&mut chamber) else { continue };
            if let Some(choice) = accept(&chamber, &calibration) {
                return (chamber, choice);
            }
        }
        debug!("no acceptable chamber at {width}x{height}, growing");
        if grow_width {
            width += 1;
        } else {
            height += 1;
        }
        grow_width = !grow_width;
    }
}

/// Tries to convert a sampled open top-row tile into the annex, falling
/// back to the other open tiles when the re-analysis refuses.
fn attach_sampled_annex(chamber: &mut Chamber, sampler: &mut impl Sampler) -> bool {
    let open_cols: Vec<usize> = (0..chamber.width).filter(|&x| !chamber.walls[x]).collect();
    if open_cols.is_empty() {
        return false;
    }
    let start = sampler.below(open_cols.len());
    for offset in 0..open_cols.len() {
        let col = open_cols[(start + offset) % open_cols.len()];
        if chamber.attach_annex(col, DEFAULT_ANNEX_CAPACITY) {
            return true;
        }
    }
    false
}

fn difficulty_of(chamber: &Chamber, layout: usize) -> u64 {
    chamber.layout(layout).solution.difficulty.unwrap_or(0)
}

/// Storage chamber: annex stocked with crates the player must retrieve.
/// Accepts once the hardest retrievable outside arrangement scores at least
/// the requested difficulty.
pub fn generate_storage(
    difficulty: u64,
    movement: MovementMode,
    sampler: &mut impl Sampler,
) -> Chamber {
    let (chamber, _) = search(movement, Semantics::Storage, sampler, |chamber, calibration| {
        let mut best: Option<usize> = None;
        for (index, layout) in chamber.layouts().iter().enumerate() {
            if layout.player != RegionLabel::Outside {
                continue;
            }
            if calibration.distance.get(index).copied().flatten().is_none() {
                continue;
            }
            if best.is_none_or(|b| difficulty_of(chamber, index) > difficulty_of(chamber, b)) {
                best = Some(index);
            }
        }
        let best = best?;
        (difficulty_of(chamber, best) >= difficulty).then_some(best)
    });
    chamber
}

/// Feed chamber: starts empty and must be pushed full. Returns the chamber
/// and the furthest empty start layout.
pub fn generate_feed(
    difficulty: u64,
    movement: MovementMode,
    sampler: &mut impl Sampler,
) -> (Chamber, usize) {
    search(movement, Semantics::Feed, sampler, |chamber, calibration| {
        let furthest = furthest_layout(chamber, &calibration.distance, 0)?;
        (difficulty_of(chamber, furthest) >= difficulty).then_some(furthest)
    })
}

/// Feed chamber with an exact capacity, used as the upper half of a glued
/// puzzle. Returns the furthest arrangement holding exactly that many
/// crates.
pub fn generate_directed(
    capacity: u32,
    movement: MovementMode,
    sampler: &mut impl Sampler,
) -> (Chamber, usize) {
    search(movement, Semantics::Feed, sampler, |chamber, calibration| {
        if calibration.capacity != capacity {
            return None;
        }
        furthest_layout(chamber, &calibration.distance, capacity)
    })
}

/// Feed chamber that already holds part of its capacity; only `remaining`
/// crates still fit. Returns the furthest such partially filled start.
pub fn generate_remaining_capacity(
    difficulty: u64,
    remaining: u32,
    movement: MovementMode,
    sampler: &mut impl Sampler,
) -> (Chamber, usize) {
    search(movement, Semantics::Feed, sampler, |chamber, calibration| {
        if calibration.capacity < remaining {
            return None;
        }
        let start_count = calibration.capacity - remaining;
        let furthest = furthest_layout(chamber, &calibration.distance, start_count)?;
        (difficulty_of(chamber, furthest) >= difficulty).then_some(furthest)
    })
}

/// Stacks a directed chamber on top of a storage chamber's annex: the upper
/// chamber's entrance channel becomes the lower chamber's annex tile, which
/// turns into the doorway between the rooms. The combined geometry is
/// re-analyzed from scratch and the merged crate arrangement is interned
/// after the empty base layout. The lower arrangement's annex fill is not
/// carried over: the annex dissolves into the doorway, so its stock must
/// already be expressed as explicit crates in the upper arrangement.
pub fn glue(
    upper: &Chamber,
    upper_layout: usize,
    lower: &Chamber,
    lower_layout: usize,
) -> Option<Chamber> {
    let annex = lower.annex?;
    if annex.pos.y != 0 || upper.movement != lower.movement {
        return None;
    }
    let upper_col = upper.entry_col;
    let annex_col = annex.pos.x as usize;
    let (upper_off, lower_off) = if upper_col >= annex_col {
        (0, upper_col - annex_col)
    } else {
        (annex_col - upper_col, 0)
    };
    let width = (upper_off + upper.width).max(lower_off + lower.width);
    let height = upper.height + lower.height;

    let mut walls = vec![true; width * height];
    let mut targets = vec![false; width * height];
    for y in 0..upper.height {
        for x in 0..upper.width {
            let to = y * width + x + upper_off;
            walls[to] = upper.walls[y * upper.width + x];
            targets[to] = upper.targets[y * upper.width + x];
        }
    }
    for y in 0..lower.height {
        for x in 0..lower.width {
            let to = (upper.height + y) * width + x + lower_off;
            walls[to] = lower.walls[y * lower.width + x];
            targets[to] = lower.targets[y * lower.width + x];
        }
    }
    walls[upper.height * width + annex_col + lower_off] = false;

    let entry_col = lower.entry_col + lower_off;
    let analysis = analyze_locks(
        &walls,
        width,
        height,
        entry_col,
        upper.movement,
        lower.semantics,
        None,
    )?;
    let mut combined = Chamber::new(
        width,
        height,
        entry_col,
        upper.movement,
        lower.semantics,
        walls,
        targets,
        analysis,
    );

    let mut crates = vec![false; width * height];
    for y in 0..upper.height {
        for x in 0..upper.width {
            if upper.layout(upper_layout).crates[y * upper.width + x] {
                crates[y * width + x + upper_off] = true;
            }
        }
    }
    for y in 0..lower.height {
        for x in 0..lower.width {
            if lower.layout(lower_layout).crates[y * lower.width + x] {
                crates[(upper.height + y) * width + x + lower_off] = true;
            }
        }
    }
    combined.intern_layout(crates, 0, PlayerTile::Outside);
    Some(combined)
}

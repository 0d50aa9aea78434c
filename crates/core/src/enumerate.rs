//! Chamber enumeration. Builds wall geometry row by row, pruning rows that
//! seal off regions or create dead ends, and keeps the candidates that pass
//! the lock analysis. The visiting order of row patterns is driven by the
//! sampler, so a seeded sampler explores the space in a reproducible
//! shuffled order and the exhaustive sampler walks all of it.

use std::ops::ControlFlow;

use log::debug;

use crate::chamber::Chamber;
use crate::locks::analyze_locks;
use crate::rng::Sampler;
use crate::types::{MovementMode, Pos, Semantics};

#[derive(Clone, Copy, Debug)]
pub struct EnumerationConfig {
    pub width: usize,
    pub height: usize,
    pub entry_col: usize,
    pub movement: MovementMode,
    pub semantics: Semantics,
    /// Stop after this many accepted chambers.
    pub limit: usize,
}

/// Enumerates viable chambers of the configured size, most unlocked tiles
/// first. Row patterns are bitmasks with a set bit meaning an open tile.
pub fn enumerate_chambers(
    config: &EnumerationConfig,
    sampler: &mut impl Sampler,
) -> Vec<Chamber> {
    debug_assert!(config.entry_col < config.width);
    debug_assert!(config.width < 32);
    let mut accepted = Vec::new();
    let mut rows = Vec::with_capacity(config.height);
    let _ = extend_rows(config, sampler, &mut rows, &mut accepted);
    debug!(
        "enumerated {} chamber(s) at {}x{} entry {}",
        accepted.len(),
        config.width,
        config.height,
        config.entry_col,
    );
    accepted.sort_by(|a, b| b.unlocked_tiles.cmp(&a.unlocked_tiles));
    accepted
}

/// Depth-first over rows; within one row, an interval stack picks the next
/// pattern via the sampler and keeps the untried remainder for later.
fn extend_rows(
    config: &EnumerationConfig,
    sampler: &mut impl Sampler,
    rows: &mut Vec<u32>,
    accepted: &mut Vec<Chamber>,
) -> ControlFlow<()> {
    if rows.len() == config.height {
        return finish(config, rows, accepted);
    }
    let space = 1_usize << config.width;
    let mut intervals = vec![(0_usize, space)];
    while let Some((lo, hi)) = intervals.pop() {
        if lo >= hi {
            continue;
        }
        let pick = lo + sampler.below(hi - lo);
        intervals.push((lo, pick));
        intervals.push((pick + 1, hi));
        let pattern = pick as u32;
        if !row_extends_prefix(config, rows, pattern) {
            continue;
        }
        rows.push(pattern);
        let flow = extend_rows(config, sampler, rows, accepted);
        rows.pop();
        if flow.is_break() {
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

fn row_extends_prefix(config: &EnumerationConfig, rows: &[u32], pattern: u32) -> bool {
    let min_open = match config.movement {
        MovementMode::Orthogonal => 2,
        MovementMode::Diagonal => 1,
    };
    if pattern.count_ones() < min_open {
        return false;
    }
    if rows.is_empty() {
        return true;
    }
    // The new row fixes the below-neighbors of the previous row, so that
    // row's dead ends and sealed regions are now decidable.
    let mut prefix = rows.to_vec();
    prefix.push(pattern);
    if dead_end_in_row(config, &prefix, rows.len() - 1) {
        return false;
    }
    all_components_reach_last_row(config, &prefix)
}

fn open_in_prefix(config: &EnumerationConfig, rows: &[u32], y: i32, x: i32) -> bool {
    if x < 0 || x >= config.width as i32 || y < 0 {
        return false;
    }
    if (y as usize) < rows.len() {
        rows[y as usize] >> x & 1 == 1
    } else {
        // Below the grid only the entry channel is open; rows not chosen
        // yet are never queried.
        y as usize >= config.height && x == config.entry_col as i32
    }
}

/// An open tile walled on three of its four orthogonal sides is a cul-de-sac
/// no crate can ever be pulled out of.
fn dead_end_in_row(config: &EnumerationConfig, rows: &[u32], y: usize) -> bool {
    for x in 0..config.width {
        let (y, x) = (y as i32, x as i32);
        if !open_in_prefix(config, rows, y, x) {
            continue;
        }
        let blocked = [(y - 1, x), (y + 1, x), (y, x - 1), (y, x + 1)]
            .into_iter()
            .filter(|&(ny, nx)| !open_in_prefix(config, rows, ny, nx))
            .count();
        if blocked >= 3 {
            return true;
        }
    }
    false
}

/// Every connected component of the prefix must still own a tile in the
/// newest row; a component that does not is sealed away from everything
/// the remaining rows could add.
fn all_components_reach_last_row(config: &EnumerationConfig, rows: &[u32]) -> bool {
    component_count_with_check(config, rows, true).is_some()
}

fn single_component(config: &EnumerationConfig, rows: &[u32]) -> bool {
    component_count_with_check(config, rows, false) == Some(1)
}

fn component_count_with_check(
    config: &EnumerationConfig,
    rows: &[u32],
    require_last_row: bool,
) -> Option<usize> {
    let depth = rows.len();
    let mut labeled = vec![false; depth * config.width];
    let mut components = 0;
    for y in 0..depth {
        for x in 0..config.width {
            if !open_in_prefix(config, rows, y as i32, x as i32)
                || labeled[y * config.width + x]
            {
                continue;
            }
            components += 1;
            let mut touches_last = y == depth - 1;
            labeled[y * config.width + x] = true;
            let mut worklist = vec![Pos { y: y as i32, x: x as i32 }];
            while let Some(at) = worklist.pop() {
                for &direction in config.movement.directions() {
                    let next = at.step(direction);
                    if next.y < 0 || next.y as usize >= depth {
                        continue;
                    }
                    if !open_in_prefix(config, rows, next.y, next.x) {
                        continue;
                    }
                    let index = next.y as usize * config.width + next.x as usize;
                    if !labeled[index] {
                        labeled[index] = true;
                        touches_last |= next.y as usize == depth - 1;
                        worklist.push(next);
                    }
                }
            }
            if require_last_row && !touches_last {
                return None;
            }
        }
    }
    Some(components)
}

fn finish(
    config: &EnumerationConfig,
    rows: &[u32],
    accepted: &mut Vec<Chamber>,
) -> ControlFlow<()> {
    let door_open = rows[config.height - 1] >> config.entry_col & 1 == 1;
    if !door_open {
        return ControlFlow::Continue(());
    }
    // Canonical width: geometry that never touches a side column is a
    // narrower chamber wearing padding.
    let touches_left = rows.iter().any(|row| row & 1 == 1);
    let touches_right = rows.iter().any(|row| row >> (config.width - 1) & 1 == 1);
    if !touches_left || !touches_right {
        return ControlFlow::Continue(());
    }
    if dead_end_in_row(config, rows, config.height - 1) {
        return ControlFlow::Continue(());
    }
    if !single_component(config, rows) {
        return ControlFlow::Continue(());
    }

    let mut walls = vec![true; config.width * config.height];
    for (y, row) in rows.iter().enumerate() {
        for x in 0..config.width {
            if row >> x & 1 == 1 {
                walls[y * config.width + x] = false;
            }
        }
    }
    let Some(analysis) = analyze_locks(
        &walls,
        config.width,
        config.height,
        config.entry_col,
        config.movement,
        config.semantics,
        None,
    ) else {
        return ControlFlow::Continue(());
    };
    let targets = vec![false; config.width * config.height];
    accepted.push(Chamber::new(
        config.width,
        config.height,
        config.entry_col,
        config.movement,
        config.semantics,
        walls,
        targets,
        analysis,
    ));
    if accepted.len() >= config.limit {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}

//! Layout transition graph. Push edges model the player shoving crates
//! (including materializing one at the entrance and shoving one back out),
//! pull edges are the reverse walk used to discover how a finished
//! arrangement could have been reached. Mutually reversible layouts collapse
//! into loopgroups; difficulty counts the one-way structure between them.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::debug;

use crate::chamber::{Chamber, Layout, PlayerTile};
use crate::types::{Pos, RegionLabel};

pub struct PushGraph {
    /// Successor layout indices per layout, deduplicated and sorted.
    pub edges: Vec<Vec<u32>>,
}

/// Tiles the player can occupy in a layout: every tile of their region,
/// plus the virtual entrance tile when they are outside.
fn standable_tiles(chamber: &Chamber, source: &Layout) -> Vec<Pos> {
    let mut standable = Vec::new();
    for y in 0..chamber.height {
        for x in 0..chamber.width {
            let pos = Pos { y: y as i32, x: x as i32 };
            if source.regions[chamber.idx(pos)] == source.player {
                standable.push(pos);
            }
        }
    }
    if source.player == RegionLabel::Outside {
        standable.push(chamber.entry_pos());
    }
    standable
}

fn player_tile(chamber: &Chamber, at: Pos) -> PlayerTile {
    if chamber.in_grid(at) { PlayerTile::At(at) } else { PlayerTile::Outside }
}

/// All layouts reachable from `layout` by one push. The player may stand on
/// any tile of their region; when outside, the virtual entrance tile counts
/// too, and a fresh crate can be shoved in through the door.
pub fn push_successors(chamber: &mut Chamber, layout: usize) -> Vec<usize> {
    let source = chamber.layout(layout).clone();
    let mut found = Vec::new();
    let standable = standable_tiles(chamber, &source);

    for &at in &standable {
        for &direction in chamber.movement.directions() {
            let shove = at.step(direction);
            if chamber.is_annex(shove) {
                // Shoving against a stocked annex pops a crate out the far
                // side while the player holds position.
                if source.annex_fill > 0 {
                    let dest = at.stride(direction, 2);
                    if chamber.open_at(dest)
                        && !chamber.locked_at(dest)
                        && !source.crates[chamber.idx(dest)]
                    {
                        let mut crates = source.crates.clone();
                        crates[chamber.idx(dest)] = true;
                        let player = player_tile(chamber, at);
                        found.push(
                            chamber.intern_layout(crates, source.annex_fill - 1, player).0,
                        );
                    }
                }
                continue;
            }
            if !chamber.in_grid(shove) || !source.crates[chamber.idx(shove)] {
                continue;
            }
            let dest = shove.step(direction);
            if chamber.in_entry_channel(dest) {
                // Crate leaves the chamber through the entrance.
                let mut crates = source.crates.clone();
                crates[chamber.idx(shove)] = false;
                found.push(
                    chamber
                        .intern_layout(crates, source.annex_fill, PlayerTile::At(shove))
                        .0,
                );
            } else if chamber.is_annex(dest) {
                if let Some(annex) = chamber.annex {
                    if source.annex_fill < annex.capacity {
                        let mut crates = source.crates.clone();
                        crates[chamber.idx(shove)] = false;
                        found.push(
                            chamber
                                .intern_layout(crates, source.annex_fill + 1, PlayerTile::At(shove))
                                .0,
                        );
                    }
                }
            } else if chamber.open_at(dest)
                && !chamber.locked_at(dest)
                && !source.crates[chamber.idx(dest)]
            {
                let mut crates = source.crates.clone();
                crates[chamber.idx(shove)] = false;
                crates[chamber.idx(dest)] = true;
                found.push(
                    chamber
                        .intern_layout(crates, source.annex_fill, PlayerTile::At(shove))
                        .0,
                );
            }
        }
    }

    if source.player == RegionLabel::Outside {
        let door = chamber.door_pos();
        if chamber.open_at(door)
            && !chamber.locked_at(door)
            && !source.crates[chamber.idx(door)]
        {
            let mut crates = source.crates.clone();
            crates[chamber.idx(door)] = true;
            found.push(
                chamber
                    .intern_layout(crates, source.annex_fill, PlayerTile::Outside)
                    .0,
            );
        }
    }

    found.sort_unstable();
    found.dedup();
    found
}

/// All layouts reachable from `layout` by one pull: the player retreats one
/// tile and drags a crate (from the grid, a stocked annex, or the outside
/// supply at the entrance) onto the tile just vacated.
pub fn pull_successors(chamber: &mut Chamber, layout: usize) -> Vec<usize> {
    let source = chamber.layout(layout).clone();
    let mut found = Vec::new();
    let standable = standable_tiles(chamber, &source);

    for &at in &standable {
        for &direction in chamber.movement.directions() {
            let retreat = at.step(direction);
            if chamber.is_annex(retreat) {
                // Reverse of popping a crate out the far side of the annex:
                // the crate two tiles away slides back in while the player
                // holds position.
                if let Some(annex) = chamber.annex {
                    let dest = at.stride(direction, 2);
                    if source.annex_fill < annex.capacity
                        && chamber.in_grid(dest)
                        && source.crates[chamber.idx(dest)]
                    {
                        let mut crates = source.crates.clone();
                        crates[chamber.idx(dest)] = false;
                        let player = player_tile(chamber, at);
                        found.push(
                            chamber.intern_layout(crates, source.annex_fill + 1, player).0,
                        );
                    }
                }
                continue;
            }
            let retreat_ok = chamber.in_entry_channel(retreat)
                || (chamber.open_at(retreat) && !source.crates[chamber.idx(retreat)]);
            if !retreat_ok {
                continue;
            }
            let from = at.step(direction.opposite());

            let mut crates = source.crates.clone();
            let mut fill = source.annex_fill;
            if chamber.in_grid(from) && source.crates[chamber.idx(from)] {
                crates[chamber.idx(from)] = false;
            } else if chamber.is_annex(from) && source.annex_fill > 0 {
                fill -= 1;
            } else if chamber.in_entry_channel(from) {
                // Fresh crate dragged in from the outside supply.
            } else {
                continue;
            }

            if chamber.in_entry_channel(at) {
                // The crate lands outside the chamber and is gone; dragging
                // a channel crate onto the channel changes nothing.
                if chamber.in_entry_channel(from) {
                    continue;
                }
            } else {
                if chamber.locked_at(at) {
                    continue;
                }
                crates[chamber.idx(at)] = true;
            }

            let player = if chamber.in_entry_channel(retreat) {
                PlayerTile::Outside
            } else {
                PlayerTile::At(retreat)
            };
            found.push(chamber.intern_layout(crates, fill, player).0);
        }
    }

    found.sort_unstable();
    found.dedup();
    found
}

/// Closes the layout arena under pushes and records every edge. Gives up
/// with `None` once the arena outgrows `cap`.
pub fn explore_pushes(chamber: &mut Chamber, cap: usize) -> Option<PushGraph> {
    let mut edges: Vec<Vec<u32>> = Vec::new();
    while edges.len() < chamber.layout_count() {
        if chamber.layout_count() > cap {
            debug!(
                "push exploration abandoned at {} layouts (cap {})",
                chamber.layout_count(),
                cap,
            );
            return None;
        }
        let layout = edges.len();
        let successors = push_successors(chamber, layout);
        edges.push(successors.into_iter().map(|s| s as u32).collect());
    }
    Some(PushGraph { edges })
}

/// Resolves the loopgroup representative for a layout, compressing the
/// pointer chain on the way.
pub fn find_loopgroup(chamber: &mut Chamber, layout: usize) -> usize {
    let mut root = layout;
    while chamber.layout(root).solution.loopgroup != root {
        root = chamber.layout(root).solution.loopgroup;
    }
    let mut at = layout;
    while at != root {
        let next = chamber.layout(at).solution.loopgroup;
        chamber.layout_mut(at).solution.loopgroup = root;
        at = next;
    }
    root
}

/// Collapses strongly connected components of the push graph into
/// loopgroups. Iterative path-based search; the component root becomes the
/// representative.
pub fn assign_loopgroups(chamber: &mut Chamber, graph: &PushGraph) {
    let count = graph.edges.len();
    let mut preorder = vec![usize::MAX; count];
    let mut assigned = vec![false; count];
    let mut open: Vec<usize> = Vec::new();
    let mut boundary: Vec<usize> = Vec::new();
    let mut next_preorder = 0_usize;

    for root in 0..count {
        if preorder[root] != usize::MAX {
            continue;
        }
        preorder[root] = next_preorder;
        next_preorder += 1;
        open.push(root);
        boundary.push(root);
        let mut call: Vec<(usize, usize)> = vec![(root, 0)];

        loop {
            let Some(frame) = call.last_mut() else { break };
            let vertex = frame.0;
            let pending = if frame.1 < graph.edges[vertex].len() {
                let edge = graph.edges[vertex][frame.1] as usize;
                frame.1 += 1;
                Some(edge)
            } else {
                None
            };
            match pending {
                Some(next) if preorder[next] == usize::MAX => {
                    preorder[next] = next_preorder;
                    next_preorder += 1;
                    open.push(next);
                    boundary.push(next);
                    call.push((next, 0));
                }
                Some(next) => {
                    if !assigned[next] {
                        while let Some(&top) = boundary.last() {
                            if preorder[top] > preorder[next] {
                                boundary.pop();
                            } else {
                                break;
                            }
                        }
                    }
                }
                None => {
                    call.pop();
                    if boundary.last() == Some(&vertex) {
                        boundary.pop();
                        while let Some(member) = open.pop() {
                            assigned[member] = true;
                            chamber.layout_mut(member).solution.loopgroup = vertex;
                            if member == vertex {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Computes a difficulty for every layout: the number of distinct solved
/// loopgroups countable through one-way transitions. A transition is
/// one-way when it crosses loopgroups without raising the crate total, and
/// a loopgroup is solved when it holds a layout with the player outside and
/// exactly `target_count` crates placed.
pub fn compute_difficulty(chamber: &mut Chamber, graph: &PushGraph, target_count: u32) {
    assign_loopgroups(chamber, graph);

    let count = graph.edges.len();
    let mut successors: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    let mut seeds: BTreeMap<usize, u64> = BTreeMap::new();
    for layout in 0..count {
        let group = find_loopgroup(chamber, layout);
        successors.entry(group).or_default();
        let entry = chamber.layout(layout);
        if entry.player == RegionLabel::Outside && entry.crate_count == target_count {
            seeds.insert(group, 1);
        }
        let total = entry.total_crates();
        let edges = graph.edges[layout].clone();
        for next in edges {
            let next = next as usize;
            let next_group = find_loopgroup(chamber, next);
            if next_group != group && chamber.layout(next).total_crates() <= total {
                successors.entry(group).or_default().insert(next_group);
            }
        }
    }

    let mut memo: BTreeMap<usize, u64> = BTreeMap::new();
    let groups: Vec<usize> = successors.keys().copied().collect();
    for group in groups {
        sum_difficulty(group, &successors, &seeds, &mut memo);
    }

    for layout in 0..count {
        let group = find_loopgroup(chamber, layout);
        let difficulty = memo.get(&group).copied().unwrap_or(0);
        chamber.layout_mut(layout).solution.difficulty = Some(difficulty);
    }
}

fn sum_difficulty(
    group: usize,
    successors: &BTreeMap<usize, BTreeSet<usize>>,
    seeds: &BTreeMap<usize, u64>,
    memo: &mut BTreeMap<usize, u64>,
) {
    // The condensation is acyclic, so an explicit two-phase stack visits
    // every group after its successors.
    let mut stack = vec![(group, false)];
    while let Some((at, expanded)) = stack.pop() {
        if memo.contains_key(&at) {
            continue;
        }
        if expanded {
            let mut total = seeds.get(&at).copied().unwrap_or(0);
            if let Some(next) = successors.get(&at) {
                for follower in next {
                    total += memo.get(follower).copied().unwrap_or(0);
                }
            }
            memo.insert(at, total);
        } else {
            stack.push((at, true));
            if let Some(next) = successors.get(&at) {
                for &follower in next {
                    if !memo.contains_key(&follower) {
                        stack.push((follower, false));
                    }
                }
            }
        }
    }
}

/// Breadth-first pull expansion from the given solved layouts. Records the
/// push distance and the replay successor on every layout discovered, and
/// returns the distance table. `None` once the arena outgrows `cap`.
pub fn pull_expand(
    chamber: &mut Chamber,
    seeds: &[usize],
    cap: usize,
) -> Option<Vec<Option<u32>>> {
    let mut distance: Vec<Option<u32>> = vec![None; chamber.layout_count()];
    let mut queue: VecDeque<(usize, u32)> = VecDeque::new();
    for &seed in seeds {
        if distance[seed].is_none() {
            distance[seed] = Some(0);
            queue.push_back((seed, 0));
        }
    }
    while let Some((at, steps)) = queue.pop_front() {
        for found in pull_successors(chamber, at) {
            if chamber.layout_count() > cap {
                debug!(
                    "pull expansion abandoned at {} layouts (cap {})",
                    chamber.layout_count(),
                    cap,
                );
                return None;
            }
            if found >= distance.len() {
                distance.resize(chamber.layout_count(), None);
            }
            if distance[found].is_none() {
                distance[found] = Some(steps + 1);
                let solution = &mut chamber.layout_mut(found).solution;
                solution.pushes = steps + 1;
                solution.next = Some(at);
                queue.push_back((found, steps + 1));
            }
        }
    }
    distance.resize(chamber.layout_count(), None);
    Some(distance)
}

/// Largest crate count reachable with the player outside; how many crates
/// the chamber can meaningfully hold.
pub fn outside_capacity(chamber: &Chamber) -> u32 {
    chamber
        .layouts()
        .iter()
        .filter(|layout| layout.player == RegionLabel::Outside)
        .map(|layout| layout.crate_count)
        .max()
        .unwrap_or(0)
}

/// Deepest pull-discovered layout with the player outside and the given
/// crate count. Earlier layout indices win ties.
pub fn furthest_layout(
    chamber: &Chamber,
    distance: &[Option<u32>],
    crate_count: u32,
) -> Option<usize> {
    let mut best: Option<(u32, usize)> = None;
    for (index, layout) in chamber.layouts().iter().enumerate() {
        if layout.player != RegionLabel::Outside || layout.crate_count != crate_count {
            continue;
        }
        let Some(Some(steps)) = distance.get(index).copied() else { continue };
        if best.is_none_or(|(record, _)| steps > record) {
            best = Some((steps, index));
        }
    }
    best.map(|(_, index)| index)
}

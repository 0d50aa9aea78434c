//! Puzzle assembly and pathfinding. A chosen layout is flattened into a
//! bordered tile grid with explicit exits, and the pathfinder answers
//! point-to-point queries over that grid without allocating a priority
//! queue.

use std::collections::VecDeque;

use crate::chamber::Chamber;
use crate::rng::Sampler;
use crate::types::{Direction, MovementMode, Pos, RegionLabel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PuzzleBase {
    Floor,
    Wall,
    Target,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PuzzleTile {
    pub base: PuzzleBase,
    pub has_crate: bool,
    pub has_player: bool,
}

const SOLID: PuzzleTile = PuzzleTile { base: PuzzleBase::Wall, has_crate: false, has_player: false };

/// A finished, boundary-walled puzzle grid. Immutable after assembly apart
/// from the pathfinder's transient visit marks, which are always undone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Puzzlerect {
    pub width: usize,
    pub height: usize,
    tiles: Vec<PuzzleTile>,
    /// Doorway coordinates: the entrance exit, then the annex doorway if
    /// the chamber had one.
    pub connections: Vec<Pos>,
    pub movement: MovementMode,
}

impl Puzzlerect {
    fn idx(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
    }

    pub fn tile(&self, pos: Pos) -> &PuzzleTile {
        &self.tiles[self.idx(pos)]
    }

    pub fn player_pos(&self) -> Option<Pos> {
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos { y: y as i32, x: x as i32 };
                if self.tiles[self.idx(pos)].has_player {
                    return Some(pos);
                }
            }
        }
        None
    }
}

/// Flattens one layout into a bordered grid. The entrance becomes an exit
/// tile in the bottom border (behind an extra buffer row under diagonal
/// movement), the annex becomes floor with a second exit in the top border,
/// and the player lands on one sampled tile of their region.
pub fn puzzle_from_layout(
    chamber: &Chamber,
    layout_index: usize,
    sampler: &mut impl Sampler,
) -> Puzzlerect {
    let layout = chamber.layout(layout_index);
    let buffered = chamber.movement == MovementMode::Diagonal;
    let width = chamber.width + 2;
    let height = chamber.height + 2 + usize::from(buffered);
    let mut tiles = vec![SOLID; width * height];

    for y in 0..chamber.height {
        for x in 0..chamber.width {
            let src = y * chamber.width + x;
            let pos = Pos { y: y as i32, x: x as i32 };
            let base = if chamber.is_annex(pos) {
                PuzzleBase::Floor
            } else if chamber.walls[src] {
                PuzzleBase::Wall
            } else if chamber.targets[src] {
                PuzzleBase::Target
            } else {
                PuzzleBase::Floor
            };
            let tile = &mut tiles[(y + 1) * width + x + 1];
            tile.base = base;
            tile.has_crate = layout.crates[src];
        }
    }

    let exit_x = chamber.entry_col + 1;
    let exit_y = height - 1;
    if buffered {
        // Diagonal movement can cut corners, so the doorway gets a buffer
        // tile keeping the exit orthogonally aligned with the door.
        tiles[(height - 2) * width + exit_x].base = PuzzleBase::Floor;
    }
    tiles[exit_y * width + exit_x].base = PuzzleBase::Exit;
    let mut connections = vec![Pos { y: exit_y as i32, x: exit_x as i32 }];
    if let Some(annex) = chamber.annex {
        let doorway_x = annex.pos.x as usize + 1;
        tiles[doorway_x].base = PuzzleBase::Exit;
        connections.push(Pos { y: 0, x: doorway_x as i32 });
    }

    match layout.player {
        RegionLabel::Outside => {
            tiles[exit_y * width + exit_x].has_player = true;
        }
        label => {
            let members: Vec<usize> = (0..chamber.width * chamber.height)
                .filter(|&src| layout.regions[src] == label)
                .collect();
            debug_assert!(!members.is_empty());
            let src = members[sampler.below(members.len())];
            let (y, x) = (src / chamber.width, src % chamber.width);
            tiles[(y + 1) * width + x + 1].has_player = true;
        }
    }

    Puzzlerect { width, height, tiles, connections, movement: chamber.movement }
}

/// First step of a shortest path from `from` to `to`, or `None` when no
/// path exists (or the tiles coincide).
///
/// Searches backward from the destination with three queues keyed by
/// (traveled + heuristic) modulo 3; a step changes that score by at most
/// two, so the three buckets cover every live frontier value without a
/// priority queue. Visited tiles are marked as walls while searching and
/// restored before returning. `crates_block` makes crate tiles impassable,
/// except for the destination itself.
pub fn pathfind(
    puzzle: &mut Puzzlerect,
    crates_block: bool,
    from: Pos,
    to: Pos,
) -> Option<Direction> {
    if from == to || !puzzle.in_bounds(from) || !puzzle.in_bounds(to) {
        return None;
    }
    if puzzle.tile(to).base == PuzzleBase::Wall {
        return None;
    }

    let movement = puzzle.movement;
    let baseline = movement.lower_bound(to, from);
    let mut buckets: [VecDeque<(Pos, u32)>; 3] =
        [VecDeque::new(), VecDeque::new(), VecDeque::new()];
    let mut undo: Vec<(usize, PuzzleBase)> = Vec::new();

    let start_index = puzzle.idx(to);
    undo.push((start_index, puzzle.tiles[start_index].base));
    puzzle.tiles[start_index].base = PuzzleBase::Wall;
    buckets[0].push_back((to, 0));

    let mut level = 0_u32;
    let mut result = None;
    'search: loop {
        let bucket = (level % 3) as usize;
        if buckets.iter().all(VecDeque::is_empty) {
            break;
        }
        while let Some((at, traveled)) = buckets[bucket].pop_front() {
            for &direction in movement.directions() {
                let next = at.step(direction);
                if next == from {
                    result = Some(direction.opposite());
                    break 'search;
                }
                if !puzzle.in_bounds(next) {
                    continue;
                }
                let index = puzzle.idx(next);
                let tile = puzzle.tiles[index];
                if tile.base == PuzzleBase::Wall || (crates_block && tile.has_crate) {
                    continue;
                }
                undo.push((index, tile.base));
                puzzle.tiles[index].base = PuzzleBase::Wall;
                let score = traveled + 1 + movement.lower_bound(next, from) - baseline;
                buckets[(score % 3) as usize].push_back((next, traveled + 1));
            }
        }
        level += 1;
    }

    for (index, base) in undo {
        puzzle.tiles[index].base = base;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chamber::PlayerTile;
    use crate::locks::analyze_locks;
    use crate::rng::{ExhaustiveSampler, SeededSampler};
    use crate::types::Semantics;

    fn open_chamber() -> Chamber {
        let width = 4;
        let height = 3;
        let walls = vec![false; width * height];
        let analysis = analyze_locks(
            &walls,
            width,
            height,
            2,
            MovementMode::Orthogonal,
            Semantics::Storage,
            None,
        )
        .expect("open room is viable");
        Chamber::new(
            width,
            height,
            2,
            MovementMode::Orthogonal,
            Semantics::Storage,
            walls,
            vec![false; width * height],
            analysis,
        )
    }

    #[test]
    fn assembly_adds_a_border_and_an_exit_under_the_entrance() {
        let chamber = open_chamber();
        let puzzle = puzzle_from_layout(&chamber, 0, &mut ExhaustiveSampler);
        assert_eq!(puzzle.width, chamber.width + 2);
        assert_eq!(puzzle.height, chamber.height + 2);
        let exit = Pos { y: puzzle.height as i32 - 1, x: chamber.entry_col as i32 + 1 };
        assert_eq!(puzzle.tile(exit).base, PuzzleBase::Exit);
        assert_eq!(puzzle.connections, vec![exit]);
        // Outside player starts on the exit tile.
        assert_eq!(puzzle.player_pos(), Some(exit));
    }

    #[test]
    fn interior_player_lands_on_exactly_one_tile_of_their_region() {
        let mut chamber = open_chamber();
        let mut crates = vec![false; 12];
        crates[chamber.idx(Pos { y: 2, x: 2 })] = true;
        let (inside, _) =
            chamber.intern_layout(crates, 0, PlayerTile::At(Pos { y: 1, x: 1 }));
        let puzzle = puzzle_from_layout(&chamber, inside, &mut SeededSampler::new(1));
        let player = puzzle.player_pos().expect("player must be placed");
        assert_eq!(puzzle.tile(player).base, PuzzleBase::Floor);
        assert!(!puzzle.tile(player).has_crate);
        let placed = (0..puzzle.height as i32)
            .flat_map(|y| (0..puzzle.width as i32).map(move |x| Pos { y, x }))
            .filter(|&pos| puzzle.tile(pos).has_player)
            .count();
        assert_eq!(placed, 1);
    }

    #[test]
    fn diagonal_assembly_gets_a_buffer_row() {
        let width = 4;
        let height = 3;
        let walls = vec![false; width * height];
        let analysis = analyze_locks(
            &walls,
            width,
            height,
            2,
            MovementMode::Diagonal,
            Semantics::Storage,
            None,
        )
        .expect("open room is viable diagonally");
        let chamber = Chamber::new(
            width,
            height,
            2,
            MovementMode::Diagonal,
            Semantics::Storage,
            walls,
            vec![false; width * height],
            analysis,
        );
        let puzzle = puzzle_from_layout(&chamber, 0, &mut ExhaustiveSampler);
        assert_eq!(puzzle.height, chamber.height + 3);
        let buffer = Pos { y: puzzle.height as i32 - 2, x: chamber.entry_col as i32 + 1 };
        assert_eq!(puzzle.tile(buffer).base, PuzzleBase::Floor);
    }

    #[test]
    fn pathfinder_walks_a_straight_line_at_the_lower_bound() {
        let chamber = open_chamber();
        let mut puzzle = puzzle_from_layout(&chamber, 0, &mut ExhaustiveSampler);
        let from = Pos { y: 1, x: 1 };
        let to = Pos { y: 1, x: 4 };
        let mut at = from;
        let mut steps = 0;
        while at != to {
            let direction = pathfind(&mut puzzle, true, at, to)
                .expect("open row must be walkable");
            at = at.step(direction);
            steps += 1;
            assert!(steps <= 3, "path must not exceed the unobstructed lower bound");
        }
        assert_eq!(steps, 3);
    }

    #[test]
    fn pathfinder_restores_the_grid_it_scribbled_on() {
        let chamber = open_chamber();
        let mut puzzle = puzzle_from_layout(&chamber, 0, &mut ExhaustiveSampler);
        let pristine = puzzle.clone();
        let _ = pathfind(&mut puzzle, true, Pos { y: 1, x: 1 }, Pos { y: 3, x: 4 });
        let _ = pathfind(&mut puzzle, true, Pos { y: 1, x: 1 }, Pos { y: 0, x: 0 });
        assert_eq!(puzzle, pristine);
    }

    #[test]
    fn blocking_crates_cut_the_path_but_the_destination_may_hold_one() {
        let mut chamber = open_chamber();
        // Wall of crates down the column left of the entrance.
        let mut crates = vec![false; 12];
        for y in 0..3 {
            crates[chamber.idx(Pos { y, x: 1 })] = true;
        }
        let (walled, _) = chamber.intern_layout(crates, 0, PlayerTile::At(Pos { y: 1, x: 0 }));
        let mut puzzle = puzzle_from_layout(&chamber, walled, &mut SeededSampler::new(2));
        let from = Pos { y: 2, x: 1 };
        let beyond = Pos { y: 2, x: 3 };
        assert_eq!(pathfind(&mut puzzle, true, from, beyond), None);
        assert!(pathfind(&mut puzzle, false, from, beyond).is_some());
        // A crate tile is a legal destination even when crates block.
        let crate_tile = Pos { y: 2, x: 2 };
        assert!(puzzle.tile(crate_tile).has_crate);
        assert!(pathfind(&mut puzzle, true, from, crate_tile).is_some());
    }
}

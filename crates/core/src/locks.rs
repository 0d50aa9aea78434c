//! Lock analysis. Classifies every open tile of a candidate chamber as
//! locked (a crate parked there can never leave) or unlocked, and rejects
//! geometry that cannot host a usable puzzle.

use crate::types::{MovementMode, Pos, Semantics};

#[derive(Clone, Debug)]
pub struct LockAnalysis {
    pub locked: Vec<bool>,
    pub outside: Vec<bool>,
    pub unlocked_tiles: usize,
}

struct Grid<'a> {
    walls: &'a [bool],
    width: usize,
    height: usize,
    entry_col: usize,
    annex: Option<Pos>,
}

impl Grid<'_> {
    fn idx(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }

    fn in_grid(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
    }

    fn in_entry_channel(&self, pos: Pos) -> bool {
        pos.x == self.entry_col as i32 && pos.y >= self.height as i32
    }

    fn open_at(&self, pos: Pos) -> bool {
        self.in_grid(pos) && !self.walls[self.idx(pos)] && Some(pos) != self.annex
    }

    fn wall_at(&self, pos: Pos) -> bool {
        if self.in_grid(pos) {
            self.walls[self.idx(pos)] || Some(pos) == self.annex
        } else {
            !self.in_entry_channel(pos)
        }
    }

    fn entry_pos(&self) -> Pos {
        Pos { y: self.height as i32, x: self.entry_col as i32 }
    }

    fn door_pos(&self) -> Pos {
        Pos { y: self.height as i32 - 1, x: self.entry_col as i32 }
    }
}

/// Classifies every open tile as locked or unlocked and computes which open
/// tiles connect to the entrance. Returns `None` when the geometry is
/// rejected: fewer than two unlocked tiles, or a 2x2 plaza of dead
/// entrance-connected tiles.
#[allow(clippy::too_many_arguments)]
pub fn analyze_locks(
    walls: &[bool],
    width: usize,
    height: usize,
    entry_col: usize,
    movement: MovementMode,
    semantics: Semantics,
    annex_as_wall: Option<Pos>,
) -> Option<LockAnalysis> {
    let grid = Grid { walls, width, height, entry_col, annex: annex_as_wall };
    let mut locked = vec![true; width * height];

    // Pull fill: a tile is provisionally unlocked when a crate standing at
    // the entrance can be pulled onto it tile by tile. The crate moves from
    // A to B = A + d with the player retreating through C = A + 2d.
    let mut worklist = vec![grid.entry_pos()];
    while let Some(at) = worklist.pop() {
        for &direction in movement.directions() {
            let to = at.step(direction);
            let player = at.stride(direction, 2);
            if grid.open_at(to) && locked[grid.idx(to)] && !grid.wall_at(player) {
                locked[grid.idx(to)] = false;
                worklist.push(to);
            }
        }
    }

    // Chokepoint fixed point: an unlocked tile stays unlocked only while a
    // crate parked on it can still be pulled away by a player who entered
    // around it. Relocking one tile can strand another, so iterate.
    loop {
        let mut changed = false;
        for y in 0..height {
            for x in 0..width {
                let tile = Pos { y: y as i32, x: x as i32 };
                if !grid.open_at(tile) || locked[grid.idx(tile)] {
                    continue;
                }
                if !crate_is_movable(&grid, movement, semantics, tile) {
                    locked[grid.idx(tile)] = true;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    // An unlocked pocket the entrance only reaches across locked tiles is
    // unusable; a crate pulled there could never continue outward.
    let reachable_unlocked = fill_from_door(&grid, movement, |pos| {
        grid.open_at(pos) && !locked[grid.idx(pos)]
    });
    for index in 0..walls.len() {
        if !locked[index] && !reachable_unlocked[index] {
            locked[index] = true;
        }
    }

    let outside = fill_from_door(&grid, movement, |pos| grid.open_at(pos));

    let unlocked_tiles = (0..walls.len())
        .filter(|&index| !grid.walls[index] && !locked[index])
        .count();
    if unlocked_tiles < 2 {
        return None;
    }
    if has_dead_plaza(&grid, &locked, &outside) {
        return None;
    }

    Some(LockAnalysis { locked, outside, unlocked_tiles })
}

/// Whether a lone crate at `tile` can be pulled off it. The player walks
/// any open tile (locked ones included) that the crate does not occupy.
fn crate_is_movable(
    grid: &Grid<'_>,
    movement: MovementMode,
    semantics: Semantics,
    tile: Pos,
) -> bool {
    let door = grid.door_pos();
    let mut reached = vec![false; grid.width * grid.height];
    if door != tile && grid.open_at(door) {
        reached[grid.idx(door)] = true;
        let mut worklist = vec![door];
        while let Some(at) = worklist.pop() {
            for &direction in movement.directions() {
                let next = at.step(direction);
                if next != tile && grid.open_at(next) && !reached[grid.idx(next)] {
                    reached[grid.idx(next)] = true;
                    worklist.push(next);
                }
            }
        }
    }

    for &direction in movement.directions() {
        let destination = tile.step(direction.opposite());
        let player = tile.stride(direction.opposite(), 2);
        if grid.wall_at(destination) {
            continue;
        }
        let player_ok = grid.in_entry_channel(player)
            || (grid.in_grid(player) && reached[grid.idx(player)])
            // Feed chambers are filled by pushing, so the pulling player
            // only has to have somewhere to stand, not a route to it.
            || (semantics == Semantics::Feed && !grid.wall_at(player));
        if player_ok {
            return true;
        }
    }
    false
}

fn fill_from_door(
    grid: &Grid<'_>,
    movement: MovementMode,
    passable: impl Fn(Pos) -> bool,
) -> Vec<bool> {
    let mut reached = vec![false; grid.width * grid.height];
    let door = grid.door_pos();
    if !passable(door) {
        return reached;
    }
    reached[grid.idx(door)] = true;
    let mut worklist = vec![door];
    while let Some(at) = worklist.pop() {
        for &direction in movement.directions() {
            let next = at.step(direction);
            if grid.in_grid(next) && passable(next) && !reached[grid.idx(next)] {
                reached[grid.idx(next)] = true;
                worklist.push(next);
            }
        }
    }
    reached
}

/// A 2x2 block of entrance-connected locked tiles is a plaza the player
/// strolls through without ever moving a crate; such chambers read as
/// empty rooms, not puzzles.
fn has_dead_plaza(grid: &Grid<'_>, locked: &[bool], outside: &[bool]) -> bool {
    for y in 0..grid.height.saturating_sub(1) {
        for x in 0..grid.width.saturating_sub(1) {
            let block = [
                Pos { y: y as i32, x: x as i32 },
                Pos { y: y as i32, x: x as i32 + 1 },
                Pos { y: y as i32 + 1, x: x as i32 },
                Pos { y: y as i32 + 1, x: x as i32 + 1 },
            ];
            let dead = block.iter().all(|&pos| {
                grid.open_at(pos) && locked[grid.idx(pos)] && outside[grid.idx(pos)]
            });
            if dead {
                return true;
            }
        }
    }
    false
}

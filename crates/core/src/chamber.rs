//! Chamber and layout arena. A chamber owns its wall geometry, the lock
//! analysis of that geometry, and every crate arrangement discovered for it,
//! addressed by stable integer index with a content-hash lookup.

use std::collections::HashMap;

use xxhash_rust::xxh3::xxh3_64;

use crate::locks::{LockAnalysis, analyze_locks};
use crate::types::{MovementMode, Pos, RegionLabel, Semantics};

pub const DEFAULT_ANNEX_CAPACITY: u8 = 3;

/// A capacity-bounded crate reservoir occupying one top-row tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Annex {
    pub pos: Pos,
    pub capacity: u8,
}

/// Where the player stands when a layout is created. Interning only keeps
/// the reachability class, never the literal coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerTile {
    Outside,
    At(Pos),
}

/// Per-layout solver bookkeeping, owned by exactly one layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Count of one-way transitions reachable from this layout's loopgroup.
    /// `None` until a calibration run computes it.
    pub difficulty: Option<u64>,
    /// Union-find pointer collapsing mutually reversible layouts.
    pub loopgroup: usize,
    /// Push distance assigned by the furthest-layout search.
    pub pushes: u32,
    /// Successor on the replay chain toward a solved arrangement.
    pub next: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Layout {
    pub crates: Vec<bool>,
    pub annex_fill: u8,
    /// Reachability class the player occupies; `Outside` or `Component(_)`.
    pub player: RegionLabel,
    pub regions: Vec<RegionLabel>,
    pub region_count: u16,
    pub crate_count: u32,
    pub solution: Solution,
}

impl Layout {
    pub fn total_crates(&self) -> u32 {
        self.crate_count + u32::from(self.annex_fill)
    }
}

#[derive(Clone, Debug)]
pub struct Chamber {
    pub width: usize,
    pub height: usize,
    /// Column of the entrance, conceptually one row below the grid.
    pub entry_col: usize,
    pub movement: MovementMode,
    pub semantics: Semantics,
    pub walls: Vec<bool>,
    pub targets: Vec<bool>,
    pub locked: Vec<bool>,
    pub outside: Vec<bool>,
    pub unlocked_tiles: usize,
    pub annex: Option<Annex>,
    layouts: Vec<Layout>,
    index: HashMap<u64, Vec<usize>>,
}

impl Chamber {
    pub fn new(
        width: usize,
        height: usize,
        entry_col: usize,
        movement: MovementMode,
        semantics: Semantics,
        walls: Vec<bool>,
        targets: Vec<bool>,
        analysis: LockAnalysis,
    ) -> Self {
        debug_assert_eq!(walls.len(), width * height);
        debug_assert!(entry_col < width);
        let mut chamber = Self {
            width,
            height,
            entry_col,
            movement,
            semantics,
            walls,
            targets,
            locked: analysis.locked,
            outside: analysis.outside,
            unlocked_tiles: analysis.unlocked_tiles,
            annex: None,
            layouts: Vec::new(),
            index: HashMap::new(),
        };
        let base = vec![false; width * height];
        chamber.intern_layout(base, 0, PlayerTile::Outside);
        chamber
    }

    pub fn idx(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }

    pub fn in_grid(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
    }

    /// Virtual tile just below the grid through which crates and the player
    /// enter and leave.
    pub fn entry_pos(&self) -> Pos {
        Pos { y: self.height as i32, x: self.entry_col as i32 }
    }

    /// Interior tile adjacent to the entrance.
    pub fn door_pos(&self) -> Pos {
        Pos { y: self.height as i32 - 1, x: self.entry_col as i32 }
    }

    /// The open corridor of the outside world below the entrance column.
    pub fn in_entry_channel(&self, pos: Pos) -> bool {
        pos.x == self.entry_col as i32 && pos.y >= self.height as i32
    }

    pub fn is_annex(&self, pos: Pos) -> bool {
        self.annex.is_some_and(|annex| annex.pos == pos)
    }

    /// Open interior tile: inside the grid, not a wall, not the annex.
    pub fn open_at(&self, pos: Pos) -> bool {
        self.in_grid(pos) && !self.walls[self.idx(pos)] && !self.is_annex(pos)
    }

    /// Anything a crate or player can never occupy or pass through.
    pub fn wall_at(&self, pos: Pos) -> bool {
        if self.in_grid(pos) {
            self.walls[self.idx(pos)] || self.is_annex(pos)
        } else {
            !self.in_entry_channel(pos)
        }
    }

    pub fn locked_at(&self, pos: Pos) -> bool {
        self.in_grid(pos) && self.locked[self.idx(pos)]
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn layout(&self, index: usize) -> &Layout {
        &self.layouts[index]
    }

    pub fn layout_mut(&mut self, index: usize) -> &mut Layout {
        &mut self.layouts[index]
    }

    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// Labels every open tile with its connectivity class for the given
    /// crate occupancy. Explicit worklist; component numbers follow scan
    /// order so the labeling is canonical.
    pub fn label_regions(&self, crates: &[bool]) -> (Vec<RegionLabel>, u16) {
        let mut labels = vec![RegionLabel::Blocked; self.width * self.height];
        let passable = |pos: Pos| self.open_at(pos) && !crates[self.idx(pos)];

        let door = self.door_pos();
        if passable(door) {
            self.flood(&mut labels, door, RegionLabel::Outside, &passable);
        }

        let mut count = 0_u16;
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos { y: y as i32, x: x as i32 };
                if passable(pos) && labels[self.idx(pos)] == RegionLabel::Blocked {
                    self.flood(&mut labels, pos, RegionLabel::Component(count), &passable);
                    count += 1;
                }
            }
        }
        (labels, count)
    }

    fn flood(
        &self,
        labels: &mut [RegionLabel],
        start: Pos,
        label: RegionLabel,
        passable: &dyn Fn(Pos) -> bool,
    ) {
        labels[self.idx(start)] = label;
        let mut worklist = vec![start];
        while let Some(pos) = worklist.pop() {
            for &direction in self.movement.directions() {
                let next = pos.step(direction);
                if self.in_grid(next)
                    && passable(next)
                    && labels[self.idx(next)] == RegionLabel::Blocked
                {
                    labels[self.idx(next)] = label;
                    worklist.push(next);
                }
            }
        }
    }

    /// Looks the occupancy up by content hash and either returns the
    /// existing layout index or inserts a new layout. Identity is occupancy
    /// plus the player's reachability class, never literal coordinates.
    pub fn intern_layout(
        &mut self,
        crates: Vec<bool>,
        annex_fill: u8,
        player: PlayerTile,
    ) -> (usize, bool) {
        let (regions, region_count) = self.label_regions(&crates);
        let player_label = match player {
            PlayerTile::Outside => RegionLabel::Outside,
            PlayerTile::At(pos) => {
                let label = regions[self.idx(pos)];
                debug_assert_ne!(label, RegionLabel::Blocked);
                label
            }
        };
        let hash = layout_hash(&crates, annex_fill, player_label);
        if let Some(bucket) = self.index.get(&hash) {
            for &existing in bucket {
                let layout = &self.layouts[existing];
                if layout.crates == crates
                    && layout.annex_fill == annex_fill
                    && layout.player == player_label
                {
                    return (existing, false);
                }
            }
        }

        let crate_count = crates.iter().filter(|&&occupied| occupied).count() as u32;
        let index = self.layouts.len();
        self.layouts.push(Layout {
            crates,
            annex_fill,
            player: player_label,
            regions,
            region_count,
            crate_count,
            solution: Solution { difficulty: None, loopgroup: index, pushes: 0, next: None },
        });
        self.index.entry(hash).or_default().push(index);
        (index, true)
    }

    /// Converts an open top-row tile into an annex and re-runs the lock
    /// analysis with the annex opaque. Refuses (and leaves the chamber
    /// untouched) when the tile is unusable or the re-analysis rejects.
    pub fn attach_annex(&mut self, col: usize, capacity: u8) -> bool {
        let pos = Pos { y: 0, x: col as i32 };
        if !self.in_grid(pos) || self.walls[self.idx(pos)] || self.annex.is_some() {
            return false;
        }
        let Some(analysis) = analyze_locks(
            &self.walls,
            self.width,
            self.height,
            self.entry_col,
            self.movement,
            self.semantics,
            Some(pos),
        ) else {
            return false;
        };

        self.annex = Some(Annex { pos, capacity });
        self.locked = analysis.locked;
        self.outside = analysis.outside;
        self.unlocked_tiles = analysis.unlocked_tiles;
        self.layouts.clear();
        self.index.clear();
        let fill = match self.semantics {
            Semantics::Storage => capacity,
            Semantics::Feed => 0,
        };
        let base = vec![false; self.width * self.height];
        self.intern_layout(base, fill, PlayerTile::Outside);
        true
    }

    /// Stable byte rendering of the chamber geometry, for fingerprinting.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        bytes.extend((self.entry_col as u32).to_le_bytes());
        for &wall in &self.walls {
            bytes.push(u8::from(wall));
        }
        for &locked in &self.locked {
            bytes.push(u8::from(locked));
        }
        if let Some(annex) = self.annex {
            bytes.push(1);
            bytes.push(annex.capacity);
            bytes.extend(annex.pos.x.to_le_bytes());
        } else {
            bytes.push(0);
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

fn layout_hash(crates: &[bool], annex_fill: u8, player: RegionLabel) -> u64 {
    let mut bytes = Vec::with_capacity(crates.len() + 3);
    for &occupied in crates {
        bytes.push(u8::from(occupied));
    }
    bytes.push(annex_fill);
    match player {
        RegionLabel::Outside => bytes.extend([0xFF, 0xFF]),
        RegionLabel::Component(id) => bytes.extend(id.to_le_bytes()),
        RegionLabel::Blocked => unreachable!("player never occupies a blocked tile"),
    }
    xxh3_64(&bytes)
}

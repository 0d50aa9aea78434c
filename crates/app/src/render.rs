//! ASCII rendering of puzzles and raw chamber analyses.
//!
//! Vocabulary: `#` wall, `.` floor, `+` target, `>` exit/doorway, `o` crate,
//! `@` player, `!` locked tile, digits for interior region ids.

use sokogen_core::{Chamber, Pos, PuzzleBase, Puzzlerect, RegionLabel};

pub fn render_puzzle(puzzle: &Puzzlerect) -> String {
    let mut out = String::with_capacity((puzzle.width + 1) * puzzle.height);
    for y in 0..puzzle.height {
        for x in 0..puzzle.width {
            let tile = puzzle.tile(Pos { y: y as i32, x: x as i32 });
            let glyph = if tile.has_player {
                '@'
            } else if tile.has_crate {
                'o'
            } else {
                match tile.base {
                    PuzzleBase::Wall => '#',
                    PuzzleBase::Floor => '.',
                    PuzzleBase::Target => '+',
                    PuzzleBase::Exit => '>',
                }
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

/// Renders one layout of a bare chamber, optionally exposing the lock
/// analysis and the connectivity labels.
pub fn render_chamber(
    chamber: &Chamber,
    layout_index: usize,
    show_regions: bool,
    show_locks: bool,
) -> String {
    let layout = chamber.layout(layout_index);
    let mut out = String::with_capacity((chamber.width + 1) * chamber.height);
    for y in 0..chamber.height {
        for x in 0..chamber.width {
            let i = y * chamber.width + x;
            let pos = Pos { y: y as i32, x: x as i32 };
            let glyph = if chamber.walls[i] {
                '#'
            } else if chamber.is_annex(pos) {
                '>'
            } else if layout.crates[i] {
                'o'
            } else if show_locks && chamber.locked[i] {
                '!'
            } else if show_regions {
                match layout.regions[i] {
                    RegionLabel::Outside => '.',
                    RegionLabel::Component(id) => {
                        char::from_digit(u32::from(id) % 10, 10).unwrap_or('?')
                    }
                    RegionLabel::Blocked => '?',
                }
            } else if chamber.targets[i] {
                '+'
            } else {
                '.'
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

//! Text chamber parser. Reads a bordered ASCII grid (`-` top and bottom,
//! `|` sides, space for wall, `*` for target floor, `@` marking the
//! entrance column on the bottom interior row) into a chamber with its
//! base layout.

use std::fmt;

use crate::chamber::Chamber;
use crate::locks::analyze_locks;
use crate::types::{MovementMode, Semantics};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Fewer than three lines, or a border row that is not all dashes.
    MissingBorder,
    /// Rows of uneven length, or interior rows without `|` side walls.
    RaggedBorder,
    MissingEntrance,
    DuplicateEntrance,
    /// The `@` must sit on the bottom interior row.
    MisplacedEntrance,
    /// The grid parsed but the lock analysis refused it.
    RejectedStructure,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ParseError::MissingBorder => "chamber text must be fenced by dashed border rows",
            ParseError::RaggedBorder => "chamber rows must be equally wide and walled with '|'",
            ParseError::MissingEntrance => "chamber needs exactly one '@' entrance marker",
            ParseError::DuplicateEntrance => "chamber has more than one '@' entrance marker",
            ParseError::MisplacedEntrance => "the '@' entrance must be on the bottom interior row",
            ParseError::RejectedStructure => "chamber geometry cannot host a puzzle",
        };
        f.write_str(message)
    }
}

impl std::error::Error for ParseError {}

/// Parses a bordered text grid into a chamber with layout 0 interned.
pub fn parse_chamber(
    text: &str,
    movement: MovementMode,
    semantics: Semantics,
) -> Result<Chamber, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 3 {
        return Err(ParseError::MissingBorder);
    }
    let outer_width = lines[0].chars().count();
    if outer_width < 3 {
        return Err(ParseError::RaggedBorder);
    }
    let border_ok = |line: &str| line.chars().all(|c| c == '-');
    if !border_ok(lines[0]) || !border_ok(lines[lines.len() - 1]) {
        return Err(ParseError::MissingBorder);
    }
    if lines[lines.len() - 1].chars().count() != outer_width {
        return Err(ParseError::RaggedBorder);
    }

    let width = outer_width - 2;
    let height = lines.len() - 2;
    let mut walls = vec![true; width * height];
    let mut targets = vec![false; width * height];
    let mut entrance: Option<(usize, usize)> = None;

    for (y, line) in lines[1..lines.len() - 1].iter().enumerate() {
        let cells: Vec<char> = line.chars().collect();
        if cells.len() != outer_width
            || cells[0] != '|'
            || cells[outer_width - 1] != '|'
        {
            return Err(ParseError::RaggedBorder);
        }
        for (x, &cell) in cells[1..outer_width - 1].iter().enumerate() {
            match cell {
                ' ' => {}
                '*' => {
                    walls[y * width + x] = false;
                    targets[y * width + x] = true;
                }
                '@' => {
                    if entrance.is_some() {
                        return Err(ParseError::DuplicateEntrance);
                    }
                    entrance = Some((y, x));
                    walls[y * width + x] = false;
                }
                _ => {
                    walls[y * width + x] = false;
                }
            }
        }
    }

    let Some((entry_row, entry_col)) = entrance else {
        return Err(ParseError::MissingEntrance);
    };
    if entry_row != height - 1 {
        return Err(ParseError::MisplacedEntrance);
    }

    let analysis = analyze_locks(
        &walls,
        width,
        height,
        entry_col,
        movement,
        semantics,
        None,
    )
    .ok_or(ParseError::RejectedStructure)?;
    Ok(Chamber::new(
        width,
        height,
        entry_col,
        movement,
        semantics,
        walls,
        targets,
        analysis,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN_ROOM: &str = "\
------
|....|
|....|
|..@.|
------";

    fn parse(text: &str) -> Result<Chamber, ParseError> {
        parse_chamber(text, MovementMode::Orthogonal, Semantics::Storage)
    }

    #[test]
    fn open_room_parses_with_rim_locks_only() {
        let chamber = parse(OPEN_ROOM).expect("open room parses");
        assert_eq!((chamber.width, chamber.height), (4, 3));
        assert_eq!(chamber.entry_col, 2);
        assert!(chamber.walls.iter().all(|&wall| !wall));
        let locked: Vec<usize> = (0..12).filter(|&i| chamber.locked[i]).collect();
        assert_eq!(locked, vec![0, 1, 2, 3, 4, 7, 8, 11]);
        assert_eq!(chamber.layout_count(), 1);
    }

    #[test]
    fn targets_survive_parsing() {
        let text = "\
------
|.*..|
|....|
|..@.|
------";
        let chamber = parse(text).expect("target room parses");
        assert!(chamber.targets[1]);
        assert!(!chamber.walls[1]);
    }

    #[test]
    fn entrance_must_exist_exactly_once_on_the_bottom_row() {
        let missing = OPEN_ROOM.replace('@', ".");
        assert_eq!(parse(&missing).unwrap_err(), ParseError::MissingEntrance);

        let doubled = OPEN_ROOM.replacen('.', "@", 1);
        assert_eq!(parse(&doubled).unwrap_err(), ParseError::DuplicateEntrance);

        let misplaced = "\
------
|..@.|
|....|
|....|
------";
        assert_eq!(parse(misplaced).unwrap_err(), ParseError::MisplacedEntrance);
    }

    #[test]
    fn borders_are_checked_before_anything_else() {
        assert_eq!(parse("|..|").unwrap_err(), ParseError::MissingBorder);

        let ragged = "\
------
|....|
|...|
|..@.|
------";
        assert_eq!(parse(ragged).unwrap_err(), ParseError::RaggedBorder);

        let short_bottom = "\
------
|....|
|..@.|
---";
        assert_eq!(parse(short_bottom).unwrap_err(), ParseError::RaggedBorder);
    }

    #[test]
    fn unusable_geometry_is_a_typed_rejection() {
        let cramped = "\
---
|@|
---";
        assert_eq!(parse(cramped).unwrap_err(), ParseError::RejectedStructure);
    }
}

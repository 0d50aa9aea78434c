//! Machine-readable summary of a generated or parsed chamber.

use serde::Serialize;
use sokogen_core::{Chamber, MovementMode, Semantics};

#[derive(Serialize)]
pub struct AnnexReport {
    pub col: i32,
    pub capacity: u8,
}

#[derive(Serialize)]
pub struct ChamberReport {
    pub width: usize,
    pub height: usize,
    pub entry_col: usize,
    pub movement: MovementMode,
    pub semantics: Semantics,
    pub unlocked_tiles: usize,
    pub layout_count: usize,
    pub fingerprint: String,
    pub annex: Option<AnnexReport>,
    pub start_layout: Option<usize>,
    pub difficulty: Option<u64>,
    pub pushes: Option<u32>,
    pub rows: Vec<String>,
}

pub fn chamber_report(chamber: &Chamber, start: Option<usize>) -> ChamberReport {
    let shown = start.unwrap_or(0);
    let solution = chamber.layout(shown).solution;
    ChamberReport {
        width: chamber.width,
        height: chamber.height,
        entry_col: chamber.entry_col,
        movement: chamber.movement,
        semantics: chamber.semantics,
        unlocked_tiles: chamber.unlocked_tiles,
        layout_count: chamber.layout_count(),
        fingerprint: format!("{:016x}", chamber.fingerprint()),
        annex: chamber
            .annex
            .map(|annex| AnnexReport { col: annex.pos.x, capacity: annex.capacity }),
        start_layout: start,
        difficulty: solution.difficulty,
        pushes: start.map(|_| solution.pushes),
        rows: crate::render::render_chamber(chamber, shown, false, false)
            .lines()
            .map(str::to_owned)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sokogen_core::parse_chamber;

    #[test]
    fn report_carries_geometry_and_art() {
        let chamber = parse_chamber(
            "------\n|....|\n|....|\n|..@.|\n------",
            MovementMode::Orthogonal,
            Semantics::Storage,
        )
        .expect("fixture parses");
        let report = chamber_report(&chamber, None);
        assert_eq!((report.width, report.height), (4, 3));
        assert_eq!(report.rows, vec!["....", "....", "...."]);
        assert_eq!(report.fingerprint.len(), 16);
        let json = serde_json::to_value(&report).expect("report serializes");
        assert_eq!(json["entry_col"], 2);
    }
}

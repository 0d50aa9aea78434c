use sokogen_core::{
    MovementMode, RegionLabel, SeededSampler, Semantics, calibrate, explore_pushes,
    furthest_layout, generate_feed, generate_storage, parse_chamber,
};

const OPEN_ROOM: &str = "\
------
|....|
|....|
|..@.|
------";

#[test]
fn test_feed_generation_returns_replayable_start() {
    let mut sampler = SeededSampler::new(42);
    let (chamber, start) = generate_feed(0, MovementMode::Orthogonal, &mut sampler);

    let layout = chamber.layout(start);
    assert_eq!(layout.player, RegionLabel::Outside, "feed puzzles start outside");
    assert_eq!(layout.crate_count, 0, "feed puzzles start empty");
    assert!(layout.solution.difficulty.is_some(), "start layout must be scored");

    // The replay chain must walk push-distance down to a solved layout.
    let mut at = start;
    while let Some(next) = chamber.layout(at).solution.next {
        assert_eq!(
            chamber.layout(next).solution.pushes + 1,
            chamber.layout(at).solution.pushes,
            "each replay hop must shed exactly one push",
        );
        at = next;
    }
    assert_eq!(chamber.layout(at).solution.pushes, 0, "chain must end on a solved layout");
    assert_eq!(chamber.layout(at).player, RegionLabel::Outside);
}

#[test]
fn test_every_layout_is_push_reachable_from_base() {
    let mut chamber = parse_chamber(OPEN_ROOM, MovementMode::Orthogonal, Semantics::Feed)
        .expect("fixture parses");
    let graph = explore_pushes(&mut chamber, 100_000).expect("small arena fits the cap");

    let mut seen = vec![false; chamber.layout_count()];
    seen[0] = true;
    let mut worklist = vec![0_usize];
    while let Some(at) = worklist.pop() {
        for &next in &graph.edges[at] {
            if !seen[next as usize] {
                seen[next as usize] = true;
                worklist.push(next as usize);
            }
        }
    }
    assert!(
        seen.iter().all(|&reached| reached),
        "every interned layout must be push-reachable from layout 0",
    );
}

#[test]
fn test_furthest_empty_layout_maximizes_distance() {
    let mut chamber = parse_chamber(OPEN_ROOM, MovementMode::Orthogonal, Semantics::Feed)
        .expect("fixture parses");
    let calibration = calibrate(&mut chamber).expect("fixture calibrates");

    let furthest = furthest_layout(&chamber, &calibration.distance, 0)
        .expect("an empty start layout must be discovered");
    let record = calibration.distance[furthest].expect("furthest layout has a distance");
    for (index, layout) in chamber.layouts().iter().enumerate() {
        if layout.player != RegionLabel::Outside || layout.crate_count != 0 {
            continue;
        }
        if let Some(Some(steps)) = calibration.distance.get(index) {
            assert!(
                *steps <= record,
                "layout {index} sits {steps} pushes out, beyond the furthest {record}",
            );
        }
    }
}

#[test]
fn test_no_interned_layout_parks_a_crate_on_a_locked_tile() {
    let mut chamber = parse_chamber(OPEN_ROOM, MovementMode::Orthogonal, Semantics::Feed)
        .expect("fixture parses");
    calibrate(&mut chamber).expect("fixture calibrates");

    assert!(chamber.layout_count() > 1, "calibration must discover layouts");
    for (index, layout) in chamber.layouts().iter().enumerate() {
        for (tile, &occupied) in layout.crates.iter().enumerate() {
            assert!(
                !(occupied && chamber.locked[tile]),
                "layout {index} parks a crate on locked tile {tile}",
            );
        }
    }
}

#[test]
fn test_storage_generation_is_structurally_viable() {
    let mut sampler = SeededSampler::new(7);
    let chamber = generate_storage(1, MovementMode::Orthogonal, &mut sampler);

    assert!(chamber.unlocked_tiles >= 2, "storage chambers need room to maneuver");
    let annex = chamber.annex.expect("storage chambers carry an annex");
    assert!(annex.capacity > 0);

    // No 2x2 blob of dead entrance-connected tiles may survive generation.
    for y in 0..chamber.height - 1 {
        for x in 0..chamber.width - 1 {
            let dead = [(y, x), (y, x + 1), (y + 1, x), (y + 1, x + 1)]
                .into_iter()
                .all(|(by, bx)| {
                    let i = by * chamber.width + bx;
                    !chamber.walls[i] && chamber.locked[i] && chamber.outside[i]
                });
            assert!(!dead, "dead 2x2 blob at ({y}, {x})");
        }
    }
}

//! Occupancy resolution and move legality.
//!
//! The query side of the engine: which cells are taken, whether a slide
//! target is legal, and how far a vehicle can actually travel. Everything
//! here is a pure function of the template plus the current position map;
//! `sim::game` consults these before mutating anything.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::state::{EntityId, Orientation, Pos, Puzzle};

/// Inclusive range of anchor coordinates, along a vehicle's own axis,
/// reachable by legal single-cell steps from its current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRange {
    pub min: i32,
    pub max: i32,
}

/// Every occupied cell tagged with its owning entity, optionally excluding
/// one entity's own cells (so a moving entity does not block itself).
/// No iteration-order guarantee.
pub fn occupied_cells(
    puzzle: &Puzzle,
    positions: &HashMap<EntityId, Pos>,
    exclude: Option<EntityId>,
) -> HashMap<Pos, EntityId> {
    let mut cells = HashMap::new();
    for (&id, &pos) in positions {
        if Some(id) == exclude {
            continue;
        }
        match puzzle.vehicle(id) {
            Some(vehicle) => {
                for cell in vehicle.cells_at(pos) {
                    cells.insert(cell, id);
                }
            }
            // Obstacles occupy exactly their one cell.
            None => {
                cells.insert(pos, id);
            }
        }
    }
    cells
}

/// Whether `id` may be placed with its anchor at `target`.
///
/// Rules in order, short-circuiting: the entity must be a known vehicle;
/// the coordinate perpendicular to its orientation must be unchanged (no
/// turning); every target cell must be in bounds; no target cell may
/// intersect another entity. Only the resting footprint is checked, so a
/// target on the far side of a blocker can still be legal here; the
/// single-step walk in [`slide_range`] is what rules out jumping.
pub fn can_move(
    puzzle: &Puzzle,
    positions: &HashMap<EntityId, Pos>,
    id: EntityId,
    target: Pos,
) -> bool {
    let Some(vehicle) = puzzle.vehicle(id) else {
        return false;
    };
    let Some(&current) = positions.get(&id) else {
        return false;
    };

    let on_axis = match vehicle.orientation {
        Orientation::Horizontal => target.row == current.row,
        Orientation::Vertical => target.col == current.col,
    };
    if !on_axis {
        return false;
    }

    if !vehicle.cells_at(target).all(|cell| puzzle.grid.contains(cell)) {
        return false;
    }

    let blocked = occupied_cells(puzzle, positions, Some(id));
    vehicle.cells_at(target).all(|cell| !blocked.contains_key(&cell))
}

/// Probes outward one cell at a time from the current anchor, in both
/// directions along the vehicle's axis, while each successive candidate
/// stays legal. A boxed-in vehicle gets `min == max == current`. `None`
/// for ids that are not vehicles.
///
/// The walk relies on blocking being monotonic per direction, which holds
/// because every occupant is an axis-aligned run of cells.
pub fn slide_range(
    puzzle: &Puzzle,
    positions: &HashMap<EntityId, Pos>,
    id: EntityId,
) -> Option<SlideRange> {
    let vehicle = puzzle.vehicle(id)?;
    let current = *positions.get(&id)?;
    let origin = vehicle.axis_coord(current);

    let mut min = origin;
    while can_move(puzzle, positions, id, vehicle.anchor_at(current, min - 1)) {
        min -= 1;
    }

    let mut max = origin;
    while can_move(puzzle, positions, id, vehicle.anchor_at(current, max + 1)) {
        max += 1;
    }

    Some(SlideRange { min, max })
}

//! 90°-clockwise rotation of a whole puzzle template.
//!
//! A pure function over templates, independent of any live engine; the
//! editor applies it between sessions. Four applications reproduce the
//! original template exactly.

use super::state::{Exit, ExitDir, GridSize, Move, Obstacle, Orientation, Pos, Puzzle, Vehicle};

/// Maps an absolute cell under a clockwise quarter turn of a grid with
/// `rows` rows: (r, c) -> (c, rows - 1 - r).
fn map_cell(pos: Pos, rows: i32) -> Pos {
    Pos::new(pos.col, rows - 1 - pos.row)
}

/// Maps a vehicle anchor. Anchors are the topmost/leftmost occupied cell,
/// not a rotation-invariant centroid, so the rule depends on the original
/// orientation: a horizontal run keeps its anchor cell, while a vertical
/// run's bottom cell becomes the new leftmost cell.
fn map_anchor(anchor: Pos, length: i32, orientation: Orientation, rows: i32) -> Pos {
    match orientation {
        Orientation::Horizontal => map_cell(anchor, rows),
        Orientation::Vertical => map_cell(Pos::new(anchor.row + length - 1, anchor.col), rows),
    }
}

fn rotate_vehicle(vehicle: &Vehicle, rows: i32) -> Vehicle {
    Vehicle {
        pos: map_anchor(vehicle.pos, vehicle.length, vehicle.orientation, rows),
        orientation: match vehicle.orientation {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        },
        ..vehicle.clone()
    }
}

/// Rotates a template 90° clockwise: dimensions swap, every cell maps, each
/// vehicle's orientation flips with its anchor recomputed, and the exit
/// direction is re-deduced from the new grid rather than carried over.
///
/// Trace waypoints are anchors recorded at a point in time, so each one is
/// re-expressed with the same orientation-aware anchor rule, looked up from
/// the entity it names. A waypoint naming a non-vehicle (no legal trace
/// contains one) maps as a bare cell, keeping the transform total.
pub fn rotate_90cw(puzzle: &Puzzle) -> Puzzle {
    let rows = puzzle.grid.rows;
    let grid = GridSize::new(puzzle.grid.cols, rows);

    let exit_pos = map_cell(puzzle.exit.pos, rows);
    let exit = Exit {
        pos: exit_pos,
        // Periphery cells stay peripheral under rotation; the fallback only
        // matters for templates that were never hydratable.
        dir: ExitDir::deduce(exit_pos, grid).unwrap_or(puzzle.exit.dir),
    };

    let solution = puzzle.solution.as_ref().map(|trace| {
        trace
            .iter()
            .map(|step| Move {
                id: step.id,
                to: match puzzle.vehicle(step.id) {
                    Some(vehicle) => {
                        map_anchor(step.to, vehicle.length, vehicle.orientation, rows)
                    }
                    None => map_cell(step.to, rows),
                },
            })
            .collect()
    });

    Puzzle {
        name: puzzle.name.clone(),
        difficulty: puzzle.difficulty.clone(),
        grid,
        exit,
        player: rotate_vehicle(&puzzle.player, rows),
        vehicles: puzzle.vehicles.iter().map(|v| rotate_vehicle(v, rows)).collect(),
        obstacles: puzzle
            .obstacles
            .iter()
            .map(|o| Obstacle {
                pos: map_cell(o.pos, rows),
                ..o.clone()
            })
            .collect(),
        solution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EntityId;
    use crate::sim::validate::validate_puzzle;

    fn vehicle(id: EntityId, pos: Pos, length: i32, orientation: Orientation) -> Vehicle {
        Vehicle {
            id,
            pos,
            length,
            orientation,
            color: Some("red".into()),
            kind: None,
        }
    }

    /// 4x5 template with both orientations, an obstacle, and a winning
    /// two-step trace.
    fn fixture() -> Puzzle {
        Puzzle {
            name: "fixture".into(),
            difficulty: "medium".into(),
            grid: GridSize::new(4, 5),
            exit: Exit {
                pos: Pos::new(1, 4),
                dir: ExitDir::Right,
            },
            player: vehicle(EntityId::Player, Pos::new(1, 0), 2, Orientation::Horizontal),
            vehicles: vec![vehicle(
                EntityId::Vehicle(0),
                Pos::new(0, 2),
                2,
                Orientation::Vertical,
            )],
            obstacles: vec![Obstacle {
                id: EntityId::Obstacle(0),
                pos: Pos::new(3, 0),
                kind: "rock".into(),
            }],
            solution: Some(vec![
                Move {
                    id: EntityId::Vehicle(0),
                    to: Pos::new(2, 2),
                },
                Move {
                    id: EntityId::Player,
                    to: Pos::new(1, 3),
                },
            ]),
        }
    }

    #[test]
    fn test_cell_mapping() {
        // 4 rows: (r, c) -> (c, 3 - r).
        assert_eq!(map_cell(Pos::new(0, 0), 4), Pos::new(0, 3));
        assert_eq!(map_cell(Pos::new(3, 0), 4), Pos::new(0, 0));
        assert_eq!(map_cell(Pos::new(1, 2), 4), Pos::new(2, 2));
    }

    #[test]
    fn test_grid_dimensions_swap() {
        let rotated = rotate_90cw(&fixture());
        assert_eq!(rotated.grid, GridSize::new(5, 4));
    }

    #[test]
    fn test_horizontal_vehicle_keeps_its_anchor_cell() {
        let rotated = rotate_90cw(&fixture());
        // Player anchor (1,0) maps straight to (0,2); orientation flips.
        assert_eq!(rotated.player.pos, Pos::new(0, 2));
        assert_eq!(rotated.player.orientation, Orientation::Vertical);
        assert_eq!(rotated.player.length, 2);
    }

    #[test]
    fn test_vertical_vehicle_anchors_on_its_bottom_cell() {
        let rotated = rotate_90cw(&fixture());
        // Bottom cell of the blocker is (1,2); it maps to (2,2) and becomes
        // the new leftmost cell.
        assert_eq!(rotated.vehicles[0].pos, Pos::new(2, 2));
        assert_eq!(rotated.vehicles[0].orientation, Orientation::Horizontal);
    }

    #[test]
    fn test_occupied_cells_are_preserved_as_a_set() {
        let original = fixture();
        let rotated = rotate_90cw(&original);
        let rows = original.grid.rows;
        for (v, rv) in [(&original.player, &rotated.player)]
            .into_iter()
            .chain(original.vehicles.iter().zip(rotated.vehicles.iter()))
        {
            let mut mapped: Vec<_> = v.cells_at(v.pos).map(|c| map_cell(c, rows)).collect();
            let mut actual: Vec<_> = rv.cells_at(rv.pos).collect();
            mapped.sort_by_key(|p| (p.row, p.col));
            actual.sort_by_key(|p| (p.row, p.col));
            assert_eq!(mapped, actual, "cells of {} diverged", v.id);
        }
    }

    #[test]
    fn test_exit_direction_is_rededuced() {
        let rotated = rotate_90cw(&fixture());
        // Right-edge exit (1,4) lands on the bottom edge at (4,2).
        assert_eq!(rotated.exit.pos, Pos::new(4, 2));
        assert_eq!(rotated.exit.dir, ExitDir::Down);
    }

    #[test]
    fn test_obstacle_cell_maps_and_kind_survives() {
        let rotated = rotate_90cw(&fixture());
        assert_eq!(rotated.obstacles[0].pos, Pos::new(0, 0));
        assert_eq!(rotated.obstacles[0].kind, "rock");
    }

    #[test]
    fn test_rotated_trace_still_solves_the_rotated_puzzle() {
        let original = fixture();
        assert!(validate_puzzle(&original).is_valid);

        let mut rotated = original.clone();
        for _ in 0..3 {
            rotated = rotate_90cw(&rotated);
            let report = validate_puzzle(&rotated);
            assert!(report.is_valid, "rotated trace broke: {:?}", report.error);
            assert_eq!(report.par, Some(2));
        }
    }

    #[test]
    fn test_four_rotations_reproduce_the_template() {
        let original = fixture();
        let mut rotated = original.clone();
        for _ in 0..4 {
            rotated = rotate_90cw(&rotated);
        }
        assert_eq!(rotated, original);
    }

    #[test]
    fn test_four_rotations_with_corner_exit() {
        // Corner exits exercise the deduction rule ordering on every turn.
        let mut puzzle = fixture();
        puzzle.exit = Exit {
            pos: Pos::new(0, 4),
            dir: ExitDir::Right,
        };
        let mut rotated = puzzle.clone();
        for _ in 0..4 {
            rotated = rotate_90cw(&rotated);
        }
        assert_eq!(rotated, puzzle);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The anchor mapping composed four times is the identity for
            /// any cell, length, and starting orientation, on any grid.
            #[test]
            fn anchor_mapping_four_times_is_identity(
                rows in 1i32..12,
                cols in 1i32..12,
                row in 0i32..12,
                col in 0i32..12,
                length in 1i32..5,
                horizontal in any::<bool>(),
            ) {
                let mut orientation = if horizontal {
                    Orientation::Horizontal
                } else {
                    Orientation::Vertical
                };
                let mut anchor = Pos::new(row, col);
                let mut dims = (rows, cols);
                for _ in 0..4 {
                    anchor = map_anchor(anchor, length, orientation, dims.0);
                    orientation = match orientation {
                        Orientation::Horizontal => Orientation::Vertical,
                        Orientation::Vertical => Orientation::Horizontal,
                    };
                    dims = (dims.1, dims.0);
                }
                prop_assert_eq!(anchor, Pos::new(row, col));
            }
        }
    }
}

//! Hydration of compact puzzle definitions.
//!
//! The storage/bundling layer hands the engine a small camelCase JSON
//! record; this module expands it into the fully-specified [`Puzzle`]
//! template (assigning entity identities by index and deducing the exit
//! direction) and can shrink a template back down, which is how the editor
//! stores rotated levels. Bad input data fails loudly here, never at play
//! time.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::sim::{
    EntityId, Exit, ExitDir, GridSize, Move, Obstacle, Orientation, Pos, Puzzle, Vehicle,
};

/// A cell reference in the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDef {
    pub row: i32,
    pub col: i32,
}

/// A vehicle in the wire format. `type` is a display tag, not behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDef {
    pub row: i32,
    pub col: i32,
    pub length: i32,
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// An obstacle in the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDef {
    pub row: i32,
    pub col: i32,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One waypoint of the wire-format validation trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointDef {
    pub vehicle_id: String,
    pub row: i32,
    pub col: i32,
}

/// The compact puzzle definition as stored and bundled. Identities are not
/// present; they are assigned by index during hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDef {
    pub name: String,
    pub difficulty: String,
    pub grid_size: GridSize,
    pub exit: CellDef,
    pub player_car: VehicleDef,
    #[serde(default)]
    pub vehicles: Vec<VehicleDef>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Vec<WaypointDef>>,
}

/// Why a definition could not be hydrated. All of these indicate bad input
/// data rather than a player action, so hydration aborts instead of
/// returning a failure value.
#[derive(Debug)]
pub enum HydrateError {
    /// The exit cell does not lie on the grid periphery.
    ExitOffPeriphery { pos: Pos, grid: GridSize },
    /// A validation waypoint names an id that is not a known wire id.
    BadTraceId { step: usize, raw: String },
    /// The JSON itself did not parse as a puzzle definition.
    Parse(serde_json::Error),
}

impl Display for HydrateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            HydrateError::ExitOffPeriphery { pos, grid } => write!(
                f,
                "exit {pos} is not on the periphery of a {}x{} grid",
                grid.rows, grid.cols
            ),
            HydrateError::BadTraceId { step, raw } => {
                write!(f, "validation step {step} names unknown entity {raw:?}")
            }
            HydrateError::Parse(err) => write!(f, "malformed puzzle definition: {err}"),
        }
    }
}

impl std::error::Error for HydrateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HydrateError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for HydrateError {
    fn from(err: serde_json::Error) -> Self {
        HydrateError::Parse(err)
    }
}

fn hydrate_vehicle(id: EntityId, def: &VehicleDef) -> Vehicle {
    Vehicle {
        id,
        pos: Pos::new(def.row, def.col),
        length: def.length,
        orientation: def.orientation,
        color: def.color.clone(),
        kind: def.kind.clone(),
    }
}

/// Expands a compact definition into a full template.
pub fn hydrate(def: &PuzzleDef) -> Result<Puzzle, HydrateError> {
    let grid = def.grid_size;
    let exit_pos = Pos::new(def.exit.row, def.exit.col);
    let dir = ExitDir::deduce(exit_pos, grid).ok_or(HydrateError::ExitOffPeriphery {
        pos: exit_pos,
        grid,
    })?;

    let solution = match &def.validation {
        None => None,
        Some(waypoints) => {
            let mut trace = Vec::with_capacity(waypoints.len());
            for (index, waypoint) in waypoints.iter().enumerate() {
                let id = waypoint
                    .vehicle_id
                    .parse()
                    .map_err(|_| HydrateError::BadTraceId {
                        step: index + 1,
                        raw: waypoint.vehicle_id.clone(),
                    })?;
                trace.push(Move {
                    id,
                    to: Pos::new(waypoint.row, waypoint.col),
                });
            }
            Some(trace)
        }
    };

    let puzzle = Puzzle {
        name: def.name.clone(),
        difficulty: def.difficulty.clone(),
        grid,
        exit: Exit { pos: exit_pos, dir },
        player: hydrate_vehicle(EntityId::Player, &def.player_car),
        vehicles: def
            .vehicles
            .iter()
            .enumerate()
            .map(|(index, v)| hydrate_vehicle(EntityId::Vehicle(index as u32), v))
            .collect(),
        obstacles: def
            .obstacles
            .iter()
            .enumerate()
            .map(|(index, o)| Obstacle {
                id: EntityId::Obstacle(index as u32),
                pos: Pos::new(o.row, o.col),
                kind: o.kind.clone(),
            })
            .collect(),
        solution,
    };
    log::info!(
        "hydrated puzzle '{}' ({}x{}, {} vehicles, {} obstacles)",
        puzzle.name,
        grid.rows,
        grid.cols,
        puzzle.vehicles.len() + 1,
        puzzle.obstacles.len()
    );
    Ok(puzzle)
}

/// Parses and hydrates a JSON definition in one step.
pub fn hydrate_str(json: &str) -> Result<Puzzle, HydrateError> {
    let def: PuzzleDef = serde_json::from_str(json)?;
    hydrate(&def)
}

fn dehydrate_vehicle(vehicle: &Vehicle) -> VehicleDef {
    VehicleDef {
        row: vehicle.pos.row,
        col: vehicle.pos.col,
        length: vehicle.length,
        orientation: vehicle.orientation,
        color: vehicle.color.clone(),
        kind: vehicle.kind.clone(),
    }
}

/// Shrinks a template back to the compact definition. Identities drop out
/// (they are reassigned by index on the next hydration), and the exit
/// direction drops out (it is always re-deduced).
pub fn dehydrate(puzzle: &Puzzle) -> PuzzleDef {
    PuzzleDef {
        name: puzzle.name.clone(),
        difficulty: puzzle.difficulty.clone(),
        grid_size: puzzle.grid,
        exit: CellDef {
            row: puzzle.exit.pos.row,
            col: puzzle.exit.pos.col,
        },
        player_car: dehydrate_vehicle(&puzzle.player),
        vehicles: puzzle.vehicles.iter().map(dehydrate_vehicle).collect(),
        obstacles: puzzle
            .obstacles
            .iter()
            .map(|o| ObstacleDef {
                row: o.pos.row,
                col: o.pos.col,
                kind: o.kind.clone(),
            })
            .collect(),
        validation: puzzle.solution.as_ref().map(|trace| {
            trace
                .iter()
                .map(|step| WaypointDef {
                    vehicle_id: step.id.to_string(),
                    row: step.to.row,
                    col: step.to.col,
                })
                .collect()
        }),
    }
}

//! Core puzzle types: grid geometry, entities, and the puzzle template.
//!
//! Everything here is plain data. The template (`Puzzle`) is immutable after
//! hydration and shared read-only between engine instances; per-session
//! mutable state lives in `sim::game`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A cell on the grid. Row 0 is the top edge, column 0 the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Grid dimensions, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: i32,
    pub cols: i32,
}

impl GridSize {
    pub const fn new(rows: i32, cols: i32) -> Self {
        Self { rows, cols }
    }

    /// Whether the cell lies within [0, rows) x [0, cols).
    pub fn contains(&self, pos: Pos) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }
}

/// The axis a vehicle may translate along. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Which grid edge an exit sits on. Always derived from the exit cell,
/// never supplied by puzzle definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitDir {
    Up,
    Down,
    Left,
    Right,
}

impl ExitDir {
    /// Deduces the edge a periphery cell sits on. The column rules are
    /// checked first, so a corner exit like (0, cols-1) reads as `Right`.
    /// Returns `None` for interior cells.
    pub fn deduce(pos: Pos, grid: GridSize) -> Option<ExitDir> {
        if pos.col == grid.cols - 1 {
            Some(ExitDir::Right)
        } else if pos.col == 0 {
            Some(ExitDir::Left)
        } else if pos.row == grid.rows - 1 {
            Some(ExitDir::Down)
        } else if pos.row == 0 {
            Some(ExitDir::Up)
        } else {
            None
        }
    }
}

/// The exit cell and the edge it opens toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    pub pos: Pos,
    pub dir: ExitDir,
}

/// Stable identity of an entity within one puzzle.
///
/// Indices are assigned in definition order at hydration time. The wire form
/// (`player`, `vehicle-3`, `obstacle-0`) appears in validation traces; the
/// engine itself always resolves entities by this tag, never by string
/// matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityId {
    Player,
    Vehicle(u32),
    Obstacle(u32),
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Player => f.write_str("player"),
            EntityId::Vehicle(index) => write!(f, "vehicle-{index}"),
            EntityId::Obstacle(index) => write!(f, "obstacle-{index}"),
        }
    }
}

/// Error produced when a wire id does not name an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEntityIdError {
    raw: String,
}

impl Display for ParseEntityIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized entity id {:?}", self.raw)
    }
}

impl std::error::Error for ParseEntityIdError {}

impl FromStr for EntityId {
    type Err = ParseEntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "player" {
            return Ok(EntityId::Player);
        }
        let parsed = if let Some(index) = s.strip_prefix("vehicle-") {
            index.parse().ok().map(EntityId::Vehicle)
        } else if let Some(index) = s.strip_prefix("obstacle-") {
            index.parse().ok().map(EntityId::Obstacle)
        } else {
            None
        };
        parsed.ok_or_else(|| ParseEntityIdError { raw: s.to_owned() })
    }
}

impl TryFrom<String> for EntityId {
    type Error = ParseEntityIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> String {
        id.to_string()
    }
}

/// A movable block occupying `length` contiguous cells from its anchor along
/// its orientation axis. The anchor is the topmost (vertical) or leftmost
/// (horizontal) occupied cell. Color and kind are display-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: EntityId,
    pub pos: Pos,
    pub length: i32,
    pub orientation: Orientation,
    pub color: Option<String>,
    pub kind: Option<String>,
}

impl Vehicle {
    /// Cells this vehicle would occupy with its anchor at `anchor`.
    pub fn cells_at(&self, anchor: Pos) -> impl Iterator<Item = Pos> + use<> {
        let orientation = self.orientation;
        (0..self.length).map(move |offset| match orientation {
            Orientation::Horizontal => Pos::new(anchor.row, anchor.col + offset),
            Orientation::Vertical => Pos::new(anchor.row + offset, anchor.col),
        })
    }

    /// The anchor coordinate along this vehicle's own axis.
    pub fn axis_coord(&self, anchor: Pos) -> i32 {
        match self.orientation {
            Orientation::Horizontal => anchor.col,
            Orientation::Vertical => anchor.row,
        }
    }

    /// Rebuilds an anchor from an axis coordinate, keeping the perpendicular
    /// coordinate of `anchor`.
    pub fn anchor_at(&self, anchor: Pos, coord: i32) -> Pos {
        match self.orientation {
            Orientation::Horizontal => Pos::new(anchor.row, coord),
            Orientation::Vertical => Pos::new(coord, anchor.col),
        }
    }
}

/// An immovable single-cell blocker. The kind tag is purely descriptive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub pos: Pos,
    pub kind: String,
}

/// One recorded waypoint of a validation trace: slide `id` so its anchor
/// lands on `to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub id: EntityId,
    pub to: Pos,
}

/// Immutable puzzle template, produced once by hydration and never mutated
/// by the engine. `solution` is the optional validation trace asserted to
/// solve the puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub name: String,
    pub difficulty: String,
    pub grid: GridSize,
    pub exit: Exit,
    pub player: Vehicle,
    pub vehicles: Vec<Vehicle>,
    pub obstacles: Vec<Obstacle>,
    pub solution: Option<Vec<Move>>,
}

impl Puzzle {
    /// Looks up a movable entity. Obstacles are not vehicles and resolve to
    /// `None`, which is what makes every obstacle move illegal.
    pub fn vehicle(&self, id: EntityId) -> Option<&Vehicle> {
        match id {
            EntityId::Player => Some(&self.player),
            EntityId::Vehicle(index) => self.vehicles.get(index as usize),
            EntityId::Obstacle(_) => None,
        }
    }

    /// Template positions of every entity, keyed by identity.
    pub fn template_positions(&self) -> Vec<(EntityId, Pos)> {
        let mut positions = Vec::with_capacity(1 + self.vehicles.len() + self.obstacles.len());
        positions.push((self.player.id, self.player.pos));
        positions.extend(self.vehicles.iter().map(|v| (v.id, v.pos)));
        positions.extend(self.obstacles.iter().map(|o| (o.id, o.pos)));
        positions
    }
}

//! Gridlock - a sliding-block puzzle simulation and verification engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (occupancy, move legality, slide
//!   ranges, win detection, replay validation, template rotation)
//! - `level`: Hydration between compact JSON definitions and full templates
//!
//! Rendering, input handling, and storage are external collaborators; they
//! drive the engine through [`sim::Game`] and never reach into its state.

pub mod level;
pub mod sim;

pub use level::{HydrateError, PuzzleDef, dehydrate, hydrate, hydrate_str};
pub use sim::{
    EntityId, Game, GameSnapshot, Puzzle, SlideRange, ValidationReport, rotate_90cw,
    validate_puzzle,
};

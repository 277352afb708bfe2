//! Replay-based solution validation.
//!
//! Drives a throwaway engine through a template's recorded trace and
//! reports whether it actually solves the puzzle. Used to pre-score bundled
//! puzzles and by the external editor to package a freshly played solution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::game::Game;
use super::state::Puzzle;

/// Outcome of replaying a validation trace. `par` is present only when the
/// trace is valid; `error` only when it is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub par: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationReport {
    fn valid(par: u32) -> Self {
        Self {
            is_valid: true,
            par: Some(par),
            error: None,
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            par: None,
            error: Some(reason.into()),
        }
    }
}

/// Replays the template's trace on a fresh engine, fail-fast on the first
/// illegal step (reported 1-based). Deterministic, and side-effect-free on
/// the caller's state: only the throwaway engine mutates.
pub fn validate_puzzle(puzzle: &Puzzle) -> ValidationReport {
    let trace = match puzzle.solution.as_deref() {
        Some(trace) if !trace.is_empty() => trace,
        _ => return ValidationReport::invalid("no trace provided"),
    };

    let mut game = Game::new(Arc::new(puzzle.clone()));
    for (index, step) in trace.iter().enumerate() {
        if !game.move_vehicle(step.id, step.to) {
            return ValidationReport::invalid(format!(
                "move {} is illegal: {} -> {}",
                index + 1,
                step.id,
                step.to,
            ));
        }
    }

    if !game.is_complete() {
        return ValidationReport::invalid("trace does not reach a winning state");
    }

    log::debug!(
        "puzzle '{}' validated, par {}",
        puzzle.name,
        trace.len()
    );
    ValidationReport::valid(trace.len() as u32)
}

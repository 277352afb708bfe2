//! The live engine: a per-session game built from a shared template.
//!
//! One `Game` is exclusively owned by a single caller. Every operation runs
//! to completion synchronously; observer fan-out happens before
//! `move_vehicle` returns. Templates are shared read-only (`Arc`), which is
//! what lets the validator spin up throwaway engines against the same data.

use std::collections::HashMap;
use std::sync::Arc;

use super::occupancy::{self, SlideRange};
use super::state::{EntityId, ExitDir, Move, Orientation, Pos, Puzzle, Vehicle};

/// Immutable copy of the engine's state handed to observers and callers.
/// Holding one never permits mutation of the engine it came from.
#[derive(Debug, Clone)]
pub struct GameSnapshot {
    pub puzzle: Arc<Puzzle>,
    pub positions: HashMap<EntityId, Pos>,
    pub move_count: u32,
    pub complete: bool,
}

/// Handle returned by [`Game::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

type Observer = Box<dyn Fn(&GameSnapshot)>;

/// Pure win predicate: the player's leading edge, in the exit's direction,
/// coincides with the exit cell. Orientation/direction mismatches (a
/// horizontal player with an up/down exit) are never winning.
pub fn is_winning_position(player: &Vehicle, anchor: Pos, exit_pos: Pos, dir: ExitDir) -> bool {
    match (player.orientation, dir) {
        (Orientation::Horizontal, ExitDir::Right) => {
            anchor.row == exit_pos.row && anchor.col + player.length - 1 == exit_pos.col
        }
        (Orientation::Horizontal, ExitDir::Left) => {
            anchor.row == exit_pos.row && anchor.col == exit_pos.col
        }
        (Orientation::Vertical, ExitDir::Down) => {
            anchor.col == exit_pos.col && anchor.row + player.length - 1 == exit_pos.row
        }
        (Orientation::Vertical, ExitDir::Up) => {
            anchor.col == exit_pos.col && anchor.row == exit_pos.row
        }
        _ => false,
    }
}

/// A running puzzle session.
pub struct Game {
    puzzle: Arc<Puzzle>,
    positions: HashMap<EntityId, Pos>,
    move_count: u32,
    history: Vec<Move>,
    complete: bool,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl Game {
    /// Builds an engine on a shared template, deriving initial positions
    /// from the template positions of every entity.
    pub fn new(puzzle: Arc<Puzzle>) -> Self {
        let positions = puzzle.template_positions().into_iter().collect();
        Self {
            puzzle,
            positions,
            move_count: 0,
            history: Vec::new(),
            complete: false,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn puzzle(&self) -> &Arc<Puzzle> {
        &self.puzzle
    }

    /// Current anchor of an entity, if it exists in this puzzle.
    pub fn position(&self, id: EntityId) -> Option<Pos> {
        self.positions.get(&id).copied()
    }

    /// Looks up a vehicle by identity; obstacles and unknown ids are absent.
    pub fn vehicle(&self, id: EntityId) -> Option<&Vehicle> {
        self.puzzle.vehicle(id)
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Ordered list of every applied move this session.
    pub fn move_history(&self) -> &[Move] {
        &self.history
    }

    /// Copies out the current state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            puzzle: Arc::clone(&self.puzzle),
            positions: self.positions.clone(),
            move_count: self.move_count,
            complete: self.complete,
        }
    }

    /// Every occupied cell tagged by owner; see [`occupancy::occupied_cells`].
    pub fn occupied_cells(&self, exclude: Option<EntityId>) -> HashMap<Pos, EntityId> {
        occupancy::occupied_cells(&self.puzzle, &self.positions, exclude)
    }

    /// Whether `id` may be placed with its anchor at `target`.
    pub fn can_move(&self, id: EntityId, target: Pos) -> bool {
        occupancy::can_move(&self.puzzle, &self.positions, id, target)
    }

    /// Reachable anchor coordinates for `id` along its own axis.
    pub fn slide_range(&self, id: EntityId) -> Option<SlideRange> {
        occupancy::slide_range(&self.puzzle, &self.positions, id)
    }

    /// Applies a move. Returns false without mutating when the move is
    /// illegal or a no-op (a move to the current position is not counted).
    ///
    /// On success the position map, counter, and history update, the win
    /// predicate is evaluated (the completion flag latches on and only
    /// `reset` clears it; completion does not freeze the board), and all
    /// observers are notified synchronously.
    pub fn move_vehicle(&mut self, id: EntityId, target: Pos) -> bool {
        let Some(current) = self.position(id) else {
            return false;
        };
        if target == current || !self.can_move(id, target) {
            return false;
        }

        self.positions.insert(id, target);
        self.move_count += 1;
        self.history.push(Move { id, to: target });
        log::debug!("move {}: {id} {current} -> {target}", self.move_count);

        let player_anchor = self.positions[&EntityId::Player];
        let exit = self.puzzle.exit;
        if is_winning_position(&self.puzzle.player, player_anchor, exit.pos, exit.dir) {
            if !self.complete {
                log::info!(
                    "puzzle '{}' solved in {} moves",
                    self.puzzle.name,
                    self.move_count
                );
            }
            self.complete = true;
        }

        self.notify();
        true
    }

    /// Discards all session state and rebuilds positions from the template.
    /// The template itself is untouched. Observers are notified.
    pub fn reset(&mut self) {
        self.positions = self.puzzle.template_positions().into_iter().collect();
        self.move_count = 0;
        self.history.clear();
        self.complete = false;
        log::debug!("puzzle '{}' reset", self.puzzle.name);
        self.notify();
    }

    /// Registers an observer called synchronously after every applied move
    /// and every reset. Notification order is unspecified. Observers receive
    /// a snapshot and must not re-enter the engine.
    pub fn subscribe(&mut self, observer: impl Fn(&GameSnapshot) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes a previously registered observer. Returns whether it was
    /// still registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, observer) in &self.observers {
            observer(&snapshot);
        }
    }

    /// Plain-text board view: `P` player, `a`.. other vehicles, `#`
    /// obstacles, `E` the exit cell while unoccupied, `.` empty. Debug and
    /// CLI surface only.
    pub fn board_text(&self) -> String {
        let cells = self.occupied_cells(None);
        let grid = self.puzzle.grid;
        let mut out = String::with_capacity((grid.rows * (grid.cols + 1)) as usize);
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let pos = Pos::new(row, col);
                let glyph = match cells.get(&pos) {
                    Some(EntityId::Player) => 'P',
                    Some(EntityId::Vehicle(index)) => {
                        char::from(b'a' + (*index % 26) as u8)
                    }
                    Some(EntityId::Obstacle(_)) => '#',
                    None if pos == self.puzzle.exit.pos => 'E',
                    None => '.',
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Exit, GridSize, Obstacle};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn vehicle(id: EntityId, pos: Pos, length: i32, orientation: Orientation) -> Vehicle {
        Vehicle {
            id,
            pos,
            length,
            orientation,
            color: None,
            kind: None,
        }
    }

    /// 3x3 board, horizontal player at (1,0) length 2, exit right at (1,2),
    /// nothing else. One move right wins.
    fn trivial_puzzle() -> Arc<Puzzle> {
        Arc::new(Puzzle {
            name: "trivial".into(),
            difficulty: "easy".into(),
            grid: GridSize::new(3, 3),
            exit: Exit {
                pos: Pos::new(1, 2),
                dir: ExitDir::Right,
            },
            player: vehicle(EntityId::Player, Pos::new(1, 0), 2, Orientation::Horizontal),
            vehicles: Vec::new(),
            obstacles: Vec::new(),
            solution: None,
        })
    }

    #[test]
    fn test_single_move_win() {
        let mut game = Game::new(trivial_puzzle());
        assert!(!game.is_complete());
        assert!(game.move_vehicle(EntityId::Player, Pos::new(1, 1)));
        assert!(game.is_complete());
        assert_eq!(game.move_count(), 1);
    }

    #[test]
    fn test_noop_move_is_rejected() {
        let mut game = Game::new(trivial_puzzle());
        assert!(!game.move_vehicle(EntityId::Player, Pos::new(1, 0)));
        assert_eq!(game.move_count(), 0);
        assert!(game.move_history().is_empty());
    }

    #[test]
    fn test_illegal_move_leaves_state_untouched() {
        let mut game = Game::new(trivial_puzzle());
        assert!(!game.move_vehicle(EntityId::Player, Pos::new(0, 0)));
        assert!(!game.move_vehicle(EntityId::Player, Pos::new(1, 2)));
        assert_eq!(game.position(EntityId::Player), Some(Pos::new(1, 0)));
        assert_eq!(game.move_count(), 0);
    }

    #[test]
    fn test_history_records_applied_moves_in_order() {
        let mut game = Game::new(trivial_puzzle());
        game.move_vehicle(EntityId::Player, Pos::new(1, 1));
        game.move_vehicle(EntityId::Player, Pos::new(1, 0));
        assert_eq!(
            game.move_history(),
            &[
                Move {
                    id: EntityId::Player,
                    to: Pos::new(1, 1)
                },
                Move {
                    id: EntityId::Player,
                    to: Pos::new(1, 0)
                },
            ]
        );
        assert_eq!(game.move_count(), 2);
    }

    #[test]
    fn test_moves_stay_allowed_after_completion() {
        // Permissive post-win behavior, and the flag latches rather than
        // re-evaluating to false when the player backs away.
        let mut game = Game::new(trivial_puzzle());
        assert!(game.move_vehicle(EntityId::Player, Pos::new(1, 1)));
        assert!(game.is_complete());
        assert!(game.move_vehicle(EntityId::Player, Pos::new(1, 0)));
        assert!(game.is_complete());
        assert_eq!(game.move_count(), 2);
    }

    #[test]
    fn test_mismatched_exit_direction_never_wins() {
        // Horizontal player, exit on the top edge: no position satisfies
        // the predicate.
        let puzzle = Arc::new(Puzzle {
            exit: Exit {
                pos: Pos::new(0, 1),
                dir: ExitDir::Up,
            },
            ..(*trivial_puzzle()).clone()
        });
        let mut game = Game::new(puzzle);
        assert!(game.move_vehicle(EntityId::Player, Pos::new(1, 1)));
        assert!(game.move_vehicle(EntityId::Player, Pos::new(1, 0)));
        assert!(!game.is_complete());
    }

    #[test]
    fn test_reset_rebuilds_from_template() {
        let mut game = Game::new(trivial_puzzle());
        game.move_vehicle(EntityId::Player, Pos::new(1, 1));
        assert!(game.is_complete());
        game.reset();
        assert_eq!(game.position(EntityId::Player), Some(Pos::new(1, 0)));
        assert_eq!(game.move_count(), 0);
        assert!(game.move_history().is_empty());
        assert!(!game.is_complete());
    }

    #[test]
    fn test_observers_see_each_applied_move_and_reset() {
        let mut game = Game::new(trivial_puzzle());
        let seen: Rc<RefCell<Vec<(u32, bool)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        game.subscribe(move |snapshot| {
            sink.borrow_mut()
                .push((snapshot.move_count, snapshot.complete));
        });

        game.move_vehicle(EntityId::Player, Pos::new(1, 1));
        // Rejected moves notify nobody.
        game.move_vehicle(EntityId::Player, Pos::new(1, 1));
        game.reset();

        assert_eq!(seen.borrow().as_slice(), &[(1, true), (0, false)]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut game = Game::new(trivial_puzzle());
        let calls = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&calls);
        let id = game.subscribe(move |_| *sink.borrow_mut() += 1);

        game.move_vehicle(EntityId::Player, Pos::new(1, 1));
        assert!(game.unsubscribe(id));
        assert!(!game.unsubscribe(id));
        game.move_vehicle(EntityId::Player, Pos::new(1, 0));

        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_snapshot_is_a_detached_copy() {
        let mut game = Game::new(trivial_puzzle());
        let snapshot = game.snapshot();
        game.move_vehicle(EntityId::Player, Pos::new(1, 1));
        assert_eq!(snapshot.move_count, 0);
        assert_eq!(
            snapshot.positions.get(&EntityId::Player),
            Some(&Pos::new(1, 0))
        );
    }

    #[test]
    fn test_board_text_layout() {
        let puzzle = Arc::new(Puzzle {
            vehicles: vec![vehicle(
                EntityId::Vehicle(0),
                Pos::new(0, 2),
                2,
                Orientation::Vertical,
            )],
            obstacles: vec![Obstacle {
                id: EntityId::Obstacle(0),
                pos: Pos::new(2, 0),
                kind: "rock".into(),
            }],
            ..(*trivial_puzzle()).clone()
        });
        let game = Game::new(puzzle);
        assert_eq!(game.board_text(), "..a\nPPa\n#..\n");
    }

    #[test]
    fn test_board_text_marks_free_exit() {
        let game = Game::new(trivial_puzzle());
        assert_eq!(game.board_text(), "...\nPPE\n...\n");
    }
}

//! Action set available to organisms.

use ant_core::{Direction, Stage};
use serde::{Deserialize, Serialize};

/// An action an organism proposes for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Attack,
    Eat,
    Sleep,
    Mate,
    Asexual,
    None,
}

/// Actions open to adults, in network output order
pub const ADULT_ACTIONS: [Action; 9] = [
    Action::Up,
    Action::Down,
    Action::Left,
    Action::Right,
    Action::Attack,
    Action::Eat,
    Action::Sleep,
    Action::Mate,
    Action::Asexual,
];

/// Actions open to any other hatched stage
pub const ELDER_ACTIONS: [Action; 3] = [Action::Attack, Action::Eat, Action::Sleep];

impl Action {
    /// The ordered action set for a stage. Eggs cannot act.
    pub fn set_for(stage: Stage) -> &'static [Action] {
        match stage {
            Stage::Egg => &[],
            Stage::Adult => &ADULT_ACTIONS,
            Stage::Old => &ELDER_ACTIONS,
        }
    }

    /// Map a sampled network output index onto the stage's action set.
    ///
    /// The index wraps modulo the set size so any output width yields a
    /// valid action.
    pub fn select(stage: Stage, index: usize) -> Action {
        let set = Self::set_for(stage);
        if set.is_empty() {
            Action::None
        } else {
            set[index % set.len()]
        }
    }

    /// Movement direction, if this is a move
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Action::Up => Some(Direction::Up),
            Action::Down => Some(Direction::Down),
            Action::Left => Some(Direction::Left),
            Action::Right => Some(Direction::Right),
            _ => None,
        }
    }
}

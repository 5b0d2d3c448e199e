use engine::GameLogic;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::grid::Cell;
use crate::settings::PuzzleSettings;
use crate::state::GameState;

/// One discrete player stimulus, in grid cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PuzzleInput {
    Noop,
    Press(Cell),
    Drag(Cell),
    Release,
    RestartRound,
    NextRound,
}

/// Deterministic puzzle stepping for `HeadlessRunner`, the agent host and replays.
#[derive(Debug, Clone)]
pub struct FlowLogic {
    initial: GameState,
}

impl FlowLogic {
    pub fn new(initial: GameState) -> Self {
        Self { initial }
    }

    /// Built-in levels on the default grid.
    pub fn standard() -> Result<Self> {
        Ok(Self::new(GameState::standard()?))
    }

    pub fn from_settings(settings: &PuzzleSettings) -> Result<Self> {
        Ok(Self::new(GameState::from_settings(settings)?))
    }
}

/// Press on the first cell, drag through the rest, then release.
pub fn trace_inputs(cells: &[Cell]) -> Vec<PuzzleInput> {
    let Some((first, rest)) = cells.split_first() else {
        return Vec::new();
    };
    std::iter::once(PuzzleInput::Press(*first))
        .chain(rest.iter().map(|cell| PuzzleInput::Drag(*cell)))
        .chain(std::iter::once(PuzzleInput::Release))
        .collect()
}

impl GameLogic for FlowLogic {
    type State = GameState;
    type Input = PuzzleInput;

    fn initial_state(&self) -> Self::State {
        self.initial.clone()
    }

    /// The returned state's event queue holds only the events raised by this step.
    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        let mut next = state.clone();
        next.drain_events();

        match input {
            PuzzleInput::Noop => {}
            PuzzleInput::Press(cell) => {
                if let Err(err) = next.press(cell) {
                    debug!(%cell, %err, "press ignored");
                }
            }
            PuzzleInput::Drag(cell) => {
                next.drag(cell);
            }
            PuzzleInput::Release => {
                next.release();
            }
            PuzzleInput::RestartRound => {
                if let Err(err) = next.restart_round() {
                    warn!(%err, "restart failed");
                }
            }
            PuzzleInput::NextRound => {
                if let Err(err) = next.next_round() {
                    warn!(%err, "advancing round failed");
                }
            }
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameEvent;

    #[test]
    fn step_leaves_previous_state_untouched() {
        let logic = FlowLogic::standard().unwrap();
        let initial = logic.initial_state();
        let next = logic.step(&initial, PuzzleInput::Press(Cell::new(1, 4)));

        assert!(!initial.is_drawing());
        assert!(next.is_drawing());
    }

    #[test]
    fn step_events_cover_only_that_step() {
        let logic = FlowLogic::standard().unwrap();
        let initial = logic.initial_state();
        assert!(
            initial
                .clone()
                .drain_events()
                .contains(&GameEvent::RoundTextChanged { round: 1, max: 5 })
        );

        let next = logic.step(&initial, PuzzleInput::Noop);
        assert!(next.clone().drain_events().is_empty());
    }

    #[test]
    fn trace_inputs_wraps_cells_in_press_and_release() {
        let inputs = trace_inputs(&[Cell::new(0, 0), Cell::new(0, 1)]);
        assert_eq!(
            inputs,
            vec![
                PuzzleInput::Press(Cell::new(0, 0)),
                PuzzleInput::Drag(Cell::new(0, 1)),
                PuzzleInput::Release,
            ]
        );
        assert!(trace_inputs(&[]).is_empty());
    }

    #[test]
    fn second_press_while_drawing_is_a_no_op() {
        let logic = FlowLogic::standard().unwrap();
        let s1 = logic.step(&logic.initial_state(), PuzzleInput::Press(Cell::new(1, 4)));
        let s2 = logic.step(&s1, PuzzleInput::Press(Cell::new(2, 2)));
        assert_eq!(s2.session(), s1.session());
    }
}

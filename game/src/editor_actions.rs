use engine::editor::{EditorAction, EditorManifest};
use thiserror::Error;

use crate::grid::Cell;
use crate::playtest::PuzzleInput;

const EDITOR_TITLE: &str = "Flowgrid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    Press,
    Drag,
    Release,
    RestartRound,
    NextRound,
    Noop,
}

const ACTION_SPECS: &[(&str, &str, ActionKind)] = &[
    ("press", "Press", ActionKind::Press),
    ("drag", "Drag", ActionKind::Drag),
    ("release", "Release", ActionKind::Release),
    ("restartRound", "Restart Round", ActionKind::RestartRound),
    ("nextRound", "Next Round", ActionKind::NextRound),
    ("noop", "Noop", ActionKind::Noop),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorApiError {
    #[error("unknown actionId: {0}")]
    UnknownActionId(String),
    #[error("action {0} needs x and y")]
    MissingCell(String),
}

pub fn default_manifest() -> EditorManifest {
    EditorManifest {
        title: EDITOR_TITLE.to_string(),
        actions: ACTION_SPECS
            .iter()
            .map(|(id, label, kind)| EditorAction {
                id: (*id).to_string(),
                label: (*label).to_string(),
                takes_cell: matches!(kind, ActionKind::Press | ActionKind::Drag),
            })
            .collect(),
    }
}

/// Maps a step request to an input. Cell-taking actions require both coordinates.
pub fn action_from_request(
    id: &str,
    x: Option<i32>,
    y: Option<i32>,
) -> Result<PuzzleInput, EditorApiError> {
    let kind = ACTION_SPECS
        .iter()
        .find_map(|(action_id, _, kind)| (*action_id == id).then_some(*kind))
        .ok_or_else(|| EditorApiError::UnknownActionId(id.to_string()))?;

    let cell = || match (x, y) {
        (Some(x), Some(y)) => Ok(Cell::new(x, y)),
        _ => Err(EditorApiError::MissingCell(id.to_string())),
    };

    Ok(match kind {
        ActionKind::Press => PuzzleInput::Press(cell()?),
        ActionKind::Drag => PuzzleInput::Drag(cell()?),
        ActionKind::Release => PuzzleInput::Release,
        ActionKind::RestartRound => PuzzleInput::RestartRound,
        ActionKind::NextRound => PuzzleInput::NextRound,
        ActionKind::Noop => PuzzleInput::Noop,
    })
}

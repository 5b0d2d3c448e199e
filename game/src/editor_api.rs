use engine::agent::{AgentCommand, AgentHost, AgentResponse};
use engine::editor::{
    EditorGrid, EditorManifest, EditorPaletteEntry, EditorSnapshot, EditorStat, EditorTimeline,
    GridOrigin,
};
use tracing::warn;

pub use crate::editor_actions::EditorApiError;
use crate::editor_actions::{action_from_request, default_manifest};
use crate::error::Result;
use crate::playtest::FlowLogic;
use crate::settings::{PaletteSettings, PuzzleSettings};
use crate::state::GameState;

/// Grid value for an empty cell. Paths and trails are `PATH_BASE + color`, markers
/// `MARKER_BASE + color`.
pub const EMPTY_CELL: u8 = 0;
pub const PATH_BASE: u8 = 1;
pub const MARKER_BASE: u8 = 100;

const COLOR_EMPTY: [u8; 4] = [18, 18, 24, 255];

pub struct EditorSession {
    host: AgentHost<FlowLogic>,
    palette: PaletteSettings,
}

impl EditorSession {
    pub fn new(logic: FlowLogic, palette: PaletteSettings) -> Self {
        Self {
            host: AgentHost::new(logic),
            palette,
        }
    }

    pub fn standard() -> Result<Self> {
        Ok(Self::new(FlowLogic::standard()?, PaletteSettings::default()))
    }

    pub fn from_settings(settings: &PuzzleSettings) -> Result<Self> {
        Ok(Self::new(
            FlowLogic::from_settings(settings)?,
            settings.palette.clone(),
        ))
    }

    pub fn manifest(&self) -> EditorManifest {
        default_manifest()
    }

    pub fn timeline(&self) -> EditorTimeline {
        let runner = self.host.runner();
        let tm = runner.timemachine();
        EditorTimeline {
            frame: runner.frame(),
            history_len: runner.history().len(),
            can_rewind: tm.can_rewind(),
            can_forward: tm.can_forward(),
        }
    }

    pub fn state(&mut self) -> EditorSnapshot {
        self.run(AgentCommand::GetState)
    }

    pub fn step(
        &mut self,
        action_id: &str,
        x: Option<i32>,
        y: Option<i32>,
    ) -> std::result::Result<EditorSnapshot, EditorApiError> {
        let input = action_from_request(action_id, x, y)?;
        Ok(self.run(AgentCommand::Step(input)))
    }

    pub fn rewind(&mut self, frames: usize) -> EditorSnapshot {
        self.run(AgentCommand::Rewind { frames })
    }

    pub fn forward(&mut self, frames: usize) -> EditorSnapshot {
        self.run(AgentCommand::Forward { frames })
    }

    pub fn seek(&mut self, frame: usize) -> EditorSnapshot {
        self.run(AgentCommand::Seek { frame })
    }

    pub fn reset(&mut self) -> EditorSnapshot {
        self.run(AgentCommand::Reset)
    }

    fn run(&mut self, command: AgentCommand<crate::playtest::PuzzleInput>) -> EditorSnapshot {
        match self.host.handle(command) {
            AgentResponse::State { frame, state } => {
                snapshot_from_state(frame, &state, &self.palette)
            }
            AgentResponse::History { frame, history } => {
                let state = history
                    .get(frame)
                    .unwrap_or_else(|| self.host.runner().state());
                snapshot_from_state(frame, state, &self.palette)
            }
        }
    }
}

pub fn snapshot_from_state(
    frame: usize,
    state: &GameState,
    palette: &PaletteSettings,
) -> EditorSnapshot {
    let state_json = serde_json::to_value(state).unwrap_or_else(|err| {
        warn!(%err, "game state did not serialize");
        serde_json::Value::Null
    });

    let report = state.connection_report();
    let stats = vec![
        stat("round", format!("{}/{}", state.round(), state.max_rounds())),
        stat("view", format!("{:?}", state.view)),
        stat(
            "connected",
            format!("{}/{}", report.connected_markers(), report.total_markers()),
        ),
        stat("paths", state.board().path_count()),
        stat("drawing", state.is_drawing()),
        stat(
            "trailLen",
            state.session().map_or(0, |s| s.trail().len()),
        ),
        stat("won", state.board().is_won()),
    ];

    EditorSnapshot {
        frame,
        state: state_json,
        stats,
        grid: Some(EditorGrid {
            origin: GridOrigin::BottomLeft,
            cells: encode_grid(state),
            palette: Some(grid_palette(palette)),
        }),
    }
}

/// `cells[y][x]` with `y = 0` the bottom row. Markers win over paths, paths over the live trail.
pub fn encode_grid(state: &GameState) -> Vec<Vec<u8>> {
    let geometry = state.geometry();
    let width = geometry.width.max(0) as usize;
    let height = geometry.height.max(0) as usize;
    let mut cells = vec![vec![EMPTY_CELL; width]; height];

    let mut put = |x: i32, y: i32, value: u8| {
        if let Some(slot) = cells
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *slot = value;
        }
    };

    if let Some(session) = state.session() {
        for cell in session.trail() {
            put(cell.x, cell.y, PATH_BASE.saturating_add(session.color()));
        }
    }
    for (_, path) in state.board().paths() {
        for cell in path.cells() {
            put(cell.x, cell.y, PATH_BASE.saturating_add(path.color()));
        }
    }
    for marker in state.board().nodes().iter() {
        put(
            marker.cell.x,
            marker.cell.y,
            MARKER_BASE.saturating_add(marker.color),
        );
    }

    cells
}

fn grid_palette(palette: &PaletteSettings) -> Vec<EditorPaletteEntry> {
    let mut entries = vec![EditorPaletteEntry {
        value: EMPTY_CELL,
        rgba: COLOR_EMPTY,
        label: Some("empty".to_string()),
    }];
    let colors = palette.colors.len().min((MARKER_BASE - PATH_BASE) as usize);
    for color in 0..colors as u8 {
        entries.push(EditorPaletteEntry {
            value: PATH_BASE + color,
            rgba: palette.color(color),
            label: Some(format!("path {color}")),
        });
    }
    for color in 0..colors as u8 {
        entries.push(EditorPaletteEntry {
            value: MARKER_BASE.saturating_add(color),
            rgba: palette.color(color),
            label: Some(format!("marker {color}")),
        });
    }
    entries
}

fn stat(label: impl Into<String>, value: impl ToString) -> EditorStat {
    EditorStat {
        label: label.into(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat_value(snapshot: &EditorSnapshot, label: &str) -> String {
        snapshot
            .stats
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.value.clone())
            .unwrap_or_default()
    }

    #[test]
    fn step_advances_frame() {
        let mut session = EditorSession::standard().unwrap();
        let initial = session.state();

        let stepped = session.step("press", Some(1), Some(4)).expect("valid action");
        assert_eq!(stepped.frame, initial.frame + 1);
        assert_eq!(stat_value(&stepped, "drawing"), "true");
    }

    #[test]
    fn timeline_reports_history_len() {
        let mut session = EditorSession::standard().unwrap();
        assert_eq!(session.timeline().history_len, 1);

        session.step("noop", None, None).unwrap();
        session.step("noop", None, None).unwrap();

        let timeline = session.timeline();
        assert_eq!(timeline.frame, 2);
        assert_eq!(timeline.history_len, 3);
        assert!(timeline.can_rewind);
        assert!(!timeline.can_forward);
    }

    #[test]
    fn snapshot_encodes_markers_and_trail() {
        let mut session = EditorSession::standard().unwrap();
        session.step("press", Some(4), Some(0)).unwrap();
        let snapshot = session.step("drag", Some(4), Some(1)).unwrap();

        let grid = snapshot.grid.as_ref().expect("grid");
        assert_eq!(grid.origin, GridOrigin::BottomLeft);
        assert_eq!(grid.cells.len(), 5);
        // Round 1: (2,2) is the second color-0 marker, (4,0) the second color-1 marker.
        assert_eq!(grid.cells[2][2], MARKER_BASE);
        assert_eq!(grid.cells[0][4], MARKER_BASE + 1);
        // Aborted: (4,1) is a color-3 marker, so the step ends the session.
        assert_eq!(stat_value(&snapshot, "drawing"), "false");
        assert!(!snapshot.state.is_null());
    }

    #[test]
    fn seek_moves_cursor_to_requested_frame() {
        let mut session = EditorSession::standard().unwrap();
        session.step("noop", None, None).unwrap();
        session.step("noop", None, None).unwrap();

        let snapshot = session.seek(0);
        assert_eq!(snapshot.frame, 0);
        assert_eq!(session.timeline().frame, 0);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let mut session = EditorSession::standard().unwrap();
        let err = session.step("doesNotExist", None, None).unwrap_err();
        assert_eq!(err, EditorApiError::UnknownActionId("doesNotExist".to_string()));
    }
}

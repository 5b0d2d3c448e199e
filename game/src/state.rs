use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::board::{Board, BoardEvent};
use crate::debug::ConnectionReport;
use crate::error::{PuzzleError, Result};
use crate::grid::{Cell, GridGeometry, WorldPos};
use crate::levels::{LevelSet, PaletteOverflow};
use crate::path::PathId;
use crate::session::{BeginOutcome, DrawingSession, ExtendOutcome, IgnoreReason, SessionEnd};
use crate::settings::PuzzleSettings;
use crate::view::{GameView, GameViewEffect, GameViewEvent};

/// How authored marker lists are turned into colors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundRules {
    pub nodes_per_color: usize,
    pub palette_len: usize,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self {
            nodes_per_color: 2,
            palette_len: 4,
        }
    }
}

/// Notifications for round/win UI glue. Drain with `GameState::drain_events`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameEvent {
    RoundTextChanged { round: usize, max: usize },
    Won { round: usize },
    GameCompleted,
    Board(BoardEvent),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PressOutcome {
    /// The round is not accepting input.
    Locked,
    NoMarker,
    Started { evicted: Option<PathId> },
}

/// The whole puzzle: board, the optional in-progress drawing and round progression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub view: GameView,
    board: Board,
    session: Option<DrawingSession>,
    levels: LevelSet,
    rules: RoundRules,
    round: usize,
    #[serde(default)]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Builds the puzzle and starts round 1.
    pub fn new(geometry: GridGeometry, levels: LevelSet, rules: RoundRules) -> Result<Self> {
        if levels.is_empty() {
            return Err(PuzzleError::NoLevels);
        }
        let mut state = Self {
            view: GameView::default(),
            board: Board::new(geometry),
            session: None,
            levels,
            rules,
            round: 1,
            events: Vec::new(),
        };
        state.start_round(1)?;
        Ok(state)
    }

    /// Built-in levels on the default 5x5 grid.
    pub fn standard() -> Result<Self> {
        Self::new(
            GridGeometry::default(),
            LevelSet::builtin(),
            RoundRules::default(),
        )
    }

    pub fn from_settings(settings: &PuzzleSettings) -> Result<Self> {
        let levels = match &settings.gameplay.levels_path {
            Some(path) => LevelSet::load(path)?,
            None => LevelSet::builtin(),
        };
        let rules = RoundRules {
            nodes_per_color: settings.gameplay.nodes_per_color,
            palette_len: settings.palette.colors.len(),
        };
        if settings.gameplay.palette_overflow == PaletteOverflow::Reject {
            levels.validate(
                rules.nodes_per_color,
                rules.palette_len,
                PaletteOverflow::Reject,
            )?;
        }
        Self::new(settings.grid.geometry(), levels, rules)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn geometry(&self) -> &GridGeometry {
        self.board.geometry()
    }

    pub fn session(&self) -> Option<&DrawingSession> {
        self.session.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.session.is_some()
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn max_rounds(&self) -> usize {
        self.levels.len()
    }

    pub fn has_next_round(&self) -> bool {
        self.round < self.max_rounds()
    }

    pub fn rules(&self) -> RoundRules {
        self.rules
    }

    pub fn connection_report(&self) -> ConnectionReport {
        ConnectionReport::from_board(&self.board)
    }

    /// Clears the board and any drawing, then places round `round`'s markers.
    pub fn start_round(&mut self, round: usize) -> Result<()> {
        let level = self.levels.round(round)?;
        self.board
            .setup_round(&level.nodes, self.rules.nodes_per_color, self.rules.palette_len)?;
        self.session = None;
        self.round = round;
        self.view = GameView::Playing;

        info!(round, max = self.max_rounds(), markers = self.board.nodes().len(), "round started");
        self.events.push(GameEvent::RoundTextChanged {
            round,
            max: self.max_rounds(),
        });
        self.pump_board_events();
        Ok(())
    }

    pub fn restart_round(&mut self) -> Result<()> {
        let (view, effect) = self.view.handle(GameViewEvent::Restart);
        self.apply_view_effect(view, effect)
    }

    /// Advances after a completed round; on the last round the game completes instead.
    pub fn next_round(&mut self) -> Result<()> {
        let (view, effect) = self.view.handle(GameViewEvent::Advance {
            has_next: self.has_next_round(),
        });
        if view == GameView::GameComplete && self.view != GameView::GameComplete {
            info!(rounds = self.max_rounds(), "all rounds completed");
            self.events.push(GameEvent::GameCompleted);
        }
        self.apply_view_effect(view, effect)
    }

    fn apply_view_effect(&mut self, view: GameView, effect: GameViewEffect) -> Result<()> {
        match effect {
            GameViewEffect::None => {
                self.view = view;
                Ok(())
            }
            GameViewEffect::RestartRound => self.start_round(self.round),
            GameViewEffect::StartNextRound => self.start_round(self.round + 1),
        }
    }

    /// Starts drawing from `cell`. Pressing while a drawing is active is a caller error.
    pub fn press(&mut self, cell: Cell) -> Result<PressOutcome> {
        if self.session.is_some() {
            warn!(%cell, "press while a drawing is active");
            return Err(PuzzleError::SessionActive);
        }
        if !self.view.accepts_input() {
            return Ok(PressOutcome::Locked);
        }

        let outcome = match DrawingSession::begin_at(&mut self.board, cell) {
            BeginOutcome::NoMarker => PressOutcome::NoMarker,
            BeginOutcome::Started { session, evicted } => {
                self.session = Some(session);
                PressOutcome::Started { evicted }
            }
        };
        self.pump_board_events();
        Ok(outcome)
    }

    pub fn drag(&mut self, cell: Cell) -> ExtendOutcome {
        let Some(session) = self.session.as_mut() else {
            return ExtendOutcome::Ignored(IgnoreReason::Idle);
        };
        let outcome = session.extend_to(&mut self.board, cell);
        if outcome.ends_session() {
            self.session = None;
        }
        self.pump_board_events();
        outcome
    }

    /// Ends the current drawing. `None` when nothing was being drawn.
    pub fn release(&mut self) -> Option<SessionEnd> {
        let mut session = self.session.take()?;
        let end = session.release(&mut self.board);
        self.pump_board_events();
        Some(end)
    }

    /// Discards the in-progress drawing without touching the board.
    pub fn cancel_drawing(&mut self) {
        self.session = None;
    }

    pub fn remove_path(&mut self, path: PathId) -> bool {
        let removed = self.board.remove_path(path).is_some();
        self.pump_board_events();
        removed
    }

    pub fn pointer_down(&mut self, pos: WorldPos) -> Result<PressOutcome> {
        let cell = self.geometry().world_to_cell(pos);
        self.press(cell)
    }

    pub fn pointer_move(&mut self, pos: WorldPos) -> ExtendOutcome {
        let cell = self.geometry().world_to_cell(pos);
        self.drag(cell)
    }

    pub fn pointer_up(&mut self) -> Option<SessionEnd> {
        self.release()
    }

    /// Events raised since the last drain.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn pump_board_events(&mut self) {
        for event in self.board.drain_events() {
            if event == BoardEvent::Won {
                let (view, _) = self.view.handle(GameViewEvent::Won);
                self.view = view;
                info!(round = self.round, "round won");
                self.events.push(GameEvent::Won { round: self.round });
            }
            self.events.push(GameEvent::Board(event));
        }
    }
}

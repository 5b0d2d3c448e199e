mod common;

use std::fs;

use common::{ROUND_ONE, cells, unique_temp_path};
use flowgrid::board::BoardEvent;
use flowgrid::error::PuzzleError;
use flowgrid::grid::{Cell, GridGeometry, WorldPos};
use flowgrid::levels::{Level, LevelSet, PaletteOverflow};
use flowgrid::session::{ExtendOutcome, SessionEnd};
use flowgrid::settings::PuzzleSettings;
use flowgrid::state::{GameEvent, GameState, PressOutcome, RoundRules};
use flowgrid::view::GameView;

fn draw(state: &mut GameState, line: &[(i32, i32)]) {
    let line = cells(line);
    let (first, rest) = line.split_first().unwrap();
    assert!(matches!(
        state.press(*first).unwrap(),
        PressOutcome::Started { .. }
    ));
    for cell in rest {
        state.drag(*cell);
    }
    state.release();
}

fn solve_round_one(state: &mut GameState) {
    for line in ROUND_ONE {
        draw(state, line);
    }
}

#[test]
fn new_game_starts_round_one_and_announces_it() {
    let mut state = GameState::standard().unwrap();
    assert_eq!(state.round(), 1);
    assert_eq!(state.max_rounds(), 5);
    assert_eq!(state.view, GameView::Playing);
    assert_eq!(state.board().nodes().len(), 8);

    let events = state.drain_events();
    assert_eq!(events, vec![GameEvent::RoundTextChanged { round: 1, max: 5 }]);
    assert!(state.drain_events().is_empty());
}

#[test]
fn solving_a_round_emits_won_and_locks_input() {
    let mut state = GameState::standard().unwrap();
    state.drain_events();
    solve_round_one(&mut state);

    assert_eq!(state.view, GameView::RoundComplete);
    assert!(state.board().is_won());
    let report = state.connection_report();
    assert_eq!(report.connected_markers(), 8);
    assert!(report.won);

    let events = state.drain_events();
    let won_at = events
        .iter()
        .position(|e| *e == GameEvent::Won { round: 1 })
        .expect("won event");
    assert_eq!(events[won_at + 1], GameEvent::Board(BoardEvent::Won));
    assert_eq!(
        events.iter().filter(|e| matches!(e, GameEvent::Won { .. })).count(),
        1
    );

    assert_eq!(state.press(Cell::new(4, 1)).unwrap(), PressOutcome::Locked);
}

#[test]
fn next_round_loads_fresh_markers() {
    let mut state = GameState::standard().unwrap();
    solve_round_one(&mut state);
    state.drain_events();

    state.next_round().unwrap();
    assert_eq!(state.round(), 2);
    assert_eq!(state.view, GameView::Playing);
    assert_eq!(state.board().path_count(), 0);
    assert!(state.board().occupancy().is_empty());
    assert!(!state.board().win_signaled());
    assert!(state.board().marker_at(Cell::new(0, 4)).is_some());

    let events = state.drain_events();
    assert!(events.contains(&GameEvent::RoundTextChanged { round: 2, max: 5 }));
    let removed = events
        .iter()
        .filter(|e| matches!(e, GameEvent::Board(BoardEvent::PathRemoved { .. })))
        .count();
    assert_eq!(removed, 4);
}

#[test]
fn next_round_is_ignored_while_playing() {
    let mut state = GameState::standard().unwrap();
    state.next_round().unwrap();
    assert_eq!(state.round(), 1);
    assert_eq!(state.view, GameView::Playing);
}

#[test]
fn restart_clears_paths_and_drawing() {
    let mut state = GameState::standard().unwrap();
    draw(&mut state, ROUND_ONE[0]);
    state.press(Cell::new(1, 1)).unwrap();
    state.drag(Cell::new(1, 2));
    assert!(state.is_drawing());
    assert_eq!(state.board().path_count(), 1);

    state.restart_round().unwrap();
    assert!(!state.is_drawing());
    assert_eq!(state.board().path_count(), 0);
    assert_eq!(state.round(), 1);
}

#[test]
fn last_round_completes_the_game() {
    let levels = LevelSet {
        levels: vec![Level::new([(0, 0), (1, 0)])],
    };
    let mut state = GameState::new(GridGeometry::default(), levels, RoundRules::default()).unwrap();
    state.drain_events();

    draw(&mut state, &[(0, 0), (1, 0)]);
    assert_eq!(state.view, GameView::RoundComplete);
    assert!(!state.has_next_round());

    state.next_round().unwrap();
    assert_eq!(state.view, GameView::GameComplete);
    assert!(state.drain_events().contains(&GameEvent::GameCompleted));

    state.next_round().unwrap();
    assert!(!state.drain_events().contains(&GameEvent::GameCompleted));
}

#[test]
fn press_while_drawing_is_a_precondition_error() {
    let mut state = GameState::standard().unwrap();
    state.press(Cell::new(1, 4)).unwrap();

    let err = state.press(Cell::new(3, 3)).unwrap_err();
    assert!(matches!(err, PuzzleError::SessionActive));
    assert_eq!(state.session().unwrap().trail(), &[Cell::new(1, 4)]);
}

#[test]
fn idle_drag_and_release_do_nothing() {
    let mut state = GameState::standard().unwrap();
    assert_eq!(state.press(Cell::new(0, 0)).unwrap(), PressOutcome::NoMarker);
    assert!(matches!(state.drag(Cell::new(1, 0)), ExtendOutcome::Ignored(_)));
    assert_eq!(state.release(), None);
}

#[test]
fn pointer_helpers_resolve_world_positions() {
    let mut state = GameState::standard().unwrap();
    state.pointer_down(WorldPos::new(4.2, 0.9)).unwrap();
    assert_eq!(state.session().unwrap().trail(), &[Cell::new(4, 1)]);

    state.pointer_move(WorldPos::new(3.9, 2.1));
    let end = state.pointer_move(WorldPos::new(4.0, 3.4));
    assert!(matches!(end, ExtendOutcome::Finalized(_)));
    assert!(!state.is_drawing());
    assert_eq!(state.pointer_up(), None);
}

#[test]
fn release_mid_air_discards_the_trail() {
    let mut state = GameState::standard().unwrap();
    state.press(Cell::new(4, 1)).unwrap();
    state.drag(Cell::new(4, 2));

    assert!(matches!(state.release(), Some(SessionEnd::Aborted(_))));
    assert!(state.board().occupancy().is_empty());
}

#[test]
fn levels_load_from_a_json_file() {
    let path = unique_temp_path("levels", "json");
    fs::write(
        &path,
        r#"{"levels":[{"nodes":[[0,0],[4,4],[0,4],[4,0]]},{"nodes":[[2,2],[2,3]]}]}"#,
    )
    .unwrap();

    let mut settings = PuzzleSettings::default();
    settings.gameplay.levels_path = Some(path.clone());
    let state = GameState::from_settings(&settings).unwrap();

    assert_eq!(state.max_rounds(), 2);
    assert_eq!(state.board().marker_at(Cell::new(4, 4)).unwrap().color, 0);
    assert_eq!(state.board().marker_at(Cell::new(0, 4)).unwrap().color, 1);

    let _ = fs::remove_file(path);
}

#[test]
fn strict_palette_policy_rejects_oversized_levels() {
    let path = unique_temp_path("levels_strict", "json");
    fs::write(
        &path,
        r#"{"levels":[{"nodes":[[0,0],[0,1],[1,0],[1,1],[2,0],[2,1],[3,0],[3,1],[4,0],[4,1]]}]}"#,
    )
    .unwrap();

    let mut settings = PuzzleSettings::default();
    settings.gameplay.levels_path = Some(path.clone());

    let clamped = GameState::from_settings(&settings).unwrap();
    assert_eq!(clamped.board().marker_at(Cell::new(4, 1)).unwrap().color, 3);

    settings.gameplay.palette_overflow = PaletteOverflow::Reject;
    let err = GameState::from_settings(&settings).unwrap_err();
    assert!(matches!(err, PuzzleError::PaletteOverflow { groups: 5, colors: 4 }));

    let _ = fs::remove_file(path);
}

#[test]
fn game_state_round_trip_preserves_state() {
    let mut state = GameState::standard().unwrap();
    draw(&mut state, ROUND_ONE[0]);
    state.press(Cell::new(1, 1)).unwrap();
    state.drag(Cell::new(1, 2));

    let json = serde_json::to_string(&state).expect("serialize game state");
    let restored: GameState = serde_json::from_str(&json).expect("deserialize game state");
    assert_eq!(restored, state);
}

use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use engine::app::{AppConfig, AppContext, GameApp, InputFrame, run_game};
use engine::graphics::Renderer2d;
use engine::profiling::TracingProfiler;
use engine::{HeadlessRunner, TimeMachine};
use tracing::{error, info};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::ControlFlow;

use flowgrid::grid::Cell;
use flowgrid::logging;
use flowgrid::playtest::{FlowLogic, PuzzleInput};
use flowgrid::render::{BoardLayout, draw_game};
use flowgrid::settings::{PaletteSettings, SettingsStore};
use flowgrid::state::{GameEvent, GameState};

#[derive(Debug, Default)]
struct HeadfulCli {
    help: bool,
    record: bool,
    record_path: Option<PathBuf>,
    replay_path: Option<PathBuf>,
}

fn print_headful_help() {
    println!(
        r#"Flowgrid

Usage:
  headful [--record [PATH]]
  headful --replay PATH

Flags:
  --record [PATH]   Save the frame-by-frame state history to JSON on exit.
                    Defaults to target/recordings/headful_<nanos>.json
  --replay PATH     Load a saved recording and step through it.

Controls:
  Mouse drag        Draw from a marker to its partner
  R                 Restart round
  N                 Next round (after a win)
  C                 Log the connection report
  Left/Right        Step a replay (Home/End jump)
  Esc               Quit

Settings are read from $FLOWGRID_SETTINGS_PATH or <config dir>/flowgrid/settings.json."#
    );
}

fn parse_headful_cli() -> io::Result<HeadfulCli> {
    let mut cli = HeadfulCli::default();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => cli.help = true,
            "--record" => {
                cli.record = true;
                cli.record_path = args.next_if(|next| !next.starts_with("--")).map(PathBuf::from);
            }
            "--replay" => {
                let Some(path) = args.next() else {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "--replay requires a path",
                    ));
                };
                cli.replay_path = Some(PathBuf::from(path));
            }
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unknown argument: {other} (try --help)"),
                ));
            }
        }
    }

    if cli.record && cli.replay_path.is_some() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "cannot combine --record and --replay",
        ));
    }

    Ok(cli)
}

fn default_recording_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    PathBuf::from("target")
        .join("recordings")
        .join(format!("headful_{nanos}.json"))
}

fn round_title(state: &GameState) -> String {
    format!("Flowgrid - Round {}/{}", state.round(), state.max_rounds())
}

struct FlowApp {
    logic: FlowLogic,
    palette: PaletteSettings,
    record_path: Option<PathBuf>,
    replay: Option<TimeMachine<GameState>>,
}

struct HeadfulState {
    runner: HeadlessRunner<FlowLogic>,
    replay_mode: bool,
    last_cell: Option<Cell>,
    profiler: TracingProfiler,
}

impl HeadfulState {
    fn apply(&mut self, input: PuzzleInput) -> Vec<GameEvent> {
        if self.replay_mode {
            return Vec::new();
        }
        self.runner.step_profiled(input, &mut self.profiler);
        self.runner.state().events().to_vec()
    }
}

enum HeadfulEffect {
    SetTitle(String),
}

impl FlowApp {
    fn save_recording(&self, state: &HeadfulState) {
        let Some(path) = self.record_path.as_ref() else {
            return;
        };
        match state.runner.timemachine().save_json_file(path) {
            Ok(()) => info!(path = %path.display(), frames = state.runner.history().len(), "recording saved"),
            Err(err) => error!(path = %path.display(), %err, "failed to save recording"),
        }
    }

    fn effects_for(events: &[GameEvent], state: &GameState) -> Vec<HeadfulEffect> {
        let mut effects = Vec::new();
        for event in events {
            match event {
                GameEvent::RoundTextChanged { .. } => {
                    effects.push(HeadfulEffect::SetTitle(round_title(state)));
                }
                GameEvent::Won { round } => info!(round, "round clear, press N"),
                GameEvent::GameCompleted => info!("all rounds clear"),
                GameEvent::Board(_) => {}
            }
        }
        effects
    }
}

impl GameApp for FlowApp {
    type State = HeadfulState;
    type Effect = HeadfulEffect;

    fn init_state(&mut self, ctx: &mut AppContext) -> Self::State {
        let (runner, replay_mode) = match self.replay.take() {
            Some(tm) => (HeadlessRunner::from_timemachine(self.logic.clone(), tm), true),
            None => (HeadlessRunner::new(self.logic.clone()), false),
        };
        ctx.window.set_title(&round_title(runner.state()));
        HeadfulState {
            runner,
            replay_mode,
            last_cell: None,
            profiler: TracingProfiler,
        }
    }

    fn update_state(
        &mut self,
        state: &mut Self::State,
        input: InputFrame,
        _dt: Duration,
        ctx: &mut AppContext,
    ) -> Vec<Self::Effect> {
        let geometry = *state.runner.state().geometry();
        let layout = BoardLayout::fit(ctx.surface_size, &geometry);
        let cell = input
            .mouse_pos
            .map(|(x, y)| geometry.world_to_cell(layout.screen_to_world(x, y, &geometry)));

        let mut events = Vec::new();
        if input.mouse_down {
            if let Some(cell) = cell {
                events.extend(state.apply(PuzzleInput::Press(cell)));
            }
        } else if input.mouse_held && cell != state.last_cell {
            if let Some(cell) = cell {
                events.extend(state.apply(PuzzleInput::Drag(cell)));
            }
        }
        if input.mouse_up {
            events.extend(state.apply(PuzzleInput::Release));
        }
        state.last_cell = cell;

        Self::effects_for(&events, state.runner.state())
    }

    fn render(&mut self, state: &Self::State, renderer: &mut dyn Renderer2d) {
        let game = state.runner.state();
        let layout = BoardLayout::fit(renderer.size(), game.geometry());
        draw_game(renderer, game, &self.palette, &layout);
    }

    fn handle_effects(&mut self, effects: Vec<Self::Effect>, ctx: &mut AppContext) {
        for effect in effects {
            match effect {
                HeadfulEffect::SetTitle(title) => ctx.window.set_title(&title),
            }
        }
    }

    fn handle_event(
        &mut self,
        event: &Event<()>,
        state: &mut Self::State,
        _input: &mut InputFrame,
        ctx: &mut AppContext,
        control_flow: &mut ControlFlow,
    ) -> bool {
        let Event::WindowEvent { event, .. } = event else {
            return false;
        };
        match event {
            WindowEvent::CloseRequested => {
                self.save_recording(state);
                false
            }
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(key),
                        ..
                    },
                ..
            } => {
                let events = match key {
                    VirtualKeyCode::Escape => {
                        self.save_recording(state);
                        *control_flow = ControlFlow::Exit;
                        return true;
                    }
                    VirtualKeyCode::R => state.apply(PuzzleInput::RestartRound),
                    VirtualKeyCode::N => state.apply(PuzzleInput::NextRound),
                    VirtualKeyCode::C => {
                        state.runner.state().connection_report().log();
                        return true;
                    }
                    VirtualKeyCode::Left if state.replay_mode => {
                        state.runner.rewind(1);
                        Vec::new()
                    }
                    VirtualKeyCode::Right if state.replay_mode => {
                        state.runner.forward(1);
                        Vec::new()
                    }
                    VirtualKeyCode::Home if state.replay_mode => {
                        state.runner.seek(0);
                        Vec::new()
                    }
                    VirtualKeyCode::End if state.replay_mode => {
                        let last = state.runner.history().len().saturating_sub(1);
                        state.runner.seek(last);
                        Vec::new()
                    }
                    _ => return false,
                };
                if state.replay_mode {
                    ctx.window.set_title(&round_title(state.runner.state()));
                }
                let effects = Self::effects_for(&events, state.runner.state());
                self.handle_effects(effects, ctx);
                true
            }
            _ => false,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_headful_cli()?;
    if cli.help {
        print_headful_help();
        return Ok(());
    }

    let settings = SettingsStore::from_env().load();
    logging::init(settings.logging.debug);

    let logic = FlowLogic::from_settings(&settings)?;
    let replay = match cli.replay_path.as_ref() {
        Some(path) => {
            info!(path = %path.display(), "replaying recording");
            Some(TimeMachine::<GameState>::load_json_file(path)?)
        }
        None => None,
    };
    let record_path = cli
        .record
        .then(|| cli.record_path.unwrap_or_else(default_recording_path));
    if let Some(path) = record_path.as_ref() {
        info!(path = %path.display(), "recording enabled");
    }

    let app = FlowApp {
        logic,
        palette: settings.palette.clone(),
        record_path,
        replay,
    };
    let config = AppConfig {
        title: "Flowgrid".to_string(),
        desired_size: PhysicalSize::new(640, 720),
        clamp_to_monitor: true,
        vsync: Some(true),
    };
    run_game(config, app)
}

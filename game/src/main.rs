use engine::HeadlessRunner;
use engine::profiling::TracingProfiler;

use flowgrid::grid::Cell;
use flowgrid::logging;
use flowgrid::playtest::{FlowLogic, PuzzleInput, trace_inputs};

/// A known solution for the first built-in round.
const ROUND_ONE: &[&[(i32, i32)]] = &[
    &[(4, 1), (4, 2), (4, 3)],
    &[(1, 1), (1, 2), (1, 3), (2, 3), (2, 4), (3, 4), (4, 4)],
    &[(1, 4), (0, 4), (0, 3), (0, 2), (0, 1), (0, 0), (1, 0), (2, 0), (2, 1), (2, 2)],
    &[(3, 3), (3, 2), (3, 1), (3, 0), (4, 0)],
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(std::env::var_os("RUST_LOG").is_some());

    let mut runner = HeadlessRunner::new(FlowLogic::standard()?);
    let mut profiler = TracingProfiler;

    let inputs: Vec<PuzzleInput> = ROUND_ONE
        .iter()
        .flat_map(|line| {
            let cells: Vec<Cell> = line.iter().map(|&(x, y)| Cell::new(x, y)).collect();
            trace_inputs(&cells)
        })
        .collect();
    for input in inputs {
        runner.step_profiled(input, &mut profiler);
    }

    let state = runner.state();
    println!("frame {}: {:?}", runner.frame(), state.view);
    println!("{}", state.connection_report());
    Ok(())
}

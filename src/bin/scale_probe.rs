use std::env;
use std::time::Instant;

use kstar::tasks::explicit::ExplicitTask;
use kstar::tasks::grid::{GridTask, ManhattanHeuristic};
use kstar::{Cost, KStarEngineBuilder, SearchTask, StateId, TerminationStatus, Verbosity};
use sysinfo::{get_current_pid, ProcessExt, ProcessRefreshKind, System, SystemExt};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("scale_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    eprintln!("Top-k enumeration scaling probe");
    eprintln!(
        "Instances grow in state count; each run enumerates k={} plans and is \
         self-checked (validity, cost monotonicity, first-plan optimality) up to \
         the verify limit of {} states.",
        options.k, options.verify_limit
    );
    eprintln!();

    let mut sys = System::new();
    let mut measurements = Vec::new();

    eprintln!("[1/2] Layered graphs...");
    measurements.extend(run_layered(&options, &mut sys));
    eprintln!("[2/2] Grids with obstacles...");
    measurements.extend(run_grids(&options, &mut sys));

    let failed = measurements
        .iter()
        .filter(|m| matches!(m.verification, Verification::Failed))
        .count();

    if let Err(err) = options.format.write(&measurements) {
        eprintln!("scale_probe output error: {err}");
        std::process::exit(1);
    }
    if failed > 0 {
        eprintln!("{failed} probe run(s) failed verification");
        std::process::exit(1);
    }
}

struct Options {
    format: OutputFormat,
    k: usize,
    verify_limit: usize,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut k = 100usize;
        let mut verify_limit = 2048usize;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --format".to_string())?
                    .into();
                format = OutputFormat::from_str(&value)?;
            } else if let Some(value) = arg.strip_prefix("--k=") {
                k = value
                    .parse::<usize>()
                    .map_err(|_| "k must be a positive integer".to_string())?;
            } else if let Some(value) = arg.strip_prefix("--verify-limit=") {
                verify_limit = value
                    .parse::<usize>()
                    .map_err(|_| "verify limit must be a positive integer".to_string())?;
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        if k == 0 {
            return Err("k must be a positive integer".to_string());
        }
        Ok(Self {
            format,
            k,
            verify_limit,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --bin scale_probe [-- <options>]

Options:
  --format <csv|table|json>     Output format (default: csv)
  --k=<N>                       Plans to enumerate per instance (default: 100)
  --verify-limit=<N>            Largest state count to cross-check (default: 2048)
  -h, --help                    Print this help message
"
        );
    }
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) -> Result<(), String> {
        match self {
            OutputFormat::Csv => write_csv(measurements),
            OutputFormat::Table => write_table(measurements),
            OutputFormat::Json => write_json(measurements),
        }
    }
}

#[derive(Clone)]
struct Measurement {
    scenario: &'static str,
    size_desc: String,
    plans: usize,
    wall_s: f64,
    rss_delta_kib: u64,
    verification: Verification,
}

#[derive(Clone, Copy)]
enum Verification {
    NotChecked,
    Passed,
    Failed,
}

impl Verification {
    fn label(&self) -> &'static str {
        match self {
            Verification::NotChecked => "not_checked",
            Verification::Passed => "passed",
            Verification::Failed => "failed",
        }
    }
}

/// Deterministic pseudo-random layered task; edge weights derive from
/// the indices so repeated runs probe identical instances.
fn layered_task(layers: usize, width: usize) -> ExplicitTask {
    let num_states = layers * width + 2;
    let init = StateId(0);
    let goal = StateId((num_states - 1) as u32);
    let mut task = ExplicitTask::new(num_states, init);
    task.set_goal(goal);
    let state = |layer: usize, slot: usize| StateId((1 + layer * width + slot) as u32);
    let weight = |a: usize, b: usize| ((a * 7 + b * 13) % 11 + 1) as Cost;

    let mut name = 0usize;
    for slot in 0..width {
        task.add_action(&format!("a{name}"), init, state(0, slot), weight(0, slot));
        name += 1;
    }
    for layer in 0..layers - 1 {
        for slot in 0..width {
            for fan in 0..2 {
                let target = (slot + fan * 3 + layer) % width;
                task.add_action(
                    &format!("a{name}"),
                    state(layer, slot),
                    state(layer + 1, target),
                    weight(layer + slot, fan),
                );
                name += 1;
            }
        }
    }
    for slot in 0..width {
        task.add_action(
            &format!("a{name}"),
            state(layers - 1, slot),
            goal,
            weight(layers, slot),
        );
        name += 1;
    }
    task
}

fn run_layered(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const CONFIGS: &[(usize, usize)] = &[(16, 4), (32, 8), (64, 16), (128, 24), (256, 32)];
    CONFIGS
        .iter()
        .map(|&(layers, width)| {
            let task = layered_task(layers, width);
            let states = task.num_states();
            probe(
                "layered",
                format!("layers={layers},width={width}"),
                states <= options.verify_limit,
                options,
                sys,
                task,
            )
        })
        .collect()
}

fn run_grids(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const SIDES: &[usize] = &[8, 16, 24, 32];
    SIDES
        .iter()
        .map(|&side| {
            let mut grid = GridTask::new(side, side, (0, 0), (side - 1, side - 1));
            for y in 1..side - 1 {
                if y % 3 != 0 {
                    grid.block(side / 2, y);
                }
            }
            let states = side * side;
            probe_grid(
                format!("side={side}"),
                states <= options.verify_limit,
                options,
                sys,
                grid,
            )
        })
        .collect()
}

fn probe(
    scenario: &'static str,
    size_desc: String,
    verify: bool,
    options: &Options,
    sys: &mut System,
    task: ExplicitTask,
) -> Measurement {
    let before = rss_kib(sys);
    let start = Instant::now();
    let mut engine = KStarEngineBuilder::new(task.clone())
        .k(options.k)
        .verbosity(Verbosity::Silent)
        .build()
        .expect("probe task is well-formed");
    let outcome = engine.run().expect("probe run succeeds");
    let wall_s = start.elapsed().as_secs_f64();
    let after = rss_kib(sys);

    let verification = if verify {
        verify_outcome(&task, &outcome.plans, outcome.status)
    } else {
        Verification::NotChecked
    };
    report_line(scenario, &size_desc, outcome.plans.len(), wall_s, verification);
    Measurement {
        scenario,
        size_desc,
        plans: outcome.plans.len(),
        wall_s,
        rss_delta_kib: after.saturating_sub(before),
        verification,
    }
}

fn probe_grid(
    size_desc: String,
    verify: bool,
    options: &Options,
    sys: &mut System,
    grid: GridTask,
) -> Measurement {
    let before = rss_kib(sys);
    let start = Instant::now();
    let mut engine = KStarEngineBuilder::new(grid.clone())
        .with_heuristic(ManhattanHeuristic)
        .k(options.k)
        .verbosity(Verbosity::Silent)
        .build()
        .expect("probe grid is well-formed");
    let outcome = engine.run().expect("probe run succeeds");
    let wall_s = start.elapsed().as_secs_f64();
    let after = rss_kib(sys);

    let verification = if verify {
        verify_generic(&grid, &outcome.plans)
    } else {
        Verification::NotChecked
    };
    report_line("grid", &size_desc, outcome.plans.len(), wall_s, verification);
    Measurement {
        scenario: "grid",
        size_desc,
        plans: outcome.plans.len(),
        wall_s,
        rss_delta_kib: after.saturating_sub(before),
        verification,
    }
}

fn report_line(
    scenario: &str,
    size_desc: &str,
    plans: usize,
    wall_s: f64,
    verification: Verification,
) {
    eprintln!(
        "      {scenario} {size_desc}: {plans} plan(s), {wall_s:.3}s, {}",
        verification.label()
    );
}

/// Check validity and monotonicity, plus first-plan optimality against
/// an independent uniform-cost search.
fn verify_outcome(
    task: &ExplicitTask,
    plans: &[kstar::Plan],
    status: TerminationStatus,
) -> Verification {
    if matches!(verify_generic(task, plans), Verification::Failed) {
        return Verification::Failed;
    }
    let optimal = uniform_cost_optimum(task);
    match (plans.first(), optimal) {
        (Some(first), Some(best)) if first.cost == best => Verification::Passed,
        (None, None) if status == TerminationStatus::Unsolvable => Verification::Passed,
        _ => Verification::Failed,
    }
}

fn verify_generic(task: &impl SearchTask, plans: &[kstar::Plan]) -> Verification {
    let mut last = Cost::MIN;
    for plan in plans {
        if plan.cost < last {
            return Verification::Failed;
        }
        last = plan.cost;
        let mut state = task.initial_state();
        let mut total = 0;
        for &action in &plan.actions {
            if !task.applicable_actions(state).contains(&action) {
                return Verification::Failed;
            }
            state = task.apply(state, action);
            total += task.action_cost(action);
        }
        if !task.is_goal(state) || total != plan.cost {
            return Verification::Failed;
        }
    }
    Verification::Passed
}

/// Plain uniform-cost search, independent of the engine.
fn uniform_cost_optimum(task: &ExplicitTask) -> Option<Cost> {
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    let mut dist = vec![Cost::MAX; task.num_states()];
    let mut heap = BinaryHeap::new();
    dist[task.initial_state().index()] = 0;
    heap.push(Reverse((0, task.initial_state())));
    while let Some(Reverse((g, state))) = heap.pop() {
        if g > dist[state.index()] {
            continue;
        }
        if task.is_goal(state) {
            return Some(g);
        }
        for action in task.applicable_actions(state) {
            let next = task.apply(state, action);
            let cand = g + task.action_cost(action);
            if cand < dist[next.index()] {
                dist[next.index()] = cand;
                heap.push(Reverse((cand, next)));
            }
        }
    }
    None
}

fn write_csv(measurements: &[Measurement]) -> Result<(), String> {
    println!("scenario,size_desc,plans,wall_s,rss_delta_kib,verification");
    for m in measurements {
        println!(
            "{},{},{},{:.3},{},{}",
            m.scenario,
            m.size_desc,
            m.plans,
            m.wall_s,
            m.rss_delta_kib,
            m.verification.label()
        );
    }
    Ok(())
}

fn write_table(measurements: &[Measurement]) -> Result<(), String> {
    let mut col1 = "scenario".len();
    let mut col2 = "size".len();
    for m in measurements {
        col1 = col1.max(m.scenario.len());
        col2 = col2.max(m.size_desc.len());
    }
    println!(
        "{:<col1$}  {:<col2$}  {:>6}  {:>10}  {:>14}  {:>12}",
        "scenario",
        "size",
        "plans",
        "wall_s",
        "rss_delta_kib",
        "status",
        col1 = col1,
        col2 = col2
    );
    for m in measurements {
        println!(
            "{:<col1$}  {:<col2$}  {:>6}  {:>10.3}  {:>14}  {:>12}",
            m.scenario,
            m.size_desc,
            m.plans,
            m.wall_s,
            m.rss_delta_kib,
            m.verification.label(),
            col1 = col1,
            col2 = col2
        );
    }
    Ok(())
}

fn write_json(measurements: &[Measurement]) -> Result<(), String> {
    println!("[");
    for (idx, m) in measurements.iter().enumerate() {
        println!(
            "  {{\"scenario\":\"{}\",\"size\":\"{}\",\"plans\":{},\"wall_s\":{:.3},\"rss_delta_kib\":{},\"verification\":\"{}\"}}{}",
            m.scenario,
            m.size_desc,
            m.plans,
            m.wall_s,
            m.rss_delta_kib,
            m.verification.label(),
            if idx + 1 == measurements.len() { "" } else { "," }
        );
    }
    println!("]");
    Ok(())
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(process) = get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        process.memory()
    } else {
        0
    }
}

//! Example: top-k routes across a grid with obstacles.
//!
//! Run with:
//! `cargo run --example grid`

use kstar::tasks::grid::{GridTask, ManhattanHeuristic};
use kstar::{KStarEngineBuilder, SearchTask, Verbosity};

fn main() {
    let mut grid = GridTask::new(6, 6, (0, 0), (5, 5));
    for y in 1..5 {
        grid.block(3, y);
    }

    let mut engine = KStarEngineBuilder::new(grid)
        .with_heuristic(ManhattanHeuristic)
        .k(5)
        .simple_plans_only(true)
        .verbosity(Verbosity::Silent)
        .build()
        .expect("valid grid");
    let outcome = engine.run().expect("enumeration succeeds");

    println!("status: {:?}", outcome.status);
    for (i, plan) in outcome.plans.iter().enumerate() {
        let moves: Vec<_> = plan
            .actions
            .iter()
            .map(|&a| engine.task().action_name(a))
            .collect();
        println!("route {}: {} moves: {}", i + 1, plan.cost, moves.join(" "));
    }
    println!(
        "expansions: {}, path-graph pops: {}",
        outcome.stats.expansions, outcome.stats.pg_pops
    );
    std::process::exit(outcome.exit_code());
}

//! Example: enumerate the best plans of a small diamond-shaped task.
//!
//! Run with:
//! `cargo run --example diamond`

use kstar::tasks::explicit::ExplicitTask;
use kstar::{KStarEngineBuilder, SearchTask, StateId, Verbosity};

fn main() {
    // Two routes from 0 to 3 plus a costly loop at 1.
    let mut task = ExplicitTask::new(4, StateId(0));
    task.set_goal(StateId(3));
    task.add_action("a", StateId(0), StateId(1), 1);
    task.add_action("b", StateId(0), StateId(2), 2);
    task.add_action("c", StateId(1), StateId(3), 1);
    task.add_action("d", StateId(2), StateId(3), 1);
    task.add_action("e", StateId(1), StateId(1), 1);

    let mut engine = KStarEngineBuilder::new(task)
        .k(5)
        .verbosity(Verbosity::Silent)
        .build()
        .expect("valid task and configuration");
    let outcome = engine.run().expect("enumeration succeeds");

    println!("status: {:?}", outcome.status);
    for (i, plan) in outcome.plans.iter().enumerate() {
        let actions: Vec<_> = plan
            .actions
            .iter()
            .map(|&a| engine.task().action_name(a))
            .collect();
        println!(
            "plan {}: cost {}, actions [{}]{}",
            i + 1,
            plan.cost,
            actions.join(", "),
            if plan.is_simple() { "" } else { " (loops)" }
        );
    }
    std::process::exit(outcome.exit_code());
}

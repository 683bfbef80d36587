#![cfg(feature = "heavy")]
use rand::{rngs::StdRng, Rng, SeedableRng};

use kstar::tasks::explicit::ExplicitTask;
use kstar::{KStarEngineBuilder, SearchTask, StateId, Verbosity};

/// Random layered graph with forward edges and a few back edges to
/// create cycles; every layer is fully reachable.
fn random_layered_task(rng: &mut StdRng, layers: usize, width: usize) -> ExplicitTask {
    let num_states = layers * width + 2;
    let init = StateId(0);
    let goal = StateId((num_states - 1) as u32);
    let mut task = ExplicitTask::new(num_states, init);
    task.set_goal(goal);
    let state = |layer: usize, slot: usize| StateId((1 + layer * width + slot) as u32);

    let mut name = 0usize;
    let mut add = |task: &mut ExplicitTask, from: StateId, to: StateId, cost: i64| {
        task.add_action(&format!("a{name}"), from, to, cost);
        name += 1;
    };

    for slot in 0..width {
        add(&mut task, init, state(0, slot), rng.gen_range(1..10));
    }
    for layer in 0..layers - 1 {
        for slot in 0..width {
            for _ in 0..2 {
                let target = rng.gen_range(0..width);
                add(
                    &mut task,
                    state(layer, slot),
                    state(layer + 1, target),
                    rng.gen_range(1..10),
                );
            }
            if rng.gen_bool(0.1) && layer > 0 {
                let back = rng.gen_range(0..width);
                add(
                    &mut task,
                    state(layer, slot),
                    state(layer - 1, back),
                    rng.gen_range(1..10),
                );
            }
        }
    }
    for slot in 0..width {
        add(&mut task, state(layers - 1, slot), goal, rng.gen_range(1..10));
    }
    task
}

#[test]
fn heavy_stress_enumerates_many_plans() {
    let mut rng = StdRng::seed_from_u64(7);
    let task = random_layered_task(&mut rng, 40, 8);
    let mut engine = KStarEngineBuilder::new(task.clone())
        .k(200)
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();
    let outcome = engine.run().unwrap();
    assert!(!outcome.plans.is_empty());

    // Emission is monotone and every plan executes to the goal.
    let mut last = 0;
    for plan in &outcome.plans {
        assert!(plan.cost >= last);
        last = plan.cost;
        let mut state = task.initial_state();
        let mut total = 0;
        for &action in &plan.actions {
            assert!(task.applicable_actions(state).contains(&action));
            state = task.apply(state, action);
            total += task.action_cost(action);
        }
        assert!(task.is_goal(state));
        assert_eq!(total, plan.cost);
    }
}

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use kstar::tasks::explicit::ExplicitTask;
use kstar::tasks::grid::{GridTask, ManhattanHeuristic};
use kstar::{KStarEngineBuilder, StateId, Verbosity};

fn random_layered_task(rng: &mut StdRng, layers: usize, width: usize) -> ExplicitTask {
    let num_states = layers * width + 2;
    let init = StateId(0);
    let goal = StateId((num_states - 1) as u32);
    let mut task = ExplicitTask::new(num_states, init);
    task.set_goal(goal);
    let state = |layer: usize, slot: usize| StateId((1 + layer * width + slot) as u32);

    let mut name = 0usize;
    for slot in 0..width {
        task.add_action(&format!("a{name}"), init, state(0, slot), rng.gen_range(1..10));
        name += 1;
    }
    for layer in 0..layers - 1 {
        for slot in 0..width {
            for _ in 0..2 {
                let target = rng.gen_range(0..width);
                task.add_action(
                    &format!("a{name}"),
                    state(layer, slot),
                    state(layer + 1, target),
                    rng.gen_range(1..10),
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
            rng.gen_range(1..10),
        );
        name += 1;
    }
    task
}

fn bench_layered(c: &mut Criterion) {
    let mut group = c.benchmark_group("layered_top_k");
    for &(layers, width, k) in &[(20usize, 6usize, 50usize), (40, 8, 100)] {
        group.bench_function(format!("layers_{layers}_width_{width}_k_{k}"), |b| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(42);
                    random_layered_task(&mut rng, layers, width)
                },
                |task| {
                    let mut engine = KStarEngineBuilder::new(task)
                        .k(k)
                        .verbosity(Verbosity::Silent)
                        .build()
                        .unwrap();
                    let outcome = engine.run().unwrap();
                    criterion::black_box(outcome.plans.len());
                },
                BatchSize::PerIteration,
            )
        });
    }
    group.finish();
}

fn bench_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_top_k");
    for &(side, k) in &[(10usize, 20usize), (20, 50)] {
        group.bench_function(format!("grid_{side}x{side}_k_{k}"), |b| {
            b.iter_batched(
                || GridTask::new(side, side, (0, 0), (side - 1, side - 1)),
                |grid| {
                    let mut engine = KStarEngineBuilder::new(grid)
                        .with_heuristic(ManhattanHeuristic)
                        .k(k)
                        .verbosity(Verbosity::Silent)
                        .build()
                        .unwrap();
                    let outcome = engine.run().unwrap();
                    criterion::black_box(outcome.plans.len());
                },
                BatchSize::PerIteration,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layered, bench_grid);
criterion_main!(benches);

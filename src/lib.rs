//! K* top-k plan enumeration for classical planning.
//!
//! This crate finds the *k* least-cost plans of a deterministic
//! transition system with non-negative action costs, in non-decreasing
//! cost order, using the K* algorithm of Aljazzar and Leue.
//!
//! ## Core idea
//! 1. A forward A* search builds a shortest-path tree and tags every
//!    relaxed non-tree edge as a *sidetrack* with detour cost
//!    δ = cost + g(source) − g(target).
//! 2. Persistent min-heaps over the sidetracks along each tree path
//!    (Eppstein's construction) form a *path graph* whose paths are
//!    exactly the deviation sequences from the optimal plan.
//! 3. A best-first search over the path graph enumerates deviations in
//!    order of added detour cost; each popped entry reconstructs to one
//!    plan of cost C* + δ-sum.
//!
//! The two searches are interleaved: A* is interrupted once the first
//! solution is found and resumed whenever an open node could still beat
//! the next pending deviation (`f_u < C* + d`), so plans are only
//! emitted once they are provably unbeatable.
//!
//! ## Quick start
//! ```
//! use kstar::{KStarEngineBuilder, StateId, Verbosity};
//! use kstar::tasks::explicit::ExplicitTask;
//!
//! // Two routes to the goal: cost 1 and cost 2.
//! let mut task = ExplicitTask::new(2, StateId(0));
//! task.set_goal(StateId(1));
//! task.add_action("fast", StateId(0), StateId(1), 1);
//! task.add_action("slow", StateId(0), StateId(1), 2);
//!
//! let mut engine = KStarEngineBuilder::new(task)
//!     .k(2)
//!     .verbosity(Verbosity::Silent)
//!     .build()
//!     .unwrap();
//! let outcome = engine.run().unwrap();
//! let costs: Vec<_> = outcome.plans.iter().map(|p| p.cost).collect();
//! assert_eq!(costs, vec![1, 2]);
//! ```
//!
//! ## Built-in tasks
//! The `tasks` module contains reference implementations:
//! - an explicitly enumerated transition system, and
//! - four-connected grid navigation with a Manhattan heuristic.
//!
//! These serve both as ready-to-use tasks and as templates for plugging
//! your own transition systems into the engine.

pub mod astar;
pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod pathgraph;
pub mod plan;
pub mod reconstruct;
pub mod search_space;
pub mod sidetrack;
pub mod stats;
pub mod task;
pub mod tasks;
pub mod tree_heap;
pub mod utils;

pub use crate::builder::KStarEngineBuilder;
pub use crate::config::{KStarConfig, Verbosity};
pub use crate::engine::{KStarEngine, KStarOutcome, TerminationStatus};
pub use crate::error::{KStarError, KStarResult};
pub use crate::plan::{Plan, PlanSink};
pub use crate::stats::Statistics;
pub use crate::task::{ActionId, Cost, Heuristic, SearchTask, StateId};

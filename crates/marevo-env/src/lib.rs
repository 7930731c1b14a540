//! Environment adapters for the marevo evolutionary search.
//!
//! The search engine treats the simulated game as an opaque, stateful oracle.
//! This crate defines the narrow interface the engine talks to and ships two
//! implementations of it:
//!
//! - [`Environment`] - The adapter contract (reset, step, terminal check, fitness)
//! - [`simulator::CourseSimulator`] - A small side-scrolling platformer that honours
//!   the contract, used to run the search end to end
//! - [`scripted::ScriptedEnvironment`] - A deterministic stub with scripted rewards
//!   and termination, used by tests
//!
//! # Step Timing
//!
//! Every [`Environment::step`] holds the requested [`Action`] for the requested
//! number of [`HoldTicks`], releases it and advances one more neutral tick before
//! returning. A gene therefore always consumes `duration + 1` ticks of simulated
//! time.
//!
//! # Example
//!
//! ```
//! use marevo_env::{
//!     Action, Environment as _, HoldTicks,
//!     simulator::{CourseSimulator, SimulatorConfig},
//! };
//!
//! let mut env = CourseSimulator::new(SimulatorConfig::default());
//! env.reset().unwrap();
//! let step = env.step(Action::Right, HoldTicks::new(5).unwrap()).unwrap();
//! assert!(step.time_remaining > 0.0);
//! ```

pub use self::{action::*, environment::*};

mod action;
mod environment;
pub mod scripted;
pub mod simulator;

use crate::{Action, HoldTicks};

/// A stateful simulation that the search engine replays genomes against.
///
/// Implementations own all mutable simulation state. One instance serves one
/// episode at a time; concurrent evaluations each need their own instance,
/// which is why the trait requires [`Send`] but not [`Sync`].
pub trait Environment: Send {
    /// Observation returned by [`Self::reset`] and [`Self::step`].
    type Observation;

    /// Restarts the episode, fully resetting the simulated state.
    ///
    /// Must be callable any number of times.
    fn reset(&mut self) -> Result<Self::Observation, EnvironmentError>;

    /// Holds `action` for `duration` ticks, releases it and advances one more tick.
    ///
    /// Stepping an episode that is already terminal is not an error: no ticks are
    /// consumed and the returned step carries zero reward, zero time remaining and
    /// [`StepSignal::GameOver`].
    fn step(
        &mut self,
        action: Action,
        duration: HoldTicks,
    ) -> Result<Step<Self::Observation>, EnvironmentError>;

    /// Returns `true` when the episode cannot continue.
    fn is_terminal(&self) -> bool;

    /// Returns the composed fitness of the current simulation state.
    fn fitness(&self) -> f64;
}

/// Result of a single [`Environment::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct Step<O> {
    pub observation: O,
    /// Reward reported for this step; accumulated by the fitness evaluator.
    pub reward: f64,
    /// Remaining in-game time after the step.
    pub time_remaining: f64,
    pub signal: StepSignal,
}

/// Progress or termination signal carried by a [`Step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum StepSignal {
    Progress { level_progress: u32 },
    GameOver,
}

/// Failure of the underlying simulation resource.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EnvironmentError {
    #[display("environment failed to reset: {reason}")]
    Reset { reason: String },
    #[display("environment failed to step: {reason}")]
    Step { reason: String },
}

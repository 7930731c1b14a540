//! Deterministic scripted environment for tests.
//!
//! [`ScriptedEnvironment`] returns a fixed reward and time remaining on every
//! step, optionally becomes terminal after a fixed number of steps, and records
//! every step it receives so tests can check exactly what the engine consumed.
//!
//! ```
//! use marevo_env::{Action, Environment as _, HoldTicks, scripted::ScriptedEnvironment};
//!
//! let mut env = ScriptedEnvironment::new()
//!     .reward_per_step(2.0)
//!     .terminal_after(1);
//! env.reset().unwrap();
//! let step = env.step(Action::Left, HoldTicks::new(3).unwrap()).unwrap();
//! assert_eq!(step.reward, 2.0);
//! assert!(env.is_terminal());
//! ```

use crate::{Action, Environment, EnvironmentError, HoldTicks, Step, StepSignal};

#[derive(Debug, Clone)]
pub struct ScriptedEnvironment {
    reward_per_step: f64,
    time_remaining: f64,
    terminal_after: Option<usize>,
    failing_reset: bool,
    resets: usize,
    steps: Vec<(Action, HoldTicks)>,
    total_reward: f64,
}

impl Default for ScriptedEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEnvironment {
    /// Creates a stub that rewards 1.0 per step, reports 100.0 time remaining
    /// and never terminates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reward_per_step: 1.0,
            time_remaining: 100.0,
            terminal_after: None,
            failing_reset: false,
            resets: 0,
            steps: vec![],
            total_reward: 0.0,
        }
    }

    #[must_use]
    pub fn reward_per_step(mut self, reward: f64) -> Self {
        self.reward_per_step = reward;
        self
    }

    #[must_use]
    pub fn time_remaining(mut self, time_remaining: f64) -> Self {
        self.time_remaining = time_remaining;
        self
    }

    /// Makes the episode terminal once `steps` steps have been taken.
    ///
    /// With `steps == 0` the episode is terminal straight after reset.
    #[must_use]
    pub fn terminal_after(mut self, steps: usize) -> Self {
        self.terminal_after = Some(steps);
        self
    }

    /// Makes every [`Environment::reset`] call fail.
    #[must_use]
    pub fn failing_reset(mut self) -> Self {
        self.failing_reset = true;
        self
    }

    /// Steps taken since the last reset.
    #[must_use]
    pub fn steps(&self) -> &[(Action, HoldTicks)] {
        &self.steps
    }

    /// Number of successful resets over the stub's lifetime.
    #[must_use]
    pub fn resets(&self) -> usize {
        self.resets
    }
}

impl Environment for ScriptedEnvironment {
    type Observation = usize;

    fn reset(&mut self) -> Result<Self::Observation, EnvironmentError> {
        if self.failing_reset {
            return Err(EnvironmentError::Reset {
                reason: "scripted failure".to_owned(),
            });
        }
        self.resets += 1;
        self.steps.clear();
        self.total_reward = 0.0;
        Ok(0)
    }

    fn step(
        &mut self,
        action: Action,
        duration: HoldTicks,
    ) -> Result<Step<Self::Observation>, EnvironmentError> {
        if self.is_terminal() {
            return Ok(Step {
                observation: self.steps.len(),
                reward: 0.0,
                time_remaining: 0.0,
                signal: StepSignal::GameOver,
            });
        }
        self.steps.push((action, duration));
        self.total_reward += self.reward_per_step;
        let signal = if self.is_terminal() {
            StepSignal::GameOver
        } else {
            StepSignal::Progress {
                level_progress: u32::try_from(self.steps.len()).unwrap_or(u32::MAX),
            }
        };
        Ok(Step {
            observation: self.steps.len(),
            reward: self.reward_per_step,
            time_remaining: self.time_remaining,
            signal,
        })
    }

    fn is_terminal(&self) -> bool {
        self.terminal_after
            .is_some_and(|limit| self.steps.len() >= limit)
    }

    fn fitness(&self) -> f64 {
        self.total_reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(n: u8) -> HoldTicks {
        HoldTicks::new(n).unwrap()
    }

    #[test]
    fn test_records_steps_and_clears_on_reset() {
        let mut env = ScriptedEnvironment::new();
        env.reset().unwrap();
        env.step(Action::Right, ticks(2)).unwrap();
        env.step(Action::Jump, ticks(7)).unwrap();
        assert_eq!(
            env.steps(),
            &[(Action::Right, ticks(2)), (Action::Jump, ticks(7))]
        );
        assert!((env.fitness() - 2.0).abs() < f64::EPSILON);

        env.reset().unwrap();
        assert!(env.steps().is_empty());
        assert_eq!(env.resets(), 2);
    }

    #[test]
    fn test_terminal_step_consumes_nothing() {
        let mut env = ScriptedEnvironment::new().terminal_after(1);
        env.reset().unwrap();
        let first = env.step(Action::Left, ticks(1)).unwrap();
        assert!(first.signal.is_game_over());

        let second = env.step(Action::Left, ticks(1)).unwrap();
        assert_eq!(env.steps().len(), 1);
        assert!(second.reward.abs() < f64::EPSILON);
        assert!(second.time_remaining.abs() < f64::EPSILON);
    }

    #[test]
    fn test_failing_reset() {
        let mut env = ScriptedEnvironment::new().failing_reset();
        assert!(matches!(env.reset(), Err(EnvironmentError::Reset { .. })));
    }
}

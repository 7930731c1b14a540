//! A small side-scrolling platformer implementing [`Environment`].
//!
//! The simulator stands in for the emulated game the search was designed
//! against. It keeps the same observable quantities (score, level progress,
//! remaining time, lives) and the same step timing, so genomes evolved against it
//! exercise the engine exactly as a real adapter would.
//!
//! # Rules
//!
//! - `Left`/`Right` move one pixel per tick, `Jump` starts an arc of
//!   [`JUMP_TICKS`] ticks when grounded, `Up`/`Down` do not move
//! - Walking into a pit or into an enemy on the ground costs a life and respawns
//!   the player at the last checkpoint with the timer restored
//! - Landing on an enemy from the air scores [`STOMP_SCORE`]; touching a coin
//!   block in the air scores [`COIN_SCORE`] once
//! - The timer loses one unit every `ticks_per_time_unit` ticks; running out of
//!   time costs a life
//! - Reaching the goal scores [`CLEAR_SCORE`] and restarts the course with level
//!   progress kept
//!
//! # Fitness
//!
//! ```text
//! fitness = score + 20 * level_progress + time_left
//! ```
//!
//! Each step reports the composed fitness after the step as its reward.
//!
//! # Termination
//!
//! The episode is over once `lives <= loss_threshold` or the score turns negative.

use serde::{Deserialize, Serialize};

pub use self::course::*;
use crate::{Action, Environment, EnvironmentError, HoldTicks, Step, StepSignal};

mod course;

/// Ticks spent airborne after a jump.
pub const JUMP_TICKS: u32 = 20;
pub const STOMP_SCORE: i64 = 100;
pub const COIN_SCORE: i64 = 200;
pub const CLEAR_SCORE: i64 = 1000;

/// Weight of one tile of level progress in the composed fitness.
const PROGRESS_WEIGHT: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Course length in pixels.
    pub course_length: u32,
    /// Lives at the start of an episode.
    pub lives: u32,
    /// The episode ends once lives drop to this value or below.
    pub loss_threshold: u32,
    /// Timer value at the start of a life.
    pub time_limit: u32,
    pub ticks_per_time_unit: u32,
    pub course_seed: CourseSeed,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            course_length: 3000,
            lives: 2,
            loss_threshold: 1,
            time_limit: 400,
            ticks_per_time_unit: 24,
            course_seed: CourseSeed::default(),
        }
    }
}

/// What the player can see after a reset or step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub x: u32,
    pub level_progress: u32,
    pub airborne: bool,
    pub lives: u32,
    pub time_left: u32,
}

#[derive(Debug, Clone)]
struct PlayerState {
    x: u32,
    furthest_x: u32,
    laps: u32,
    airborne_ticks: u32,
    score: i64,
    lives: u32,
    time_left: u32,
    time_unit_ticks: u32,
    /// Enemies stomped and coin blocks emptied on the current lap.
    cleared: Vec<bool>,
}

#[derive(Debug, Clone)]
pub struct CourseSimulator {
    config: SimulatorConfig,
    course: Course,
    state: PlayerState,
    total_ticks: u64,
}

impl CourseSimulator {
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        let course = Course::generate(config.course_seed, config.course_length);
        let state = Self::initial_state(&config, &course);
        Self {
            config,
            course,
            state,
            total_ticks: 0,
        }
    }

    fn initial_state(config: &SimulatorConfig, course: &Course) -> PlayerState {
        PlayerState {
            x: 0,
            furthest_x: 0,
            laps: 0,
            airborne_ticks: 0,
            score: 0,
            lives: config.lives,
            time_left: config.time_limit,
            time_unit_ticks: 0,
            cleared: vec![false; course.obstacles().len()],
        }
    }

    #[must_use]
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    /// Ticks simulated since the last reset.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    #[must_use]
    pub fn score(&self) -> i64 {
        self.state.score
    }

    #[must_use]
    pub fn lives(&self) -> u32 {
        self.state.lives
    }

    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.state.time_left
    }

    /// Furthest distance reached, in tiles, counting completed laps.
    #[must_use]
    pub fn level_progress(&self) -> u32 {
        (self.state.laps * self.course.length() + self.state.furthest_x) / TILE_WIDTH
    }

    #[must_use]
    pub fn observation(&self) -> Observation {
        Observation {
            x: self.state.x,
            level_progress: self.level_progress(),
            airborne: self.state.airborne_ticks > 0,
            lives: self.state.lives,
            time_left: self.state.time_left,
        }
    }

    /// Advances one tick with `input` held (or nothing held).
    fn tick(&mut self, input: Option<Action>) {
        self.total_ticks += 1;
        let state = &mut self.state;

        let was_airborne = state.airborne_ticks > 0;
        match input {
            Some(Action::Left) => state.x = state.x.saturating_sub(1),
            Some(Action::Right) => state.x += 1,
            Some(Action::Jump) if !was_airborne => state.airborne_ticks = JUMP_TICKS,
            Some(Action::Jump | Action::Up | Action::Down) | None => {}
        }
        state.furthest_x = state.furthest_x.max(state.x);
        let airborne = state.airborne_ticks > 0;
        state.airborne_ticks = state.airborne_ticks.saturating_sub(1);

        let mut lost_life = false;
        for (obstacle, cleared) in self.course.obstacles().iter().zip(&mut state.cleared) {
            if *cleared || !obstacle.touches(state.x) {
                continue;
            }
            match obstacle {
                Obstacle::Pit { .. } => lost_life |= !airborne,
                Obstacle::Enemy { .. } if airborne => {
                    state.score += STOMP_SCORE;
                    *cleared = true;
                }
                Obstacle::Enemy { .. } => lost_life = true,
                Obstacle::CoinBlock { .. } if airborne => {
                    state.score += COIN_SCORE;
                    *cleared = true;
                }
                Obstacle::CoinBlock { .. } => {}
            }
        }

        if state.x >= self.course.length() {
            state.score += CLEAR_SCORE;
            state.laps += 1;
            state.x = 0;
            state.furthest_x = 0;
            state.cleared.fill(false);
        }

        state.time_unit_ticks += 1;
        if state.time_unit_ticks >= self.config.ticks_per_time_unit {
            state.time_unit_ticks = 0;
            state.time_left = state.time_left.saturating_sub(1);
            lost_life |= state.time_left == 0;
        }

        if lost_life {
            self.lose_life();
        }
    }

    fn lose_life(&mut self) {
        let checkpoint = self.course.checkpoint(self.state.furthest_x);
        let state = &mut self.state;
        state.lives = state.lives.saturating_sub(1);
        state.x = checkpoint;
        state.airborne_ticks = 0;
        state.time_left = self.config.time_limit;
        state.time_unit_ticks = 0;
    }
}

impl Environment for CourseSimulator {
    type Observation = Observation;

    fn reset(&mut self) -> Result<Self::Observation, EnvironmentError> {
        self.state = Self::initial_state(&self.config, &self.course);
        self.total_ticks = 0;
        // The game needs one tick to settle after a reset.
        self.tick(None);
        Ok(self.observation())
    }

    fn step(
        &mut self,
        action: Action,
        duration: HoldTicks,
    ) -> Result<Step<Self::Observation>, EnvironmentError> {
        if self.is_terminal() {
            return Ok(Step {
                observation: self.observation(),
                reward: 0.0,
                time_remaining: 0.0,
                signal: StepSignal::GameOver,
            });
        }

        for _ in 0..duration.get() {
            self.tick(Some(action));
        }
        self.tick(None);

        let signal = if self.is_terminal() {
            StepSignal::GameOver
        } else {
            StepSignal::Progress {
                level_progress: self.level_progress(),
            }
        };
        Ok(Step {
            observation: self.observation(),
            reward: self.fitness(),
            time_remaining: f64::from(self.state.time_left),
            signal,
        })
    }

    fn is_terminal(&self) -> bool {
        self.state.lives <= self.config.loss_threshold || self.state.score < 0
    }

    #[expect(clippy::cast_precision_loss)]
    fn fitness(&self) -> f64 {
        self.state.score as f64
            + PROGRESS_WEIGHT * f64::from(self.level_progress())
            + f64::from(self.state.time_left)
    }
}

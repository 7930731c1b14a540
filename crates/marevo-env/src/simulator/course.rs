use std::fmt::Write as _;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Width of one level-progress tile in pixels.
pub const TILE_WIDTH: u32 = 16;

/// Distance from the start that is kept free of obstacles.
const SAFE_ZONE: u32 = 160;

/// Seed for deterministic course generation.
///
/// A 128-bit seed serialized as a 32 character hex string. Courses built from the
/// same seed and length are identical, so every episode of a genome replays the
/// same level.
///
/// ```
/// use marevo_env::simulator::{Course, CourseSeed};
/// use rand::Rng as _;
///
/// let seed: CourseSeed = rand::rng().random();
/// assert_eq!(Course::generate(seed, 2000), Course::generate(seed, 2000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseSeed([u8; 16]);

impl CourseSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl Default for CourseSeed {
    fn default() -> Self {
        Self(*b"marevo-course-01")
    }
}

impl Serialize for CourseSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for CourseSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid course seed: expected 32 hex characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16).map_err(|e| {
            serde::de::Error::custom(format!("invalid course seed: {hex_str} ({e})"))
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<CourseSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> CourseSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        CourseSeed(seed)
    }
}

/// Something placed along the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstacle {
    /// Gap in the floor covering `start..end`; walking into it costs a life.
    Pit { start: u32, end: u32 },
    /// Walker at `x`; deadly on the ground, stomped from the air.
    Enemy { x: u32 },
    /// Block at `x` that pays out once when touched in the air.
    CoinBlock { x: u32 },
}

impl Obstacle {
    /// Whether a player standing at `x` touches this obstacle.
    #[must_use]
    pub fn touches(&self, x: u32) -> bool {
        const REACH: u32 = 6;
        match *self {
            Self::Pit { start, end } => (start..end).contains(&x),
            Self::Enemy { x: at } | Self::CoinBlock { x: at } => x.abs_diff(at) <= REACH,
        }
    }
}

/// A generated level layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    length: u32,
    obstacles: Vec<Obstacle>,
}

impl Course {
    /// Generates a course of `length` pixels from `seed`.
    ///
    /// Obstacles are spaced 96 to 240 pixels apart, starting after a safe zone and
    /// ending before the goal.
    #[must_use]
    pub fn generate(seed: CourseSeed, length: u32) -> Self {
        let mut rng = Pcg32::from_seed(seed.0);
        let mut obstacles = vec![];
        let mut x = SAFE_ZONE;
        loop {
            x += rng.random_range(96..=240);
            if x + 64 >= length {
                break;
            }
            let obstacle = match rng.random_range(0..3) {
                0 => Obstacle::Pit {
                    start: x,
                    end: x + rng.random_range(24..=40),
                },
                1 => Obstacle::Enemy { x },
                _ => Obstacle::CoinBlock { x },
            };
            obstacles.push(obstacle);
        }
        Self { length, obstacles }
    }

    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Respawn point for a player who has reached `furthest_x`.
    #[must_use]
    pub fn checkpoint(&self, furthest_x: u32) -> u32 {
        let midpoint = self.length / 2;
        if furthest_x >= midpoint { midpoint } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_json_is_32_char_hex() {
        let seed = CourseSeed::from_bytes([0xAB; 16]);
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"abababababababababababababababab\"");
        let back: CourseSeed = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seed);
    }

    #[test]
    fn test_seed_rejects_wrong_length() {
        let result: Result<CourseSeed, _> = serde_json::from_str("\"abc\"");
        assert!(result.unwrap_err().to_string().contains("invalid course seed"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let seed = CourseSeed::default();
        assert_eq!(Course::generate(seed, 3000), Course::generate(seed, 3000));
    }

    #[test]
    fn test_obstacles_respect_safe_zone_and_goal() {
        let course = Course::generate(CourseSeed::default(), 3000);
        assert!(!course.obstacles().is_empty());
        for obstacle in course.obstacles() {
            let x = match *obstacle {
                Obstacle::Pit { start, .. } => start,
                Obstacle::Enemy { x } | Obstacle::CoinBlock { x } => x,
            };
            assert!(x > SAFE_ZONE);
            assert!(x + 64 < 3000);
        }
    }

    #[test]
    fn test_checkpoint() {
        let course = Course::generate(CourseSeed::default(), 3000);
        assert_eq!(course.checkpoint(100), 0);
        assert_eq!(course.checkpoint(1600), 1500);
    }
}

use std::fmt;

/// A controller input held for the duration of a gene.
///
/// The discriminant is the action index used on the wire and in saved genomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Left = 0,
    Right = 1,
    Jump = 2,
    Up = 3,
    Down = 4,
}

impl Action {
    /// Number of distinct actions.
    pub const LEN: usize = 5;

    /// All actions in index order.
    pub const ALL: [Self; Self::LEN] = [Self::Left, Self::Right, Self::Jump, Self::Up, Self::Down];

    /// Converts an action index (`0..=4`) to an [`Action`].
    pub fn from_index(index: u8) -> Result<Self, ActionError> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(ActionError::UnknownAction { index })
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Human-readable name, as printed by plan listings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Jump => "A",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of ticks an action is held before release.
///
/// Always within [`HoldTicks::MIN`]`..=`[`HoldTicks::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HoldTicks(u8);

impl HoldTicks {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// All valid durations in ascending order.
    pub const ALL: [Self; Self::MAX as usize] = [
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
        Self(7),
        Self(8),
        Self(9),
        Self(10),
    ];

    pub fn new(ticks: u8) -> Result<Self, ActionError> {
        if (Self::MIN..=Self::MAX).contains(&ticks) {
            Ok(Self(ticks))
        } else {
            Err(ActionError::InvalidDuration { ticks })
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for HoldTicks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ActionError {
    #[display("unknown action index {index} (expected 0..=4)")]
    UnknownAction { index: u8 },
    #[display("invalid hold duration {ticks} (expected 1..=10)")]
    InvalidDuration { ticks: u8 },
}

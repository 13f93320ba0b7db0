use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::rounded_percent;

/// Direction of a vote on a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteValue::Up => "UP",
            VoteValue::Down => "DOWN",
        }
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteValue {
    type Err = String;

    /// Exact match only: lowercase or padded values are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" => Ok(VoteValue::Up),
            "DOWN" => Ok(VoteValue::Down),
            other => Err(format!("invalid vote value: {other:?}")),
        }
    }
}

/// Live up/down counts for one bill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub up: i64,
    pub down: i64,
}

impl VoteTally {
    pub fn new(up: i64, down: i64) -> Self {
        Self { up, down }
    }

    pub fn total(&self) -> i64 {
        self.up + self.down
    }

    /// Share of UP votes as an integer percentage in `0..=100`.
    /// An empty tally has ratio 0.
    pub fn ratio(&self) -> i64 {
        rounded_percent(self.up, self.total().max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_values_only() {
        assert_eq!("UP".parse::<VoteValue>().unwrap(), VoteValue::Up);
        assert_eq!("DOWN".parse::<VoteValue>().unwrap(), VoteValue::Down);
        assert!("up".parse::<VoteValue>().is_err());
        assert!(" UP".parse::<VoteValue>().is_err());
        assert!("".parse::<VoteValue>().is_err());
    }

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&VoteValue::Down).unwrap(), "\"DOWN\"");
    }

    #[test]
    fn empty_tally_has_zero_ratio() {
        assert_eq!(VoteTally::default().ratio(), 0);
    }

    #[test]
    fn ratio_rounds_to_nearest() {
        assert_eq!(VoteTally::new(1, 0).ratio(), 100);
        assert_eq!(VoteTally::new(0, 3).ratio(), 0);
        assert_eq!(VoteTally::new(1, 1).ratio(), 50);
        assert_eq!(VoteTally::new(2, 1).ratio(), 67);
        assert_eq!(VoteTally::new(1, 2).ratio(), 33);
    }

    #[test]
    fn ratio_stays_within_bounds() {
        for up in 0..30 {
            for down in 0..30 {
                let ratio = VoteTally::new(up, down).ratio();
                assert!((0..=100).contains(&ratio), "{up}/{down} gave {ratio}");
            }
        }
    }
}

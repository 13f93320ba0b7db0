use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The two races of the mock lower-house election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallotKind {
    /// Single-seat district race; the value is a free-text candidate name.
    District,
    /// Proportional representation; the value is a party name.
    Pr,
}

impl BallotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BallotKind::District => "district",
            BallotKind::Pr => "pr",
        }
    }
}

impl fmt::Display for BallotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BallotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "district" => Ok(BallotKind::District),
            "pr" => Ok(BallotKind::Pr),
            other => Err(format!("invalid ballot kind: {other:?}")),
        }
    }
}

/// Who cast a ballot. Signed-in users and anonymous devices live in
/// separate key spaces, so a user id never collides with a device id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Voter {
    User(String),
    Device(String),
}

impl Voter {
    pub fn kind(&self) -> &'static str {
        match self {
            Voter::User(_) => "user",
            Voter::Device(_) => "device",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Voter::User(id) | Voter::Device(id) => id,
        }
    }
}

/// Catch-all bucket for values outside the known party list.
pub const OTHER_PARTY: &str = "その他";

/// Display order and colour of every tally bucket. The order is a display
/// contract and never depends on the counts.
pub const PARTIES: [(&str, &str); 9] = [
    ("自民党", "#C9191E"),
    ("立憲民主党", "#004EA2"),
    ("公明党", "#F5B400"),
    ("日本維新の会", "#7DBE2E"),
    ("国民民主党", "#1D56A5"),
    ("共産党", "#D6002B"),
    ("れいわ新選組", "#E64287"),
    ("社民党", "#00A0DE"),
    (OTHER_PARTY, "#6B7280"),
];

pub const TALLY_METRIC: &str = "votes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub key: String,
    pub label: String,
    pub value: i64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseTally {
    pub updated_at: String,
    pub metric: String,
    pub total: i64,
    pub slices: Vec<Slice>,
}

impl HouseTally {
    /// Folds raw `(value, count)` groups into the fixed party layout.
    /// Unknown or blank values are summed into [`OTHER_PARTY`].
    pub fn from_counts<'a, I>(counts: I, updated_at: String) -> Self
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        let mut buckets: HashMap<&str, i64> = HashMap::new();
        for (value, count) in counts {
            let value = value.trim();
            let key = PARTIES
                .iter()
                .map(|(name, _)| *name)
                .find(|name| *name == value)
                .unwrap_or(OTHER_PARTY);
            *buckets.entry(key).or_insert(0) += count;
        }

        let slices: Vec<Slice> = PARTIES
            .iter()
            .map(|(name, color)| Slice {
                key: name.to_string(),
                label: name.to_string(),
                value: buckets.get(name).copied().unwrap_or(0),
                color: color.to_string(),
            })
            .collect();
        let total = slices.iter().map(|s| s.value).sum();

        Self {
            updated_at,
            metric: TALLY_METRIC.to_string(),
            total,
            slices,
        }
    }

    /// All buckets at zero, served when the store cannot be read.
    pub fn empty(updated_at: String) -> Self {
        Self::from_counts(std::iter::empty(), updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(tally: &HouseTally) -> Vec<&str> {
        tally.slices.iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn kind_round_trips_through_str() {
        assert_eq!("pr".parse::<BallotKind>().unwrap(), BallotKind::Pr);
        assert_eq!(BallotKind::District.as_str(), "district");
        assert!("PR".parse::<BallotKind>().is_err());
    }

    #[test]
    fn voter_key_spaces_are_distinct() {
        let user = Voter::User("abc".into());
        let device = Voter::Device("abc".into());
        assert_ne!(user, device);
        assert_eq!(user.id(), device.id());
        assert_ne!(user.kind(), device.kind());
    }

    #[test]
    fn slices_follow_fixed_order_regardless_of_counts() {
        let tally = HouseTally::from_counts(
            vec![("社民党", 10), ("自民党", 1), ("共産党", 5)],
            "now".into(),
        );
        let expected: Vec<&str> = PARTIES.iter().map(|(name, _)| *name).collect();
        assert_eq!(labels(&tally), expected);
        assert_eq!(tally.slices[0].value, 1);
        assert_eq!(tally.slices[5].value, 5);
        assert_eq!(tally.slices[7].value, 10);
        assert_eq!(tally.total, 16);
    }

    #[test]
    fn unknown_and_blank_values_go_to_other() {
        let tally = HouseTally::from_counts(
            vec![("無所属", 2), ("", 1), (OTHER_PARTY, 3), ("自民党", 1)],
            "now".into(),
        );
        let other = tally.slices.last().unwrap();
        assert_eq!(other.label, OTHER_PARTY);
        assert_eq!(other.value, 6);
        assert_eq!(tally.total, 7);
    }

    #[test]
    fn every_slice_has_its_color() {
        let tally = HouseTally::empty("now".into());
        assert_eq!(tally.slices[0].color, "#C9191E");
        assert_eq!(tally.slices[8].color, "#6B7280");
        assert!(tally.slices.iter().all(|s| s.key == s.label));
    }

    #[test]
    fn empty_tally_is_zero_filled() {
        let tally = HouseTally::empty("2025-01-01T00:00:00Z".into());
        assert_eq!(tally.total, 0);
        assert_eq!(tally.slices.len(), 9);
        assert!(tally.slices.iter().all(|s| s.value == 0));
        assert_eq!(tally.metric, "votes");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(HouseTally::empty("t".into())).unwrap();
        assert_eq!(json["updatedAt"], "t");
        assert_eq!(json["slices"][1]["key"], "立憲民主党");
    }
}

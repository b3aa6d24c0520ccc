use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// User risk preference. Scales both the decision threshold and the trade size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            RiskLevel::Low => 0.5,
            RiskLevel::Medium => 1.0,
            RiskLevel::High => 2.0,
        }
    }

    /// Map the legacy 1-10 slider value onto the three levels
    pub fn from_score(score: u8) -> Option<Self> {
        match score {
            1..=3 => Some(RiskLevel::Low),
            4..=7 => Some(RiskLevel::Medium),
            8..=10 => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            other => other
                .parse::<u8>()
                .ok()
                .and_then(RiskLevel::from_score)
                .ok_or_else(|| format!("Unknown risk level: {}", s)),
        }
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRiskLevel {
    Name(String),
    Score(u8),
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawRiskLevel::deserialize(deserializer)? {
            RawRiskLevel::Name(name) => name.parse().map_err(serde::de::Error::custom),
            RawRiskLevel::Score(score) => RiskLevel::from_score(score).ok_or_else(|| {
                serde::de::Error::custom(format!("risk score {} outside 1-10", score))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipliers() {
        assert_eq!(RiskLevel::Low.multiplier(), 0.5);
        assert_eq!(RiskLevel::Medium.multiplier(), 1.0);
        assert_eq!(RiskLevel::High.multiplier(), 2.0);
    }

    #[test]
    fn test_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn test_from_score() {
        assert_eq!(RiskLevel::from_score(1), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::from_score(5), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::from_score(10), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_score(0), None);
        assert_eq!(RiskLevel::from_score(11), None);
    }

    #[test]
    fn test_deserialize_both_schemas() {
        let named: RiskLevel = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(named, RiskLevel::High);

        let lower: RiskLevel = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(lower, RiskLevel::Low);

        let scored: RiskLevel = serde_json::from_str("6").unwrap();
        assert_eq!(scored, RiskLevel::Medium);

        assert!(serde_json::from_str::<RiskLevel>("42").is_err());
        assert!(serde_json::from_str::<RiskLevel>("\"EXTREME\"").is_err());
    }

    #[test]
    fn test_serialize_as_name() {
        assert_eq!(serde_json::to_string(&RiskLevel::Low).unwrap(), "\"LOW\"");
    }
}

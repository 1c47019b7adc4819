//! Maps a probability to a risk level and a recommendation

use serde::{Deserialize, Serialize};
use std::fmt;

pub const HIGH_THRESHOLD: f64 = 0.7;
pub const MEDIUM_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Lower bound of each band is inclusive.
    pub fn from_probability(p: f64) -> Self {
        if p >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if p >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn recommendation(&self, drug_type: &str) -> String {
        match self {
            RiskLevel::High => format!(
                "High risk of MRL violation. Recommend reducing dosage or choosing alternative medicine for {drug_type}."
            ),
            RiskLevel::Medium => format!(
                "Moderate risk detected. Monitor animal closely and ensure proper withdrawal period for {drug_type}."
            ),
            RiskLevel::Low => format!(
                "Low risk. Current dosage appears safe for {drug_type}. Follow standard withdrawal period."
            ),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome returned to callers. Field names are the wire names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub violation_probability: f64,
    pub recommendation: String,
}

impl RiskAssessment {
    /// Level comes from the unrounded probability; only the displayed
    /// numbers are rounded.
    pub fn from_probability(p: f64, drug_type: &str) -> Self {
        let risk_level = RiskLevel::from_probability(p);
        Self {
            risk_score: round_to(p, 3),
            risk_level,
            violation_probability: round_to(p * 100.0, 2),
            recommendation: risk_level.recommendation(drug_type),
        }
    }
}

/// Decimal rounding, ties away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_inclusive_at_the_lower_bound() {
        assert_eq!(RiskLevel::from_probability(0.7), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.4), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.39999), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.69999), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::High);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_to(0.0625, 3), 0.063);
        assert_eq!(round_to(12.125, 2), 12.13);
        assert_eq!(round_to(0.12345, 3), 0.123);
    }

    #[test]
    fn serializes_level_in_lowercase() {
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}

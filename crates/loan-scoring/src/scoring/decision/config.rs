use serde::{Deserialize, Serialize};

use super::super::risk::RiskBand;

/// Ceiling offer per band, before consent bonuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferSchedule {
    pub low_risk: u32,
    pub medium_risk: u32,
    /// Only reachable when `DecisionConfig::reject_below` is lowered under the
    /// medium-risk threshold; by default every High Risk score is rejected.
    pub high_risk: u32,
}

impl Default for OfferSchedule {
    fn default() -> Self {
        Self {
            low_risk: 20_000,
            medium_risk: 12_000,
            high_risk: 6_000,
        }
    }
}

impl OfferSchedule {
    pub fn base_offer(&self, band: RiskBand) -> u32 {
        match band {
            RiskBand::Low => self.low_risk,
            RiskBand::Medium => self.medium_risk,
            RiskBand::High => self.high_risk,
            RiskBand::Reject => 0,
        }
    }
}

/// Added to the base offer for each consented data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentBonuses {
    pub recharge: u32,
    pub electricity: u32,
    /// Only paid when the applicant has dependents.
    pub education: u32,
}

impl Default for ConsentBonuses {
    fn default() -> Self {
        Self {
            recharge: 2_000,
            electricity: 2_000,
            education: 3_000,
        }
    }
}

/// Automatic approval paths for Low Risk applications. Any one path suffices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRules {
    pub strong_sci: f64,
    pub good_sci: f64,
    pub good_sci_max_ratio: f64,
    pub confident_max_ratio: f64,
    pub confident_ml_probability: f64,
    /// Thresholds for the audit-only high-confidence flag.
    pub high_confidence_ml: f64,
    pub high_confidence_composite: f64,
    pub high_confidence_max_ratio: f64,
}

impl Default for ApprovalRules {
    fn default() -> Self {
        Self {
            strong_sci: 80.0,
            good_sci: 75.0,
            good_sci_max_ratio: 0.5,
            confident_max_ratio: 0.35,
            confident_ml_probability: 0.75,
            high_confidence_ml: 0.82,
            high_confidence_composite: 60.0,
            high_confidence_max_ratio: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Fused scores below this are rejected outright. Zero disables the rule.
    pub reject_below: f64,
    pub offers: OfferSchedule,
    pub bonuses: ConsentBonuses,
    pub approval: ApprovalRules,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            reject_below: 50.0,
            offers: OfferSchedule::default(),
            bonuses: ConsentBonuses::default(),
            approval: ApprovalRules::default(),
        }
    }
}

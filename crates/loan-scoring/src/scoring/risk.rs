use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Reject")]
    Reject,
}

impl RiskBand {
    pub fn label(self) -> &'static str {
        match self {
            RiskBand::Low => "Low Risk",
            RiskBand::Medium => "Medium Risk",
            RiskBand::High => "High Risk",
            RiskBand::Reject => "Reject",
        }
    }
}

/// Informational only. Never changes the band or the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedLabel {
    #[serde(rename = "High Need")]
    High,
    #[serde(rename = "Low Need")]
    Low,
}

/// Score cut-offs, inclusive at the lower edge of each band.
///
/// The classifier only emits the three scored bands. [`RiskBand::Reject`] is
/// assigned by the decision policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub low_risk: f64,
    pub medium_risk: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_risk: 70.0,
            medium_risk: 50.0,
        }
    }
}

pub fn classify_risk(
    thresholds: &RiskThresholds,
    final_sci: f64,
    socially_disadvantaged: bool,
) -> (RiskBand, NeedLabel) {
    let band = if final_sci >= thresholds.low_risk {
        RiskBand::Low
    } else if final_sci >= thresholds.medium_risk {
        RiskBand::Medium
    } else {
        RiskBand::High
    };

    let need = if socially_disadvantaged {
        NeedLabel::High
    } else {
        NeedLabel::Low
    };

    (band, need)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_are_inclusive() {
        let thresholds = RiskThresholds::default();
        assert_eq!(classify_risk(&thresholds, 70.0, false).0, RiskBand::Low);
        assert_eq!(classify_risk(&thresholds, 69.99, false).0, RiskBand::Medium);
        assert_eq!(classify_risk(&thresholds, 50.0, false).0, RiskBand::Medium);
        assert_eq!(classify_risk(&thresholds, 49.99, false).0, RiskBand::High);
    }

    #[test]
    fn classifier_never_rejects() {
        let thresholds = RiskThresholds::default();
        assert_eq!(classify_risk(&thresholds, 0.0, false).0, RiskBand::High);
    }

    #[test]
    fn need_follows_social_flag_only() {
        let thresholds = RiskThresholds::default();
        assert_eq!(classify_risk(&thresholds, 90.0, true).1, NeedLabel::High);
        assert_eq!(classify_risk(&thresholds, 10.0, false).1, NeedLabel::Low);
    }

    #[test]
    fn bands_serialize_with_display_labels() {
        let value = serde_json::to_value(RiskBand::Medium).expect("serialize");
        assert_eq!(value, serde_json::json!("Medium Risk"));
        assert_eq!(RiskBand::Medium.label(), "Medium Risk");
    }
}

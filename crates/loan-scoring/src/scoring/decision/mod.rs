mod config;
mod policy;

pub use config::{ApprovalRules, ConsentBonuses, DecisionConfig, OfferSchedule};
pub use policy::{format_rupees, DecisionStatus};

use serde::{Deserialize, Serialize};

use super::numeric::round_to;
use super::pillars::Segment;
use super::risk::RiskBand;
use policy::{resolve_status, DecisionSignals};

/// Everything the decision step reads. Produced by the earlier scoring stages.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionInputs {
    pub classified_band: RiskBand,
    pub final_sci: f64,
    pub ml_probability: f64,
    pub composite_score: f64,
    pub declared_income: f64,
    pub loan_amount: f64,
    pub consent_recharge: bool,
    pub consent_electricity: bool,
    /// Education consent together with dependents.
    pub education_consented: bool,
    pub segment: Segment,
    pub is_new_user: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub status: DecisionStatus,
    pub risk_band: RiskBand,
    pub loan_offer: u32,
    pub message: String,
    pub base_offer: u32,
    pub consent_bonus: u32,
    pub loan_to_income_ratio: f64,
    pub no_history_manual_flag: bool,
    pub meets_low_risk_automatic: bool,
    pub qualifies_high_confidence: bool,
}

/// Stateless mapping from band, ratios and flags to status and offer.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: DecisionConfig,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    pub fn decide(&self, inputs: &DecisionInputs) -> Decision {
        let band = if inputs.final_sci < self.config.reject_below {
            RiskBand::Reject
        } else {
            inputs.classified_band
        };

        let base_offer = self.config.offers.base_offer(band);
        let consent_bonus = self.consent_bonus(inputs);
        // A rejected application is never offered the bonuses.
        let loan_offer = if band == RiskBand::Reject {
            0
        } else {
            base_offer.saturating_add(consent_bonus)
        };

        let loan_to_income = inputs.loan_amount / inputs.declared_income.max(1.0);
        let no_history_manual_flag =
            inputs.segment == Segment::HighIncomeRepaymentFocused && inputs.is_new_user;

        let signals = DecisionSignals {
            band,
            final_sci: inputs.final_sci,
            ml_probability: inputs.ml_probability,
            composite_score: inputs.composite_score,
            loan_to_income,
            no_history_manual_flag,
        };
        let rules = &self.config.approval;
        let (status, message) = resolve_status(&signals, rules, loan_offer);

        Decision {
            status,
            risk_band: band,
            loan_offer,
            message,
            base_offer,
            consent_bonus,
            loan_to_income_ratio: round_to(loan_to_income, 3),
            no_history_manual_flag,
            meets_low_risk_automatic: signals.meets_low_risk_automatic(rules),
            qualifies_high_confidence: signals.qualifies_high_confidence(rules),
        }
    }

    fn consent_bonus(&self, inputs: &DecisionInputs) -> u32 {
        let bonuses = &self.config.bonuses;
        [
            (inputs.consent_recharge, bonuses.recharge),
            (inputs.consent_electricity, bonuses.electricity),
            (inputs.education_consented, bonuses.education),
        ]
        .into_iter()
        .filter(|(granted, _)| *granted)
        .fold(0u32, |total, (_, bonus)| total.saturating_add(bonus))
    }
}

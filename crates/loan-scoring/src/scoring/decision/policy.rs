use serde::{Deserialize, Serialize};

use super::super::risk::RiskBand;
use super::config::ApprovalRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Approved,
    Rejected,
    ManualReview,
}

impl DecisionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionStatus::Approved => "approved",
            DecisionStatus::Rejected => "rejected",
            DecisionStatus::ManualReview => "manual_review",
        }
    }
}

pub(crate) struct DecisionSignals {
    pub band: RiskBand,
    pub final_sci: f64,
    pub ml_probability: f64,
    pub composite_score: f64,
    pub loan_to_income: f64,
    pub no_history_manual_flag: bool,
}

impl DecisionSignals {
    pub(crate) fn meets_low_risk_automatic(&self, rules: &ApprovalRules) -> bool {
        self.band == RiskBand::Low
            && !self.no_history_manual_flag
            && (self.final_sci >= rules.strong_sci
                || (self.final_sci >= rules.good_sci
                    && self.loan_to_income <= rules.good_sci_max_ratio)
                || (self.loan_to_income <= rules.confident_max_ratio
                    && self.ml_probability >= rules.confident_ml_probability))
    }

    pub(crate) fn qualifies_high_confidence(&self, rules: &ApprovalRules) -> bool {
        self.ml_probability >= rules.high_confidence_ml
            && self.composite_score >= rules.high_confidence_composite
            && self.loan_to_income <= rules.high_confidence_max_ratio
            && !self.no_history_manual_flag
    }
}

/// First match wins: rejection, forced manual review, approval, manual review.
pub(crate) fn resolve_status(
    signals: &DecisionSignals,
    rules: &ApprovalRules,
    loan_offer: u32,
) -> (DecisionStatus, String) {
    if signals.band == RiskBand::Reject {
        return (
            DecisionStatus::Rejected,
            "Unfortunately, your application does not meet our current lending criteria."
                .to_string(),
        );
    }

    let amount = format_rupees(loan_offer);
    if signals.no_history_manual_flag {
        return (
            DecisionStatus::ManualReview,
            format!(
                "Your application requires manual review. As a high-income applicant without \
                 sufficient repayment history, our team will carefully assess your \
                 creditworthiness. You may be eligible for a loan up to {amount}."
            ),
        );
    }

    if signals.meets_low_risk_automatic(rules) {
        return (
            DecisionStatus::Approved,
            format!(
                "Congratulations! Your responsible borrowing behaviour qualifies you for the \
                 full loan offer of {amount}."
            ),
        );
    }

    (
        DecisionStatus::ManualReview,
        format!("Your application is under review. You may be eligible for a loan up to {amount}."),
    )
}

/// `12000` becomes `₹12,000`.
pub fn format_rupees(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("₹{grouped}")
}

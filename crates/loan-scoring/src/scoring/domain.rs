use serde::{Deserialize, Serialize};

use super::lenient;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

/// Applicant submission as received from intake. Created per request and never persisted here.
///
/// Every numeric field is optional; the two required ones (`declared_income`,
/// `loan_amount`) are enforced by the intake guard rather than by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationInput {
    pub application_id: Option<ApplicationId>,
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub age: Option<u32>,
    #[serde(deserialize_with = "lenient::flag")]
    pub has_children: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_socially_disadvantaged: bool,
    #[serde(deserialize_with = "lenient::count")]
    pub dependents: Option<u32>,

    /// Monthly income declared by the applicant.
    #[serde(deserialize_with = "lenient::amount")]
    pub declared_income: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub loan_amount: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub tenure_months: Option<u32>,
    pub purpose: Option<String>,
    /// Outstanding principal on other loans.
    #[serde(deserialize_with = "lenient::amount")]
    pub existing_loan_amt: Option<f64>,

    #[serde(deserialize_with = "lenient::flag")]
    pub consent_recharge: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub consent_electricity: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub consent_education: bool,
    #[serde(alias = "consent_bank_statement", deserialize_with = "lenient::flag")]
    pub consent_bank: bool,

    #[serde(deserialize_with = "lenient::block")]
    pub bank_statement: Option<BankStatement>,
    #[serde(deserialize_with = "lenient::block")]
    pub recharge_history: Option<RechargeHistory>,
    #[serde(deserialize_with = "lenient::block")]
    pub electricity_bills: Option<ElectricityBills>,
    #[serde(deserialize_with = "lenient::block")]
    pub education_fees: Option<EducationFees>,
    #[serde(deserialize_with = "lenient::block")]
    pub repayment_history: Option<RepaymentHistory>,
}

impl ApplicationInput {
    pub fn has_dependents(&self) -> bool {
        self.has_children || self.dependents.unwrap_or(0) > 0
    }

    /// Education data only counts for applicants who have dependents.
    pub fn education_consented(&self) -> bool {
        self.consent_education && self.has_dependents()
    }
}

/// Bank statement summary over the last three to six months.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankStatement {
    #[serde(deserialize_with = "lenient::amount")]
    pub monthly_credits: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub avg_balance: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_credits: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_debits: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub salary_count: Option<u32>,
    /// Standard deviation of monthly salary credits.
    #[serde(deserialize_with = "lenient::amount")]
    pub salary_std: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub bounce_count: Option<u32>,
}

/// Mobile recharge behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RechargeHistory {
    #[serde(deserialize_with = "lenient::amount")]
    pub total_amount: Option<f64>,
    /// Recharges per month.
    #[serde(deserialize_with = "lenient::amount")]
    pub frequency: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub avg_amount: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub consistency: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub recharge_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricityBills {
    #[serde(deserialize_with = "lenient::amount")]
    pub total_paid: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub frequency: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub avg_payment: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub consistency: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub ontime_ratio: Option<f64>,
}

/// Fee payments for the applicant's children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationFees {
    #[serde(deserialize_with = "lenient::amount")]
    pub total_paid: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub frequency: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub avg_fee: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub consistency: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub ontime_ratio: Option<f64>,
}

/// Prior loan repayment behavior. Explicit ratios win over ones derived from counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepaymentHistory {
    #[serde(deserialize_with = "lenient::count")]
    pub ontime_count: Option<u32>,
    #[serde(deserialize_with = "lenient::count")]
    pub late_count: Option<u32>,
    #[serde(deserialize_with = "lenient::count")]
    pub missed_count: Option<u32>,
    #[serde(deserialize_with = "lenient::amount")]
    pub avg_repayment_ratio: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub on_time_ratio: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub avg_payment_delay_days: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub previous_loans_count: Option<u32>,
    #[serde(deserialize_with = "lenient::count")]
    pub previous_defaults: Option<u32>,
    /// Months since the last loan closed.
    #[serde(deserialize_with = "lenient::amount")]
    pub time_since_last_loan: Option<f64>,
}

impl RepaymentHistory {
    pub fn recorded_repayments(&self) -> u32 {
        self.ontime_count
            .unwrap_or(0)
            .saturating_add(self.late_count.unwrap_or(0))
            .saturating_add(self.missed_count.unwrap_or(0))
    }

    /// Any repayment outcome was reported, either as counts or as summary figures.
    pub fn has_measured_repayments(&self) -> bool {
        self.recorded_repayments() > 0
            || self.on_time_ratio.is_some()
            || self.avg_payment_delay_days.is_some()
            || self.previous_defaults.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_optional_fields_decode_as_absent() {
        let input: ApplicationInput = serde_json::from_value(json!({
            "declared_income": "12,000",
            "loan_amount": 5000,
            "existing_loan_amt": "not a number",
            "has_children": 1,
            "consent_recharge": "yes",
            "recharge_history": "garbled",
            "electricity_bills": { "consistency": [1, 2], "avg_payment": 900 }
        }))
        .expect("lenient decode");

        assert_eq!(input.declared_income, Some(12_000.0));
        assert_eq!(input.existing_loan_amt, None);
        assert!(input.has_children);
        assert!(input.consent_recharge);
        assert!(input.recharge_history.is_none());
        let bills = input.electricity_bills.expect("bills block kept");
        assert_eq!(bills.consistency, None);
        assert_eq!(bills.avg_payment, Some(900.0));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let input: ApplicationInput = serde_json::from_value(json!({
            "declared_income": 9000,
            "loan_amount": 2000,
            "favourite_colour": "teal"
        }))
        .expect("extra fields ignored");
        assert_eq!(input.loan_amount, Some(2_000.0));
    }

    #[test]
    fn intake_bank_consent_name_is_accepted() {
        let input: ApplicationInput = serde_json::from_value(json!({
            "declared_income": 20000,
            "loan_amount": 5000,
            "consent_bank_statement": true
        }))
        .expect("intake field name decodes");
        assert!(input.consent_bank);
    }

    #[test]
    fn summary_figures_count_as_repayment_history() {
        let summary = RepaymentHistory {
            on_time_ratio: Some(1.0),
            previous_defaults: Some(0),
            ..RepaymentHistory::default()
        };
        assert_eq!(summary.recorded_repayments(), 0);
        assert!(summary.has_measured_repayments());

        let unrelated = RepaymentHistory {
            avg_repayment_ratio: Some(0.9),
            ..RepaymentHistory::default()
        };
        assert!(!unrelated.has_measured_repayments());
    }

    #[test]
    fn dependents_count_enables_education() {
        let input = ApplicationInput {
            consent_education: true,
            dependents: Some(2),
            ..ApplicationInput::default()
        };
        assert!(input.education_consented());

        let input = ApplicationInput {
            consent_education: true,
            ..ApplicationInput::default()
        };
        assert!(!input.education_consented());
    }
}

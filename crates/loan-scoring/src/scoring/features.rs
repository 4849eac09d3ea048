//! Canonical feature contract shared by extraction, pillar scoring and the oracle.
//!
//! [`FeatureKind`] is the single schema. Model artifacts name their inputs with
//! [`FeatureKind::as_str`] and are rejected at load time when a name is unknown
//! or their schema version differs from [`FEATURE_SCHEMA_VERSION`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationInput, RepaymentHistory};
use super::numeric::{clamp01, non_negative, ratio_or, round_to};
use super::validation::{IntakeGuard, LoanTerms};
use crate::error::ScoringError;

pub const FEATURE_SCHEMA_VERSION: &str = "features.v1";

/// Income below which lifestyle spending raises suspicion.
pub const LOW_INCOME_CUTOFF: f64 = 15_000.0;

const NEUTRAL_RATIO: f64 = 0.5;
const NO_PRIOR_LOAN_MONTHS: f64 = 999.0;
const RECHARGE_SPEND_CAP: f64 = 1_000.0;
const ELECTRICITY_PAYMENT_CAP: f64 = 2_000.0;
const EDUCATION_FEE_CAP: f64 = 3_000.0;
const SUSPICION_INCOME_FLOOR: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    DeclaredIncome,
    LoanAmount,
    TenureMonths,
    Age,
    HasChildren,
    Dependents,
    SocioFlag,
    ExistingLoanAmt,
    MonthlyCredits,
    AvgBalance,
    TotalCredits,
    TotalDebits,
    SalaryCount,
    SalaryStd,
    BankBounceCount,
    HasBankData,
    RechargeTotalAmount,
    RechargeFrequency,
    RechargeAvgAmount,
    RechargeConsistency,
    RechargeCount,
    ElectricityTotalPaid,
    ElectricityPaymentFrequency,
    ElectricityAvgPayment,
    ElectricityConsistency,
    ElectricityOntimeRatio,
    EducationTotalFeesPaid,
    EducationPaymentFrequency,
    EducationAvgFee,
    EduFeeConsistency,
    EduOnTimePaymentRatio,
    RepayOntimeCount,
    RepayLateCount,
    RepayMissedCount,
    PreviousLoansCount,
    PreviousDefaults,
    OnTimeRatio,
    AvgPaymentDelayDays,
    AvgPrevRepaymentRatio,
    TimeSinceLastLoan,
    MonthlyEmi,
    DebtToIncomeRatio,
    AvgMonthlySaving,
    LifestyleIndex,
    SuspicionScore,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 45] = [
        FeatureKind::DeclaredIncome,
        FeatureKind::LoanAmount,
        FeatureKind::TenureMonths,
        FeatureKind::Age,
        FeatureKind::HasChildren,
        FeatureKind::Dependents,
        FeatureKind::SocioFlag,
        FeatureKind::ExistingLoanAmt,
        FeatureKind::MonthlyCredits,
        FeatureKind::AvgBalance,
        FeatureKind::TotalCredits,
        FeatureKind::TotalDebits,
        FeatureKind::SalaryCount,
        FeatureKind::SalaryStd,
        FeatureKind::BankBounceCount,
        FeatureKind::HasBankData,
        FeatureKind::RechargeTotalAmount,
        FeatureKind::RechargeFrequency,
        FeatureKind::RechargeAvgAmount,
        FeatureKind::RechargeConsistency,
        FeatureKind::RechargeCount,
        FeatureKind::ElectricityTotalPaid,
        FeatureKind::ElectricityPaymentFrequency,
        FeatureKind::ElectricityAvgPayment,
        FeatureKind::ElectricityConsistency,
        FeatureKind::ElectricityOntimeRatio,
        FeatureKind::EducationTotalFeesPaid,
        FeatureKind::EducationPaymentFrequency,
        FeatureKind::EducationAvgFee,
        FeatureKind::EduFeeConsistency,
        FeatureKind::EduOnTimePaymentRatio,
        FeatureKind::RepayOntimeCount,
        FeatureKind::RepayLateCount,
        FeatureKind::RepayMissedCount,
        FeatureKind::PreviousLoansCount,
        FeatureKind::PreviousDefaults,
        FeatureKind::OnTimeRatio,
        FeatureKind::AvgPaymentDelayDays,
        FeatureKind::AvgPrevRepaymentRatio,
        FeatureKind::TimeSinceLastLoan,
        FeatureKind::MonthlyEmi,
        FeatureKind::DebtToIncomeRatio,
        FeatureKind::AvgMonthlySaving,
        FeatureKind::LifestyleIndex,
        FeatureKind::SuspicionScore,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            FeatureKind::DeclaredIncome => "declared_income",
            FeatureKind::LoanAmount => "loan_amount",
            FeatureKind::TenureMonths => "tenure_months",
            FeatureKind::Age => "age",
            FeatureKind::HasChildren => "has_children",
            FeatureKind::Dependents => "dependents",
            FeatureKind::SocioFlag => "socio_flag",
            FeatureKind::ExistingLoanAmt => "existing_loan_amt",
            FeatureKind::MonthlyCredits => "monthly_credits",
            FeatureKind::AvgBalance => "avg_balance",
            FeatureKind::TotalCredits => "total_credits",
            FeatureKind::TotalDebits => "total_debits",
            FeatureKind::SalaryCount => "salary_count",
            FeatureKind::SalaryStd => "salary_std",
            FeatureKind::BankBounceCount => "bank_bounce_count",
            FeatureKind::HasBankData => "has_bank_data",
            FeatureKind::RechargeTotalAmount => "recharge_total_amount",
            FeatureKind::RechargeFrequency => "recharge_frequency",
            FeatureKind::RechargeAvgAmount => "recharge_avg_amount",
            FeatureKind::RechargeConsistency => "recharge_consistency",
            FeatureKind::RechargeCount => "recharge_count",
            FeatureKind::ElectricityTotalPaid => "electricity_total_paid",
            FeatureKind::ElectricityPaymentFrequency => "electricity_payment_frequency",
            FeatureKind::ElectricityAvgPayment => "electricity_avg_payment",
            FeatureKind::ElectricityConsistency => "electricity_consistency",
            FeatureKind::ElectricityOntimeRatio => "electricity_ontime_ratio",
            FeatureKind::EducationTotalFeesPaid => "education_total_fees_paid",
            FeatureKind::EducationPaymentFrequency => "education_payment_frequency",
            FeatureKind::EducationAvgFee => "education_avg_fee",
            FeatureKind::EduFeeConsistency => "edu_fee_consistency",
            FeatureKind::EduOnTimePaymentRatio => "edu_on_time_payment_ratio",
            FeatureKind::RepayOntimeCount => "repay_ontime_count",
            FeatureKind::RepayLateCount => "repay_late_count",
            FeatureKind::RepayMissedCount => "repay_missed_count",
            FeatureKind::PreviousLoansCount => "previous_loans_count",
            FeatureKind::PreviousDefaults => "previous_defaults",
            FeatureKind::OnTimeRatio => "on_time_ratio",
            FeatureKind::AvgPaymentDelayDays => "avg_payment_delay_days",
            FeatureKind::AvgPrevRepaymentRatio => "avg_prev_repayment_ratio",
            FeatureKind::TimeSinceLastLoan => "time_since_last_loan",
            FeatureKind::MonthlyEmi => "monthly_emi",
            FeatureKind::DebtToIncomeRatio => "debt_to_income_ratio",
            FeatureKind::AvgMonthlySaving => "avg_monthly_saving",
            FeatureKind::LifestyleIndex => "lifestyle_index",
            FeatureKind::SuspicionScore => "suspicion_score",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Complete, finite feature map. Only [`extract_features`] and
/// [`FeatureVector::try_from_map`] can build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: BTreeMap<FeatureKind, f64>,
}

impl FeatureVector {
    pub fn try_from_map(values: BTreeMap<FeatureKind, f64>) -> Result<Self, ScoringError> {
        if let Some(missing) = FeatureKind::ALL
            .into_iter()
            .find(|kind| !values.contains_key(kind))
        {
            return Err(ScoringError::InvariantViolation(format!(
                "feature {} missing from vector",
                missing.as_str()
            )));
        }
        if let Some((kind, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ScoringError::InvariantViolation(format!(
                "feature {} is not finite ({value})",
                kind.as_str()
            )));
        }
        Ok(Self { values })
    }

    pub fn get(&self, kind: FeatureKind) -> f64 {
        self.values.get(&kind).copied().unwrap_or_default()
    }

    pub fn flag(&self, kind: FeatureKind) -> bool {
        self.get(kind) > 0.0
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKind, f64)> + '_ {
        self.values.iter().map(|(kind, value)| (*kind, *value))
    }
}

/// Validated terms together with the canonical features derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedApplication {
    pub terms: LoanTerms,
    pub features: FeatureVector,
}

/// Validate the submission and derive every canonical feature.
///
/// Proxy blocks are honored only with their consent flag (education additionally
/// requires dependents). Withheld or absent data takes neutral defaults: zero
/// volume and 0.5 for consistency and on-time ratios.
pub fn extract_features(
    input: &ApplicationInput,
    guard: &IntakeGuard,
) -> Result<ExtractedApplication, ScoringError> {
    let terms = guard.check(input)?;
    let mut values = BTreeMap::new();
    let mut set = |kind: FeatureKind, value: f64| {
        values.insert(kind, value);
    };

    let has_dependents = input.has_dependents();
    set(FeatureKind::DeclaredIncome, terms.declared_income);
    set(FeatureKind::LoanAmount, terms.loan_amount);
    set(FeatureKind::TenureMonths, f64::from(terms.tenure_months));
    set(FeatureKind::Age, f64::from(input.age.unwrap_or(0)));
    set(FeatureKind::HasChildren, indicator(has_dependents));
    set(FeatureKind::Dependents, f64::from(input.dependents.unwrap_or(0)));
    set(FeatureKind::SocioFlag, indicator(input.is_socially_disadvantaged));
    let existing_loan = amount(input.existing_loan_amt);
    set(FeatureKind::ExistingLoanAmt, existing_loan);

    let bank = input
        .bank_statement
        .as_ref()
        .filter(|_| input.consent_bank);
    let monthly_credits = amount(bank.and_then(|b| b.monthly_credits));
    let avg_balance = amount(bank.and_then(|b| b.avg_balance));
    let has_bank_data = monthly_credits > 0.0 && avg_balance > 0.0;
    set(FeatureKind::MonthlyCredits, monthly_credits);
    set(FeatureKind::AvgBalance, avg_balance);
    set(FeatureKind::TotalCredits, amount(bank.and_then(|b| b.total_credits)));
    set(FeatureKind::TotalDebits, amount(bank.and_then(|b| b.total_debits)));
    set(FeatureKind::SalaryCount, count(bank.and_then(|b| b.salary_count)));
    set(FeatureKind::SalaryStd, amount(bank.and_then(|b| b.salary_std)));
    set(FeatureKind::BankBounceCount, count(bank.and_then(|b| b.bounce_count)));
    set(FeatureKind::HasBankData, indicator(has_bank_data));

    let recharge = input
        .recharge_history
        .as_ref()
        .filter(|_| input.consent_recharge);
    let recharge_avg = amount(recharge.and_then(|r| r.avg_amount));
    let recharge_count = count(recharge.and_then(|r| r.recharge_count));
    set(FeatureKind::RechargeTotalAmount, amount(recharge.and_then(|r| r.total_amount)));
    set(FeatureKind::RechargeFrequency, amount(recharge.and_then(|r| r.frequency)));
    set(FeatureKind::RechargeAvgAmount, recharge_avg);
    set(FeatureKind::RechargeConsistency, neutral_ratio(recharge.and_then(|r| r.consistency)));
    set(FeatureKind::RechargeCount, recharge_count);

    let electricity = input
        .electricity_bills
        .as_ref()
        .filter(|_| input.consent_electricity);
    let electricity_avg = amount(electricity.and_then(|e| e.avg_payment));
    set(FeatureKind::ElectricityTotalPaid, amount(electricity.and_then(|e| e.total_paid)));
    set(
        FeatureKind::ElectricityPaymentFrequency,
        amount(electricity.and_then(|e| e.frequency)),
    );
    set(FeatureKind::ElectricityAvgPayment, electricity_avg);
    set(
        FeatureKind::ElectricityConsistency,
        neutral_ratio(electricity.and_then(|e| e.consistency)),
    );
    set(
        FeatureKind::ElectricityOntimeRatio,
        neutral_ratio(electricity.and_then(|e| e.ontime_ratio)),
    );

    let education = input
        .education_fees
        .as_ref()
        .filter(|_| input.education_consented());
    let education_avg = amount(education.and_then(|e| e.avg_fee));
    set(FeatureKind::EducationTotalFeesPaid, amount(education.and_then(|e| e.total_paid)));
    set(
        FeatureKind::EducationPaymentFrequency,
        amount(education.and_then(|e| e.frequency)),
    );
    set(FeatureKind::EducationAvgFee, education_avg);
    set(FeatureKind::EduFeeConsistency, neutral_ratio(education.and_then(|e| e.consistency)));
    set(
        FeatureKind::EduOnTimePaymentRatio,
        neutral_ratio(education.and_then(|e| e.ontime_ratio)),
    );

    let repayment = RepaymentSignals::from_history(input.repayment_history.as_ref());
    set(FeatureKind::RepayOntimeCount, repayment.ontime_count);
    set(FeatureKind::RepayLateCount, repayment.late_count);
    set(FeatureKind::RepayMissedCount, repayment.missed_count);
    set(FeatureKind::PreviousLoansCount, repayment.previous_loans);
    set(FeatureKind::PreviousDefaults, repayment.previous_defaults);
    set(FeatureKind::OnTimeRatio, repayment.on_time_ratio);
    set(FeatureKind::AvgPaymentDelayDays, repayment.avg_delay_days);
    set(FeatureKind::AvgPrevRepaymentRatio, repayment.avg_repayment_ratio);
    set(FeatureKind::TimeSinceLastLoan, repayment.months_since_last_loan);

    let effective_income = if has_bank_data {
        monthly_credits
    } else {
        terms.declared_income
    };
    if effective_income <= 0.0 {
        return Err(ScoringError::InvariantViolation(format!(
            "effective monthly income {effective_income} is not positive after coercion"
        )));
    }

    let existing_monthly = existing_loan / 12.0;
    let emi = terms.monthly_installment();
    set(FeatureKind::MonthlyEmi, round_to(emi, 2));
    set(
        FeatureKind::DebtToIncomeRatio,
        (existing_monthly + emi) / effective_income.max(1.0),
    );
    set(
        FeatureKind::AvgMonthlySaving,
        effective_income - existing_monthly - emi,
    );

    let lifestyle = lifestyle_index(recharge_avg * recharge_count, electricity_avg, education_avg);
    set(FeatureKind::LifestyleIndex, lifestyle);
    set(
        FeatureKind::SuspicionScore,
        suspicion_score(lifestyle, terms.declared_income),
    );

    let features = FeatureVector::try_from_map(values)?;
    Ok(ExtractedApplication { terms, features })
}

/// Weighted blend of capped recharge, electricity and education spending.
pub fn lifestyle_index(recharge_spend: f64, electricity_payment: f64, education_fee: f64) -> f64 {
    let recharge_signal = (recharge_spend / RECHARGE_SPEND_CAP).min(1.0);
    let electricity_signal = (electricity_payment / ELECTRICITY_PAYMENT_CAP).min(1.0);
    let education_signal = (education_fee / EDUCATION_FEE_CAP).min(1.0);
    round_to(
        0.3 * recharge_signal + 0.4 * electricity_signal + 0.3 * education_signal,
        3,
    )
}

/// Lifestyle spending out of proportion to declared income.
pub fn suspicion_score(lifestyle_index: f64, declared_income: f64) -> f64 {
    if declared_income < LOW_INCOME_CUTOFF {
        let scale = LOW_INCOME_CUTOFF / declared_income.max(SUSPICION_INCOME_FLOOR);
        round_to((lifestyle_index * scale).min(1.0), 3)
    } else {
        round_to(lifestyle_index * 0.5, 3)
    }
}

struct RepaymentSignals {
    ontime_count: f64,
    late_count: f64,
    missed_count: f64,
    previous_loans: f64,
    previous_defaults: f64,
    on_time_ratio: f64,
    avg_delay_days: f64,
    avg_repayment_ratio: f64,
    months_since_last_loan: f64,
}

impl RepaymentSignals {
    fn from_history(history: Option<&RepaymentHistory>) -> Self {
        let Some(history) = history else {
            return Self {
                ontime_count: 0.0,
                late_count: 0.0,
                missed_count: 0.0,
                previous_loans: 0.0,
                previous_defaults: 0.0,
                on_time_ratio: NEUTRAL_RATIO,
                avg_delay_days: 0.0,
                avg_repayment_ratio: NEUTRAL_RATIO,
                months_since_last_loan: NO_PRIOR_LOAN_MONTHS,
            };
        };

        let recorded = history.recorded_repayments();
        let ontime = history.ontime_count.unwrap_or(0);
        let previous_loans = history
            .previous_loans_count
            .unwrap_or(u32::from(history.has_measured_repayments()));
        let derived_on_time = ratio_or(f64::from(ontime), f64::from(recorded), NEUTRAL_RATIO);

        Self {
            ontime_count: f64::from(ontime),
            late_count: count(history.late_count),
            missed_count: count(history.missed_count),
            previous_loans: f64::from(previous_loans),
            previous_defaults: f64::from(
                history
                    .previous_defaults
                    .unwrap_or_else(|| history.missed_count.unwrap_or(0)),
            ),
            on_time_ratio: history
                .on_time_ratio
                .map(clamp01)
                .unwrap_or(derived_on_time),
            avg_delay_days: amount(history.avg_payment_delay_days),
            avg_repayment_ratio: neutral_ratio(history.avg_repayment_ratio),
            months_since_last_loan: history
                .time_since_last_loan
                .map(non_negative)
                .unwrap_or(NO_PRIOR_LOAN_MONTHS),
        }
    }
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

fn amount(value: Option<f64>) -> f64 {
    value.map(non_negative).unwrap_or(0.0)
}

fn count(value: Option<u32>) -> f64 {
    f64::from(value.unwrap_or(0))
}

fn neutral_ratio(value: Option<f64>) -> f64 {
    value
        .filter(|ratio| ratio.is_finite())
        .map(clamp01)
        .unwrap_or(NEUTRAL_RATIO)
}

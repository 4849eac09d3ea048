use serde::{Deserialize, Serialize};

use super::features::{FeatureKind, FeatureVector};
use super::numeric::{clamp01, round_to};

/// Normalisation caps for the raw behavioral signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalCaps {
    pub income: f64,
    pub salary_std: f64,
    pub balance: f64,
    pub delay_days: f64,
    pub recharge_per_month: f64,
}

impl Default for SignalCaps {
    fn default() -> Self {
        Self {
            income: 40_000.0,
            salary_std: 20_000.0,
            balance: 50_000.0,
            delay_days: 30.0,
            recharge_per_month: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Financial,
    Repayment,
    Consumption,
    History,
}

impl Pillar {
    pub const ALL: [Pillar; 4] = [
        Pillar::Financial,
        Pillar::Repayment,
        Pillar::Consumption,
        Pillar::History,
    ];
}

/// Weight per pillar. Segment weight sets always sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PillarWeights {
    pub financial: f64,
    pub repayment: f64,
    pub consumption: f64,
    pub history: f64,
}

impl PillarWeights {
    pub fn get(&self, pillar: Pillar) -> f64 {
        match pillar {
            Pillar::Financial => self.financial,
            Pillar::Repayment => self.repayment,
            Pillar::Consumption => self.consumption,
            Pillar::History => self.history,
        }
    }

    pub fn total(&self) -> f64 {
        Pillar::ALL.iter().map(|pillar| self.get(*pillar)).sum()
    }
}

/// Applicant category that selects the weighting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    NewUserNoBankData,
    LowIncomeAlternativeProxies,
    HighIncomeRepaymentFocused,
}

impl Segment {
    pub fn classify(has_bank_data: bool, income: f64, barrier: f64) -> Self {
        if !has_bank_data {
            Segment::NewUserNoBankData
        } else if income < barrier {
            Segment::LowIncomeAlternativeProxies
        } else {
            Segment::HighIncomeRepaymentFocused
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Segment::NewUserNoBankData => "new_user_no_bank_data",
            Segment::LowIncomeAlternativeProxies => "low_income_alternative_proxies",
            Segment::HighIncomeRepaymentFocused => "high_income_repayment_focused",
        }
    }

    pub fn weights(self) -> PillarWeights {
        match self {
            Segment::NewUserNoBankData => PillarWeights {
                financial: 0.15,
                repayment: 0.10,
                consumption: 0.50,
                history: 0.25,
            },
            Segment::LowIncomeAlternativeProxies => PillarWeights {
                financial: 0.20,
                repayment: 0.20,
                consumption: 0.45,
                history: 0.15,
            },
            Segment::HighIncomeRepaymentFocused => PillarWeights {
                financial: 0.35,
                repayment: 0.50,
                consumption: 0.05,
                history: 0.10,
            },
        }
    }

    /// Fraud penalty and fair-lending bonus for a loan-to-income ratio.
    pub fn adjustments(self, loan_to_income: f64) -> Adjustments {
        match self {
            Segment::NewUserNoBankData if loan_to_income > 0.5 => Adjustments {
                fraud_penalty: 0.20,
                fair_lending_bonus: 0.0,
            },
            Segment::LowIncomeAlternativeProxies if loan_to_income < 0.3 => Adjustments {
                fraud_penalty: 0.0,
                fair_lending_bonus: 0.05,
            },
            Segment::HighIncomeRepaymentFocused if loan_to_income > 1.0 => Adjustments {
                fraud_penalty: 0.15,
                fair_lending_bonus: 0.0,
            },
            _ => Adjustments::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Adjustments {
    /// Multiplicative reduction of the blended score.
    pub fraud_penalty: f64,
    /// Additive increase, applied after the penalty.
    pub fair_lending_bonus: f64,
}

/// Pillar sub-scores in [0, 1]. `None` marks a pillar that could not be measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PillarScores {
    pub financial: Option<f64>,
    pub repayment: Option<f64>,
    pub consumption: Option<f64>,
    pub history: Option<f64>,
}

impl PillarScores {
    pub fn get(&self, pillar: Pillar) -> Option<f64> {
        match pillar {
            Pillar::Financial => self.financial,
            Pillar::Repayment => self.repayment,
            Pillar::Consumption => self.consumption,
            Pillar::History => self.history,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PillarComponents {
    pub income_score: f64,
    pub stability_score: f64,
    pub balance_score: f64,
    pub loan_to_income_score: f64,
    pub ontime_score: f64,
    pub delay_score: f64,
    pub elec_consistency_score: f64,
    pub recharge_score: f64,
    pub edu_consistency: f64,
    pub edu_ontime: f64,
    pub education_score: f64,
    pub history_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarBreakdown {
    pub scores: PillarScores,
    pub segment: Segment,
    pub weights: PillarWeights,
    pub has_bank_data: bool,
    pub is_new_user: bool,
    pub effective_income: f64,
    pub income_barrier: f64,
    pub loan_to_income_ratio: f64,
    #[serde(flatten)]
    pub adjustments: Adjustments,
    pub components: PillarComponents,
}

/// Tiered adequacy of the requested amount relative to monthly income.
pub fn loan_to_income_adequacy(ratio: f64) -> f64 {
    if ratio <= 0.3 {
        1.0
    } else if ratio <= 0.5 {
        0.8
    } else if ratio <= 0.8 {
        0.5
    } else if ratio <= 1.0 {
        0.3
    } else {
        0.1
    }
}

pub fn score_pillars(features: &FeatureVector, barrier: f64) -> PillarBreakdown {
    score_pillars_with_caps(features, barrier, &SignalCaps::default())
}

pub fn score_pillars_with_caps(
    features: &FeatureVector,
    barrier: f64,
    caps: &SignalCaps,
) -> PillarBreakdown {
    let has_bank_data = features.flag(FeatureKind::HasBankData);
    let effective_income = if has_bank_data {
        features.get(FeatureKind::MonthlyCredits)
    } else {
        features.get(FeatureKind::DeclaredIncome)
    };
    let loan_to_income_ratio = if effective_income > 0.0 {
        features.get(FeatureKind::LoanAmount) / effective_income
    } else {
        0.0
    };

    let segment = Segment::classify(has_bank_data, effective_income, barrier);
    let weights = segment.weights();
    let adjustments = segment.adjustments(loan_to_income_ratio);

    // Declared income stands in for monthly credits when there is no usable bank data.
    let income_score = clamp01(effective_income / caps.income);
    let stability_score = 1.0 - clamp01(features.get(FeatureKind::SalaryStd) / caps.salary_std);
    let balance_score = clamp01(features.get(FeatureKind::AvgBalance) / caps.balance);
    let loan_to_income_score = loan_to_income_adequacy(loan_to_income_ratio);
    let financial = 0.7 * (0.5 * income_score + 0.3 * stability_score + 0.2 * balance_score)
        + 0.3 * loan_to_income_score;

    let is_new_user = features.get(FeatureKind::PreviousLoansCount) <= 0.0;
    let (ontime_score, delay_score) = if is_new_user {
        (0.5, 0.5)
    } else {
        (
            clamp01(features.get(FeatureKind::OnTimeRatio)),
            1.0 - clamp01(features.get(FeatureKind::AvgPaymentDelayDays) / caps.delay_days),
        )
    };
    let repayment = 0.5 * ontime_score + 0.5 * delay_score;

    let elec_consistency_score = clamp01(features.get(FeatureKind::ElectricityConsistency));
    let recharge_score =
        clamp01(features.get(FeatureKind::RechargeFrequency) / caps.recharge_per_month);
    let (edu_consistency, edu_ontime) = if features.flag(FeatureKind::HasChildren) {
        (
            clamp01(features.get(FeatureKind::EduFeeConsistency)),
            clamp01(features.get(FeatureKind::EduOnTimePaymentRatio)),
        )
    } else {
        (0.5, 0.5)
    };
    let education_score = 0.6 * edu_consistency + 0.4 * edu_ontime;
    let consumption = 0.4 * elec_consistency_score + 0.3 * recharge_score + 0.3 * education_score;

    let history_score = clamp01(features.get(FeatureKind::AvgPrevRepaymentRatio));

    PillarBreakdown {
        scores: PillarScores {
            financial: Some(clamp01(financial)),
            repayment: Some(clamp01(repayment)),
            consumption: Some(clamp01(consumption)),
            history: Some(history_score),
        },
        segment,
        weights,
        has_bank_data,
        is_new_user,
        effective_income,
        income_barrier: barrier,
        loan_to_income_ratio: round_to(loan_to_income_ratio, 3),
        adjustments,
        components: PillarComponents {
            income_score,
            stability_score,
            balance_score,
            loan_to_income_score,
            ontime_score,
            delay_score,
            elec_consistency_score,
            recharge_score,
            edu_consistency,
            edu_ontime,
            education_score,
            history_score,
        },
    }
}

use serde::Serialize;
use tracing::{debug, error, warn};

use super::composite::{aggregate, CompositeScore};
use super::context::{BarrierConfig, ScoringContext};
use super::decision::{DecisionInputs, DecisionStatus};
use super::domain::{ApplicationId, ApplicationInput};
use super::features::{extract_features, FeatureVector, FEATURE_SCHEMA_VERSION};
use super::fusion::{fuse, FusionResult};
use super::numeric::round_to;
use super::oracle::{checked_probability, OracleDescriptor};
use super::pillars::{score_pillars, Pillar};
use super::risk::{classify_risk, NeedLabel, RiskBand};
use super::validation::LoanTerms;
use crate::error::ScoringError;

/// Outcome of one evaluation. Identical input and context give an identical result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    pub status: DecisionStatus,
    pub risk_band: RiskBand,
    pub need_label: NeedLabel,
    pub loan_offer: u32,
    pub ml_probability: f64,
    pub composite_score: f64,
    pub final_sci: f64,
    pub message: String,
    pub breakdown: DecisionBreakdown,
}

/// Every intermediate value behind a decision, for audit and manual review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionBreakdown {
    pub feature_schema_version: String,
    pub features_extracted: usize,
    pub features: FeatureVector,
    pub terms: LoanTerms,
    pub oracle: OracleDescriptor,
    pub barrier: BarrierConfig,
    pub composite: CompositeScore,
    pub fusion: FusionResult,
    /// Band assigned by the threshold classifier, before the reject floor.
    pub classified_band: RiskBand,
    pub base_offer: u32,
    pub consent_bonus: u32,
    pub loan_to_income_ratio: f64,
    pub no_history_manual_flag: bool,
    pub meets_low_risk_automatic: bool,
    pub qualifies_high_confidence: bool,
}

/// Score one application against a context snapshot.
///
/// Pure and synchronous: nothing outside the returned value is touched, so a
/// cancelled evaluation can be dropped at any point.
pub fn evaluate(
    context: &ScoringContext,
    input: &ApplicationInput,
) -> Result<DecisionResult, ScoringError> {
    let policy = context.policy();
    let barrier = context.barrier();

    let extracted = extract_features(input, context.intake())?;
    let features = extracted.features;

    let pillars = score_pillars(&features, barrier.dynamic_income_barrier);
    debug!(
        segment = pillars.segment.label(),
        financial = ?pillars.scores.financial,
        repayment = ?pillars.scores.repayment,
        consumption = ?pillars.scores.consumption,
        history = ?pillars.scores.history,
        loan_to_income = pillars.loan_to_income_ratio,
        fraud_penalty = pillars.adjustments.fraud_penalty,
        fair_lending_bonus = pillars.adjustments.fair_lending_bonus,
        "pillars scored"
    );
    let segment = pillars.segment;
    let is_new_user = pillars.is_new_user;

    let composite = aggregate(pillars);
    ensure_in_range(&composite)?;

    let oracle = context.oracle();
    let ml_probability = oracle
        .predict(&features)
        .and_then(checked_probability)
        .map_err(|err| {
            error!(
                oracle = oracle.name(),
                version = oracle.version(),
                error = %err,
                "oracle prediction failed"
            );
            ScoringError::from(err)
        })?;

    let fusion = fuse(&policy.fusion, ml_probability, composite.score);
    if let Some(adjustment) = &fusion.floor_adjustment {
        warn!(
            original_sci = adjustment.original_sci,
            adjusted_sci = adjustment.adjusted_sci,
            ml_probability,
            composite_score = composite.score,
            "confidence floor applied"
        );
    }

    let (classified_band, need_label) = classify_risk(
        &policy.risk,
        fusion.final_sci,
        input.is_socially_disadvantaged,
    );

    let decision = context.decisions().decide(&DecisionInputs {
        classified_band,
        final_sci: fusion.final_sci,
        ml_probability,
        composite_score: composite.score,
        declared_income: extracted.terms.declared_income,
        loan_amount: extracted.terms.loan_amount,
        consent_recharge: input.consent_recharge,
        consent_electricity: input.consent_electricity,
        education_consented: input.education_consented(),
        segment,
        is_new_user,
    });

    Ok(DecisionResult {
        application_id: input.application_id.clone(),
        status: decision.status,
        risk_band: decision.risk_band,
        need_label,
        loan_offer: decision.loan_offer,
        ml_probability: round_to(ml_probability, 3),
        composite_score: composite.score,
        final_sci: fusion.final_sci,
        message: decision.message,
        breakdown: DecisionBreakdown {
            feature_schema_version: FEATURE_SCHEMA_VERSION.to_string(),
            features_extracted: features.len(),
            features,
            terms: extracted.terms,
            oracle: oracle.descriptor(),
            barrier,
            composite,
            fusion,
            classified_band,
            base_offer: decision.base_offer,
            consent_bonus: decision.consent_bonus,
            loan_to_income_ratio: decision.loan_to_income_ratio,
            no_history_manual_flag: decision.no_history_manual_flag,
            meets_low_risk_automatic: decision.meets_low_risk_automatic,
            qualifies_high_confidence: decision.qualifies_high_confidence,
        },
    })
}

fn ensure_in_range(composite: &CompositeScore) -> Result<(), ScoringError> {
    for pillar in Pillar::ALL {
        if let Some(score) = composite.breakdown.scores.get(pillar) {
            if !(0.0..=1.0).contains(&score) {
                return Err(ScoringError::InvariantViolation(format!(
                    "{pillar:?} pillar score {score} outside [0, 1]"
                )));
            }
        }
    }
    if !(0.0..=100.0).contains(&composite.score) {
        return Err(ScoringError::InvariantViolation(format!(
            "composite score {} outside [0, 100]",
            composite.score
        )));
    }
    Ok(())
}

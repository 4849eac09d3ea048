use std::sync::Arc;

use super::common::*;
use crate::error::{OracleError, ScoringError};
use crate::scoring::{
    ApplicationId, BarrierConfig, BarrierSource, DecisionStatus, RiskBand, ScoringService,
    Segment, FEATURE_SCHEMA_VERSION,
};

#[test]
fn established_borrower_is_approved() {
    let result = service(0.9)
        .evaluate(&established_application())
        .expect("scored");

    let segment = result.breakdown.composite.breakdown.segment;
    assert_eq!(segment, Segment::HighIncomeRepaymentFocused);
    assert_eq!(result.breakdown.loan_to_income_ratio, 0.25);
    assert!(!result.breakdown.no_history_manual_flag);
    assert!(result.composite_score > 85.0 && result.composite_score < 90.0);
    assert!(result.final_sci >= 80.0);
    assert!((result.final_sci - 88.87).abs() <= 0.01);
    assert_eq!(result.risk_band, RiskBand::Low);
    assert_eq!(result.status, DecisionStatus::Approved);
    assert_eq!(result.loan_offer, 20_000);
    assert_eq!(
        result.application_id,
        Some(ApplicationId("app-established".to_string()))
    );
}

#[test]
fn new_user_is_never_auto_approved() {
    let result = service(0.4)
        .evaluate(&new_user_application())
        .expect("scored");

    assert_eq!(
        result.breakdown.composite.breakdown.segment,
        Segment::NewUserNoBankData
    );
    assert_eq!(result.breakdown.loan_to_income_ratio, 0.375);
    assert_eq!(result.composite_score, 42.8);
    assert_eq!(result.final_sci, 41.12);
    assert_eq!(result.breakdown.classified_band, RiskBand::High);
    assert_eq!(result.risk_band, RiskBand::Reject);
    assert_eq!(result.status, DecisionStatus::Rejected);
    assert_eq!(result.loan_offer, 0);
}

#[test]
fn oracle_failure_fails_the_request() {
    let service = ScoringService::new(context(Arc::new(FailingOracle)));
    let error = service
        .evaluate(&established_application())
        .expect_err("oracle offline");

    assert!(matches!(
        error,
        ScoringError::OracleUnavailable(OracleError::Unavailable(_))
    ));
}

#[test]
fn out_of_range_probability_is_not_used() {
    let error = service(1.5)
        .evaluate(&established_application())
        .expect_err("invalid probability");

    assert!(matches!(
        error,
        ScoringError::OracleUnavailable(OracleError::InvalidProbability(_))
    ));
}

#[test]
fn invalid_input_never_reaches_the_oracle() {
    let oracle = Arc::new(FixedOracle::new(0.7));
    let service = ScoringService::new(context(oracle.clone()));

    let mut input = new_user_application();
    input.loan_amount = None;
    let error = service.evaluate(&input).expect_err("missing loan amount");

    assert_eq!(error.kind(), "invalid_input");
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn identical_inputs_give_identical_results() {
    let service = service(0.66);
    let input = low_income_application();

    let first = service.evaluate(&input).expect("scored");
    let second = service.evaluate(&input).expect("scored");
    assert_eq!(first, second);
}

#[test]
fn batch_collects_successes_and_failures() {
    let mut invalid = low_income_application();
    invalid.application_id = Some(ApplicationId("app-invalid".to_string()));
    invalid.declared_income = Some(200.0);

    let outcome = service(0.8).evaluate_batch(&[
        established_application(),
        invalid,
        new_user_application(),
    ]);

    assert_eq!(outcome.generation, 0);
    assert_eq!(outcome.successes.len(), 2);
    assert_eq!(outcome.failures.len(), 1);

    let failure = &outcome.failures[0];
    assert_eq!(failure.index, 1);
    assert_eq!(failure.kind, "invalid_input");
    assert_eq!(
        failure.application_id,
        Some(ApplicationId("app-invalid".to_string()))
    );
    assert!(failure.error.contains("declared_income"));
}

#[test]
fn reload_bumps_generation_without_disturbing_snapshots() {
    let service = service(0.4);
    let before = service.context();

    let summary = service.reload(fixed_context(0.95));
    assert_eq!(summary.generation, 1);
    assert_eq!(before.generation(), 0);
    assert_eq!(service.context().generation(), 1);

    let stale = crate::scoring::evaluate(&before, &new_user_application()).expect("scored");
    let fresh = service
        .evaluate(&new_user_application())
        .expect("scored");
    assert_eq!(stale.ml_probability, 0.4);
    assert_eq!(fresh.ml_probability, 0.95);
}

#[test]
fn barrier_resolution_prefers_configuration() {
    let configured = BarrierConfig::resolve(Some(12_000.0), Some(18_000.0));
    assert_eq!(configured.dynamic_income_barrier, 12_000.0);
    assert_eq!(configured.source, BarrierSource::Configured);

    let metadata = BarrierConfig::resolve(None, Some(18_000.0));
    assert_eq!(metadata.source, BarrierSource::ModelMetadata);

    let fallback = BarrierConfig::resolve(Some(-1.0), None);
    assert_eq!(fallback.dynamic_income_barrier, 15_000.0);
    assert_eq!(fallback.source, BarrierSource::Default);
}

#[test]
fn result_serializes_for_audit() {
    let result = service(0.9)
        .evaluate(&established_application())
        .expect("scored");
    let value = serde_json::to_value(&result).expect("serialize");

    assert_eq!(value["status"], "approved");
    assert_eq!(value["risk_band"], "Low Risk");
    assert_eq!(value["need_label"], "Low Need");
    assert_eq!(value["application_id"], "app-established");
    assert_eq!(
        value["breakdown"]["feature_schema_version"],
        FEATURE_SCHEMA_VERSION
    );
    assert_eq!(value["breakdown"]["features"]["monthly_credits"], 20_000.0);
    assert_eq!(
        value["breakdown"]["composite"]["breakdown"]["segment"],
        "high_income_repayment_focused"
    );
    assert_eq!(value["breakdown"]["barrier"]["source"], "default");
}

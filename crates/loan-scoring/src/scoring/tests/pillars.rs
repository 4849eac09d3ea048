use super::common::*;
use crate::scoring::{
    aggregate, loan_to_income_adequacy, normalize_weights, score_pillars, Pillar, PillarScores,
    RepaymentHistory, Segment, DEFAULT_INCOME_BARRIER,
};

fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn new_user_without_bank_data_leans_on_proxies() {
    let features = features_of(&new_user_application());
    let breakdown = score_pillars(&features, DEFAULT_INCOME_BARRIER);

    assert_eq!(breakdown.segment, Segment::NewUserNoBankData);
    assert_eq!(breakdown.segment.label(), "new_user_no_bank_data");
    assert_eq!(breakdown.weights, Segment::NewUserNoBankData.weights());
    assert_eq!(breakdown.loan_to_income_ratio, 0.375);
    assert_eq!(breakdown.adjustments.fraud_penalty, 0.0);
    assert!(breakdown.is_new_user);

    approx(breakdown.scores.financial.unwrap_or_default(), 0.52);
    approx(breakdown.scores.repayment.unwrap_or_default(), 0.5);
    approx(breakdown.scores.consumption.unwrap_or_default(), 0.35);
    approx(breakdown.scores.history.unwrap_or_default(), 0.5);

    let composite = aggregate(breakdown);
    assert_eq!(composite.score, 42.8);
}

#[test]
fn segment_boundary_sits_at_the_barrier() {
    assert_eq!(
        Segment::classify(true, 14_999.0, 15_000.0),
        Segment::LowIncomeAlternativeProxies
    );
    assert_eq!(
        Segment::classify(true, 15_000.0, 15_000.0),
        Segment::HighIncomeRepaymentFocused
    );
    assert_eq!(
        Segment::classify(false, 90_000.0, 15_000.0),
        Segment::NewUserNoBankData
    );
}

#[test]
fn segment_weights_sum_to_one() {
    for segment in [
        Segment::NewUserNoBankData,
        Segment::LowIncomeAlternativeProxies,
        Segment::HighIncomeRepaymentFocused,
    ] {
        approx(segment.weights().total(), 1.0);
    }
}

#[test]
fn barrier_moves_the_segment() {
    let features = features_of(&established_application());
    assert_eq!(
        score_pillars(&features, 15_000.0).segment,
        Segment::HighIncomeRepaymentFocused
    );
    assert_eq!(
        score_pillars(&features, 25_000.0).segment,
        Segment::LowIncomeAlternativeProxies
    );
}

#[test]
fn modest_low_income_request_earns_fair_lending_bonus() {
    let features = features_of(&low_income_application());
    let breakdown = score_pillars(&features, DEFAULT_INCOME_BARRIER);

    assert_eq!(breakdown.segment, Segment::LowIncomeAlternativeProxies);
    assert_eq!(breakdown.loan_to_income_ratio, 0.2);
    assert_eq!(breakdown.adjustments.fair_lending_bonus, 0.05);

    let unadjusted: f64 = Pillar::ALL
        .iter()
        .map(|pillar| {
            breakdown.scores.get(*pillar).unwrap_or_default() * breakdown.weights.get(*pillar)
        })
        .sum();
    let composite = aggregate(breakdown);
    approx(composite.score_01, (unadjusted + 0.05).min(1.0));
}

#[test]
fn oversized_requests_are_penalised() {
    let mut input = new_user_application();
    input.loan_amount = Some(5_000.0);
    let breakdown = score_pillars(&features_of(&input), DEFAULT_INCOME_BARRIER);
    assert_eq!(breakdown.adjustments.fraud_penalty, 0.20);

    let mut input = established_application();
    input.loan_amount = Some(25_000.0);
    let breakdown = score_pillars(&features_of(&input), DEFAULT_INCOME_BARRIER);
    assert_eq!(breakdown.segment, Segment::HighIncomeRepaymentFocused);
    assert_eq!(breakdown.adjustments.fraud_penalty, 0.15);
    assert_eq!(breakdown.components.loan_to_income_score, 0.1);
}

#[test]
fn raising_on_time_ratio_never_lowers_scores() {
    let with_ratio = |ratio: f64| {
        let mut input = established_application();
        input.repayment_history = Some(RepaymentHistory {
            ontime_count: Some(4),
            late_count: Some(2),
            on_time_ratio: Some(ratio),
            avg_payment_delay_days: Some(6.0),
            ..RepaymentHistory::default()
        });
        aggregate(score_pillars(&features_of(&input), DEFAULT_INCOME_BARRIER))
    };

    let mut previous = with_ratio(0.0);
    for step in 1..=10 {
        let current = with_ratio(f64::from(step) / 10.0);
        assert!(current.breakdown.scores.repayment >= previous.breakdown.scores.repayment);
        assert!(current.score >= previous.score);
        previous = current;
    }
}

#[test]
fn pillar_and_composite_scores_stay_in_range() {
    for input in [
        new_user_application(),
        established_application(),
        low_income_application(),
    ] {
        let composite = aggregate(score_pillars(&features_of(&input), DEFAULT_INCOME_BARRIER));
        for pillar in Pillar::ALL {
            let score = composite.breakdown.scores.get(pillar).unwrap_or_default();
            assert!((0.0..=1.0).contains(&score), "{pillar:?} = {score}");
        }
        assert!((0.0..=100.0).contains(&composite.score));
    }
}

#[test]
fn weights_renormalise_over_available_pillars() {
    let weights = Segment::HighIncomeRepaymentFocused.weights();
    let scores = PillarScores {
        financial: Some(0.6),
        repayment: Some(0.7),
        consumption: Some(0.5),
        history: None,
    };
    let normalized = normalize_weights(&weights, &scores).expect("weight available");
    approx(normalized.total(), 1.0);
    assert_eq!(normalized.history, 0.0);
    approx(normalized.repayment, 0.50 / 0.90);

    let unchanged = normalize_weights(
        &weights,
        &PillarScores {
            history: Some(0.4),
            ..scores
        },
    )
    .expect("weight available");
    approx(unchanged.financial, weights.financial);
}

#[test]
fn nothing_measurable_falls_back_to_neutral() {
    let mut breakdown = score_pillars(
        &features_of(&new_user_application()),
        DEFAULT_INCOME_BARRIER,
    );
    breakdown.scores = PillarScores {
        financial: None,
        repayment: None,
        consumption: None,
        history: None,
    };
    let composite = aggregate(breakdown);
    assert_eq!(composite.score, 50.0);
}

#[test]
fn bonus_cannot_push_past_the_ceiling() {
    let mut breakdown = score_pillars(
        &features_of(&low_income_application()),
        DEFAULT_INCOME_BARRIER,
    );
    breakdown.scores = PillarScores {
        financial: Some(1.0),
        repayment: Some(1.0),
        consumption: Some(1.0),
        history: Some(1.0),
    };
    let composite = aggregate(breakdown);
    assert_eq!(composite.score, 100.0);
}

#[test]
fn loan_to_income_tiers() {
    assert_eq!(loan_to_income_adequacy(0.3), 1.0);
    assert_eq!(loan_to_income_adequacy(0.31), 0.8);
    assert_eq!(loan_to_income_adequacy(0.5), 0.8);
    assert_eq!(loan_to_income_adequacy(0.8), 0.5);
    assert_eq!(loan_to_income_adequacy(1.0), 0.3);
    assert_eq!(loan_to_income_adequacy(1.01), 0.1);
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::OracleError;
use crate::scoring::{
    extract_features, ApplicationId, ApplicationInput, BankStatement, BarrierConfig,
    ElectricityBills, FeatureVector, IntakeGuard, ProbabilityOracle, RechargeHistory,
    RepaymentHistory, ScoringContext, ScoringPolicy, ScoringService,
};

/// Oracle answering the same probability for every application.
pub(super) struct FixedOracle {
    probability: f64,
    calls: AtomicUsize,
}

impl FixedOracle {
    pub(super) fn new(probability: f64) -> Self {
        Self {
            probability,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProbabilityOracle for FixedOracle {
    fn name(&self) -> &str {
        "fixed"
    }

    fn version(&self) -> &str {
        "test"
    }

    fn predict(&self, _features: &FeatureVector) -> Result<f64, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probability)
    }
}

pub(super) struct FailingOracle;

impl ProbabilityOracle for FailingOracle {
    fn name(&self) -> &str {
        "failing"
    }

    fn version(&self) -> &str {
        "test"
    }

    fn predict(&self, _features: &FeatureVector) -> Result<f64, OracleError> {
        Err(OracleError::Unavailable("model endpoint offline".to_string()))
    }
}

pub(super) fn context(oracle: Arc<dyn ProbabilityOracle>) -> ScoringContext {
    ScoringContext::new(oracle, BarrierConfig::default(), ScoringPolicy::default())
}

pub(super) fn fixed_context(probability: f64) -> ScoringContext {
    context(Arc::new(FixedOracle::new(probability)))
}

pub(super) fn service(probability: f64) -> ScoringService {
    ScoringService::new(fixed_context(probability))
}

pub(super) fn features_of(input: &ApplicationInput) -> FeatureVector {
    extract_features(input, &IntakeGuard::default())
        .expect("fixture application is valid")
        .features
}

/// No bank data and no repayment history.
pub(super) fn new_user_application() -> ApplicationInput {
    ApplicationInput {
        application_id: Some(ApplicationId("app-new-user".to_string())),
        name: Some("Meera".to_string()),
        age: Some(29),
        declared_income: Some(8_000.0),
        loan_amount: Some(3_000.0),
        tenure_months: Some(6),
        ..ApplicationInput::default()
    }
}

/// Salaried applicant above the barrier with a clean repayment record.
pub(super) fn established_application() -> ApplicationInput {
    ApplicationInput {
        application_id: Some(ApplicationId("app-established".to_string())),
        age: Some(41),
        declared_income: Some(20_000.0),
        loan_amount: Some(5_000.0),
        tenure_months: Some(12),
        consent_bank: true,
        bank_statement: Some(BankStatement {
            monthly_credits: Some(20_000.0),
            avg_balance: Some(25_000.0),
            ..BankStatement::default()
        }),
        repayment_history: Some(RepaymentHistory {
            ontime_count: Some(6),
            on_time_ratio: Some(1.0),
            avg_repayment_ratio: Some(0.9),
            previous_defaults: Some(0),
            ..RepaymentHistory::default()
        }),
        ..ApplicationInput::default()
    }
}

/// Bank data below the barrier, modest request, consented proxies.
pub(super) fn low_income_application() -> ApplicationInput {
    ApplicationInput {
        application_id: Some(ApplicationId("app-low-income".to_string())),
        age: Some(34),
        declared_income: Some(10_000.0),
        loan_amount: Some(2_000.0),
        tenure_months: Some(10),
        has_children: true,
        consent_bank: true,
        consent_recharge: true,
        consent_electricity: true,
        bank_statement: Some(BankStatement {
            monthly_credits: Some(10_000.0),
            avg_balance: Some(4_000.0),
            salary_std: Some(1_500.0),
            ..BankStatement::default()
        }),
        recharge_history: Some(RechargeHistory {
            frequency: Some(4.0),
            avg_amount: Some(199.0),
            recharge_count: Some(24),
            consistency: Some(0.8),
            ..RechargeHistory::default()
        }),
        electricity_bills: Some(ElectricityBills {
            avg_payment: Some(850.0),
            consistency: Some(0.9),
            ontime_ratio: Some(0.95),
            ..ElectricityBills::default()
        }),
        ..ApplicationInput::default()
    }
}

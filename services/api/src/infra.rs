use crate::error::AppError;
use loan_scoring::config::ScoringSettings;
use loan_scoring::error::ScoringError;
use loan_scoring::scoring::{
    ApplicationInput, BarrierConfig, BatchOutcome, ContextSummary, DecisionResult, FusionPolicy,
    LinearModelOracle, ScoringContext, ScoringPolicy, ScoringService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Shared handle given to every scoring route.
#[derive(Clone)]
pub(crate) struct ScoringState {
    pub(crate) service: ScoringService,
    pub(crate) settings: Arc<ScoringSettings>,
}

impl ScoringState {
    pub(crate) fn new(service: ScoringService, settings: ScoringSettings) -> Self {
        Self {
            service,
            settings: Arc::new(settings),
        }
    }

    fn timeout(&self) -> Duration {
        self.settings.oracle_timeout()
    }
}

/// Load the model artifact and assemble a context from the configured dials.
pub(crate) fn build_context(settings: &ScoringSettings) -> Result<ScoringContext, AppError> {
    let oracle = LinearModelOracle::from_path(&settings.model_path)?;
    let barrier = BarrierConfig::resolve(settings.income_barrier, oracle.dynamic_income_barrier());
    let policy = ScoringPolicy {
        fusion: FusionPolicy::with_ml_weight(settings.ml_weight),
        ..ScoringPolicy::default()
    };

    info!(
        model = %settings.model_path.display(),
        features = oracle.feature_count(),
        barrier = barrier.dynamic_income_barrier,
        barrier_source = ?barrier.source,
        "model artifact loaded"
    );
    Ok(ScoringContext::new(Arc::new(oracle), barrier, policy))
}

/// Score on the blocking pool, bounded by the configured oracle timeout.
pub(crate) async fn evaluate_with_timeout(
    state: &ScoringState,
    input: ApplicationInput,
) -> Result<DecisionResult, ScoringError> {
    let service = state.service.clone();
    let budget = state.timeout();
    let task = tokio::task::spawn_blocking(move || service.evaluate(&input));

    match tokio::time::timeout(budget, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(task_failure(join_error)),
        Err(_) => Err(timed_out(budget)),
    }
}

/// Batch counterpart of [`evaluate_with_timeout`]; the budget scales with the batch size.
pub(crate) async fn evaluate_batch_with_timeout(
    state: &ScoringState,
    inputs: Vec<ApplicationInput>,
) -> Result<BatchOutcome, ScoringError> {
    let service = state.service.clone();
    let items = u32::try_from(inputs.len().max(1)).unwrap_or(u32::MAX);
    let budget = state.timeout().saturating_mul(items);
    let task = tokio::task::spawn_blocking(move || service.evaluate_batch(&inputs));

    match tokio::time::timeout(budget, task).await {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(join_error)) => Err(task_failure(join_error)),
        Err(_) => Err(timed_out(budget)),
    }
}

/// Rebuild the context from the configured artifact and swap it in.
pub(crate) async fn reload_context(state: &ScoringState) -> Result<ContextSummary, AppError> {
    let settings = Arc::clone(&state.settings);
    let context = tokio::task::spawn_blocking(move || build_context(&settings))
        .await
        .map_err(|join_error| AppError::Scoring(task_failure(join_error)))??;
    Ok(state.service.reload(context))
}

fn timed_out(budget: Duration) -> ScoringError {
    let after_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
    warn!(after_ms, "evaluation exceeded its time budget");
    ScoringError::OracleTimeout { after_ms }
}

fn task_failure(join_error: JoinError) -> ScoringError {
    ScoringError::InvariantViolation(format!("evaluation task failed: {join_error}"))
}

use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::decision::{DecisionConfig, DecisionEngine};
use super::fusion::FusionPolicy;
use super::oracle::{OracleDescriptor, ProbabilityOracle};
use super::risk::RiskThresholds;
use super::validation::{IntakeGuard, IntakeLimits};

pub const DEFAULT_INCOME_BARRIER: f64 = 15_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierSource {
    Configured,
    ModelMetadata,
    Default,
}

/// Income threshold separating the low- and high-income segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrierConfig {
    pub dynamic_income_barrier: f64,
    pub source: BarrierSource,
}

impl BarrierConfig {
    pub fn configured(barrier: f64) -> Self {
        Self {
            dynamic_income_barrier: barrier,
            source: BarrierSource::Configured,
        }
    }

    /// Explicit configuration wins over model metadata; the default covers neither.
    pub fn resolve(configured: Option<f64>, model_metadata: Option<f64>) -> Self {
        let usable = |value: &f64| value.is_finite() && *value > 0.0;

        if let Some(barrier) = configured.filter(usable) {
            return Self::configured(barrier);
        }
        if let Some(barrier) = model_metadata.filter(usable) {
            return Self {
                dynamic_income_barrier: barrier,
                source: BarrierSource::ModelMetadata,
            };
        }

        warn!(
            default = DEFAULT_INCOME_BARRIER,
            "income barrier not configured; falling back to default"
        );
        Self::default()
    }
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            dynamic_income_barrier: DEFAULT_INCOME_BARRIER,
            source: BarrierSource::Default,
        }
    }
}

/// Every tunable dial of the scoring pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub intake: IntakeLimits,
    pub fusion: FusionPolicy,
    pub risk: RiskThresholds,
    pub decision: DecisionConfig,
}

/// Immutable snapshot handed to each evaluation.
pub struct ScoringContext {
    oracle: Arc<dyn ProbabilityOracle>,
    barrier: BarrierConfig,
    policy: ScoringPolicy,
    intake: IntakeGuard,
    decisions: DecisionEngine,
    generation: u64,
}

impl ScoringContext {
    pub fn new(
        oracle: Arc<dyn ProbabilityOracle>,
        barrier: BarrierConfig,
        policy: ScoringPolicy,
    ) -> Self {
        let intake = IntakeGuard::with_limits(policy.intake.clone());
        let decisions = DecisionEngine::new(policy.decision.clone());
        Self {
            oracle,
            barrier,
            policy,
            intake,
            decisions,
            generation: 0,
        }
    }

    pub fn oracle(&self) -> &dyn ProbabilityOracle {
        self.oracle.as_ref()
    }

    pub fn barrier(&self) -> BarrierConfig {
        self.barrier
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn intake(&self) -> &IntakeGuard {
        &self.intake
    }

    pub fn decisions(&self) -> &DecisionEngine {
        &self.decisions
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            oracle: self.oracle.descriptor(),
            barrier: self.barrier,
            ml_weight: self.policy.fusion.ml_weight,
            generation: self.generation,
        }
    }
}

impl fmt::Debug for ScoringContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringContext")
            .field("oracle", &self.oracle.descriptor())
            .field("barrier", &self.barrier)
            .field("policy", &self.policy)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Serializable view of the active context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub oracle: OracleDescriptor,
    pub barrier: BarrierConfig,
    pub ml_weight: f64,
    pub generation: u64,
}

/// Single-writer holder of the active context. Readers clone the `Arc` and
/// keep their snapshot even if a reload lands mid-evaluation.
pub struct ContextStore {
    current: RwLock<Arc<ScoringContext>>,
}

impl ContextStore {
    pub fn new(context: ScoringContext) -> Self {
        Self {
            current: RwLock::new(Arc::new(context)),
        }
    }

    pub fn snapshot(&self) -> Arc<ScoringContext> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    /// Install `context` as the next generation and return what was installed.
    pub fn replace(&self, mut context: ScoringContext) -> Arc<ScoringContext> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        context.generation = guard.generation.saturating_add(1);
        let installed = Arc::new(context);
        *guard = Arc::clone(&installed);
        info!(
            generation = installed.generation,
            oracle = installed.oracle.name(),
            version = installed.oracle.version(),
            "scoring context replaced"
        );
        installed
    }
}

impl fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextStore")
            .field("current", &self.snapshot())
            .finish()
    }
}

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::context::{ContextStore, ContextSummary, ScoringContext};
use super::domain::{ApplicationId, ApplicationInput};
use super::engine::{evaluate, DecisionResult};
use crate::error::ScoringError;

/// Entry point for callers: scores applications against the active context.
#[derive(Debug, Clone)]
pub struct ScoringService {
    contexts: Arc<ContextStore>,
}

impl ScoringService {
    pub fn new(context: ScoringContext) -> Self {
        Self {
            contexts: Arc::new(ContextStore::new(context)),
        }
    }

    pub fn with_store(contexts: Arc<ContextStore>) -> Self {
        Self { contexts }
    }

    pub fn context(&self) -> Arc<ScoringContext> {
        self.contexts.snapshot()
    }

    pub fn summary(&self) -> ContextSummary {
        self.context().summary()
    }

    pub fn evaluate(&self, input: &ApplicationInput) -> Result<DecisionResult, ScoringError> {
        let context = self.contexts.snapshot();
        let result = evaluate(&context, input).inspect_err(|err| {
            warn!(
                application_id = display_id(input.application_id.as_ref()),
                kind = err.kind(),
                error = %err,
                "application not scored"
            );
        })?;

        info!(
            application_id = display_id(result.application_id.as_ref()),
            segment = result.breakdown.composite.breakdown.segment.label(),
            status = result.status.as_str(),
            risk_band = result.risk_band.label(),
            final_sci = result.final_sci,
            generation = context.generation(),
            "application scored"
        );
        Ok(result)
    }

    /// Score a batch against one snapshot so every item sees the same model.
    pub fn evaluate_batch(&self, inputs: &[ApplicationInput]) -> BatchOutcome {
        let context = self.contexts.snapshot();
        let mut outcome = BatchOutcome {
            generation: context.generation(),
            successes: Vec::new(),
            failures: Vec::new(),
        };

        for (index, input) in inputs.iter().enumerate() {
            match evaluate(&context, input) {
                Ok(result) => outcome.successes.push(result),
                Err(err) => outcome.failures.push(BatchFailure {
                    index,
                    application_id: input.application_id.clone(),
                    kind: err.kind(),
                    error: err.to_string(),
                }),
            }
        }

        info!(
            generation = outcome.generation,
            scored = outcome.successes.len(),
            failed = outcome.failures.len(),
            "batch rescored"
        );
        outcome
    }

    /// Swap in a freshly built context. In-flight evaluations finish on the old one.
    pub fn reload(&self, context: ScoringContext) -> ContextSummary {
        self.contexts.replace(context).summary()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub generation: u64,
    pub successes: Vec<DecisionResult>,
    pub failures: Vec<BatchFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    pub kind: &'static str,
    pub error: String,
}

fn display_id(id: Option<&ApplicationId>) -> &str {
    id.map(|id| id.0.as_str()).unwrap_or("-")
}

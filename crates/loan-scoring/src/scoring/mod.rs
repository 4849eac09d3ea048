//! Applicant scoring: feature extraction, segment-weighted pillars, score
//! fusion with the probability oracle, risk banding and the lending decision.

mod composite;
mod context;
mod decision;
mod domain;
mod engine;
mod features;
mod fusion;
mod lenient;
mod numeric;
mod oracle;
mod pillars;
mod risk;
mod service;
mod validation;

#[cfg(test)]
mod tests;

pub use composite::{aggregate, normalize_weights, CompositeScore};
pub use context::{
    BarrierConfig, BarrierSource, ContextStore, ContextSummary, ScoringContext, ScoringPolicy,
    DEFAULT_INCOME_BARRIER,
};
pub use decision::{
    format_rupees, ApprovalRules, ConsentBonuses, Decision, DecisionConfig, DecisionEngine,
    DecisionInputs, DecisionStatus, OfferSchedule,
};
pub use domain::{
    ApplicationId, ApplicationInput, BankStatement, EducationFees, ElectricityBills,
    RechargeHistory, RepaymentHistory,
};
pub use engine::{evaluate, DecisionBreakdown, DecisionResult};
pub use features::{
    extract_features, lifestyle_index, suspicion_score, ExtractedApplication, FeatureKind,
    FeatureVector, FEATURE_SCHEMA_VERSION, LOW_INCOME_CUTOFF,
};
pub use fusion::{fuse, FloorAdjustment, FloorRule, FusionPolicy, FusionResult, FLOOR_REASON};
pub use oracle::{
    checked_probability, LinearModelOracle, ModelArtifact, OracleDescriptor, ProbabilityOracle,
};
pub use pillars::{
    loan_to_income_adequacy, score_pillars, score_pillars_with_caps, Adjustments, Pillar,
    PillarBreakdown, PillarComponents, PillarScores, PillarWeights, Segment, SignalCaps,
};
pub use risk::{classify_risk, NeedLabel, RiskBand, RiskThresholds};
pub use service::{BatchFailure, BatchOutcome, ScoringService};
pub use validation::{IntakeGuard, IntakeLimits, LoanTerms};

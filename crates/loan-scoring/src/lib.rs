//! Microloan scoring and decision engine.
//!
//! Applications flow through feature extraction, pillar scoring, composite
//! aggregation, fusion with a model probability, risk banding and finally the
//! lending decision. Every stage is a pure function of the request and an
//! immutable [`scoring::ScoringContext`] snapshot.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;

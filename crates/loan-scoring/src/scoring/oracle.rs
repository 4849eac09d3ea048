use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::features::{FeatureKind, FeatureVector, FEATURE_SCHEMA_VERSION};
use crate::error::OracleError;

/// Opaque source of repayment probabilities.
///
/// Implementations must be read-only once constructed; a new model means a new
/// oracle inside a new scoring context.
pub trait ProbabilityOracle: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn predict(&self, features: &FeatureVector) -> Result<f64, OracleError>;

    fn descriptor(&self) -> OracleDescriptor {
        OracleDescriptor {
            name: self.name().to_string(),
            version: self.version().to_string(),
            feature_schema_version: FEATURE_SCHEMA_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleDescriptor {
    pub name: String,
    pub version: String,
    pub feature_schema_version: String,
}

/// Reject anything that is not a finite probability.
pub fn checked_probability(value: f64) -> Result<f64, OracleError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(OracleError::InvalidProbability(value))
    }
}

/// Serialized standard-scaled logistic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: String,
    pub version: String,
    pub schema_version: String,
    pub features: Vec<String>,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub dynamic_income_barrier: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Term {
    feature: FeatureKind,
    mean: f64,
    scale: f64,
    coefficient: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearModelOracle {
    name: String,
    version: String,
    terms: Vec<Term>,
    intercept: f64,
    dynamic_income_barrier: Option<f64>,
}

impl LinearModelOracle {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, OracleError> {
        let raw = fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, OracleError> {
        if artifact.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(OracleError::SchemaMismatch(format!(
                "artifact targets {} but extraction produces {}",
                artifact.schema_version, FEATURE_SCHEMA_VERSION
            )));
        }

        let width = artifact.features.len();
        if width == 0 {
            return Err(OracleError::SchemaMismatch(
                "artifact declares no features".to_string(),
            ));
        }
        if artifact.scaler_mean.len() != width
            || artifact.scaler_scale.len() != width
            || artifact.coefficients.len() != width
        {
            return Err(OracleError::SchemaMismatch(format!(
                "expected {width} scaler means, scales and coefficients"
            )));
        }

        let mut seen = BTreeSet::new();
        let mut terms = Vec::with_capacity(width);
        for (index, name) in artifact.features.iter().enumerate() {
            let feature = FeatureKind::from_name(name)
                .ok_or_else(|| OracleError::SchemaMismatch(format!("unknown feature {name}")))?;
            if !seen.insert(feature) {
                return Err(OracleError::SchemaMismatch(format!(
                    "feature {name} listed twice"
                )));
            }

            let mean = artifact.scaler_mean[index];
            let scale = artifact.scaler_scale[index];
            let coefficient = artifact.coefficients[index];
            if !(mean.is_finite() && scale.is_finite() && coefficient.is_finite()) {
                return Err(OracleError::SchemaMismatch(format!(
                    "non-finite parameter for feature {name}"
                )));
            }

            terms.push(Term {
                feature,
                mean,
                // Constant columns are stored with zero scale; they pass through unscaled.
                scale: if scale == 0.0 { 1.0 } else { scale },
                coefficient,
            });
        }

        if !artifact.intercept.is_finite() {
            return Err(OracleError::SchemaMismatch(
                "non-finite intercept".to_string(),
            ));
        }

        Ok(Self {
            name: artifact.model,
            version: artifact.version,
            terms,
            intercept: artifact.intercept,
            dynamic_income_barrier: artifact
                .dynamic_income_barrier
                .filter(|barrier| barrier.is_finite() && *barrier > 0.0),
        })
    }

    /// Income barrier recorded alongside the model at training time, if any.
    pub fn dynamic_income_barrier(&self) -> Option<f64> {
        self.dynamic_income_barrier
    }

    pub fn feature_count(&self) -> usize {
        self.terms.len()
    }
}

impl ProbabilityOracle for LinearModelOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, OracleError> {
        let logit = self.terms.iter().fold(self.intercept, |acc, term| {
            let standardized = (features.get(term.feature) - term.mean) / term.scale;
            acc + term.coefficient * standardized
        });
        checked_probability(sigmoid(logit))
    }
}

fn sigmoid(logit: f64) -> f64 {
    1.0 / (1.0 + (-logit).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            model: "logistic_regression".to_string(),
            version: "test".to_string(),
            schema_version: FEATURE_SCHEMA_VERSION.to_string(),
            features: vec!["on_time_ratio".to_string(), "debt_to_income_ratio".to_string()],
            scaler_mean: vec![0.5, 0.4],
            scaler_scale: vec![0.25, 0.0],
            coefficients: vec![1.2, -0.8],
            intercept: 0.1,
            dynamic_income_barrier: Some(14_000.0),
        }
    }

    #[test]
    fn rejects_other_schema_versions() {
        let mut artifact = artifact();
        artifact.schema_version = "features.v0".to_string();
        let error = LinearModelOracle::from_artifact(artifact).expect_err("schema mismatch");
        assert!(matches!(error, OracleError::SchemaMismatch(_)));
    }

    #[test]
    fn rejects_unknown_feature_names() {
        let mut artifact = artifact();
        artifact.features[1] = "credit_score".to_string();
        let error = LinearModelOracle::from_artifact(artifact).expect_err("unknown feature");
        assert!(error.to_string().contains("credit_score"));
    }

    #[test]
    fn rejects_mismatched_parameter_lengths() {
        let mut artifact = artifact();
        artifact.coefficients.pop();
        assert!(LinearModelOracle::from_artifact(artifact).is_err());
    }

    #[test]
    fn keeps_positive_barrier_metadata() {
        let oracle = LinearModelOracle::from_artifact(artifact()).expect("valid artifact");
        assert_eq!(oracle.dynamic_income_barrier(), Some(14_000.0));
        assert_eq!(oracle.feature_count(), 2);
        assert_eq!(oracle.descriptor().name, "logistic_regression");
    }

    #[test]
    fn checked_probability_rejects_out_of_range() {
        assert!(checked_probability(0.3).is_ok());
        assert!(matches!(
            checked_probability(1.2),
            Err(OracleError::InvalidProbability(_))
        ));
        assert!(checked_probability(f64::NAN).is_err());
    }

    #[test]
    fn sigmoid_is_centered() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(10.0) > 0.99);
    }
}

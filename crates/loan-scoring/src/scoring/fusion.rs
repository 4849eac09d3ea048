use serde::{Deserialize, Serialize};

use super::numeric::{clamp01, round_to};

pub const FLOOR_REASON: &str = "High ML confidence with strong composite score";

/// Lifts confident applications that the blend would otherwise drag below the floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorRule {
    pub min_ml_probability: f64,
    pub min_composite_score: f64,
    pub floor_sci: f64,
}

impl Default for FloorRule {
    fn default() -> Self {
        Self {
            min_ml_probability: 0.82,
            min_composite_score: 60.0,
            floor_sci: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionPolicy {
    /// Share of the oracle probability in the blend. The composite gets the rest.
    pub ml_weight: f64,
    pub floor: FloorRule,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self {
            ml_weight: 0.6,
            floor: FloorRule::default(),
        }
    }
}

impl FusionPolicy {
    pub fn with_ml_weight(ml_weight: f64) -> Self {
        Self {
            ml_weight: clamp01(ml_weight),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorAdjustment {
    pub original_sci: f64,
    pub adjusted_sci: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub final_sci: f64,
    pub ml_weight: f64,
    pub composite_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_adjustment: Option<FloorAdjustment>,
}

pub fn fuse(policy: &FusionPolicy, ml_probability: f64, composite_score: f64) -> FusionResult {
    let ml_weight = clamp01(policy.ml_weight);
    let composite_weight = 1.0 - ml_weight;
    let ml_probability = clamp01(ml_probability);

    let blended = ml_weight * ml_probability + composite_weight * composite_score / 100.0;
    let mut final_sci = round_to(blended * 100.0, 2);

    let floor = &policy.floor;
    let mut floor_adjustment = None;
    if ml_probability >= floor.min_ml_probability
        && composite_score >= floor.min_composite_score
        && final_sci < floor.floor_sci
    {
        floor_adjustment = Some(FloorAdjustment {
            original_sci: final_sci,
            adjusted_sci: floor.floor_sci,
            reason: FLOOR_REASON.to_string(),
        });
        final_sci = floor.floor_sci;
    }

    FusionResult {
        final_sci,
        ml_weight,
        composite_weight,
        floor_adjustment,
    }
}

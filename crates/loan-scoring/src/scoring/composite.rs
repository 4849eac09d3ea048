use serde::{Deserialize, Serialize};

use super::numeric::round_to;
use super::pillars::{Pillar, PillarBreakdown, PillarScores, PillarWeights};

const NEUTRAL_BLEND: f64 = 0.5;

/// Rule-based score on a 0-100 scale, with the breakdown that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score: f64,
    pub score_01: f64,
    /// Weights actually applied, renormalised over the available pillars.
    pub normalized_weights: PillarWeights,
    pub breakdown: PillarBreakdown,
}

/// Rescale `weights` so the pillars present in `scores` sum to 1.
///
/// Returns `None` when no available pillar carries weight.
pub fn normalize_weights(weights: &PillarWeights, scores: &PillarScores) -> Option<PillarWeights> {
    let available = |pillar: Pillar| {
        if scores.get(pillar).is_some() {
            weights.get(pillar).max(0.0)
        } else {
            0.0
        }
    };
    let total: f64 = Pillar::ALL.iter().map(|pillar| available(*pillar)).sum();
    if total <= 0.0 {
        return None;
    }

    Some(PillarWeights {
        financial: available(Pillar::Financial) / total,
        repayment: available(Pillar::Repayment) / total,
        consumption: available(Pillar::Consumption) / total,
        history: available(Pillar::History) / total,
    })
}

pub fn aggregate(breakdown: PillarBreakdown) -> CompositeScore {
    let normalized = normalize_weights(&breakdown.weights, &breakdown.scores);

    let blended = match &normalized {
        Some(weights) => Pillar::ALL
            .iter()
            .filter_map(|pillar| {
                breakdown
                    .scores
                    .get(*pillar)
                    .map(|score| score * weights.get(*pillar))
            })
            .sum(),
        None => NEUTRAL_BLEND,
    };

    let adjustments = breakdown.adjustments;
    let penalised = blended * (1.0 - adjustments.fraud_penalty);
    let score_01 = (penalised + adjustments.fair_lending_bonus).min(1.0);

    CompositeScore {
        score: round_to(score_01 * 100.0, 2),
        score_01,
        normalized_weights: normalized.unwrap_or(PillarWeights {
            financial: 0.0,
            repayment: 0.0,
            consumption: 0.0,
            history: 0.0,
        }),
        breakdown,
    }
}

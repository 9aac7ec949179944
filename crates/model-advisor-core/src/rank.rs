use serde::Serialize;

use crate::model::ModelRecord;
use crate::normalize;

/// What produced a candidate's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Similarity,
    CostIndex,
    QualityIndex,
    Value,
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Similarity => write!(f, "similarity"),
            Self::CostIndex => write!(f, "cost index"),
            Self::QualityIndex => write!(f, "quality index"),
            Self::Value => write!(f, "value"),
        }
    }
}

/// A catalog entry paired with the score one recommendation call gave it.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate<'a> {
    pub model: &'a ModelRecord,
    pub score: f64,
    pub criterion: Criterion,
}

impl<'a> ScoredCandidate<'a> {
    pub fn new(model: &'a ModelRecord, score: f64, criterion: Criterion) -> Self {
        Self {
            model,
            score,
            criterion,
        }
    }
}

/// Benchmark points per unit of blended cost.
///
/// Unlike [`normalize::quality_index`], a missing benchmark counts as zero
/// here so every model gets a rank. Free models with any score rank above
/// all paid ones with a score of `f64::INFINITY`, which serializes to JSON
/// as `null`.
pub fn value(model: &ModelRecord) -> f64 {
    let points = model.mmlu().unwrap_or(0.0) + model.human_eval().unwrap_or(0.0);
    let cost = normalize::cost_index(model);
    if cost > 0.0 {
        points / cost
    } else if points > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Stable sort, highest score first; equal scores keep their input order.
///
/// Uses the IEEE total order, so a NaN score sorts above `INFINITY`
/// instead of corrupting the comparison.
pub fn sort_descending(candidates: &mut [ScoredCandidate<'_>]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Stable sort, lowest score first; equal scores keep their input order.
pub fn sort_ascending(candidates: &mut [ScoredCandidate<'_>]) {
    candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
}

/// Order models by [`value`], best first, ties in input order.
pub fn rank_by_value<'a, I>(models: I) -> Vec<ScoredCandidate<'a>>
where
    I: IntoIterator<Item = &'a ModelRecord>,
{
    let mut ranked: Vec<ScoredCandidate<'a>> = models
        .into_iter()
        .map(|m| ScoredCandidate::new(m, value(m), Criterion::Value))
        .collect();
    sort_descending(&mut ranked);
    ranked
}

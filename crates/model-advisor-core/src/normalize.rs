//! Comparable scalar features derived from a single [`ModelRecord`].

use std::collections::BTreeSet;

use crate::model::ModelRecord;

/// Blended price: mean of input and output cost per million tokens.
pub fn cost_index(model: &ModelRecord) -> f64 {
    (model.input_cost_per_1m + model.output_cost_per_1m) / 2.0
}

/// Mean of whichever of MMLU / HumanEval are present.
///
/// `None` when the model has neither; such models are left out of
/// quality comparisons instead of being scored as the worst.
pub fn quality_index(model: &ModelRecord) -> Option<f64> {
    let scores: Vec<f64> = [model.mmlu(), model.human_eval()]
        .into_iter()
        .flatten()
        .collect();
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

pub fn context_tier(model: &ModelRecord) -> u64 {
    model.context_window
}

pub fn capabilities(model: &ModelRecord) -> &BTreeSet<String> {
    &model.tags
}

/// All derived features of one model, computed together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features {
    pub cost_index: f64,
    pub quality_index: Option<f64>,
    pub context_tier: u64,
}

impl Features {
    pub fn of(model: &ModelRecord) -> Self {
        Self {
            cost_index: cost_index(model),
            quality_index: quality_index(model),
            context_tier: context_tier(model),
        }
    }
}

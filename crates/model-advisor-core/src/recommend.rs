//! The four recommendation modes: similar, cheaper, better, and scenario match.
//!
//! Every operation is a pure function of the catalog slice and its inputs.
//! No operation fails: an empty catalog, a reference model that lacks the
//! signal an operation needs, or a requirement nothing satisfies all yield an
//! empty list.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::ScoringConfig;
use crate::filter::{self, RequirementSpec};
use crate::model::ModelRecord;
use crate::normalize::Features;
use crate::rank::{self, Criterion, ScoredCandidate};
use crate::similarity;

/// Recommendation engine bound to one set of scoring constants.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    config: ScoringConfig,
}

impl Recommender {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Models most like `model`, best match first. Never includes `model` itself.
    pub fn find_similar<'a>(
        &self,
        model: &ModelRecord,
        catalog: &'a [ModelRecord],
        limit: usize,
    ) -> Vec<ScoredCandidate<'a>> {
        let weights = &self.config.similarity;
        let mut scored: Vec<ScoredCandidate<'a>> = catalog
            .iter()
            .filter(|c| c.id != model.id)
            .map(|c| {
                ScoredCandidate::new(
                    c,
                    similarity::similarity(model, c, weights),
                    Criterion::Similarity,
                )
            })
            .collect();
        rank::sort_descending(&mut scored);
        scored.truncate(limit);
        tracing::debug!(reference = %model.id, results = scored.len(), "find_similar");
        scored
    }

    /// Cheaper models that keep most of the reference quality, cheapest first.
    ///
    /// A candidate must cost less than the reference but no less than
    /// `cheaper_min_cost_ratio` of it, and reach `cheaper_min_quality_ratio`
    /// of its quality index. Models without a quality index never qualify.
    pub fn find_cheaper_alternatives<'a>(
        &self,
        model: &ModelRecord,
        catalog: &'a [ModelRecord],
        limit: usize,
    ) -> Vec<ScoredCandidate<'a>> {
        let reference = Features::of(model);
        let Some(ref_quality) = reference.quality_index else {
            tracing::debug!(reference = %model.id, "no quality index, skipping cheaper alternatives");
            return Vec::new();
        };
        let floor = reference.cost_index * self.config.cheaper_min_cost_ratio;
        let min_quality = ref_quality * self.config.cheaper_min_quality_ratio;

        let mut scored: Vec<ScoredCandidate<'a>> = catalog
            .iter()
            .filter(|c| c.id != model.id)
            .filter_map(|c| {
                let f = Features::of(c);
                let quality = f.quality_index?;
                let in_band = f.cost_index < reference.cost_index && f.cost_index >= floor;
                (in_band && quality >= min_quality)
                    .then(|| ScoredCandidate::new(c, f.cost_index, Criterion::CostIndex))
            })
            .collect();
        rank::sort_ascending(&mut scored);
        scored.truncate(limit);
        tracing::debug!(reference = %model.id, results = scored.len(), "find_cheaper_alternatives");
        scored
    }

    /// Higher-quality models whose cost stays within
    /// `max_budget_increase_percent` of the reference, best first.
    pub fn find_better_performance<'a>(
        &self,
        model: &ModelRecord,
        catalog: &'a [ModelRecord],
        max_budget_increase_percent: f64,
        limit: usize,
    ) -> Vec<ScoredCandidate<'a>> {
        let reference = Features::of(model);
        let Some(ref_quality) = reference.quality_index else {
            tracing::debug!(reference = %model.id, "no quality index, skipping better performance");
            return Vec::new();
        };
        let ceiling = reference.cost_index * (1.0 + max_budget_increase_percent / 100.0);

        let mut scored: Vec<ScoredCandidate<'a>> = catalog
            .iter()
            .filter(|c| c.id != model.id)
            .filter_map(|c| {
                let f = Features::of(c);
                let quality = f.quality_index?;
                (quality > ref_quality && f.cost_index <= ceiling)
                    .then(|| ScoredCandidate::new(c, quality, Criterion::QualityIndex))
            })
            .collect();
        rank::sort_descending(&mut scored);
        scored.truncate(limit);
        tracing::debug!(reference = %model.id, results = scored.len(), "find_better_performance");
        scored
    }

    /// Models that satisfy every requirement, ranked by value.
    pub fn match_scenario<'a>(
        &self,
        requirements: &RequirementSpec,
        catalog: &'a [ModelRecord],
        limit: usize,
    ) -> Vec<ScoredCandidate<'a>> {
        let share = self.config.input_token_share;
        let admitted = catalog.iter().filter(|m| match filter::check(m, requirements, share) {
            Ok(()) => true,
            Err(reason) => {
                tracing::trace!(model = %m.id, %reason, "rejected");
                false
            }
        });
        let mut ranked = rank::rank_by_value(admitted);
        ranked.truncate(limit);
        tracing::debug!(results = ranked.len(), "match_scenario");
        ranked
    }

    /// Estimated monthly spend for `model` under this config's token split.
    pub fn monthly_cost(&self, model: &ModelRecord, tokens_per_month: u64) -> f64 {
        filter::estimate_monthly_cost(model, tokens_per_month, self.config.input_token_share)
    }

    /// Side-by-side comparison of `b` against `a`.
    pub fn compare(&self, a: &ModelRecord, b: &ModelRecord) -> Comparison {
        let fa = Features::of(a);
        let fb = Features::of(b);
        Comparison {
            a: a.id.clone(),
            b: b.id.clone(),
            cost_delta: fb.cost_index - fa.cost_index,
            cost_ratio: (fa.cost_index > 0.0).then(|| fb.cost_index / fa.cost_index),
            quality_delta: fa.quality_index.zip(fb.quality_index).map(|(qa, qb)| qb - qa),
            context_ratio: (fa.context_tier > 0)
                .then(|| fb.context_tier as f64 / fa.context_tier as f64),
            shared_tags: a.tags.intersection(&b.tags).cloned().collect(),
            only_a: a.tags.difference(&b.tags).cloned().collect(),
            only_b: b.tags.difference(&a.tags).cloned().collect(),
            similarity: similarity::similarity(a, b, &self.config.similarity),
        }
    }
}

/// How model `b` stands relative to model `a`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub a: String,
    pub b: String,
    /// `cost(b) - cost(a)`.
    pub cost_delta: f64,
    /// `cost(b) / cost(a)`; `None` when `a` is free.
    pub cost_ratio: Option<f64>,
    /// `quality(b) - quality(a)`; `None` unless both have a quality index.
    pub quality_delta: Option<f64>,
    pub context_ratio: Option<f64>,
    pub shared_tags: BTreeSet<String>,
    pub only_a: BTreeSet<String>,
    pub only_b: BTreeSet<String>,
    pub similarity: f64,
}

/// [`Recommender::find_similar`] with default scoring constants.
pub fn find_similar<'a>(
    model: &ModelRecord,
    catalog: &'a [ModelRecord],
    limit: usize,
) -> Vec<ScoredCandidate<'a>> {
    Recommender::default().find_similar(model, catalog, limit)
}

/// [`Recommender::find_cheaper_alternatives`] with default scoring constants.
pub fn find_cheaper_alternatives<'a>(
    model: &ModelRecord,
    catalog: &'a [ModelRecord],
    limit: usize,
) -> Vec<ScoredCandidate<'a>> {
    Recommender::default().find_cheaper_alternatives(model, catalog, limit)
}

/// [`Recommender::find_better_performance`] with default scoring constants.
pub fn find_better_performance<'a>(
    model: &ModelRecord,
    catalog: &'a [ModelRecord],
    max_budget_increase_percent: f64,
    limit: usize,
) -> Vec<ScoredCandidate<'a>> {
    Recommender::default().find_better_performance(model, catalog, max_budget_increase_percent, limit)
}

/// [`Recommender::match_scenario`] with default scoring constants.
pub fn match_scenario<'a>(
    requirements: &RequirementSpec,
    catalog: &'a [ModelRecord],
    limit: usize,
) -> Vec<ScoredCandidate<'a>> {
    Recommender::default().match_scenario(requirements, catalog, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Benchmarks;

    fn model(id: &str, cost: f64, quality: Option<f64>) -> ModelRecord {
        ModelRecord {
            id: id.into(),
            name: id.into(),
            provider: "p".into(),
            context_window: 32_000,
            input_cost_per_1m: cost,
            output_cost_per_1m: cost,
            tags: BTreeSet::new(),
            best_for: BTreeSet::new(),
            benchmarks: quality.map(|q| Benchmarks {
                mmlu: Some(q),
                human_eval: None,
                speed: None,
            }),
        }
    }

    #[test]
    fn custom_thresholds_change_cheaper_band() {
        let reference = model("ref", 10.0, Some(80.0));
        let catalog = vec![reference.clone(), model("half", 5.0, Some(80.0))];

        assert!(find_cheaper_alternatives(&reference, &catalog, 5).is_empty());

        let loose = Recommender::new(ScoringConfig {
            cheaper_min_cost_ratio: 0.4,
            ..ScoringConfig::default()
        });
        let found = loose.find_cheaper_alternatives(&reference, &catalog, 5);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].model.id, "half");
        assert_eq!(found[0].criterion, Criterion::CostIndex);
    }

    #[test]
    fn better_performance_ignores_unbenchmarked() {
        let reference = model("ref", 10.0, Some(70.0));
        let catalog = vec![model("unknown", 10.0, None), model("good", 12.0, Some(80.0))];
        let found = find_better_performance(&reference, &catalog, 50.0, 5);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].model.id, "good");
        assert_eq!(found[0].score, 80.0);
    }

    #[test]
    fn limit_zero_returns_nothing() {
        let reference = model("ref", 10.0, Some(70.0));
        let catalog = vec![model("a", 10.0, Some(70.0))];
        assert!(find_similar(&reference, &catalog, 0).is_empty());
    }

    #[test]
    fn compare_reports_deltas() {
        let mut a = model("a", 2.0, Some(70.0));
        let mut b = model("b", 3.0, Some(80.0));
        a.tags = ["chat", "code"].iter().map(|t| t.to_string()).collect();
        b.tags = ["chat", "vision"].iter().map(|t| t.to_string()).collect();
        b.context_window = 64_000;

        let cmp = Recommender::default().compare(&a, &b);
        assert!((cmp.cost_delta - 1.0).abs() < 1e-12);
        assert_eq!(cmp.cost_ratio, Some(1.5));
        assert_eq!(cmp.quality_delta, Some(10.0));
        assert_eq!(cmp.context_ratio, Some(2.0));
        assert!(cmp.shared_tags.contains("chat"));
        assert!(cmp.only_a.contains("code"));
        assert!(cmp.only_b.contains("vision"));
    }

    #[test]
    fn compare_without_quality_leaves_delta_empty() {
        let a = model("a", 0.0, None);
        let b = model("b", 1.0, Some(80.0));
        let cmp = Recommender::default().compare(&a, &b);
        assert_eq!(cmp.quality_delta, None);
        assert_eq!(cmp.cost_ratio, None);
    }

    #[test]
    fn monthly_cost_follows_config_share() {
        let mut m = model("m", 0.0, None);
        m.input_cost_per_1m = 1.0;
        m.output_cost_per_1m = 3.0;
        let all_input = Recommender::new(ScoringConfig {
            input_token_share: 1.0,
            ..ScoringConfig::default()
        });
        assert!((all_input.monthly_cost(&m, 2_000_000) - 2.0).abs() < 1e-9);
        // Default 40/60: 0.4 * 1 + 0.6 * 3 = 2.2 per million
        assert!((Recommender::default().monthly_cost(&m, 1_000_000) - 2.2).abs() < 1e-9);
    }
}

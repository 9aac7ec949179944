use crate::config::SimilarityWeights;
use crate::model::ModelRecord;

/// 1.0 for identical windows, approaching 0.0 as they diverge.
/// Two zero-sized windows count as identical.
pub fn context_proximity(a: u64, b: u64) -> f64 {
    let max = a.max(b);
    if max == 0 {
        return 1.0;
    }
    1.0 - a.abs_diff(b) as f64 / max as f64
}

/// Sum of per-benchmark proximities over fields present on both sides,
/// each already multiplied by `weight`. Missing fields add nothing.
pub fn benchmark_proximity(a: &ModelRecord, b: &ModelRecord, weight: f64) -> f64 {
    [(a.mmlu(), b.mmlu()), (a.human_eval(), b.human_eval())]
        .into_iter()
        .filter_map(|pair| match pair {
            (Some(x), Some(y)) => Some((1.0 - (x - y).abs() / 100.0) * weight),
            _ => None,
        })
        .sum()
}

/// Shared tags over the larger tag set. 0.0 when both are empty.
pub fn tag_overlap(a: &ModelRecord, b: &ModelRecord) -> f64 {
    let max = a.tags.len().max(b.tags.len());
    if max == 0 {
        return 0.0;
    }
    a.tags.intersection(&b.tags).count() as f64 / max as f64
}

/// Unnormalized similarity; only the relative order between candidates matters.
pub fn similarity(a: &ModelRecord, b: &ModelRecord, weights: &SimilarityWeights) -> f64 {
    context_proximity(a.context_window, b.context_window) * weights.context
        + benchmark_proximity(a, b, weights.benchmark)
        + tag_overlap(a, b) * weights.tags
}

use std::collections::BTreeSet;

use model_advisor_core::catalog::load_bundled_catalog;
use model_advisor_core::filter::estimate_monthly_cost;
use model_advisor_core::model::{Benchmarks, ModelRecord};
use model_advisor_core::{match_scenario, Criterion, Recommender, RequirementSpec, ScoringConfig};

fn make_model(
    id: &str,
    provider: &str,
    ctx: u64,
    input: f64,
    output: f64,
    tags: &[&str],
    mmlu: Option<f64>,
) -> ModelRecord {
    ModelRecord {
        id: id.to_string(),
        name: id.to_string(),
        provider: provider.to_string(),
        context_window: ctx,
        input_cost_per_1m: input,
        output_cost_per_1m: output,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        best_for: BTreeSet::new(),
        benchmarks: mmlu.map(|m| Benchmarks {
            mmlu: Some(m),
            human_eval: None,
            speed: None,
        }),
    }
}

fn requirements(budget: f64, tokens: u64, min_ctx: u64, caps: &[&str]) -> RequirementSpec {
    RequirementSpec {
        monthly_budget: budget,
        expected_tokens_per_month: tokens,
        min_context_length: min_ctx,
        required_capabilities: caps.iter().map(|c| c.to_string()).collect(),
        preferred_providers: Vec::new(),
    }
}

#[test]
fn small_context_model_is_excluded() {
    let a = make_model("a", "x", 4096, 1.0, 2.0, &["chat"], Some(70.0));
    let b = make_model("b", "x", 128_000, 0.5, 1.5, &["chat", "code"], Some(85.0));
    let catalog = vec![a, b];

    let req = requirements(50.0, 10_000_000, 8000, &["chat"]);
    let results = match_scenario(&req, &catalog, 5);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].model.id, "b");
    assert_eq!(results[0].criterion, Criterion::Value);
    // (85 + 0) / 1.0
    assert!((results[0].score - 85.0).abs() < 1e-9);
}

#[test]
fn ranks_by_value_descending() {
    let catalog = vec![
        make_model("pricey", "x", 8000, 10.0, 10.0, &["chat"], Some(90.0)),
        make_model("bargain", "x", 8000, 1.0, 1.0, &["chat"], Some(70.0)),
        make_model("middle", "x", 8000, 2.0, 2.0, &["chat"], Some(80.0)),
    ];
    let req = requirements(1000.0, 1_000_000, 0, &[]);
    let results = match_scenario(&req, &catalog, 5);
    let ids: Vec<&str> = results.iter().map(|c| c.model.id.as_str()).collect();
    assert_eq!(ids, vec!["bargain", "middle", "pricey"]);
}

#[test]
fn equal_value_keeps_catalog_order() {
    let catalog = vec![
        make_model("z", "x", 8000, 2.0, 2.0, &[], Some(80.0)),
        make_model("y", "x", 8000, 1.0, 1.0, &[], Some(40.0)),
        make_model("x", "x", 8000, 4.0, 4.0, &[], Some(80.0)),
    ];
    // Values: 40, 40, 20
    let req = requirements(1000.0, 1000, 0, &[]);
    let results = match_scenario(&req, &catalog, 5);
    let ids: Vec<&str> = results.iter().map(|c| c.model.id.as_str()).collect();
    assert_eq!(ids, vec!["z", "y", "x"]);

    let reversed: Vec<ModelRecord> = catalog.iter().take(2).rev().cloned().collect();
    let results = match_scenario(&req, &reversed, 5);
    let ids: Vec<&str> = results.iter().map(|c| c.model.id.as_str()).collect();
    assert_eq!(ids, vec!["y", "z"]);
}

#[test]
fn unbenchmarked_models_rank_last_but_still_match() {
    let catalog = vec![
        make_model("mystery", "x", 8000, 0.1, 0.1, &["chat"], None),
        make_model("known", "x", 8000, 5.0, 5.0, &["chat"], Some(60.0)),
    ];
    let req = requirements(1000.0, 1000, 0, &["chat"]);
    let results = match_scenario(&req, &catalog, 5);
    let ids: Vec<&str> = results.iter().map(|c| c.model.id.as_str()).collect();
    assert_eq!(ids, vec!["known", "mystery"]);
    assert_eq!(results[1].score, 0.0);
}

#[test]
fn preferred_providers_restrict_results() {
    let catalog = load_bundled_catalog().unwrap();
    let mut req = requirements(1_000_000.0, 1_000_000, 0, &[]);
    req.preferred_providers = vec!["anthropic".to_string(), "google".to_string()];
    let results = match_scenario(&req, catalog.models(), catalog.len());
    assert!(!results.is_empty());
    assert!(results
        .iter()
        .all(|c| c.model.provider == "anthropic" || c.model.provider == "google"));
}

#[test]
fn every_match_satisfies_requirements() {
    let catalog = load_bundled_catalog().unwrap();
    let cases = [
        requirements(50.0, 10_000_000, 100_000, &["chat"]),
        requirements(5.0, 20_000_000, 0, &["code"]),
        requirements(500.0, 5_000_000, 200_000, &["chat", "vision"]),
        requirements(0.0, 1_000_000, 0, &[]),
    ];
    for req in &cases {
        let results = match_scenario(req, catalog.models(), catalog.len());
        for c in &results {
            let m = c.model;
            assert!(m.context_window >= req.min_context_length, "{}: context", m.id);
            for cap in &req.required_capabilities {
                assert!(m.has_tag(cap), "{}: missing {cap}", m.id);
            }
            let cost = estimate_monthly_cost(m, req.expected_tokens_per_month, 0.4);
            assert!(cost <= req.monthly_budget, "{}: ${cost:.2} over budget", m.id);
        }
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn negative_budget_matches_nothing() {
    let catalog = load_bundled_catalog().unwrap();
    let req = requirements(-1.0, 0, 0, &[]);
    assert!(match_scenario(&req, catalog.models(), 5).is_empty());
}

#[test]
fn empty_catalog_matches_nothing() {
    let req = requirements(100.0, 1000, 0, &[]);
    assert!(match_scenario(&req, &[], 5).is_empty());
}

#[test]
fn input_share_changes_budget_outcome() {
    // Cheap input, expensive output.
    let m = make_model("m", "x", 8000, 1.0, 9.0, &[], Some(80.0));
    let catalog = vec![m];
    let req = requirements(5.0, 1_000_000, 0, &[]);

    // Default 40/60: 0.4 + 5.4 = 5.8 > 5
    assert!(match_scenario(&req, &catalog, 5).is_empty());

    let input_heavy = Recommender::new(ScoringConfig {
        input_token_share: 0.9,
        ..ScoringConfig::default()
    });
    // 0.9 + 0.9 = 1.8 <= 5
    assert_eq!(input_heavy.match_scenario(&req, &catalog, 5).len(), 1);
}

#[test]
fn limit_truncates_after_ranking() {
    let catalog = load_bundled_catalog().unwrap();
    let req = requirements(1_000_000.0, 1_000_000, 0, &[]);
    let all = match_scenario(&req, catalog.models(), catalog.len());
    let top = match_scenario(&req, catalog.models(), 3);
    assert_eq!(top.len(), 3);
    for (a, b) in top.iter().zip(all.iter()) {
        assert_eq!(a.model.id, b.model.id);
    }
}

#[test]
fn repeated_scenarios_are_identical() {
    let catalog = load_bundled_catalog().unwrap();
    let mut req = requirements(200.0, 10_000_000, 32_000, &["chat"]);
    req.preferred_providers = vec!["openai".to_string(), "mistral".to_string(), "meta".to_string()];
    let run = || -> Vec<(String, f64)> {
        match_scenario(&req, catalog.models(), catalog.len())
            .iter()
            .map(|c| (c.model.id.clone(), c.score))
            .collect()
    };
    let first = run();
    assert!(!first.is_empty());
    for _ in 0..5 {
        assert_eq!(run(), first);
    }
}

use wasm_bindgen::prelude::*;

use model_advisor_core::catalog::{self, Catalog};
use model_advisor_core::config::{self, ScoringConfig};
use model_advisor_core::model::ModelRecord;
use model_advisor_core::{Recommender, RequirementSpec, ScoredCandidate};

// ---------------------------------------------------------------------------
// Input decoding
// ---------------------------------------------------------------------------

fn decode_catalog(catalog: JsValue) -> Option<Vec<ModelRecord>> {
    let models: Vec<ModelRecord> = serde_wasm_bindgen::from_value(catalog).ok()?;
    // Re-wrap to enforce unique ids.
    Catalog::new(models).ok().map(|c| c.models().to_vec())
}

/// `null`/`undefined` config means defaults; a TOML string overrides.
fn decode_config(config_toml: Option<String>) -> Option<ScoringConfig> {
    match config_toml {
        None => Some(ScoringConfig::default()),
        Some(s) => config::parse_config(&s).ok(),
    }
}

fn find<'a>(models: &'a [ModelRecord], id: &str) -> Option<&'a ModelRecord> {
    models.iter().find(|m| m.id == id)
}

fn encode(results: &[ScoredCandidate<'_>]) -> JsValue {
    serde_wasm_bindgen::to_value(results).unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The catalog bundled with this build, as an array of model records.
#[wasm_bindgen]
pub fn bundled_catalog() -> JsValue {
    match catalog::load_bundled_catalog() {
        Ok(c) => serde_wasm_bindgen::to_value(c.models()).unwrap_or(JsValue::NULL),
        Err(_) => JsValue::NULL,
    }
}

/// Parse a catalog TOML string into an array of model records, or null.
#[wasm_bindgen]
pub fn parse_catalog_toml(toml: &str) -> JsValue {
    match catalog::parse_catalog(toml) {
        Ok(c) => serde_wasm_bindgen::to_value(c.models()).unwrap_or(JsValue::NULL),
        Err(_) => JsValue::NULL,
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Models most similar to `model_id`. Returns an array of
/// `{ model, score, criterion }`, or null on bad input.
#[wasm_bindgen]
pub fn find_similar(
    catalog: JsValue,
    model_id: &str,
    limit: usize,
    config_toml: Option<String>,
) -> JsValue {
    let (Some(models), Some(cfg)) = (decode_catalog(catalog), decode_config(config_toml)) else {
        return JsValue::NULL;
    };
    let Some(reference) = find(&models, model_id) else {
        return JsValue::NULL;
    };
    encode(&Recommender::new(cfg).find_similar(reference, &models, limit))
}

#[wasm_bindgen]
pub fn find_cheaper_alternatives(
    catalog: JsValue,
    model_id: &str,
    limit: usize,
    config_toml: Option<String>,
) -> JsValue {
    let (Some(models), Some(cfg)) = (decode_catalog(catalog), decode_config(config_toml)) else {
        return JsValue::NULL;
    };
    let Some(reference) = find(&models, model_id) else {
        return JsValue::NULL;
    };
    encode(&Recommender::new(cfg).find_cheaper_alternatives(reference, &models, limit))
}

/// `max_budget_increase_percent` of `undefined` uses the configured default.
#[wasm_bindgen]
pub fn find_better_performance(
    catalog: JsValue,
    model_id: &str,
    max_budget_increase_percent: Option<f64>,
    limit: usize,
    config_toml: Option<String>,
) -> JsValue {
    let (Some(models), Some(cfg)) = (decode_catalog(catalog), decode_config(config_toml)) else {
        return JsValue::NULL;
    };
    let Some(reference) = find(&models, model_id) else {
        return JsValue::NULL;
    };
    let advisor = Recommender::new(cfg);
    let pct = max_budget_increase_percent.unwrap_or(advisor.config().max_budget_increase_percent);
    encode(&advisor.find_better_performance(reference, &models, pct, limit))
}

/// `requirements` is a `RequirementSpec` object
/// (`monthly_budget`, `expected_tokens_per_month`, ...).
#[wasm_bindgen]
pub fn match_scenario(
    requirements: JsValue,
    catalog: JsValue,
    limit: usize,
    config_toml: Option<String>,
) -> JsValue {
    let Ok(req) = serde_wasm_bindgen::from_value::<RequirementSpec>(requirements) else {
        return JsValue::NULL;
    };
    let (Some(models), Some(cfg)) = (decode_catalog(catalog), decode_config(config_toml)) else {
        return JsValue::NULL;
    };
    encode(&Recommender::new(cfg).match_scenario(&req, &models, limit))
}

// ---------------------------------------------------------------------------
// Cost utilities
// ---------------------------------------------------------------------------

/// Estimated monthly cost for one model record, or NaN on bad input.
/// `tokens` is f64 to avoid BigInt on the JS side.
#[wasm_bindgen]
pub fn monthly_cost(model: JsValue, tokens: f64, config_toml: Option<String>) -> f64 {
    let Ok(m) = serde_wasm_bindgen::from_value::<ModelRecord>(model) else {
        return f64::NAN;
    };
    let Some(cfg) = decode_config(config_toml) else {
        return f64::NAN;
    };
    Recommender::new(cfg).monthly_cost(&m, tokens.max(0.0) as u64)
}

/// Format a context window as "128K", "1M", etc.
#[wasm_bindgen]
pub fn fmt_context(tokens: f64) -> String {
    ModelRecord::fmt_context(tokens.max(0.0) as u64)
}

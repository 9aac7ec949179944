use serde::{Deserialize, Serialize};

use crate::model::ModelRecord;
use crate::normalize;

/// What a user says they need. Not validated: a negative budget simply
/// admits nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementSpec {
    pub monthly_budget: f64,
    pub expected_tokens_per_month: u64,
    #[serde(default)]
    pub min_context_length: u64,
    /// All of these must appear in a candidate's tags.
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    /// Allow-list of providers; empty means any provider.
    #[serde(default)]
    pub preferred_providers: Vec<String>,
}

/// Estimated monthly spend for `tokens`, with `input_share` of them billed as
/// input and the remainder as output.
pub fn estimate_monthly_cost(model: &ModelRecord, tokens: u64, input_share: f64) -> f64 {
    let tokens = tokens as f64;
    let input_tokens = tokens * input_share;
    let output_tokens = tokens * (1.0 - input_share);
    model.input_cost_per_1m * input_tokens / 1e6 + model.output_cost_per_1m * output_tokens / 1e6
}

/// Why a model was turned away. Only the first failing check is reported.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    ContextTooSmall { have: u64, need: u64 },
    MissingCapability(String),
    ProviderNotPreferred(String),
    OverBudget { cost: f64, budget: f64 },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContextTooSmall { have, need } => {
                write!(f, "context window {have} below required {need}")
            }
            Self::MissingCapability(cap) => write!(f, "missing capability '{cap}'"),
            Self::ProviderNotPreferred(p) => write!(f, "provider '{p}' not in preferred list"),
            Self::OverBudget { cost, budget } => {
                write!(f, "estimated ${cost:.2}/month exceeds budget ${budget:.2}")
            }
        }
    }
}

/// Strict pass/fail admission check.
pub fn check(model: &ModelRecord, req: &RequirementSpec, input_share: f64) -> Result<(), Rejection> {
    let context = normalize::context_tier(model);
    if context < req.min_context_length {
        return Err(Rejection::ContextTooSmall {
            have: context,
            need: req.min_context_length,
        });
    }
    let capabilities = normalize::capabilities(model);
    if let Some(cap) = req
        .required_capabilities
        .iter()
        .find(|cap| !capabilities.contains(cap.as_str()))
    {
        return Err(Rejection::MissingCapability(cap.clone()));
    }
    if !req.preferred_providers.is_empty()
        && !req.preferred_providers.iter().any(|p| *p == model.provider)
    {
        return Err(Rejection::ProviderNotPreferred(model.provider.clone()));
    }
    let cost = estimate_monthly_cost(model, req.expected_tokens_per_month, input_share);
    // NaN costs fail this check.
    if !(cost <= req.monthly_budget) {
        return Err(Rejection::OverBudget {
            cost,
            budget: req.monthly_budget,
        });
    }
    Ok(())
}

pub fn admits(model: &ModelRecord, req: &RequirementSpec, input_share: f64) -> bool {
    check(model, req, input_share).is_ok()
}

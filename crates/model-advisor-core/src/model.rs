use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One catalog entry. Owned by whoever supplies the catalog; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub context_window: u64,
    pub input_cost_per_1m: f64,
    pub output_cost_per_1m: f64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub best_for: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmarks: Option<Benchmarks>,
}

/// Published benchmark results. Absent fields mean "not measured", not zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Benchmarks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mmlu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_eval: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Speed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Fast,
    Medium,
    Slow,
}

impl std::fmt::Display for Speed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Medium => write!(f, "medium"),
            Self::Slow => write!(f, "slow"),
        }
    }
}

impl ModelRecord {
    pub fn mmlu(&self) -> Option<f64> {
        self.benchmarks.as_ref().and_then(|b| b.mmlu)
    }

    pub fn human_eval(&self) -> Option<f64> {
        self.benchmarks.as_ref().and_then(|b| b.human_eval)
    }

    pub fn speed(&self) -> Option<Speed> {
        self.benchmarks.as_ref().and_then(|b| b.speed)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Format a context window as "128K", "1M", "4K", etc.
    pub fn fmt_context(tokens: u64) -> String {
        let f = tokens as f64;
        let k = (f / 1e3).round();
        if k >= 1000.0 {
            // One decimal place, rounded before deciding whether to show it.
            let m = (f / 1e5).round() / 10.0;
            if m.fract() == 0.0 {
                format!("{:.0}M", m)
            } else {
                format!("{:.1}M", m)
            }
        } else if f >= 1e3 {
            format!("{:.0}K", k)
        } else {
            tokens.to_string()
        }
    }

    /// Format a per-million price: "$0.15", "$15.00", "free".
    pub fn fmt_price(price: f64) -> String {
        if price == 0.0 {
            "free".to_string()
        } else if price < 0.1 {
            format!("${:.3}", price)
        } else {
            format!("${:.2}", price)
        }
    }
}

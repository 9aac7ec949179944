use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::Style;
use model_advisor_core::{
    catalog::{self, Catalog},
    config::{self, ScoringConfig},
    filter::RequirementSpec,
    model::ModelRecord,
    normalize::{self, Features},
    Criterion, Recommender, ScoredCandidate,
};
use tracing_subscriber::EnvFilter;

// ── Palette ──────────────────────────────────────────────────────────

fn s_header() -> Style { Style::new().color256(252).bold() }  // bright gray, bold
fn s_dim() -> Style    { Style::new().color256(248) }         // light gray
fn s_tree() -> Style   { Style::new().color256(245) }         // mid gray
fn s_hint() -> Style   { Style::new().color256(243) }         // soft gray
fn s_good() -> Style   { Style::new().color256(114) }         // green
fn s_warn() -> Style   { Style::new().color256(214) }         // amber
fn s_err() -> Style    { Style::new().color256(167) }         // red
fn s_price() -> Style  { Style::new().color256(109) }         // teal
fn s_bold() -> Style   { Style::new().bold() }
fn s_label() -> Style  { Style::new().color256(146) }         // muted lavender

fn sep(width: usize) -> String {
    s_tree().apply_to("\u{2500}".repeat(width)).to_string()
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).fg(Color::AnsiValue(243))
}

fn fmt_quality(q: Option<f64>) -> String {
    q.map(|q| format!("{q:.1}")).unwrap_or_else(|| "\u{2500}".to_string())
}

fn fmt_money(v: f64) -> String {
    if v >= 100.0 {
        format!("${v:.0}")
    } else {
        format!("${v:.2}")
    }
}

// ── CLI Args ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "model-advisor",
    about = "Browse a catalog of language models, compare them, get recommendations",
    version,
    after_help = "examples:\n  \
        model-advisor list --provider anthropic\n  \
        model-advisor show gpt-4o\n  \
        model-advisor similar gpt-4o\n  \
        model-advisor cheaper claude-3-5-sonnet\n  \
        model-advisor better gpt-4o-mini --increase 100\n  \
        model-advisor match --budget 50 --tokens 10000000 --min-context 100000 -c chat\n  \
        model-advisor compare gpt-4o claude-3-5-sonnet\n  \
        model-advisor cost deepseek-v3 --tokens 50000000"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Catalog file (.toml or .json). Defaults to the cached or bundled catalog.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Scoring config (TOML). Defaults to built-in constants.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, short, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog models.
    List {
        #[arg(long, short)]
        provider: Option<String>,
        #[arg(long, short)]
        tag: Option<String>,
        /// Substring match on id, name, provider, or use case.
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Details for one model.
    Show { model: String },
    /// Models most similar to a given one.
    Similar {
        model: String,
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Cheaper models of comparable quality.
    Cheaper {
        model: String,
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Better models within a budget increase.
    Better {
        model: String,
        /// Allowed cost increase over the reference, in percent.
        #[arg(long)]
        increase: Option<f64>,
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Models matching a usage scenario, ranked by value.
    Match {
        /// Monthly budget in USD.
        #[arg(long)]
        budget: f64,
        /// Expected tokens per month.
        #[arg(long)]
        tokens: u64,
        #[arg(long, default_value_t = 0)]
        min_context: u64,
        /// Required capability tag; repeat for more (all must match).
        #[arg(long = "capability", short = 'c')]
        capabilities: Vec<String>,
        /// Allowed provider; repeat for more.
        #[arg(long = "provider", short = 'p')]
        providers: Vec<String>,
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Compare two models side by side.
    Compare { a: String, b: String },
    /// Estimated monthly cost for a model.
    Cost {
        model: String,
        #[arg(long)]
        tokens: u64,
    },
    /// Download a catalog TOML into the local cache.
    #[cfg(feature = "network")]
    Sync { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    #[cfg(feature = "network")]
    if let Some(Commands::Sync { url }) = &cli.command {
        return cmd_sync(url).await;
    }

    let catalog = load_catalog(cli.catalog.as_deref())?;
    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ScoringConfig::default(),
    };
    tracing::debug!(models = catalog.len(), "catalog ready");
    let advisor = Recommender::new(config);
    let default_limit = advisor.config().default_limit;

    match cli.command {
        None => cmd_list(&catalog, None, None, None, cli.json)?,
        Some(Commands::List {
            provider,
            tag,
            search,
        }) => cmd_list(
            &catalog,
            provider.as_deref(),
            tag.as_deref(),
            search.as_deref(),
            cli.json,
        )?,
        Some(Commands::Show { model }) => cmd_show(&catalog, &advisor, &model, cli.json)?,
        Some(Commands::Similar { model, limit }) => {
            let reference = catalog.require(&model)?;
            let results =
                advisor.find_similar(reference, catalog.models(), limit.unwrap_or(default_limit));
            print_results(&format!("similar to {}", reference.id), &results, None, cli.json)?;
        }
        Some(Commands::Cheaper { model, limit }) => {
            let reference = catalog.require(&model)?;
            let results = advisor.find_cheaper_alternatives(
                reference,
                catalog.models(),
                limit.unwrap_or(default_limit),
            );
            if normalize::quality_index(reference).is_none() && !cli.json {
                eprintln!(
                    "{}",
                    s_warn().apply_to(format!("{} has no benchmarks; cannot judge quality", reference.id))
                );
            }
            print_results(&format!("cheaper than {}", reference.id), &results, None, cli.json)?;
        }
        Some(Commands::Better {
            model,
            increase,
            limit,
        }) => {
            let reference = catalog.require(&model)?;
            let pct = increase.unwrap_or(advisor.config().max_budget_increase_percent);
            let results = advisor.find_better_performance(
                reference,
                catalog.models(),
                pct,
                limit.unwrap_or(default_limit),
            );
            print_results(
                &format!("better than {} (cost +{pct:.0}% max)", reference.id),
                &results,
                None,
                cli.json,
            )?;
        }
        Some(Commands::Match {
            budget,
            tokens,
            min_context,
            capabilities,
            providers,
            limit,
        }) => {
            let req = RequirementSpec {
                monthly_budget: budget,
                expected_tokens_per_month: tokens,
                min_context_length: min_context,
                required_capabilities: capabilities,
                preferred_providers: providers,
            };
            let results =
                advisor.match_scenario(&req, catalog.models(), limit.unwrap_or(default_limit));
            let title = format!(
                "scenario: {} / month, {} tokens",
                fmt_money(budget),
                ModelRecord::fmt_context(tokens)
            );
            print_results(&title, &results, Some((&advisor, tokens)), cli.json)?;
        }
        Some(Commands::Compare { a, b }) => cmd_compare(&catalog, &advisor, &a, &b, cli.json)?,
        Some(Commands::Cost { model, tokens }) => {
            let m = catalog.require(&model)?;
            let cost = advisor.monthly_cost(m, tokens);
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "model": m.id, "tokens": tokens, "monthly_cost": cost })
                );
            } else {
                let share = advisor.config().input_token_share;
                println!();
                println!(
                    "  {}  {}  {}",
                    s_bold().apply_to(&m.id),
                    s_price().apply_to(fmt_money(cost)),
                    s_dim().apply_to(format!(
                        "/ month for {} tokens ({:.0}% input, {:.0}% output)",
                        ModelRecord::fmt_context(tokens),
                        share * 100.0,
                        (1.0 - share) * 100.0
                    )),
                );
                println!();
            }
        }
        #[cfg(feature = "network")]
        Some(Commands::Sync { .. }) => unreachable!("handled above"),
    }
    Ok(())
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    if let Some(path) = path {
        return Ok(catalog::load_catalog(path)?);
    }
    #[cfg(feature = "network")]
    let catalog = catalog::load_catalog_cached()?;
    #[cfg(not(feature = "network"))]
    let catalog = catalog::load_bundled_catalog()?;
    Ok(catalog)
}

// ── List ─────────────────────────────────────────────────────────────

fn cmd_list(
    catalog: &Catalog,
    provider: Option<&str>,
    tag: Option<&str>,
    search: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let mut models: Vec<&ModelRecord> = match search {
        Some(q) => catalog.search(q),
        None => catalog.iter().collect(),
    };
    if let Some(p) = provider {
        models.retain(|m| m.provider == p);
    }
    if let Some(t) = tag {
        models.retain(|m| m.has_tag(t));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    if models.is_empty() {
        eprintln!("{}", s_err().apply_to("no models match"));
        return Ok(());
    }

    println!();
    println!(
        "{}  {}",
        s_header().apply_to("models"),
        s_dim().apply_to(format!("{} of {}", models.len(), catalog.len()))
    );

    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header_cell("  Model"),
            header_cell("Provider"),
            header_cell("Context"),
            header_cell("In $/1M"),
            header_cell("Out $/1M"),
            header_cell("Quality"),
            header_cell("Speed"),
            header_cell("Tags"),
        ]);

    for m in &models {
        let tags: Vec<&str> = m.tags.iter().map(String::as_str).collect();
        table.add_row(vec![
            Cell::new(format!("  {}", m.id)).fg(Color::AnsiValue(252)),
            Cell::new(&m.provider).fg(Color::AnsiValue(146)),
            Cell::new(ModelRecord::fmt_context(m.context_window)),
            Cell::new(ModelRecord::fmt_price(m.input_cost_per_1m)).fg(Color::AnsiValue(109)),
            Cell::new(ModelRecord::fmt_price(m.output_cost_per_1m)).fg(Color::AnsiValue(109)),
            Cell::new(fmt_quality(normalize::quality_index(m))),
            Cell::new(m.speed().map(|s| s.to_string()).unwrap_or_default()),
            Cell::new(tags.join(", ")).fg(Color::AnsiValue(248)),
        ]);
    }
    println!("{table}");
    Ok(())
}

// ── Show ─────────────────────────────────────────────────────────────

fn cmd_show(catalog: &Catalog, advisor: &Recommender, id: &str, json: bool) -> anyhow::Result<()> {
    let m = catalog.require(id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(m)?);
        return Ok(());
    }

    let f = Features::of(m);
    let dot = s_tree().apply_to("\u{00b7}");

    println!();
    println!(
        "{}  {}  {}",
        s_bold().apply_to(&m.name),
        s_label().apply_to(&m.provider),
        s_dim().apply_to(&m.id)
    );
    println!("{}", sep(64));
    println!(
        "  context {}  {}  in {}  {}  out {}  {}  blended {}",
        s_bold().apply_to(ModelRecord::fmt_context(f.context_tier)),
        dot,
        s_price().apply_to(ModelRecord::fmt_price(m.input_cost_per_1m)),
        dot,
        s_price().apply_to(ModelRecord::fmt_price(m.output_cost_per_1m)),
        dot,
        s_price().apply_to(ModelRecord::fmt_price(f.cost_index)),
    );
    println!(
        "  mmlu {}  {}  humaneval {}  {}  quality {}  {}  speed {}",
        fmt_quality(m.mmlu()),
        dot,
        fmt_quality(m.human_eval()),
        dot,
        s_good().apply_to(fmt_quality(f.quality_index)),
        dot,
        m.speed().map(|s| s.to_string()).unwrap_or_else(|| "\u{2500}".to_string()),
    );
    if !m.tags.is_empty() {
        let tags: Vec<&str> = m.tags.iter().map(String::as_str).collect();
        println!("  {}", s_label().apply_to(tags.join("  ")));
    }
    if !m.best_for.is_empty() {
        let uses: Vec<&str> = m.best_for.iter().map(String::as_str).collect();
        println!("  {} {}", s_hint().apply_to("best for:"), s_dim().apply_to(uses.join(", ")));
    }
    println!("{}", sep(64));

    let limit = advisor.config().default_limit;
    println!(
        "  {} {}",
        s_hint().apply_to("similar:"),
        id_list(&advisor.find_similar(m, catalog.models(), limit))
    );
    println!(
        "  {} {}",
        s_hint().apply_to("cheaper:"),
        id_list(&advisor.find_cheaper_alternatives(m, catalog.models(), limit))
    );
    println!(
        "  {} {}",
        s_hint().apply_to("better: "),
        id_list(&advisor.find_better_performance(
            m,
            catalog.models(),
            advisor.config().max_budget_increase_percent,
            limit
        ))
    );
    println!();
    Ok(())
}

fn id_list(results: &[ScoredCandidate<'_>]) -> String {
    if results.is_empty() {
        s_hint().apply_to("none").to_string()
    } else {
        results
            .iter()
            .map(|c| c.model.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ── Recommendations ──────────────────────────────────────────────────

fn score_header(results: &[ScoredCandidate<'_>]) -> &'static str {
    match results.first().map(|c| c.criterion) {
        Some(Criterion::Similarity) => "Similarity",
        Some(Criterion::CostIndex) => "Blended $/1M",
        Some(Criterion::QualityIndex) => "Quality",
        Some(Criterion::Value) | None => "Value",
    }
}

/// Render ranked candidates. With `monthly`, also shows the estimated
/// monthly spend for that many tokens.
fn print_results(
    title: &str,
    results: &[ScoredCandidate<'_>],
    monthly: Option<(&Recommender, u64)>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    println!();
    println!("{}", s_header().apply_to(title));
    if results.is_empty() {
        println!("{}", sep(64));
        println!("  {}", s_dim().apply_to("no candidates"));
        println!("{}", sep(64));
        return Ok(());
    }

    let mut headers = vec![
        header_cell("  #"),
        header_cell("Model"),
        header_cell("Provider"),
        header_cell(score_header(results)),
        header_cell("Blended $/1M"),
        header_cell("Quality"),
        header_cell("Context"),
    ];
    if monthly.is_some() {
        headers.push(header_cell("Est. / month"));
    }

    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);

    for (i, c) in results.iter().enumerate() {
        let f = Features::of(c.model);
        let score = match c.criterion {
            Criterion::CostIndex => ModelRecord::fmt_price(c.score),
            _ if c.score.is_infinite() => "\u{221e}".to_string(),
            _ => format!("{:.2}", c.score),
        };
        let mut row = vec![
            Cell::new(format!("  {}", i + 1)).fg(Color::AnsiValue(243)),
            Cell::new(&c.model.id).fg(Color::AnsiValue(252)),
            Cell::new(&c.model.provider).fg(Color::AnsiValue(146)),
            Cell::new(score).fg(Color::AnsiValue(114)),
            Cell::new(ModelRecord::fmt_price(f.cost_index)).fg(Color::AnsiValue(109)),
            Cell::new(fmt_quality(f.quality_index)),
            Cell::new(ModelRecord::fmt_context(f.context_tier)),
        ];
        if let Some((advisor, tokens)) = monthly {
            row.push(Cell::new(fmt_money(advisor.monthly_cost(c.model, tokens))).fg(Color::AnsiValue(109)));
        }
        table.add_row(row);
    }
    println!("{table}");
    Ok(())
}

// ── Compare ──────────────────────────────────────────────────────────

fn cmd_compare(
    catalog: &Catalog,
    advisor: &Recommender,
    a: &str,
    b: &str,
    json: bool,
) -> anyhow::Result<()> {
    let ma = catalog.require(a)?;
    let mb = catalog.require(b)?;
    let cmp = advisor.compare(ma, mb);

    if json {
        println!("{}", serde_json::to_string_pretty(&cmp)?);
        return Ok(());
    }

    let fa = Features::of(ma);
    let fb = Features::of(mb);

    println!();
    println!(
        "{}  {}  {}",
        s_bold().apply_to(&ma.id),
        s_tree().apply_to("vs"),
        s_bold().apply_to(&mb.id)
    );

    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header_cell("  "),
            header_cell(&ma.id),
            header_cell(&mb.id),
            header_cell("Delta"),
        ]);

    let delta_style = |d: f64, lower_is_better: bool| -> Color {
        let better = if lower_is_better { d < 0.0 } else { d > 0.0 };
        if d == 0.0 {
            Color::AnsiValue(248)
        } else if better {
            Color::AnsiValue(114)
        } else {
            Color::AnsiValue(167)
        }
    };

    table.add_row(vec![
        Cell::new("  provider").fg(Color::AnsiValue(243)),
        Cell::new(&ma.provider),
        Cell::new(&mb.provider),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("  blended $/1M").fg(Color::AnsiValue(243)),
        Cell::new(ModelRecord::fmt_price(fa.cost_index)).fg(Color::AnsiValue(109)),
        Cell::new(ModelRecord::fmt_price(fb.cost_index)).fg(Color::AnsiValue(109)),
        Cell::new(match cmp.cost_ratio {
            Some(r) => format!("{:+.2} ({r:.2}x)", cmp.cost_delta),
            None => format!("{:+.2}", cmp.cost_delta),
        })
        .fg(delta_style(cmp.cost_delta, true)),
    ]);
    table.add_row(vec![
        Cell::new("  quality").fg(Color::AnsiValue(243)),
        Cell::new(fmt_quality(fa.quality_index)),
        Cell::new(fmt_quality(fb.quality_index)),
        match cmp.quality_delta {
            Some(d) => Cell::new(format!("{d:+.1}")).fg(delta_style(d, false)),
            None => Cell::new("\u{2500}"),
        },
    ]);
    table.add_row(vec![
        Cell::new("  context").fg(Color::AnsiValue(243)),
        Cell::new(ModelRecord::fmt_context(fa.context_tier)),
        Cell::new(ModelRecord::fmt_context(fb.context_tier)),
        Cell::new(
            cmp.context_ratio
                .map(|r| format!("{r:.2}x"))
                .unwrap_or_else(|| "\u{2500}".to_string()),
        ),
    ]);
    println!("{table}");

    let join = |tags: &std::collections::BTreeSet<String>| -> String {
        if tags.is_empty() {
            "\u{2500}".to_string()
        } else {
            tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
        }
    };
    println!("  {} {}", s_hint().apply_to("shared tags:"), s_label().apply_to(join(&cmp.shared_tags)));
    println!("  {} {}", s_hint().apply_to(format!("only {}:", ma.id)), s_dim().apply_to(join(&cmp.only_a)));
    println!("  {} {}", s_hint().apply_to(format!("only {}:", mb.id)), s_dim().apply_to(join(&cmp.only_b)));
    println!(
        "  {} {}",
        s_hint().apply_to("similarity:"),
        s_good().apply_to(format!("{:.2}", cmp.similarity))
    );
    println!();
    Ok(())
}

// ── Sync ─────────────────────────────────────────────────────────────

#[cfg(feature = "network")]
async fn cmd_sync(url: &str) -> anyhow::Result<()> {
    let term = console::Term::stderr();
    term.write_line(&format!("{}", s_dim().apply_to("downloading catalog...")))?;

    let result = model_advisor_core::sync::sync_catalog(url).await;
    term.clear_last_lines(1)?;
    let result = result?;

    println!();
    println!("  {}", s_good().apply_to("synced"));
    println!(
        "  {}",
        s_dim().apply_to(format!(
            "catalog.toml: {} models from {} providers",
            result.model_count, result.provider_count
        ))
    );
    println!(
        "  {}",
        s_hint().apply_to(format!("cached in {}", result.path.display()))
    );
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn match_collects_repeated_flags() {
        let cli = Cli::try_parse_from([
            "model-advisor", "match", "--budget", "50", "--tokens", "10000000",
            "-c", "chat", "-c", "code", "-p", "openai",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Match { budget, capabilities, providers, min_context, .. }) => {
                assert_eq!(budget, 50.0);
                assert_eq!(capabilities, vec!["chat", "code"]);
                assert_eq!(providers, vec!["openai"]);
                assert_eq!(min_context, 0);
            }
            _ => panic!("expected match command"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["model-advisor", "similar", "gpt-4o", "--json", "-n", "3"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Similar { limit: Some(3), .. })));
    }

    #[test]
    fn money_formatting() {
        assert_eq!(fmt_money(11.0), "$11.00");
        assert_eq!(fmt_money(1234.4), "$1234");
        assert_eq!(fmt_quality(None), "\u{2500}");
        assert_eq!(fmt_quality(Some(85.26)), "85.3");
    }
}

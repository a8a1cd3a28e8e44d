use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use indexmap::IndexSet;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ortholog_vis::app::{Fetcher, Orchestrator, RenderAdapter, ViewState};
use ortholog_vis::cache::ModeCache;
use ortholog_vis::config::{ConfigLoader, ResolvedConfig};
use ortholog_vis::domain::{LabelOrder, SearchMode, VisMode};
use ortholog_vis::ensembl::{EnsemblHttpClient, EnsemblLookup};
use ortholog_vis::error::VisError;
use ortholog_vis::orthologs::{
    DEFAULT_DISEASE_BARS, DEFAULT_SCORE_LIMIT, DEFAULT_SUGGESTION_LIMIT, DiseaseGeneCount,
    OrthologPair, disease_gene_counts, disease_suggestions, ensembl_ids, filter_pairs,
    score_pairs,
};
use ortholog_vis::output::JsonOutput;
use ortholog_vis::reshape::{Pipeline, Visualization};
use ortholog_vis::similarity::GraphSummary;
use ortholog_vis::sparql::SparqlHttpClient;
use ortholog_vis::species::species_info;

#[derive(Parser)]
#[command(name = "ortholog-vis")]
#[command(about = "Wikidata disease, GO term and ortholog queries reshaped for charting")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch, reshape and render one or more visualization modes")]
    Show(ShowArgs),
    #[command(about = "Highlights of the disease similarity graph")]
    Summary,
    #[command(about = "Human–rat ortholog pairs linked to diseases")]
    Pairs(PairsArgs),
    #[command(about = "Disease labels matching a query")]
    Suggest(SuggestArgs),
    #[command(about = "Model organism description")]
    Species(SpeciesArgs),
    #[command(about = "List visualization modes")]
    Modes,
}

#[derive(Args)]
struct ShowArgs {
    #[arg(value_enum)]
    modes: Vec<VisMode>,

    #[arg(long)]
    normalize: bool,

    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long)]
    top_n: Option<usize>,

    #[arg(long)]
    first_seen: bool,

    /// Directory receiving one `<mode>.json` per mode instead of stdout.
    #[arg(long)]
    out: Option<Utf8PathBuf>,

    #[arg(long)]
    no_prefetch: bool,
}

#[derive(Args)]
struct PairsArgs {
    #[arg(long, default_value = "")]
    query: String,

    #[arg(long, value_enum, default_value_t = SearchMode::Disease)]
    by: SearchMode,

    /// Annotate pairs with Ensembl transcript counts and a score.
    #[arg(long)]
    scores: bool,

    #[arg(long, default_value_t = DEFAULT_SCORE_LIMIT)]
    max_rows: usize,

    /// Distinct human and rat gene counts per disease instead of the pairs.
    #[arg(long, conflicts_with = "scores")]
    by_disease: bool,

    #[arg(long, default_value_t = DEFAULT_DISEASE_BARS)]
    bars: usize,
}

#[derive(Args)]
struct SuggestArgs {
    query: String,

    #[arg(long, default_value_t = DEFAULT_SUGGESTION_LIMIT)]
    limit: usize,
}

#[derive(Args)]
struct SpeciesArgs {
    label: String,
}

#[derive(Serialize)]
struct PairsResult<'a> {
    query: &'a str,
    by: SearchMode,
    total: usize,
    matched: usize,
    scored: usize,
    pairs: Vec<OrthologPair>,
}

#[derive(Serialize)]
struct DiseaseCountsResult<'a> {
    query: &'a str,
    by: SearchMode,
    matched: usize,
    diseases: Vec<DiseaseGeneCount>,
}

#[derive(Serialize)]
struct ModeEntry {
    name: &'static str,
    title: &'static str,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            if let Some(error) = report.downcast_ref::<VisError>() {
                return ExitCode::from(map_exit_code(error));
            }
            ExitCode::from(1)
        }
    }
}

fn map_exit_code(error: &VisError) -> u8 {
    match error {
        VisError::InvalidMode(_)
        | VisError::InvalidSearchMode(_)
        | VisError::InvalidEntityId(_)
        | VisError::InvalidEnsemblId(_)
        | VisError::MissingConfig
        | VisError::ConfigRead(_)
        | VisError::ConfigParse(_)
        | VisError::ConfigValue(_) => 2,
        VisError::SparqlHttp(_)
        | VisError::SparqlStatus { .. }
        | VisError::EnsemblHttp(_)
        | VisError::EnsemblStatus { .. } => 3,
        VisError::Output(_) | VisError::Processing(_) => 1,
    }
}

fn run() -> miette::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Show(args) => run_show(args, config),
        Commands::Summary => run_summary(config),
        Commands::Pairs(args) => run_pairs(args, config),
        Commands::Suggest(args) => run_suggest(args, config),
        Commands::Species(args) => {
            JsonOutput::print_json(species_info(&args.label))
                .map_err(|err| VisError::Output(err.to_string()))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Modes => {
            let modes: Vec<ModeEntry> = VisMode::ALL
                .iter()
                .map(|mode| ModeEntry {
                    name: mode.as_str(),
                    title: mode.title(),
                })
                .collect();
            JsonOutput::print_json(&modes).map_err(|err| VisError::Output(err.to_string()))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn apply_show_overrides(
    args: &ShowArgs,
    mut config: ResolvedConfig,
) -> Result<ResolvedConfig, VisError> {
    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(VisError::ConfigValue(format!(
                "--threshold must be within [0, 1], got {threshold}"
            )));
        }
        config.similarity_threshold = threshold;
    }
    if let Some(top_n) = args.top_n {
        if top_n == 0 {
            return Err(VisError::ConfigValue("--top-n must be at least 1".to_string()));
        }
        config.bubble_top_n = top_n;
        config.heatmap_top_n = top_n;
    }
    if args.normalize {
        config.normalize_rows = true;
    }
    if args.first_seen {
        config.label_order = LabelOrder::FirstSeen;
    }
    if args.no_prefetch {
        config.prefetch = false;
    }
    Ok(config)
}

fn build_orchestrator(config: &ResolvedConfig) -> Result<Orchestrator<SparqlHttpClient>, VisError> {
    let client = SparqlHttpClient::new(&config.endpoint, &config.user_agent)?;
    Ok(Orchestrator::new(
        client,
        Pipeline::new(config.pipeline_options()),
    ))
}

fn run_show(args: ShowArgs, config: ResolvedConfig) -> miette::Result<ExitCode> {
    let config = apply_show_overrides(&args, config)?;
    let modes: Vec<VisMode> = if args.modes.is_empty() {
        vec![VisMode::default()]
    } else {
        args.modes.iter().copied().collect::<IndexSet<_>>().into_iter().collect()
    };

    let orchestrator = build_orchestrator(&config)?;
    let output = match args.out {
        Some(dir) => JsonOutput::to_dir(dir),
        None => JsonOutput::stdout(),
    };

    let mut prefetch = None;
    let mut first_failure: Option<u8> = None;
    for (index, mode) in modes.iter().copied().enumerate() {
        let state = orchestrator.switch_mode(mode, &output);
        let rendered = match &state {
            ViewState::Ready { view, .. } => output.render(mode, view),
            ViewState::Error { error, .. } => {
                eprintln!("{mode}: {error}");
                first_failure = first_failure.or(Some(map_exit_code(error)));
                orchestrator.dismiss();
                continue;
            }
            ViewState::Idle | ViewState::Loading(_) => Err(VisError::Processing(format!(
                "{mode} did not finish loading"
            ))),
        };
        if let Err(err) = rendered {
            eprintln!("{mode}: {err}");
            first_failure = first_failure.or(Some(map_exit_code(&err)));
            continue;
        }

        let remaining = &modes[index + 1..];
        if config.prefetch && prefetch.is_none() && !remaining.is_empty() {
            prefetch = Some(orchestrator.prefetch(remaining));
        }
    }

    if let Some(handle) = prefetch {
        match handle.join() {
            Ok(report) => debug!(
                completed = report.completed.len(),
                skipped = report.skipped.len(),
                failed = report.failed.len(),
                "prefetch finished"
            ),
            Err(_) => debug!("prefetch thread panicked"),
        }
    }

    Ok(match first_failure {
        Some(code) => ExitCode::from(code),
        None => ExitCode::SUCCESS,
    })
}

fn run_summary(config: ResolvedConfig) -> miette::Result<ExitCode> {
    let orchestrator = build_orchestrator(&config)?;
    match orchestrator.switch_mode(VisMode::Graph, &JsonOutput::stdout()) {
        ViewState::Ready { view, .. } => {
            let summary = match view.as_ref() {
                Visualization::Graph(graph) => GraphSummary::from_graph(graph),
                other => {
                    return Err(VisError::Processing(format!(
                        "graph mode produced a {} view",
                        other.kind()
                    ))
                    .into());
                }
            };
            JsonOutput::print_json(&summary).map_err(|err| VisError::Output(err.to_string()))?;
            Ok(ExitCode::SUCCESS)
        }
        ViewState::Error { error, .. } => {
            eprintln!("{}: {error}", VisMode::Graph);
            Ok(ExitCode::from(map_exit_code(&error)))
        }
        ViewState::Idle | ViewState::Loading(_) => {
            Err(VisError::Processing("graph did not finish loading".to_string()).into())
        }
    }
}

fn load_pairs(config: &ResolvedConfig) -> Result<Vec<OrthologPair>, VisError> {
    let client = SparqlHttpClient::new(&config.endpoint, &config.user_agent)?;
    Fetcher::new(Arc::new(client), Arc::new(ModeCache::new())).ortholog_pairs()
}

fn run_pairs(args: PairsArgs, config: ResolvedConfig) -> miette::Result<ExitCode> {
    let pairs = load_pairs(&config)?;
    let filtered = filter_pairs(&pairs, &args.query, args.by);
    if args.by_disease {
        let result = DiseaseCountsResult {
            query: &args.query,
            by: args.by,
            matched: filtered.len(),
            diseases: disease_gene_counts(&filtered, args.bars),
        };
        JsonOutput::print_json(&result).map_err(|err| VisError::Output(err.to_string()))?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut matched: Vec<OrthologPair> = filtered.into_iter().cloned().collect();

    let mut scored = 0;
    if args.scores {
        let client = EnsemblHttpClient::new(&config.user_agent)?;
        let lookup = EnsemblLookup::new(client, config.batch_options());
        let lookups = lookup.lookup_batch(&ensembl_ids(&matched, args.max_rows));
        scored = score_pairs(&mut matched, &lookups, args.max_rows);
    }

    let result = PairsResult {
        query: &args.query,
        by: args.by,
        total: pairs.len(),
        matched: matched.len(),
        scored,
        pairs: matched,
    };
    JsonOutput::print_json(&result).map_err(|err| VisError::Output(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

fn run_suggest(args: SuggestArgs, config: ResolvedConfig) -> miette::Result<ExitCode> {
    let pairs = load_pairs(&config)?;
    let suggestions = disease_suggestions(&pairs, &args.query, args.limit);
    JsonOutput::print_json(&suggestions).map_err(|err| VisError::Output(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

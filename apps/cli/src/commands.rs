//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use leadscout_analyzer::{Analyzer, ContentSource, GeminiClient};
use leadscout_core::{
    CompanyTable, ContentAnalyzer, EnrichOptions, EnrichProgress, EnrichmentSummary,
    ExportFormat, default_output_path, enrich_table, export,
};
use leadscout_extractor::{ContentExtractor, FetchStrategy};
use leadscout_resolver::DetailResolver;
use leadscout_shared::{
    AppConfig, CompanyDetails, init_config, load_config, load_config_from, validate_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// LeadScout: company lead enrichment.
#[derive(Parser)]
#[command(
    name = "leadscout",
    version,
    about = "Enrich company lists with website, industry, size, HQ and an AI business analysis.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.leadscout/leadscout.toml).
    #[arg(long, global = true, env = "LEADSCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Export format flag.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Csv,
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}

/// Fetch strategy flag.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum StrategyArg {
    Static,
    Browser,
    Proxy,
}

impl From<StrategyArg> for FetchStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Static => FetchStrategy::Static,
            StrategyArg::Browser => FetchStrategy::Browser,
            StrategyArg::Proxy => FetchStrategy::RenderProxy,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Enrich every company in a CSV file.
    Enrich {
        /// Input CSV with a company name column.
        input: PathBuf,

        /// Output file (defaults to enriched_companies.csv next to the input).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format (defaults to the output file's extension).
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Skip the website analysis; only resolve details.
        #[arg(long)]
        no_analysis: bool,
    },

    /// Resolve one company's details and print them as JSON.
    Resolve {
        /// Company name, e.g. "Northwind Robotics".
        company: String,
    },

    /// Analyze one website and print the analysis as JSON.
    Analyze {
        /// Website URL.
        url: String,

        /// Company name used in the prompt.
        #[arg(long)]
        company: String,

        /// Force a fetch strategy instead of the hostname rules.
        #[arg(long)]
        strategy: Option<StrategyArg>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "leadscout=info",
        1 => "leadscout=debug",
        _ => "leadscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Enrich {
            input,
            out,
            format,
            no_analysis,
        } => cmd_enrich(config_path, &input, out, format, no_analysis).await,
        Command::Resolve { company } => cmd_resolve(config_path, &company).await,
        Command::Analyze {
            url,
            company,
            strategy,
        } => cmd_analyze(config_path, &url, &company, strategy).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

fn config_from(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_enrich(
    config_path: Option<&Path>,
    input: &Path,
    out: Option<PathBuf>,
    format: Option<OutputFormat>,
    no_analysis: bool,
) -> Result<()> {
    let config = config_from(config_path)?;

    // Validate the model key before touching the network
    let analyzer = if no_analysis {
        None
    } else {
        validate_api_key(&config)?;
        Some(Analyzer::new(&config)?)
    };
    let resolver = DetailResolver::new(&config)?;

    let mut table = CompanyTable::from_path(input, &config.pipeline.company_column)?;
    let out = out.unwrap_or_else(|| default_output_path(input));
    let format = format
        .map(ExportFormat::from)
        .unwrap_or_else(|| ExportFormat::from_path(&out));

    info!(
        input = %input.display(),
        out = %out.display(),
        %format,
        rows = table.len(),
        analysis = !no_analysis,
        "enriching companies"
    );

    let reporter = CliProgress::new();
    let summary = enrich_table(
        &mut table,
        &resolver,
        analyzer.as_ref().map(|a| a as &dyn ContentAnalyzer),
        &EnrichOptions::from_config(&config.pipeline),
        &reporter,
    )
    .await?;

    export(&table, Some(&summary), &out, format)?;

    // Print summary
    println!();
    println!("  Enrichment complete!");
    println!("  Run:       {}", summary.run_id);
    println!("  Rows:      {}", summary.rows);
    println!("  Resolved:  {}", summary.resolved);
    println!("  Websites:  {}", summary.websites_found);
    println!("  Analyzed:  {}", summary.analyzed);
    if summary.skipped > 0 {
        println!("  Skipped:   {} (no company name)", summary.skipped);
    }
    println!("  Output:    {}", out.display());
    println!("  Time:      {:.1}s", summary.elapsed().as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_resolve(config_path: Option<&Path>, company: &str) -> Result<()> {
    let company = company.trim();
    if company.is_empty() {
        return Err(eyre!("company name must not be empty"));
    }

    let config = config_from(config_path)?;
    let resolver = DetailResolver::new(&config)?;
    let details = resolver.resolve(company).await;

    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}

async fn cmd_analyze(
    config_path: Option<&Path>,
    url: &str,
    company: &str,
    strategy: Option<StrategyArg>,
) -> Result<()> {
    let config = config_from(config_path)?;
    validate_api_key(&config)?;

    let extractor = ContentExtractor::new(&config)?;
    let strategy = strategy
        .map(FetchStrategy::from)
        .unwrap_or_else(|| extractor.strategy_for(url));
    info!(url, company, %strategy, "analyzing website");

    let analyzer = Analyzer::with_parts(
        Box::new(FixedStrategy {
            extractor,
            strategy,
        }),
        Box::new(GeminiClient::new(&config.gemini)?),
    );

    let analysis = analyzer.analyze(url, company).await;
    if !analysis.is_available() {
        warn!("analysis unavailable; see log for details");
    }
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = config_from(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Explicit fetch strategy
// ---------------------------------------------------------------------------

/// Content source that ignores the hostname rules.
struct FixedStrategy {
    extractor: ContentExtractor,
    strategy: FetchStrategy,
}

#[async_trait]
impl ContentSource for FixedStrategy {
    async fn content(&self, url: &str) -> String {
        match self.extractor.extract_with(self.strategy, url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(strategy = %self.strategy, error = %e, "content extraction failed");
                String::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .map(|s| s.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl EnrichProgress for CliProgress {
    fn row_started(&self, index: usize, total: usize, company: &str) {
        self.spinner
            .set_prefix(format!("[{}/{total}] {company}", index + 1));
        self.spinner
            .set_message(format!("[{}/{total}] {company}", index + 1));
    }

    fn stage(&self, name: &str) {
        let prefix = self.spinner.prefix();
        self.spinner.set_message(format!("{prefix}: {name}"));
    }

    fn row_finished(&self, index: usize, total: usize, details: &CompanyDetails) {
        if details.company_name.is_empty() {
            self.spinner
                .println(format!("  [{}/{total}] (no company name)", index + 1));
        } else {
            self.spinner.println(format!(
                "  [{}/{total}] {} → {}",
                index + 1,
                details.company_name,
                details.website
            ));
        }
    }

    fn done(&self, _summary: &EnrichmentSummary) {
        self.spinner.finish_and_clear();
    }
}

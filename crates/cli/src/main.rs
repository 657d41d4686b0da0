use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::Parser;
use sgnl_core::{ScoreContext, SignalConfig, SignalPipeline, SignalReport};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
    Semantic,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            "semantic" => Ok(Self::Semantic),
            _ => Err(format!("Invalid format: {}. Valid options: json, text, semantic", s)),
        }
    }
}

/// Score the signal quality of web pages
#[derive(Parser, Debug)]
#[command(name = "sgnl")]
#[command(version)]
#[command(about = "Score the signal quality of web pages", long_about = None)]
struct Args {
    /// URLs to fetch, local HTML files, or "-" for stdin
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,

    /// Configuration file (default: <config dir>/sgnl/config.json if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Search query the documents were retrieved for
    #[arg(short, long, value_name = "QUERY")]
    query: Option<String>,

    /// URL used for the domain lookup of file and stdin input
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// Run both extraction strategies and keep the longer text
    #[arg(long)]
    force_deep: bool,

    /// Density threshold below which deep analysis is skipped
    #[arg(long, value_name = "NUM")]
    threshold: Option<f64>,

    /// Characters of body text in semantic output
    #[arg(long, value_name = "NUM")]
    max_chars: Option<usize>,

    /// Maximum number of URLs fetched at once
    #[arg(short, long, value_name = "NUM")]
    concurrency: Option<usize>,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Time budget per URL in seconds, covering fetch and scoring
    #[arg(long, value_name = "SECS")]
    batch_timeout: Option<u64>,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Output format (json, text, semantic)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Where one input comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Url(String),
    File(PathBuf),
    Stdin,
}

impl Input {
    fn classify(raw: &str) -> Self {
        if raw == "-" {
            Input::Stdin
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            Input::Url(raw.to_string())
        } else {
            Input::File(PathBuf::from(raw))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sgnl_core=debug,sgnl=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<SignalConfig> {
    let mut config = match &args.config {
        Some(path) => SignalConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SignalConfig::load_default().context("Failed to load default config")?,
    };

    apply_overrides(&mut config, args);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Layers command-line flags over the loaded configuration.
///
/// A `--timeout` longer than the per-URL budget raises the budget too, so
/// a slow fetch is not cut short before its own timeout expires.
fn apply_overrides(config: &mut SignalConfig, args: &Args) {
    if let Some(threshold) = args.threshold {
        config.density_threshold = threshold;
    }
    if let Some(max_chars) = args.max_chars {
        config.max_semantic_chars = max_chars;
    }
    if let Some(concurrency) = args.concurrency {
        config.batch.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.fetch.timeout = timeout;
        config.batch.per_url_timeout = config.batch.per_url_timeout.max(timeout);
    }
    if let Some(batch_timeout) = args.batch_timeout {
        config.batch.per_url_timeout = batch_timeout;
    }
    if let Some(user_agent) = &args.user_agent {
        config.fetch.user_agent = user_agent.clone();
    }
}

/// Resolves when Ctrl-C is pressed. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    echo::print_warning("Interrupted, cancelling unfinished URLs");
}

async fn score_inputs(
    pipeline: &SignalPipeline, inputs: &[Input], context: &ScoreContext, source_url: Option<&str>,
) -> anyhow::Result<Vec<SignalReport>> {
    let urls: Vec<&str> = inputs
        .iter()
        .filter_map(|input| match input {
            Input::Url(url) => Some(url.as_str()),
            _ => None,
        })
        .collect();

    let fetched = if urls.is_empty() {
        Vec::new()
    } else {
        debug!(count = urls.len(), "scoring URLs");
        pipeline.score_batch_until(&urls, context, interrupted()).await
    };
    let mut fetched = fetched.into_iter();

    let mut reports = Vec::with_capacity(inputs.len());
    for input in inputs {
        let report = match input {
            Input::Url(_) => match fetched.next() {
                Some(report) => report,
                None => bail!("Missing report for URL input"),
            },
            Input::File(path) => {
                let html =
                    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
                pipeline.score_html(&html, source_url, context)
            }
            Input::Stdin => {
                let mut html = String::new();
                io::stdin()
                    .read_to_string(&mut html)
                    .context("Failed to read from stdin")?;
                pipeline.score_html(&html, source_url, context)
            }
        };
        reports.push(report);
    }

    Ok(reports)
}

fn render(reports: &[SignalReport], format: OutputFormat, max_chars: usize, color: bool) -> anyhow::Result<String> {
    let output = match format {
        OutputFormat::Json => match reports {
            [report] => serde_json::to_string_pretty(report)?,
            _ => serde_json::to_string_pretty(reports)?,
        },
        OutputFormat::Semantic => {
            let inputs: Vec<_> = reports
                .iter()
                .filter(|r| r.is_success())
                .map(|r| r.semantic_input(max_chars))
                .collect();
            serde_json::to_string_pretty(&inputs)?
        }
        OutputFormat::Text => reports
            .iter()
            .map(|r| echo::render_report(&r.presentation(), color))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(output + "\n")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
    }

    let config = load_config(&args)?;
    let pipeline = SignalPipeline::new(&config).context("Failed to build scoring pipeline")?;
    let inputs: Vec<Input> = args.inputs.iter().map(|raw| Input::classify(raw)).collect();

    if inputs.iter().filter(|i| **i == Input::Stdin).count() > 1 {
        bail!("stdin (\"-\") can only be given once");
    }

    let context = ScoreContext { query: args.query.clone(), force_deep: args.force_deep };
    let reports = score_inputs(&pipeline, &inputs, &context, args.source_url.as_deref()).await?;
    let failed = reports.iter().filter(|r| !r.is_success()).count();

    if args.verbose {
        echo::print_summary(reports.len(), failed);
    }

    match &args.output {
        Some(path) => {
            let output = render(&reports, args.format, pipeline.max_semantic_chars(), false)?;
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display()));
        }
        None => {
            let color = io::stdout().is_terminal();
            print!("{}", render(&reports, args.format, pipeline.max_semantic_chars(), color)?);
        }
    }

    if failed == reports.len() {
        bail!("No input could be scored");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("txt".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("semantic".parse::<OutputFormat>(), Ok(OutputFormat::Semantic));
        assert!("markdown".parse::<OutputFormat>().is_err());
    }

    fn overridden(flags: &[&str]) -> SignalConfig {
        let mut argv = vec!["sgnl"];
        argv.extend_from_slice(flags);
        argv.push("page.html");
        let args = Args::parse_from(argv);
        let mut config = SignalConfig::default();
        apply_overrides(&mut config, &args);
        config
    }

    #[test]
    fn test_timeout_raises_per_url_budget() {
        let config = overridden(&["--timeout", "120"]);
        assert_eq!(config.fetch.timeout, 120);
        assert_eq!(config.batch.per_url_timeout, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_timeout_keeps_per_url_budget() {
        let config = overridden(&["--timeout", "5"]);
        assert_eq!(config.fetch.timeout, 5);
        assert_eq!(config.batch.per_url_timeout, SignalConfig::default().batch.per_url_timeout);
    }

    #[test]
    fn test_batch_timeout_overrides_budget() {
        let config = overridden(&["--timeout", "120", "--batch-timeout", "200"]);
        assert_eq!(config.batch.per_url_timeout, 200);
        assert_eq!(overridden(&["--batch-timeout", "10"]).batch.per_url_timeout, 10);
    }

    #[test]
    fn test_input_classify() {
        assert_eq!(Input::classify("-"), Input::Stdin);
        assert_eq!(
            Input::classify("https://arxiv.org/abs/1"),
            Input::Url("https://arxiv.org/abs/1".to_string())
        );
        assert_eq!(Input::classify("page.html"), Input::File(PathBuf::from("page.html")));
    }
}

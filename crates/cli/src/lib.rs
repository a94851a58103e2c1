use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use flex_graph::{Analyzer, CompilerConfig, HeuristicsEngine};
use flex_protocol::{serialize_json, serialize_json_pretty, AnalyzeRequest, AnalyzeResponse};
use flex_syntax::{Language, SyntaxError};
use history::{HistoryStore, DEFAULT_HISTORY_FILE};
use http_api::{ApiError, HttpState};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

mod history;
mod http_api;

/// Exit code when `recover` finds nothing
const EXIT_NOT_FOUND: u8 = 2;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "flex")]
#[command(about = "Concept graphs and defect hints for Python code", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile Python source into a concept graph with defect hints
    Analyze(AnalyzeArgs),

    /// Recover a JSON object from malformed text
    Recover(RecoverArgs),

    /// Serve the analysis API over HTTP
    ServeHttp(ServeArgs),

    /// Print stored analysis history
    History(HistoryArgs),

    /// Print the JSON Schema of the analysis response
    Schema,

    /// List the defect rules in evaluation order
    Rules,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Python file to analyze ("-" reads stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// File holding a model's raw review of the code
    #[arg(long)]
    review: Option<PathBuf>,

    /// Render the model's graph, when the review carries one
    #[arg(long, requires = "review")]
    model_graph: bool,

    /// Maximum characters of source quoted in labels (0 = unlimited)
    #[arg(long)]
    max_snippet_chars: Option<usize>,

    /// Only literally empty bodies count as empty (ignore pass, ..., docstrings)
    #[arg(long)]
    strict_bodies: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct RecoverArgs {
    /// Text file to recover from ("-" reads stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:5000
    #[arg(long, env = "FLEX_BIND", default_value = "127.0.0.1:5000")]
    bind: String,

    /// History file (JSON array of past analyses)
    #[arg(long, env = "FLEX_HISTORY_FILE", default_value = DEFAULT_HISTORY_FILE)]
    history: PathBuf,

    /// Do not record analyses
    #[arg(long)]
    no_history: bool,
}

#[derive(Args)]
struct HistoryArgs {
    /// History file (JSON array of past analyses)
    #[arg(long, env = "FLEX_HISTORY_FILE", default_value = DEFAULT_HISTORY_FILE)]
    history: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

pub async fn main_entry() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::Recover(args) => run_recover(args),
        Commands::ServeHttp(args) => serve_http(args).await.map(|()| ExitCode::SUCCESS),
        Commands::History(args) => run_history(args).map(|()| ExitCode::SUCCESS),
        Commands::Schema => run_schema().map(|()| ExitCode::SUCCESS),
        Commands::Rules => run_rules().map(|()| ExitCode::SUCCESS),
    }
}

fn read_input(path: &Path, what: &str) -> Result<String> {
    if path.as_os_str() != "-" {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read {what} from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .with_context(|| format!("Failed to read {what} from stdin"))?;
    Ok(buffer)
}

fn render<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serialize_json_pretty(value)
    } else {
        serialize_json(value)
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<ExitCode> {
    if let Some(name) = Language::foreign_name(&args.input) {
        return Err(SyntaxError::unsupported_language(name))
            .with_context(|| format!("Cannot analyze {}", args.input.display()));
    }

    let code = read_input(&args.input, "source")?;
    let review = args
        .review
        .as_deref()
        .map(|path| read_input(path, "review"))
        .transpose()?;

    let mut config = if args.strict_bodies {
        CompilerConfig::strict_bodies()
    } else {
        CompilerConfig::default()
    };
    if let Some(max) = args.max_snippet_chars {
        config.max_snippet_chars = max;
    }

    let analyzer = Analyzer::new(config).prefer_model_graph(args.model_graph);
    let request = AnalyzeRequest { code, review };

    match analyzer.analyze(&request.code, request.review.as_deref()) {
        Ok(analysis) => {
            let response: AnalyzeResponse = analysis.into_response(Vec::new());
            print_stdout(&render(&response, args.pretty)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_syntax_error() => {
            let envelope = ApiError::from(err).envelope();
            log::warn!("{}", envelope.message);
            print_stdout(&render(&envelope, args.pretty)?)?;
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err).context("Analysis failed"),
    }
}

fn run_recover(args: RecoverArgs) -> Result<ExitCode> {
    let text = read_input(&args.input, "text")?;
    match flex_recovery::recover_with_phase(&text) {
        flex_recovery::Recovery::Found { value, phase } => {
            log::info!("Recovered JSON via {} phase", phase.as_str());
            print_stdout(&render(&value, args.pretty)?)?;
            Ok(ExitCode::SUCCESS)
        }
        flex_recovery::Recovery::NotFound => {
            log::warn!("No JSON object could be recovered");
            print_stdout("null")?;
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
    }
}

fn run_history(args: HistoryArgs) -> Result<()> {
    let entries = HistoryStore::new(args.history).load()?;
    print_stdout(&render(&entries, args.pretty)?)
}

fn run_schema() -> Result<()> {
    let schema = schemars::schema_for!(AnalyzeResponse);
    print_stdout(&serialize_json_pretty(&schema)?)
}

fn run_rules() -> Result<()> {
    let names = HeuristicsEngine::default().rule_names();
    print_stdout(&serialize_json(&names)?)
}

async fn serve_http(args: ServeArgs) -> Result<()> {
    let history = (!args.no_history).then(|| HistoryStore::new(&args.history));
    if let Some(store) = &history {
        log::info!("Recording analyses in {}", store.path().display());
    }

    let state = Arc::new(HttpState {
        analyzer: Analyzer::default(),
        history,
    });
    let app = http_api::router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    let local_addr = listener.local_addr()?;
    let base_url = format!("http://{local_addr}");

    log::info!("Serving FLEX API on {base_url}");
    print_stdout(&format!("Serving analysis API: {base_url}/api/analyze"))?;
    print_stdout(&format!("Health endpoint: {base_url}/health"))?;
    print_stdout(&format!(
        "Try: curl -X POST {base_url}/api/analyze -H 'Content-Type: application/json' -d '{{\"code\": \"def f():\\n    pass\\n\"}}'"
    ))?;

    axum::serve(listener, app).await?;
    Ok(())
}

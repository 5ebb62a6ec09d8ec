// retitle - batch renaming and re-titling of PDF files against a reference name list

mod batch;
mod exit_codes;
mod review;
mod util;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use retitle_config::Settings;
use retitle_io::{corpus, intake, PdfTitleStore, ReportFormat};
use retitle_recon::{extract, normalize, MatchPolicy, ReconError, ReferenceCorpus, TitleStore};

use exit_codes::{
    recon_exit_code, EXIT_ABORTED, EXIT_CONFIG, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "retitle")]
#[command(about = "Rename and re-title PDF files against a reference name list")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/retitle/settings.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match, review and rename a batch of PDF files
    #[command(after_help = "\
Writes a zip of renamed PDFs (titles rewritten) and a similarity report.

Examples:
  retitle run scans/ --corpus names.txt
  retitle run a.pdf b.pdf --corpus names.xlsx --out done/
  retitle run scans/ --corpus names.csv --yes --select-top --report-format csv
  retitle run scans/ --corpus names.txt --yes --json | jq .summary")]
    Run(RunArgs),

    /// Rank reference names against a single file name
    #[command(after_help = "\
Examples:
  retitle match Annual_Report_2023.pdf --corpus names.txt
  retitle match 'q1 2023 report' --corpus names.txt --cutoff 40 --json")]
    Match {
        /// File name or free text to match
        query: String,

        /// Reference name list (.txt, .csv, .xlsx, .xls, .ods)
        #[arg(long, value_name = "FILE")]
        corpus: Option<PathBuf>,

        #[command(flatten)]
        matching: MatchArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the embedded metadata title of each PDF
    Titles {
        /// PDF files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct MatchArgs {
    /// Maximum candidates per document
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Minimum similarity score, 0-100
    #[arg(long, value_name = "N")]
    cutoff: Option<u8>,
}

#[derive(Args)]
struct RunArgs {
    /// PDF files or directories (directories are read one level deep)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Reference name list (.txt, .csv, .xlsx, .xls, .ods)
    #[arg(long, value_name = "FILE")]
    corpus: Option<PathBuf>,

    /// Directory for the archive and report (default: current directory)
    #[arg(long, short = 'o', value_name = "DIR")]
    out: Option<PathBuf>,

    #[command(flatten)]
    matching: MatchArgs,

    /// Skip the review screen and confirm every document with its default name
    #[arg(long, short = 'y')]
    yes: bool,

    /// With --yes, record each document's best match as selected
    #[arg(long, requires = "yes")]
    select_top: bool,

    /// Report format (default from settings, else xlsx)
    #[arg(long, value_enum)]
    report_format: Option<ReportFormatArg>,

    /// Print the result as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Suppress the summary on stderr
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormatArg {
    Xlsx,
    Csv,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Xlsx => ReportFormat::Xlsx,
            ReportFormatArg::Csv => ReportFormat::Csv,
        }
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  retitle-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  retitle-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
        )
    }
}

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().filter_or("RETITLE_LOG", "warn"));
    let cli = Cli::parse();

    let result = load_settings(cli.config.as_deref()).and_then(|settings| match cli.command {
        Commands::Run(args) => batch::cmd_run(args, &settings),
        Commands::Match { query, corpus, matching, json } => {
            cmd_match(query, corpus, matching, json, &settings)
        }
        Commands::Titles { inputs, json } => cmd_titles(inputs, json),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn error(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    pub fn aborted() -> Self {
        Self {
            code: EXIT_ABORTED,
            message: "review aborted; nothing was written".to_string(),
            hint: None,
        }
    }

    /// Create error from an engine error with the matching exit code.
    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::EmptyBatch => Some("no .pdf files were found among the inputs".to_string()),
            ReconError::Emit(_) => Some(
                "check free space and permissions in the output directory, or choose another with --out"
                    .to_string(),
            ),
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// shared resolution (flag > settings file > default)
// ============================================================================

fn load_settings(explicit: Option<&Path>) -> Result<Settings, CliError> {
    match explicit {
        Some(path) => Settings::load_from(path).map_err(|e| CliError::config(e.to_string())),
        None => Ok(Settings::load()),
    }
}

fn resolve_policy(args: &MatchArgs, settings: &Settings) -> Result<MatchPolicy, CliError> {
    MatchPolicy::new(
        args.limit.unwrap_or(settings.matching.limit),
        args.cutoff.unwrap_or(settings.matching.cutoff),
    )
    .map_err(|e| CliError::args(e.to_string()))
}

fn resolve_corpus(flag: Option<PathBuf>, settings: &Settings) -> Result<ReferenceCorpus, CliError> {
    let path = flag.or_else(|| settings.corpus.clone()).ok_or_else(|| {
        CliError::args("no reference list given")
            .with_hint("pass --corpus FILE or set `corpus` in settings.toml")
    })?;
    let corpus = corpus::load_reference_list(&path).map_err(CliError::io)?;
    if corpus.is_empty() {
        log::warn!("reference list {} has no names; nothing will match", path.display());
    }
    Ok(corpus)
}

// ============================================================================
// match
// ============================================================================

fn cmd_match(
    query: String,
    corpus: Option<PathBuf>,
    matching: MatchArgs,
    json: bool,
    settings: &Settings,
) -> Result<(), CliError> {
    let policy = resolve_policy(&matching, settings)?;
    let corpus = resolve_corpus(corpus, settings)?;
    let candidates = extract(&normalize(&query), &corpus, &policy);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let text = serde_json::to_string_pretty(&candidates)
            .map_err(|e| CliError::error(format!("JSON serialization failed: {}", e)))?;
        writeln!(out, "{}", text).map_err(|e| CliError::io(e.to_string()))?;
        return Ok(());
    }

    if candidates.is_empty() {
        eprintln!("no reference name scored {} or more", policy.cutoff);
        return Ok(());
    }
    for candidate in &candidates {
        writeln!(out, "{:>3}%  {}", candidate.score, candidate.reference_name)
            .map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

// ============================================================================
// titles
// ============================================================================

fn cmd_titles(inputs: Vec<PathBuf>, json: bool) -> Result<(), CliError> {
    let files = intake::collect_pdfs(&inputs).map_err(CliError::io)?;
    let store = PdfTitleStore;

    let mut entries = Vec::with_capacity(files.len());
    let mut unreadable = 0usize;
    for file in &files {
        let entry = match store.read_title(&file.content) {
            Ok(title) => serde_json::json!({ "file": file.name, "title": title }),
            Err(e) => {
                unreadable += 1;
                serde_json::json!({ "file": file.name, "error": e.to_string() })
            }
        };
        entries.push(entry);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let text = serde_json::to_string_pretty(&entries)
            .map_err(|e| CliError::error(format!("JSON serialization failed: {}", e)))?;
        writeln!(out, "{}", text).map_err(|e| CliError::io(e.to_string()))?;
    } else {
        let width = files.iter().map(|f| util::display_width(&f.name)).max().unwrap_or(0);
        for entry in &entries {
            let name = entry["file"].as_str().unwrap_or_default();
            let value = match entry.get("error").and_then(|e| e.as_str()) {
                Some(err) => format!("({})", err),
                None => entry["title"].as_str().unwrap_or_default().to_string(),
            };
            writeln!(out, "{}  {}", util::pad_right(name, width), value)
                .map_err(|e| CliError::io(e.to_string()))?;
        }
    }

    if unreadable > 0 {
        return Err(CliError::io(format!(
            "{} could not be read",
            util::plural(unreadable, "document")
        )));
    }
    Ok(())
}

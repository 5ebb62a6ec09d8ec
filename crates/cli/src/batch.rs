// `retitle run`: intake, matching, review, finalization, output files

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use retitle_config::Settings;
use retitle_io::{intake, FileEmitter, PdfTitleStore, ReportFormat};
use retitle_recon::{
    BatchOutput, ConfirmOutcome, OutputEmitter, ReconError, ReconSession, TitleStore,
};

use crate::review::{self, ReviewExit};
use crate::{resolve_corpus, resolve_policy, util, CliError, RunArgs};

pub(crate) fn cmd_run(args: RunArgs, settings: &Settings) -> Result<(), CliError> {
    let policy = resolve_policy(&args.matching, settings)?;
    let corpus = resolve_corpus(args.corpus.clone(), settings)?;

    let format = match args.report_format {
        Some(arg) => ReportFormat::from(arg),
        None => settings
            .output
            .report_format
            .parse::<ReportFormat>()
            .map_err(CliError::config)?,
    };
    // Resolve every output path before review so a bad setting fails fast
    let date = render_date(&settings.output.date_format)?;
    let out_dir = args
        .out
        .clone()
        .or_else(|| settings.output.dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&out_dir)
        .map_err(|e| CliError::io(format!("cannot create {}: {}", out_dir.display(), e)))?;
    let archive_path = out_dir.join(settings.output.archive_file_name(&date));
    let report_path = out_dir.join(settings.output.report_file_name(format.extension()));
    let emitter = FileEmitter::new(format, settings.output.sheet_name.clone())
        .with_output_paths(&report_path, &archive_path);

    let files = intake::collect_pdfs(&args.inputs).map_err(CliError::io)?;
    let store = PdfTitleStore;
    let corpus_size = corpus.len();
    let mut session = ReconSession::open(files, corpus, policy, &store);
    session.initialize().map_err(CliError::recon)?;

    if !args.quiet && !args.json {
        eprintln!(
            "{} matched against {}",
            util::plural(session.len(), "document"),
            util::plural(corpus_size, "reference name")
        );
    }

    let output = if args.yes {
        confirm_all(&mut session, args.select_top)?;
        session.finalize(&store, &emitter).map_err(CliError::recon)?
    } else {
        review_until_done(&mut session, &store, &emitter)?
    };

    log::info!("wrote {} and {}", report_path.display(), archive_path.display());

    if args.json {
        print_json(&session, &output, &archive_path, &report_path)?;
    } else if !args.quiet {
        print_summary(&session, &output, &archive_path, &report_path);
    }
    Ok(())
}

/// Non-interactive review: commit every record with its default name.
fn confirm_all(session: &mut ReconSession, select_top: bool) -> Result<(), CliError> {
    loop {
        let has_match = session.current().map(|r| !r.matches.is_empty()).unwrap_or(false);
        if select_top && has_match {
            session.toggle_match(0).map_err(CliError::recon)?;
        }
        match session.confirm().map_err(CliError::recon)? {
            ConfirmOutcome::ReadyToFinalize => return Ok(()),
            ConfirmOutcome::Committed => session.next().map_err(CliError::recon)?,
        }
    }
}

/// Interactive review; an output failure reopens the review screen so the
/// operator can confirm the last record again.
fn review_until_done(
    session: &mut ReconSession,
    store: &impl TitleStore,
    emitter: &impl OutputEmitter,
) -> Result<BatchOutput, CliError> {
    let mut notice = None;
    loop {
        match review::run(session, notice.take()).map_err(CliError::error)? {
            ReviewExit::Quit => return Err(CliError::aborted()),
            ReviewExit::Finalize => match session.finalize(store, emitter) {
                Ok(output) => return Ok(output),
                Err(ReconError::Emit(msg)) => {
                    notice = Some(format!(
                        "output generation failed: {} (Enter on the last document retries)",
                        msg
                    ));
                }
                Err(e) => return Err(CliError::recon(e)),
            },
        }
    }
}

/// Today's date in the configured strftime format.
fn render_date(format: &str) -> Result<String, CliError> {
    let mut out = String::new();
    write!(out, "{}", chrono::Local::now().format(format))
        .map_err(|_| CliError::config(format!("invalid output.date_format {:?}", format)))?;
    Ok(out)
}

fn print_summary(session: &ReconSession, output: &BatchOutput, archive: &Path, report: &Path) {
    let summary = &output.summary;
    eprintln!(
        "Renamed {} ({} failed)",
        util::plural(output.archived.len(), "document"),
        summary.failed
    );
    eprintln!("  metadata titles changed: {}", summary.title_changes);
    eprintln!("  filenames changed:       {}", summary.name_changes);
    eprintln!("  archive: {}", archive.display());
    eprintln!("  report:  {}", report.display());

    let failures = session.failures();
    if !failures.is_empty() {
        eprintln!("Failed documents:");
        for (name, reason) in failures {
            eprintln!("  {}: {}", name, reason);
        }
    }
}

fn print_json(
    session: &ReconSession,
    output: &BatchOutput,
    archive: &Path,
    report: &Path,
) -> Result<(), CliError> {
    let failures: Vec<_> = session
        .failures()
        .into_iter()
        .map(|(file, reason)| serde_json::json!({ "file": file, "reason": reason }))
        .collect();
    let value = serde_json::json!({
        "archive": archive.display().to_string(),
        "report": report.display().to_string(),
        "archived": output.archived,
        "summary": output.summary,
        "failures": failures,
        "rows": output.rows.rows,
    });
    let text = serde_json::to_string_pretty(&value)
        .map_err(|e| CliError::error(format!("JSON serialization failed: {}", e)))?;
    println!("{}", text);
    Ok(())
}

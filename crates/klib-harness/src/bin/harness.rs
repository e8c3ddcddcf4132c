//! CLI entrypoint for the klib conformance harness.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use klib_core::stdio;
use klib_harness::executor::{ArgSpec, policy_for_mode};
use klib_harness::fixtures;
use klib_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, now_utc, validate_log_file,
};
use klib_harness::{ConformanceReport, TestRunner, VerificationResult, VerificationSummary};

/// Environment variable selecting the default mode.
const MODE_ENV: &str = "KLIB_MODE";

/// Conformance tooling for klib.
#[derive(Debug, Parser)]
#[command(name = "harness")]
#[command(about = "Conformance testing harness for klib")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify klib against JSON fixtures.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// `strict`, `hardened`, or `both`.
        #[arg(long, default_value = "both")]
        mode: String,
        /// Output report path (markdown; a `.json` twin is written next to it).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Validate a structured JSONL log file.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
    /// Format a string with the klib formatter and print it.
    Format {
        /// `strict` or `hardened` (defaults to `$KLIB_MODE`, then strict).
        #[arg(long)]
        mode: Option<String>,
        /// Format string.
        format: String,
        /// Arguments as `int:N`, `uint:N` or `str:TEXT`.
        args: Vec<String>,
    },
}

fn modes_for(mode: &str) -> Result<Vec<&'static str>, String> {
    match mode.trim().to_ascii_lowercase().as_str() {
        "strict" => Ok(vec!["strict"]),
        "hardened" => Ok(vec!["hardened"]),
        "both" => Ok(vec!["strict", "hardened"]),
        other => Err(format!("unknown mode '{other}' (expected strict|hardened|both)")),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            mode,
            report,
            log,
            timestamp,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let modes = modes_for(&mode)?;
            let fixture_sets = fixtures::load_dir(&fixture)?;
            if fixture_sets.is_empty() {
                return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
            }

            let mut results: Vec<VerificationResult> = Vec::new();
            for active in &modes {
                let runner = TestRunner::new("fixture-verify", *active);
                for set in &fixture_sets {
                    results.extend(runner.run(set));
                }
            }

            // Stable ordering keeps reports diffable between runs.
            results.sort_by(|a, b| {
                a.family
                    .cmp(&b.family)
                    .then_with(|| a.symbol.cmp(&b.symbol))
                    .then_with(|| a.mode.cmp(&b.mode))
                    .then_with(|| a.case_name.cmp(&b.case_name))
            });

            let timestamp = timestamp.unwrap_or_else(now_utc);

            if let Some(log_path) = &log {
                let mut emitter = LogEmitter::to_file(log_path, "fixture-verify", &timestamp)?;
                emitter.emit(LogLevel::Info, "verify_start")?;
                for result in &results {
                    emitter.emit_entry(LogEntry::for_result(result))?;
                }
                emitter.flush()?;
                eprintln!("Wrote structured log to {}", log_path.display());
            }

            let summary = VerificationSummary::from_results(results);
            let report_doc = ConformanceReport {
                title: String::from("klib Conformance Report"),
                mode: modes.join("+"),
                timestamp: timestamp.clone(),
                summary,
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );

            if let Some(report_path) = report {
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;

                let mut index = ArtifactIndex::new(&timestamp);
                index.add_file(&report_path, "report_markdown")?;
                index.add_file(&json_path, "report_json")?;
                if let Some(log_path) = &log {
                    index.add_file(log_path, "structured_log")?;
                }
                let index_path = report_path.with_extension("artifacts.json");
                std::fs::write(&index_path, index.to_json()?)?;
            }

            if !report_doc.summary.all_passed() {
                for failed in report_doc.summary.results.iter().filter(|r| !r.passed) {
                    eprintln!("FAIL {} ({})", failed.case_name, failed.mode);
                }
                return Err("Conformance verification failed".into());
            }
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            if !errors.is_empty() {
                return Err(format!("{} invalid field(s) in {lines} line(s)", errors.len()).into());
            }
            eprintln!("{}: {lines} valid line(s)", log.display());
        }
        Command::Format { mode, format, args } => {
            let mode = mode
                .or_else(|| std::env::var(MODE_ENV).ok())
                .unwrap_or_else(|| String::from("strict"));
            let policy = policy_for_mode(&mode);
            let specs = args
                .iter()
                .map(|a| ArgSpec::parse_cli(a))
                .collect::<Result<Vec<_>, _>>()?;
            let format_args: Vec<_> = specs.iter().map(ArgSpec::as_format_arg).collect();

            let mut fmt = format.into_bytes();
            fmt.push(0);

            let mut stdout = std::io::stdout().lock();
            let mut write_err = None;
            let mut console = |bytes: &[u8]| {
                if let Err(err) = stdout.write_all(bytes) {
                    write_err = Some(err);
                }
            };
            let written = stdio::printf_with(&mut console, &fmt, &format_args, policy)?;
            if let Some(err) = write_err {
                return Err(err.into());
            }
            eprintln!("\n[{mode}] {written} byte(s)");
        }
    }

    Ok(())
}

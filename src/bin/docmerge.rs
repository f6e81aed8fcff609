//! CLI binary for docmerge.
//!
//! A thin shim over the library crate that maps CLI flags to `MergeConfig`
//! and prints outcomes.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docmerge::{
    convert_docx, inspect, merge_mixed, ConversionResult, MergeConfig, MergeOutcome,
    MergeProgressCallback, ProgressCallback, UnsupportedPolicy,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar across the job's inputs plus a log
/// line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed(&self, position: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&position))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl MergeProgressCallback for CliProgressCallback {
    fn on_job_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);
        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Processing");
    }

    fn on_file_start(&self, position: usize, _total: usize, path: &Path) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(position, Instant::now());
        }
        self.bar.set_message(file_name(path));
    }

    fn on_file_complete(&self, position: usize, total: usize, path: &Path) {
        let secs = self.elapsed(position);
        self.bar.println(format!(
            "  {} {:>3}/{:<3} {}  {}",
            green("✓"),
            position,
            total,
            file_name(path),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, position: usize, total: usize, _path: &Path, message: &str) {
        let secs = self.elapsed(position);
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {:>3}/{:<3} {}  {}",
            red("✗"),
            position,
            total,
            red(message),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_merge_start(&self, file_count: usize) {
        self.bar.set_prefix("Merging");
        self.bar.set_message(format!("{file_count} PDFs"));
    }

    fn on_job_complete(&self, success: bool) {
        self.bar.finish_and_clear();
        let errors = self.errors.load(Ordering::SeqCst);
        if !success && errors > 0 {
            eprintln!("{} {} file(s) failed", red("✘"), bold(&errors.to_string()));
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one Word document next to itself
  docmerge convert report.docx

  # Convert into another directory
  docmerge convert report.docx -d out/

  # Merge a mixed list, in order, into one PDF
  docmerge merge cover.docx scan.pdf annex.docx -o bundle.pdf

  # Fail instead of skipping files that are neither DOCX nor PDF
  docmerge merge --reject-unsupported a.pdf notes.txt -o out.pdf

  # Page count and version of a PDF
  docmerge inspect bundle.pdf

  # Machine-readable outcome
  docmerge --json merge a.docx b.pdf -o out.pdf > outcome.json

ENVIRONMENT VARIABLES:
  DOCMERGE_OFFICE      Office executable (default: soffice, then libreoffice)
  PDFIUM_LIB_PATH      Path to the pdfium shared library
  DOCMERGE_TEMP_DIR    Parent directory for per-job temp workspaces
  RUST_LOG             Override the log filter (e.g. docmerge=debug)

SETUP:
  DOCX input needs LibreOffice installed. Merging needs a pdfium shared
  library: put it next to the binary, in the working directory, or point
  PDFIUM_LIB_PATH at it.
"#;

/// Convert DOCX to PDF and merge mixed DOCX/PDF lists into one PDF.
#[derive(Parser, Debug)]
#[command(
    name = "docmerge",
    version,
    about = "Convert DOCX to PDF and merge mixed DOCX/PDF lists into one PDF",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Office executable used to render DOCX files.
    #[arg(long, global = true, env = "DOCMERGE_OFFICE")]
    office: Option<PathBuf>,

    /// Path to the pdfium shared library.
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Parent directory for per-job temporary workspaces.
    #[arg(long, global = true, env = "DOCMERGE_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Print the outcome as JSON on stdout.
    #[arg(long, global = true, env = "DOCMERGE_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, global = true, env = "DOCMERGE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCMERGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCMERGE_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one DOCX file to PDF.
    Convert {
        /// The .docx file to convert.
        input: PathBuf,

        /// Directory for the PDF. Default: the input's directory.
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,
    },

    /// Merge DOCX and PDF files, in the given order, into one PDF.
    Merge {
        /// Input files; .docx files are converted first.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Destination PDF. Overwritten if it exists.
        #[arg(short, long)]
        output: PathBuf,

        /// Fail the job on files that are neither .docx nor .pdf.
        #[arg(long)]
        reject_unsupported: bool,
    },

    /// Print the page count and version of a PDF.
    Inspect {
        /// The PDF to inspect.
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let g = &cli.global;

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar gives all the feedback that matters, so library INFO
    // logs are hidden while it is shown.
    let show_progress = !g.quiet && !g.no_progress && !g.json;
    let filter = if g.verbose {
        "debug"
    } else if g.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Convert {
            ref input,
            ref output_dir,
        } => {
            let output_dir = match output_dir {
                Some(dir) => dir.clone(),
                None => input
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")),
            };
            let config = build_config(g, None, show_progress)?;
            let input = input.clone();
            let result = tokio::task::spawn_blocking(move || convert_docx(&input, &output_dir, &config))
                .await
                .context("Conversion task failed")?;
            report_conversion(g, &result)
        }

        Command::Merge {
            ref inputs,
            ref output,
            reject_unsupported,
        } => {
            let policy = if reject_unsupported {
                UnsupportedPolicy::Reject
            } else {
                UnsupportedPolicy::Skip
            };
            let config = build_config(g, Some(policy), show_progress)?;
            let inputs = inputs.clone();
            let out = output.clone();
            let outcome = tokio::task::spawn_blocking(move || merge_mixed(&inputs, &out, &config))
                .await
                .context("Merge task failed")?;
            report_merge(g, &outcome)
        }

        Command::Inspect { ref input } => {
            let config = build_config(g, None, false)?;
            let path = input.clone();
            let info = tokio::task::spawn_blocking(move || inspect(&path, &config))
                .await
                .context("Inspect task failed")?
                .with_context(|| format!("Failed to inspect {}", input.display()))?;

            if g.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&info).context("Failed to serialise info")?
                );
            } else {
                println!("File:         {}", info.path.display());
                println!("Pages:        {}", info.page_count);
                println!("PDF Version:  {}", info.pdf_version);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Map global flags to `MergeConfig`.
fn build_config(
    g: &GlobalArgs,
    policy: Option<UnsupportedPolicy>,
    show_progress: bool,
) -> Result<MergeConfig> {
    let mut builder = MergeConfig::builder();
    if let Some(ref office) = g.office {
        builder = builder.office_program(office);
    }
    if let Some(ref lib) = g.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }
    if let Some(ref dir) = g.temp_dir {
        builder = builder.temp_root(dir);
    }
    if let Some(policy) = policy {
        builder = builder.unsupported(policy);
    }
    let progress: Option<ProgressCallback> =
        show_progress.then(|| CliProgressCallback::new() as Arc<dyn MergeProgressCallback>);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

fn report_conversion(g: &GlobalArgs, result: &ConversionResult) -> Result<ExitCode> {
    if g.json {
        println!(
            "{}",
            serde_json::to_string_pretty(result).context("Failed to serialise result")?
        );
    } else if result.success {
        if !g.quiet {
            eprintln!("{} {}", green("✔"), result.message);
        }
    } else {
        eprintln!("{} {}", red("✘"), result.message);
    }
    Ok(exit_code(result.success))
}

fn report_merge(g: &GlobalArgs, outcome: &MergeOutcome) -> Result<ExitCode> {
    if g.json {
        println!(
            "{}",
            serde_json::to_string_pretty(outcome).context("Failed to serialise outcome")?
        );
        return Ok(exit_code(outcome.success));
    }

    if !outcome.success {
        for line in &outcome.messages {
            eprintln!("{} {}", red("✘"), line);
        }
        return Ok(exit_code(false));
    }

    if !g.quiet {
        for line in &outcome.messages {
            let mark = if line.starts_with("Skipped") {
                yellow("⚠")
            } else {
                green("✔")
            };
            eprintln!("{mark} {line}");
        }
        let s = &outcome.stats;
        eprintln!(
            "   {} pages from {} files ({} converted, {} skipped)  {}ms",
            bold(&s.total_pages.to_string()),
            s.merged_files,
            s.converted_files,
            s.skipped_files,
            s.duration_ms,
        );
    }
    Ok(exit_code(true))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

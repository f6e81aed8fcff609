//! Mixed-file merge: DOCX and PDF inputs in, one PDF out.
//!
//! ## Job lifecycle
//!
//! ```text
//! Start ─▶ Converting(1) ─▶ … ─▶ Converting(n) ─┬─▶ Merging ───────┐
//!                                               ├─▶ SkippedNoInput ├─▶ Cleanup ─▶ Done
//!                                               └─▶ Aborted ───────┘
//! ```
//!
//! 1. A fresh [`TempWorkspace`] is created for the job.
//! 2. Inputs are walked in caller order. PDFs are queued as-is; DOCX files
//!    are converted one at a time into their own workspace slot and the
//!    temporary PDF is queued in their place. A failed conversion is
//!    recorded and the walk continues.
//! 3. If nothing was queued the job fails with "nothing to merge".
//!    Otherwise, if every entry succeeded, the queue goes to [`PdfMerger`].
//!    Any recorded failure aborts the merge: a document with silently
//!    missing sections is worse than no document.
//! 4. The workspace is removed on every path, including panics.
//!
//! Conversions are strictly sequential: office automation is not
//! reentrant, and the caller's order is the output's page order.

use crate::config::{MergeConfig, UnsupportedPolicy};
use crate::convert::DocumentConverter;
use crate::error::{DocMergeError, FailureKind, FileError};
use crate::merge::PdfMerger;
use crate::output::{FileReport, FileStatus, MergeOutcome};
use crate::pipeline::input::{InputEntry, InputKind, InputSpec};
use crate::pipeline::workspace::TempWorkspace;
use crate::progress::ProgressCallback;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs mixed DOCX/PDF merge jobs.
///
/// Cheap to clone; clones share the converter and merger backends.
#[derive(Clone)]
pub struct MixedMergeOrchestrator {
    converter: DocumentConverter,
    merger: PdfMerger,
    config: MergeConfig,
}

impl MixedMergeOrchestrator {
    /// Assemble an orchestrator from explicit collaborators.
    ///
    /// `config` supplies the workspace location, the unsupported-input
    /// policy and the job-level progress callback.
    pub fn new(converter: DocumentConverter, merger: PdfMerger, config: MergeConfig) -> Self {
        Self {
            converter,
            merger,
            config,
        }
    }

    /// LibreOffice for conversion, pdfium for merging.
    pub fn from_config(config: &MergeConfig) -> Self {
        Self::new(
            DocumentConverter::from_config(config),
            PdfMerger::from_config(config),
            config.clone(),
        )
    }

    /// Merge a list of paths; see [`Self::merge_mixed`].
    pub fn merge_paths<P: AsRef<Path>>(&self, inputs: &[P], output: &Path) -> MergeOutcome {
        let spec = InputSpec::from_paths(inputs.iter().map(|p| p.as_ref().to_path_buf()));
        self.merge_mixed(&spec, output)
    }

    /// Convert the DOCX members of `inputs`, then merge everything, in
    /// order, into `output`.
    pub fn merge_mixed(&self, inputs: &InputSpec, output: &Path) -> MergeOutcome {
        let start = Instant::now();
        let progress = self.config.progress_callback.as_ref();
        info!(
            "Starting mixed merge of {} files ({} DOCX, {} PDF) into {}",
            inputs.len(),
            inputs.count(InputKind::Docx),
            inputs.count(InputKind::Pdf),
            output.display()
        );
        if let Some(cb) = progress {
            cb.on_job_start(inputs.len());
        }

        let mut outcome = match TempWorkspace::create(&self.config) {
            Ok(workspace) => {
                let outcome = self.run(inputs, output, &workspace);
                workspace.close();
                outcome
            }
            Err(e) => {
                let mut outcome = MergeOutcome::new(inputs.len());
                let error = FileError {
                    kind: FailureKind::Generic,
                    path: output.to_path_buf(),
                    message: e.to_string(),
                    detail: e.to_string(),
                };
                outcome.fail(error, format!("Merge failed: {e}"));
                outcome
            }
        };

        outcome.stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Mixed merge finished: success={}, {} merged, {} failed, {} skipped, {}ms",
            outcome.success,
            outcome.stats.merged_files,
            outcome.stats.failed_files,
            outcome.stats.skipped_files,
            outcome.stats.duration_ms
        );
        if let Some(cb) = progress {
            cb.on_job_complete(outcome.success);
        }
        outcome
    }

    /// Run [`Self::merge_mixed`] on tokio's blocking pool, keeping the
    /// caller's runtime free while office and pdfium calls block.
    pub async fn merge_mixed_async(
        &self,
        inputs: InputSpec,
        output: impl Into<PathBuf>,
    ) -> Result<MergeOutcome, DocMergeError> {
        let this = self.clone();
        let output = output.into();
        tokio::task::spawn_blocking(move || this.merge_mixed(&inputs, &output))
            .await
            .map_err(|e| DocMergeError::Internal(format!("Merge task panicked: {}", e)))
    }

    /// The body of a job, between workspace creation and cleanup.
    fn run(&self, inputs: &InputSpec, output: &Path, workspace: &TempWorkspace) -> MergeOutcome {
        let total = inputs.len();
        let progress = self.config.progress_callback.as_ref();
        let mut outcome = MergeOutcome::new(total);
        let mut queue: Vec<PathBuf> = Vec::with_capacity(total);

        for entry in inputs.entries() {
            let position = entry.index + 1;
            if let Some(cb) = progress {
                cb.on_file_start(position, total, &entry.path);
            }

            let step = match entry.kind {
                InputKind::Pdf => {
                    debug!("Queued PDF {}", entry.path.display());
                    Step::Ready(entry.path.clone(), FileStatus::Queued)
                }
                InputKind::Docx => self.convert_entry(entry, workspace),
                InputKind::Unsupported => self.unsupported_entry(entry),
            };

            match step {
                Step::Ready(pdf, status) => {
                    if status == FileStatus::Converted {
                        outcome.stats.converted_files += 1;
                    }
                    queue.push(pdf);
                    outcome.files.push(FileReport::new(entry, status, None));
                    notify_complete(progress, position, total, &entry.path);
                }
                Step::Skipped(line) => {
                    warn!("{}", line);
                    outcome.stats.skipped_files += 1;
                    notify_error(progress, position, total, &entry.path, &line);
                    outcome.messages.push(line);
                    outcome
                        .files
                        .push(FileReport::new(entry, FileStatus::Skipped, None));
                }
                Step::Failed(error, line) => {
                    outcome.stats.failed_files += 1;
                    notify_error(progress, position, total, &entry.path, &line);
                    outcome
                        .files
                        .push(FileReport::new(entry, FileStatus::Failed, Some(error.clone())));
                    outcome.fail(error, line);
                }
            }
        }

        if queue.is_empty() {
            let message = DocMergeError::NoValidInput.to_string();
            let error = FileError {
                kind: FailureKind::NoValidInput,
                path: output.to_path_buf(),
                message: message.clone(),
                detail: String::new(),
            };
            outcome.fail(error.clone(), message);
            // Nothing left to merge outranks whatever emptied the queue.
            outcome.error = Some(error);
            return outcome;
        }

        if !outcome.success {
            info!(
                "Not merging: {} of {} inputs failed",
                outcome.stats.failed_files, total
            );
            return outcome;
        }

        let merged = self.merger.merge(&queue, output);
        outcome.success = merged.success;
        outcome.messages.extend(merged.messages);
        outcome.output_path = merged.output_path;
        if outcome.error.is_none() {
            outcome.error = merged.error;
        }
        outcome.stats.merged_files = merged.stats.merged_files;
        outcome.stats.total_pages = merged.stats.total_pages;
        outcome
    }

    fn convert_entry(&self, entry: &InputEntry, workspace: &TempWorkspace) -> Step {
        let name = entry.display_name();
        let slot = match workspace.slot(entry.index) {
            Ok(slot) => slot,
            Err(e) => {
                let error = FileError {
                    kind: FailureKind::Generic,
                    path: entry.path.clone(),
                    message: e.to_string(),
                    detail: e.to_string(),
                };
                return Step::Failed(error, format!("Failed to convert {name}: {e}"));
            }
        };

        let result = self.converter.run(&entry.path, &slot);
        match (result.output_path, result.error) {
            (Some(pdf), None) if result.success => Step::Ready(pdf, FileStatus::Converted),
            (_, error) => {
                let line = format!("Failed to convert {name}: {}", result.message);
                let error = error.unwrap_or_else(|| FileError {
                    kind: FailureKind::Generic,
                    path: entry.path.clone(),
                    message: result.message.clone(),
                    detail: String::new(),
                });
                Step::Failed(error, line)
            }
        }
    }

    fn unsupported_entry(&self, entry: &InputEntry) -> Step {
        let name = entry.display_name();
        match self.config.unsupported {
            UnsupportedPolicy::Skip => Step::Skipped(format!("Skipped {name}: unsupported file type")),
            UnsupportedPolicy::Reject => {
                let error = FileError {
                    kind: FailureKind::UnsupportedInput,
                    path: entry.path.clone(),
                    message: DocMergeError::UnsupportedInput {
                        path: entry.path.clone(),
                    }
                    .to_string(),
                    detail: String::new(),
                };
                let line = format!("Rejected {name}: unsupported file type (expected .docx or .pdf)");
                Step::Failed(error, line)
            }
        }
    }
}

/// What one input contributed to the job.
enum Step {
    /// A PDF ready to merge.
    Ready(PathBuf, FileStatus),
    /// Left out without failing the job.
    Skipped(String),
    /// Left out and the job fails.
    Failed(FileError, String),
}

fn notify_complete(progress: Option<&ProgressCallback>, position: usize, total: usize, path: &Path) {
    if let Some(cb) = progress {
        cb.on_file_complete(position, total, path);
    }
}

fn notify_error(
    progress: Option<&ProgressCallback>,
    position: usize,
    total: usize,
    path: &Path,
    message: &str,
) {
    if let Some(cb) = progress {
        cb.on_file_error(position, total, path, message);
    }
}

/// Merge a mixed DOCX/PDF list with LibreOffice and pdfium.
pub fn merge_mixed<P: AsRef<Path>>(
    inputs: &[P],
    output: impl AsRef<Path>,
    config: &MergeConfig,
) -> MergeOutcome {
    MixedMergeOrchestrator::from_config(config).merge_paths(inputs, output.as_ref())
}

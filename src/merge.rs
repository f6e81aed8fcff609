//! PDF concatenation: many PDFs in, one PDF out.
//!
//! [`PdfMerger`] enforces the merge contract on top of a [`PdfEngine`]:
//!
//! - an empty list fails before anything touches the file system;
//! - one unreadable input fails the whole merge, with no output;
//! - output is written atomically (staged next to the destination, then
//!   renamed over it), so a failed merge never leaves a truncated PDF and a
//!   successful one replaces any existing file in a single step.

use crate::config::MergeConfig;
use crate::error::{DocMergeError, FailureKind, FileError};
use crate::output::{MergeOutcome, PdfInfo};
use crate::pipeline::classify::{classify, classify_io, user_message, Stage};
use crate::pipeline::input::display_name;
use crate::pipeline::pdf::{PdfEngine, PdfEngineError, PdfiumEngine};
use crate::progress::ProgressCallback;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Concatenates PDFs in caller order.
///
/// Cheap to clone; clones share the engine.
#[derive(Clone)]
pub struct PdfMerger {
    engine: Arc<dyn PdfEngine>,
    progress: Option<ProgressCallback>,
}

impl PdfMerger {
    pub fn new(engine: Arc<dyn PdfEngine>) -> Self {
        Self {
            engine,
            progress: None,
        }
    }

    /// A merger using pdfium and the config's progress callback.
    pub fn from_config(config: &MergeConfig) -> Self {
        Self {
            engine: Arc::new(PdfiumEngine::from_config(config)),
            progress: config.progress_callback.clone(),
        }
    }

    pub fn with_progress(mut self, cb: ProgressCallback) -> Self {
        self.progress = Some(cb);
        self
    }

    /// Merge `inputs`, in order, into `output`.
    pub fn merge(&self, inputs: &[PathBuf], output: &Path) -> MergeOutcome {
        let start = Instant::now();
        let mut outcome = MergeOutcome::new(inputs.len());

        if inputs.is_empty() {
            let error = FileError {
                kind: FailureKind::EmptyInput,
                path: output.to_path_buf(),
                message: DocMergeError::EmptyInput.to_string(),
                detail: String::new(),
            };
            let line = error.message.clone();
            outcome.fail(error, line);
            return outcome;
        }

        if let Some(ref cb) = self.progress {
            cb.on_merge_start(inputs.len());
        }
        info!("Merging {} files into {}", inputs.len(), output.display());

        match self.write(inputs, output) {
            Ok(pages) => {
                outcome.stats.merged_files = inputs.len();
                outcome.stats.total_pages = pages;
                outcome.output_path = Some(output.to_path_buf());
                outcome.messages.push(format!(
                    "Successfully merged {} file(s) into: {}",
                    inputs.len(),
                    output.display()
                ));
            }
            Err(error) => {
                warn!("Merge into {} failed: {}", output.display(), error.detail);
                let line = error.message.clone();
                outcome.fail(error, line);
            }
        }

        outcome.stats.duration_ms = start.elapsed().as_millis() as u64;
        outcome
    }

    /// Run [`Self::merge`] on tokio's blocking pool.
    pub async fn merge_async(
        &self,
        inputs: Vec<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Result<MergeOutcome, DocMergeError> {
        let this = self.clone();
        let output = output.into();
        tokio::task::spawn_blocking(move || this.merge(&inputs, &output))
            .await
            .map_err(|e| DocMergeError::Internal(format!("Merge task panicked: {}", e)))
    }

    /// Page count and version of one PDF.
    pub fn inspect(&self, path: &Path) -> Result<PdfInfo, DocMergeError> {
        self.engine.inspect(path).map_err(|e| match e {
            PdfEngineError::Unavailable(detail) => DocMergeError::PdfiumBindingFailed(detail),
            PdfEngineError::Read { path, detail } | PdfEngineError::Write { path, detail } => {
                DocMergeError::ReadFailure { path, detail }
            }
        })
    }

    /// Stage, concatenate, then move into place.
    fn write(&self, inputs: &[PathBuf], output: &Path) -> Result<usize, FileError> {
        let parent = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| io_failure(output, &e))?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(".docmerge-").suffix(".pdf.tmp");
        // tempfile defaults to 0600; a new output gets the usual umask mode.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let staged = builder
            .tempfile_in(parent)
            .map_err(|e| io_failure(output, &e))?
            .into_temp_path();
        debug!("Staging merged PDF at {}", staged.display());

        // Dropping `staged` on any error below deletes the partial file.
        let pages = self
            .engine
            .concatenate(inputs, &staged)
            .map_err(|e| engine_failure(output, e))?;

        // The rename must not change who can read an existing output.
        if let Ok(existing) = std::fs::metadata(output) {
            std::fs::set_permissions(&staged, existing.permissions())
                .map_err(|e| io_failure(output, &e))?;
        }

        staged
            .persist(output)
            .map_err(|e| io_failure(output, &e.error))?;
        Ok(pages)
    }
}

fn io_failure(output: &Path, err: &std::io::Error) -> FileError {
    let kind = classify_io(err);
    FileError {
        kind,
        path: output.to_path_buf(),
        message: user_message(Stage::Merge, kind, &err.to_string()),
        detail: err.to_string(),
    }
}

fn engine_failure(output: &Path, err: PdfEngineError) -> FileError {
    match err {
        PdfEngineError::Read { path, detail } => FileError {
            kind: FailureKind::ReadFailure,
            message: format!("Failed to read file {}: {}", display_name(&path), detail),
            path,
            detail,
        },
        PdfEngineError::Write { detail, .. } => {
            let kind = match classify(&detail) {
                FailureKind::OutputUnwritable => FailureKind::OutputUnwritable,
                _ => FailureKind::Generic,
            };
            FileError {
                kind,
                path: output.to_path_buf(),
                message: user_message(Stage::Merge, kind, &detail),
                detail,
            }
        }
        PdfEngineError::Unavailable(detail) => FileError {
            kind: FailureKind::Generic,
            path: output.to_path_buf(),
            message: format!(
                "Merge failed: {}",
                DocMergeError::PdfiumBindingFailed(detail.clone())
            ),
            detail,
        },
    }
}

/// Merge PDFs using the configured pdfium library.
pub fn merge_pdfs<P: AsRef<Path>>(
    inputs: &[P],
    output: impl AsRef<Path>,
    config: &MergeConfig,
) -> MergeOutcome {
    let inputs: Vec<PathBuf> = inputs.iter().map(|p| p.as_ref().to_path_buf()).collect();
    PdfMerger::from_config(config).merge(&inputs, output.as_ref())
}

/// Page count and version of one PDF, via the configured pdfium library.
pub fn inspect(path: impl AsRef<Path>, config: &MergeConfig) -> Result<PdfInfo, DocMergeError> {
    PdfMerger::from_config(config).inspect(path.as_ref())
}

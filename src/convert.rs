//! Single-document conversion: DOCX → PDF through the office backend.
//!
//! [`DocumentConverter`] owns the conversion policy (destination naming,
//! input checks, failure classification, cleanup of partial output) and
//! leaves the actual rendering to an [`OfficeBackend`]. Each conversion runs
//! inside its own [`crate::pipeline::office::AutomationSession`], which is
//! released when the call returns, whether it succeeded or not.

use crate::config::MergeConfig;
use crate::error::{DocMergeError, FailureKind, FileError};
use crate::output::ConversionResult;
use crate::pipeline::classify::{classify, classify_io, user_message, Stage};
use crate::pipeline::input::{display_name, InputKind};
use crate::pipeline::office::{BackendFailure, LibreOffice, OfficeBackend};
use crate::progress::ProgressCallback;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Converts DOCX files to PDF.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct DocumentConverter {
    backend: Arc<dyn OfficeBackend>,
    progress: Option<ProgressCallback>,
}

impl DocumentConverter {
    pub fn new(backend: Arc<dyn OfficeBackend>) -> Self {
        Self {
            backend,
            progress: None,
        }
    }

    /// A converter using LibreOffice and the config's progress callback.
    pub fn from_config(config: &MergeConfig) -> Self {
        Self {
            backend: Arc::new(LibreOffice::from_config(config)),
            progress: config.progress_callback.clone(),
        }
    }

    pub fn with_progress(mut self, cb: ProgressCallback) -> Self {
        self.progress = Some(cb);
        self
    }

    /// `output_dir` joined with the input's stem and a `.pdf` extension.
    pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        output_dir.join(format!("{stem}.pdf"))
    }

    /// Convert `input` into a PDF inside `output_dir`.
    ///
    /// Never panics on collaborator failures; they come back as a failed
    /// [`ConversionResult`] with an actionable message.
    pub fn convert(&self, input: &Path, output_dir: &Path) -> ConversionResult {
        if let Some(ref cb) = self.progress {
            cb.on_job_start(1);
            cb.on_file_start(1, 1, input);
        }
        let result = self.run(input, output_dir);
        if let Some(ref cb) = self.progress {
            match result.error {
                None => cb.on_file_complete(1, 1, input),
                Some(ref e) => cb.on_file_error(1, 1, input, &e.message),
            }
            cb.on_job_complete(result.success);
        }
        result
    }

    /// Run [`Self::convert`] on tokio's blocking pool.
    pub async fn convert_async(
        &self,
        input: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<ConversionResult, DocMergeError> {
        let this = self.clone();
        let input = input.into();
        let output_dir = output_dir.into();
        tokio::task::spawn_blocking(move || this.convert(&input, &output_dir))
            .await
            .map_err(|e| DocMergeError::Internal(format!("Conversion task panicked: {}", e)))
    }

    /// Conversion without progress events; used by the orchestrator, which
    /// reports progress in terms of the whole job.
    pub(crate) fn run(&self, input: &Path, output_dir: &Path) -> ConversionResult {
        let input_path = input.to_path_buf();

        if InputKind::of(input) != InputKind::Docx {
            let error = FileError {
                kind: FailureKind::UnsupportedInput,
                path: input_path.clone(),
                message: format!(
                    "Conversion failed: {} is not a .docx file",
                    display_name(input)
                ),
                detail: String::new(),
            };
            return ConversionResult::failed(input_path, error);
        }
        if !input.is_file() {
            let error = FileError {
                kind: FailureKind::Generic,
                path: input_path.clone(),
                message: format!(
                    "Conversion failed: input file not found: {}",
                    input.display()
                ),
                detail: "not found".to_string(),
            };
            return ConversionResult::failed(input_path, error);
        }

        if let Err(e) = std::fs::create_dir_all(output_dir) {
            let kind = classify_io(&e);
            let error = FileError {
                kind,
                path: output_dir.to_path_buf(),
                message: user_message(Stage::Conversion, kind, &e.to_string()),
                detail: e.to_string(),
            };
            return ConversionResult::failed(input_path, error);
        }

        let output = Self::output_path_for(input, output_dir);
        let existed_before = output.exists();
        debug!(
            "Converting {} → {} with {}",
            input.display(),
            output.display(),
            self.backend.name()
        );

        match self.export(input, &output) {
            Ok(()) => {
                info!("Converted {} → {}", input.display(), output.display());
                ConversionResult::converted(input_path, output)
            }
            Err(failure) => {
                // Leave nothing behind that we created.
                if !existed_before && output.exists() {
                    if let Err(e) = std::fs::remove_file(&output) {
                        warn!("Could not remove partial output {}: {}", output.display(), e);
                    }
                }
                let kind = classify(&failure.0);
                warn!("Conversion of {} failed ({}): {}", input.display(), kind, failure);
                let error = FileError {
                    kind,
                    path: input_path.clone(),
                    message: user_message(Stage::Conversion, kind, &failure.0),
                    detail: failure.0,
                };
                ConversionResult::failed(input_path, error)
            }
        }
    }

    /// Acquire a session, export, release the session.
    fn export(&self, input: &Path, output: &Path) -> Result<(), BackendFailure> {
        let mut session = self.backend.open_session()?;
        session.export_pdf(input, output)
    }
}

/// Convert one DOCX into `output_dir` using the configured office suite.
pub fn convert_docx(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &MergeConfig,
) -> ConversionResult {
    DocumentConverter::from_config(config).convert(input.as_ref(), output_dir.as_ref())
}

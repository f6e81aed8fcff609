//! Error types for the docmerge library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DocMergeError`]: **Fatal**: the operation produced no output
//!   (nothing to merge, unreadable PDF, office suite missing). Returned as
//!   `Err(DocMergeError)` from [`crate::output::MergeOutcome::into_result`]
//!   and friends, and from setup calls such as config validation.
//!
//! * [`FileError`]: **Non-fatal** at the job level: one input failed
//!   (a DOCX would not convert) but the job kept going over the other
//!   inputs. Stored in [`crate::output::FileReport`] so callers can see
//!   exactly which files went wrong.
//!
//! Both carry a [`FailureKind`], the closed classification used to pick an
//! actionable message for the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Closed classification of everything that can go wrong in a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The office application that renders DOCX is not installed.
    MissingBackend,
    /// The destination is locked or permission-denied.
    OutputUnwritable,
    /// The automation channel to the office process failed.
    AutomationChannel,
    /// A PDF source could not be parsed.
    ReadFailure,
    /// Zero files were handed to a merge.
    EmptyInput,
    /// Every entry was unrecognised or failed, leaving nothing to merge.
    NoValidInput,
    /// The file extension is neither `.docx` nor `.pdf`.
    UnsupportedInput,
    /// Anything else; the raw collaborator message is kept.
    Generic,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::MissingBackend => "missing office backend",
            FailureKind::OutputUnwritable => "output not writable",
            FailureKind::AutomationChannel => "automation channel failure",
            FailureKind::ReadFailure => "PDF read failure",
            FailureKind::EmptyInput => "empty input",
            FailureKind::NoValidInput => "no valid input",
            FailureKind::UnsupportedInput => "unsupported input",
            FailureKind::Generic => "failure",
        };
        f.write_str(s)
    }
}

/// All fatal errors returned by the docmerge library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::FileReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum DocMergeError {
    // ── Office backend errors ─────────────────────────────────────────────
    /// No office suite could be started to render DOCX files.
    #[error(
        "Conversion failed: no office application is installed ({detail}).\n\
Install LibreOffice (or Microsoft Word) to convert DOCX files to PDF."
    )]
    MissingBackend { detail: String },

    /// The automation bridge to the office process failed.
    #[error(
        "Conversion failed: the office application could not be driven ({detail}).\n\
Make sure it is not busy with another document and try again."
    )]
    AutomationChannel { detail: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// A PDF source could not be opened or parsed.
    #[error("Failed to read {path:?}: {detail}")]
    ReadFailure { path: PathBuf, detail: String },

    /// A merge was requested with an empty file list.
    #[error("The file list is empty.")]
    EmptyInput,

    /// Nothing was left to merge after filtering and conversion.
    #[error("No valid files to merge.")]
    NoValidInput,

    /// The file is neither DOCX nor PDF.
    #[error("Unsupported file type: {path:?} (expected .docx or .pdf)")]
    UnsupportedInput { path: PathBuf },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The destination could not be written.
    #[error(
        "Cannot write output file {path:?}: {detail}\n\
Check folder permissions and make sure the file is not open in another application."
    )]
    OutputUnwritable { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF merging needs the pdfium shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium.\n\
  • Pass --pdfium-lib /path/to/libpdfium.\n\
  • Place libpdfium next to the working directory or install it system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Uncategorised collaborator failure, raw message preserved.
    #[error("{0}")]
    Generic(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocMergeError {
    /// The classification of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            DocMergeError::MissingBackend { .. } => FailureKind::MissingBackend,
            DocMergeError::AutomationChannel { .. } => FailureKind::AutomationChannel,
            DocMergeError::ReadFailure { .. } => FailureKind::ReadFailure,
            DocMergeError::EmptyInput => FailureKind::EmptyInput,
            DocMergeError::NoValidInput => FailureKind::NoValidInput,
            DocMergeError::UnsupportedInput { .. } => FailureKind::UnsupportedInput,
            DocMergeError::OutputUnwritable { .. } => FailureKind::OutputUnwritable,
            DocMergeError::InvalidConfig(_)
            | DocMergeError::PdfiumBindingFailed(_)
            | DocMergeError::Generic(_)
            | DocMergeError::Internal(_) => FailureKind::Generic,
        }
    }
}

/// A failure scoped to one input file.
///
/// The `message` is the user-facing line; `detail` keeps the raw text the
/// collaborator produced so nothing is lost by classification.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct FileError {
    pub kind: FailureKind,
    pub path: PathBuf,
    pub message: String,
    pub detail: String,
}

impl FileError {
    /// Promote this per-file failure into the matching fatal error.
    pub fn into_fatal(self) -> DocMergeError {
        match self.kind {
            FailureKind::MissingBackend => DocMergeError::MissingBackend {
                detail: self.detail,
            },
            FailureKind::AutomationChannel => DocMergeError::AutomationChannel {
                detail: self.detail,
            },
            FailureKind::OutputUnwritable => DocMergeError::OutputUnwritable {
                path: self.path,
                detail: self.detail,
            },
            FailureKind::ReadFailure => DocMergeError::ReadFailure {
                path: self.path,
                detail: self.detail,
            },
            FailureKind::EmptyInput => DocMergeError::EmptyInput,
            FailureKind::NoValidInput => DocMergeError::NoValidInput,
            FailureKind::UnsupportedInput => DocMergeError::UnsupportedInput { path: self.path },
            FailureKind::Generic => DocMergeError::Generic(self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_failure_names_the_file() {
        let e = DocMergeError::ReadFailure {
            path: "/tmp/broken.pdf".into(),
            detail: "bad xref".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("broken.pdf"), "got: {msg}");
        assert!(msg.contains("bad xref"), "got: {msg}");
        assert_eq!(e.kind(), FailureKind::ReadFailure);
    }

    #[test]
    fn missing_backend_is_actionable() {
        let e = DocMergeError::MissingBackend {
            detail: "soffice not found".into(),
        };
        assert!(e.to_string().contains("Install LibreOffice"));
    }

    #[test]
    fn config_errors_classify_as_generic() {
        let e = DocMergeError::InvalidConfig("temp prefix is empty".into());
        assert_eq!(e.kind(), FailureKind::Generic);
    }

    #[test]
    fn file_error_promotes_to_matching_fatal() {
        let fe = FileError {
            kind: FailureKind::OutputUnwritable,
            path: "/out/a.pdf".into(),
            message: "cannot write".into(),
            detail: "Permission denied".into(),
        };
        let fatal = fe.into_fatal();
        assert_eq!(fatal.kind(), FailureKind::OutputUnwritable);
        assert!(fatal.to_string().contains("Permission denied"));
    }

    #[test]
    fn failure_kind_serialises_snake_case() {
        let json = serde_json::to_string(&FailureKind::NoValidInput).unwrap();
        assert_eq!(json, "\"no_valid_input\"");
    }
}

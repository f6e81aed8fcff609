//! Configuration types for conversion and merge jobs.
//!
//! All job behaviour is controlled through [`MergeConfig`], built via its
//! [`MergeConfigBuilder`]. One config is shared by the converter, the merger
//! and the orchestrator, so the same office program, pdfium library and
//! temp root apply to every step of a job.

use crate::error::DocMergeError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default prefix of per-job temporary workspaces.
pub const DEFAULT_TEMP_PREFIX: &str = "docmerge-";

/// Configuration for conversion and merge jobs.
///
/// Built via [`MergeConfig::builder()`] or using [`MergeConfig::default()`].
///
/// # Example
/// ```rust
/// use docmerge::{MergeConfig, UnsupportedPolicy};
///
/// let config = MergeConfig::builder()
///     .office_program("/usr/bin/soffice")
///     .unsupported(UnsupportedPolicy::Reject)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct MergeConfig {
    /// Office executable used to render DOCX files. Default: None.
    ///
    /// When unset, `soffice` and then `libreoffice` are looked up on `PATH`.
    pub office_program: Option<PathBuf>,

    /// Explicit path to the pdfium shared library. Default: None.
    ///
    /// When unset, `PDFIUM_LIB_PATH`, the working directory and finally the
    /// system library search path are tried in that order.
    pub pdfium_library: Option<PathBuf>,

    /// Parent directory for per-job temporary workspaces. Default: None
    /// (the system temp directory).
    pub temp_root: Option<PathBuf>,

    /// Name prefix of per-job temporary workspaces. Default: `docmerge-`.
    ///
    /// A random suffix is always appended, so two jobs never share a
    /// workspace even with the same prefix and root.
    pub temp_prefix: String,

    /// What to do with inputs that are neither `.docx` nor `.pdf`.
    /// Default: [`UnsupportedPolicy::Skip`].
    pub unsupported: UnsupportedPolicy,

    /// Receives per-file progress events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            office_program: None,
            pdfium_library: None,
            temp_root: None,
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            unsupported: UnsupportedPolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for MergeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeConfig")
            .field("office_program", &self.office_program)
            .field("pdfium_library", &self.pdfium_library)
            .field("temp_root", &self.temp_root)
            .field("temp_prefix", &self.temp_prefix)
            .field("unsupported", &self.unsupported)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn MergeProgressCallback>"),
            )
            .finish()
    }
}

impl MergeConfig {
    /// Create a new builder for `MergeConfig`.
    pub fn builder() -> MergeConfigBuilder {
        MergeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`MergeConfig`].
#[derive(Debug)]
pub struct MergeConfigBuilder {
    config: MergeConfig,
}

impl MergeConfigBuilder {
    pub fn office_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.office_program = Some(program.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_root = Some(dir.into());
        self
    }

    pub fn temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.temp_prefix = prefix.into();
        self
    }

    pub fn unsupported(mut self, policy: UnsupportedPolicy) -> Self {
        self.config.unsupported = policy;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<MergeConfig, DocMergeError> {
        let c = &self.config;
        if c.temp_prefix.is_empty() {
            return Err(DocMergeError::InvalidConfig(
                "Temp prefix must not be empty".into(),
            ));
        }
        if c.temp_prefix.contains(['/', '\\']) {
            return Err(DocMergeError::InvalidConfig(format!(
                "Temp prefix must be a plain name, got {:?}",
                c.temp_prefix
            )));
        }
        if let Some(ref root) = c.temp_root {
            if !root.is_dir() {
                return Err(DocMergeError::InvalidConfig(format!(
                    "Temp root {:?} is not an existing directory",
                    root
                )));
            }
        }
        if let Some(ref program) = c.office_program {
            if program.as_os_str().is_empty() {
                return Err(DocMergeError::InvalidConfig(
                    "Office program path must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Handling of inputs whose extension is neither `.docx` nor `.pdf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnsupportedPolicy {
    /// Leave the entry out, log a warning and note it in the outcome
    /// without failing the job. (default)
    #[default]
    Skip,
    /// Record the entry as a failure; the job result is `false` but the
    /// remaining entries are still processed.
    Reject,
}

//! Office automation: render DOCX to PDF with an installed office suite.
//!
//! The renderer is an external program treated as a black box. Access goes
//! through two traits:
//!
//! * [`OfficeBackend`]: knows how to reach the office suite and opens one
//!   [`AutomationSession`] per conversion.
//! * [`AutomationSession`]: performs the "save as PDF" call. Dropping the
//!   session releases whatever the backend acquired for it, on success,
//!   failure and unwinding alike.
//!
//! ## Why a session per call?
//!
//! Automation bridges hold per-caller state: COM needs a per-thread
//! initialise/uninitialise pair, and LibreOffice locks its user profile for
//! as long as a process uses it. Scoping that state to exactly one export
//! keeps a failed call from poisoning the next one. For [`LibreOffice`] the
//! session is a throw-away user profile directory passed via
//! `-env:UserInstallation`, so even two jobs converting at the same time
//! never contend for the same profile lock.

use crate::config::MergeConfig;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Programs tried, in order, when no office program is configured.
pub const DEFAULT_OFFICE_PROGRAMS: [&str; 2] = ["soffice", "libreoffice"];

/// Raw failure text from the office collaborator.
///
/// Deliberately unstructured: callers classify it with
/// [`crate::pipeline::classify::classify`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendFailure(pub String);

/// A way to reach an installed office suite.
pub trait OfficeBackend: Send + Sync {
    /// Short human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Acquire the automation context for one conversion.
    fn open_session(&self) -> Result<Box<dyn AutomationSession + '_>, BackendFailure>;
}

/// One acquired automation context. Released on drop.
pub trait AutomationSession {
    /// Render `input` as PDF and store it at exactly `output`.
    ///
    /// The parent directory of `output` exists when this is called.
    fn export_pdf(&mut self, input: &Path, output: &Path) -> Result<(), BackendFailure>;
}

/// LibreOffice driven in headless mode as a child process.
#[derive(Debug, Clone, Default)]
pub struct LibreOffice {
    program: Option<PathBuf>,
}

impl LibreOffice {
    /// Use `program` if given, otherwise search `PATH` for
    /// [`DEFAULT_OFFICE_PROGRAMS`].
    pub fn new(program: Option<PathBuf>) -> Self {
        Self { program }
    }

    pub fn from_config(config: &MergeConfig) -> Self {
        Self::new(config.office_program.clone())
    }

    fn candidates(&self) -> Vec<PathBuf> {
        match self.program {
            Some(ref p) => vec![p.clone()],
            None => DEFAULT_OFFICE_PROGRAMS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl OfficeBackend for LibreOffice {
    fn name(&self) -> &str {
        "LibreOffice"
    }

    fn open_session(&self) -> Result<Box<dyn AutomationSession + '_>, BackendFailure> {
        let profile = tempfile::Builder::new()
            .prefix("docmerge-profile-")
            .tempdir()
            .map_err(|e| BackendFailure(format!("could not create office profile directory: {e}")))?;

        let profile_url = Url::from_directory_path(profile.path())
            .map_err(|_| {
                BackendFailure(format!(
                    "office profile path {} is not absolute",
                    profile.path().display()
                ))
            })?
            .to_string();

        debug!("Opened LibreOffice session with profile {}", profile_url);
        Ok(Box::new(LibreOfficeSession {
            backend: self,
            profile,
            profile_url,
        }))
    }
}

struct LibreOfficeSession<'a> {
    backend: &'a LibreOffice,
    profile: TempDir,
    profile_url: String,
}

impl AutomationSession for LibreOfficeSession<'_> {
    fn export_pdf(&mut self, input: &Path, output: &Path) -> Result<(), BackendFailure> {
        let out_dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let stem = input
            .file_stem()
            .ok_or_else(|| BackendFailure(format!("invalid input file name: {}", input.display())))?;
        // LibreOffice always names its output after the input stem.
        let produced = out_dir.join(format!("{}.pdf", stem.to_string_lossy()));
        let stale = modified_time(&produced);

        let mut tried = Vec::new();
        for program in self.backend.candidates() {
            debug!(
                "Running {} --convert-to pdf {}",
                program.display(),
                input.display()
            );
            let result = Command::new(&program)
                .arg("--headless")
                .arg("--norestore")
                .arg("--nolockcheck")
                .arg(format!("-env:UserInstallation={}", self.profile_url))
                .arg("--convert-to")
                .arg("pdf")
                .arg("--outdir")
                .arg(out_dir)
                .arg(input)
                .output();

            let out = match result {
                Ok(out) => out,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tried.push(program.display().to_string());
                    continue;
                }
                Err(e) => {
                    return Err(BackendFailure(format!(
                        "failed to launch {}: {e}",
                        program.display()
                    )))
                }
            };

            let diagnostics = collect_diagnostics(&out.stderr, &out.stdout);
            if !out.status.success() {
                return Err(BackendFailure(format!(
                    "{} exited with {}: {}",
                    program.display(),
                    out.status,
                    diagnostics
                )));
            }
            // soffice exits 0 even when it could not load the document.
            if !produced.is_file() || (stale.is_some() && modified_time(&produced) == stale) {
                return Err(BackendFailure(format!(
                    "{} produced no PDF for {}: {}",
                    program.display(),
                    input.display(),
                    diagnostics
                )));
            }
            if produced != output {
                std::fs::rename(&produced, output).map_err(|e| {
                    BackendFailure(format!(
                        "could not write {} (moving from {}): {e}",
                        output.display(),
                        produced.display()
                    ))
                })?;
            }

            info!("Rendered {} with {}", input.display(), program.display());
            return Ok(());
        }

        Err(BackendFailure(format!(
            "office application not installed: executable not found on PATH (tried {})",
            tried.join(", ")
        )))
    }
}

impl Drop for LibreOfficeSession<'_> {
    fn drop(&mut self) {
        debug!(
            "Released LibreOffice session profile {}",
            self.profile.path().display()
        );
    }
}

fn modified_time(path: &Path) -> Option<std::time::SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Prefer stderr, fall back to stdout, and never return an empty string.
fn collect_diagnostics(stderr: &[u8], stdout: &[u8]) -> String {
    let err = String::from_utf8_lossy(stderr).trim().to_string();
    if !err.is_empty() {
        return err;
    }
    let out = String::from_utf8_lossy(stdout).trim().to_string();
    if !out.is_empty() {
        return out;
    }
    "no diagnostics".to_string()
}

//! Best-effort classification of collaborator error text.
//!
//! Office suites and PDF libraries report failures as free text. To turn
//! that into an actionable message we look for known tokens in the
//! lower-cased text and map them onto a small closed set of
//! [`FailureKind`]s. This is a heuristic: an unusual message can land in
//! the wrong bucket, and anything unrecognised falls through to
//! [`FailureKind::Generic`] with the raw text preserved.
//!
//! Rules are checked in order; the first match wins:
//!
//! 1. office application missing
//! 2. output locked or permission-denied
//! 3. automation channel broken
//! 4. generic

use crate::error::FailureKind;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_MISSING_BACKEND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"not installed|no office|could not be started|executable not found|not found on path|cannot find the file specified|invalid class string|class not registered",
    )
    .unwrap()
});

static RE_UNWRITABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"permission denied|access is denied|read-only|being used by another process|\blocked\b|cannot write|could not write|write error|os error 13\b|os error 32\b",
    )
    .unwrap()
});

static RE_AUTOMATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bcom\b|dispatch|\brpc\b|call was rejected|server execution failed|bridge|broken pipe|connection refused|disposedexception|\buno\b",
    )
    .unwrap()
});

/// Which operation produced the error; only changes the message prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Conversion,
    Merge,
}

impl Stage {
    fn prefix(self) -> &'static str {
        match self {
            Stage::Conversion => "Conversion failed",
            Stage::Merge => "Merge failed",
        }
    }
}

/// Map raw collaborator error text onto a [`FailureKind`].
pub fn classify(raw: &str) -> FailureKind {
    let text = raw.to_lowercase();
    if RE_MISSING_BACKEND.is_match(&text) {
        FailureKind::MissingBackend
    } else if RE_UNWRITABLE.is_match(&text) {
        FailureKind::OutputUnwritable
    } else if RE_AUTOMATION.is_match(&text) {
        FailureKind::AutomationChannel
    } else {
        FailureKind::Generic
    }
}

/// Classify an I/O error, trusting its kind before its text.
pub fn classify_io(err: &std::io::Error) -> FailureKind {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::ReadOnlyFilesystem => {
            FailureKind::OutputUnwritable
        }
        _ => match classify(&err.to_string()) {
            // An I/O error on our own output never means the office suite is missing.
            FailureKind::MissingBackend => FailureKind::Generic,
            other => other,
        },
    }
}

/// The user-facing line for a failure of `kind` during `stage`.
pub fn user_message(stage: Stage, kind: FailureKind, raw: &str) -> String {
    let prefix = stage.prefix();
    match kind {
        FailureKind::MissingBackend => format!(
            "{prefix}: no office application is installed. \
             Install LibreOffice or Microsoft Word to convert DOCX files to PDF."
        ),
        FailureKind::OutputUnwritable => format!(
            "{prefix}: cannot write the output file. \
             Check folder permissions and make sure the file is not open in another application."
        ),
        FailureKind::AutomationChannel => format!(
            "{prefix}: could not communicate with the office application. \
             Make sure it is not busy and try again."
        ),
        _ => format!("{prefix}: {raw}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_backend_tokens() {
        assert_eq!(
            classify("soffice executable not found on PATH"),
            FailureKind::MissingBackend
        );
        assert_eq!(
            classify("Invalid class string (Word.Application)"),
            FailureKind::MissingBackend
        );
    }

    #[test]
    fn unwritable_tokens() {
        assert_eq!(
            classify("Permission denied (os error 13)"),
            FailureKind::OutputUnwritable
        );
        assert_eq!(
            classify("The process cannot access the file because it is being used by another process."),
            FailureKind::OutputUnwritable
        );
    }

    #[test]
    fn automation_tokens() {
        assert_eq!(
            classify("(-2147418111, 'Call was rejected by callee.')"),
            FailureKind::AutomationChannel
        );
        assert_eq!(classify("COM error 0x80010001"), FailureKind::AutomationChannel);
        assert_eq!(
            classify("com.sun.star.lang.DisposedException"),
            FailureKind::AutomationChannel
        );
    }

    #[test]
    fn com_needs_word_boundary() {
        // "command" and "complete" must not be mistaken for COM failures.
        assert_eq!(
            classify("command did not complete"),
            FailureKind::Generic
        );
    }

    #[test]
    fn first_rule_wins() {
        // Missing backend outranks the permission token.
        assert_eq!(
            classify("office not installed; permission denied"),
            FailureKind::MissingBackend
        );
    }

    #[test]
    fn io_permission_denied_is_unwritable() {
        let e = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(classify_io(&e), FailureKind::OutputUnwritable);
        let e = std::io::Error::new(std::io::ErrorKind::NotFound, "not installed");
        assert_eq!(classify_io(&e), FailureKind::Generic);
    }

    #[test]
    fn generic_message_keeps_raw_text() {
        let msg = user_message(Stage::Merge, FailureKind::Generic, "disk full");
        assert_eq!(msg, "Merge failed: disk full");
        let msg = user_message(Stage::Conversion, FailureKind::MissingBackend, "x");
        assert!(msg.starts_with("Conversion failed: no office application"));
    }
}

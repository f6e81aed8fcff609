//! Progress-callback trait for per-file job events.
//!
//! Inject an [`Arc<dyn MergeProgressCallback>`] via
//! [`crate::config::MergeConfigBuilder::progress_callback`] to receive
//! events as a job walks its inputs. The CLI uses it to drive a progress
//! bar; a GUI front-end would forward the events to its event loop.
//!
//! # Example
//!
//! ```rust
//! use docmerge::{MergeConfig, MergeProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl MergeProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, position: usize, total: usize, path: &Path) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {}", position, total, path.display());
//!     }
//! }
//!
//! let config = MergeConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the converter, merger and orchestrator as a job progresses.
///
/// Implementations must be `Send + Sync`: async callers run jobs on the
/// blocking thread pool, so events arrive on a thread other than the one
/// that configured the job. All methods have default no-op
/// implementations so callers only override what they care about.
///
/// Positions are 1-indexed and refer to the caller's input order.
pub trait MergeProgressCallback: Send + Sync {
    /// Called once before the first input is looked at.
    fn on_job_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before an input is converted or queued.
    fn on_file_start(&self, position: usize, total_files: usize, path: &Path) {
        let _ = (position, total_files, path);
    }

    /// Called when an input is ready for merging (or a single conversion
    /// finished).
    fn on_file_complete(&self, position: usize, total_files: usize, path: &Path) {
        let _ = (position, total_files, path);
    }

    /// Called when an input failed or was skipped.
    ///
    /// # Arguments
    /// * `message`: the same human-readable line stored in the outcome
    fn on_file_error(&self, position: usize, total_files: usize, path: &Path, message: &str) {
        let _ = (position, total_files, path, message);
    }

    /// Called right before the PDF engine concatenates `file_count` files.
    fn on_merge_start(&self, file_count: usize) {
        let _ = file_count;
    }

    /// Called once when the job has finished and its workspace is gone.
    fn on_job_complete(&self, success: bool) {
        let _ = success;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl MergeProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::MergeConfig`].
pub type ProgressCallback = Arc<dyn MergeProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        completes: AtomicUsize,
        errors: Mutex<Vec<String>>,
    }

    impl MergeProgressCallback for TrackingCallback {
        fn on_job_start(&self, total_files: usize) {
            self.started_total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _position: usize, _total: usize, _path: &Path) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _position: usize, _total: usize, _path: &Path, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_job_start(3);
        cb.on_file_start(1, 3, Path::new("a.docx"));
        cb.on_file_complete(1, 3, Path::new("a.docx"));
        cb.on_file_error(2, 3, Path::new("b.txt"), "skipped");
        cb.on_merge_start(1);
        cb.on_job_complete(true);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_job_start(2);
        tracker.on_file_complete(1, 2, Path::new("a.pdf"));
        tracker.on_file_error(2, 2, Path::new("b.docx"), "conversion failed");

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(
            tracker.errors.lock().unwrap().as_slice(),
            ["conversion failed".to_string()]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_merge_start(4);
    }
}

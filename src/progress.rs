//! Progress-callback trait for per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgress>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! real-time events as the batch processes each file.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a log sink, or a UI store
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` because files are converted
//! concurrently.

use std::sync::Arc;

/// Called by the batch pipeline as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. When multiple files are selected, the per-file
/// methods may be called concurrently from different tasks; implementations
/// must protect shared mutable state accordingly.
pub trait ConversionProgress: Send + Sync {
    /// Called once after selection, before any file is processed.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called when a file's conversion task begins.
    fn on_file_start(&self, name: &str) {
        let _ = name;
    }

    /// Called when a file has been converted and exported.
    ///
    /// `pages` is the number of page images sent to the synthesizer.
    fn on_file_completed(&self, name: &str, pages: usize) {
        let _ = (name, pages);
    }

    /// Called when a file fails; sibling files keep running.
    fn on_file_failed(&self, name: &str, error: &str) {
        let _ = (name, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, succeeded: usize) {
        let _ = (total_files, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl ConversionProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgress>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingProgress {
        starts: AtomicUsize,
        completions: AtomicUsize,
        failures: AtomicUsize,
        final_succeeded: AtomicUsize,
    }

    impl ConversionProgress for TrackingProgress {
        fn on_file_start(&self, _name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_completed(&self, _name: &str, _pages: usize) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_failed(&self, _name: &str, _error: &str) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total: usize, succeeded: usize) {
            self.final_succeeded.store(succeeded, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_progress_does_not_panic() {
        let cb = NoopProgress;
        cb.on_batch_start(3);
        cb.on_file_start("a.pdf");
        cb.on_file_completed("a.pdf", 4);
        cb.on_file_failed("b.pdf", "synthesis failed");
        cb.on_batch_complete(3, 2);
    }

    #[test]
    fn tracking_progress_receives_events() {
        let tracker = TrackingProgress {
            starts: AtomicUsize::new(0),
            completions: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            final_succeeded: AtomicUsize::new(0),
        };

        tracker.on_batch_start(2);
        tracker.on_file_start("a.pdf");
        tracker.on_file_completed("a.pdf", 3);
        tracker.on_file_start("b.pdf");
        tracker.on_file_failed("b.pdf", "no images");
        tracker.on_batch_complete(2, 1);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completions.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.failures.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.final_succeeded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_progress_works() {
        let cb: Arc<dyn ConversionProgress> = Arc::new(NoopProgress);
        cb.on_batch_start(1);
        cb.on_file_completed("x.pdf", 1);
    }
}

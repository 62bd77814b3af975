//! Progress listener interface
//!
//! Defines the listener trait through which the driver reports coarse
//! job progress and human-readable task descriptions to its caller.

/// Listener trait for job progress events
///
/// Implement this trait to receive notifications while a job is being
/// streamed. All methods have no-op defaults so implementations can pick
/// the events they care about.
pub trait ProgressListener: Send + Sync {
    /// Called when overall progress changes, 0-100 percent
    fn progress_changed(&self, _percent: u8) {}

    /// Called when the current task description changes
    fn task_changed(&self, _task: &str) {}
}

/// A listener that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressListener;

impl ProgressListener for NullProgressListener {}

/// A listener that forwards task descriptions to the tracing log.
///
/// Useful for headless runs where no UI consumes the events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressListener;

impl ProgressListener for LogProgressListener {
    fn progress_changed(&self, percent: u8) {
        tracing::debug!("job progress: {}%", percent);
    }

    fn task_changed(&self, task: &str) {
        tracing::info!("{}", task);
    }
}

//! Progress reporting contract.

/// Receives coarse progress milestones of an upload.
///
/// Called synchronously on whatever task drives the upload, so
/// implementations must return quickly: the upload loop waits for them.
pub trait ProgressListener: Send + Sync {
    /// `current` out of `total` (always 100), with a short status line.
    fn on_progress(&self, current: u64, total: u64, message: &str);
}

impl<F> ProgressListener for F
where
    F: Fn(u64, u64, &str) + Send + Sync,
{
    fn on_progress(&self, current: u64, total: u64, message: &str) {
        self(current, total, message)
    }
}

/// Listener that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressListener for NoProgress {
    fn on_progress(&self, _current: u64, _total: u64, _message: &str) {}
}

use std::fmt;

/// Canonical node key type used throughout the crate.
pub type NodeKey = String;

/// What ended a dispatcher run.
///
/// Every path broadcasts the same shutdown signal; the cause is kept apart so
/// logs and the run report can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownCause {
    /// The run has not been shut down (or never started any work).
    #[default]
    None,
    /// Every node completed successfully.
    Completed,
    /// A callback failed.
    Failed,
    /// `stop()` was called from outside the run.
    Stopped,
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShutdownCause::None => "none",
            ShutdownCause::Completed => "completed",
            ShutdownCause::Failed => "failed",
            ShutdownCause::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

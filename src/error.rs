use thiserror::Error;

/// Errors raised while selecting, initializing, or driving a platform
/// launch strategy.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The host operating system or runtime version string did not
    /// match any platform we know how to launch a browser on.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// The strategy's configuration resource was missing or malformed,
    /// or probing found nothing at all to launch with.
    #[error("browser launching could not be initialized: {0}")]
    Initialization(String),

    /// A native launch process could not be started or waited on.
    /// Recoverable at the call level: targeted launches fall back to
    /// the default browser before surfacing this.
    #[error("browser launch failed: {0}")]
    Execution(#[from] std::io::Error),
}

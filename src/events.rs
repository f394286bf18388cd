use crate::launching::execute::LaunchOutcome;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Emitted after a native launch invocation so that an external
/// subsystem (a browser closer, say) can track the processes we have
/// started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchEvent {
    /// Process-wide id of this launch attempt.
    pub attempt: u64,
    /// Display name of the browser launched, or the default sentinel.
    pub browser: String,
    pub url: String,
    /// Name of the user who requested the launch, where the OS tells
    /// us.
    pub user: Option<String>,
    /// Id of the launched native process.
    pub pid: u32,
    pub exit_status: Option<i32>,
}

pub type EventSender = mpsc::UnboundedSender<LaunchEvent>;

static NEXT_ATTEMPT: AtomicU64 = AtomicU64::new(1);

fn next_attempt_id() -> u64 {
    NEXT_ATTEMPT.fetch_add(1, Ordering::Relaxed)
}

fn current_user() -> Option<String> {
    #[cfg(target_family = "unix")]
    {
        users::get_current_username().map(|name| name.to_string_lossy().into_owned())
    }
    #[cfg(not(target_family = "unix"))]
    {
        std::env::var("USERNAME").ok()
    }
}

/// Reports one launch on the event channel, if anyone is listening.
/// A closed receiver is ignored; events are advisory.
pub(crate) fn emit(
    sender: Option<&EventSender>,
    browser: &str,
    url: &str,
    outcome: &LaunchOutcome,
) {
    if let Some(sender) = sender {
        let _ = sender.send(LaunchEvent {
            attempt: next_attempt_id(),
            browser: browser.to_string(),
            url: url.to_string(),
            user: current_user(),
            pid: outcome.pid,
            exit_status: outcome.exit_status,
        });
    }
}

use crate::error::LaunchError;
use std::io;
use std::process::{Command, Stdio};

/// The result of one native launch invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// Whether the process reported a zero exit status.
    pub success: bool,
    /// The exit status, when the process exited normally.
    pub exit_status: Option<i32>,
    /// The id of the launched process.
    pub pid: u32,
}

/// The process-exec collaborator: an argument vector in, an exit
/// status out. Strategies own one of these so tests can substitute
/// the native spawn with a recording or scripted stand-in.
pub type ProcessRunner =
    Box<dyn Fn(&[String]) -> Result<LaunchOutcome, LaunchError> + Send + Sync>;

pub fn native_runner() -> ProcessRunner {
    Box::new(|args| run(args))
}

/// Spawns the given argument vector (first element is the program)
/// and waits for it to exit. The child's stdio is detached from ours;
/// a launched browser has no business writing to our terminal.
pub fn run(args: &[String]) -> Result<LaunchOutcome, LaunchError> {
    let (program, rest) = args.split_first().ok_or_else(|| {
        LaunchError::Execution(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty argument vector",
        ))
    })?;

    let mut child = Command::new(program)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let pid = child.id();
    let status = child.wait()?;
    Ok(LaunchOutcome {
        success: status.success(),
        exit_status: status.code(),
        pid,
    })
}

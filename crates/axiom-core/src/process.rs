//! Bounded execution of external processes.

use axiom_model::ComponentError;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured output of a finished process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Converts a configured timeout in seconds; zero disables the bound.
pub fn timeout_from_secs(seconds: u64) -> Option<Duration> {
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

/// Runs `command` to completion, killing it after `timeout`.
///
/// Standard input is closed. Both output streams are drained on helper
/// threads so a chatty child cannot block on a full pipe.
///
/// # Errors
///
/// - [`ComponentError::ExternalProcess`] if the program cannot be started
/// - [`ComponentError::Timeout`] if the deadline passes
/// - [`ComponentError::Io`] if waiting on the child fails
pub fn run_with_timeout(
    mut command: Command,
    timeout: Option<Duration>,
) -> Result<ProcessOutput, ComponentError> {
    let program = command.get_program().to_string_lossy().into_owned();
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| ComponentError::ExternalProcess {
        program: program.clone(),
        reason: e.to_string(),
    })?;
    debug!("Spawned '{}' (pid {})", program, child.id());

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);
    let deadline = timeout.map(|t| Instant::now() + t);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                terminate(&mut child, &program);
                return Err(ComponentError::Io(e));
            }
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            terminate(&mut child, &program);
            return Err(ComponentError::Timeout {
                program,
                seconds: timeout.map(|t| t.as_secs()).unwrap_or_default(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(ProcessOutput {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

/// Kills `child` and reaps it so no zombie outlives the call.
fn terminate(child: &mut Child, program: &str) {
    if let Err(e) = child.kill() {
        warn!("Failed to kill '{}': {}", program, e);
    }
    if let Err(e) = child.wait() {
        warn!("Failed to reap '{}': {}", program, e);
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            debug!("Pipe read ended early: {}", e);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

use std::fs;
use std::io;
use std::path::Path;

/// Marker the engine prints at the end of a successful run.
const COMPLETED_MARKER: &str = "Completed";
/// Marker the engine prints when it aborts.
const FAILURE_MARKER: &str = "Fatal error";

/// Where one engine phase stands, derived from a single scan of its console
/// log rather than ad hoc string probes scattered through gating logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    NotStarted,
    Started,
    CompletedProperly,
    Failed,
}

impl RunStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::CompletedProperly)
    }
}

/// Name of the console log a phase's stdout is redirected into.
pub fn console_log_name(control_stem: &str) -> String {
    format!("out_{control_stem}.dat")
}

/// Derive a phase's status from its console log. A missing log means the
/// phase never started; an interrupted run leaves a log without the
/// completion marker and reads back as `Started`, i.e. not completed.
pub fn scan_console_log(path: &Path) -> io::Result<RunStatus> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(RunStatus::NotStarted),
        Err(err) => return Err(err),
    };
    let text = String::from_utf8_lossy(&bytes);
    if text.lines().any(|line| line.contains(FAILURE_MARKER)) {
        Ok(RunStatus::Failed)
    } else if text.lines().any(|line| line.contains(COMPLETED_MARKER)) {
        Ok(RunStatus::CompletedProperly)
    } else {
        Ok(RunStatus::Started)
    }
}

/// Whether a control file has been fully written, judged by the presence of
/// its `OutputName` line (the last section the writer emits).
pub fn control_file_written(path: &Path) -> io::Result<bool> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    Ok(content
        .lines()
        .any(|line| line.split_whitespace().next() == Some("OutputName")))
}

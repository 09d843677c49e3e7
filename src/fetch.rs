use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Default period between background fetches.
pub const DEFAULT_FETCH_INTERVAL: Duration = Duration::from_secs(30);

/// How a finished background fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Succeeded,
    Failed,
}

/// Runs `git fetch --all` in a child process on a timer and polls it without
/// blocking. At most one fetch runs at a time; a running child is killed and
/// reaped when the scheduler is dropped.
#[derive(Debug)]
pub struct FetchScheduler {
    interval: Option<Duration>,
    last_started: Instant,
    child: Option<Child>,
}

impl FetchScheduler {
    /// `None` disables periodic fetching.
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            last_started: Instant::now(),
            child: None,
        }
    }

    pub fn in_progress(&self) -> bool {
        self.child.is_some()
    }

    /// Whether a new fetch should start now. Never while a fetch or a
    /// blocking operation is already running.
    pub fn is_due(&self, now: Instant, critical_op: bool) -> bool {
        match self.interval {
            Some(interval) => {
                !critical_op
                    && self.child.is_none()
                    && now.duration_since(self.last_started) >= interval
            }
            None => false,
        }
    }

    /// Spawn the fetch child in `workdir`.
    pub fn start(&mut self, workdir: &Path) -> Result<()> {
        self.last_started = Instant::now();
        if self.child.is_some() {
            return Ok(());
        }
        let child = Command::new("git")
            .args(["fetch", "--all", "--quiet"])
            .current_dir(workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_ASKPASS", "/bin/false")
            .env("SSH_ASKPASS", "/bin/false")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to start background fetch")?;
        log::debug!("background fetch started (pid {})", child.id());
        self.child = Some(child);
        Ok(())
    }

    /// Non-blocking check of the running fetch.
    pub fn poll(&mut self) -> Option<FetchOutcome> {
        let child = self.child.as_mut()?;
        let outcome = match child.try_wait() {
            Ok(None) => return None,
            Ok(Some(status)) if status.success() => FetchOutcome::Succeeded,
            Ok(Some(status)) => {
                log::warn!("background fetch exited with {status}");
                FetchOutcome::Failed
            }
            Err(e) => {
                log::warn!("failed to poll background fetch: {e}");
                FetchOutcome::Failed
            }
        };
        self.child = None;
        log::debug!("background fetch finished: {outcome:?}");
        Some(outcome)
    }

    /// Kill and reap a running fetch.
    pub fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            log::debug!("background fetch cancelled");
        }
    }
}

impl Drop for FetchScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

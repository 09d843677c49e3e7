use anyhow::{Context, Result, bail};
use git2::Repository;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Captured result of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// The seam every component uses to talk to git.
///
/// Each call is one-shot: spawn, read stdout/stderr to EOF, report the exit
/// status. Implementations must never prompt on the terminal.
pub trait GitRunner {
    /// Working directory the commands run in.
    fn workdir(&self) -> &Path;

    /// Run `git <args>` with extra environment variables.
    fn run_with_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<GitOutput>;

    fn run(&self, args: &[&str]) -> Result<GitOutput> {
        self.run_with_env(args, &[])
    }

    /// Run and fail on a non-zero exit, returning stdout.
    fn run_ok(&self, args: &[&str]) -> Result<String> {
        let out = self.run(args)?;
        if !out.success {
            bail!(
                "git {} failed: {}",
                describe_args(args),
                out.stderr.trim()
            );
        }
        Ok(out.stdout)
    }

    /// True when the command exits zero. Spawn failures count as false.
    fn succeeds(&self, args: &[&str]) -> bool {
        self.run(args).map(|o| o.success).unwrap_or(false)
    }
}

/// Runs the real `git` binary as a subprocess.
#[derive(Debug, Clone)]
pub struct ShellGit {
    workdir: PathBuf,
}

impl ShellGit {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl GitRunner for ShellGit {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run_with_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<GitOutput> {
        log::debug!("git {}", describe_args(args));
        let output = Command::new("git")
            .args(args)
            .envs(envs.iter().copied())
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run git {}", describe_args(args)))?;

        let result = GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !result.success {
            log::debug!(
                "git {} exited with {}: {}",
                describe_args(args),
                output.status,
                result.stderr.trim()
            );
        }
        Ok(result)
    }
}

/// Render arguments for logs and error messages with embedded credentials
/// removed.
pub fn describe_args(args: &[&str]) -> String {
    args.iter()
        .map(|arg| {
            if arg.contains("://") && arg.contains('@') {
                "<authenticated-url>"
            } else {
                arg
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Open a git repository at the given path.
pub fn open_repo(path: impl AsRef<Path>) -> Result<Repository> {
    Repository::discover(path.as_ref())
        .context("Failed to open git repository. Are you in a git repo?")
}

/// The working directory of a non-bare repository.
pub fn repo_workdir(repo: &Repository) -> Result<PathBuf> {
    repo.workdir()
        .map(Path::to_path_buf)
        .context("Bare repositories are not supported")
}

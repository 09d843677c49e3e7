#![allow(dead_code)]

use anyhow::Result;
use git2::{Repository, Signature};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

use ferrum::app::{ViewerConfig, ViewerSession};
use ferrum::git::{GitOutput, GitRunner, ShellGit};

/// Create a temporary git repository with an initial commit.
pub fn create_temp_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let repo = Repository::init(dir.path()).expect("Failed to init repo");

    {
        // `git commit` from the session needs an identity.
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();
        config.set_bool("commit.gpgsign", false).unwrap();
    }

    // Create initial commit so HEAD exists
    {
        let mut index = repo.index().unwrap();
        let tree_oid = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_oid).unwrap();
        let sig = Signature::now("Test User", "test@test.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();
    }

    (dir, repo)
}

/// Add and commit a file to the repository.
pub fn commit_file(repo: &Repository, path: &str, content: &str) {
    write_file(repo, path, content);

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();

    let tree_oid = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_oid).unwrap();
    let sig = Signature::now("Test User", "test@test.com").unwrap();
    let parent_commit = repo.head().unwrap().peel_to_commit().unwrap();

    repo.commit(
        Some("HEAD"),
        &sig,
        &sig,
        &format!("Add {path}"),
        &tree,
        &[&parent_commit],
    )
    .unwrap();
}

/// Write a file in the working directory without staging it.
pub fn write_file(repo: &Repository, path: &str, content: &str) {
    let full_path = repo.workdir().expect("Not a bare repo").join(path);
    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&full_path, content).unwrap();
}

pub fn read_file(repo: &Repository, path: &str) -> String {
    fs::read_to_string(repo.workdir().unwrap().join(path)).unwrap()
}

/// Run git in the repository and return stdout, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = ShellGit::new(dir).run(args).unwrap();
    assert!(out.success, "git {args:?} failed: {}", out.stderr);
    out.stdout
}

/// Real git that also records every argument list it runs. Commands whose
/// joined arguments start with a stubbed prefix return the canned output
/// instead of running.
pub struct RecordingGit {
    inner: ShellGit,
    pub calls: Rc<RefCell<Vec<String>>>,
    stubs: Vec<(String, GitOutput)>,
}

impl RecordingGit {
    pub fn new(dir: &Path) -> (Self, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                inner: ShellGit::new(dir),
                calls: Rc::clone(&calls),
                stubs: Vec::new(),
            },
            calls,
        )
    }

    pub fn stub(mut self, prefix: &str, success: bool) -> Self {
        let output = GitOutput {
            success,
            stdout: String::new(),
            stderr: if success {
                String::new()
            } else {
                "fatal: could not read Username".to_string()
            },
        };
        self.stubs.push((prefix.to_string(), output));
        self
    }
}

impl GitRunner for RecordingGit {
    fn workdir(&self) -> &Path {
        self.inner.workdir()
    }

    fn run_with_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<GitOutput> {
        let joined = args.join(" ");
        self.calls.borrow_mut().push(joined.clone());
        if let Some((_, output)) = self.stubs.iter().find(|(p, _)| joined.starts_with(p)) {
            return Ok(output.clone());
        }
        self.inner.run_with_env(args, envs)
    }
}

/// A loaded session over `dir` with background fetching off.
pub fn session_for(dir: &Path) -> (ViewerSession, Rc<RefCell<Vec<String>>>) {
    let (git, calls) = RecordingGit::new(dir);
    (session_with(dir, git), calls)
}

/// A loaded session over `dir` driven by a prepared runner.
pub fn session_with(dir: &Path, git: RecordingGit) -> ViewerSession {
    let mut config = ViewerConfig::new(dir);
    config.fetch_interval = None;
    let mut session = ViewerSession::new(Box::new(git), config);
    session.load().expect("session load");
    session
}

use anyhow::Result;
use std::collections::HashSet;

use crate::git::GitRunner;
use crate::types::{BranchEntry, ChangedFileEntry, CommitEntry, FileStatus, StashEntry};

/// Default number of commits loaded into the history pane.
pub const DEFAULT_COMMIT_LIMIT: usize = 50;

/// Remote ranges tried in order when deciding which commits are unpushed.
const UPSTREAM_RANGES: [&str; 3] = [
    "origin/HEAD..HEAD",
    "origin/main..HEAD",
    "origin/master..HEAD",
];

/// Queried view of the repository: changed files, history, branches and
/// stashes. Every refresh replaces one collection wholesale and never touches
/// the working tree.
#[derive(Debug, Clone)]
pub struct RepositorySnapshot {
    pub files: Vec<ChangedFileEntry>,
    pub commits: Vec<CommitEntry>,
    pub branches: Vec<BranchEntry>,
    pub stashes: Vec<StashEntry>,
    commit_limit: usize,
    file_filter: Option<glob::Pattern>,
}

impl Default for RepositorySnapshot {
    fn default() -> Self {
        Self::new(DEFAULT_COMMIT_LIMIT, None)
    }
}

impl RepositorySnapshot {
    pub fn new(commit_limit: usize, file_filter: Option<glob::Pattern>) -> Self {
        Self {
            files: Vec::new(),
            commits: Vec::new(),
            branches: Vec::new(),
            stashes: Vec::new(),
            commit_limit,
            file_filter,
        }
    }

    pub fn refresh_all(&mut self, git: &dyn GitRunner) -> Result<()> {
        self.refresh_changed_files(git)?;
        self.refresh_commit_history(git)?;
        self.refresh_branches(git)?;
        self.refresh_stashes(git)?;
        Ok(())
    }

    /// Re-read `git status --porcelain -z`. Commit marks survive for files
    /// that are still listed.
    pub fn refresh_changed_files(&mut self, git: &dyn GitRunner) -> Result<()> {
        let out = git.run_ok(&["status", "--porcelain", "-z", "--untracked-files=all"])?;
        let marked: HashSet<&str> = self
            .files
            .iter()
            .filter(|f| f.marked_for_commit)
            .map(|f| f.filename.as_str())
            .collect();

        let mut files = parse_porcelain(&out);
        if let Some(pattern) = &self.file_filter {
            files.retain(|f| pattern.matches(&f.filename));
        }
        for file in &mut files {
            file.marked_for_commit = marked.contains(file.filename.as_str());
        }
        self.files = files;
        Ok(())
    }

    /// Reload recent history and work out which commits are not on the remote.
    pub fn refresh_commit_history(&mut self, git: &dyn GitRunner) -> Result<()> {
        let limit = format!("-{}", self.commit_limit);
        let out = git.run(&["log", "--format=%h|%an|%s", &limit])?;
        if !out.success {
            // No commits yet
            self.commits.clear();
            return Ok(());
        }

        let mut unpushed = HashSet::new();
        for range in UPSTREAM_RANGES {
            let result = git.run(&["log", range, "--format=%h"])?;
            if result.success {
                unpushed = result.stdout.lines().map(str::to_string).collect();
                break;
            }
        }

        self.commits = parse_log(&out.stdout, &unpushed);
        Ok(())
    }

    /// Reload local branches with ahead/behind counts against `origin/<name>`.
    ///
    /// This issues up to three git calls per branch.
    pub fn refresh_branches(&mut self, git: &dyn GitRunner) -> Result<()> {
        let out = git.run(&["branch"])?;
        if !out.success {
            self.branches.clear();
            return Ok(());
        }

        let mut branches = Vec::new();
        for (name, is_current) in parse_branch_list(&out.stdout) {
            let (ahead, behind) = ahead_behind(git, &name);
            branches.push(BranchEntry {
                name,
                is_current,
                commits_ahead: ahead,
                commits_behind: behind,
            });
        }
        self.branches = branches;
        Ok(())
    }

    pub fn refresh_stashes(&mut self, git: &dyn GitRunner) -> Result<()> {
        let out = git.run(&["stash", "list", "--format=%cr: %gs"])?;
        self.stashes = if out.success {
            out.stdout
                .lines()
                .filter(|l| !l.is_empty())
                .map(|l| StashEntry {
                    description: shorten_stash_description(l),
                })
                .collect()
        } else {
            Vec::new()
        };
        Ok(())
    }

    pub fn current_branch(&self) -> Option<&BranchEntry> {
        self.branches.iter().find(|b| b.is_current)
    }

    pub fn branch_index(&self, name: &str) -> Option<usize> {
        self.branches.iter().position(|b| b.name == name)
    }

    pub fn file_index(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.filename == name)
    }
}

/// Keep a selection inside a list that may have shrunk.
pub fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

fn ahead_behind(git: &dyn GitRunner, name: &str) -> (u32, u32) {
    let remote_ref = format!("refs/remotes/origin/{name}");
    if !git.succeeds(&["show-ref", "--verify", "--quiet", &remote_ref]) {
        return (0, 0);
    }
    let behind = rev_count(git, &format!("{name}..origin/{name}"));
    let ahead = rev_count(git, &format!("origin/{name}..{name}"));
    (ahead, behind)
}

/// `git rev-list --count <range>`, zero on any failure.
pub fn rev_count(git: &dyn GitRunner, range: &str) -> u32 {
    git.run(&["rev-list", "--count", range])
        .ok()
        .filter(|o| o.success)
        .and_then(|o| o.stdout.trim().parse().ok())
        .unwrap_or(0)
}

/// Parse `git status --porcelain -z` output.
///
/// Records are NUL-terminated and paths are raw bytes, never C-quoted. A
/// rename or copy record is followed by an extra record with the source
/// path, which is skipped.
pub fn parse_porcelain(text: &str) -> Vec<ChangedFileEntry> {
    let mut files = Vec::new();
    let mut records = text.split('\0');
    while let Some(record) = records.next() {
        let mut chars = record.chars();
        let (Some(index_col), Some(tree_col)) = (chars.next(), chars.next()) else {
            continue;
        };
        if matches!(index_col, 'R' | 'C') || matches!(tree_col, 'R' | 'C') {
            records.next();
        }
        let Some(path) = record.get(3..).filter(|p| !p.is_empty()) else {
            continue;
        };
        let status_char = if tree_col != ' ' { tree_col } else { index_col };
        files.push(ChangedFileEntry {
            filename: path.to_string(),
            status: FileStatus::from_porcelain(status_char),
            marked_for_commit: false,
            has_staged_changes: index_col != ' ' && index_col != '?',
        });
    }
    files
}

/// Parse `git log --format=%h|%an|%s` output.
pub fn parse_log(text: &str, unpushed: &HashSet<String>) -> Vec<CommitEntry> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '|');
            let hash = parts.next()?;
            let author = parts.next()?;
            let title = parts.next()?;
            if hash.is_empty() {
                return None;
            }
            Some(CommitEntry {
                short_hash: hash.to_string(),
                author_initials: author_initials(author),
                title: title.to_string(),
                is_pushed: !unpushed.contains(hash),
            })
        })
        .collect()
}

/// First two characters of the author name, padded with `?`.
pub fn author_initials(author: &str) -> String {
    let mut chars = author.chars();
    let first = chars.next().unwrap_or('?');
    let second = chars.next().unwrap_or('?');
    format!("{first}{second}")
}

/// Parse `git branch` output into `(name, is_current)` pairs.
pub fn parse_branch_list(text: &str) -> Vec<(String, bool)> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim_start();
            if line.is_empty() {
                return None;
            }
            let (is_current, name) = match line.strip_prefix('*') {
                Some(rest) => (true, rest.trim()),
                None => (false, line.trim()),
            };
            // symbolic refs, remotes and detached HEAD markers
            if name.contains("->") || name.starts_with("remotes/") || name.starts_with('(') {
                return None;
            }
            Some((name.to_string(), is_current))
        })
        .collect()
}

/// Compact `%cr: %gs` stash lines, e.g. "5 minutes ago: WIP on main: msg"
/// becomes "5m On main: msg".
pub fn shorten_stash_description(line: &str) -> String {
    const REPLACEMENTS: [(&str, &str); 10] = [
        (" ago:", ""),
        (" minutes", "m"),
        (" minute", "m"),
        (" hours", "h"),
        (" hour", "h"),
        (" days", "d"),
        (" day", "d"),
        (" weeks", "w"),
        (" week", "w"),
        ("WIP on ", "On "),
    ];
    REPLACEMENTS
        .iter()
        .fold(line.to_string(), |acc, (from, to)| acc.replacen(from, to, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_porcelain_statuses() {
        let out = " M src/main.rs\0A  new.rs\0 D gone.rs\0?? notes.txt\0MM both.rs\0";
        let files = parse_porcelain(out);
        assert_eq!(files.len(), 5);
        assert_eq!(files[0].filename, "src/main.rs");
        assert_eq!(files[0].status, FileStatus::Modified);
        assert!(!files[0].has_staged_changes);
        assert_eq!(files[1].status, FileStatus::Added);
        assert!(files[1].has_staged_changes);
        assert_eq!(files[2].status, FileStatus::Deleted);
        assert_eq!(files[3].status, FileStatus::Untracked);
        assert!(!files[3].has_staged_changes);
        assert!(files[4].has_staged_changes);
    }

    #[test]
    fn test_parse_porcelain_rename_skips_source_record() {
        let files = parse_porcelain("R  new.rs\0old.rs\0?? with space.txt\0 M café.txt\0");
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["new.rs", "with space.txt", "café.txt"]);
        assert!(files[0].has_staged_changes);
    }

    #[test]
    fn test_parse_log_marks_unpushed() {
        let unpushed: HashSet<String> = ["bbb2222".to_string()].into_iter().collect();
        let commits = parse_log(
            "bbb2222|Alice Smith|Add feature\naaa1111|Bob|Fix a|b parsing\n",
            &unpushed,
        );
        assert_eq!(commits.len(), 2);
        assert!(!commits[0].is_pushed);
        assert!(commits[1].is_pushed);
        assert_eq!(commits[0].author_initials, "Al");
        assert_eq!(commits[1].title, "Fix a|b parsing");
    }

    #[test]
    fn test_author_initials_padding() {
        assert_eq!(author_initials("X"), "X?");
        assert_eq!(author_initials(""), "??");
        assert_eq!(author_initials("Émile"), "Ém");
    }

    #[test]
    fn test_parse_branch_list() {
        let out = "  feature/x\n* main\n  (HEAD detached at 1234567)\n  remotes/origin/main\n";
        let branches = parse_branch_list(out);
        assert_eq!(
            branches,
            vec![("feature/x".to_string(), false), ("main".to_string(), true)]
        );
    }

    #[test]
    fn test_shorten_stash_description() {
        assert_eq!(
            shorten_stash_description("5 minutes ago: WIP on main: abc123 message"),
            "5m On main: abc123 message"
        );
        assert_eq!(
            shorten_stash_description("1 hour ago: On dev: named"),
            "1h On dev: named"
        );
        assert_eq!(
            shorten_stash_description("3 weeks ago: On main: x"),
            "3w On main: x"
        );
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(5, 3), 2);
        assert_eq!(clamp_index(1, 3), 1);
        assert_eq!(clamp_index(4, 0), 0);
    }
}

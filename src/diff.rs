use anyhow::{Context, Result};
use std::path::Path;

use crate::git::GitRunner;
use crate::types::{ContentKind, ContentLine, DiffLine, LineKind};

/// Context lines requested from `git diff`.
pub const CONTEXT_ARG: &str = "-U5";

/// How many lines of an untracked file are shown as additions.
pub const UNTRACKED_PREVIEW_LINES: usize = 50;

/// Upper bound on parsed lines kept for one file.
pub const MAX_FILE_LINES: usize = 10_000;

/// Parse `git diff` output for a single path into typed lines.
///
/// File headers are skipped and each `@@` line opens a new hunk. A
/// `\ No newline at end of file` marker sets `no_newline` on the line before
/// it. Lines are split on `\n` only so CRLF content survives a round trip.
pub fn parse_diff_lines(input: &str) -> Vec<DiffLine> {
    let mut lines = Vec::new();
    let mut hunk: Option<usize> = None;
    let mut next_hunk = 0;
    let mut in_header = false;
    let mut old_line = 0u32;
    let mut new_line = 0u32;

    for raw in input.split_terminator('\n') {
        if lines.len() >= MAX_FILE_LINES {
            log::warn!("diff truncated at {} lines", MAX_FILE_LINES);
            break;
        }

        if raw.starts_with("diff --git ") {
            in_header = true;
            continue;
        }

        if raw.starts_with("@@") {
            let Some((old_start, new_start)) = parse_hunk_header(raw) else {
                log::debug!("skipping malformed hunk header: {raw}");
                continue;
            };
            in_header = false;
            let id = next_hunk;
            next_hunk += 1;
            hunk = Some(id);
            old_line = old_start.saturating_sub(1);
            new_line = new_start.saturating_sub(1);
            lines.push(DiffLine {
                text: raw.to_string(),
                kind: LineKind::HunkHeader,
                hunk_id: id,
                old_line_no: Some(old_start),
                new_line_no: Some(new_start),
                is_staged: false,
                no_newline: false,
            });
            continue;
        }

        // `index`, `---`, `+++`, mode lines and anything else before the first hunk
        if in_header {
            continue;
        }
        let Some(hunk_id) = hunk else {
            continue;
        };

        if let Some(content) = raw.strip_prefix('+') {
            new_line += 1;
            lines.push(DiffLine {
                text: content.to_string(),
                kind: LineKind::Addition,
                hunk_id,
                old_line_no: None,
                new_line_no: Some(new_line),
                is_staged: false,
                no_newline: false,
            });
        } else if let Some(content) = raw.strip_prefix('-') {
            old_line += 1;
            lines.push(DiffLine {
                text: content.to_string(),
                kind: LineKind::Deletion,
                hunk_id,
                old_line_no: Some(old_line),
                new_line_no: None,
                is_staged: false,
                no_newline: false,
            });
        } else if let Some(content) = raw.strip_prefix(' ') {
            old_line += 1;
            new_line += 1;
            lines.push(DiffLine {
                text: content.to_string(),
                kind: LineKind::Context,
                hunk_id,
                old_line_no: Some(old_line),
                new_line_no: Some(new_line),
                is_staged: false,
                no_newline: false,
            });
        } else if raw.starts_with('\\') {
            if let Some(last) = lines.last_mut()
                && last.kind != LineKind::HunkHeader
            {
                last.no_newline = true;
            }
        }
    }

    lines
}

/// Parse "@@ -old_start[,count] +new_start[,count] @@ ..." into the two start
/// numbers.
pub fn parse_hunk_header(line: &str) -> Option<(u32, u32)> {
    let rest = line.strip_prefix("@@ ")?;
    let end = rest.find(" @@")?;
    let mut parts = rest[..end].split_whitespace();
    let old_start = parse_range_start(parts.next()?.strip_prefix('-')?)?;
    let new_start = parse_range_start(parts.next()?.strip_prefix('+')?)?;
    Some((old_start, new_start))
}

/// Parse "12,5" or "12" into the start number.
fn parse_range_start(s: &str) -> Option<u32> {
    s.split(',').next()?.parse().ok()
}

/// Treat the head of an untracked file as one all-addition hunk.
///
/// When the whole file is shown and it lacks a final newline, the last line
/// is flagged so a staged copy keeps that shape.
pub fn untracked_file_lines(content: &str) -> Vec<DiffLine> {
    let total = content.split_terminator('\n').count();
    let shown: Vec<&str> = content
        .split_terminator('\n')
        .take(UNTRACKED_PREVIEW_LINES)
        .collect();
    let missing_newline =
        !content.is_empty() && !content.ends_with('\n') && shown.len() == total;
    let mut lines = Vec::with_capacity(shown.len() + 1);
    lines.push(DiffLine {
        text: format!("@@ -0,0 +1,{} @@", shown.len()),
        kind: LineKind::HunkHeader,
        hunk_id: 0,
        old_line_no: Some(0),
        new_line_no: Some(1),
        is_staged: false,
        no_newline: false,
    });
    let last = shown.len().saturating_sub(1);
    for (i, text) in shown.into_iter().enumerate() {
        lines.push(DiffLine {
            text: text.to_string(),
            kind: LineKind::Addition,
            hunk_id: 0,
            old_line_no: None,
            new_line_no: Some(i as u32 + 1),
            is_staged: false,
            no_newline: missing_newline && i == last,
        });
    }
    lines
}

/// Whether git knows about `path` at all.
pub fn is_tracked(git: &dyn GitRunner, path: &str) -> bool {
    git.succeeds(&["ls-files", "--error-unmatch", "--", path])
}

/// Load the unstaged (or with `cached`, staged) diff of one file.
///
/// An untracked file falls back to its first lines shown as additions. A
/// tracked file with no diff yields an empty vec.
pub fn load_file_diff(git: &dyn GitRunner, path: &str, cached: bool) -> Result<Vec<DiffLine>> {
    if !cached && !is_tracked(git, path) {
        return load_untracked(git.workdir(), path);
    }

    let mut args = vec!["diff"];
    if cached {
        args.push("--cached");
    }
    args.extend([CONTEXT_ARG, "--", path]);
    let out = git.run(&args)?;
    if !out.success {
        log::warn!("git diff for {path} failed: {}", out.stderr.trim());
        return Ok(Vec::new());
    }
    Ok(parse_diff_lines(&out.stdout))
}

fn load_untracked(workdir: &Path, path: &str) -> Result<Vec<DiffLine>> {
    let full = workdir.join(path);
    if full.is_dir() {
        return Ok(Vec::new());
    }
    let bytes =
        std::fs::read(&full).with_context(|| format!("Failed to read {}", full.display()))?;
    Ok(untracked_file_lines(&String::from_utf8_lossy(&bytes)))
}

/// Classify one line of `git show` / `git stash show` / `git log` output.
pub fn classify_content_line(line: &str) -> ContentKind {
    if line.starts_with("diff --git")
        || line.starts_with("index ")
        || line.starts_with("--- ")
        || line.starts_with("+++ ")
        || line.starts_with("@@")
    {
        ContentKind::Header
    } else if line.starts_with('+') {
        ContentKind::Addition
    } else if line.starts_with('-') {
        ContentKind::Deletion
    } else if is_stat_line(line) {
        ContentKind::Stat
    } else if line.starts_with("commit ") {
        ContentKind::CommitHeader
    } else if line.starts_with("Author: ") || line.starts_with("Date: ") {
        ContentKind::Info
    } else {
        ContentKind::Plain
    }
}

fn is_stat_line(line: &str) -> bool {
    if let Some(pos) = line.find(" | ") {
        let tail = &line[pos + 3..];
        return tail.contains('+') || tail.contains('-') || tail.contains("Bin");
    }
    line.contains(" files changed")
        || line.contains(" file changed")
        || line.contains(" insertions")
        || line.contains(" deletions")
}

/// Split raw command output into classified content lines.
pub fn content_lines(text: &str) -> Vec<ContentLine> {
    text.lines()
        .take(MAX_FILE_LINES)
        .map(|line| ContentLine {
            text: line.to_string(),
            kind: classify_content_line(line),
        })
        .collect()
}

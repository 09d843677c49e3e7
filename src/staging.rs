use anyhow::{Context, Result};
use std::io::Write;

use crate::diff;
use crate::git::GitRunner;
use crate::types::{DiffLine, LineKind};

/// The synthetic patch built from the staged subset of a file's lines.
///
/// `headers` are the `diff --git` / `index` / `---` / `+++` lines; `lines`
/// holds recomputed hunk headers and the staged or context lines under them.
/// When nothing is staged in memory the view mirrors what git's index already
/// holds for the file and `headers` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedView {
    pub headers: Vec<String>,
    pub lines: Vec<DiffLine>,
    /// Index into the unstaged lines each entry was copied from.
    origins: Vec<Option<usize>>,
}

impl StagedView {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn origin(&self, index: usize) -> Option<usize> {
        self.origins.get(index).copied().flatten()
    }
}

/// What `unstage_line` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unstaged {
    /// A pending in-memory selection was dropped.
    InMemory,
    /// The whole file was reset in git's index.
    Index,
    /// Header or context line, nothing to do.
    Ignored,
}

/// Per-line staging state over one file's unstaged diff.
#[derive(Debug, Clone)]
pub struct StagingModel {
    path: String,
    new_file: bool,
    lines: Vec<DiffLine>,
    index_lines: Vec<DiffLine>,
    staged: StagedView,
}

impl StagingModel {
    pub fn new(path: impl Into<String>, lines: Vec<DiffLine>, new_file: bool) -> Self {
        let mut model = Self {
            path: path.into(),
            new_file,
            lines,
            index_lines: Vec::new(),
            staged: StagedView::default(),
        };
        model.rebuild_staged_view();
        model
    }

    /// Attach the lines git's index already holds for this file.
    pub fn with_index_lines(mut self, mut lines: Vec<DiffLine>) -> Self {
        for line in &mut lines {
            line.is_staged = true;
        }
        self.index_lines = lines;
        self.rebuild_staged_view();
        self
    }

    /// Load a file's unstaged diff and its already-staged diff from git.
    pub fn load(git: &dyn GitRunner, path: &str) -> Result<Self> {
        let new_file = !diff::is_tracked(git, path);
        let lines = diff::load_file_diff(git, path, false)?;
        let index_lines = if new_file {
            Vec::new()
        } else {
            diff::load_file_diff(git, path, true)?
        };
        log::debug!(
            "loaded {path}: {} unstaged lines, {} staged lines",
            lines.len(),
            index_lines.len()
        );
        Ok(Self::new(path, lines, new_file).with_index_lines(index_lines))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_new_file(&self) -> bool {
        self.new_file
    }

    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    pub fn staged_view(&self) -> &StagedView {
        &self.staged
    }

    /// Number of lines selected in memory for staging.
    pub fn staged_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_staged).count()
    }

    pub fn has_pending(&self) -> bool {
        self.lines.iter().any(|l| l.is_staged)
    }

    /// Flip the staged flag of an addition or deletion line. Returns false
    /// for hunk headers, context lines and out-of-range indices.
    pub fn toggle_line(&mut self, index: usize) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        if !line.kind.is_change() {
            return false;
        }
        line.is_staged = !line.is_staged;
        self.rebuild_staged_view();
        true
    }

    /// Recompute the staged view from scratch.
    pub fn rebuild_staged_view(&mut self) {
        if !self.has_pending() {
            self.staged = StagedView {
                headers: Vec::new(),
                origins: vec![None; self.index_lines.len()],
                lines: self.index_lines.clone(),
            };
            return;
        }

        let mut view = StagedView {
            headers: self.patch_headers(),
            ..StagedView::default()
        };

        for hunk in self.hunks() {
            let Some(header) = hunk.header.map(|i| &self.lines[i]) else {
                continue;
            };
            if !hunk.body.iter().any(|&i| self.lines[i].is_staged) {
                continue;
            }

            let kept: Vec<usize> = hunk
                .body
                .iter()
                .copied()
                .filter(|&i| {
                    let line = &self.lines[i];
                    line.kind == LineKind::Context || line.is_staged
                })
                .collect();
            let old_count = kept
                .iter()
                .filter(|&&i| self.lines[i].kind != LineKind::Addition)
                .count();
            let new_count = kept
                .iter()
                .filter(|&&i| self.lines[i].kind != LineKind::Deletion)
                .count();
            let old_start = header.old_line_no.unwrap_or(0);
            let new_start = header.new_line_no.unwrap_or(0);

            view.lines.push(DiffLine {
                text: format!("@@ -{old_start},{old_count} +{new_start},{new_count} @@"),
                kind: LineKind::HunkHeader,
                hunk_id: hunk.id,
                old_line_no: Some(old_start),
                new_line_no: Some(new_start),
                is_staged: true,
                no_newline: false,
            });
            view.origins.push(None);
            for i in kept {
                let mut line = self.lines[i].clone();
                line.is_staged = true;
                view.lines.push(line);
                view.origins.push(Some(i));
            }
        }

        self.staged = view;
    }

    /// Serialize the pending selection as a patch `git apply --cached` accepts.
    ///
    /// Deletions that are not staged stay in the index version of the file,
    /// so they are written back as context to keep every hunk anchored. Line
    /// text is written unchanged, carriage returns included, and a missing
    /// final newline is carried over with git's marker line.
    pub fn patch_text(&self) -> Option<String> {
        if !self.has_pending() {
            return None;
        }

        let mut out = String::new();
        for header in &self.staged.headers {
            out.push_str(header);
            out.push('\n');
        }

        for hunk in self.hunks() {
            let Some(header) = hunk.header.map(|i| &self.lines[i]) else {
                continue;
            };
            if !hunk.body.iter().any(|&i| self.lines[i].is_staged) {
                continue;
            }

            let mut rows = Vec::new();
            for &i in &hunk.body {
                let line = &self.lines[i];
                match (line.kind, line.is_staged) {
                    (LineKind::Context, _) | (LineKind::Deletion, false) => {
                        rows.push(PatchRow::context(&line.text, line.no_newline));
                    }
                    (LineKind::Deletion, true) => {
                        rows.push(PatchRow::deletion(&line.text, line.no_newline));
                    }
                    (LineKind::Addition, true) => {
                        rows.push(PatchRow::addition(&line.text, line.no_newline));
                    }
                    (LineKind::Addition, false) | (LineKind::HunkHeader, _) => {}
                }
            }
            let rows = settle_line_endings(rows);

            let old_count = rows.iter().filter(|r| r.prefix != '+').count();
            let new_count = rows.iter().filter(|r| r.prefix != '-').count();
            let old_start = header.old_line_no.unwrap_or(0);
            let new_start = header.new_line_no.unwrap_or(0);
            out.push_str(&format!(
                "@@ -{old_start},{old_count} +{new_start},{new_count} @@\n"
            ));
            for row in rows {
                out.push(row.prefix);
                out.push_str(row.text);
                out.push('\n');
                if row.eof_old || row.eof_new {
                    out.push_str(NO_NEWLINE_MARKER);
                    out.push('\n');
                }
            }
        }
        Some(out)
    }

    /// Write the pending selection to a temporary patch file and apply it to
    /// git's index. Returns false when nothing was selected.
    ///
    /// The caller reloads the model afterwards; git's index is the source of
    /// truth once this succeeds.
    pub fn apply_staged_changes(&self, git: &dyn GitRunner) -> Result<bool> {
        let Some(patch) = self.patch_text() else {
            return Ok(false);
        };

        let prefix = format!(
            "ferrum-{}-{}-",
            std::process::id(),
            chrono::Local::now().timestamp()
        );
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".patch")
            .tempfile()
            .context("Failed to create patch file")?;
        file.write_all(patch.as_bytes())
            .context("Failed to write patch file")?;
        file.flush().context("Failed to flush patch file")?;

        let patch_path = file.path().to_string_lossy().into_owned();
        git.run_ok(&["apply", "--cached", &patch_path])
            .with_context(|| format!("Failed to stage selected lines of {}", self.path))?;
        log::info!(
            "staged {} selected lines of {}",
            self.staged_count(),
            self.path
        );
        Ok(true)
    }

    /// Unstage from the staged pane.
    ///
    /// A pending selection is dropped in memory. A line that already lives in
    /// git's index resets the whole file with `git reset HEAD -- <path>`;
    /// single-line unstaging from the index is not supported.
    pub fn unstage_line(&mut self, git: &dyn GitRunner, staged_index: usize) -> Result<Unstaged> {
        let Some(line) = self.staged.lines.get(staged_index) else {
            return Ok(Unstaged::Ignored);
        };
        if !line.kind.is_change() {
            return Ok(Unstaged::Ignored);
        }

        if let Some(origin) = self.staged.origin(staged_index) {
            if let Some(source) = self.lines.get_mut(origin) {
                source.is_staged = false;
            }
            self.rebuild_staged_view();
            return Ok(Unstaged::InMemory);
        }

        git.run_ok(&["reset", "-q", "HEAD", "--", &self.path])
            .with_context(|| format!("Failed to unstage {}", self.path))?;
        log::info!("reset {} in the index", self.path);
        Ok(Unstaged::Index)
    }

    /// Drop every in-memory selection. Git's index is left alone.
    pub fn reset_staged_changes(&mut self) {
        for line in &mut self.lines {
            line.is_staged = false;
        }
        self.rebuild_staged_view();
    }

    fn patch_headers(&self) -> Vec<String> {
        let path = &self.path;
        if self.new_file {
            vec![
                format!("diff --git a/{path} b/{path}"),
                "new file mode 100644".to_string(),
                "index 0000000..0000000".to_string(),
                "--- /dev/null".to_string(),
                format!("+++ b/{path}"),
            ]
        } else {
            vec![
                format!("diff --git a/{path} b/{path}"),
                "index 0000000..0000000".to_string(),
                format!("--- a/{path}"),
                format!("+++ b/{path}"),
            ]
        }
    }

    fn hunks(&self) -> Vec<HunkSpan> {
        let mut spans: Vec<HunkSpan> = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if spans.last().is_none_or(|s| s.id != line.hunk_id) {
                spans.push(HunkSpan {
                    id: line.hunk_id,
                    header: None,
                    body: Vec::new(),
                });
            }
            if let Some(span) = spans.last_mut() {
                if line.kind == LineKind::HunkHeader {
                    span.header = Some(i);
                } else {
                    span.body.push(i);
                }
            }
        }
        spans
    }
}

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// One line of a rebuilt hunk. `eof_old` and `eof_new` say the line ends its
/// side without a newline.
#[derive(Debug, Clone, Copy)]
struct PatchRow<'a> {
    prefix: char,
    text: &'a str,
    eof_old: bool,
    eof_new: bool,
}

impl<'a> PatchRow<'a> {
    fn context(text: &'a str, eof: bool) -> Self {
        Self {
            prefix: ' ',
            text,
            eof_old: eof,
            eof_new: eof,
        }
    }

    fn deletion(text: &'a str, eof: bool) -> Self {
        Self {
            prefix: '-',
            text,
            eof_old: eof,
            eof_new: false,
        }
    }

    fn addition(text: &'a str, eof: bool) -> Self {
        Self {
            prefix: '+',
            text,
            eof_old: false,
            eof_new: eof,
        }
    }
}

/// A line can only end the new side if no other new-side line follows it.
/// When one does, that line gets its newline back; a context line that has
/// to end the old side but not the new one becomes a deletion plus an
/// addition.
fn settle_line_endings(rows: Vec<PatchRow<'_>>) -> Vec<PatchRow<'_>> {
    let mut settled = Vec::with_capacity(rows.len() + 1);
    for (i, row) in rows.iter().enumerate() {
        let followed = rows[i + 1..].iter().any(|r| r.prefix != '-');
        if !row.eof_new || !followed {
            settled.push(*row);
            continue;
        }
        if row.prefix == ' ' {
            settled.push(PatchRow::deletion(row.text, row.eof_old));
            settled.push(PatchRow::addition(row.text, false));
        } else {
            settled.push(PatchRow {
                eof_new: false,
                ..*row
            });
        }
    }
    settled
}

struct HunkSpan {
    id: usize,
    header: Option<usize>,
    body: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parse_diff_lines;

    const PARTIAL: &str = "\
diff --git a/f.txt b/f.txt
--- a/f.txt
+++ b/f.txt
@@ -3,3 +3,3 @@
 keep one
-old line
+new line
 keep two
";

    fn model(input: &str) -> StagingModel {
        StagingModel::new("f.txt", parse_diff_lines(input), false)
    }

    fn index_of(model: &StagingModel, kind: LineKind) -> usize {
        model.lines().iter().position(|l| l.kind == kind).unwrap()
    }

    #[test]
    fn test_toggle_header_and_context_is_noop() {
        let mut m = model(PARTIAL);
        assert!(!m.toggle_line(0));
        assert!(!m.toggle_line(1));
        assert!(!m.toggle_line(99));
        assert_eq!(m.staged_count(), 0);
        assert!(m.staged_view().is_empty());
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut m = model(PARTIAL);
        let add = index_of(&m, LineKind::Addition);
        assert!(m.toggle_line(add));
        assert!(m.lines()[add].is_staged);
        assert!(m.toggle_line(add));
        assert!(!m.lines()[add].is_staged);
        assert!(m.staged_view().is_empty());
    }

    #[test]
    fn test_partial_hunk_only_addition() {
        let mut m = model(PARTIAL);
        let add = index_of(&m, LineKind::Addition);
        m.toggle_line(add);

        let view = m.staged_view();
        assert_eq!(view.headers.len(), 4);
        assert_eq!(view.headers[0], "diff --git a/f.txt b/f.txt");
        assert_eq!(view.lines[0].text, "@@ -3,2 +3,3 @@");
        let kinds: Vec<LineKind> = view.lines[1..].iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![LineKind::Context, LineKind::Addition, LineKind::Context]
        );
    }

    #[test]
    fn test_full_hunk_stage() {
        let mut m = model(PARTIAL);
        let add = index_of(&m, LineKind::Addition);
        let del = index_of(&m, LineKind::Deletion);
        m.toggle_line(add);
        m.toggle_line(del);
        assert_eq!(m.staged_view().lines[0].text, "@@ -3,3 +3,3 @@");
    }

    #[test]
    fn test_only_hunks_with_staged_lines_are_emitted() {
        let input = "\
@@ -1,2 +1,2 @@
 a
-b
+B
@@ -20,2 +20,3 @@
 x
+y
 z
";
        let mut m = model(input);
        let y = m.lines().iter().position(|l| l.text == "y").unwrap();
        m.toggle_line(y);
        let headers: Vec<&str> = m
            .staged_view()
            .lines
            .iter()
            .filter(|l| l.kind == LineKind::HunkHeader)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(headers, vec!["@@ -20,2 +20,3 @@"]);
    }

    #[test]
    fn test_header_counts_match_body() {
        let input = "\
@@ -1,6 +1,6 @@
 a
-b
-c
+C
+D
+E
 f
";
        let mut m = model(input);
        // stage one deletion and two additions
        for text in ["b", "C", "E"] {
            let i = m.lines().iter().position(|l| l.text == text).unwrap();
            m.toggle_line(i);
        }
        let view = m.staged_view();
        let body = &view.lines[1..];
        let old = body.iter().filter(|l| l.kind != LineKind::Addition).count();
        let new = body.iter().filter(|l| l.kind != LineKind::Deletion).count();
        assert_eq!(view.lines[0].text, format!("@@ -1,{old} +1,{new} @@"));
        assert_eq!((old, new), (3, 4));
    }

    #[test]
    fn test_patch_text_anchors_unstaged_deletions() {
        let mut m = model(PARTIAL);
        let add = index_of(&m, LineKind::Addition);
        m.toggle_line(add);
        let patch = m.patch_text().unwrap();
        assert_eq!(
            patch,
            "diff --git a/f.txt b/f.txt\n\
             index 0000000..0000000\n\
             --- a/f.txt\n\
             +++ b/f.txt\n\
             @@ -3,3 +3,4 @@\n \
             keep one\n \
             old line\n\
             +new line\n \
             keep two\n"
        );
    }

    #[test]
    fn test_patch_text_none_without_selection() {
        assert!(model(PARTIAL).patch_text().is_none());
    }

    #[test]
    fn test_new_file_patch_headers() {
        let mut m = StagingModel::new("new.txt", diff::untracked_file_lines("a\nb\n"), true);
        m.toggle_line(1);
        let patch = m.patch_text().unwrap();
        assert!(patch.contains("new file mode 100644\n"));
        assert!(patch.contains("--- /dev/null\n"));
        assert!(patch.contains("@@ -0,0 +1,1 @@\n+a\n"));
    }

    const OLD_SIDE_UNTERMINATED: &str = "\
@@ -1,2 +1,3 @@
 a
-b
\\ No newline at end of file
+b
+c
";

    fn stage_texts(m: &mut StagingModel, picks: &[(LineKind, &str)]) {
        for (kind, text) in picks {
            let i = m
                .lines()
                .iter()
                .position(|l| l.kind == *kind && l.text == *text)
                .unwrap();
            m.toggle_line(i);
        }
    }

    #[test]
    fn test_addition_after_unterminated_last_line_rewrites_it() {
        let mut m = model(OLD_SIDE_UNTERMINATED);
        stage_texts(&mut m, &[(LineKind::Addition, "c")]);
        let patch = m.patch_text().unwrap();
        assert!(patch.ends_with(
            "@@ -1,2 +1,3 @@\n a\n-b\n\\ No newline at end of file\n+b\n+c\n"
        ));
    }

    #[test]
    fn test_unterminated_last_line_stays_context_when_nothing_follows() {
        let input = "\
@@ -1,2 +1,2 @@
-a
+A
 b
\\ No newline at end of file
";
        let mut m = model(input);
        stage_texts(&mut m, &[(LineKind::Deletion, "a"), (LineKind::Addition, "A")]);
        let patch = m.patch_text().unwrap();
        assert!(patch.ends_with("-a\n+A\n b\n\\ No newline at end of file\n"));
    }

    #[test]
    fn test_staged_deletion_keeps_marker() {
        let mut m = model(OLD_SIDE_UNTERMINATED);
        stage_texts(
            &mut m,
            &[(LineKind::Deletion, "b"), (LineKind::Addition, "b")],
        );
        let patch = m.patch_text().unwrap();
        assert!(patch.ends_with(
            "@@ -1,2 +1,2 @@\n a\n-b\n\\ No newline at end of file\n+b\n"
        ));
    }

    #[test]
    fn test_new_file_without_final_newline_keeps_marker() {
        let mut m = StagingModel::new("new.txt", diff::untracked_file_lines("one\ntwo"), true);
        m.toggle_line(1);
        m.toggle_line(2);
        let patch = m.patch_text().unwrap();
        assert!(patch.ends_with("@@ -0,0 +1,2 @@\n+one\n+two\n\\ No newline at end of file\n"));
    }

    #[test]
    fn test_partial_new_file_keeps_marker_on_last_line() {
        let mut m = StagingModel::new("new.txt", diff::untracked_file_lines("one\ntwo"), true);
        m.toggle_line(2);
        let patch = m.patch_text().unwrap();
        assert!(patch.ends_with("@@ -0,0 +1,1 @@\n+two\n\\ No newline at end of file\n"));
    }

    #[test]
    fn test_crlf_text_written_unchanged() {
        let input = "@@ -1,3 +1,3 @@\n a\r\n-b\r\n+B\r\n c\r\n";
        let mut m = model(input);
        stage_texts(
            &mut m,
            &[(LineKind::Deletion, "b\r"), (LineKind::Addition, "B\r")],
        );
        let patch = m.patch_text().unwrap();
        assert!(patch.ends_with("@@ -1,3 +1,3 @@\n a\r\n-b\r\n+B\r\n c\r\n"));
    }

    #[test]
    fn test_reset_clears_selection() {
        let mut m = model(PARTIAL);
        let add = index_of(&m, LineKind::Addition);
        m.toggle_line(add);
        m.reset_staged_changes();
        assert_eq!(m.staged_count(), 0);
        assert!(m.staged_view().is_empty());
    }

    #[test]
    fn test_index_lines_shown_without_selection() {
        let staged = parse_diff_lines("@@ -1,1 +1,1 @@\n-x\n+y\n");
        let m = model(PARTIAL).with_index_lines(staged);
        let view = m.staged_view();
        assert_eq!(view.len(), 3);
        assert!(view.headers.is_empty());
        assert!(view.lines.iter().all(|l| l.is_staged));
        assert_eq!(view.origin(1), None);
    }
}

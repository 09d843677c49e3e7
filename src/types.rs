/// The type of a line in a parsed file diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Addition,
    Deletion,
    HunkHeader,
}

impl LineKind {
    /// Returns the single-character prefix used in unified diff format.
    pub fn prefix(self) -> &'static str {
        match self {
            LineKind::Context => " ",
            LineKind::Addition => "+",
            LineKind::Deletion => "-",
            LineKind::HunkHeader => "",
        }
    }

    /// Only additions and deletions can be staged line by line.
    pub fn is_change(self) -> bool {
        matches!(self, LineKind::Addition | LineKind::Deletion)
    }
}

/// A single typed line of a file diff.
///
/// `text` holds the line without its diff prefix, except for hunk headers
/// which keep the full `@@ ... @@` line. A hunk header carries the starting
/// old/new line numbers of the hunk that follows it.
///
/// A carriage return before the newline stays in `text`. `no_newline` marks
/// the last line of a side that has no final newline: the old side for a
/// deletion, the new side for an addition, both for context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub text: String,
    pub kind: LineKind,
    pub hunk_id: usize,
    pub old_line_no: Option<u32>,
    pub new_line_no: Option<u32>,
    pub is_staged: bool,
    pub no_newline: bool,
}


/// Working tree status of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Untracked,
}

impl FileStatus {
    /// Map a porcelain status column character.
    pub fn from_porcelain(c: char) -> Self {
        match c {
            'A' => FileStatus::Added,
            'D' => FileStatus::Deleted,
            '?' => FileStatus::Untracked,
            _ => FileStatus::Modified,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            FileStatus::Modified => "M",
            FileStatus::Added => "A",
            FileStatus::Deleted => "D",
            FileStatus::Untracked => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFileEntry {
    pub filename: String,
    pub status: FileStatus,
    pub marked_for_commit: bool,
    pub has_staged_changes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    pub short_hash: String,
    pub author_initials: String,
    pub title: String,
    pub is_pushed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEntry {
    pub name: String,
    pub is_current: bool,
    pub commits_ahead: u32,
    pub commits_behind: u32,
}

/// A stash is identified only by its position in the current listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashEntry {
    pub description: String,
}

/// The eight states of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    FileList,
    FileView { split: bool },
    CommitList,
    CommitView,
    BranchList,
    BranchView,
    StashList,
    StashView,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::FileList => "Files",
            ViewMode::FileView { .. } => "File",
            ViewMode::CommitList => "Commits",
            ViewMode::CommitView => "Commit",
            ViewMode::BranchList => "Branches",
            ViewMode::BranchView => "Branch",
            ViewMode::StashList => "Stashes",
            ViewMode::StashView => "Stash",
        }
    }
}

/// Which half of the split file view has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Unstaged,
    Staged,
}

impl Pane {
    pub fn other(self) -> Self {
        match self {
            Pane::Unstaged => Pane::Staged,
            Pane::Staged => Pane::Unstaged,
        }
    }
}

/// Classification of a line in a commit, stash or branch view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Header,
    Addition,
    Deletion,
    Stat,
    CommitHeader,
    Info,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    pub text: String,
    pub kind: ContentKind,
}

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyEventKind};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use zeroize::Zeroizing;

use crate::animation::{SyncIndicator, SyncPhase, SyncWord};
use crate::fetch::{DEFAULT_FETCH_INTERVAL, FetchOutcome, FetchScheduler};
use crate::git::{GitRunner, ShellGit};
use crate::highlight::Highlighter;
use crate::input;
use crate::modal::{
    CommitModal, ConfirmModal, ConfirmPurpose, DeleteBranchModal, InputModal, InputPurpose, Modal,
    TextInput,
};
use crate::ops::{self, Credentials, DeleteTarget, ResetKind, StashAction};
use crate::search::{self, SearchKind, SearchOverlay};
use crate::snapshot::{DEFAULT_COMMIT_LIMIT, RepositorySnapshot, clamp_index};
use crate::staging::{StagingModel, Unstaged};
use crate::types::{ContentLine, Pane, ViewMode};
use crate::ui;
use crate::ui::theme::Theme;

/// Render tick. Animations advance once per tick.
pub const TICK: Duration = Duration::from_millis(20);

/// Resolved command line options.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub workdir: PathBuf,
    pub file_filter: Option<glob::Pattern>,
    pub theme: Theme,
    /// `None` disables background fetching.
    pub fetch_interval: Option<Duration>,
    pub commit_limit: usize,
}

impl ViewerConfig {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            file_filter: None,
            theme: Theme::default(),
            fetch_interval: Some(DEFAULT_FETCH_INTERVAL),
            commit_limit: DEFAULT_COMMIT_LIMIT,
        }
    }
}

/// A git call that blocks the UI thread long enough to need the status
/// text drawn before it starts.
#[derive(Debug)]
pub enum BlockingOp {
    Push { force: bool },
    PushSetUpstream { remote: String, branch: String },
    AuthenticatedPush { credentials: Credentials, force: bool },
    Pull,
    PullBranch { name: String, is_current: bool },
}

impl BlockingOp {
    pub fn word(&self) -> SyncWord {
        match self {
            BlockingOp::Pull | BlockingOp::PullBranch { .. } => SyncWord::Pulling,
            _ => SyncWord::Pushing,
        }
    }
}

/// Result of handling one key.
#[derive(Debug)]
pub enum KeyOutcome {
    Continue,
    Quit,
    /// Draw a frame with the status text up, then run the operation.
    Deferred(BlockingOp),
}

/// Push/pull status shown next to one branch in the branch list.
#[derive(Debug, Clone)]
pub struct BranchSync {
    pub name: String,
    pub indicator: SyncIndicator,
}

/// Search overlay bound to the list it filters.
#[derive(Debug, Clone)]
pub struct ActiveSearch {
    pub list: ViewMode,
    pub overlay: SearchOverlay,
}

/// Everything the viewer knows between two key presses.
pub struct ViewerSession {
    pub git: Box<dyn GitRunner>,
    pub snapshot: RepositorySnapshot,
    pub theme: Theme,
    pub mode: ViewMode,

    pub selected_file: usize,
    pub selected_commit: usize,
    pub selected_branch: usize,
    pub selected_stash: usize,

    /// Staging state of the selected file.
    pub staging: Option<StagingModel>,
    pub active_pane: Pane,
    pub file_cursor: usize,
    pub staged_cursor: usize,
    pub file_scroll: usize,
    pub staged_scroll: usize,

    /// Commit, branch or stash text for the content pane.
    pub content: Vec<ContentLine>,
    pub content_scroll: usize,
    /// Inner heights of the content pane, or of the two split panes.
    pub viewport_height: usize,
    pub staged_viewport_height: usize,

    pub modal: Option<Modal>,
    pub search: Option<ActiveSearch>,
    pub show_help: bool,

    pub indicator: SyncIndicator,
    pub branch_sync: Option<BranchSync>,
    pub fetch: FetchScheduler,
    /// A blocking git call is running.
    pub blocking: bool,

    pub message: Option<String>,
    /// Whether the UI needs to be redrawn.
    pub dirty: bool,
}

impl ViewerSession {
    pub fn new(git: Box<dyn GitRunner>, config: ViewerConfig) -> Self {
        Self {
            git,
            snapshot: RepositorySnapshot::new(config.commit_limit, config.file_filter),
            theme: config.theme,
            mode: ViewMode::FileList,
            selected_file: 0,
            selected_commit: 0,
            selected_branch: 0,
            selected_stash: 0,
            staging: None,
            active_pane: Pane::Unstaged,
            file_cursor: 0,
            staged_cursor: 0,
            file_scroll: 0,
            staged_scroll: 0,
            content: Vec::new(),
            content_scroll: 0,
            viewport_height: 20,
            staged_viewport_height: 10,
            modal: None,
            search: None,
            show_help: false,
            indicator: SyncIndicator::new(),
            branch_sync: None,
            fetch: FetchScheduler::new(config.fetch_interval),
            blocking: false,
            message: None,
            dirty: true,
        }
    }

    /// Initial query of every list plus the first preview.
    pub fn load(&mut self) -> Result<()> {
        self.snapshot.refresh_all(self.git.as_ref())?;
        self.update_preview();
        Ok(())
    }

    /// Background fetch must wait while a dialog or blocking call is up.
    pub fn is_critical(&self) -> bool {
        self.blocking || self.modal.is_some()
    }

    /// Show a failed operation in an error popup. The snapshot is left as
    /// it was.
    pub fn report_error(&mut self, err: anyhow::Error) {
        log::warn!("{err:#}");
        self.modal = Some(Modal::error(format!("{err:#}")));
        self.dirty = true;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.dirty = true;
    }

    pub fn selected_file_name(&self) -> Option<&str> {
        self.snapshot
            .files
            .get(self.selected_file)
            .map(|f| f.filename.as_str())
    }

    pub fn selected_branch_name(&self) -> Option<&str> {
        self.snapshot
            .branches
            .get(self.selected_branch)
            .map(|b| b.name.as_str())
    }

    // ---------- navigation ----------

    fn list_len(&self, mode: ViewMode) -> usize {
        match mode {
            ViewMode::FileList | ViewMode::FileView { .. } => self.snapshot.files.len(),
            ViewMode::CommitList | ViewMode::CommitView => self.snapshot.commits.len(),
            ViewMode::BranchList | ViewMode::BranchView => self.snapshot.branches.len(),
            ViewMode::StashList | ViewMode::StashView => self.snapshot.stashes.len(),
        }
    }

    fn selection_mut(&mut self, mode: ViewMode) -> &mut usize {
        match mode {
            ViewMode::FileList | ViewMode::FileView { .. } => &mut self.selected_file,
            ViewMode::CommitList | ViewMode::CommitView => &mut self.selected_commit,
            ViewMode::BranchList | ViewMode::BranchView => &mut self.selected_branch,
            ViewMode::StashList | ViewMode::StashView => &mut self.selected_stash,
        }
    }

    /// Move the selection of the current list and preview the new entry.
    pub fn move_selection(&mut self, delta: isize) {
        let mode = self.mode;
        let len = self.list_len(mode);
        if len == 0 {
            return;
        }
        let selection = self.selection_mut(mode);
        let next = selection.saturating_add_signed(delta).min(len - 1);
        if next != *selection {
            *selection = next;
            self.update_preview();
        }
        self.dirty = true;
    }

    /// Select an entry of a list directly, as the search overlay does.
    pub fn select(&mut self, list: ViewMode, index: usize) {
        let len = self.list_len(list);
        *self.selection_mut(list) = clamp_index(index, len);
        self.mode = list;
        self.update_preview();
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        self.dirty = true;
    }

    /// Jump to one of the five top-level modes.
    pub fn jump_to(&mut self, mode: ViewMode) {
        if matches!(mode, ViewMode::FileView { .. }) && self.snapshot.files.is_empty() {
            return;
        }
        self.mode = mode;
        self.active_pane = Pane::Unstaged;
        self.update_preview();
    }

    /// Drill from the current list into its view mode.
    pub fn enter_view(&mut self) {
        let target = match self.mode {
            ViewMode::FileList => ViewMode::FileView { split: true },
            ViewMode::CommitList => ViewMode::CommitView,
            ViewMode::BranchList => ViewMode::BranchView,
            ViewMode::StashList => ViewMode::StashView,
            other => other,
        };
        if self.list_len(target) == 0 {
            return;
        }
        self.mode = target;
        self.active_pane = Pane::Unstaged;
        self.update_preview();
    }

    /// Reload whatever the content pane shows for the current selection.
    pub fn update_preview(&mut self) {
        self.content_scroll = 0;
        self.dirty = true;
        let git = self.git.as_ref();
        let loaded = match self.mode {
            ViewMode::FileList | ViewMode::FileView { .. } => {
                self.load_selected_file();
                return;
            }
            ViewMode::CommitList | ViewMode::CommitView => {
                match self.snapshot.commits.get(self.selected_commit) {
                    Some(commit) => ops::load_commit_content(git, &commit.short_hash),
                    None => Ok(Vec::new()),
                }
            }
            ViewMode::BranchList | ViewMode::BranchView => {
                match self.snapshot.branches.get(self.selected_branch) {
                    Some(branch) => ops::load_branch_content(git, &branch.name),
                    None => Ok(Vec::new()),
                }
            }
            ViewMode::StashList | ViewMode::StashView => {
                if self.selected_stash < self.snapshot.stashes.len() {
                    ops::load_stash_content(git, self.selected_stash)
                } else {
                    Ok(Vec::new())
                }
            }
        };
        match loaded {
            Ok(lines) => self.content = lines,
            Err(e) => {
                self.content.clear();
                self.report_error(e);
            }
        }
    }

    fn load_selected_file(&mut self) {
        self.file_cursor = 0;
        self.staged_cursor = 0;
        self.file_scroll = 0;
        self.staged_scroll = 0;
        let Some(name) = self.selected_file_name().map(str::to_string) else {
            self.staging = None;
            return;
        };
        match StagingModel::load(self.git.as_ref(), &name) {
            Ok(model) => self.staging = Some(model),
            Err(e) => {
                self.staging = None;
                self.report_error(e);
            }
        }
    }

    /// Re-query every list after a mutation, keeping selections by name
    /// where the entry still exists.
    pub fn refresh_after_change(&mut self) {
        let file = self.selected_file_name().map(str::to_string);
        let branch = self.selected_branch_name().map(str::to_string);
        if let Err(e) = self.snapshot.refresh_all(self.git.as_ref()) {
            self.report_error(e);
        }
        self.reselect(file.as_deref(), branch.as_deref());
        self.update_preview();
    }

    fn reselect(&mut self, file: Option<&str>, branch: Option<&str>) {
        self.selected_file = file
            .and_then(|f| self.snapshot.file_index(f))
            .unwrap_or_else(|| clamp_index(self.selected_file, self.snapshot.files.len()));
        self.selected_branch = branch
            .and_then(|b| self.snapshot.branch_index(b))
            .unwrap_or_else(|| clamp_index(self.selected_branch, self.snapshot.branches.len()));
        self.selected_commit = clamp_index(self.selected_commit, self.snapshot.commits.len());
        self.selected_stash = clamp_index(self.selected_stash, self.snapshot.stashes.len());
    }

    // ---------- content scrolling ----------

    /// Number of lines in whatever the content pane shows.
    pub fn content_len(&self) -> usize {
        match self.mode {
            ViewMode::FileList | ViewMode::FileView { .. } => {
                self.staging.as_ref().map_or(0, |s| s.lines().len())
            }
            _ => self.content.len(),
        }
    }

    pub fn scroll_content(&mut self, delta: isize) {
        let max = self.content_len().saturating_sub(1);
        self.content_scroll = self.content_scroll.saturating_add_signed(delta).min(max);
        self.dirty = true;
    }

    /// Move the cursor of the active split pane and keep it in view.
    pub fn move_cursor(&mut self, delta: isize) {
        let Some(model) = &self.staging else {
            return;
        };
        let (len, cursor, scroll, height) = match self.active_pane {
            Pane::Unstaged => (
                model.lines().len(),
                &mut self.file_cursor,
                &mut self.file_scroll,
                self.viewport_height,
            ),
            Pane::Staged => (
                model.staged_view().len(),
                &mut self.staged_cursor,
                &mut self.staged_scroll,
                self.staged_viewport_height,
            ),
        };
        if len == 0 {
            return;
        }
        *cursor = cursor.saturating_add_signed(delta).min(len - 1);
        keep_in_view(*cursor, scroll, height.max(1));
        self.dirty = true;
    }

    pub fn switch_pane(&mut self) {
        self.active_pane = self.active_pane.other();
        match self.active_pane {
            Pane::Unstaged => self.file_cursor = 0,
            Pane::Staged => self.staged_cursor = 0,
        }
        self.file_scroll = self.file_scroll.min(self.file_cursor);
        self.staged_scroll = self.staged_scroll.min(self.staged_cursor);
        self.dirty = true;
    }

    /// Page size for half-page moves in the current mode.
    pub fn half_page(&self) -> isize {
        (self.viewport_height / 2).max(1) as isize
    }

    pub fn full_page(&self) -> isize {
        self.viewport_height.max(1) as isize
    }

    // ---------- file list ----------

    pub fn toggle_mark(&mut self) {
        if let Some(file) = self.snapshot.files.get_mut(self.selected_file) {
            file.marked_for_commit = !file.marked_for_commit;
            self.dirty = true;
        }
    }

    /// Mark every file, or unmark all when all are already marked.
    pub fn toggle_all_marks(&mut self) {
        let all_marked = self.snapshot.files.iter().all(|f| f.marked_for_commit);
        for file in &mut self.snapshot.files {
            file.marked_for_commit = !all_marked;
        }
        self.dirty = true;
    }

    fn marked_files(&self) -> Vec<String> {
        self.snapshot
            .files
            .iter()
            .filter(|f| f.marked_for_commit)
            .map(|f| f.filename.clone())
            .collect()
    }

    pub fn start_commit(&mut self) {
        self.modal = Some(Modal::Commit(CommitModal::new()));
        self.dirty = true;
    }

    /// Commit with the message from the dialog. When the selected file has
    /// staged changes only the index is committed; otherwise the marked
    /// files are added first.
    pub fn submit_commit(&mut self, title: &str, body: &str) {
        let selected_staged = self
            .snapshot
            .files
            .get(self.selected_file)
            .is_some_and(|f| f.has_staged_changes);
        let files = if selected_staged {
            Vec::new()
        } else {
            let marked = self.marked_files();
            if marked.is_empty() {
                self.report_error(anyhow!("No files marked for commit"));
                return;
            }
            marked
        };

        match ops::commit(self.git.as_ref(), &files, title, body) {
            Ok(()) => {
                for file in &mut self.snapshot.files {
                    file.marked_for_commit = false;
                }
                self.refresh_after_change();
                self.set_message(format!("Committed: {title}"));
            }
            Err(e) => self.report_error(e),
        }
    }

    pub fn start_stash(&mut self) {
        self.modal = Some(Modal::Input(InputModal::new(
            " Create Stash ",
            "Stash name (optional):",
            InputPurpose::StashName,
        )));
        self.dirty = true;
    }

    pub fn create_stash(&mut self, name: &str) {
        if let Err(e) = self.snapshot.refresh_stashes(self.git.as_ref()) {
            self.report_error(e);
            return;
        }
        match ops::create_stash(self.git.as_ref(), name) {
            Ok(true) => {
                self.selected_stash = 0;
                self.refresh_after_change();
                self.set_message("Stash created");
            }
            Ok(false) => self.set_message("No changes to stash"),
            Err(e) => self.report_error(e),
        }
    }

    // ---------- file view ----------

    /// Space in the split view: stage the cursor line or unstage from the
    /// staged pane.
    pub fn toggle_at_cursor(&mut self) {
        let Some(model) = self.staging.as_mut() else {
            return;
        };
        match self.active_pane {
            Pane::Unstaged => {
                model.toggle_line(self.file_cursor);
                self.staged_cursor = clamp_index(self.staged_cursor, model.staged_view().len());
            }
            Pane::Staged => match model.unstage_line(self.git.as_ref(), self.staged_cursor) {
                Ok(Unstaged::Index) => {
                    self.refresh_after_change();
                    self.mode = ViewMode::FileView { split: true };
                    self.active_pane = Pane::Staged;
                }
                Ok(Unstaged::InMemory) => {
                    self.staged_cursor =
                        clamp_index(self.staged_cursor, model.staged_view().len());
                }
                Ok(Unstaged::Ignored) => {}
                Err(e) => self.report_error(e),
            },
        }
        self.dirty = true;
    }

    /// Write the selected lines to the index.
    pub fn apply_staging(&mut self) {
        let Some(model) = self.staging.as_ref() else {
            return;
        };
        let count = model.staged_count();
        match model.apply_staged_changes(self.git.as_ref()) {
            Ok(true) => {
                self.refresh_after_change();
                self.set_message(format!("Staged {count} line(s)"));
            }
            Ok(false) => self.set_message("No lines selected"),
            Err(e) => self.report_error(e),
        }
    }

    pub fn reset_staging(&mut self) {
        if let Some(model) = self.staging.as_mut() {
            model.reset_staged_changes();
            self.staged_cursor = 0;
            self.staged_scroll = 0;
            self.dirty = true;
        }
    }

    // ---------- commits ----------

    /// `r` / `R` on the commit list. Anything other than the tip is ignored.
    pub fn request_reset(&mut self, kind: ResetKind) {
        if self.selected_commit != 0 || self.snapshot.commits.is_empty() {
            return;
        }
        match kind {
            ResetKind::Soft => self.reset(ResetKind::Soft),
            ResetKind::Hard => {
                self.modal = Some(Modal::Confirm(ConfirmModal::hard_reset()));
                self.dirty = true;
            }
        }
    }

    fn reset(&mut self, kind: ResetKind) {
        match ops::reset_head(self.git.as_ref(), kind) {
            Ok(()) => {
                self.selected_commit = 0;
                self.refresh_after_change();
                self.set_message(match kind {
                    ResetKind::Soft => "Reset HEAD~1 (changes kept)",
                    ResetKind::Hard => "Reset HEAD~1 (changes discarded)",
                });
            }
            Err(e) => self.report_error(e),
        }
    }

    pub fn start_amend(&mut self) {
        if self.snapshot.commits.is_empty() {
            return;
        }
        match ops::head_message(self.git.as_ref()) {
            Ok((title, body)) => {
                self.modal = Some(Modal::Commit(CommitModal::amend(&title, &body)));
                self.dirty = true;
            }
            Err(e) => self.report_error(e),
        }
    }

    pub fn submit_amend(&mut self, title: &str, body: &str) {
        let files = self.marked_files();
        match ops::amend(self.git.as_ref(), &files, title, body) {
            Ok(()) => {
                for file in &mut self.snapshot.files {
                    file.marked_for_commit = false;
                }
                self.refresh_after_change();
                self.set_message("Amended HEAD");
            }
            Err(e) => self.report_error(e),
        }
    }

    /// `P`: work out which kind of push is needed, asking first when the
    /// branch has no upstream or has diverged.
    pub fn start_push(&mut self) -> KeyOutcome {
        let git = self.git.as_ref();
        let branch = match ops::current_branch_name(git) {
            Ok(branch) => branch,
            Err(e) => {
                self.report_error(e);
                return KeyOutcome::Continue;
            }
        };

        if !ops::has_upstream(git, &branch) {
            let remotes = ops::remotes(git);
            let default_remote = remotes.first().map_or("origin", String::as_str);
            let input = TextInput::with_value(format!("{default_remote} {branch}"));
            let suggestions = remotes.iter().map(|r| format!("{r} {branch}")).collect();
            self.modal = Some(Modal::Input(
                InputModal::new(
                    " Set Upstream Branch ",
                    "Enter upstream as <remote> <branchname>",
                    InputPurpose::Upstream,
                )
                .with_input(input)
                .with_suggestions(suggestions),
            ));
            self.dirty = true;
            return KeyOutcome::Continue;
        }

        let (ahead, behind) = ops::divergence(git);
        if ops::is_diverged(ahead, behind) {
            self.modal = Some(Modal::Confirm(ConfirmModal::force_push(ahead, behind)));
            self.dirty = true;
            return KeyOutcome::Continue;
        }
        KeyOutcome::Deferred(BlockingOp::Push { force: false })
    }

    // ---------- branches ----------

    pub fn checkout_selected(&mut self) {
        let Some(branch) = self.snapshot.branches.get(self.selected_branch) else {
            return;
        };
        if branch.is_current {
            let message = format!("Already on {}", branch.name);
            self.set_message(message);
            return;
        }
        let name = branch.name.clone();
        match ops::checkout_branch(self.git.as_ref(), &name) {
            Ok(()) => {
                self.refresh_after_change();
                self.set_message(format!("Switched to {name}"));
            }
            Err(e) => self.report_error(e),
        }
    }

    pub fn start_new_branch(&mut self) {
        self.modal = Some(Modal::Input(InputModal::new(
            " New Branch ",
            "Branch name:",
            InputPurpose::NewBranch,
        )));
        self.dirty = true;
    }

    pub fn start_rename_branch(&mut self) {
        let Some(old) = self.selected_branch_name().map(str::to_string) else {
            return;
        };
        self.modal = Some(Modal::Input(
            InputModal::new(
                " Rename Branch ",
                &format!("New name for {old}:"),
                InputPurpose::RenameBranch { old: old.clone() },
            )
            .with_input(TextInput::with_value(old)),
        ));
        self.dirty = true;
    }

    pub fn start_delete_branch(&mut self) {
        let Some(branch) = self.snapshot.branches.get(self.selected_branch) else {
            return;
        };
        if branch.is_current {
            let err = anyhow!("Cannot delete the checked out branch {}", branch.name);
            self.report_error(err);
            return;
        }
        self.modal = Some(Modal::DeleteBranch(DeleteBranchModal::new(&branch.name)));
        self.dirty = true;
    }

    fn delete_branch(&mut self, name: &str, target: DeleteTarget) {
        match ops::delete_branch(self.git.as_ref(), name, target) {
            Ok(()) => {
                self.refresh_after_change();
                self.set_message(format!("Deleted {name}"));
            }
            Err(e) => self.report_error(e),
        }
    }

    /// `p` on the branch list. Only branches behind their remote are pulled.
    pub fn pull_selected_branch(&mut self) -> KeyOutcome {
        let Some(branch) = self.snapshot.branches.get(self.selected_branch) else {
            return KeyOutcome::Continue;
        };
        if branch.commits_behind == 0 {
            let message = format!("{} is up to date", branch.name);
            self.set_message(message);
            return KeyOutcome::Continue;
        }
        KeyOutcome::Deferred(BlockingOp::PullBranch {
            name: branch.name.clone(),
            is_current: branch.is_current,
        })
    }

    // ---------- stashes ----------

    /// Apply, pop or drop the selected stash. The list is re-queried before
    /// and after so the index refers to the current listing.
    pub fn stash_action(&mut self, action: StashAction) {
        if let Err(e) = self.snapshot.refresh_stashes(self.git.as_ref()) {
            self.report_error(e);
            return;
        }
        if self.selected_stash >= self.snapshot.stashes.len() {
            self.selected_stash = clamp_index(self.selected_stash, self.snapshot.stashes.len());
            self.dirty = true;
            return;
        }
        match ops::stash_action(self.git.as_ref(), action, self.selected_stash) {
            Ok(()) => {
                self.refresh_after_change();
                self.set_message(match action {
                    StashAction::Apply => "Stash applied",
                    StashAction::Pop => "Stash popped",
                    StashAction::Drop => "Stash dropped",
                });
            }
            Err(e) => {
                if let Err(refresh) = self.snapshot.refresh_stashes(self.git.as_ref()) {
                    log::warn!("{refresh:#}");
                }
                self.report_error(e);
            }
        }
    }

    // ---------- search ----------

    pub fn open_search(&mut self) {
        let list = self.mode;
        let (kind, candidates): (SearchKind, Vec<Vec<String>>) = match list {
            ViewMode::FileList => (
                SearchKind::Fuzzy,
                self.snapshot
                    .files
                    .iter()
                    .map(|f| vec![f.filename.clone()])
                    .collect(),
            ),
            ViewMode::CommitList => (
                SearchKind::Grep,
                self.snapshot
                    .commits
                    .iter()
                    .map(|c| vec![c.title.clone(), c.author_initials.clone()])
                    .collect(),
            ),
            ViewMode::BranchList => (
                SearchKind::Grep,
                self.snapshot
                    .branches
                    .iter()
                    .map(|b| vec![b.name.clone()])
                    .collect(),
            ),
            ViewMode::StashList => (
                SearchKind::Grep,
                self.snapshot
                    .stashes
                    .iter()
                    .map(|s| {
                        let mut alternatives = vec![s.description.clone()];
                        if let Some(branch) = search::extract_branch_from_stash(&s.description) {
                            alternatives.push(branch.to_string());
                        }
                        alternatives
                    })
                    .collect(),
            ),
            _ => return,
        };
        if candidates.is_empty() {
            return;
        }
        self.search = Some(ActiveSearch {
            list,
            overlay: SearchOverlay::new(kind, candidates),
        });
        self.dirty = true;
    }

    /// Close the overlay and jump to the chosen entry.
    pub fn accept_search(&mut self) {
        if let Some(search) = self.search.take()
            && let Some(index) = search.overlay.selected_item()
        {
            self.select(search.list, index);
        }
        self.dirty = true;
    }

    // ---------- modal results ----------

    /// Act on a submitted dialog.
    pub fn submit_modal(&mut self, modal: Modal) -> KeyOutcome {
        match modal {
            Modal::Input(mut input) => {
                let value = input.input.take();
                let purpose = std::mem::replace(&mut input.purpose, InputPurpose::StashName);
                return self.submit_input(purpose, value);
            }
            Modal::Confirm(confirm) => match confirm.purpose {
                ConfirmPurpose::HardReset => self.reset(ResetKind::Hard),
                ConfirmPurpose::ForcePush => {
                    return KeyOutcome::Deferred(BlockingOp::Push { force: true });
                }
            },
            Modal::DeleteBranch(delete) => {
                let target = delete.target();
                self.delete_branch(&delete.branch, target);
            }
            Modal::Commit(mut commit) => {
                let title = commit.title.take();
                if commit.amend {
                    self.submit_amend(&title, &commit.body);
                } else {
                    self.submit_commit(&title, &commit.body);
                }
            }
            Modal::Error(_) => {}
        }
        KeyOutcome::Continue
    }

    fn submit_input(&mut self, purpose: InputPurpose, value: Zeroizing<String>) -> KeyOutcome {
        match purpose {
            InputPurpose::StashName => self.create_stash(&value),
            InputPurpose::NewBranch => match ops::create_branch(self.git.as_ref(), &value) {
                Ok(name) => {
                    self.refresh_after_change();
                    if let Some(index) = self.snapshot.branch_index(&name) {
                        self.selected_branch = index;
                        self.update_preview();
                    }
                    self.set_message(format!("Created {name}"));
                }
                Err(e) => self.report_error(e),
            },
            InputPurpose::RenameBranch { old } => {
                match ops::rename_branch(self.git.as_ref(), &old, &value) {
                    Ok(name) => {
                        self.refresh_after_change();
                        if let Some(index) = self.snapshot.branch_index(&name) {
                            self.selected_branch = index;
                            self.update_preview();
                        }
                        self.set_message(format!("Renamed {old} to {name}"));
                    }
                    Err(e) => self.report_error(e),
                }
            }
            InputPurpose::Upstream => {
                let parts: Vec<&str> = value.split_whitespace().collect();
                if let [remote, branch] = parts.as_slice() {
                    return KeyOutcome::Deferred(BlockingOp::PushSetUpstream {
                        remote: remote.to_string(),
                        branch: branch.to_string(),
                    });
                }
                self.report_error(anyhow!("Enter upstream as <remote> <branchname>"));
            }
            InputPurpose::Username { force } => {
                if value.trim().is_empty() {
                    return KeyOutcome::Continue;
                }
                self.modal = Some(Modal::Input(
                    InputModal::new(
                        " GitHub Authentication ",
                        "Personal access token:",
                        InputPurpose::Token {
                            force,
                            username: Zeroizing::new(value.trim().to_string()),
                        },
                    )
                    .with_input(TextInput::masked()),
                ));
                self.dirty = true;
            }
            InputPurpose::Token { force, username } => {
                if value.is_empty() {
                    return KeyOutcome::Continue;
                }
                let credentials = Credentials::new(username, value);
                return KeyOutcome::Deferred(BlockingOp::AuthenticatedPush { credentials, force });
            }
        }
        KeyOutcome::Continue
    }

    // ---------- blocking operations ----------

    /// Put the status text up before a blocking call.
    pub fn begin_blocking(&mut self, op: &BlockingOp) {
        self.blocking = true;
        let word = op.word();
        self.indicator.show_now(word);
        let branch = match op {
            BlockingOp::PullBranch { name, .. } => Some(name.clone()),
            _ => self.snapshot.current_branch().map(|b| b.name.clone()),
        };
        self.branch_sync = branch.map(|name| {
            let mut indicator = SyncIndicator::new();
            indicator.show_now(word);
            BranchSync { name, indicator }
        });
        self.dirty = true;
    }

    /// Run a deferred operation to completion on the UI thread.
    pub fn run_blocking(&mut self, op: BlockingOp) {
        let success = match op.word() {
            SyncWord::Pulling => SyncWord::Pulled,
            _ => SyncWord::Pushed,
        };
        let git = self.git.as_ref();
        let result = match op {
            BlockingOp::Push { force } => match ops::push_without_prompt(git, force) {
                Ok(true) => Ok(()),
                Ok(false) => {
                    self.blocking = false;
                    self.clear_indicators();
                    self.modal = Some(Modal::Input(InputModal::new(
                        " GitHub Authentication ",
                        "Username:",
                        InputPurpose::Username { force },
                    )));
                    self.dirty = true;
                    return;
                }
                Err(e) => Err(e),
            },
            BlockingOp::PushSetUpstream { remote, branch } => {
                ops::push_set_upstream(git, &remote, &branch)
            }
            BlockingOp::AuthenticatedPush { credentials, force } => {
                let result = ops::push_with_credentials(git, &credentials, force);
                drop(credentials);
                result
            }
            BlockingOp::Pull => ops::pull(git),
            BlockingOp::PullBranch { name, is_current } => {
                ops::pull_branch(git, &name, is_current)
            }
        };
        self.blocking = false;

        match result {
            Ok(()) => {
                self.refresh_after_change();
                self.indicator.start(success);
                if let Some(sync) = &mut self.branch_sync {
                    sync.indicator.start(success);
                }
            }
            Err(e) => {
                self.clear_indicators();
                self.report_error(e);
            }
        }
        self.dirty = true;
    }

    fn clear_indicators(&mut self) {
        self.indicator.clear();
        self.branch_sync = None;
    }

    // ---------- ticks ----------

    /// Advance animations and the background fetch. Returns true when a
    /// redraw is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut redraw = self.indicator.tick();
        if let Some(sync) = &mut self.branch_sync {
            redraw |= sync.indicator.tick();
            if sync.indicator.is_idle() {
                self.branch_sync = None;
                redraw = true;
            }
        }

        if let Some(outcome) = self.fetch.poll() {
            self.on_fetch_complete(outcome);
            redraw = true;
        }

        if self.fetch.is_due(now, self.is_critical()) {
            match self.fetch.start(self.git.workdir()) {
                Ok(()) => {
                    if self.indicator.is_idle() {
                        self.indicator.start(SyncWord::Fetching);
                    }
                    redraw = true;
                }
                Err(e) => log::warn!("{e:#}"),
            }
        }
        redraw
    }

    fn showing_fetch(&self) -> bool {
        matches!(
            self.indicator.phase(),
            SyncPhase::Appearing(SyncWord::Fetching)
                | SyncPhase::Visible(SyncWord::Fetching)
                | SyncPhase::Disappearing(SyncWord::Fetching)
        )
    }

    /// Pick up remote changes after a background fetch. Lines selected for
    /// staging in the open file view are kept.
    pub fn on_fetch_complete(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Succeeded => {
                let file = self.selected_file_name().map(str::to_string);
                let branch = self.selected_branch_name().map(str::to_string);
                let git = self.git.as_ref();
                let refreshed = self
                    .snapshot
                    .refresh_changed_files(git)
                    .and_then(|()| self.snapshot.refresh_commit_history(git))
                    .and_then(|()| self.snapshot.refresh_branches(git));
                if let Err(e) = refreshed {
                    log::warn!("refresh after fetch failed: {e:#}");
                }
                self.reselect(file.as_deref(), branch.as_deref());

                let pending = self.staging.as_ref().is_some_and(StagingModel::has_pending);
                let in_file_view = matches!(self.mode, ViewMode::FileView { .. });
                if !(in_file_view && pending) && self.modal.is_none() {
                    self.update_preview();
                }
                if self.showing_fetch() {
                    self.indicator.start(SyncWord::Synced);
                }
            }
            FetchOutcome::Failed => {
                if self.showing_fetch() {
                    self.indicator.clear();
                }
            }
        }
        self.dirty = true;
    }
}

fn keep_in_view(cursor: usize, scroll: &mut usize, height: usize) {
    if cursor < *scroll {
        *scroll = cursor;
    } else if cursor >= *scroll + height {
        *scroll = cursor + 1 - height;
    }
}

/// Guard that restores terminal state on drop (including panics).
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show,
        );
    }
}

/// Run the viewer until the user quits.
pub fn run(config: ViewerConfig) -> Result<()> {
    let git = ShellGit::new(config.workdir.clone());
    let mut session = ViewerSession::new(Box::new(git), config);
    session.load()?;

    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide,
    )?;
    let _guard = TerminalGuard;

    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;
    let highlighter = Highlighter::new();

    loop {
        if session.tick(Instant::now()) {
            session.dirty = true;
        }

        if session.dirty {
            terminal.draw(|frame| ui::render(frame, &mut session, &highlighter))?;
            session.dirty = false;
        }

        if !event::poll(TICK)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match input::handle_key(&mut session, key) {
                    KeyOutcome::Continue => {}
                    KeyOutcome::Quit => break,
                    KeyOutcome::Deferred(op) => {
                        session.begin_blocking(&op);
                        terminal.draw(|frame| ui::render(frame, &mut session, &highlighter))?;
                        session.run_blocking(op);
                    }
                }
                session.dirty = true;
            }
            Event::Resize(_, _) => session.dirty = true,
            _ => {}
        }
    }

    log::info!("viewer closed");
    Ok(())
}

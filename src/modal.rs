//! Modal dialogs: text prompts, confirmations, the branch delete chooser,
//! the commit message editor and error popups.
//!
//! A modal owns its input state and turns key events into a
//! [`ModalAction`]. What a submitted value means is up to the caller, keyed
//! by the purpose the modal was opened with.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use zeroize::{Zeroize, Zeroizing};

use crate::ops::DeleteTarget;

/// What a key press did to the open modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Continue,
    Cancel,
    Submit,
}

/// Single-line editable text with a character cursor.
///
/// The buffer may hold a token. It is zeroed on drop and never left behind
/// by a reallocation: growing copies into a fresh buffer and zeroes the old.
#[derive(Default)]
pub struct TextInput {
    value: Zeroizing<String>,
    cursor: usize,
    masked: bool,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let value = Zeroizing::new(value.into());
        let cursor = value.chars().count();
        Self {
            value,
            cursor,
            masked: false,
        }
    }

    pub fn masked() -> Self {
        Self {
            value: Zeroizing::default(),
            cursor: 0,
            masked: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    /// Replace the whole value and put the cursor at the end.
    pub fn set(&mut self, value: &str) {
        self.value.zeroize();
        self.reserve(value.len());
        self.value.push_str(value);
        self.cursor = self.value.chars().count();
    }

    /// Move the value out, leaving the input empty.
    pub fn take(&mut self) -> Zeroizing<String> {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    /// Make room for `extra` bytes without letting `String` reallocate in
    /// place, which would leave an unzeroed copy of the old contents.
    fn reserve(&mut self, extra: usize) {
        let needed = self.value.len() + extra;
        if needed <= self.value.capacity() {
            return;
        }
        let capacity = needed.max(16).next_power_of_two();
        let mut grown = Zeroizing::new(String::with_capacity(capacity));
        grown.push_str(&self.value);
        self.value = grown;
    }

    /// Text to draw: asterisks for masked input.
    pub fn display(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.to_string()
        }
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert(&mut self, c: char) {
        self.reserve(c.len_utf8());
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.value.remove(at);
    }

    /// Apply a line-editing key. Returns false when the key is not an
    /// editing key.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.value.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            _ => return false,
        }
        true
    }
}

impl std::fmt::Debug for TextInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = if self.masked {
            "<masked>"
        } else {
            self.value.as_str()
        };
        f.debug_struct("TextInput")
            .field("value", &value)
            .field("cursor", &self.cursor)
            .finish()
    }
}


/// Why a text prompt was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPurpose {
    StashName,
    NewBranch,
    RenameBranch { old: String },
    /// `<remote> <branch>` for a branch without upstream.
    Upstream,
    Username { force: bool },
    Token {
        force: bool,
        username: Zeroizing<String>,
    },
}

#[derive(Debug)]
pub struct InputModal {
    pub title: String,
    pub prompt: String,
    pub input: TextInput,
    pub suggestions: Vec<String>,
    pub suggestion: Option<usize>,
    pub purpose: InputPurpose,
}

impl InputModal {
    pub fn new(title: &str, prompt: &str, purpose: InputPurpose) -> Self {
        Self {
            title: title.to_string(),
            prompt: prompt.to_string(),
            input: TextInput::new(),
            suggestions: Vec::new(),
            suggestion: None,
            purpose,
        }
    }

    pub fn with_input(mut self, input: TextInput) -> Self {
        self.input = input;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Tab and arrows walk the suggestions and copy the focused one into the
    /// input.
    fn cycle_suggestion(&mut self, forward: bool) {
        if self.suggestions.is_empty() {
            return;
        }
        let len = self.suggestions.len();
        let next = match (self.suggestion, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.suggestion = Some(next);
        let value = self.suggestions[next].clone();
        self.input.set(&value);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        match key.code {
            KeyCode::Esc => ModalAction::Cancel,
            KeyCode::Enter => ModalAction::Submit,
            KeyCode::Tab | KeyCode::Down if !self.suggestions.is_empty() => {
                self.cycle_suggestion(true);
                ModalAction::Continue
            }
            KeyCode::BackTab | KeyCode::Up if !self.suggestions.is_empty() => {
                self.cycle_suggestion(false);
                ModalAction::Continue
            }
            _ => {
                self.input.handle_key(key);
                ModalAction::Continue
            }
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPurpose {
    HardReset,
    ForcePush,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmModal {
    pub title: String,
    pub lines: Vec<String>,
    pub purpose: ConfirmPurpose,
}

impl ConfirmModal {
    pub fn hard_reset() -> Self {
        Self {
            title: " Hard Reset ".to_string(),
            lines: vec![
                "Undo the last commit and DISCARD its changes?".to_string(),
                "This cannot be undone.".to_string(),
            ],
            purpose: ConfirmPurpose::HardReset,
        }
    }

    pub fn force_push(ahead: u32, behind: u32) -> Self {
        Self {
            title: " Branch Diverged ".to_string(),
            lines: vec![
                format!("Local is {ahead} ahead and {behind} behind its upstream."),
                "Force push with --force-with-lease?".to_string(),
            ],
            purpose: ConfirmPurpose::ForcePush,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ModalAction::Submit,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ModalAction::Cancel,
            _ => ModalAction::Continue,
        }
    }
}

/// Local / remote / both chooser for deleting a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteBranchModal {
    pub branch: String,
    pub selected: usize,
}

impl DeleteBranchModal {
    pub fn new(branch: &str) -> Self {
        Self {
            branch: branch.to_string(),
            selected: 0,
        }
    }

    pub fn target(&self) -> DeleteTarget {
        DeleteTarget::ALL[self.selected.min(DeleteTarget::ALL.len() - 1)]
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        let count = DeleteTarget::ALL.len();
        match key.code {
            KeyCode::Esc => ModalAction::Cancel,
            KeyCode::Enter => ModalAction::Submit,
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected = (self.selected + 1).min(count - 1);
                ModalAction::Continue
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                ModalAction::Continue
            }
            KeyCode::Char('l') => {
                self.selected = 0;
                ModalAction::Submit
            }
            KeyCode::Char('r') => {
                self.selected = 1;
                ModalAction::Submit
            }
            KeyCode::Char('b') => {
                self.selected = 2;
                ModalAction::Submit
            }
            _ => ModalAction::Continue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitField {
    Title,
    Body,
}

/// Title plus free-form body. Enter in the title commits, Enter in the body
/// inserts a newline and Tab switches fields.
#[derive(Debug)]
pub struct CommitModal {
    pub title: TextInput,
    pub body: String,
    pub field: CommitField,
    pub amend: bool,
}

impl CommitModal {
    pub fn new() -> Self {
        Self {
            title: TextInput::new(),
            body: String::new(),
            field: CommitField::Title,
            amend: false,
        }
    }

    pub fn amend(title: &str, body: &str) -> Self {
        Self {
            title: TextInput::with_value(title),
            body: body.to_string(),
            field: CommitField::Title,
            amend: true,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        match (key.code, self.field) {
            (KeyCode::Esc, _) => ModalAction::Cancel,
            (KeyCode::Tab | KeyCode::BackTab, field) => {
                self.field = match field {
                    CommitField::Title => CommitField::Body,
                    CommitField::Body => CommitField::Title,
                };
                ModalAction::Continue
            }
            (KeyCode::Enter, CommitField::Title) => {
                if self.title.value().trim().is_empty() {
                    ModalAction::Continue
                } else {
                    ModalAction::Submit
                }
            }
            (KeyCode::Enter, CommitField::Body) => {
                self.body.push('\n');
                ModalAction::Continue
            }
            (KeyCode::Backspace, CommitField::Body) => {
                self.body.pop();
                ModalAction::Continue
            }
            (KeyCode::Char(c), CommitField::Body)
                if !key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.body.push(c);
                ModalAction::Continue
            }
            (_, CommitField::Title) => {
                self.title.handle_key(key);
                ModalAction::Continue
            }
            _ => ModalAction::Continue,
        }
    }
}

impl Default for CommitModal {
    fn default() -> Self {
        Self::new()
    }
}

/// The dialog currently on top of the panes.
#[derive(Debug)]
pub enum Modal {
    Input(InputModal),
    Confirm(ConfirmModal),
    DeleteBranch(DeleteBranchModal),
    Commit(CommitModal),
    /// Dismissed by any key.
    Error(String),
}

impl Modal {
    pub fn error(message: impl Into<String>) -> Self {
        Modal::Error(message.into())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        match self {
            Modal::Input(m) => m.handle_key(key),
            Modal::Confirm(m) => m.handle_key(key),
            Modal::DeleteBranch(m) => m.handle_key(key),
            Modal::Commit(m) => m.handle_key(key),
            Modal::Error(_) => ModalAction::Cancel,
        }
    }
}

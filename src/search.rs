//! Subsequence scoring for the file picker and the list filters.

/// Score returned for an empty query so every item matches.
pub const EMPTY_QUERY_SCORE: i32 = 1000;

/// Score a file path against a fuzzy pattern. Zero means no match.
///
/// Every pattern character must appear in order (case-insensitive).
/// Consecutive runs, matches after a path separator or punctuation, a
/// matching first character and short paths all score higher.
pub fn fuzzy_score(pattern: &str, filename: &str) -> i32 {
    if pattern.is_empty() {
        return EMPTY_QUERY_SCORE;
    }
    let pat: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let name: Vec<char> = filename.chars().collect();
    if pat.len() > name.len() {
        return 0;
    }

    let basename_start = name
        .iter()
        .rposition(|&c| c == '/')
        .map_or(0, |pos| pos + 1);

    let mut score = 0i32;
    let mut pos = 0usize;
    let mut consecutive = 0i32;
    let mut first_char_bonus = 0;

    for (i, &c) in name.iter().enumerate() {
        if pos >= pat.len() {
            break;
        }
        if c.to_ascii_lowercase() != pat[pos] {
            consecutive = 0;
            continue;
        }

        score += 1;
        consecutive += 1;
        score += consecutive * 5;

        if i == 0 || matches!(name[i - 1], '/' | '_' | '-' | '.') {
            score += 15;
        }
        if pos == 0 {
            if i == 0 {
                first_char_bonus = 50;
            } else if i == basename_start {
                first_char_bonus = 30;
            }
        }
        if i == pos {
            score += 10;
        }
        pos += 1;
    }

    if pos < pat.len() {
        return 0;
    }

    let len = name.len() as i32;
    let unmatched = len - pat.len() as i32;
    score + first_char_bonus + (100 - len) + (50 - unmatched)
}

/// Score free text (commit titles, branch names, stash descriptions).
/// Same shape as [`fuzzy_score`] with word boundaries at spaces, dashes and
/// underscores and smaller bonuses.
pub fn grep_score(pattern: &str, text: &str) -> i32 {
    if pattern.is_empty() {
        return EMPTY_QUERY_SCORE;
    }
    let pat: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let chars: Vec<char> = text.chars().collect();
    if pat.len() > chars.len() {
        return 0;
    }

    let mut score = 0i32;
    let mut pos = 0usize;
    let mut consecutive = 0i32;
    let mut first_char_bonus = 0;

    for (i, &c) in chars.iter().enumerate() {
        if pos >= pat.len() {
            break;
        }
        if c.to_ascii_lowercase() != pat[pos] {
            consecutive = 0;
            continue;
        }

        score += 1;
        consecutive += 1;
        score += consecutive * 3;

        if i == 0 || matches!(chars[i - 1], ' ' | '-' | '_') {
            score += 10;
        }
        if pos == 0 && i == 0 {
            first_char_bonus = 30;
        }
        if i == pos {
            score += 5;
        }
        pos += 1;
    }

    if pos < pat.len() {
        return 0;
    }

    let len = chars.len() as i32;
    score + first_char_bonus + (50 - len) + (30 - (len - pat.len() as i32))
}

/// The branch a stash was made on: the text after "On " up to the next ':'.
pub fn extract_branch_from_stash(description: &str) -> Option<&str> {
    let start = description.find("On ")? + 3;
    let rest = &description[start..];
    let end = rest.find(':')?;
    let branch = rest[..end].trim_end();
    (!branch.is_empty()).then_some(branch)
}

/// Which scorer an overlay uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// File picker over changed file paths.
    Fuzzy,
    /// Filter over commit, branch or stash lists.
    Grep,
}

/// Typed query plus ranked matches over some list.
///
/// `results` holds `(item_index, score)` pairs sorted best first; the item
/// index refers back into the list the overlay was opened on.
#[derive(Debug, Clone)]
pub struct SearchOverlay {
    pub kind: SearchKind,
    pub query: String,
    pub results: Vec<(usize, i32)>,
    pub selected: usize,
    pub scroll: usize,
    candidates: Vec<Vec<String>>,
}

impl SearchOverlay {
    /// Each candidate is the set of strings an item can be matched by; the
    /// item scores as its best-matching string.
    pub fn new(kind: SearchKind, candidates: Vec<Vec<String>>) -> Self {
        let mut overlay = Self {
            kind,
            query: String::new(),
            results: Vec::new(),
            selected: 0,
            scroll: 0,
            candidates,
        };
        overlay.update();
        overlay
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.update();
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.update();
    }

    /// Re-score every candidate against the query.
    pub fn update(&mut self) {
        let score_fn = match self.kind {
            SearchKind::Fuzzy => fuzzy_score,
            SearchKind::Grep => grep_score,
        };
        let mut results: Vec<(usize, i32)> = self
            .candidates
            .iter()
            .enumerate()
            .filter_map(|(i, texts)| {
                let best = texts
                    .iter()
                    .filter(|t| !t.is_empty())
                    .map(|t| score_fn(&self.query, t))
                    .max()
                    .unwrap_or(0);
                (best > 0).then_some((i, best))
            })
            .collect();
        results.sort_by(|a, b| b.1.cmp(&a.1));
        self.results = results;
        self.selected = 0;
        self.scroll = 0;
    }

    pub fn select_next(&mut self) {
        if !self.results.is_empty() {
            self.selected = (self.selected + 1).min(self.results.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the selected row inside a window of `visible_height` rows.
    pub fn ensure_visible(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + visible_height {
            self.scroll = self.selected + 1 - visible_height;
        }
    }

    /// Index into the searched list of the highlighted result.
    pub fn selected_item(&self) -> Option<usize> {
        self.results.get(self.selected).map(|(i, _)| *i)
    }

    /// Primary display text of a candidate.
    pub fn label(&self, item: usize) -> &str {
        self.candidates
            .get(item)
            .and_then(|texts| texts.first())
            .map_or("", String::as_str)
    }
}

//! Typewriter animation for the transient sync status text.
//!
//! Each word appears one character at a time, holds, then disappears the
//! same way. Progress is driven by [`SyncIndicator::tick`], called once per
//! ~20ms render tick.

/// Spinner glyphs shown after an in-progress word.
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// The spinner frame counter wraps after this many ticks.
const SPINNER_WRAP: u32 = 100;

/// The words the indicator can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncWord {
    Fetching,
    Pushing,
    Pulling,
    Synced,
    Pushed,
    Pulled,
}

impl SyncWord {
    pub fn text(self) -> &'static str {
        match self {
            SyncWord::Fetching => "Fetching",
            SyncWord::Pushing => "Pushing",
            SyncWord::Pulling => "Pulling",
            SyncWord::Synced => "Synced!",
            SyncWord::Pushed => "Pushed!",
            SyncWord::Pulled => "Pulled!",
        }
    }

    fn len(self) -> u32 {
        self.text().len() as u32
    }

    /// Ticks per revealed or removed character.
    fn ticks_per_char(self) -> u32 {
        match self {
            SyncWord::Pushing | SyncWord::Pushed => 1,
            _ => 2,
        }
    }

    /// How long the full word stays up. `None` holds until replaced.
    fn visible_ticks(self) -> Option<u32> {
        match self {
            SyncWord::Fetching => Some(48),
            SyncWord::Pushing => None,
            SyncWord::Pulling => Some(24),
            SyncWord::Synced => Some(60),
            SyncWord::Pushed => Some(100),
            SyncWord::Pulled => Some(40),
        }
    }

    /// The word shown once this one has disappeared.
    fn successor(self) -> Option<SyncWord> {
        match self {
            SyncWord::Fetching => Some(SyncWord::Synced),
            SyncWord::Pushing => Some(SyncWord::Pushed),
            SyncWord::Pulling => Some(SyncWord::Pulled),
            SyncWord::Synced | SyncWord::Pushed | SyncWord::Pulled => None,
        }
    }

    /// In-progress words carry a spinner while fully visible.
    pub fn in_progress(self) -> bool {
        matches!(
            self,
            SyncWord::Fetching | SyncWord::Pushing | SyncWord::Pulling
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Appearing(SyncWord),
    Visible(SyncWord),
    Disappearing(SyncWord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncIndicator {
    phase: SyncPhase,
    frame: u32,
    chars: u32,
    spinner_frame: u32,
}

impl Default for SyncIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncIndicator {
    pub fn new() -> Self {
        Self {
            phase: SyncPhase::Idle,
            frame: 0,
            chars: 0,
            spinner_frame: 0,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == SyncPhase::Idle
    }

    /// Number of characters currently revealed.
    pub fn visible_chars(&self) -> u32 {
        self.chars
    }

    /// Start a word from its first character.
    pub fn start(&mut self, word: SyncWord) {
        self.phase = SyncPhase::Appearing(word);
        self.frame = 0;
        self.chars = 0;
    }

    /// Show a word in full right away, used before a blocking git call so
    /// the text is on screen while the UI thread waits.
    pub fn show_now(&mut self, word: SyncWord) {
        self.phase = SyncPhase::Visible(word);
        self.frame = 0;
        self.chars = word.len();
    }

    pub fn clear(&mut self) {
        *self = Self {
            spinner_frame: self.spinner_frame,
            ..Self::new()
        };
    }

    /// Advance one render tick. Returns true while there is something to draw.
    pub fn tick(&mut self) -> bool {
        if self.phase == SyncPhase::Idle {
            return false;
        }

        self.spinner_frame += 1;
        if self.spinner_frame >= SPINNER_WRAP {
            self.spinner_frame = 0;
        }
        self.frame += 1;

        match self.phase {
            SyncPhase::Idle => {}
            SyncPhase::Appearing(word) => {
                self.chars = (self.frame / word.ticks_per_char()).min(word.len());
                if self.chars >= word.len() {
                    self.phase = SyncPhase::Visible(word);
                    self.frame = 0;
                }
            }
            SyncPhase::Visible(word) => {
                if let Some(limit) = word.visible_ticks()
                    && self.frame >= limit
                {
                    self.phase = SyncPhase::Disappearing(word);
                    self.frame = 0;
                    self.chars = word.len();
                }
            }
            SyncPhase::Disappearing(word) => {
                let removed = self.frame / word.ticks_per_char();
                self.chars = word.len().saturating_sub(removed);
                if self.chars == 0 {
                    match word.successor() {
                        Some(next) => self.start(next),
                        None => self.clear(),
                    }
                }
            }
        }
        true
    }

    /// Text to draw right now and whether it is a success word.
    pub fn display(&self) -> Option<(String, bool)> {
        let word = match self.phase {
            SyncPhase::Idle => return None,
            SyncPhase::Appearing(w) | SyncPhase::Visible(w) | SyncPhase::Disappearing(w) => w,
        };
        if self.chars == 0 {
            return None;
        }
        let partial: String = word.text().chars().take(self.chars as usize).collect();
        let text = match self.phase {
            SyncPhase::Visible(w) if w.in_progress() => {
                let spinner = SPINNER[(self.spinner_frame / 2) as usize % SPINNER.len()];
                format!("{partial} {spinner}")
            }
            _ => partial,
        };
        Some((text, !word.in_progress()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(ind: &mut SyncIndicator, ticks: u32) {
        for _ in 0..ticks {
            ind.tick();
        }
    }

    #[test]
    fn test_idle_draws_nothing() {
        let mut ind = SyncIndicator::new();
        assert!(!ind.tick());
        assert_eq!(ind.display(), None);
    }

    #[test]
    fn test_fetching_reveals_every_two_ticks() {
        let mut ind = SyncIndicator::new();
        ind.start(SyncWord::Fetching);
        run(&mut ind, 2);
        assert_eq!(ind.display(), Some(("F".to_string(), false)));
        run(&mut ind, 4);
        assert_eq!(ind.display(), Some(("Fet".to_string(), false)));
        run(&mut ind, 10);
        assert_eq!(ind.phase(), SyncPhase::Visible(SyncWord::Fetching));
        let (text, success) = ind.display().unwrap();
        assert!(text.starts_with("Fetching "));
        assert!(!success);
    }

    #[test]
    fn test_fetching_full_cycle_leads_to_synced_then_idle() {
        let mut ind = SyncIndicator::new();
        ind.start(SyncWord::Fetching);
        run(&mut ind, 16); // appear
        run(&mut ind, 48); // visible
        assert_eq!(ind.phase(), SyncPhase::Disappearing(SyncWord::Fetching));
        run(&mut ind, 16); // disappear
        assert_eq!(ind.phase(), SyncPhase::Appearing(SyncWord::Synced));
        run(&mut ind, 14 + 60 + 14);
        assert_eq!(ind.phase(), SyncPhase::Idle);
    }

    #[test]
    fn test_pushing_holds_until_replaced() {
        let mut ind = SyncIndicator::new();
        ind.start(SyncWord::Pushing);
        run(&mut ind, 7);
        assert_eq!(ind.phase(), SyncPhase::Visible(SyncWord::Pushing));
        run(&mut ind, 1000);
        assert_eq!(ind.phase(), SyncPhase::Visible(SyncWord::Pushing));
        ind.start(SyncWord::Pushed);
        run(&mut ind, 7);
        assert_eq!(ind.display(), Some(("Pushed!".to_string(), true)));
        run(&mut ind, 100 + 7);
        assert!(ind.is_idle());
    }

    #[test]
    fn test_pulled_timing() {
        let mut ind = SyncIndicator::new();
        ind.start(SyncWord::Pulled);
        run(&mut ind, 14);
        assert_eq!(ind.phase(), SyncPhase::Visible(SyncWord::Pulled));
        run(&mut ind, 39);
        assert_eq!(ind.phase(), SyncPhase::Visible(SyncWord::Pulled));
        run(&mut ind, 1);
        assert_eq!(ind.phase(), SyncPhase::Disappearing(SyncWord::Pulled));
        run(&mut ind, 2);
        assert_eq!(ind.display(), Some(("Pulled".to_string(), true)));
    }

    #[test]
    fn test_show_now_is_full_text() {
        let mut ind = SyncIndicator::new();
        ind.show_now(SyncWord::Pulling);
        assert_eq!(ind.visible_chars(), 7);
        assert!(ind.display().unwrap().0.starts_with("Pulling"));
    }

    #[test]
    fn test_spinner_wraps() {
        let mut ind = SyncIndicator::new();
        ind.start(SyncWord::Pushing);
        run(&mut ind, 250);
        assert!(ind.spinner_frame < SPINNER_WRAP);
    }
}

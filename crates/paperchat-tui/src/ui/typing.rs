/// Tick-driven reveal of the newest answer, so long responses read like the
/// backend is "typing" instead of landing all at once.
#[derive(Debug, Default)]
pub struct TypingEffect {
    revealed: usize,
    target: usize,
    active: bool,
}

impl TypingEffect {
    pub fn begin(&mut self, target_chars: usize) {
        self.revealed = 0;
        self.target = target_chars;
        self.active = target_chars > 0;
    }

    pub fn tick(&mut self, chars_per_tick: usize) {
        if !self.active {
            return;
        }
        self.revealed = (self.revealed + chars_per_tick).min(self.target);
        if self.revealed == self.target {
            self.active = false;
        }
    }

    pub fn skip(&mut self) {
        self.revealed = self.target;
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The currently visible prefix, cut on a char boundary.
    pub fn visible<'a>(&self, text: &'a str) -> &'a str {
        if !self.active {
            return text;
        }
        match text.char_indices().nth(self.revealed) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }
}

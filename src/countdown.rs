use crate::defaults::COUNTDOWN_START;

/// What the UI should do after one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    Show(u8),
    Go,
}

/// The 3, 2, 1 lead-in before a race. Each tick is one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u8,
}

impl Countdown {
    pub fn begin() -> Self {
        Self {
            remaining: COUNTDOWN_START,
        }
    }

    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    pub fn tick(&mut self) -> CountdownStep {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            CountdownStep::Go
        } else {
            CountdownStep::Show(self.remaining)
        }
    }
}

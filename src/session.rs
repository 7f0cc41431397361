//! The whole mutable state of the picker, owned in one place.
//!
//! Every user action and every timer tick is a method here. The UI holds a
//! single `RaceSession`, calls these methods from its callbacks and renders
//! from the accessors; nothing else mutates race state.

use crate::commentary::{self, OPENING_PHRASE};
use crate::countdown::{Countdown, CountdownStep};
use crate::history::{HistoryEntry, HistoryLog};
use crate::themes::{Theme, ThemeBook};
use crate::{
    parse_contestant_count, FrameOutcome, RaceError, RaceResult, RaceSimulator, RaceState,
    RaceStatus,
};
use log::{debug, info, warn};
use rand::Rng;

/// Source of wall-clock time for race timing and history timestamps.
pub trait Clock {
    fn now_ms(&self) -> f64;
    /// Local time of day, formatted for the history list.
    fn timestamp(&self) -> String;
}

/// Browser clock on wasm, system clock (UTC) elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(target_arch = "wasm32")]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn timestamp(&self) -> String {
        let date = js_sys::Date::new_0();
        format!(
            "{:02}:{:02}:{:02}",
            date.get_hours(),
            date.get_minutes(),
            date.get_seconds()
        )
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }

    fn timestamp(&self) -> String {
        let secs_of_day = (self.now_ms() / 1000.0) as u64 % 86_400;
        format!(
            "{:02}:{:02}:{:02}",
            secs_of_day / 3600,
            secs_of_day / 60 % 60,
            secs_of_day % 60
        )
    }
}

#[derive(Debug, Clone)]
pub struct RaceSession {
    themes: ThemeBook,
    theme: Theme,
    /// Raw text of each name input, blank when untouched.
    names: Vec<String>,
    race: RaceState,
    simulator: Option<RaceSimulator>,
    countdown: Option<Countdown>,
    commentary: String,
    history: HistoryLog,
    last_result: Option<RaceResult>,
    new_record: bool,
    muted: bool,
}

impl RaceSession {
    pub fn new(themes: ThemeBook) -> Self {
        Self {
            themes,
            theme: Theme::default(),
            names: Vec::new(),
            race: RaceState::default(),
            simulator: None,
            countdown: None,
            commentary: String::new(),
            history: HistoryLog::new(),
            last_result: None,
            new_record: false,
            muted: false,
        }
    }

    // ── accessors ───────────────────────────────────────────────────────────

    pub fn race(&self) -> &RaceState {
        &self.race
    }

    pub fn status(&self) -> RaceStatus {
        self.race.status
    }

    pub fn count(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn commentary(&self) -> &str {
        &self.commentary
    }

    pub fn countdown(&self) -> Option<u8> {
        self.countdown.map(|c| c.remaining())
    }

    pub fn last_result(&self) -> Option<&RaceResult> {
        self.last_result.as_ref()
    }

    /// Whether the most recent finish set the record.
    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn is_racing(&self) -> bool {
        self.race.status == RaceStatus::Running
    }

    /// Inputs are frozen while a race is running or counting down.
    pub fn is_locked(&self) -> bool {
        matches!(self.race.status, RaceStatus::Running | RaceStatus::Countdown)
    }

    pub fn can_start(&self) -> bool {
        self.count() > 0 && !self.is_locked()
    }

    /// Name shown on the track for contestant `index`.
    pub fn display_name(&self, index: usize) -> String {
        let input = self.names.get(index).map(String::as_str).unwrap_or("");
        self.themes.display_name(self.theme, input, index)
    }

    /// Theme name suggested in an empty name input.
    pub fn placeholder(&self, index: usize) -> String {
        self.themes.fallback_name(self.theme, index)
    }

    fn display_names(&self) -> Vec<String> {
        (0..self.count()).map(|i| self.display_name(i)).collect()
    }

    // ── configuration ───────────────────────────────────────────────────────

    /// Apply the count field. Any race in progress is discarded and the
    /// lineup starts over with blank names. Returns the clamped count.
    pub fn set_count(&mut self, input: &str) -> usize {
        let count = parse_contestant_count(input);
        self.names = vec![String::new(); count];
        self.clear_race();
        debug!("Contestant count set to {}", count);
        count
    }

    pub fn edit_name(&mut self, index: usize, value: String) {
        if self.is_locked() {
            return;
        }
        if let Some(name) = self.names.get_mut(index) {
            *name = value;
            self.refresh_lineup();
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.is_locked() {
            return;
        }
        self.theme = theme;
        self.refresh_lineup();
    }

    /// Write the theme's fallback names into every name input.
    pub fn quick_fill(&mut self) {
        if self.is_locked() {
            return;
        }
        self.names = self.themes.quick_fill(self.theme, self.count());
        self.refresh_lineup();
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Back to an empty form. History survives.
    pub fn reset(&mut self) {
        self.names.clear();
        self.clear_race();
        info!("Race reset");
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.new_record = false;
    }

    // ── race lifecycle ──────────────────────────────────────────────────────

    /// Start the 3-2-1 lead-in. Returns `false` if a race can't start now.
    pub fn begin_countdown(&mut self) -> bool {
        if !self.can_start() {
            warn!("Start ignored: {} contestants, {:?}", self.count(), self.status());
            return false;
        }
        let countdown = Countdown::begin();
        debug!("Countdown {}", countdown.remaining());
        self.countdown = Some(countdown);
        self.race.status = RaceStatus::Countdown;
        true
    }

    /// One second of countdown. On `Go` the race is started.
    pub fn countdown_tick<C: Clock, R: Rng + ?Sized>(
        &mut self,
        clock: &C,
        rng: &mut R,
    ) -> Option<CountdownStep> {
        let step = self.countdown.as_mut()?.tick();
        match step {
            CountdownStep::Show(n) => debug!("Countdown {}", n),
            CountdownStep::Go => {
                self.countdown = None;
                if let Err(e) = self.start_race(clock, rng) {
                    warn!("Could not start race: {}", e);
                    self.race.status = RaceStatus::Idle;
                }
            }
        }
        Some(step)
    }

    pub fn start_race<C: Clock, R: Rng + ?Sized>(
        &mut self,
        clock: &C,
        rng: &mut R,
    ) -> Result<(), RaceError> {
        let simulator = RaceSimulator::start(self.display_names(), clock.now_ms(), rng)?;
        self.race = simulator.state().clone();
        self.simulator = Some(simulator);
        self.countdown = None;
        self.last_result = None;
        self.new_record = false;
        self.commentary = OPENING_PHRASE.to_string();
        Ok(())
    }

    /// One animation frame. `None` when no race is running, which tells the
    /// frame loop to stop.
    pub fn advance_frame<C: Clock, R: Rng + ?Sized>(
        &mut self,
        clock: &C,
        rng: &mut R,
    ) -> Option<FrameOutcome> {
        let simulator = self.simulator.as_mut()?;
        if simulator.is_finished() {
            return None;
        }

        let outcome = simulator.advance(clock.now_ms(), rng);
        self.race = simulator.state().clone();

        if let FrameOutcome::Finished(result) = &outcome {
            self.commentary = commentary::winner_announcement(&result.winner_name);
            self.new_record = self.history.append(HistoryEntry {
                winner_name: result.winner_name.clone(),
                finish_time_seconds: result.finish_time_seconds,
                timestamp: clock.timestamp(),
            });
            self.last_result = Some(result.clone());
        }
        Some(outcome)
    }

    /// Pick a new phrase. Only does anything while racing.
    pub fn commentary_tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&str> {
        let phrase = commentary::next_phrase(self.is_racing(), rng)?;
        self.commentary = phrase.to_string();
        Some(&self.commentary)
    }

    /// Refresh the race clock. Returns the elapsed seconds while racing.
    pub fn clock_tick<C: Clock>(&mut self, clock: &C) -> Option<f64> {
        if !self.is_racing() {
            return None;
        }
        let simulator = self.simulator.as_mut()?;
        simulator.tick_clock(clock.now_ms());
        self.race.elapsed = simulator.state().elapsed;
        Some(self.race.elapsed)
    }

    fn clear_race(&mut self) {
        self.simulator = None;
        self.countdown = None;
        self.commentary.clear();
        self.last_result = None;
        self.new_record = false;
        self.race = RaceState::idle(self.display_names());
    }

    fn refresh_lineup(&mut self) {
        let names = self.display_names();
        for (contestant, name) in self.race.contestants.iter_mut().zip(names) {
            contestant.display_name = name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;

    /// Advances 16 ms every time it is read.
    struct FakeClock {
        now: Cell<f64>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self { now: Cell::new(0.0) }
        }
    }

    impl Clock for FakeClock {
        fn now_ms(&self) -> f64 {
            let now = self.now.get() + 16.0;
            self.now.set(now);
            now
        }

        fn timestamp(&self) -> String {
            "10:00:00".to_string()
        }
    }

    fn session() -> RaceSession {
        RaceSession::new(ThemeBook::builtin().unwrap())
    }

    fn run_to_finish(s: &mut RaceSession, clock: &FakeClock, rng: &mut StdRng) -> RaceResult {
        loop {
            match s.advance_frame(clock, rng) {
                Some(FrameOutcome::Finished(result)) => return result,
                Some(FrameOutcome::Continue) => {}
                None => panic!("frame loop stopped before a winner"),
            }
        }
    }

    fn start_via_countdown(s: &mut RaceSession, clock: &FakeClock, rng: &mut StdRng) {
        assert!(s.begin_countdown());
        assert_eq!(s.countdown(), Some(3));
        assert_eq!(s.countdown_tick(clock, rng), Some(CountdownStep::Show(2)));
        assert_eq!(s.countdown_tick(clock, rng), Some(CountdownStep::Show(1)));
        assert_eq!(s.countdown_tick(clock, rng), Some(CountdownStep::Go));
        assert_eq!(s.status(), RaceStatus::Running);
    }

    #[test]
    fn test_blank_names_fall_back_to_theme() {
        let mut s = session();
        assert_eq!(s.set_count("3"), 3);
        let expected = vec!["Lightning Bolt", "Thunder Strike", "Midnight Runner"];
        let shown: Vec<String> = (0..3).map(|i| s.display_name(i)).collect();
        assert_eq!(shown, expected);

        s.quick_fill();
        assert_eq!(s.names(), expected.as_slice());
    }

    #[test]
    fn test_count_input_is_clamped() {
        let mut s = session();
        assert_eq!(s.set_count("50"), 20);
        assert_eq!(s.race().contestants.len(), 20);
        assert_eq!(s.set_count("nope"), 0);
        assert!(!s.can_start());
        assert!(!s.begin_countdown());
    }

    #[test]
    fn test_full_race_records_history() {
        let mut s = session();
        let clock = FakeClock::new();
        let mut rng = StdRng::seed_from_u64(11);
        s.set_count("4");
        s.edit_name(2, "Custom".to_string());

        start_via_countdown(&mut s, &clock, &mut rng);
        assert_eq!(s.commentary(), OPENING_PHRASE);
        assert!(s.is_locked());

        let result = run_to_finish(&mut s, &clock, &mut rng);
        assert_eq!(s.status(), RaceStatus::Finished);
        assert_eq!(s.race().winner, Some(result.winner_index));
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history().record(), Some(result.finish_time_seconds));
        assert!(s.is_new_record());
        assert_eq!(s.commentary(), format!("🏆 {} wins!", result.winner_name));
        assert_eq!(s.display_name(2), "Custom");

        // The loop must stop once a winner is in.
        assert_eq!(s.advance_frame(&clock, &mut rng), None);
        assert!(s.can_start());
    }

    #[test]
    fn test_reset_mid_race_stops_all_updates() {
        let mut s = session();
        let clock = FakeClock::new();
        let mut rng = StdRng::seed_from_u64(5);
        s.set_count("5");
        start_via_countdown(&mut s, &clock, &mut rng);
        for _ in 0..10 {
            s.advance_frame(&clock, &mut rng);
        }

        s.reset();
        let snapshot = s.race().clone();
        assert_eq!(s.advance_frame(&clock, &mut rng), None);
        assert_eq!(s.commentary_tick(&mut rng), None);
        assert_eq!(s.clock_tick(&clock), None);
        assert_eq!(s.countdown_tick(&clock, &mut rng), None);
        assert_eq!(s.race(), &snapshot);
        assert_eq!(s.commentary(), "");
        assert_eq!(s.count(), 0);
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_reset_during_countdown_cancels_start() {
        let mut s = session();
        let clock = FakeClock::new();
        let mut rng = StdRng::seed_from_u64(5);
        s.set_count("2");
        assert!(s.begin_countdown());
        s.set_count("2");
        assert_eq!(s.countdown(), None);
        assert_eq!(s.countdown_tick(&clock, &mut rng), None);
        assert_eq!(s.status(), RaceStatus::Idle);
    }

    #[test]
    fn test_inputs_locked_while_racing() {
        let mut s = session();
        let clock = FakeClock::new();
        let mut rng = StdRng::seed_from_u64(8);
        s.set_count("2");
        start_via_countdown(&mut s, &clock, &mut rng);

        s.edit_name(0, "Late".to_string());
        s.set_theme(Theme::Films);
        assert_eq!(s.names()[0], "");
        assert_eq!(s.theme(), Theme::Default);
        assert!(!s.begin_countdown());
    }

    #[test]
    fn test_commentary_changes_only_while_racing() {
        let mut s = session();
        let clock = FakeClock::new();
        let mut rng = StdRng::seed_from_u64(2);
        s.set_count("3");
        assert_eq!(s.commentary_tick(&mut rng), None);

        start_via_countdown(&mut s, &clock, &mut rng);
        let phrase = s.commentary_tick(&mut rng).map(str::to_string);
        assert!(phrase.is_some());
        assert_eq!(s.commentary(), phrase.unwrap());

        run_to_finish(&mut s, &clock, &mut rng);
        let announcement = s.commentary().to_string();
        assert_eq!(s.commentary_tick(&mut rng), None);
        assert_eq!(s.commentary(), announcement);
    }

    #[test]
    fn test_clock_tick_reports_elapsed() {
        let mut s = session();
        let clock = FakeClock::new();
        let mut rng = StdRng::seed_from_u64(2);
        s.set_count("3");
        start_via_countdown(&mut s, &clock, &mut rng);

        let first = s.clock_tick(&clock).unwrap();
        let second = s.clock_tick(&clock).unwrap();
        assert!(second > first);
        assert_eq!(s.race().elapsed, second);
    }

    #[test]
    fn test_race_again_keeps_history_and_record() {
        let mut s = session();
        let clock = FakeClock::new();
        let mut rng = StdRng::seed_from_u64(21);
        s.set_count("6");

        for _ in 0..3 {
            start_via_countdown(&mut s, &clock, &mut rng);
            run_to_finish(&mut s, &clock, &mut rng);
        }
        assert_eq!(s.history().len(), 3);
        let best = s
            .history()
            .iter()
            .map(|e| e.finish_time_seconds)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(s.history().record(), Some(best));

        s.clear_history();
        assert!(s.history().is_empty());
        assert_eq!(s.history().record(), None);
        assert!(!s.is_new_record());
    }

    #[test]
    fn test_theme_switch_renames_idle_lineup() {
        let mut s = session();
        s.set_count("2");
        s.set_theme(Theme::Takeaways);
        assert_eq!(s.race().contestants[0].display_name, s.placeholder(0));
        assert_eq!(s.placeholder(0), "Fish & Chips");
    }
}

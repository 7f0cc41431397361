use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use regex::Regex;
use std::fmt;

pub mod commentary;
pub mod countdown;
pub mod history;
pub mod session;
pub mod themes;

/// Simulation parameters shared by the library and the UI.
pub mod defaults {
    /// Base speed range, in position units per frame.
    pub const MIN_BASE_SPEED: f64 = 0.002;
    pub const MAX_BASE_SPEED: f64 = 0.005;
    /// Per-frame random surge added on top of the base speed.
    pub const MIN_SURGE: f64 = -0.003;
    pub const MAX_SURGE: f64 = 0.005;

    pub const FINISH_LINE: f64 = 1.0;
    pub const MAX_CONTESTANTS: usize = 20;
    pub const HISTORY_CAPACITY: usize = 10;
    pub const COUNTDOWN_START: u8 = 3;
}

// Matches what a browser's integer parse accepts: optional sign, then digits.
static COUNT_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum RaceError {
    NoContestants,
    TooManyContestants { requested: usize, max: usize },
    /// The embedded theme table could not be parsed.
    ThemeData(String),
    /// A speed or surge range was rejected by the sampler.
    Distribution(String),
}

impl fmt::Display for RaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceError::NoContestants => write!(f, "A race needs at least one contestant"),
            RaceError::TooManyContestants { requested, max } => write!(
                f,
                "Too many contestants: requested {}, but at most {} can race",
                requested, max
            ),
            RaceError::ThemeData(msg) => write!(f, "Invalid theme data: {}", msg),
            RaceError::Distribution(msg) => write!(f, "Invalid speed range: {}", msg),
        }
    }
}

impl std::error::Error for RaceError {}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Contestant {
    pub index: usize,
    pub display_name: String,
    pub position: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaceStatus {
    #[default]
    Idle,
    Countdown,
    Running,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RaceState {
    pub contestants: Vec<Contestant>,
    pub start_time_ms: f64,
    /// Seconds since the start, refreshed by the clock and frozen at the finish.
    pub elapsed: f64,
    pub status: RaceStatus,
    pub winner: Option<usize>,
}

impl RaceState {
    /// An idle state with every contestant parked at the start line.
    pub fn idle(names: Vec<String>) -> Self {
        let contestants = names
            .into_iter()
            .enumerate()
            .map(|(index, display_name)| Contestant {
                index,
                display_name,
                position: 0.0,
            })
            .collect();
        Self {
            contestants,
            ..Self::default()
        }
    }

    pub fn positions(&self) -> Vec<f64> {
        self.contestants.iter().map(|c| c.position).collect()
    }

    /// Furthest position reached by any contestant, 0 for an empty field.
    pub fn leader_position(&self) -> f64 {
        self.contestants
            .iter()
            .map(|c| c.position)
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    pub winner_index: usize,
    pub winner_name: String,
    pub finish_time_seconds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Continue,
    Finished(RaceResult),
}

/// One item of the headless frame stream produced by [`RaceSimulator::frames`].
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Snapshot(Vec<f64>),
    Finished { winner: usize },
}

/// Advances contestant positions one frame at a time until someone crosses
/// the finish line.
#[derive(Debug, Clone)]
pub struct RaceSimulator {
    state: RaceState,
    speeds: Vec<f64>,
    surge: Uniform<f64>,
    result: Option<RaceResult>,
}

impl RaceSimulator {
    /// Line up `names.len()` contestants and assign each a base speed.
    pub fn start<R: Rng + ?Sized>(
        names: Vec<String>,
        now_ms: f64,
        rng: &mut R,
    ) -> Result<Self, RaceError> {
        if names.is_empty() {
            return Err(RaceError::NoContestants);
        }
        if names.len() > defaults::MAX_CONTESTANTS {
            return Err(RaceError::TooManyContestants {
                requested: names.len(),
                max: defaults::MAX_CONTESTANTS,
            });
        }

        let speed = Uniform::new(defaults::MIN_BASE_SPEED, defaults::MAX_BASE_SPEED)
            .map_err(|e| RaceError::Distribution(e.to_string()))?;
        let surge = Uniform::new(defaults::MIN_SURGE, defaults::MAX_SURGE)
            .map_err(|e| RaceError::Distribution(e.to_string()))?;

        let mut state = RaceState::idle(names);
        let speeds = state.contestants.iter().map(|_| speed.sample(&mut *rng)).collect();
        state.start_time_ms = now_ms;
        state.status = RaceStatus::Running;

        info!("Race started with {} contestants", state.contestants.len());

        Ok(Self {
            state,
            speeds,
            surge,
            result: None,
        })
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn result(&self) -> Option<&RaceResult> {
        self.result.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    /// Seconds elapsed since the start; frozen once the race is won.
    pub fn elapsed_seconds(&self, now_ms: f64) -> f64 {
        match &self.result {
            Some(result) => result.finish_time_seconds,
            None => ((now_ms - self.state.start_time_ms) / 1000.0).max(0.0),
        }
    }

    /// Refresh the displayed elapsed time without moving anyone.
    pub fn tick_clock(&mut self, now_ms: f64) {
        self.state.elapsed = self.elapsed_seconds(now_ms);
    }

    /// Run one frame: move every runner, then look for a winner.
    pub fn advance<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> FrameOutcome {
        if let Some(result) = &self.result {
            return FrameOutcome::Finished(result.clone());
        }

        for (contestant, speed) in self.state.contestants.iter_mut().zip(&self.speeds) {
            if contestant.position >= defaults::FINISH_LINE {
                continue;
            }
            let delta = (speed + self.surge.sample(rng)).max(0.0);
            contestant.position = (contestant.position + delta).clamp(0.0, defaults::FINISH_LINE);
        }

        let Some(winner) = find_winner(&self.state.contestants) else {
            self.tick_clock(now_ms);
            return FrameOutcome::Continue;
        };

        let finish_time_seconds = round_to_tenth((now_ms - self.state.start_time_ms) / 1000.0);
        let result = RaceResult {
            winner_index: winner,
            winner_name: self.state.contestants[winner].display_name.clone(),
            finish_time_seconds,
        };
        self.state.status = RaceStatus::Finished;
        self.state.winner = Some(winner);
        self.state.elapsed = finish_time_seconds;
        self.result = Some(result.clone());

        info!(
            "{} (#{}) won in {:.1}s",
            result.winner_name,
            winner + 1,
            finish_time_seconds
        );
        FrameOutcome::Finished(result)
    }

    /// Drive the race headlessly, one snapshot per frame, ending with the winner.
    pub fn frames<R: Rng>(self, rng: R) -> RaceFrames<R> {
        RaceFrames {
            simulator: self,
            rng,
            frame: 0,
            done: false,
        }
    }

    pub fn into_state(self) -> RaceState {
        self.state
    }
}

/// Iterator over a race where each frame is one tick of a fixed 60 Hz clock.
pub struct RaceFrames<R> {
    simulator: RaceSimulator,
    rng: R,
    frame: u64,
    done: bool,
}

const FRAME_MS: f64 = 1000.0 / 60.0;

impl<R: Rng> Iterator for RaceFrames<R> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.done {
            return None;
        }
        if let Some(result) = self.simulator.result() {
            self.done = true;
            return Some(Frame::Finished {
                winner: result.winner_index,
            });
        }

        self.frame += 1;
        let now = self.simulator.state.start_time_ms + self.frame as f64 * FRAME_MS;
        // The finishing frame's snapshot is yielded before the `Finished` item.
        self.simulator.advance(now, &mut self.rng);
        Some(Frame::Snapshot(self.simulator.state.positions()))
    }
}

/// First contestant, in index order, sitting on the finish line.
pub fn find_winner(contestants: &[Contestant]) -> Option<usize> {
    contestants
        .iter()
        .position(|c| c.position >= defaults::FINISH_LINE)
}

pub fn round_to_tenth(seconds: f64) -> f64 {
    (seconds * 10.0).round() / 10.0
}

/// Format seconds the way the race clock and history show them ("12.3s").
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.1}s", seconds)
}

/// Parse the contestant count field.
///
/// Anything that does not start with an integer becomes 0 and the result is
/// clamped to `0..=MAX_CONTESTANTS`, so this never fails.
pub fn parse_contestant_count(input: &str) -> usize {
    let Some(captures) = COUNT_PREFIX_REGEX.captures(input) else {
        debug!("Count input {:?} is not a number, using 0", input);
        return 0;
    };

    match captures[1].parse::<i64>() {
        Ok(n) if n <= 0 => 0,
        Ok(n) => (n as u64).min(defaults::MAX_CONTESTANTS as u64) as usize,
        // Only overflow gets here: too many digits for i64.
        Err(_) if captures[1].starts_with('-') => 0,
        Err(e) => {
            warn!("Count input {:?} overflowed ({}), capping", input, e);
            defaults::MAX_CONTESTANTS
        }
    }
}

//! Application-level configuration constants.

// Timers
pub const COMMENTARY_INTERVAL_MS: u32 = 1_500;
pub const CLOCK_INTERVAL_MS: u32 = 100;
pub const COUNTDOWN_TICK_MS: u32 = 1_000;
pub const CONFETTI_BURSTS: u32 = 3;
pub const CONFETTI_SPACING_MS: u32 = 300;

// Track layout
pub const TRACK_LENGTH_PX: f64 = 1200.0;
/// Runners stop at this share of the lane so the label stays inside it.
pub const RUNNER_MAX_OFFSET_PCT: f64 = 82.0;

// DOM hooks
pub const RUN_SOUND_ID: &str = "run-sound";
pub const RUN_SOUND_SRC: &str = "run.mp3";
pub const TRACK_CONTAINER_ID: &str = "track-container";
pub const TRACK_BACKGROUND: &str = "racetrack1.jpg";

pub const AVATARS: [&str; 10] = ["🐎", "🦄", "🐫", "🐘", "🐢", "🐕", "🐇", "🐖", "🦓", "🦌"];

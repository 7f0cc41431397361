//! Race-caller phrases. Purely decorative: nothing here reads positions.

use rand::seq::IndexedRandom;
use rand::Rng;

pub const OPENING_PHRASE: &str = "And they're off!";

pub const PHRASES: [&str; 14] = [
    OPENING_PHRASE,
    "Neck and neck!",
    "Pushing ahead!",
    "What a surge!",
    "It's too close to call!",
    "A stunning pace!",
    "They're flying down the track!",
    "Incredible speed!",
    "Look at that acceleration!",
    "The crowd is going wild!",
    "What an amazing race!",
    "Coming down to the wire!",
    "Photo finish incoming!",
    "The tension is palpable!",
];

/// A phrase for the next commentary tick, or `None` once the race is over.
pub fn next_phrase<R: Rng + ?Sized>(running: bool, rng: &mut R) -> Option<&'static str> {
    if !running {
        return None;
    }
    PHRASES.choose(rng).copied()
}

pub fn winner_announcement(winner_name: &str) -> String {
    format!("🏆 {} wins!", winner_name)
}

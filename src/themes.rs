//! Themed fallback names for contestants left blank.
//!
//! The name lists live in `themes.csv` (`theme,name` rows) and are embedded
//! at compile time, the same way any other static table ships with the app.

use crate::RaceError;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

const BUILTIN_THEMES_CSV: &str = include_str!("themes.csv");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Default,
    Takeaways,
    Films,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Default, Theme::Takeaways, Theme::Films];

    pub fn label(self) -> &'static str {
        match self {
            Theme::Default => "Default",
            Theme::Takeaways => "Takeaways",
            Theme::Films => "Films",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.label() == s.trim())
            .ok_or_else(|| format!("Unknown theme '{}'", s))
    }
}

#[derive(Debug, Deserialize)]
struct ThemeRow {
    theme: String,
    name: String,
}

/// Name lists per theme.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThemeBook {
    lists: HashMap<Theme, Vec<String>>,
}

impl ThemeBook {
    /// The lists compiled into the binary, in file order.
    pub fn builtin() -> Result<Self, RaceError> {
        Self::from_csv_str(BUILTIN_THEMES_CSV)
    }

    /// Parse `theme,name` rows with a header line. Rows naming an unknown
    /// theme or with an empty name are skipped.
    pub fn from_csv_str(csv_content: &str) -> Result<Self, RaceError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv_content.as_bytes());
        let mut lists: HashMap<Theme, Vec<String>> = HashMap::new();

        for (i, record) in reader.deserialize::<ThemeRow>().enumerate() {
            let row = record.map_err(|e| RaceError::ThemeData(e.to_string()))?;
            let theme = match row.theme.parse::<Theme>() {
                Ok(theme) => theme,
                Err(e) => {
                    warn!("{} on row {}, skipping", e, i + 1);
                    continue;
                }
            };
            if row.name.is_empty() {
                debug!("Empty name on row {}, skipping", i + 1);
                continue;
            }
            lists.entry(theme).or_default().push(row.name);
        }

        if !lists.contains_key(&Theme::Default) {
            return Err(RaceError::ThemeData(
                "no names for the Default theme".to_string(),
            ));
        }

        info!(
            "Loaded {} themes ({} names)",
            lists.len(),
            lists.values().map(Vec::len).sum::<usize>()
        );
        Ok(Self { lists })
    }

    /// A copy with every list shuffled independently.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut lists = self.lists.clone();
        for names in lists.values_mut() {
            names.shuffle(rng);
        }
        Self { lists }
    }

    /// Names for `theme`, or the Default list when the theme has none.
    pub fn names(&self, theme: Theme) -> &[String] {
        self.lists
            .get(&theme)
            .filter(|names| !names.is_empty())
            .or_else(|| self.lists.get(&Theme::Default))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Fallback name for the contestant at `index`, cycling through the list.
    pub fn fallback_name(&self, theme: Theme, index: usize) -> String {
        let names = self.names(theme);
        if names.is_empty() {
            return format!("Contestant {}", index + 1);
        }
        names[index % names.len()].clone()
    }

    /// What a contestant is called on the track: the typed name, or the
    /// theme's fallback when the input is blank.
    pub fn display_name(&self, theme: Theme, input: &str, index: usize) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            self.fallback_name(theme, index)
        } else {
            trimmed.to_string()
        }
    }

    /// Fallback names for the first `count` contestants.
    pub fn quick_fill(&self, theme: Theme, count: usize) -> Vec<String> {
        (0..count).map(|i| self.fallback_name(theme, i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_themes_have_twenty_names_each() {
        let book = ThemeBook::builtin().unwrap();
        for theme in Theme::ALL {
            assert_eq!(book.names(theme).len(), 20, "theme {}", theme);
        }
        assert_eq!(book.names(Theme::Default)[0], "Lightning Bolt");
        assert_eq!(book.names(Theme::Takeaways)[0], "Fish & Chips");
    }

    #[test]
    fn test_display_name_falls_back_by_index() {
        let book = ThemeBook::builtin().unwrap();
        let names: Vec<String> = (0..3)
            .map(|i| book.display_name(Theme::Default, "   ", i))
            .collect();
        assert_eq!(names, vec!["Lightning Bolt", "Thunder Strike", "Midnight Runner"]);
        assert_eq!(book.quick_fill(Theme::Default, 3), names);
    }

    #[test]
    fn test_display_name_prefers_trimmed_input() {
        let book = ThemeBook::builtin().unwrap();
        assert_eq!(book.display_name(Theme::Films, "  Alice ", 0), "Alice");
    }

    #[test]
    fn test_fallback_wraps_around_list() {
        let book = ThemeBook::builtin().unwrap();
        assert_eq!(
            book.fallback_name(Theme::Films, 21),
            book.fallback_name(Theme::Films, 1)
        );
    }

    #[test]
    fn test_missing_theme_uses_default_list() {
        let book = ThemeBook::from_csv_str("theme,name\nDefault,Alpha\nDefault,Beta\n").unwrap();
        assert_eq!(book.fallback_name(Theme::Films, 1), "Beta");
    }

    #[test]
    fn test_unknown_theme_rows_are_skipped() {
        let book =
            ThemeBook::from_csv_str("theme,name\nDefault,Alpha\nCheeses,Brie\nFilms,Up\n").unwrap();
        assert_eq!(book.names(Theme::Default), ["Alpha".to_string()]);
        assert_eq!(book.names(Theme::Films), ["Up".to_string()]);
    }

    #[test]
    fn test_table_without_default_is_rejected() {
        let err = ThemeBook::from_csv_str("theme,name\nFilms,Up\n").unwrap_err();
        assert!(matches!(err, RaceError::ThemeData(_)));
    }

    #[test]
    fn test_shuffle_keeps_the_same_names() {
        let book = ThemeBook::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let shuffled = book.shuffled(&mut rng);
        for theme in Theme::ALL {
            let mut a = book.names(theme).to_vec();
            let mut b = shuffled.names(theme).to_vec();
            a.sort();
            b.sort();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_theme_round_trips_through_label() {
        for theme in Theme::ALL {
            assert_eq!(theme.label().parse::<Theme>(), Ok(theme));
        }
        assert!("Cheeses".parse::<Theme>().is_err());
    }
}

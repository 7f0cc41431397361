//! Thread-local cache of the shuffled theme lists.
//!
//! Each theme list is shuffled once per page load so the fallback names
//! differ between visits but stay put while the user edits the form.

use horse_race_picker::themes::ThemeBook;
use log::warn;
use std::cell::RefCell;

thread_local! {
    pub static THEME_STORE: RefCell<Option<ThemeBook>> = const { RefCell::new(None) };
}

/// The shuffled theme book, built on first use.
pub fn shuffled_themes() -> ThemeBook {
    THEME_STORE.with(|store| {
        store
            .borrow_mut()
            .get_or_insert_with(|| match ThemeBook::builtin() {
                Ok(book) => book.shuffled(&mut rand::rng()),
                Err(e) => {
                    warn!("{}; contestants will use numbered names", e);
                    ThemeBook::default()
                }
            })
            .clone()
    })
}

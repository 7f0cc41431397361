//! Looping gallop sound played while a race runs.
//!
//! Playback is best effort: a missing element or a rejected `play()` (e.g.
//! autoplay policy) is logged and otherwise ignored.

use crate::config::RUN_SOUND_ID;
use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlAudioElement;

fn run_sound() -> Option<HtmlAudioElement> {
    gloo_utils::document()
        .get_element_by_id(RUN_SOUND_ID)
        .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok())
}

/// Start the sound from the beginning when `playing`, otherwise stop it.
pub fn set_run_sound(playing: bool) {
    let Some(audio) = run_sound() else {
        debug!("No #{} element, skipping sound", RUN_SOUND_ID);
        return;
    };

    audio.set_current_time(0.0);
    if !playing {
        if let Err(e) = audio.pause() {
            debug!("Pausing run sound failed: {:?}", e);
        }
        return;
    }

    match audio.play() {
        Ok(promise) => spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                debug!("Run sound rejected: {:?}", e);
            }
        }),
        Err(e) => debug!("Run sound unavailable: {:?}", e),
    }
}

use crate::config::{AVATARS, RUNNER_MAX_OFFSET_PCT, TRACK_LENGTH_PX};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Avatar for lane `index`, cycling through the fixed set.
pub fn avatar_for(index: usize) -> &'static str {
    AVATARS[index % AVATARS.len()]
}

/// Width of the progress trail, as a CSS percentage.
pub fn trail_width(position: f64) -> String {
    format!("{:.2}%", position.clamp(0.0, 1.0) * 100.0)
}

/// Horizontal offset of the runner inside its lane.
pub fn runner_offset(position: f64) -> String {
    let pct = (position.max(0.0) * RUNNER_MAX_OFFSET_PCT).min(RUNNER_MAX_OFFSET_PCT);
    format!("translateX({:.2}%)", pct)
}

/// Scroll offset that keeps the leader in view in a viewport `viewport_px` wide.
pub fn follow_scroll_left(leader_position: f64, viewport_px: f64) -> i32 {
    let travel = (TRACK_LENGTH_PX - viewport_px).max(0.0);
    (leader_position.clamp(0.0, 1.0) * travel).round() as i32
}

/// Resolves on the next display refresh.
pub async fn next_animation_frame() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let mut request_error = None;
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Err(e) = window.request_animation_frame(&resolve) {
            request_error = Some(e);
        }
    });
    if let Some(e) = request_error {
        return Err(e);
    }
    JsFuture::from(promise).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_cycles() {
        assert_eq!(avatar_for(0), "🐎");
        assert_eq!(avatar_for(10), "🐎");
        assert_eq!(avatar_for(13), "🐘");
    }

    #[test]
    fn test_runner_offset_is_capped() {
        assert_eq!(runner_offset(0.5), "translateX(41.00%)");
        assert_eq!(runner_offset(1.0), "translateX(82.00%)");
    }

    #[test]
    fn test_follow_scroll_tracks_leader() {
        assert_eq!(follow_scroll_left(0.0, 400.0), 0);
        assert_eq!(follow_scroll_left(0.5, 400.0), 400);
        assert_eq!(follow_scroll_left(1.0, 400.0), 800);
        // A viewport wider than the track never scrolls.
        assert_eq!(follow_scroll_left(1.0, 1600.0), 0);
    }
}

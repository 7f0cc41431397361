//! Main module for the Horse Race Picker application using Yew.
//! Wires UI components to the race session hook.

use yew::prelude::*;

mod audio;
mod cache;
mod components;
mod config;
mod hooks;
mod utils;

use components::{
    render_controls, render_history, render_lineup_form, render_track, CountInput, Header,
    RaceClock,
};
use config::{RUN_SOUND_ID, RUN_SOUND_SRC};
use hooks::use_race_session;

/// Primary application component: form, track and history.
#[function_component(App)]
fn app() -> Html {
    let controller = use_race_session();
    let session = controller.session.borrow();
    let has_lineup = session.count() > 0;

    html! {
        <div class="app">
            <audio id={RUN_SOUND_ID} src={RUN_SOUND_SRC} loop={true} class="hidden" />
            <div class="card">
                <Header
                    record={session.history().record()}
                    muted={session.muted()}
                    on_toggle_mute={controller.on_toggle_mute.clone()}
                />

                <div class="form-row">
                    <CountInput
                        count={session.count()}
                        locked={session.is_locked()}
                        on_input={controller.on_count_input.clone()}
                        on_quick_fill={controller.on_quick_fill.clone()}
                    />
                    if session.is_racing() {
                        <RaceClock elapsed={session.race().elapsed} />
                    }
                </div>

                if has_lineup {
                    { render_lineup_form(&session, &controller.on_name_input, &controller.on_theme_change) }
                    { render_controls(&session, &controller.on_start, &controller.on_reset) }
                    { render_track(&session, &controller.on_start) }
                }

                { render_history(session.history(), &controller.on_clear_history) }
            </div>
        </div>
    }
}

/// Entry point: installs the panic hook and mounts the app.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}

//! Yew view components for the Horse Race Picker UI.
//!
//! Everything here renders from borrowed session data or props and reports
//! user intent through callbacks; none of it mutates race state directly.

use crate::config::{TRACK_BACKGROUND, TRACK_CONTAINER_ID, TRACK_LENGTH_PX};
use crate::utils::{avatar_for, runner_offset, trail_width};
use horse_race_picker::defaults::MAX_CONTESTANTS;
use horse_race_picker::format_seconds;
use horse_race_picker::history::HistoryLog;
use horse_race_picker::session::RaceSession;
use horse_race_picker::themes::Theme;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

/// Title bar with the record badge and the mute toggle.
#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub record: Option<f64>,
    pub muted: bool,
    pub on_toggle_mute: Callback<()>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    html! {
        <div class="header">
            <div class="title">
                <span class="title-icon">{ "🏇" }</span>
                <h1>{ "Horse Race Picker" }</h1>
            </div>
            <div class="header-actions">
                if let Some(record) = props.record {
                    <div class="record-badge">{ format!("🏆 Record: {}", format_seconds(record)) }</div>
                }
                <button class="mute-toggle" onclick={props.on_toggle_mute.reform(|_| ())}>
                    { if props.muted { "🔇" } else { "🔊" } }
                </button>
            </div>
        </div>
    }
}

/// Count field plus the quick-fill dice button.
#[derive(Properties, PartialEq)]
pub struct CountInputProps {
    pub count: usize,
    pub locked: bool,
    pub on_input: Callback<String>,
    pub on_quick_fill: Callback<()>,
}

#[function_component(CountInput)]
pub fn count_input(props: &CountInputProps) -> Html {
    let oninput = props.on_input.reform(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        input.value()
    });
    let value = if props.count > 0 {
        props.count.to_string()
    } else {
        String::new()
    };

    html! {
        <div class="form-group">
            <label for="count_input">{ format!("Number of Contestants (1-{})", MAX_CONTESTANTS) }</label>
            <div class="count-row">
                <input
                    type="number"
                    id="count_input"
                    min="1"
                    max={MAX_CONTESTANTS.to_string()}
                    placeholder="Enter number..."
                    value={value}
                    oninput={oninput}
                    disabled={props.locked}
                />
                if props.count > 0 {
                    <button class="btn-quick-fill"
                        title="Fill with random horse names"
                        disabled={props.locked}
                        onclick={props.on_quick_fill.reform(|_| ())}
                    >
                        { "🎲" }
                    </button>
                }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct RaceClockProps {
    pub elapsed: f64,
}

#[function_component(RaceClock)]
pub fn race_clock(props: &RaceClockProps) -> Html {
    html! {
        <div class="race-clock">
            <div class="race-clock-value">{ format_seconds(props.elapsed) }</div>
            <div class="race-clock-label">{ "Race Time" }</div>
        </div>
    }
}

/// Theme picker and one name input per contestant.
pub fn render_lineup_form(
    session: &RaceSession,
    on_name_input: &Callback<(usize, String)>,
    on_theme_change: &Callback<Theme>,
) -> Html {
    let locked = session.is_locked();
    let onchange = on_theme_change.reform(|e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        select.value().parse::<Theme>().unwrap_or_default()
    });

    html! {
        <div class="lineup">
            <div class="form-group">
                <label for="theme_select">{ "Theme" }</label>
                <select id="theme_select" onchange={onchange} disabled={locked}>
                    { Theme::ALL.iter().map(|theme| html! {
                        <option value={theme.label()} selected={*theme == session.theme()}>
                            { theme.label() }
                        </option>
                    }).collect::<Html>() }
                </select>
            </div>
            <h3>{ "Contestants:" }</h3>
            <div class="name-inputs">
                { session.names().iter().enumerate().map(|(index, name)| {
                    let on_name_input = on_name_input.clone();
                    let oninput = Callback::from(move |e: InputEvent| {
                        let input: HtmlInputElement = e.target_unchecked_into();
                        on_name_input.emit((index, input.value()));
                    });
                    html! {
                        <div class="name-input" key={index}>
                            <span class="name-avatar">{ avatar_for(index) }</span>
                            <input
                                type="text"
                                value={name.clone()}
                                placeholder={format!("Or use: {}", session.placeholder(index))}
                                oninput={oninput}
                                disabled={locked}
                            />
                            <span class="name-lane">{ format!("#{}", index + 1) }</span>
                        </div>
                    }
                }).collect::<Html>() }
            </div>
        </div>
    }
}

/// Start and reset buttons; the start label follows the race phase.
pub fn render_controls(session: &RaceSession, on_start: &Callback<()>, on_reset: &Callback<()>) -> Html {
    let label = match session.countdown() {
        Some(n) => format!("🏁 Starting in {}...", n),
        None if session.is_racing() => "🏃 Racing...".to_string(),
        None => "🚀 Start Race!".to_string(),
    };
    let can_start = session.can_start();

    html! {
        <div class="controls">
            <button
                class={classes!("btn-start", (!can_start).then_some("disabled"))}
                disabled={!can_start}
                onclick={on_start.reform(|_| ())}
            >
                { label }
            </button>
            <button class="btn-reset" disabled={session.is_locked()} onclick={on_reset.reform(|_| ())}>
                { "🔄 Reset" }
            </button>
        </div>
    }
}

/// The scrolling track: one lane per contestant, commentary and the winner banner.
pub fn render_track(session: &RaceSession, on_race_again: &Callback<()>) -> Html {
    let race = session.race();
    let racing = session.is_racing();
    let track_style = format!(
        "width: {}px; background-image: url('{}');",
        TRACK_LENGTH_PX, TRACK_BACKGROUND
    );

    html! {
        <div class="track-scroll" id={TRACK_CONTAINER_ID}>
            <div class="track" style={track_style}>
                { race.contestants.iter().map(|c| {
                    let is_winner = race.winner == Some(c.index);
                    html! {
                        <div class="lane" key={c.index}>
                            <div class="lane-trail" style={format!("width: {};", trail_width(c.position))}></div>
                            <div class="lane-finish"></div>
                            <div
                                class={classes!("runner", is_winner.then_some("winner"), racing.then_some("galloping"))}
                                style={format!("transform: {};", runner_offset(c.position))}
                            >
                                <span class="runner-avatar">{ avatar_for(c.index) }</span>
                                <span class="runner-name">{ c.display_name.clone() }</span>
                            </div>
                            <div class="lane-number">{ format!("#{}", c.index + 1) }</div>
                        </div>
                    }
                }).collect::<Html>() }

                if racing || session.countdown().is_some() {
                    <div class="commentary">
                        <p>{ commentary_line(session) }</p>
                    </div>
                }

                if let Some(result) = session.last_result() {
                    <div class="winner-banner">
                        <div class="winner-trophy">{ "🏆" }</div>
                        <p class="winner-title">{ "WINNER!" }</p>
                        <p class="winner-name">{ result.winner_name.clone() }</p>
                        <p class="winner-time">{ format!("Finish Time: {}", format_seconds(result.finish_time_seconds)) }</p>
                        if session.is_new_record() {
                            <p class="winner-record">{ "🔥 NEW RECORD! 🔥" }</p>
                        }
                    </div>
                    if !session.is_locked() {
                        <div class="race-again">
                            <button class="btn-start" onclick={on_race_again.reform(|_| ())}>
                                { "🔁 Race Again" }
                            </button>
                        </div>
                    }
                }
            </div>
        </div>
    }
}

fn commentary_line(session: &RaceSession) -> String {
    match session.countdown() {
        Some(n) => format!("📢 Get ready... {}!", n),
        None => format!("📢 {}", session.commentary()),
    }
}

/// Recent winners, newest first.
pub fn render_history(history: &HistoryLog, on_clear: &Callback<()>) -> Html {
    if history.is_empty() {
        return html! {};
    }

    html! {
        <div class="history">
            <div class="history-header">
                <h3>{ "🏁 Race History" }</h3>
                <button class="btn-clear-history" onclick={on_clear.reform(|_| ())}>
                    { "Clear History" }
                </button>
            </div>
            <div class="history-list">
                { history.iter().map(|entry| html! {
                    <div class="history-row">
                        <span class="history-winner">{ entry.winner_name.clone() }</span>
                        <div class="history-meta">
                            <span class="history-time">{ format_seconds(entry.finish_time_seconds) }</span>
                            <span class="history-stamp">{ entry.timestamp.clone() }</span>
                        </div>
                    </div>
                }).collect::<Html>() }
            </div>
        </div>
    }
}

//! The race session hook: owns the session record and every scheduler handle
//! that can touch it.
//!
//! Three kinds of scheduled work run during a race: the countdown loop, the
//! frame loop (one iteration per display refresh), and two fixed-interval
//! timers for commentary and the race clock. All of them live in
//! [`RaceTasks`], and every exit path (finish, reset, reconfiguration,
//! unmount) goes through it, so nothing fires after the state it would mutate
//! has been discarded.

use crate::audio::set_run_sound;
use crate::cache::shuffled_themes;
use crate::config::{
    CLOCK_INTERVAL_MS, COMMENTARY_INTERVAL_MS, CONFETTI_BURSTS, CONFETTI_SPACING_MS,
    COUNTDOWN_TICK_MS, TRACK_CONTAINER_ID,
};
use crate::utils::{follow_scroll_left, next_animation_frame};
use futures::future::{AbortHandle, Abortable};
use gloo_timers::callback::{Interval, Timeout};
use gloo_timers::future::TimeoutFuture;
use horse_race_picker::countdown::CountdownStep;
use horse_race_picker::session::{RaceSession, SystemClock};
use horse_race_picker::themes::Theme;
use horse_race_picker::FrameOutcome;
use log::{debug, info, warn};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

type SharedSession = Rc<RefCell<RaceSession>>;
type SharedTasks = Rc<RefCell<RaceTasks>>;

/// Handles for everything scheduled on behalf of the current race.
#[derive(Default)]
pub struct RaceTasks {
    countdown: Option<AbortHandle>,
    frame_loop: Option<AbortHandle>,
    commentary: Option<Interval>,
    clock: Option<Interval>,
}

impl RaceTasks {
    /// Stop the interval timers. Dropping an `Interval` clears it.
    fn stop_timers(&mut self) {
        self.commentary.take();
        self.clock.take();
    }

    /// Cancel everything. Aborted loops are never polled again, even if
    /// their pending frame or timeout still fires.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
        if let Some(handle) = self.frame_loop.take() {
            handle.abort();
        }
        self.stop_timers();
    }
}

impl Drop for RaceTasks {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawn `fut` on the UI thread and return the handle that cancels it.
fn spawn_abortable(fut: impl Future<Output = ()> + 'static) -> AbortHandle {
    let (handle, registration) = AbortHandle::new_pair();
    spawn_local(async move {
        if Abortable::new(fut, registration).await.is_err() {
            debug!("Scheduled race task aborted");
        }
    });
    handle
}

/// Scroll the track so the leading runner stays on screen.
fn follow_leader(session: &SharedSession) {
    let Some(container) = gloo_utils::document().get_element_by_id(TRACK_CONTAINER_ID) else {
        return;
    };
    let leader = session.borrow().race().leader_position();
    container.set_scroll_left(follow_scroll_left(leader, container.client_width() as f64));
}

fn celebrate() {
    for burst in 0..CONFETTI_BURSTS {
        Timeout::new(burst * CONFETTI_SPACING_MS, || info!("🎉 Confetti burst!")).forget();
    }
}

fn spawn_countdown(session: SharedSession, tasks: SharedTasks, rerender: UseForceUpdateHandle) {
    let loop_session = session.clone();
    let loop_tasks = tasks.clone();
    let handle = spawn_abortable(async move {
        let mut rng = rand::rng();
        loop {
            TimeoutFuture::new(COUNTDOWN_TICK_MS).await;
            let step = loop_session
                .borrow_mut()
                .countdown_tick(&SystemClock, &mut rng);
            rerender.force_update();
            match step {
                Some(CountdownStep::Show(_)) => continue,
                Some(CountdownStep::Go) => {
                    if loop_session.borrow().is_racing() {
                        start_race_tasks(&loop_session, &loop_tasks, &rerender);
                    }
                    break;
                }
                None => break,
            }
        }
    });
    tasks.borrow_mut().countdown = Some(handle);
}

fn start_race_tasks(session: &SharedSession, tasks: &SharedTasks, rerender: &UseForceUpdateHandle) {
    let commentary = {
        let session = session.clone();
        let rerender = rerender.clone();
        Interval::new(COMMENTARY_INTERVAL_MS, move || {
            if session.borrow_mut().commentary_tick(&mut rand::rng()).is_some() {
                rerender.force_update();
            }
        })
    };

    let clock = {
        let session = session.clone();
        let rerender = rerender.clone();
        Interval::new(CLOCK_INTERVAL_MS, move || {
            if session.borrow_mut().clock_tick(&SystemClock).is_some() {
                rerender.force_update();
            }
        })
    };

    let frame_loop = {
        let session = session.clone();
        let tasks = tasks.clone();
        let rerender = rerender.clone();
        spawn_abortable(async move {
            let mut rng = rand::rng();
            loop {
                if let Err(e) = next_animation_frame().await {
                    warn!("Animation frame unavailable, stopping race loop: {:?}", e);
                    break;
                }
                let outcome = session.borrow_mut().advance_frame(&SystemClock, &mut rng);
                match outcome {
                    Some(FrameOutcome::Continue) => {
                        follow_leader(&session);
                        rerender.force_update();
                    }
                    Some(FrameOutcome::Finished(_)) => {
                        follow_leader(&session);
                        tasks.borrow_mut().stop_timers();
                        celebrate();
                        rerender.force_update();
                        break;
                    }
                    None => break,
                }
            }
        })
    };

    let mut tasks = tasks.borrow_mut();
    tasks.commentary = Some(commentary);
    tasks.clock = Some(clock);
    tasks.frame_loop = Some(frame_loop);
}

/// Session plus the callbacks the form, track and history bind to.
#[derive(Clone)]
pub struct RaceController {
    pub session: SharedSession,
    pub on_count_input: Callback<String>,
    pub on_name_input: Callback<(usize, String)>,
    pub on_theme_change: Callback<Theme>,
    pub on_quick_fill: Callback<()>,
    pub on_toggle_mute: Callback<()>,
    pub on_start: Callback<()>,
    pub on_reset: Callback<()>,
    pub on_clear_history: Callback<()>,
}

#[hook]
pub fn use_race_session() -> RaceController {
    let session: SharedSession = use_mut_ref(|| RaceSession::new(shuffled_themes()));
    let tasks: SharedTasks = use_mut_ref(RaceTasks::default);
    let rerender = use_force_update();

    // Cancel anything still scheduled when the component goes away.
    {
        let tasks = tasks.clone();
        use_effect_with((), move |_| {
            move || {
                tasks.borrow_mut().cancel();
            }
        });
    }

    // The gallop sound follows the racing and mute flags.
    {
        let (racing, muted) = {
            let s = session.borrow();
            (s.is_racing(), s.muted())
        };
        use_effect_with((racing, muted), move |&(racing, muted)| {
            set_run_sound(racing && !muted);
            || ()
        });
    }

    let on_count_input = {
        let session = session.clone();
        let tasks = tasks.clone();
        let rerender = rerender.clone();
        Callback::from(move |value: String| {
            tasks.borrow_mut().cancel();
            session.borrow_mut().set_count(&value);
            rerender.force_update();
        })
    };

    let on_name_input = {
        let session = session.clone();
        let rerender = rerender.clone();
        Callback::from(move |(index, value): (usize, String)| {
            session.borrow_mut().edit_name(index, value);
            rerender.force_update();
        })
    };

    let on_theme_change = {
        let session = session.clone();
        let rerender = rerender.clone();
        Callback::from(move |theme: Theme| {
            session.borrow_mut().set_theme(theme);
            rerender.force_update();
        })
    };

    let on_quick_fill = {
        let session = session.clone();
        let rerender = rerender.clone();
        Callback::from(move |_| {
            session.borrow_mut().quick_fill();
            rerender.force_update();
        })
    };

    let on_toggle_mute = {
        let session = session.clone();
        let rerender = rerender.clone();
        Callback::from(move |_| {
            let muted = session.borrow_mut().toggle_mute();
            debug!("Muted: {}", muted);
            rerender.force_update();
        })
    };

    let on_start = {
        let session = session.clone();
        let tasks = tasks.clone();
        let rerender = rerender.clone();
        Callback::from(move |_| {
            tasks.borrow_mut().cancel();
            let started = session.borrow_mut().begin_countdown();
            if started {
                spawn_countdown(session.clone(), tasks.clone(), rerender.clone());
            }
            rerender.force_update();
        })
    };

    let on_reset = {
        let session = session.clone();
        let tasks = tasks.clone();
        let rerender = rerender.clone();
        Callback::from(move |_| {
            tasks.borrow_mut().cancel();
            session.borrow_mut().reset();
            rerender.force_update();
        })
    };

    let on_clear_history = {
        let session = session.clone();
        Callback::from(move |_| {
            session.borrow_mut().clear_history();
            rerender.force_update();
        })
    };

    RaceController {
        session,
        on_count_input,
        on_name_input,
        on_theme_change,
        on_quick_fill,
        on_toggle_mute,
        on_start,
        on_reset,
        on_clear_history,
    }
}

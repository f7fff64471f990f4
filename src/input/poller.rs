//! Background input polling.
//!
//! Three long-lived threads run beside the frame loop for the overlay's
//! whole lifetime: the controller poller (~20 ms cadence) and the home and
//! power button watchers (blocking waits with a ~100 ms timeout, purely so
//! the running flag is observed). All of them write into one
//! [`SharedInput`]; the frame loop snapshots it once per iteration.
//!
//! Presses are OR-accumulated into a pending mask between frames, so a
//! skipped frame never loses a discrete key-down.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};

use super::{parse_combo, InputFrame, InputSample, Keys, StickPos, TouchPoint};
use crate::config::Settings;

/// Host controller/touch sampling service.
pub trait InputSource: Send {
    fn poll(&mut self) -> InputSample;
}

/// Host event handle for a dedicated hardware button.
pub trait ButtonWatch: Send {
    /// Blocks up to `timeout` for a press; returns whether one arrived.
    fn wait_press(&mut self, timeout: Duration) -> bool;
}

/// Cadence and settings location for the polling threads.
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub watch_timeout: Duration,
    /// Settings file holding the launch combo, read once at poller startup.
    pub settings_path: PathBuf,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(20),
            watch_timeout: Duration::from_millis(100),
            settings_path: crate::config::default_settings_path(),
        }
    }
}

/// The host input services handed to [`spawn`].
pub struct InputRig {
    pub source: Box<dyn InputSource>,
    pub home: Box<dyn ButtonWatch>,
    pub power: Box<dyn ButtonWatch>,
    pub config: PollerConfig,
}

#[derive(Default)]
struct InputData {
    keys_down: Keys,
    keys_down_pending: Keys,
    keys_held: Keys,
    touch: Option<TouchPoint>,
    stick_left: StickPos,
    stick_right: StickPos,
    launch_combo: Keys,
}

struct ComboSignal {
    fired: Mutex<bool>,
    cond: Condvar,
}

/// State shared between the polling threads and the frame loop.
pub struct SharedInput {
    running: AtomicBool,
    overlay_open: AtomicBool,
    hide_requested: AtomicBool,
    combo: ComboSignal,
    data: Mutex<InputData>,
}

fn relock<T>(result: std::sync::LockResult<MutexGuard<'_, T>>) -> MutexGuard<'_, T> {
    // A poisoned lock only means another thread panicked mid-update; input
    // state degrades, it does not abort the overlay.
    result.unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SharedInput {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            overlay_open: AtomicBool::new(false),
            hide_requested: AtomicBool::new(false),
            combo: ComboSignal {
                fired: Mutex::new(false),
                cond: Condvar::new(),
            },
            data: Mutex::new(InputData {
                launch_combo: Keys::L | Keys::DDOWN | Keys::RSTICK,
                ..InputData::default()
            }),
        }
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Requests cooperative shutdown; each thread observes this within one
    /// poll interval.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        // Wake the frame loop if it is parked on the combo signal.
        self.combo.cond.notify_all();
    }

    pub fn set_overlay_open(&self, open: bool) {
        self.overlay_open.store(open, Ordering::SeqCst);
    }

    pub fn overlay_open(&self) -> bool {
        self.overlay_open.load(Ordering::SeqCst)
    }

    fn request_hide(&self) {
        self.hide_requested.store(true, Ordering::SeqCst);
        self.overlay_open.store(false, Ordering::SeqCst);
    }

    /// Consumes a pending hide request from a watcher or the combo toggle.
    pub fn take_hide_request(&self) -> bool {
        self.hide_requested.swap(false, Ordering::SeqCst)
    }

    pub fn set_launch_combo(&self, combo: Keys) {
        relock(self.data.lock()).launch_combo = combo;
    }

    pub fn launch_combo(&self) -> Keys {
        relock(self.data.lock()).launch_combo
    }

    pub fn fire_combo(&self) {
        *relock(self.combo.fired.lock()) = true;
        self.combo.cond.notify_all();
    }

    pub fn clear_combo(&self) {
        *relock(self.combo.fired.lock()) = false;
    }

    /// Waits up to `timeout` for the launch combo signal.
    pub fn wait_combo(&self, timeout: Duration) -> bool {
        let fired = relock(self.combo.fired.lock());
        let (guard, _) = self
            .combo
            .cond
            .wait_timeout_while(fired, timeout, |fired| !*fired)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard
    }

    /// One poller tick: publish the sample, detect the launch combo and
    /// accumulate pending presses.
    pub fn poll_tick(&self, sample: InputSample) {
        let mut data = relock(self.data.lock());

        data.keys_down = sample.keys_down;
        data.keys_held = sample.keys_held;
        data.stick_left = sample.stick_left;
        data.stick_right = sample.stick_right;
        data.touch = sample.touch;

        let combo = data.launch_combo;
        if sample.keys_held.contains(combo) && sample.keys_down.intersects(combo) {
            if self.overlay_open() {
                self.request_hide();
            } else {
                self.fire_combo();
            }
        }

        data.keys_down_pending |= sample.keys_down;
    }

    /// Frame-loop snapshot: copies the pending input and clears the
    /// accumulator under one lock hold.
    pub fn take_frame_input(&self) -> InputFrame {
        let mut data = relock(self.data.lock());
        let frame = InputFrame {
            keys_down: data.keys_down_pending,
            keys_held: data.keys_held,
            touch: data.touch,
            stick_left: data.stick_left,
            stick_right: data.stick_right,
        };
        data.keys_down_pending = Keys::empty();
        frame
    }
}

impl Default for SharedInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the input poller and the two button watchers.
pub fn spawn(shared: Arc<SharedInput>, rig: InputRig) -> Result<Vec<JoinHandle<()>>> {
    let InputRig {
        mut source,
        home,
        power,
        config,
    } = rig;

    let mut handles = Vec::with_capacity(3);

    let poller_shared = shared.clone();
    let poll_interval = config.poll_interval;
    let settings_path = config.settings_path.clone();
    handles.push(
        thread::Builder::new()
            .name("veil-input".into())
            .spawn(move || {
                // The launch combo lives in the settings store; read it once
                // at startup, before the first sample.
                let settings = Settings::load(&settings_path);
                if let Some(value) = settings.value("launcher", "key_combo") {
                    let combo = parse_combo(value);
                    tracing::debug!(?combo, "launch combo from settings");
                    poller_shared.set_launch_combo(combo);
                }

                // Drop whatever was pressed before we started watching.
                let _ = source.poll();

                while poller_shared.running() {
                    let sample = source.poll();
                    poller_shared.poll_tick(sample);
                    thread::sleep(poll_interval);
                }
            })
            .context("failed to spawn input poller thread")?,
    );

    for (name, mut watch) in [("veil-home", home), ("veil-power", power)] {
        let watch_shared = shared.clone();
        let timeout = config.watch_timeout;
        handles.push(
            thread::Builder::new()
                .name(name.into())
                .spawn(move || {
                    while watch_shared.running() {
                        if watch.wait_press(timeout) && watch_shared.overlay_open() {
                            // Hide immediately so focus cannot glitch out
                            // under the system UI.
                            watch_shared.request_hide();
                        }
                    }
                })
                .with_context(|| format!("failed to spawn {name} thread"))?,
        );
    }

    Ok(handles)
}

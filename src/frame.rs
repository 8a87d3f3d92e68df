//! Per-frame callbacks and the frame clock.
//!
//! [`advance`] is the heartbeat of the pipeline: it runs every frame callback
//! in registration order, then ticks the animation driver once.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::debug;

use crate::animation::driver;
use crate::lifecycle::{self, OwnerId};

/// Timing of the frame being produced.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    pub now: Duration,
    /// Time since the previous frame; zero on the first one
    pub delta: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

type FrameCallback = Rc<dyn Fn(FrameTime)>;

struct FrameEntry {
    id: u64,
    callback: FrameCallback,
    owner: Option<OwnerId>,
}

struct FrameClock {
    last: Option<Duration>,
    next_id: u64,
    callbacks: Vec<FrameEntry>,
}

impl FrameClock {
    fn new() -> Self {
        Self {
            last: None,
            next_id: 1,
            callbacks: Vec::new(),
        }
    }
}

thread_local! {
    static FRAMES: RefCell<FrameClock> = RefCell::new(FrameClock::new());
}

fn with_frames<R>(f: impl FnOnce(&mut FrameClock) -> R) -> R {
    FRAMES.with(|frames| f(&mut frames.borrow_mut()))
}

/// Run `callback` on every frame until cancelled or its mount is torn down.
pub fn on_frame(callback: impl Fn(FrameTime) + 'static) -> FrameHandle {
    if !lifecycle::accepting_registrations() {
        debug!("owner is tearing down, ignoring frame callback");
        return FrameHandle(0);
    }
    let owner = lifecycle::current_owner();
    let handle = with_frames(|frames| {
        let id = frames.next_id;
        frames.next_id += 1;
        frames.callbacks.push(FrameEntry {
            id,
            callback: Rc::new(callback),
            owner,
        });
        FrameHandle(id)
    });
    lifecycle::register_frame(handle);
    handle
}

pub fn cancel_frame(handle: FrameHandle) {
    with_frames(|frames| frames.callbacks.retain(|entry| entry.id != handle.0));
}

pub fn frame_callback_count() -> usize {
    with_frames(|frames| frames.callbacks.len())
}

/// True when no frame callback or transition is pending.
pub fn is_idle() -> bool {
    frame_callback_count() == 0 && driver::active_count() == 0
}

/// Produce one frame at `now`.
///
/// Callbacks registered during this frame first run on the next one; a
/// callback cancelled during this frame is skipped.
pub fn advance(now: Duration) -> FrameTime {
    let (time, pending) = with_frames(|frames| {
        let delta = frames
            .last
            .map(|last| now.saturating_sub(last))
            .unwrap_or_default();
        frames.last = Some(now);
        let pending: Vec<(u64, FrameCallback, Option<OwnerId>)> = frames
            .callbacks
            .iter()
            .map(|entry| (entry.id, entry.callback.clone(), entry.owner))
            .collect();
        (FrameTime { now, delta }, pending)
    });

    for (id, callback, owner) in pending {
        let live = with_frames(|frames| frames.callbacks.iter().any(|entry| entry.id == id));
        if live {
            lifecycle::run_in_owner(owner, || callback(time));
        }
    }

    driver::tick(now);
    time
}

pub(crate) fn reset_frames() {
    with_frames(|frames| *frames = FrameClock::new());
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_delta_between_frames() {
        let deltas = Rc::new(RefCell::new(Vec::new()));
        let log = deltas.clone();
        on_frame(move |time| log.borrow_mut().push(time.delta));

        advance(ms(100));
        advance(ms(116));

        assert_eq!(*deltas.borrow(), vec![ms(0), ms(16)]);
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = order.clone();
            on_frame(move |_| log.borrow_mut().push(i));
        }

        advance(ms(0));

        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_cancel_during_frame_skips_callback() {
        let ran = Rc::new(Cell::new(false));
        let second: Rc<Cell<Option<FrameHandle>>> = Rc::new(Cell::new(None));
        let to_cancel = second.clone();
        on_frame(move |_| {
            if let Some(handle) = to_cancel.get() {
                cancel_frame(handle);
            }
        });
        let flag = ran.clone();
        second.set(Some(on_frame(move |_| flag.set(true))));

        advance(ms(0));

        assert!(!ran.get());
        assert_eq!(frame_callback_count(), 1);
    }

    #[test]
    fn test_idle_without_work() {
        assert!(is_idle());
        let handle = on_frame(|_| {});
        assert!(!is_idle());
        cancel_frame(handle);
        assert!(is_idle());
    }
}

//! Fixed-rate frame loop on a calloop timer.
//!
//! The host owns the loop; every timer expiry produces one frame through a
//! [`FrameSink`]. Frame time is measured from the loop start using the timer
//! deadlines, so a slow frame does not stretch animation time.

use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopSignal};
use log::{debug, info};

use crate::error::Result;

/// Receives frames from a [`FrameLoop`].
pub trait FrameSink {
    /// Produce the frame at `now`, measured from the loop start. Returning
    /// `false` stops the loop after this frame.
    fn frame(&mut self, now: Duration) -> bool;
}

impl<F: FnMut(Duration) -> bool> FrameSink for F {
    fn frame(&mut self, now: Duration) -> bool {
        self(now)
    }
}

struct LoopState<'s, S> {
    sink: &'s mut S,
    started: Instant,
    frames: u64,
    budget: Option<u64>,
    signal: LoopSignal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameLoop {
    interval: Duration,
    budget: Option<u64>,
}

impl FrameLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            budget: None,
        }
    }

    /// Stop after `frames` frames.
    pub fn budget(mut self, frames: u64) -> Self {
        self.budget = Some(frames);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until the sink asks to stop or the budget is spent. Returns the
    /// number of frames produced.
    pub fn run<S: FrameSink>(&self, sink: &mut S) -> Result<u64> {
        if self.budget == Some(0) {
            return Ok(0);
        }

        let mut event_loop: EventLoop<'_, LoopState<'_, S>> = EventLoop::try_new()?;
        let interval = self.interval;
        event_loop
            .handle()
            .insert_source(Timer::immediate(), move |deadline, _, state| {
                let now = deadline.saturating_duration_since(state.started);
                let keep_going = state.sink.frame(now);
                state.frames += 1;

                let spent = state.budget.is_some_and(|budget| state.frames >= budget);
                if !keep_going || spent {
                    state.signal.stop();
                    return TimeoutAction::Drop;
                }
                TimeoutAction::ToDuration(interval)
            })
            .map_err(|err| err.error)?;

        let mut state = LoopState {
            sink,
            started: Instant::now(),
            frames: 0,
            budget: self.budget,
            signal: event_loop.get_signal(),
        };
        info!(
            "frame loop started: {:?} per frame, budget {:?}",
            self.interval, self.budget
        );
        event_loop.run(None::<Duration>, &mut state, |_| {})?;
        debug!("frame loop stopped after {} frames", state.frames);
        Ok(state.frames)
    }
}

//! The animation driver: the single writer of animated surface properties.
//!
//! At most one transition is active per (surface, property) pair. Starting a
//! new transition on a busy pair cancels the old one and continues from its
//! current interpolated value, so redirected motion never snaps.
//!
//! Time only moves forward through [`tick`], which advances every active
//! transition once, in registration order.
//!
//! # Example
//!
//! ```ignore
//! tick(now);
//! let tilt = Transition::new(400.0, TimingFunction::EaseOutCubic);
//! let handle = animate(card, Property::RotateY, 12.0, tilt);
//! // Later frames
//! tick(now + Duration::from_millis(16));
//! ```

use std::cell::RefCell;
use std::time::Duration;

use log::{debug, trace};

use super::{AnimationState, Transition};
use crate::lifecycle::{self, OwnerId};
use crate::property::Property;
use crate::surface::{self, with_surfaces_mut, SurfaceId};

/// Handle to a transition started by the driver.
///
/// Handles stay valid after the transition ends; cancelling a finished or
/// superseded transition is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionHandle(u64);

impl TransitionHandle {
    /// Handle returned when nothing was started (missing surface, owner tearing down).
    pub const INERT: Self = Self(0);

    pub fn is_inert(self) -> bool {
        self.0 == 0
    }
}

struct ActiveTransition {
    id: u64,
    target: SurfaceId,
    property: Property,
    state: AnimationState<f32>,
    owner: Option<OwnerId>,
}

impl ActiveTransition {
    fn snapped(&self, value: f32) -> f32 {
        match self.state.transition().snap {
            Some(step) if step > 0.0 => (value / step).round() * step,
            _ => value,
        }
    }
}

/// A value produced by one transition during a tick.
struct Write {
    id: u64,
    target: SurfaceId,
    property: Property,
    value: f32,
    finished: bool,
}

struct Driver {
    now: Duration,
    next_id: u64,
    active: Vec<ActiveTransition>,
}

impl Driver {
    fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            active: Vec::new(),
        }
    }

    fn position(&self, target: SurfaceId, property: Property) -> Option<usize> {
        self.active
            .iter()
            .position(|a| a.target == target && a.property == property)
    }

    fn take_pair(&mut self, target: SurfaceId, property: Property) -> Option<ActiveTransition> {
        self.position(target, property)
            .map(|index| self.active.remove(index))
    }

    fn take_id(&mut self, id: u64) -> Option<ActiveTransition> {
        self.active
            .iter()
            .position(|a| a.id == id)
            .map(|index| self.active.remove(index))
    }

    fn start(
        &mut self,
        target: SurfaceId,
        property: Property,
        start: f32,
        end: f32,
        transition: Transition,
        owner: Option<OwnerId>,
    ) -> TransitionHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.active.push(ActiveTransition {
            id,
            target,
            property,
            state: AnimationState::new(start, end, transition, self.now),
            owner,
        });
        TransitionHandle(id)
    }

    fn advance(&mut self, now: Duration) -> Vec<Write> {
        self.now = now;
        let mut writes = Vec::with_capacity(self.active.len());
        for active in &mut self.active {
            let changed = active.state.advance(now);
            let finished = !active.state.is_animating();
            if changed.is_changed() || finished {
                writes.push(Write {
                    id: active.id,
                    target: active.target,
                    property: active.property,
                    value: active.snapped(*active.state.current()),
                    finished,
                });
            }
        }
        self.active.retain(|a| a.state.is_animating());
        writes
    }
}

thread_local! {
    static DRIVER: RefCell<Driver> = RefCell::new(Driver::new());
}

fn with_driver<R>(f: impl FnOnce(&mut Driver) -> R) -> R {
    DRIVER.with(|driver| f(&mut driver.borrow_mut()))
}

/// Shared entry point for every way of starting a transition.
///
/// `from` forces the start value; otherwise the transition continues from the
/// pair's interpolated value or the surface's current value. `to` of `None`
/// means "the value the property would have had": the superseded transition's
/// target, or the surface's current value.
fn start_transition(
    target: SurfaceId,
    property: Property,
    from: Option<f32>,
    to: Option<f32>,
    transition: Transition,
) -> TransitionHandle {
    let Some(current) = surface::value(target, property) else {
        debug!("not animating {} of missing surface {:?}", property, target);
        return TransitionHandle::INERT;
    };
    if !lifecycle::accepting_registrations() {
        debug!("owner is tearing down, ignoring {} transition", property);
        return TransitionHandle::INERT;
    }

    let owner = lifecycle::current_owner();
    let (handle, start) = with_driver(|driver| {
        let previous = driver.take_pair(target, property);
        let (interpolated, natural) = match &previous {
            Some(prev) => {
                let (value, _) = prev.state.sample(driver.now);
                trace!(
                    "overwriting {} on {:?} at {} (was heading to {})",
                    property,
                    target,
                    value,
                    prev.state.target()
                );
                (value, *prev.state.target())
            }
            None => (current, current),
        };
        let start = from.unwrap_or(interpolated);
        let end = to.unwrap_or(natural);
        (driver.start(target, property, start, end, transition, owner), start)
    });

    with_surfaces_mut(|tree| {
        if from.is_some() {
            tree.write(target, property, start);
        }
        tree.set_animating(target, property, true);
    });
    handle
}

/// Animate `property` of `target` to `end`.
///
/// An active transition on the same pair is superseded; the new one starts
/// from the old one's interpolated value.
pub fn animate(
    target: SurfaceId,
    property: Property,
    end: f32,
    transition: Transition,
) -> TransitionHandle {
    start_transition(target, property, None, Some(end), transition)
}

/// Animate from `from` back to the property's current value.
///
/// `from` is written immediately so the surface never flashes its final state.
pub fn animate_from(
    target: SurfaceId,
    property: Property,
    from: f32,
    transition: Transition,
) -> TransitionHandle {
    start_transition(target, property, Some(from), None, transition)
}

/// Animate from `from` to `to`, writing `from` immediately.
pub fn animate_from_to(
    target: SurfaceId,
    property: Property,
    from: f32,
    to: f32,
    transition: Transition,
) -> TransitionHandle {
    start_transition(target, property, Some(from), Some(to), transition)
}

/// Write a value immediately, cancelling any transition on the pair.
pub fn set_value(target: SurfaceId, property: Property, value: f32) {
    with_driver(|driver| driver.take_pair(target, property));
    with_surfaces_mut(|tree| {
        tree.write(target, property, value);
        tree.set_animating(target, property, false);
    });
}

fn settle(cancelled: &[ActiveTransition]) {
    with_surfaces_mut(|tree| {
        for transition in cancelled {
            let value = transition.snapped(*transition.state.current());
            tree.write(transition.target, transition.property, value);
            tree.set_animating(transition.target, transition.property, false);
        }
    });
}

/// Stop a transition, leaving the property at its interpolated value.
pub fn cancel(handle: TransitionHandle) {
    if handle.is_inert() {
        return;
    }
    if let Some(cancelled) = with_driver(|driver| driver.take_id(handle.0)) {
        settle(&[cancelled]);
    }
}

/// Cancel every transition started inside `owner`. Returns how many were running.
pub(crate) fn cancel_owned(owner: OwnerId) -> usize {
    let cancelled: Vec<ActiveTransition> = with_driver(|driver| {
        let (owned, kept) = std::mem::take(&mut driver.active)
            .into_iter()
            .partition(|a| a.owner == Some(owner));
        driver.active = kept;
        owned
    });
    settle(&cancelled);
    cancelled.len()
}

pub fn is_active(handle: TransitionHandle) -> bool {
    with_driver(|driver| driver.active.iter().any(|a| a.id == handle.0))
}

/// Number of transitions currently running.
pub fn active_count() -> usize {
    with_driver(|driver| driver.active.len())
}

/// The transition currently driving a pair, if any.
pub fn active_on(target: SurfaceId, property: Property) -> Option<TransitionHandle> {
    with_driver(|driver| {
        driver
            .position(target, property)
            .map(|index| TransitionHandle(driver.active[index].id))
    })
}

/// Start and end value of an active transition.
pub fn endpoints(handle: TransitionHandle) -> Option<(f32, f32)> {
    with_driver(|driver| {
        driver
            .active
            .iter()
            .find(|a| a.id == handle.0)
            .map(|a| (*a.state.start(), *a.state.target()))
    })
}

/// Timestamp of the most recent tick.
pub fn now() -> Duration {
    with_driver(|driver| driver.now)
}

/// Advance every active transition to `now` and write the results.
pub fn tick(now: Duration) {
    let writes = with_driver(|driver| driver.advance(now));
    if writes.is_empty() {
        return;
    }

    let mut orphaned = Vec::new();
    with_surfaces_mut(|tree| {
        for write in &writes {
            if !tree.write(write.target, write.property, write.value) {
                orphaned.push(write.id);
                continue;
            }
            if write.finished {
                tree.set_animating(write.target, write.property, false);
            }
        }
    });

    if !orphaned.is_empty() {
        debug!("dropping {} transitions of removed surfaces", orphaned.len());
        with_driver(|driver| driver.active.retain(|a| !orphaned.contains(&a.id)));
    }
}

pub(crate) fn reset_driver() {
    with_driver(|driver| *driver = Driver::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Repeat, TimingFunction};
    use crate::geometry::Rect;
    use crate::property::PropertySet;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn linear(duration_ms: f32) -> Transition {
        Transition::new(duration_ms, TimingFunction::Linear)
    }

    #[test]
    fn test_animate_writes_on_tick() {
        let card = surface::create_surface("card", Rect::default());
        tick(ms(0));
        animate(card, Property::TranslateY, 10.0, linear(500.0));

        tick(ms(250));
        assert_eq!(surface::value(card, Property::TranslateY), Some(5.0));
        assert_eq!(surface::animating(card), PropertySet::TRANSLATE_Y);

        tick(ms(500));
        assert_eq!(surface::value(card, Property::TranslateY), Some(10.0));
        assert_eq!(surface::animating(card), PropertySet::empty());
        assert_eq!(active_count(), 0);
    }

    #[test]
    fn test_overwrite_starts_from_interpolated_value() {
        let card = surface::create_surface("card", Rect::default());
        tick(ms(0));
        let first = animate(card, Property::TranslateY, 10.0, linear(500.0));
        tick(ms(250));

        let second = animate(card, Property::TranslateY, 20.0, linear(500.0));

        assert!(!is_active(first));
        assert!(is_active(second));
        assert_eq!(active_count(), 1);
        assert_eq!(active_on(card, Property::TranslateY), Some(second));
        assert_eq!(endpoints(second), Some((5.0, 20.0)));
    }

    #[test]
    fn test_overwrite_before_any_tick_keeps_start() {
        let card = surface::create_surface("card", Rect::default());
        animate(card, Property::Opacity, 0.0, linear(100.0));
        let second = animate(card, Property::Opacity, 0.5, linear(100.0));
        assert_eq!(endpoints(second), Some((1.0, 0.5)));
    }

    #[test]
    fn test_different_properties_run_concurrently() {
        let card = surface::create_surface("card", Rect::default());
        let x = animate(card, Property::RotateX, 10.0, linear(100.0));
        let y = animate(card, Property::RotateY, -10.0, linear(100.0));

        assert!(is_active(x));
        assert!(is_active(y));
        assert_eq!(
            surface::animating(card),
            PropertySet::ROTATE_X | PropertySet::ROTATE_Y
        );
    }

    #[test]
    fn test_cancel_keeps_interpolated_value() {
        let card = surface::create_surface("card", Rect::default());
        tick(ms(0));
        let handle = animate(card, Property::TranslateX, 100.0, linear(1000.0));
        tick(ms(300));

        cancel(handle);
        tick(ms(900));

        assert!(!is_active(handle));
        let value = surface::value(card, Property::TranslateX).unwrap_or_default();
        assert!((value - 30.0).abs() < 1e-3, "value was {}", value);
        // Second cancel is a no-op
        cancel(handle);
    }

    #[test]
    fn test_animate_from_writes_start_immediately() {
        let word = surface::create_surface("word", Rect::default());
        tick(ms(0));
        animate_from(word, Property::Opacity, 0.0, linear(100.0));

        assert_eq!(surface::value(word, Property::Opacity), Some(0.0));
        tick(ms(100));
        assert_eq!(surface::value(word, Property::Opacity), Some(1.0));
    }

    #[test]
    fn test_set_value_cancels_pair() {
        let card = surface::create_surface("card", Rect::default());
        let handle = animate(card, Property::Scale, 2.0, linear(100.0));

        set_value(card, Property::Scale, 0.5);

        assert!(!is_active(handle));
        assert_eq!(surface::value(card, Property::Scale), Some(0.5));
    }

    #[test]
    fn test_snap_rounds_written_values() {
        let counter = surface::create_surface("counter", Rect::default());
        tick(ms(0));
        animate_from_to(
            counter,
            Property::Counter,
            0.0,
            60.0,
            linear(1000.0).snap(1.0),
        );
        tick(ms(333));
        assert_eq!(surface::value(counter, Property::Counter), Some(20.0));
    }

    #[test]
    fn test_missing_surface_is_inert() {
        let card = surface::create_surface("card", Rect::default());
        surface::remove_surface(card);

        let handle = animate(card, Property::Opacity, 0.0, linear(100.0));

        assert!(handle.is_inert());
        assert_eq!(active_count(), 0);
    }

    #[test]
    fn test_removed_surface_drops_transition() {
        let card = surface::create_surface("card", Rect::default());
        tick(ms(0));
        animate(
            card,
            Property::TranslateY,
            -10.0,
            linear(100.0).repeat(Repeat::Forever),
        );
        surface::remove_surface(card);

        tick(ms(16));

        assert_eq!(active_count(), 0);
    }

    #[test]
    fn test_tick_advances_in_registration_order() {
        let a = surface::create_surface("a", Rect::default());
        let b = surface::create_surface("b", Rect::default());
        let first = animate(a, Property::TranslateX, 1.0, linear(100.0));
        let second = animate(b, Property::TranslateX, 1.0, linear(100.0));
        // Overwriting moves the pair to the back of the queue
        let third = animate(a, Property::TranslateX, 2.0, linear(100.0));

        let order: Vec<u64> = with_driver(|d| d.active.iter().map(|t| t.id).collect());
        assert!(!is_active(first));
        assert_eq!(order, vec![second.0, third.0]);
    }
}

//! Mount windows and the resources bound to them.
//!
//! Every listener, transition, scroll trigger, frame callback and cleanup
//! callback created inside [`mount`] belongs to that mount's owner. Running the
//! returned [`Teardown`] releases all of them exactly once.
//!
//! # Overview
//!
//! - Owners form a tree; nested mounts are torn down before their parent
//! - Listeners are removed with the exact handler that was registered
//! - Transitions started by the owner (or by its callbacks) are cancelled,
//!   looping ones included
//! - `on_cleanup` callbacks run in reverse order (LIFO)
//! - Nothing registered after teardown begins is accepted or invoked
//!
//! # Example
//!
//! ```ignore
//! let teardown = mount(Some(section), |section| {
//!     add_listener(ListenTarget::Surface(section), EventKind::PointerMove, handler);
//!     on_cleanup(|| log::debug!("section gone"));
//! });
//!
//! teardown.run();
//! teardown.run(); // no-op
//! ```

use std::cell::RefCell;

use log::debug;

use crate::animation::driver;
use crate::frame::{self, FrameHandle};
use crate::input::{self, ListenerHandle};
use crate::input::scroll::{self, TriggerHandle};
use crate::surface::{self, SurfaceId};

/// Unique identifier for an owner in the owner arena.
pub type OwnerId = usize;

/// Where a mount window is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountState {
    /// Never mounted, or fully torn down
    Unmounted,
    /// Setup ran; resources are live
    Mounted,
    /// Teardown is releasing resources
    TearingDown,
}

struct Owner {
    state: MountState,
    listeners: Vec<ListenerHandle>,
    triggers: Vec<TriggerHandle>,
    frames: Vec<FrameHandle>,
    cleanups: Vec<Box<dyn FnOnce()>>,
    children: Vec<OwnerId>,
}

impl Owner {
    fn new() -> Self {
        Self {
            state: MountState::Mounted,
            listeners: Vec::new(),
            triggers: Vec::new(),
            frames: Vec::new(),
            cleanups: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Arena-based storage for owners. Ids are never reused.
struct OwnerArena {
    owners: Vec<Option<Owner>>,
}

impl OwnerArena {
    fn new() -> Self {
        Self { owners: Vec::new() }
    }

    fn allocate(&mut self, parent: Option<OwnerId>) -> OwnerId {
        let id = self.owners.len();
        self.owners.push(Some(Owner::new()));
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.push(id);
        }
        id
    }

    fn get(&self, id: OwnerId) -> Option<&Owner> {
        self.owners.get(id).and_then(|o| o.as_ref())
    }

    fn get_mut(&mut self, id: OwnerId) -> Option<&mut Owner> {
        self.owners.get_mut(id).and_then(|o| o.as_mut())
    }
}

thread_local! {
    static CURRENT_OWNER: RefCell<Option<OwnerId>> = const { RefCell::new(None) };
    static OWNERS: RefCell<OwnerArena> = RefCell::new(OwnerArena::new());
}

fn with_owners<R>(f: impl FnOnce(&mut OwnerArena) -> R) -> R {
    OWNERS.with(|owners| f(&mut owners.borrow_mut()))
}

/// The owner that new resources are registered with, if any.
pub fn current_owner() -> Option<OwnerId> {
    CURRENT_OWNER.with(|current| *current.borrow())
}

fn state_of(id: OwnerId) -> MountState {
    with_owners(|owners| {
        owners
            .get(id)
            .map(|owner| owner.state)
            .unwrap_or(MountState::Unmounted)
    })
}

/// Whether new resources may be created in the current scope.
///
/// Outside any mount this is always true; inside a mount only while it is
/// [`MountState::Mounted`].
pub fn accepting_registrations() -> bool {
    match current_owner() {
        Some(id) => state_of(id) == MountState::Mounted,
        None => true,
    }
}

/// Run `f` with `owner` as the current owner.
///
/// Returns `None` without calling `f` when the owner is no longer mounted, so
/// callbacks of a torn-down mount are never invoked.
pub(crate) fn run_in_owner<R>(owner: Option<OwnerId>, f: impl FnOnce() -> R) -> Option<R> {
    if let Some(id) = owner {
        if state_of(id) != MountState::Mounted {
            return None;
        }
    }
    Some(enter(owner, f))
}

fn enter<R>(owner: Option<OwnerId>, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT_OWNER.with(|current| current.replace(owner));
    let result = f();
    CURRENT_OWNER.with(|current| *current.borrow_mut() = previous);
    result
}

/// Handle to a mount window. [`run`](Teardown::run) releases everything the
/// mount created; it does not run on drop.
#[derive(Debug)]
pub struct Teardown {
    owner: Option<OwnerId>,
}

impl Teardown {
    /// A teardown that owns nothing.
    pub fn inert() -> Self {
        Self { owner: None }
    }

    /// True when the mount was skipped because its host was missing.
    pub fn is_inert(&self) -> bool {
        self.owner.is_none()
    }

    pub fn state(&self) -> MountState {
        self.owner.map(state_of).unwrap_or(MountState::Unmounted)
    }

    /// Release every resource of this mount. Idempotent.
    pub fn run(&self) {
        if let Some(id) = self.owner {
            dispose_owner(id);
        }
    }
}

/// Mount `setup` on `host`.
///
/// A missing host (`None`, or a removed surface) skips setup entirely and
/// returns an inert teardown; a later mount may retry. Mounting inside a
/// mount nests the new owner under the current one.
pub fn mount(host: Option<SurfaceId>, setup: impl FnOnce(SurfaceId)) -> Teardown {
    let Some(host) = host.filter(|&id| surface::exists(id)) else {
        debug!("mount skipped: host surface is missing");
        return Teardown::inert();
    };
    if !accepting_registrations() {
        debug!("mount skipped: parent is tearing down");
        return Teardown::inert();
    }

    let parent = current_owner();
    let owner = with_owners(|owners| owners.allocate(parent));
    debug!("mounting owner {} on {:?}", owner, host);

    run_in_owner(Some(owner), || setup(host));
    Teardown { owner: Some(owner) }
}

fn dispose_owner(id: OwnerId) {
    // Flip to TearingDown and take the resources while leaving the slot in place,
    // so registrations attempted by cleanups see the state and are rejected.
    let taken = with_owners(|owners| {
        let owner = owners.get_mut(id)?;
        if owner.state != MountState::Mounted {
            return None;
        }
        owner.state = MountState::TearingDown;
        Some((
            std::mem::take(&mut owner.children),
            std::mem::take(&mut owner.listeners),
            std::mem::take(&mut owner.triggers),
            std::mem::take(&mut owner.frames),
            std::mem::take(&mut owner.cleanups),
        ))
    });
    let Some((children, listeners, triggers, frames, cleanups)) = taken else {
        return;
    };

    for child in children {
        dispose_owner(child);
    }

    let mut removed = 0;
    for listener in &listeners {
        if input::remove_listener(listener.target, listener.kind, &listener.handler) {
            removed += 1;
        }
    }
    for trigger in triggers {
        scroll::kill_trigger(trigger);
    }
    for handle in frames {
        frame::cancel_frame(handle);
    }
    let cancelled = driver::cancel_owned(id);

    enter(Some(id), || {
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    });

    debug!(
        "owner {} torn down: {} listeners, {} transitions",
        id, removed, cancelled
    );
    with_owners(|owners| {
        if let Some(slot) = owners.owners.get_mut(id) {
            *slot = None;
        }
    });
}

fn with_current(f: impl FnOnce(&mut Owner)) {
    let Some(id) = current_owner() else {
        return;
    };
    with_owners(|owners| {
        if let Some(owner) = owners.get_mut(id) {
            f(owner);
        }
    });
}

/// Register a callback to run when the current mount is torn down.
///
/// Outside a mount, or while it is tearing down, the callback is dropped
/// without being called.
pub fn on_cleanup(f: impl FnOnce() + 'static) {
    if !accepting_registrations() {
        return;
    }
    with_current(|owner| owner.cleanups.push(Box::new(f)));
}

pub(crate) fn register_listener(handle: ListenerHandle) {
    with_current(|owner| owner.listeners.push(handle));
}

pub(crate) fn register_trigger(handle: TriggerHandle) {
    with_current(|owner| owner.triggers.push(handle));
}

pub(crate) fn register_frame(handle: FrameHandle) {
    with_current(|owner| owner.frames.push(handle));
}

/// Number of mounts that have not been torn down.
pub fn live_owner_count() -> usize {
    with_owners(|owners| owners.owners.iter().filter(|o| o.is_some()).count())
}

pub(crate) fn reset_owners() {
    with_owners(|owners| *owners = OwnerArena::new());
    CURRENT_OWNER.with(|current| *current.borrow_mut() = None);
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::animation::{Transition, TimingFunction};
    use crate::geometry::Rect;
    use crate::input::{add_listener, listener_count, EventKind, Handler, ListenTarget};
    use crate::property::Property;

    fn host() -> SurfaceId {
        surface::create_surface("host", Rect::new(0.0, 0.0, 100.0, 100.0))
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let teardown = mount(Some(host()), move |_| {
            on_cleanup(move || counter.set(counter.get() + 1));
        });

        assert_eq!(teardown.state(), MountState::Mounted);
        teardown.run();
        teardown.run();

        assert_eq!(runs.get(), 1);
        assert_eq!(teardown.state(), MountState::Unmounted);
        assert_eq!(live_owner_count(), 0);
    }

    #[test]
    fn test_missing_host_is_inert() {
        let gone = host();
        surface::remove_surface(gone);
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();

        let teardown = mount(Some(gone), move |_| flag.set(true));

        assert!(teardown.is_inert());
        assert!(!ran.get());
        assert_eq!(teardown.state(), MountState::Unmounted);
        teardown.run();

        let teardown = mount(None, |_| {});
        assert!(teardown.is_inert());
    }

    #[test]
    fn test_cleanups_run_lifo() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let log = order.clone();
        let teardown = mount(Some(host()), move |_| {
            for i in 0..3 {
                let log = log.clone();
                on_cleanup(move || log.borrow_mut().push(i));
            }
        });

        teardown.run();

        assert_eq!(*order.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn test_nested_mount_disposed_first() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let outer_log = order.clone();
        let section = host();
        let teardown = mount(Some(section), move |host| {
            let inner_log = outer_log.clone();
            mount(Some(host), move |_| {
                on_cleanup(move || inner_log.borrow_mut().push("inner"));
            });
            on_cleanup(move || outer_log.borrow_mut().push("outer"));
        });
        assert_eq!(live_owner_count(), 2);

        teardown.run();

        assert_eq!(*order.borrow(), vec!["inner", "outer"]);
        assert_eq!(live_owner_count(), 0);
    }

    #[test]
    fn test_listeners_removed_on_teardown() {
        let teardown = mount(Some(host()), |host| {
            add_listener(
                ListenTarget::Surface(host),
                EventKind::PointerMove,
                Handler::new(|_| {}),
            );
            add_listener(ListenTarget::Window, EventKind::Resize, Handler::new(|_| {}));
        });
        assert_eq!(listener_count(), 2);

        teardown.run();

        assert_eq!(listener_count(), 0);
    }

    #[test]
    fn test_fresh_closure_does_not_remove_listener() {
        let section = host();
        add_listener(
            ListenTarget::Surface(section),
            EventKind::PointerLeave,
            Handler::new(|_| {}),
        );

        let removed = input::remove_listener(
            ListenTarget::Surface(section),
            EventKind::PointerLeave,
            &Handler::new(|_| {}),
        );

        assert!(!removed);
        assert_eq!(listener_count(), 1);
    }

    #[test]
    fn test_teardown_cancels_looping_transition() {
        let card = host();
        driver::tick(Duration::ZERO);
        let teardown = mount(Some(card), |card| {
            driver::animate(
                card,
                Property::TranslateY,
                -10.0,
                Transition::new(3000.0, TimingFunction::SineInOut)
                    .forever()
                    .yoyo(true),
            );
        });
        assert_eq!(driver::active_count(), 1);

        teardown.run();

        assert_eq!(driver::active_count(), 0);
    }

    #[test]
    fn test_cleanup_cannot_register_during_teardown() {
        let section = host();
        let teardown = mount(Some(section), |host| {
            on_cleanup(move || {
                add_listener(ListenTarget::Surface(host), EventKind::Scroll, Handler::new(|_| {}));
                let handle = driver::animate(host, Property::Opacity, 0.0, Transition::default());
                assert!(handle.is_inert());
            });
        });

        teardown.run();

        assert_eq!(listener_count(), 0);
        assert_eq!(driver::active_count(), 0);
    }

    #[test]
    fn test_remount_gets_fresh_owner() {
        let section = host();
        let first = mount(Some(section), |_| {});
        first.run();
        let second = mount(Some(section), |_| {});

        assert_eq!(first.state(), MountState::Unmounted);
        assert_eq!(second.state(), MountState::Mounted);
    }
}

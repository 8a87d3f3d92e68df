//! Pointer and scroll signal sources.
//!
//! The host pushes raw [`Event`]s through [`dispatch`]. Listeners attach to the
//! window or to a surface, the same way DOM listeners attach to an event
//! target, and are removed by handler identity.
//!
//! Surface pointer listeners only hear moves while the pointer is over the
//! surface's on-screen rectangle; leaving it delivers [`Event::PointerLeave`].

mod events;
pub mod pointer;
pub mod scroll;

use std::cell::RefCell;

use log::{debug, trace};

pub use events::{Event, EventKind, Handler, ListenTarget, ListenerHandle};
pub use pointer::{sample_in, viewport_sample, PointerSample};
pub use scroll::{
    create_scroll_trigger, kill_trigger, Anchor, AnchorError, Edge, RegionEnd, ScrollBinding,
    ScrollTrigger, Scrub, TriggerHandle, TriggerRegion, Viewport,
};

use crate::lifecycle::{self, OwnerId};
use crate::surface::{self, SurfaceId};

struct Listener {
    target: ListenTarget,
    kind: EventKind,
    handler: Handler,
    owner: Option<OwnerId>,
}

impl Listener {
    fn matches(&self, target: ListenTarget, kind: EventKind, handler: &Handler) -> bool {
        self.target == target && self.kind == kind && self.handler.ptr_eq(handler)
    }
}

type Delivery = (Handler, Option<OwnerId>, Event);

struct EventHub {
    listeners: Vec<Listener>,
    /// Surfaces the pointer is currently over
    hovered: Vec<SurfaceId>,
    pointer: Option<(f32, f32)>,
}

impl EventHub {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
            hovered: Vec::new(),
            pointer: None,
        }
    }

    fn collect(
        &self,
        target: ListenTarget,
        kind: EventKind,
        event: Event,
        out: &mut Vec<Delivery>,
    ) {
        out.extend(
            self.listeners
                .iter()
                .filter(|l| l.target == target && l.kind == kind)
                .map(|l| (l.handler.clone(), l.owner, event)),
        );
    }

    /// Surfaces with at least one pointer listener.
    fn pointer_surfaces(&self) -> Vec<SurfaceId> {
        let mut surfaces = Vec::new();
        for listener in &self.listeners {
            if let ListenTarget::Surface(id) = listener.target {
                let pointer_kind = matches!(
                    listener.kind,
                    EventKind::PointerMove | EventKind::PointerLeave
                );
                if pointer_kind && !surfaces.contains(&id) {
                    surfaces.push(id);
                }
            }
        }
        surfaces
    }

    /// Pointer surfaces whose on-screen rectangle contains `(x, y)`.
    fn hit_test(&self, x: f32, y: f32, viewport: &Viewport) -> Vec<SurfaceId> {
        self.pointer_surfaces()
            .into_iter()
            .filter(|&id| {
                surface::bounds(id)
                    .map(|bounds| viewport.client_rect(bounds).contains(x, y))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Replace the hovered set, queueing a leave for every surface that is no
    /// longer under the pointer.
    fn rehover(&mut self, inside: Vec<SurfaceId>, out: &mut Vec<Delivery>) {
        let left: Vec<SurfaceId> = self
            .hovered
            .iter()
            .copied()
            .filter(|id| !inside.contains(id))
            .collect();
        for id in left {
            self.collect(
                ListenTarget::Surface(id),
                EventKind::PointerLeave,
                Event::PointerLeave,
                out,
            );
        }
        self.hovered = inside;
    }

    fn pointer_move(&mut self, x: f32, y: f32, viewport: &Viewport) -> Vec<Delivery> {
        self.pointer = Some((x, y));
        let mut out = Vec::new();
        let inside = self.hit_test(x, y, viewport);
        self.rehover(inside, &mut out);

        let event = Event::PointerMove { x, y };
        for listener in &self.listeners {
            if listener.kind != EventKind::PointerMove {
                continue;
            }
            let hears = match listener.target {
                ListenTarget::Window => true,
                ListenTarget::Surface(id) => self.hovered.contains(&id),
            };
            if hears {
                out.push((listener.handler.clone(), listener.owner, event));
            }
        }
        out
    }

    /// Content moved under a still pointer.
    fn viewport_changed(&mut self, viewport: &Viewport) -> Vec<Delivery> {
        let mut out = Vec::new();
        if let Some((x, y)) = self.pointer {
            let inside = self.hit_test(x, y, viewport);
            self.rehover(inside, &mut out);
        }
        out
    }

    fn pointer_leave(&mut self) -> Vec<Delivery> {
        self.pointer = None;
        let mut out = Vec::new();
        for id in std::mem::take(&mut self.hovered) {
            self.collect(
                ListenTarget::Surface(id),
                EventKind::PointerLeave,
                Event::PointerLeave,
                &mut out,
            );
        }
        self.collect(
            ListenTarget::Window,
            EventKind::PointerLeave,
            Event::PointerLeave,
            &mut out,
        );
        out
    }
}

thread_local! {
    static HUB: RefCell<EventHub> = RefCell::new(EventHub::new());
}

fn with_hub<R>(f: impl FnOnce(&mut EventHub) -> R) -> R {
    HUB.with(|hub| f(&mut hub.borrow_mut()))
}

/// Attach `handler` to `target` for events of `kind`.
///
/// Adding the same handler to the same target and kind twice keeps a single
/// registration. Inside a mount the listener is removed on teardown; while a
/// mount is tearing down nothing is registered.
pub fn add_listener(target: ListenTarget, kind: EventKind, handler: Handler) -> ListenerHandle {
    let handle = ListenerHandle {
        target,
        kind,
        handler,
    };
    if !lifecycle::accepting_registrations() {
        debug!("owner is tearing down, ignoring {:?} listener", kind);
        return handle;
    }

    let owner = lifecycle::current_owner();
    let added = with_hub(|hub| {
        if hub
            .listeners
            .iter()
            .any(|l| l.matches(target, kind, &handle.handler))
        {
            return false;
        }
        hub.listeners.push(Listener {
            target,
            kind,
            handler: handle.handler.clone(),
            owner,
        });
        true
    });
    if added {
        lifecycle::register_listener(handle.clone());
    }
    handle
}

/// Detach the listener registered with this exact handler.
///
/// Returns false when no such listener exists, including when `handler` is a
/// different closure with the same behaviour.
pub fn remove_listener(target: ListenTarget, kind: EventKind, handler: &Handler) -> bool {
    with_hub(|hub| {
        match hub
            .listeners
            .iter()
            .position(|l| l.matches(target, kind, handler))
        {
            Some(index) => {
                hub.listeners.remove(index);
                true
            }
            None => false,
        }
    })
}

/// Number of registered listeners.
pub fn listener_count() -> usize {
    with_hub(|hub| hub.listeners.len())
}

pub fn listener_count_for(target: ListenTarget) -> usize {
    with_hub(|hub| hub.listeners.iter().filter(|l| l.target == target).count())
}

/// Last client position of the pointer, if it is inside the window.
pub fn pointer_position() -> Option<(f32, f32)> {
    with_hub(|hub| hub.pointer)
}

/// Deliver a host event.
///
/// Scroll and resize update the viewport and re-evaluate scroll triggers
/// before window listeners run; surfaces that moved out from under the
/// pointer get a leave. Events with non-finite coordinates are dropped.
/// Handlers run in the scope of the mount that registered them.
pub fn dispatch(event: Event) {
    if !event.is_finite() {
        debug!("dropping {:?} with non-finite coordinates", event.kind());
        return;
    }
    let viewport = scroll::viewport();
    match event {
        Event::Scroll { offset_y } => scroll::set_viewport(Viewport {
            scroll_y: offset_y,
            ..viewport
        }),
        Event::Resize { width, height } => scroll::set_viewport(Viewport {
            width,
            height,
            ..viewport
        }),
        _ => {}
    }

    let deliveries = match event {
        Event::PointerMove { x, y } => with_hub(|hub| hub.pointer_move(x, y, &viewport)),
        Event::PointerLeave => with_hub(|hub| hub.pointer_leave()),
        Event::Scroll { .. } | Event::Resize { .. } => {
            let viewport = scroll::viewport();
            with_hub(|hub| {
                let mut out = hub.viewport_changed(&viewport);
                hub.collect(ListenTarget::Window, event.kind(), event, &mut out);
                out
            })
        }
    };

    trace!("{:?} -> {} handlers", event.kind(), deliveries.len());
    for (handler, owner, event) in deliveries {
        lifecycle::run_in_owner(owner, || handler.call(&event));
    }
}

pub(crate) fn reset_input() {
    with_hub(|hub| *hub = EventHub::new());
    scroll::reset_scroll();
}

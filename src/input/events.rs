use std::fmt;
use std::rc::Rc;

use crate::surface::SurfaceId;

/// Input delivered by the host. Pointer coordinates are client (viewport)
/// coordinates in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    PointerMove { x: f32, y: f32 },
    /// The pointer left a surface, or the window when dispatched by the host
    PointerLeave,
    Scroll { offset_y: f32 },
    Resize { width: f32, height: f32 },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PointerMove { .. } => EventKind::PointerMove,
            Event::PointerLeave => EventKind::PointerLeave,
            Event::Scroll { .. } => EventKind::Scroll,
            Event::Resize { .. } => EventKind::Resize,
        }
    }

    /// Client position of a pointer move.
    pub fn position(&self) -> Option<(f32, f32)> {
        match *self {
            Event::PointerMove { x, y } => Some((x, y)),
            _ => None,
        }
    }

    /// Whether every coordinate carried by the event is a finite number.
    pub fn is_finite(&self) -> bool {
        match *self {
            Event::PointerMove { x, y } => x.is_finite() && y.is_finite(),
            Event::PointerLeave => true,
            Event::Scroll { offset_y } => offset_y.is_finite(),
            Event::Resize { width, height } => width.is_finite() && height.is_finite(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    PointerLeave,
    Scroll,
    Resize,
}

/// What a listener is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenTarget {
    Window,
    Surface(SurfaceId),
}

/// A shared event callback.
///
/// Listeners are identified by the handler's allocation, not its behaviour:
/// removal needs a clone of the very handler that was added.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event)>);

impl Handler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Whether both handlers share one allocation.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Everything needed to remove a listener again.
#[derive(Clone, Debug)]
pub struct ListenerHandle {
    pub target: ListenTarget,
    pub kind: EventKind,
    pub handler: Handler,
}

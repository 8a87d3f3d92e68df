//! Scroll-linked progress.
//!
//! A scroll trigger watches a surface and turns the viewport's scroll offset
//! into progress along a region of the page. Regions are written in the
//! "element-edge viewport-edge" notation: `"top 80%"` starts when the
//! surface's top edge reaches 80% down the viewport, `"+=400"` ends 400px of
//! scrolling later.
//!
//! Progress is clamped to `[0, 1]` and callbacks only fire when it changes, so
//! nothing fires while the viewport is entirely before or after the region.
//!
//! # Example
//!
//! ```ignore
//! let region = TriggerRegion::parse("top center", "+=400")?;
//! ScrollTrigger::new(bands, region)
//!     .scrub(Scrub::Immediate)
//!     .pin(true)
//!     .on_update(move |progress| { /* map and animate */ })
//!     .create();
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use log::{debug, trace};
use thiserror::Error;

use crate::animation::{driver, TimingFunction, Transition};
use crate::geometry::Rect;
use crate::lifecycle::{self, OwnerId};
use crate::mapper::{Mapper, RangeMapper};
use crate::property::Property;
use crate::surface::{self, SurfaceId};

/// The visible part of the page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Page offset of the viewport's top edge
    pub scroll_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(scroll_y: f32, width: f32, height: f32) -> Self {
        Self {
            scroll_y,
            width,
            height,
        }
    }

    /// Convert page bounds to client (on-screen) coordinates.
    pub fn client_rect(&self, page: Rect) -> Rect {
        page.offset(0.0, -self.scroll_y)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 1280.0, 800.0)
    }
}

/// A position along an element or the viewport, measured from its top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    /// Percentage of the extent
    Percent(f32),
    Pixels(f32),
}

impl Edge {
    pub fn resolve(self, extent: f32) -> f32 {
        match self {
            Edge::Top => 0.0,
            Edge::Center => extent / 2.0,
            Edge::Bottom => extent,
            Edge::Percent(percent) => extent * percent / 100.0,
            Edge::Pixels(pixels) => pixels,
        }
    }
}

impl FromStr for Edge {
    type Err = AnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = |text: &str| {
            text.parse::<f32>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| AnchorError::UnknownEdge(s.to_string()))
        };
        match s {
            "top" => Ok(Edge::Top),
            "center" => Ok(Edge::Center),
            "bottom" => Ok(Edge::Bottom),
            _ => {
                if let Some(percent) = s.strip_suffix('%') {
                    number(percent).map(Edge::Percent)
                } else if let Some(pixels) = s.strip_suffix("px") {
                    number(pixels).map(Edge::Pixels)
                } else {
                    number(s).map(Edge::Pixels)
                }
            }
        }
    }
}

/// Malformed region notation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnchorError {
    #[error("empty anchor")]
    Empty,
    #[error("unknown edge `{0}`")]
    UnknownEdge(String),
    #[error("expected `<element-edge> <viewport-edge>`, got `{0}`")]
    Arity(String),
    #[error("invalid relative end `{0}`")]
    Relative(String),
}

/// Where an element edge meets a viewport edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub element: Edge,
    pub viewport: Edge,
}

impl Anchor {
    pub const fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which the two edges line up.
    pub fn scroll_offset(&self, element: Rect, viewport_height: f32) -> f32 {
        element.y + self.element.resolve(element.height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for Anchor {
    type Err = AnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [] => Err(AnchorError::Empty),
            [element, viewport] => Ok(Anchor::new(element.parse()?, viewport.parse()?)),
            _ => Err(AnchorError::Arity(s.to_string())),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Top => write!(f, "top"),
            Edge::Center => write!(f, "center"),
            Edge::Bottom => write!(f, "bottom"),
            Edge::Percent(percent) => write!(f, "{}%", percent),
            Edge::Pixels(pixels) => write!(f, "{}px", pixels),
        }
    }
}

/// End of a trigger region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RegionEnd {
    Anchor(Anchor),
    /// Pixels of scrolling after the start
    Relative(f32),
}

impl FromStr for RegionEnd {
    type Err = AnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().strip_prefix("+=") {
            Some(amount) => amount
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .map(RegionEnd::Relative)
                .ok_or_else(|| AnchorError::Relative(s.to_string())),
            None => s.parse().map(RegionEnd::Anchor),
        }
    }
}

/// The stretch of scrolling a trigger maps onto `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerRegion {
    pub start: Anchor,
    pub end: RegionEnd,
}

impl TriggerRegion {
    pub fn new(start: Anchor, end: RegionEnd) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, AnchorError> {
        Ok(Self::new(start.parse()?, end.parse()?))
    }

    /// Start and end scroll offsets for an element. The end never precedes
    /// the start.
    pub fn resolve(&self, element: Rect, viewport_height: f32) -> (f32, f32) {
        let start = self.start.scroll_offset(element, viewport_height);
        let end = match self.end {
            RegionEnd::Anchor(anchor) => anchor.scroll_offset(element, viewport_height),
            RegionEnd::Relative(amount) => start + amount,
        };
        (start, end.max(start))
    }
}

impl Default for TriggerRegion {
    /// From "top bottom" to "bottom top": the whole time the element is on screen.
    fn default() -> Self {
        Self::new(
            Anchor::new(Edge::Top, Edge::Bottom),
            RegionEnd::Anchor(Anchor::new(Edge::Bottom, Edge::Top)),
        )
    }
}

/// How a driven property follows scroll progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Scrub {
    /// Not linked; a driven property plays to its end once the region is entered
    #[default]
    Off,
    /// Written directly from progress
    Immediate,
    /// Catches up with progress over the given number of seconds
    Smooth(f32),
}

/// Geometry and behaviour of a scroll trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollBinding {
    pub region: TriggerRegion,
    pub scrub: Scrub,
    pub pinned: bool,
    pub once: bool,
}

impl ScrollBinding {
    pub fn new(region: TriggerRegion) -> Self {
        Self {
            region,
            ..Self::default()
        }
    }

    /// Progress through the region, clamped to `[0, 1]`.
    pub fn progress(&self, element: Rect, viewport: &Viewport) -> f32 {
        let (start, end) = self.region.resolve(element, viewport.height);
        if end <= start {
            return if viewport.scroll_y >= start { 1.0 } else { 0.0 };
        }
        ((viewport.scroll_y - start) / (end - start)).clamp(0.0, 1.0)
    }

    /// Pixels the pinned element has been held in place.
    pub fn pin_offset(&self, element: Rect, viewport: &Viewport) -> f32 {
        let (start, end) = self.region.resolve(element, viewport.height);
        let span = end - start;
        if !span.is_finite() || span <= 0.0 {
            return 0.0;
        }
        (viewport.scroll_y - start).clamp(0.0, span)
    }
}

/// Handle to a live scroll trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TriggerHandle(u64);

/// A property written from trigger progress.
#[derive(Clone, Copy, Debug)]
struct Drive {
    target: SurfaceId,
    property: Property,
    range: RangeMapper,
}

type ProgressCallback = Rc<dyn Fn(f32)>;
type EnterCallback = Rc<dyn Fn()>;

/// Builder for a scroll trigger on one surface.
pub struct ScrollTrigger {
    trigger: SurfaceId,
    binding: ScrollBinding,
    on_update: Option<ProgressCallback>,
    on_enter: Option<EnterCallback>,
    drive: Option<Drive>,
}

impl ScrollTrigger {
    pub fn new(trigger: SurfaceId, region: TriggerRegion) -> Self {
        Self {
            trigger,
            binding: ScrollBinding::new(region),
            on_update: None,
            on_enter: None,
            drive: None,
        }
    }

    pub fn scrub(mut self, scrub: Scrub) -> Self {
        self.binding.scrub = scrub;
        self
    }

    /// Hold the trigger surface in place while scrolling through the region.
    pub fn pin(mut self, pinned: bool) -> Self {
        self.binding.pinned = pinned;
        self
    }

    /// Kill the trigger right after it is first entered.
    pub fn once(mut self, once: bool) -> Self {
        self.binding.once = once;
        self
    }

    /// Called with the new progress whenever it changes.
    pub fn on_update(mut self, f: impl Fn(f32) + 'static) -> Self {
        self.on_update = Some(Rc::new(f));
        self
    }

    /// Called the first time scrolling reaches the region's start.
    pub fn on_enter(mut self, f: impl Fn() + 'static) -> Self {
        self.on_enter = Some(Rc::new(f));
        self
    }

    /// Drive `property` of `target` across `range` as progress goes 0 → 1.
    pub fn drive(mut self, target: SurfaceId, property: Property, range: RangeMapper) -> Self {
        self.drive = Some(Drive {
            target,
            property,
            range,
        });
        self
    }

    pub fn binding(&self) -> &ScrollBinding {
        &self.binding
    }

    pub fn create(self) -> TriggerHandle {
        create_scroll_trigger(self)
    }
}

struct TriggerEntry {
    id: u64,
    trigger: SurfaceId,
    binding: ScrollBinding,
    on_update: Option<ProgressCallback>,
    on_enter: Option<EnterCallback>,
    drive: Option<Drive>,
    owner: Option<OwnerId>,
    progress: f32,
    entered: bool,
    pin_offset: f32,
}

/// Work produced by one trigger during a refresh, run after the registry
/// borrow is released.
struct Fired {
    id: u64,
    owner: Option<OwnerId>,
    trigger: SurfaceId,
    enter: Option<EnterCallback>,
    entered_now: bool,
    update: Option<(ProgressCallback, f32)>,
    drive: Option<(Drive, Scrub, f32)>,
    pin: Option<f32>,
    kill: bool,
}

struct ScrollState {
    viewport: Viewport,
    next_id: u64,
    triggers: Vec<TriggerEntry>,
}

impl ScrollState {
    fn new() -> Self {
        Self {
            viewport: Viewport::default(),
            next_id: 1,
            triggers: Vec::new(),
        }
    }

    /// Recompute one trigger. `None` means nothing to do; the bool is true
    /// when the trigger surface no longer exists.
    fn evaluate(&mut self, id: u64) -> (Option<Fired>, bool) {
        let viewport = self.viewport;
        let Some(entry) = self.triggers.iter_mut().find(|t| t.id == id) else {
            return (None, false);
        };
        let Some(bounds) = surface::bounds(entry.trigger) else {
            return (None, true);
        };

        let (start, _) = entry.binding.region.resolve(bounds, viewport.height);
        let progress = entry.binding.progress(bounds, &viewport);
        let progressed = progress != entry.progress;
        entry.progress = progress;

        let entered_now = !entry.entered && viewport.scroll_y >= start;
        if entered_now {
            entry.entered = true;
        }

        let pin = if entry.binding.pinned {
            let offset = entry.binding.pin_offset(bounds, &viewport);
            let changed = offset != entry.pin_offset;
            entry.pin_offset = offset;
            changed.then_some(offset)
        } else {
            None
        };

        let drive = match (entry.drive, entry.binding.scrub) {
            (Some(drive), Scrub::Off) if entered_now => Some((drive, Scrub::Off, 1.0)),
            (Some(drive), scrub) if progressed && scrub != Scrub::Off => {
                Some((drive, scrub, progress))
            }
            _ => None,
        };

        if !progressed && !entered_now && pin.is_none() {
            return (None, false);
        }

        let fired = Fired {
            id,
            owner: entry.owner,
            trigger: entry.trigger,
            enter: entry.on_enter.clone().filter(|_| entered_now),
            entered_now,
            update: entry
                .on_update
                .clone()
                .filter(|_| progressed)
                .map(|f| (f, progress)),
            drive,
            pin,
            kill: entered_now && entry.binding.once,
        };
        (Some(fired), false)
    }
}

thread_local! {
    static SCROLL: RefCell<ScrollState> = RefCell::new(ScrollState::new());
}

fn with_scroll<R>(f: impl FnOnce(&mut ScrollState) -> R) -> R {
    SCROLL.with(|state| f(&mut state.borrow_mut()))
}

/// Register a trigger and evaluate it against the current viewport.
///
/// Inside a mount the trigger belongs to it and its callbacks run in its scope.
pub fn create_scroll_trigger(trigger: ScrollTrigger) -> TriggerHandle {
    if !lifecycle::accepting_registrations() {
        debug!("owner is tearing down, ignoring scroll trigger");
        return TriggerHandle(0);
    }
    let owner = lifecycle::current_owner();
    let id = with_scroll(|state| {
        let id = state.next_id;
        state.next_id += 1;
        state.triggers.push(TriggerEntry {
            id,
            trigger: trigger.trigger,
            binding: trigger.binding,
            on_update: trigger.on_update,
            on_enter: trigger.on_enter,
            drive: trigger.drive,
            owner,
            progress: 0.0,
            entered: false,
            pin_offset: 0.0,
        });
        id
    });
    let handle = TriggerHandle(id);
    lifecycle::register_trigger(handle);
    refresh_one(id);
    handle
}

/// Remove a trigger. Unknown handles are ignored.
pub fn kill_trigger(handle: TriggerHandle) {
    with_scroll(|state| state.triggers.retain(|t| t.id != handle.0));
}

pub fn is_live(handle: TriggerHandle) -> bool {
    with_scroll(|state| state.triggers.iter().any(|t| t.id == handle.0))
}

pub fn trigger_count() -> usize {
    with_scroll(|state| state.triggers.len())
}

/// Last progress computed for a trigger.
pub fn progress(handle: TriggerHandle) -> Option<f32> {
    with_scroll(|state| {
        state
            .triggers
            .iter()
            .find(|t| t.id == handle.0)
            .map(|t| t.progress)
    })
}

pub fn viewport() -> Viewport {
    with_scroll(|state| state.viewport)
}

/// Replace the viewport and re-evaluate every trigger.
pub fn set_viewport(viewport: Viewport) {
    with_scroll(|state| state.viewport = viewport);
    refresh();
}

/// Re-evaluate every trigger in creation order.
pub fn refresh() {
    let ids: Vec<u64> = with_scroll(|state| state.triggers.iter().map(|t| t.id).collect());
    for id in ids {
        refresh_one(id);
    }
}

fn refresh_one(id: u64) {
    let (fired, orphaned) = with_scroll(|state| state.evaluate(id));
    if orphaned {
        debug!("killing scroll trigger {} of a removed surface", id);
        kill_trigger(TriggerHandle(id));
        return;
    }
    let Some(fired) = fired else {
        return;
    };

    if fired.entered_now {
        trace!("scroll trigger {} entered", fired.id);
    }
    lifecycle::run_in_owner(fired.owner, || {
        if let Some(on_enter) = &fired.enter {
            on_enter();
        }
        if let Some((on_update, progress)) = &fired.update {
            on_update(*progress);
        }
        if let Some((drive, scrub, progress)) = fired.drive {
            apply_drive(drive, scrub, progress);
        }
        if let Some(offset) = fired.pin {
            driver::set_value(fired.trigger, Property::PinOffset, offset);
        }
    });

    if fired.kill {
        kill_trigger(TriggerHandle(fired.id));
    }
}

fn apply_drive(drive: Drive, scrub: Scrub, progress: f32) {
    let value = drive.range.map(progress);
    match scrub {
        Scrub::Immediate => driver::set_value(drive.target, drive.property, value),
        Scrub::Smooth(lag) => {
            driver::animate(
                drive.target,
                drive.property,
                value,
                Transition::new(lag.max(0.0) * 1000.0, TimingFunction::EaseOutCubic),
            );
        }
        Scrub::Off => {
            driver::animate(drive.target, drive.property, value, Transition::default());
        }
    }
}

pub(crate) fn reset_scroll() {
    with_scroll(|state| *state = ScrollState::new());
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    fn section_at(top: f32) -> SurfaceId {
        surface::create_surface("section", Rect::new(0.0, top, 1280.0, 600.0))
    }

    fn scroll_to(y: f32) {
        let current = viewport();
        set_viewport(Viewport::new(y, current.width, current.height));
    }

    #[test]
    fn test_parse_anchors() {
        assert_eq!(
            "top 80%".parse::<Anchor>(),
            Ok(Anchor::new(Edge::Top, Edge::Percent(80.0)))
        );
        assert_eq!(
            "bottom top".parse::<Anchor>(),
            Ok(Anchor::new(Edge::Bottom, Edge::Top))
        );
        assert_eq!("+=400".parse::<RegionEnd>(), Ok(RegionEnd::Relative(400.0)));
        assert_eq!(
            "center 120px".parse::<Anchor>(),
            Ok(Anchor::new(Edge::Center, Edge::Pixels(120.0)))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Anchor>(), Err(AnchorError::Empty));
        assert_eq!(
            "top".parse::<Anchor>(),
            Err(AnchorError::Arity("top".to_string()))
        );
        assert_eq!(
            "middle top".parse::<Anchor>(),
            Err(AnchorError::UnknownEdge("middle".to_string()))
        );
        assert!(matches!("+=abc".parse::<RegionEnd>(), Err(AnchorError::Relative(_))));
    }

    #[test]
    fn test_progress_clamped_to_relative_region() {
        let binding = ScrollBinding::new(TriggerRegion::parse("top top", "+=400").unwrap());
        let element = Rect::new(0.0, 1000.0, 1280.0, 600.0);
        let at = |scroll_y| binding.progress(element, &Viewport::new(scroll_y, 1280.0, 800.0));

        assert_eq!(at(0.0), 0.0);
        assert_eq!(at(999.0), 0.0);
        assert_eq!(at(1000.0), 0.0);
        assert_eq!(at(1200.0), 0.5);
        assert_eq!(at(1400.0), 1.0);
        assert_eq!(at(5000.0), 1.0);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let binding = ScrollBinding::new(TriggerRegion::default());
        let element = Rect::new(0.0, 1200.0, 1280.0, 600.0);
        let mut last = 0.0;
        for step in 0..60 {
            let p = binding.progress(element, &Viewport::new(step as f32 * 50.0, 1280.0, 800.0));
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= last);
            last = p;
        }
    }

    #[test]
    fn test_update_fires_only_on_change() {
        let section = section_at(1000.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        ScrollTrigger::new(section, TriggerRegion::parse("top top", "+=400").unwrap())
            .scrub(Scrub::Immediate)
            .on_update(move |p| log.borrow_mut().push(p))
            .create();

        scroll_to(500.0);
        scroll_to(1200.0);
        scroll_to(1400.0);
        scroll_to(2000.0);
        scroll_to(3000.0);

        assert_eq!(*seen.borrow(), vec![0.5, 1.0]);
    }

    #[test]
    fn test_once_kills_after_enter() {
        let section = section_at(1000.0);
        let entered = Rc::new(Cell::new(0));
        let count = entered.clone();
        let region = TriggerRegion::parse("top 80%", "bottom top").unwrap();
        let handle = ScrollTrigger::new(section, region)
            .once(true)
            .on_enter(move || count.set(count.get() + 1))
            .create();
        assert!(is_live(handle));

        // Top edge at 80% of an 800px viewport: 1000 - 640
        scroll_to(359.0);
        assert_eq!(entered.get(), 0);
        scroll_to(360.0);
        scroll_to(0.0);
        scroll_to(400.0);

        assert_eq!(entered.get(), 1);
        assert!(!is_live(handle));
    }

    #[test]
    fn test_pin_writes_offset() {
        let section = section_at(1000.0);
        ScrollTrigger::new(section, TriggerRegion::parse("top top", "+=400").unwrap())
            .pin(true)
            .create();

        scroll_to(1100.0);
        assert_eq!(surface::value(section, Property::PinOffset), Some(100.0));
        scroll_to(2000.0);
        assert_eq!(surface::value(section, Property::PinOffset), Some(400.0));
    }

    #[test]
    fn test_pin_offset_of_empty_region_is_zero() {
        let element = Rect::new(0.0, 1000.0, 1280.0, 600.0);
        // Ends before it starts, so the region is empty
        let inverted = ScrollBinding::new(TriggerRegion::parse("top top", "top bottom").unwrap());
        assert_eq!(inverted.pin_offset(element, &Viewport::new(1500.0, 1280.0, 800.0)), 0.0);

        // A viewport-relative start is NaN when the height is
        let binding = ScrollBinding::new(TriggerRegion::parse("top center", "+=400").unwrap());
        let broken = Viewport::new(1500.0, 1280.0, f32::NAN);
        assert_eq!(binding.pin_offset(element, &broken), 0.0);
    }

    #[test]
    fn test_immediate_drive_writes_mapped_value() {
        let section = section_at(0.0);
        let camera = surface::create_surface("camera", Rect::default());
        ScrollTrigger::new(section, TriggerRegion::parse("top top", "+=1000").unwrap())
            .scrub(Scrub::Immediate)
            .drive(camera, Property::TranslateZ, RangeMapper::new(6.0, 3.0))
            .create();

        scroll_to(500.0);

        assert_eq!(surface::value(camera, Property::TranslateZ), Some(4.5));
    }

    #[test]
    fn test_removed_surface_kills_trigger() {
        let section = section_at(0.0);
        let handle = ScrollTrigger::new(section, TriggerRegion::default()).create();
        surface::remove_surface(section);

        refresh();

        assert!(!is_live(handle));
        assert_eq!(trigger_count(), 0);
    }
}

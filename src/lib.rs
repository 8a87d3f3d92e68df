//! Scroll- and pointer-driven motion for animated single-page sites.
//!
//! Raw pointer, scroll and resize input flows through pure mappers into an
//! animation driver that owns one transition per surface property. Every
//! resource a section creates belongs to its mount and is released by a single
//! teardown.

extern crate self as nebula;

pub mod animation;
pub mod components;
pub mod config;
pub mod content;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod lifecycle;
pub mod mapper;
pub mod property;
pub mod scene3d;
pub mod site;
pub mod surface;

// Public for hosts that drive frames themselves
pub mod platform;

pub use error::{Error, Result};
pub use nebula_macros::Animatable;
pub use site::{PageLayout, Site};

pub mod prelude {
    pub use crate::animation::{
        animate, animate_from, animate_from_to, cancel, set_value, Animatable, Follower, Repeat,
        TimingFunction, Transition,
    };
    pub use crate::components::Component;
    pub use crate::config::{MotionConfig, SiteConfig};
    pub use crate::frame::{advance, on_frame, FrameTime};
    pub use crate::geometry::Rect;
    pub use crate::input::{
        add_listener, dispatch, remove_listener, Event, EventKind, Handler, ListenTarget,
        ScrollTrigger, Scrub, TriggerRegion,
    };
    pub use crate::lifecycle::{mount, on_cleanup, Teardown};
    pub use crate::mapper::{
        LinearMapper, MagneticMapper, Mapper, ParallaxMapper, PointerFollowMapper, RangeMapper,
        Tilt, TiltMapper,
    };
    pub use crate::property::Property;
    pub use crate::surface::SurfaceId;
    pub use crate::{Animatable, Error, Result, Site};
}

/// Wipe all thread-local pipeline state.
///
/// Called when a [`Site`] is dropped so a new one starts clean.
pub(crate) fn reset_pipeline() {
    lifecycle::reset_owners();
    frame::reset_frames();
    animation::driver::reset_driver();
    input::reset_input();
    surface::reset_surfaces();
}

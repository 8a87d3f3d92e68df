use std::time::Duration;

use nebula::animation::{endpoints, tick};
use nebula::content::STATS;
use nebula::frame::frame_callback_count;
use nebula::input::{listener_count, pointer::PointerSample, scroll};
use nebula::prelude::*;
use nebula::scene3d::{HeadlessRenderer, ModelNode, Renderer, StaticModelLoader};
use nebula::surface;

#[test]
fn test_overwrite_starts_from_interpolated_value() {
    let card = surface::create_surface("card", Rect::new(0.0, 0.0, 100.0, 100.0));
    tick(Duration::ZERO);
    animate(
        card,
        Property::TranslateX,
        10.0,
        Transition::new(500.0, TimingFunction::Linear),
    );

    tick(Duration::from_millis(250));
    let handle = animate(
        card,
        Property::TranslateX,
        20.0,
        Transition::new(500.0, TimingFunction::Linear),
    );

    assert_eq!(endpoints(handle), Some((5.0, 20.0)));
    tick(Duration::from_millis(750));
    assert_eq!(surface::value(card, Property::TranslateX), Some(20.0));
}

#[test]
fn test_region_progress_is_clamped() {
    let binding = TriggerRegion::parse("top top", "+=400")
        .map(nebula::input::ScrollBinding::new)
        .unwrap();
    let element = Rect::new(0.0, 1000.0, 1280.0, 300.0);
    let at = |scroll_y: f32| {
        binding.progress(element, &nebula::input::Viewport::new(scroll_y, 1280.0, 800.0))
    };

    assert_eq!(at(0.0), 0.0);
    assert_eq!(at(999.0), 0.0);
    assert_eq!(at(1200.0), 0.5);
    assert_eq!(at(1400.0), 1.0);
    assert_eq!(at(5000.0), 1.0);
}

#[test]
fn test_tilt_never_exceeds_bound() {
    let mapper = TiltMapper::new(12.0);
    let rect = Rect::new(0.0, 0.0, 380.0, 420.0);
    for &(x, y) in &[(-5000.0, -5000.0), (190.0, 210.0), (380.0, 0.0), (9000.0, 420.0)] {
        let tilt = mapper.map(PointerSample::relative_to(rect, x, y));
        assert!(tilt.rotate_x.abs() <= 12.0 && tilt.rotate_y.abs() <= 12.0);
    }
}

#[test]
fn test_parallax_bands_at_full_progress() {
    let mapper = ParallaxMapper {
        depth_unit: 0.18,
        amplitude: 120.0,
    };
    let offsets = mapper.offsets(3, 1.0);
    let expected = [10.8, 21.6, 32.4];
    for (offset, expected) in offsets.iter().zip(expected) {
        assert!((offset - expected).abs() < 1e-4, "{} != {}", offset, expected);
    }
}

#[test]
fn test_magnetic_offset() {
    let mapper = MagneticMapper { strength: 20.0 };
    let sample = PointerSample {
        x: 40.0,
        y: -20.0,
        half_width: 100.0,
        half_height: 22.0,
    };
    assert_eq!(mapper.map(sample), (2.0, -1.0));
}

fn car() -> ModelNode {
    ModelNode::new("car")
        .with_child(ModelNode::new("Body").with_vertices(vec![[-1.0, 0.0, -2.0], [1.0, 1.0, 2.0]]))
        .with_child(ModelNode::new("Floor").with_vertices(vec![[-3.0, 0.0, -3.0], [3.0, 0.0, 3.0]]))
}

#[test]
fn test_full_site_scroll_through() {
    let renderer = HeadlessRenderer::shared();
    let shared = renderer.clone();
    let mut site = Site::new()
        .renderer(move || Box::new(shared.clone()) as Box<dyn Renderer>)
        .loader(StaticModelLoader::new().with("/models/logo.glb", car()));
    let layout = site.mount().unwrap().clone();
    assert!(frame_callback_count() >= 3);

    let mut now = 0;
    let mut frame = |site: &Site| {
        now += 16;
        site.advance(Duration::from_millis(now));
    };

    // Hover the hero card, then scroll to the bottom in steps
    site.dispatch(Event::PointerMove { x: 1100.0, y: 200.0 });
    for _ in 0..30 {
        frame(&site);
    }
    assert_ne!(surface::value(layout.hero.card, Property::RotateY), Some(0.0));

    let bottom = layout.height() - 800.0;
    for step in 1..=20 {
        site.dispatch(Event::Scroll {
            offset_y: bottom * step as f32 / 20.0,
        });
        frame(&site);
    }
    for _ in 0..200 {
        frame(&site);
    }

    for (&(counter, _), stat) in layout.stats.counters.iter().zip(STATS) {
        assert_eq!(surface::value(counter, Property::Counter), Some(stat.value as f32));
    }
    for &card in &layout.grid.cards {
        assert_eq!(surface::value(card, Property::Opacity), Some(1.0));
    }
    assert!(renderer.borrow().stats().frames > 0);
    assert_eq!(renderer.borrow().stats().live_buffers, 3);

    site.unmount();

    assert_eq!(listener_count(), 0);
    assert_eq!(scroll::trigger_count(), 0);
    assert_eq!(frame_callback_count(), 0);
    assert_eq!(renderer.borrow().stats().live_buffers, 0);
}

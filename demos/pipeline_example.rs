use std::time::Duration;

use nebula::input::sample_in;
use nebula::prelude::*;
use nebula::surface;

fn main() {
    env_logger::init();

    let section = surface::create_surface("section", Rect::new(0.0, 0.0, 1280.0, 600.0));
    let card = surface::create_child(section, "card", Rect::new(760.0, 80.0, 380.0, 420.0));

    // Tilt the card toward the pointer while it is over the section
    let teardown = mount(Some(section), |section| {
        let tilt = TiltMapper::new(12.0);
        add_listener(
            ListenTarget::Surface(section),
            EventKind::PointerMove,
            Handler::new(move |event| {
                let Some((x, y)) = event.position() else {
                    return;
                };
                if let Some(sample) = sample_in(section, x, y) {
                    let target = tilt.map(sample);
                    let ease = Transition::new(400.0, TimingFunction::EaseOutCubic);
                    animate(card, Property::RotateX, target.rotate_x, ease.clone());
                    animate(card, Property::RotateY, target.rotate_y, ease);
                }
            }),
        );
        on_cleanup(|| println!("section released"));
    });

    let path = [(200.0, 100.0), (640.0, 300.0), (1200.0, 550.0), (1400.0, 900.0)];
    let mut now = Duration::ZERO;
    for (x, y) in path {
        dispatch(Event::PointerMove { x, y });
        for _ in 0..10 {
            now += Duration::from_millis(16);
            advance(now);
        }
        println!(
            "pointer ({:>6.1}, {:>5.1}) -> rotate-x {:>6.2}, rotate-y {:>6.2}",
            x,
            y,
            surface::value(card, Property::RotateX).unwrap_or_default(),
            surface::value(card, Property::RotateY).unwrap_or_default(),
        );
    }

    teardown.run();
}

use std::time::Duration;

use nebula::animation::{AnimationState, Follower};
use nebula::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Animatable)]
struct Glow {
    shift: f32,
    strength: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Animatable)]
struct Position([f32; 3]);

#[test]
fn test_named_fields_interpolate_independently() {
    let from = Glow {
        shift: 0.0,
        strength: 1.0,
    };
    let to = Glow {
        shift: 90.0,
        strength: 0.0,
    };
    assert_eq!(
        Glow::lerp(&from, &to, 0.5),
        Glow {
            shift: 45.0,
            strength: 0.5
        }
    );
}

#[test]
fn test_tuple_struct_interpolates() {
    let mid = Position::lerp(&Position([0.0, 0.0, 6.0]), &Position([2.0, -2.0, 3.0]), 0.5);
    assert_eq!(mid, Position([1.0, -1.0, 4.5]));
}

#[test]
fn test_derived_type_drives_animation_state() {
    let from = Glow {
        shift: 0.0,
        strength: 0.0,
    };
    let to = Glow {
        shift: 100.0,
        strength: 2.0,
    };
    let mut state = AnimationState::new(
        from,
        to,
        Transition::new(100.0, TimingFunction::Linear),
        Duration::ZERO,
    );
    state.advance(Duration::from_millis(100));
    assert_eq!(*state.current(), to);
    assert!(!state.is_animating());
}

#[test]
fn test_derived_tilt_follows() {
    let mut follower = Follower::new(Tilt::default(), 0.5);
    follower.set_target(Tilt {
        rotate_x: 4.0,
        rotate_y: -8.0,
    });
    follower.step();
    assert_eq!(
        *follower.current(),
        Tilt {
            rotate_x: 2.0,
            rotate_y: -4.0
        }
    );
}

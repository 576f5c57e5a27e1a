//! Maps held directions to player velocity and animation

use crate::animation::Clip;
use crate::config::RulesConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Steering {
    pub vx: f64,
    /// Vertical velocity to apply this frame, only when jumping
    pub vy: Option<f64>,
    pub clip: Clip,
    /// Keep the running clip's frame instead of restarting it
    pub ignore_if_playing: bool,
}

/// Left wins when both directions are held. Jumping needs ground contact.
pub fn steer(input: &InputState, grounded: bool, rules: &RulesConfig) -> Steering {
    let (vx, clip, ignore_if_playing) = if input.left {
        (-rules.run_speed, Clip::Left, true)
    } else if input.right {
        (rules.run_speed, Clip::Right, true)
    } else {
        (0.0, Clip::Turn, false)
    };

    let vy = (input.up && grounded).then_some(-rules.jump_speed);

    Steering {
        vx,
        vy,
        clip,
        ignore_if_playing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn rules() -> RulesConfig {
        GameConfig::default().rules
    }

    #[test]
    fn no_input_idles() {
        let s = steer(&InputState::default(), true, &rules());
        assert_eq!(s.vx, 0.0);
        assert_eq!(s.vy, None);
        assert_eq!(s.clip, Clip::Turn);
    }

    #[test]
    fn running_sets_fixed_speed() {
        let left = InputState {
            left: true,
            ..Default::default()
        };
        let right = InputState {
            right: true,
            ..Default::default()
        };
        assert_eq!(steer(&left, false, &rules()).vx, -160.0);
        assert_eq!(steer(&left, false, &rules()).clip, Clip::Left);
        assert_eq!(steer(&right, false, &rules()).vx, 160.0);
        assert_eq!(steer(&right, false, &rules()).clip, Clip::Right);
    }

    #[test]
    fn jump_only_from_the_ground() {
        let up = InputState {
            up: true,
            ..Default::default()
        };
        assert_eq!(steer(&up, true, &rules()).vy, Some(-330.0));
        assert_eq!(steer(&up, false, &rules()).vy, None);
    }
}

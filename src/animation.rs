//! Spritesheet animation clips for the player

use std::collections::HashMap;

use crate::components::Animator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Clip {
    Left,
    /// Facing the camera, used while idle
    Turn,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClipSpec {
    pub frames: Vec<u32>,
    pub frame_rate: f64,
    pub repeat: bool,
}

impl ClipSpec {
    pub fn range(start: u32, end: u32, frame_rate: f64, repeat: bool) -> Self {
        Self {
            frames: (start..=end).collect(),
            frame_rate,
            repeat,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Animations {
    clips: HashMap<Clip, ClipSpec>,
}

impl Animations {
    /// Walk cycles for a 9-frame sheet: 0-3 left, 4 idle, 5-8 right
    pub fn player() -> Self {
        let mut anims = Self::default();
        anims.insert(Clip::Left, ClipSpec::range(0, 3, 10.0, true));
        anims.insert(Clip::Turn, ClipSpec::range(4, 4, 20.0, false));
        anims.insert(Clip::Right, ClipSpec::range(5, 8, 10.0, true));
        anims
    }

    pub fn insert(&mut self, clip: Clip, spec: ClipSpec) {
        self.clips.insert(clip, spec);
    }

    pub fn get(&self, clip: Clip) -> Option<&ClipSpec> {
        self.clips.get(&clip)
    }

    /// Spritesheet frame the animator is currently showing
    pub fn frame(&self, animator: &Animator) -> u32 {
        self.get(animator.clip)
            .and_then(|spec| spec.frames.get(animator.index).copied())
            .unwrap_or(0)
    }

    pub fn advance(&self, animator: &mut Animator, dt: f64) {
        let Some(spec) = self.get(animator.clip) else {
            return;
        };

        if spec.frames.len() < 2 || spec.frame_rate <= 0.0 {
            return;
        }

        let step = 1.0 / spec.frame_rate;
        animator.elapsed += dt;

        while animator.elapsed >= step {
            animator.elapsed -= step;

            if animator.index + 1 < spec.frames.len() {
                animator.index += 1;
            } else if spec.repeat {
                animator.index = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_cycle_loops() {
        let anims = Animations::player();
        let mut animator = Animator::new(Clip::Right);
        assert_eq!(anims.frame(&animator), 5);

        anims.advance(&mut animator, 0.35);
        assert_eq!(anims.frame(&animator), 8);

        anims.advance(&mut animator, 0.1);
        assert_eq!(anims.frame(&animator), 5);
    }

    #[test]
    fn idle_clip_holds_a_single_frame() {
        let anims = Animations::player();
        let mut animator = Animator::new(Clip::Turn);
        anims.advance(&mut animator, 5.0);
        assert_eq!(anims.frame(&animator), 4);
    }

    #[test]
    fn play_keeps_frame_when_ignoring_repeat_requests() {
        let anims = Animations::player();
        let mut animator = Animator::new(Clip::Left);
        anims.advance(&mut animator, 0.15);
        assert_eq!(animator.index, 1);

        animator.play(Clip::Left, true);
        assert_eq!(animator.index, 1);

        animator.play(Clip::Turn, false);
        assert_eq!(anims.frame(&animator), 4);
    }
}

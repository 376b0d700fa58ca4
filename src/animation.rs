use bevy::prelude::*;

/// Degrees of rotation per second of animation.
pub const DEGREES_PER_SECOND: f32 = 100.;

/// Frame counter driving the terrain spin. Speed is tied to the display
/// refresh rate so a full turn takes the same wall time on every monitor.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameAnimator {
    frame: u64,
}

impl FrameAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advances one frame and returns the new frame index.
    pub fn tick(&mut self) -> u64 {
        self.frame = self.frame.wrapping_add(1);
        self.frame
    }

    pub fn rotation_angle(&self, refresh_rate_hz: f32) -> f32 {
        DEGREES_PER_SECOND * self.frame as f32 / refresh_rate_hz
    }

    /// Rotation about the vertical axis for the current frame.
    pub fn rotation(&self, refresh_rate_hz: f32) -> Quat {
        Quat::from_rotation_y(self.rotation_angle(refresh_rate_hz).to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_starts_at_zero() {
        let animator = FrameAnimator::new();
        assert_eq!(animator.frame(), 0);
        assert_eq!(animator.rotation_angle(60.), 0.);
        assert_eq!(animator.rotation(60.), Quat::IDENTITY);
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(1000)]
    fn test_tick_counts_frames(#[case] n: u64) {
        let mut animator = FrameAnimator::new();
        let mut last = 0;
        for _ in 0..n {
            last = animator.tick();
        }
        assert_eq!(last, n);
        assert_eq!(animator.frame(), n);
    }

    #[rstest]
    #[case(60, 60., 100.)]
    #[case(30, 60., 50.)]
    #[case(144, 144., 100.)]
    #[case(90, 30., 300.)]
    fn test_rotation_angle(#[case] ticks: u64, #[case] hz: f32, #[case] expected: f32) {
        let mut animator = FrameAnimator::new();
        for _ in 0..ticks {
            animator.tick();
        }
        assert_eq!(animator.rotation_angle(hz), expected);
    }

    #[test]
    fn test_rotation_turns_about_y() {
        let mut animator = FrameAnimator::new();
        for _ in 0..54 {
            animator.tick();
        }
        // 100 * 54 / 60 = 90 degrees
        let turned = animator.rotation(60.) * Vec3::X;
        assert!((turned - Vec3::NEG_Z).length() < 1e-5, "got {:?}", turned);
    }

    #[test]
    fn test_counter_wraps_instead_of_panicking() {
        let mut animator = FrameAnimator { frame: u64::MAX };
        assert_eq!(animator.tick(), 0);
    }
}

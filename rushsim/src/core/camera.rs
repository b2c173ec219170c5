use crate::core::vehicle::VehicleState;
use helpers::general::{lerp, lerp_angle_deg};

const SMOOTHING_FACTOR: f64 = 0.08;

/// Follow camera for the chase and first-person views. Position and heading are exponentially
/// interpolated toward the live vehicle each tick, which decouples the display from the raw
/// (possibly jittery) car heading during skids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
}

impl CameraState {
    /// at snaps the camera onto the vehicle.
    pub fn at(st: &VehicleState) -> CameraState {
        CameraState {
            x: st.x,
            y: st.y,
            heading_deg: st.heading_deg,
        }
    }

    /// follow moves the camera toward the target by the smoothing fraction for this tick.
    /// Heading interpolation takes the shortest angular path across the +/-180 boundary.
    pub fn follow(&mut self, target: &VehicleState, dt_norm: f64) {
        let t = (SMOOTHING_FACTOR * dt_norm).min(1.0);
        self.x = lerp(self.x, target.x, t);
        self.y = lerp(self.y, target.y, t);
        self.heading_deg = lerp_angle_deg(self.heading_deg, target.heading_deg, t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn target(x: f64, y: f64, heading_deg: f64) -> VehicleState {
        VehicleState {
            x,
            y,
            speed: 0.0,
            heading_deg,
            is_skidding: false,
        }
    }

    #[test]
    fn camera_converges_on_a_static_target() {
        let mut camera = CameraState {
            x: 0.0,
            y: 0.0,
            heading_deg: 0.0,
        };
        let target = target(100.0, 50.0, 45.0);

        for _ in 0..200 {
            camera.follow(&target, 1.0);
        }

        assert_abs_diff_eq!(camera.x, 100.0, epsilon = 0.01);
        assert_abs_diff_eq!(camera.y, 50.0, epsilon = 0.01);
        assert_abs_diff_eq!(camera.heading_deg, 45.0, epsilon = 0.01);
    }

    #[test]
    fn one_follow_step_moves_by_the_smoothing_fraction() {
        let mut camera = CameraState {
            x: 0.0,
            y: 0.0,
            heading_deg: 0.0,
        };
        camera.follow(&target(100.0, 0.0, 0.0), 1.0);
        assert_relative_eq!(camera.x, 8.0);
    }

    #[test]
    fn heading_interpolates_across_the_wrap_boundary() {
        let mut camera = CameraState {
            x: 0.0,
            y: 0.0,
            heading_deg: 170.0,
        };
        camera.follow(&target(0.0, 0.0, -170.0), 1.0);

        // moving toward -170 the short way passes through 180, not back through 0
        assert!(camera.heading_deg > 170.0);
        assert_relative_eq!(camera.heading_deg, 171.6);
    }

    #[test]
    fn large_delta_time_is_clamped() {
        let mut camera = CameraState {
            x: 0.0,
            y: 0.0,
            heading_deg: 0.0,
        };
        // 0.08 * 20 > 1 would overshoot without the clamp
        camera.follow(&target(100.0, 0.0, 0.0), 20.0);
        assert_relative_eq!(camera.x, 100.0);
    }
}

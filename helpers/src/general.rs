/// lerp returns the linear interpolation between a and b at fraction t.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// wrap_angle_deg wraps an angle in degrees into the interval [-180.0, 180.0).
pub fn wrap_angle_deg(angle: f64) -> f64 {
    let mut wrapped = (angle + 180.0) % 360.0;
    if wrapped < 0.0 {
        wrapped += 360.0;
    }
    wrapped - 180.0
}

/// lerp_angle_deg interpolates between two angles in degrees along the shortest angular path,
/// i.e., interpolating between 170 and -170 passes through 180 instead of 0.
pub fn lerp_angle_deg(a: f64, b: f64, t: f64) -> f64 {
    let mut b = b;
    let delta = b - a;
    if delta > 180.0 {
        b -= 360.0;
    } else if delta < -180.0 {
        b += 360.0;
    }
    a + (b - a) * t
}

/// argmin returns the index of the minimum value in the array x. If the minimum occurs more than
/// once, the index of its first occurrence is returned.
pub fn argmin<T: std::cmp::PartialOrd + std::marker::Copy>(x: &[T]) -> usize {
    let mut idx_min = 0;
    let mut val_min = x[0];

    for (i, &val) in x.iter().enumerate().skip(1) {
        if val < val_min {
            val_min = val;
            idx_min = i;
        }
    }

    idx_min
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lerp_interpolates_linearly() {
        assert_relative_eq!(lerp(0.0, 10.0, 0.25), 2.5);
        assert_relative_eq!(lerp(-5.0, 5.0, 0.5), 0.0);
        assert_relative_eq!(lerp(3.0, 3.0, 0.9), 3.0);
    }

    #[test]
    fn wrap_angle_deg_stays_in_range() {
        assert_relative_eq!(wrap_angle_deg(0.0), 0.0);
        assert_relative_eq!(wrap_angle_deg(-90.0), -90.0);
        assert_relative_eq!(wrap_angle_deg(190.0), -170.0);
        assert_relative_eq!(wrap_angle_deg(-190.0), 170.0);
        assert_relative_eq!(wrap_angle_deg(-450.0), -90.0);
        assert_relative_eq!(wrap_angle_deg(720.0), 0.0);
    }

    #[test]
    fn lerp_angle_deg_takes_shortest_path() {
        // crossing the +/-180 boundary
        assert_relative_eq!(lerp_angle_deg(170.0, -170.0, 0.5), 180.0);
        assert_relative_eq!(lerp_angle_deg(-170.0, 170.0, 0.5), -180.0);
        // no boundary crossing
        assert_relative_eq!(lerp_angle_deg(10.0, 30.0, 0.5), 20.0);
    }

    #[test]
    fn argmin_returns_first_minimum() {
        assert_eq!(argmin(&[65000.0, 58000.0, 70000.0]), 1);
        assert_eq!(argmin(&[1.0, 1.0, 2.0]), 0);
        assert_eq!(argmin(&[3]), 0);
    }
}

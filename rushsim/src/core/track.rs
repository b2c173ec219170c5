use serde::Deserialize;

/// * `center` - (px) Track center point [x, y]
/// * `outer_radii` - (px) Outer ellipse radii [rx, ry]
/// * `inner_radii` - (px) Inner ellipse radii [rx, ry], infield boundary
/// * `finish_x` - (px) Finish-line x band [start, end]
/// * `finish_y` - (px) Finish-line y range [start, end]
/// * `checkpoint_x` - (px) Crossing below this x coordinate arms the checkpoint
/// * `tot_no_laps` - Total number of laps in a race
/// * `start_pos` - (px) Start position of the car [x, y]
/// * `start_heading_deg` - (deg) Start heading of the car
#[derive(Debug, Deserialize, Clone)]
pub struct TrackPars {
    pub center: [f64; 2],
    pub outer_radii: [f64; 2],
    pub inner_radii: [f64; 2],
    pub finish_x: [f64; 2],
    pub finish_y: [f64; 2],
    pub checkpoint_x: f64,
    pub tot_no_laps: u32,
    pub start_pos: [f64; 2],
    pub start_heading_deg: f64,
}

impl Default for TrackPars {
    fn default() -> Self {
        TrackPars {
            center: [400.0, 250.0],
            outer_radii: [350.0, 200.0],
            inner_radii: [250.0, 100.0],
            finish_x: [525.0, 545.0],
            finish_y: [150.0, 350.0],
            checkpoint_x: 350.0,
            tot_no_laps: 3,
            start_pos: [525.0, 400.0],
            start_heading_deg: -90.0,
        }
    }
}

/// TrackGeometry answers the pure geometry queries of the ellipse-annulus track: whether a point
/// is on the drivable ring, whether it is inside the finish band, the angular lap progress, and
/// the tangent heading used by the steering assist. Immutable for the session lifetime.
#[derive(Debug, Clone)]
pub struct TrackGeometry {
    center: [f64; 2],
    outer_radii: [f64; 2],
    inner_radii: [f64; 2],
    finish_x: [f64; 2],
    finish_y: [f64; 2],
    checkpoint_x: f64,
    pub tot_no_laps: u32,
    pub start_pos: [f64; 2],
    pub start_heading_deg: f64,
}

impl TrackGeometry {
    pub fn new(pars: &TrackPars) -> TrackGeometry {
        TrackGeometry {
            center: pars.center,
            outer_radii: pars.outer_radii,
            inner_radii: pars.inner_radii,
            finish_x: pars.finish_x,
            finish_y: pars.finish_y,
            checkpoint_x: pars.checkpoint_x,
            tot_no_laps: pars.tot_no_laps,
            start_pos: pars.start_pos,
            start_heading_deg: pars.start_heading_deg,
        }
    }

    /// is_out_of_bounds returns true if the point lies outside the outer ellipse.
    pub fn is_out_of_bounds(&self, x: f64, y: f64) -> bool {
        let dx = x - self.center[0];
        let dy = y - self.center[1];
        (dx * dx) / (self.outer_radii[0] * self.outer_radii[0])
            + (dy * dy) / (self.outer_radii[1] * self.outer_radii[1])
            > 1.0
    }

    /// is_infield returns true if the point lies inside the inner ellipse.
    pub fn is_infield(&self, x: f64, y: f64) -> bool {
        let dx = x - self.center[0];
        let dy = y - self.center[1];
        (dx * dx) / (self.inner_radii[0] * self.inner_radii[0])
            + (dy * dy) / (self.inner_radii[1] * self.inner_radii[1])
            < 1.0
    }

    /// is_off_ring returns true if the point left the drivable annulus on either side.
    pub fn is_off_ring(&self, x: f64, y: f64) -> bool {
        self.is_out_of_bounds(x, y) || self.is_infield(x, y)
    }

    /// arms_checkpoint returns true if the point is beyond the west-side checkpoint threshold.
    pub fn arms_checkpoint(&self, x: f64) -> bool {
        x < self.checkpoint_x
    }

    /// finish_band_contains returns true if the point lies inside the finish-line band.
    pub fn finish_band_contains(&self, x: f64, y: f64) -> bool {
        x > self.finish_x[0]
            && x < self.finish_x[1]
            && y > self.finish_y[0]
            && y < self.finish_y[1]
    }

    /// lap_progress_percent maps the angular position of the car around the track center to a
    /// progress value in [0, 100), with zero a quarter turn before the finish line.
    pub fn lap_progress_percent(&self, x: f64, y: f64) -> f64 {
        let angle_rad = (y - self.center[1]).atan2(x - self.center[0]);
        let mut angle_deg = angle_rad.to_degrees();
        if angle_deg < 0.0 {
            angle_deg += 360.0;
        }

        let mut adjusted = angle_deg + 90.0;
        if adjusted >= 360.0 {
            adjusted -= 360.0;
        }

        adjusted / 3.6
    }

    /// tangent_heading_deg returns the heading of the tangent to the mid-ellipse (average of
    /// inner and outer radii) at the given point. Used as the target heading by the steering
    /// assist of a forward-moving car.
    pub fn tangent_heading_deg(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.center[0];
        let dy = y - self.center[1];

        let avg_rx = (self.outer_radii[0] + self.inner_radii[0]) / 2.0;
        let avg_ry = (self.outer_radii[1] + self.inner_radii[1]) / 2.0;

        // dy == 0 yields an infinite slope and atan resolves it to +/-90 deg
        let tangent_slope = -(avg_ry * avg_ry * dx) / (avg_rx * avg_rx * dy);
        let mut target = tangent_slope.atan().to_degrees();

        if dy > 0.0 {
            target += 180.0;
        }

        target
    }
}

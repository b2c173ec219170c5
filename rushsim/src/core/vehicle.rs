use crate::core::track::TrackGeometry;
use crate::interfaces::input::TickInput;
use helpers::general::wrap_angle_deg;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One simulation tick corresponds to this many milliseconds at the 60 Hz baseline.
pub const TICK_BASELINE_MS: f64 = 16.67;

/// Internal speed units at the reference top speed.
pub const MAX_INTERNAL_SPEED: f64 = 5.0;

/// The configured top speed (km/h) that maps to MAX_INTERNAL_SPEED.
pub const REFERENCE_TOP_SPEED_KMH: f64 = 240.0;

const MAX_REVERSE_SPEED: f64 = -2.0;
const FRICTION: f64 = 0.97;
const SPEED_EPSILON: f64 = 0.01;
const JOYSTICK_SCALE: f64 = 50.0;
const JOYSTICK_TURN_FACTOR: f64 = 0.5;
const JOYSTICK_TURN_THRESHOLD: f64 = 0.2;
const SKID_SPEED_FRACTION: f64 = 0.6;
const SKID_CHANCE_FACTOR: f64 = 0.1;
const SKID_DURATION_MS: f64 = 300.0;
const SKID_STEER_DAMPEN: f64 = 0.5;
const ASSIST_MIN_SPEED: f64 = 0.5;
const ASSIST_STRENGTH: f64 = 0.03;
const REAR_WHEEL_LATERAL_OFFSET: f64 = 5.0;
const REAR_WHEEL_LONGITUDINAL_OFFSET: f64 = 10.0;

/// * `x`, `y` - (px) World position
/// * `speed` - Signed speed in internal units, negative while reversing
/// * `heading_deg` - (deg) Heading, wrapped into [-180, 180)
/// * `is_skidding` - True while the skid state is active
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub heading_deg: f64,
    pub is_skidding: bool,
}

impl VehicleState {
    /// at_start returns the vehicle resting at the track's start pose.
    pub fn at_start(track: &TrackGeometry) -> VehicleState {
        VehicleState {
            x: track.start_pos[0],
            y: track.start_pos[1],
            speed: 0.0,
            heading_deg: track.start_heading_deg,
            is_skidding: false,
        }
    }
}

/// Ephemeral visual marker left behind by the rear wheels while skidding. Consumed and
/// acknowledged by the display layer.
#[derive(Debug, Clone, Copy)]
pub struct TireMark {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// * `steering_sensitivity` - (deg/tick) Turn rate at full lock
/// * `acceleration` - Speed gain per tick while accelerating
/// * `brake_strength` - Speed loss per tick while braking
/// * `tire_grip` - Grip factor in [0, 1], lower grip skids earlier
/// * `max_speed_kmh` - (km/h) Configured top speed, scales the internal speed clamp linearly
/// * `auto_accelerate` - Accelerate without input (touch-friendly assist)
/// * `steering_assist` - Nudge the heading toward the track tangent
/// * `color` - CSS color string of the car body, parsed for the display layer
#[derive(Debug, Deserialize, Clone)]
pub struct VehiclePars {
    pub steering_sensitivity: f64,
    pub acceleration: f64,
    pub brake_strength: f64,
    pub tire_grip: f64,
    pub max_speed_kmh: f64,
    pub auto_accelerate: bool,
    pub steering_assist: bool,
    pub color: String,
}

impl Default for VehiclePars {
    fn default() -> Self {
        VehiclePars {
            steering_sensitivity: 2.5,
            acceleration: 0.1,
            brake_strength: 0.2,
            tire_grip: 0.8,
            max_speed_kmh: 240.0,
            auto_accelerate: false,
            steering_assist: false,
            color: "#ff4136".to_string(),
        }
    }
}

/// StepReport carries the per-tick side products of the kinematics step.
#[derive(Debug, Default)]
pub struct StepReport {
    /// True while forward thrust is applied and the car moves forward (drives exhaust effects).
    pub accelerating: bool,
    /// Rear-wheel positions where tire marks were emitted this tick.
    pub tire_marks: Vec<[f64; 2]>,
}

/// Kinematics advances the live VehicleState once per tick from control inputs, friction, grip
/// and the optional steering assist. All cross-tick skid state lives here as tick-counted expiry
/// fields, so the step is deterministic for a given RNG seed and input trace.
#[derive(Debug)]
pub struct Kinematics {
    pars: VehiclePars,
    skid_ticks_remaining: u32,
    rng: StdRng,
}

impl Kinematics {
    pub fn new(pars: VehiclePars, rng: StdRng) -> Kinematics {
        Kinematics {
            pars,
            skid_ticks_remaining: 0,
            rng,
        }
    }

    pub fn pars(&self) -> &VehiclePars {
        &self.pars
    }

    /// max_internal_speed returns the forward speed clamp in internal units.
    pub fn max_internal_speed(&self) -> f64 {
        self.pars.max_speed_kmh / REFERENCE_TOP_SPEED_KMH * MAX_INTERNAL_SPEED
    }

    /// speed_to_kmh converts a signed internal speed to the displayed km/h value.
    pub fn speed_to_kmh(&self, speed: f64) -> f64 {
        speed.abs() * self.pars.max_speed_kmh / MAX_INTERNAL_SPEED
    }

    /// step advances the vehicle by one tick. dt_norm is the elapsed real time normalized to the
    /// 60 Hz baseline (1.0 for a full 16.67 ms tick).
    pub fn step(
        &mut self,
        st: &mut VehicleState,
        input: &TickInput,
        track: &TrackGeometry,
        dt_norm: f64,
    ) -> StepReport {
        let mut report = StepReport::default();
        let max_forward_speed = self.max_internal_speed();
        let joystick = input.active_joystick();
        let controls = &input.controls;

        // acceleration and braking
        if let Some(joystick) = joystick {
            let stick_rad = joystick.angle_deg.to_radians();
            let forward_component = stick_rad.cos();
            let deflection = joystick.distance / JOYSTICK_SCALE;

            if forward_component > 0.0 {
                let acceleration = self.pars.acceleration * forward_component * deflection;
                st.speed = (st.speed + acceleration).min(max_forward_speed);
                report.accelerating = true;
            } else {
                let braking = self.pars.brake_strength * -forward_component * deflection;
                st.speed = (st.speed - braking).max(MAX_REVERSE_SPEED);
            }
        } else {
            if self.pars.auto_accelerate || controls.accelerate {
                st.speed = (st.speed + self.pars.acceleration).min(max_forward_speed);
                report.accelerating = true;
            }
            if controls.brake {
                st.speed = (st.speed - self.pars.brake_strength).max(MAX_REVERSE_SPEED);
            }
        }

        st.speed *= FRICTION;
        if st.speed.abs() < SPEED_EPSILON {
            st.speed = 0.0;
        }
        report.accelerating = report.accelerating && st.speed > 0.0;

        // steering; the turn direction flips while reversing so "left" stays intuitive
        let mut is_turning = false;
        if st.speed != 0.0 {
            let flip = if st.speed > 0.0 { 1.0 } else { -1.0 };
            let steer_scale = if st.is_skidding {
                1.0 - SKID_STEER_DAMPEN
            } else {
                1.0
            };

            if let Some(joystick) = joystick {
                let stick_rad = joystick.angle_deg.to_radians();
                let turn_component = stick_rad.sin();
                let turn_amount = turn_component * (joystick.distance / JOYSTICK_SCALE);
                st.heading_deg += self.pars.steering_sensitivity
                    * turn_amount
                    * flip
                    * JOYSTICK_TURN_FACTOR
                    * steer_scale;
                if turn_component.abs() > JOYSTICK_TURN_THRESHOLD {
                    is_turning = true;
                }
            } else {
                if controls.left {
                    st.heading_deg -= self.pars.steering_sensitivity * flip * steer_scale;
                    is_turning = true;
                }
                if controls.right {
                    st.heading_deg += self.pars.steering_sensitivity * flip * steer_scale;
                    is_turning = true;
                }
            }
        }

        // skid entry: fast, sharp turns under low grip
        if is_turning
            && st.speed.abs() > max_forward_speed * SKID_SPEED_FRACTION
            && !st.is_skidding
        {
            let skid_chance =
                (1.0 - self.pars.tire_grip) * (st.speed.abs() / max_forward_speed) * SKID_CHANCE_FACTOR;
            if self.rng.gen::<f64>() < skid_chance {
                st.is_skidding = true;
                self.skid_ticks_remaining = ticks_for_ms(SKID_DURATION_MS);
            }
        }

        if st.is_skidding {
            // heading wobble
            st.heading_deg += (self.rng.gen::<f64>() - 0.5) * 2.0;

            // tire marks at the rear wheel offsets, in the sprite frame (heading - 90 deg)
            let sprite_rad = (st.heading_deg - 90.0).to_radians();
            let perp_rad = sprite_rad + std::f64::consts::FRAC_PI_2;
            let (long_x, long_y) = (
                sprite_rad.cos() * REAR_WHEEL_LONGITUDINAL_OFFSET,
                sprite_rad.sin() * REAR_WHEEL_LONGITUDINAL_OFFSET,
            );
            let (lat_x, lat_y) = (
                perp_rad.cos() * REAR_WHEEL_LATERAL_OFFSET,
                perp_rad.sin() * REAR_WHEEL_LATERAL_OFFSET,
            );
            report.tire_marks.push([st.x - lat_x - long_x, st.y - lat_y - long_y]);
            report.tire_marks.push([st.x + lat_x - long_x, st.y + lat_y - long_y]);

            self.skid_ticks_remaining = self.skid_ticks_remaining.saturating_sub(1);
            if self.skid_ticks_remaining == 0 {
                st.is_skidding = false;
            }
        }

        // steering assist nudges the heading toward the track tangent
        if self.pars.steering_assist && st.speed > ASSIST_MIN_SPEED && !st.is_skidding {
            let target = track.tangent_heading_deg(st.x, st.y);
            let error = wrap_angle_deg(target - st.heading_deg);
            st.heading_deg += error * ASSIST_STRENGTH * dt_norm;
        }

        st.heading_deg = wrap_angle_deg(st.heading_deg);

        // integrate position
        let heading_rad = st.heading_deg.to_radians();
        st.x += heading_rad.cos() * st.speed * dt_norm;
        st.y += heading_rad.sin() * st.speed * dt_norm;

        report
    }
}

/// ticks_for_ms converts a wall-clock duration to the equivalent number of baseline ticks.
pub fn ticks_for_ms(ms: f64) -> u32 {
    (ms / TICK_BASELINE_MS).round() as u32
}

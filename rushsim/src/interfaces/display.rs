use crate::core::camera::CameraState;
use crate::core::collision::Spark;
use crate::core::session::SessionState;
use crate::core::vehicle::{TireMark, VehicleState};

/// Display frames are streamed at most this often (Hz) to keep the channel traffic bounded.
pub const MAX_DISPLAY_UPDATE_FREQUENCY: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// DisplayFrame carries everything the display collaborator needs for one rendered tick:
/// vehicle and camera state, the session counters, and the outstanding ephemeral events.
/// The display acknowledges sparks and tire marks by id so the core can garbage-collect them.
#[derive(Debug, Clone)]
pub struct DisplayFrame {
    pub state: SessionState,
    pub car: VehicleState,
    pub ghost: Option<VehicleState>,
    pub camera: CameraState,
    pub car_color: RgbColor,
    pub countdown: u32,
    pub current_lap: u32,
    pub tot_no_laps: u32,
    pub lap_time_ms: f64,
    pub total_time_ms: f64,
    pub best_lap_ms: Option<f64>,
    pub lap_progress_pct: f64,
    pub speed_kmh: f64,
    pub max_speed_reached_kmh: f64,
    pub car_health: f64,
    pub collisions: u32,
    pub is_colliding: bool,
    pub is_accelerating: bool,
    pub sparks: Vec<Spark>,
    pub tire_marks: Vec<TireMark>,
}

use crate::core::camera::CameraState;
use crate::core::collision::{CollisionResolver, Difficulty, Spark};
use crate::core::recording::{LapBook, LapRecord, ReplayCursor};
use crate::core::track::{TrackGeometry, TrackPars};
use crate::core::vehicle::{
    Kinematics, TireMark, VehiclePars, VehicleState, TICK_BASELINE_MS,
};
use crate::interfaces::advisor::PerformanceSummary;
use crate::interfaces::display::{DisplayFrame, RgbColor};
use crate::interfaces::input::TickInput;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

const COUNTDOWN_SECONDS: u32 = 3;
const COUNTDOWN_HOLD_MS: f64 = 1000.0;
const FULL_HEALTH: f64 = 100.0;
const FINISH_HEADING_TOLERANCE_DEG: f64 = 10.0;

/// States of the race session. Replaying is orthogonal to the race flow: it is entered from a
/// non-racing state and only ever exits back to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Countdown,
    Racing,
    Paused,
    Finished,
    Replaying,
}

/// * `player_name` - Display name, must be non-empty to start a race
/// * `vehicle` - Selected vehicle model, must be present to start a race
/// * `difficulty` - Difficulty tier (collision damage)
/// * `vehicle_pars` - Vehicle tuning parameters
/// * `track_pars` - Track geometry parameters
/// * `rng_seed` - Optional seed for the skid RNG; omit for a random seed
#[derive(Debug, Deserialize, Clone)]
pub struct SessionPars {
    pub player_name: String,
    pub vehicle: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub vehicle_pars: VehiclePars,
    #[serde(default)]
    pub track_pars: TrackPars,
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for SessionPars {
    fn default() -> Self {
        SessionPars {
            player_name: String::new(),
            vehicle: None,
            difficulty: Difficulty::default(),
            vehicle_pars: VehiclePars::default(),
            track_pars: TrackPars::default(),
            rng_seed: None,
        }
    }
}

/// RaceSession is the single aggregate owning all mutable per-race state: the live vehicle, the
/// follow camera, the lap book, the tick-counted expiry flags and every session counter. It is
/// advanced by exactly one driver at a time; the simulation tick and the replay tick are mutually
/// exclusive through the state machine.
#[derive(Debug)]
pub struct RaceSession {
    pars: SessionPars,
    track: TrackGeometry,
    kinematics: Kinematics,
    collision: CollisionResolver,
    state: SessionState,

    car: VehicleState,
    camera: CameraState,
    recording: LapBook,
    replay: Option<ReplayCursor>,
    ghost: Option<VehicleState>,

    current_lap: u32,
    lap_time_ms: f64,
    total_time_ms: f64,
    countdown_ms_remaining: f64,
    checkpoint_armed: bool,
    collisions: u32,
    car_health: f64,
    max_speed_reached_kmh: f64,
    lap_progress_pct: f64,
    is_accelerating: bool,

    sparks: Vec<Spark>,
    tire_marks: Vec<TireMark>,
    tire_mark_id_counter: u64,
}

impl RaceSession {
    pub fn new(pars: SessionPars) -> RaceSession {
        let track = TrackGeometry::new(&pars.track_pars);
        let rng = match pars.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let kinematics = Kinematics::new(pars.vehicle_pars.clone(), rng);
        let collision = CollisionResolver::new(pars.difficulty);
        let car = VehicleState::at_start(&track);
        let camera = CameraState::at(&car);

        RaceSession {
            pars,
            track,
            kinematics,
            collision,
            state: SessionState::Idle,
            car,
            camera,
            recording: LapBook::new(),
            replay: None,
            ghost: None,
            current_lap: 0,
            lap_time_ms: 0.0,
            total_time_ms: 0.0,
            countdown_ms_remaining: 0.0,
            checkpoint_armed: false,
            collisions: 0,
            car_health: FULL_HEALTH,
            max_speed_reached_kmh: 0.0,
            lap_progress_pct: 0.0,
            is_accelerating: false,
            sparks: Vec::new(),
            tire_marks: Vec::new(),
            tire_mark_id_counter: 0,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // STATE TRANSITIONS ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// start_race resets the session and enters the countdown. A request without a selected
    /// vehicle or with an empty player name is a silent no-op; the return value reports whether
    /// the race was started.
    pub fn start_race(&mut self) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }
        if self.pars.vehicle.is_none() || self.pars.player_name.is_empty() {
            return false;
        }

        self.reset();
        self.state = SessionState::Countdown;
        self.countdown_ms_remaining =
            COUNTDOWN_SECONDS as f64 * 1000.0 + COUNTDOWN_HOLD_MS;
        true
    }

    /// reset performs a full restart back to Idle: car to the start pose, all counters cleared,
    /// lap history and best lap dropped, any running replay cancelled.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.car = VehicleState::at_start(&self.track);
        self.camera = CameraState::at(&self.car);
        self.recording.clear();
        self.replay = None;
        self.ghost = None;
        self.current_lap = 0;
        self.lap_time_ms = 0.0;
        self.total_time_ms = 0.0;
        self.countdown_ms_remaining = 0.0;
        self.checkpoint_armed = false;
        self.collisions = 0;
        self.car_health = FULL_HEALTH;
        self.max_speed_reached_kmh = 0.0;
        self.lap_progress_pct = 0.0;
        self.is_accelerating = false;
        self.sparks.clear();
        self.tire_marks.clear();
        self.collision.reset();
    }

    /// reset_car_position respawns the car at the start pose without touching the race clocks
    /// or the lap history. The checkpoint is disarmed so the respawn cannot shortcut a lap.
    pub fn reset_car_position(&mut self) {
        self.car = VehicleState::at_start(&self.track);
        self.camera = CameraState::at(&self.car);
        self.checkpoint_armed = false;
    }

    /// toggle_pause freezes or resumes the simulation. The time accumulators only advance inside
    /// racing ticks, so elapsed times stay continuous across a pause of any length.
    pub fn toggle_pause(&mut self) {
        match self.state {
            SessionState::Racing => self.state = SessionState::Paused,
            SessionState::Paused => self.state = SessionState::Racing,
            _ => {}
        }
    }

    /// start_replay enters the replaying state over the chosen sealed lap. Allowed from Idle and
    /// Finished; the replay only ever exits back to Idle.
    pub fn start_replay(&mut self, lap_idx: usize) -> bool {
        if self.state != SessionState::Idle && self.state != SessionState::Finished {
            return false;
        }
        let frames = match self.recording.lap(lap_idx) {
            Some(lap) => lap.frames.clone(),
            None => return false,
        };

        let cursor = ReplayCursor::new(frames);
        self.ghost = cursor.current().copied();
        self.replay = Some(cursor);
        self.state = SessionState::Replaying;
        true
    }

    /// stop_replay cancels a running replay and returns to Idle. Session counters, lap history
    /// and the best lap are left untouched.
    pub fn stop_replay(&mut self) {
        if self.state != SessionState::Replaying {
            return;
        }
        self.state = SessionState::Idle;
        self.replay = None;
        self.ghost = None;
    }

    // ---------------------------------------------------------------------------------------------
    // TICK DRIVERS --------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// tick advances the session by one simulation step of dt_ms wall-clock milliseconds.
    /// Outside Countdown and Racing this is a no-op, which freezes all accumulators while paused.
    pub fn tick(&mut self, input: &TickInput, dt_ms: f64) {
        match self.state {
            SessionState::Countdown => {
                self.countdown_ms_remaining -= dt_ms;
                if self.countdown_ms_remaining <= 0.0 {
                    self.begin_racing();
                }
            }
            SessionState::Racing => self.racing_tick(input, dt_ms),
            _ => {}
        }
    }

    /// replay_tick advances the replay cursor by one frame and auto-stops at the end of the
    /// record. Mutually exclusive with `tick` through the state machine.
    pub fn replay_tick(&mut self) {
        if self.state != SessionState::Replaying {
            return;
        }
        let frame = self.replay.as_mut().and_then(|cursor| cursor.advance().copied());
        match frame {
            Some(frame) => self.ghost = Some(frame),
            None => self.stop_replay(),
        }
    }

    fn begin_racing(&mut self) {
        self.state = SessionState::Racing;
        self.current_lap = 1;
        self.lap_time_ms = 0.0;
        self.total_time_ms = 0.0;
        self.checkpoint_armed = false;
        self.recording.discard_current();
    }

    /// One racing tick in the mandated order: kinematics, collision resolution, lap/checkpoint
    /// evaluation, frame recording, ghost lookup, camera smoothing.
    fn racing_tick(&mut self, input: &TickInput, dt_ms: f64) {
        let dt_norm = dt_ms / TICK_BASELINE_MS;
        self.lap_time_ms += dt_ms;
        self.total_time_ms += dt_ms;

        let report = self.kinematics.step(&mut self.car, input, &self.track, dt_norm);
        self.is_accelerating = report.accelerating;
        for [x, y] in report.tire_marks {
            self.tire_marks.push(TireMark {
                id: self.tire_mark_id_counter,
                x,
                y,
            });
            self.tire_mark_id_counter += 1;
        }

        let speed_kmh = self.kinematics.speed_to_kmh(self.car.speed);
        if speed_kmh > self.max_speed_reached_kmh {
            self.max_speed_reached_kmh = speed_kmh;
        }

        let outcome = self.collision.resolve(&mut self.car, &self.track);
        if outcome.collided {
            self.collisions += 1;
            self.car_health = (self.car_health - outcome.damage).max(0.0);
            if let Some(spark) = outcome.spark {
                self.sparks.push(spark);
            }
        }

        self.lap_progress_pct = self.track.lap_progress_percent(self.car.x, self.car.y);

        // checkpoint arming and lap detection
        if self.track.arms_checkpoint(self.car.x) {
            self.checkpoint_armed = true;
        }
        if self.checkpoint_armed
            && self.track.finish_band_contains(self.car.x, self.car.y)
            && heading_within_finish_tolerance(self.car.heading_deg)
        {
            self.complete_lap();
            self.checkpoint_armed = false;
        }

        // the frame crossing the finish line opens the next lap's recording
        if self.state == SessionState::Racing {
            self.recording.record_frame(self.car);
            self.ghost = self
                .recording
                .ghost_frame(self.recording.current_frame_count() - 1);
            self.camera.follow(&self.car, dt_norm);
        }
    }

    fn complete_lap(&mut self) {
        if self.current_lap > 0 && self.lap_time_ms > 0.0 {
            self.recording.seal_lap(self.lap_time_ms);
        }

        if self.current_lap + 1 > self.track.tot_no_laps {
            self.state = SessionState::Finished;
            return;
        }

        self.current_lap += 1;
        self.lap_time_ms = 0.0;
    }

    // ---------------------------------------------------------------------------------------------
    // EVENT ACKNOWLEDGMENT ------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// acknowledge_spark drops a spark that the display layer has finished animating.
    pub fn acknowledge_spark(&mut self, id: u64) {
        self.sparks.retain(|spark| spark.id != id);
    }

    /// acknowledge_tire_mark drops a tire mark that the display layer has consumed.
    pub fn acknowledge_tire_mark(&mut self, id: u64) {
        self.tire_marks.retain(|mark| mark.id != id);
    }

    // ---------------------------------------------------------------------------------------------
    // ACCESSORS -----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pars(&self) -> &SessionPars {
        &self.pars
    }

    pub fn track(&self) -> &TrackGeometry {
        &self.track
    }

    pub fn car(&self) -> &VehicleState {
        &self.car
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn ghost(&self) -> Option<&VehicleState> {
        self.ghost.as_ref()
    }

    pub fn current_lap(&self) -> u32 {
        self.current_lap
    }

    pub fn lap_time_ms(&self) -> f64 {
        self.lap_time_ms
    }

    pub fn total_time_ms(&self) -> f64 {
        self.total_time_ms
    }

    pub fn laps(&self) -> &[LapRecord] {
        self.recording.laps()
    }

    pub fn best_lap_ms(&self) -> Option<f64> {
        self.recording.best_lap_ms()
    }

    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    pub fn car_health(&self) -> f64 {
        self.car_health
    }

    pub fn max_speed_reached_kmh(&self) -> f64 {
        self.max_speed_reached_kmh
    }

    pub fn lap_progress_pct(&self) -> f64 {
        self.lap_progress_pct
    }

    pub fn speed_kmh(&self) -> f64 {
        self.kinematics.speed_to_kmh(self.car.speed)
    }

    pub fn is_colliding(&self) -> bool {
        self.collision.is_colliding()
    }

    pub fn is_accelerating(&self) -> bool {
        self.is_accelerating
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn tire_marks(&self) -> &[TireMark] {
        &self.tire_marks
    }

    /// countdown_display returns the value shown on the starting lights: 3, 2, 1, then 0 during
    /// the one-second "go" hold before racing begins.
    pub fn countdown_display(&self) -> u32 {
        if self.state != SessionState::Countdown {
            return 0;
        }
        let shown = ((self.countdown_ms_remaining - COUNTDOWN_HOLD_MS) / 1000.0).ceil();
        shown.max(0.0) as u32
    }

    /// performance_summary aggregates the session history for the difficulty advisor.
    pub fn performance_summary(&self) -> PerformanceSummary {
        let laps = self.recording.laps();
        let avg_lap_time_s = if laps.is_empty() {
            0.0
        } else {
            laps.iter().map(|lap| lap.elapsed_ms).sum::<f64>() / laps.len() as f64 / 1000.0
        };
        PerformanceSummary {
            avg_lap_time_s,
            completed_laps: laps.len() as u32,
            collisions: self.collisions,
        }
    }

    /// display_frame snapshots everything the display collaborator needs for one rendered tick.
    pub fn display_frame(&self, car_color: RgbColor) -> DisplayFrame {
        DisplayFrame {
            state: self.state,
            car: self.car,
            ghost: self.ghost,
            camera: self.camera,
            car_color,
            countdown: self.countdown_display(),
            current_lap: self.current_lap.min(self.track.tot_no_laps),
            tot_no_laps: self.track.tot_no_laps,
            lap_time_ms: self.lap_time_ms,
            total_time_ms: self.total_time_ms,
            best_lap_ms: self.best_lap_ms(),
            lap_progress_pct: self.lap_progress_pct,
            speed_kmh: self.speed_kmh(),
            max_speed_reached_kmh: self.max_speed_reached_kmh,
            car_health: self.car_health,
            collisions: self.collisions,
            is_colliding: self.is_colliding(),
            is_accelerating: self.is_accelerating,
            sparks: self.sparks.clone(),
            tire_marks: self.tire_marks.clone(),
        }
    }
}

/// heading_within_finish_tolerance checks that the wrapped heading is within +/-10 degrees of
/// the start heading's axis, rejecting finish-band crossings at shallow angles.
fn heading_within_finish_tolerance(heading_deg: f64) -> bool {
    let magnitude = heading_deg.abs();
    magnitude > 90.0 - FINISH_HEADING_TOLERANCE_DEG
        && magnitude < 90.0 + FINISH_HEADING_TOLERANCE_DEG
}

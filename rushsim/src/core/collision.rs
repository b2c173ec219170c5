use crate::core::track::TrackGeometry;
use crate::core::vehicle::{ticks_for_ms, VehicleState};
use serde::Deserialize;

const BOUNCE_FACTOR: f64 = 0.5;
const COLLIDING_FLAG_MS: f64 = 200.0;
const RETRIGGER_COOLDOWN_MS: f64 = 100.0;

/// Difficulty tier selected by the player; controls the damage taken per boundary hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl Difficulty {
    /// collision_damage returns the health points lost per boundary violation.
    pub fn collision_damage(self) -> f64 {
        match self {
            Difficulty::Easy => 10.0,
            Difficulty::Medium => 15.0,
            Difficulty::Hard => 25.0,
        }
    }
}

/// Ephemeral visual marker emitted at the impact point. Consumed and acknowledged by the
/// display layer.
#[derive(Debug, Clone, Copy)]
pub struct Spark {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// CollisionOutcome reports what a single resolution step did to the session.
#[derive(Debug, Default)]
pub struct CollisionOutcome {
    pub collided: bool,
    pub damage: f64,
    pub spark: Option<Spark>,
}

/// CollisionResolver tests the integrated position against the drivable annulus and applies the
/// bounce response. The "colliding" visual flag and its re-trigger cooldown are tick-counted so
/// no wall-clock timers are involved.
#[derive(Debug)]
pub struct CollisionResolver {
    difficulty: Difficulty,
    colliding_ticks_remaining: u32,
    cooldown_ticks_remaining: u32,
    spark_id_counter: u64,
}

impl CollisionResolver {
    pub fn new(difficulty: Difficulty) -> CollisionResolver {
        CollisionResolver {
            difficulty,
            colliding_ticks_remaining: 0,
            cooldown_ticks_remaining: 0,
            spark_id_counter: 0,
        }
    }

    /// is_colliding returns true while the short-lived collision flag is raised.
    pub fn is_colliding(&self) -> bool {
        self.colliding_ticks_remaining > 0
    }

    /// reset clears the transient flags but keeps the spark id counter monotonic.
    pub fn reset(&mut self) {
        self.colliding_ticks_remaining = 0;
        self.cooldown_ticks_remaining = 0;
    }

    /// resolve expires the transient flags by one tick, then checks the vehicle position against
    /// the track. On a violation the speed is reflected and damped, a spark is emitted and the
    /// collision flag is raised unless the re-trigger cooldown is still running. Damage is
    /// reported for the session to apply; sustained contact damages every tick.
    pub fn resolve(&mut self, st: &mut VehicleState, track: &TrackGeometry) -> CollisionOutcome {
        self.colliding_ticks_remaining = self.colliding_ticks_remaining.saturating_sub(1);
        self.cooldown_ticks_remaining = self.cooldown_ticks_remaining.saturating_sub(1);

        if !track.is_off_ring(st.x, st.y) {
            return CollisionOutcome::default();
        }

        st.speed = -st.speed * BOUNCE_FACTOR;

        let spark = Spark {
            id: self.spark_id_counter,
            x: st.x,
            y: st.y,
        };
        self.spark_id_counter += 1;

        if self.cooldown_ticks_remaining == 0 {
            self.colliding_ticks_remaining = ticks_for_ms(COLLIDING_FLAG_MS);
            self.cooldown_ticks_remaining = ticks_for_ms(RETRIGGER_COOLDOWN_MS);
        }

        CollisionOutcome {
            collided: true,
            damage: self.difficulty.collision_damage(),
            spark: Some(spark),
        }
    }
}

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// * `avg_lap_time_s` - (s) Average lap time over the sealed laps, 0.0 if none were completed
/// * `completed_laps` - Number of sealed laps
/// * `collisions` - Number of boundary violations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub avg_lap_time_s: f64,
    pub completed_laps: u32,
    pub collisions: u32,
}

impl PerformanceSummary {
    /// validate rejects out-of-range values locally, before any remote call is made. The counter
    /// fields are unsigned and cannot go negative by construction, so only the lap time needs a
    /// range check.
    pub fn validate(&self) -> Result<()> {
        if !self.avg_lap_time_s.is_finite() || self.avg_lap_time_s < 0.0 {
            bail!(
                "Average lap time must be a non-negative number, got {}!",
                self.avg_lap_time_s
            );
        }
        Ok(())
    }
}

/// * `opponent_speed_multiplier` - Higher values mean faster AI opponents
/// * `opponent_aggression_factor` - Higher values mean more aggressive AI opponents
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DifficultyAdvice {
    pub opponent_speed_multiplier: f64,
    pub opponent_aggression_factor: f64,
}

/// DifficultyAdvisor is the opaque, possibly slow, possibly failing collaborator that turns a
/// performance summary into opponent tuning. The simulation core never calls it; callers consume
/// its output as configuration and must treat a failure as non-fatal.
pub trait DifficultyAdvisor {
    fn advise(&self, summary: &PerformanceSummary) -> Result<DifficultyAdvice>;
}

/// request_advice validates the summary locally and only then forwards it to the advisor.
pub fn request_advice(
    advisor: &dyn DifficultyAdvisor,
    summary: &PerformanceSummary,
) -> Result<DifficultyAdvice> {
    summary.validate()?;
    advisor.advise(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FixedAdvisor;

    impl DifficultyAdvisor for FixedAdvisor {
        fn advise(&self, _summary: &PerformanceSummary) -> Result<DifficultyAdvice> {
            Ok(DifficultyAdvice {
                opponent_speed_multiplier: 1.2,
                opponent_aggression_factor: 0.7,
            })
        }
    }

    struct FailingAdvisor;

    impl DifficultyAdvisor for FailingAdvisor {
        fn advise(&self, _summary: &PerformanceSummary) -> Result<DifficultyAdvice> {
            Err(anyhow!("remote service unavailable"))
        }
    }

    fn summary() -> PerformanceSummary {
        PerformanceSummary {
            avg_lap_time_s: 61.5,
            completed_laps: 3,
            collisions: 4,
        }
    }

    #[test]
    fn valid_summary_reaches_the_advisor() {
        let advice = request_advice(&FixedAdvisor, &summary()).unwrap();
        assert!((advice.opponent_speed_multiplier - 1.2).abs() < 1e-12);
    }

    #[test]
    fn negative_lap_time_is_rejected_locally() {
        let mut bad = summary();
        bad.avg_lap_time_s = -1.0;
        let err = request_advice(&FixedAdvisor, &bad).unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn nan_lap_time_is_rejected_locally() {
        let mut bad = summary();
        bad.avg_lap_time_s = f64::NAN;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn remote_failure_propagates_to_the_caller() {
        let err = request_advice(&FailingAdvisor, &summary()).unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }
}

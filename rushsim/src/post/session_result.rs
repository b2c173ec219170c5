use std::fmt::Write;
use std::io::Write as IoWrite;

use crate::core::session::{RaceSession, SessionState};
use crate::interfaces::advisor::PerformanceSummary;
use serde::Serialize;

/// SessionResult contains all session information that is required for post-processing the
/// results.
#[derive(Debug, Serialize, Clone)]
pub struct SessionResult {
    pub player_name: String,
    pub finished: bool,
    pub tot_no_laps: u32,
    pub laptimes_ms: Vec<f64>,
    pub best_lap_ms: Option<f64>,
    pub total_time_ms: f64,
    pub collisions: u32,
    pub final_health: f64,
    pub max_speed_reached_kmh: f64,
}

impl SessionResult {
    pub fn from_session(session: &RaceSession) -> SessionResult {
        SessionResult {
            player_name: session.pars().player_name.to_owned(),
            finished: session.state() == SessionState::Finished,
            tot_no_laps: session.track().tot_no_laps,
            laptimes_ms: session.laps().iter().map(|lap| lap.elapsed_ms).collect(),
            best_lap_ms: session.best_lap_ms(),
            total_time_ms: session.total_time_ms(),
            collisions: session.collisions(),
            final_health: session.car_health(),
            max_speed_reached_kmh: session.max_speed_reached_kmh(),
        }
    }

    /// performance_summary converts the result into the aggregate consumed by the difficulty
    /// advisor interface.
    pub fn performance_summary(&self) -> PerformanceSummary {
        let avg_lap_time_s = if self.laptimes_ms.is_empty() {
            0.0
        } else {
            self.laptimes_ms.iter().sum::<f64>() / self.laptimes_ms.len() as f64 / 1000.0
        };
        PerformanceSummary {
            avg_lap_time_s,
            completed_laps: self.laptimes_ms.len() as u32,
            collisions: self.collisions,
        }
    }

    /// print_lap_times prints the resulting lap times to the console output.
    pub fn print_lap_times(&self) {
        let mut tmp_string_laptime = String::new();

        for (lap, laptime_ms) in self.laptimes_ms.iter().enumerate() {
            let marker = match self.best_lap_ms {
                Some(best) if *laptime_ms == best => " (best)",
                _ => "",
            };
            writeln!(
                &mut tmp_string_laptime,
                "{:3}, {}{}",
                lap + 1,
                format_time(*laptime_ms),
                marker
            )
            .unwrap();
        }

        println!("RESULT: Lap times ({})", self.player_name);
        if tmp_string_laptime.is_empty() {
            println!("No laps completed");
        } else {
            print!("{}", tmp_string_laptime);
        }
        println!("RESULT: Total time {}", format_time(self.total_time_ms));
    }

    /// write_lap_times_to_file writes the lap times to a text file in output/. Returns the path
    /// to the written file.
    pub fn write_lap_times_to_file(
        &self,
        path: Option<&std::path::Path>,
    ) -> anyhow::Result<String> {
        let mut content = String::new();
        writeln!(&mut content, "RESULT: Lap times ({})", self.player_name)?;

        for (lap, laptime_ms) in self.laptimes_ms.iter().enumerate() {
            let marker = match self.best_lap_ms {
                Some(best) if *laptime_ms == best => " (best)",
                _ => "",
            };
            writeln!(
                &mut content,
                "{:3}, {}{}",
                lap + 1,
                format_time(*laptime_ms),
                marker
            )?;
        }
        writeln!(&mut content, "RESULT: Total time {}", format_time(self.total_time_ms))?;
        writeln!(&mut content, "RESULT: Collisions {}", self.collisions)?;
        writeln!(
            &mut content,
            "RESULT: Top speed {:.1} km/h",
            self.max_speed_reached_kmh
        )?;

        let out_dir = std::path::Path::new("output");
        std::fs::create_dir_all(out_dir)?;
        let out_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            out_dir.join("last_run.txt")
        };
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&out_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        Ok(out_path.to_string_lossy().into_owned())
    }
}

/// format_time renders elapsed milliseconds as MM:SS.mmm.
pub fn format_time(elapsed_ms: f64) -> String {
    let total_ms = elapsed_ms.max(0.0).round() as u64;
    let minutes = total_ms / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}.{:03}", minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn result() -> SessionResult {
        SessionResult {
            player_name: "AB".to_string(),
            finished: true,
            tot_no_laps: 3,
            laptimes_ms: vec![65000.0, 58000.0, 70000.0],
            best_lap_ms: Some(58000.0),
            total_time_ms: 193000.0,
            collisions: 2,
            final_health: 70.0,
            max_speed_reached_kmh: 231.5,
        }
    }

    #[test]
    fn format_time_renders_minutes_seconds_millis() {
        assert_eq!(format_time(0.0), "00:00.000");
        assert_eq!(format_time(999.4), "00:00.999");
        assert_eq!(format_time(58000.0), "00:58.000");
        assert_eq!(format_time(65432.1), "01:05.432");
        assert_eq!(format_time(3_600_000.0), "60:00.000");
        assert_eq!(format_time(-5.0), "00:00.000");
    }

    #[test]
    fn performance_summary_averages_the_lap_times() {
        let summary = result().performance_summary();
        assert_eq!(summary.completed_laps, 3);
        assert_eq!(summary.collisions, 2);
        assert_relative_eq!(summary.avg_lap_time_s, 193.0 / 3.0);
        assert!(summary.validate().is_ok());
    }

    #[test]
    fn empty_session_yields_a_zero_summary() {
        let result = SessionResult {
            laptimes_ms: Vec::new(),
            best_lap_ms: None,
            finished: false,
            ..result()
        };
        let summary = result.performance_summary();
        assert_eq!(summary.completed_laps, 0);
        assert_relative_eq!(summary.avg_lap_time_s, 0.0);
    }
}

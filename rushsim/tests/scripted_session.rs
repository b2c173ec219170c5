use rushsim::core::handle_session::handle_session;
use rushsim::post::session_result::SessionResult;
use rushsim::pre::read_pars::{read_scenario, Scenario};
use std::path::Path;

fn run_sample_scenario() -> anyhow::Result<SessionResult> {
    let scenario: Scenario = read_scenario(Path::new("../input/scenarios/full_throttle.json"))?;
    handle_session(
        &scenario.session_pars,
        &scenario.input_script,
        16.67,
        3000,
        false,
        None,
        1.0,
    )
}

#[test]
fn sample_scenario_runs_end_to_end() {
    let result = run_sample_scenario().unwrap();

    assert_eq!(result.player_name, "Player");
    assert_eq!(result.tot_no_laps, 3);
    assert!(result.laptimes_ms.len() <= 3);
    assert!(result.total_time_ms > 0.0);
    // the script opens with full throttle, so the car got moving
    assert!(result.max_speed_reached_kmh > 0.0);
    assert!((0.0..=100.0).contains(&result.final_health));
    if let Some(best) = result.best_lap_ms {
        assert!(result.laptimes_ms.iter().all(|&t| t >= best));
    }
}

#[test]
fn seeded_scenario_runs_are_reproducible() {
    let first = run_sample_scenario().unwrap();
    let second = run_sample_scenario().unwrap();

    assert_eq!(first.finished, second.finished);
    assert_eq!(first.total_time_ms, second.total_time_ms);
    assert_eq!(first.laptimes_ms, second.laptimes_ms);
    assert_eq!(first.best_lap_ms, second.best_lap_ms);
    assert_eq!(first.collisions, second.collisions);
    assert_eq!(first.final_health, second.final_health);
    assert_eq!(first.max_speed_reached_kmh, second.max_speed_reached_kmh);
}

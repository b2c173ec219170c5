use crate::core::session::{RaceSession, SessionPars, SessionState};
use crate::interfaces::display::{DisplayFrame, RgbColor, MAX_DISPLAY_UPDATE_FREQUENCY};
use crate::interfaces::input::{InputScript, TickInput};
use crate::post::session_result::SessionResult;
use anyhow::Context;
use css_color_parser;
use flume::Sender;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// handle_session creates and simulates a race session on the basis of the inserted parameters
/// and the scripted driver inputs, and returns the results for post-processing.
pub fn handle_session(
    session_pars: &SessionPars,
    script: &InputScript,
    timestep_ms: f64,
    max_ticks: u64,
    print_debug: bool,
    tx: Option<&Sender<DisplayFrame>>,
    realtime_factor: f64,
) -> anyhow::Result<SessionResult> {
    let mut session = RaceSession::new(session_pars.clone());

    if !session.start_race() {
        anyhow::bail!("Could not start the race, check player_name and vehicle!");
    }

    let tmp_color = session_pars
        .vehicle_pars
        .color
        .parse::<css_color_parser::Color>()
        .context("Could not parse hex color!")?;
    let car_color = RgbColor {
        r: tmp_color.r,
        g: tmp_color.g,
        b: tmp_color.b,
    };

    // check if sender was inserted -> in that case use real-time simulation for the display
    let sim_realtime = tx.is_some();
    let mut script_tick = 0u64;
    let mut total_ticks = 0u64;
    let mut t_session_update_print = 0.0;
    let mut last_printed_lap = 0u32;
    let mut t_session_update_display = 0.0;

    while session.state() != SessionState::Finished {
        if total_ticks >= max_ticks {
            println!(
                "WARNING: Tick budget of {} exhausted before the race finished!",
                max_ticks
            );
            break;
        }
        let t_start = Instant::now();

        // the countdown runs on coast input, the script starts at lights out
        let input = if session.state() == SessionState::Racing {
            let input = script.input_at(script_tick);
            script_tick += 1;
            input
        } else {
            TickInput::coast()
        };
        session.tick(&input, timestep_ms);
        total_ticks += 1;

        let racetime_s = session.total_time_ms() / 1000.0;
        if print_debug && racetime_s > t_session_update_print + 0.9999 {
            println!(
                "INFO: Simulating... Current race time is {:.3}s, current lap is {}",
                racetime_s,
                session.current_lap()
            );
            t_session_update_print = racetime_s;
        }
        if print_debug && session.current_lap() > last_printed_lap {
            println!("INFO: Player started lap {}", session.current_lap());
            last_printed_lap = session.current_lap();
        }

        if sim_realtime {
            // gate the sends on simulated wall-clock time, not race time: race time is frozen
            // during the countdown but the starting lights still have to reach the display
            let simtime_s = total_ticks as f64 * timestep_ms / 1000.0;
            if simtime_s > t_session_update_display + 1.0 / MAX_DISPLAY_UPDATE_FREQUENCY - 0.001 {
                tx.unwrap()
                    .send(session.display_frame(car_color))
                    .context("Failed to send display frame!")?;
                t_session_update_display = simtime_s;
            }

            // sleep until the time step is finished in real-time as well (calculation in ms)
            let t_sleep =
                (timestep_ms / realtime_factor) as i64 - t_start.elapsed().as_millis() as i64;

            if t_sleep > 0 {
                sleep(Duration::from_millis(t_sleep as u64));
            } else {
                println!("WARNING: Could not keep up with real-time!")
            }
        }
    }

    // after the loop finishes, send the final frame once so the display shows the end state
    if let Some(tx) = tx {
        tx.send(session.display_frame(car_color))
            .context("Failed to send final display frame!")?;
    }

    if print_debug && script_tick >= script.total_ticks() {
        println!("INFO: Input script exhausted, car coasted for the remaining ticks");
    }

    Ok(SessionResult::from_session(&session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::input::{ControlInput, ScriptSegment};

    fn session_pars() -> SessionPars {
        SessionPars {
            player_name: "AB".to_string(),
            vehicle: Some("roadster".to_string()),
            rng_seed: Some(42),
            ..SessionPars::default()
        }
    }

    fn full_throttle_script(ticks: u64) -> InputScript {
        InputScript {
            segments: vec![ScriptSegment {
                ticks,
                input: TickInput {
                    controls: ControlInput {
                        accelerate: true,
                        ..ControlInput::default()
                    },
                    joystick: None,
                },
            }],
        }
    }

    #[test]
    fn full_throttle_run_hits_the_infield_and_exhausts_the_budget() {
        // driving straight north from the start runs into the infield, so the session
        // cannot finish and ends on the tick budget
        let result = handle_session(
            &session_pars(),
            &full_throttle_script(2000),
            16.67,
            2000,
            false,
            None,
            1.0,
        )
        .unwrap();

        assert!(!result.finished);
        assert!(result.laptimes_ms.is_empty());
        assert!(result.collisions > 0);
        assert!(result.final_health < 100.0);
        assert!(result.max_speed_reached_kmh > 0.0);
        assert_eq!(result.player_name, "AB");
    }

    #[test]
    fn missing_vehicle_is_rejected() {
        let pars = SessionPars {
            vehicle: None,
            ..session_pars()
        };
        let result = handle_session(&pars, &InputScript::default(), 16.67, 100, false, None, 1.0);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_color_is_rejected() {
        let mut pars = session_pars();
        pars.vehicle_pars.color = "not-a-color".to_string();
        let result = handle_session(&pars, &InputScript::default(), 16.67, 100, false, None, 1.0);
        assert!(result.is_err());
    }

    #[test]
    fn realtime_mode_streams_display_frames() {
        let (tx, rx) = flume::unbounded();

        // the countdown takes 240 ticks at the baseline timestep before frames start flowing
        let result = handle_session(
            &session_pars(),
            &full_throttle_script(600),
            16.67,
            600,
            false,
            Some(&tx),
            16.67,
        )
        .unwrap();
        drop(tx);

        let frames: Vec<DisplayFrame> = rx.iter().collect();
        assert!(!frames.is_empty());
        assert!(!result.finished);

        // the starting lights reach the display: the stream opens with countdown frames
        // even though race time is frozen until lights out
        let countdown_frames: Vec<&DisplayFrame> = frames
            .iter()
            .filter(|frame| frame.state == SessionState::Countdown)
            .collect();
        assert!(!countdown_frames.is_empty());
        assert_eq!(frames[0].state, SessionState::Countdown);
        assert_eq!(frames[0].countdown, 3);
        assert!(countdown_frames.iter().all(|frame| frame.total_time_ms == 0.0));
        assert!(frames
            .iter()
            .any(|frame| frame.state == SessionState::Racing));

        // frames are ordered by race time and carry the parsed car color
        for pair in frames.windows(2) {
            assert!(pair[0].total_time_ms <= pair[1].total_time_ms);
        }
        let last = frames.last().unwrap();
        assert_eq!(last.tot_no_laps, 3);
        assert_eq!(last.car_color.r, 0xff);
        assert_eq!(last.car_color.g, 0x41);
        assert_eq!(last.car_color.b, 0x36);
    }
}

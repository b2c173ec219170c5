use clap::Parser;
use flume;
use rushsim::core::handle_session::handle_session;
use rushsim::core::session::{SessionPars, SessionState};
use rushsim::interfaces::input::{ControlInput, InputScript, ScriptSegment, TickInput};
use rushsim::post::session_result::format_time;
use rushsim::pre::read_pars::{read_scenario, Scenario};
use rushsim::pre::sim_opts::SimOpts;
use std::thread;
use std::time::Instant;

/// default_scenario returns a hardcoded full-throttle run used when no scenario file is given.
fn default_scenario() -> Scenario {
    Scenario {
        session_pars: SessionPars {
            player_name: "Player".to_string(),
            vehicle: Some("roadster".to_string()),
            rng_seed: Some(42),
            ..SessionPars::default()
        },
        input_script: InputScript {
            segments: vec![ScriptSegment {
                ticks: 600,
                input: TickInput {
                    controls: ControlInput {
                        accelerate: true,
                        ..ControlInput::default()
                    },
                    joystick: None,
                },
            }],
        },
    }
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    // get the scenario to simulate
    let scenario = if let Some(scenario_path) = &sim_opts.scenario_path {
        println!("INFO: Reading scenario from {:?}", scenario_path);
        read_scenario(scenario_path)?
    } else {
        println!("INFO: No scenario file provided, using the hardcoded full-throttle run");
        default_scenario()
    };

    // print session details
    println!(
        "INFO: Simulating a session for {} with a time step size of {:.2}ms",
        scenario.session_pars.player_name, sim_opts.timestep_ms
    );

    // EXECUTION -----------------------------------------------------------------------------------
    if !sim_opts.watch {
        // NON-WATCH CASE - run the session as fast as possible
        println!("INFO: Running simulation without watch mode...");
        let t_start = Instant::now();

        let result = handle_session(
            &scenario.session_pars,
            &scenario.input_script,
            sim_opts.timestep_ms,
            sim_opts.max_ticks,
            sim_opts.debug,
            None,
            1.0,
        )?;

        println!("INFO: Execution time: {}ms", t_start.elapsed().as_millis());

        result.print_lap_times();
        if !result.finished {
            println!(
                "WARNING: Session did not finish within the tick budget ({} laps completed)",
                result.laptimes_ms.len()
            );
        }

        let summary = result.performance_summary();
        println!(
            "INFO: Performance summary: {} laps, avg {:.3}s, {} collisions",
            summary.completed_laps, summary.avg_lap_time_s, summary.collisions
        );

        match result.write_lap_times_to_file(None) {
            Ok(path) => println!("INFO: Lap times written to {}", path),
            Err(e) => eprintln!("WARNING: Could not write lap times: {}", e),
        }
    } else {
        // WATCH CASE - real-time simulation with display frames printed to the console
        println!("INFO: Running simulation in watch mode...");

        // channel between the simulation thread and the display consumer
        let (tx, rx) = flume::unbounded();

        let sim_opts_thread = sim_opts.clone();
        let scenario_thread = scenario.clone();

        let sim_handle = thread::spawn(move || {
            handle_session(
                &scenario_thread.session_pars,
                &scenario_thread.input_script,
                sim_opts_thread.timestep_ms,
                sim_opts_thread.max_ticks,
                false,
                Some(&tx),
                sim_opts_thread.realtime_factor,
            )
        });

        // display consumer (must stay on the main thread)
        for frame in rx.iter() {
            match frame.state {
                SessionState::Countdown => {
                    println!("INFO: Countdown: {}", frame.countdown);
                }
                _ => {
                    println!(
                        "INFO: Lap {}/{} | lap time {} | {:5.1} km/h | health {:3.0} | progress {:5.1}%",
                        frame.current_lap,
                        frame.tot_no_laps,
                        format_time(frame.lap_time_ms),
                        frame.speed_kmh,
                        frame.car_health,
                        frame.lap_progress_pct,
                    );
                }
            }
        }

        let result = match sim_handle.join() {
            Ok(result) => result?,
            Err(_) => anyhow::bail!("Simulation thread panicked!"),
        };

        result.print_lap_times();
    }

    Ok(())
}

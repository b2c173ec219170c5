use serde::Deserialize;

/// ControlInput is the per-tick boolean map of pressed actions supplied by the input collaborator
/// (keyboard or touch buttons, already resolved through any key rebinding).
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct ControlInput {
    #[serde(default)]
    pub accelerate: bool,
    #[serde(default)]
    pub brake: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
}

/// * `angle_deg` - (deg) Polar stick angle, 0 is forward, positive clockwise
/// * `distance` - Normalized stick deflection in [0, 100]
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct JoystickSample {
    pub angle_deg: f64,
    pub distance: f64,
}

/// TickInput bundles both input modalities for one simulation tick. The joystick takes precedence
/// over the boolean controls whenever its deflection is non-zero.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct TickInput {
    #[serde(default)]
    pub controls: ControlInput,
    #[serde(default)]
    pub joystick: Option<JoystickSample>,
}

impl TickInput {
    /// coast returns an input with nothing pressed.
    pub fn coast() -> TickInput {
        TickInput::default()
    }

    /// active_joystick returns the joystick sample if it is the modality driving this tick.
    pub fn active_joystick(&self) -> Option<JoystickSample> {
        self.joystick.filter(|joystick| joystick.distance > 0.0)
    }
}

/// * `ticks` - Number of consecutive ticks this input is held
/// * `input` - The input applied during those ticks
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptSegment {
    pub ticks: u64,
    #[serde(default)]
    pub input: TickInput,
}

/// InputScript maps simulation ticks to input samples so that a session can be re-run
/// deterministically. Ticks beyond the scripted range coast.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct InputScript {
    #[serde(default)]
    pub segments: Vec<ScriptSegment>,
}

impl InputScript {
    /// total_ticks returns the number of ticks covered by the script.
    pub fn total_ticks(&self) -> u64 {
        self.segments.iter().map(|segment| segment.ticks).sum()
    }

    /// input_at returns the input for the given tick.
    pub fn input_at(&self, tick: u64) -> TickInput {
        let mut offset = 0u64;
        for segment in &self.segments {
            if tick < offset + segment.ticks {
                return segment.input;
            }
            offset += segment.ticks;
        }
        TickInput::coast()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joystick_takes_precedence_only_when_deflected() {
        let mut input = TickInput::coast();
        input.joystick = Some(JoystickSample {
            angle_deg: 0.0,
            distance: 0.0,
        });
        assert!(input.active_joystick().is_none());

        input.joystick = Some(JoystickSample {
            angle_deg: 45.0,
            distance: 60.0,
        });
        let joystick = input.active_joystick().unwrap();
        assert_eq!(joystick.distance as u32, 60);
    }

    #[test]
    fn script_lookup_walks_segments_and_coasts_past_the_end() {
        let script = InputScript {
            segments: vec![
                ScriptSegment {
                    ticks: 10,
                    input: TickInput {
                        controls: ControlInput {
                            accelerate: true,
                            ..ControlInput::default()
                        },
                        joystick: None,
                    },
                },
                ScriptSegment {
                    ticks: 5,
                    input: TickInput {
                        controls: ControlInput {
                            brake: true,
                            ..ControlInput::default()
                        },
                        joystick: None,
                    },
                },
            ],
        };

        assert_eq!(script.total_ticks(), 15);
        assert!(script.input_at(0).controls.accelerate);
        assert!(script.input_at(9).controls.accelerate);
        assert!(script.input_at(10).controls.brake);
        assert!(script.input_at(14).controls.brake);

        let past_end = script.input_at(15);
        assert!(!past_end.controls.accelerate);
        assert!(!past_end.controls.brake);
    }
}

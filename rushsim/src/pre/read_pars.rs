use crate::core::session::SessionPars;
use crate::interfaces::input::InputScript;
use anyhow::Context;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

/// Scenario is used to store the session parameters together with the scripted driver inputs.
#[derive(Debug, Deserialize, Clone)]
pub struct Scenario {
    pub session_pars: SessionPars,
    #[serde(default)]
    pub input_script: InputScript,
}

/// read_scenario reads the JSON file and decodes the JSON string into the scenario struct.
pub fn read_scenario(filepath: &Path) -> anyhow::Result<Scenario> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open scenario file {}!",
            filepath.to_str().unwrap()
        ))?;
    let scenario = serde_json::from_reader(&fh).context(format!(
        "Failed to parse scenario file {}!",
        filepath.to_str().unwrap()
    ))?;
    Ok(scenario)
}

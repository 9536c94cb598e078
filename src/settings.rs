use std::path::Path;

use config::Config;
use eyre::eyre;
use eyre::Context;
use eyre::Result;
use serde::{Deserialize, Serialize};

/// One point of the louvain parameter grid.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ParamTriple {
    pub max_level: u32,
    pub threshold: f64,
    pub resolution: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProfilerSettings {
    pub enabled: bool,
    pub command: String,
    /// arguments placed between the command and the report flag
    pub args: Vec<String>,
    /// flag that names the report file
    pub output_flag: String,
}

impl Default for ProfilerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "nsys".to_string(),
            args: vec!["profile".to_string(), "--stats=true".to_string()],
            output_flag: "--output".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunnerSettings {
    pub params: Vec<ParamTriple>,
    pub memory_modes: Vec<u32>,
    pub profiler: ProfilerSettings,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        let max_level = [50, 50, 50];
        let threshold = [1e-3, 1e-5, 1e-7];
        let resolution = [1.0, 1.0, 1.0];
        let params = max_level
            .into_iter()
            .zip(threshold)
            .zip(resolution)
            .map(|((max_level, threshold), resolution)| ParamTriple {
                max_level,
                threshold,
                resolution,
            })
            .collect();
        Self {
            params,
            memory_modes: vec![0, 1],
            profiler: ProfilerSettings::default(),
        }
    }
}

impl RunnerSettings {
    /// Layer the given config files over the built-in grid, later files win.
    pub fn new<P: AsRef<Path>>(config_files: &[P]) -> Result<Self> {
        if config_files.is_empty() {
            return Ok(Self::default());
        }
        let mut builder = Config::builder();
        for file in config_files {
            let name = file.as_ref().to_str().ok_or(eyre!("Invalid path"))?;
            builder = builder.add_source(config::File::with_name(name));
        }
        let settings = builder.build().wrap_err("cannot build Setting object")?;
        let ret: Self = settings
            .try_deserialize()
            .wrap_err("failed to deserialize")?;
        Ok(ret)
    }

    /// number of primary invocations per input file
    pub fn combinations_per_file(&self) -> usize {
        self.params.len() * self.memory_modes.len()
    }
}

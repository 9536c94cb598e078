use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    Primary,
    Profiling,
}

/// What happened to one child process.
#[derive(Serialize, Debug, Clone)]
pub struct ExecutionRecord {
    pub input: PathBuf,
    pub max_level: u32,
    pub threshold: f64,
    pub resolution: f64,
    pub memory_mode: u32,
    pub pass: Pass,
    /// `None` if the child was killed by a signal or never started
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout_file: PathBuf,
    pub elapsed_secs: f64,
}

#[derive(Serialize, Debug, Default)]
pub struct RunReport {
    pub records: Vec<ExecutionRecord>,
}

impl RunReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter().filter(|r| r.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter().filter(|r| !r.success)
    }

    pub fn save_to_file(&self, filename: &Path) -> Result<()> {
        // create dir first
        if let Some(parent) = filename.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::File::create(filename.with_extension("json"))
            .wrap_err("fail to create json file")?;
        serde_json::to_writer_pretty(&mut file, self).wrap_err("fail to write json file")?;

        let ok_list: Vec<&Path> = self.succeeded().map(|r| r.stdout_file.as_path()).collect();
        let err_list: Vec<&Path> = self.failed().map(|r| r.stdout_file.as_path()).collect();
        save_result_list(&ok_list, &err_list, filename)
    }
}

pub fn save_result_list<T: AsRef<Path> + Serialize>(
    ok_list: &[T],
    err_list: &[T],
    filename: &Path,
) -> Result<()> {
    let mut file = std::fs::File::create(filename.with_extension("ok.json"))?;
    serde_json::to_writer_pretty(&mut file, ok_list)?;
    let mut file = std::fs::File::create(filename.with_extension("err.json"))?;
    serde_json::to_writer_pretty(&mut file, err_list)?;
    Ok(())
}

use std::{
    ffi::{OsStr, OsString},
    fs,
    path::{Path, PathBuf},
    process::Command,
    time::Instant,
};

use eyre::{bail, Context, Result};
use itertools::Itertools;
use tracing::{debug, error, info, warn};

use crate::{
    result::{ExecutionRecord, Pass, RunReport},
    settings::{ParamTriple, RunnerSettings},
};

/// One cell of the grid: an input file run with one memory mode and one parameter triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub input_path: PathBuf,
    pub memory_mode: u32,
    pub params: ParamTriple,
}

impl Combination {
    pub fn input_name(&self) -> String {
        self.input_path
            .file_name()
            .unwrap_or(self.input_path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// `<input_path> <max_level> <threshold> <resolution> <memory_mode>`
    pub fn args(&self) -> Vec<OsString> {
        vec![
            self.input_path.clone().into_os_string(),
            self.params.max_level.to_string().into(),
            self.params.threshold.to_string().into(),
            self.params.resolution.to_string().into(),
            self.memory_mode.to_string().into(),
        ]
    }

    pub fn stem(&self) -> String {
        let ParamTriple {
            max_level,
            threshold,
            resolution,
        } = self.params;
        format!(
            "{}_{max_level}_{threshold}_{resolution}_mem_type_{}",
            self.input_name(),
            self.memory_mode
        )
    }

    pub fn primary_output(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.out", self.stem()))
    }

    /// passed to the profiler, which may add its own extension
    pub fn report_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}_nsys_report", self.stem()))
    }

    pub fn profile_output(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}_nsys.out", self.stem()))
    }
}

pub struct Runner<'a> {
    settings: &'a RunnerSettings,
    executable: &'a Path,
    input_dir: &'a Path,
    output_dir: &'a Path,
}

impl<'a> Runner<'a> {
    pub fn new(
        settings: &'a RunnerSettings,
        executable: &'a Path,
        input_dir: &'a Path,
        output_dir: &'a Path,
    ) -> Self {
        Self {
            settings,
            executable,
            input_dir,
            output_dir,
        }
    }

    /// regular files of the input directory, in the order the filesystem lists them
    pub fn input_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = vec![];
        for entry in fs::read_dir(self.input_dir)
            .wrap_err(format!("cannot list {:?}", self.input_dir))?
        {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            } else {
                debug!(?path, "skipping non regular file");
            }
        }
        Ok(files)
    }

    /// file, then memory mode, then parameter triple
    pub fn plan(&self, files: &[PathBuf]) -> Vec<Combination> {
        files
            .iter()
            .cartesian_product(&self.settings.memory_modes)
            .cartesian_product(&self.settings.params)
            .map(|((input_path, &memory_mode), &params)| Combination {
                input_path: input_path.clone(),
                memory_mode,
                params,
            })
            .collect_vec()
    }

    pub fn run(&self) -> Result<RunReport> {
        if !self.input_dir.is_dir() {
            error!("The input directory {:?} does not exist", self.input_dir);
            bail!("the input directory {:?} does not exist", self.input_dir);
        }
        if !self.output_dir.is_dir() {
            info!("The output directory {:?} does not exist, creating it", self.output_dir);
            fs::create_dir_all(self.output_dir)
                .wrap_err(format!("cannot create {:?}", self.output_dir))?;
            info!("The output directory is created");
        }

        let files = self.input_files()?;
        let plan = self.plan(&files);
        info!(
            files = files.len(),
            per_file = self.settings.combinations_per_file(),
            invocations = plan.len(),
            profiling = self.settings.profiler.enabled,
            "grid ready"
        );
        if plan.is_empty() && !files.is_empty() {
            warn!(
                memory_modes = self.settings.memory_modes.len(),
                params = self.settings.params.len(),
                "the parameter grid is empty, nothing will run"
            );
        }

        let mut report = RunReport::default();
        let mut current_input = None;
        for combination in &plan {
            if current_input != Some((&combination.input_path, combination.memory_mode)) {
                info!(
                    "Running the program with input file: {:?}",
                    combination.input_path
                );
                current_input = Some((&combination.input_path, combination.memory_mode));
            }
            report.records.push(self.run_primary(combination)?);
            if self.settings.profiler.enabled {
                report.records.push(self.run_profiled(combination)?);
            }
        }
        Ok(report)
    }

    fn run_primary(&self, combination: &Combination) -> Result<ExecutionRecord> {
        let args = combination.args();
        info!("{}", command_line(self.executable.as_os_str(), &args));
        let record = invoke(
            self.executable.as_os_str(),
            &args,
            combination,
            Pass::Primary,
            &combination.primary_output(self.output_dir),
        )?;
        if !record.success {
            error!(exit_code = ?record.exit_code, "{:?} failed", combination.stem());
        }
        Ok(record)
    }

    fn run_profiled(&self, combination: &Combination) -> Result<ExecutionRecord> {
        let profiler = &self.settings.profiler;
        let mut args: Vec<OsString> = profiler.args.iter().map(OsString::from).collect();
        args.push(profiler.output_flag.clone().into());
        args.push(combination.report_path(self.output_dir).into_os_string());
        args.push(self.executable.as_os_str().to_os_string());
        args.extend(combination.args());

        let program = OsString::from(&profiler.command);
        info!("Running command: {}", command_line(&program, &args));
        let record = invoke(
            &program,
            &args,
            combination,
            Pass::Profiling,
            &combination.profile_output(self.output_dir),
        )?;
        if !record.success {
            error!(exit_code = ?record.exit_code, "profiling {:?} failed", combination.stem());
            warn!("Continuing with the next combination");
        }
        Ok(record)
    }
}

/// Run the child to completion and store its stdout, whatever the exit status.
/// Only failing to write `stdout_file` is an error.
fn invoke(
    program: &OsStr,
    args: &[OsString],
    combination: &Combination,
    pass: Pass,
    stdout_file: &Path,
) -> Result<ExecutionRecord> {
    let start_time = Instant::now();
    let (exit_code, success, stdout) = match Command::new(program).args(args).output() {
        Ok(output) => {
            if !output.status.success() {
                error!("Error: {}", String::from_utf8_lossy(&output.stderr));
            }
            (output.status.code(), output.status.success(), output.stdout)
        }
        Err(e) => {
            error!("Error: cannot start {:?}: {}", program, e);
            (None, false, vec![])
        }
    };
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    fs::write(stdout_file, stdout).wrap_err(format!("fail to write {:?}", stdout_file))?;
    debug!(?stdout_file, elapsed_secs, "output saved");

    Ok(ExecutionRecord {
        input: combination.input_path.clone(),
        max_level: combination.params.max_level,
        threshold: combination.params.threshold,
        resolution: combination.params.resolution,
        memory_mode: combination.memory_mode,
        pass,
        exit_code,
        success,
        stdout_file: stdout_file.to_path_buf(),
        elapsed_secs,
    })
}

fn command_line(program: &OsStr, args: &[OsString]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(OsString::as_os_str))
        .map(OsStr::to_string_lossy)
        .join(" ")
}

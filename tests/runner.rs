#![cfg(unix)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::Mutex,
};

use eyre::Result;
use louvain_bench::{
    result::Pass,
    runner::Runner,
    settings::{ProfilerSettings, RunnerSettings},
};

// scripts are written then executed; a fork from a concurrent test could
// keep the write handle open and make exec fail with ETXTBSY
static SERIAL: Mutex<()> = Mutex::new(());

const FAKE_LOUVAIN: &str = r#"#!/bin/sh
echo "graph=$1 level=$2 threshold=$3 resolution=$4 mem=$5"
if [ "$5" = "1" ]; then
    echo "managed memory unsupported" >&2
    exit 3
fi
"#;

const FAKE_PROFILER: &str = r#"#!/bin/sh
shift 2
[ "$1" = "--output" ] || exit 64
touch "$2.nsys-rep"
shift 2
exec "$@"
"#;

fn script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, body)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

fn inputs(dir: &Path) -> Result<PathBuf> {
    let input_dir = dir.join("mtx");
    fs::create_dir_all(input_dir.join("nested"))?;
    fs::write(input_dir.join("karate.mtx"), "")?;
    fs::write(input_dir.join("dolphins.mtx"), "")?;
    Ok(input_dir)
}

fn files_in(dir: &Path) -> Result<Vec<String>> {
    let mut names = fs::read_dir(dir)?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

#[test]
fn full_grid_with_failures() -> Result<()> {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir()?;
    let louvain = script(dir.path(), "louvain", FAKE_LOUVAIN)?;
    let profiler = script(dir.path(), "nsys", FAKE_PROFILER)?;
    let input_dir = inputs(dir.path())?;
    let output_dir = dir.path().join("results");

    let settings = RunnerSettings {
        profiler: ProfilerSettings {
            command: profiler.to_string_lossy().into_owned(),
            ..Default::default()
        },
        ..Default::default()
    };
    let report = Runner::new(&settings, &louvain, &input_dir, &output_dir).run()?;

    // 2 files x 2 memory modes x 3 triples, two passes each
    assert_eq!(report.records.len(), 24);
    assert_eq!(report.failed().count(), 12);
    assert!(report
        .failed()
        .all(|r| r.memory_mode == 1 && r.exit_code == Some(3)));
    assert_eq!(
        report
            .records
            .iter()
            .filter(|r| r.pass == Pass::Profiling)
            .count(),
        12
    );

    let names = files_in(&output_dir)?;
    assert_eq!(names.len(), 36);
    assert_eq!(names.iter().filter(|n| n.ends_with("_nsys.out")).count(), 12);
    assert_eq!(
        names
            .iter()
            .filter(|n| n.ends_with("_nsys_report.nsys-rep"))
            .count(),
        12
    );

    let ok = fs::read_to_string(output_dir.join("karate.mtx_50_0.00001_1_mem_type_0.out"))?;
    assert_eq!(
        ok.trim(),
        format!(
            "graph={} level=50 threshold=0.00001 resolution=1 mem=0",
            input_dir.join("karate.mtx").display()
        )
    );
    // stdout is kept even when the child fails
    let failed = fs::read_to_string(output_dir.join("dolphins.mtx_50_0.001_1_mem_type_1.out"))?;
    assert!(failed.contains("mem=1"));
    let profiled =
        fs::read_to_string(output_dir.join("dolphins.mtx_50_0.0000001_1_mem_type_0_nsys.out"))?;
    assert!(profiled.contains("threshold=0.0000001"));
    Ok(())
}

#[test]
fn missing_profiler_is_not_fatal() -> Result<()> {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir()?;
    let louvain = script(dir.path(), "louvain", FAKE_LOUVAIN)?;
    let input_dir = inputs(dir.path())?;
    let output_dir = dir.path().join("results");

    let settings = RunnerSettings {
        memory_modes: vec![0],
        profiler: ProfilerSettings {
            command: dir.path().join("no-such-profiler").to_string_lossy().into_owned(),
            ..Default::default()
        },
        ..Default::default()
    };
    let report = Runner::new(&settings, &louvain, &input_dir, &output_dir).run()?;

    assert_eq!(report.records.len(), 12);
    assert_eq!(report.succeeded().count(), 6);
    assert!(report
        .failed()
        .all(|r| r.pass == Pass::Profiling && r.exit_code.is_none()));
    let names = files_in(&output_dir)?;
    assert_eq!(names.len(), 12);
    let empty = output_dir.join("karate.mtx_50_0.001_1_mem_type_0_nsys.out");
    assert_eq!(fs::read(empty)?.len(), 0);
    Ok(())
}

#[test]
fn profiling_disabled() -> Result<()> {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir()?;
    let louvain = script(dir.path(), "louvain", FAKE_LOUVAIN)?;
    let input_dir = inputs(dir.path())?;
    let output_dir = dir.path().join("deep/results");

    let mut settings = RunnerSettings::default();
    settings.profiler.enabled = false;
    let report = Runner::new(&settings, &louvain, &input_dir, &output_dir).run()?;

    assert_eq!(report.records.len(), 12);
    assert!(report.records.iter().all(|r| r.pass == Pass::Primary));
    assert_eq!(files_in(&output_dir)?.len(), 12);
    Ok(())
}

#[test]
fn missing_input_dir_creates_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output_dir = dir.path().join("results");
    let settings = RunnerSettings::default();
    let result = Runner::new(
        &settings,
        Path::new("louvain"),
        &dir.path().join("absent"),
        &output_dir,
    )
    .run();
    assert!(result.is_err());
    assert!(!output_dir.exists());
    Ok(())
}

#[test]
fn empty_grid_runs_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input_dir = inputs(dir.path())?;
    let output_dir = dir.path().join("results");
    let settings = RunnerSettings {
        memory_modes: vec![],
        ..Default::default()
    };
    assert_eq!(settings.combinations_per_file(), 0);

    let report = Runner::new(
        &settings,
        &dir.path().join("missing-louvain"),
        &input_dir,
        &output_dir,
    )
    .run()?;
    assert!(report.records.is_empty());
    assert!(files_in(&output_dir)?.is_empty());
    Ok(())
}

#[test]
fn input_files_skip_directories() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input_dir = inputs(dir.path())?;
    let settings = RunnerSettings::default();
    let runner = Runner::new(&settings, Path::new("louvain"), &input_dir, dir.path());
    let mut files = runner.input_files()?;
    files.sort();
    assert_eq!(
        files,
        vec![input_dir.join("dolphins.mtx"), input_dir.join("karate.mtx")]
    );
    Ok(())
}

use std::io;

use super::{
    args::{ConvertArgs, RunnerArgs},
    convert::convert,
    runner::Runner,
    settings::RunnerSettings,
};
use crate::init_logger;
use clap::{Command, CommandFactory};
use clap_complete::Generator;
use eyre::{eyre, Context, Result};
use tracing::{debug, info};

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    clap_complete::generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

pub fn convert_main(args: ConvertArgs) -> Result<()> {
    init_logger();
    if let Some(generator) = args.generator {
        let mut cmd = ConvertArgs::command();
        eprintln!("Generating completion file for {:?}...", generator);
        print_completions(generator, &mut cmd);
        return Ok(());
    }
    debug!("{:?}", args);
    let input = args
        .input_file
        .ok_or_else(|| eyre!("the input file is required"))?;

    let conversion = convert(&input, args.output_file.as_deref(), args.duplicates)?;
    debug!("{:?}", conversion);
    println!(
        "Converted {} to {}",
        conversion.input.display(),
        conversion.output.display()
    );
    Ok(())
}

pub fn runner_main(args: RunnerArgs) -> Result<()> {
    init_logger();
    let start_time = std::time::Instant::now();
    if let Some(generator) = args.generator {
        let mut cmd = RunnerArgs::command();
        eprintln!("Generating completion file for {:?}...", generator);
        print_completions(generator, &mut cmd);
        return Ok(());
    }
    info!("start runner with {:?}", args);

    let (executable, input_dir, output_dir) =
        match (args.executable, args.input_dir, args.output_dir) {
            (Some(executable), Some(input_dir), Some(output_dir)) => {
                (executable, input_dir, output_dir)
            }
            _ => return Err(eyre!("executable, input_dir and output_dir are required")),
        };

    let mut settings =
        RunnerSettings::new(&args.config_file).wrap_err("fail to create Setting object")?;
    if args.no_profile {
        settings.profiler.enabled = false;
    }
    debug!("{:?}", settings);

    let report = Runner::new(&settings, &executable, &input_dir, &output_dir).run()?;

    if let Some(summary) = args.summary {
        report
            .save_to_file(&summary)
            .wrap_err("fail to save run report")?;
        info!("run report saved to {:?}", summary);
    }
    info!(
        "running time: {:?}'s",
        std::time::Instant::now()
            .duration_since(start_time)
            .as_secs_f64()
    );
    info!(
        "{} invocations succeeded, {} failed",
        report.succeeded().count(),
        report.failed().count()
    );
    Ok(())
}

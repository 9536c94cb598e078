use std::env::args_os;

use clap::Parser;
use eyre::Result;
use louvain_bench::{args::RunnerArgs, run_main};

fn main() -> Result<()> {
    let args = args_os();
    let args = RunnerArgs::parse_from(args);
    run_main::runner_main(args)
}

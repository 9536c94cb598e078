use std::env::args_os;

use clap::Parser;
use eyre::Result;
use louvain_bench::{args::ConvertArgs, run_main};

fn main() -> Result<()> {
    let args = args_os();
    let args = ConvertArgs::parse_from(args);
    run_main::convert_main(args)
}

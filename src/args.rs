use std::path::PathBuf;

use clap::{Parser, ValueHint};
use clap_complete::Shell;

use crate::convert::DuplicatePolicy;

#[derive(Parser, Debug)]
#[clap(author,version,about="convert a tab separated edge list to a matrix market file",long_about=None)]
pub struct ConvertArgs {
    /// Generate completion for the given shell
    #[clap(long = "generate", short = 'g', arg_enum)]
    pub generator: Option<Shell>,
    /// how repeated (row, col) pairs become matrix entries
    #[clap(long = "duplicates", short = 'd', arg_enum, default_value = "sum")]
    pub duplicates: DuplicatePolicy,
    /// the edge list to convert
    #[clap(parse(from_os_str), value_hint = ValueHint::FilePath, required_unless_present = "generator")]
    pub input_file: Option<PathBuf>,
    /// the matrix market file to write, default is the input file with the `mtx` extension
    #[clap(parse(from_os_str), value_hint = ValueHint::FilePath)]
    pub output_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[clap(author,version,about="run a louvain executable over a parameter grid",long_about=None)]
pub struct RunnerArgs {
    /// Generate completion for the given shell
    #[clap(long = "generate", short = 'g', arg_enum)]
    pub generator: Option<Shell>,
    /// config files overriding the default parameter grid, applied in order
    #[clap(long = "config", short = 'c', number_of_values = 1, parse(from_os_str), value_hint = ValueHint::FilePath)]
    pub config_file: Vec<PathBuf>,
    /// skip the profiling pass
    #[clap(long = "no-profile")]
    pub no_profile: bool,
    /// write a json report of every invocation to this file
    #[clap(long = "summary", short = 's', parse(from_os_str), value_hint = ValueHint::FilePath)]
    pub summary: Option<PathBuf>,
    /// the path of the executable
    #[clap(parse(from_os_str), value_hint = ValueHint::ExecutablePath, required_unless_present = "generator")]
    pub executable: Option<PathBuf>,
    /// the directory of the input files
    #[clap(parse(from_os_str), value_hint = ValueHint::DirPath, required_unless_present = "generator")]
    pub input_dir: Option<PathBuf>,
    /// the directory of the output files
    #[clap(parse(from_os_str), value_hint = ValueHint::DirPath, required_unless_present = "generator")]
    pub output_dir: Option<PathBuf>,
}

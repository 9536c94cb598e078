pub mod args;
pub mod convert;
pub mod edge_list;
pub mod result;
pub mod run_main;
pub mod runner;
pub mod settings;
mod utils;

pub use utils::init_logger;

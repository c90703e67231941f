pub mod args;
pub mod commands;

pub use args::{Cli, Commands, EvaluateOptions};
pub use commands::run;

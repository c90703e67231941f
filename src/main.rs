use anyhow::Context;
use clap::Parser;
use lcd_processor::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.name();
    run(cli).with_context(|| format!("{} failed", command))
}

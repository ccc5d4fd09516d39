//! Fanload CLI: upload labelled directories and write a manifest.

use anyhow::Result;
use clap::Parser;
use fanload::engine::arg_parser::Cli;
use fanload::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}

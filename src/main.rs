//! CLI entry point: decode arguments, drain a trace through a `Cache`, print
//! the final statistics report.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use cachesim::cache::Cache;
use cachesim::cli::CliArgs;
use cachesim::report;
use cachesim::trace::Trace;

fn run() -> anyhow::Result<String> {
    let args = CliArgs::parse();
    let config = args.into_config()?;

    info!(
        "starting simulation: C={} B={} S={} K={} V={}",
        config.c, config.b, config.s, config.k, config.v
    );

    let mut cache = Cache::new(config);

    let mut records = |reader: &mut dyn BufRead| -> anyhow::Result<()> {
        let mut trace = Trace::new(reader);
        for record in trace.records() {
            let access = record?;
            if access.is_write {
                cache.write(access.address);
            } else {
                cache.read(access.address);
            }
        }
        Ok(())
    };

    match args.input {
        Some(path) => {
            let mut reader = BufReader::new(
                File::open(&path)
                    .map_err(|e| anyhow::anyhow!("failed to open trace {path:?}: {e}"))?,
            );
            records(&mut reader)?;
        }
        None => {
            let stdin = io::stdin();
            let mut reader = stdin.lock();
            records(&mut reader)?;
        }
    }

    cache.compute_stats();
    info!("simulation complete: {} accesses processed", cache.stats().accesses);
    Ok(report::render(cache.stats()))
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

//! Parameter-sweep driver: for a fixed `(C, B, K, V)`, searches associativity
//! `S` over `0..=C-B` and reports the value that minimizes AAT per trace.
//!
//! A standalone tuning utility, not part of the simulator itself; ported
//! from `examples/original_source/src/cacheopt.cpp`, which hardcodes the
//! same `C = 15, V = 2, B = 7, K = 6` budget and a fixed trace list.

use std::fs::File;
use std::io::BufReader;

use clap::Parser;
use log::warn;

use cachesim::cache::Cache;
use cachesim::geometry::Config;
use cachesim::trace::Trace;

const C: u64 = 15;
const B: u64 = 7;
const K: u64 = 6;
const V: u64 = 2;

const DEMO_TRACES: &[&str] = &[
    "traces/astar.trace",
    "traces/bzip2.trace",
    "traces/mcf.trace",
    "traces/perlbench.trace",
];

/// Searches associativity for the lowest-AAT configuration per trace.
#[derive(Parser, Debug)]
#[command(name = "cacheopt", version, about)]
struct Args {
    /// Trace file(s) to sweep; defaults to the built-in demo traces.
    #[arg(long = "trace")]
    traces: Vec<String>,
}

fn run_one(config: Config, path: &str) -> anyhow::Result<f64> {
    let file = File::open(path).map_err(|e| anyhow::anyhow!("failed to open {path}: {e}"))?;
    let mut reader = BufReader::new(file);
    let mut trace = Trace::new(&mut reader);
    let mut cache = Cache::new(config);

    for record in trace.records() {
        let access = record?;
        if access.is_write {
            cache.write(access.address);
        } else {
            cache.read(access.address);
        }
    }

    cache.compute_stats();
    Ok(cache.stats().avg_access_time)
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let owned_traces;
    let traces: &[&str] = if args.traces.is_empty() {
        DEMO_TRACES
    } else {
        owned_traces = args.traces.iter().map(String::as_str).collect::<Vec<_>>();
        &owned_traces
    };

    for &path in traces {
        let mut best_aat = f64::MAX;
        let mut best_s = 0u64;

        for s in 0..=(C - B) {
            let config = match Config::build(C, B, s, K, V) {
                Ok(c) => c,
                Err(e) => {
                    warn!("skipping S={s} for {path}: {e}");
                    continue;
                }
            };
            match run_one(config, path) {
                Ok(aat) if aat < best_aat => {
                    best_aat = aat;
                    best_s = s;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("skipping S={s} for {path}: {e}");
                }
            }
        }

        println!("Trace: {path}");
        println!("C = {C}, B = {B}, S = {best_s}, K = {K}, V = {V}");
        println!("AAT = {best_aat}");
    }
}

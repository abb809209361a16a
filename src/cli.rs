//! Command-line argument decoding: one `clap::Parser` per simulation run,
//! turning flags into a validated [`geometry::Config`].
//!
//! Replaces the original's hand-rolled `getopt` parsing
//! (`examples/original_source/src/cachesim.cpp`).

use std::path::PathBuf;

use clap::Parser;

use crate::error::SimError;
use crate::geometry::{Config, DEFAULT_B, DEFAULT_C, DEFAULT_K, DEFAULT_S, DEFAULT_V};

/// Trace-driven L1 data cache simulator.
#[derive(Parser, Debug)]
#[command(name = "cachesim", version, about)]
pub struct CliArgs {
    /// log2 of total cache size in bytes.
    #[arg(short = 'C', default_value_t = DEFAULT_C)]
    pub c: u64,

    /// log2 of block size in bytes.
    #[arg(short = 'B', default_value_t = DEFAULT_B)]
    pub b: u64,

    /// log2 of ways per set.
    #[arg(short = 'S', default_value_t = DEFAULT_S)]
    pub s: u64,

    /// log2 of sub-block size in bytes.
    #[arg(short = 'K', default_value_t = DEFAULT_K)]
    pub k: u64,

    /// Victim-buffer capacity in blocks. Zero disables the buffer.
    #[arg(short = 'V', default_value_t = DEFAULT_V)]
    pub v: u64,

    /// Input trace path; reads stdin when omitted.
    #[arg(short = 'i')]
    pub input: Option<PathBuf>,
}

impl CliArgs {
    pub fn into_config(self) -> Result<Config, SimError> {
        Config::build(self.c, self.b, self.s, self.k, self.v)
    }
}

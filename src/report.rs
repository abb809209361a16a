//! Final statistics printer: renders [`Stats`] in a fixed field order,
//! printed once at shutdown — never on a fatal error.

use crate::cache::Stats;

pub fn render(stats: &Stats) -> String {
    format!(
        "Accesses: {accesses}\n\
         Reads: {reads}\n\
         Read misses: {read_misses}\n\
         Read misses combined: {read_misses_combined}\n\
         Writes: {writes}\n\
         Write misses: {write_misses}\n\
         Write misses combined: {write_misses_combined}\n\
         Misses: {misses}\n\
         Writebacks: {write_backs}\n\
         Victim cache misses: {vc_misses}\n\
         Sub-block misses: {subblock_misses}\n\
         Bytes transferred to/from memory: {bytes_transferred}\n\
         Hit Time: {hit_time}\n\
         Miss Penalty: {miss_penalty}\n\
         Miss rate: {miss_rate}\n\
         Average access time (AAT): {avg_access_time}\n",
        accesses = stats.accesses,
        reads = stats.reads,
        read_misses = stats.read_misses,
        read_misses_combined = stats.read_misses_combined,
        writes = stats.writes,
        write_misses = stats.write_misses,
        write_misses_combined = stats.write_misses_combined,
        misses = stats.misses,
        write_backs = stats.write_backs,
        vc_misses = stats.vc_misses,
        subblock_misses = stats.subblock_misses,
        bytes_transferred = stats.bytes_transferred,
        hit_time = stats.hit_time,
        miss_penalty = stats.miss_penalty,
        miss_rate = stats.miss_rate,
        avg_access_time = stats.avg_access_time,
    )
}

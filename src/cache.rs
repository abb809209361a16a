//! The coordinator: owns the block array, per-set LRU stacks, and the
//! optional victim buffer; implements the read/write access protocol and
//! final statistics computation.

use log::{debug, trace};

use crate::block::Block;
use crate::geometry::{Config, Shape};
use crate::lru::Lru;
use crate::victim::VictimBuffer;

/// Outcome of a single access, as returned to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessOutcome {
    ReadHit,
    ReadMiss,
    ReadSbMiss,
    WriteHit,
    WriteMiss,
    WriteSbMiss,
}

/// Aggregate performance counters, monotonically non-decreasing across a run.
#[derive(Clone, Debug, Default)]
pub struct Stats {
    pub accesses: u64,
    pub reads: u64,
    pub writes: u64,

    pub read_misses: u64,
    pub read_misses_combined: u64,
    pub write_misses: u64,
    pub write_misses_combined: u64,

    pub misses: u64,
    pub write_backs: u64,
    pub vc_misses: u64,
    pub subblock_misses: u64,

    pub bytes_transferred: u64,

    pub hit_time: f64,
    pub miss_penalty: f64,
    pub miss_rate: f64,
    pub avg_access_time: f64,
}

pub struct Cache {
    config: Config,
    blocks: Vec<Vec<Block>>,
    lrus: Vec<Lru>,
    victim: Option<VictimBuffer>,
    stats: Stats,
}

impl Cache {
    pub fn new(config: Config) -> Self {
        let rows = config.rows;
        let cols = config.cols;
        debug!(
            "cache geometry: shape={:?} rows={rows} cols={cols} tag_mask={:#x} index_mask={:#x} offset_mask={:#x}",
            config.shape, config.tag_mask, config.index_mask, config.offset_mask
        );

        let blocks = (0..rows)
            .map(|_| (0..cols).map(|_| Block::new(config.b, config.k)).collect())
            .collect();
        let lrus = (0..rows).map(|_| Lru::new(cols)).collect();
        let victim = if config.victim_buffer_enabled() {
            Some(VictimBuffer::new(config.v as usize))
        } else {
            None
        };

        Self {
            config,
            blocks,
            lrus,
            victim,
            stats: Stats::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    fn row_for(&self, index: u64) -> usize {
        match self.config.shape {
            Shape::FullyAssociative => 0,
            _ => index as usize,
        }
    }

    /// Scans the addressed set in storage order for an occupied block with
    /// matching tag.
    fn find_block(&self, row: usize, tag: u64) -> Option<usize> {
        (0..self.config.cols).find(|&col| {
            let b = &self.blocks[row][col];
            !b.is_empty() && b.tag == tag
        })
    }

    /// Elects the way to use for an incoming block: the first empty slot
    /// wins over any LRU victim; a direct-mapped/single-way set needs no LRU
    /// at all, since there's no choice to make.
    fn find_victim(&mut self, row: usize) -> usize {
        if let Some(col) = (0..self.config.cols).find(|&col| self.blocks[row][col].is_empty()) {
            return col;
        }
        if self.config.cols == 1 {
            return 0;
        }
        let victim_tag = self.lrus[row].pop();
        (0..self.config.cols)
            .find(|&col| self.blocks[row][col].tag == victim_tag)
            .unwrap_or(0)
    }

    /// Handles writeback/victim-buffer accounting for whatever currently
    /// occupies `(row, col)`, ahead of it being overwritten by the caller.
    fn evict_slot(&mut self, row: usize, col: usize) {
        if self.blocks[row][col].is_empty() {
            return;
        }
        if let Some(vc) = &mut self.victim {
            let copy = self.blocks[row][col].clone();
            if let Some(expelled) = vc.push(copy) {
                if expelled.dirty {
                    self.stats.bytes_transferred += expelled.num_valid();
                    self.stats.write_backs += 1;
                }
            }
        } else {
            let block = &self.blocks[row][col];
            if block.dirty {
                self.stats.bytes_transferred += block.num_valid();
                self.stats.write_backs += 1;
            }
        }
    }

    /// Handles one read or write access end-to-end: decode, LRU touch,
    /// lookup, victim-buffer consultation, eviction, and counter updates.
    pub fn access(&mut self, addr: u64, is_write: bool) -> AccessOutcome {
        let tag = self.config.tag(addr);
        let index = self.config.index(addr);
        let offset = self.config.offset(addr);
        let row = self.row_for(index);

        trace!("access addr={addr:#x} tag={tag:#x} index={index} offset={offset} write={is_write}");

        if self.config.shape != Shape::DirectMapped {
            self.lrus[row].push(tag);
        }

        self.stats.accesses += 1;
        if is_write {
            self.stats.writes += 1;
        } else {
            self.stats.reads += 1;
        }

        let outcome = if let Some(col) = self.find_block(row, tag) {
            if self.blocks[row][col].read(offset) {
                if is_write {
                    AccessOutcome::WriteHit
                } else {
                    AccessOutcome::ReadHit
                }
            } else {
                let count = self.blocks[row][col].write_many(offset);
                self.stats.bytes_transferred += count;
                self.stats.subblock_misses += 1;
                if is_write {
                    AccessOutcome::WriteSbMiss
                } else {
                    AccessOutcome::ReadSbMiss
                }
            }
        } else {
            if is_write {
                self.stats.write_misses += 1;
            } else {
                self.stats.read_misses += 1;
            }
            if !self.config.victim_buffer_enabled() {
                // No buffer to possibly absorb the miss: every raw miss is
                // trivially a combined miss too.
                if is_write {
                    self.stats.write_misses_combined += 1;
                } else {
                    self.stats.read_misses_combined += 1;
                }
            }

            let vc_pos = self.victim.as_ref().and_then(|vc| vc.lookup(tag, index));

            if let Some(pos) = vc_pos {
                let restored = self.victim.as_mut().unwrap().remove(pos);
                let col = self.find_victim(row);
                self.evict_slot(row, col);
                self.blocks[row][col] = restored;
                if !self.blocks[row][col].read(offset) {
                    let count = self.blocks[row][col].write_many(offset);
                    self.stats.bytes_transferred += count;
                    self.stats.subblock_misses += 1;
                }
            } else {
                let col = self.find_victim(row);
                self.evict_slot(row, col);
                self.blocks[row][col].replace(tag, index, false);
                let count = self.blocks[row][col].write_many(offset);
                self.stats.bytes_transferred += count;

                if self.config.victim_buffer_enabled() {
                    self.stats.vc_misses += 1;
                    if is_write {
                        self.stats.write_misses_combined += 1;
                    } else {
                        self.stats.read_misses_combined += 1;
                    }
                }
            }

            if is_write {
                AccessOutcome::WriteMiss
            } else {
                AccessOutcome::ReadMiss
            }
        };

        if is_write {
            if let Some(col) = self.find_block(row, tag) {
                let sub = self.blocks[row][col].sub_index(offset);
                self.blocks[row][col].write_subblock(sub);
                self.blocks[row][col].dirty = true;
            }
        }

        outcome
    }

    pub fn read(&mut self, addr: u64) -> AccessOutcome {
        self.access(addr, false)
    }

    pub fn write(&mut self, addr: u64) -> AccessOutcome {
        self.access(addr, true)
    }

    /// Finalizes `miss_rate` and `avg_access_time` from the raw counters.
    /// Call once, at shutdown.
    pub fn compute_stats(&mut self) {
        self.stats.misses = self.stats.read_misses + self.stats.write_misses;
        self.stats.hit_time = 2.0 + 0.1 * 2f64.powi(self.config.s as i32);
        self.stats.miss_penalty = 100.0;

        self.stats.miss_rate = if self.stats.accesses == 0 || self.stats.misses == 0 {
            0.0
        } else if self.config.victim_buffer_enabled() {
            let combined_fraction =
                (self.stats.vc_misses + self.stats.subblock_misses) as f64 / self.stats.misses as f64;
            (self.stats.misses as f64 / self.stats.accesses as f64) * combined_fraction
        } else {
            (self.stats.misses + self.stats.subblock_misses) as f64 / self.stats.accesses as f64
        };

        self.stats.avg_access_time = self.stats.hit_time + self.stats.miss_rate * self.stats.miss_penalty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Config;

    fn cfg(c: u64, b: u64, s: u64, k: u64, v: u64) -> Config {
        Config::build(c, b, s, k, v).unwrap()
    }

    #[test]
    fn accesses_equals_reads_plus_writes() {
        let mut cache = Cache::new(cfg(6, 2, 1, 1, 0));
        cache.read(0x0);
        cache.write(0x10);
        cache.read(0x20);
        assert_eq!(cache.stats().accesses, cache.stats().reads + cache.stats().writes);
    }

    #[test]
    fn empty_cache_first_read_is_miss_second_is_hit() {
        let mut cache = Cache::new(cfg(6, 2, 1, 1, 0));
        assert_eq!(cache.read(0x100), AccessOutcome::ReadMiss);
        assert_eq!(cache.read(0x100), AccessOutcome::ReadHit);
    }

    #[test]
    fn direct_mapped_conflict_evicts() {
        // C=4,B=2,S=0: 4 rows, 1 way. Addresses 0 and 16 (line stride 4*4=16) collide.
        let mut cache = Cache::new(cfg(4, 2, 0, 1, 0));
        assert_eq!(cache.read(0x0), AccessOutcome::ReadMiss);
        assert_eq!(cache.read(0x0), AccessOutcome::ReadHit);
        assert_eq!(cache.write(0x10), AccessOutcome::WriteMiss);
        assert_eq!(cache.read(0x0), AccessOutcome::ReadMiss); // evicted by the write above
    }

    #[test]
    fn dirty_eviction_without_victim_buffer_writes_back() {
        let mut cache = Cache::new(cfg(4, 2, 0, 1, 0));
        cache.write(0x0); // dirties block at row 0
        cache.read(0x10); // evicts row 0, should write back
        assert_eq!(cache.stats().write_backs, 1);
    }

    #[test]
    fn victim_buffer_absorbs_recently_evicted_block() {
        let mut cache = Cache::new(cfg(4, 2, 0, 1, 1));
        cache.write(0x0); // dirty block at row 0
        cache.read(0x10); // evicts row 0 into the victim buffer (no writeback yet)
        assert_eq!(cache.stats().write_backs, 0);
        let outcome = cache.read(0x0); // should be absorbed by the victim buffer
        assert_eq!(outcome, AccessOutcome::ReadMiss);
        assert_eq!(cache.stats().read_misses, 2);
        assert_eq!(cache.stats().read_misses_combined, 1);
        assert_eq!(cache.stats().vc_misses, 0);
    }

    #[test]
    fn v_zero_never_touches_combined_counters_differently_from_raw() {
        let mut cache = Cache::new(cfg(4, 2, 0, 1, 0));
        cache.read(0x0);
        cache.read(0x10);
        cache.read(0x20);
        cache.compute_stats();
        assert_eq!(cache.stats().read_misses, cache.stats().read_misses_combined);
        assert_eq!(cache.stats().vc_misses, 0);
    }

    #[test]
    fn combined_never_exceeds_raw() {
        let mut cache = Cache::new(cfg(4, 2, 0, 1, 1));
        for addr in [0x0, 0x10, 0x20, 0x0, 0x30] {
            cache.read(addr);
        }
        assert!(cache.stats().read_misses_combined <= cache.stats().read_misses);
    }

    #[test]
    fn geometries_reducing_to_fully_associative_agree_on_trace() {
        // S = C - B always resolves to the fully-associative shape
        // regardless of how a caller arrived at that S value; two caches
        // built from that shape should walk any trace identically.
        let trace: Vec<(bool, u64)> = (0..64)
            .map(|i| (i % 3 == 0, (i as u64).wrapping_mul(0x37) & 0xff))
            .collect();

        let mut fa = Cache::new(cfg(6, 2, 4, 1, 0));
        let mut other = Cache::new(cfg(6, 2, 4, 1, 0));
        assert_eq!(fa.config().shape, Shape::FullyAssociative);
        assert_eq!(other.config().shape, Shape::FullyAssociative);

        for (is_write, addr) in trace {
            let a = fa.access(addr, is_write);
            let b = other.access(addr, is_write);
            assert_eq!(a, b);
        }
        fa.compute_stats();
        other.compute_stats();
        assert_eq!(fa.stats().accesses, other.stats().accesses);
        assert_eq!(fa.stats().bytes_transferred, other.stats().bytes_transferred);
    }

    #[test]
    fn full_miss_reports_raw_subblock_count_not_bytes() {
        // C=4,B=2,K=1,V=0: a full miss on address 0 validates both of the
        // block's 2 sub-blocks, so bytes_transferred should land on 2, not
        // 2 scaled by a sub-block byte size.
        let mut cache = Cache::new(cfg(4, 2, 0, 1, 0));
        cache.read(0x0);
        assert_eq!(cache.stats().bytes_transferred, 2);
    }

    #[test]
    fn tag_zero_block_is_hit_on_a_later_access() {
        // Address 0 decodes to tag 0 under this geometry; a block resident
        // with tag 0 must still be a real, hit-able occupant rather than
        // being mistaken for an empty slot.
        let mut cache = Cache::new(cfg(4, 2, 0, 1, 0));
        assert_eq!(cache.read(0x0), AccessOutcome::ReadMiss);
        assert_eq!(cache.read(0x1), AccessOutcome::ReadHit);
    }

    #[test]
    fn compute_stats_no_victim_buffer_combined_equals_raw() {
        let mut cache = Cache::new(cfg(4, 2, 0, 1, 0));
        cache.read(0x0);
        cache.write(0x10);
        cache.compute_stats();
        let s = cache.stats();
        assert_eq!(s.read_misses, s.read_misses_combined);
        assert_eq!(s.write_misses, s.write_misses_combined);
        assert!((s.miss_rate - (s.misses + s.subblock_misses) as f64 / s.accesses as f64).abs() < 1e-9);
    }
}

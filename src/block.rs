//! A single cache line: identity (tag/index), dirty flag, and a fixed-length
//! valid-bit vector over its sub-blocks.

/// One cache line.
///
/// Occupancy is tracked by its own `occupied` flag rather than inferred from
/// `tag`, so a block legitimately holding tag 0 (address 0's tag, under some
/// geometries) is still a real resident and hit-able on a later lookup.
#[derive(Clone, Debug)]
pub struct Block {
    pub tag: u64,
    /// Recorded so a block can be restored into the right set after a trip
    /// through the victim buffer.
    pub index: u64,
    pub dirty: bool,
    occupied: bool,
    valid: Vec<bool>,
    /// log2 block size, used by `sub_index`'s scaled mapping.
    b: u64,
}

impl Block {
    /// `n = 2^(B-K)` sub-block slots, starting invalid, starting empty.
    pub fn new(b: u64, k: u64) -> Self {
        let n = if k >= b { 1usize } else { 1usize << (b - k) };
        Self {
            tag: 0,
            index: 0,
            dirty: false,
            occupied: false,
            valid: vec![false; n],
            b,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.occupied
    }

    fn n(&self) -> usize {
        self.valid.len()
    }

    /// Maps a byte offset within the block to a sub-block index.
    ///
    /// Uses the scaled mapping `floor(offset / (2^B - 1) * n)`, clamped to
    /// `n - 1` — not the more orthodox `offset >> K`.
    pub fn sub_index(&self, offset: u64) -> usize {
        if self.n() == 1 {
            return 0;
        }
        let max_offset = ((1u64 << self.b) - 1) as f64;
        let idx = ((offset as f64 / max_offset) * self.n() as f64) as usize;
        idx.min(self.n() - 1)
    }

    /// True iff the sub-block containing `offset` is valid. With
    /// sub-blocking degenerate (n == 1) the whole block is one unit and this
    /// always returns true — callers only reach here after a tag match, so
    /// the block is known occupied.
    pub fn read(&self, offset: u64) -> bool {
        if self.n() == 1 {
            return true;
        }
        self.valid[self.sub_index(offset)]
    }

    /// Marks sub-block `i` valid if it wasn't already. Returns whether it
    /// was newly validated.
    pub fn write_subblock(&mut self, i: usize) -> bool {
        if !self.valid[i] {
            self.valid[i] = true;
            true
        } else {
            false
        }
    }

    /// Validates every sub-block from `sub_index(offset)` to the end of the
    /// line, modeling forward prefetch. With sub-blocking degenerate (n == 1)
    /// the whole line arrives in one shot, reported as `2^B` bytes; otherwise
    /// returns the count of sub-blocks newly brought in from memory.
    pub fn write_many(&mut self, offset: u64) -> u64 {
        if self.n() == 1 {
            self.write_subblock(0);
            return 1u64 << self.b;
        }
        let start = self.sub_index(offset);
        let mut newly_valid = 0u64;
        for i in start..self.n() {
            if self.write_subblock(i) {
                newly_valid += 1;
            }
        }
        newly_valid
    }

    /// Rewrites identity, marks the block occupied, and clears dirty. `full`
    /// validates every sub-block (full-line fetch); otherwise all sub-blocks
    /// start invalid (partial replacement, populated later by `write_many`).
    pub fn replace(&mut self, tag: u64, index: u64, full: bool) {
        self.tag = tag;
        self.index = index;
        self.dirty = false;
        self.occupied = true;
        for v in self.valid.iter_mut() {
            *v = full;
        }
    }

    /// Count of currently-valid sub-blocks; used for writeback accounting on
    /// eviction.
    pub fn num_valid(&self) -> u64 {
        self.valid.iter().filter(|v| **v).count() as u64
    }

    /// Count of invalid sub-blocks from `sub_index(offset)` to the end.
    pub fn num_invalid_from(&self, offset: u64) -> u64 {
        let start = self.sub_index(offset);
        self.valid[start..].iter().filter(|v| !**v).count() as u64
    }
}

// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Generation of block sizes for block averaging.

/// Block sizes grow by this factor once geometric growth overtakes linear growth.
const GROWTH_FACTOR: f64 = 1.1;

/// Every block size must allow for more than this number of blocks.
const MIN_BLOCKS: f64 = 10.0;

/// Iterator over block sizes (in samples) used to partition a series of a given length.
///
/// The k-th block size is `max(previous + 1, floor(1.1^k))`: the grid is dense for small
/// blocks and grows by ~10 % per step for large blocks. Only block sizes lower than
/// `n_samples / 10` are generated so that each block size provides at least 10 blocks.
#[derive(Debug, Clone)]
pub struct BlockSizes {
    /// Block sizes must be strictly lower than this value.
    limit: f64,
    /// Next block size to return.
    next_size: usize,
    /// Number of block sizes generated so far.
    generated: u32,
}

impl BlockSizes {
    /// Create a grid of block sizes for a series with `n_samples` samples.
    pub fn new(n_samples: usize) -> Self {
        BlockSizes {
            limit: n_samples as f64 / MIN_BLOCKS,
            next_size: 1,
            generated: 0,
        }
    }
}

impl Iterator for BlockSizes {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_size as f64 >= self.limit {
            return None;
        }

        let current = self.next_size;
        self.generated += 1;

        let geometric = GROWTH_FACTOR.powf(self.generated as f64).floor() as usize;
        self.next_size = (current + 1).max(geometric);

        Some(current)
    }
}

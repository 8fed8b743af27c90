// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Division of the trajectory into blocks and random resampling of the blocks.

use std::ops::Range;

use getset::CopyGetters;
use rand::Rng;

/// Division of a trajectory into contiguous blocks.
///
/// The size of the block is `round(n_frames / n_blocks)` (rounding half to even).
/// The last block always ends with the last frame of the trajectory, so it can be
/// larger or smaller than the other blocks if `n_blocks` does not divide `n_frames`.
/// Blocks are clamped to the trajectory: if the rounded block size overshoots the
/// trajectory, the trailing blocks are empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
pub(crate) struct BlockPartition {
    /// Number of frames in the trajectory.
    #[getset(get_copy = "pub(crate)")]
    n_frames: usize,
    /// Number of blocks.
    #[getset(get_copy = "pub(crate)")]
    n_blocks: usize,
    /// Size of all blocks but the last one.
    #[getset(get_copy = "pub(crate)")]
    block_size: usize,
}

impl BlockPartition {
    /// Divide a trajectory of `n_frames` frames into `n_blocks` blocks.
    /// `n_blocks` must be at least 1.
    pub(crate) fn new(n_frames: usize, n_blocks: usize) -> Self {
        let block_size = (n_frames as f64 / n_blocks as f64).round_ties_even() as usize;

        BlockPartition {
            n_frames,
            n_blocks,
            block_size,
        }
    }

    /// Get the range of frame indices belonging to the block with the given index.
    pub(crate) fn block(&self, index: usize) -> Range<usize> {
        let start = (index * self.block_size).min(self.n_frames);
        let end = if index + 1 == self.n_blocks {
            self.n_frames
        } else {
            ((index + 1) * self.block_size).min(self.n_frames)
        };

        start..end
    }

    /// Pick `n_picks` blocks with replacement and concatenate their frame indices
    /// in the order in which the blocks have been picked.
    pub(crate) fn sample(&self, n_picks: usize, rng: &mut impl Rng) -> Vec<usize> {
        let mut indices = Vec::with_capacity(n_picks * self.block_size);

        for _ in 0..n_picks {
            let block = rng.random_range(0..self.n_blocks);
            indices.extend(self.block(block));
        }

        indices
    }

    /// Log basic info about the partition.
    pub(crate) fn info(&self) {
        let last = self.block(self.n_blocks - 1);
        log::info!(
            "Trajectory divided into {} blocks of {} frames (last block: {} frames).",
            self.n_blocks,
            self.block_size,
            last.len()
        );

        if self.block_size == 0 {
            log::warn!(
                "Number of blocks ({}) is too high for a trajectory of {} frames. Most blocks are empty.",
                self.n_blocks,
                self.n_frames
            );
        }
    }
}

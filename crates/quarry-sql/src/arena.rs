//! Bump arena with geometric block growth.
//!
//! The arena owns every byte of text stored in the AST. Allocations are
//! addressed by [`Allocation`] handles (block index + offset) rather than raw
//! pointers, so the arena stays in safe Rust while keeping the usual bump
//! allocator properties:
//!
//! - allocation is O(1) amortized and never frees individually;
//! - a handed-out region never moves and is never reused before
//!   [`Arena::reset`] or [`Arena::clear`];
//! - `reset` rewinds every block but keeps them, so repeated parses do not
//!   go back to the system allocator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default size of the first block.
pub const DEFAULT_INITIAL_BLOCK_SIZE: usize = 4 * 1024;
/// Default cap for geometric block growth.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 1024 * 1024;

/// Arena sizing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Size in bytes of the first block.
    pub initial_block_size: usize,
    /// Upper bound for the doubling sequence. Larger requests still succeed
    /// with a dedicated block.
    pub max_block_size: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_block_size: DEFAULT_INITIAL_BLOCK_SIZE,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
        }
    }
}

/// Arena allocation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// Alignment must be a non-zero power of two.
    #[error("invalid alignment {0}: must be a power of two")]
    InvalidAlignment(usize),

    /// The request cannot be addressed by an [`Allocation`] handle.
    #[error("allocation of {0} bytes is too large")]
    TooLarge(usize),
}

/// Handle to a region handed out by [`Arena::allocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Allocation {
    block: u32,
    offset: u32,
    len: u32,
}

impl Allocation {
    const EMPTY: Self = Self {
        block: 0,
        offset: 0,
        len: 0,
    };

    /// Length of the region in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns true for zero-sized regions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Handle to UTF-8 text copied into the arena by [`Arena::alloc_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Text(Allocation);

impl Text {
    /// Length of the text in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty string.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Capacity and usage of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockUsage {
    pub capacity: usize,
    pub used: usize,
}

#[derive(Debug)]
struct Block {
    data: Vec<u8>,
    used: usize,
}

impl Block {
    fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
            used: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Offset at which `size` bytes aligned to `align` would start, if they fit.
    fn fit(&self, size: usize, align: usize) -> Option<usize> {
        let start = self.used.checked_add(align - 1)? & !(align - 1);
        let end = start.checked_add(size)?;
        (end <= self.capacity()).then_some(start)
    }
}

/// Bump allocator over an ordered list of fixed-capacity blocks.
#[derive(Debug)]
pub struct Arena {
    config: ArenaConfig,
    blocks: Vec<Block>,
    /// Index of the block currently being bumped.
    current: usize,
    /// Size of the next block in the doubling sequence.
    next_block_size: usize,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Creates an empty arena with default sizing. No memory is reserved until
    /// the first allocation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::default())
    }

    /// Creates an empty arena with the given sizing.
    #[must_use]
    pub fn with_config(config: ArenaConfig) -> Self {
        let initial = config.initial_block_size.max(1);
        Self {
            config: ArenaConfig {
                initial_block_size: initial,
                max_block_size: config.max_block_size.max(initial),
            },
            blocks: Vec::new(),
            current: 0,
            next_block_size: initial,
        }
    }

    /// Sizing this arena was built with.
    #[must_use]
    pub const fn config(&self) -> ArenaConfig {
        self.config
    }

    /// Reserves `size` zeroed bytes aligned to `align` (relative to the block
    /// start).
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidAlignment`] if `align` is not a power of
    /// two and [`ArenaError::TooLarge`] if the request does not fit in a
    /// handle.
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<Allocation, ArenaError> {
        if !align.is_power_of_two() {
            return Err(ArenaError::InvalidAlignment(align));
        }
        let len = u32::try_from(size).map_err(|_| ArenaError::TooLarge(size))?;
        if size == 0 {
            return Ok(Allocation::EMPTY);
        }

        // Bump the current block, then any already-reserved blocks after it
        // (left over from before a reset), then grow.
        while let Some(block) = self.blocks.get(self.current) {
            if let Some(start) = block.fit(size, align) {
                return self.commit(self.current, start, size, len);
            }
            if self.current + 1 >= self.blocks.len() {
                break;
            }
            self.current += 1;
        }

        // A fresh block starts at offset 0, which satisfies any alignment.
        let block_size = if size > self.next_block_size {
            // Dedicated block; the doubling sequence is unaffected.
            size
        } else {
            let size = self.next_block_size;
            self.next_block_size = (size * 2).min(self.config.max_block_size);
            size
        };
        self.blocks.push(Block::new(block_size));
        self.current = self.blocks.len() - 1;
        let start = self.blocks[self.current]
            .fit(size, align)
            .ok_or(ArenaError::TooLarge(size))?;
        self.commit(self.current, start, size, len)
    }

    fn commit(
        &mut self,
        index: usize,
        start: usize,
        size: usize,
        len: u32,
    ) -> Result<Allocation, ArenaError> {
        let block = &mut self.blocks[index];
        let end = start + size;
        block.data[start..end].fill(0);
        block.used = end;
        Ok(Allocation {
            block: u32::try_from(index).map_err(|_| ArenaError::TooLarge(size))?,
            offset: u32::try_from(start).map_err(|_| ArenaError::TooLarge(size))?,
            len,
        })
    }

    /// Copies `s` into the arena.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::TooLarge`] for strings over 4 GiB.
    pub fn alloc_str(&mut self, s: &str) -> Result<Text, ArenaError> {
        let allocation = self.allocate(s.len(), 1)?;
        self.bytes_mut(allocation).copy_from_slice(s.as_bytes());
        Ok(Text(allocation))
    }

    /// Bytes of a region.
    #[must_use]
    pub fn bytes(&self, allocation: Allocation) -> &[u8] {
        let start = allocation.offset as usize;
        self.blocks
            .get(allocation.block as usize)
            .and_then(|block| block.data.get(start..start + allocation.len()))
            .unwrap_or(&[])
    }

    /// Mutable bytes of a region.
    pub fn bytes_mut(&mut self, allocation: Allocation) -> &mut [u8] {
        let start = allocation.offset as usize;
        self.blocks
            .get_mut(allocation.block as usize)
            .and_then(|block| block.data.get_mut(start..start + allocation.len()))
            .unwrap_or(&mut [])
    }

    /// Text stored by [`Arena::alloc_str`].
    #[must_use]
    pub fn text(&self, text: Text) -> &str {
        // Only `alloc_str` creates `Text` handles, and it copies valid UTF-8.
        std::str::from_utf8(self.bytes(text.0)).unwrap_or_default()
    }

    /// Rewinds every block without releasing it.
    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.used = 0;
        }
        self.current = 0;
    }

    /// Releases every block.
    pub fn clear(&mut self) {
        self.blocks = Vec::new();
        self.current = 0;
        self.next_block_size = self.config.initial_block_size;
    }

    /// Bytes handed out since the last reset, alignment padding included.
    #[must_use]
    pub fn bytes_used(&self) -> usize {
        self.blocks.iter().map(|b| b.used).sum()
    }

    /// Bytes reserved from the system allocator.
    #[must_use]
    pub fn bytes_reserved(&self) -> usize {
        self.blocks.iter().map(Block::capacity).sum()
    }

    /// Number of blocks currently held.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Per-block capacity and usage, in allocation order.
    pub fn block_usage(&self) -> impl Iterator<Item = BlockUsage> + '_ {
        self.blocks.iter().map(|b| BlockUsage {
            capacity: b.capacity(),
            used: b.used,
        })
    }
}

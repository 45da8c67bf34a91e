//! Main memory: the authoritative, write-back-backed store of blocks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::address::{BlockId, N_BLOCKS};
use crate::line::BlockData;

/// The upper bound (exclusive) of a freshly-initialized word's value,
/// matching `original_source/floricultura.py`'s `random.randint(0, 250)`.
const INIT_WORD_RANGE: u32 = 251;

/// The machine's main memory: `N_BLOCKS` fixed-size blocks.
pub struct MainMemory {
    blocks: [BlockData; N_BLOCKS],
}

impl MainMemory {
    /// Create main memory with arbitrary non-negative word values.
    ///
    /// When `seed` is `Some`, initialization is deterministic, so that
    /// tests can assert literal values (spec.md §9's explicit ask);
    /// otherwise a fresh, unseeded generator is used.
    pub fn new(seed: Option<u64>) -> MainMemory {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut blocks = [[0u32; 4]; N_BLOCKS];
        for block in blocks.iter_mut() {
            for word in block.iter_mut() {
                *word = rng.gen_range(0..INIT_WORD_RANGE);
            }
        }

        MainMemory { blocks }
    }

    /// All-zero main memory, used where tests need a known starting point.
    pub fn zeroed() -> MainMemory {
        MainMemory {
            blocks: [[0; 4]; N_BLOCKS],
        }
    }

    /// Read a block's current contents.
    pub fn block(&self, id: BlockId) -> &BlockData {
        &self.blocks[id.index()]
    }

    /// Write a block back to main memory.
    pub fn write_back(&mut self, id: BlockId, data: BlockData) {
        self.blocks[id.index()] = data;
    }

    /// All blocks, in declaration order.
    pub fn blocks(&self) -> &[BlockData; N_BLOCKS] {
        &self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_memory_is_all_zero() {
        let mm = MainMemory::zeroed();
        for block in mm.blocks() {
            assert_eq!(*block, [0, 0, 0, 0]);
        }
    }

    #[test]
    fn same_seed_yields_same_memory() {
        let a = MainMemory::new(Some(42));
        let b = MainMemory::new(Some(42));
        assert_eq!(a.blocks(), b.blocks());
    }

    #[test]
    fn write_back_updates_only_target_block() {
        let mut mm = MainMemory::zeroed();
        let target = BlockId::new(3).unwrap();
        mm.write_back(target, [1, 2, 3, 4]);
        assert_eq!(*mm.block(target), [1, 2, 3, 4]);
        assert_eq!(*mm.block(BlockId::new(4).unwrap()), [0, 0, 0, 0]);
    }
}

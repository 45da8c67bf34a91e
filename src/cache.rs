//! A private, fully-associative cache of [`Line`]s with FIFO replacement.

use crate::address::{BlockId, N_LINES};
use crate::line::Line;
use crate::state::CoherenceState;

/// A private cache: `N_LINES` fully-associative lines plus the FIFO cursor
/// naming the next line to be replaced on a miss-induced fill.
pub struct Cache {
    lines: [Line; N_LINES],
    fifo_index: usize,
}

impl Cache {
    /// A freshly-initialized cache: all lines invalid, FIFO cursor at 0.
    pub fn new() -> Cache {
        Cache {
            lines: [Line::invalid(); N_LINES],
            fifo_index: 0,
        }
    }

    /// This cache's lines, in declaration order.
    pub fn lines(&self) -> &[Line; N_LINES] {
        &self.lines
    }

    /// A mutable reference to the line at `index`.
    pub fn line_mut(&mut self, index: usize) -> &mut Line {
        &mut self.lines[index]
    }

    /// The next FIFO victim's index.
    pub fn fifo_index(&self) -> usize {
        self.fifo_index
    }

    /// Advance the FIFO cursor by one slot, modulo `N_LINES`, per the
    /// FIFO-monotonicity invariant.
    pub fn advance_fifo(&mut self) {
        self.fifo_index = (self.fifo_index + 1) % N_LINES;
    }

    /// Find the index of the non-invalid line holding `block`, if any.
    ///
    /// By the state-content-consistency invariant, at most one non-invalid
    /// line can match a given block id, so the first match found is the
    /// unambiguous answer.
    pub fn locate(&self, block: BlockId) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.state() != CoherenceState::Invalid && line.tag() == Some(block))
    }
}

impl Default for Cache {
    fn default() -> Cache {
        Cache::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cache_locates_nothing() {
        let cache = Cache::new();
        assert_eq!(cache.locate(BlockId::new(0).unwrap()), None);
    }

    #[test]
    fn locate_finds_resident_block() {
        let mut cache = Cache::new();
        let block = BlockId::new(5).unwrap();
        cache.line_mut(2).fill(block, [0; 4], CoherenceState::Shared);
        assert_eq!(cache.locate(block), Some(2));
    }

    #[test]
    fn fifo_advances_modulo_n_lines() {
        let mut cache = Cache::new();
        for expected in 1..=N_LINES {
            cache.advance_fifo();
            assert_eq!(cache.fifo_index(), expected % N_LINES);
        }
    }
}

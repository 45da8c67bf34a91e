//! A single cache line: a block's worth of data plus its coherence metadata.

use crate::address::{BlockId, WORDS_PER_BLOCK};
use crate::state::CoherenceState;

/// One block's worth of words. `Copy` so that fills and write-backs are
/// plain value copies — the filled line and its source never alias.
pub type BlockData = [u32; WORDS_PER_BLOCK];

/// A cache line: a resident block's data, its coherence state, and the tag
/// identifying which main-memory block it holds.
///
/// An `Invalid` line's `data` and `tag` carry no meaning and must never be
/// read by the engine; they are left at whatever the last occupant wrote.
#[derive(Clone, Copy, Debug)]
pub struct Line {
    data: BlockData,
    state: CoherenceState,
    tag: Option<BlockId>,
}

impl Line {
    /// A freshly-initialized, invalid line.
    pub fn invalid() -> Line {
        Line {
            data: [0; WORDS_PER_BLOCK],
            state: CoherenceState::Invalid,
            tag: None,
        }
    }

    /// The line's coherence state.
    pub fn state(&self) -> CoherenceState {
        self.state
    }

    /// Move the line to a new state without touching its data or tag.
    pub fn set_state(&mut self, state: CoherenceState) {
        self.state = state;
    }

    /// The block id this line holds, if it is not invalid.
    pub fn tag(&self) -> Option<BlockId> {
        if self.state == CoherenceState::Invalid {
            None
        } else {
            self.tag
        }
    }

    /// The line's data. Only meaningful when `state() != Invalid`.
    pub fn data(&self) -> &BlockData {
        &self.data
    }

    /// Read a single word from this line.
    ///
    /// # Panics
    ///
    /// Panics if the line is invalid or `offset` is out of range — callers
    /// must check `locate`/`tag` first, as the engine always does.
    pub fn read_word(&self, offset: usize) -> u32 {
        debug_assert!(self.state != CoherenceState::Invalid, "reading an invalid line");
        self.data[offset]
    }

    /// Overwrite this line in place with a freshly-loaded block.
    pub fn fill(&mut self, tag: BlockId, data: BlockData, state: CoherenceState) {
        self.data = data;
        self.tag = Some(tag);
        self.state = state;
    }

    /// Write a single word into this line's data, without changing state.
    pub fn write_word(&mut self, offset: usize, value: u32) {
        self.data[offset] = value;
    }
}

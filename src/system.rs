//! The coherence engine: the System value and its read/write/evict policy.
//!
//! This is the load-bearing module. Every transition here is driven
//! directly off spec.md §4; the peer-iteration order (ascending cache id,
//! skipping the requester) is part of the observable contract, not an
//! implementation detail, so it is threaded through every scan below via
//! [`CacheId::peers`].

use log::{debug, trace};

use crate::address::{Address, BlockId, CacheId, N_CACHES};
use crate::cache::Cache;
use crate::line::BlockData;
use crate::main_memory::MainMemory;
use crate::state::CoherenceState;

/// A read-only view of a single cache line, for the renderer.
#[derive(Clone, Copy, Debug)]
pub struct LineView {
    /// The block id this line holds, or `None` if invalid.
    pub tag: Option<BlockId>,
    /// The line's coherence state.
    pub state: CoherenceState,
    /// A deep copy of the line's data.
    pub data: BlockData,
}

/// A read-only view of one cache's lines.
#[derive(Clone, Debug)]
pub struct CacheView {
    /// This cache's id.
    pub id: CacheId,
    /// The cache's lines, in declaration order.
    pub lines: Vec<LineView>,
}

/// A read-only, fully independent snapshot of the whole system, consumed
/// by the renderer. Deep-copied so that mutating the live `System`
/// afterwards cannot be observed through a previously taken snapshot.
#[derive(Clone, Debug)]
pub struct SystemView {
    /// Main memory's blocks, in declaration order.
    pub memory: Vec<BlockData>,
    /// Every cache's view, in ascending id order.
    pub caches: Vec<CacheView>,
}

/// The whole simulated machine: main memory plus the private caches.
pub struct System {
    mm: MainMemory,
    caches: [Cache; N_CACHES],
}

impl System {
    /// Create a system with `N_CACHES` caches, all lines invalid, and main
    /// memory initialized per [`MainMemory::new`].
    pub fn new(seed: Option<u64>) -> System {
        System {
            mm: MainMemory::new(seed),
            caches: [Cache::new(), Cache::new(), Cache::new(), Cache::new()],
        }
    }

    /// Like [`System::new`], but main memory starts all-zero. Used by tests
    /// that assert literal scenario values.
    pub fn new_zeroed() -> System {
        System {
            mm: MainMemory::zeroed(),
            caches: [Cache::new(), Cache::new(), Cache::new(), Cache::new()],
        }
    }

    fn cache(&self, id: CacheId) -> &Cache {
        &self.caches[id.index()]
    }

    fn cache_mut(&mut self, id: CacheId) -> &mut Cache {
        &mut self.caches[id.index()]
    }

    /// Prepare the named line to be overwritten (spec.md §4.2).
    ///
    /// `I` and `E`/`S` lines are discarded silently. A `Modified` line is
    /// written back. An `Owned` line attempts hand-off to the first
    /// ascending-id peer holding the same block in `Shared`; failing that,
    /// it is written back.
    fn evict(&mut self, cache_id: CacheId, line_index: usize) {
        let line = self.cache(cache_id).lines()[line_index];
        match line.state() {
            CoherenceState::Invalid | CoherenceState::Exclusive | CoherenceState::Shared => {
                // Clean, or never loaded: main memory (or nothing) is
                // already authoritative.
            }
            CoherenceState::Modified => {
                let tag = line.tag().expect("modified line must have a tag");
                trace!("evict: writing back M line for block {}", tag);
                self.mm.write_back(tag, *line.data());
            }
            CoherenceState::Owned => {
                let tag = line.tag().expect("owned line must have a tag");
                let handoff = cache_id
                    .peers()
                    .find_map(|peer| self.cache(peer).locate(tag).map(|j| (peer, j)));

                match handoff {
                    Some((peer, j)) => {
                        trace!("evict: hand-off O block {} to peer {}", tag, peer);
                        self.cache_mut(peer).line_mut(j).set_state(CoherenceState::Owned);
                    }
                    None => {
                        trace!("evict: writing back O line for block {} (no S peer)", tag);
                        self.mm.write_back(tag, *line.data());
                    }
                }
            }
        }
    }

    /// Invalidate every peer line holding `block`, regardless of its
    /// current state, without writing anything back. Used on a write-hit
    /// where the mutator's data was just flushed to main memory, making a
    /// peer write-back redundant.
    fn invalidate_peers_no_writeback(&mut self, cache_id: CacheId, block: BlockId) {
        for peer in cache_id.peers() {
            if let Some(j) = self.cache(peer).locate(block) {
                self.cache_mut(peer).line_mut(j).set_state(CoherenceState::Invalid);
            }
        }
    }

    /// Invalidate every peer line holding `block`. Dirty (M/O) peer copies
    /// are written back to main memory first. Used on a write-miss, before
    /// installing the new exclusive-for-write copy.
    fn invalidate_peers_with_writeback(&mut self, cache_id: CacheId, block: BlockId) {
        for peer in cache_id.peers() {
            if let Some(j) = self.cache(peer).locate(block) {
                let peer_line = self.cache(peer).lines()[j];
                if peer_line.state().is_dirty() {
                    self.mm.write_back(block, *peer_line.data());
                }
                self.cache_mut(peer).line_mut(j).set_state(CoherenceState::Invalid);
            }
        }
    }

    /// Check invariants 2 and 3 (spec.md §3) for `block`: at most one cache
    /// holds it in `Modified`/`Exclusive`, at most one holds it in `Owned`,
    /// and an `M`/`E` holder is never accompanied by another non-invalid
    /// copy. Called at the end of every completed `read`/`write`, where the
    /// invariant must hold; a mid-transition call (e.g. inside `evict`,
    /// before the caller overwrites the evicted line) would see transient
    /// states that do not yet satisfy it.
    fn debug_assert_moesi_invariants(&self, block: BlockId) {
        if !cfg!(debug_assertions) {
            return;
        }
        let holders: Vec<CoherenceState> = CacheId::ALL
            .into_iter()
            .filter_map(|id| self.cache(id).locate(block).map(|i| self.cache(id).lines()[i].state()))
            .collect();

        let modified_or_exclusive = holders
            .iter()
            .filter(|s| matches!(s, CoherenceState::Modified | CoherenceState::Exclusive))
            .count();
        let owners = holders.iter().filter(|s| **s == CoherenceState::Owned).count();

        debug_assert!(
            modified_or_exclusive <= 1,
            "block {} held M/E in {} caches at once",
            block,
            modified_or_exclusive
        );
        debug_assert!(owners <= 1, "block {} held O in {} caches at once", block, owners);
        debug_assert!(
            modified_or_exclusive == 0 || holders.len() == 1,
            "block {} has an M/E line alongside another non-invalid copy",
            block
        );
    }

    /// Service a read request (spec.md §4.3).
    pub fn read(&mut self, cache_id: CacheId, address: Address) -> u32 {
        let block = address.block();
        let offset = address.offset_in_block();

        if let Some(i) = self.cache(cache_id).locate(block) {
            debug!("read: {} local hit on block {}", cache_id, block);
            let word = self.cache(cache_id).lines()[i].read_word(offset);
            self.debug_assert_moesi_invariants(block);
            return word;
        }

        if let Some((peer, j)) = cache_id
            .peers()
            .find_map(|peer| self.cache(peer).locate(block).map(|j| (peer, j)))
        {
            let peer_state = self.cache(peer).lines()[j].state();
            match peer_state {
                CoherenceState::Modified | CoherenceState::Exclusive => {
                    self.cache_mut(peer).line_mut(j).set_state(CoherenceState::Owned);
                }
                CoherenceState::Owned | CoherenceState::Shared => {
                    // Unchanged.
                }
                CoherenceState::Invalid => unreachable!("locate never returns an invalid line"),
            }
            let data = *self.cache(peer).lines()[j].data();
            debug!(
                "read: {} peer hit on block {} via {} ({:?} -> S)",
                cache_id, block, peer, peer_state
            );

            let slot = self.cache(cache_id).fifo_index();
            self.evict(cache_id, slot);
            self.cache_mut(cache_id).line_mut(slot).fill(block, data, CoherenceState::Shared);
            self.cache_mut(cache_id).advance_fifo();
            self.debug_assert_moesi_invariants(block);
            return data[offset];
        }

        debug!("read: {} miss on block {}, filling from main memory", cache_id, block);
        let data = *self.mm.block(block);
        let slot = self.cache(cache_id).fifo_index();
        self.evict(cache_id, slot);
        self.cache_mut(cache_id).line_mut(slot).fill(block, data, CoherenceState::Exclusive);
        self.cache_mut(cache_id).advance_fifo();
        self.debug_assert_moesi_invariants(block);
        data[offset]
    }

    /// Service a write request (spec.md §4.4).
    pub fn write(&mut self, cache_id: CacheId, address: Address, value: u32) -> u32 {
        let block = address.block();
        let offset = address.offset_in_block();

        if let Some(i) = self.cache(cache_id).locate(block) {
            let state = self.cache(cache_id).lines()[i].state();

            match state {
                CoherenceState::Modified | CoherenceState::Owned | CoherenceState::Shared => {
                    let data = *self.cache(cache_id).lines()[i].data();
                    debug!("write: {} hit ({:?}) on block {}, pre-flushing to MM", cache_id, state, block);
                    self.mm.write_back(block, data);
                    if state != CoherenceState::Modified {
                        self.invalidate_peers_no_writeback(cache_id, block);
                    }
                }
                CoherenceState::Exclusive => {
                    debug!("write: {} hit (E) on block {}, no peer holds it", cache_id, block);
                }
                CoherenceState::Invalid => unreachable!("locate never returns an invalid line"),
            }

            let line = self.cache_mut(cache_id).line_mut(i);
            line.write_word(offset, value);
            line.set_state(CoherenceState::Modified);
            self.debug_assert_moesi_invariants(block);
            return value;
        }

        debug!("write: {} miss on block {}, write-allocate", cache_id, block);
        let slot = self.cache(cache_id).fifo_index();
        self.evict(cache_id, slot);
        self.invalidate_peers_with_writeback(cache_id, block);

        let mut data = *self.mm.block(block);
        data[offset] = value;
        self.cache_mut(cache_id).line_mut(slot).fill(block, data, CoherenceState::Modified);
        self.cache_mut(cache_id).advance_fifo();
        self.debug_assert_moesi_invariants(block);

        value
    }

    /// A read-only, deep-copied snapshot of the whole system.
    pub fn snapshot(&self) -> SystemView {
        let memory = self.mm.blocks().to_vec();
        let caches = CacheId::ALL
            .into_iter()
            .map(|id| CacheView {
                id,
                lines: self
                    .cache(id)
                    .lines()
                    .iter()
                    .map(|line| LineView {
                        tag: line.tag(),
                        state: line.state(),
                        data: *line.data(),
                    })
                    .collect(),
            })
            .collect();

        SystemView { memory, caches }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: usize) -> Address {
        Address::new(n).unwrap()
    }

    #[test]
    fn cold_read_fills_exclusive() {
        let mut sys = System::new_zeroed();
        assert_eq!(sys.read(CacheId::Heloise, addr(5)), 0);
        let view = sys.snapshot();
        let line = view.caches[0].lines[0];
        assert_eq!(line.tag, Some(BlockId::new(1).unwrap()));
        assert_eq!(line.state, CoherenceState::Exclusive);
    }

    /// Scenario 1 from spec.md §8.
    #[test]
    fn scenario_cold_read_then_peer_sourced_read() {
        let mut sys = System::new_zeroed();
        assert_eq!(sys.read(CacheId::Heloise, addr(5)), 0);
        assert_eq!(sys.read(CacheId::Josiane, addr(5)), 0);

        let view = sys.snapshot();
        assert_eq!(view.caches[0].lines[0].state, CoherenceState::Owned);
        assert_eq!(view.caches[1].lines[0].state, CoherenceState::Shared);
        assert_eq!(view.caches[1].lines[0].tag, Some(BlockId::new(1).unwrap()));
        assert_eq!(view.caches[1].lines[0].data, [0, 0, 0, 0]);
    }

    /// Scenario 2 from spec.md §8.
    #[test]
    fn scenario_write_on_shared_hit_preflushes_and_invalidates() {
        let mut sys = System::new_zeroed();
        sys.read(CacheId::Heloise, addr(5));
        sys.read(CacheId::Josiane, addr(5));

        assert_eq!(sys.write(CacheId::Josiane, addr(5), 42), 42);

        let view = sys.snapshot();
        assert_eq!(view.caches[1].lines[0].state, CoherenceState::Modified);
        assert_eq!(view.caches[1].lines[0].data, [0, 42, 0, 0]);
        assert_eq!(view.caches[0].lines[0].state, CoherenceState::Invalid);
        assert_eq!(view.memory[1], [0, 0, 0, 0]);

        assert_eq!(sys.read(CacheId::Valeria, addr(5)), 42);
        let view = sys.snapshot();
        assert_eq!(view.caches[1].lines[0].state, CoherenceState::Owned);
        assert_eq!(view.caches[2].lines[0].state, CoherenceState::Shared);
        assert_eq!(view.caches[2].lines[0].data, [0, 42, 0, 0]);
    }

    /// Scenario 5 from spec.md §8: write-miss write-allocate from cold.
    #[test]
    fn scenario_write_miss_write_allocate() {
        let mut sys = System::new_zeroed();
        assert_eq!(sys.write(CacheId::Heloise, addr(0), 7), 7);

        let view = sys.snapshot();
        assert_eq!(view.caches[0].lines[0].tag, Some(BlockId::new(0).unwrap()));
        assert_eq!(view.caches[0].lines[0].state, CoherenceState::Modified);
        assert_eq!(view.caches[0].lines[0].data, [7, 0, 0, 0]);
        assert_eq!(view.memory[0], [0, 0, 0, 0]);
        for other in &view.caches[1..] {
            for line in &other.lines {
                assert_eq!(line.state, CoherenceState::Invalid);
            }
        }
    }

    /// Scenario 6 from spec.md §8: FIFO wrap-around, clean victim, no
    /// write-back.
    #[test]
    fn scenario_fifo_wraparound_clean_victim_no_writeback() {
        let mut sys = System::new_zeroed();
        for k in 0..5 {
            sys.read(CacheId::Heloise, addr(k * 4));
        }
        let view = sys.snapshot();
        // Fifth fill (k=4) reused line 0, which held block 0 (E, clean).
        assert_eq!(view.caches[0].lines[0].tag, Some(BlockId::new(4).unwrap()));
        assert_eq!(view.memory[0], [0, 0, 0, 0]);
    }

    #[test]
    fn read_idempotent_on_hit() {
        let mut sys = System::new_zeroed();
        let first = sys.read(CacheId::Heloise, addr(10));
        let view_before = sys.snapshot();
        let second = sys.read(CacheId::Heloise, addr(10));
        let view_after = sys.snapshot();
        assert_eq!(first, second);
        assert_eq!(
            view_before.caches[0].lines[2].state,
            view_after.caches[0].lines[2].state
        );
    }

    #[test]
    fn write_read_round_trip() {
        let mut sys = System::new_zeroed();
        sys.write(CacheId::Valeria, addr(20), 99);
        assert_eq!(sys.read(CacheId::Valeria, addr(20)), 99);
    }

    #[test]
    fn cross_cache_visibility_after_write() {
        let mut sys = System::new_zeroed();
        sys.write(CacheId::Heloise, addr(30), 17);
        for peer in [CacheId::Josiane, CacheId::Valeria, CacheId::Yandre] {
            assert_eq!(sys.read(peer, addr(30)), 17);
        }
    }

    #[test]
    fn fifo_victim_selection_order() {
        let mut sys = System::new_zeroed();
        for k in 0..4 {
            sys.read(CacheId::Heloise, addr(k * 4));
            let view = sys.snapshot();
            assert_eq!(view.caches[0].lines[k].tag, Some(BlockId::new(k).unwrap()));
        }
        sys.read(CacheId::Heloise, addr(16));
        let view = sys.snapshot();
        assert_eq!(view.caches[0].lines[0].tag, Some(BlockId::new(4).unwrap()));
    }

    #[test]
    fn at_most_one_owner_across_caches() {
        let mut sys = System::new_zeroed();
        sys.read(CacheId::Heloise, addr(5));
        sys.read(CacheId::Josiane, addr(5));
        sys.read(CacheId::Valeria, addr(5));

        let view = sys.snapshot();
        let owners = view
            .caches
            .iter()
            .flat_map(|c| &c.lines)
            .filter(|l| l.state == CoherenceState::Owned)
            .count();
        assert!(owners <= 1);
    }
}

//! Addresses, blocks, and cache identifiers.

use std::fmt;

use crate::error::EngineError;

/// Words per block/line.
pub const WORDS_PER_BLOCK: usize = 4;

/// Blocks held by main memory.
pub const N_BLOCKS: usize = 32;

/// Total addressable words, `N_BLOCKS * WORDS_PER_BLOCK`.
pub const N_ADDRESSES: usize = N_BLOCKS * WORDS_PER_BLOCK;

/// Number of private caches in the system.
pub const N_CACHES: usize = 4;

/// Lines per cache (fully associative).
pub const N_LINES: usize = 4;

/// A word address in `[0, N_ADDRESSES)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(usize);

impl Address {
    /// Build an address, checking it against `N_ADDRESSES`.
    pub fn new(addr: usize) -> Result<Address, EngineError> {
        if addr < N_ADDRESSES {
            Ok(Address(addr))
        } else {
            Err(EngineError::InvalidAddress(addr))
        }
    }

    /// The raw word index.
    pub fn index(&self) -> usize {
        self.0
    }

    /// The block this address falls in.
    pub fn block(&self) -> Block {
        Block(self.0 / WORDS_PER_BLOCK)
    }

    /// The word's offset within its block.
    pub fn offset_in_block(&self) -> usize {
        self.0 % WORDS_PER_BLOCK
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The index of a block of memory, shared by main memory and cache tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(usize);

/// Alias kept for readability at call sites that think in terms of blocks.
pub type Block = BlockId;

impl BlockId {
    /// Build a block id, checking it against `N_BLOCKS`.
    pub fn new(block: usize) -> Result<BlockId, EngineError> {
        if block < N_BLOCKS {
            Ok(BlockId(block))
        } else {
            Err(EngineError::InvalidAddress(block * WORDS_PER_BLOCK))
        }
    }

    /// The raw block index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one of the four private caches.
///
/// Named after the menu characters `h, j, v, y` from the driver's prompt,
/// in ascending order — this ordering is part of the protocol contract
/// (peer iteration and Owner hand-off both walk caches ascending by id).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CacheId {
    /// Cache 0, menu character `h`.
    Heloise,
    /// Cache 1, menu character `j`.
    Josiane,
    /// Cache 2, menu character `v`.
    Valeria,
    /// Cache 3, menu character `y`.
    Yandre,
}

impl CacheId {
    /// All cache ids in ascending order.
    pub const ALL: [CacheId; N_CACHES] = [
        CacheId::Heloise,
        CacheId::Josiane,
        CacheId::Valeria,
        CacheId::Yandre,
    ];

    /// This cache id's index into `System::caches`.
    pub fn index(&self) -> usize {
        match self {
            CacheId::Heloise => 0,
            CacheId::Josiane => 1,
            CacheId::Valeria => 2,
            CacheId::Yandre => 3,
        }
    }

    /// Build a `CacheId` from a raw index in `[0, N_CACHES)`.
    pub fn from_index(index: usize) -> Result<CacheId, EngineError> {
        match index {
            0 => Ok(CacheId::Heloise),
            1 => Ok(CacheId::Josiane),
            2 => Ok(CacheId::Valeria),
            3 => Ok(CacheId::Yandre),
            _ => Err(EngineError::InvalidCacheId(index)),
        }
    }

    /// Build a `CacheId` from its menu character (`h`, `j`, `v`, `y`).
    pub fn from_menu_char(c: char) -> Option<CacheId> {
        match c.to_ascii_lowercase() {
            'h' => Some(CacheId::Heloise),
            'j' => Some(CacheId::Josiane),
            'v' => Some(CacheId::Valeria),
            'y' => Some(CacheId::Yandre),
            _ => None,
        }
    }

    /// Every cache id other than `self`, ascending.
    pub fn peers(&self) -> impl Iterator<Item = CacheId> {
        let skip = *self;
        CacheId::ALL.into_iter().filter(move |id| *id != skip)
    }
}

impl fmt::Display for CacheId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheId::Heloise => "Heloise",
            CacheId::Josiane => "Josiane",
            CacheId::Valeria => "Valeria",
            CacheId::Yandre => "Yandre",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_block_and_offset() {
        let a = Address::new(5).unwrap();
        assert_eq!(a.block().index(), 1);
        assert_eq!(a.offset_in_block(), 1);
    }

    #[test]
    fn address_rejects_out_of_range() {
        assert!(Address::new(N_ADDRESSES).is_err());
    }

    #[test]
    fn cache_id_peers_are_ascending_and_exclude_self() {
        let peers: Vec<_> = CacheId::Josiane.peers().collect();
        assert_eq!(peers, vec![CacheId::Heloise, CacheId::Valeria, CacheId::Yandre]);
    }

    #[test]
    fn cache_id_roundtrips_through_index() {
        for id in CacheId::ALL {
            assert_eq!(CacheId::from_index(id.index()).unwrap(), id);
        }
    }

    #[test]
    fn cache_id_from_menu_char() {
        assert_eq!(CacheId::from_menu_char('H'), Some(CacheId::Heloise));
        assert_eq!(CacheId::from_menu_char('y'), Some(CacheId::Yandre));
        assert_eq!(CacheId::from_menu_char('x'), None);
    }
}

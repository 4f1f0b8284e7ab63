//! Word-addressed backing stores.
//!
//! Two flat stores back the cache: the primary store (RAM) and the secondary
//! store (the swap/disk model). Physical addresses are word indices; an
//! address below the primary limit belongs to the primary store, anything
//! above it is a secondary address after subtracting the limit.

use crate::common::{MemoryError, Word};

use super::cache::BackingStore;

/// Which tier a physical address routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryTier {
    /// Primary store (RAM).
    Primary,
    /// Secondary store (swap/disk model).
    Secondary,
}

/// A flat vector of words with checked access.
#[derive(Debug)]
struct WordStore {
    words: Vec<Word>,
}

impl WordStore {
    fn new(size: Word) -> Self {
        Self {
            words: vec![0; size as usize],
        }
    }

    fn read(&self, addr: Word) -> Option<Word> {
        self.words.get(addr as usize).copied()
    }

    fn write(&mut self, addr: Word, data: Word) -> bool {
        match self.words.get_mut(addr as usize) {
            Some(slot) => {
                *slot = data;
                true
            }
            None => false,
        }
    }

    fn len(&self) -> Word {
        self.words.len() as Word
    }
}

/// The primary and secondary store behind one physical address space.
#[derive(Debug)]
pub struct StoreBank {
    primary: WordStore,
    secondary: WordStore,
}

impl StoreBank {
    /// Creates a bank with the given store sizes in words.
    pub fn new(primary_words: Word, secondary_words: Word) -> Self {
        Self {
            primary: WordStore::new(primary_words),
            secondary: WordStore::new(secondary_words),
        }
    }

    /// First physical address past the primary store.
    pub fn primary_limit(&self) -> Word {
        self.primary.len()
    }

    /// Routes a physical address to its tier.
    pub fn tier(&self, addr: Word) -> MemoryTier {
        if addr < self.primary_limit() {
            MemoryTier::Primary
        } else {
            MemoryTier::Secondary
        }
    }

    /// Reads a physical word from whichever tier holds it.
    pub fn read(&self, addr: Word) -> Result<Word, MemoryError> {
        let word = match self.tier(addr) {
            MemoryTier::Primary => self.primary.read(addr),
            MemoryTier::Secondary => self.secondary.read(addr - self.primary_limit()),
        };
        word.ok_or(MemoryError::BadPhysical(addr))
    }

    /// Writes a physical word to whichever tier holds it.
    pub fn write(&mut self, addr: Word, data: Word) -> Result<(), MemoryError> {
        let limit = self.primary_limit();
        let ok = match self.tier(addr) {
            MemoryTier::Primary => self.primary.write(addr, data),
            MemoryTier::Secondary => self.secondary.write(addr - limit, data),
        };
        if ok {
            Ok(())
        } else {
            Err(MemoryError::BadPhysical(addr))
        }
    }
}

impl BackingStore for StoreBank {
    /// Write-back sink for evicted dirty cache lines.
    ///
    /// A failed write-back is logged and dropped; eviction must not unwind
    /// into the access that triggered it.
    fn write_back(&mut self, addr: Word, data: Word) {
        if let Err(err) = self.write(addr, data) {
            tracing::error!("write-back failed at {addr}: {err}");
        }
    }
}

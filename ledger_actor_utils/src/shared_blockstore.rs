use std::rc::Rc;

use anyhow::Result;
use cid::Cid;
use fvm_ipld_blockstore::MemoryBlockstore;

/// A shared wrapper around [`MemoryBlockstore`]
///
/// Clones reference the same underlying store, so ledger state flushed through one runtime can be
/// reloaded through another.
#[derive(Debug, Clone, Default)]
pub struct SharedMemoryBlockstore {
    store: Rc<MemoryBlockstore>,
}

impl SharedMemoryBlockstore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if both handles point at the same store
    pub fn shares_with(&self, other: &SharedMemoryBlockstore) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }
}

impl fvm_ipld_blockstore::Blockstore for SharedMemoryBlockstore {
    fn get(&self, k: &Cid) -> Result<Option<Vec<u8>>> {
        self.store.get(k)
    }

    fn put_keyed(&self, k: &Cid, block: &[u8]) -> Result<()> {
        self.store.put_keyed(k, block)
    }

    fn has(&self, k: &Cid) -> Result<bool> {
        self.store.has(k)
    }
}

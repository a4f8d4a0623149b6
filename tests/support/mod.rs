#![allow(dead_code)]

pub mod architecture;
pub mod temp_db;

use std::sync::Arc;

use qa_ledger::adapter::outbound::memory::MemoryStore;
use qa_ledger::infrastructure::factory::LedgerStore;
use qa_ledger::infrastructure::Services;

/// Services over a fresh in-memory store.
pub fn memory_services() -> Services {
    Services::new(LedgerStore::Memory(Arc::new(MemoryStore::new())))
}

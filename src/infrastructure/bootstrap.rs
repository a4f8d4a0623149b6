//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use crate::application::{Messenger, SubjectService, VoteLedger};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::{build_store, LedgerStore};

/// The application services wired over one shared store.
pub struct Services {
    pub store: LedgerStore,
    pub subjects: SubjectService<LedgerStore>,
    pub ledger: VoteLedger<LedgerStore>,
    pub messenger: Messenger<LedgerStore>,
}

impl Services {
    /// Wire services over an existing store.
    #[must_use]
    pub fn new(store: LedgerStore) -> Self {
        let shared = Arc::new(store.clone());
        Self {
            subjects: SubjectService::new(Arc::clone(&shared)),
            ledger: VoteLedger::new(Arc::clone(&shared)),
            messenger: Messenger::new(shared),
            store,
        }
    }
}

/// Open the configured store and wire the services over it.
///
/// # Errors
/// Returns an error if the store cannot be opened.
pub fn build_services(config: &Config) -> Result<Services> {
    Ok(Services::new(build_store(&config.storage)?))
}

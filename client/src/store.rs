//! The JSON-backed state file pairing an engine snapshot with the
//! reference ledger.

use std::path::Path;
use std::sync::Arc;

use covenant_core::interface::{load_state_data, save_state_data};
use covenant_core::ledger::{LedgerSnapshot, MemoryLedger};
use covenant_core::{AccountId, Engine, EngineSnapshot};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Everything a CLI invocation needs to resume where the previous one
/// stopped.
#[derive(Debug, Serialize, Deserialize)]
pub struct StateFile {
    pub engine: EngineSnapshot,
    pub ledger: LedgerSnapshot,
}

impl StateFile {
    /// Fresh state bound to an initial arbitrator, with an empty ledger.
    pub fn bootstrap(arbitrator: AccountId) -> Self {
        Self {
            engine: EngineSnapshot {
                arbitrator,
                records: Vec::new(),
            },
            ledger: LedgerSnapshot::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(load_state_data(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(save_state_data(path, self)?)
    }

    /// Rehydrates the engine and the ledger it is bound to.
    pub fn into_parts(self) -> (Engine, Arc<MemoryLedger>) {
        let ledger = Arc::new(MemoryLedger::restore(self.ledger));
        let engine = Engine::restore(ledger.clone(), self.engine);
        (engine, ledger)
    }

    /// Captures the current engine and ledger state for persistence.
    pub async fn capture(engine: &Engine, ledger: &MemoryLedger) -> Self {
        Self {
            engine: engine.snapshot().await,
            ledger: ledger.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use covenant_core::EscrowState;

    use super::*;

    #[tokio::test]
    async fn state_file_roundtrip_preserves_escrows_and_balances() {
        let arbitrator = AccountId::from_bytes(*b"admin");
        let buyer = AccountId::from_bytes(*b"buyer");
        let seller = AccountId::from_bytes(*b"seller");

        let (engine, ledger) = StateFile::bootstrap(arbitrator.clone()).into_parts();
        ledger.set_balance(&buyer, 400);
        engine
            .create_escrow(&buyer, &seller, "1", 400)
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("covenant_state.json");
        StateFile::capture(&engine, &ledger)
            .await
            .save(&path)
            .unwrap();

        let (engine, ledger) = StateFile::load(&path).unwrap().into_parts();
        assert_eq!(engine.arbitrator(), arbitrator);
        assert_eq!(ledger.custody_balance(), 400);

        // the reloaded engine picks the lifecycle up where it stopped
        let record = engine.fulfill_escrow(&buyer, "1").await.unwrap();
        assert_eq!(record.state, EscrowState::Fulfilled);
        assert_eq!(engine.balance_of(&seller).await.unwrap(), 400);
    }
}

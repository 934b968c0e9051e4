//! In-memory reference implementation of [`AssetLedger`] for tests and
//! local tooling. Mirrors the behavior of a pausable, freezable token
//! ledger without any backing chain.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::{AssetLedger, TransferRejected};
use crate::identity::AccountId;

#[derive(Debug, Default)]
struct State {
    balances: HashMap<AccountId, u64>,
    frozen: HashSet<AccountId>,
    custody: u64,
    paused: bool,
}

/// A pausable, freezable in-memory token ledger.
///
/// Administrative operations (`set_balance`, `freeze_account`,
/// `set_paused`) carry no authorization of their own; gating them behind
/// an operator identity is the embedding application's concern.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<State>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `account` with `amount`, creating it if absent.
    pub fn set_balance(&self, account: &AccountId, amount: u64) {
        self.state
            .write()
            .balances
            .insert(account.clone(), amount);
    }

    /// Marks `account` as frozen (or lifts the freeze). Frozen accounts
    /// cannot fund an escrow.
    pub fn freeze_account(&self, account: &AccountId, frozen: bool) {
        let mut state = self.state.write();
        if frozen {
            state.frozen.insert(account.clone());
        } else {
            state.frozen.remove(account);
        }
    }

    /// Starts or stops the ledger-wide emergency stop.
    pub fn set_paused(&self, paused: bool) {
        self.state.write().paused = paused;
    }

    /// Funds currently locked in escrow custody.
    pub fn custody_balance(&self) -> u64 {
        self.state.read().custody
    }

    /// Point-in-time copy of the ledger for persistence.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read();
        LedgerSnapshot {
            balances: state.balances.clone(),
            frozen: state.frozen.iter().cloned().collect(),
            custody: state.custody,
            paused: state.paused,
        }
    }

    /// Rebuilds a ledger from a persisted snapshot.
    pub fn restore(snapshot: LedgerSnapshot) -> Self {
        Self {
            state: RwLock::new(State {
                balances: snapshot.balances,
                frozen: snapshot.frozen.into_iter().collect(),
                custody: snapshot.custody,
                paused: snapshot.paused,
            }),
        }
    }
}

#[async_trait]
impl AssetLedger for MemoryLedger {
    async fn lock(
        &self,
        from: &AccountId,
        amount: u64,
        _escrow_ref: &str,
    ) -> std::result::Result<(), TransferRejected> {
        let mut state = self.state.write();
        if state.paused {
            return Err(TransferRejected::paused());
        }
        if state.frozen.contains(from) {
            return Err(TransferRejected(format!("account {from} is frozen")));
        }
        let balance = state.balances.get(from).copied().unwrap_or(0);
        if balance < amount {
            return Err(TransferRejected(format!(
                "insufficient funds: {from} holds {balance}, needs {amount}"
            )));
        }
        state.balances.insert(from.clone(), balance - amount);
        state.custody += amount;
        Ok(())
    }

    async fn release(
        &self,
        to: &AccountId,
        amount: u64,
        escrow_ref: &str,
    ) -> std::result::Result<(), TransferRejected> {
        let mut state = self.state.write();
        if state.paused {
            return Err(TransferRejected::paused());
        }
        if state.custody < amount {
            return Err(TransferRejected(format!(
                "custody holds {} but escrow `{escrow_ref}` asked to release {amount}",
                state.custody
            )));
        }
        state.custody -= amount;
        *state.balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }

    async fn balance_of(
        &self,
        account: &AccountId,
    ) -> std::result::Result<u64, TransferRejected> {
        Ok(self.state.read().balances.get(account).copied().unwrap_or(0))
    }

    async fn is_paused(&self) -> bool {
        self.state.read().paused
    }
}

/// Serializable form of [`MemoryLedger`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub balances: HashMap<AccountId, u64>,
    pub frozen: Vec<AccountId>,
    pub custody: u64,
    pub paused: bool,
}

//! Transition engine: binds each escrow operation to a role check, a
//! state precondition, and a fund movement against the asset ledger.
//!
//! Records live in a concurrent map of per-asset slots, each guarded by
//! its own async mutex. A transition holds exactly one slot's lock across
//! the collaborator call, so read-check-move-commit is linearizable per
//! record while transitions on distinct asset ids never contend. The new
//! state is committed only after the fund movement succeeds; any failure
//! leaves the record untouched.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::TransferRejected;
use crate::escrow::{AssetId, EscrowRecord, EscrowState, Role};
use crate::identity::AccountId;
use crate::interface::EngineSnapshot;
use crate::ledger::AssetLedger;
use crate::{EscrowError, Result};

/// The seller's answer to a buyer's cancellation proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalDecision {
    /// Agree to cancel: funds go back to the buyer.
    Accept,
    /// Refuse: the escrow awaits arbitration.
    Reject,
}

/// Fund movement accompanying a state transition. Creation's lock is the
/// only other movement and is handled by [`Engine::create_escrow`].
enum FundAction {
    None,
    ReleaseToBuyer,
    ReleaseToSeller,
}

/// One escrow record slot; `None` until a creation fills it. Slots are
/// never removed, so terminal records keep rejecting stale calls.
type Slot = Arc<Mutex<Option<EscrowRecord>>>;

/// The custody and arbitration engine.
///
/// Instantiated already bound to an asset-ledger collaborator and an
/// initial arbitrator identity. All operations take the authenticated
/// caller identity as their first argument; credential resolution happens
/// upstream.
pub struct Engine {
    ledger: Arc<dyn AssetLedger>,
    arbitrator: RwLock<AccountId>,
    records: DashMap<AssetId, Slot>,
}

impl Engine {
    pub fn new(ledger: Arc<dyn AssetLedger>, arbitrator: AccountId) -> Self {
        Self {
            ledger,
            arbitrator: RwLock::new(arbitrator),
            records: DashMap::new(),
        }
    }

    /// Locks `amount` from the buyer into custody and creates the record
    /// in `Held` state.
    ///
    /// The caller is the buyer. Fund lock and record insertion are
    /// atomic: if the ledger rejects the lock, no record is created.
    ///
    /// # Errors
    ///
    /// `SelfDeal` if `buyer == seller`, `DuplicateAsset` if a record for
    /// `asset_id` already exists, `Transfer` if the ledger is paused or
    /// rejects the fund lock.
    pub async fn create_escrow(
        &self,
        buyer: &AccountId,
        seller: &AccountId,
        asset_id: &str,
        amount: u64,
    ) -> Result<EscrowRecord> {
        if buyer == seller {
            return Err(EscrowError::SelfDeal);
        }

        let slot = self
            .records
            .entry(asset_id.to_owned())
            .or_default()
            .clone();
        let mut guard = slot.lock().await;
        if guard.is_some() {
            return Err(EscrowError::DuplicateAsset(asset_id.to_owned()));
        }

        self.guard_paused().await?;
        self.ledger.lock(buyer, amount, asset_id).await?;

        let record = EscrowRecord::new(asset_id, buyer.clone(), seller.clone(), amount);
        *guard = Some(record.clone());
        tracing::info!(asset_id, amount, "escrow created");
        Ok(record)
    }

    /// Buyer confirms delivery: releases the funds to the seller.
    pub async fn fulfill_escrow(
        &self,
        caller: &AccountId,
        asset_id: &str,
    ) -> Result<EscrowRecord> {
        self.transition(
            caller,
            asset_id,
            Role::Buyer,
            EscrowState::Held,
            EscrowState::Fulfilled,
            FundAction::ReleaseToSeller,
        )
        .await
    }

    /// Seller backs out: returns the funds to the buyer.
    pub async fn cancel_escrow(
        &self,
        caller: &AccountId,
        asset_id: &str,
    ) -> Result<EscrowRecord> {
        self.transition(
            caller,
            asset_id,
            Role::Seller,
            EscrowState::Held,
            EscrowState::Cancelled,
            FundAction::ReleaseToBuyer,
        )
        .await
    }

    /// Buyer proposes to cancel; funds stay in custody until the seller
    /// answers.
    pub async fn propose_cancellation(
        &self,
        caller: &AccountId,
        asset_id: &str,
    ) -> Result<EscrowRecord> {
        self.transition(
            caller,
            asset_id,
            Role::Buyer,
            EscrowState::Held,
            EscrowState::BuyerProposedCancellation,
            FundAction::None,
        )
        .await
    }

    /// Seller answers a pending cancellation proposal.
    ///
    /// Both branches share the same role and state precondition:
    /// accepting returns the funds to the buyer and settles the escrow as
    /// `Cancelled`; rejecting moves no funds and hands the dispute to the
    /// arbitrator.
    pub async fn resolve_cancellation(
        &self,
        caller: &AccountId,
        asset_id: &str,
        decision: ProposalDecision,
    ) -> Result<EscrowRecord> {
        let (next, fund) = match decision {
            ProposalDecision::Accept => (EscrowState::Cancelled, FundAction::ReleaseToBuyer),
            ProposalDecision::Reject => {
                (EscrowState::SellerRejectedCancellation, FundAction::None)
            }
        };
        self.transition(
            caller,
            asset_id,
            Role::Seller,
            EscrowState::BuyerProposedCancellation,
            next,
            fund,
        )
        .await
    }

    /// Arbitrator sides with the buyer on a rejected proposal: funds go
    /// back to the buyer.
    pub async fn cancel_escrow_arbitrating(
        &self,
        caller: &AccountId,
        asset_id: &str,
    ) -> Result<EscrowRecord> {
        self.transition(
            caller,
            asset_id,
            Role::Arbitrator,
            EscrowState::SellerRejectedCancellation,
            EscrowState::Cancelled,
            FundAction::ReleaseToBuyer,
        )
        .await
    }

    /// Arbitrator sides with the seller on a rejected proposal: funds go
    /// to the seller.
    pub async fn fulfill_escrow_arbitrating(
        &self,
        caller: &AccountId,
        asset_id: &str,
    ) -> Result<EscrowRecord> {
        self.transition(
            caller,
            asset_id,
            Role::Arbitrator,
            EscrowState::SellerRejectedCancellation,
            EscrowState::Fulfilled,
            FundAction::ReleaseToSeller,
        )
        .await
    }

    /// Read-only snapshot of one escrow record.
    ///
    /// # Errors
    ///
    /// `NotFound` if no escrow was ever created for `asset_id`.
    pub async fn escrow(&self, asset_id: &str) -> Result<EscrowRecord> {
        let slot = match self.records.get(asset_id) {
            Some(entry) => entry.value().clone(),
            None => return Err(EscrowError::NotFound(asset_id.to_owned())),
        };
        let guard = slot.lock().await;
        guard
            .clone()
            .ok_or_else(|| EscrowError::NotFound(asset_id.to_owned()))
    }

    /// Current balance of `account`, forwarded to the collaborator.
    pub async fn balance_of(&self, account: &AccountId) -> Result<u64> {
        Ok(self.ledger.balance_of(account).await?)
    }

    /// The current arbitrator identity.
    pub fn arbitrator(&self) -> AccountId {
        self.arbitrator.read().clone()
    }

    /// Hands the arbitrator role to `new_arbitrator`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless the caller is the current arbitrator,
    /// `Transfer` while the ledger reports an emergency stop.
    pub async fn transfer_ownership(
        &self,
        caller: &AccountId,
        new_arbitrator: AccountId,
    ) -> Result<()> {
        self.guard_paused().await?;
        let mut arbitrator = self.arbitrator.write();
        if *arbitrator != *caller {
            return Err(EscrowError::Unauthorized {
                required: Role::Arbitrator,
            });
        }
        tracing::info!(%new_arbitrator, "arbitrator role transferred");
        *arbitrator = new_arbitrator;
        Ok(())
    }

    /// Point-in-time copy of all records plus the arbitrator identity,
    /// sorted by asset id.
    pub async fn snapshot(&self) -> EngineSnapshot {
        let slots: Vec<Slot> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        let mut records = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(record) = slot.lock().await.clone() {
                records.push(record);
            }
        }
        records.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));
        EngineSnapshot {
            arbitrator: self.arbitrator(),
            records,
        }
    }

    /// Rebuilds an engine from a persisted snapshot, bound to `ledger`.
    pub fn restore(ledger: Arc<dyn AssetLedger>, snapshot: EngineSnapshot) -> Self {
        let engine = Self::new(ledger, snapshot.arbitrator);
        for record in snapshot.records {
            engine.records.insert(
                record.asset_id.clone(),
                Arc::new(Mutex::new(Some(record))),
            );
        }
        engine
    }

    /// Loads the record, checks role and state, performs the fund action,
    /// and commits `next` only on its success, all under the record's
    /// own lock.
    async fn transition(
        &self,
        caller: &AccountId,
        asset_id: &str,
        role: Role,
        required: EscrowState,
        next: EscrowState,
        fund: FundAction,
    ) -> Result<EscrowRecord> {
        let slot = match self.records.get(asset_id) {
            Some(entry) => entry.value().clone(),
            None => return Err(EscrowError::NotFound(asset_id.to_owned())),
        };
        let mut guard = slot.lock().await;
        let record = guard
            .as_mut()
            .ok_or_else(|| EscrowError::NotFound(asset_id.to_owned()))?;

        match role {
            Role::Arbitrator => self.ensure_arbitrator(caller)?,
            party => record.ensure_party(party, caller)?,
        }
        record.ensure_state(required).inspect_err(|e| {
            tracing::debug!(asset_id, %e, "transition rejected");
        })?;

        self.guard_paused().await?;
        match fund {
            FundAction::None => {}
            FundAction::ReleaseToBuyer => {
                self.ledger
                    .release(&record.buyer, record.amount, asset_id)
                    .await?
            }
            FundAction::ReleaseToSeller => {
                self.ledger
                    .release(&record.seller, record.amount, asset_id)
                    .await?
            }
        }

        record.state = next;
        tracing::info!(asset_id, state = %next, "escrow transitioned");
        Ok(record.clone())
    }

    fn ensure_arbitrator(&self, caller: &AccountId) -> Result<()> {
        if *self.arbitrator.read() == *caller {
            Ok(())
        } else {
            Err(EscrowError::Unauthorized {
                required: Role::Arbitrator,
            })
        }
    }

    /// Forwards the collaborator's emergency-stop check; the engine does
    /// not interpret pause semantics itself.
    async fn guard_paused(&self) -> Result<()> {
        if self.ledger.is_paused().await {
            return Err(TransferRejected::paused().into());
        }
        Ok(())
    }
}

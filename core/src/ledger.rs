//! The asset-ledger collaborator contract.
//!
//! The engine consumes, and does not implement, balance storage and
//! transfer. Implementations bind these operations to a concrete backend
//! (an on-chain token, a bank core, the in-memory [`MemoryLedger`]).

use async_trait::async_trait;

pub use crate::error::TransferRejected;
use crate::identity::AccountId;

mod memory;
pub use memory::{LedgerSnapshot, MemoryLedger};

/// Custody operations the transition engine relies on.
///
/// Implementations must not suspend indefinitely: a movement that cannot
/// complete (insufficient funds, frozen account, emergency stop, backend
/// timeout) fails with [`TransferRejected`]. The engine only needs
/// success or failure and never distinguishes the sub-cause.
#[async_trait]
pub trait AssetLedger: Send + Sync {
    /// Moves `amount` from `from` into escrow custody, on behalf of the
    /// escrow keyed by `escrow_ref`.
    async fn lock(
        &self,
        from: &AccountId,
        amount: u64,
        escrow_ref: &str,
    ) -> std::result::Result<(), TransferRejected>;

    /// Moves `amount` out of escrow custody to `to`, on behalf of the
    /// escrow keyed by `escrow_ref`.
    async fn release(
        &self,
        to: &AccountId,
        amount: u64,
        escrow_ref: &str,
    ) -> std::result::Result<(), TransferRejected>;

    /// Current balance of `account`.
    async fn balance_of(
        &self,
        account: &AccountId,
    ) -> std::result::Result<u64, TransferRejected>;

    /// Whether a ledger-wide emergency stop is in effect.
    async fn is_paused(&self) -> bool;
}

//! Escrow records and their lifecycle states.

use serde::{Deserialize, Serialize};

use crate::identity::AccountId;
use crate::{EscrowError, Result};

/// Opaque external identifier keying an escrow record.
///
/// Supplied by the caller at creation; the engine never interprets it.
pub type AssetId = String;

/// Lifecycle of an escrow record.
///
/// `Cancelled` and `Fulfilled` are terminal; once reached, no further
/// transition mutates the record. No transition ever targets `Held`
/// again. The discriminants are the state codes exposed in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowState {
    /// Funds locked in custody; awaiting fulfilment or cancellation.
    Held = 0,
    /// Funds returned to the buyer. Terminal.
    Cancelled = 1,
    /// Funds released to the seller. Terminal.
    Fulfilled = 2,
    /// Buyer asked to cancel; waiting on the seller's answer.
    BuyerProposedCancellation = 3,
    /// Seller refused the cancellation; awaiting arbitration.
    SellerRejectedCancellation = 4,
}

impl EscrowState {
    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Fulfilled)
    }

    /// Numeric state code, stable across snapshots.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// The canonical state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Held => "Held",
            Self::Cancelled => "Cancelled",
            Self::Fulfilled => "Fulfilled",
            Self::BuyerProposedCancellation => "BuyerProposedCancellation",
            Self::SellerRejectedCancellation => "SellerRejectedCancellation",
        }
    }
}

impl std::fmt::Display for EscrowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The role an operation requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Buyer,
    Seller,
    Arbitrator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Arbitrator => "arbitrator",
        };
        write!(f, "{s}")
    }
}

/// The per-asset custody entry tracking buyer, seller, amount, and
/// lifecycle state.
///
/// `asset_id`, `buyer`, `seller`, and `amount` are immutable after
/// creation; only `state` moves, and only through the transition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// External asset identifier this escrow is keyed by.
    pub asset_id: AssetId,
    /// Who deposited the funds and will receive them back on cancellation.
    pub buyer: AccountId,
    /// Who receives the funds on fulfilment.
    pub seller: AccountId,
    /// Escrowed quantity, fixed at creation.
    pub amount: u64,
    /// Where in the lifecycle the escrow currently is.
    pub state: EscrowState,
}

impl EscrowRecord {
    pub(crate) fn new(
        asset_id: impl Into<AssetId>,
        buyer: AccountId,
        seller: AccountId,
        amount: u64,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            buyer,
            seller,
            amount,
            state: EscrowState::Held,
        }
    }

    /// Checks the caller against the *stored* party for `role`.
    ///
    /// Identities passed as arguments are never trusted for
    /// authorization; only the record's own fields are.
    ///
    /// # Errors
    ///
    /// Returns `EscrowError::Unauthorized` naming the required role.
    /// `Role::Arbitrator` is not a stored party and always fails here;
    /// the engine checks it against its own configuration.
    pub fn ensure_party(&self, role: Role, caller: &AccountId) -> Result<()> {
        let authorized = match role {
            Role::Buyer => &self.buyer == caller,
            Role::Seller => &self.seller == caller,
            Role::Arbitrator => false,
        };
        if authorized {
            Ok(())
        } else {
            Err(EscrowError::Unauthorized { required: role })
        }
    }

    /// Checks the record is in the state an operation requires.
    ///
    /// # Errors
    ///
    /// Returns `EscrowError::InvalidState` identifying the required state.
    pub fn ensure_state(&self, required: EscrowState) -> Result<()> {
        if self.state == required {
            Ok(())
        } else {
            Err(EscrowError::InvalidState {
                required,
                actual: self.state,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> EscrowRecord {
        EscrowRecord::new(
            "asset-1",
            AccountId::from_bytes(*b"buyer"),
            AccountId::from_bytes(*b"seller"),
            400,
        )
    }

    #[test]
    fn new_record_is_held() {
        let r = record();
        assert_eq!(r.state, EscrowState::Held);
        assert_eq!(r.amount, 400);
    }

    #[test]
    fn state_codes_are_stable() {
        assert_eq!(EscrowState::Held.code(), 0);
        assert_eq!(EscrowState::Cancelled.code(), 1);
        assert_eq!(EscrowState::Fulfilled.code(), 2);
        assert_eq!(EscrowState::BuyerProposedCancellation.code(), 3);
        assert_eq!(EscrowState::SellerRejectedCancellation.code(), 4);
    }

    #[test]
    fn only_settled_states_are_terminal() {
        assert!(!EscrowState::Held.is_terminal());
        assert!(!EscrowState::BuyerProposedCancellation.is_terminal());
        assert!(!EscrowState::SellerRejectedCancellation.is_terminal());
        assert!(EscrowState::Cancelled.is_terminal());
        assert!(EscrowState::Fulfilled.is_terminal());
    }

    #[test]
    fn ensure_party_checks_stored_fields() {
        let r = record();
        assert!(r.ensure_party(Role::Buyer, &r.buyer).is_ok());
        assert!(r.ensure_party(Role::Seller, &r.seller).is_ok());
        assert_eq!(
            r.ensure_party(Role::Buyer, &r.seller),
            Err(EscrowError::Unauthorized {
                required: Role::Buyer
            })
        );
        // the arbitrator is engine configuration, never a stored party
        assert_eq!(
            r.ensure_party(Role::Arbitrator, &r.buyer),
            Err(EscrowError::Unauthorized {
                required: Role::Arbitrator
            })
        );
    }

    #[test]
    fn ensure_state_names_the_requirement() {
        let r = record();
        assert!(r.ensure_state(EscrowState::Held).is_ok());
        assert_eq!(
            r.ensure_state(EscrowState::BuyerProposedCancellation),
            Err(EscrowError::InvalidState {
                required: EscrowState::BuyerProposedCancellation,
                actual: EscrowState::Held,
            })
        );
    }
}

use thiserror::Error;

use crate::escrow::{EscrowState, Role};

/// Escrow-related errors.
#[derive(Debug, Error, PartialEq)]
pub enum EscrowError {
    /// No escrow record exists for the asset id.
    #[error("there is no escrow for asset id `{0}`")]
    NotFound(String),

    /// An escrow record already exists for the asset id.
    #[error("there is already an escrow for asset id `{0}`")]
    DuplicateAsset(String),

    /// Buyer and seller must be distinct accounts.
    #[error("buyer and seller cannot be the same account")]
    SelfDeal,

    /// Attempted an operation the record's current state does not allow.
    #[error("operation requires state {required}, but escrow is {actual}")]
    InvalidState {
        required: EscrowState,
        actual: EscrowState,
    },

    /// Caller identity does not match the role the operation requires.
    #[error("caller is not the {required} of this escrow")]
    Unauthorized { required: Role },

    #[error("identity error: {0}")]
    Identity(IdentityError),

    #[error(transparent)]
    Transfer(#[from] TransferRejected),
}

/// Fund movement refused by the asset-ledger collaborator.
///
/// Covers insufficient funds, frozen accounts, and a ledger-wide emergency
/// stop; the engine only acts on success or failure and never interprets
/// the sub-cause. Unlike the local precondition errors, this one may be
/// transient and the same request can be retried unchanged.
#[derive(Debug, Error, PartialEq, Clone)]
#[error("transfer rejected: {0}")]
pub struct TransferRejected(pub String);

impl TransferRejected {
    /// Rejection reported while the ledger's emergency stop is in effect.
    pub fn paused() -> Self {
        Self("emergency stop in effect".to_string())
    }
}

/// Errors that might occur while parsing into an `AccountId`.
#[derive(Debug, Error, PartialEq)]
pub enum IdentityError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid base58: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("cannot parse identity from empty string")]
    EmptyIdentity,

    #[error("unsupported identity format")]
    UnsupportedFormat,
}

impl From<IdentityError> for EscrowError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}

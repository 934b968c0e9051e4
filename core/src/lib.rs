/// Account identities of parties participating in an escrow
pub mod identity;
/// Escrow records and their lifecycle states
pub mod escrow;
/// Asset-ledger collaborator contract and the in-memory reference ledger
pub mod ledger;
/// Transition engine: role checks, state preconditions, fund movement
pub mod engine;
/// JSON (de)serialization of engine snapshots
pub mod interface;

pub mod error;
use error::EscrowError;

pub use engine::{Engine, ProposalDecision};
pub use escrow::{AssetId, EscrowRecord, EscrowState, Role};
pub use identity::AccountId;
pub use interface::EngineSnapshot;
pub use ledger::{AssetLedger, TransferRejected};

pub type Result<T> = std::result::Result<T, EscrowError>;

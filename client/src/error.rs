pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("escrow engine error: {0}")]
    Engine(#[from] covenant_core::error::EscrowError),

    #[error("identity error: {0}")]
    Identity(#[from] covenant_core::error::IdentityError),

    #[error(transparent)]
    State(#[from] anyhow::Error),
}

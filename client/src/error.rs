use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("ledger unreachable: {0}")]
    Unreachable(String),

    #[error("ledger request failed: {0}")]
    RequestFailed(String),

    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),
}

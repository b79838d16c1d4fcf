#![forbid(unsafe_code)]

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ledger error: {0}")]
    Ledger(#[from] ledger::Error),
}

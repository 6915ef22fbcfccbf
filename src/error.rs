use thiserror::Error;

/// Reasons a high-score submission is turned away.  The ledger is left
/// untouched in every case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("high-score name must not be empty")]
    EmptyName,
    #[error("no finished score is waiting to be recorded")]
    NotEligible,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

use num_bigint::{BigInt, Sign};
use serde::Deserialize;
use thiserror::Error;

/// Amount in minor units of the account's asset (e.g. cents for scale 2).
/// Signed so that a negative argument can be reported instead of wrapping.
pub type Amount = BigInt;

/// Operation names accepted by the replay input.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    BindPointer,
    PostCredit,
    PostDebit,
    ReserveCredit,
    ReserveDebit,
    ReleaseDebit,
    ReleaseCredit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceAction {
    PostCredit { clear_pending: bool },
    PostDebit { clear_pending: bool },
    ReserveCredit,
    ReserveDebit,
    ReleaseDebitReservation,
    ReleaseCreditReservation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceCommand {
    pub action: BalanceAction,
    pub amount: Amount,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid amount {amount} for {action:?}, amounts must not be negative")]
    InvalidAmount {
        action: BalanceAction,
        amount: Amount,
    },
}

impl BalanceCommand {
    pub fn parse(action: BalanceAction, amount: Amount) -> Result<Self, CommandError> {
        if amount.sign() == Sign::Minus {
            return Err(CommandError::InvalidAmount { action, amount });
        }
        Ok(Self { action, amount })
    }
}
